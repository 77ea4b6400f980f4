use clap::Args;
use memobase_client::{BlobType, MemobaseClient};

#[derive(Args, Debug)]
pub struct FlushArgs {
    /// User id.
    pub user_id: String,
    /// Blob type whose buffer is processed.
    #[arg(long = "type", default_value = "chat")]
    pub blob_type: BlobType,
}

pub async fn run(client: &MemobaseClient, args: &FlushArgs) -> anyhow::Result<()> {
    client.user(&args.user_id).flush(args.blob_type).await?;
    println!(
        "Flush of {} blobs for '{}' accepted.",
        args.blob_type, args.user_id
    );
    Ok(())
}
