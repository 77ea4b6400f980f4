use clap::Args;
use memobase_client::MemobaseClient;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// User id.
    pub user_id: String,
    /// Number of events to return.
    #[arg(long, default_value_t = 10)]
    pub topk: u32,
    /// Token budget for the returned events.
    #[arg(long)]
    pub max_token_size: Option<u32>,
}

pub async fn run(
    client: &MemobaseClient,
    args: &EventsArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let events = client
        .user(&args.user_id)
        .events(args.topk, args.max_token_size)
        .await?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        OutputFormat::Text => {
            println!("{} events:", events.len());
            for event in &events {
                let when = event
                    .created_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "-".into());
                let data = serde_json::Value::Object(event.event_data.clone());
                println!("  [{when}] {}: {data}", event.id);
            }
        }
    }
    Ok(())
}
