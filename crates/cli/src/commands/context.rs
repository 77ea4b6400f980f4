use clap::Args;
use memobase_client::{ContextQuery, MemobaseClient};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ContextArgs {
    /// User id.
    pub user_id: String,
    /// Token budget for the whole context.
    #[arg(long)]
    pub max_token_size: Option<u32>,
    /// Topics ranked first.
    #[arg(long)]
    pub prefer_topic: Vec<String>,
    /// Only include these topics.
    #[arg(long)]
    pub only_topic: Vec<String>,
    /// Share of the budget given to profiles (0.0 to 1.0).
    #[arg(long)]
    pub profile_event_ratio: Option<f64>,
}

impl ContextArgs {
    fn query(&self) -> ContextQuery {
        let mut query = ContextQuery::new();
        query.max_token_size = self.max_token_size;
        query.prefer_topics.clone_from(&self.prefer_topic);
        query.only_topics.clone_from(&self.only_topic);
        query.profile_event_ratio = self.profile_event_ratio;
        query
    }
}

pub async fn run(
    client: &MemobaseClient,
    args: &ContextArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let context = client.user(&args.user_id).context(&args.query()).await?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "context": context }));
        }
        OutputFormat::Text => println!("{context}"),
    }
    Ok(())
}
