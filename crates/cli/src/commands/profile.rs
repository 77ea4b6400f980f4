use clap::{Args, Subcommand};
use memobase_client::{MemobaseClient, ProfileQuery};

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show a user's profiles.
    Get {
        /// User id.
        user_id: String,
        /// Maximum number of profiles.
        #[arg(long)]
        topk: Option<u32>,
        /// Token budget for the returned content.
        #[arg(long)]
        max_token_size: Option<u32>,
        /// Topics ranked first.
        #[arg(long)]
        prefer_topic: Vec<String>,
        /// Only include these topics.
        #[arg(long)]
        only_topic: Vec<String>,
    },
    /// Delete one profile entry.
    Delete {
        /// User id.
        user_id: String,
        /// Profile id.
        profile_id: String,
    },
}

pub async fn run(
    client: &MemobaseClient,
    args: &ProfileArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        ProfileCommand::Get {
            user_id,
            topk,
            max_token_size,
            prefer_topic,
            only_topic,
        } => {
            let query = ProfileQuery {
                topk: *topk,
                max_token_size: *max_token_size,
                prefer_topics: prefer_topic.clone(),
                only_topics: only_topic.clone(),
                ..ProfileQuery::default()
            };
            let report = client.user(user_id).profile_report(&query).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Text => {
                    println!("{} profiles:", report.profiles.len());
                    for profile in &report.profiles {
                        println!(
                            "  [{id}] {topic}/{sub_topic}: {content}",
                            id = profile.id().unwrap_or("-"),
                            topic = profile.topic(),
                            sub_topic = profile.sub_topic(),
                            content = profile.content(),
                        );
                    }
                    for skipped in &report.skipped {
                        eprintln!("  skipped entry {}: {}", skipped.index, skipped.reason);
                    }
                }
            }
        }
        ProfileCommand::Delete {
            user_id,
            profile_id,
        } => {
            client.user(user_id).delete_profile(profile_id).await?;
            println!("Profile '{profile_id}' deleted.");
        }
    }
    Ok(())
}
