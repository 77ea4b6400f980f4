use clap::{Args, Subcommand};
use memobase_client::MemobaseClient;

use super::{parse_key_val, to_fields};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// Register a user.
    Add {
        /// User id. The service assigns one when omitted.
        #[arg(long)]
        id: Option<String>,
        /// User data (key=value).
        #[arg(long, value_parser = parse_key_val)]
        data: Vec<(String, serde_json::Value)>,
    },
    /// Show a user.
    Get {
        /// User id.
        user_id: String,
        /// Create the user if the service does not know it.
        #[arg(long)]
        create: bool,
    },
    /// Replace a user's data.
    Update {
        /// User id.
        user_id: String,
        /// User data (key=value).
        #[arg(long, value_parser = parse_key_val, required = true)]
        data: Vec<(String, serde_json::Value)>,
    },
    /// Delete a user and everything stored for it.
    Delete {
        /// User id.
        user_id: String,
    },
}

pub async fn run(
    client: &MemobaseClient,
    args: &UsersArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        UsersCommand::Add { id, data } => {
            let data = (!data.is_empty()).then(|| to_fields(data));
            let user_id = client.add_user(data.as_ref(), id.as_deref()).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "id": user_id }));
                }
                OutputFormat::Text => println!("User '{user_id}' created."),
            }
        }
        UsersCommand::Get { user_id, create } => {
            let user = if *create {
                client.get_or_create_user(user_id).await?
            } else {
                client.get_user(user_id).await?
            };
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(user.fields())?);
                }
                OutputFormat::Text => {
                    println!("User: {}", user.id());
                    for (key, value) in user.fields() {
                        println!("  {key}: {value}");
                    }
                }
            }
        }
        UsersCommand::Update { user_id, data } => {
            client.update_user(user_id, &to_fields(data)).await?;
            println!("User '{user_id}' updated.");
        }
        UsersCommand::Delete { user_id } => {
            client.delete_user(user_id).await?;
            println!("User '{user_id}' deleted.");
        }
    }
    Ok(())
}
