use clap::{ArgGroup, Args, Subcommand};
use memobase_client::{Blob, BlobType, ChatMessage, MemobaseClient};

use super::{parse_key_val, read_json, to_fields};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct BlobsArgs {
    #[command(subcommand)]
    pub command: BlobsCommand,
}

#[derive(Subcommand, Debug)]
pub enum BlobsCommand {
    /// Store a blob for a user.
    Insert(InsertArgs),
    /// Show a stored blob.
    Get {
        /// User id.
        user_id: String,
        /// Blob id.
        blob_id: String,
    },
    /// List blob ids of one type.
    List {
        /// User id.
        user_id: String,
        /// Blob type.
        #[arg(long = "type", default_value = "chat")]
        blob_type: BlobType,
        /// Page number, starting at 0.
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Ids per page.
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
    /// Delete a blob.
    Delete {
        /// User id.
        user_id: String,
        /// Blob id.
        blob_id: String,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("content").required(true)))]
pub struct InsertArgs {
    /// User id.
    pub user_id: String,
    /// Wire-format blob JSON (string or @file path).
    #[arg(long, group = "content")]
    pub json: Option<String>,
    /// Chat messages as role=content pairs, in order.
    #[arg(long, group = "content", value_parser = parse_message)]
    pub message: Vec<ChatMessage>,
    /// Document text.
    #[arg(long, group = "content")]
    pub doc: Option<String>,
    /// Source code (string or @file path).
    #[arg(long, group = "content")]
    pub code: Option<String>,
    /// Language of `--code`.
    #[arg(long, requires = "code")]
    pub language: Option<String>,
    /// Image URL.
    #[arg(long, group = "content")]
    pub image_url: Option<String>,
    /// Blob metadata (key=value).
    #[arg(long, value_parser = parse_key_val)]
    pub field: Vec<(String, serde_json::Value)>,
}

fn parse_message(s: &str) -> Result<ChatMessage, String> {
    let (role, content) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid ROLE=CONTENT: no `=` found in `{s}`"))?;
    Ok(ChatMessage::new(role, content))
}

impl InsertArgs {
    fn blob(&self) -> anyhow::Result<Blob> {
        let blob = if let Some(ref json) = self.json {
            read_json(json)?
        } else if !self.message.is_empty() {
            Blob::chat(self.message.iter().cloned())
        } else if let Some(ref doc) = self.doc {
            Blob::doc(doc.as_str())
        } else if let Some(ref code) = self.code {
            let source = match code.strip_prefix('@') {
                Some(path) => std::fs::read_to_string(path)?,
                None => code.clone(),
            };
            Blob::code(source, self.language.clone())
        } else if let Some(ref url) = self.image_url {
            Blob::image_url(url.as_str())
        } else {
            anyhow::bail!("no blob content given");
        };

        if self.field.is_empty() {
            Ok(blob)
        } else {
            let mut fields = blob.fields.clone();
            fields.extend(to_fields(&self.field));
            Ok(blob.with_fields(fields))
        }
    }
}

pub async fn run(
    client: &MemobaseClient,
    args: &BlobsArgs,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        BlobsCommand::Insert(insert) => {
            let blob = insert.blob()?;
            let blob_id = client.user(&insert.user_id).insert(&blob).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "id": blob_id }));
                }
                OutputFormat::Text => {
                    println!("Inserted {} blob '{blob_id}'.", blob.blob_type());
                }
            }
        }
        BlobsCommand::Get { user_id, blob_id } => {
            let data = client.user(user_id).get_data(blob_id).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&data)?);
                }
                OutputFormat::Text => {
                    let blob = data.into_blob()?;
                    println!("Blob: {blob_id} ({})", blob.blob_type());
                    if let Some(created_at) = blob.created_at {
                        println!("  Created: {}", created_at.to_rfc3339());
                    }
                    for (key, value) in &blob.fields {
                        println!("  {key}: {value}");
                    }
                    println!("{}", serde_json::to_string_pretty(blob.content())?);
                }
            }
        }
        BlobsCommand::List {
            user_id,
            blob_type,
            page,
            page_size,
        } => {
            let ids = client
                .user(user_id)
                .get_all(*blob_type, *page, *page_size)
                .await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&ids)?);
                }
                OutputFormat::Text => {
                    println!("{} {blob_type} blobs on page {page}:", ids.len());
                    for id in &ids {
                        println!("  {id}");
                    }
                }
            }
        }
        BlobsCommand::Delete { user_id, blob_id } => {
            client.user(user_id).delete(blob_id).await?;
            println!("Blob '{blob_id}' deleted.");
        }
    }
    Ok(())
}
