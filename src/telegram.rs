//! Thin Telegram Bot API adapter: long polling, file transfer, replies.
//!
//! Deliberately minimal — a small `reqwest` client and a handful of DTOs
//! instead of a bot framework. The adapter's whole job is to move bytes
//! between Telegram and [`crate::handler::handle_document`]; every decision
//! about the document itself is made by the core.
//!
//! Each inbound document is handled in its own spawned task, so one slow
//! conversion never blocks polling or other users. The conversion timeout is
//! enforced inside the engine; this layer does no cancellation of its own.

use crate::config::BotConfig;
use crate::handler::{self, Outcome};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Long-poll wait passed to `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

const START_REPLY: &str = "Hello! 👋\n\n\
I convert Word (.docx) and PowerPoint (.pptx) files to PDF.\n\
Just send me a .docx or .pptx file.";

/// Errors from the Telegram transport itself (not from conversion — those are
/// already rendered into user-visible text by the handler).
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ── Wire DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Document {
    file_id: String,
    file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    file_path: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────────

/// Minimal Telegram Bot API client bound to one token.
pub struct Bot {
    client: reqwest::Client,
    api_base: String,
    file_base: String,
}

impl Bot {
    pub fn new(token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: format!("https://api.telegram.org/bot{token}"),
            file_base: format!("https://api.telegram.org/file/bot{token}"),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, TelegramError> {
        let resp: ApiResponse<T> = self
            .client
            .post(format!("{}/{method}", self.api_base))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        match resp {
            ApiResponse {
                ok: true,
                result: Some(r),
                ..
            } => Ok(r),
            ApiResponse { description, .. } => Err(TelegramError::Api(
                description.unwrap_or_else(|| format!("{method} returned no result")),
            )),
        }
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            serde_json::json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.call::<serde_json::Value>(
            "sendMessage",
            serde_json::json!({ "chat_id": chat_id, "text": text }),
        )
        .await
        .map(|_| ())
    }

    /// Resolve a `file_id` and download its bytes.
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TelegramError> {
        let info: FileInfo = self
            .call("getFile", serde_json::json!({ "file_id": file_id }))
            .await?;
        let path = info
            .file_path
            .ok_or_else(|| TelegramError::Api("getFile returned no file_path".into()))?;
        let bytes = self
            .client
            .get(format!("{}/{path}", self.file_base))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    /// Upload a document with a caption (multipart `sendDocument`).
    async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
        caption: &str,
    ) -> Result<(), TelegramError> {
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part(
                "document",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            );
        let resp: ApiResponse<serde_json::Value> = self
            .client
            .post(format!("{}/sendDocument", self.api_base))
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;
        if resp.ok {
            Ok(())
        } else {
            Err(TelegramError::Api(
                resp.description
                    .unwrap_or_else(|| "sendDocument failed".into()),
            ))
        }
    }
}

// ── Serving loop ─────────────────────────────────────────────────────────

/// Run the bot until the process is stopped.
///
/// Polls `getUpdates` forever; each document message gets its own task. Poll
/// errors are logged and retried after a short pause — a Telegram hiccup must
/// not take the service down.
pub async fn run(config: BotConfig) -> Result<(), TelegramError> {
    let bot = Arc::new(Bot::new(&config.token));
    let config = Arc::new(config);
    let mut offset = 0i64;

    info!("bot started, polling for updates");
    loop {
        let updates = match bot.get_updates(offset).await {
            Ok(u) => u,
            Err(e) => {
                warn!("getUpdates failed: {e}; retrying in 5s");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            dispatch(Arc::clone(&bot), Arc::clone(&config), message);
        }
    }
}

/// Route one message: `/start` is answered inline, documents get a task.
fn dispatch(bot: Arc<Bot>, config: Arc<BotConfig>, message: Message) {
    let chat_id = message.chat.id;

    if let Some(document) = message.document {
        tokio::spawn(async move {
            if let Err(e) = serve_document(&bot, &config, chat_id, document).await {
                error!("delivery to chat {chat_id} failed: {e}");
                let _ = bot
                    .send_message(chat_id, "Sorry, something went wrong while replying.")
                    .await;
            }
        });
        return;
    }

    if message.text.as_deref().is_some_and(|t| t.starts_with("/start")) {
        tokio::spawn(async move {
            if let Err(e) = bot.send_message(chat_id, START_REPLY).await {
                warn!("failed to answer /start in chat {chat_id}: {e}");
            }
        });
    }
}

/// One document request: download, convert, reply. Sequential within the
/// task; concurrent with every other request.
async fn serve_document(
    bot: &Bot,
    config: &BotConfig,
    chat_id: i64,
    document: Document,
) -> Result<(), TelegramError> {
    let file_name = document.file_name.unwrap_or_else(|| "document".to_string());

    // Reject before downloading anything; no point pulling bytes we refuse.
    if let Err(e) = handler::check_extension(&file_name) {
        return bot.send_message(chat_id, &e.to_string()).await;
    }

    bot.send_message(chat_id, "Downloading your file…").await?;
    let bytes = bot.download_file(&document.file_id).await?;
    debug!("downloaded '{file_name}' ({} bytes)", bytes.len());

    bot.send_message(chat_id, "Converting…").await?;
    match handler::handle_document(&bytes, &file_name, &config.convert).await {
        Outcome::Document {
            path,
            caption,
            workspace,
        } => {
            let pdf_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "converted.pdf".to_string());
            let pdf_bytes = tokio::fs::read(&path).await?;
            // The PDF is fully read; the scratch directory may go.
            workspace.dispose();
            bot.send_document(chat_id, &pdf_name, pdf_bytes, &caption)
                .await
        }
        Outcome::Text(msg) => bot.send_message(chat_id, &msg).await,
    }
}
