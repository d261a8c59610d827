use minijinja::context;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::FileListQuery;
use crate::features::files::models::File;
use crate::features::files::FileRepository;
use crate::features::users::models::{NewUser, UserType};
use crate::features::users::UserRepository;
use crate::features::whatsapp::clients::{OutboundMessage, WhatsAppMessenger};
use crate::features::whatsapp::models::{
    Command, InboundMessage, MediaRef, MessageContent, SessionData, WebhookPayload,
    WhatsAppSession,
};
use crate::features::whatsapp::repositories::SessionRepository;
use crate::modules::storage::ObjectStore;
use crate::shared::constants::{
    WHATSAPP_LINK_EXPIRY_SECS, WHATSAPP_LIST_LIMIT, WHATSAPP_PLACEHOLDER_EMAIL_DOMAIN,
    WHATSAPP_SEARCH_LIMIT,
};
use crate::shared::format::{format_chat_date, format_file_size};
use crate::shared::templates::render_template;
use crate::shared::validation::secure_compare;

const SUBSCRIBE_MODE: &str = "subscribe";

const UNSUPPORTED_REPLY: &str =
    "Sorry, I can only process text messages, images, and documents. Please try again.";
const UNKNOWN_COMMAND_REPLY: &str = "❓ Unknown command. Send `help` to see available commands.";
const EMPTY_VAULT_REPLY: &str = "📁 Your vault is empty. Upload some files to get started!";
const GENERIC_ERROR_REPLY: &str = "Sorry, there was an error processing your request. Please try again.";
const SEND_ERROR_REPLY: &str = "Sorry, there was an error sending the file. Please try again.";

/// File row as shown in chat listings
#[derive(Debug, Serialize)]
struct FileLine {
    display_name: String,
    date: String,
    size: String,
}

impl From<&File> for FileLine {
    fn from(file: &File) -> Self {
        Self {
            display_name: file.display_name.clone(),
            date: format_chat_date(file.created_at),
            size: format_file_size(file.file_size),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MediaKind {
    Image,
    Document,
}

impl MediaKind {
    fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Document => "document",
        }
    }
}

/// WhatsApp bot: webhook verification and command dispatch
pub struct WhatsAppService {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    files: Arc<dyn FileRepository>,
    storage: Arc<dyn ObjectStore>,
    messenger: Arc<dyn WhatsAppMessenger>,
    verify_token: String,
}

impl WhatsAppService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        files: Arc<dyn FileRepository>,
        storage: Arc<dyn ObjectStore>,
        messenger: Arc<dyn WhatsAppMessenger>,
        verify_token: String,
    ) -> Self {
        Self {
            sessions,
            users,
            files,
            storage,
            messenger,
            verify_token,
        }
    }

    /// Subscription handshake check. The token comparison is constant-time.
    pub fn verify_subscription(&self, mode: Option<&str>, token: Option<&str>) -> bool {
        let token_matches = token
            .map(|t| secure_compare(t.as_bytes(), self.verify_token.as_bytes()))
            .unwrap_or(false);
        mode == Some(SUBSCRIBE_MODE) && token_matches
    }

    /// Dispatch every message of every `messages` change. Per-message failures
    /// are logged; returns the number of messages handled successfully.
    pub async fn handle_webhook(&self, payload: WebhookPayload) -> usize {
        let mut handled = 0;

        for change in payload.entry.into_iter().flat_map(|e| e.changes) {
            if change.field != "messages" {
                tracing::debug!("Ignoring webhook change for field {}", change.field);
                continue;
            }

            for status in &change.value.statuses {
                tracing::debug!(
                    "Message {} is {} for {}",
                    status.id,
                    status.status,
                    status.recipient_id.as_deref().unwrap_or("unknown recipient")
                );
            }

            for message in change.value.messages {
                let message_id = message.id.clone();
                match self.handle_message(message).await {
                    Ok(()) => handled += 1,
                    Err(e) => tracing::error!("Failed to handle WhatsApp message {}: {}", message_id, e),
                }
            }
        }

        handled
    }

    async fn handle_message(&self, message: InboundMessage) -> Result<()> {
        let session = self.session_for(&message.from).await?;
        tracing::debug!("WhatsApp message {} from {}", message.id, message.from);

        match message.content {
            MessageContent::Text { text } => {
                let command = Command::parse(&text.body);
                if let Err(e) = self.run_command(&session, command).await {
                    tracing::error!("WhatsApp command failed for {}: {}", session.phone_number, e);
                    self.reply(&session.phone_number, GENERIC_ERROR_REPLY).await;
                }
            }
            MessageContent::Image { image } => {
                self.receive_media(&session, &image, MediaKind::Image).await
            }
            MessageContent::Document { document } => {
                self.receive_media(&session, &document, MediaKind::Document)
                    .await
            }
            MessageContent::Unsupported => {
                self.reply(&session.phone_number, UNSUPPORTED_REPLY).await
            }
        }

        Ok(())
    }

    /// Existing session for the phone, or a new one bound to the user with
    /// that phone (created when missing)
    async fn session_for(&self, phone_number: &str) -> Result<WhatsAppSession> {
        if let Some(session) = self.sessions.find_by_phone(phone_number).await? {
            return Ok(session);
        }

        let user = match self.users.find_by_phone(phone_number).await? {
            Some(user) => user,
            None => match self.users.find_by_phone(&format!("+{}", phone_number)).await? {
                Some(user) => user,
                None => {
                    let user = self
                        .users
                        .create(NewUser::new(
                            Uuid::new_v4(),
                            Some(phone_number.to_string()),
                            Some(format!(
                                "{}@{}",
                                phone_number, WHATSAPP_PLACEHOLDER_EMAIL_DOMAIN
                            )),
                            UserType::Individual,
                        ))
                        .await?;
                    tracing::info!("Created user {} for WhatsApp number {}", user.id, phone_number);
                    user
                }
            },
        };

        self.sessions.create(phone_number, user.id).await
    }

    async fn run_command(&self, session: &WhatsAppSession, command: Command) -> Result<()> {
        let to = session.phone_number.as_str();

        match command {
            Command::Help => {
                let body = render("whatsapp/help.jinja", context! {})?;
                self.reply(to, &body).await;
            }
            Command::Status => {
                let user = self.users.find_by_id(session.user_id).await?;
                let file_count = self.files.count_by_user(session.user_id).await?;
                let body = render(
                    "whatsapp/status.jinja",
                    context! {
                        foundarv_id => user.as_ref().map(|u| u.foundarv_id.clone()).unwrap_or_else(|| "N/A".to_string()),
                        file_count => file_count,
                        member_since => user.as_ref().map(|u| format_chat_date(u.created_at)).unwrap_or_else(|| "N/A".to_string()),
                    },
                )?;
                self.reply(to, &body).await;
            }
            Command::List => {
                let files = self
                    .files
                    .list(session.user_id, &FileListQuery::recent(WHATSAPP_LIST_LIMIT))
                    .await?;
                if files.is_empty() {
                    self.reply(to, EMPTY_VAULT_REPLY).await;
                } else {
                    let lines: Vec<FileLine> = files.iter().map(FileLine::from).collect();
                    let body = render("whatsapp/file_list.jinja", context! { files => lines })?;
                    self.reply(to, &body).await;
                }
            }
            Command::Find(query) => self.find(session, &query).await?,
            Command::Send(name) => {
                match self.files.find_latest_by_name(session.user_id, &name).await? {
                    Some(file) => self.send_file(to, &file).await,
                    None => {
                        self.reply(
                            to,
                            &format!("❌ File \"{}\" not found. Use `list` to see your files.", name),
                        )
                        .await
                    }
                }
            }
            Command::Pick(index) => {
                let picked = session.session_data.last_results.get(index - 1).copied();
                let file = match picked {
                    Some(id) => self.files.find_owned(id, session.user_id).await?,
                    None => None,
                };
                match file {
                    Some(file) => self.send_file(to, &file).await,
                    None => {
                        self.reply(
                            to,
                            &format!(
                                "❓ There is no file number {} in your last search. Use `find [query]` first.",
                                index
                            ),
                        )
                        .await
                    }
                }
            }
            Command::Unknown => self.reply(to, UNKNOWN_COMMAND_REPLY).await,
        }

        Ok(())
    }

    async fn find(&self, session: &WhatsAppSession, query: &str) -> Result<()> {
        let to = session.phone_number.as_str();
        let files = self
            .files
            .list(
                session.user_id,
                &FileListQuery::search(query, WHATSAPP_SEARCH_LIMIT),
            )
            .await?;

        match files.as_slice() {
            [] => {
                self.reply(
                    to,
                    &format!("🔍 No files found for \"{}\". Try a different search term.", query),
                )
                .await
            }
            [file] => self.send_file(to, file).await,
            many => {
                let data = SessionData {
                    last_results: many.iter().map(|f| f.id).collect(),
                };
                self.sessions.update_data(session.id, &data).await?;

                let lines: Vec<FileLine> = many.iter().map(FileLine::from).collect();
                let body = render(
                    "whatsapp/search_results.jinja",
                    context! { query => query, files => lines },
                )?;
                self.reply(to, &body).await;
            }
        }

        Ok(())
    }

    /// Presign the stored object and send it as an image or document
    async fn send_file(&self, to: &str, file: &File) {
        let url = match self
            .storage
            .presign_get(&file.storage_path, WHATSAPP_LINK_EXPIRY_SECS)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Failed to presign {} for WhatsApp: {}", file.id, e);
                self.reply(to, SEND_ERROR_REPLY).await;
                return;
            }
        };

        let caption = format!("📄 {}", file.display_name);
        let message = if file.is_image() {
            OutboundMessage::image(url, caption)
        } else {
            OutboundMessage::document(url, file.download_name(), caption)
        };

        if let Err(e) = self.messenger.send(to, &message).await {
            tracing::error!("Failed to send file {} over WhatsApp: {}", file.id, e);
            self.reply(to, SEND_ERROR_REPLY).await;
        }
    }

    // TODO: hand downloaded media to IngestionService so WhatsApp uploads land in the vault
    async fn receive_media(&self, session: &WhatsAppSession, media: &MediaRef, kind: MediaKind) {
        let to = session.phone_number.as_str();

        let downloaded = match self.messenger.media_url(&media.id).await {
            Ok(url) => self.messenger.download_media(&url).await,
            Err(e) => Err(e),
        };

        match downloaded {
            Ok(bytes) => {
                tracing::info!(
                    "Received {} {} ({}, {} bytes) from {}",
                    kind.label(),
                    media.filename.as_deref().unwrap_or(&media.id),
                    media.mime_type.as_deref().unwrap_or("unknown type"),
                    bytes.len(),
                    to
                );
                let label = match kind {
                    MediaKind::Image => "Image",
                    MediaKind::Document => "Document",
                };
                self.reply(
                    to,
                    &format!("{} received! Processing and uploading to your vault...", label),
                )
                .await;
            }
            Err(e) => {
                tracing::error!("Failed to fetch {} {}: {}", kind.label(), media.id, e);
                self.reply(
                    to,
                    &format!(
                        "Sorry, there was an error processing your {}. Please try again.",
                        kind.label()
                    ),
                )
                .await;
            }
        }
    }

    /// Send a text reply. Send failures are logged, never retried.
    async fn reply(&self, to: &str, body: &str) {
        if let Err(e) = self.messenger.send(to, &OutboundMessage::text(body)).await {
            tracing::error!("Failed to send WhatsApp reply to {}: {}", to, e);
        }
    }
}

fn render(template: &str, ctx: minijinja::Value) -> Result<String> {
    render_template(template, ctx).map_err(|e| AppError::Internal(e.to_string()))
}
