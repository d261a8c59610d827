mod command;
mod session;
mod webhook;

pub use command::Command;
pub use session::{SessionData, WhatsAppSession};
pub use webhook::{
    ChangeValue, InboundMessage, MediaRef, MessageContent, StatusEvent, TextBody, VerifyParams,
    WebhookAckDto, WebhookChange, WebhookEntry, WebhookPayload, WHATSAPP_WEBHOOK_OBJECT,
};
