mod graph_api_client;
mod messenger;

pub use graph_api_client::GraphApiClient;
pub use messenger::{MediaLink, MessagingError, OutboundMessage, TextContent, WhatsAppMessenger};
