mod webhook_handler;

pub use webhook_handler::{
    __path_receive_webhook, __path_verify_webhook, receive_webhook, verify_webhook,
};
