mod whatsapp_service;

pub use whatsapp_service::WhatsAppService;
