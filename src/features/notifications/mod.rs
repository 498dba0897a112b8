mod notification_service;
mod telegram_client;

pub use notification_service::NotificationService;
pub use telegram_client::TelegramClient;
