use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::InlineKeyboard,
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the first implementation; the shape is small enough that other
/// chat transports could fit behind it. Text is HTML in the transport's
/// dialect, so callers escape interpolated content first.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    async fn send_menu(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()>;

    /// Best-effort "typing..." indicator while a completion is in flight.
    async fn send_typing(&self, chat_id: ChatId) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
