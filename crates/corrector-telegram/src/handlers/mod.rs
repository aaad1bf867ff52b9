//! Telegram update handlers.
//!
//! Each handler is a small adapter: it extracts ids and payload from the
//! teloxide update, decodes callback data at the boundary, and calls into
//! the `corrector-core` controller.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use corrector_core::domain::ChatId;

use crate::router::AppState;

mod callback;
mod commands;
mod text;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    callback::handle_callback(q, state).await
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    let Some(msg_text) = msg.text() else {
        // Voice notes, photos, stickers... nothing we can correct.
        let _ = state
            .messenger
            .send_html(
                ChatId(msg.chat.id.0),
                "I can only correct text messages. Send me some text!",
            )
            .await;
        return Ok(());
    };

    if msg_text.starts_with('/') {
        return commands::handle_command(msg, state).await;
    }

    // Sequentialize messages per user so rapid double-submits cannot race
    // the session.
    let _guard = state.user_locks.lock_user(user_id).await;
    text::handle_text(msg, state).await
}
