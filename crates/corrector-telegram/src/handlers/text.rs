use std::sync::Arc;

use teloxide::prelude::*;

use corrector_core::domain::{ChatId, UserId};

use crate::router::AppState;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let chat_id = ChatId(msg.chat.id.0);
    let user_id = UserId(user.id.0 as i64);

    if let Err(e) = state
        .controller
        .handle_text(chat_id, user_id, text, state.messenger.as_ref())
        .await
    {
        tracing::error!(user_id = user_id.0, error = %e, "text handler failed");
    }

    Ok(())
}
