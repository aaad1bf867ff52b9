use std::sync::Arc;

use teloxide::prelude::*;

use corrector_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::MenuAction,
};

use crate::router::AppState;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let data = q.data.clone().unwrap_or_default();

    // Callback queries must always be answered or the client keeps spinning.
    let Some(message) = q.message.as_ref() else {
        let _ = state.messenger.answer_callback_query(&q.id, None).await;
        return Ok(());
    };

    let Some(action) = MenuAction::parse(&data) else {
        // Stale keyboard from an older build, or junk.
        let _ = state
            .messenger
            .answer_callback_query(&q.id, Some("This button is no longer valid."))
            .await;
        return Ok(());
    };

    let _ = state.messenger.answer_callback_query(&q.id, None).await;

    let chat_id = ChatId(message.chat.id.0);
    let user_id = UserId(q.from.id.0 as i64);
    let origin = Some(MessageRef {
        chat_id,
        message_id: MessageId(message.id.0),
    });

    // Same per-user ordering as plain messages; a menu tap racing a text
    // message must not interleave session updates.
    let _guard = state.user_locks.lock_user(user_id.0).await;

    if let Err(e) = state
        .controller
        .handle_menu(chat_id, user_id, action, origin, state.messenger.as_ref())
        .await
    {
        tracing::error!(user_id = user_id.0, error = %e, "callback handler failed");
    }

    Ok(())
}
