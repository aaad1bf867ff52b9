use std::sync::Arc;

use teloxide::prelude::*;

use corrector_core::{
    domain::{ChatId, UserId},
    messaging::types::MenuAction,
    Result,
};

use crate::router::AppState;

const HELP_TEXT: &str = "Hello! I'm your grammar, style, and tone correction bot.\n\n\
    Just send me any message and I'll correct it for you.\n\n\
    /tone - pick the tone I should aim for (or type your own)\n\
    /mode - choose what I'm allowed to change\n\
    /settings - show your current preferences\n\n\
    If you never pick a tone, I'll aim for <i>neutral and professional</i>.";

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let (cmd, _args) = parse_command(msg.text().unwrap_or(""));
    let chat_id = ChatId(msg.chat.id.0);
    let user_id = UserId(user.id.0 as i64);

    let result: Result<()> = match cmd.as_str() {
        "start" | "help" => state
            .messenger
            .send_html(chat_id, HELP_TEXT)
            .await
            .map(|_| ()),
        // The command entry points only render menus / state; every
        // mutation goes through the menu flow.
        "tone" => {
            state
                .controller
                .handle_menu(
                    chat_id,
                    user_id,
                    MenuAction::OpenToneMenu,
                    None,
                    state.messenger.as_ref(),
                )
                .await
        }
        "mode" => {
            state
                .controller
                .handle_menu(
                    chat_id,
                    user_id,
                    MenuAction::OpenModeMenu,
                    None,
                    state.messenger.as_ref(),
                )
                .await
        }
        "settings" => {
            let text = state.controller.settings_text(user_id).await;
            state.messenger.send_html(chat_id, &text).await.map(|_| ())
        }
        _ => state
            .messenger
            .send_html(chat_id, "Unknown command. Try /help.")
            .await
            .map(|_| ()),
    };

    if let Err(e) = result {
        tracing::error!(user_id = user_id.0, command = %cmd, error = %e, "command handler failed");
    }

    Ok(())
}
