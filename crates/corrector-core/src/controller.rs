use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    completion::{port::CompletionPort, types::CompletionRequest},
    config::Config,
    domain::{ChatId, CorrectionMode, MessageRef, TonePreset, UserId},
    errors::Error,
    formatting::escape_html,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard, MenuAction},
    },
    prompt,
    ratelimit::RateLimiter,
    sanitize::sanitize,
    session::SessionStore,
    Result,
};

const RATE_LIMIT_NOTICE: &str =
    "⏳ Too many requests. Please wait a minute before sending more messages.";
const COMPLETION_APOLOGY: &str =
    "Sorry, I encountered an error while trying to correct your message.";
const NOTHING_TO_REPROCESS: &str = "Nothing to reprocess yet. Send me a message first.";
const CUSTOM_TONE_PROMPT: &str =
    "Send me the tone you want as a plain message, e.g. <i>friendly and upbeat</i>.";

/// Orchestrates incoming events against the session store, rate limiter,
/// prompt builder and completion backend.
///
/// One instance serves every user; all collaborators are injected at
/// construction and owned by the process entry point.
pub struct InteractionController {
    cfg: Arc<Config>,
    sessions: Arc<SessionStore>,
    completion: Arc<dyn CompletionPort>,
    rate_limiter: Mutex<RateLimiter>,
}

impl InteractionController {
    pub fn new(
        cfg: Arc<Config>,
        sessions: Arc<SessionStore>,
        completion: Arc<dyn CompletionPort>,
    ) -> Self {
        let rate_limiter = Mutex::new(RateLimiter::new(
            cfg.rate_limit_enabled,
            cfg.rate_limit_requests,
            cfg.rate_limit_window,
        ));
        Self {
            cfg,
            sessions,
            completion,
            rate_limiter,
        }
    }

    /// Handle an incoming plain-text message.
    pub async fn handle_text(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        text: &str,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        // A pending custom-tone request captures the next message; it never
        // reaches the model.
        if self.sessions.take_awaiting_custom_tone(user_id).await {
            self.sessions.set_tone(user_id, text).await;
            let reply = format!(
                "✓ Tone set to <i>{}</i>. I'll use it for your next corrections.",
                escape_html(text)
            );
            messenger.send_html(chat_id, &reply).await?;
            return Ok(());
        }

        let admitted = self.rate_limiter.lock().await.admit(user_id);
        if !admitted {
            tracing::info!(user_id = user_id.0, "rate limit exceeded");
            messenger.send_html(chat_id, RATE_LIMIT_NOTICE).await?;
            return Ok(());
        }

        self.correct_and_reply(chat_id, user_id, text, messenger)
            .await
    }

    /// Handle a decoded menu selection.
    ///
    /// `origin` is the message carrying the menu, when the transport knows
    /// it; confirmations replace that message instead of stacking new ones.
    pub async fn handle_menu(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        action: MenuAction,
        origin: Option<MessageRef>,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        match action {
            MenuAction::OpenToneMenu => {
                messenger
                    .send_menu(chat_id, "Choose a tone for corrections:", Self::tone_menu())
                    .await?;
            }
            MenuAction::OpenModeMenu => {
                messenger
                    .send_menu(chat_id, "Choose a correction mode:", Self::mode_menu())
                    .await?;
            }
            MenuAction::PresetTone(preset) => {
                self.sessions.set_tone(user_id, preset.expansion()).await;
                let text = format!("✓ Tone set to <i>{}</i>.", escape_html(preset.expansion()));
                self.confirm(chat_id, origin, &text, messenger).await?;
            }
            MenuAction::CustomTone => {
                self.sessions.set_awaiting_custom_tone(user_id, true).await;
                self.confirm(chat_id, origin, CUSTOM_TONE_PROMPT, messenger)
                    .await?;
            }
            MenuAction::Mode(mode) => {
                self.sessions.set_mode(user_id, mode).await;
                let text = format!("✓ Mode set to <b>{}</b>.", mode.label());
                self.confirm(chat_id, origin, &text, messenger).await?;
            }
            MenuAction::Reprocess => {
                let Some(original) = self.sessions.last_original(user_id).await else {
                    self.confirm(chat_id, origin, NOTHING_TO_REPROCESS, messenger)
                        .await?;
                    return Ok(());
                };
                // Reprocessing the stored text is exempt from rate limiting;
                // the original submission already paid for it.
                self.correct_and_reply(chat_id, user_id, &original, messenger)
                    .await?;
            }
            MenuAction::Cancel => {
                self.confirm(chat_id, origin, "Okay, nothing changed.", messenger)
                    .await?;
            }
        }
        Ok(())
    }

    /// Render the current session state (read-only, for `/settings`).
    pub async fn settings_text(&self, user_id: UserId) -> String {
        let s = self.sessions.snapshot(user_id).await;
        let history = if s.last_corrected.is_some() {
            "kept (use the menu to correct it again)"
        } else {
            "none yet"
        };
        format!(
            "<b>Your settings</b>\nTone: <i>{}</i>\nMode: {}\nModel: <code>{}</code>\nLast correction: {}",
            escape_html(&s.desired_tone),
            s.mode.label(),
            escape_html(&self.cfg.model),
            history
        )
    }

    async fn correct_and_reply(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        text: &str,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        let session = self.sessions.snapshot(user_id).await;
        let prompt = prompt::build(session.mode, &session.desired_tone, text);

        let _ = messenger.send_typing(chat_id).await;

        tracing::debug!(
            user_id = user_id.0,
            mode = session.mode.slug(),
            tone = %session.desired_tone,
            "requesting correction"
        );

        let raw = match self
            .completion
            .complete(CompletionRequest {
                system: prompt.system,
                user: prompt.user,
            })
            .await
        {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(user_id = user_id.0, error = %err, "completion failed");
                messenger
                    .send_html(chat_id, &user_facing_failure(&err))
                    .await?;
                return Ok(());
            }
        };

        let corrected = sanitize(&raw);
        if corrected.is_empty() {
            tracing::warn!(user_id = user_id.0, "completion returned empty text");
            messenger.send_html(chat_id, COMPLETION_APOLOGY).await?;
            return Ok(());
        }

        self.sessions
            .record_correction(user_id, text.to_string(), corrected.clone())
            .await;

        messenger
            .send_menu(chat_id, &escape_html(&corrected), Self::followup_menu())
            .await?;
        Ok(())
    }

    async fn confirm(
        &self,
        chat_id: ChatId,
        origin: Option<MessageRef>,
        html: &str,
        messenger: &dyn MessagingPort,
    ) -> Result<()> {
        match origin {
            // Editing the menu message keeps the chat tidy; a failed edit
            // (already edited, too old) is not worth surfacing.
            Some(msg) => {
                let _ = messenger.edit_html(msg, html).await;
            }
            None => {
                messenger.send_html(chat_id, html).await?;
            }
        }
        Ok(())
    }

    pub fn tone_menu() -> InlineKeyboard {
        let mut buttons: Vec<InlineButton> = TonePreset::ALL
            .iter()
            .map(|p| InlineButton::for_action(p.label(), MenuAction::PresetTone(*p)))
            .collect();
        buttons.push(InlineButton::for_action("Custom…", MenuAction::CustomTone));
        buttons.push(InlineButton::for_action("Cancel", MenuAction::Cancel));
        InlineKeyboard::one_per_row(buttons)
    }

    pub fn mode_menu() -> InlineKeyboard {
        let mut buttons: Vec<InlineButton> = CorrectionMode::ALL
            .iter()
            .map(|m| InlineButton::for_action(m.label(), MenuAction::Mode(*m)))
            .collect();
        buttons.push(InlineButton::for_action("Cancel", MenuAction::Cancel));
        InlineKeyboard::one_per_row(buttons)
    }

    fn followup_menu() -> InlineKeyboard {
        InlineKeyboard::new(vec![
            vec![
                InlineButton::for_action("Change tone", MenuAction::OpenToneMenu),
                InlineButton::for_action("Change mode", MenuAction::OpenModeMenu),
            ],
            vec![InlineButton::for_action(
                "Correct again",
                MenuAction::Reprocess,
            )],
        ])
    }
}

fn user_facing_failure(err: &Error) -> String {
    match err {
        // The unavailable notice is its own Display text, by contract.
        Error::ServiceUnavailable => err.to_string(),
        _ => COMPLETION_APOLOGY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    enum FakeBehavior {
        Reply(String),
        Unavailable,
        Fail,
    }

    struct FakeCompletion {
        behavior: FakeBehavior,
        calls: AtomicUsize,
        requests: StdMutex<Vec<CompletionRequest>>,
    }

    impl FakeCompletion {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                behavior: FakeBehavior::Reply(text.to_string()),
                calls: AtomicUsize::new(0),
                requests: StdMutex::new(Vec::new()),
            })
        }

        fn with(behavior: FakeBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                requests: StdMutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> Option<CompletionRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl CompletionPort for FakeCompletion {
        async fn complete(&self, req: CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(req);
            match &self.behavior {
                FakeBehavior::Reply(text) => Ok(text.clone()),
                FakeBehavior::Unavailable => Err(Error::ServiceUnavailable),
                FakeBehavior::Fail => Err(Error::Completion("boom".to_string())),
            }
        }
    }

    #[derive(Default)]
    struct FakeMessenger {
        sends: StdMutex<Vec<String>>,
        menus: StdMutex<Vec<(String, InlineKeyboard)>>,
        edits: StdMutex<Vec<(MessageRef, String)>>,
        typing: AtomicUsize,
        next_id: AtomicUsize,
    }

    impl FakeMessenger {
        fn alloc(&self, chat_id: ChatId) -> MessageRef {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
            MessageRef {
                chat_id,
                message_id: crate::domain::MessageId(id),
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sends.lock().unwrap().clone()
        }

        fn menu_sends(&self) -> Vec<(String, InlineKeyboard)> {
            self.menus.lock().unwrap().clone()
        }

        fn edit_sends(&self) -> Vec<(MessageRef, String)> {
            self.edits.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
            self.sends.lock().unwrap().push(html.to_string());
            Ok(self.alloc(chat_id))
        }

        async fn send_menu(
            &self,
            chat_id: ChatId,
            html: &str,
            keyboard: InlineKeyboard,
        ) -> Result<MessageRef> {
            self.menus
                .lock()
                .unwrap()
                .push((html.to_string(), keyboard));
            Ok(self.alloc(chat_id))
        }

        async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()> {
            self.edits.lock().unwrap().push((msg, html.to_string()));
            Ok(())
        }

        async fn send_typing(&self, _chat_id: ChatId) -> Result<()> {
            self.typing.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn answer_callback_query(&self, _callback_id: &str, _text: Option<&str>) -> Result<()> {
            Ok(())
        }
    }

    fn test_config(max_calls: u32) -> Arc<Config> {
        Arc::new(Config {
            telegram_bot_token: "x".to_string(),
            openrouter_api_key: Some("k".to_string()),
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "test-model".to_string(),
            http_referer: None,
            x_title: "Custom Text Corrector".to_string(),
            temperature: 0.5,
            max_completion_tokens: 500,
            completion_timeout: Duration::from_secs(30),
            rate_limit_enabled: true,
            rate_limit_requests: max_calls,
            rate_limit_window: Duration::from_secs(60),
        })
    }

    fn controller(
        max_calls: u32,
        completion: Arc<FakeCompletion>,
    ) -> (InteractionController, Arc<SessionStore>) {
        let sessions = Arc::new(SessionStore::new());
        let c = InteractionController::new(test_config(max_calls), sessions.clone(), completion);
        (c, sessions)
    }

    const CHAT: ChatId = ChatId(100);
    const USER: UserId = UserId(1);

    #[tokio::test]
    async fn correction_updates_history_and_replies_with_menu() {
        let completion = FakeCompletion::replying("\"I have an apple\"");
        let (c, sessions) = controller(10, completion.clone());
        let messenger = FakeMessenger::default();

        c.handle_text(CHAT, USER, "I has a apple", &messenger)
            .await
            .unwrap();

        assert_eq!(completion.call_count(), 1);
        assert_eq!(messenger.typing.load(Ordering::SeqCst), 1);

        // The quoted reply is sanitized before it reaches the user.
        let menus = messenger.menu_sends();
        assert_eq!(menus.len(), 1);
        assert_eq!(menus[0].0, "I have an apple");

        let s = sessions.snapshot(USER).await;
        assert_eq!(s.last_original.as_deref(), Some("I has a apple"));
        assert_eq!(s.last_corrected.as_deref(), Some("I have an apple"));
    }

    #[tokio::test]
    async fn custom_tone_input_never_reaches_the_model() {
        let completion = FakeCompletion::replying("unused");
        let (c, sessions) = controller(10, completion.clone());
        let messenger = FakeMessenger::default();

        sessions.set_awaiting_custom_tone(USER, true).await;
        c.handle_text(CHAT, USER, "sarcastic", &messenger)
            .await
            .unwrap();

        assert_eq!(completion.call_count(), 0);

        let s = sessions.snapshot(USER).await;
        assert_eq!(s.desired_tone, "sarcastic");
        assert!(!s.awaiting_custom_tone);
        assert!(
            messenger.sent().iter().any(|m| m.contains("sarcastic")),
            "expected a tone confirmation"
        );
    }

    #[tokio::test]
    async fn empty_input_is_silently_ignored() {
        let completion = FakeCompletion::replying("unused");
        let (c, _) = controller(10, completion.clone());
        let messenger = FakeMessenger::default();

        c.handle_text(CHAT, USER, "   \n ", &messenger).await.unwrap();

        assert_eq!(completion.call_count(), 0);
        assert!(messenger.sent().is_empty());
        assert!(messenger.menu_sends().is_empty());
    }

    #[tokio::test]
    async fn rate_limit_denies_without_calling_the_model() {
        let completion = FakeCompletion::replying("ok");
        let (c, _) = controller(1, completion.clone());
        let messenger = FakeMessenger::default();

        c.handle_text(CHAT, USER, "first", &messenger).await.unwrap();
        c.handle_text(CHAT, USER, "second", &messenger).await.unwrap();

        assert_eq!(completion.call_count(), 1);
        assert!(
            messenger.sent().iter().any(|m| m.contains("Too many requests")),
            "expected a rate-limit notice"
        );
    }

    #[tokio::test]
    async fn reprocess_is_exempt_from_rate_limiting() {
        let completion = FakeCompletion::replying("corrected");
        let (c, _) = controller(1, completion.clone());
        let messenger = FakeMessenger::default();

        // Consumes the only slot in the window.
        c.handle_text(CHAT, USER, "original text", &messenger)
            .await
            .unwrap();
        assert_eq!(completion.call_count(), 1);

        c.handle_menu(CHAT, USER, MenuAction::Reprocess, None, &messenger)
            .await
            .unwrap();
        assert_eq!(completion.call_count(), 2);
    }

    #[tokio::test]
    async fn reprocess_without_history_notifies_and_skips_the_model() {
        let completion = FakeCompletion::replying("unused");
        let (c, _) = controller(10, completion.clone());
        let messenger = FakeMessenger::default();

        c.handle_menu(CHAT, USER, MenuAction::Reprocess, None, &messenger)
            .await
            .unwrap();

        assert_eq!(completion.call_count(), 0);
        assert!(messenger
            .sent()
            .iter()
            .any(|m| m.contains("Nothing to reprocess")));
    }

    #[tokio::test]
    async fn reprocess_uses_current_preferences() {
        let completion = FakeCompletion::replying("corrected");
        let (c, sessions) = controller(10, completion.clone());
        let messenger = FakeMessenger::default();

        c.handle_text(CHAT, USER, "some text", &messenger).await.unwrap();

        // Switch mode after the first pass; the redo must pick it up.
        sessions.set_mode(USER, CorrectionMode::GrammarOnly).await;
        c.handle_menu(CHAT, USER, MenuAction::Reprocess, None, &messenger)
            .await
            .unwrap();

        let req = completion.last_request().unwrap();
        assert_eq!(req.user, "some text");
        assert!(!req.system.contains("Adjust the tone"));
    }

    #[tokio::test]
    async fn mode_selection_changes_the_instruction() {
        let completion = FakeCompletion::replying("ok");
        let (c, _) = controller(10, completion.clone());
        let messenger = FakeMessenger::default();

        c.handle_menu(
            CHAT,
            USER,
            MenuAction::Mode(CorrectionMode::StyleOnly),
            None,
            &messenger,
        )
        .await
        .unwrap();
        c.handle_text(CHAT, USER, "hello there", &messenger)
            .await
            .unwrap();

        let req = completion.last_request().unwrap();
        assert!(!req.system.to_lowercase().contains("grammar"));
        assert!(req.system.contains("neutral and professional"));
    }

    #[tokio::test]
    async fn preset_tone_selection_expands_and_edits_menu_message() {
        let completion = FakeCompletion::replying("unused");
        let (c, sessions) = controller(10, completion);
        let messenger = FakeMessenger::default();

        let origin = MessageRef {
            chat_id: CHAT,
            message_id: crate::domain::MessageId(7),
        };
        c.handle_menu(
            CHAT,
            USER,
            MenuAction::PresetTone(TonePreset::Academic),
            Some(origin),
            &messenger,
        )
        .await
        .unwrap();

        let s = sessions.snapshot(USER).await;
        assert_eq!(
            s.desired_tone,
            "academic and scholarly, highly intellectual and even pedantic"
        );

        let edits = messenger.edit_sends();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0, origin);
        assert!(edits[0].1.contains("academic and scholarly"));
    }

    #[tokio::test]
    async fn custom_tone_selection_sets_flag_and_prompts() {
        let completion = FakeCompletion::replying("unused");
        let (c, sessions) = controller(10, completion);
        let messenger = FakeMessenger::default();

        c.handle_menu(CHAT, USER, MenuAction::CustomTone, None, &messenger)
            .await
            .unwrap();

        assert!(sessions.snapshot(USER).await.awaiting_custom_tone);
        assert!(messenger.sent().iter().any(|m| m.contains("tone")));
    }

    #[tokio::test]
    async fn cancel_changes_nothing() {
        let completion = FakeCompletion::replying("unused");
        let (c, sessions) = controller(10, completion.clone());
        let messenger = FakeMessenger::default();

        c.handle_menu(CHAT, USER, MenuAction::Cancel, None, &messenger)
            .await
            .unwrap();

        let s = sessions.snapshot(USER).await;
        assert_eq!(s.desired_tone, "neutral and professional");
        assert_eq!(s.mode, CorrectionMode::Full);
        assert_eq!(completion.call_count(), 0);
        assert!(messenger.sent().iter().any(|m| m.contains("nothing changed")));
    }

    #[tokio::test]
    async fn completion_failure_sends_apology_and_keeps_history_clean() {
        let completion = FakeCompletion::with(FakeBehavior::Fail);
        let (c, sessions) = controller(10, completion);
        let messenger = FakeMessenger::default();

        c.handle_text(CHAT, USER, "I has a apple", &messenger)
            .await
            .unwrap();

        assert!(messenger
            .sent()
            .iter()
            .any(|m| m.contains("Sorry, I encountered an error")));
        assert!(sessions.snapshot(USER).await.last_original.is_none());
    }

    #[tokio::test]
    async fn unconfigured_service_notice_is_surfaced_verbatim() {
        let completion = FakeCompletion::with(FakeBehavior::Unavailable);
        let (c, _) = controller(10, completion);
        let messenger = FakeMessenger::default();

        c.handle_text(CHAT, USER, "hello", &messenger).await.unwrap();

        assert!(messenger
            .sent()
            .iter()
            .any(|m| m == "Sorry, the correction service is currently unavailable."));
    }

    #[tokio::test]
    async fn empty_completion_counts_as_failure() {
        let completion = FakeCompletion::replying("  \"\"  ");
        let (c, sessions) = controller(10, completion);
        let messenger = FakeMessenger::default();

        c.handle_text(CHAT, USER, "hello", &messenger).await.unwrap();

        assert!(messenger
            .sent()
            .iter()
            .any(|m| m.contains("Sorry, I encountered an error")));
        assert!(sessions.snapshot(USER).await.last_corrected.is_none());
    }

    #[test]
    fn menus_carry_decodable_actions() {
        for keyboard in [
            InteractionController::tone_menu(),
            InteractionController::mode_menu(),
            InteractionController::followup_menu(),
        ] {
            for button in keyboard.rows.iter().flatten() {
                assert!(
                    MenuAction::parse(&button.callback_data).is_some(),
                    "undecodable payload: {:?}",
                    button.callback_data
                );
            }
        }
    }
}
