use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::{Mutex, OwnedMutexGuard};

use corrector_core::{
    config::Config, controller::InteractionController, messaging::port::MessagingPort,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<InteractionController>,
    pub messenger: Arc<dyn MessagingPort>,
    pub user_locks: Arc<UserLocks>,
}

/// Keyed mutex map: back-to-back updates from one user are handled in
/// order, while different users proceed concurrently.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub async fn lock_user(&self, user_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub async fn run_polling(
    cfg: Arc<Config>,
    controller: Arc<InteractionController>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    if let Ok(me) = bot.get_me().await {
        println!("corrector bot started: @{}", me.username());
    }
    println!("Model: {}", cfg.model);

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));

    let state = Arc::new(AppState {
        controller,
        messenger,
        user_locks: Arc::new(UserLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
