use std::sync::Arc;

use corrector_core::{
    completion::port::CompletionPort, config::Config, controller::InteractionController,
    session::SessionStore,
};
use corrector_openrouter::OpenRouterClient;

#[tokio::main]
async fn main() -> Result<(), corrector_core::Error> {
    corrector_core::logging::init("corrector");

    let cfg = Arc::new(Config::load()?);

    let client = OpenRouterClient::new(&cfg);
    if !client.is_configured() {
        tracing::warn!(
            "OPENROUTER_API_KEY is not set; corrections will answer with a service-unavailable notice"
        );
    }
    let completion: Arc<dyn CompletionPort> = Arc::new(client);

    let sessions = Arc::new(SessionStore::new());
    let controller = Arc::new(InteractionController::new(
        cfg.clone(),
        sessions,
        completion,
    ));

    corrector_telegram::router::run_polling(cfg, controller)
        .await
        .map_err(|e| corrector_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
