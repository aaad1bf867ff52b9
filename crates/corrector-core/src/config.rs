use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, Result};

/// Typed configuration for the bot.
///
/// Everything comes from the environment (with `.env` support); the
/// completion endpoint constants default to the OpenRouter free tier the bot
/// was originally deployed against.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,

    // Completion endpoint
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub model: String,
    pub http_referer: Option<String>,
    pub x_title: String,
    pub temperature: f32,
    pub max_completion_tokens: u32,
    pub completion_timeout: Duration,

    // Rate limiting
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        // Optional: without a key the bot still starts, corrections answer
        // with a "service unavailable" notice.
        let openrouter_api_key = env_str("OPENROUTER_API_KEY").and_then(non_empty);

        let openrouter_base_url = env_str("OPENROUTER_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string());
        let model = env_str("OPENROUTER_MODEL")
            .and_then(non_empty)
            .unwrap_or_else(|| "meta-llama/llama-4-maverick:free".to_string());

        // OpenRouter attribution headers.
        let http_referer = env_str("HTTP_REFERER").and_then(non_empty);
        let x_title = env_str("X_TITLE")
            .and_then(non_empty)
            .unwrap_or_else(|| "Custom Text Corrector".to_string());

        // Sampling: strict enough for corrections, clamped to a sane band.
        let temperature = env_f32("COMPLETION_TEMPERATURE")
            .unwrap_or(0.5)
            .clamp(0.0, 1.0);
        let max_completion_tokens = env_u32("COMPLETION_MAX_TOKENS").unwrap_or(500);
        let completion_timeout =
            Duration::from_secs(env_u64("COMPLETION_TIMEOUT_SECS").unwrap_or(30));

        let rate_limit_enabled = env_bool("RATE_LIMIT_ENABLED").unwrap_or(true);
        let rate_limit_requests = env_u32("RATE_LIMIT_REQUESTS").unwrap_or(10);
        let rate_limit_window = Duration::from_secs(env_u64("RATE_LIMIT_WINDOW").unwrap_or(60));

        Ok(Self {
            telegram_bot_token,
            openrouter_api_key,
            openrouter_base_url,
            model,
            http_referer,
            x_title,
            temperature,
            max_completion_tokens,
            completion_timeout,
            rate_limit_enabled,
            rate_limit_requests,
            rate_limit_window,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    env_str(key).map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn env_f32(key: &str) -> Option<f32> {
    env_str(key).and_then(|s| s.trim().parse::<f32>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
