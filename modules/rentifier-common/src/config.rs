use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Chat transport
    pub telegram_bot_token: String,

    // Per-connector switches
    pub yad2_enabled: bool,
    /// Override for the marketplace gateway base URL (tests, proxies).
    pub yad2_base_url: Option<String>,

    // Job tuning
    pub processor_batch_size: i64,
    /// Wall-clock budget for a single run, enforced by the deadline watchdog.
    pub run_deadline_secs: u64,
}

impl Config {
    /// Load config for the collector (store + connector switches).
    pub fn collector_from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            telegram_bot_token: String::new(),
            yad2_enabled: bool_env("YAD2_ENABLED", true),
            yad2_base_url: env::var("YAD2_BASE_URL").ok(),
            processor_batch_size: 0,
            run_deadline_secs: deadline_env(),
        }
    }

    /// Load config for the processor (store + connector switches, no transport).
    pub fn processor_from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            telegram_bot_token: String::new(),
            yad2_enabled: bool_env("YAD2_ENABLED", true),
            yad2_base_url: env::var("YAD2_BASE_URL").ok(),
            processor_batch_size: env::var("PROCESSOR_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            run_deadline_secs: deadline_env(),
        }
    }

    /// Load config for the notifier (store + chat transport).
    pub fn notifier_from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            telegram_bot_token: required_env("TELEGRAM_BOT_TOKEN"),
            yad2_enabled: false,
            yad2_base_url: None,
            processor_batch_size: 0,
            run_deadline_secs: deadline_env(),
        }
    }

    /// Log the shape of each sensitive value for debugging, never the value.
    pub fn log_redacted(&self) {
        let vars = [
            ("DATABASE_URL", &self.database_url),
            ("TELEGRAM_BOT_TOKEN", &self.telegram_bot_token),
        ];
        for (name, value) in vars {
            if value.is_empty() {
                tracing::info!("{name} = (empty)");
            } else {
                tracing::info!("{name} = ({} chars)", value.len());
            }
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn bool_env(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

fn deadline_env() -> u64 {
    env::var("RUN_DEADLINE_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}
