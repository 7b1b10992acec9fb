/// Runtime configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV file with `timestamp,open,high,low,close,volume` rows.
    pub bars_csv_path: String,
    pub symbol: String,

    // Account
    pub initial_balance: f64,
    pub max_risk_per_trade: f64,

    /// Optional TOML file selecting the strategy set. `None` = all ten.
    pub strategy_config_path: Option<String>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing or malformed variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let max_risk_per_trade = parsed_env("MAX_RISK_PER_TRADE", 0.02);
        if !(max_risk_per_trade > 0.0 && max_risk_per_trade <= 1.0) {
            panic!("MAX_RISK_PER_TRADE must be in (0, 1], got {max_risk_per_trade}");
        }

        let initial_balance = parsed_env("INITIAL_BALANCE", 10_000.0);
        if !(initial_balance >= 0.0) {
            panic!("INITIAL_BALANCE must be non-negative, got {initial_balance}");
        }

        Config {
            bars_csv_path: required_env("BARS_CSV_PATH"),
            symbol: optional_env("SYMBOL").unwrap_or_else(|| "SOL".to_string()),
            initial_balance,
            max_risk_per_trade,
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH"),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env(key: &str, default: f64) -> f64 {
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number, got '{raw}'")),
        None => default,
    }
}
