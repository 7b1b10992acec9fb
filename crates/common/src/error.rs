use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("insufficient balance: need {required:.4}, have {available:.4}")]
    InsufficientBalance { required: f64, available: f64 },

    #[error("a position for '{symbol}' is already open")]
    PositionAlreadyOpen { symbol: String },

    #[error("no open position for '{symbol}'")]
    PositionNotFound { symbol: String },

    #[error("position size must be positive, got {size}")]
    InvalidSize { size: f64 },

    #[error("price must be positive and finite, got {price}")]
    InvalidPrice { price: f64 },

    #[error("unknown account '{account}'")]
    AccountNotFound { account: String },

    #[error("account '{account}' already exists")]
    AccountExists { account: String },

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
