use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScreenerError {
    /// The provider returned no usable rows, or the request itself failed.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// A close or EMA value that cannot be evaluated (NaN, zero EMA, empty series).
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
