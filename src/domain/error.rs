//! Domain error types and their exit-code mapping.

/// A problem found on a single line of the simulation log.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct LineError {
    pub line: usize,
    pub message: String,
}

impl LineError {
    /// Format the error followed by the offending log text.
    pub fn display_with_context(&self, input: &str) -> String {
        format!("{err}\n  > {input}", err = self, input = input.trim_end())
    }
}

/// Top-level error type for realprices.
#[derive(Debug, thiserror::Error)]
pub enum RealPricesError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price data error in {file}: {reason}")]
    PriceData { file: String, reason: String },

    #[error("no price samples in {file}")]
    EmptyPriceData { file: String },

    #[error("non-finite price at epoch {index}")]
    NonFinitePrice { index: usize },

    #[error(transparent)]
    LogParse(#[from] LineError),

    #[error("epoch {epoch} has no value for series {series}")]
    MissingSeries { epoch: u64, series: String },

    #[error("fetch failed: {reason}")]
    Fetch { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&RealPricesError> for std::process::ExitCode {
    fn from(err: &RealPricesError) -> Self {
        let code: u8 = match err {
            RealPricesError::Io(_) => 1,
            RealPricesError::ConfigParse { .. } | RealPricesError::ConfigInvalid { .. } => 2,
            RealPricesError::PriceData { .. }
            | RealPricesError::EmptyPriceData { .. }
            | RealPricesError::NonFinitePrice { .. } => 3,
            RealPricesError::LogParse(_) => 4,
            RealPricesError::MissingSeries { .. } => 5,
            RealPricesError::Fetch { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
