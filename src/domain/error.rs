//! Domain error types.

/// Top-level error type for tsemovers.
#[derive(Debug, thiserror::Error)]
pub enum MoversError {
    #[error("failed to load company list {path}: {reason}")]
    CompanyFile { path: String, reason: String },

    #[error("company list {path} has no '{column}' column")]
    MissingColumn { path: String, column: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("provider error for {identifier}: {reason}")]
    Provider { identifier: String, reason: String },

    #[error("insufficient data for {identifier}: have {bars} trading days, need {minimum}")]
    InsufficientBars {
        identifier: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid prices for {identifier}: {reason}")]
    InvalidPrices { identifier: String, reason: String },

    #[error("results file {path}: {reason}")]
    ResultsFile { path: String, reason: String },

    #[error("failed to render {path}: {reason}")]
    Render { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MoversError> for std::process::ExitCode {
    fn from(err: &MoversError) -> Self {
        let code: u8 = match err {
            MoversError::Io(_) => 1,
            MoversError::CompanyFile { .. } | MoversError::MissingColumn { .. } => 2,
            MoversError::ConfigParse { .. } | MoversError::ConfigInvalid { .. } => 3,
            MoversError::ResultsFile { .. } => 4,
            MoversError::Render { .. } => 5,
            MoversError::Provider { .. }
            | MoversError::InsufficientBars { .. }
            | MoversError::InvalidPrices { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(err: &MoversError) -> String {
        format!("{:?}", std::process::ExitCode::from(err))
    }

    #[test]
    fn exit_codes_by_category() {
        let missing = MoversError::MissingColumn {
            path: "data.csv".into(),
            column: "コード".into(),
        };
        assert_eq!(code_of(&missing), format!("{:?}", std::process::ExitCode::from(2)));

        let render = MoversError::Render {
            path: "top10_tse_table.png".into(),
            reason: "Not a directory".into(),
        };
        assert_eq!(code_of(&render), format!("{:?}", std::process::ExitCode::from(5)));

        let provider = MoversError::Provider {
            identifier: "7203.T".into(),
            reason: "HTTP 404".into(),
        };
        assert_eq!(code_of(&provider), format!("{:?}", std::process::ExitCode::from(6)));
    }

    #[test]
    fn insufficient_bars_message_names_ticker() {
        let err = MoversError::InsufficientBars {
            identifier: "9984.T".into(),
            bars: 3,
            minimum: 4,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for 9984.T: have 3 trading days, need 4"
        );
    }
}
