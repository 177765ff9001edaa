use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrainedMlError>;

/// Errors raised by loaders, models, the benchmark runner and the plotting layer.
#[derive(Debug, Error)]
pub enum TrainedMlError {
    #[error("unknown model '{name}'; available models: {available}")]
    UnknownModel { name: String, available: String },

    #[error("unknown dataset '{0}'; use a known dataset name (iris, wine) or a url with a target column")]
    UnknownDataset(String),

    #[error("a target column is required when loading from {location}")]
    MissingTarget { location: String },

    #[error("target column '{target}' not found; available columns: {available}")]
    TargetNotFound { target: String, available: String },

    #[error("invalid `{argument}`: unknown column '{column}'")]
    UnknownColumn { argument: &'static str, column: String },

    #[error("invalid `{argument}`: {reason}")]
    InvalidParameter { argument: &'static str, reason: String },

    #[error("unsupported figure backend '{0}'; expected one of: html, json")]
    UnsupportedBackend(String),

    #[error("model '{model}' is a {expected} model but the target requires {found}")]
    TaskMismatch {
        model: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("fetch cache used before initialization; call cache::init_global first")]
    CacheNotInitialized,

    #[error("failed to fetch data from {location}: {message}")]
    Fetch { location: String, message: String },

    #[error("failed to parse data from {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: csv::Error,
    },

    #[error("model '{model}' must be fitted before calling {operation}")]
    NotFitted {
        model: String,
        operation: &'static str,
    },

    #[error("estimator '{model}' failed: {message}")]
    Estimator { model: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrainedMlError {
    /// True for mistakes in names, columns or parameters supplied by the caller.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            TrainedMlError::UnknownModel { .. }
                | TrainedMlError::UnknownDataset(_)
                | TrainedMlError::MissingTarget { .. }
                | TrainedMlError::TargetNotFound { .. }
                | TrainedMlError::UnknownColumn { .. }
                | TrainedMlError::InvalidParameter { .. }
                | TrainedMlError::UnsupportedBackend(_)
                | TrainedMlError::TaskMismatch { .. }
                | TrainedMlError::CacheNotInitialized
        )
    }

    pub(crate) fn invalid(argument: &'static str, reason: impl Into<String>) -> Self {
        TrainedMlError::InvalidParameter {
            argument,
            reason: reason.into(),
        }
    }

    pub(crate) fn estimator(model: &str, err: impl std::fmt::Display) -> Self {
        TrainedMlError::Estimator {
            model: model.to_string(),
            message: err.to_string(),
        }
    }
}
