use crate::types::{ProviderFailure, RoutingAttempt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("No providers configured. Provide at least one provider with an API key.")]
    NoProvidersConfigured,
    #[error("messages must not be empty")]
    EmptyMessages,
    #[error("All providers failed: {}", summarize(.failures))]
    AllProvidersFailed {
        attempts: Vec<RoutingAttempt>,
        failures: Vec<ProviderFailure>,
    },
    #[error("Request cancelled after {} attempt(s)", .attempts.len())]
    Cancelled { attempts: Vec<RoutingAttempt> },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Discriminant shared by every `RouterError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterErrorKind {
    NoProvidersConfigured,
    EmptyMessages,
    AllProvidersFailed,
    Cancelled,
    InvalidConfig,
    Serialization,
}

impl RouterError {
    /// Build `AllProvidersFailed` from a trace in which every attempt failed.
    pub fn all_failed(attempts: Vec<RoutingAttempt>) -> Self {
        let failures = attempts
            .iter()
            .map(|a| ProviderFailure {
                provider: a.provider,
                error: a.error.clone().unwrap_or_else(|| "unknown".into()),
            })
            .collect();
        RouterError::AllProvidersFailed { attempts, failures }
    }

    pub fn kind(&self) -> RouterErrorKind {
        match self {
            RouterError::NoProvidersConfigured => RouterErrorKind::NoProvidersConfigured,
            RouterError::EmptyMessages => RouterErrorKind::EmptyMessages,
            RouterError::AllProvidersFailed { .. } => RouterErrorKind::AllProvidersFailed,
            RouterError::Cancelled { .. } => RouterErrorKind::Cancelled,
            RouterError::InvalidConfig(_) => RouterErrorKind::InvalidConfig,
            RouterError::Serialization(_) => RouterErrorKind::Serialization,
        }
    }

    /// Attempts executed before the error surfaced. Empty for non-routing errors.
    pub fn attempts(&self) -> &[RoutingAttempt] {
        match self {
            RouterError::AllProvidersFailed { attempts, .. } | RouterError::Cancelled { attempts } => attempts,
            _ => &[],
        }
    }
}

fn summarize(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.provider, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, RouterError>;
