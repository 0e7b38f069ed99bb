//! Error types. Only `AssessError` is ever visible to callers of `assess`;
//! provider and profile errors are absorbed at their boundaries.

use thiserror::Error;

/// Failure of the external evaluator capability.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
  /// No provider configured, or the provider refused the call.
  #[error("evaluator unavailable: {0}")]
  Unavailable(String),

  /// Provider answered with a non-success HTTP status.
  #[error("evaluator HTTP {status}: {message}")]
  Http { status: u16, message: String },

  /// Network or client-level failure.
  #[error("evaluator transport error: {0}")]
  Transport(String),

  /// Reply could not be parsed or failed validation.
  #[error("malformed evaluator reply: {0}")]
  Malformed(String),

  #[error("evaluator timed out after {0} ms")]
  Timeout(u64),
}

/// Failure at the profile storage boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
  #[error("profile for '{user_id}' is corrupt: {reason}")]
  Corrupt { user_id: String, reason: String },

  #[error("profile storage unavailable: {0}")]
  Unavailable(String),
}

/// Configuration loading failure.
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: String,
    #[source]
    source: toml::de::Error,
  },
}

/// Caller-visible failure of `assess`. Provider and storage failures never surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssessError {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// The blocking entry point could not start its runtime.
  #[error("runtime unavailable: {0}")]
  Runtime(String),
}

pub type Result<T> = std::result::Result<T, AssessError>;
