//! # Checkout Error Types
//!
//! Error types for the checkout engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Flow Misuse   │  │     Input       │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  NoActiveFlow   │  │  Validation     │  │  InvalidConfig          │ │
//! │  │  UnexpectedStage│  │  (phone rules)  │  │  ConfigLoadFailed       │ │
//! │  │  CommitInFlight │  │                 │  │  ConfigSaveFailed       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │    Backend      │   Note: a DECLINED sale is not an error. It is   │
//! │  │                 │   a flow transition to the failure stage. Only   │
//! │  │  Backend(msg)   │   transport-level trouble surfaces here.         │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use duka_core::ValidationError;
use thiserror::Error;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Checkout error type covering flow misuse, input, backend transport, and
/// configuration failures.
///
/// ## Design Principles
/// - Flow misuse variants carry the stage so callers can resynchronize
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum CheckoutError {
    // =========================================================================
    // Flow Misuse Errors
    // =========================================================================
    /// A flow operation was called with no checkout in progress.
    #[error("No payment flow is in progress")]
    NoActiveFlow,

    /// A flow operation was called at the wrong stage.
    #[error("Flow is at the '{actual}' stage, operation requires '{expected}'")]
    UnexpectedStage { expected: String, actual: String },

    /// A commit is already on its way to the backend.
    #[error("A sale commit is already in flight")]
    CommitInFlight,

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Operator input failed validation (phone number rules).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The catalog or commit backend could not be reached.
    #[error("Backend request failed: {0}")]
    Backend(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid checkout configuration.
    #[error("Invalid checkout configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for CheckoutError {
    fn from(err: std::io::Error) -> Self {
        CheckoutError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CheckoutError {
    fn from(err: toml::de::Error) -> Self {
        CheckoutError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CheckoutError {
    fn from(err: toml::ser::Error) -> Self {
        CheckoutError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CheckoutError {
    /// Returns true if this error means the operator drove the flow out of
    /// order (wrong stage, no flow, double submit). The UI recovers by
    /// re-reading the engine status rather than showing a failure screen.
    pub fn is_flow_error(&self) -> bool {
        matches!(
            self,
            CheckoutError::NoActiveFlow
                | CheckoutError::UnexpectedStage { .. }
                | CheckoutError::CommitInFlight
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CheckoutError::InvalidConfig(_)
                | CheckoutError::ConfigLoadFailed(_)
                | CheckoutError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the operator can fix this by correcting their input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, CheckoutError::Validation(_))
    }
}
