//! # Error Types
//!
//! Domain-specific error types for duka-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  duka-core errors (this file)                                          │
//! │  └── ValidationError  - Input validation failures (phone numbers)      │
//! │                                                                         │
//! │  duka-checkout errors (separate crate)                                 │
//! │  └── CheckoutError    - Engine/config/backend failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CheckoutError → caller                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (the offending value)
//! 3. Errors are enum variants, never String
//! 4. Forgiving data entry never errors: bad quantities clamp, bad prices
//!    are ignored, unknown item ids no-op. Only phone validation (and, one
//!    crate up, misuse of the flow API) is worth an `Err`.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for the one input that cannot be silently corrected: the M-Pesa
/// phone number. An invalid number must stop the STK push before any
/// backend call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The phone number does not normalize to a Kenyan mobile number.
    ///
    /// Valid M-Pesa numbers normalize to `+2547` followed by 8 digits
    /// ("+254712345678"). The offending normalized form is included so
    /// the operator can see what was actually checked.
    #[error("'{normalized}' is not a valid M-Pesa number (expected +2547XXXXXXXX)")]
    InvalidPhoneNumber { normalized: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ValidationError.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "phone number".to_string(),
        };
        assert_eq!(err.to_string(), "phone number is required");

        let err = ValidationError::InvalidPhoneNumber {
            normalized: "+123".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'+123' is not a valid M-Pesa number (expected +2547XXXXXXXX)"
        );
    }
}
