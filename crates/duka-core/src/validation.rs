//! # Validation Module
//!
//! Input validation and normalization utilities for Duka POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Operator input (free text / number fields)                   │
//! │  ├── Quantities may arrive fractional → floored here                   │
//! │  ├── Prices may arrive with sub-cent noise → rounded here              │
//! │  └── Phone numbers arrive in any local format → normalized here        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart operations (cart.rs / register.rs)                      │
//! │  ├── Quantity ceilings clamp against availability                      │
//! │  └── Invalid prices are ignored, previous price kept                   │
//! │                                                                         │
//! │  ONLY the phone number produces a hard error: an STK push to a bad     │
//! │  number cannot be silently corrected, so it is rejected before any     │
//! │  backend call is made.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use duka_core::validation::{validate_mpesa_phone, quantity_from_input};
//!
//! // Normalize and validate before sending an STK push
//! let phone = validate_mpesa_phone("0712 345 678").unwrap();
//! assert_eq!(phone, "+254712345678");
//!
//! // Floor fractional quantity input
//! assert_eq!(quantity_from_input(2.9), 2);
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;

// =============================================================================
// Phone Numbers
// =============================================================================

/// Normalizes free-text phone input to international format.
///
/// ## Behavior
/// Strips spaces, dashes, and everything else that is not a digit, then
/// maps the common Kenyan entry formats onto `+254...`:
///
/// | Input              | Output           |
/// |--------------------|------------------|
/// | `0712 345 678`     | `+254712345678`  |
/// | `712345678`        | `+254712345678`  |
/// | `254712345678`     | `+254712345678`  |
/// | `+254 712 345678`  | `+254712345678`  |
/// | `""` / `"  "`      | `""`             |
///
/// Anything else keeps its digits with a `+` prefix, so an obviously
/// foreign number still round-trips visibly instead of being mangled.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return String::new();
    }

    if has_plus {
        return format!("+{}", digits);
    }

    if let Some(rest) = digits.strip_prefix('0') {
        return format!("+254{}", rest);
    }

    if digits.starts_with("254") {
        return format!("+{}", digits);
    }

    if digits.starts_with('7') {
        return format!("+254{}", digits);
    }

    format!("+{}", digits)
}

/// Checks whether a normalized number is a valid M-Pesa target.
///
/// Valid means `+2547` followed by exactly 8 digits (a Kenyan Safaricom
/// mobile line, 13 characters total).
pub fn is_valid_mpesa_phone(normalized: &str) -> bool {
    let Some(rest) = normalized.strip_prefix("+2547") else {
        return false;
    };
    rest.len() == 8 && rest.chars().all(|c| c.is_ascii_digit())
}

/// Normalizes raw phone input and validates it for M-Pesa.
///
/// ## Returns
/// The normalized `+2547XXXXXXXX` form on success.
///
/// ## Errors
/// - [`ValidationError::Required`] if the input has no digits at all
/// - [`ValidationError::InvalidPhoneNumber`] otherwise, carrying the
///   normalized form that failed the check
///
/// ## Example
/// ```rust
/// use duka_core::validation::validate_mpesa_phone;
///
/// assert_eq!(validate_mpesa_phone("0712345678").unwrap(), "+254712345678");
/// assert!(validate_mpesa_phone("123").is_err());
/// ```
pub fn validate_mpesa_phone(raw: &str) -> ValidationResult<String> {
    let normalized = normalize_phone(raw);

    if normalized.is_empty() {
        return Err(ValidationError::Required {
            field: "phone number".to_string(),
        });
    }

    if !is_valid_mpesa_phone(&normalized) {
        return Err(ValidationError::InvalidPhoneNumber { normalized });
    }

    Ok(normalized)
}

// =============================================================================
// Numeric Input
// =============================================================================

/// Converts operator quantity input to a whole number of units.
///
/// ## Rules
/// - Fractional input is floored (2.9 kg asked for → 2 kg stored)
/// - Negative and non-finite input become 0 (which cart ops treat as
///   "remove the line")
///
/// ## Example
/// ```rust
/// use duka_core::validation::quantity_from_input;
///
/// assert_eq!(quantity_from_input(5.0), 5);
/// assert_eq!(quantity_from_input(2.9), 2);
/// assert_eq!(quantity_from_input(-3.0), 0);
/// assert_eq!(quantity_from_input(f64::NAN), 0);
/// ```
pub fn quantity_from_input(input: f64) -> i64 {
    if !input.is_finite() {
        return 0;
    }
    // `as` saturates, so huge inputs stay representable
    let floored = input.floor() as i64;
    floored.max(0)
}

/// Converts operator price input (in shillings) to Money.
///
/// ## Rules
/// - Rounded to the nearest cent (80.006 → KSh 80.01)
/// - Zero, negative, and non-finite input are rejected with `None`; the
///   caller keeps the previous price (forgiving data entry, not an error)
///
/// ## Example
/// ```rust
/// use duka_core::validation::price_from_input;
/// use duka_core::money::Money;
///
/// assert_eq!(price_from_input(80.0), Some(Money::from_cents(8000)));
/// assert_eq!(price_from_input(0.0), None);
/// assert_eq!(price_from_input(-5.0), None);
/// ```
pub fn price_from_input(input: f64) -> Option<Money> {
    if !input.is_finite() {
        return None;
    }
    let cents = (input * 100.0).round() as i64;
    if cents <= 0 {
        return None;
    }
    Some(Money::from_cents(cents))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_local_formats() {
        assert_eq!(normalize_phone("0712345678"), "+254712345678");
        assert_eq!(normalize_phone("0712 345 678"), "+254712345678");
        assert_eq!(normalize_phone("712345678"), "+254712345678");
        assert_eq!(normalize_phone("254712345678"), "+254712345678");
        assert_eq!(normalize_phone("+254 712-345-678"), "+254712345678");
    }

    #[test]
    fn test_normalize_edge_cases() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("   "), "");
        assert_eq!(normalize_phone("abc"), "");
        // Unknown shapes keep their digits with a plus
        assert_eq!(normalize_phone("123"), "+123");
        assert_eq!(normalize_phone("+44 20 7946 0958"), "+442079460958");
    }

    #[test]
    fn test_is_valid_mpesa_phone() {
        assert!(is_valid_mpesa_phone("+254712345678"));
        assert!(is_valid_mpesa_phone("+254799999999"));

        assert!(!is_valid_mpesa_phone("+25471234567")); // too short
        assert!(!is_valid_mpesa_phone("+2547123456789")); // too long
        assert!(!is_valid_mpesa_phone("+254812345678")); // not a 7xx line
        assert!(!is_valid_mpesa_phone("254712345678")); // missing plus
        assert!(!is_valid_mpesa_phone(""));
    }

    #[test]
    fn test_validate_mpesa_phone() {
        assert_eq!(
            validate_mpesa_phone("0712345678").unwrap(),
            "+254712345678"
        );
        assert_eq!(
            validate_mpesa_phone("  0712 345 678  ").unwrap(),
            "+254712345678"
        );

        assert!(matches!(
            validate_mpesa_phone(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_mpesa_phone("123"),
            Err(ValidationError::InvalidPhoneNumber { .. })
        ));
    }

    #[test]
    fn test_quantity_from_input() {
        assert_eq!(quantity_from_input(5.0), 5);
        assert_eq!(quantity_from_input(2.9), 2);
        assert_eq!(quantity_from_input(0.4), 0);
        assert_eq!(quantity_from_input(-3.0), 0);
        assert_eq!(quantity_from_input(f64::NAN), 0);
        assert_eq!(quantity_from_input(f64::INFINITY), 0);
    }

    #[test]
    fn test_price_from_input() {
        assert_eq!(price_from_input(80.0), Some(Money::from_cents(8000)));
        assert_eq!(price_from_input(80.006), Some(Money::from_cents(8001)));
        assert_eq!(price_from_input(79.994), Some(Money::from_cents(7999)));
        assert_eq!(price_from_input(0.0), None);
        assert_eq!(price_from_input(-5.0), None);
        assert_eq!(price_from_input(f64::NAN), None);
    }
}
