//! # Validation Module
//!
//! Input validation for stock movements and catalog entries.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                   │
//! │  ├── Quantity / location / category parsing                             │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (field rules)                                     │
//! │  ├── Required fields, lengths, positive amounts                         │
//! │  └── Location rules (Vendor is Receive-only)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: processor (stock rules against the Catalog)                   │
//! │  ├── ItemNotFound, InsufficientStock                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                             │
//! │  ├── NOT NULL, UNIQUE(name), CHECK(quantity >= 0)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::types::{FloorLocation, TransactionType};
use crate::{MAX_NAME_LENGTH, MAX_NOTES_LENGTH, MAX_UNIT_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates an item name and returns it trimmed.
///
/// ## Example
/// ```rust
/// use stockroom_core::validation::validate_item_name;
///
/// assert_eq!(validate_item_name("  Tissue Roll ").unwrap(), "Tissue Roll");
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    required_text("item name", name, MAX_NAME_LENGTH)
}

/// Validates the name of the person taking or delivering stock.
pub fn validate_person_name(name: &str) -> ValidationResult<String> {
    required_text("person name", name, MAX_NAME_LENGTH)
}

/// Validates a unit of measure.
pub fn validate_unit(unit: &str) -> ValidationResult<String> {
    required_text("unit", unit, MAX_UNIT_LENGTH)
}

/// Normalizes optional notes: blank becomes `None`.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LENGTH,
        });
    }

    Ok(Some(notes.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a movement amount.
///
/// ## Rules
/// - Must be strictly positive (zero moves nothing)
/// - Must not exceed [`Quantity::MAX`]
///
/// ## Example
/// ```rust
/// use stockroom_core::quantity::Quantity;
/// use stockroom_core::validation::validate_movement_quantity;
///
/// assert!(validate_movement_quantity(Quantity::from_hundredths(1)).is_ok());
/// assert!(validate_movement_quantity(Quantity::zero()).is_err());
/// ```
pub fn validate_movement_quantity(quantity: Quantity) -> ValidationResult<()> {
    if !quantity.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if !quantity.is_within_max() {
        return Err(ValidationError::TooLarge {
            field: "quantity".to_string(),
            max: Quantity::MAX,
        });
    }
    Ok(())
}

/// Validates a stock level (quantity on hand, override target or min level).
///
/// Zero is allowed; [`Quantity::MAX`] is the ceiling.
pub fn validate_stock_level(field: &str, level: Quantity) -> ValidationResult<()> {
    if level.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if !level.is_within_max() {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: Quantity::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Movement Validators
// =============================================================================

/// Validates the movement type accepted by `submit`.
///
/// Adjustments go through the override path and are rejected here.
pub fn validate_submit_kind(kind: TransactionType) -> ValidationResult<()> {
    match kind {
        TransactionType::Issue | TransactionType::Receive => Ok(()),
        TransactionType::Adjustment => Err(ValidationError::not_allowed(
            "type",
            [TransactionType::Issue.as_str(), TransactionType::Receive.as_str()],
        )),
    }
}

/// Validates that `location` may be used for a movement of `kind`.
pub fn validate_location(kind: TransactionType, location: FloorLocation) -> ValidationResult<()> {
    if location.allowed_for(kind) {
        return Ok(());
    }

    let allowed = FloorLocation::ALL
        .into_iter()
        .filter(|l| l.allowed_for(kind))
        .map(|l| l.as_str());
    Err(ValidationError::not_allowed("location", allowed))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_item_name() {
        assert_eq!(validate_item_name("Rice").unwrap(), "Rice");
        assert!(matches!(
            validate_item_name(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_item_name(&"x".repeat(MAX_NAME_LENGTH + 1)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_notes_blank_is_none() {
        assert_eq!(validate_notes(None).unwrap(), None);
        assert_eq!(validate_notes(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_notes(Some(" for lobby ")).unwrap(),
            Some("for lobby".to_string())
        );
        assert!(validate_notes(Some(&"n".repeat(MAX_NOTES_LENGTH + 1))).is_err());
    }

    #[test]
    fn test_validate_quantities() {
        assert!(validate_movement_quantity(Quantity::from_units(3)).is_ok());
        assert!(validate_movement_quantity(Quantity::zero()).is_err());
        assert!(validate_movement_quantity(Quantity::from_units(-1)).is_err());

        assert!(validate_stock_level("quantity", Quantity::zero()).is_ok());
        assert!(matches!(
            validate_stock_level("min level", Quantity::from_hundredths(-1)),
            Err(ValidationError::MustNotBeNegative { .. })
        ));

        let over = Quantity::MAX + Quantity::from_hundredths(1);
        assert!(validate_movement_quantity(Quantity::MAX).is_ok());
        assert!(matches!(
            validate_movement_quantity(over),
            Err(ValidationError::TooLarge { .. })
        ));
        assert!(matches!(
            validate_stock_level("quantity", over),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_submit_kind() {
        assert!(validate_submit_kind(TransactionType::Issue).is_ok());
        assert!(validate_submit_kind(TransactionType::Receive).is_ok());
        assert!(validate_submit_kind(TransactionType::Adjustment).is_err());
    }

    #[test]
    fn test_validate_location() {
        assert!(validate_location(TransactionType::Receive, FloorLocation::Vendor).is_ok());
        let err = validate_location(TransactionType::Issue, FloorLocation::Vendor).unwrap_err();
        match err {
            ValidationError::NotAllowed { field, allowed } => {
                assert_eq!(field, "location");
                assert_eq!(allowed.len(), 6);
                assert!(!allowed.contains(&"Vendor".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
