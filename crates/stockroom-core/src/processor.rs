//! # Stock Update Processor (pure steps)
//!
//! Validation and local application of stock movements. The async entry
//! point that talks to the store lives in `stockroom-engine`; everything it
//! decides is decided here, without I/O.
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SubmitRequest ──► validate_submission(&Snapshot) ──► TransactionDraft  │
//! │                          │                                  │           │
//! │                          │ ValidationError /                │ store     │
//! │                          │ ItemNotFound /                   │ commit    │
//! │                          │ InsufficientStock                ▼           │
//! │                          ▼                           CommitReceipt      │
//! │                    (nothing changed)                        │           │
//! │                                                             ▼           │
//! │                               Snapshot::with_commit(draft, receipt)     │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                         (new Snapshot, Transaction)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Snapshot` is immutable: applying a commit produces a new one and
//! leaves the original as it was.

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::ledger::Ledger;
use crate::quantity::Quantity;
use crate::types::{
    CommitReceipt, Item, OverrideRequest, SubmitRequest, Transaction, TransactionDraft,
    TransactionType,
};
use crate::validation::{
    validate_item_name, validate_location, validate_movement_quantity, validate_notes,
    validate_person_name, validate_stock_level, validate_submit_kind, validate_unit,
};

// =============================================================================
// Snapshot
// =============================================================================

/// A consistent Catalog + Ledger pair as of one point in a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    catalog: Catalog,
    ledger: Ledger,
}

impl Snapshot {
    /// Builds a snapshot from what the store returned.
    pub fn new(items: Vec<Item>, transactions: Vec<Transaction>) -> CoreResult<Self> {
        Ok(Snapshot {
            catalog: Catalog::from_items(items)?,
            ledger: Ledger::from_transactions(transactions)?,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn items(&self) -> &[Item] {
        self.catalog.list()
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.entries()
    }

    /// Applies a committed draft and returns the next snapshot.
    ///
    /// ```text
    /// Issue       apply_delta(-q)
    /// Receive     apply_delta(+q), or insert when the item is new
    /// Adjustment  set_quantity(q)
    /// ```
    ///
    /// The Ledger entry carries the id and timestamp from `receipt`.
    pub fn with_commit(
        &self,
        draft: &TransactionDraft,
        receipt: &CommitReceipt,
    ) -> CoreResult<(Snapshot, Transaction)> {
        let mut next = self.clone();

        match draft.kind {
            TransactionType::Issue => {
                next.catalog.apply_delta(&draft.item_name, -draft.quantity)?;
            }
            TransactionType::Receive if !next.catalog.contains(&draft.item_name) => {
                next.catalog.insert(Item {
                    id: receipt.item_id.clone(),
                    name: draft.item_name.clone(),
                    category: draft.category_hint.unwrap_or_default(),
                    quantity: draft.quantity,
                    unit: draft.unit.clone(),
                    min_level: Quantity::zero(),
                })?;
            }
            TransactionType::Receive => {
                next.catalog.apply_delta(&draft.item_name, draft.quantity)?;
            }
            TransactionType::Adjustment => {
                next.catalog.set_quantity(&draft.item_name, draft.quantity)?;
            }
        }

        let tx = Transaction::from_draft(draft, receipt);
        next.ledger.append(tx.clone())?;
        Ok((next, tx))
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validates an Issue or Receive against the snapshot.
///
/// ## Rules
/// - Required fields present, `quantity > 0`
/// - Issue: item must exist and `quantity <= item.quantity`
/// - Issue: `Vendor` is not a valid location
/// - Receive: item may be unknown, but then `unit` is required
///
/// ## Example
/// ```rust
/// use stockroom_core::processor::{validate_submission, Snapshot};
/// use stockroom_core::quantity::Quantity;
/// use stockroom_core::types::{FloorLocation, SubmitRequest, TransactionType};
/// use stockroom_core::CoreError;
///
/// let snapshot = Snapshot::default();
/// let request = SubmitRequest {
///     kind: TransactionType::Issue,
///     item_name: "Tissue Roll".into(),
///     quantity: Quantity::from_units(1),
///     unit: None,
///     location: FloorLocation::Basement,
///     person_name: "Asha".into(),
///     notes: None,
///     category_hint: None,
/// };
/// assert!(matches!(
///     validate_submission(&snapshot, &request),
///     Err(CoreError::ItemNotFound(_))
/// ));
/// ```
pub fn validate_submission(
    snapshot: &Snapshot,
    request: &SubmitRequest,
) -> CoreResult<TransactionDraft> {
    validate_submit_kind(request.kind)?;
    let item_name = validate_item_name(&request.item_name)?;
    validate_movement_quantity(request.quantity)?;
    validate_location(request.kind, request.location)?;
    let person_name = validate_person_name(&request.person_name)?;
    let notes = validate_notes(request.notes.as_deref())?;

    let existing = snapshot.catalog.get(&item_name);

    let (unit, category_hint) = match (request.kind, existing) {
        (TransactionType::Issue, None) => return Err(CoreError::ItemNotFound(item_name)),
        (TransactionType::Issue, Some(item)) => {
            if request.quantity > item.quantity {
                return Err(CoreError::InsufficientStock {
                    item: item.name.clone(),
                    unit: item.unit.clone(),
                    available: item.quantity,
                    requested: request.quantity,
                });
            }
            (item.unit.clone(), None)
        }
        (_, Some(item)) => {
            if item.quantity.checked_stock_add(request.quantity).is_none() {
                return Err(CoreError::ExceedsMaximum {
                    item: item.name.clone(),
                    unit: item.unit.clone(),
                    current: item.quantity,
                    requested: request.quantity,
                });
            }
            (item.unit.clone(), None)
        }
        (_, None) => {
            let unit = validate_unit(request.unit.as_deref().unwrap_or_default())?;
            (unit, Some(request.category_hint.unwrap_or_default()))
        }
    };

    Ok(TransactionDraft {
        kind: request.kind,
        item_name,
        quantity: request.quantity,
        unit,
        location: Some(request.location),
        person_name,
        notes,
        previous_quantity: None,
        category_hint,
    })
}

/// Validates a direct quantity correction and turns it into an
/// Adjustment draft.
///
/// The draft's `quantity` is the new level and `previous_quantity` the
/// level currently in the snapshot.
pub fn validate_override(
    snapshot: &Snapshot,
    request: &OverrideRequest,
) -> CoreResult<TransactionDraft> {
    let item_name = validate_item_name(&request.item_name)?;
    let person_name = validate_person_name(&request.person_name)?;
    let notes = validate_notes(request.notes.as_deref())?;

    let item = snapshot.catalog.lookup(&item_name)?;
    if request.new_quantity.is_negative() {
        return Err(CoreError::InvalidQuantity {
            item: item.name.clone(),
            value: request.new_quantity,
        });
    }
    validate_stock_level("quantity", request.new_quantity)?;

    Ok(TransactionDraft {
        kind: TransactionType::Adjustment,
        item_name,
        quantity: request.new_quantity,
        unit: item.unit.clone(),
        location: None,
        person_name,
        notes,
        previous_quantity: Some(item.quantity),
        category_hint: None,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, FloorLocation};
    use chrono::{TimeZone, Utc};

    fn tissue_snapshot() -> Snapshot {
        Snapshot::new(
            vec![Item {
                id: "HK-001".to_string(),
                name: "Tissue Roll".to_string(),
                category: Category::Housekeeping,
                quantity: Quantity::from_units(10),
                unit: "pcs".to_string(),
                min_level: Quantity::from_units(5),
            }],
            vec![],
        )
        .unwrap()
    }

    fn issue(units: i64) -> SubmitRequest {
        SubmitRequest {
            kind: TransactionType::Issue,
            item_name: "Tissue Roll".to_string(),
            quantity: Quantity::from_units(units),
            unit: None,
            location: FloorLocation::GroundFloor,
            person_name: "Asha".to_string(),
            notes: None,
            category_hint: None,
        }
    }

    fn receipt(n: u32) -> CommitReceipt {
        CommitReceipt {
            transaction_id: format!("tx-{n}"),
            recorded_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, n, 0).unwrap(),
            item_id: "HK-001".to_string(),
        }
    }

    fn commit(snapshot: &Snapshot, request: &SubmitRequest, n: u32) -> CoreResult<Snapshot> {
        let draft = validate_submission(snapshot, request)?;
        let (next, _) = snapshot.with_commit(&draft, &receipt(n))?;
        Ok(next)
    }

    #[test]
    fn test_tissue_roll_scenario() {
        let s0 = tissue_snapshot();

        let s1 = commit(&s0, &issue(3), 1).unwrap();
        let tissue = s1.catalog().lookup("Tissue Roll").unwrap();
        assert_eq!(tissue.quantity, Quantity::from_units(7));
        assert!(!tissue.is_low_stock());

        let s2 = commit(&s1, &issue(5), 2).unwrap();
        let tissue = s2.catalog().lookup("Tissue Roll").unwrap();
        assert_eq!(tissue.quantity, Quantity::from_units(2));
        assert!(tissue.is_low_stock());
        assert_eq!(s2.ledger().len(), 2);

        let err = validate_submission(&s2, &issue(3)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                item: "Tissue Roll".to_string(),
                unit: "pcs".to_string(),
                available: Quantity::from_units(2),
                requested: Quantity::from_units(3),
            }
        );
        assert_eq!(
            s2.catalog().lookup("Tissue Roll").unwrap().quantity,
            Quantity::from_units(2)
        );
        assert_eq!(s2.ledger().len(), 2);
    }

    #[test]
    fn test_with_commit_leaves_original_untouched() {
        let s0 = tissue_snapshot();
        let s1 = commit(&s0, &issue(4), 1).unwrap();
        assert_eq!(
            s0.catalog().lookup("Tissue Roll").unwrap().quantity,
            Quantity::from_units(10)
        );
        assert!(s0.ledger().is_empty());
        assert_eq!(s1.transactions()[0].id, "tx-1");
    }

    #[test]
    fn test_issue_uses_item_unit() {
        let mut request = issue(1);
        request.unit = Some("boxes".to_string());
        let draft = validate_submission(&tissue_snapshot(), &request).unwrap();
        assert_eq!(draft.unit, "pcs");
        assert_eq!(draft.category_hint, None);
    }

    #[test]
    fn test_issue_to_vendor_rejected() {
        let mut request = issue(1);
        request.location = FloorLocation::Vendor;
        assert!(matches!(
            validate_submission(&tissue_snapshot(), &request),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut request = issue(1);
        request.person_name = "  ".to_string();
        assert!(matches!(
            validate_submission(&tissue_snapshot(), &request),
            Err(CoreError::Validation(_))
        ));

        assert!(matches!(
            validate_submission(&tissue_snapshot(), &issue(0)),
            Err(CoreError::Validation(_))
        ));

        let mut request = issue(1);
        request.kind = TransactionType::Adjustment;
        assert!(validate_submission(&tissue_snapshot(), &request).is_err());
    }

    #[test]
    fn test_receive_onboards_unknown_item() {
        let s0 = tissue_snapshot();
        let request = SubmitRequest {
            kind: TransactionType::Receive,
            item_name: "Cooking Oil".to_string(),
            quantity: Quantity::parse("2.5").unwrap(),
            unit: Some("l".to_string()),
            location: FloorLocation::Vendor,
            person_name: "Ravi".to_string(),
            notes: Some("monthly order".to_string()),
            category_hint: Some(Category::Pantry),
        };

        let draft = validate_submission(&s0, &request).unwrap();
        assert_eq!(draft.category_hint, Some(Category::Pantry));

        let mut r = receipt(1);
        r.item_id = "PT-009".to_string();
        let (s1, tx) = s0.with_commit(&draft, &r).unwrap();
        let oil = s1.catalog().lookup("Cooking Oil").unwrap();
        assert_eq!(oil.id, "PT-009");
        assert_eq!(oil.category, Category::Pantry);
        assert_eq!(oil.quantity, Quantity::from_hundredths(250));
        assert!(oil.min_level.is_zero());
        assert_eq!(tx.notes.as_deref(), Some("monthly order"));
    }

    #[test]
    fn test_receive_of_unknown_item_requires_unit() {
        let request = SubmitRequest {
            kind: TransactionType::Receive,
            item_name: "Mop".to_string(),
            quantity: Quantity::from_units(1),
            unit: None,
            location: FloorLocation::Vendor,
            person_name: "Ravi".to_string(),
            notes: None,
            category_hint: None,
        };
        assert!(matches!(
            validate_submission(&tissue_snapshot(), &request),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_override_becomes_adjustment() {
        let s0 = tissue_snapshot();
        let request = OverrideRequest {
            item_name: "Tissue Roll".to_string(),
            new_quantity: Quantity::from_units(4),
            person_name: "Admin".to_string(),
            notes: Some("stock count".to_string()),
        };

        let draft = validate_override(&s0, &request).unwrap();
        assert_eq!(draft.kind, TransactionType::Adjustment);
        assert_eq!(draft.previous_quantity, Some(Quantity::from_units(10)));
        assert_eq!(draft.location, None);

        let (s1, tx) = s0.with_commit(&draft, &receipt(1)).unwrap();
        assert_eq!(
            s1.catalog().lookup("Tissue Roll").unwrap().quantity,
            Quantity::from_units(4)
        );
        assert_eq!(tx.kind, TransactionType::Adjustment);
        assert_eq!(s1.ledger().replay(s0.catalog()).unwrap(), *s1.catalog());
    }

    #[test]
    fn test_override_rejects_negative() {
        let request = OverrideRequest {
            item_name: "Tissue Roll".to_string(),
            new_quantity: Quantity::from_units(-1),
            person_name: "Admin".to_string(),
            notes: None,
        };
        assert!(matches!(
            validate_override(&tissue_snapshot(), &request),
            Err(CoreError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_receive_past_max_rejected_locally() {
        let s0 = Snapshot::new(
            vec![Item {
                id: "HK-001".to_string(),
                name: "Tissue Roll".to_string(),
                category: Category::Housekeeping,
                quantity: Quantity::MAX - Quantity::from_hundredths(10),
                unit: "pcs".to_string(),
                min_level: Quantity::from_units(5),
            }],
            vec![],
        )
        .unwrap();
        let receive = SubmitRequest {
            kind: TransactionType::Receive,
            location: FloorLocation::Vendor,
            quantity: Quantity::from_units(1),
            ..issue(1)
        };

        assert_eq!(
            validate_submission(&s0, &receive).unwrap_err(),
            CoreError::ExceedsMaximum {
                item: "Tissue Roll".to_string(),
                unit: "pcs".to_string(),
                current: Quantity::MAX - Quantity::from_hundredths(10),
                requested: Quantity::from_units(1),
            }
        );

        let topped_up = SubmitRequest {
            quantity: Quantity::from_hundredths(10),
            ..receive
        };
        let s1 = commit(&s0, &topped_up, 1).unwrap();
        assert_eq!(s1.catalog().lookup("Tissue Roll").unwrap().quantity, Quantity::MAX);
    }

    #[test]
    fn test_override_rejects_above_max() {
        let request = OverrideRequest {
            item_name: "Tissue Roll".to_string(),
            new_quantity: Quantity::MAX + Quantity::from_hundredths(1),
            person_name: "Admin".to_string(),
            notes: None,
        };
        assert!(matches!(
            validate_override(&tissue_snapshot(), &request),
            Err(CoreError::Validation(crate::error::ValidationError::TooLarge { .. }))
        ));
    }
}
