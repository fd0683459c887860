//! # Transaction Ledger
//!
//! Append-only history of committed stock movements.
//!
//! ## Replay
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  opening Catalog ──► replay(entries by date) ──► current Catalog        │
//! │                                                                         │
//! │  Issue       quantity -= q                                              │
//! │  Receive     quantity += q   (unknown item: onboarded, min level 0)     │
//! │  Adjustment  quantity  = q                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries are never mutated or removed. Ids are unique.

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::types::{Category, Item, Transaction, TransactionType};

/// Ordered collection of committed Transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<Transaction>,
    ids: HashSet<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Builds a Ledger from transactions as fetched from the store.
    pub fn from_transactions(transactions: Vec<Transaction>) -> CoreResult<Self> {
        let mut ledger = Ledger::new();
        for tx in transactions {
            ledger.append(tx)?;
        }
        Ok(ledger)
    }

    /// Appends a committed Transaction.
    ///
    /// ## Errors
    /// - `DuplicateTransaction` if the id is already recorded
    pub fn append(&mut self, tx: Transaction) -> CoreResult<&Transaction> {
        if !self.ids.insert(tx.id.clone()) {
            return Err(CoreError::DuplicateTransaction(tx.id));
        }
        self.entries.push(tx);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Entries in the order they were recorded locally.
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        if !self.ids.contains(id) {
            return None;
        }
        self.entries.iter().find(|tx| tx.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replays every entry, oldest first, on top of `opening`.
    ///
    /// Entries with equal dates keep their recorded order. A Receive for
    /// an item the Catalog does not know onboards it as a Housekeeping
    /// item with min level 0, using the item name as its id.
    ///
    /// ## Errors
    /// Any Catalog error raised while applying an entry (an Issue against
    /// an unknown item, a level going negative).
    pub fn replay(&self, opening: &Catalog) -> CoreResult<Catalog> {
        let mut catalog = opening.clone();

        let mut ordered: Vec<&Transaction> = self.entries.iter().collect();
        ordered.sort_by_key(|tx| tx.date);

        for tx in ordered {
            match tx.kind {
                TransactionType::Receive if !catalog.contains(&tx.item_name) => {
                    catalog.insert(Item {
                        id: tx.item_name.clone(),
                        name: tx.item_name.clone(),
                        category: Category::default(),
                        quantity: tx.quantity,
                        unit: tx.unit.clone(),
                        min_level: Default::default(),
                    })?;
                }
                TransactionType::Issue | TransactionType::Receive => {
                    let current = catalog.lookup(&tx.item_name)?.quantity;
                    catalog.apply_delta(&tx.item_name, tx.delta_from(current))?;
                }
                TransactionType::Adjustment => {
                    catalog.set_quantity(&tx.item_name, tx.quantity)?;
                }
            }
        }

        Ok(catalog)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use crate::types::FloorLocation;
    use chrono::{TimeZone, Utc};

    fn tx(id: &str, kind: TransactionType, item: &str, units: i64, minute: u32) -> Transaction {
        Transaction {
            id: id.to_string(),
            kind,
            item_name: item.to_string(),
            quantity: Quantity::from_units(units),
            unit: "pcs".to_string(),
            location: match kind {
                TransactionType::Adjustment => None,
                TransactionType::Receive => Some(FloorLocation::Vendor),
                TransactionType::Issue => Some(FloorLocation::FirstFloor),
            },
            person_name: "Meena".to_string(),
            notes: None,
            previous_quantity: None,
            date: Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0).unwrap(),
        }
    }

    fn opening() -> Catalog {
        Catalog::from_items(vec![Item {
            id: "HK-001".to_string(),
            name: "Tissue Roll".to_string(),
            category: Category::Housekeeping,
            quantity: Quantity::from_units(10),
            unit: "pcs".to_string(),
            min_level: Quantity::from_units(5),
        }])
        .unwrap()
    }

    #[test]
    fn test_append_rejects_duplicate_ids() {
        let mut ledger = Ledger::new();
        ledger
            .append(tx("t1", TransactionType::Issue, "Tissue Roll", 1, 0))
            .unwrap();
        let err = ledger
            .append(tx("t1", TransactionType::Receive, "Tissue Roll", 1, 1))
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateTransaction("t1".to_string()));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get("t1").unwrap().kind, TransactionType::Issue);
    }

    #[test]
    fn test_replay_reproduces_levels() {
        let ledger = Ledger::from_transactions(vec![
            tx("t1", TransactionType::Issue, "Tissue Roll", 3, 0),
            tx("t2", TransactionType::Receive, "Tissue Roll", 5, 1),
            tx("t3", TransactionType::Adjustment, "Tissue Roll", 4, 2),
            tx("t4", TransactionType::Issue, "Tissue Roll", 1, 3),
        ])
        .unwrap();

        let catalog = ledger.replay(&opening()).unwrap();
        assert_eq!(
            catalog.lookup("Tissue Roll").unwrap().quantity,
            Quantity::from_units(3)
        );
    }

    #[test]
    fn test_replay_orders_by_date() {
        // Recorded out of order: the Receive happened first.
        let ledger = Ledger::from_transactions(vec![
            tx("t2", TransactionType::Issue, "Tissue Roll", 12, 5),
            tx("t1", TransactionType::Receive, "Tissue Roll", 5, 1),
        ])
        .unwrap();

        let catalog = ledger.replay(&opening()).unwrap();
        assert_eq!(
            catalog.lookup("Tissue Roll").unwrap().quantity,
            Quantity::from_units(3)
        );
    }

    #[test]
    fn test_replay_onboards_received_item() {
        let ledger =
            Ledger::from_transactions(vec![tx("t1", TransactionType::Receive, "Mop", 2, 0)])
                .unwrap();
        let catalog = ledger.replay(&opening()).unwrap();
        let mop = catalog.lookup("Mop").unwrap();
        assert_eq!(mop.quantity, Quantity::from_units(2));
        assert_eq!(mop.category, Category::Housekeeping);
        assert!(mop.min_level.is_zero());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_replay_surfaces_issue_of_unknown_item() {
        let ledger =
            Ledger::from_transactions(vec![tx("t1", TransactionType::Issue, "Mop", 2, 0)])
                .unwrap();
        assert!(matches!(
            ledger.replay(&opening()),
            Err(CoreError::ItemNotFound(_))
        ));
    }
}
