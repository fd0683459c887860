//! # Item Catalog
//!
//! In-memory view of current stock levels, keyed by item name.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog                                                                │
//! │                                                                         │
//! │  items: Vec<Item>            index: HashMap<name, position>             │
//! │  ┌───┬──────────────┬─────┐  ┌──────────────┬───┐                       │
//! │  │ 0 │ Tissue Roll  │ 10  │  │ Tissue Roll  │ 0 │                       │
//! │  │ 1 │ Floor Cleaner│  4  │  │ Floor Cleaner│ 1 │                       │
//! │  │ 2 │ Cooking Oil  │  6  │  │ Cooking Oil  │ 2 │                       │
//! │  └───┴──────────────┴─────┘  └──────────────┴───┘                       │
//! │                                                                         │
//! │  list() keeps the order the store returned; lookups are O(1).           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Names are unique (case-sensitive)
//! - `quantity >= 0` and `min_level >= 0` for every item
//! - A failed mutation leaves the Catalog untouched
//!
//! The Catalog never writes a Transaction. Pairing a quantity change with a
//! Ledger entry is the processor's job.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::quantity::Quantity;
use crate::types::Item;

/// Current stock levels in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<Item>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Creates an empty Catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Builds a Catalog from items as received from the store.
    ///
    /// ## Errors
    /// - `DuplicateItem` if two items share a name
    /// - `InvalidQuantity` if any quantity or min level is negative
    pub fn from_items(items: Vec<Item>) -> CoreResult<Self> {
        let mut catalog = Catalog::new();
        for item in items {
            catalog.insert(item)?;
        }
        Ok(catalog)
    }

    /// Resolves an item by exact name.
    pub fn lookup(&self, name: &str) -> CoreResult<&Item> {
        self.get(name)
            .ok_or_else(|| CoreError::ItemNotFound(name.to_string()))
    }

    /// Like [`lookup`](Self::lookup) but returns `None` when absent.
    pub fn get(&self, name: &str) -> Option<&Item> {
        self.index.get(name).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All items in insertion order.
    pub fn list(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a new item at the end of the Catalog.
    pub fn insert(&mut self, item: Item) -> CoreResult<&Item> {
        if self.index.contains_key(&item.name) {
            return Err(CoreError::DuplicateItem(item.name));
        }
        for value in [item.quantity, item.min_level] {
            if value.is_negative() {
                return Err(CoreError::InvalidQuantity {
                    item: item.name,
                    value,
                });
            }
        }

        let pos = self.items.len();
        self.index.insert(item.name.clone(), pos);
        self.items.push(item);
        Ok(&self.items[pos])
    }

    /// Applies a signed change to an item's quantity.
    ///
    /// ## Errors
    /// - `ItemNotFound` if the name does not resolve
    /// - `WouldGoNegative` if `quantity + delta < 0`
    /// - `ExceedsMaximum` if `quantity + delta > Quantity::MAX`
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::catalog::Catalog;
    /// use stockroom_core::quantity::Quantity;
    /// use stockroom_core::types::{Category, Item};
    ///
    /// let mut catalog = Catalog::from_items(vec![Item {
    ///     id: "HK-001".into(),
    ///     name: "Tissue Roll".into(),
    ///     category: Category::Housekeeping,
    ///     quantity: Quantity::from_units(10),
    ///     unit: "pcs".into(),
    ///     min_level: Quantity::from_units(5),
    /// }]).unwrap();
    ///
    /// let item = catalog.apply_delta("Tissue Roll", Quantity::from_units(-3)).unwrap();
    /// assert_eq!(item.quantity, Quantity::from_units(7));
    ///
    /// assert!(catalog.apply_delta("Tissue Roll", Quantity::from_units(-8)).is_err());
    /// assert_eq!(catalog.lookup("Tissue Roll").unwrap().quantity, Quantity::from_units(7));
    /// ```
    pub fn apply_delta(&mut self, name: &str, delta: Quantity) -> CoreResult<&Item> {
        let pos = self.position(name)?;
        let item = &mut self.items[pos];

        let updated = match item.quantity.checked_stock_add(delta) {
            Some(q) if !q.is_negative() => q,
            _ if delta.is_positive() => {
                return Err(CoreError::ExceedsMaximum {
                    item: item.name.clone(),
                    unit: item.unit.clone(),
                    current: item.quantity,
                    requested: delta,
                })
            }
            _ => {
                return Err(CoreError::WouldGoNegative {
                    item: item.name.clone(),
                    current: item.quantity,
                    delta,
                })
            }
        };

        item.quantity = updated;
        Ok(item)
    }

    /// Sets an item's quantity directly (override path).
    ///
    /// ## Errors
    /// - `ItemNotFound` if the name does not resolve
    /// - `InvalidQuantity` if `new_quantity < 0`
    pub fn set_quantity(&mut self, name: &str, new_quantity: Quantity) -> CoreResult<&Item> {
        let pos = self.position(name)?;
        let item = &mut self.items[pos];

        if new_quantity.is_negative() {
            return Err(CoreError::InvalidQuantity {
                item: item.name.clone(),
                value: new_quantity,
            });
        }

        item.quantity = new_quantity;
        Ok(item)
    }

    fn position(&self, name: &str) -> CoreResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CoreError::ItemNotFound(name.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
