//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │   Transaction   │   │  CommitReceipt  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  transaction_id │       │
//! │  │  name (unique)  │◄──│  item_name      │   │  recorded_at    │       │
//! │  │  quantity >= 0  │   │  kind, quantity │   │  item_id        │       │
//! │  │  min_level      │   │  location, date │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │ TransactionType │   │  FloorLocation  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Housekeeping   │   │  Issue          │   │  Basement ...   │       │
//! │  │  Pantry         │   │  Receive        │   │  Fourth Floor   │       │
//! │  └─────────────────┘   │  Adjustment     │   │  Vendor         │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Name-Keyed References
//! A Transaction refers to its Item by `item_name`, not by `id`. Names are
//! unique and case-sensitive within a Catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::quantity::Quantity;

// =============================================================================
// Category
// =============================================================================

/// Item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum Category {
    Housekeeping,
    Pantry,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Housekeeping, Category::Pantry];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Housekeeping => "Housekeeping",
            Category::Pantry => "Pantry",
        }
    }

    /// Parses a category filter where `"All"` means no filter.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::types::Category;
    ///
    /// assert_eq!(Category::parse_filter("All").unwrap(), None);
    /// assert_eq!(Category::parse_filter("pantry").unwrap(), Some(Category::Pantry));
    /// ```
    pub fn parse_filter(input: &str) -> Result<Option<Category>, ValidationError> {
        if input.trim().eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        input.parse().map(Some)
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Housekeeping
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ValidationError::not_allowed("category", Category::ALL.map(|c| c.as_str()))
            })
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// The kind of stock movement a Transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum TransactionType {
    /// Stock out: quantity decreases by the transaction amount.
    Issue,
    /// Stock in: quantity increases by the transaction amount.
    Receive,
    /// Manual correction: quantity is set to the transaction amount.
    Adjustment,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Issue,
        TransactionType::Receive,
        TransactionType::Adjustment,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Issue => "Issue",
            TransactionType::Receive => "Receive",
            TransactionType::Adjustment => "Adjustment",
        }
    }

    /// Parses a type filter where `"All"` means no filter.
    pub fn parse_filter(input: &str) -> Result<Option<TransactionType>, ValidationError> {
        if input.trim().eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        input.parse().map(Some)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TransactionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                ValidationError::not_allowed("type", TransactionType::ALL.map(|t| t.as_str()))
            })
    }
}

// =============================================================================
// Floor Location
// =============================================================================

/// Where stock went to (Issue) or came from (Receive).
///
/// `Vendor` is a source, never a destination: it is valid for Receive only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum FloorLocation {
    Basement,
    #[serde(rename = "Ground Floor")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Ground Floor"))]
    GroundFloor,
    #[serde(rename = "First Floor")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "First Floor"))]
    FirstFloor,
    #[serde(rename = "Second Floor")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Second Floor"))]
    SecondFloor,
    #[serde(rename = "Third Floor")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Third Floor"))]
    ThirdFloor,
    #[serde(rename = "Fourth Floor")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Fourth Floor"))]
    FourthFloor,
    Vendor,
}

impl FloorLocation {
    pub const ALL: [FloorLocation; 7] = [
        FloorLocation::Basement,
        FloorLocation::GroundFloor,
        FloorLocation::FirstFloor,
        FloorLocation::SecondFloor,
        FloorLocation::ThirdFloor,
        FloorLocation::FourthFloor,
        FloorLocation::Vendor,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            FloorLocation::Basement => "Basement",
            FloorLocation::GroundFloor => "Ground Floor",
            FloorLocation::FirstFloor => "First Floor",
            FloorLocation::SecondFloor => "Second Floor",
            FloorLocation::ThirdFloor => "Third Floor",
            FloorLocation::FourthFloor => "Fourth Floor",
            FloorLocation::Vendor => "Vendor",
        }
    }

    /// Whether a movement of `kind` may name this location.
    pub fn allowed_for(&self, kind: TransactionType) -> bool {
        match self {
            FloorLocation::Vendor => kind == TransactionType::Receive,
            _ => true,
        }
    }
}

impl fmt::Display for FloorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the display form with any casing; spaces, `-` and `_` are
/// interchangeable (`"ground floor"`, `"ground-floor"`, `"Ground_Floor"`).
impl FromStr for FloorLocation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |v: &str| -> String {
            v.trim()
                .chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_'))
                .flat_map(char::to_lowercase)
                .collect()
        };
        let wanted = normalize(s);
        FloorLocation::ALL
            .into_iter()
            .find(|l| normalize(l.as_str()) == wanted)
            .ok_or_else(|| {
                ValidationError::not_allowed("location", FloorLocation::ALL.map(|l| l.as_str()))
            })
    }
}

// =============================================================================
// Item
// =============================================================================

/// A stocked consumable and its current level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Identifier assigned by the store.
    pub id: String,

    /// Display name; unique and case-sensitive.
    pub name: String,

    pub category: Category,

    /// Quantity on hand. Never negative.
    pub quantity: Quantity,

    /// Unit of measure ("pcs", "kg", "l", ...).
    pub unit: String,

    /// Reorder threshold. Never negative.
    pub min_level: Quantity,
}

impl Item {
    /// Low stock includes the boundary: `quantity <= min_level`.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::quantity::Quantity;
    /// use stockroom_core::types::{Category, Item};
    ///
    /// let item = Item {
    ///     id: "HK-001".into(),
    ///     name: "Tissue Roll".into(),
    ///     category: Category::Housekeeping,
    ///     quantity: Quantity::from_units(5),
    ///     unit: "pcs".into(),
    ///     min_level: Quantity::from_units(5),
    /// };
    /// assert!(item.is_low_stock());
    /// ```
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_level
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_low_stock() {
            "Low Stock"
        } else {
            "In Stock"
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed, immutable stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    pub item_name: String,

    /// Amount moved for Issue/Receive; the new absolute level for Adjustment.
    pub quantity: Quantity,

    pub unit: String,

    /// `None` for Adjustment entries.
    pub location: Option<FloorLocation>,

    pub person_name: String,

    pub notes: Option<String>,

    /// Level before an Adjustment; `None` for Issue/Receive.
    pub previous_quantity: Option<Quantity>,

    /// Timestamp assigned by the store. Ordering key.
    pub date: DateTime<Utc>,
}

impl Transaction {
    /// Builds the committed record from a draft and the store's receipt.
    pub fn from_draft(draft: &TransactionDraft, receipt: &CommitReceipt) -> Self {
        Transaction {
            id: receipt.transaction_id.clone(),
            kind: draft.kind,
            item_name: draft.item_name.clone(),
            quantity: draft.quantity,
            unit: draft.unit.clone(),
            location: draft.location,
            person_name: draft.person_name.clone(),
            notes: draft.notes.clone(),
            previous_quantity: draft.previous_quantity,
            date: receipt.recorded_at,
        }
    }

    /// The signed change this entry applies to a level of `current`.
    pub fn delta_from(&self, current: Quantity) -> Quantity {
        match self.kind {
            TransactionType::Issue => -self.quantity,
            TransactionType::Receive => self.quantity,
            TransactionType::Adjustment => self.quantity - current,
        }
    }
}

// =============================================================================
// Requests and Drafts
// =============================================================================

/// An Issue or Receive as entered by the operator, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub item_name: String,
    pub quantity: Quantity,
    /// Ignored for Issue (the item's unit wins); required for a Receive of
    /// an unknown item.
    pub unit: Option<String>,
    pub location: FloorLocation,
    pub person_name: String,
    pub notes: Option<String>,
    /// Category for an item onboarded by Receive. Defaults to Housekeeping.
    pub category_hint: Option<Category>,
}

/// A direct quantity correction as entered by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub item_name: String,
    pub new_quantity: Quantity,
    pub person_name: String,
    pub notes: Option<String>,
}

/// A validated movement ready to be sent to the store.
///
/// The store assigns `id` and `date`; everything else is fixed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub item_name: String,
    pub quantity: Quantity,
    pub unit: String,
    pub location: Option<FloorLocation>,
    pub person_name: String,
    pub notes: Option<String>,
    pub previous_quantity: Option<Quantity>,
    /// Set only for a Receive of an item the Catalog does not know.
    pub category_hint: Option<Category>,
}

/// What the store returns for a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub transaction_id: String,
    pub recorded_at: DateTime<Utc>,
    /// Id of the affected item (newly assigned when a Receive onboarded it).
    pub item_id: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
