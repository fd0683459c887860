use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use stockroom_core::processor::{validate_submission, Snapshot};
use stockroom_core::query::{filter_transactions, LedgerFilter};
use stockroom_core::{
    Category, CommitReceipt, CoreError, FloorLocation, Item, Quantity, SubmitRequest,
    Transaction, TransactionType,
};

fn opening(hundredths: i64, min_level: i64) -> Snapshot {
    Snapshot::new(
        vec![Item {
            id: "HK-001".to_string(),
            name: "Tissue Roll".to_string(),
            category: Category::Housekeeping,
            quantity: Quantity::from_hundredths(hundredths),
            unit: "pcs".to_string(),
            min_level: Quantity::from_hundredths(min_level),
        }],
        vec![],
    )
    .unwrap()
}

fn request(kind: TransactionType, hundredths: i64) -> SubmitRequest {
    SubmitRequest {
        kind,
        item_name: "Tissue Roll".to_string(),
        quantity: Quantity::from_hundredths(hundredths),
        unit: None,
        location: match kind {
            TransactionType::Receive => FloorLocation::Vendor,
            _ => FloorLocation::FirstFloor,
        },
        person_name: "Asha".to_string(),
        notes: None,
        category_hint: None,
    }
}

fn receipt(n: usize) -> CommitReceipt {
    CommitReceipt {
        transaction_id: format!("tx-{n}"),
        recorded_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(n as i64),
        item_id: "HK-001".to_string(),
    }
}

fn level(snapshot: &Snapshot) -> Quantity {
    snapshot.catalog().lookup("Tissue Roll").unwrap().quantity
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Property: valid Issues subtract exactly their sum.
    #[test]
    fn issues_subtract_their_sum(
        amounts in prop::collection::vec(1i64..5_000, 1..20)
    ) {
        let total: i64 = amounts.iter().sum();
        let mut snapshot = opening(total, 0);

        for (n, amount) in amounts.iter().enumerate() {
            let draft = validate_submission(&snapshot, &request(TransactionType::Issue, *amount)).unwrap();
            snapshot = snapshot.with_commit(&draft, &receipt(n)).unwrap().0;
        }

        prop_assert!(level(&snapshot).is_zero());
        prop_assert_eq!(snapshot.ledger().len(), amounts.len());
    }

    /// Property: valid Receives add exactly their sum.
    #[test]
    fn receives_add_their_sum(
        start in 0i64..100_000,
        amounts in prop::collection::vec(1i64..5_000, 1..20)
    ) {
        let mut snapshot = opening(start, 0);

        for (n, amount) in amounts.iter().enumerate() {
            let draft = validate_submission(&snapshot, &request(TransactionType::Receive, *amount)).unwrap();
            snapshot = snapshot.with_commit(&draft, &receipt(n)).unwrap().0;
        }

        prop_assert_eq!(level(&snapshot).hundredths(), start + amounts.iter().sum::<i64>());
    }

    /// Property: an oversized Issue is rejected and changes nothing.
    #[test]
    fn oversized_issue_is_rejected(
        on_hand in 0i64..10_000,
        excess in 1i64..10_000
    ) {
        let snapshot = opening(on_hand, 0);
        let err = validate_submission(&snapshot, &request(TransactionType::Issue, on_hand + excess)).unwrap_err();

        let is_insufficient = matches!(err, CoreError::InsufficientStock { .. });
        prop_assert!(is_insufficient);
        prop_assert_eq!(level(&snapshot).hundredths(), on_hand);
        prop_assert!(snapshot.ledger().is_empty());
    }

    /// Property: low stock is exactly `quantity <= min_level`.
    #[test]
    fn low_stock_matches_threshold(
        quantity in 0i64..1_000,
        min_level in 0i64..1_000
    ) {
        let snapshot = opening(quantity, min_level);
        let item = snapshot.catalog().lookup("Tissue Roll").unwrap();
        prop_assert_eq!(item.is_low_stock(), quantity <= min_level);
    }

    /// Property: replaying the Ledger over the opening Catalog reproduces
    /// the current Catalog.
    #[test]
    fn replay_reproduces_catalog(
        moves in prop::collection::vec((any::<bool>(), 1i64..2_000), 1..30)
    ) {
        let start = opening(10_000, 500);
        let mut snapshot = start.clone();

        for (n, (is_issue, amount)) in moves.into_iter().enumerate() {
            let kind = if is_issue { TransactionType::Issue } else { TransactionType::Receive };
            if let Ok(draft) = validate_submission(&snapshot, &request(kind, amount)) {
                snapshot = snapshot.with_commit(&draft, &receipt(n)).unwrap().0;
            }
        }

        let replayed = snapshot.ledger().replay(start.catalog()).unwrap();
        prop_assert_eq!(&replayed, snapshot.catalog());
    }

    /// Property: the day filter keeps exactly the entries inside
    /// `[start 00:00, end + 1 day 00:00)` and orders them newest first.
    #[test]
    fn date_filter_respects_day_bounds(
        offsets in prop::collection::vec(0i64..(20 * 24 * 60), 0..40),
        start_day in 0u32..10,
        span in 0u32..10
    ) {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let txs: Vec<Transaction> = offsets
            .iter()
            .enumerate()
            .map(|(n, minutes)| Transaction {
                id: format!("tx-{n}"),
                kind: TransactionType::Issue,
                item_name: "Tissue Roll".to_string(),
                quantity: Quantity::from_units(1),
                unit: "pcs".to_string(),
                location: Some(FloorLocation::Basement),
                person_name: "Asha".to_string(),
                notes: None,
                previous_quantity: None,
                date: base + Duration::minutes(*minutes),
            })
            .collect();

        let start = base + Duration::days(start_day as i64);
        let end_exclusive = start + Duration::days(span as i64 + 1);
        let filter = LedgerFilter {
            kind: None,
            start_date: Some(start.date_naive()),
            end_date: Some((end_exclusive - Duration::days(1)).date_naive()),
        };

        let visible = filter_transactions(&txs, &filter);
        let expected = txs.iter().filter(|t| t.date >= start && t.date < end_exclusive).count();
        prop_assert_eq!(visible.len(), expected);
        prop_assert!(visible.windows(2).all(|w| w[0].date >= w[1].date));
    }
}
