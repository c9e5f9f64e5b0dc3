//! Property-based tests for journal balance rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::validation::{LedgerValidationError, Posting, validate_postings};

#[derive(Debug, Clone)]
struct Row {
    debit: Decimal,
    credit: Decimal,
}

impl Posting for Row {
    fn debit(&self) -> Decimal {
        self.debit
    }

    fn credit(&self) -> Decimal {
        self.credit
    }
}

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // Generate amounts from 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn debit(amount: Decimal) -> Row {
    Row {
        debit: amount,
        credit: Decimal::ZERO,
    }
}

fn credit(amount: Decimal) -> Row {
    Row {
        debit: Decimal::ZERO,
        credit: amount,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Debits split across rows against one credit for the total balance.
    #[test]
    fn prop_split_debits_balance(amounts in prop::collection::vec(positive_amount(), 1..10)) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut rows: Vec<Row> = amounts.into_iter().map(debit).collect();
        rows.push(credit(total));

        prop_assert!(validate_postings(&rows).is_ok());
    }

    /// Any non-zero drift on one side is rejected with both totals reported.
    #[test]
    fn prop_drift_is_rejected(amount in positive_amount(), drift in positive_amount()) {
        let rows = vec![debit(amount + drift), credit(amount)];

        prop_assert_eq!(
            validate_postings(&rows),
            Err(LedgerValidationError::Unbalanced {
                debits: amount + drift,
                credits: amount,
            })
        );
    }

    /// Row order does not affect the verdict.
    #[test]
    fn prop_order_independent(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        rotate in 0usize..8,
    ) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut rows: Vec<Row> = amounts.into_iter().map(credit).collect();
        rows.push(debit(total));
        let shift = rotate % rows.len();
        rows.rotate_left(shift);

        prop_assert!(validate_postings(&rows).is_ok());
    }
}
