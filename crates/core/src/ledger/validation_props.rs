//! Property-based tests for balance validation and auto-balancing.

use proptest::prelude::*;
use rust_decimal::Decimal;
use saldo_shared::types::AccountId;

use super::types::JournalLine;
use super::validation::{auto_balance, validate_lines};
use crate::ledger::LedgerError;

/// Strategy for positive 2-decimal currency amounts.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for a mixed set of debit and credit lines.
fn lines_strategy() -> impl Strategy<Value = Vec<JournalLine>> {
    prop::collection::vec((amount_strategy(), any::<bool>()), 1..12).prop_map(|amounts| {
        amounts
            .into_iter()
            .map(|(amount, is_debit)| {
                if is_debit {
                    JournalLine::debit(AccountId::new(), amount)
                } else {
                    JournalLine::credit(AccountId::new(), amount)
                }
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any set of lines whose debit and credit sums agree exactly is
    /// reported balanced with zero difference.
    #[test]
    fn prop_mirrored_lines_balance(amounts in prop::collection::vec(amount_strategy(), 1..8)) {
        let mut lines = Vec::new();
        for amount in &amounts {
            lines.push(JournalLine::debit(AccountId::new(), *amount));
            lines.push(JournalLine::credit(AccountId::new(), *amount));
        }

        let totals = validate_lines(&lines);
        prop_assert!(totals.balanced);
        prop_assert_eq!(totals.difference, Decimal::ZERO);
    }

    /// Skewing any balanced set by at least one cent flips the verdict and
    /// the signed difference reports the skew exactly.
    #[test]
    fn prop_skewed_lines_report_signed_difference(
        amount in amount_strategy(),
        skew in 1i64..100_000i64,
    ) {
        let skew = Decimal::new(skew, 2);
        let lines = vec![
            JournalLine::debit(AccountId::new(), amount + skew),
            JournalLine::credit(AccountId::new(), amount),
        ];

        let totals = validate_lines(&lines);
        prop_assert!(!totals.balanced);
        prop_assert_eq!(totals.difference, skew);
    }

    /// The verdict is order-independent: shuffling lines never changes it.
    #[test]
    fn prop_validation_is_order_independent(lines in lines_strategy()) {
        let forward = validate_lines(&lines);
        let reversed: Vec<JournalLine> = lines.iter().rev().cloned().collect();
        let backward = validate_lines(&reversed);

        prop_assert_eq!(forward.total_debit, backward.total_debit);
        prop_assert_eq!(forward.total_credit, backward.total_credit);
        prop_assert_eq!(forward.balanced, backward.balanced);
    }

    /// Auto-balancing any set that has an empty line yields a balanced set.
    #[test]
    fn prop_auto_balance_with_empty_line_balances(mut lines in lines_strategy()) {
        lines.push(JournalLine::empty());

        let patched = auto_balance(lines).unwrap();
        prop_assert!(validate_lines(&patched).balanced);
    }

    /// Auto-balancing without an empty line fails for any unbalanced set.
    #[test]
    fn prop_auto_balance_without_empty_line_fails(
        amount in amount_strategy(),
        skew in 1i64..100_000i64,
    ) {
        let lines = vec![
            JournalLine::debit(AccountId::new(), amount + Decimal::new(skew, 2)),
            JournalLine::credit(AccountId::new(), amount),
        ];

        prop_assert!(matches!(
            auto_balance(lines),
            Err(LedgerError::NoEligibleLine)
        ));
    }

    /// Auto-balance is idempotent: a second pass returns the set unchanged.
    #[test]
    fn prop_auto_balance_idempotent(mut lines in lines_strategy()) {
        lines.push(JournalLine::empty());

        let once = auto_balance(lines).unwrap();
        let twice = auto_balance(once.clone()).unwrap();
        prop_assert_eq!(once, twice);
    }
}
