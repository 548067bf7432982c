//! Amount-tolerance candidate matching.

use saldo_shared::types::currency_epsilon;

use super::error::ReconciliationError;
use super::types::{BankTransaction, BankTransactionStatus, Payment};

/// Proposes payments that could match a bank transaction.
///
/// Filters to payments within one cent (inclusive) of the transaction's
/// absolute amount, ordered by closeness of amount, then by date
/// proximity (closest first), then by id for a stable order.
#[must_use]
pub fn find_candidates(transaction: &BankTransaction, payments: &[Payment]) -> Vec<Payment> {
    let target = transaction.amount.abs();

    let mut candidates: Vec<Payment> = payments
        .iter()
        .filter(|p| (p.amount - target).abs() <= currency_epsilon())
        .cloned()
        .collect();

    candidates.sort_by(|a, b| {
        let amount_a = (a.amount - target).abs();
        let amount_b = (b.amount - target).abs();
        let date_a = (a.received_on - transaction.transaction_date).num_days().abs();
        let date_b = (b.received_on - transaction.transaction_date).num_days().abs();

        amount_a
            .cmp(&amount_b)
            .then(date_a.cmp(&date_b))
            .then(a.id.into_inner().cmp(&b.id.into_inner()))
    });

    candidates
}

/// Validates that a transaction may be reconciled.
///
/// # Errors
///
/// Returns `AlreadyReconciled` for a transaction that is not
/// `unreconciled`; re-matching requires an explicit unreconciliation,
/// which is an administrative action outside this core.
pub fn validate_reconcilable(transaction: &BankTransaction) -> Result<(), ReconciliationError> {
    match transaction.status {
        BankTransactionStatus::Unreconciled => Ok(()),
        BankTransactionStatus::Reconciled => {
            Err(ReconciliationError::AlreadyReconciled(transaction.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::types::BankTransactionType;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use saldo_shared::types::{BankAccountId, BankTransactionId, CompanyId, PaymentId};

    fn make_transaction(amount: Decimal, date: NaiveDate) -> BankTransaction {
        BankTransaction {
            id: BankTransactionId::new(),
            company_id: CompanyId::new(),
            bank_account_id: BankAccountId::new(),
            amount,
            transaction_type: if amount.is_sign_negative() {
                BankTransactionType::Debit
            } else {
                BankTransactionType::Credit
            },
            transaction_date: date,
            status: BankTransactionStatus::Unreconciled,
        }
    }

    fn make_payment(amount: Decimal, received_on: NaiveDate) -> Payment {
        Payment {
            id: PaymentId::new(),
            company_id: CompanyId::new(),
            amount,
            method: "bank_transfer".to_string(),
            reference: None,
            received_on,
        }
    }

    #[test]
    fn test_candidates_within_tolerance() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let txn = make_transaction(dec!(500.00), date);

        let payments = vec![
            make_payment(dec!(500.01), date),
            make_payment(dec!(499.99), date.pred_opt().unwrap()),
            make_payment(dec!(500.02), date),
            make_payment(dec!(480.00), date),
        ];

        let candidates = find_candidates(&txn, &payments);
        // 500.01 and 499.99 sit exactly at the tolerance; 500.02 and
        // 480.00 are outside it
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|p| (p.amount - dec!(500.00)).abs() <= dec!(0.01)));
    }

    #[test]
    fn test_candidates_ordered_by_amount_closeness() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let txn = make_transaction(dec!(500.00), date);

        let near = make_payment(dec!(500.00), date);
        let far = make_payment(dec!(500.005), date);
        let payments = vec![far.clone(), near.clone()];

        let candidates = find_candidates(&txn, &payments);
        assert_eq!(candidates[0].id, near.id);
        assert_eq!(candidates[1].id, far.id);
    }

    #[test]
    fn test_amount_ties_break_by_date_proximity() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let txn = make_transaction(dec!(500.00), date);

        let same_day = make_payment(dec!(500.00), date);
        let week_off = make_payment(dec!(500.00), date + chrono::Duration::days(7));
        let payments = vec![week_off.clone(), same_day.clone()];

        let candidates = find_candidates(&txn, &payments);
        assert_eq!(candidates[0].id, same_day.id);
        assert_eq!(candidates[1].id, week_off.id);
    }

    #[test]
    fn test_full_ties_break_by_id_stably() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let txn = make_transaction(dec!(500.00), date);

        let a = make_payment(dec!(500.00), date);
        let b = make_payment(dec!(500.00), date);

        let forward = find_candidates(&txn, &[a.clone(), b.clone()]);
        let backward = find_candidates(&txn, &[b, a]);
        assert_eq!(forward[0].id, backward[0].id);
        assert_eq!(forward[1].id, backward[1].id);
    }

    #[test]
    fn test_debit_transactions_match_on_absolute_amount() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let txn = make_transaction(dec!(-250.00), date);

        let payments = vec![make_payment(dec!(250.00), date)];
        let candidates = find_candidates(&txn, &payments);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_reconcilable_guard() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut txn = make_transaction(dec!(100.00), date);
        assert!(validate_reconcilable(&txn).is_ok());

        txn.status = BankTransactionStatus::Reconciled;
        assert!(matches!(
            validate_reconcilable(&txn),
            Err(ReconciliationError::AlreadyReconciled(id)) if id == txn.id
        ));
    }
}
