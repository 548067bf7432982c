//! Business rule validation for ledger operations.
//!
//! `validate_for_posting` is the single gate through which every journal
//! entry, manual or automated, must pass before persistence.

use rust_decimal::Decimal;
use saldo_shared::types::AccountId;

use super::error::LedgerError;
use super::types::{EntrySource, EntryTotals, JournalEntryInput, JournalLine};
use crate::period::PeriodStatus;

/// Computes the balance verdict for a set of journal lines.
///
/// Never fails: any input, balanced or not, yields totals and a signed
/// difference. `balanced` is true iff |debits - credits| < 0.01.
#[must_use]
pub fn validate_lines(lines: &[JournalLine]) -> EntryTotals {
    let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
    let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();
    EntryTotals::new(total_debit, total_credit)
}

/// Assigns the outstanding difference to the first empty line.
///
/// The balancing amount lands on whichever side reduces the imbalance:
/// credit when debits currently exceed credits, debit otherwise. The
/// validator never invents an account assignment; the chosen line keeps
/// whatever account reference it already has.
///
/// Already-balanced input is returned unchanged.
///
/// # Errors
///
/// Returns `NoEligibleLine` if no line has both sides zero; callers must
/// append a line themselves.
pub fn auto_balance(mut lines: Vec<JournalLine>) -> Result<Vec<JournalLine>, LedgerError> {
    let totals = validate_lines(&lines);
    if totals.balanced {
        return Ok(lines);
    }

    let slot = lines
        .iter_mut()
        .find(|l| l.is_empty())
        .ok_or(LedgerError::NoEligibleLine)?;

    if totals.difference > Decimal::ZERO {
        slot.credit = totals.difference;
    } else {
        slot.debit = -totals.difference;
    }

    Ok(lines)
}

/// Validates that an entry may be posted.
///
/// Checks, in order:
/// 1. at least 2 lines
/// 2. per-line shape: non-negative amounts, exactly one side non-zero
/// 3. every line references an account known to the chart of accounts
/// 4. debits and credits balance within the currency epsilon
/// 5. the period admits this entry's source (`Manual` requires an open
///    period; `CloseRun` requires the locked/closing window)
///
/// # Errors
///
/// Returns the first `LedgerError` encountered in the order above.
pub fn validate_for_posting<F>(
    entry: &JournalEntryInput,
    period_status: PeriodStatus,
    account_exists: F,
) -> Result<(), LedgerError>
where
    F: Fn(AccountId) -> bool,
{
    if entry.lines.len() < 2 {
        return Err(LedgerError::InsufficientLines);
    }

    for (index, line) in entry.lines.iter().enumerate() {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount { index });
        }
        if !line.debit.is_zero() && !line.credit.is_zero() {
            return Err(LedgerError::LineOnBothSides { index });
        }
        if line.is_empty() {
            return Err(LedgerError::ZeroAmount { index });
        }

        let account_id = line.account_id.ok_or(LedgerError::MissingAccount { index })?;
        if !account_exists(account_id) {
            return Err(LedgerError::UnknownAccount(account_id));
        }
    }

    let totals = validate_lines(&entry.lines);
    if !totals.balanced {
        return Err(LedgerError::Unbalanced {
            debit: totals.total_debit,
            credit: totals.total_credit,
            difference: totals.difference,
        });
    }

    match entry.source {
        EntrySource::Manual => {
            if period_status != PeriodStatus::Open {
                return Err(LedgerError::PeriodNotOpen(period_status));
            }
        }
        EntrySource::CloseRun => {
            if !period_status.in_close_window() {
                return Err(LedgerError::PeriodNotInCloseWindow(period_status));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use saldo_shared::types::CompanyId;

    fn make_entry(lines: Vec<JournalLine>, source: EntrySource) -> JournalEntryInput {
        JournalEntryInput {
            company_id: CompanyId::new(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            posting_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description: "Test entry".to_string(),
            reference: None,
            memo: None,
            lines,
            source,
        }
    }

    fn any_account_exists(_id: AccountId) -> bool {
        true
    }

    #[test]
    fn test_validate_lines_balanced() {
        let account = AccountId::new();
        let totals = validate_lines(&[
            JournalLine::debit(account, dec!(500.00)),
            JournalLine::credit(account, dec!(500.00)),
        ]);
        assert!(totals.balanced);
        assert_eq!(totals.total_debit, dec!(500.00));
        assert_eq!(totals.total_credit, dec!(500.00));
        assert_eq!(totals.difference, Decimal::ZERO);
    }

    #[test]
    fn test_validate_lines_unbalanced() {
        let account = AccountId::new();
        let totals = validate_lines(&[
            JournalLine::debit(account, dec!(500.00)),
            JournalLine::credit(account, dec!(300.00)),
        ]);
        assert!(!totals.balanced);
        assert_eq!(totals.difference, dec!(200.00));
    }

    #[test]
    fn test_validate_lines_never_fails_on_single_line() {
        let totals = validate_lines(&[JournalLine::debit(AccountId::new(), dec!(10))]);
        assert!(!totals.balanced);
        assert_eq!(totals.difference, dec!(10));
    }

    #[test]
    fn test_auto_balance_assigns_credit_when_debits_exceed() {
        let account = AccountId::new();
        let lines = vec![
            JournalLine::debit(account, dec!(500.00)),
            JournalLine::credit(account, dec!(300.00)),
            JournalLine::empty(),
        ];

        let patched = auto_balance(lines).unwrap();
        assert_eq!(patched[2].credit, dec!(200.00));
        assert_eq!(patched[2].debit, Decimal::ZERO);
        assert!(validate_lines(&patched).balanced);
    }

    #[test]
    fn test_auto_balance_assigns_debit_when_credits_exceed() {
        let account = AccountId::new();
        let lines = vec![
            JournalLine::empty(),
            JournalLine::credit(account, dec!(750.00)),
            JournalLine::debit(account, dec!(250.00)),
        ];

        let patched = auto_balance(lines).unwrap();
        assert_eq!(patched[0].debit, dec!(500.00));
        assert!(validate_lines(&patched).balanced);
    }

    #[test]
    fn test_auto_balance_uses_first_empty_line() {
        let account = AccountId::new();
        let lines = vec![
            JournalLine::debit(account, dec!(100.00)),
            JournalLine::empty().with_memo("first"),
            JournalLine::empty().with_memo("second"),
        ];

        let patched = auto_balance(lines).unwrap();
        assert_eq!(patched[1].credit, dec!(100.00));
        assert!(patched[2].is_empty());
    }

    #[test]
    fn test_auto_balance_no_eligible_line() {
        let account = AccountId::new();
        let lines = vec![
            JournalLine::debit(account, dec!(500.00)),
            JournalLine::credit(account, dec!(300.00)),
        ];

        assert!(matches!(
            auto_balance(lines),
            Err(LedgerError::NoEligibleLine)
        ));
    }

    #[test]
    fn test_auto_balance_balanced_input_unchanged() {
        let account = AccountId::new();
        let lines = vec![
            JournalLine::debit(account, dec!(100.00)),
            JournalLine::credit(account, dec!(100.00)),
        ];

        let patched = auto_balance(lines.clone()).unwrap();
        assert_eq!(patched, lines);
    }

    #[test]
    fn test_posting_balanced_entry_into_open_period() {
        let account = AccountId::new();
        let entry = make_entry(
            vec![
                JournalLine::debit(account, dec!(500.00)).with_memo("Office Expenses"),
                JournalLine::credit(account, dec!(500.00)).with_memo("Accounts Payable"),
            ],
            EntrySource::Manual,
        );

        assert!(validate_for_posting(&entry, PeriodStatus::Open, any_account_exists).is_ok());
    }

    #[test]
    fn test_posting_unbalanced_entry_fails_with_difference() {
        let account = AccountId::new();
        let entry = make_entry(
            vec![
                JournalLine::debit(account, dec!(500.00)),
                JournalLine::credit(account, dec!(300.00)),
            ],
            EntrySource::Manual,
        );

        let err = validate_for_posting(&entry, PeriodStatus::Open, any_account_exists).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Unbalanced {
                difference,
                ..
            } if difference == dec!(200.00)
        ));
    }

    #[test]
    fn test_posting_insufficient_lines() {
        let entry = make_entry(
            vec![JournalLine::debit(AccountId::new(), dec!(100.00))],
            EntrySource::Manual,
        );

        assert!(matches!(
            validate_for_posting(&entry, PeriodStatus::Open, any_account_exists),
            Err(LedgerError::InsufficientLines)
        ));
    }

    #[test]
    fn test_posting_missing_account() {
        let account = AccountId::new();
        let mut line = JournalLine::credit(account, dec!(100.00));
        line.account_id = None;
        let entry = make_entry(
            vec![JournalLine::debit(account, dec!(100.00)), line],
            EntrySource::Manual,
        );

        assert!(matches!(
            validate_for_posting(&entry, PeriodStatus::Open, any_account_exists),
            Err(LedgerError::MissingAccount { index: 1 })
        ));
    }

    #[test]
    fn test_posting_unknown_account() {
        let known = AccountId::new();
        let unknown = AccountId::new();
        let entry = make_entry(
            vec![
                JournalLine::debit(unknown, dec!(100.00)),
                JournalLine::credit(known, dec!(100.00)),
            ],
            EntrySource::Manual,
        );

        let err = validate_for_posting(&entry, PeriodStatus::Open, |id| id == known).unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAccount(id) if id == unknown));
    }

    #[test]
    fn test_posting_line_on_both_sides() {
        let account = AccountId::new();
        let mut line = JournalLine::debit(account, dec!(100.00));
        line.credit = dec!(50.00);
        let entry = make_entry(
            vec![line, JournalLine::credit(account, dec!(50.00))],
            EntrySource::Manual,
        );

        assert!(matches!(
            validate_for_posting(&entry, PeriodStatus::Open, any_account_exists),
            Err(LedgerError::LineOnBothSides { index: 0 })
        ));
    }

    #[test]
    fn test_posting_negative_amount() {
        let account = AccountId::new();
        let entry = make_entry(
            vec![
                JournalLine::debit(account, dec!(-100.00)),
                JournalLine::credit(account, dec!(100.00)),
            ],
            EntrySource::Manual,
        );

        assert!(matches!(
            validate_for_posting(&entry, PeriodStatus::Open, any_account_exists),
            Err(LedgerError::NegativeAmount { index: 0 })
        ));
    }

    #[test]
    fn test_user_posting_rejected_outside_open_period() {
        let account = AccountId::new();
        let entry = make_entry(
            vec![
                JournalLine::debit(account, dec!(100.00)),
                JournalLine::credit(account, dec!(100.00)),
            ],
            EntrySource::Manual,
        );

        for status in [
            PeriodStatus::Locked,
            PeriodStatus::Closing,
            PeriodStatus::Closed,
        ] {
            assert!(matches!(
                validate_for_posting(&entry, status, any_account_exists),
                Err(LedgerError::PeriodNotOpen(s)) if s == status
            ));
        }
    }

    #[test]
    fn test_close_run_posting_valid_in_close_window() {
        let account = AccountId::new();
        let entry = make_entry(
            vec![
                JournalLine::debit(account, dec!(100.00)),
                JournalLine::credit(account, dec!(100.00)),
            ],
            EntrySource::CloseRun,
        );

        assert!(validate_for_posting(&entry, PeriodStatus::Locked, any_account_exists).is_ok());
        assert!(validate_for_posting(&entry, PeriodStatus::Closing, any_account_exists).is_ok());

        for status in [PeriodStatus::Open, PeriodStatus::Closed] {
            assert!(matches!(
                validate_for_posting(&entry, status, any_account_exists),
                Err(LedgerError::PeriodNotInCloseWindow(s)) if s == status
            ));
        }
    }
}
