//! Unrealized FX gain/loss revaluation.
//!
//! Rounding strategy matches currency conversion elsewhere: banker's
//! rounding (round half to even) at 2 decimal places, to minimize
//! cumulative errors.

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

use crate::ledger::{EntrySource, JournalEntryInput, JournalLine};
use crate::period::Period;

use super::types::{ForeignBalance, FxRevalParams};

/// Revalues a foreign balance at its closing rate.
#[must_use]
pub fn revalued_base_amount(balance: &ForeignBalance) -> Decimal {
    (balance.foreign_balance * balance.rate)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Unrealized gain (positive) or loss (negative) on one balance.
#[must_use]
pub fn revaluation_delta(balance: &ForeignBalance) -> Decimal {
    revalued_base_amount(balance) - balance.booked_base_balance
}

/// Builds the period-end revaluation entry.
///
/// Each balance whose revalued amount differs from its booked base amount
/// contributes an adjustment line on the holding account; aggregate gains
/// are credited to the gain account and aggregate losses debited to the
/// loss account. Returns `None` when nothing moved.
#[must_use]
pub fn build_revaluation_entry(
    params: &FxRevalParams,
    period: &Period,
) -> Option<JournalEntryInput> {
    let mut lines = Vec::new();
    let mut total_gain = Decimal::ZERO;
    let mut total_loss = Decimal::ZERO;

    for balance in &params.balances {
        let delta = revaluation_delta(balance);
        if delta.is_zero() {
            continue;
        }

        let memo = format!("FX revaluation {}", balance.currency);
        if delta > Decimal::ZERO {
            lines.push(JournalLine::debit(balance.account_id, delta).with_memo(memo));
            total_gain += delta;
        } else {
            lines.push(JournalLine::credit(balance.account_id, -delta).with_memo(memo));
            total_loss += -delta;
        }
    }

    if lines.is_empty() {
        return None;
    }

    if !total_gain.is_zero() {
        lines.push(
            JournalLine::credit(params.gain_account, total_gain).with_memo("Unrealized FX gain"),
        );
    }
    if !total_loss.is_zero() {
        lines.push(
            JournalLine::debit(params.loss_account, total_loss).with_memo("Unrealized FX loss"),
        );
    }

    Some(JournalEntryInput {
        company_id: period.company_id,
        entry_date: period.end_date,
        posting_date: period.end_date,
        description: format!("FX revaluation {}", period.label),
        reference: Some(format!("FXREVAL-{}", period.label)),
        memo: None,
        lines,
        source: EntrySource::CloseRun,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::close::types::FxRevalParams;
    use crate::ledger::validate_lines;
    use crate::period::PeriodStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use saldo_shared::types::{AccountId, CompanyId, Currency, PeriodId};

    fn make_period() -> Period {
        Period {
            id: PeriodId::new(),
            company_id: CompanyId::new(),
            label: "2024-04".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            status: PeriodStatus::Locked,
            closed_at: None,
        }
    }

    fn foreign_balance(
        foreign: Decimal,
        rate: Decimal,
        booked: Decimal,
    ) -> ForeignBalance {
        ForeignBalance {
            account_id: AccountId::new(),
            currency: Currency::Eur,
            foreign_balance: foreign,
            rate,
            booked_base_balance: booked,
        }
    }

    #[test]
    fn test_revalued_amount_uses_bankers_rounding() {
        // 1 * 2.505 = 2.505 -> rounds half to even -> 2.50
        let balance = foreign_balance(dec!(1), dec!(2.505), dec!(0));
        assert_eq!(revalued_base_amount(&balance), dec!(2.50));

        // 1 * 2.515 = 2.515 -> 2.52
        let balance = foreign_balance(dec!(1), dec!(2.515), dec!(0));
        assert_eq!(revalued_base_amount(&balance), dec!(2.52));
    }

    #[test]
    fn test_gain_debits_account_credits_gain() {
        let params = FxRevalParams {
            gain_account: AccountId::new(),
            loss_account: AccountId::new(),
            balances: vec![foreign_balance(dec!(1000), dec!(1.10), dec!(1050.00))],
        };

        let entry = build_revaluation_entry(&params, &make_period()).unwrap();
        // 1000 * 1.10 = 1100.00 booked 1050.00 -> gain 50.00
        assert_eq!(entry.lines.len(), 2);
        assert_eq!(entry.lines[0].debit, dec!(50.00));
        assert_eq!(entry.lines[1].account_id, Some(params.gain_account));
        assert_eq!(entry.lines[1].credit, dec!(50.00));
        assert!(validate_lines(&entry.lines).balanced);
    }

    #[test]
    fn test_loss_credits_account_debits_loss() {
        let params = FxRevalParams {
            gain_account: AccountId::new(),
            loss_account: AccountId::new(),
            balances: vec![foreign_balance(dec!(1000), dec!(0.95), dec!(1000.00))],
        };

        let entry = build_revaluation_entry(&params, &make_period()).unwrap();
        // revalued 950.00 booked 1000.00 -> loss 50.00
        assert_eq!(entry.lines[0].credit, dec!(50.00));
        assert_eq!(entry.lines[1].account_id, Some(params.loss_account));
        assert_eq!(entry.lines[1].debit, dec!(50.00));
        assert!(validate_lines(&entry.lines).balanced);
    }

    #[test]
    fn test_mixed_gains_and_losses_balance() {
        let params = FxRevalParams {
            gain_account: AccountId::new(),
            loss_account: AccountId::new(),
            balances: vec![
                foreign_balance(dec!(100), dec!(1.20), dec!(100.00)), // gain 20.00
                foreign_balance(dec!(200), dec!(0.90), dec!(200.00)), // loss 20.00
                foreign_balance(dec!(300), dec!(1.05), dec!(300.00)), // gain 15.00
            ],
        };

        let entry = build_revaluation_entry(&params, &make_period()).unwrap();
        // 3 adjustment lines + gain line + loss line
        assert_eq!(entry.lines.len(), 5);
        assert!(validate_lines(&entry.lines).balanced);
    }

    #[test]
    fn test_no_movement_posts_nothing() {
        let params = FxRevalParams {
            gain_account: AccountId::new(),
            loss_account: AccountId::new(),
            balances: vec![foreign_balance(dec!(1000), dec!(1.00), dec!(1000.00))],
        };

        assert!(build_revaluation_entry(&params, &make_period()).is_none());
    }

    #[test]
    fn test_empty_balances_posts_nothing() {
        let params = FxRevalParams {
            gain_account: AccountId::new(),
            loss_account: AccountId::new(),
            balances: vec![],
        };

        assert!(build_revaluation_entry(&params, &make_period()).is_none());
    }

    #[test]
    fn test_revaluation_entry_passes_posting_gate() {
        use crate::ledger::validate_for_posting;

        let params = FxRevalParams {
            gain_account: AccountId::new(),
            loss_account: AccountId::new(),
            balances: vec![foreign_balance(dec!(500), dec!(1.08), dec!(500.00))],
        };

        let period = make_period();
        let entry = build_revaluation_entry(&params, &period).unwrap();
        assert!(validate_for_posting(&entry, period.status, |_| true).is_ok());
    }
}
