//! Cost allocation procedure using the Largest Remainder Method.
//!
//! Shares are rounded down to currency precision, then leftover cents go
//! to the targets with the largest fractional remainders, so the sum of
//! allocated shares EXACTLY equals the total (no cents lost or gained).

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use crate::ledger::{EntrySource, JournalEntryInput, JournalLine};
use crate::period::Period;

use super::error::CloseRunError;
use super::types::AllocationParams;

/// Splits a total across percentage weights, summing exactly to the total.
fn split_by_percentages(total: Decimal, percentages: &[Decimal], decimal_places: u32) -> Vec<Decimal> {
    if percentages.is_empty() {
        return vec![];
    }

    let hundred = Decimal::from(100);
    let unit = Decimal::new(1, decimal_places);

    let total_rounded =
        total.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);

    let exact: Vec<Decimal> = percentages
        .iter()
        .map(|p| total_rounded * *p / hundred)
        .collect();

    let mut rounded: Vec<Decimal> = exact
        .iter()
        .map(|a| a.round_dp_with_strategy(decimal_places, RoundingStrategy::ToZero))
        .collect();

    let sum_rounded: Decimal = rounded.iter().copied().sum();
    let remainder = total_rounded - sum_rounded;

    let units_to_distribute = (remainder / unit)
        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .to_u64()
        .unwrap_or(0);
    let units_to_distribute = usize::try_from(units_to_distribute).unwrap_or(0);

    if units_to_distribute == 0 {
        return rounded;
    }

    let mut remainders: Vec<(usize, Decimal)> = exact
        .iter()
        .zip(rounded.iter())
        .enumerate()
        .map(|(i, (e, r))| (i, *e - *r))
        .collect();

    // Largest fractional remainder first
    remainders.sort_by(|a, b| b.1.cmp(&a.1));

    for (idx, _) in remainders.iter().take(units_to_distribute) {
        rounded[*idx] += unit;
    }

    rounded
}

/// Builds the allocation entry for a period.
///
/// Each target is debited its share of the total; the source (pool)
/// account is credited the full total, so the entry balances by
/// construction.
///
/// # Errors
///
/// Returns `EmptyAllocationBasis` for a basis with no targets, or
/// `BasisNotOneHundred` when percentages do not sum to 100.
pub fn build_allocation_entry(
    params: &AllocationParams,
    period: &Period,
) -> Result<JournalEntryInput, CloseRunError> {
    if params.targets.is_empty() {
        return Err(CloseRunError::EmptyAllocationBasis);
    }

    let percent_total: Decimal = params.targets.iter().map(|t| t.percent).sum();
    if percent_total != Decimal::from(100) {
        return Err(CloseRunError::BasisNotOneHundred {
            total: percent_total,
        });
    }

    let percentages: Vec<Decimal> = params.targets.iter().map(|t| t.percent).collect();
    let shares = split_by_percentages(params.total, &percentages, 2);

    // Zero shares (tiny totals) would be rejected by the posting gate
    let mut lines: Vec<JournalLine> = params
        .targets
        .iter()
        .zip(shares.iter())
        .filter(|(_, share)| !share.is_zero())
        .map(|(target, share)| JournalLine::debit(target.account_id, *share))
        .collect();
    lines.push(JournalLine::credit(
        params.source_account,
        params
            .total
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
    ));

    Ok(JournalEntryInput {
        company_id: period.company_id,
        entry_date: period.end_date,
        posting_date: period.end_date,
        description: format!("Cost allocation {}", period.label),
        reference: Some(format!("ALLOC-{}", period.label)),
        memo: params.memo.clone(),
        lines,
        source: EntrySource::CloseRun,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::close::types::AllocationTarget;
    use crate::ledger::validate_lines;
    use crate::period::PeriodStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use saldo_shared::types::{AccountId, CompanyId, PeriodId};

    fn make_period() -> Period {
        Period {
            id: PeriodId::new(),
            company_id: CompanyId::new(),
            label: "2024-02".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            status: PeriodStatus::Locked,
            closed_at: None,
        }
    }

    fn make_params(total: Decimal, percents: &[Decimal]) -> AllocationParams {
        AllocationParams {
            total,
            source_account: AccountId::new(),
            targets: percents
                .iter()
                .map(|p| AllocationTarget {
                    account_id: AccountId::new(),
                    percent: *p,
                })
                .collect(),
            memo: None,
        }
    }

    #[test]
    fn test_split_even() {
        let result = split_by_percentages(dec!(100), &[dec!(50), dec!(50)], 2);
        assert_eq!(result, vec![dec!(50), dec!(50)]);
    }

    #[test]
    fn test_split_thirds_sums_exactly() {
        let result =
            split_by_percentages(dec!(100), &[dec!(33.33), dec!(33.33), dec!(33.34)], 2);
        assert_eq!(result.iter().sum::<Decimal>(), dec!(100));
    }

    #[test]
    fn test_split_leftover_cent_goes_to_largest_remainder() {
        // 100 at 33.33/33.33/33.34: exact shares 33.33/33.33/33.34 round
        // clean; 0.01 at equal thirds leaves one cent for the first target.
        let result = split_by_percentages(
            dec!(0.01),
            &[dec!(33.33), dec!(33.33), dec!(33.34)],
            2,
        );
        assert_eq!(result.iter().sum::<Decimal>(), dec!(0.01));
        assert_eq!(result.iter().filter(|d| !d.is_zero()).count(), 1);
    }

    #[test]
    fn test_allocation_entry_balances() {
        let params = make_params(dec!(999.99), &[dec!(10), dec!(20), dec!(30), dec!(40)]);
        let entry = build_allocation_entry(&params, &make_period()).unwrap();

        assert_eq!(entry.lines.len(), 5);
        assert!(validate_lines(&entry.lines).balanced);
        assert_eq!(entry.source, EntrySource::CloseRun);
        assert_eq!(entry.reference.as_deref(), Some("ALLOC-2024-02"));
    }

    #[test]
    fn test_allocation_credits_source_with_total() {
        let params = make_params(dec!(600.00), &[dec!(50), dec!(50)]);
        let source = params.source_account;
        let entry = build_allocation_entry(&params, &make_period()).unwrap();

        let credit_line = entry.lines.last().unwrap();
        assert_eq!(credit_line.account_id, Some(source));
        assert_eq!(credit_line.credit, dec!(600.00));
    }

    #[test]
    fn test_allocation_empty_basis() {
        let params = make_params(dec!(100), &[]);
        assert!(matches!(
            build_allocation_entry(&params, &make_period()),
            Err(CloseRunError::EmptyAllocationBasis)
        ));
    }

    #[test]
    fn test_allocation_basis_must_sum_to_one_hundred() {
        let params = make_params(dec!(100), &[dec!(50), dec!(40)]);
        assert!(matches!(
            build_allocation_entry(&params, &make_period()),
            Err(CloseRunError::BasisNotOneHundred { total }) if total == dec!(90)
        ));
    }
}

/// Property-based tests for the allocation sum invariant.
#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    fn percent_basis_strategy() -> impl Strategy<Value = Vec<Decimal>> {
        // Random positive integer weights, normalized to percentages that
        // sum to exactly 100 by assigning the residue to the last target.
        prop::collection::vec(1u32..50, 1..8).prop_map(|weights| {
            let total: u32 = weights.iter().sum();
            let mut percents: Vec<Decimal> = weights
                .iter()
                .map(|w| {
                    (Decimal::from(*w) * Decimal::from(100) / Decimal::from(total))
                        .round_dp_with_strategy(2, RoundingStrategy::ToZero)
                })
                .collect();
            let assigned: Decimal = percents.iter().copied().sum();
            if let Some(last) = percents.last_mut() {
                *last += Decimal::from(100) - assigned;
            }
            percents
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// For any total and percentage basis, the split sums exactly to
        /// the (rounded) total.
        #[test]
        fn prop_split_sum_invariant(
            cents in 1i64..100_000_000i64,
            percents in percent_basis_strategy(),
        ) {
            let total = Decimal::new(cents, 2);
            let shares = split_by_percentages(total, &percents, 2);
            prop_assert_eq!(shares.iter().copied().sum::<Decimal>(), total);
        }

        /// Any allocation entry produced is balanced.
        #[test]
        fn prop_allocation_entry_balanced(
            cents in 1i64..100_000_000i64,
            percents in percent_basis_strategy(),
        ) {
            use crate::close::types::{AllocationParams, AllocationTarget};
            use crate::ledger::validate_lines;
            use crate::period::PeriodStatus;
            use chrono::NaiveDate;
            use saldo_shared::types::{AccountId, CompanyId, PeriodId};

            let params = AllocationParams {
                total: Decimal::new(cents, 2),
                source_account: AccountId::new(),
                targets: percents
                    .iter()
                    .map(|p| AllocationTarget { account_id: AccountId::new(), percent: *p })
                    .collect(),
                memo: None,
            };
            let period = crate::period::Period {
                id: PeriodId::new(),
                company_id: CompanyId::new(),
                label: "2024-03".to_string(),
                start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
                status: PeriodStatus::Locked,
                closed_at: None,
            };

            let entry = build_allocation_entry(&params, &period).unwrap();
            prop_assert!(validate_lines(&entry.lines).balanced);
        }
    }
}
