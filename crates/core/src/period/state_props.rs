//! Property-based tests for the period transition table.

use proptest::prelude::*;

use super::state::PeriodService;
use super::types::PeriodStatus;
use crate::period::PeriodError;

fn status_strategy() -> impl Strategy<Value = PeriodStatus> {
    prop_oneof![
        Just(PeriodStatus::Open),
        Just(PeriodStatus::Locked),
        Just(PeriodStatus::Closing),
        Just(PeriodStatus::Closed),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Exactly three (from, to) pairs are legal: the forward steps of the
    /// linear lifecycle. Everything else is rejected.
    #[test]
    fn prop_transition_table_is_exactly_the_forward_chain(
        from in status_strategy(),
        to in status_strategy(),
    ) {
        let legal = matches!(
            (from, to),
            (PeriodStatus::Open, PeriodStatus::Locked)
                | (PeriodStatus::Locked, PeriodStatus::Closing)
                | (PeriodStatus::Closing, PeriodStatus::Closed)
        );
        prop_assert_eq!(from.can_transition(to), legal);
    }

    /// Closed is terminal: no transition out of it is ever admitted.
    #[test]
    fn prop_closed_is_terminal(to in status_strategy()) {
        prop_assert!(!PeriodStatus::Closed.can_transition(to));
    }

    /// No self-transition is legal; retrying an applied transition must
    /// surface a conflict rather than silently succeed.
    #[test]
    fn prop_no_self_transitions(status in status_strategy()) {
        prop_assert!(!status.can_transition(status));
    }

    /// complete_close never succeeds with an incomplete checklist,
    /// regardless of status.
    #[test]
    fn prop_checklist_gates_close(
        status in status_strategy(),
        missing in 1usize..32,
    ) {
        let result = PeriodService::complete_close(status, missing);
        prop_assert!(result.is_err());
        if status == PeriodStatus::Locked {
            prop_assert!(
                matches!(
                    result,
                    Err(PeriodError::ChecklistIncomplete { missing_count }) if missing_count == missing
                ),
                "expected ChecklistIncomplete with missing_count == {}",
                missing
            );
        }
    }
}
