//! Recurring journal template instantiation.

use crate::ledger::{EntrySource, JournalEntryInput, JournalLine};
use crate::period::Period;

use super::types::RecurringTemplate;

/// Filters the templates due for a period.
///
/// All active templates are due each period; paused templates are skipped.
#[must_use]
pub fn due_templates(templates: &[RecurringTemplate]) -> Vec<&RecurringTemplate> {
    templates.iter().filter(|t| t.active).collect()
}

/// Instantiates one concrete journal entry from a template.
///
/// The entry is dated at period end and marked as close-run sourced; it
/// still has to pass the posting gate, and a template whose entry fails
/// validation is recorded as a run error rather than aborting the batch.
#[must_use]
pub fn instantiate_template(template: &RecurringTemplate, period: &Period) -> JournalEntryInput {
    let lines = template
        .lines
        .iter()
        .map(|line| JournalLine {
            account_id: Some(line.account_id),
            debit: line.debit,
            credit: line.credit,
            memo: line.memo.clone(),
        })
        .collect();

    JournalEntryInput {
        company_id: template.company_id,
        entry_date: period.end_date,
        posting_date: period.end_date,
        description: template.name.clone(),
        reference: Some(format!("REC-{}", period.label)),
        memo: template.memo.clone(),
        lines,
        source: EntrySource::CloseRun,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::close::types::TemplateLine;
    use crate::period::PeriodStatus;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use saldo_shared::types::{AccountId, CompanyId, PeriodId, RecurringTemplateId};

    fn make_period(company_id: CompanyId) -> Period {
        Period {
            id: PeriodId::new(),
            company_id,
            label: "2024-01".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            status: PeriodStatus::Locked,
            closed_at: None,
        }
    }

    fn make_template(company_id: CompanyId, active: bool) -> RecurringTemplate {
        RecurringTemplate {
            id: RecurringTemplateId::new(),
            company_id,
            name: "Monthly rent".to_string(),
            memo: Some("Auto-posted".to_string()),
            active,
            lines: vec![
                TemplateLine {
                    account_id: AccountId::new(),
                    debit: dec!(1200.00),
                    credit: Decimal::ZERO,
                    memo: Some("Rent expense".to_string()),
                },
                TemplateLine {
                    account_id: AccountId::new(),
                    debit: Decimal::ZERO,
                    credit: dec!(1200.00),
                    memo: None,
                },
            ],
        }
    }

    #[test]
    fn test_due_templates_filters_inactive() {
        let company = CompanyId::new();
        let templates = vec![
            make_template(company, true),
            make_template(company, false),
            make_template(company, true),
        ];

        let due = due_templates(&templates);
        assert_eq!(due.len(), 2);
        assert!(due.iter().all(|t| t.active));
    }

    #[test]
    fn test_instantiate_dates_entry_at_period_end() {
        let company = CompanyId::new();
        let period = make_period(company);
        let template = make_template(company, true);

        let entry = instantiate_template(&template, &period);
        assert_eq!(entry.posting_date, period.end_date);
        assert_eq!(entry.entry_date, period.end_date);
        assert_eq!(entry.source, EntrySource::CloseRun);
        assert_eq!(entry.description, "Monthly rent");
        assert_eq!(entry.reference.as_deref(), Some("REC-2024-01"));
        assert_eq!(entry.lines.len(), 2);
        assert_eq!(entry.lines[0].debit, dec!(1200.00));
        assert_eq!(entry.lines[1].credit, dec!(1200.00));
    }

    #[test]
    fn test_instantiated_entry_passes_posting_gate() {
        use crate::ledger::validate_for_posting;

        let company = CompanyId::new();
        let period = make_period(company);
        let template = make_template(company, true);

        let entry = instantiate_template(&template, &period);
        assert!(validate_for_posting(&entry, period.status, |_| true).is_ok());
    }
}
