//! Period repository for lifecycle and checklist database operations.
//!
//! Lifecycle transitions are applied as atomic conditional updates
//! (`UPDATE ... WHERE status = <expected>`) checked via `rows_affected`,
//! so two concurrent callers never both succeed; the loser observes a
//! state-conflict error instead of corrupting the lifecycle.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use saldo_core::period::{
    ChecklistItem, Period, PeriodError, PeriodService, PeriodStatus as DomainStatus,
};
use saldo_shared::types::{ChecklistItemId, CompanyId, PeriodId};

use crate::entities::{checklist_items, periods, sea_orm_active_enums::PeriodStatus};

/// Error types for period store operations.
#[derive(Debug, thiserror::Error)]
pub enum PeriodStoreError {
    /// Lifecycle rule violation (invalid transition, checklist gate, frozen checklist).
    #[error(transparent)]
    Lifecycle(#[from] PeriodError),

    /// Period not found in the caller's company scope.
    #[error("Period not found: {0}")]
    PeriodNotFound(Uuid),

    /// Checklist item not found on the period.
    #[error("Checklist item not found: {0}")]
    ItemNotFound(Uuid),

    /// Start date must be before end date.
    #[error("Start date must be before end date")]
    InvalidDateRange,

    /// Calendar overlaps an existing period.
    #[error("Period range overlaps existing period: {0}")]
    OverlappingPeriods(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a period calendar.
#[derive(Debug, Clone)]
pub struct CreateCalendarInput {
    /// Company the calendar belongs to.
    pub company_id: Uuid,
    /// First day of the calendar.
    pub start_date: NaiveDate,
    /// Last day of the calendar.
    pub end_date: NaiveDate,
    /// Checklist template applied to every generated period.
    pub checklist: Vec<String>,
}

/// Period repository.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    db: DatabaseConnection,
}

impl PeriodRepository {
    /// Creates a new period repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates monthly periods for a date range, each seeded with the
    /// checklist template.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid, overlaps an existing
    /// period for the company, or the database operation fails.
    pub async fn create_calendar(
        &self,
        input: CreateCalendarInput,
    ) -> Result<Vec<periods::Model>, PeriodStoreError> {
        if input.start_date >= input.end_date {
            return Err(PeriodStoreError::InvalidDateRange);
        }

        let overlapping = periods::Entity::find()
            .filter(periods::Column::CompanyId.eq(input.company_id))
            .filter(periods::Column::StartDate.lte(input.end_date))
            .filter(periods::Column::EndDate.gte(input.start_date))
            .one(&self.db)
            .await?;

        if let Some(existing) = overlapping {
            return Err(PeriodStoreError::OverlappingPeriods(existing.label));
        }

        let txn = self.db.begin().await?;
        let now = Utc::now().into();

        let generated = generate_monthly_periods(input.start_date, input.end_date);
        let mut inserted = Vec::with_capacity(generated.len());

        for span in generated {
            let period_id = Uuid::now_v7();
            let period = periods::ActiveModel {
                id: Set(period_id),
                company_id: Set(input.company_id),
                label: Set(span.label),
                start_date: Set(span.start_date),
                end_date: Set(span.end_date),
                status: Set(PeriodStatus::Open),
                closed_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };
            let period = period.insert(&txn).await?;

            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            for (order, title) in input.checklist.iter().enumerate() {
                let item = checklist_items::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    period_id: Set(period_id),
                    title: Set(title.clone()),
                    completed: Set(false),
                    sort_order: Set(order as i16),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                item.insert(&txn).await?;
            }

            inserted.push(period);
        }

        txn.commit().await?;
        Ok(inserted)
    }

    /// Finds a period by ID within the company scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        company_id: Uuid,
        period_id: Uuid,
    ) -> Result<Option<periods::Model>, PeriodStoreError> {
        let period = periods::Entity::find_by_id(period_id)
            .filter(periods::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;
        Ok(period)
    }

    /// Lists the company's periods in calendar order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, company_id: Uuid) -> Result<Vec<periods::Model>, PeriodStoreError> {
        let periods = periods::Entity::find()
            .filter(periods::Column::CompanyId.eq(company_id))
            .order_by_asc(periods::Column::StartDate)
            .all(&self.db)
            .await?;
        Ok(periods)
    }

    /// Finds the period containing a specific date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period_for_date(
        &self,
        company_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<periods::Model>, PeriodStoreError> {
        let period = periods::Entity::find()
            .filter(periods::Column::CompanyId.eq(company_id))
            .filter(periods::Column::StartDate.lte(date))
            .filter(periods::Column::EndDate.gte(date))
            .one(&self.db)
            .await?;
        Ok(period)
    }

    /// Lists a period's checklist in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn checklist(
        &self,
        period_id: Uuid,
    ) -> Result<Vec<ChecklistItem>, PeriodStoreError> {
        let items = checklist_items::Entity::find()
            .filter(checklist_items::Column::PeriodId.eq(period_id))
            .order_by_asc(checklist_items::Column::SortOrder)
            .all(&self.db)
            .await?;
        Ok(items.iter().map(item_to_domain).collect())
    }

    /// Counts the period's incomplete checklist items.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn incomplete_checklist_count(
        &self,
        period_id: Uuid,
    ) -> Result<u64, PeriodStoreError> {
        let count = checklist_items::Entity::find()
            .filter(checklist_items::Column::PeriodId.eq(period_id))
            .filter(checklist_items::Column::Completed.eq(false))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Begins closing a period: `open -> locked`, freezing user postings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the period is not open (including
    /// when a concurrent caller locked it first).
    pub async fn start_close(
        &self,
        company_id: Uuid,
        period_id: Uuid,
    ) -> Result<periods::Model, PeriodStoreError> {
        let period = self
            .find_by_id(company_id, period_id)
            .await?
            .ok_or(PeriodStoreError::PeriodNotFound(period_id))?;

        PeriodService::start_close(period.status.into())?;

        let applied = self
            .transition(period_id, PeriodStatus::Open, PeriodStatus::Locked, false)
            .await?;
        if !applied {
            // Lost the race: report the transition against the status the
            // winner left behind.
            let current = self.current_status(company_id, period_id).await?;
            return Err(PeriodError::InvalidTransition {
                from: current,
                to: DomainStatus::Locked,
            }
            .into());
        }

        self.find_by_id(company_id, period_id)
            .await?
            .ok_or(PeriodStoreError::PeriodNotFound(period_id))
    }

    /// Finalizes a period close: `locked -> closing -> closed`.
    ///
    /// Gated on a fully completed checklist; the checklist is re-read on
    /// every attempt, so an item toggled back to incomplete blocks the
    /// next call.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistIncomplete` when items remain open, or
    /// `InvalidTransition` if the period is not locked.
    pub async fn complete_close(
        &self,
        company_id: Uuid,
        period_id: Uuid,
    ) -> Result<periods::Model, PeriodStoreError> {
        let period = self
            .find_by_id(company_id, period_id)
            .await?
            .ok_or(PeriodStoreError::PeriodNotFound(period_id))?;

        let incomplete = self.incomplete_checklist_count(period_id).await?;
        PeriodService::complete_close(
            period.status.into(),
            usize::try_from(incomplete).unwrap_or(usize::MAX),
        )?;

        let applied = self
            .transition(period_id, PeriodStatus::Locked, PeriodStatus::Closing, false)
            .await?;
        if !applied {
            let current = self.current_status(company_id, period_id).await?;
            return Err(PeriodError::InvalidTransition {
                from: current,
                to: DomainStatus::Closing,
            }
            .into());
        }

        // The close window stays observable (closing) until this commits.
        let finalized = self
            .transition(period_id, PeriodStatus::Closing, PeriodStatus::Closed, true)
            .await?;
        if !finalized {
            let current = self.current_status(company_id, period_id).await?;
            return Err(PeriodError::InvalidTransition {
                from: current,
                to: DomainStatus::Closed,
            }
            .into());
        }

        self.find_by_id(company_id, period_id)
            .await?
            .ok_or(PeriodStoreError::PeriodNotFound(period_id))
    }

    /// Toggles a checklist item.
    ///
    /// Legal at any period status except `closed`, whose checklist is
    /// frozen for audit.
    ///
    /// # Errors
    ///
    /// Returns `PeriodClosed` for a closed period, or not-found errors for
    /// unknown period/item.
    pub async fn toggle_checklist_item(
        &self,
        company_id: Uuid,
        period_id: Uuid,
        item_id: Uuid,
        completed: bool,
    ) -> Result<ChecklistItem, PeriodStoreError> {
        let period = self
            .find_by_id(company_id, period_id)
            .await?
            .ok_or(PeriodStoreError::PeriodNotFound(period_id))?;

        PeriodService::validate_checklist_mutable(period.status.into())?;

        let item = checklist_items::Entity::find_by_id(item_id)
            .filter(checklist_items::Column::PeriodId.eq(period_id))
            .one(&self.db)
            .await?
            .ok_or(PeriodStoreError::ItemNotFound(item_id))?;

        let mut active: checklist_items::ActiveModel = item.into();
        active.completed = Set(completed);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(item_to_domain(&updated))
    }

    /// Applies one conditional lifecycle step; returns false if the
    /// expected status no longer held.
    async fn transition(
        &self,
        period_id: Uuid,
        expected: PeriodStatus,
        next: PeriodStatus,
        stamp_closed_at: bool,
    ) -> Result<bool, PeriodStoreError> {
        let now = Utc::now();
        let mut update = periods::Entity::update_many()
            .col_expr(periods::Column::Status, Expr::value(next))
            .col_expr(periods::Column::UpdatedAt, Expr::value(now))
            .filter(periods::Column::Id.eq(period_id))
            .filter(periods::Column::Status.eq(expected));

        if stamp_closed_at {
            update = update.col_expr(periods::Column::ClosedAt, Expr::value(now));
        }

        let result = update.exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn current_status(
        &self,
        company_id: Uuid,
        period_id: Uuid,
    ) -> Result<DomainStatus, PeriodStoreError> {
        let period = self
            .find_by_id(company_id, period_id)
            .await?
            .ok_or(PeriodStoreError::PeriodNotFound(period_id))?;
        Ok(period.status.into())
    }
}

/// Converts a period row into the core domain type.
#[must_use]
pub fn to_domain(model: &periods::Model) -> Period {
    Period {
        id: PeriodId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        label: model.label.clone(),
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status.clone().into(),
        closed_at: model.closed_at.map(Into::into),
    }
}

/// Converts a checklist item row into the core domain type.
#[must_use]
pub fn item_to_domain(model: &checklist_items::Model) -> ChecklistItem {
    ChecklistItem {
        id: ChecklistItemId::from_uuid(model.id),
        period_id: PeriodId::from_uuid(model.period_id),
        title: model.title.clone(),
        completed: model.completed,
        sort_order: model.sort_order,
    }
}

/// A generated monthly span.
struct PeriodSpan {
    label: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

/// Generates monthly spans covering a date range.
///
/// Labels follow the "YYYY-MM" convention ("2024-01").
fn generate_monthly_periods(start_date: NaiveDate, end_date: NaiveDate) -> Vec<PeriodSpan> {
    let mut spans = Vec::new();
    let mut current = start_date;

    while current <= end_date {
        let month_end = last_day_of_month(current.year(), current.month());
        let span_end = if month_end > end_date {
            end_date
        } else {
            month_end
        };

        spans.push(PeriodSpan {
            label: format!("{:04}-{:02}", current.year(), current.month()),
            start_date: current,
            end_date: span_end,
        });

        // Move to first day of next month
        current = if current.month() == 12 {
            NaiveDate::from_ymd_opt(current.year() + 1, 1, 1).unwrap()
        } else {
            NaiveDate::from_ymd_opt(current.year(), current.month() + 1, 1).unwrap()
        };
    }

    spans
}

/// Returns the last day of a month.
fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_monthly_periods_full_year() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();

        let spans = generate_monthly_periods(start, end);

        assert_eq!(spans.len(), 12);
        assert_eq!(spans[0].label, "2024-01");
        assert_eq!(
            spans[0].start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            spans[0].end_date,
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );

        assert_eq!(spans[11].label, "2024-12");
        assert_eq!(
            spans[11].end_date,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }

    #[test]
    fn test_generate_monthly_periods_partial_year() {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();

        let spans = generate_monthly_periods(start, end);

        assert_eq!(spans.len(), 12);
        assert_eq!(spans[0].label, "2024-04");
        assert_eq!(spans[11].label, "2025-03");
    }

    #[test]
    fn test_generate_monthly_periods_spans_do_not_overlap() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        let spans = generate_monthly_periods(start, end);
        for pair in spans.windows(2) {
            assert!(pair[0].end_date < pair[1].start_date);
        }
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2024, 1),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        ); // Leap year
        assert_eq!(
            last_day_of_month(2023, 2),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        assert_eq!(
            last_day_of_month(2024, 12),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
    }
}
