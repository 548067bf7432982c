//! Initial database migration.
//!
//! Creates all core tables, enums, and indexes for the ledger-consistency
//! and period-close core.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS READ MODEL
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: PERIODS & CLOSE CHECKLIST
        // ============================================================
        db.execute_unprepared(PERIODS_SQL).await?;
        db.execute_unprepared(CHECKLIST_ITEMS_SQL).await?;

        // ============================================================
        // PART 4: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 5: CLOSE RUNS
        // ============================================================
        db.execute_unprepared(RECURRING_TEMPLATES_SQL).await?;
        db.execute_unprepared(CLOSE_RUNS_SQL).await?;

        // ============================================================
        // PART 6: RECONCILIATION
        // ============================================================
        db.execute_unprepared(BANK_TRANSACTIONS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(RECONCILIATION_MATCHES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Period lifecycle (linear: open -> locked -> closing -> closed)
CREATE TYPE period_status AS ENUM (
    'open',
    'locked',
    'closing',
    'closed'
);

-- Journal entry origin
CREATE TYPE entry_source AS ENUM ('manual', 'close_run');

-- Close-run procedure
CREATE TYPE close_run_type AS ENUM (
    'recurring',
    'allocations',
    'fx_reval'
);

-- Bank transaction reconciliation status
CREATE TYPE bank_transaction_status AS ENUM ('unreconciled', 'reconciled');

-- Bank transaction direction
CREATE TYPE bank_transaction_type AS ENUM ('credit', 'debit');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    code VARCHAR(32) NOT NULL,
    name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    UNIQUE (company_id, code)
);

CREATE INDEX idx_accounts_company ON accounts (company_id);
";

const PERIODS_SQL: &str = r"
CREATE TABLE periods (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    label VARCHAR(32) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status period_status NOT NULL DEFAULT 'open',
    closed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    UNIQUE (company_id, label),
    CHECK (start_date <= end_date)
);

CREATE INDEX idx_periods_company_dates ON periods (company_id, start_date, end_date);
";

const CHECKLIST_ITEMS_SQL: &str = r"
CREATE TABLE checklist_items (
    id UUID PRIMARY KEY,
    period_id UUID NOT NULL REFERENCES periods(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    sort_order SMALLINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_checklist_items_period ON checklist_items (period_id, sort_order);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    period_id UUID NOT NULL REFERENCES periods(id),
    entry_date DATE NOT NULL,
    posting_date DATE NOT NULL,
    description VARCHAR(500) NOT NULL,
    reference VARCHAR(100),
    memo TEXT,
    source entry_source NOT NULL DEFAULT 'manual',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_journal_entries_company_period ON journal_entries (company_id, period_id);
CREATE INDEX idx_journal_entries_posting_date ON journal_entries (company_id, posting_date);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    memo TEXT,
    line_number SMALLINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- exactly one side of a posted line carries an amount
    CHECK (debit >= 0 AND credit >= 0),
    CHECK ((debit = 0) <> (credit = 0))
);

CREATE INDEX idx_journal_lines_entry ON journal_lines (entry_id, line_number);
CREATE INDEX idx_journal_lines_account ON journal_lines (account_id);
";

const RECURRING_TEMPLATES_SQL: &str = r"
CREATE TABLE recurring_templates (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    memo TEXT,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    lines JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_recurring_templates_company ON recurring_templates (company_id, active);
";

const CLOSE_RUNS_SQL: &str = r"
CREATE TABLE close_runs (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    period_id UUID NOT NULL REFERENCES periods(id),
    run_type close_run_type NOT NULL,
    payload JSONB NOT NULL,
    executed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- The exactly-once guarantee: at most one successful run per
-- (company, period, procedure), enforced by the store itself since
-- handlers scale out across processes.
CREATE UNIQUE INDEX uq_close_runs_company_period_type
    ON close_runs (company_id, period_id, run_type);
";

const BANK_TRANSACTIONS_SQL: &str = r"
CREATE TABLE bank_transactions (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    bank_account_id UUID NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    transaction_type bank_transaction_type NOT NULL,
    transaction_date DATE NOT NULL,
    status bank_transaction_status NOT NULL DEFAULT 'unreconciled',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_bank_transactions_company_status
    ON bank_transactions (company_id, status);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    method VARCHAR(50) NOT NULL,
    reference VARCHAR(100),
    received_on DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CHECK (amount >= 0)
);

CREATE INDEX idx_payments_company_amount ON payments (company_id, amount);
";

const RECONCILIATION_MATCHES_SQL: &str = r"
CREATE TABLE reconciliation_matches (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES bank_transactions(id),
    payment_id UUID REFERENCES payments(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    -- one match per reconciled transaction
    UNIQUE (transaction_id)
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS reconciliation_matches;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS bank_transactions;
DROP TABLE IF EXISTS close_runs;
DROP TABLE IF EXISTS recurring_templates;
DROP TABLE IF EXISTS journal_lines;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS checklist_items;
DROP TABLE IF EXISTS periods;
DROP TABLE IF EXISTS accounts;

DROP TYPE IF EXISTS bank_transaction_type;
DROP TYPE IF EXISTS bank_transaction_status;
DROP TYPE IF EXISTS close_run_type;
DROP TYPE IF EXISTS entry_source;
DROP TYPE IF EXISTS period_status;
";
