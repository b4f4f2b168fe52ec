//! Initial database migration.
//!
//! Creates all tables, enums and ledger triggers for the billing engine.

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
        // PART 2: TENANTS
        // ============================================================
        db.execute_unprepared(TENANTS_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS & LEDGER
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(JOURNAL_SQL).await?;

        // ============================================================
        // PART 4: PARTIES & CATALOG
        // ============================================================
        db.execute_unprepared(PARTIES_SQL).await?;
        db.execute_unprepared(PRODUCTS_SQL).await?;

        // ============================================================
        // PART 5: RECEIVABLES
        // ============================================================
        db.execute_unprepared(SALES_ORDERS_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(CREDIT_MEMOS_SQL).await?;

        // ============================================================
        // PART 6: PAYABLES
        // ============================================================
        db.execute_unprepared(BILLS_SQL).await?;

        // ============================================================
        // PART 7: CASH TRANSACTIONS
        // ============================================================
        db.execute_unprepared(CASHBOOK_SQL).await?;

        // ============================================================
        // PART 8: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

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
CREATE TYPE account_type AS ENUM (
    'BANK',
    'ACCOUNTS_RECEIVABLE',
    'OTHER_CURRENT_ASSET',
    'FIXED_ASSET',
    'OTHER_ASSET',
    'ACCOUNTS_PAYABLE',
    'CREDIT_CARD',
    'OTHER_CURRENT_LIABILITY',
    'LONG_TERM_LIABILITY',
    'EQUITY',
    'INCOME',
    'OTHER_INCOME',
    'COST_OF_GOODS_SOLD',
    'EXPENSE',
    'OTHER_EXPENSE'
);

CREATE TYPE entry_source AS ENUM (
    'manual',
    'invoice',
    'payment',
    'credit_memo',
    'bill',
    'bill_payment',
    'sales_receipt',
    'check',
    'reversal'
);

CREATE TYPE invoice_status AS ENUM (
    'DRAFT',
    'SENT',
    'PARTIALLY_PAID',
    'PAID',
    'CANCELLED'
);

CREATE TYPE bill_status AS ENUM (
    'DRAFT',
    'OPEN',
    'PARTIALLY_PAID',
    'PAID',
    'CANCELLED'
);

CREATE TYPE payment_method AS ENUM ('CASH', 'BANK', 'CREDIT_CARD', 'OTHER');

CREATE TYPE sales_order_status AS ENUM ('DRAFT', 'CONFIRMED', 'CANCELLED');

CREATE TYPE credit_memo_status AS ENUM ('APPLIED', 'VOID');

CREATE TYPE cash_document_status AS ENUM ('POSTED', 'VOID');
";

const TENANTS_SQL: &str = r"
CREATE TABLE tenants (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    journal_sequence BIGINT NOT NULL DEFAULT 0,
    invoice_sequence BIGINT NOT NULL DEFAULT 0,
    bill_sequence BIGINT NOT NULL DEFAULT 0,
    credit_memo_sequence BIGINT NOT NULL DEFAULT 0,
    sales_receipt_sequence BIGINT NOT NULL DEFAULT 0,
    check_sequence BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    account_number VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    detail_type VARCHAR(100),
    description TEXT,
    parent_id UUID REFERENCES accounts(id),
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    is_system BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, account_number)
);

CREATE INDEX idx_accounts_tenant ON accounts(tenant_id) WHERE is_active = true;
CREATE INDEX idx_accounts_type ON accounts(tenant_id, account_type);
";

const JOURNAL_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    entry_number VARCHAR(30) NOT NULL,
    date DATE NOT NULL,
    memo TEXT NOT NULL,
    is_adjusting BOOLEAN NOT NULL DEFAULT false,
    source entry_source NOT NULL,
    reverses_entry_id UUID UNIQUE REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, entry_number)
);

CREATE INDEX idx_journal_entries_date ON journal_entries(tenant_id, date);

CREATE TABLE journal_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id),
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    memo VARCHAR(500),
    sort_order INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_debit_or_credit CHECK (
        (debit > 0 AND credit = 0) OR (debit = 0 AND credit > 0)
    )
);

CREATE INDEX idx_journal_lines_entry ON journal_lines(entry_id);
CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const PARTIES_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_customers_tenant ON customers(tenant_id, name);

CREATE TABLE suppliers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_suppliers_tenant ON suppliers(tenant_id, name);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    sku VARCHAR(50) NOT NULL,
    name VARCHAR(255) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL CHECK (unit_price >= 0),
    stock_quantity INTEGER NOT NULL DEFAULT 0 CHECK (stock_quantity >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, sku)
);
";

const SALES_ORDERS_SQL: &str = r"
CREATE TABLE sales_orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    order_number VARCHAR(50) NOT NULL,
    customer_id UUID NOT NULL REFERENCES customers(id),
    date DATE NOT NULL,
    status sales_order_status NOT NULL DEFAULT 'DRAFT',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, order_number)
);

CREATE TABLE sales_order_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    order_id UUID NOT NULL REFERENCES sales_orders(id) ON DELETE CASCADE,
    product_id UUID NOT NULL REFERENCES products(id),
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    unit_price NUMERIC(19, 4) NOT NULL CHECK (unit_price >= 0),
    sort_order INTEGER NOT NULL
);

CREATE INDEX idx_sales_order_lines_order ON sales_order_lines(order_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    invoice_number VARCHAR(60) NOT NULL,
    customer_id UUID NOT NULL REFERENCES customers(id),
    sales_order_id UUID UNIQUE REFERENCES sales_orders(id),
    date DATE NOT NULL,
    due_date DATE NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL,
    amount_paid NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status invoice_status NOT NULL DEFAULT 'DRAFT',
    notes TEXT,
    journal_entry_id UUID REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, invoice_number),
    CONSTRAINT chk_invoice_total_positive CHECK (total_amount > 0),
    CONSTRAINT chk_invoice_paid_range CHECK (amount_paid >= 0 AND amount_paid <= total_amount),
    CONSTRAINT chk_invoice_due_after_date CHECK (due_date >= date)
);

CREATE INDEX idx_invoices_customer ON invoices(tenant_id, customer_id);
CREATE INDEX idx_invoices_open ON invoices(tenant_id, due_date)
    WHERE status IN ('SENT', 'PARTIALLY_PAID');
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    invoice_id UUID NOT NULL REFERENCES invoices(id),
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    date DATE NOT NULL,
    payment_method payment_method NOT NULL,
    reference VARCHAR(255),
    idempotency_key VARCHAR(255),
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id),
    reversal_entry_id UUID REFERENCES journal_entries(id),
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, idempotency_key)
);

CREATE INDEX idx_payments_invoice ON payments(invoice_id) WHERE deleted_at IS NULL;
";

const CREDIT_MEMOS_SQL: &str = r"
CREATE TABLE credit_memos (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    memo_number VARCHAR(60) NOT NULL,
    customer_id UUID NOT NULL REFERENCES customers(id),
    invoice_id UUID NOT NULL REFERENCES invoices(id),
    date DATE NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL CHECK (total_amount > 0),
    status credit_memo_status NOT NULL DEFAULT 'APPLIED',
    notes TEXT,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id),
    reversal_entry_id UUID REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, memo_number)
);

CREATE INDEX idx_credit_memos_invoice ON credit_memos(invoice_id);
";

const BILLS_SQL: &str = r"
CREATE TABLE bills (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    bill_number VARCHAR(60) NOT NULL,
    supplier_id UUID NOT NULL REFERENCES suppliers(id),
    date DATE NOT NULL,
    due_date DATE NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL,
    amount_paid NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status bill_status NOT NULL DEFAULT 'DRAFT',
    terms VARCHAR(100),
    notes TEXT,
    journal_entry_id UUID REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, bill_number),
    CONSTRAINT chk_bill_total_positive CHECK (total_amount > 0),
    CONSTRAINT chk_bill_paid_range CHECK (amount_paid >= 0 AND amount_paid <= total_amount),
    CONSTRAINT chk_bill_due_after_date CHECK (due_date >= date)
);

CREATE INDEX idx_bills_supplier ON bills(tenant_id, supplier_id);

CREATE TABLE bill_payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    bill_id UUID NOT NULL REFERENCES bills(id),
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    date DATE NOT NULL,
    payment_method payment_method NOT NULL,
    reference VARCHAR(255),
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id),
    reversal_entry_id UUID REFERENCES journal_entries(id),
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_bill_payments_bill ON bill_payments(bill_id) WHERE deleted_at IS NULL;
";

const CASHBOOK_SQL: &str = r"
CREATE TABLE sales_receipts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    receipt_number VARCHAR(60) NOT NULL,
    customer_id UUID REFERENCES customers(id),
    date DATE NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL CHECK (total_amount > 0),
    payment_method payment_method NOT NULL,
    deposit_account_id UUID NOT NULL REFERENCES accounts(id),
    status cash_document_status NOT NULL DEFAULT 'POSTED',
    notes TEXT,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id),
    reversal_entry_id UUID REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, receipt_number)
);

CREATE INDEX idx_sales_receipts_date ON sales_receipts(tenant_id, date);

CREATE TABLE checks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    check_number VARCHAR(60) NOT NULL,
    bank_account_id UUID NOT NULL REFERENCES accounts(id),
    expense_account_id UUID NOT NULL REFERENCES accounts(id),
    supplier_id UUID REFERENCES suppliers(id),
    payee_name VARCHAR(255) NOT NULL,
    date DATE NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL CHECK (total_amount > 0),
    memo TEXT,
    status cash_document_status NOT NULL DEFAULT 'POSTED',
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id),
    reversal_entry_id UUID REFERENCES journal_entries(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (tenant_id, check_number)
);

CREATE INDEX idx_checks_bank_account ON checks(tenant_id, bank_account_id);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_entry_balance
-- Backstop for the application check: debits = credits per entry
-- ============================================================
CREATE OR REPLACE FUNCTION check_entry_balance()
RETURNS TRIGGER AS $$
DECLARE
    total_debit NUMERIC(19, 4);
    total_credit NUMERIC(19, 4);
BEGIN
    SELECT
        COALESCE(SUM(debit), 0),
        COALESCE(SUM(credit), 0)
    INTO total_debit, total_credit
    FROM journal_lines
    WHERE entry_id = NEW.entry_id;

    IF total_debit <> total_credit THEN
        RAISE EXCEPTION 'Journal entry is not balanced. Debit: %, Credit: %',
            total_debit, total_credit;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_entry_balance
AFTER INSERT ON journal_lines
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_entry_balance();

-- ============================================================
-- FUNCTION: prevent_posted_modification
-- Posted lines and entries are immutable; corrections are reversals
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Posted journal data cannot be modified';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_line_modification
BEFORE UPDATE OR DELETE ON journal_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_modification();

CREATE TRIGGER trg_prevent_entry_modification
BEFORE UPDATE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_modification();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

DROP TRIGGER IF EXISTS trg_prevent_entry_modification ON journal_entries;
DROP TRIGGER IF EXISTS trg_prevent_line_modification ON journal_lines;
DROP TRIGGER IF EXISTS trg_check_entry_balance ON journal_lines;
DROP FUNCTION IF EXISTS prevent_posted_modification();
DROP FUNCTION IF EXISTS check_entry_balance();

DROP TABLE IF EXISTS checks CASCADE;
DROP TABLE IF EXISTS sales_receipts CASCADE;
DROP TABLE IF EXISTS bill_payments CASCADE;
DROP TABLE IF EXISTS bills CASCADE;
DROP TABLE IF EXISTS credit_memos CASCADE;
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS sales_order_lines CASCADE;
DROP TABLE IF EXISTS sales_orders CASCADE;
DROP TABLE IF EXISTS products CASCADE;
DROP TABLE IF EXISTS suppliers CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS tenants CASCADE;

DROP TYPE IF EXISTS cash_document_status;
DROP TYPE IF EXISTS credit_memo_status;
DROP TYPE IF EXISTS sales_order_status;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS bill_status;
DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS entry_source;
DROP TYPE IF EXISTS account_type;
";
