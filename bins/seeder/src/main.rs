//! Demo data seeder for Tally development and testing.
//!
//! Creates a fresh tenant with its chart of accounts, a few customers,
//! suppliers and products, then drives one document through each lifecycle
//! so every report has something to show.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tally_core::fulfillment::NewOrderLine;
use tally_core::ledger::SystemAccount;
use tally_core::payments::PaymentMethod;
use tally_db::{
    AccountRepository, BillRepository, CheckRepository, InvoiceRepository, PartyRepository,
    PaymentRepository, ProductRepository, SalesOrderRepository, SalesReceiptRepository,
    TenantRepository,
    repositories::{
        AccountFilter, CreateBillInput, CreateCheckInput, CreateInvoiceInput, CreateOrderInput,
        CreatePartyInput, CreateProductInput, CreateSalesReceiptInput, PayBillInput,
        RecordPaymentInput,
    },
};
use tally_shared::BillingConfig;
use tally_shared::types::{AccountId, CustomerId, ProductId, SupplierId, TenantId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    println!("Connecting to database...");
    let db = tally_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding demo tenant...");
    let tenant = TenantRepository::new(db.clone())
        .create("Demo Trading Co")
        .await?;
    let tenant_id = TenantId::from(tenant.id);
    println!("  Tenant {tenant_id}");

    let today = Utc::now().date_naive();
    let parties = seed_parties(&db, tenant_id).await?;
    let products = seed_products(&db, tenant_id).await?;
    seed_receivables(&db, tenant_id, &parties, today).await?;
    seed_payables(&db, tenant_id, &parties, today).await?;
    seed_order(&db, tenant_id, &parties, &products, today).await?;
    seed_cashbook(&db, tenant_id, today).await?;

    println!("Seeding complete!");
    Ok(())
}

struct Parties {
    customers: Vec<CustomerId>,
    suppliers: Vec<SupplierId>,
}

fn party(name: &str, email: &str) -> CreatePartyInput {
    CreatePartyInput {
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: None,
    }
}

async fn seed_parties(db: &DatabaseConnection, tenant_id: TenantId) -> anyhow::Result<Parties> {
    println!("Seeding customers and suppliers...");
    let repo = PartyRepository::new(db.clone());

    let mut customers = Vec::new();
    for (name, email) in [
        ("Acme Retail", "ap@acme-retail.test"),
        ("Northwind Foods", "billing@northwind.test"),
    ] {
        let customer = repo.create_customer(tenant_id, party(name, email)).await?;
        customers.push(CustomerId::from_uuid(customer.id));
    }

    let mut suppliers = Vec::new();
    for (name, email) in [
        ("Bluefin Supply", "invoices@bluefin.test"),
        ("Harbor Logistics", "accounts@harbor.test"),
    ] {
        let supplier = repo.create_supplier(tenant_id, party(name, email)).await?;
        suppliers.push(SupplierId::from_uuid(supplier.id));
    }

    Ok(Parties {
        customers,
        suppliers,
    })
}

async fn seed_products(
    db: &DatabaseConnection,
    tenant_id: TenantId,
) -> anyhow::Result<Vec<ProductId>> {
    println!("Seeding products...");
    let repo = ProductRepository::new(db.clone());

    let mut ids = Vec::new();
    for (sku, name, unit_price, stock_quantity) in [
        ("WID-001", "Standard Widget", dec!(12.50), 200),
        ("WID-002", "Deluxe Widget", dec!(48.00), 40),
        ("GAD-100", "Gadget Kit", dec!(129.99), 5),
    ] {
        let product = repo
            .create(
                tenant_id,
                CreateProductInput {
                    sku: sku.to_string(),
                    name: name.to_string(),
                    unit_price,
                    stock_quantity,
                },
            )
            .await?;
        ids.push(ProductId::from_uuid(product.id));
    }
    Ok(ids)
}

/// One partly paid invoice and one that is already overdue.
async fn seed_receivables(
    db: &DatabaseConnection,
    tenant_id: TenantId,
    parties: &Parties,
    today: NaiveDate,
) -> anyhow::Result<()> {
    println!("Seeding invoices and payments...");
    let invoices = InvoiceRepository::new(db.clone());

    let current = invoices
        .create(
            tenant_id,
            CreateInvoiceInput {
                customer_id: parties.customers[0],
                invoice_number: None,
                date: today - Duration::days(10),
                due_date: today + Duration::days(20),
                total_amount: dec!(1500.00),
                sales_order_id: None,
                notes: Some("Quarterly service".to_string()),
                send: true,
            },
        )
        .await?;

    PaymentRepository::new(db.clone())
        .record(
            tenant_id,
            current.summary.invoice.id,
            RecordPaymentInput {
                amount: dec!(600.00),
                date: today - Duration::days(3),
                payment_method: PaymentMethod::Bank,
                reference: Some("TRF-88121".to_string()),
                idempotency_key: Some(format!("seed-{}", current.summary.invoice.id)),
            },
        )
        .await?;

    invoices
        .create(
            tenant_id,
            CreateInvoiceInput {
                customer_id: parties.customers[1],
                invoice_number: None,
                date: today - Duration::days(75),
                due_date: today - Duration::days(45),
                total_amount: dec!(820.40),
                sales_order_id: None,
                notes: None,
                send: true,
            },
        )
        .await?;
    Ok(())
}

/// One approved bill with a partial payment and one left in draft.
async fn seed_payables(
    db: &DatabaseConnection,
    tenant_id: TenantId,
    parties: &Parties,
    today: NaiveDate,
) -> anyhow::Result<()> {
    println!("Seeding bills...");
    let bills = BillRepository::new(db.clone());

    let approved = bills
        .create(
            tenant_id,
            CreateBillInput {
                supplier_id: parties.suppliers[0],
                bill_number: Some("BF-2291".to_string()),
                date: today - Duration::days(40),
                due_date: today - Duration::days(10),
                total_amount: dec!(2400.00),
                terms: Some("Net 30".to_string()),
                notes: None,
                approve: true,
            },
        )
        .await?;

    bills
        .pay(
            tenant_id,
            approved.bill.id,
            PayBillInput {
                amount: dec!(1000.00),
                date: today - Duration::days(5),
                payment_method: PaymentMethod::Bank,
                reference: None,
            },
        )
        .await?;

    bills
        .create(
            tenant_id,
            CreateBillInput {
                supplier_id: parties.suppliers[1],
                bill_number: None,
                date: today,
                due_date: today + Duration::days(14),
                total_amount: dec!(310.75),
                terms: Some("Net 14".to_string()),
                notes: Some("Freight, awaiting approval".to_string()),
                approve: false,
            },
        )
        .await?;
    Ok(())
}

/// A confirmed order, which deducts stock and raises its own invoice.
async fn seed_order(
    db: &DatabaseConnection,
    tenant_id: TenantId,
    parties: &Parties,
    products: &[ProductId],
    today: NaiveDate,
) -> anyhow::Result<()> {
    println!("Seeding sales order...");
    let orders = SalesOrderRepository::new(db.clone());

    let order = orders
        .create(
            tenant_id,
            CreateOrderInput {
                order_number: "SO-1001".to_string(),
                customer_id: parties.customers[0],
                date: today,
                notes: None,
                lines: vec![
                    NewOrderLine {
                        product_id: products[0],
                        quantity: 20,
                        unit_price: None,
                    },
                    NewOrderLine {
                        product_id: products[2],
                        quantity: 2,
                        unit_price: Some(dec!(119.99)),
                    },
                ],
            },
        )
        .await?;

    let terms = BillingConfig::default().payment_terms_days;
    let confirmed = orders.confirm(tenant_id, order.order.id, terms).await?;
    println!(
        "  Order {} invoiced as {}",
        confirmed.order.order_number, confirmed.invoice.invoice_number
    );
    Ok(())
}

/// A counter sale banked the same day and a rent check drawn against it.
async fn seed_cashbook(
    db: &DatabaseConnection,
    tenant_id: TenantId,
    today: NaiveDate,
) -> anyhow::Result<()> {
    println!("Seeding sales receipt and check...");
    let receipt = SalesReceiptRepository::new(db.clone())
        .create(
            tenant_id,
            CreateSalesReceiptInput {
                customer_id: None,
                receipt_number: None,
                date: today - Duration::days(2),
                total_amount: dec!(640.00),
                payment_method: PaymentMethod::Bank,
                notes: Some("Walk-in counter sale".to_string()),
            },
        )
        .await?;

    let checking = AccountRepository::new(db.clone())
        .list(tenant_id, AccountFilter::default())
        .await?
        .into_iter()
        .find(|account| account.account_number == SystemAccount::Checking.number())
        .context("Checking account missing from seeded chart")?;
    let check = CheckRepository::new(db.clone())
        .create(
            tenant_id,
            CreateCheckInput {
                bank_account_id: AccountId::from_uuid(checking.id),
                expense_account_id: None,
                supplier_id: None,
                payee_name: Some("Harbour Properties".to_string()),
                check_number: None,
                date: today - Duration::days(1),
                total_amount: dec!(250.00),
                memo: Some("Storage unit rent".to_string()),
            },
        )
        .await?;
    println!(
        "  Receipt {} and check {}",
        receipt.receipt_number, check.check_number
    );
    Ok(())
}
