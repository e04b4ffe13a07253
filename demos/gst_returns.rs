//! Building and saving GSTR-1 and GSTR-3B return files

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use gst_books::{
    export, Books, BooksConfig, Invoice, InvoiceKind, LineItem, MemoryStorage, ReturnPeriod,
};
use tracing_subscriber::EnvFilter;

fn invoice(
    number: &str,
    kind: InvoiceKind,
    date: NaiveDate,
    party: &str,
    gstin: &str,
    items: &[(&str, i64, i64, i64)],
) -> Invoice {
    items
        .iter()
        .fold(Invoice::new(number, kind, date, party, gstin), |invoice, (name, qty, rate, gst)| {
            invoice.with_line_item(LineItem::new(
                *name,
                BigDecimal::from(*qty),
                BigDecimal::from(*rate),
                BigDecimal::from(*gst),
            ))
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🧾 GST Books - Return Filing\n");

    let config = BooksConfig::from_toml_str(
        r#"
        seller_gstin = "22AAAAA0000A1Z5"
        seller_name = "Corner Store"
        "#,
    )?;
    let mut books = Books::from_config(MemoryStorage::new(), &config)?;

    let jan = |day| NaiveDate::from_ymd_opt(2024, 1, day).ok_or("invalid date");
    books
        .record_invoice(invoice(
            "INV-2024-001",
            InvoiceKind::Purchase,
            jan(15)?,
            "ABC Suppliers Pvt Ltd",
            "27AAAAA0000A1Z5",
            &[("Product A", 10, 1000, 18), ("Service Charges", 1, 1800, 18)],
        ))
        .await?;
    books
        .record_invoice(invoice(
            "SALE-2024-001",
            InvoiceKind::Sales,
            jan(16)?,
            "XYZ Enterprises",
            "29BBBBB1111B2Z6",
            &[("Consulting", 1, 25000, 18), ("Printed manuals", 20, 150, 12)],
        ))
        .await?;

    let period: ReturnPeriod = "2024-01".parse()?;
    let summary = books.return_summary(&period).await?;
    println!("📅 Period {} (due {})", period, period.due_date());
    println!("  Output tax:         ₹{}", summary.output_tax());
    println!("  Input tax credit:   ₹{}", summary.input_tax_credit());
    println!("  Net tax payable:    ₹{}", summary.net_tax_payable());
    println!();

    let out_dir = std::env::temp_dir().join("gst-books-returns");
    let gstr1 = books.gstr1(&period).await?;
    let gstr1_path = export::save_json(&out_dir, &period.gstr1_file_name(), &gstr1)?;
    println!("📤 GSTR-1: {} invoices -> {}", gstr1.invoice_count(), gstr1_path.display());

    let gstr3b = books.gstr3b(&period).await?;
    let gstr3b_path = export::save_json(&out_dir, &period.gstr3b_file_name(), &gstr3b)?;
    println!("📤 GSTR-3B -> {}", gstr3b_path.display());

    let report = books.financial_report().await?;
    let report_path = export::save_json(&out_dir, export::FINANCIAL_REPORT_FILE, &report)?;
    println!("📈 Financial report -> {}", report_path.display());

    Ok(())
}
