//! Bill generation, registers and stock reports

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::fs::File;
use gst_books::{
    export, rate_wise_summary, BillDraft, Books, GstCategory, InvoiceKind, LineEdit, LineField,
    GstRate, LineItem, MemoryStorage, ReturnBuilder, StockItem,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🧾 GST Books - Billing Walkthrough\n");

    let mut books = Books::new(MemoryStorage::new(), ReturnBuilder::new("22AAAAA0000A1Z5"));
    let today = NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("invalid date")?;

    // 1. Standard GST slabs
    println!("📊 GST slabs:");
    for category in GstCategory::ALL {
        let rate = GstRate::intra_state(category.rate());
        println!(
            "  {:?}: {}% (CGST {}% + SGST {}%)",
            category, rate.total_rate, rate.cgst_rate, rate.sgst_rate
        );
    }
    println!();

    // 2. Fill in a purchase bill the way the form does
    let mut purchase = BillDraft::new(InvoiceKind::Purchase, today);
    purchase.party.name = "ABC Suppliers Pvt Ltd".to_string();
    purchase.party.gstin = "27AAAAA0000A1Z5".to_string();
    purchase.invoice_number = "INV-2024-001".to_string();

    let first = purchase.lines()[0].id;
    purchase.update_line(first, LineEdit::parse(LineField::Description, "Product A"));
    purchase.update_line(first, LineEdit::parse(LineField::Quantity, "10"));
    purchase.update_line(first, LineEdit::parse(LineField::Rate, "1,000.00"));
    purchase.push_line(LineItem::with_category(
        "Service Charges",
        BigDecimal::from(1),
        BigDecimal::from(1800),
        GstCategory::Higher,
    ));

    let totals = purchase.totals();
    println!("🛒 Purchase bill {}:", purchase.invoice_number);
    println!("  Subtotal:    ₹{}", totals.subtotal);
    println!("  CGST:        ₹{}", totals.total_cgst);
    println!("  SGST:        ₹{}", totals.total_sgst);
    println!("  Grand Total: ₹{}", totals.grand_total);
    println!();
    books.record_bill(purchase).await?;

    // 3. A sales bill missing its customer is refused
    let mut sale = BillDraft::new(InvoiceKind::Sales, today);
    sale.invoice_number = "SALE-2024-001".to_string();
    if let Err(err) = sale.validate() {
        println!("⚠️  {}", err);
    }
    sale.party.name = "XYZ Enterprises".to_string();
    sale.party.gstin = "29BBBBB1111B2Z6".to_string();
    let first = sale.lines()[0].id;
    sale.update_line(first, LineEdit::Rate(BigDecimal::from(25000)));
    books.record_bill(sale).await?;
    println!();

    // 4. Registers
    let register = books.register(InvoiceKind::Purchase, None).await?;
    println!("📒 Purchase register by rate:");
    for (rate, summary) in rate_wise_summary(&register) {
        println!(
            "  {}: {} rows, taxable ₹{}, tax ₹{}",
            export::format_rate(&rate),
            summary.count,
            summary.total_taxable,
            summary.total_tax
        );
    }
    let mut csv = Vec::new();
    export::write_register_csv(InvoiceKind::Purchase, &register, &mut csv)?;
    println!("\n{}", String::from_utf8(csv)?);

    // 5. Stock
    books
        .add_stock_item(StockItem {
            id: "1".to_string(),
            name: "Steel Rods".to_string(),
            current_stock: 25,
            minimum_stock: 50,
            maximum_stock: 300,
            unit_price: BigDecimal::from(450),
            category: "Raw Materials".to_string(),
            supplier: "ABC Suppliers".to_string(),
            last_updated: today,
        })
        .await?;
    println!("📦 Stock:");
    for item in books.stock_items("").await? {
        println!("  {} - {} ({})", item.name, item.current_stock, item.status().label());
    }

    let out_dir = std::env::temp_dir().join("gst-books-exports");
    std::fs::create_dir_all(&out_dir)?;
    let invoices = books.list_invoices(None, "").await?;
    export::write_invoices_csv(&invoices, File::create(out_dir.join(export::INVOICES_FILE))?)?;
    let stock = books.stock_items("").await?;
    export::write_stock_csv(&stock, File::create(out_dir.join(export::STOCK_REPORT_FILE))?)?;
    println!("\n💾 Exports written to {}", out_dir.display());

    let summary = books.invoice_summary().await?;
    println!(
        "\n✅ {} purchase and {} sales invoices, ₹{} in total",
        summary.purchase_count, summary.sales_count, summary.total_amount
    );

    Ok(())
}
