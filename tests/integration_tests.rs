//! Integration tests for gst-books

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use gst_books::{
    aggregate, build_gstr1, compute_line, export, group_by_rate, stock_status,
    upload::ExtractedInvoice,
    utils::{MemoryStorage, StrictInvoiceValidator},
    BillDraft, Books, BooksConfig, BooksError, BooksStorage, Invoice, InvoiceKind, LineEdit,
    LineItem, RegisterEntry, ReturnBuilder, ReturnPeriod, StockItem, StockStatus, SyncStatus,
};

const SELLER_GSTIN: &str = "22AAAAA0000A1Z5";

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn line(description: &str, quantity: i64, rate: i64, gst_rate: i64) -> LineItem {
    LineItem::new(
        description,
        BigDecimal::from(quantity),
        BigDecimal::from(rate),
        BigDecimal::from(gst_rate),
    )
}

fn purchase(number: &str, day: u32) -> Invoice {
    Invoice::new(
        number,
        InvoiceKind::Purchase,
        date(1, day),
        "ABC Suppliers Pvt Ltd",
        "27AAAAA0000A1Z5",
    )
    .with_line_item(line("Product A", 10, 1000, 18))
    .with_line_item(line("Service Charges", 1, 1800, 18))
}

fn sale(number: &str, month: u32, day: u32, gstin: &str, taxable: i64) -> Invoice {
    Invoice::new(number, InvoiceKind::Sales, date(month, day), "XYZ Enterprises", gstin)
        .with_line_item(line("Consulting", 1, taxable, 18))
}

fn books() -> Books<MemoryStorage> {
    let config = BooksConfig::from_toml_str(&format!("seller_gstin = \"{}\"", SELLER_GSTIN)).unwrap();
    Books::from_config(MemoryStorage::new(), &config).unwrap()
}

#[test]
fn test_gst_calculations() {
    let first = compute_line(&BigDecimal::from(10), &BigDecimal::from(1000), &BigDecimal::from(18));
    assert_eq!(first.amount, BigDecimal::from(10000));
    assert_eq!(first.cgst, BigDecimal::from(900));
    assert_eq!(first.sgst, BigDecimal::from(900));
    assert_eq!(first.igst, BigDecimal::from(0));

    let second = compute_line(&BigDecimal::from(1), &BigDecimal::from(1800), &BigDecimal::from(18));
    let totals = aggregate(&[first, second]);
    assert_eq!(totals.subtotal, BigDecimal::from(11800));
    assert_eq!(totals.total_tax, BigDecimal::from(2124));
    assert_eq!(totals.grand_total, BigDecimal::from(13924));

    assert_eq!(aggregate(&[]).grand_total, BigDecimal::from(0));
}

#[test]
fn test_stock_status_examples() {
    assert_eq!(stock_status(25, 50, 300), StockStatus::Low);
    assert_eq!(stock_status(250, 100, 300), StockStatus::High);
    assert_eq!(stock_status(150, 50, 300), StockStatus::Normal);
}

#[test]
fn test_rate_filter_on_register() {
    let mut invoice = purchase("INV-1", 15);
    invoice.add_line_item(line("Exempt goods", 5, 200, 0));
    let entries = RegisterEntry::from_invoice(&invoice);
    assert_eq!(entries.len(), 2);

    assert_eq!(group_by_rate(&entries, None).count, 2);
    let zero_rated = group_by_rate(&entries, Some(&BigDecimal::from(0)));
    assert_eq!(zero_rated.count, 1);
    assert_eq!(zero_rated.total_taxable, BigDecimal::from(1000));
}

#[test]
fn test_gstr1_single_invoice_payload() {
    let period: ReturnPeriod = "2024-01".parse().unwrap();
    let invoices = vec![sale("SALE-2024-001", 1, 16, "29BBBBB1111B2Z6", 25000)];

    let payload = build_gstr1(&period, SELLER_GSTIN, &invoices);
    assert_eq!(payload.ret_period, "202401");
    assert_eq!(payload.b2b.len(), 1);

    let item = &payload.b2b[0].inv[0].itms[0].itm_det;
    assert_eq!(item.txval, 25000.0);
    assert_eq!(item.camt, 2250.0);
    assert_eq!(item.samt, 2250.0);
    assert_eq!(item.iamt, 0.0);
}

#[tokio::test]
async fn test_complete_billing_workflow() {
    let mut books = books();

    books.record_invoice(purchase("INV-2024-001", 15)).await.unwrap();

    let mut draft = BillDraft::new(InvoiceKind::Sales, date(1, 16));
    draft.party.name = "XYZ Enterprises".to_string();
    draft.party.gstin = "29BBBBB1111B2Z6".to_string();
    draft.invoice_number = "SALE-2024-001".to_string();
    let first = draft.lines()[0].id;
    draft.update_line(first, LineEdit::Rate(BigDecimal::from(25000)));
    books.record_bill(draft).await.unwrap();

    let summary = books.invoice_summary().await.unwrap();
    assert_eq!(summary.purchase_count, 1);
    assert_eq!(summary.sales_count, 1);
    assert_eq!(summary.total_amount, BigDecimal::from(13924 + 29500));

    let found = books.list_invoices(None, "xyz").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].number, "SALE-2024-001");

    let period: ReturnPeriod = "2024-01".parse().unwrap();
    let return_summary = books.return_summary(&period).await.unwrap();
    assert_eq!(return_summary.output_tax(), &BigDecimal::from(4500));
    assert_eq!(return_summary.input_tax_credit(), &BigDecimal::from(2124));
    assert_eq!(return_summary.net_tax_payable(), BigDecimal::from(2376));

    let gstr3b = books.gstr3b(&period).await.unwrap();
    assert_eq!(gstr3b.gstin, SELLER_GSTIN);
    assert_eq!(gstr3b.sup_details.osup_det.txval, 25000.0);
    assert_eq!(gstr3b.itc_elg.itc_avl[0].camt, 1062.0);
    assert_eq!(gstr3b.intr_ltfee.camt, 1188.0);

    let sync = books.sync_summary().await.unwrap();
    assert_eq!(sync.pending, 2);
}

#[tokio::test]
async fn test_gstr1_only_includes_period_sales() {
    let mut books = books();
    books
        .record_invoice(sale("SALE-1", 1, 10, "29BBBBB1111B2Z6", 10000))
        .await
        .unwrap();
    books
        .record_invoice(sale("SALE-2", 1, 20, "29BBBBB1111B2Z6", 5000))
        .await
        .unwrap();
    books
        .record_invoice(sale("SALE-3", 1, 25, "33CCCCC2222C3Z7", 8000))
        .await
        .unwrap();
    books
        .record_invoice(sale("SALE-4", 2, 1, "29BBBBB1111B2Z6", 7000))
        .await
        .unwrap();
    books.record_invoice(purchase("INV-1", 12)).await.unwrap();

    let payload = books.gstr1(&"2024-01".parse().unwrap()).await.unwrap();
    assert_eq!(payload.invoice_count(), 3);
    assert_eq!(payload.b2b.len(), 2);
    assert_eq!(payload.b2b[0].ctin, "29BBBBB1111B2Z6");
    assert_eq!(payload.b2b[0].inv.len(), 2);
    assert_eq!(payload.b2b[0].inv[0].pos, "22");
    assert_eq!(payload.b2b[1].ctin, "33CCCCC2222C3Z7");

    let february = books.gstr1(&"2024-02".parse().unwrap()).await.unwrap();
    assert_eq!(february.invoice_count(), 1);
}

#[tokio::test]
async fn test_strict_validation_rejects_bad_invoices() {
    let mut books = Books::with_validator(
        MemoryStorage::new(),
        ReturnBuilder::new(SELLER_GSTIN),
        Box::new(StrictInvoiceValidator),
    );

    let no_lines = Invoice::new("INV-9", InvoiceKind::Purchase, date(1, 5), "ABC", "27AAAAA0000A1Z5");
    assert!(matches!(
        books.record_invoice(no_lines).await,
        Err(BooksError::Validation(_))
    ));

    let mut bad_gstin = purchase("INV-10", 5);
    bad_gstin.counterparty_gstin = "UNREGISTERED".to_string();
    assert!(matches!(
        books.record_invoice(bad_gstin).await,
        Err(BooksError::InvalidGstin(_))
    ));

    assert!(books.storage().list_invoices(None, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_export_for_period() {
    let mut books = books();
    books.record_invoice(purchase("INV-1", 15)).await.unwrap();
    let mut february = purchase("INV-2", 1);
    february.date = date(2, 3);
    books.record_invoice(february).await.unwrap();

    let period: ReturnPeriod = "2024-01".parse().unwrap();
    let entries = books.register(InvoiceKind::Purchase, Some(&period)).await.unwrap();
    assert_eq!(entries.len(), 1);

    let mut buf = Vec::new();
    let rows = export::write_register_csv(InvoiceKind::Purchase, &entries, &mut buf).unwrap();
    assert_eq!(rows, 1);

    let text = String::from_utf8(buf).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Invoice No,Date,Vendor,GSTIN,Taxable Value,GST Rate,CGST,SGST,IGST,Total Amount")
    );
    assert_eq!(
        lines.next(),
        Some("INV-1,2024-01-15,ABC Suppliers Pvt Ltd,27AAAAA0000A1Z5,11800.00,18%,1062.00,1062.00,0.00,13924.00")
    );

    let all = books.register(InvoiceKind::Purchase, None).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_stock_report() {
    let mut books = books();
    for (id, name, current, minimum, maximum) in [
        ("1", "Steel Rods", 25, 50, 300),
        ("2", "Copper Wire", 250, 100, 300),
        ("3", "PVC Pipes", 150, 50, 300),
    ] {
        books
            .add_stock_item(StockItem {
                id: id.to_string(),
                name: name.to_string(),
                current_stock: current,
                minimum_stock: minimum,
                maximum_stock: maximum,
                unit_price: BigDecimal::from(100),
                category: "Raw Materials".to_string(),
                supplier: "ABC Suppliers".to_string(),
                last_updated: date(1, 15),
            })
            .await
            .unwrap();
    }

    let summary = books.stock_summary().await.unwrap();
    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.low_stock_items, 1);
    assert_eq!(summary.total_value, BigDecimal::from(42500));

    let items = books.stock_items("").await.unwrap();
    let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Copper Wire", "PVC Pipes", "Steel Rods"]);
    assert_eq!(items[0].status(), StockStatus::High);
}

#[tokio::test]
async fn test_uploaded_invoice_flow() {
    gst_books::upload::validate_upload("application/pdf", 250_000).unwrap();

    let extracted = ExtractedInvoice::from_json(
        r#"{
            "invoiceNumber": "INV-2024-001",
            "date": "2024-01-15",
            "vendorName": "ABC Suppliers Pvt Ltd",
            "vendorGST": "27AAAAA0000A1Z5",
            "totalAmount": "11800.00",
            "gstAmount": "1800.00",
            "items": [
                { "name": "Product A", "quantity": "10", "rate": "1000.00", "amount": "10000.00" }
            ]
        }"#,
    )
    .unwrap();

    let mut books = books();
    books
        .record_invoice(extracted.into_invoice(InvoiceKind::Purchase).unwrap())
        .await
        .unwrap();

    let stored = books
        .get_invoice_required(InvoiceKind::Purchase, "INV-2024-001")
        .await
        .unwrap();
    assert_eq!(stored.totals().total_tax, BigDecimal::from(1800));

    let at = date(1, 16).and_hms_opt(9, 0, 0).unwrap();
    let record = books
        .record_sync_result(InvoiceKind::Purchase, "INV-2024-001", true, at)
        .await
        .unwrap();
    assert_eq!(record.status, SyncStatus::Synced);
    assert_eq!(books.sync_summary().await.unwrap().synced, 1);
}

#[tokio::test]
async fn test_monthly_report_from_storage() {
    let mut books = books();
    books
        .record_invoice(sale("SALE-1", 1, 10, "29BBBBB1111B2Z6", 45000))
        .await
        .unwrap();
    books
        .record_invoice(sale("SALE-2", 2, 10, "29BBBBB1111B2Z6", 52000))
        .await
        .unwrap();
    books.record_invoice(purchase("INV-1", 12)).await.unwrap();

    let report = books.monthly_report().await.unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].purchases, BigDecimal::from(11800));
    assert_eq!(report[0].profit, BigDecimal::from(45000 - 11800));
    assert_eq!(report[1].purchases, BigDecimal::from(0));

    let financial = books.financial_report().await.unwrap();
    assert_eq!(financial.monthly, report);
    assert_eq!(financial.top_products.len(), 1);
    assert_eq!(financial.top_products[0].product, "Consulting");
    assert_eq!(financial.top_products[0].sales, BigDecimal::from(97000));
    assert_eq!(financial.top_products[0].quantity, BigDecimal::from(2));
    assert_eq!(financial.categories.len(), 1);
    assert_eq!(financial.categories[0].name, gst_books::UNCATEGORIZED);
    assert_eq!(financial.categories[0].value, 100);
}
