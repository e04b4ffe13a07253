//! Validation utilities

use bigdecimal::Zero;

use crate::traits::*;
use crate::types::*;

/// Length of a GSTIN
pub const GSTIN_LEN: usize = 15;

/// Validate a required text field
pub fn validate_required(field: &str, value: &str) -> BooksResult<()> {
    if value.trim().is_empty() {
        Err(BooksError::Validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

/// Validate the structure of a GSTIN.
///
/// Layout: 2-digit state code, 10-character PAN (5 letters, 4 digits, 1
/// letter), entity number, the letter `Z`, and a check character. The check
/// character is not verified.
pub fn validate_gstin(gstin: &str) -> BooksResult<()> {
    let chars: Vec<char> = gstin.chars().collect();

    if chars.len() != GSTIN_LEN {
        return Err(BooksError::InvalidGstin(format!(
            "'{}' must be {} characters, got {}",
            gstin,
            GSTIN_LEN,
            chars.len()
        )));
    }

    if !chars
        .iter()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    {
        return Err(BooksError::InvalidGstin(format!(
            "'{}' may only contain digits and uppercase letters",
            gstin
        )));
    }

    let state_code_ok = chars[..2].iter().all(char::is_ascii_digit) && &gstin[..2] != "00";
    if !state_code_ok {
        return Err(BooksError::InvalidGstin(format!(
            "'{}' does not start with a state code",
            gstin
        )));
    }

    let pan = &chars[2..12];
    let pan_ok = pan[..5].iter().all(char::is_ascii_uppercase)
        && pan[5..9].iter().all(char::is_ascii_digit)
        && pan[9].is_ascii_uppercase();
    if !pan_ok {
        return Err(BooksError::InvalidGstin(format!(
            "'{}' does not embed a valid PAN",
            gstin
        )));
    }

    if chars[13] != 'Z' {
        return Err(BooksError::InvalidGstin(format!(
            "'{}' must have 'Z' as its 14th character",
            gstin
        )));
    }

    Ok(())
}

/// Two-digit state code of a GSTIN
pub fn state_code(gstin: &str) -> BooksResult<&str> {
    validate_gstin(gstin)?;
    Ok(&gstin[..2])
}

/// Stricter validator: counterparty GSTIN must be well formed and the invoice
/// must carry at least one line with a non-zero value
pub struct StrictInvoiceValidator;

impl InvoiceValidator for StrictInvoiceValidator {
    fn validate_invoice(&self, invoice: &Invoice) -> BooksResult<()> {
        DefaultInvoiceValidator.validate_invoice(invoice)?;
        validate_gstin(&invoice.counterparty_gstin)?;

        if invoice.line_items.is_empty() {
            return Err(BooksError::Validation(format!(
                "Invoice '{}' has no line items",
                invoice.number
            )));
        }

        if invoice.line_amounts().iter().all(|line| line.amount.is_zero()) {
            return Err(BooksError::Validation(format!(
                "Invoice '{}' has no line with a taxable amount",
                invoice.number
            )));
        }

        for item in &invoice.line_items {
            validate_required("Item description", &item.description)?;
        }

        Ok(())
    }
}
