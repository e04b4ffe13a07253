//! Registers, summaries and stock classification built over in-memory records

pub mod report;
pub mod sales_purchase;
pub mod stock;
pub mod sync;

pub use report::*;
pub use sales_purchase::*;
pub use stock::*;
pub use sync::*;

use crate::traits::Searchable;

/// Case-insensitive substring match of `term` against any of the record's text fields.
///
/// The term is used as typed, surrounding whitespace included. An empty term
/// matches every record.
pub fn matches_search<T: Searchable + ?Sized>(record: &T, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();

    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Records matching a search term, in input order
pub fn search<'a, T: Searchable>(records: &'a [T], term: &str) -> Vec<&'a T> {
    records
        .iter()
        .filter(|record| matches_search(*record, term))
        .collect()
}
