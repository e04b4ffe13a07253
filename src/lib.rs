//! # GST Books
//!
//! Invoice and GST bookkeeping for a small retail business: line-item tax
//! arithmetic, invoice totals, registers and stock reports, and GSTR-1 /
//! GSTR-3B return payloads.
//!
//! ## Features
//!
//! - **GST calculations**: Intra-state CGST/SGST split on exact decimals
//! - **Bill generation**: Editable purchase and sales drafts finalized into invoices
//! - **Registers**: Rate-wise purchase/sales registers, search and stock status
//! - **Returns**: GSTR-1 B2B and GSTR-3B summary payloads for a return period
//! - **Exports**: CSV registers and reports, JSON return files
//! - **Storage abstraction**: Database-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use gst_books::{aggregate, compute_line};
//! use bigdecimal::BigDecimal;
//!
//! let line = compute_line(
//!     &BigDecimal::from(10),
//!     &BigDecimal::from(1000),
//!     &BigDecimal::from(18),
//! );
//! assert_eq!(line.cgst, BigDecimal::from(900));
//!
//! let totals = aggregate(&[line]);
//! assert_eq!(totals.grand_total, BigDecimal::from(11800));
//! ```

pub mod billing;
pub mod books;
pub mod config;
pub mod export;
pub mod register;
pub mod returns;
pub mod tax;
pub mod traits;
pub mod types;
pub mod upload;
pub mod utils;

// Re-export commonly used types
pub use billing::*;
pub use books::Books;
pub use config::BooksConfig;
pub use register::*;
pub use returns::*;
pub use tax::gst::*;
pub use traits::*;
pub use types::*;
pub use utils::MemoryStorage;
