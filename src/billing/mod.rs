//! Purchase and sales bill generation

pub mod draft;

pub use draft::*;
