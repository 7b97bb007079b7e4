//! Volume API service library.
//!
//! HTTP surface for reading sub-volumes of the LLC2160 ocean simulation's
//! u/w/v velocity components.

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod params;
pub mod state;
