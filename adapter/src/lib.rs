#![deny(rust_2018_idioms)]
#![deny(clippy::all)]
//! The spreadsheet & advertising platform clients.
//!
//! [`Spreadsheets`] and [`AdsPlatform`] are implemented over the Google REST APIs
//! in [`google`] and in memory in `dummy` (behind the `dummy` feature).

pub use self::{
    ads::AdsPlatform,
    error::{Error, Kind},
    sheets::{Rows, Spreadsheets, TabIds},
};

pub mod ads;
#[cfg(any(test, feature = "dummy"))]
pub mod dummy;
mod error;
pub mod google;
pub mod sheets;
