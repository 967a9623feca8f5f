//! Group tabular files, clean missing values and save the result as Parquet.
//!
//! The core has no UI dependency: the desktop shell in `main.rs` drives it
//! through [`controller::Controller::dispatch`].

pub mod catalog;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod snippet;
pub mod store;

pub use error::{Error, Result};
