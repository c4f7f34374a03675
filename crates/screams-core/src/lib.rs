//! Core types and rules for the Screams service.
//!
//! Entities are plain data. Validation lives in the `check_*` functions next
//! to each type; persistence lives behind [`store::ScreamStore`]. This crate
//! has no HTTP or database dependencies.

#![allow(async_fn_in_trait)]

pub mod caller;
pub mod error;
pub mod escape;
pub mod history;
pub mod profile;
pub mod scream;
pub mod store;

pub use error::{Error, Result};
