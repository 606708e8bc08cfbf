//! Core types and logic for the Setlist song catalog.
//!
//! This crate is deliberately free of HTTP and disk dependencies. It owns the
//! catalog consistency rules, the song selection engine and the display-side
//! query layer; storage backends plug in through [`document::DocumentStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod document;
pub mod error;
pub mod model;
pub mod query;
pub mod select;

pub use catalog::Catalog;
pub use error::{Error, Result};
