//! JSON-file backend for the Setlist catalog.
//!
//! Each collection lives in `<data_dir>/<collection>.json` as a pretty-printed
//! array. Writes go to a temporary file in the same directory which is then
//! renamed over the target, so readers never see a half-written document.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::JsonDirStore;
