//! DynamoDB wire-format types for the dynarchive table tools.
//!
//! Only the shapes needed to describe, create, read and write tables are
//! modelled. Everything uses the DynamoDB JSON protocol layout (`PascalCase`
//! fields, single-key tagged attribute values), which is also the layout of
//! the newline-delimited archives the tools produce and consume.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

pub mod attribute_value;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use attribute_value::AttributeValue;
pub use error::ErrorCode;
pub use operations::TableOperation;
pub use types::{Item, Key};
