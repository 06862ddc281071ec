//! [`TableClient`](dynarchive_core::TableClient) backed by `aws-sdk-dynamodb`.
//!
//! [`connect`] turns a resolved [`Connection`](dynarchive_core::Connection)
//! into an SDK client; [`AwsTableClient`] forwards each call to the service
//! and converts between the SDK's types and the wire model.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]

mod client;
mod convert;

pub use client::{AwsTableClient, connect};
pub use convert::ConversionError;
