//! # Query Manager
//!
//! Keeps track of the named GraphQL operations and fragments found across a
//! codebase, and decides which operations need to be exported again.
//!
//! Documents are fed in one at a time with [`QueryManager::parse`], in whatever
//! order the caller discovers them. An operation can be exported once every
//! fragment it spreads (directly or through other fragments) is known. Calling
//! [`QueryManager::export_dirty_queries`] hands every such operation whose
//! resolved text changed since its last successful export to a
//! [`QueryExporter`]:
//!
//! - Parsing an operation marks it dirty.
//! - Parsing a fragment marks dirty every known operation depending on it,
//!   directly or through other fragments.
//! - Operations spreading fragments that are not known yet stay pending until
//!   those fragments show up.
//! - An operation whose resolved text is byte-identical to what was last
//!   exported is skipped.

#![deny(missing_docs)]

mod document;
mod error;
mod export;
mod graph;
mod manager;
pub mod query_id;


pub use self::{
    document::OperationKind,
    error::{Error, Result},
    export::{ExportRecord, ExportSummary, QueryExporter},
    manager::QueryManager,
};
