use crate::OperationKind;

/// Errors raised while parsing documents or exporting operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document is not valid GraphQL.
    #[error("GraphQL syntax error: {0}")]
    Syntax(String),
    /// The document contains an operation without a name.
    #[error("found an anonymous {kind}, every operation must be named")]
    MissingName {
        /// Whether this was a query, mutation or subscription.
        kind: OperationKind,
        /// The printed operation, to help locating it.
        operation: String,
    },
    /// An operation needs a fragment that is not known at this point.
    #[error("operation {operation} spreads the unknown fragment {fragment}")]
    UnknownFragment {
        /// The operation being resolved.
        operation: String,
        /// The missing fragment.
        fragment: String,
    },
    /// No operation with this name was parsed.
    #[error("unknown operation {0}")]
    UnknownOperation(String),
    /// The exporter failed for an operation.
    #[error("failed to export operation {name}: {source}")]
    Export {
        /// The operation that failed.
        name: String,
        /// The error returned by the exporter.
        #[source]
        source: anyhow::Error,
    },
}

/// Alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;
