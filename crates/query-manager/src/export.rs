use std::future::Future;

use crate::query_id;

/// An operation ready to be persisted: its own text and the text of every fragment it
/// needs, each fragment once and ordered by fragment name.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExportRecord {
    /// The operation name.
    pub name: String,
    /// The printed operation.
    pub query: String,
    /// The printed fragments the operation needs.
    pub fragments: Vec<String>,
}

impl ExportRecord {
    /// The operation followed by its fragments, separated by blank lines.
    pub fn to_document(&self) -> String {
        let mut document = self.query.clone();

        for fragment in &self.fragments {
            document.push_str("\n\n");
            document.push_str(fragment);
        }

        document.push('\n');
        document
    }

    /// A stable identifier for the operation and its fragments, see [`query_id::combine_query_id`].
    pub fn query_id(&self) -> String {
        let fragment_hashes = self
            .fragments
            .iter()
            .map(|fragment| query_id::content_hash(fragment.as_str()))
            .collect::<Vec<_>>();

        query_id::combine(
            &query_id::content_hash(&self.query),
            fragment_hashes.iter().map(String::as_str),
        )
    }
}

/// Where exported operations go.
///
/// Implemented for closures taking a `&ExportRecord` and returning a future, so callers
/// can pass `|record: &ExportRecord| { ... }` directly. To export to several places,
/// compose them in a single exporter.
///
/// The closure's future must not borrow the record: its type has to be the same whatever
/// the lifetime of the `&ExportRecord`, so `|record| async move { use(record) }` does not
/// satisfy the bound. Clone what the future needs before building it, or implement the
/// trait on a type when the future has to hold on to the record.
#[async_trait::async_trait]
pub trait QueryExporter: Send + Sync {
    /// Persist one operation.
    async fn export_query(&self, record: &ExportRecord) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
impl<F, Fut> QueryExporter for F
where
    F: Fn(&ExportRecord) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn export_query(&self, record: &ExportRecord) -> anyhow::Result<()> {
        self(record).await
    }
}

/// What happened to the dirty operations during one export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Operations handed to the exporter successfully.
    pub exported: Vec<String>,
    /// Resolvable operations skipped because their text did not change since the last export.
    pub unchanged: Vec<String>,
    /// Operations still waiting for fragments. They stay dirty.
    pub pending: Vec<String>,
}
