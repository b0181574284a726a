use std::collections::{BTreeMap, BTreeSet, HashMap};

use futures_util::future::join_all;

use crate::{
    document,
    graph::DefinitionGraph,
    export::{ExportRecord, ExportSummary, QueryExporter},
    Error, Result,
};

/// Tracks operations and fragments across documents and exports the operations whose
/// resolved text changed.
///
/// One instance is meant to live for a whole build or watch session. Nothing is ever
/// removed: a definition parsed again replaces the previous one with the same name.
///
/// The manager does no locking. Calls to [`parse`](Self::parse) and
/// [`export_dirty_queries`](Self::export_dirty_queries) take `&mut self` and so are
/// serialized by the borrow checker.
#[derive(Debug, Default)]
pub struct QueryManager {
    graph: DefinitionGraph,
    dirty: BTreeSet<String>,
    /// The record last handed to the exporter successfully, per operation.
    last_exported: HashMap<String, ExportRecord>,
}

impl QueryManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a GraphQL document and records every operation and fragment it defines.
    ///
    /// Every operation in the document is marked dirty, as is every known operation
    /// depending on a fragment from the document. If the document fails to parse, or
    /// contains an anonymous operation, nothing is recorded.
    pub fn parse(&mut self, source: &str) -> Result<()> {
        let document = document::parse(source)?;

        for operation in document.operations {
            tracing::debug!(operation = %operation.name, spreads = ?operation.spreads, "storing operation");

            self.dirty.insert(operation.name.clone());
            self.graph.insert_operation(operation);
        }

        let fragment_names = document
            .fragments
            .iter()
            .map(|fragment| fragment.name.clone())
            .collect::<Vec<_>>();

        for fragment in document.fragments {
            tracing::debug!(fragment = %fragment.name, spreads = ?fragment.spreads, "storing fragment");

            self.graph.insert_fragment(fragment);
        }

        // Dependents are computed once the whole document is in, so fragments spreading
        // each other within one document are all accounted for.
        for fragment in &fragment_names {
            for operation in self.graph.operations_depending_on(fragment) {
                if self.dirty.insert(operation.to_owned()) {
                    tracing::debug!(%operation, %fragment, "operation marked dirty by fragment");
                }
            }
        }

        Ok(())
    }

    /// Hands every dirty operation whose fragments are all known to the exporter.
    ///
    /// Operations still missing fragments stay dirty for the next call. The others leave
    /// the dirty set before the exporter runs; the ones whose resolved text is the same as
    /// in their last successful export are skipped.
    ///
    /// Exports run concurrently and this only returns once all of them finished. If some
    /// fail, the first failure is returned; the successful ones are still recorded. A failed
    /// operation is not retried on the next call unless it gets dirty again, either by
    /// parsing it (or one of its fragments) again or through [`mark_dirty`](Self::mark_dirty).
    pub async fn export_dirty_queries<E>(&mut self, exporter: &E) -> Result<ExportSummary>
    where
        E: QueryExporter + ?Sized,
    {
        let dirty = std::mem::take(&mut self.dirty);
        let mut summary = ExportSummary::default();
        let mut records = Vec::with_capacity(dirty.len());

        for name in dirty {
            // Anything that does not resolve goes straight back to the dirty set.
            let Ok(record) = self.resolve(&name) else {
                tracing::debug!(operation = %name, "operation still missing fragments");

                summary.pending.push(name.clone());
                self.dirty.insert(name);
                continue;
            };

            if self.last_exported.get(&name) == Some(&record) {
                tracing::debug!(operation = %name, "operation unchanged since last export");
                summary.unchanged.push(name);
            } else {
                records.push(record);
            }
        }

        let results = join_all(records.iter().map(|record| exporter.export_query(record))).await;
        let mut first_error = None;

        for (record, result) in records.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    tracing::info!(operation = %record.name, fragments = record.fragments.len(), "exported operation");

                    summary.exported.push(record.name.clone());
                    self.last_exported.insert(record.name.clone(), record);
                }
                Err(source) => {
                    tracing::error!(operation = %record.name, "failed to export operation: {source:#}");

                    if first_error.is_none() {
                        first_error = Some(Error::Export {
                            name: record.name,
                            source,
                        });
                    }
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        Ok(summary)
    }

    /// Resolves an operation into its exportable record.
    ///
    /// Fails with [`Error::UnknownFragment`] naming the first missing fragment if the
    /// operation cannot be resolved yet.
    pub fn resolve(&self, name: &str) -> Result<ExportRecord> {
        let operation = self
            .graph
            .operation(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_owned()))?;

        let fragments = self
            .graph
            .closure(&operation.spreads)
            .into_iter()
            .map(|fragment| match self.graph.fragment(fragment) {
                Some(definition) => Ok(definition.text.clone()),
                None => Err(Error::UnknownFragment {
                    operation: name.to_owned(),
                    fragment: fragment.to_owned(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ExportRecord {
            name: name.to_owned(),
            query: operation.text.clone(),
            fragments,
        })
    }

    /// Every fragment the operation needs, at any depth, whether known yet or not.
    ///
    /// Empty if the operation is not known.
    pub fn used_fragment_names_for_query(&self, name: &str) -> BTreeSet<String> {
        self.graph
            .operation(name)
            .map(|operation| self.owned_closure(&operation.spreads))
            .unwrap_or_default()
    }

    /// Every fragment the fragment spreads, at any depth, whether known yet or not.
    ///
    /// Empty if the fragment is not known.
    pub fn used_fragment_names_for_fragment(&self, name: &str) -> BTreeSet<String> {
        self.graph
            .fragment(name)
            .map(|fragment| self.owned_closure(&fragment.spreads))
            .unwrap_or_default()
    }

    /// Whether every fragment the operation needs is known.
    pub fn is_resolvable(&self, name: &str) -> bool {
        self.graph.is_resolvable(name)
    }

    /// Marks a known operation dirty so the next export looks at it again. Returns `false`
    /// if no operation with this name was parsed.
    pub fn mark_dirty(&mut self, name: &str) -> bool {
        if self.graph.operation(name).is_none() {
            return false;
        }

        self.dirty.insert(name.to_owned());
        true
    }

    /// Marks every known operation dirty.
    pub fn mark_all_dirty(&mut self) {
        self.dirty.extend(self.graph.operation_names().map(str::to_owned));
    }

    /// Names of all known operations.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.graph.operation_names()
    }

    /// Names of all known fragments.
    pub fn fragment_names(&self) -> impl Iterator<Item = &str> {
        self.graph.fragment_names()
    }

    /// Operations waiting for the next export.
    pub fn dirty_operations(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Dirty operations that cannot be exported yet, with the fragments they are missing.
    pub fn pending_operations(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        self.dirty
            .iter()
            .filter_map(|name| {
                let operation = self.graph.operation(name)?;
                let missing = self
                    .graph
                    .closure(&operation.spreads)
                    .into_iter()
                    .filter(|fragment| self.graph.fragment(fragment).is_none())
                    .collect::<BTreeSet<_>>();

                (!missing.is_empty()).then_some((name.as_str(), missing))
            })
            .collect()
    }

    fn owned_closure(&self, spreads: &BTreeSet<String>) -> BTreeSet<String> {
        self.graph.closure(spreads).into_iter().map(str::to_owned).collect()
    }
}
