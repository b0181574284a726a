use std::path::PathBuf;

use anyhow::Context;
use query_manager::{ExportRecord, QueryExporter};

use crate::config::ExportFormat;

/// Writes every exported operation to `<output_dir>/<name>.<query id>.<extension>`.
pub(crate) struct FileExporter {
    output_dir: PathBuf,
    format: ExportFormat,
}

#[derive(serde::Serialize)]
struct PersistedQuery<'a> {
    id: &'a str,
    #[serde(flatten)]
    record: &'a ExportRecord,
}

impl FileExporter {
    pub(crate) fn new(output_dir: PathBuf, format: ExportFormat) -> Self {
        FileExporter { output_dir, format }
    }

    fn render(&self, id: &str, record: &ExportRecord) -> anyhow::Result<String> {
        match self.format {
            ExportFormat::Graphql => Ok(record.to_document()),
            ExportFormat::Json => {
                let mut rendered = serde_json::to_string_pretty(&PersistedQuery { id, record })?;
                rendered.push('\n');
                Ok(rendered)
            }
        }
    }
}

#[async_trait::async_trait]
impl QueryExporter for FileExporter {
    async fn export_query(&self, record: &ExportRecord) -> anyhow::Result<()> {
        let id = record.query_id();
        let path = self
            .output_dir
            .join(format!("{}.{id}.{}", record.name, self.format.extension()));

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("could not create {}", self.output_dir.display()))?;

        tokio::fs::write(&path, self.render(&id, record)?)
            .await
            .with_context(|| format!("could not write {}", path.display()))?;

        tracing::debug!(path = %path.display(), "wrote persisted query");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use query_manager::QueryManager;

    use super::*;

    fn manager() -> QueryManager {
        let mut manager = QueryManager::new();
        manager
            .parse("query GetUser { user { ...UserFields } } fragment UserFields on User { id }")
            .unwrap();
        manager
    }

    fn written_files(dir: &std::path::Path) -> Vec<String> {
        let mut names = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[tokio::test]
    async fn writes_graphql_documents() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("nested").join("queries");
        let exporter = FileExporter::new(output_dir.clone(), ExportFormat::Graphql);
        let mut manager = manager();

        manager.export_dirty_queries(&exporter).await.unwrap();

        let id = manager.resolve("GetUser").unwrap().query_id();
        assert_eq!(written_files(&output_dir), [format!("GetUser.{id}.graphql")]);

        let contents = std::fs::read_to_string(output_dir.join(format!("GetUser.{id}.graphql"))).unwrap();
        insta::assert_snapshot!(contents.trim_end(), @r###"
        query GetUser {
          user {
            ...UserFields
          }
        }

        fragment UserFields on User {
          id
        }
        "###);
    }

    #[tokio::test]
    async fn writes_json_documents() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = FileExporter::new(dir.path().to_owned(), ExportFormat::Json);
        let mut manager = manager();

        manager.export_dirty_queries(&exporter).await.unwrap();

        let record = manager.resolve("GetUser").unwrap();
        let id = record.query_id();
        let contents = std::fs::read_to_string(dir.path().join(format!("GetUser.{id}.json"))).unwrap();
        let written: serde_json::Value = serde_json::from_str(&contents).unwrap();

        assert_eq!(
            written,
            serde_json::json!({
                "id": id,
                "name": "GetUser",
                "query": record.query,
                "fragments": record.fragments,
            })
        );
    }

    #[tokio::test]
    async fn changed_fragments_produce_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = FileExporter::new(dir.path().to_owned(), ExportFormat::Graphql);
        let mut manager = manager();

        manager.export_dirty_queries(&exporter).await.unwrap();
        manager.parse("fragment UserFields on User { id name }").unwrap();
        manager.export_dirty_queries(&exporter).await.unwrap();

        assert_eq!(written_files(dir.path()).len(), 2);
    }
}
