#![cfg_attr(test, allow(unused_crate_dependencies))]

use std::path::PathBuf;

use anyhow::Context;
use args::Args;
use clap::crate_version;
use query_manager::{ExportSummary, QueryManager};
use tokio::runtime;

use self::{config::Config, exporter::FileExporter};

mod args;
mod config;
mod exporter;
mod sources;
mod telemetry;

const THREAD_NAME: &str = "gqlexport";

fn main() -> anyhow::Result<()> {
    let args = self::args::parse();
    telemetry::init(&args);

    let config = args.config()?;

    let runtime = runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name(THREAD_NAME)
        .build()?;

    runtime.block_on(run(&args, config))
}

async fn run(args: &Args, config: Config) -> anyhow::Result<()> {
    let crate_version = crate_version!();
    tracing::info!("gqlexport {crate_version}");

    let summary = export(&args.paths, &config).await?;

    tracing::info!(
        exported = summary.exported.len(),
        unchanged = summary.unchanged.len(),
        pending = summary.pending.len(),
        output_dir = %config.output_dir.display(),
        "export finished"
    );

    Ok(())
}

/// Parses every document under `paths` in walk order, then exports once.
async fn export(paths: &[PathBuf], config: &Config) -> anyhow::Result<ExportSummary> {
    let files = sources::collect(paths, config)?;
    tracing::debug!(count = files.len(), "collected GraphQL documents");

    let mut manager = QueryManager::new();

    for path in &files {
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("error reading {}", path.display()))?;

        manager
            .parse(&source)
            .with_context(|| format!("error parsing {}", path.display()))?;
    }

    let exporter = FileExporter::new(config.output_dir.clone(), config.format);
    let summary = manager.export_dirty_queries(&exporter).await?;

    for (operation, missing) in manager.pending_operations() {
        let missing = missing.into_iter().collect::<Vec<_>>().join(", ");
        tracing::warn!("operation {operation} was not exported, missing fragments: {missing}");
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn config(dir: &std::path::Path) -> Config {
        Config {
            output_dir: dir.join("out"),
            ..Config::default()
        }
    }

    fn written_files(config: &Config) -> Vec<String> {
        let mut names = fs::read_dir(&config.output_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[tokio::test]
    async fn fragments_from_other_files_are_resolved_before_exporting() {
        let dir = tempfile::tempdir().unwrap();
        let sources = dir.path().join("src");
        fs::create_dir_all(&sources).unwrap();
        fs::write(sources.join("a.graphql"), "query Q { ...F }").unwrap();
        fs::write(sources.join("b.graphql"), "fragment F on Query { f }").unwrap();
        let config = config(dir.path());

        let summary = export(&[sources], &config).await.unwrap();

        assert_eq!(summary.exported, ["Q"]);
        assert!(summary.pending.is_empty());

        let files = written_files(&config);
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("Q.") && files[0].ends_with(".graphql"), "{files:?}");
    }

    #[tokio::test]
    async fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.graphql"), "query Q { q }").unwrap();
        fs::write(dir.path().join("c.graphql"), "query Broken {").unwrap();
        let config = config(dir.path());

        let error = export(&[dir.path().to_owned()], &config).await.unwrap_err();

        let message = format!("{error:#}");
        assert!(message.contains("error parsing"), "{message}");
        assert!(message.contains("c.graphql"), "{message}");
        assert!(!config.output_dir.exists());
    }

    #[tokio::test]
    async fn operations_missing_fragments_are_reported_as_pending() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("queries.graphql");
        fs::write(&file, "query Ready { r } query Waiting { ...NeverDefined }").unwrap();
        let config = config(dir.path());

        let summary = export(std::slice::from_ref(&file), &config).await.unwrap();

        assert_eq!(summary.exported, ["Ready"]);
        assert_eq!(summary.pending, ["Waiting"]);
        assert_eq!(written_files(&config).len(), 1);
    }
}
