use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "./gqlexport.toml";

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Settings read from `gqlexport.toml`.
pub(crate) struct Config {
    /// Directory receiving one file per exported operation
    pub output_dir: PathBuf,
    /// File extensions searched for GraphQL documents when walking directories
    pub extensions: Vec<String>,
    /// Shape of the exported files
    pub format: ExportFormat,
    /// Whether symbolic links are followed when walking directories
    pub follow_links: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("queries"),
            extensions: vec!["graphql".to_owned(), "gql".to_owned()],
            format: ExportFormat::default(),
            follow_links: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ExportFormat {
    /// The operation followed by its fragments, as a GraphQL document
    #[default]
    Graphql,
    /// A JSON object with the id, name, query and fragments
    Json,
}

impl ExportFormat {
    pub(crate) fn extension(self) -> &'static str {
        match self {
            ExportFormat::Graphql => "graphql",
            ExportFormat::Json => "json",
        }
    }
}

impl Config {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| format!("error loading config at {}", path.display()))?;

        toml::from_str(&contents).with_context(|| format!("invalid config at {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.output_dir, PathBuf::from("queries"));
        assert_eq!(config.extensions, ["graphql", "gql"]);
        assert_eq!(config.format, ExportFormat::Graphql);
    }

    #[test]
    fn all_settings() {
        let config: Config = toml::from_str(indoc! {r#"
            output_dir = "generated/queries"
            extensions = ["graphql"]
            format = "json"
            follow_links = true
        "#})
        .unwrap();

        insta::assert_debug_snapshot!(config, @r###"
        Config {
            output_dir: "generated/queries",
            extensions: [
                "graphql",
            ],
            format: Json,
            follow_links: true,
        }
        "###);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = toml::from_str::<Config>("output = \"queries\"").unwrap_err();

        assert!(error.to_string().contains("unknown field `output`"), "{error}");
    }

    #[test]
    fn loading_a_missing_file_names_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let error = Config::load(&path).unwrap_err();

        assert!(error.to_string().contains("missing.toml"), "{error}");
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gqlexport.toml");
        std::fs::write(&path, "format = \"json\"").unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.format, ExportFormat::Json);
        assert_eq!(config.output_dir, PathBuf::from("queries"));
    }
}
