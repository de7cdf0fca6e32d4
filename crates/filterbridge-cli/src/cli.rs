use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filterbridge::{Catalog, Codec, CodecOptions, DEFAULT_MAX_DEPTH};
use serde::Serialize;

pub const ENV_CATALOG: &str = "FILTERBRIDGE_CATALOG";
pub const ENV_MAX_DEPTH: &str = "FILTERBRIDGE_MAX_DEPTH";
pub const ENV_LOG: &str = "FILTERBRIDGE_LOG";

const STDIN_MARKER: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "filterbridge")]
#[command(version, about = "Convert search filters between the editor and wire formats", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Metacard type document used to recognize DATE attributes
    #[arg(long, short = 'c', global = true, env = ENV_CATALOG)]
    pub catalog: Option<PathBuf>,

    /// Deepest group nesting accepted
    #[arg(long, global = true, env = ENV_MAX_DEPTH, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Print single-line JSON
    #[arg(long, global = true)]
    pub compact: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a wire filter into the editor tree
    Decode {
        /// Input file, stdin when omitted or "-"
        file: Option<PathBuf>,
    },
    /// Encode an editor tree into a wire filter
    Encode {
        /// Input file, stdin when omitted or "-"
        file: Option<PathBuf>,
    },
    /// List the DATE attributes offered by the time-range picker
    Dates,
}

impl Cli {
    /// Runs the selected command and returns what should be printed.
    pub fn run(&self) -> Result<String> {
        let catalog = self.load_catalog()?;
        let codec = Codec::new(&catalog).with_options(CodecOptions {
            max_depth: self.max_depth,
        });

        match &self.command {
            Commands::Decode { file } => {
                let input = read_input(file.as_deref())?;
                let tree = codec
                    .decode_json(&input)
                    .context("Failed to decode wire filter")?;
                self.render(&tree)
            }
            Commands::Encode { file } => {
                let input = read_input(file.as_deref())?;
                let wire = codec
                    .encode_json(&input)
                    .context("Failed to encode filter tree")?;
                self.render(&wire)
            }
            Commands::Dates => self.render(&catalog.date_attributes()),
        }
    }

    fn load_catalog(&self) -> Result<Catalog> {
        let Some(path) = &self.catalog else {
            return Ok(Catalog::new());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        let catalog = Catalog::from_metacard_types_json(&json)
            .with_context(|| format!("Invalid catalog: {}", path.display()))?;
        tracing::debug!(path = %path.display(), attributes = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let rendered = if self.compact {
            serde_json::to_string(value)
        } else {
            serde_json::to_string_pretty(value)
        };
        rendered.context("Failed to serialize output")
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new(STDIN_MARKER) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {}", path.display())),
        _ => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

pub fn init_logging() {
    let filter = std::env::var(ENV_LOG)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_env_filter(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG: &str = r#"{
        "ddf.metacard": {
            "created": {"id": "created", "type": "DATE", "multivalued": false, "isInjected": false},
            "title": {"id": "title", "type": "STRING", "multivalued": false, "isInjected": false}
        }
    }"#;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn run(args: &[&str]) -> Result<String> {
        let mut argv = vec!["filterbridge"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().run()
    }

    fn path(file: &NamedTempFile) -> &str {
        file.path().to_str().unwrap()
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn decode_uses_catalog_for_dates() {
        let catalog = file_with(CATALOG);
        let wire = file_with(r#"{"type": "=", "property": "created", "value": "P1D"}"#);

        let out = run(&["--compact", "--catalog", path(&catalog), "decode", path(&wire)]).unwrap();
        let tree: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(tree["operator"], "AND");
        assert_eq!(tree["filters"][0]["comparator"], "RELATIVE");
        assert_eq!(tree["filters"][0]["value"], json!(["P1D"]));
    }

    #[test]
    fn decode_without_catalog_gives_equals() {
        let wire = file_with(r#"{"type": "=", "property": "created", "value": "P1D"}"#);
        let out = run(&["decode", path(&wire)]).unwrap();
        let tree: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(tree["filters"][0]["comparator"], "EQUALS");
    }

    #[test]
    fn encode_writes_wire_tree() {
        let ui = file_with(
            r#"{"operator": "NONE", "filters": [{"property": "title", "comparator": "CONTAINS", "value": ["ship"]}]}"#,
        );
        let out = run(&["--compact", "encode", path(&ui)]).unwrap();
        assert!(!out.contains('\n'));
        let wire: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            wire,
            json!({
                "type": "NOT",
                "filters": [{
                    "type": "AND",
                    "filters": [{"type": "ILIKE", "property": "title", "value": "ship"}]
                }]
            })
        );
    }

    #[test]
    fn pretty_output_by_default() {
        let ui = file_with(r#"{"operator": "AND", "filters": []}"#);
        let out = run(&["encode", path(&ui)]).unwrap();
        assert!(out.contains('\n'));
    }

    #[test]
    fn unsupported_function_fails_the_load() {
        let wire = file_with(
            r#"{"type": "=", "value": true, "property": {"type": "FILTER_FUNCTION", "filterFunctionName": "unknown", "params": []}}"#,
        );
        let err = run(&["decode", path(&wire)]).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported filter function in filter view: unknown"));
    }

    #[test]
    fn max_depth_is_enforced() {
        let wire = file_with(
            r#"{"type": "AND", "filters": [{"type": "OR", "filters": [{"type": "ILIKE", "property": "title", "value": "x"}]}]}"#,
        );
        assert!(run(&["--max-depth", "1", "decode", path(&wire)]).is_err());
        assert!(run(&["--max-depth", "2", "decode", path(&wire)]).is_ok());
    }

    #[test]
    fn dates_lists_date_attributes() {
        let catalog = file_with(CATALOG);
        let out = run(&["--compact", "-c", path(&catalog), "dates"]).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&out).unwrap(),
            json!([{"value": "created", "label": "created"}])
        );
    }

    #[test]
    fn missing_input_file_is_reported() {
        let err = run(&["decode", "/nonexistent/filter.json"]).unwrap_err();
        assert!(err.to_string().contains("Failed to read input"));
    }

    #[test]
    fn invalid_catalog_is_reported() {
        let catalog = file_with("not json");
        let err = run(&["--catalog", path(&catalog), "dates"]).unwrap_err();
        assert!(err.to_string().contains("Invalid catalog"));
    }
}
