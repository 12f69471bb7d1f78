//! `mdx convert` command implementation.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use mdx_config::Config;
use mdx_extensions::build_markdown;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown file to convert.
    input: PathBuf,

    /// Path to configuration file (default: auto-discover mdx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ignore `{...}` attribute lists on table captions (overrides config).
    #[arg(long)]
    no_attr_list: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.load_config()?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let html = render_file(&self.input, &config)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.write_all(b"\n")?;
            }
        }
        if self.verbose {
            output.info(&format!("Converted {}", self.input.display()));
        }
        Ok(())
    }

    /// Load configuration and apply command line overrides.
    fn load_config(&self) -> Result<Config, CliError> {
        let mut config = Config::load(self.config.as_deref())?;
        if self.no_attr_list {
            config.extensions.attr_list = false;
        }
        Ok(config)
    }
}

/// Read a markdown file and render it to HTML.
fn render_file(input: &Path, config: &Config) -> Result<String, CliError> {
    let markdown = std::fs::read_to_string(input)?;
    let mut md = build_markdown(config);
    Ok(md.convert(&markdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(input: PathBuf, config: Option<PathBuf>) -> ConvertArgs {
        ConvertArgs {
            input,
            config,
            output: None,
            no_attr_list: false,
            verbose: false,
        }
    }

    #[test]
    fn test_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        std::fs::write(&input, "See [@fig:plot].").unwrap();

        let html = render_file(&input, &Config::default()).unwrap();
        assert_eq!(
            html,
            r##"<p>See <span><a href="#fig:plot">fig.</a></span>.</p>"##
        );
    }

    #[test]
    fn test_render_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = render_file(&dir.path().join("missing.md"), &Config::default());
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path().join("doc.md"), Some(dir.path().join("nope.toml")));
        assert!(matches!(args.load_config(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_no_attr_list_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("mdx.toml");
        std::fs::write(&config_path, "[extensions]\nattr_list = true\n").unwrap();

        let mut args = args(dir.path().join("doc.md"), Some(config_path));
        args.no_attr_list = true;
        let config = args.load_config().unwrap();
        assert!(!config.extensions.attr_list);
    }

    #[test]
    fn test_execute_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.md");
        let config_path = dir.path().join("mdx.toml");
        let out = dir.path().join("doc.html");
        std::fs::write(&input, "| a |\n|---|\n| 1 |\n\nTable: Data {#tbl:data}").unwrap();
        std::fs::write(&config_path, "").unwrap();

        let mut args = args(input, Some(config_path));
        args.output = Some(out.clone());
        args.execute().unwrap();

        assert_eq!(
            std::fs::read_to_string(out).unwrap(),
            r#"<table id="tbl:data"><caption>Data</caption><thead><tr><th>a</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table>"#
        );
    }
}
