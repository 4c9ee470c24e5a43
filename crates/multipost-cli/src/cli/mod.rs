//! CLI for multipost.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use multipost_core::config;
use multipost_core::options::UploadOptions;
use std::collections::BTreeMap;
use std::path::PathBuf;

use commands::{run_config, run_upload};

/// Top-level CLI for multipost.
#[derive(Debug, Parser)]
#[command(name = "multipost")]
#[command(about = "multipost: upload files over HTTP as multipart forms or raw bytes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload one or more files.
    Upload(UploadArgs),

    /// Show the config file path and the effective configuration.
    Config,
}

/// Flags given on the command line apply to every file and override config.toml.
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Files to upload.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Destination URL.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// HTTP method (default POST).
    #[arg(long)]
    pub method: Option<String>,

    /// Form field the file is attached under (default "file").
    #[arg(long)]
    pub field_name: Option<String>,

    /// Only send these meta fields. Repeatable.
    #[arg(long = "meta-field", value_name = "NAME")]
    pub meta_fields: Vec<String>,

    /// Extra meta field for every file. Values that parse as JSON are sent as such. Repeatable.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    pub meta: Vec<(String, String)>,

    /// Extra request header. Repeatable.
    #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Send the raw file bytes as the body instead of a multipart form.
    #[arg(long)]
    pub bare: bool,
}

impl UploadArgs {
    /// Per-file options layer built from the flags.
    pub fn file_options(&self) -> UploadOptions {
        UploadOptions {
            endpoint: self.endpoint.clone(),
            method: self.method.clone(),
            field_name: self.field_name.clone(),
            meta_fields: if self.meta_fields.is_empty() {
                None
            } else {
                Some(self.meta_fields.clone())
            },
            form_data: if self.bare { Some(false) } else { None },
            response_url_field: None,
            headers: self.headers.iter().cloned().collect::<BTreeMap<_, _>>(),
        }
    }
}

fn parse_meta(s: &str) -> Result<(String, String), String> {
    split_pair(s, '=').ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    split_pair(s, ':').ok_or_else(|| format!("expected NAME:VALUE, got {:?}", s))
}

fn split_pair(s: &str, sep: char) -> Option<(String, String)> {
    let (k, v) = s.split_once(sep)?;
    let k = k.trim();
    if k.is_empty() {
        return None;
    }
    Some((k.to_string(), v.trim().to_string()))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Upload(args) => run_upload(&cfg, &args).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}
