//! edgarsift: distill 8-K filings from the command line.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use edgarsift_core::DistillConfig;
use edgarsift_distill::{Distiller, RawDocument};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edgarsift", about = "Reduce 8-K filings to a bounded distillate")]
struct Cli {
    /// JSON config file (otherwise EDGARSIFT_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the distillation of each file as JSON
    Distill {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// YYYY-MM-DD used when a filing has no date
        #[arg(long)]
        default_date: Option<String>,
    },
    /// Print the canonical filing date
    Date {
        file: PathBuf,
        /// YYYY-MM-DD used when the filing has no date
        #[arg(long)]
        default_date: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

/// `--config` must load cleanly; `EDGARSIFT_CONFIG` falls back to defaults
/// with a warning.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<DistillConfig> {
    match explicit {
        Some(path) => {
            let mut config = DistillConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env();
            Ok(config)
        }
        None => {
            let from_env = std::env::var("EDGARSIFT_CONFIG").ok().map(PathBuf::from);
            Ok(DistillConfig::load(from_env.as_deref()))
        }
    }
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let distiller = Distiller::new(&config)?;

    match cli.command {
        Commands::Distill {
            files,
            default_date,
        } => {
            let contents = files
                .iter()
                .map(|path| read_file(path))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let docs: Vec<RawDocument<'_>> = contents.iter().map(RawDocument::from).collect();
            let mut results = distiller.distill_all(&docs, default_date.as_deref())?;
            info!("Distilled {} file(s)", results.len());

            let json = if results.len() == 1 {
                serde_json::to_string_pretty(&results.remove(0))?
            } else {
                serde_json::to_string_pretty(&results)?
            };
            println!("{}", json);
        }
        Commands::Date { file, default_date } => {
            let bytes = read_file(&file)?;
            let doc = distiller.normalize(RawDocument::from(&bytes));
            println!("{}", distiller.filing_date(&doc, default_date.as_deref()));
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(distiller.config())?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_distill_args() {
        let cli = Cli::try_parse_from([
            "edgarsift", "distill", "a.htm", "--default-date", "2025-01-02", "b.htm", "--config", "c.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        let Commands::Distill { files, default_date } = cli.command else {
            panic!("expected distill");
        };
        assert_eq!(files, vec![PathBuf::from("a.htm"), PathBuf::from("b.htm")]);
        assert_eq!(default_date.as_deref(), Some("2025-01-02"));
    }

    #[test]
    fn test_bad_args_rejected() {
        assert!(Cli::try_parse_from(["edgarsift", "distill"]).is_err());
        assert!(Cli::try_parse_from(["edgarsift", "distill", "a.htm", "--default-date"]).is_err());
        assert!(Cli::try_parse_from(["edgarsift", "date", "a.htm", "--verbose"]).is_err());
        assert!(Cli::try_parse_from(["edgarsift"]).is_err());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        assert!(load_config(Some(Path::new("/nonexistent/edgarsift.json"))).is_err());
    }
}
