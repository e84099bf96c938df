use crate::config::{CliOverrides, Config};
use crate::error::{Result, VamaError};
use crate::template::VariantChoice;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "vama")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn a folder of customs declaration PDFs into an accounting CSV")]
#[command(
    long_about = "vama runs an external extractor over a folder of import declaration PDFs, \
                  parses the JSON it prints and writes one CSV of invoice lines per folder."
)]
#[command(after_help = "EXAMPLES:\n  \
    vama ./declaratii-martie\n  \
    vama ./declaratii --variant fara-fizic --output-name martie.csv\n  \
    vama ./declaratii --extractor /opt/vama/pdf-extractor --verbose\n  \
    vama ./declaratii --config vama.toml --output-format json\n  \
    vama --generate-config --config vama.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Folder containing the declaration PDFs
    #[arg(required_unless_present = "generate_config")]
    pub folder: Option<PathBuf>,

    /// Invoice layout to produce
    #[arg(long, value_enum)]
    pub variant: Option<VariantChoice>,

    /// Extractor program to run on the folder
    #[arg(long, env = "VAMA_EXTRACTOR")]
    pub extractor: Option<PathBuf>,

    /// Name of the CSV written into the folder
    #[arg(long, help = "Output file name (default: output.csv)")]
    pub output_name: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write the CSV in place instead of through a temporary file
    #[arg(long)]
    pub no_atomic: bool,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show what would be processed without running the extractor")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_extractor(self.extractor.clone())
            .with_variant(self.variant)
            .with_output_name(self.output_name.clone())
            .with_atomic_write(if self.no_atomic { Some(false) } else { None })
    }

    /// The folder argument as an absolute path to an existing directory.
    pub fn resolve_folder(&self) -> Result<PathBuf> {
        match self.folder {
            Some(ref folder) => resolve_folder(folder),
            None => Err(VamaError::InvalidPath {
                path: "<none>".to_string(),
            }),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn resolve_folder(folder: &Path) -> Result<PathBuf> {
    if !folder.is_dir() {
        return Err(VamaError::InvalidPath {
            path: folder.display().to_string(),
        });
    }

    folder.canonicalize().map_err(|_| VamaError::InvalidPath {
        path: folder.display().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("vama").chain(args.iter().copied()))
    }

    #[test]
    fn test_folder_and_flags() {
        let cli = parse(&[
            "./declaratii",
            "--variant",
            "fara-fizic",
            "--output-name",
            "martie.csv",
            "--no-atomic",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.folder, Some(PathBuf::from("./declaratii")));
        assert_eq!(cli.variant, Some(VariantChoice::FaraFizic));
        assert_eq!(cli.verbosity_level(), 2);
        assert!(cli.is_verbose());

        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.variant, Some(VariantChoice::FaraFizic));
        assert_eq!(overrides.output_name.as_deref(), Some("martie.csv"));
        assert_eq!(overrides.atomic_write, Some(false));
    }

    #[test]
    fn test_folder_required_unless_generating_config() {
        assert!(parse(&["--dry-run"]).is_err());

        let cli = parse(&["--generate-config"]).unwrap();
        assert!(cli.folder.is_none());
        assert!(cli.generate_config);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(parse(&["./d", "-q", "-v"]).is_err());
        let cli = parse(&["./d", "-q"]).unwrap();
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_unknown_variant_rejected() {
        assert!(parse(&["./d", "--variant", "both"]).is_err());
    }

    #[test]
    fn test_cli_overrides_win_over_defaults() {
        let cli = parse(&["./d", "--extractor", "/opt/extract", "--variant", "cu-fizic"]).unwrap();
        let mut config = Config::default();
        config.merge_with_cli_args(&cli.create_cli_overrides());

        assert_eq!(config.extractor.program, PathBuf::from("/opt/extract"));
        assert_eq!(config.template.variant, VariantChoice::CuFizic);
        assert!(config.output.atomic_write);
    }

    #[test]
    fn test_resolve_folder() {
        let temp_dir = TempDir::new().unwrap();
        let resolved = resolve_folder(temp_dir.path()).unwrap();
        assert!(resolved.is_absolute());

        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            resolve_folder(&missing),
            Err(VamaError::InvalidPath { .. })
        ));

        let file = temp_dir.path().join("a.pdf");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            resolve_folder(&file),
            Err(VamaError::InvalidPath { .. })
        ));
    }
}
