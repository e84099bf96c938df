pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod scanner;
pub mod session;
pub mod sink;
pub mod template;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractorConfig, OutputConfig, TemplateConfig};
pub use error::{Result, UserFriendlyError, VamaError};

// Core functionality re-exports
pub use extractor::{Extractor, ExtractorOutput, ProcessExtractor};
pub use parser::{parse_extractor_output, ExtractionOutcome, ImportDeclaration, OutcomeStatus};
pub use scanner::{detect_variant, scan_folder, PdfFile};
pub use session::{RunEvent, RunReport, RunState, Session, Stage};
pub use sink::{LogEntry, LogLevel, LogSink};
pub use template::{RowTemplater, Variant, VariantChoice};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager, RunProgress};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Main library interface: one session plus the terminal it reports to.
pub struct Vama {
    session: Session,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl Vama {
    /// Create a new instance running the configured extractor program
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let extractor = ProcessExtractor::from_config(&config.extractor);
        Self::with_extractor(config, Arc::new(extractor), output_mode, verbose, quiet)
    }

    /// Create an instance around any extractor implementation
    pub fn with_extractor(
        config: Config,
        extractor: Arc<dyn Extractor>,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            session: Session::new(config, extractor),
            output_formatter,
            progress_manager,
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Process one folder in the background, printing its status lines as
    /// they arrive.
    pub async fn process_folder(&mut self, folder: &Path) -> Result<RunReport> {
        self.output_formatter
            .start_operation("Converting declarations to CSV");

        let folder_name = folder
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| folder.display().to_string());
        let progress = RunProgress::new(&self.progress_manager, &folder_name);
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));

        let result = self
            .session
            .run(folder.to_path_buf(), |event| match event {
                RunEvent::Log(entry) => output.log_entry(entry),
                RunEvent::Stage(stage) => {
                    tracing::debug!(stage = ?stage, "Run stage changed");
                    progress.set_stage(*stage);
                }
                RunEvent::Finished(_) => {}
            })
            .await;

        match result {
            Ok(_) => progress.finish_success(),
            Err(_) => progress.finish_error(),
        }
        self.progress_manager.clear();

        result
    }

    /// Where a run on `folder` would write its CSV
    pub fn planned_output_path(&self, folder: &Path) -> PathBuf {
        folder.join(&self.config().output.file_name)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        self.session.config()
    }

    pub fn state(&self) -> RunState {
        self.session.state()
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Get progress manager reference
    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &VamaError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Install the diagnostic subscriber. `RUST_LOG` wins when set; otherwise
/// each `-v` lowers the threshold one level starting from warn.
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "vama=warn",
        1 => "vama=info",
        2 => "vama=debug",
        _ => "vama=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "vama {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct CannedExtractor(ExtractorOutput);

    impl Extractor for CannedExtractor {
        fn invoke(&self, _folder: &Path) -> Result<ExtractorOutput> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "canned".to_string()
        }
    }

    fn quiet_vama(output: ExtractorOutput) -> Vama {
        Vama::with_extractor(
            Config::default(),
            Arc::new(CannedExtractor(output)),
            OutputMode::Plain,
            0,
            true,
        )
    }

    #[test]
    fn test_vama_creation() {
        let vama = Vama::new(Config::default(), OutputMode::Human, 1, false);
        assert_eq!(vama.state(), RunState::Idle);
        assert_eq!(vama.config().output.file_name, "output.csv");
    }

    #[test]
    fn test_planned_output_path() {
        let vama = quiet_vama(ExtractorOutput::success("[]"));
        assert_eq!(
            vama.planned_output_path(Path::new("/data/martie")),
            PathBuf::from("/data/martie/output.csv")
        );
    }

    #[tokio::test]
    async fn test_process_folder_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.pdf"), b"%PDF").unwrap();
        let mut vama = quiet_vama(ExtractorOutput::success(
            r#"[{"file": "a.pdf", "nrDestinatar": "RO9", "mrn": "24RO9", "nrArticole": "1",
                 "nrContainer": "C1", "referintaDocument": "ROBU1000 / x",
                 "depozitPlataAnticipata": "yes", "totalPlataA00": "1000"}]"#,
        ));

        let report = vama.process_folder(temp_dir.path()).await.unwrap();

        assert_eq!(vama.state(), RunState::Succeeded);
        assert_eq!(report.rows_written, 5);
        let content = fs::read_to_string(temp_dir.path().join("output.csv")).unwrap();
        assert!(content.contains("\"ADVANCE PAYMENT COMMISSION\""));
        assert!(content.contains("\"CT - ROBU1000 / x\""));
    }

    #[tokio::test]
    async fn test_process_folder_failure_settles_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut vama = quiet_vama(ExtractorOutput {
            stdout: String::new(),
            stderr: "boom".to_string(),
            exit_code: Some(1),
        });

        let err = vama.process_folder(temp_dir.path()).await.unwrap_err();

        assert!(matches!(err, VamaError::ExtractorFailure { .. }));
        assert_eq!(vama.state(), RunState::Failed);
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        Vama::generate_sample_config(&config_path).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[extractor]"));
        assert!(content.contains("[output]"));
        assert!(content.contains("[template]"));
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing(0);
        init_tracing(2);
    }

    #[test]
    fn test_build_info_display() {
        let build_info = build_info();
        let display_string = build_info.to_string();
        assert!(display_string.starts_with("vama "));
        assert!(display_string.contains(version_info()));
    }
}
