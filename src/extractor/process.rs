use crate::config::ExtractorConfig;
use crate::error::{Result, VamaError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Raw result of one extractor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl ExtractorOutput {
    pub fn success<S: Into<String>>(stdout: S) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout followed by stderr, as a user would have seen it on a terminal.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Something that turns a folder of declaration PDFs into extractor output.
pub trait Extractor: Send + Sync {
    fn invoke(&self, folder: &Path) -> Result<ExtractorOutput>;

    fn describe(&self) -> String;
}

/// Runs an external executable with the folder as its last argument.
#[derive(Debug, Clone)]
pub struct ProcessExtractor {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessExtractor {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.program.clone()).with_args(config.args.clone())
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl Extractor for ProcessExtractor {
    fn invoke(&self, folder: &Path) -> Result<ExtractorOutput> {
        tracing::info!(
            program = %self.program.display(),
            folder = %folder.display(),
            "Running extractor"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(folder)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| VamaError::ExtractorLaunch {
                program: self.program.display().to_string(),
                source,
            })?;

        let result = ExtractorOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        tracing::info!(
            exit_code = ?result.exit_code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "Extractor finished"
        );

        Ok(result)
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.display().to_string()
        } else {
            format!("{} {}", self.program.display(), self.args.join(" "))
        }
    }
}

/// Runs the extractor and returns its stdout, failing on any non-zero exit.
pub fn run_extractor(extractor: &dyn Extractor, folder: &Path) -> Result<String> {
    let output = extractor.invoke(folder)?;

    if !output.is_success() {
        return Err(VamaError::ExtractorFailure {
            exit_code: output.exit_code,
            output: output.combined(),
        });
    }

    if !output.stderr.trim().is_empty() {
        tracing::debug!(stderr = %output.stderr.trim(), "Extractor wrote to stderr");
    }

    Ok(output.stdout)
}
