use thiserror::Error;

#[derive(Error, Debug)]
pub enum VamaError {
    #[error("Extractor failed with {}: {output}", describe_exit(.exit_code))]
    ExtractorFailure {
        exit_code: Option<i32>,
        output: String,
    },

    #[error("Could not launch extractor {program}: {source}")]
    ExtractorLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected extractor output ({reason}): {output}")]
    MalformedOutput { reason: String, output: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Could not build rows for {record}: {message}")]
    Template { record: String, message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Invalid run state transition: {from} -> {to}")]
    InvalidState { from: String, to: String },

    #[error("Background task failed: {message}")]
    TaskFailed { message: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for VamaError {
    fn user_message(&self) -> String {
        match self {
            VamaError::ExtractorFailure { output, .. } => {
                let output = output.trim();
                if output.is_empty() {
                    "Extractor failed without any output".to_string()
                } else {
                    format!("Extractor failed:\n{}", output)
                }
            }
            VamaError::ExtractorLaunch { program, source } => {
                format!("Could not start extractor '{}': {}", program, source)
            }
            VamaError::MalformedOutput { reason, output } => {
                format!(
                    "Unexpected extractor output ({}):\n{}",
                    reason,
                    truncate(output.trim(), 2000)
                )
            }
            VamaError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            VamaError::InvalidPath { path } => {
                format!("Invalid folder: {}", path)
            }
            VamaError::Csv(e) => {
                format!("Error writing CSV: {}", e)
            }
            VamaError::Io(e) => {
                format!("IO error: {}", e)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            VamaError::ExtractorLaunch { .. } => Some(
                "Point --extractor (or VAMA_EXTRACTOR, or [extractor].program in vama.toml) at the PDF extractor executable.".to_string()
            ),
            VamaError::ExtractorFailure { .. } => Some(
                "Check the extractor output above; the folder must contain readable customs declaration PDFs.".to_string()
            ),
            VamaError::MalformedOutput { .. } => Some(
                "The extractor must print a JSON array on stdout. Make sure the configured program is the declaration extractor.".to_string()
            ),
            VamaError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            VamaError::InvalidPath { .. } => Some(
                "Pass an existing folder that contains the declaration PDFs.".to_string()
            ),
            VamaError::Csv(_) | VamaError::Io(_) => Some(
                "Ensure the folder is writable and output.csv is not open in another program.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for VamaError {
    fn from(error: toml::de::Error) -> Self {
        VamaError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VamaError>;

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_failure_message_carries_output() {
        let error = VamaError::ExtractorFailure {
            exit_code: Some(1),
            output: "boom".to_string(),
        };
        assert!(error.to_string().contains("boom"));
        assert!(error.to_string().contains("exit code 1"));
        assert!(error.user_message().contains("boom"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_signal_termination_is_described() {
        let error = VamaError::ExtractorFailure {
            exit_code: None,
            output: String::new(),
        };
        assert!(error.to_string().contains("terminated by signal"));
        assert_eq!(error.user_message(), "Extractor failed without any output");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let error = VamaError::from(toml_error);
        assert!(matches!(error, VamaError::Config { .. }));
    }
}
