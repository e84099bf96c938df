use crate::parser::{ExtractionOutcome, OutcomeStatus, ParsedDeclaration};
use crate::template::Variant;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Everything worth telling the user once a run succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub folder: PathBuf,
    pub variant: Variant,
    pub variant_detected: bool,
    pub output_path: PathBuf,
    pub pdf_count: usize,
    pub rows_written: usize,
    pub outcomes: Vec<ExtractionOutcome>,
    pub declarations: Vec<ParsedDeclaration>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn parsed_count(&self) -> usize {
        self.declarations.len()
    }

    pub fn failed_count(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }

    pub fn wrong_structure_count(&self) -> usize {
        self.count(OutcomeStatus::WrongStructure)
    }

    pub fn has_skipped(&self) -> bool {
        self.parsed_count() < self.outcomes.len()
    }

    fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}
