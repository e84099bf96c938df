use crate::error::{Result, VamaError};
use crate::parser::declaration::{value_text, ImportDeclaration, CORE_FIELDS};
use crate::sink::{LogEntry, LogSink};
use serde::Serialize;
use serde_json::{Map, Value};

const UNKNOWN_FILE: &str = "<unknown>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Parsed,
    Failed,
    WrongStructure,
}

/// How one source document fared. Only used for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionOutcome {
    pub status: OutcomeStatus,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ExtractionOutcome {
    pub fn status_line(&self) -> String {
        match self.status {
            OutcomeStatus::Parsed => format!("Parsed successfully: {}", self.source_name),
            OutcomeStatus::Failed => format!(
                "Failed to parse: {} → {}",
                self.source_name,
                self.error_detail.as_deref().unwrap_or_default()
            ),
            OutcomeStatus::WrongStructure => format!("Wrong structure: {}", self.source_name),
        }
    }

    fn log_entry(&self) -> LogEntry {
        match self.status {
            OutcomeStatus::Parsed => LogEntry::success(self.status_line()),
            _ => LogEntry::error(self.status_line()),
        }
    }
}

/// A declaration together with the PDF it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDeclaration {
    pub source_name: String,
    #[serde(flatten)]
    pub declaration: ImportDeclaration,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub declarations: Vec<ParsedDeclaration>,
    pub outcomes: Vec<ExtractionOutcome>,
}

impl ParsedBatch {
    pub fn parsed_count(&self) -> usize {
        self.declarations.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.declarations.len()
    }

    pub fn into_declarations(self) -> Vec<ImportDeclaration> {
        self.declarations.into_iter().map(|p| p.declaration).collect()
    }
}

/// Turns the extractor's stdout into declarations.
///
/// The text must be a JSON array. Elements carrying an `error` field and
/// elements without any non-blank core field are reported and skipped; the
/// rest are bound in input order. One status line per element plus a total
/// is appended to `sink`.
pub fn parse_extractor_output(raw: &str, sink: &dyn LogSink) -> Result<ParsedBatch> {
    let root: Value = serde_json::from_str(raw).map_err(|e| VamaError::MalformedOutput {
        reason: format!("invalid JSON: {}", e),
        output: raw.to_string(),
    })?;

    let elements = match root {
        Value::Array(elements) => elements,
        other => {
            return Err(VamaError::MalformedOutput {
                reason: format!("expected a JSON array, got {}", json_kind(&other)),
                output: raw.to_string(),
            })
        }
    };

    let mut batch = ParsedBatch::default();

    for element in elements {
        let (outcome, declaration) = classify(element)?;
        tracing::debug!(file = %outcome.source_name, status = ?outcome.status, "classified extractor element");
        sink.append(outcome.log_entry());

        if let Some(declaration) = declaration {
            batch.declarations.push(ParsedDeclaration {
                source_name: outcome.source_name.clone(),
                declaration,
            });
        }
        batch.outcomes.push(outcome);
    }

    sink.append(LogEntry::info(format!(
        "Total PDFs parsed: {}",
        batch.parsed_count()
    )));

    Ok(batch)
}

fn classify(element: Value) -> Result<(ExtractionOutcome, Option<ImportDeclaration>)> {
    let object = match element {
        Value::Object(object) => object,
        _ => {
            return Ok((
                ExtractionOutcome {
                    status: OutcomeStatus::WrongStructure,
                    source_name: UNKNOWN_FILE.to_string(),
                    error_detail: None,
                },
                None,
            ))
        }
    };

    let source_name = object
        .get("file")
        .filter(|v| !v.is_null())
        .map(value_text)
        .unwrap_or_else(|| UNKNOWN_FILE.to_string());

    if let Some(error) = object.get("error") {
        return Ok((
            ExtractionOutcome {
                status: OutcomeStatus::Failed,
                source_name,
                error_detail: Some(value_text(error)),
            },
            None,
        ));
    }

    if !has_core_field(&object) {
        return Ok((
            ExtractionOutcome {
                status: OutcomeStatus::WrongStructure,
                source_name,
                error_detail: None,
            },
            None,
        ));
    }

    let declaration: ImportDeclaration =
        serde_json::from_value(Value::Object(object)).map_err(|e| VamaError::MalformedOutput {
            reason: format!("could not bind {}: {}", source_name, e),
            output: String::new(),
        })?;

    Ok((
        ExtractionOutcome {
            status: OutcomeStatus::Parsed,
            source_name,
            error_detail: None,
        },
        Some(declaration),
    ))
}

fn has_core_field(object: &Map<String, Value>) -> bool {
    CORE_FIELDS.iter().any(|field| {
        object
            .get(*field)
            .is_some_and(|value| !value_text(value).trim().is_empty())
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
