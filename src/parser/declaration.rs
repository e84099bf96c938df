use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// JSON keys of the fields that make a declaration worth keeping.
pub const CORE_FIELDS: [&str; 5] = [
    "nrDestinatar",
    "mrn",
    "nrArticole",
    "referintaDocument",
    "nrContainer",
];

/// One customs declaration as reported by the extractor.
///
/// Every field is kept as the text the extractor produced. Missing and
/// `null` values become empty strings; numbers and booleans keep their JSON
/// spelling. Numeric fields are interpreted on demand by the accessors below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImportDeclaration {
    #[serde(rename = "nrDestinatar", deserialize_with = "lenient_text")]
    pub consignee_id: String,
    #[serde(rename = "mrn", deserialize_with = "lenient_text")]
    pub movement_reference_number: String,
    #[serde(rename = "nrArticole", deserialize_with = "lenient_text")]
    pub article_count: String,
    #[serde(rename = "nrContainer", deserialize_with = "lenient_text")]
    pub container_number: String,
    #[serde(rename = "referintaDocument", deserialize_with = "lenient_text")]
    pub document_reference: String,
    #[serde(rename = "nrDeReferinta", deserialize_with = "lenient_text")]
    pub local_reference_number: String,
    #[serde(rename = "valoareStatistica", deserialize_with = "lenient_text")]
    pub statistical_value: String,
    #[serde(rename = "depozitPlataAnticipata", deserialize_with = "lenient_text")]
    pub advance_deposit: String,
    #[serde(rename = "totalPlataA00", deserialize_with = "lenient_text")]
    pub advance_payment_total: String,
}

impl ImportDeclaration {
    pub fn has_core_data(&self) -> bool {
        [
            &self.consignee_id,
            &self.movement_reference_number,
            &self.article_count,
            &self.container_number,
            &self.document_reference,
        ]
        .iter()
        .any(|field| !field.trim().is_empty())
    }

    pub fn has_advance_deposit(&self) -> bool {
        !self.advance_deposit.trim().is_empty()
    }

    /// Number of articles, or 0 when the extractor text is not an integer.
    pub fn article_count_or_zero(&self) -> u32 {
        or_zero("nrArticole", &self.article_count, parse_count(&self.article_count))
    }

    pub fn advance_payment_total_or_zero(&self) -> Decimal {
        or_zero(
            "totalPlataA00",
            &self.advance_payment_total,
            parse_amount(&self.advance_payment_total),
        )
    }

    pub fn advance_deposit_or_zero(&self) -> Decimal {
        or_zero(
            "depozitPlataAnticipata",
            &self.advance_deposit,
            parse_amount(&self.advance_deposit),
        )
    }

    pub fn statistical_value_or_zero(&self) -> Decimal {
        or_zero(
            "valoareStatistica",
            &self.statistical_value,
            parse_amount(&self.statistical_value),
        )
    }
}

/// Extractor output is free text lifted from PDFs, so numeric fields fall back
/// to zero instead of failing the run.
fn or_zero<T: Default>(field: &str, raw: &str, parsed: Result<T, NumberError>) -> T {
    match parsed {
        Ok(value) => value,
        Err(e) => {
            if !raw.trim().is_empty() {
                tracing::debug!(field, raw, error = %e, "numeric field defaulted to zero");
            }
            T::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberError {
    Empty,
    Invalid(String),
}

impl fmt::Display for NumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberError::Empty => write!(f, "empty value"),
            NumberError::Invalid(raw) => write!(f, "not a number: '{}'", raw),
        }
    }
}

impl std::error::Error for NumberError {}

pub fn parse_count(raw: &str) -> Result<u32, NumberError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NumberError::Empty);
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| NumberError::Invalid(raw.to_string()))
}

/// Parses amounts written either way: `1000.50`, `1.000,50`, `1000,50`,
/// `1 000,50` or `1,000.50`.
///
/// When both separators appear the rightmost one is the decimal mark. A
/// single separator is a decimal mark; a repeated one groups thousands.
pub fn parse_amount(raw: &str) -> Result<Decimal, NumberError> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    if compact.is_empty() {
        return Err(NumberError::Empty);
    }

    let last_dot = compact.rfind('.');
    let last_comma = compact.rfind(',');
    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (None, Some(_)) if compact.matches(',').count() == 1 => compact.replace(',', "."),
        (None, Some(_)) => compact.replace(',', ""),
        (Some(_), None) if compact.matches('.').count() > 1 => compact.replace('.', ""),
        _ => compact,
    };

    normalized
        .parse::<Decimal>()
        .map_err(|_| NumberError::Invalid(raw.to_string()))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_text(&value))
}

/// Text form of a JSON value the way it reads in the source document.
/// Objects and arrays carry no text of their own and read as blank.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Object(_) | Value::Array(_) => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_binds_known_fields_and_ignores_unknown() {
        let declaration: ImportDeclaration = serde_json::from_value(json!({
            "file": "a.pdf",
            "nrDestinatar": "RO123",
            "mrn": "24ROCT1900000001",
            "nrArticole": 3,
            "nrContainer": null,
            "somethingElse": {"nested": true}
        }))
        .unwrap();

        assert_eq!(declaration.consignee_id, "RO123");
        assert_eq!(declaration.movement_reference_number, "24ROCT1900000001");
        assert_eq!(declaration.article_count, "3");
        assert_eq!(declaration.container_number, "");
        assert_eq!(declaration.document_reference, "");
        assert!(declaration.has_core_data());
    }

    #[test]
    fn test_blank_fields_are_not_core_data() {
        let declaration: ImportDeclaration = serde_json::from_value(json!({
            "mrn": "   ",
            "valoareStatistica": "100"
        }))
        .unwrap();
        assert!(!declaration.has_core_data());
    }

    #[test]
    fn test_article_count_defaults_to_zero() {
        let mut declaration = ImportDeclaration {
            article_count: " 4 ".to_string(),
            ..Default::default()
        };
        assert_eq!(declaration.article_count_or_zero(), 4);

        declaration.article_count = "patru".to_string();
        assert_eq!(declaration.article_count_or_zero(), 0);

        declaration.article_count = String::new();
        assert_eq!(declaration.article_count_or_zero(), 0);
    }

    #[test]
    fn test_parse_count_errors() {
        assert_eq!(parse_count(""), Err(NumberError::Empty));
        assert!(matches!(parse_count("-1"), Err(NumberError::Invalid(_))));
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("1000").unwrap(), dec("1000"));
        assert_eq!(parse_amount("1000.50").unwrap(), dec("1000.50"));
        assert_eq!(parse_amount("1000,50").unwrap(), dec("1000.50"));
        assert_eq!(parse_amount("1.000,50").unwrap(), dec("1000.50"));
        assert_eq!(parse_amount("1,000.50").unwrap(), dec("1000.50"));
        assert_eq!(parse_amount("1 234 567,8").unwrap(), dec("1234567.8"));
        assert_eq!(parse_amount("1.234.567").unwrap(), dec("1234567"));
        assert_eq!(parse_amount("0.025").unwrap(), dec("0.025"));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount("  "), Err(NumberError::Empty));
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("12,5,x").is_err());
    }

    #[test]
    fn test_advance_amounts() {
        let declaration = ImportDeclaration {
            advance_deposit: "1.500,00".to_string(),
            advance_payment_total: "oops".to_string(),
            statistical_value: "2500".to_string(),
            ..Default::default()
        };
        assert!(declaration.has_advance_deposit());
        assert_eq!(declaration.advance_deposit_or_zero(), dec("1500.00"));
        assert_eq!(declaration.advance_payment_total_or_zero(), Decimal::ZERO);
        assert_eq!(declaration.statistical_value_or_zero(), dec("2500"));
    }
}
