pub mod declaration;
pub mod result_parser;

pub use declaration::{parse_amount, parse_count, ImportDeclaration, NumberError, CORE_FIELDS};
pub use result_parser::{
    parse_extractor_output, ExtractionOutcome, OutcomeStatus, ParsedBatch, ParsedDeclaration,
};
