pub mod process;

pub use process::{run_extractor, Extractor, ExtractorOutput, ProcessExtractor};
