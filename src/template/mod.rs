pub mod rows;
pub mod variant;
pub mod writer;

pub use rows::{commission_for, Row, RowTemplater};
pub use variant::{Variant, VariantChoice};
pub use writer::write_csv;
