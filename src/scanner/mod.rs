pub mod folder_scanner;

pub use folder_scanner::{detect_variant, scan_folder, PdfFile};
