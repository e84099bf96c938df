use crate::error::{Result, VamaError};
use crate::template::Variant;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
}

/// Lists the declaration PDFs sitting directly in a folder.
///
/// The extractor only looks at the top level, so neither does this.
pub fn scan_folder<P: AsRef<Path>>(folder: P) -> Result<Vec<PdfFile>> {
    let folder = folder.as_ref();

    if !folder.exists() {
        return Err(VamaError::InvalidPath {
            path: folder.display().to_string(),
        });
    }

    if !folder.is_dir() {
        return Err(VamaError::InvalidPath {
            path: format!("{} is not a directory", folder.display()),
        });
    }

    let mut pdfs = Vec::new();

    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_pdf(entry.path()) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        pdfs.push(PdfFile {
            path: entry.path().to_path_buf(),
            filename: entry.file_name().to_string_lossy().into_owned(),
            size,
        });
    }

    tracing::debug!(folder = %folder.display(), count = pdfs.len(), "Scanned folder");
    Ok(pdfs)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Picks the variant from folder content: a folder or PDF named like
/// "fara fizic" means no physical control took place.
pub fn detect_variant(folder: &Path, pdfs: &[PdfFile]) -> Variant {
    let folder_name = folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let marked = has_no_control_marker(&folder_name)
        || pdfs.iter().any(|pdf| has_no_control_marker(&pdf.filename));

    if marked {
        Variant::FaraFizic
    } else {
        Variant::CuFizic
    }
}

fn has_no_control_marker(name: &str) -> bool {
    let squashed: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .map(|c| if c == 'ă' { 'a' } else { c })
        .collect();
    squashed.contains("farafizic")
}
