use crate::error::{Result, VamaError};
use crate::template::Row;
use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Writes `header` and `rows` to `path`, replacing any existing file.
///
/// With `atomic` set the data goes to a temporary file next to `path` that is
/// renamed into place only once everything was written, so a failed write
/// leaves the previous file (or nothing) behind. Without it the target is
/// truncated up front and a failure leaves a partial file.
///
/// Both paths leave the same permissions behind: those of the file being
/// replaced, or the usual umask-filtered defaults for a new file.
pub fn write_csv(path: &Path, header: &[&str], rows: &[Row], atomic: bool) -> Result<()> {
    if atomic {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = create_temp_in(dir)?;
        if let Ok(existing) = std::fs::metadata(path) {
            temp.as_file().set_permissions(existing.permissions())?;
        }
        write_rows(temp.as_file_mut(), header, rows)?;
        temp.persist(path).map_err(|e| VamaError::Io(e.error))?;
    } else {
        let mut file = File::create(path)?;
        write_rows(&mut file, header, rows)?;
    }

    tracing::info!(path = %path.display(), rows = rows.len(), atomic, "CSV written");
    Ok(())
}

fn create_temp_in(dir: &Path) -> Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".vama-").suffix(".csv.tmp");

    // Same mode `File::create` asks for; the process umask still applies.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    Ok(builder.tempfile_in(dir)?)
}

fn write_rows<W: Write>(out: W, header: &[&str], rows: &[Row]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
