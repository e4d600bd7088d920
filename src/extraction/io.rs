//! Best-effort file helpers for prompts and artifacts.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::io;
use std::path::Path;

/// Read a UTF-8 text file.
///
/// Missing or undecodable files are logged and yield `None`; the caller
/// decides whether that is fatal.
pub async fn load_text_file(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::error!(path = %path.display(), "File not found");
            None
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error reading file");
            None
        }
    }
}

/// Render a value as 4-space indented JSON. Non-ASCII is kept literal.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Write `value` to `path`, creating parent directories first.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = to_pretty_json(value).map_err(io::Error::other)?;
    tokio::fs::write(path, bytes).await
}

/// Persist a successful extraction. Failures are logged, never propagated.
pub async fn save_json_to_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> bool {
    match write_json(path, value).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Error writing JSON to file");
            false
        }
    }
}

/// Persist an error record. Failures are logged as critical, never propagated.
pub async fn save_error_file<T: Serialize + ?Sized>(path: &Path, record: &T) -> bool {
    match write_json(path, record).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                name: "artifact.error_write_failed",
                path = %path.display(),
                error = %e,
                "Critical error: could not write error file"
            );
            false
        }
    }
}
