use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `contents` to `dst` via a sibling temp file and rename, so `dst` is
/// never observed half-written.
pub fn atomic_write(dst: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_sibling(dst);

    // create_new: an attacker-placed symlink at the temp path makes this fail
    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions or disk space",
                temp_path.display()
            )
        })?;

    let written = temp_file
        .write_all(contents)
        .and_then(|()| temp_file.sync_all());
    drop(temp_file);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e).with_context(|| {
            format!(
                "Failed to write '{}': disk may be full",
                temp_path.display()
            )
        });
    }

    // rename fails on Windows if the destination exists
    #[cfg(windows)]
    if dst.exists() {
        std::fs::remove_file(dst).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!("Failed to replace existing '{}'", dst.display())
        })?;
    }

    std::fs::rename(&temp_path, dst).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}': check permissions",
            temp_path.display(),
            dst.display()
        )
    })?;

    Ok(())
}

fn temp_sibling(dst: &Path) -> PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "newsdesk".to_string());
    dst.with_file_name(format!(".{name}.tmp.{nanos:016x}"))
}

/// Canonicalize a user-supplied path and require it to be a regular file.
pub fn resolve_regular_file(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve file: {}", path.display()))?;
    let metadata = std::fs::metadata(&canonical)
        .with_context(|| format!("Failed to read metadata: {}", canonical.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("Not a regular file: {}", canonical.display());
    }
    Ok(canonical)
}

/// Reduce an arbitrary title to a safe file name: ASCII alphanumerics and
/// dashes, at most 80 characters.
pub fn sanitize_file_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().min(80));
    let mut last_dash = true;
    for c in raw.chars() {
        if out.len() >= 80 {
            break;
        }
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "article".to_string()
    } else {
        trimmed.to_string()
    }
}
