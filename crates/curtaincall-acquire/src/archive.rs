// Timestamped raw captures of the content each successful extraction came from.

use chrono::{DateTime, Utc};
use curtaincall_model::{FetchMethod, ReviewRecord};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::error::StoreError;
use crate::store::relative_locator;

/// Writes raw captures under `<data-dir>/archives/<show-id>/`.
pub struct ArchiveWriter {
    data_dir: PathBuf,
}

impl ArchiveWriter {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    /// Persist `raw` for a record and return its path relative to the data directory.
    ///
    /// File names combine outlet, critic (or "unknown"), and capture date.
    /// An existing archive is never overwritten; a numeric suffix is added instead.
    pub fn write(
        &self,
        record: &ReviewRecord,
        url: &str,
        method: FetchMethod,
        raw: &str,
        captured_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let show_dir = self.data_dir.join("archives").join(slugify(&record.show_id));
        std::fs::create_dir_all(&show_dir).map_err(|e| StoreError::io(&show_dir, e))?;

        let stem = format!(
            "{}--{}--{}",
            slugify(&record.outlet_id),
            slugify(record.critic_or_unknown()),
            captured_at.format("%Y-%m-%d")
        );
        let contents = format!("{}{raw}", header(record, url, method, captured_at));

        let mut n = 1u32;
        loop {
            let name = if n == 1 { format!("{stem}.html") } else { format!("{stem}-{n}.html") };
            let path = show_dir.join(&name);
            // create_new refuses to clobber an existing capture
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(contents.as_bytes()).map_err(|e| StoreError::io(&path, e))?;
                    tracing::info!(path = %path.display(), bytes = contents.len(), "Archived raw capture");
                    return Ok(relative_locator(&self.data_dir, &path));
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(StoreError::io(&path, e)),
            }
        }
    }
}

fn header(record: &ReviewRecord, url: &str, method: FetchMethod, captured_at: DateTime<Utc>) -> String {
    format!(
        "<!--\n  url: {}\n  captured: {}\n  method: {}\n  show: {}\n  outlet: {}\n  critic: {}\n-->\n",
        url.replace("--", "%2D%2D"),
        captured_at.to_rfc3339(),
        method,
        comment_safe(&record.show_id),
        comment_safe(record.outlet.as_deref().unwrap_or(&record.outlet_id)),
        comment_safe(record.critic_or_unknown()),
    )
}

/// A header value that cannot close the comment or break onto another line.
fn comment_safe(value: &str) -> String {
    let mut safe = value.replace(['\r', '\n'], " ");
    while safe.contains("--") {
        safe = safe.replace("--", "- -");
    }
    safe
}

/// Lowercase ASCII slug: alphanumerics kept, everything else folded to single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "unknown".to_string()
    } else {
        slug
    }
}
