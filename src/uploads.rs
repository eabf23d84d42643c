//! On-disk storage for uploaded item images.

use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the image and returns the name it was stored under. The file is
    /// synced before returning so a record is never written for bytes that
    /// are not on disk.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.dir).context("Failed to create upload directory")?;

        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize_filename(original_name));
        let path = self.dir.join(&stored_name);

        let mut file = fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(bytes).context("Failed to write image")?;
        file.sync_all().context("Failed to flush image to disk")?;

        Ok(stored_name)
    }

    /// Removes a stored image. A file that is already gone is not an error.
    pub fn remove(&self, stored_name: &str) -> Result<()> {
        let Some(name) = Path::new(stored_name).file_name() else {
            return Ok(());
        };
        match fs::remove_file(self.dir.join(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove image"),
        }
    }

    pub fn exists(&self, stored_name: &str) -> bool {
        self.dir.join(stored_name).is_file()
    }
}

/// Reduces a client-supplied file name to something safe to join onto the
/// upload directory: ASCII alphanumerics plus `.`, `-` and `_`, whitespace
/// turned into `_`, no leading dots.
pub fn sanitize_filename(name: &str) -> String {
    // Browsers on Windows may send the full client path.
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\red shirt.png"), "red_shirt.png");
        assert_eq!(sanitize_filename(".hidden.jpg"), "hidden.jpg");
        assert_eq!(sanitize_filename("çanta€.png"), "anta.png");
        assert_eq!(sanitize_filename("..."), "upload");
    }

    #[test]
    fn save_then_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("uploads"));

        let name = store.save("shirt.png", b"png-bytes").unwrap();
        assert!(name.ends_with("-shirt.png"));
        assert!(store.exists(&name));
        assert_eq!(fs::read(store.dir().join(&name)).unwrap(), b"png-bytes");

        store.remove(&name).unwrap();
        assert!(!store.exists(&name));
    }

    #[test]
    fn same_name_uploads_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let a = store.save("shoe.jpg", b"a").unwrap();
        let b = store.save("shoe.jpg", b"b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn removing_missing_file_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        store.remove("never-written.png").unwrap();
    }
}
