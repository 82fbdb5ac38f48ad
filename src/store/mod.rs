//! File store resolver
//!
//! Enumerates the managed root directory and resolves file names to paths
//! under it. Every call goes to the filesystem; nothing is cached.

mod record;

pub use record::{FileRecord, Listing};

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::FileError;
use crate::http::mime;
use crate::logger;

/// Extensions whose content may be returned as text
pub const TEXT_EXTENSIONS: [&str; 2] = ["txt", "loc"];

/// Resolver bound to a single managed root
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store for `root`
    ///
    /// The root is made absolute (relative to the working directory) but not
    /// canonicalized, and it does not need to exist yet.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            root: std::path::absolute(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root and describe every regular file below it
    ///
    /// A missing root is created and yields an empty listing. Walk errors are
    /// logged and counted in `Listing::skipped`; they never abort the walk.
    pub fn list_files(&self) -> Listing {
        let mut listing = Listing::default();

        if !self.root.exists() {
            if let Err(e) = fs::create_dir_all(&self.root) {
                logger::log_warning(&format!(
                    "Failed to create storage root '{}': {e}",
                    self.root.display()
                ));
                listing.skipped += 1;
            }
            return listing;
        }

        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    logger::log_warning(&format!("Skipping unreadable entry: {e}"));
                    listing.skipped += 1;
                    continue;
                }
            };

            // Symlinks report their own type here, so they are excluded too
            if !entry.file_type().is_file() {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) => {
                    let record = FileRecord::new(entry.path(), metadata.len());
                    logger::log_debug(&format!(
                        "Processing file: {}, type: {}, size: {}",
                        record.name, record.extension, record.size_bytes
                    ));
                    listing.records.push(record);
                }
                Err(e) => {
                    logger::log_warning(&format!(
                        "Failed to read metadata for '{}': {e}",
                        entry.path().display()
                    ));
                    listing.skipped += 1;
                }
            }
        }

        listing
    }

    /// Resolve `name` to a path under the root
    ///
    /// The name is joined as-is (no canonicalization). Names that could step
    /// outside the root (`..`, absolute paths) are treated as missing.
    pub async fn resolve_path(&self, name: &str) -> Result<PathBuf, FileError> {
        let path = self
            .join_under_root(name)
            .ok_or_else(|| FileError::NotFound(name.to_string()))?;

        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(path),
            Ok(false) => Err(FileError::NotFound(name.to_string())),
            Err(source) => Err(FileError::Io { path, source }),
        }
    }

    /// Read the whole file in one call
    pub async fn read_bytes(&self, name: &str) -> Result<Vec<u8>, FileError> {
        let path = self.resolve_path(name).await?;
        read_file(path).await
    }

    /// Read a `.txt`/`.loc` file as text
    ///
    /// Existence is checked before the extension, so a missing file is
    /// `NotFound` whatever its extension. Invalid UTF-8 is replaced, not rejected.
    pub async fn read_text(&self, name: &str) -> Result<String, FileError> {
        let path = self.resolve_path(name).await?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = mime::extension_of(&file_name);
        if !is_text_extension(extension) {
            return Err(FileError::UnsupportedType(extension.to_string()));
        }

        let content = read_file(path).await?;
        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    fn join_under_root(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let only_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));

        if name.is_empty() || !only_normal {
            if !name.is_empty() {
                logger::log_warning(&format!("Path traversal attempt blocked: {name}"));
            }
            return None;
        }
        Some(self.root.join(relative))
    }
}

/// Whether `extension` (any casing) may be read as text
pub fn is_text_extension(extension: &str) -> bool {
    TEXT_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
}

async fn read_file(path: PathBuf) -> Result<Vec<u8>, FileError> {
    match tokio::fs::read(&path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FileError::NotFound(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        )),
        Err(source) => Err(FileError::Io { path, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scenario_root() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.txt"), b"hello").unwrap();
        fs::write(dir.path().join("image.PNG"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("noext"), b"").unwrap();
        dir
    }

    fn sorted_records(listing: Listing) -> Vec<(String, String, u64)> {
        let mut records: Vec<_> = listing
            .records
            .into_iter()
            .map(|r| (r.name, r.extension, r.size_bytes))
            .collect();
        records.sort();
        records
    }

    #[test]
    fn test_list_scenario() {
        let dir = scenario_root();
        let store = FileStore::new(dir.path()).unwrap();

        let listing = store.list_files();
        assert!(!listing.is_partial());
        assert_eq!(
            sorted_records(listing),
            vec![
                ("image.PNG".to_string(), "PNG".to_string(), 100),
                ("noext".to_string(), String::new(), 0),
                ("report.txt".to_string(), "txt".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_list_recurses_and_reports_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/b/deep.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("a/top.txt"), b"x").unwrap();
        // Same name in another directory shows up twice
        fs::write(dir.path().join("top.txt"), b"yy").unwrap();

        let store = FileStore::new(dir.path()).unwrap();
        let listing = store.list_files();
        assert_eq!(listing.records.len(), 3);

        for record in &listing.records {
            let path = Path::new(&record.absolute_path);
            assert!(path.is_absolute());
            assert!(path.starts_with(store.root()));
        }
        let tops = listing
            .records
            .iter()
            .filter(|r| r.name == "top.txt")
            .count();
        assert_eq!(tops, 2);
    }

    #[test]
    fn test_list_creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("upload");
        let store = FileStore::new(&root).unwrap();

        let listing = store.list_files();
        assert!(listing.records.is_empty());
        assert!(!listing.is_partial());
        assert!(root.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_list_skips_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("real.txt"), b"data").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt"))
            .unwrap();

        let store = FileStore::new(dir.path()).unwrap();
        let names: Vec<_> = store
            .list_files()
            .records
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["real.txt".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_reports_uncreatable_root() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let store = FileStore::new(blocker.join("upload")).unwrap();

        let listing = store.list_files();
        assert!(listing.records.is_empty());
        assert_eq!(listing.skipped, 1);
        assert!(listing.is_partial());
    }

    #[cfg(unix)]
    #[test]
    fn test_list_keeps_readable_files_past_unreadable_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("visible.txt"), b"ok").unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), b"secret").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop root
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let store = FileStore::new(dir.path()).unwrap();
        let listing = store.list_files();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let names: Vec<_> = listing.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["visible.txt"]);
        assert!(listing.skipped >= 1);
        assert!(listing.is_partial());
    }

    #[tokio::test]
    async fn test_resolve_missing_is_not_found() {
        let dir = scenario_root();
        let store = FileStore::new(dir.path()).unwrap();

        let err = store.resolve_path("missing.txt").await.unwrap_err();
        assert!(matches!(err, FileError::NotFound(name) if name == "missing.txt"));
    }

    #[tokio::test]
    async fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
        let store = FileStore::new(&root).unwrap();

        for name in ["../secret.txt", "", "./secret.txt"] {
            assert!(matches!(
                store.resolve_path(name).await,
                Err(FileError::NotFound(_))
            ));
        }
        let absolute = dir.path().join("secret.txt");
        assert!(matches!(
            store.resolve_path(&absolute.to_string_lossy()).await,
            Err(FileError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_read_bytes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let payload: Vec<u8> = (0..=255).collect();
        fs::write(dir.path().join("blob.bin"), &payload).unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert_eq!(store.read_bytes("blob.bin").await.unwrap(), payload);
        assert!(matches!(
            store.read_bytes("nope.bin").await,
            Err(FileError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_read_bytes_of_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("folder")).unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert!(matches!(
            store.read_bytes("folder").await,
            Err(FileError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_text_scenario() {
        let dir = scenario_root();
        let store = FileStore::new(dir.path()).unwrap();

        assert_eq!(store.read_text("report.txt").await.unwrap(), "hello");
        assert!(matches!(
            store.read_text("image.PNG").await,
            Err(FileError::UnsupportedType(ext)) if ext == "PNG"
        ));
        assert!(matches!(
            store.read_text("noext").await,
            Err(FileError::UnsupportedType(ext)) if ext.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_read_text_checks_existence_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert!(matches!(
            store.read_text("missing.png").await,
            Err(FileError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_read_text_allow_list_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("NOTES.TXT"), b"upper").unwrap();
        fs::write(dir.path().join("strings.Loc"), b"key=value").unwrap();
        fs::write(dir.path().join("broken.txt"), [0x66, 0x6f, 0xff, 0x6f]).unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert_eq!(store.read_text("NOTES.TXT").await.unwrap(), "upper");
        assert_eq!(store.read_text("strings.Loc").await.unwrap(), "key=value");
        assert_eq!(store.read_text("broken.txt").await.unwrap(), "fo\u{fffd}o");
    }

    #[test]
    fn test_text_extensions() {
        assert!(is_text_extension("txt"));
        assert!(is_text_extension("LOC"));
        assert!(!is_text_extension("pdf"));
        assert!(!is_text_extension(""));
    }
}
