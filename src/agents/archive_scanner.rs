use crate::error::Result;
use crate::utils::verbose;
use std::fs;
use std::path::{Path, PathBuf};

pub const ARCHIVE_EXTENSION: &str = ".ipa";

/// ArchiveScannerAgent lists the package archives in the source directory
pub struct ArchiveScannerAgent {
    ipa_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl ArchiveScannerAgent {
    pub fn new<P: AsRef<Path>>(ipa_dir: P) -> Self {
        Self {
            ipa_dir: ipa_dir.as_ref().to_path_buf(),
        }
    }

    /// Create the source directory if it is missing. Returns `true` when it had to be created.
    pub fn ensure_directory(&self) -> Result<bool> {
        if self.ipa_dir.exists() {
            return Ok(false);
        }

        fs::create_dir_all(&self.ipa_dir)?;
        Ok(true)
    }

    /// Regular files ending in `.ipa`, sorted by file name.
    pub fn scan(&self) -> Result<Vec<ArchiveFile>> {
        let mut archives = Vec::new();

        for entry in fs::read_dir(&self.ipa_dir)? {
            let entry = entry?;
            let path = entry.path();

            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                verbose::log(format!("Skipping non UTF-8 file name: {}", path.display()));
                continue;
            };

            if !file_name.ends_with(ARCHIVE_EXTENSION) || !path.is_file() {
                continue;
            }

            archives.push(ArchiveFile { path, file_name });
        }

        archives.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(archives)
    }
}
