use crate::catalog::ArchiveMetadata;
use crate::error::{RepoError, Result};
use crate::utils::verbose;
use regex::Regex;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// The application's own `Info.plist`: directly inside the single `.app` bundle under `Payload/`.
/// Frameworks, plug-ins and other nested bundles never match.
pub const DESCRIPTOR_PATTERN: &str = r"^Payload/[^/]+\.app/Info\.plist$";

const MAX_DESCRIPTOR_BYTES: u64 = 8 * 1024 * 1024;

/// Keys read from `Info.plist`; everything else in the descriptor is ignored.
#[derive(Debug, Deserialize)]
struct InfoPlist {
    #[serde(rename = "CFBundleDisplayName")]
    display_name: Option<String>,
    #[serde(rename = "CFBundleName")]
    bundle_name: Option<String>,
    #[serde(rename = "CFBundleIdentifier")]
    bundle_identifier: Option<String>,
    #[serde(rename = "CFBundleShortVersionString")]
    short_version: Option<String>,
    #[serde(rename = "MinimumOSVersion")]
    minimum_os_version: Option<String>,
}

/// MetadataExtractor reads the application descriptor out of an `.ipa` archive
pub struct MetadataExtractor {
    descriptor_regex: Regex,
    default_min_os_version: String,
}

impl MetadataExtractor {
    pub fn new(default_min_os_version: impl Into<String>) -> Result<Self> {
        let descriptor_regex = Regex::new(DESCRIPTOR_PATTERN)
            .map_err(|e| RepoError::Archive(format!("Regex error: {}", e)))?;

        Ok(Self {
            descriptor_regex,
            default_min_os_version: default_min_os_version.into(),
        })
    }

    pub fn is_descriptor(&self, entry_name: &str) -> bool {
        self.descriptor_regex.is_match(entry_name)
    }

    /// Extract identity and version metadata from the archive at `archive_path`.
    ///
    /// Returns `Ok(None)` when the archive has no descriptor, or the descriptor lacks a bundle
    /// identifier or version. A file that is not a readable zip, or a descriptor that is not a
    /// valid property list, is an error. The archive is closed before this returns either way.
    pub fn extract<P: AsRef<Path>>(&self, archive_path: P) -> Result<Option<ArchiveMetadata>> {
        let archive_path = archive_path.as_ref();
        let file = File::open(archive_path)?;
        let mut archive = ZipArchive::new(file)?;

        let Some(index) = self.find_descriptor(&mut archive)? else {
            verbose::log(format!("No descriptor in {}", archive_path.display()));
            return Ok(None);
        };

        let bytes = Self::read_entry(&mut archive, index)?;
        let info: InfoPlist = plist::from_bytes(&bytes)?;

        Ok(self.to_metadata(info, archive_path))
    }

    fn find_descriptor(&self, archive: &mut ZipArchive<File>) -> Result<Option<usize>> {
        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index)?;
            if self.is_descriptor(entry.name()) {
                verbose::log(format!("Using descriptor {}", entry.name()));
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn read_entry(archive: &mut ZipArchive<File>, index: usize) -> Result<Vec<u8>> {
        let mut entry = archive.by_index(index)?;
        let mut bytes = Vec::new();
        entry
            .by_ref()
            .take(MAX_DESCRIPTOR_BYTES + 1)
            .read_to_end(&mut bytes)?;

        if bytes.len() as u64 > MAX_DESCRIPTOR_BYTES {
            return Err(RepoError::Archive(format!(
                "Descriptor '{}' exceeds the 8MB limit",
                entry.name()
            )));
        }

        Ok(bytes)
    }

    fn to_metadata(&self, info: InfoPlist, archive_path: &Path) -> Option<ArchiveMetadata> {
        let Some(bundle_identifier) = non_empty(info.bundle_identifier) else {
            verbose::log(format!(
                "Descriptor in {} has no CFBundleIdentifier",
                archive_path.display()
            ));
            return None;
        };

        let Some(version) = non_empty(info.short_version) else {
            verbose::log(format!(
                "Descriptor in {} has no CFBundleShortVersionString",
                archive_path.display()
            ));
            return None;
        };

        let name = non_empty(info.display_name)
            .or_else(|| non_empty(info.bundle_name))
            .unwrap_or_else(|| bundle_identifier.clone());

        let min_os_version = non_empty(info.minimum_os_version)
            .unwrap_or_else(|| self.default_min_os_version.clone());

        Some(ArchiveMetadata {
            name,
            bundle_identifier,
            version,
            min_os_version,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_ipa, InfoFields, PlistFormat};
    use std::fs;
    use tempfile::tempdir;

    fn extractor() -> MetadataExtractor {
        MetadataExtractor::new("14.0").unwrap()
    }

    #[test]
    fn descriptor_predicate_is_exact() {
        let extractor = extractor();
        assert!(extractor.is_descriptor("Payload/Example.app/Info.plist"));
        assert!(!extractor.is_descriptor("Payload/Example.app/Frameworks/Kit.framework/Info.plist"));
        assert!(!extractor.is_descriptor("Payload/Example.app/PlugIns/Share.appex/Info.plist"));
        assert!(!extractor.is_descriptor("Other/Example.app/Info.plist"));
        assert!(!extractor.is_descriptor("Payload/Example.app/MyInfo.plist"));
        assert!(!extractor.is_descriptor("Payload/Info.plist"));
    }

    #[test]
    fn extracts_fields_from_binary_plist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Example-2.1.ipa");
        write_ipa(
            &path,
            &InfoFields::new("com.example.app", "2.1")
                .display_name("Example")
                .bundle_name("ExampleBundle")
                .min_os("16.0"),
            PlistFormat::Binary,
        );

        let metadata = extractor().extract(&path).unwrap().unwrap();
        assert_eq!(
            metadata,
            ArchiveMetadata {
                name: "Example".to_string(),
                bundle_identifier: "com.example.app".to_string(),
                version: "2.1".to_string(),
                min_os_version: "16.0".to_string(),
            }
        );
    }

    #[test]
    fn falls_back_for_name_and_minimum_os() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Example.ipa");
        write_ipa(
            &path,
            &InfoFields::new("com.example.app", "1.0").bundle_name("ExampleBundle"),
            PlistFormat::Xml,
        );

        let metadata = extractor().extract(&path).unwrap().unwrap();
        assert_eq!(metadata.name, "ExampleBundle");
        assert_eq!(metadata.min_os_version, "14.0");
    }

    #[test]
    fn name_defaults_to_bundle_identifier() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Example.ipa");
        write_ipa(&path, &InfoFields::new("com.example.app", "1.0"), PlistFormat::Xml);

        let metadata = extractor().extract(&path).unwrap().unwrap();
        assert_eq!(metadata.name, "com.example.app");
    }

    #[test]
    fn missing_descriptor_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Empty.ipa");
        crate::test_support::write_zip(
            &path,
            &[(
                "Payload/Example.app/Frameworks/Kit.framework/Info.plist",
                b"not used".as_slice(),
            )],
        );

        assert_eq!(extractor().extract(&path).unwrap(), None);
    }

    #[test]
    fn missing_version_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Example.ipa");
        write_ipa(&path, &InfoFields::new("com.example.app", ""), PlistFormat::Xml);

        assert_eq!(extractor().extract(&path).unwrap(), None);
    }

    #[test]
    fn non_zip_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Broken.ipa");
        fs::write(&path, b"definitely not a zip archive").unwrap();

        let err = extractor().extract(&path).unwrap_err();
        assert!(matches!(err, RepoError::Zip(_)));
    }

    #[test]
    fn garbage_descriptor_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Garbage.ipa");
        crate::test_support::write_zip(
            &path,
            &[("Payload/Example.app/Info.plist", b"\x00\x01garbage".as_slice())],
        );

        let err = extractor().extract(&path).unwrap_err();
        assert!(matches!(err, RepoError::Plist(_)));
    }
}
