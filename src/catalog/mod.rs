pub mod store;
pub mod version;

pub use store::CatalogStore;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A catalog value kept exactly as read: `None` when the key is absent, `Some(Value::Null)` for
/// an explicit `null`. Values of the wrong type read as absent through the accessors.
pub type Field = Option<Value>;

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Field, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn text(field: &Field) -> Option<&str> {
    field.as_ref().and_then(Value::as_str)
}

/// Top-level repository document consumed by the installing client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoCatalog {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Field,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub identifier: Field,
    #[serde(default)]
    pub apps: Vec<CatalogApp>,
    /// Keys the updater does not manage, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogApp {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Field,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub bundle_identifier: Field,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub developer_name: Field,
    /// Most recent first.
    #[serde(default)]
    pub versions: Vec<AppVersion>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppVersion {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub version: Field,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub date: Field,
    #[serde(
        rename = "downloadURL",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub download_url: Field,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub size: Field,
    #[serde(
        rename = "minOSVersion",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_os_version: Field,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identity and version information read from an archive's descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMetadata {
    pub name: String,
    pub bundle_identifier: String,
    pub version: String,
    pub min_os_version: String,
}

/// What [`RepoCatalog::merge_entry`] did with an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Added {
        /// Version that was at the head of the list before this one was prepended.
        previous_head: Option<String>,
        new_app: bool,
    },
    DuplicateVersion,
}

impl RepoCatalog {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: Some(Value::String(name.into())),
            identifier: Some(Value::String(identifier.into())),
            apps: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        text(&self.name)
    }

    pub fn identifier(&self) -> Option<&str> {
        text(&self.identifier)
    }

    pub fn total_versions(&self) -> usize {
        self.apps.iter().map(|app| app.versions.len()).sum()
    }

    /// Record `metadata` in the catalog.
    ///
    /// The app is looked up by bundle identifier and appended when missing. A version label
    /// that is already recorded is left alone; otherwise a new entry dated `date` is
    /// prepended to the app's version list.
    pub fn merge_entry(
        &mut self,
        metadata: &ArchiveMetadata,
        developer_name: &str,
        size: u64,
        download_url: String,
        date: jiff::civil::Date,
    ) -> MergeOutcome {
        let position = self
            .apps
            .iter()
            .position(|app| app.bundle_identifier() == Some(metadata.bundle_identifier.as_str()));

        let (index, new_app) = match position {
            Some(index) => (index, false),
            None => {
                self.apps.push(CatalogApp {
                    name: Some(Value::from(metadata.name.as_str())),
                    bundle_identifier: Some(Value::from(metadata.bundle_identifier.as_str())),
                    developer_name: Some(Value::from(developer_name)),
                    versions: Vec::new(),
                    extra: Map::new(),
                });
                (self.apps.len() - 1, true)
            }
        };

        let app = &mut self.apps[index];
        if app.has_version(&metadata.version) {
            return MergeOutcome::DuplicateVersion;
        }

        let previous_head = app
            .versions
            .first()
            .and_then(AppVersion::version)
            .map(str::to_string);
        app.versions.insert(
            0,
            AppVersion {
                version: Some(Value::from(metadata.version.as_str())),
                date: Some(Value::from(date.strftime("%Y-%m-%d").to_string())),
                download_url: Some(Value::from(download_url)),
                size: Some(Value::from(size)),
                min_os_version: Some(Value::from(metadata.min_os_version.as_str())),
                extra: Map::new(),
            },
        );

        MergeOutcome::Added {
            previous_head,
            new_app,
        }
    }
}

impl CatalogApp {
    pub fn name(&self) -> Option<&str> {
        text(&self.name)
    }

    pub fn bundle_identifier(&self) -> Option<&str> {
        text(&self.bundle_identifier)
    }

    pub fn developer_name(&self) -> Option<&str> {
        text(&self.developer_name)
    }

    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v.version() == Some(version))
    }
}

impl AppVersion {
    pub fn version(&self) -> Option<&str> {
        text(&self.version)
    }

    pub fn date(&self) -> Option<&str> {
        text(&self.date)
    }

    pub fn download_url(&self) -> Option<&str> {
        text(&self.download_url)
    }

    pub fn size(&self) -> Option<u64> {
        self.size.as_ref().and_then(Value::as_u64)
    }

    pub fn min_os_version(&self) -> Option<&str> {
        text(&self.min_os_version)
    }
}
