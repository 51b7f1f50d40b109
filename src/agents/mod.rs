pub mod archive_scanner;
pub mod catalog_updater;
pub mod metadata_extractor;

pub use catalog_updater::{AddedVersion, CatalogUpdater, UpdateReport};
pub use metadata_extractor::MetadataExtractor;
