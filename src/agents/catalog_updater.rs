use crate::agents::archive_scanner::{ArchiveFile, ArchiveScannerAgent};
use crate::agents::metadata_extractor::MetadataExtractor;
use crate::catalog::version::is_older;
use crate::catalog::{ArchiveMetadata, CatalogStore, MergeOutcome, RepoCatalog};
use crate::config::RepoConfig;
use crate::error::Result;
use crate::utils::verbose;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use jiff::Zoned;
use jiff::civil::Date;
use std::fs;
use std::path::PathBuf;

/// CatalogUpdater runs the scan → extract → merge → persist pass over the archive directory
pub struct CatalogUpdater {
    config: RepoConfig,
    scanner: ArchiveScannerAgent,
    extractor: MetadataExtractor,
    store: CatalogStore,
    show_progress: bool,
    dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedVersion {
    pub name: String,
    pub bundle_identifier: String,
    pub version: String,
    pub download_url: String,
    pub new_app: bool,
    /// Set when the new label sorts below the version it was placed ahead of.
    pub older_than: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedArchive {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub catalog_path: PathBuf,
    pub added: Vec<AddedVersion>,
    pub skipped: Vec<SkippedArchive>,
    pub duplicates: usize,
    pub source_created: bool,
    pub persisted: bool,
}

impl UpdateReport {
    fn new(catalog_path: PathBuf) -> Self {
        Self {
            catalog_path,
            added: Vec::new(),
            skipped: Vec::new(),
            duplicates: 0,
            source_created: false,
            persisted: false,
        }
    }
}

impl CatalogUpdater {
    pub fn new(config: RepoConfig) -> Result<Self> {
        Ok(Self {
            scanner: ArchiveScannerAgent::new(&config.ipa_dir),
            extractor: MetadataExtractor::new(config.default_min_os_version.clone())?,
            store: CatalogStore::new(&config.catalog_path),
            config,
            show_progress: false,
            dry_run: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the update, stamping new versions with today's local date.
    pub fn run(&self) -> Result<UpdateReport> {
        self.run_on(Zoned::now().date())
    }

    pub fn run_on(&self, today: Date) -> Result<UpdateReport> {
        let mut report = UpdateReport::new(self.store.path().to_path_buf());

        let mut catalog = self
            .store
            .load_or_default(&self.config.repo_name, &self.config.repo_identifier)?;

        if self.scanner.ensure_directory()? {
            verbose::log(format!(
                "Created missing archive directory {}",
                self.config.ipa_dir.display()
            ));
            report.source_created = true;
            return Ok(report);
        }

        let archives = self.scanner.scan()?;
        verbose::log(format!(
            "Found {} archive(s) in {}",
            archives.len(),
            self.config.ipa_dir.display()
        ));

        let pb = ProgressBar::new(archives.len() as u64);
        if !self.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::with_template("  [{bar:40}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("=>-"));
        }

        for archive in &archives {
            pb.set_message(format!("Reading {}", archive.file_name));
            self.process_archive(archive, &mut catalog, today, &mut report)?;
            pb.inc(1);
        }
        pb.finish_and_clear();

        if self.dry_run {
            verbose::log("Dry run, catalog not written");
        } else {
            self.store.persist(&catalog)?;
            report.persisted = true;
        }

        Ok(report)
    }

    fn process_archive(
        &self,
        archive: &ArchiveFile,
        catalog: &mut RepoCatalog,
        today: Date,
        report: &mut UpdateReport,
    ) -> Result<()> {
        let metadata = match self.extractor.extract(&archive.path) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                report.skipped.push(SkippedArchive {
                    file_name: archive.file_name.clone(),
                    reason: "no usable Info.plist".to_string(),
                });
                return Ok(());
            }
            Err(e) => {
                report.skipped.push(SkippedArchive {
                    file_name: archive.file_name.clone(),
                    reason: e.to_string(),
                });
                return Ok(());
            }
        };

        let size = fs::metadata(&archive.path)?.len();
        let download_url = self.config.download_url(&archive.file_name)?;

        match catalog.merge_entry(
            &metadata,
            &self.config.developer_name,
            size,
            download_url.clone(),
            today,
        ) {
            MergeOutcome::Added {
                previous_head,
                new_app,
            } => {
                report.added.push(Self::added_version(
                    &metadata,
                    download_url,
                    previous_head,
                    new_app,
                ));
            }
            MergeOutcome::DuplicateVersion => {
                verbose::log(format!(
                    "{} v{} already in catalog ({})",
                    metadata.bundle_identifier, metadata.version, archive.file_name
                ));
                report.duplicates += 1;
            }
        }

        Ok(())
    }

    fn added_version(
        metadata: &ArchiveMetadata,
        download_url: String,
        previous_head: Option<String>,
        new_app: bool,
    ) -> AddedVersion {
        AddedVersion {
            name: metadata.name.clone(),
            bundle_identifier: metadata.bundle_identifier.clone(),
            version: metadata.version.clone(),
            download_url,
            new_app,
            older_than: previous_head.filter(|head| is_older(&metadata.version, head)),
        }
    }
}
