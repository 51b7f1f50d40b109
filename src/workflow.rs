use crate::agents::{AddedVersion, CatalogUpdater, MetadataExtractor, UpdateReport};
use crate::catalog::{AppVersion, CatalogStore, RepoCatalog};
use crate::config::RepoConfig;
use crate::error::{RepoError, Result};
use crate::utils::verbose;
use colored::Colorize;
use std::io::IsTerminal;
use std::path::Path;

/// Execute the update workflow
pub fn execute_update(config: RepoConfig, dry_run: bool) -> Result<()> {
    let ipa_dir = config.ipa_dir.clone();
    let updater = CatalogUpdater::new(config)?
        .with_progress(std::io::stderr().is_terminal())
        .with_dry_run(dry_run);

    let report = updater.run()?;

    if report.source_created {
        println!(
            "{}",
            format!(
                "Created archive directory {}; nothing to scan yet",
                ipa_dir.display()
            )
            .yellow()
        );
        return Ok(());
    }

    print_update_report(&report);
    Ok(())
}

fn print_update_report(report: &UpdateReport) {
    for added in &report.added {
        println!("{}", added_line(added).green());
        if added.new_app {
            verbose::log(format!("New app entry for {}", added.bundle_identifier));
        }
        verbose::log(format!("Download URL: {}", added.download_url));
        if let Some(warning) = order_warning_line(added) {
            println!("  {}", warning.yellow());
        }
    }

    if verbose::is_enabled() {
        for line in diagnostic_lines(report) {
            verbose::log(line);
        }
    }

    println!("{}", summary_line(report).cyan().bold());
}

fn added_line(added: &AddedVersion) -> String {
    format!("Added {} v{}", added.name, added.version)
}

fn order_warning_line(added: &AddedVersion) -> Option<String> {
    added.older_than.as_ref().map(|head| {
        format!(
            "⚠ {} v{} was placed ahead of newer v{}",
            added.bundle_identifier, added.version, head
        )
    })
}

/// Verbose-only lines: one per skipped archive, then the tally.
fn diagnostic_lines(report: &UpdateReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .skipped
        .iter()
        .map(|skipped| format!("Skipped {}: {}", skipped.file_name, skipped.reason))
        .collect();
    lines.push(format!(
        "{} archive(s) skipped, {} version(s) already recorded",
        report.skipped.len(),
        report.duplicates
    ));
    lines
}

fn summary_line(report: &UpdateReport) -> String {
    if report.persisted {
        format!("Repository updated: {}", report.catalog_path.display())
    } else {
        format!(
            "Dry run: {} version(s) would be added to {}",
            report.added.len(),
            report.catalog_path.display()
        )
    }
}

/// Execute the list workflow - display all apps and their versions
pub fn execute_list(config: &RepoConfig) -> Result<()> {
    let store = CatalogStore::new(&config.catalog_path);
    let Some(catalog) = store.load()? else {
        return Err(RepoError::Catalog(format!(
            "Catalog '{}' does not exist yet. Run `ipa-repo update` first.",
            config.catalog_path.display()
        )));
    };

    print_catalog(&catalog);
    Ok(())
}

fn print_catalog(catalog: &RepoCatalog) {
    println!(
        "{} {}",
        catalog.name().unwrap_or(UNSET).cyan().bold(),
        format!("({})", catalog.identifier().unwrap_or(UNSET)).dimmed()
    );

    if catalog.apps.is_empty() {
        println!("\n{}", "No apps recorded".yellow());
        return;
    }

    for app in &catalog.apps {
        println!(
            "\n{} {}",
            app.name().unwrap_or(UNSET).white().bold(),
            app.bundle_identifier().unwrap_or(UNSET).dimmed()
        );
        for version in &app.versions {
            println!("  • {}", version_line(version));
        }
    }

    println!("\n{}", "Summary:".cyan().bold());
    println!("  {} apps", catalog.apps.len().to_string().yellow());
    println!(
        "  {} versions",
        catalog.total_versions().to_string().yellow()
    );
}

/// Placeholder for catalog values that are missing, `null`, or of the wrong type.
const UNSET: &str = "-";

fn version_line(version: &AppVersion) -> String {
    let size = version
        .size()
        .map_or_else(|| UNSET.to_string(), |size| format!("{size} bytes"));
    let min_os = version
        .min_os_version()
        .map_or_else(|| UNSET.to_string(), |min_os| format!("iOS {min_os}+"));
    format!(
        "{} {} {} {}",
        version.version().unwrap_or(UNSET).green(),
        version.date().unwrap_or(UNSET),
        size.dimmed(),
        min_os.dimmed()
    )
}

/// Execute the inspect workflow - print the metadata embedded in one archive
pub fn execute_inspect<P: AsRef<Path>>(config: &RepoConfig, archive: P) -> Result<()> {
    let archive = archive.as_ref();
    let extractor = MetadataExtractor::new(config.default_min_os_version.clone())?;

    let Some(metadata) = extractor.extract(archive)? else {
        return Err(RepoError::Archive(format!(
            "No usable Info.plist found in '{}'",
            archive.display()
        )));
    };

    println!("{}", "✓ Descriptor found".green());
    println!("  Name:              {}", metadata.name.white().bold());
    println!("  Bundle identifier: {}", metadata.bundle_identifier);
    println!("  Version:           {}", metadata.version.green());
    println!("  Minimum OS:        {}", metadata.min_os_version);
    Ok(())
}
