pub mod link;
pub mod names;
pub mod normalize;
pub mod transform;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::config::{CatalogSource, Config};
use crate::directory::DirectoryLookup;
use crate::error::Result;
use crate::patterns;
use crate::types::{FacultyTableRow, FlatFile, RawDocument, RecordOutcome, RecordSource};

/// Summary of one per-year harvest run, including the audit trail of
/// everything that did not resolve cleanly.
#[derive(Debug, Serialize)]
pub struct HarvestResult {
    pub academic_year: String,
    pub total_names: usize,
    pub linked_from_catalog: usize,
    pub resolved_from_directory: usize,
    pub ambiguous: usize,
    pub missing: usize,
    pub failed: usize,
    pub diagnostics: Vec<String>,
    pub snapshot_file: String,
    pub harvested_at: DateTime<Utc>,
}

/// Runs the full extraction for one academic-year catalog: clean the raw
/// text, pull names, mine a secondary catalog for degree lines, fall back to
/// the online directory for the rest, then assemble and snapshot the table.
pub struct HarvestPipeline {
    config: Config,
    lookup: DirectoryLookup,
    snapshot_dir: PathBuf,
}

impl HarvestPipeline {
    pub fn new(config: Config, lookup: DirectoryLookup, snapshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            lookup,
            snapshot_dir: snapshot_dir.into(),
        }
    }

    #[instrument(skip(self, source), fields(year = %source.label))]
    pub async fn harvest_year(&self, source: &CatalogSource) -> Result<HarvestResult> {
        info!("🚀 Starting harvest for {}", source.label);
        println!("🚀 Harvesting {}", source.label);

        let raw = read_document(&source.path)?;
        let flat = normalize::normalize(&raw, &source.anchor, &self.config.cleaning);
        if flat.is_empty() {
            warn!(
                "flat file for {} is empty; check the anchor keyword '{}'",
                source.label, source.anchor
            );
        }
        println!("📄 {} catalog lines after cleaning", flat.len());

        let secondary: Option<FlatFile> = match &source.secondary_path {
            Some(path) => {
                let secondary_raw = read_document(path)?;
                Some(normalize::normalize(
                    &secondary_raw,
                    &source.anchor,
                    &self.config.cleaning,
                ))
            }
            None => None,
        };

        let catalog_names = names::collect_names(&flat, false);
        let display_names = names::collect_names(&flat, true);
        let departments = names::collect_departments(&flat);

        // First pass: degree lines from the secondary catalog, if any
        let mut outcomes = link::link_records(
            &catalog_names,
            secondary.as_deref(),
            &patterns::ACADEMIC_RECORD,
        );
        let linked_from_catalog = outcomes.iter().filter(|o| !o.is_missing()).count();
        println!("🔗 {} records linked from the secondary catalog", linked_from_catalog);

        // Second pass: one directory lookup per name still missing. Lookups
        // are sequential and at-most-once; a failure only marks its own row.
        let mut diagnostics = Vec::new();
        for (i, line) in flat.iter().enumerate() {
            if !outcomes[i].is_missing() {
                continue;
            }
            let Some(name) = names::parse_name(line) else {
                diagnostics.push(format!("line {}: no name could be parsed", i));
                continue;
            };

            outcomes[i] = self.lookup.lookup(&name).await;
            match &outcomes[i] {
                RecordOutcome::Ambiguous { chosen, discarded, .. } => diagnostics.push(format!(
                    "{}: ambiguous directory match, picked {} over {}",
                    name.display(),
                    chosen,
                    discarded.join(", ")
                )),
                RecordOutcome::Failed { reason } => diagnostics.push(format!(
                    "{}: directory lookup failed ({})",
                    name.display(),
                    reason
                )),
                RecordOutcome::Missing => {
                    diagnostics.push(format!("{}: no directory record", name.display()))
                }
                RecordOutcome::Found { .. } => {}
            }
        }

        let rows = transform::transform(
            &display_names,
            &departments,
            &outcomes,
            &source.label,
            source.reference_year,
            &self.config.transform,
        );

        let snapshot_file = self.persist_snapshot(&rows, &source.label)?;
        info!("💾 Saved snapshot to {}", snapshot_file);
        println!("💾 Saved snapshot to {}", snapshot_file);

        let result = HarvestResult {
            academic_year: source.label.clone(),
            total_names: rows.len(),
            linked_from_catalog,
            resolved_from_directory: count(&outcomes, |o| {
                matches!(o, RecordOutcome::Found { source: RecordSource::Directory, .. })
            }),
            ambiguous: count(&outcomes, |o| matches!(o, RecordOutcome::Ambiguous { .. })),
            missing: count(&outcomes, |o| o.is_missing()),
            failed: count(&outcomes, |o| matches!(o, RecordOutcome::Failed { .. })),
            diagnostics,
            snapshot_file,
            harvested_at: Utc::now(),
        };

        info!(
            "✅ {}: {} names, {} linked, {} via directory, {} ambiguous, {} missing, {} failed",
            result.academic_year,
            result.total_names,
            result.linked_from_catalog,
            result.resolved_from_directory,
            result.ambiguous,
            result.missing,
            result.failed
        );
        Ok(result)
    }

    /// Per-year snapshots are keyed by academic-year label so repeated runs
    /// reuse them instead of hammering the directory again.
    fn persist_snapshot(&self, rows: &[FacultyTableRow], label: &str) -> Result<String> {
        fs::create_dir_all(&self.snapshot_dir)?;

        let filepath = self.snapshot_dir.join(format!("{label}.json"));
        let json_content = serde_json::to_string_pretty(rows)?;
        fs::write(&filepath, json_content)?;

        Ok(filepath.to_string_lossy().to_string())
    }
}

fn count(outcomes: &[RecordOutcome], predicate: impl Fn(&RecordOutcome) -> bool) -> usize {
    outcomes.iter().filter(|o| predicate(o)).count()
}

fn read_document(path: impl AsRef<Path>) -> Result<RawDocument> {
    let content = fs::read_to_string(path)?;
    Ok(content.lines().map(|line| line.to_string()).collect())
}
