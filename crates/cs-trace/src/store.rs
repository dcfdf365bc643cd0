//! Run storage API.

use crate::types::{TraceManifest, TraceRecord};
use crate::{TraceError, TraceResult};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Directory-per-run store: `<root>/<run_id>/manifest.json` plus
/// `series.jsonl` with one record per line.
#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> TraceResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    pub fn save_run(&self, manifest: &TraceManifest, records: &[TraceRecord]) -> TraceResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let manifest_path = run_dir.join("manifest.json");
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(manifest_path, manifest_json)?;

        let series_path = run_dir.join("series.jsonl");
        let mut series_content = String::new();
        for record in records {
            let line = serde_json::to_string(record)?;
            series_content.push_str(&line);
            series_content.push('\n');
        }
        fs::write(series_path, series_content)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> TraceResult<TraceManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(TraceError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn load_series(&self, run_id: &str) -> TraceResult<Vec<TraceRecord>> {
        let series_path = self.run_dir(run_id).join("series.jsonl");

        if !series_path.exists() {
            return Err(TraceError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(series_path)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                let record: TraceRecord = serde_json::from_str(line)?;
                records.push(record);
            }
        }

        Ok(records)
    }

    pub fn list_runs(&self, scenario_id: &str) -> TraceResult<Vec<TraceManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id)
                    && manifest.scenario_id == scenario_id
                {
                    runs.push(manifest);
                }
            }
        }

        Ok(runs)
    }

    /// Write a stored series as CSV: a `time` column plus one column per
    /// traced port.
    pub fn export_csv(&self, run_id: &str, out: &mut dyn Write) -> TraceResult<()> {
        let manifest = self.load_manifest(run_id)?;
        let records = self.load_series(run_id)?;

        write!(out, "time")?;
        for column in &manifest.columns {
            write!(out, ",{}", column.label)?;
        }
        writeln!(out)?;

        for record in &records {
            write!(out, "{}", record.time)?;
            for value in &record.values {
                write!(out, ",{value}")?;
            }
            writeln!(out)?;
        }

        Ok(())
    }
}
