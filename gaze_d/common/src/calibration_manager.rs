use crate::CalibrationData;
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const DEFAULT_STORAGE_KEY: &str = "gaze-calibration";

/// Owns the live calibration record and its JSON file on disk.
pub struct CalibrationManager {
    pub data: CalibrationData,
    storage_path: PathBuf,
}

impl CalibrationManager {
    pub fn new(storage_dir: PathBuf, storage_key: &str) -> Self {
        Self {
            data: CalibrationData::default(),
            storage_path: storage_dir.join(format!("{}.json", storage_key)),
        }
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create calibration dir: {:?}", parent))?;
            }
        }
        let record = self.data.sanitized();
        let file = File::create(&self.storage_path)
            .with_context(|| format!("Failed to write gaze calibration {:?}", self.storage_path))?;
        serde_json::to_writer_pretty(file, &record)
            .context("Failed to encode gaze calibration")?;
        info!(
            "Gaze calibration stored in {:?} (eyesHeight {})",
            self.storage_path, record.eyes_height
        );
        Ok(())
    }

    /// Loads the stored record, filling absent keys from the defaults. A
    /// missing file leaves the defaults in place.
    pub fn load(&mut self) -> Result<()> {
        if !self.storage_path.exists() {
            info!(
                "No gaze calibration at {:?} yet, starting uncalibrated",
                self.storage_path
            );
            self.data = CalibrationData::default();
            return Ok(());
        }

        let file = File::open(&self.storage_path)
            .with_context(|| format!("Failed to read gaze calibration {:?}", self.storage_path))?;
        let stored: CalibrationData = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Malformed gaze calibration {:?}", self.storage_path))?;

        self.data = stored.sanitized();
        if self.data != stored {
            warn!(
                "Gaze calibration {:?} had out-of-range values, defaults used for those",
                self.storage_path
            );
        }
        info!(
            "Gaze calibration restored from {:?} (eyesHeight {})",
            self.storage_path, self.data.eyes_height
        );
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.data = CalibrationData::default();
        self.save()
    }
}
