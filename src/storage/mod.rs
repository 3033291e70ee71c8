// src/storage/mod.rs
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::extractors::result::{ExtractionResult, ProfileRecord};
use crate::extractors::text::DocumentFormat;
use crate::utils::error::StorageError;

const PROFILE_SUFFIX: &str = "_profile.json";
const META_SUFFIX: &str = "_meta.json";

/// Summary of one extraction run, stored next to the profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Storage directory name; differs from the file stem when two inputs share a stem.
    #[serde(default)]
    pub document_key: String,
    pub source_file: String,
    pub format: String,
    pub experience_years: String,
    pub education: String,
    pub skills_count: usize,
    pub job_titles: Vec<String>,
    pub extraction_timestamp: String, // RFC 3339, UTC
}

impl ExtractionMetadata {
    pub fn new(
        document_key: &str,
        source: &Path,
        format: DocumentFormat,
        result: &ExtractionResult,
        extracted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            document_key: document_key.to_string(),
            source_file: source.display().to_string(),
            format: format.to_string(),
            experience_years: result.experience.to_string(),
            education: result.education.to_string(),
            skills_count: result.skills.len(),
            job_titles: result.job_titles.clone(),
            extraction_timestamp: extracted_at.to_rfc3339(),
        }
    }

    pub fn extracted_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.extraction_timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory name used for a source document: its file stem, or "document".
    pub fn document_key(source: &Path) -> String {
        source
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("document")
            .to_string()
    }

    /// `document_key`, suffixed with `_2`, `_3`, ... when an earlier input of the same run
    /// already claimed that key.
    pub fn claim_document_key(source: &Path, claimed: &mut HashSet<String>) -> String {
        let base = Self::document_key(source);
        let mut key = base.clone();
        let mut n = 2;
        while !claimed.insert(key.clone()) {
            key = format!("{}_{}", base, n);
            n += 1;
        }
        if key != base {
            tracing::warn!(
                "Key '{}' already used in this run; storing {} as '{}'",
                base,
                source.display(),
                key
            );
        }
        key
    }

    fn target_dir(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Layout: /base_dir/<key>/
        let target_dir = self.base_dir.join(key);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        if path.exists() {
            tracing::warn!("Overwriting existing {}", path.display());
        }
        fs::write(path, json).map_err(StorageError::IoError)
    }

    /// Saves the flat profile record as `<key>/<key>_profile.json`
    pub fn save_profile(&self, key: &str, profile: &ProfileRecord) -> Result<PathBuf, StorageError> {
        let file_path = self.target_dir(key)?.join(format!("{}{}", key, PROFILE_SUFFIX));
        Self::write_json(&file_path, profile)?;
        tracing::info!("Saved profile to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves extraction metadata as `<key>/<key>_meta.json`
    pub fn save_metadata(&self, key: &str, metadata: &ExtractionMetadata) -> Result<PathBuf, StorageError> {
        let file_path = self.target_dir(key)?.join(format!("{}{}", key, META_SUFFIX));
        Self::write_json(&file_path, metadata)?;
        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    pub fn load_profile(&self, key: &str) -> Result<ProfileRecord, StorageError> {
        let file_path = self.base_dir.join(key).join(format!("{}{}", key, PROFILE_SUFFIX));
        let content = fs::read_to_string(&file_path).map_err(StorageError::IoError)?;
        serde_json::from_str(&content).map_err(|e| StorageError::SerializationError(e.to_string()))
    }

    /// All stored metadata, newest first. Unreadable entries are skipped.
    pub fn list_history(&self) -> Result<Vec<ExtractionMetadata>, StorageError> {
        let mut entries = Vec::new();

        for dir in fs::read_dir(&self.base_dir).map_err(StorageError::IoError)? {
            let dir = dir.map_err(StorageError::IoError)?.path();
            if !dir.is_dir() {
                continue;
            }
            for file in fs::read_dir(&dir).map_err(StorageError::IoError)? {
                let path = file.map_err(StorageError::IoError)?.path();
                let is_meta = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(META_SUFFIX));
                if !is_meta {
                    continue;
                }

                let parsed = fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|s| serde_json::from_str::<ExtractionMetadata>(&s).map_err(|e| e.to_string()));
                match parsed {
                    Ok(meta) => entries.push(meta),
                    Err(e) => tracing::warn!("Skipping unreadable metadata {}: {}", path.display(), e),
                }
            }
        }

        entries.sort_by(|a, b| b.extracted_at().cmp(&a.extracted_at()));
        Ok(entries)
    }
}
