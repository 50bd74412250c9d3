//! Working volume registry: the `(volume name, volume set)` pairs produced by
//! the latest provisioning run.
//!
//! The file holds one `name,volumeset` line per volume with no header. Each
//! write replaces the whole file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fli_domain::{ensure_record_field, WorkingVolumeRecord};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("[FLI301] no working volume registry at {location}")]
    Missing { location: String },
    #[error("[FLI302] failed to read working volume registry {location}")]
    Read {
        location: String,
        #[source]
        source: io::Error,
    },
    #[error("[FLI303] failed to write working volume registry {location}")]
    Write {
        location: String,
        #[source]
        source: io::Error,
    },
    #[error("[FLI304] {location} line {line}: expected `<volume>,<volumeset>`, found {content:?}")]
    Malformed {
        location: String,
        line: usize,
        content: String,
    },
    #[error("[FLI305] cannot record {field} {value:?}: contains reserved character {found:?}")]
    ReservedCharacter {
        field: &'static str,
        value: String,
        found: char,
    },
}

impl RegistryError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "FLI301",
            Self::Read { .. } => "FLI302",
            Self::Write { .. } => "FLI303",
            Self::Malformed { .. } => "FLI304",
            Self::ReservedCharacter { .. } => "FLI305",
        }
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "registry_missing",
            Self::Read { .. } => "registry_unreadable",
            Self::Write { .. } => "registry_write_failed",
            Self::Malformed { .. } => "registry_malformed",
            Self::ReservedCharacter { .. } => "registry_reserved_character",
        }
    }

    /// A registry that was never written means nothing has been provisioned
    /// yet, which the operator fixes by provisioning.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

pub trait VolumeRegistry {
    /// Human readable location for diagnostics.
    fn location(&self) -> String;
    /// Replaces the registry contents with `records`.
    fn write(&self, records: &[WorkingVolumeRecord]) -> Result<(), RegistryError>;
    /// Reads every record in written order. A registry that was never written
    /// is an error, distinct from one holding zero records.
    fn read_all(&self) -> Result<Vec<WorkingVolumeRecord>, RegistryError>;
}

/// Renders records as registry text, trimming each field.
pub fn render_records(records: &[WorkingVolumeRecord]) -> Result<String, RegistryError> {
    let mut contents = String::new();
    for record in records {
        let volume_name = checked_field("volume name", &record.volume_name)?;
        let volume_set = checked_field("volume set", &record.volume_set)?;
        contents.push_str(volume_name);
        contents.push(',');
        contents.push_str(volume_set);
        contents.push('\n');
    }
    Ok(contents)
}

pub(super) fn checked_field<'v>(field: &'static str, value: &'v str) -> Result<&'v str, RegistryError> {
    let trimmed = value.trim();
    ensure_record_field(trimmed).map_err(|found| RegistryError::ReservedCharacter {
        field,
        value: value.to_string(),
        found,
    })?;
    Ok(trimmed)
}

/// Parses registry text; blank lines are skipped.
pub fn parse_records(location: &str, contents: &str) -> Result<Vec<WorkingVolumeRecord>, RegistryError> {
    let mut records = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let malformed = || RegistryError::Malformed {
            location: location.to_string(),
            line: index + 1,
            content: line.to_string(),
        };
        let (volume_name, volume_set) = line.split_once(',').ok_or_else(malformed)?;
        let (volume_name, volume_set) = (volume_name.trim(), volume_set.trim());
        if volume_name.is_empty() || volume_set.is_empty() || volume_set.contains(',') {
            return Err(malformed());
        }
        records.push(WorkingVolumeRecord::new(volume_name, volume_set));
    }
    Ok(records)
}

/// Registry persisted as a plain text file.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_err(&self, source: io::Error) -> RegistryError {
        RegistryError::Write {
            location: self.location(),
            source,
        }
    }
}

impl VolumeRegistry for FileRegistry {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn write(&self, records: &[WorkingVolumeRecord]) -> Result<(), RegistryError> {
        let contents = render_records(records)?;
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        // Readers see either the previous file or the complete new one.
        let mut tmp = NamedTempFile::new_in(&parent).map_err(|err| self.write_err(err))?;
        tmp.write_all(contents.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| self.write_err(err))?;
        tmp.persist(&self.path)
            .map_err(|err| self.write_err(err.error))?;
        info!(
            registry = %self.path.display(),
            records = records.len(),
            "saved working volumes"
        );
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<WorkingVolumeRecord>, RegistryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(RegistryError::Missing {
                    location: self.location(),
                })
            }
            Err(source) => {
                return Err(RegistryError::Read {
                    location: self.location(),
                    source,
                })
            }
        };
        let records = parse_records(&self.location(), &contents)?;
        debug!(registry = %self.path.display(), records = records.len(), "read working volumes");
        Ok(records)
    }
}

/// In-process registry, mainly for tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    contents: Mutex<Option<String>>,
}

impl MemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw registry text, if anything was written.
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl VolumeRegistry for MemoryRegistry {
    fn location(&self) -> String {
        "<memory>".to_string()
    }

    fn write(&self, records: &[WorkingVolumeRecord]) -> Result<(), RegistryError> {
        let rendered = render_records(records)?;
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(rendered);
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<WorkingVolumeRecord>, RegistryError> {
        match self.contents() {
            Some(contents) => parse_records(&self.location(), &contents),
            None => Err(RegistryError::Missing {
                location: self.location(),
            }),
        }
    }
}
