//! Stateful application manifest (`manifest.yml`).
//!
//! ```yaml
//! docker_app: docker-compose.yml
//! flocker_hub:
//!   endpoint: https://hub.example.com
//!   tokenfile: /home/me/token.txt
//! volumes:
//!   - name: redis-data
//!     volumeset: app-data
//!     snapshot: snap-1
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::volume::{ensure_record_field, VolumeSpec};

pub const DEFAULT_MANIFEST: &str = "manifest.yml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(
        default,
        rename = "tokenfile",
        alias = "token_file",
        skip_serializing_if = "Option::is_none"
    )]
    pub token_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_app: Option<String>,
    #[serde(default)]
    pub flocker_hub: HubSettings,
    #[serde(default)]
    pub volumes: Vec<VolumeSpec>,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("[FLI110] failed to read manifest {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("[FLI111] manifest {path} is not valid YAML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("[FLI112] manifest declares no volumes")]
    NoVolumes,
    #[error("[FLI112] volume #{index} is missing `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("[FLI112] volume name '{0}' is declared more than once")]
    DuplicateName(String),
    #[error("[FLI112] `{field}` value {value:?} contains the reserved character {found:?}")]
    ReservedCharacter {
        field: &'static str,
        value: String,
        found: char,
    },
}

impl ManifestError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "FLI110",
            Self::Parse { .. } => "FLI111",
            Self::NoVolumes
            | Self::MissingField { .. }
            | Self::DuplicateName(_)
            | Self::ReservedCharacter { .. } => "FLI112",
        }
    }
}

impl Manifest {
    /// Reads and validates the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::parse(&contents, path)?;
        debug!(
            manifest = %path.display(),
            volumes = manifest.volumes.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Parses and validates manifest text that did not come from a file.
    pub fn from_yaml(contents: &str) -> Result<Self, ManifestError> {
        Self::parse(contents, Path::new("<inline>"))
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ManifestError> {
        let mut manifest: Manifest =
            serde_yaml::from_str(contents).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.normalize();
        manifest.validate()?;
        Ok(manifest)
    }

    fn normalize(&mut self) {
        for volume in &mut self.volumes {
            volume.name = volume.name.trim().to_string();
            volume.volume_set = volume.volume_set.trim().to_string();
            volume.branch = volume.branch().map(ToString::to_string);
            volume.snapshot = volume.snapshot().map(ToString::to_string);
        }
        self.flocker_hub.endpoint = blank_to_none(self.flocker_hub.endpoint.take());
        self.flocker_hub.token_file = blank_to_none(self.flocker_hub.token_file.take());
        self.docker_app = blank_to_none(self.docker_app.take());
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.volumes.is_empty() {
            return Err(ManifestError::NoVolumes);
        }
        let mut seen = HashSet::new();
        for (index, volume) in self.volumes.iter().enumerate() {
            if volume.name.is_empty() {
                return Err(ManifestError::MissingField {
                    index,
                    field: "name",
                });
            }
            if volume.volume_set.is_empty() {
                return Err(ManifestError::MissingField {
                    index,
                    field: "volumeset",
                });
            }
            check_field("volumeset", &volume.volume_set)?;
            check_field("name", &volume.name)?;
            if !seen.insert(volume.name.as_str()) {
                return Err(ManifestError::DuplicateName(volume.name.clone()));
            }
        }
        Ok(())
    }
}

fn check_field(field: &'static str, value: &str) -> Result<(), ManifestError> {
    ensure_record_field(value).map_err(|found| ManifestError::ReservedCharacter {
        field,
        value: value.to_string(),
        found,
    })
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r"
docker_app: docker-compose-app1.yml
flocker_hub:
  endpoint: https://hub.example.com
  tokenfile: /root/token.txt
volumes:
  - name: redis-data
    snapshot: example-snapshot-1
    volumeset: docker-app-example
  - name: artifacts
    branch: example-branch
    volumeset: docker-app-example
";

    #[test]
    fn parses_sample_manifest_in_order() {
        let manifest = Manifest::from_yaml(SAMPLE).unwrap();
        assert_eq!(manifest.docker_app.as_deref(), Some("docker-compose-app1.yml"));
        assert_eq!(
            manifest.flocker_hub.endpoint.as_deref(),
            Some("https://hub.example.com")
        );
        assert_eq!(
            manifest.flocker_hub.token_file.as_deref(),
            Some("/root/token.txt")
        );
        assert_eq!(
            manifest.volumes,
            vec![
                VolumeSpec::new("redis-data", "docker-app-example")
                    .with_snapshot("example-snapshot-1"),
                VolumeSpec::new("artifacts", "docker-app-example").with_branch("example-branch"),
            ]
        );
    }

    #[test]
    fn blank_references_and_hub_settings_are_dropped() {
        let manifest = Manifest::from_yaml(
            r#"
flocker_hub:
  endpoint: ""
volumes:
  - name: db
    volumeset: app-data
    branch: ""
    snapshot: snap-1
"#,
        )
        .unwrap();
        assert_eq!(manifest.flocker_hub, HubSettings::default());
        assert_eq!(manifest.volumes[0].branch, None);
        assert_eq!(manifest.volumes[0].snapshot.as_deref(), Some("snap-1"));
    }

    #[test]
    fn rejects_empty_volume_list() {
        let err = Manifest::from_yaml("docker_app: compose.yml\n").unwrap_err();
        assert!(matches!(err, ManifestError::NoVolumes));
        assert_eq!(err.code(), "FLI112");
    }

    #[test]
    fn rejects_missing_volume_set() {
        let err = Manifest::from_yaml("volumes:\n  - name: db\n    volumeset: ''\n").unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingField {
                index: 0,
                field: "volumeset"
            }
        ));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Manifest::from_yaml(
            "volumes:\n  - {name: db, volumeset: a, snapshot: s}\n  - {name: db, volumeset: b, snapshot: s}\n",
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateName(ref name) if name == "db"));
    }

    #[test]
    fn rejects_commas_in_volume_set() {
        let err = Manifest::from_yaml("volumes:\n  - {name: db, volumeset: 'a,b', snapshot: s}\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::ReservedCharacter { found: ',', .. }
        ));
    }

    #[test]
    fn invalid_yaml_reports_parse_error() {
        let err = Manifest::from_yaml("volumes: [").unwrap_err();
        assert_eq!(err.code(), "FLI111");
    }

    #[test]
    fn load_reports_missing_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join(DEFAULT_MANIFEST);
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));

        fs::write(&path, SAMPLE).unwrap();
        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.volumes.len(), 2);
    }
}
