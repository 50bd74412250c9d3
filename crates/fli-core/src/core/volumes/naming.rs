use uuid::Uuid;

pub const CLONE_PREFIX: &str = "fli";
pub const CREATED_BY: &str = "fli-docker";

/// Source of the unique suffixes used for clone and snapshot names.
pub trait NameSource {
    fn unique_id(&self) -> String;

    /// `fli-<id>`, unique for every clone.
    fn volume_name(&self) -> String {
        format!("{CLONE_PREFIX}-{}", self.unique_id())
    }

    /// `<volume>-<id>`, unique for every capture.
    fn snapshot_name(&self, volume_name: &str) -> String {
        format!("{volume_name}-{}", self.unique_id())
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidNames;

impl NameSource for UuidNames {
    fn unique_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Branch a captured snapshot is recorded on.
#[must_use]
pub fn lineage_branch(volume_name: &str) -> String {
    format!("branch-{volume_name}")
}

/// Provenance attributes attached to every clone.
#[must_use]
pub fn provenance_attributes(reference: &str) -> Vec<(String, String)> {
    vec![
        ("created_by".to_string(), CREATED_BY.to_string()),
        ("from_snap".to_string(), reference.to_string()),
    ]
}
