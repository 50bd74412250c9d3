pub mod commands {
    pub const PROVISION: &str = "FLI400";
    pub const SNAPSHOT: &str = "FLI500";
    pub const CONFIG: &str = "FLI200";
    pub const INFO: &str = "FLI210";
    pub const VOLUMES: &str = "FLI300";
    pub const GENERIC: &str = "FLI000";
}

pub mod tool {
    pub const MISSING_BINARY: &str = "FLI001";
}
