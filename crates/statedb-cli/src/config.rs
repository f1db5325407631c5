use std::path::PathBuf;

/// Process-wide defaults, threaded explicitly through every command's
/// `exec(config, args)` rather than read from globals.
#[derive(Debug, Clone)]
pub struct Config {
    pub default_db_path: PathBuf,
    pub default_schema_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_db_path: PathBuf::from("database.db"),
            default_schema_path: PathBuf::from("schema.json"),
        }
    }
}

impl Config {
    /// Load configuration for this invocation. There is no config file --
    /// the only per-invocation knobs are the default database and schema
    /// paths, overridable per-command via positional arguments.
    pub fn load() -> Self {
        Self::default()
    }
}
