/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Errors from row animator commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("row {requested} is out of range (scene has {rows} rows)")]
    RowOutOfRange { requested: isize, rows: usize },
    #[error("scene has no rows")]
    NoRows,
}
