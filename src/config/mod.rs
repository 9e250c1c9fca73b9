//! Server settings: the workspace settings file and editor-pushed values.
/// Settings file loader
mod loader;
/// Active settings holder
mod manager;
/// Translation file pattern matcher
mod matcher;
/// Settings types and validation
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use matcher::{
    FileMatcher,
    MatcherError,
};
pub use types::{
    ConfigError,
    DiagnosticsConfig,
    IndexingConfig,
    LinguistSettings,
    RuleConfig,
    ServerSettings,
    TranslationFilesConfig,
    ValidationError,
};
