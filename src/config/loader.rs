//! Reads the settings file of a workspace.

use std::path::Path;

use jsonc_parser::ParseOptions;

use super::{
    ConfigError,
    LinguistSettings,
};

/// Name of the settings file in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".linguist-ls.json";

/// Loads `.linguist-ls.json` from the workspace root.
///
/// The file may contain comments and trailing commas.
///
/// # Returns
/// - `Ok(Some(settings))`: the file exists and parsed
/// - `Ok(None)`: no settings file
/// - `Err(ConfigError)`: read or parse failure
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<LinguistSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    tracing::debug!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(&config_path)?;
    parse_settings(&content).map(Some)
}

/// Parses settings text. An empty document yields the defaults.
pub(super) fn parse_settings(content: &str) -> Result<LinguistSettings, ConfigError> {
    let value = jsonc_parser::parse_to_serde_value(content, &ParseOptions::default())
        .map_err(|e| ConfigError::SyntaxError(e.to_string()))?;

    match value {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(LinguistSettings::default()),
    }
}
