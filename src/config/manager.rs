//! Holds the active settings of the server.

use std::path::PathBuf;

use super::{
    ConfigError,
    LinguistSettings,
    ServerSettings,
    loader,
};

/// Owns the current settings and the workspace they were loaded from.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Validated settings in effect.
    current_settings: LinguistSettings,

    /// Root of the workspace, once known.
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: LinguistSettings::default(), workspace_root: None }
    }

    /// Loads `.linguist-ls.json` from the workspace root, or the defaults
    /// when there is no file (or no workspace).
    ///
    /// # Errors
    /// - I/O error reading the file
    /// - JSON syntax or shape error
    /// - Validation error
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for workspace: {:?}", workspace_root);

        let settings = if let Some(root) = &workspace_root {
            loader::load_from_workspace(root)?.map_or_else(LinguistSettings::default, |ws| {
                tracing::debug!("Loaded workspace settings: {:?}", ws);
                ws
            })
        } else {
            LinguistSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.workspace_root = workspace_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// Replaces the settings after validating them.
    ///
    /// # Errors
    /// Returns the validation errors; the previous settings stay in effect.
    pub fn update_settings(&mut self, new_settings: LinguistSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    /// Applies settings pushed by `workspace/didChangeConfiguration`.
    ///
    /// Accepts both `{"linguist": {...}}` and the bare settings object.
    ///
    /// # Errors
    /// - The value matches neither shape
    /// - Validation error
    pub fn update_from_value(&mut self, value: serde_json::Value) -> Result<(), ConfigError> {
        let settings = if value.get("linguist").is_some() {
            serde_json::from_value::<ServerSettings>(value)?.linguist
        } else {
            serde_json::from_value::<LinguistSettings>(value)?
        };
        self.update_settings(settings)
    }

    #[must_use]
    pub const fn get_settings(&self) -> &LinguistSettings {
        &self.current_settings
    }

    #[must_use]
    pub const fn workspace_root(&self) -> Option<&PathBuf> {
        self.workspace_root.as_ref()
    }
}
