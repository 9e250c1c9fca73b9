//! Settings read from `.linguist-ls.json` or pushed by the editor.

use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::analyzer::{
    AnalyzerOptions,
    IssueKind,
    Severity,
};

/// Largest numerus form count any locale uses.
const MAX_PLURAL_FORMS: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "translationFiles.includePatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The file is not valid JSON with comments.
    #[error("Failed to parse configuration: {0}")]
    SyntaxError(String),
}

/// Numbered list of validation problems.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings wrapped in a `linguist` section, as some editors send them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    pub linguist: LinguistSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinguistSettings {
    pub translation_files: TranslationFilesConfig,

    /// Paths never indexed, whatever `translationFiles` says.
    pub exclude_patterns: Vec<String>,

    pub indexing: IndexingConfig,

    pub diagnostics: DiagnosticsConfig,

    /// Languages checked for `missing-in-locale`.
    ///
    /// - `None`: every detected language (default)
    /// - `Some([...])`: only the listed languages
    ///
    /// Mutually exclusive with `optional_languages`.
    pub required_languages: Option<Vec<String>>,

    /// Languages never reported by `missing-in-locale`.
    ///
    /// Mutually exclusive with `required_languages`.
    pub optional_languages: Option<Vec<String>>,

    /// Hover ordering after the current language.
    pub primary_languages: Option<Vec<String>>,

    /// Numerus form count per language, overriding the built-in rules.
    pub plural_forms: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexingConfig {
    /// Files read concurrently while indexing.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self { include_patterns: vec!["**/*.ts".to_string()], exclude_patterns: Vec::new() }
    }
}

/// Per-rule settings: `{ "enabled": false }` or `{ "severity": "hint" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleConfig {
    pub enabled: bool,
    /// Overrides the rule's default severity.
    pub severity: Option<Severity>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self { enabled: true, severity: None }
    }
}

/// `diagnostics` section keyed by rule code (e.g. `"unfinished"`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DiagnosticsConfig {
    /// Rules absent from the map use [`RuleConfig::default`].
    pub rules: BTreeMap<IssueKind, RuleConfig>,
}

impl DiagnosticsConfig {
    #[must_use]
    pub fn is_enabled(&self, kind: IssueKind) -> bool {
        self.rules.get(&kind).is_none_or(|rule| rule.enabled)
    }

    /// Configured severity, falling back to the rule's default.
    #[must_use]
    pub fn severity(&self, kind: IssueKind) -> Severity {
        self.rules
            .get(&kind)
            .and_then(|rule| rule.severity)
            .unwrap_or_else(|| kind.default_severity())
    }
}

impl LinguistSettings {
    /// # Errors
    /// - Invalid glob pattern
    /// - No translation file pattern
    /// - Zero indexing threads
    /// - Both `requiredLanguages` and `optionalLanguages`
    /// - Plural form count out of range
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.translation_files.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.includePatterns",
                "At least one pattern is required. Example: [\"**/*.ts\"]",
            ));
        }

        let pattern_lists = [
            ("translationFiles.includePatterns", &self.translation_files.include_patterns),
            ("translationFiles.excludePatterns", &self.translation_files.exclude_patterns),
            ("excludePatterns", &self.exclude_patterns),
        ];
        for (field, patterns) in pattern_lists {
            for (index, pattern) in patterns.iter().enumerate() {
                if let Err(e) = globset::Glob::new(pattern) {
                    errors.push(ValidationError::new(
                        format!("{field}[{index}]"),
                        format!("Invalid glob pattern '{pattern}': {e}"),
                    ));
                }
            }
        }

        if self.indexing.num_threads == Some(0) {
            errors.push(ValidationError::new(
                "indexing.numThreads",
                "Must be at least 1, or removed to use 80% of the CPU cores",
            ));
        }

        if self.required_languages.is_some() && self.optional_languages.is_some() {
            errors.push(ValidationError::new(
                "requiredLanguages/optionalLanguages",
                "Cannot specify both 'requiredLanguages' and 'optionalLanguages'. Please use only one",
            ));
        }

        for (language, count) in &self.plural_forms {
            if language.trim().is_empty() {
                errors.push(ValidationError::new(
                    "pluralForms",
                    "Language tags cannot be empty",
                ));
            }
            if !(1..=MAX_PLURAL_FORMS).contains(count) {
                errors.push(ValidationError::new(
                    format!("pluralForms.{language}"),
                    format!("Form count must be between 1 and {MAX_PLURAL_FORMS}, got {count}"),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validator inputs derived from these settings.
    #[must_use]
    pub fn analyzer_options(&self) -> AnalyzerOptions {
        AnalyzerOptions {
            plural_forms: self.plural_forms.clone(),
            required_languages: self.required_languages.clone(),
            optional_languages: self.optional_languages.clone(),
        }
    }
}

impl Default for LinguistSettings {
    fn default() -> Self {
        Self {
            translation_files: TranslationFilesConfig::default(),
            exclude_patterns: vec!["node_modules/**".to_string(), "target/**".to_string()],
            indexing: IndexingConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            required_languages: None,
            optional_languages: None,
            primary_languages: None,
            plural_forms: BTreeMap::new(),
        }
    }
}
