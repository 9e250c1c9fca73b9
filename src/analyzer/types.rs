//! Types for the analyzer module

use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

use crate::ir::MessageIndex;
use crate::types::ByteSpan;

/// Kind of problem found in a translation file.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, salsa::Update,
)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    Malformed,
    EmptySource,
    EmptyContextName,
    DuplicateMessage,
    MissingTranslation,
    Unfinished,
    PluralForms,
    UnknownLanguage,
    PlaceholderMismatch,
    AcceleratorMismatch,
    PunctuationMismatch,
    Obsolete,
    MissingInLocale,
}

impl IssueKind {
    pub const ALL: [Self; 13] = [
        Self::Malformed,
        Self::EmptySource,
        Self::EmptyContextName,
        Self::DuplicateMessage,
        Self::MissingTranslation,
        Self::Unfinished,
        Self::PluralForms,
        Self::UnknownLanguage,
        Self::PlaceholderMismatch,
        Self::AcceleratorMismatch,
        Self::PunctuationMismatch,
        Self::Obsolete,
        Self::MissingInLocale,
    ];

    /// Diagnostic code, also the key in the `diagnostics` settings.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::EmptySource => "empty-source",
            Self::EmptyContextName => "empty-context-name",
            Self::DuplicateMessage => "duplicate-message",
            Self::MissingTranslation => "missing-translation",
            Self::Unfinished => "unfinished",
            Self::PluralForms => "plural-forms",
            Self::UnknownLanguage => "unknown-language",
            Self::PlaceholderMismatch => "placeholder-mismatch",
            Self::AcceleratorMismatch => "accelerator-mismatch",
            Self::PunctuationMismatch => "punctuation-mismatch",
            Self::Obsolete => "obsolete",
            Self::MissingInLocale => "missing-in-locale",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::Malformed | Self::EmptySource | Self::EmptyContextName | Self::PluralForms => {
                Severity::Error
            }
            Self::DuplicateMessage | Self::MissingTranslation | Self::PlaceholderMismatch => {
                Severity::Warning
            }
            Self::Unfinished | Self::UnknownLanguage | Self::MissingInLocale => {
                Severity::Information
            }
            Self::AcceleratorMismatch | Self::PunctuationMismatch | Self::Obsolete => {
                Severity::Hint
            }
        }
    }

    /// Entries editors should render as unused code.
    #[must_use]
    pub const fn is_unnecessary(self) -> bool {
        matches!(self, Self::Obsolete)
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, salsa::Update,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

/// A problem found in a translation file.
#[derive(Debug, Clone, PartialEq, Eq, salsa::Update)]
pub struct Issue {
    pub kind: IssueKind,
    pub span: ByteSpan,
    pub message: String,
    /// Message the issue is about, if any.
    pub message_index: Option<MessageIndex>,
    /// Locales lacking the message (`missing-in-locale` only).
    pub languages: Vec<String>,
}

impl Issue {
    #[must_use]
    pub fn new(kind: IssueKind, span: ByteSpan, message: impl Into<String>) -> Self {
        Self { kind, span, message: message.into(), message_index: None, languages: Vec::new() }
    }

    #[must_use]
    pub const fn for_message(mut self, index: MessageIndex) -> Self {
        self.message_index = Some(index);
        self
    }
}

/// Inputs of the validator that come from settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, salsa::Update)]
pub struct AnalyzerOptions {
    /// Numerus form counts overriding the built-in table.
    pub plural_forms: BTreeMap<String, usize>,
    /// Only these locales are checked for `missing-in-locale`.
    pub required_languages: Option<Vec<String>>,
    /// These locales are never reported by `missing-in-locale`.
    pub optional_languages: Option<Vec<String>>,
}

impl AnalyzerOptions {
    /// Expected numerus form count for a locale.
    #[must_use]
    pub fn expected_form_count(&self, language: &str) -> Option<usize> {
        crate::ir::plural::expected_form_count(language, &self.plural_forms)
    }

    /// Whether a missing message in `language` should be reported.
    #[must_use]
    pub fn is_language_required(&self, language: &str) -> bool {
        if let Some(required) = &self.required_languages {
            return required.iter().any(|l| l == language);
        }
        if let Some(optional) = &self.optional_languages {
            return !optional.iter().any(|l| l == language);
        }
        true
    }
}

/// Progress of one translation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStats {
    /// Every message, including obsolete ones.
    pub total: usize,
    /// Non-empty translations without the unfinished mark.
    pub finished: usize,
    /// Non-empty translations marked unfinished.
    pub unfinished: usize,
    /// Active messages without any translated text.
    pub missing: usize,
    /// Vanished or obsolete entries.
    pub obsolete: usize,
    /// Messages with plural forms.
    pub numerus: usize,
}
