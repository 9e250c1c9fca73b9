//! Typed model of a Qt Linguist translation catalog.

use std::collections::HashMap;

/// One translation file: a `TS` root element and its contexts.
#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct Catalog {
    /// Format version (`version` attribute), e.g. `2.1`.
    pub version: Option<String>,
    /// Target locale (`language` attribute), e.g. `da` or `pt_BR`.
    pub language: Option<String>,
    /// Locale of the source strings (`sourcelanguage` attribute).
    pub source_language: Option<String>,
    pub contexts: Vec<Context>,
}

/// A named group of messages for one UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct Context {
    pub name: String,
    /// Legacy context-level comment.
    pub comment: Option<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct Message {
    /// Optional text id (`id` attribute).
    pub id: Option<String>,
    /// `numerus="yes"`: the translation carries plural forms.
    pub numerus: bool,
    pub locations: Vec<Location>,
    pub source: String,
    pub old_source: Option<String>,
    /// Disambiguation comment; part of the message key.
    pub comment: Option<String>,
    pub old_comment: Option<String>,
    /// Note from the developer to the translator.
    pub extra_comment: Option<String>,
    /// Note written by the translator.
    pub translator_comment: Option<String>,
    pub translation: Translation,
    pub user_data: Option<String>,
    /// `extra-*` elements, kept verbatim in document order.
    pub extras: Vec<Extra>,
}

/// An `extra-<name>` element.
#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct Extra {
    /// Element name without the `extra-` prefix.
    pub name: String,
    pub value: String,
}

/// A `location` element pointing at the string's origin in code.
#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct Location {
    pub filename: Option<String>,
    /// Line as written, possibly relative (`+12`, `-3`).
    pub line: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, salsa::Update)]
pub enum TranslationStatus {
    /// Reviewed translation (no `type` attribute).
    #[default]
    Finished,
    /// `type="unfinished"`: carried over or unreviewed.
    Unfinished,
    /// `type="vanished"`: source string no longer exists in code.
    Vanished,
    /// `type="obsolete"`: legacy name for vanished.
    Obsolete,
}

impl TranslationStatus {
    /// Value of the `type` attribute, `None` for finished translations.
    #[must_use]
    pub const fn type_attribute(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Vanished => Some("vanished"),
            Self::Obsolete => Some("obsolete"),
        }
    }

    #[must_use]
    pub fn from_type_attribute(value: &str) -> Option<Self> {
        match value {
            "unfinished" => Some(Self::Unfinished),
            "vanished" => Some(Self::Vanished),
            "obsolete" => Some(Self::Obsolete),
            _ => None,
        }
    }

    /// Finished and unfinished messages still exist in the application.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Finished | Self::Unfinished)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct Translation {
    pub status: TranslationStatus,
    pub value: TranslationValue,
}

#[derive(Debug, Clone, PartialEq, Eq, salsa::Update)]
pub enum TranslationValue {
    Single(FormText),
    /// Numerus forms indexed by the locale's plural rule.
    Plural(Vec<FormText>),
}

impl Default for TranslationValue {
    fn default() -> Self {
        Self::Single(FormText::default())
    }
}

/// Text of one translation form.
#[derive(Debug, Clone, PartialEq, Eq, salsa::Update)]
pub enum FormText {
    Plain(String),
    /// `variants="yes"`: alternatives ordered from longest to shortest.
    LengthVariants(Vec<String>),
}

impl Default for FormText {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl FormText {
    /// The text shown by default (first length variant).
    #[must_use]
    pub fn primary(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::LengthVariants(variants) => variants.first().map_or("", String::as_str),
        }
    }

    /// Every alternative text of this form.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Plain(text) => vec![text.as_str()],
            Self::LengthVariants(variants) => variants.iter().map(String::as_str).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts().iter().all(|text| text.is_empty())
    }
}

impl Translation {
    /// All forms: one for a singular translation, the numerus forms otherwise.
    #[must_use]
    pub fn forms(&self) -> Vec<&FormText> {
        match &self.value {
            TranslationValue::Single(form) => vec![form],
            TranslationValue::Plural(forms) => forms.iter().collect(),
        }
    }

    /// True if no form carries any text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forms().iter().all(|form| form.is_empty())
    }

    #[must_use]
    pub const fn is_plural(&self) -> bool {
        matches!(self.value, TranslationValue::Plural(_))
    }
}

/// Key identifying a message across locale files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, salsa::Update)]
pub struct MessageId {
    pub context: String,
    pub source: String,
    pub comment: Option<String>,
}

impl Message {
    #[must_use]
    pub fn id_in(&self, context: &Context) -> MessageId {
        MessageId {
            context: context.name.clone(),
            source: self.source.clone(),
            comment: self.comment.clone(),
        }
    }

    /// Translation text for display: the primary text of the first form.
    #[must_use]
    pub fn display_translation(&self) -> &str {
        self.translation.forms().first().map_or("", |form| form.primary())
    }
}

/// Index of a message inside a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, salsa::Update)]
pub struct MessageIndex {
    pub context: usize,
    pub message: usize,
}

impl Catalog {
    /// Iterates `(index, context, message)` in document order.
    pub fn messages(&self) -> impl Iterator<Item = (MessageIndex, &Context, &Message)> {
        self.contexts.iter().enumerate().flat_map(|(context_index, context)| {
            context.messages.iter().enumerate().map(move |(message_index, message)| {
                (MessageIndex { context: context_index, message: message_index }, context, message)
            })
        })
    }

    /// Finds a message by its key. The first match wins when the key is duplicated.
    #[must_use]
    pub fn find_message(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
    ) -> Option<(MessageIndex, &Message)> {
        self.messages()
            .find(|(_, ctx, message)| {
                ctx.name == context
                    && message.source == source
                    && message.comment.as_deref() == comment
            })
            .map(|(index, _, message)| (index, message))
    }

    #[must_use]
    pub fn message(&self, index: MessageIndex) -> Option<&Message> {
        self.contexts.get(index.context)?.messages.get(index.message)
    }

    /// Lookup table from message key to index.
    #[must_use]
    pub fn message_ids(&self) -> HashMap<MessageId, MessageIndex> {
        let mut ids = HashMap::new();
        for (index, context, message) in self.messages() {
            ids.entry(message.id_in(context)).or_insert(index);
        }
        ids
    }

    /// Looks up the translation of a source string, falling back to the source
    /// itself when the message is missing, unfinished or empty.
    #[must_use]
    pub fn translate<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.contexts
            .iter()
            .filter(|ctx| ctx.name == context)
            .flat_map(|ctx| ctx.messages.iter())
            .find(|message| {
                message.source == source
                    && message.translation.status == TranslationStatus::Finished
                    && !message.translation.is_empty()
            })
            .map_or(source, Message::display_translation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn message(source: &str, translation: &str, status: TranslationStatus) -> Message {
        Message {
            source: source.to_string(),
            translation: Translation {
                status,
                value: TranslationValue::Single(FormText::Plain(translation.to_string())),
            },
            ..Message::default()
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            version: Some("2.1".to_string()),
            language: Some("da".to_string()),
            source_language: None,
            contexts: vec![
                Context {
                    name: "AddressBookPage".to_string(),
                    comment: None,
                    messages: vec![
                        message(
                            "Create a new address",
                            "Opret en ny adresse",
                            TranslationStatus::Finished,
                        ),
                        message("&Copy", "&Kopiér", TranslationStatus::Unfinished),
                    ],
                },
                Context {
                    name: "SendCoinsDialog".to_string(),
                    comment: None,
                    messages: vec![message("&Copy", "", TranslationStatus::Finished)],
                },
            ],
        }
    }

    #[rstest]
    #[case::finished(TranslationStatus::Finished, None, true)]
    #[case::unfinished(TranslationStatus::Unfinished, Some("unfinished"), true)]
    #[case::vanished(TranslationStatus::Vanished, Some("vanished"), false)]
    #[case::obsolete(TranslationStatus::Obsolete, Some("obsolete"), false)]
    fn test_status_type_attribute(
        #[case] status: TranslationStatus,
        #[case] attribute: Option<&str>,
        #[case] active: bool,
    ) {
        assert_eq!(status.type_attribute(), attribute);
        assert_eq!(status.is_active(), active);
        if let Some(value) = attribute {
            assert_eq!(TranslationStatus::from_type_attribute(value), Some(status));
        }
    }

    #[googletest::test]
    fn test_find_message_uses_context_and_source() {
        let catalog = catalog();

        let (index, found) = catalog.find_message("SendCoinsDialog", "&Copy", None).unwrap();

        expect_that!(index, eq(MessageIndex { context: 1, message: 0 }));
        expect_that!(found.display_translation(), eq(""));
        expect_that!(catalog.find_message("SendCoinsDialog", "&Copy", Some("menu")), none());
    }

    #[googletest::test]
    fn test_messages_iterates_in_document_order() {
        let catalog = catalog();

        let sources: Vec<_> = catalog.messages().map(|(_, _, m)| m.source.as_str()).collect();

        expect_that!(sources, elements_are![eq(&"Create a new address"), eq(&"&Copy"), eq(&"&Copy")]);
        expect_that!(catalog.message_ids().len(), eq(3));
    }

    #[rstest]
    #[case::finished("AddressBookPage", "Create a new address", "Opret en ny adresse")]
    #[case::unfinished_falls_back("AddressBookPage", "&Copy", "&Copy")]
    #[case::empty_falls_back("SendCoinsDialog", "&Copy", "&Copy")]
    #[case::missing_falls_back("RPCConsole", "Clear console", "Clear console")]
    fn test_translate_falls_back_to_source(
        #[case] context: &str,
        #[case] source: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(catalog().translate(context, source), expected);
    }

    #[googletest::test]
    fn test_translation_emptiness_considers_all_forms() {
        let plural = Translation {
            status: TranslationStatus::Finished,
            value: TranslationValue::Plural(vec![
                FormText::Plain(String::new()),
                FormText::LengthVariants(vec![String::new(), "kort".to_string()]),
            ]),
        };

        expect_that!(plural.is_empty(), eq(false));
        expect_that!(plural.forms().len(), eq(2));
        expect_that!(Translation::default().is_empty(), eq(true));
    }
}
