//! Reader for Qt Linguist `.ts` documents.

use quick_xml::Reader;
use quick_xml::events::{
    BytesStart,
    Event,
};

use super::error::ParseError;
use super::escape::decode_byte_value;
use crate::ir::{
    Catalog,
    Context,
    Extra,
    FormText,
    Location,
    Message,
    MessageIndex,
    Translation,
    TranslationStatus,
    TranslationValue,
};
use crate::types::ByteSpan;

/// A parsed catalog together with the source locations of its parts.
#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct ParsedDocument {
    pub catalog: Catalog,
    pub spans: DocumentSpans,
}

/// Byte spans parallel to [`Catalog`]: `contexts[i].messages[j]` locates
/// `catalog.contexts[i].messages[j]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct DocumentSpans {
    /// Start tag of the `TS` root element.
    pub root: ByteSpan,
    pub contexts: Vec<ContextSpans>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct ContextSpans {
    pub element: ByteSpan,
    pub name: ByteSpan,
    pub messages: Vec<MessageSpans>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, salsa::Update)]
pub struct MessageSpans {
    pub element: ByteSpan,
    pub source: ByteSpan,
    pub translation: Option<TranslationSpans>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, salsa::Update)]
pub struct TranslationSpans {
    pub element: ByteSpan,
    pub start_tag: ByteSpan,
}

impl DocumentSpans {
    #[must_use]
    pub fn message(&self, index: MessageIndex) -> Option<&MessageSpans> {
        self.contexts.get(index.context)?.messages.get(index.message)
    }

    /// Innermost message whose element contains the byte offset.
    #[must_use]
    pub fn message_at(&self, offset: usize) -> Option<MessageIndex> {
        self.contexts.iter().enumerate().find_map(|(context_index, context)| {
            if !context.element.contains(offset) {
                return None;
            }
            context.messages.iter().position(|m| m.element.contains(offset)).map(|message| {
                MessageIndex { context: context_index, message }
            })
        })
    }
}

/// Parses a whole translation document.
///
/// # Errors
/// Returns [`ParseError`] for malformed XML or a document that does not
/// follow the `TS` structure.
pub fn parse_catalog(text: &str) -> Result<ParsedDocument, ParseError> {
    Parser::new(text).parse_document()
}

/// Event reader tracking byte offsets.
struct Parser<'a> {
    /// Underlying XML reader over the document text.
    reader: Reader<&'a [u8]>,
}

/// Element content collected while reading a translation element.
#[derive(Default)]
struct TranslationContent {
    /// Plain text (including decoded `byte` elements).
    text: String,
    /// Offset of the first non-whitespace text, if any.
    text_offset: Option<usize>,
    /// `numerusform` children.
    forms: Vec<FormText>,
    /// `lengthvariant` children.
    variants: Vec<String>,
}

/// Returns the UTF-8 name of an element.
fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Text between elements that carries no content.
fn is_whitespace(raw: &[u8]) -> bool {
    raw.iter().all(u8::is_ascii_whitespace)
}

impl<'a> Parser<'a> {
    /// Reader over the whole text, whitespace preserved.
    fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);
        Self { reader }
    }

    /// Byte offset of the reader.
    fn position(&self) -> usize {
        usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX)
    }

    /// Reads the next event with the byte span it covers.
    fn next(&mut self) -> Result<(ByteSpan, Event<'a>), ParseError> {
        let start = self.position();
        match self.reader.read_event() {
            Ok(event) => Ok((ByteSpan::new(start, self.position()), event)),
            Err(error) => Err(ParseError::Xml {
                offset: usize::try_from(self.reader.error_position()).unwrap_or(start),
                message: error.to_string(),
            }),
        }
    }

    /// Reads all attributes as `(name, value)` pairs.
    fn attributes(
        start: &BytesStart<'_>,
        offset: usize,
    ) -> Result<Vec<(String, String)>, ParseError> {
        let mut result = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute
                .map_err(|error| ParseError::Xml { offset, message: error.to_string() })?;
            let key = element_name(attribute.key.as_ref());
            let value = attribute
                .unescape_value()
                .map_err(|error| ParseError::Xml { offset, message: error.to_string() })?
                .into_owned();
            result.push((key, value));
        }
        Ok(result)
    }

    /// Value of a named attribute.
    fn attribute(attributes: &[(String, String)], name: &str) -> Option<String> {
        attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.clone())
    }

    /// Parses the prolog and the `TS` root.
    fn parse_document(mut self) -> Result<ParsedDocument, ParseError> {
        let document = loop {
            let (span, event) = self.next()?;
            match event {
                Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}
                Event::Text(text) if is_whitespace(&text) => {}
                Event::Start(start) if start.name().as_ref() == b"TS" => {
                    break self.parse_ts(span, &start, false)?;
                }
                Event::Empty(start) if start.name().as_ref() == b"TS" => {
                    break self.parse_ts(span, &start, true)?;
                }
                Event::Start(start) | Event::Empty(start) => {
                    return Err(ParseError::UnexpectedElement {
                        offset: span.start,
                        element: element_name(start.name().as_ref()),
                        parent: "document".to_string(),
                    });
                }
                _ => return Err(ParseError::MissingRoot { offset: span.start }),
            }
        };

        loop {
            let (span, event) = self.next()?;
            match event {
                Event::Comment(_) | Event::PI(_) => {}
                Event::Text(text) if is_whitespace(&text) => {}
                Event::Eof => break,
                _ => return Err(ParseError::TrailingContent { offset: span.start }),
            }
        }

        Ok(document)
    }

    /// Parses the children of `TS`.
    fn parse_ts(
        &mut self,
        root: ByteSpan,
        start: &BytesStart<'_>,
        is_empty: bool,
    ) -> Result<ParsedDocument, ParseError> {
        let attributes = Self::attributes(start, root.start)?;
        let mut document = ParsedDocument {
            catalog: Catalog {
                version: Self::attribute(&attributes, "version"),
                language: Self::attribute(&attributes, "language"),
                source_language: Self::attribute(&attributes, "sourcelanguage"),
                contexts: Vec::new(),
            },
            spans: DocumentSpans { root, contexts: Vec::new() },
        };
        if is_empty {
            return Ok(document);
        }

        loop {
            let (span, event) = self.next()?;
            match event {
                Event::Start(start) => match start.name().as_ref() {
                    b"context" => {
                        let (context, spans) = self.parse_context(span)?;
                        document.catalog.contexts.push(context);
                        document.spans.contexts.push(spans);
                    }
                    // Catalog dependencies only matter to lrelease.
                    b"dependencies" => self.skip_element(b"dependencies")?,
                    other => {
                        return Err(ParseError::UnexpectedElement {
                            offset: span.start,
                            element: element_name(other),
                            parent: "TS".to_string(),
                        });
                    }
                },
                Event::Empty(start) if start.name().as_ref() == b"dependencies" => {}
                Event::End(_) => return Ok(document),
                event => Self::allow_insignificant(&event, span, "TS")?,
            }
        }
    }

    /// Parses one `context` after its start tag.
    fn parse_context(
        &mut self,
        element_start: ByteSpan,
    ) -> Result<(Context, ContextSpans), ParseError> {
        let mut context = Context::default();
        let mut spans = ContextSpans::default();
        let mut name_span = None;

        loop {
            let (span, event) = self.next()?;
            match event {
                Event::Start(start) => match start.name().as_ref() {
                    b"name" => {
                        let (name, end) = self.read_text(b"name")?;
                        context.name = name;
                        name_span = Some(ByteSpan::new(span.start, end));
                    }
                    b"comment" => context.comment = Some(self.read_text(b"comment")?.0),
                    b"message" => {
                        let (message, message_spans) =
                            self.parse_message(span, &start)?;
                        context.messages.push(message);
                        spans.messages.push(message_spans);
                    }
                    other => {
                        return Err(ParseError::UnexpectedElement {
                            offset: span.start,
                            element: element_name(other),
                            parent: "context".to_string(),
                        });
                    }
                },
                Event::Empty(start) if start.name().as_ref() == b"name" => {
                    name_span = Some(span);
                }
                Event::Empty(start) if start.name().as_ref() == b"comment" => {
                    context.comment = Some(String::new());
                }
                Event::Empty(start) => {
                    return Err(ParseError::UnexpectedElement {
                        offset: span.start,
                        element: element_name(start.name().as_ref()),
                        parent: "context".to_string(),
                    });
                }
                Event::End(_) => {
                    let Some(name_span) = name_span else {
                        return Err(ParseError::MissingElement {
                            offset: element_start.start,
                            element: "context".to_string(),
                            child: "name".to_string(),
                        });
                    };
                    spans.name = name_span;
                    spans.element = ByteSpan::new(element_start.start, span.end);
                    return Ok((context, spans));
                }
                event => Self::allow_insignificant(&event, span, "context")?,
            }
        }
    }

    /// Parses one `message` after its start tag.
    #[allow(clippy::too_many_lines)]
    fn parse_message(
        &mut self,
        element_start: ByteSpan,
        start: &BytesStart<'_>,
    ) -> Result<(Message, MessageSpans), ParseError> {
        let attributes = Self::attributes(start, element_start.start)?;
        let mut message = Message {
            id: Self::attribute(&attributes, "id"),
            numerus: Self::attribute(&attributes, "numerus").as_deref() == Some("yes"),
            ..Message::default()
        };
        let mut spans = MessageSpans::default();
        let mut source_span = None;

        loop {
            let (span, event) = self.next()?;
            match event {
                Event::Empty(child) => {
                    let name = child.name();
                    match name.as_ref() {
                        b"location" => {
                            message.locations.push(Self::parse_location(&child, span.start)?);
                        }
                        b"source" => {
                            message.source = String::new();
                            source_span = Some(span);
                        }
                        b"translation" => {
                            let (translation, translation_spans) =
                                self.parse_translation(span, &child, true, message.numerus)?;
                            message.translation = translation;
                            spans.translation = Some(translation_spans);
                        }
                        other => {
                            let value = Some(String::new());
                            Self::store_text_child(&mut message, other, value, span)?;
                        }
                    }
                }
                Event::Start(child) => {
                    let name = child.name();
                    match name.as_ref() {
                        b"location" => {
                            message.locations.push(Self::parse_location(&child, span.start)?);
                            self.skip_element(b"location")?;
                        }
                        b"source" => {
                            let (source, end) = self.read_text(b"source")?;
                            message.source = source;
                            source_span = Some(ByteSpan::new(span.start, end));
                        }
                        b"translation" => {
                            let (translation, translation_spans) =
                                self.parse_translation(span, &child, false, message.numerus)?;
                            message.translation = translation;
                            spans.translation = Some(translation_spans);
                        }
                        other => {
                            let owned = other.to_vec();
                            let (value, _) = self.read_text(&owned)?;
                            Self::store_text_child(&mut message, &owned, Some(value), span)?;
                        }
                    }
                }
                Event::End(_) => {
                    let Some(source_span) = source_span else {
                        return Err(ParseError::MissingElement {
                            offset: element_start.start,
                            element: "message".to_string(),
                            child: "source".to_string(),
                        });
                    };
                    spans.source = source_span;
                    spans.element = ByteSpan::new(element_start.start, span.end);
                    return Ok((message, spans));
                }
                event => Self::allow_insignificant(&event, span, "message")?,
            }
        }
    }

    /// Stores the text of a simple child element of `message`.
    fn store_text_child(
        message: &mut Message,
        name: &[u8],
        value: Option<String>,
        span: ByteSpan,
    ) -> Result<(), ParseError> {
        match name {
            b"oldsource" => message.old_source = value,
            b"comment" => message.comment = value,
            b"oldcomment" => message.old_comment = value,
            b"extracomment" => message.extra_comment = value,
            b"translatorcomment" => message.translator_comment = value,
            b"userdata" => message.user_data = value,
            other => {
                let name = element_name(other);
                let Some(extra) = name.strip_prefix("extra-") else {
                    return Err(ParseError::UnexpectedElement {
                        offset: span.start,
                        element: name,
                        parent: "message".to_string(),
                    });
                };
                message.extras.push(Extra {
                    name: extra.to_string(),
                    value: value.unwrap_or_default(),
                });
            }
        }
        Ok(())
    }

    /// `filename` and `line` of a `location` element.
    fn parse_location(start: &BytesStart<'_>, offset: usize) -> Result<Location, ParseError> {
        let attributes = Self::attributes(start, offset)?;
        Ok(Location {
            filename: Self::attribute(&attributes, "filename"),
            line: Self::attribute(&attributes, "line"),
        })
    }

    /// Parses a `translation` element, plain or with numerus forms.
    fn parse_translation(
        &mut self,
        start_tag: ByteSpan,
        start: &BytesStart<'_>,
        is_empty: bool,
        numerus: bool,
    ) -> Result<(Translation, TranslationSpans), ParseError> {
        let attributes = Self::attributes(start, start_tag.start)?;
        let status = Self::attribute(&attributes, "type")
            .and_then(|value| TranslationStatus::from_type_attribute(&value))
            .unwrap_or_default();
        let has_variants = Self::attribute(&attributes, "variants").as_deref() == Some("yes");

        if is_empty {
            let value = if numerus {
                TranslationValue::Plural(Vec::new())
            } else if has_variants {
                TranslationValue::Single(FormText::LengthVariants(Vec::new()))
            } else {
                TranslationValue::default()
            };
            return Ok((
                Translation { status, value },
                TranslationSpans { element: start_tag, start_tag },
            ));
        }

        let mut content = TranslationContent::default();
        let end = loop {
            let (span, event) = self.next()?;
            match event {
                Event::Start(child) if child.name().as_ref() == b"numerusform" => {
                    let child_attributes = Self::attributes(&child, span.start)?;
                    let variants =
                        Self::attribute(&child_attributes, "variants").as_deref() == Some("yes");
                    content.forms.push(self.read_form(b"numerusform", variants)?);
                }
                Event::Empty(child) if child.name().as_ref() == b"numerusform" => {
                    content.forms.push(FormText::default());
                }
                Event::Start(child) if child.name().as_ref() == b"lengthvariant" => {
                    content.variants.push(self.read_text(b"lengthvariant")?.0);
                }
                Event::Empty(child) if child.name().as_ref() == b"lengthvariant" => {
                    content.variants.push(String::new());
                }
                Event::End(_) => break span.end,
                event => Self::push_text(&event, span, &mut content.text, "translation", |offset| {
                    content.text_offset.get_or_insert(offset);
                })?,
            }
        };

        let has_children = !content.forms.is_empty() || !content.variants.is_empty();
        if has_children && let Some(offset) = content.text_offset {
            return Err(ParseError::UnexpectedText { offset, parent: "translation".to_string() });
        }

        let value = if !content.forms.is_empty() {
            TranslationValue::Plural(content.forms)
        } else if has_variants || !content.variants.is_empty() {
            TranslationValue::Single(FormText::LengthVariants(content.variants))
        } else if numerus && content.text_offset.is_none() {
            TranslationValue::Plural(Vec::new())
        } else {
            TranslationValue::Single(FormText::Plain(content.text))
        };

        Ok((
            Translation { status, value },
            TranslationSpans { element: ByteSpan::new(start_tag.start, end), start_tag },
        ))
    }

    /// Reads one `numerusform`, either plain text or length variants.
    fn read_form(&mut self, end_name: &[u8], variants: bool) -> Result<FormText, ParseError> {
        if !variants {
            return Ok(FormText::Plain(self.read_text(end_name)?.0));
        }

        let mut texts = Vec::new();
        loop {
            let (span, event) = self.next()?;
            match event {
                Event::Start(child) if child.name().as_ref() == b"lengthvariant" => {
                    texts.push(self.read_text(b"lengthvariant")?.0);
                }
                Event::Empty(child) if child.name().as_ref() == b"lengthvariant" => {
                    texts.push(String::new());
                }
                Event::End(_) => return Ok(FormText::LengthVariants(texts)),
                event => Self::allow_insignificant(&event, span, "numerusform")?,
            }
        }
    }

    /// Reads text content up to the end tag. Returns the text and the end offset.
    fn read_text(&mut self, end_name: &[u8]) -> Result<(String, usize), ParseError> {
        let parent = element_name(end_name);
        let mut text = String::new();
        loop {
            let (span, event) = self.next()?;
            if let Event::End(_) = event {
                return Ok((text, span.end));
            }
            Self::push_text(&event, span, &mut text, &parent, |_| {})?;
        }
    }

    /// Appends character data of an event to `text`.
    ///
    /// `on_content` receives the offset of non-whitespace character data.
    fn push_text(
        event: &Event<'a>,
        span: ByteSpan,
        text: &mut String,
        parent: &str,
        mut on_content: impl FnMut(usize),
    ) -> Result<(), ParseError> {
        match event {
            Event::Text(raw) => {
                let unescaped = raw
                    .unescape()
                    .map_err(|error| ParseError::Xml { offset: span.start, message: error.to_string() })?;
                if !unescaped.trim().is_empty() {
                    on_content(span.start);
                }
                text.push_str(&unescaped);
            }
            Event::CData(raw) => {
                let data = std::str::from_utf8(raw).map_err(|error| ParseError::Xml {
                    offset: span.start,
                    message: error.to_string(),
                })?;
                if !data.trim().is_empty() {
                    on_content(span.start);
                }
                text.push_str(data);
            }
            Event::Empty(child) if child.name().as_ref() == b"byte" => {
                let attributes = Self::attributes(child, span.start)?;
                let value = Self::attribute(&attributes, "value").unwrap_or_default();
                let Some(ch) = decode_byte_value(&value) else {
                    return Err(ParseError::InvalidByte { offset: span.start, value });
                };
                on_content(span.start);
                text.push(ch);
            }
            Event::Start(child) | Event::Empty(child) => {
                return Err(ParseError::UnexpectedElement {
                    offset: span.start,
                    element: element_name(child.name().as_ref()),
                    parent: parent.to_string(),
                });
            }
            Event::Comment(_) | Event::PI(_) => {}
            Event::Eof => {
                return Err(ParseError::Xml {
                    offset: span.start,
                    message: format!("unexpected end of document inside <{parent}>"),
                });
            }
            Event::Decl(_) | Event::DocType(_) | Event::End(_) => {
                return Err(ParseError::Xml {
                    offset: span.start,
                    message: format!("unexpected markup inside <{parent}>"),
                });
            }
        }
        Ok(())
    }

    /// Accepts whitespace and comments between structural elements.
    fn allow_insignificant(
        event: &Event<'a>,
        span: ByteSpan,
        parent: &str,
    ) -> Result<(), ParseError> {
        match event {
            Event::Comment(_) | Event::PI(_) => Ok(()),
            Event::Text(raw) if is_whitespace(raw) => Ok(()),
            Event::Text(_) | Event::CData(_) => {
                Err(ParseError::UnexpectedText { offset: span.start, parent: parent.to_string() })
            }
            Event::Start(child) | Event::Empty(child) => Err(ParseError::UnexpectedElement {
                offset: span.start,
                element: element_name(child.name().as_ref()),
                parent: parent.to_string(),
            }),
            Event::Eof => Err(ParseError::Xml {
                offset: span.start,
                message: format!("unexpected end of document inside <{parent}>"),
            }),
            Event::End(_) | Event::Decl(_) | Event::DocType(_) => Err(ParseError::Xml {
                offset: span.start,
                message: format!("unexpected markup inside <{parent}>"),
            }),
        }
    }

    /// Skips an element's content up to and including its end tag.
    fn skip_element(&mut self, name: &[u8]) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            let (span, event) = self.next()?;
            match event {
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => return Ok(()),
                Event::End(_) => depth -= 1,
                Event::Eof => {
                    return Err(ParseError::Xml {
                        offset: span.start,
                        message: format!("unexpected end of document inside <{}>", element_name(name)),
                    });
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    const DANISH: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="da">
<context>
    <name>AddressBookPage</name>
    <message>
        <location filename="../forms/addressbookpage.ui" line="+37"/>
        <source>Create a new address</source>
        <translation>Opret en ny adresse</translation>
    </message>
    <message>
        <source>&amp;Copy</source>
        <translation type="unfinished">&amp;Kopiér</translation>
    </message>
</context>
<context>
    <name>BitcoinGUI</name>
    <message numerus="yes">
        <source>Processed %n block(s) of transaction history.</source>
        <extracomment>%n is the number of blocks</extracomment>
        <translation>
            <numerusform>Behandlede %n blok af transaktionshistorikken.</numerusform>
            <numerusform>Behandlede %n blokke af transaktionshistorikken.</numerusform>
        </translation>
    </message>
</context>
</TS>
"#;

    #[googletest::test]
    fn test_parse_root_attributes() {
        let document = parse_catalog(DANISH).unwrap();

        expect_that!(document.catalog.version.as_deref(), some(eq("2.1")));
        expect_that!(document.catalog.language.as_deref(), some(eq("da")));
        expect_that!(document.catalog.source_language, none());
        expect_that!(document.catalog.contexts.len(), eq(2));
    }

    #[googletest::test]
    fn test_parse_messages_and_status() {
        let document = parse_catalog(DANISH).unwrap();
        let context = &document.catalog.contexts[0];

        expect_that!(context.name, eq("AddressBookPage"));
        expect_that!(context.messages.len(), eq(2));

        let first = &context.messages[0];
        expect_that!(first.source, eq("Create a new address"));
        expect_that!(first.display_translation(), eq("Opret en ny adresse"));
        expect_that!(first.translation.status, eq(TranslationStatus::Finished));
        expect_that!(
            first.locations,
            elements_are![eq(&Location {
                filename: Some("../forms/addressbookpage.ui".to_string()),
                line: Some("+37".to_string()),
            })]
        );

        let second = &context.messages[1];
        expect_that!(second.source, eq("&Copy"));
        expect_that!(second.display_translation(), eq("&Kopiér"));
        expect_that!(second.translation.status, eq(TranslationStatus::Unfinished));
    }

    #[googletest::test]
    fn test_parse_numerus_forms() {
        let document = parse_catalog(DANISH).unwrap();
        let message = &document.catalog.contexts[1].messages[0];

        expect_that!(message.numerus, eq(true));
        expect_that!(message.extra_comment.as_deref(), some(eq("%n is the number of blocks")));
        let TranslationValue::Plural(forms) = &message.translation.value else {
            panic!("expected numerus forms");
        };
        expect_that!(forms.len(), eq(2));
        expect_that!(forms[1].primary(), eq("Behandlede %n blokke af transaktionshistorikken."));
    }

    #[googletest::test]
    fn test_spans_point_at_elements() {
        let document = parse_catalog(DANISH).unwrap();
        let spans = document.spans.message(MessageIndex { context: 0, message: 0 }).unwrap();

        expect_that!(
            &DANISH[spans.source.start..spans.source.end],
            eq("<source>Create a new address</source>")
        );
        let translation = spans.translation.unwrap();
        expect_that!(
            &DANISH[translation.element.start..translation.element.end],
            eq("<translation>Opret en ny adresse</translation>")
        );
        expect_that!(&DANISH[translation.start_tag.start..translation.start_tag.end], eq("<translation>"));
        expect_that!(&DANISH[spans.element.start..spans.element.start + 9], eq("<message>"));
        expect_that!(&DANISH[spans.element.end - 10..spans.element.end], eq("</message>"));
        expect_that!(&DANISH[document.spans.root.start..document.spans.root.end], starts_with("<TS "));
    }

    #[googletest::test]
    fn test_message_at_offset() {
        let document = parse_catalog(DANISH).unwrap();
        let offset = DANISH.find("Kopiér").unwrap();

        expect_that!(
            document.spans.message_at(offset),
            some(eq(MessageIndex { context: 0, message: 1 }))
        );
        expect_that!(document.spans.message_at(DANISH.find("<name>").unwrap()), none());
    }

    #[googletest::test]
    fn test_parse_byte_elements_and_entities() {
        let text = r#"<TS version="2.1" language="sv"><context><name>C</name><message>
<source>Escape &lt;b&gt; &apos;x&apos;<byte value="x1b"/></source>
<translation type="vanished">Fly &#x41;</translation>
</message></context></TS>"#;

        let document = parse_catalog(text).unwrap();
        let message = &document.catalog.contexts[0].messages[0];

        expect_that!(message.source, eq("Escape <b> 'x'\u{1b}"));
        expect_that!(message.display_translation(), eq("Fly A"));
        expect_that!(message.translation.status, eq(TranslationStatus::Vanished));
    }

    #[googletest::test]
    fn test_parse_length_variants_and_extras() {
        let text = r#"<TS version="2.1" language="pt">
<context>
    <name>RPCConsole</name>
    <message id="console.clear">
        <source>Clear console</source>
        <comment>button</comment>
        <translatorcomment>short form for toolbar</translatorcomment>
        <translation variants="yes">
            <lengthvariant>Limpar consola</lengthvariant>
            <lengthvariant>Limpar</lengthvariant>
        </translation>
        <extra-po-flags>qt-format</extra-po-flags>
    </message>
</context>
</TS>"#;

        let document = parse_catalog(text).unwrap();
        let message = &document.catalog.contexts[0].messages[0];

        expect_that!(message.id.as_deref(), some(eq("console.clear")));
        expect_that!(message.comment.as_deref(), some(eq("button")));
        expect_that!(message.translator_comment.as_deref(), some(eq("short form for toolbar")));
        expect_that!(
            message.translation.value,
            eq(&TranslationValue::Single(FormText::LengthVariants(vec![
                "Limpar consola".to_string(),
                "Limpar".to_string(),
            ])))
        );
        expect_that!(
            message.extras,
            elements_are![eq(&Extra { name: "po-flags".to_string(), value: "qt-format".to_string() })]
        );
    }

    #[googletest::test]
    fn test_parse_empty_numerus_translation() {
        let text = r#"<TS language="ja"><context><name>C</name>
<message numerus="yes"><source>%n file(s)</source><translation type="unfinished"/></message>
</context></TS>"#;

        let document = parse_catalog(text).unwrap();
        let message = &document.catalog.contexts[0].messages[0];

        expect_that!(message.translation.value, eq(&TranslationValue::Plural(vec![])));
        expect_that!(message.translation.is_empty(), eq(true));
    }

    #[rstest]
    #[case::not_xml("this is not xml")]
    #[case::empty("")]
    #[case::mismatched_end("<TS><context><name>A</name></message></TS>")]
    #[case::unclosed("<TS><context><name>A</name>")]
    #[case::wrong_root("<catalog/>")]
    #[case::missing_name("<TS><context><message><source>a</source></message></context></TS>")]
    #[case::missing_source("<TS><context><name>A</name><message><translation/></message></context></TS>")]
    #[case::unknown_child("<TS><context><name>A</name><widget/></context></TS>")]
    #[case::text_in_context("<TS><context>stray<name>A</name></context></TS>")]
    #[case::bad_byte(r#"<TS><context><name>A<byte value="nope"/></name></context></TS>"#)]
    #[case::trailing("<TS></TS><TS></TS>")]
    #[case::bad_entity("<TS><context><name>&bogus;</name></context></TS>")]
    fn test_parse_rejects_malformed(#[case] text: &str) {
        let result = parse_catalog(text);
        assert!(result.is_err(), "expected error for {text:?}, got {result:?}");
        assert!(result.unwrap_err().offset() <= text.len());
    }

    #[googletest::test]
    fn test_parse_reports_offset_of_missing_source() {
        let text = "<TS><context><name>A</name><message><translation/></message></context></TS>";

        let error = parse_catalog(text).unwrap_err();

        expect_that!(
            error,
            eq(&ParseError::MissingElement {
                offset: text.find("<message>").unwrap(),
                element: "message".to_string(),
                child: "source".to_string(),
            })
        );
    }

    #[googletest::test]
    fn test_parse_skips_dependencies() {
        let text = r#"<TS version="2.1"><dependencies><dependency catalog="qtbase_da"/></dependencies>
<context><name>A</name></context></TS>"#;

        let document = parse_catalog(text).unwrap();

        expect_that!(document.catalog.contexts.len(), eq(1));
        expect_that!(document.catalog.language, none());
    }
}
