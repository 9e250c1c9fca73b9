//! Serializer producing the canonical Qt Linguist layout.

use std::fmt::Write as _;

use super::escape::{
    protect,
    protect_attribute,
};
use crate::ir::{
    Catalog,
    Context,
    FormText,
    Message,
    Translation,
    TranslationValue,
};

/// Indentation of elements nested in a `message`.
const MESSAGE_CHILD: &str = "        ";
/// Indentation of `numerusform` / `lengthvariant` lines.
const FORM: &str = "            ";

/// Serializes a catalog.
#[must_use]
pub fn write_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str("<!DOCTYPE TS>\n");
    out.push_str("<TS");
    push_attribute(&mut out, "version", catalog.version.as_deref());
    push_attribute(&mut out, "language", catalog.language.as_deref());
    push_attribute(&mut out, "sourcelanguage", catalog.source_language.as_deref());
    out.push_str(">\n");

    for context in &catalog.contexts {
        write_context(&mut out, context);
    }

    out.push_str("</TS>\n");
    out
}

/// ` name="value"` when the value is present.
fn push_attribute(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = write!(out, " {name}=\"{}\"", protect_attribute(value));
    }
}

/// One-line element with escaped text, skipped for `None`.
fn push_element(out: &mut String, indent: &str, name: &str, text: Option<&str>) {
    if let Some(text) = text {
        let _ = writeln!(out, "{indent}<{name}>{}</{name}>", protect(text));
    }
}

/// Writes a `context` element.
fn write_context(out: &mut String, context: &Context) {
    out.push_str("<context>\n");
    push_element(out, "    ", "name", Some(&context.name));
    push_element(out, "    ", "comment", context.comment.as_deref());
    for message in &context.messages {
        write_message(out, message);
    }
    out.push_str("</context>\n");
}

/// Writes a `message` with children in lupdate order.
fn write_message(out: &mut String, message: &Message) {
    out.push_str("    <message");
    push_attribute(out, "id", message.id.as_deref());
    if message.numerus {
        out.push_str(" numerus=\"yes\"");
    }
    out.push_str(">\n");

    for location in &message.locations {
        out.push_str(MESSAGE_CHILD);
        out.push_str("<location");
        push_attribute(out, "filename", location.filename.as_deref());
        push_attribute(out, "line", location.line.as_deref());
        out.push_str("/>\n");
    }
    push_element(out, MESSAGE_CHILD, "source", Some(&message.source));
    push_element(out, MESSAGE_CHILD, "oldsource", message.old_source.as_deref());
    push_element(out, MESSAGE_CHILD, "comment", message.comment.as_deref());
    push_element(out, MESSAGE_CHILD, "oldcomment", message.old_comment.as_deref());
    push_element(out, MESSAGE_CHILD, "extracomment", message.extra_comment.as_deref());
    push_element(out, MESSAGE_CHILD, "translatorcomment", message.translator_comment.as_deref());
    out.push_str(&translation_element(&message.translation));
    out.push('\n');
    push_element(out, MESSAGE_CHILD, "userdata", message.user_data.as_deref());
    for extra in &message.extras {
        let name = format!("extra-{}", extra.name);
        push_element(out, MESSAGE_CHILD, &name, Some(&extra.value));
    }
    out.push_str("    </message>\n");
}

/// Renders a `translation` element at message-child indentation, without the
/// trailing newline. Code actions reuse this to replace a single element.
#[must_use]
pub fn translation_element(translation: &Translation) -> String {
    let mut out = String::new();
    out.push_str(MESSAGE_CHILD);
    out.push_str("<translation");
    if let Some(kind) = translation.status.type_attribute() {
        let _ = write!(out, " type=\"{kind}\"");
    }
    match &translation.value {
        TranslationValue::Single(form) => push_form_content(&mut out, form, MESSAGE_CHILD),
        TranslationValue::Plural(forms) => {
            out.push('>');
            for form in forms {
                out.push('\n');
                out.push_str(FORM);
                out.push_str("<numerusform");
                push_form_content(&mut out, form, FORM);
                out.push_str("</numerusform>");
            }
            out.push('\n');
            out.push_str(MESSAGE_CHILD);
        }
    }
    out.push_str("</translation>");
    out
}

/// Closes the start tag and writes the text, or the length variants one per
/// line when the form has them.
fn push_form_content(out: &mut String, form: &FormText, indent: &str) {
    match form {
        FormText::Plain(text) => {
            out.push('>');
            out.push_str(&protect(text));
        }
        FormText::LengthVariants(variants) => {
            out.push_str(" variants=\"yes\">");
            for variant in variants {
                let _ = write!(out, "\n    {indent}<lengthvariant>{}</lengthvariant>", protect(variant));
            }
            out.push('\n');
            out.push_str(indent);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ir::{
        Extra,
        Location,
        TranslationStatus,
    };
    use crate::syntax::parser::parse_catalog;

    const CANONICAL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="sv" sourcelanguage="en">
<context>
    <name>SendCoinsDialog</name>
    <message id="send.confirm">
        <location filename="../sendcoinsdialog.cpp" line="+224"/>
        <location filename="../sendcoinsdialog.cpp" line="+5"/>
        <source>Confirm send coins</source>
        <comment>dialog title</comment>
        <extracomment>Shown before broadcasting</extracomment>
        <translatorcomment>Bekräfta is imperative</translatorcomment>
        <translation>Bekräfta skickade mynt</translation>
        <userdata>42</userdata>
        <extra-po-flags>qt-format</extra-po-flags>
    </message>
    <message numerus="yes">
        <source>%n input(s)</source>
        <translation type="unfinished">
            <numerusform>%n indata</numerusform>
            <numerusform variants="yes">
                <lengthvariant>%n indatan</lengthvariant>
                <lengthvariant>%n in</lengthvariant>
            </numerusform>
        </translation>
    </message>
    <message>
        <source>Clear &amp;All</source>
        <oldsource>Clear all</oldsource>
        <translation type="vanished">Rensa &amp;alla</translation>
    </message>
    <message>
        <source>Bell<byte value="x7"/></source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#;

    #[test]
    fn test_canonical_text_is_reproduced() {
        let document = parse_catalog(CANONICAL).unwrap();

        assert_eq!(write_catalog(&document.catalog), CANONICAL);
    }

    #[test]
    fn test_written_catalog_parses_to_same_model() {
        let catalog = Catalog {
            version: Some("2.1".to_string()),
            language: Some("pt".to_string()),
            source_language: None,
            contexts: vec![Context {
                name: "RPCConsole".to_string(),
                comment: Some("legacy note".to_string()),
                messages: vec![Message {
                    locations: vec![Location { filename: None, line: Some("+3".to_string()) }],
                    source: "Use \"quotes\" & <tags>\ttab".to_string(),
                    translation: Translation {
                        status: TranslationStatus::Obsolete,
                        value: TranslationValue::Single(FormText::LengthVariants(vec![
                            "Limpar consola".to_string(),
                            "Limpar".to_string(),
                        ])),
                    },
                    extras: vec![Extra { name: "note".to_string(), value: String::new() }],
                    ..Message::default()
                }],
            }],
        };

        let text = write_catalog(&catalog);
        let reparsed = parse_catalog(&text).unwrap();

        assert_eq!(reparsed.catalog, catalog);
    }

    #[test]
    fn test_empty_root_attributes_are_omitted() {
        let text = write_catalog(&Catalog::default());

        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS>\n</TS>\n"
        );
    }

    #[test]
    fn test_translation_element_for_empty_numerus() {
        let translation = Translation {
            status: TranslationStatus::Unfinished,
            value: TranslationValue::Plural(vec![]),
        };

        assert_eq!(
            translation_element(&translation),
            "        <translation type=\"unfinished\">\n        </translation>"
        );
    }
}
