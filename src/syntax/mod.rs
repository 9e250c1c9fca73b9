//! Reading and writing of `.ts` documents, plus the incremental queries over
//! stored files.

pub mod error;
pub mod escape;
pub mod parser;
pub mod writer;

pub use error::ParseError;
pub use parser::{
    ContextSpans,
    DocumentSpans,
    MessageSpans,
    ParsedDocument,
    TranslationSpans,
    parse_catalog,
};
pub use writer::{
    translation_element,
    write_catalog,
};

use crate::db::LinguistDatabase;
use crate::input::translation::TranslationFile;
use crate::interned::MessageKey;
use crate::ir::{
    Message,
    MessageIndex,
};
use crate::types::{
    ByteSpan,
    LineIndex,
    SourcePosition,
    SourceRange,
};

/// Result of parsing a stored translation file.
#[derive(Debug, Clone, PartialEq, Eq, salsa::Update)]
pub enum ParsedFile {
    Parsed(ParsedDocument),
    Malformed(ParseError),
}

impl ParsedFile {
    #[must_use]
    pub const fn document(&self) -> Option<&ParsedDocument> {
        match self {
            Self::Parsed(document) => Some(document),
            Self::Malformed(_) => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&ParseError> {
        match self {
            Self::Parsed(_) => None,
            Self::Malformed(error) => Some(error),
        }
    }
}

/// Parses a stored file. Memoized until the file text changes.
#[salsa::tracked(returns(ref))]
pub fn parse_translation_file(db: &dyn LinguistDatabase, file: TranslationFile) -> ParsedFile {
    match parse_catalog(file.text(db)) {
        Ok(document) => ParsedFile::Parsed(document),
        Err(error) => {
            tracing::debug!(file = %file.file_path(db), %error, "translation file is malformed");
            ParsedFile::Malformed(error)
        }
    }
}

/// Key of the message whose element contains the cursor.
pub fn message_at_position(
    db: &dyn LinguistDatabase,
    file: TranslationFile,
    position: SourcePosition,
) -> Option<MessageKey<'_>> {
    let document = parse_translation_file(db, file).document()?;
    let offset = LineIndex::new(file.text(db)).offset(position)?;
    let index = document.spans.message_at(offset)?;
    let context = document.catalog.contexts.get(index.context)?;
    let message = context.messages.get(index.message)?;

    Some(MessageKey::new(
        db,
        context.name.clone(),
        message.source.clone(),
        message.comment.clone(),
    ))
}

/// A message located in a parsed file.
#[derive(Debug, Clone, Copy)]
pub struct LocatedMessage<'a> {
    pub index: MessageIndex,
    pub message: &'a Message,
    /// Span of the `source` element.
    pub source_span: ByteSpan,
}

/// Finds the message with the given key in a parsed document.
#[must_use]
pub fn locate_message<'a>(
    document: &'a ParsedDocument,
    context: &str,
    source: &str,
    comment: Option<&str>,
) -> Option<LocatedMessage<'a>> {
    let (index, message) = document.catalog.find_message(context, source, comment)?;
    let spans = document.spans.message(index)?;
    Some(LocatedMessage { index, message, source_span: spans.source })
}

/// Range of the `source` element of the keyed message in a stored file.
pub fn message_source_range(
    db: &dyn LinguistDatabase,
    file: TranslationFile,
    key: MessageKey<'_>,
) -> Option<SourceRange> {
    let document = parse_translation_file(db, file).document()?;
    let located =
        locate_message(document, key.context(db), key.source(db), key.comment(db).as_deref())?;
    Some(LineIndex::new(file.text(db)).range(located.source_span))
}
