use thiserror::Error;

/// Errors raised while reading a translation file.
///
/// Every variant carries the byte offset where the problem was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq, salsa::Update)]
pub enum ParseError {
    /// The text is not well-formed XML
    #[error("Malformed XML: {message}")]
    Xml { offset: usize, message: String },
    /// No `TS` root element before the end of the document
    #[error("Document has no <TS> root element")]
    MissingRoot { offset: usize },
    /// Element not allowed at this place in the format
    #[error("Unexpected <{element}> inside <{parent}>")]
    UnexpectedElement { offset: usize, element: String, parent: String },
    /// Non-whitespace text where only elements are allowed
    #[error("Unexpected text inside <{parent}>")]
    UnexpectedText { offset: usize, parent: String },
    /// A required child element is absent
    #[error("<{element}> is missing its <{child}> element")]
    MissingElement { offset: usize, element: String, child: String },
    /// A `byte` element whose value is not a character code
    #[error("Invalid <byte> value '{value}'")]
    InvalidByte { offset: usize, value: String },
    /// Anything but whitespace or comments after the root element
    #[error("Unexpected content after </TS>")]
    TrailingContent { offset: usize },
}

impl ParseError {
    /// Byte offset of the error in the document.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::Xml { offset, .. }
            | Self::MissingRoot { offset }
            | Self::UnexpectedElement { offset, .. }
            | Self::UnexpectedText { offset, .. }
            | Self::MissingElement { offset, .. }
            | Self::InvalidByte { offset, .. }
            | Self::TrailingContent { offset } => *offset,
        }
    }
}
