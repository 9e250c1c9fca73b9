/// Interned message key: context name, source text and disambiguation comment.
///
/// Two messages in different locale files are "the same message" when their
/// keys are equal.
#[salsa::interned(debug)]
pub struct MessageKey<'db> {
    #[returns(ref)]
    pub context: String,

    #[returns(ref)]
    pub source: String,

    #[returns(ref)]
    pub comment: Option<String>,
}
