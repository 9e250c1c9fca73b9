//! Intermediate representation of translation catalogs.

pub mod catalog;
pub mod plural;

pub use catalog::{
    Catalog,
    Context,
    Extra,
    FormText,
    Location,
    Message,
    MessageId,
    MessageIndex,
    Translation,
    TranslationStatus,
    TranslationValue,
};
pub use plural::{
    LocaleTag,
    PluralRule,
};
