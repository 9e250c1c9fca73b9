//! Helpers shared by unit tests.
#![cfg(test)]

use std::path::Path;

use crate::db::LinguistDatabaseImpl;
use crate::input::translation::{
    TranslationFile,
    translation_file_from_text,
};

/// Danish catalog: one finished, one unfinished and one numerus message.
pub(crate) const DANISH: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="da">
<context>
    <name>AddressBookPage</name>
    <message>
        <source>Create a new address</source>
        <extracomment>Tooltip of the new address button</extracomment>
        <translation>Opret en ny adresse</translation>
    </message>
    <message>
        <source>&amp;Copy</source>
        <translation type="unfinished">&amp;Kopiér</translation>
    </message>
    <message numerus="yes">
        <source>%n block(s)</source>
        <translation>
            <numerusform>%n blok</numerusform>
        </translation>
    </message>
</context>
</TS>
"#;

/// Swedish catalog lacking the numerus message.
pub(crate) const SWEDISH: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="sv">
<context>
    <name>AddressBookPage</name>
    <message>
        <source>Create a new address</source>
        <translation>Skapa ny adress</translation>
    </message>
    <message>
        <source>&amp;Copy</source>
        <translation>&amp;Kopiera</translation>
    </message>
</context>
</TS>
"#;

/// Creates a translation file input the way the indexer does.
pub(crate) fn create_translation(
    db: &LinguistDatabaseImpl,
    file_path: &str,
    text: &str,
) -> TranslationFile {
    translation_file_from_text(db, Path::new(file_path), text.to_string())
}

/// Danish and Swedish files of the `bitcoin` project.
pub(crate) fn create_project(db: &LinguistDatabaseImpl) -> Vec<TranslationFile> {
    vec![
        create_translation(db, "/ws/locale/bitcoin_da.ts", DANISH),
        create_translation(db, "/ws/locale/bitcoin_sv.ts", SWEDISH),
    ]
}
