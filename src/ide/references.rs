//! References implementation

use tower_lsp::lsp_types::Location;

use crate::db::LinguistDatabase;
use crate::input::translation::TranslationFile;
use crate::interned::MessageKey;
use crate::ide::goto_definition::message_locations;

/// Finds every occurrence of a message in the workspace, across projects.
///
/// Unlike [`find_definitions`](crate::ide::goto_definition::find_definitions),
/// the requesting file is included.
pub fn find_references(
    db: &dyn LinguistDatabase,
    key: MessageKey<'_>,
    translations: &[TranslationFile],
) -> Vec<Location> {
    message_locations(db, key, translations)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;

    use super::*;
    use crate::db::LinguistDatabaseImpl;
    use crate::test_utils::{
        DANISH,
        create_project,
        create_translation,
    };

    #[googletest::test]
    fn find_references_includes_every_file() {
        let db = LinguistDatabaseImpl::default();
        let mut files = create_project(&db);
        files.push(create_translation(&db, "/ws/qt/qtbase_da.ts", DANISH));
        let key = MessageKey::new(&db, "AddressBookPage".to_string(), "&Copy".to_string(), None);

        let locations = find_references(&db, key, &files);

        let paths: Vec<&str> = locations.iter().map(|l| l.uri.path()).collect();
        expect_that!(
            paths,
            elements_are![
                eq(&"/ws/locale/bitcoin_da.ts"),
                eq(&"/ws/locale/bitcoin_sv.ts"),
                eq(&"/ws/qt/qtbase_da.ts")
            ]
        );
    }

    #[googletest::test]
    fn find_references_respects_disambiguation() {
        let db = LinguistDatabaseImpl::default();
        let files = create_project(&db);
        let key = MessageKey::new(
            &db,
            "AddressBookPage".to_string(),
            "&Copy".to_string(),
            Some("menu".to_string()),
        );

        expect_that!(find_references(&db, key, &files), is_empty());
    }
}
