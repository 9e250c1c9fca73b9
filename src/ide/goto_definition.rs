//! Go to Definition implementation

use tower_lsp::lsp_types::{
    Location,
    Url,
};

use crate::db::LinguistDatabase;
use crate::input::translation::TranslationFile;
use crate::interned::MessageKey;
use crate::syntax::message_source_range;

/// Finds the same message in the other locale files of the project.
///
/// # Returns
/// The `source` element of the message in every sibling file that has it,
/// ordered by file path.
pub fn find_definitions(
    db: &dyn LinguistDatabase,
    key: MessageKey<'_>,
    current: TranslationFile,
    translations: &[TranslationFile],
) -> Vec<Location> {
    let project = current.project(db);
    let siblings = translations
        .iter()
        .filter(|file| **file != current && file.project(db) == project);

    message_locations(db, key, siblings)
}

/// Locations of the keyed message in `files`, ordered by file path.
pub(crate) fn message_locations<'a>(
    db: &dyn LinguistDatabase,
    key: MessageKey<'_>,
    files: impl IntoIterator<Item = &'a TranslationFile>,
) -> Vec<Location> {
    let mut found: Vec<(&String, Location)> = Vec::new();

    for file in files {
        let Some(range) = message_source_range(db, *file, key) else {
            continue;
        };
        let file_path = file.file_path(db);
        let Ok(uri) = Url::from_file_path(file_path) else {
            tracing::warn!("Failed to create URI from file path: {}", file_path);
            continue;
        };
        found.push((file_path, Location { uri, range: range.into() }));
    }

    found.sort_by(|a, b| a.0.cmp(b.0));
    found.into_iter().map(|(_, location)| location).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use tower_lsp::lsp_types::{
        Position,
        Range,
    };

    use super::*;
    use crate::db::LinguistDatabaseImpl;
    use crate::test_utils::{
        DANISH,
        create_project,
        create_translation,
    };

    fn key<'db>(db: &'db LinguistDatabaseImpl, source: &str) -> MessageKey<'db> {
        MessageKey::new(db, "AddressBookPage".to_string(), source.to_string(), None)
    }

    #[googletest::test]
    fn find_definitions_in_sibling_locale() {
        let db = LinguistDatabaseImpl::default();
        let files = create_project(&db);

        let locations = find_definitions(&db, key(&db, "&Copy"), files[0], &files);

        expect_that!(locations.len(), eq(1));
        expect_that!(locations[0].uri.path(), eq("/ws/locale/bitcoin_sv.ts"));
        expect_that!(
            locations[0].range,
            eq(Range {
                start: Position { line: 10, character: 8 },
                end: Position { line: 10, character: 34 },
            })
        );
    }

    #[googletest::test]
    fn find_definitions_skips_files_without_the_message() {
        let db = LinguistDatabaseImpl::default();
        let files = create_project(&db);

        let locations = find_definitions(&db, key(&db, "%n block(s)"), files[0], &files);

        expect_that!(locations, is_empty());
    }

    #[googletest::test]
    fn find_definitions_stays_in_project() {
        let db = LinguistDatabaseImpl::default();
        let mut files = create_project(&db);
        files.push(create_translation(&db, "/ws/qt/qtbase_da.ts", DANISH));

        let locations = find_definitions(&db, key(&db, "Create a new address"), files[0], &files);

        let paths: Vec<&str> = locations.iter().map(|l| l.uri.path()).collect();
        expect_that!(paths, elements_are![eq(&"/ws/locale/bitcoin_sv.ts")]);
    }
}
