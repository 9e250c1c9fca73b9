//! Locale plural rules (numerus forms).
//!
//! The number of forms a numerus message needs depends on the locale. Rules
//! are grouped in families the same way Qt's `lrelease` groups them; a
//! family fixes both the form count and the count → form selection.

/// A locale tag split into language and optional territory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleTag {
    /// Lowercase language code, e.g. `pt`.
    pub language: String,
    /// Uppercase territory code, e.g. `BR`.
    pub territory: Option<String>,
}

impl LocaleTag {
    /// Parses `da`, `pt_BR`, `pt-BR`, `sr_Latn_RS` (script is ignored).
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let mut parts = tag.trim().split(['_', '-']).filter(|part| !part.is_empty());
        let language = parts.next()?;
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return None;
        }
        let territory = parts
            .find(|part| {
                (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
                    || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
            })
            .map(str::to_ascii_uppercase);

        Some(Self { language: language.to_ascii_lowercase(), territory })
    }
}

impl std::fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.territory {
            Some(territory) => write!(f, "{}_{territory}", self.language),
            None => f.write_str(&self.language),
        }
    }
}

/// Plural rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralRule {
    /// No plural distinction (Japanese, Chinese, Turkish, ...).
    Japanese,
    /// `n == 1` singular (English, Danish, Swedish, Portuguese, ...).
    English,
    /// `n <= 1` singular (French, Brazilian Portuguese, ...).
    French,
    Icelandic,
    Latvian,
    Irish,
    Czech,
    Macedonian,
    Lithuanian,
    Russian,
    Polish,
    Romanian,
    Tagalog,
    Slovenian,
    Maltese,
    Welsh,
    Arabic,
}

/// Languages grouped by rule family.
const RULE_TABLE: &[(PluralRule, &[&str])] = &[
    (
        PluralRule::Japanese,
        &[
            "bi", "bo", "dz", "fa", "fj", "gn", "hu", "id", "ja", "jv", "km", "ko", "lo", "ms",
            "my", "na", "om", "su", "th", "tr", "tt", "vi", "yo", "za", "zh",
        ],
    ),
    (
        PluralRule::English,
        &[
            "af", "am", "as", "az", "bg", "bn", "ca", "da", "de", "el", "en", "eo", "es", "et",
            "eu", "fi", "fo", "fy", "gl", "gu", "ha", "he", "hi", "ia", "it", "ka", "kk", "kl",
            "kn", "ks", "ku", "ky", "lb", "ml", "mn", "mr", "nb", "ne", "nl", "nn", "no", "oc",
            "or", "pa", "ps", "pt", "qu", "rm", "so", "sq", "sv", "sw", "ta", "te", "tk", "tn",
            "ug", "ur", "uz", "xh", "yi", "zu",
        ],
    ),
    (PluralRule::French, &["br", "fil", "fr", "hy", "ti", "wa"]),
    (PluralRule::Icelandic, &["is"]),
    (PluralRule::Latvian, &["lv"]),
    (PluralRule::Irish, &["ga"]),
    (PluralRule::Czech, &["cs", "sk"]),
    (PluralRule::Macedonian, &["mk"]),
    (PluralRule::Lithuanian, &["lt"]),
    (PluralRule::Russian, &["be", "bs", "hr", "ru", "sr", "uk"]),
    (PluralRule::Polish, &["pl"]),
    (PluralRule::Romanian, &["mo", "ro"]),
    (PluralRule::Tagalog, &["tl"]),
    (PluralRule::Slovenian, &["sl"]),
    (PluralRule::Maltese, &["mt"]),
    (PluralRule::Welsh, &["cy"]),
    (PluralRule::Arabic, &["ar"]),
];

impl PluralRule {
    /// Rule for a locale tag, or `None` for languages not in the table.
    #[must_use]
    pub fn for_locale(tag: &str) -> Option<Self> {
        let locale = LocaleTag::parse(tag)?;

        // Brazilian Portuguese treats 0 as singular.
        if locale.language == "pt" && locale.territory.as_deref() == Some("BR") {
            return Some(Self::French);
        }

        RULE_TABLE
            .iter()
            .find(|(_, languages)| languages.contains(&locale.language.as_str()))
            .map(|(rule, _)| *rule)
    }

    /// Number of numerus forms a translation must provide.
    #[must_use]
    pub const fn form_count(self) -> usize {
        match self {
            Self::Japanese => 1,
            Self::English | Self::French | Self::Icelandic => 2,
            Self::Latvian
            | Self::Irish
            | Self::Czech
            | Self::Macedonian
            | Self::Lithuanian
            | Self::Russian
            | Self::Polish
            | Self::Romanian
            | Self::Tagalog => 3,
            Self::Slovenian | Self::Maltese | Self::Welsh => 4,
            Self::Arabic => 6,
        }
    }

    /// Index of the form used for count `n`.
    #[must_use]
    pub fn form_index(self, n: u64) -> usize {
        let mod10 = n % 10;
        let mod100 = n % 100;
        let not_teen = !(10..20).contains(&mod100);

        match self {
            Self::Japanese => 0,
            Self::English => usize::from(n != 1),
            Self::French => usize::from(n > 1),
            Self::Icelandic => usize::from(!(mod10 == 1 && mod100 != 11)),
            Self::Latvian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if n != 0 {
                    1
                } else {
                    2
                }
            }
            Self::Irish => match n {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Czech => match n {
                1 => 0,
                2..=4 => 1,
                _ => 2,
            },
            Self::Macedonian => match mod10 {
                1 => 0,
                2 => 1,
                _ => 2,
            },
            Self::Lithuanian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if mod10 >= 2 && not_teen {
                    1
                } else {
                    2
                }
            }
            Self::Russian => {
                if mod10 == 1 && mod100 != 11 {
                    0
                } else if (2..=4).contains(&mod10) && not_teen {
                    1
                } else {
                    2
                }
            }
            Self::Polish => {
                if n == 1 {
                    0
                } else if (2..=4).contains(&mod10) && not_teen {
                    1
                } else {
                    2
                }
            }
            Self::Romanian => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&mod100) {
                    1
                } else {
                    2
                }
            }
            Self::Tagalog => {
                if n <= 1 {
                    0
                } else if mod10 == 4 || mod10 == 6 || mod10 == 9 {
                    1
                } else {
                    2
                }
            }
            Self::Slovenian => match mod100 {
                1 => 0,
                2 => 1,
                3 | 4 => 2,
                _ => 3,
            },
            Self::Maltese => {
                if n == 1 {
                    0
                } else if n == 0 || (1..=10).contains(&mod100) {
                    1
                } else if (11..=19).contains(&mod100) {
                    2
                } else {
                    3
                }
            }
            Self::Welsh => match n {
                1 => 0,
                2 => 1,
                8 | 11 => 2,
                _ => 3,
            },
            Self::Arabic => match (n, mod100) {
                (0, _) => 0,
                (1, _) => 1,
                (2, _) => 2,
                (_, 3..=10) => 3,
                (_, 11..) => 4,
                _ => 5,
            },
        }
    }
}

/// Expected numerus form count for a locale, honoring user overrides.
#[must_use]
pub fn expected_form_count(
    language: &str,
    overrides: &std::collections::BTreeMap<String, usize>,
) -> Option<usize> {
    if let Some(count) = overrides.get(language) {
        return Some(*count);
    }
    if let Some(locale) = LocaleTag::parse(language)
        && let Some(count) = overrides.get(&locale.language)
    {
        return Some(*count);
    }
    PluralRule::for_locale(language).map(PluralRule::form_count)
}
