//! Singular/plural lookup for identifiers.
//!
//! The dictionary work is done by `Inflector`. Identifiers are compound words
//! though, so only the last word is inflected and its casing is restored
//! afterwards: `koalaBear` → `koalaBears`, `KOALA_BEAR` → `KOALA_BEARS`.

use inflector::string::{pluralize::to_plural, singularize::to_singular};

/// Plural form of the identifier's last word
pub fn plural(word: &str) -> String {
    inflect_last_word(word, to_plural)
}

/// Singular form of the identifier's last word
pub fn singular(word: &str) -> String {
    inflect_last_word(word, to_singular)
}

/// The singular form case variants of `word` are derived from.
///
/// Singularizing a word that is already singular is lossy (`campus` would
/// become `campu`), so `word` is only singularized when it is its own plural.
pub fn singular_form(word: &str) -> String {
    if plural(word) == word {
        singular(word)
    } else {
        word.to_string()
    }
}

/// Whether the singular and plural forms of `word` differ
pub fn has_distinct_plural(word: &str) -> bool {
    singular_form(word) != plural(word)
}

fn inflect_last_word(word: &str, inflect: fn(&str) -> String) -> String {
    let (head, last) = split_last_word(word);
    if last.is_empty() {
        return word.to_string();
    }

    let inflected = inflect(&last.to_lowercase());
    let restored = if is_all_uppercase(last) && last.chars().count() > 1 {
        inflected.to_uppercase()
    } else if last.chars().next().is_some_and(char::is_uppercase) {
        crate::case::capitalize(&inflected)
    } else {
        inflected
    };

    format!("{}{}", head, restored)
}

/// Split off the last word of an identifier.
///
/// The last word is the trailing alphanumeric run. Inside a mixed-case run it
/// starts at the last uppercase letter, so camel and Pascal compounds keep
/// their head intact.
fn split_last_word(word: &str) -> (&str, &str) {
    let start = word
        .char_indices()
        .rev()
        .find(|(_, ch)| !ch.is_alphanumeric())
        .map(|(index, ch)| index + ch.len_utf8())
        .unwrap_or(0);
    let segment = &word[start..];

    if segment.chars().any(char::is_lowercase) {
        if let Some((index, _)) = segment.char_indices().rev().find(|(_, ch)| ch.is_uppercase()) {
            return word.split_at(start + index);
        }
    }
    word.split_at(start)
}

fn is_all_uppercase(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}
