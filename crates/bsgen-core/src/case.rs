//! Identifier case conversion.
//!
//! A name is first split into lowercase word tokens and then re-joined in the
//! requested [`Case`]. Tokenizing the output of any token-based case yields the
//! same tokens again, so conversions are idempotent.
//!
//! # Examples
//!
//! ```
//! use bsgen_core::case::{tokenize, Case};
//!
//! assert_eq!(tokenize("koala-bear"), vec!["koala", "bear"]);
//! assert_eq!(Case::Pascal.apply("koala-bear"), "KoalaBear");
//! assert_eq!(Case::Constant.apply("koalaBear"), "KOALA_BEAR");
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

/// Identifier casing conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    /// koalaBear
    Camel,
    /// KoalaBear
    Pascal,
    /// koala_bear
    Snake,
    /// KOALA_BEAR
    Constant,
    /// koala-bear
    Kebab,
    /// koala bear
    Words,
    /// The whole input lower-cased
    Lower,
    /// The whole input upper-cased
    Upper,
    /// The first character upper-cased, the rest untouched
    Capitalize,
}

impl Case {
    /// Returns the helper name used for this case inside placeholders
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Camel => "camel",
            Self::Pascal => "pascal",
            Self::Snake => "snake",
            Self::Constant => "constant",
            Self::Kebab => "kebab",
            Self::Words => "words",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::Capitalize => "capitalize",
        }
    }

    /// Returns an iterator over all cases
    pub fn all() -> impl Iterator<Item = Self> {
        use Case::*;
        [
            Camel, Pascal, Snake, Constant, Kebab, Words, Lower, Upper, Capitalize,
        ]
        .into_iter()
    }

    /// Whether the conversion goes through [`tokenize`]
    pub fn is_token_based(&self) -> bool {
        !matches!(self, Self::Lower | Self::Upper | Self::Capitalize)
    }

    /// Convert `input` to this case
    pub fn apply(&self, input: &str) -> String {
        match self {
            Self::Lower => input.to_lowercase(),
            Self::Upper => input.to_uppercase(),
            Self::Capitalize => capitalize(input),
            _ => join(&tokenize(input), *self),
        }
    }
}

impl FromStr for Case {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Case::all()
            .find(|case| case.as_str() == s)
            .ok_or_else(|| format!("Unknown case: {}", s))
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Split an identifier into lowercase word tokens.
///
/// Inputs containing any non-alphanumeric character are split on runs of such
/// separators (`koala-bear`, `koala_bear`, `koala bear`). Otherwise the input is
/// split in front of every uppercase letter (`koalaBear`, `KoalaBear`).
pub fn tokenize(input: &str) -> Vec<String> {
    let has_separator = input.chars().any(|ch| !ch.is_alphanumeric());

    let words: Vec<&str> = if has_separator {
        input.split(|ch: char| !ch.is_alphanumeric()).collect()
    } else {
        split_before_uppercase(input)
    };

    words
        .into_iter()
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn split_before_uppercase(input: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    for (index, ch) in input.char_indices() {
        if ch.is_uppercase() && index > start {
            words.push(&input[start..index]);
            start = index;
        }
    }
    words.push(&input[start..]);
    words
}

/// Join tokens according to a token-based case.
///
/// `Lower`, `Upper` and `Capitalize` operate on whole strings; given tokens they
/// fall back to the words form with the corresponding transform applied.
pub fn join<S: AsRef<str>>(tokens: &[S], case: Case) -> String {
    let tokens = tokens.iter().map(AsRef::as_ref);
    match case {
        Case::Camel => tokens
            .enumerate()
            .map(|(i, token)| {
                if i == 0 {
                    token.to_string()
                } else {
                    capitalize(token)
                }
            })
            .collect(),
        Case::Pascal => tokens.map(capitalize).collect(),
        Case::Snake => tokens.collect::<Vec<_>>().join("_"),
        Case::Constant => tokens.collect::<Vec<_>>().join("_").to_uppercase(),
        Case::Kebab => tokens.collect::<Vec<_>>().join("-"),
        Case::Words => tokens.collect::<Vec<_>>().join(" "),
        Case::Lower | Case::Upper | Case::Capitalize => {
            case.apply(&tokens.collect::<Vec<_>>().join(" "))
        }
    }
}

/// Upper-case the first character and keep the rest as is
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
