//! English helpers for placeholder names and diagnostics.

/// Suffix table for [`singular`], checked in order. First match wins.
const PLURAL_SUFFIXES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("sses", "ss"),
    ("xes", "x"),
    ("s", ""),
];

/// Strip an English plural suffix from `word`, reporting whether one was
/// found. `%players%` reads as a plural `player` slot; `%glass%` stays as
/// it is.
pub(crate) fn singular(word: &str) -> (String, bool) {
    for (suffix, replacement) in PLURAL_SUFFIXES {
        if let Some(base) = word.strip_suffix(suffix) {
            if base.is_empty() || (word.ends_with("ss") && *suffix == "s") {
                continue;
            }
            return (format!("{base}{replacement}"), true);
        }
    }
    (word.to_string(), false)
}

/// Prefix `noun` with its indefinite article.
pub(crate) fn with_article(noun: &str) -> String {
    let article = match noun.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u' | 'A' | 'E' | 'I' | 'O' | 'U') => "an",
        _ => "a",
    };
    format!("{article} {noun}")
}
