//! Vote-based human-language inference over text fragments
//!
//! Each fragment of a file (header, comments, docstrings, distinct strings
//! for code; the whole normalized text for prose) casts one vote. Votes are
//! not weighted by fragment length; the most frequent code wins and ties
//! break toward the code that appeared first in fragment order. A file with
//! no textual content defaults to English, on the rationale that program
//! source conventionally is.

use indexmap::IndexMap;

/// Language code returned when no fragment yields any text
pub const DEFAULT_LANGUAGE: &str = "en";

/// Infer the dominant language of a collection of fragments.
///
/// Returns a two-letter ISO 639-1 code where one exists for the detected
/// language, otherwise the detector's ISO 639-3 code.
pub fn majority_language<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut votes: IndexMap<String, usize> = IndexMap::new();
    for fragment in fragments {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        if let Some(info) = whatlang::detect(fragment) {
            *votes.entry(short_code(info.lang())).or_insert(0) += 1;
        }
    }

    // First-seen entry wins ties: strict comparison over insertion order.
    let mut best: Option<(&String, usize)> = None;
    for (code, count) in &votes {
        if best.map_or(true, |(_, n)| *count > n) {
            best = Some((code, *count));
        }
    }
    best.map(|(code, _)| code.clone())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Infer the language of a single block of text
pub fn human_language(text: &str) -> String {
    majority_language([text])
}

/// Map a detected language to its two-letter code
fn short_code(lang: whatlang::Lang) -> String {
    isolang::Language::from_639_3(lang.code())
        .and_then(|l| l.to_639_1())
        .map(str::to_string)
        .unwrap_or_else(|| lang.code().to_string())
}

/// Western-script languages for which plain-text cleanup is worthwhile.
///
/// Mirrors the gate the cleanup pipeline applies before rewriting
/// punctuation: non-Western text is passed through untouched.
pub fn is_western(code: &str) -> bool {
    matches!(
        code,
        "en" | "fr" | "cs" | "cu" | "cy" | "da" | "de" | "es" | "fi" | "ga" | "hu" | "hy"
            | "is" | "it" | "la" | "nb" | "nl" | "no" | "pl" | "pt" | "ro" | "sk" | "sl"
            | "sv" | "tr" | "uk" | "eo"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_defaults_to_english() {
        assert_eq!(majority_language([]), DEFAULT_LANGUAGE);
        assert_eq!(majority_language(["", "   ", "\n"]), DEFAULT_LANGUAGE);
    }

    #[test]
    fn detects_english_prose() {
        let text = "This module walks a directory tree and condenses every file \
                    it finds into a structured summary of its contents.";
        assert_eq!(human_language(text), "en");
    }

    #[test]
    fn majority_wins_over_minority() {
        let en1 = "The quick brown fox jumps over the lazy dog near the river bank.";
        let en2 = "Parsing failed for this file, so the record was returned empty.";
        let es = "El rápido zorro marrón salta sobre el perro perezoso junto al río.";
        assert_eq!(majority_language([en1, es, en2]), "en");
    }

    #[test]
    fn ties_break_toward_first_seen_fragment() {
        let es = "El rápido zorro marrón salta sobre el perro perezoso junto al río grande.";
        let en = "The quick brown fox jumps over the lazy dog near the river bank today.";
        // One vote each; Spanish appeared first.
        assert_eq!(majority_language([es, en]), "es");
    }

    #[test]
    fn codes_are_two_letter() {
        let de = "Der schnelle braune Fuchs springt über den faulen Hund am Flussufer entlang.";
        let code = human_language(de);
        assert_eq!(code.len(), 2, "expected ISO 639-1 code, got {code}");
    }
}
