//! Arabic text canonicalization.
//!
//! Reference verses and transcribed utterances both pass through [`normalize`]
//! before any comparison. The fold is lossy: tashkeel is dropped and letters that
//! speech-to-text output routinely confuses are collapsed to one form.

use std::sync::LazyLock;

use icu_normalizer::{ComposingNormalizerBorrowed, DecomposingNormalizerBorrowed};
use regex::Regex;

const TATWEEL: char = '\u{0640}';
const ALIF: char = '\u{0627}';
const HEH: char = '\u{0647}';
const YEH: char = '\u{064A}';
const KAF: char = '\u{0643}';

/// Harakat, tanween, shadda, sukun, superscript alif and the Quranic annotation marks.
pub fn is_diacritic(ch: char) -> bool {
    matches!(
        ch,
        '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{0670}'
            | '\u{06D6}'..='\u{06ED}'
            | '\u{08D3}'..='\u{08FF}'
    ) || ch == TATWEEL
}

// Unicode punctuation (`\p{P}`) plus ASCII symbols such as `$`, `+` and `|`.
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{P}[:punct:]]").expect("punctuation pattern compiles"));

fn fold_letter(ch: char) -> char {
    match ch {
        // آ أ إ ٱ and the wavy-hamza alifs
        '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' | '\u{0672}' | '\u{0673}' => ALIF,
        // ة
        '\u{0629}' => HEH,
        // ى, Farsi yeh, yeh barree
        '\u{0649}' | '\u{06CC}' | '\u{06D2}' => YEH,
        // Farsi keheh
        '\u{06A9}' => KAF,
        _ => ch,
    }
}

/// Canonical comparison form: diacritics stripped, punctuation treated as
/// whitespace, lowercased, orthographic variants folded, whitespace collapsed.
///
/// Text is decomposed (NFKD) before marks are stripped and recomposed (NFKC)
/// last, so a second pass finds nothing left to strip or merge.
pub fn normalize(text: &str) -> String {
    let decomposed = DecomposingNormalizerBorrowed::new_nfkd().normalize(text);
    let spaced = PUNCTUATION.replace_all(&decomposed, " ");

    let mut folded = String::with_capacity(spaced.len());
    for ch in spaced.chars() {
        if is_diacritic(ch) {
            continue;
        }
        folded.extend(ch.to_lowercase().map(fold_letter));
    }

    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    ComposingNormalizerBorrowed::new_nfkc()
        .normalize(&collapsed)
        .into_owned()
}

/// Split already-normalized text into words.
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(str::to_string).collect()
}
