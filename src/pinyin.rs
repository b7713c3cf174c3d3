//! Numbered pinyin to tone-marked pinyin
//!
//! `"mei2guan1xi5"` becomes `"méiguānxi"`. A syllable's vowel cluster takes
//! the mark on `a` or `e` when present, on the `o` of `ou`, and otherwise on
//! its last vowel. Tones 5 and 0 are neutral and carry no mark.

use regex::{Captures, Regex};
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static SYLLABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([aeiouüvÜ]{1,3})(n?g?r?)([012345])").expect("Invalid pinyin syllable regex")
});

/// Tone-marked forms of a vowel, tones 1 through 4
fn tone_marks(vowel: char) -> Option<[char; 4]> {
    Some(match vowel {
        'a' => ['ā', 'á', 'ǎ', 'à'],
        'e' => ['ē', 'é', 'ě', 'è'],
        'i' => ['ī', 'í', 'ǐ', 'ì'],
        'o' => ['ō', 'ó', 'ǒ', 'ò'],
        'u' => ['ū', 'ú', 'ǔ', 'ù'],
        'ü' => ['ǖ', 'ǘ', 'ǚ', 'ǜ'],
        'A' => ['Ā', 'Á', 'Ǎ', 'À'],
        'E' => ['Ē', 'É', 'Ě', 'È'],
        'I' => ['Ī', 'Í', 'Ǐ', 'Ì'],
        'O' => ['Ō', 'Ó', 'Ǒ', 'Ò'],
        'U' => ['Ū', 'Ú', 'Ǔ', 'Ù'],
        'Ü' => ['Ǖ', 'Ǘ', 'Ǚ', 'Ǜ'],
        _ => return None,
    })
}

/// Index of the vowel taking the tone mark
fn tone_position(vowels: &[char]) -> usize {
    let lower: Vec<char> = vowels.iter().flat_map(|c| c.to_lowercase()).collect();

    if lower == ['o', 'u'] {
        return 0;
    }

    lower
        .iter()
        .position(|&c| c == 'a')
        .or_else(|| lower.iter().position(|&c| c == 'e'))
        .unwrap_or(vowels.len().saturating_sub(1))
}

fn render_syllable(caps: &Captures<'_>) -> String {
    let vowels: Vec<char> = caps[1]
        .chars()
        .map(|c| match c {
            'v' => 'ü',
            'V' => 'Ü',
            other => other,
        })
        .collect();
    let tone = caps[3].parse::<usize>().unwrap_or(0) % 5;

    let mut out = String::with_capacity(caps[0].len() + 2);
    if tone == 0 {
        out.extend(vowels.iter());
    } else {
        let pos = tone_position(&vowels);
        for (i, &c) in vowels.iter().enumerate() {
            let marked = if i == pos {
                tone_marks(c).map_or(c, |marks| marks[tone - 1])
            } else {
                c
            };
            out.push(marked);
        }
    }
    out.push_str(&caps[2]);
    out
}

/// Convert numbered pinyin to tone-marked pinyin
///
/// Text outside recognized syllables is copied through unchanged.
pub fn to_tone_marks(numbered: &str) -> String {
    SYLLABLE.replace_all(numbered, render_syllable).into_owned()
}
