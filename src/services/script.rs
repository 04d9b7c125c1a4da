/// Detection of non-Latin writing systems.
///
/// This is a script-level proxy for "probably not Spanish": it looks at code
/// points, not at language. Latin-script text in other languages passes.
use std::ops::RangeInclusive;

const NON_LATIN_RANGES: &[RangeInclusive<char>] = &[
    // Arabic, Arabic Supplement, Arabic Extended-A
    '\u{0600}'..='\u{06FF}',
    '\u{0750}'..='\u{077F}',
    '\u{08A0}'..='\u{08FF}',
    // Hebrew
    '\u{0590}'..='\u{05FF}',
    // Cyrillic
    '\u{0400}'..='\u{04FF}',
    // Devanagari
    '\u{0900}'..='\u{097F}',
    // Thai
    '\u{0E00}'..='\u{0E7F}',
    // Hiragana, Katakana
    '\u{3040}'..='\u{30FF}',
    // CJK Unified Ideographs
    '\u{4E00}'..='\u{9FFF}',
    // Hangul Syllables
    '\u{AC00}'..='\u{D7AF}',
];

/// True when any character falls in one of the excluded script ranges
pub fn has_non_latin_script(text: &str) -> bool {
    text.chars()
        .any(|c| NON_LATIN_RANGES.iter().any(|range| range.contains(&c)))
}
