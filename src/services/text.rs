use unicode_normalization::UnicodeNormalization;

/// Minimum length (in characters) for a topic token to count
pub const MIN_TOKEN_LEN: usize = 3;

/// Lowercases, strips diacritics and trims.
///
/// Diacritics are removed by NFD-decomposing and dropping the combining
/// marks in U+0300..=U+036F, so "Fútbol" and "futbol" compare equal.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

fn is_token_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '/' | '_' | ',' | '.' | '-')
}

/// Splits a normalized topic into tokens of at least `MIN_TOKEN_LEN` characters
pub fn tokenize(topic: &str) -> Vec<String> {
    normalize(topic)
        .split(is_token_separator)
        .map(str::trim)
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Splits already-normalized text into alphanumeric words
pub fn words(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}
