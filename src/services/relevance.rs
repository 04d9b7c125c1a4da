/// Language affinity scoring and topic matching for candidate items.
///
/// Both heuristics work on `title + " " + author`. Weights and keyword lists
/// are tuned by hand and may change without affecting any invariant.
use crate::{
    models::CandidateItem,
    services::text::{normalize, tokenize, words},
};

const ACCENT_BONUS: u32 = 3;
const COMMON_WORD_BONUS: u32 = 2;
const STRONG_HINT_BONUS: u32 = 3;

/// Items scoring at or above this are treated as confidently Spanish
pub const PREFERRED_SCORE: u32 = 2;

const SPANISH_LETTERS: &[char] = &['á', 'é', 'í', 'ó', 'ú', 'ñ', 'ü'];

/// Frequent Spanish words, already in normalized form
const SPANISH_WORDS: &[&str] = &[
    "como", "que", "para", "por", "con", "sin", "en", "es", "son", "del", "al", "una", "uno",
    "unos", "unas", "el", "la", "los", "las", "hoy", "mejor", "nuevo", "guia", "explicado",
    "tutorial", "trucos", "consejos", "resena", "comparativa", "espanol", "latino", "latam",
];

const STRONG_HINTS: &[&str] = &["espanol", "latino", "latam"];

const FOOTBALL_TOPICS: &[&str] = &["futbol", "football", "soccer"];

const FOOTBALL_POSITIVE: &[&str] = &[
    "futbol", "football", "soccer", "gol", "goles", "partido", "liga", "champions", "mundial",
    "copa", "penal", "penales", "var", "messi", "ronaldo", "barcelona", "real madrid", "psg",
    "seleccion", "club", "derbi", "clasico",
];

const FOOTBALL_NEGATIVE: &[&str] = &[
    "iphone", "samsung", "review", "unboxing", "celular", "telefono", "smartphone", "regalos",
    "sorteo", "quiz", "trivia", "restor", "restore", "uriphone",
];

/// Heuristic score of how likely an item is Spanish-language content
pub fn spanish_affinity(item: &CandidateItem) -> u32 {
    let raw = item.search_text();
    let raw = raw.trim();
    let norm = normalize(raw);

    let mut score = 0;

    if raw
        .to_lowercase()
        .chars()
        .any(|c| SPANISH_LETTERS.contains(&c))
    {
        score += ACCENT_BONUS;
    }

    if words(&norm).any(|w| SPANISH_WORDS.contains(&w)) {
        score += COMMON_WORD_BONUS;
    }

    if STRONG_HINTS.iter().any(|hint| norm.contains(hint)) {
        score += STRONG_HINT_BONUS;
    }

    score
}

/// Stable sort by descending affinity
pub fn rank_by_affinity(items: Vec<CandidateItem>) -> Vec<CandidateItem> {
    let mut scored: Vec<(u32, CandidateItem)> = items
        .into_iter()
        .map(|item| (spanish_affinity(&item), item))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

/// Predicate deciding whether an item is about the requested topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicMatcher {
    /// Curated keyword lists; a negative hit overrides any positive one
    Football,
    /// At least `needed` of the topic tokens must appear
    Tokens { tokens: Vec<String>, needed: usize },
    /// Topic had no usable tokens; match the whole normalized phrase
    Phrase(String),
}

impl TopicMatcher {
    pub fn new(topic_raw: &str) -> Self {
        let topic = normalize(topic_raw);

        if FOOTBALL_TOPICS.iter().any(|t| topic.contains(t)) {
            return TopicMatcher::Football;
        }

        let tokens = tokenize(topic_raw);
        if tokens.is_empty() {
            return TopicMatcher::Phrase(topic);
        }

        let needed = if tokens.len() >= 3 { 2 } else { 1 };
        TopicMatcher::Tokens { tokens, needed }
    }

    pub fn matches(&self, item: &CandidateItem) -> bool {
        let text = normalize(&item.search_text());

        match self {
            TopicMatcher::Football => {
                let positive = FOOTBALL_POSITIVE.iter().any(|k| text.contains(k));
                let negative = FOOTBALL_NEGATIVE.iter().any(|k| text.contains(k));
                positive && !negative
            }
            TopicMatcher::Tokens { tokens, needed } => {
                let mut hits = 0;
                for token in tokens {
                    if text.contains(token.as_str()) {
                        hits += 1;
                    }
                    if hits >= *needed {
                        return true;
                    }
                }
                false
            }
            TopicMatcher::Phrase(topic) => text.contains(topic.as_str()),
        }
    }
}
