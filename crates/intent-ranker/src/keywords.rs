//! Goal keyword extraction

use unicode_segmentation::UnicodeSegmentation;

/// Turns free-text goals into the keywords links are matched against.
#[derive(Clone)]
pub struct GoalKeywordExtractor {
    stop_words: Vec<&'static str>,
}

impl GoalKeywordExtractor {
    pub fn new() -> Self {
        Self {
            stop_words: common_stop_words(),
        }
    }

    /// Lower-cased tokens longer than two characters, stop words removed,
    /// first occurrence order kept.
    pub fn extract(&self, goal: &str) -> Vec<String> {
        let lowered = goal.to_lowercase();
        let mut keywords: Vec<String> = Vec::new();
        for word in lowered.unicode_words() {
            if word.chars().count() <= 2 || self.stop_words.contains(&word) {
                continue;
            }
            if !keywords.iter().any(|existing| existing == word) {
                keywords.push(word.to_string());
            }
        }
        keywords
    }
}

impl Default for GoalKeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Crude suffix folding so "company" and "companies" meet on "compan".
pub fn keyword_stem(word: &str) -> &str {
    let len = word.len();
    if len > 4 && word.ends_with("ies") {
        &word[..len - 3]
    } else if len > 5 && word.ends_with("sses") {
        &word[..len - 2]
    } else if len > 3 && word.ends_with('s') && !word.ends_with("ss") {
        &word[..len - 1]
    } else if len > 4 && word.ends_with('y') {
        &word[..len - 1]
    } else {
        word
    }
}

fn common_stop_words() -> Vec<&'static str> {
    vec![
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "this", "but",
        "they", "have", "had", "what", "when", "where", "who", "which", "why", "how", "all",
        "any", "can", "get", "into", "our", "out", "some", "than", "then", "there", "these",
        "their", "them", "you", "your", "please", "want", "need",
    ]
}
