use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Abbreviations that end in a period without ending the sentence.
pub const DEFAULT_ABBREVIATIONS: [&str; 24] = [
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "e.g", "i.e", "fig", "figs",
    "approx", "dept", "inc", "ltd", "corp", "gen", "col", "lt", "sgt", "rev", "hon",
];

pub trait SentenceSplitter {
    /// Splits text into trimmed, non-empty sentences in reading order.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Sentence boundaries from UAX #29, with abbreviation repair on top.
///
/// Single-letter initials are not rejoined by default since "option B." or "I." end
/// real sentences; add letters to the abbreviation list to join them.
#[derive(Debug, Clone)]
pub struct UnicodeSentenceSplitter {
    abbreviations: HashSet<String>,
}

impl Default for UnicodeSentenceSplitter {
    fn default() -> Self {
        Self::with_abbreviations(DEFAULT_ABBREVIATIONS)
    }
}

impl UnicodeSentenceSplitter {
    pub fn with_abbreviations<I, S>(abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            abbreviations: abbreviations
                .into_iter()
                .map(|abbreviation| {
                    abbreviation
                        .as_ref()
                        .trim_end_matches('.')
                        .to_ascii_lowercase()
                })
                .collect(),
        }
    }

    fn ends_with_abbreviation(&self, sentence: &str) -> bool {
        let Some(last_token) = sentence.split_whitespace().last() else {
            return false;
        };
        let Some(stem) = last_token.strip_suffix('.') else {
            return false;
        };
        let stem = stem.trim_start_matches(|ch: char| !ch.is_alphanumeric());

        self.abbreviations.contains(&stem.to_ascii_lowercase())
    }
}

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut pending = String::new();

        for segment in text.unicode_sentences() {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            if !pending.is_empty() {
                pending.push(' ');
            }
            pending.push_str(segment);

            if !self.ends_with_abbreviation(&pending) {
                sentences.push(std::mem::take(&mut pending));
            }
        }

        if !pending.is_empty() {
            sentences.push(pending);
        }

        sentences
    }
}
