use analysis_core::{HeadlineSet, NewsSentiment, SentimentLabel, SentimentReport};

/// Headline polarity by lower-case substring containment against two fixed keyword lists.
///
/// Each headline contributes +1 if it contains any positive keyword and -1 if it contains any
/// negative keyword; a headline matching both contributes both.
pub struct SentimentAnalysisEngine {
    positive_words: Vec<String>,
    negative_words: Vec<String>,
}

// Inflected forms where the bare stem sits inside common words
// ("gain" and "gains" in "against", "rise" in "enterprise", "miss" in "commission").
const POSITIVE_WORDS: &[&str] = &[
    "surge", "soar", "jump", "rally", "gained", "gaining", "beat", "record", "upgrade",
    "growth", "profit", "strong", "bullish", "outperform", "buy", "rises", "rising",
    "boost", "expand", "breakthrough", "dividend", "buyback", "optimis",
];

const NEGATIVE_WORDS: &[&str] = &[
    "plunge", "drop", "fall", "slump", "misses", "missed", "downgrade", "loss", "lawsuit",
    "probe", "weak", "bearish", "decline", "crash", "sell", "warns", "warned", "warning",
    "layoff", "recall", "investigation", "bankrupt", "fraud", "pessimis",
];

fn lowercase_all<S: AsRef<str>>(words: impl IntoIterator<Item = S>) -> Vec<String> {
    words.into_iter().map(|w| w.as_ref().to_lowercase()).collect()
}

impl SentimentAnalysisEngine {
    pub fn new() -> Self {
        Self::with_lexicon(POSITIVE_WORDS.iter().copied(), NEGATIVE_WORDS.iter().copied())
    }

    /// Engine with caller-supplied keyword lists, lower-cased on the way in
    pub fn with_lexicon<P, N>(positive_words: impl IntoIterator<Item = P>, negative_words: impl IntoIterator<Item = N>) -> Self
    where
        P: AsRef<str>,
        N: AsRef<str>,
    {
        Self {
            positive_words: lowercase_all(positive_words),
            negative_words: lowercase_all(negative_words),
        }
    }

    /// (contains a positive keyword, contains a negative keyword)
    pub fn analyze_headline(&self, headline: &str) -> (bool, bool) {
        let text = headline.to_lowercase();
        let positive = self.positive_words.iter().any(|w| text.contains(w.as_str()));
        let negative = self.negative_words.iter().any(|w| text.contains(w.as_str()));
        (positive, negative)
    }

    /// Classify a headline set. Never returns `NewsSentiment::Unavailable`.
    pub fn classify(&self, headlines: &HeadlineSet) -> NewsSentiment {
        if headlines.is_empty() {
            return NewsSentiment::NoHeadlines;
        }

        let mut polarity: i32 = 0;
        let mut positive_headlines = 0;
        let mut negative_headlines = 0;

        for headline in headlines.iter() {
            let (positive, negative) = self.analyze_headline(headline);
            if positive {
                polarity += 1;
                positive_headlines += 1;
            }
            if negative {
                polarity -= 1;
                negative_headlines += 1;
            }
        }

        let label = if polarity > 0 {
            SentimentLabel::Positive
        } else if polarity < 0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        tracing::debug!(
            "Classified {} headlines: polarity {} ({} positive, {} negative)",
            headlines.len(), polarity, positive_headlines, negative_headlines
        );

        NewsSentiment::Classified(SentimentReport {
            label,
            polarity,
            positive_headlines,
            negative_headlines,
            headline_count: headlines.len(),
        })
    }
}

impl Default for SentimentAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
