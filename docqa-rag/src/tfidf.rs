//! TF-IDF vectorizer over a single document's chunk set.
//!
//! Weighting follows the common smoothed formulation:
//!
//! - tokens are lowercased runs of two or more word characters
//! - `tf` is the raw count of a term in one text
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
//! - each vector is scaled to unit length
//!
//! Term ids are assigned in lexicographic order, so fitting the same corpus
//! twice produces identical vectors.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::embedding::{Embedder, SparseVector, Vectorizer};
use crate::error::{RagError, Result};

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("token pattern is a valid regex"));

/// scikit-learn's `ENGLISH_STOP_WORDS` (318 words).
static ENGLISH_STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
        "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
        "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
        "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
        "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
        "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
        "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
        "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
        "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
        "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
        "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
        "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
        "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its", "itself",
        "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many", "may",
        "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most", "mostly",
        "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
        "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
        "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
        "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
        "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
        "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
        "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
        "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than",
        "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
        "thereby", "therefore", "therein", "thereupon", "these", "they", "thick", "thin",
        "third", "this", "those", "though", "three", "through", "throughout", "thru", "thus",
        "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two", "un",
        "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
        "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
        "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
        "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
        "would", "yet", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Split text into lowercased tokens, optionally dropping English stop words.
pub fn tokenize(text: &str, remove_stop_words: bool) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !remove_stop_words || !ENGLISH_STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// A [`Vectorizer`] producing smoothed TF-IDF [`TfIdfModel`]s.
#[derive(Debug, Clone, Copy)]
pub struct TfIdfVectorizer {
    remove_stop_words: bool,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self { remove_stop_words: true }
    }
}

impl TfIdfVectorizer {
    /// Create a vectorizer that removes English stop words.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable English stop-word removal.
    pub fn with_stop_words(mut self, remove: bool) -> Self {
        self.remove_stop_words = remove;
        self
    }

    /// Fit a concrete [`TfIdfModel`] on `corpus`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] if the corpus is empty.
    pub fn fit_model(&self, corpus: &[&str]) -> Result<TfIdfModel> {
        if corpus.is_empty() {
            return Err(RagError::EmptyIndex);
        }

        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for text in corpus {
            let unique: HashSet<String> = tokenize(text, self.remove_stop_words).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        let n = corpus.len() as f32;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (id, (term, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term, id as u32);
            idf.push(((1.0 + n) / (1.0 + df as f32)).ln() + 1.0);
        }

        debug!(documents = corpus.len(), vocabulary_size = idf.len(), "fitted tf-idf vocabulary");

        Ok(TfIdfModel { vocabulary, idf, remove_stop_words: self.remove_stop_words })
    }
}

impl Vectorizer for TfIdfVectorizer {
    fn fit(&self, corpus: &[&str]) -> Result<Box<dyn Embedder>> {
        Ok(Box::new(self.fit_model(corpus)?))
    }
}

/// A fitted TF-IDF vocabulary with per-term inverse document frequencies.
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
    remove_stop_words: bool,
}

impl TfIdfModel {
    /// Term id for `term`, if it is in the vocabulary.
    pub fn term_id(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }

    /// Inverse document frequency of `term`, if it is in the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_id(term).map(|id| self.idf[id as usize])
    }
}

impl Embedder for TfIdfModel {
    fn embed(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<u32, f32> = HashMap::new();
        for token in tokenize(text, self.remove_stop_words) {
            if let Some(id) = self.term_id(&token) {
                *counts.entry(id).or_default() += 1.0;
            }
        }

        let entries = counts.into_iter().map(|(id, tf)| (id, tf * self.idf[id as usize])).collect();
        let mut vector = SparseVector::from_entries(entries);
        vector.normalize();
        vector
    }

    fn dimensions(&self) -> usize {
        self.idf.len()
    }
}
