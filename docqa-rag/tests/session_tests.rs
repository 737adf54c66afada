//! End-to-end session tests with a deterministic completion provider.

use std::sync::Arc;

use docqa_rag::{
    ChunkUnit, Embedder, FALLBACK_ANSWER, FileKind, MockCompletionProvider, RagConfig, RagError,
    RagSession, SparseVector, TfIdfVectorizer, Vectorizer,
};

const SKY: &str = "The sky is blue. The grass is green.";

fn session(config: RagConfig, mock: &Arc<MockCompletionProvider>) -> RagSession {
    RagSession::builder().config(config).completion_provider(mock.clone()).build().unwrap()
}

fn small_config() -> RagConfig {
    RagConfig::builder().chunk_size(20).chunk_overlap(5).top_k(3).build().unwrap()
}

/// Five chunks of 40 characters, each about a different topic.
fn five_topic_text() -> String {
    [
        "Volcanoes erupt molten lava and ash.....",
        "Penguins swim in cold antarctic seas....",
        "Bread dough rises with yeast and sugar..",
        "Comets orbit the sun with icy tails.....",
        "Violins have four strings and a bow.....",
    ]
    .concat()
}

#[tokio::test]
async fn test_reference_question_retrieves_sky_chunk() {
    let mock = Arc::new(MockCompletionProvider::new("The sky is blue."));
    let mut session = session(small_config(), &mock);

    let summary = session.build_index(SKY.as_bytes(), FileKind::Text).unwrap();
    assert_eq!(summary.chunk_count, 3);

    let answer = session.ask("What color is the sky?").await.unwrap();
    assert!(answer.grounded);
    assert_eq!(answer.text, "The sky is blue.");
    assert!(answer.sources[0].chunk.text.contains("sky is blue"));
    assert_eq!(mock.call_count(), 1);

    let request = mock.last_request().unwrap();
    assert!(request.user.contains("[Chunk 1]\nThe sky is blue. The"));
    assert!(request.user.contains("Question: What color is the sky?"));
}

#[tokio::test]
async fn test_top_k_over_five_chunks() {
    let mock = Arc::new(MockCompletionProvider::new("ok"));
    let config = RagConfig::builder().chunk_size(40).chunk_overlap(0).top_k(3).build().unwrap();
    let mut session = session(config, &mock);
    session.ingest_text(&five_topic_text(), "topics").unwrap();
    assert_eq!(session.chunks().len(), 5);

    let results = session.retrieve("Which comets have icy tails near the sun?", 3).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].chunk.index, 3);
    for window in results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
    for result in &results {
        assert!((0.0..=1.0).contains(&result.score));
    }
}

#[tokio::test]
async fn test_retrieve_returns_fewer_than_k_for_small_corpus() {
    let mock = Arc::new(MockCompletionProvider::new("ok"));
    let mut session = session(small_config(), &mock);
    session.ingest_text("tiny rust note", "note").unwrap();
    assert_eq!(session.retrieve("rust", 5).unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_overlap_query_falls_back_without_remote_call() {
    let mock = Arc::new(MockCompletionProvider::new("unused"));
    let mut session = session(small_config(), &mock);
    session.build_index(SKY.as_bytes(), FileKind::Text).unwrap();

    let answer = session.ask("Quelle heure est-il maintenant?").await.unwrap();
    assert_eq!(answer.text, FALLBACK_ANSWER);
    assert!(answer.sources.is_empty());
    assert!(!answer.grounded);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_retrieval_is_deterministic_across_builds() {
    let mock = Arc::new(MockCompletionProvider::new("ok"));
    let config = RagConfig::builder().chunk_size(40).chunk_overlap(10).build().unwrap();
    let text = five_topic_text();

    let mut first = session(config.clone(), &mock);
    first.ingest_text(&text, "a").unwrap();
    let mut second = session(config, &mock);
    second.ingest_text(&text, "a").unwrap();

    let query = "strings of a violin and penguins";
    assert_eq!(first.retrieve(query, 4).unwrap(), second.retrieve(query, 4).unwrap());
}

#[tokio::test]
async fn test_query_before_build_fails() {
    let mock = Arc::new(MockCompletionProvider::new("ok"));
    let mut session = session(small_config(), &mock);
    assert!(!session.is_ready());
    assert!(matches!(session.retrieve("sky", 3), Err(RagError::NoIndexBuilt)));
    assert!(matches!(session.ask("sky").await, Err(RagError::NoIndexBuilt)));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_docx_upload_rejected_and_index_kept() {
    let mock = Arc::new(MockCompletionProvider::new("ok"));
    let mut session = session(small_config(), &mock);
    session.upload("sky.txt", SKY.as_bytes()).unwrap();
    let before = session.summary().unwrap();

    let err = session.upload("report.docx", b"PK\x03\x04 word document").unwrap_err();
    assert!(matches!(err, RagError::UnsupportedFormat(_)));
    assert_eq!(session.summary().unwrap(), before);
    assert_eq!(before.source_name, "sky.txt");
}

#[tokio::test]
async fn test_failed_build_keeps_previous_index() {
    let mock = Arc::new(MockCompletionProvider::new("ok"));
    let mut session = session(small_config(), &mock);
    session.build_index(SKY.as_bytes(), FileKind::Text).unwrap();

    assert!(matches!(
        session.build_index(b"   \n", FileKind::Text),
        Err(RagError::EmptyDocument)
    ));
    assert!(matches!(
        session.build_index(b"not a pdf", FileKind::Pdf),
        Err(RagError::MalformedDocument(_))
    ));
    assert_eq!(session.chunks().len(), 3);
    assert!(!session.retrieve("sky", 1).unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_leaves_session_usable() {
    let failing = Arc::new(MockCompletionProvider::failing("connection reset"));
    let mut session = session(small_config(), &failing);
    session.build_index(SKY.as_bytes(), FileKind::Text).unwrap();

    let err = session.ask("What color is the sky?").await.unwrap_err();
    assert!(matches!(err, RagError::UpstreamError { .. }));
    assert!(session.transcript().is_empty());

    // The next question still runs, here through the fallback path.
    let answer = session.ask("zzz qqq").await.unwrap();
    assert_eq!(answer.text, FALLBACK_ANSWER);
    assert!(session.is_ready());
}

#[tokio::test]
async fn test_transcript_records_turns_and_resets_on_rebuild() {
    let mock = Arc::new(MockCompletionProvider::new("Green."));
    let mut session = session(small_config(), &mock);
    session.build_index(SKY.as_bytes(), FileKind::Text).unwrap();

    session.ask("What color is the grass?").await.unwrap();
    session.ask_with_top_k("grass", 1).await.unwrap();
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.transcript()[1].answer.sources.len(), 1);

    session.ingest_text("Another document entirely.", "other").unwrap();
    assert!(session.transcript().is_empty());
    assert_eq!(session.summary().unwrap().source_name, "other");
}

#[tokio::test]
async fn test_word_chunking_config() {
    let mock = Arc::new(MockCompletionProvider::new("ok"));
    let config = RagConfig::builder()
        .chunk_unit(ChunkUnit::Words)
        .chunk_size(4)
        .chunk_overlap(1)
        .build()
        .unwrap();
    let mut session = session(config, &mock);
    let summary = session.ingest_text("one two three four five six seven", "w").unwrap();
    assert_eq!(summary.chunk_count, 2);
    assert_eq!(session.chunks()[1].text, "four five six seven");
}

#[test]
fn test_builder_requires_provider() {
    assert!(matches!(RagSession::builder().build(), Err(RagError::ConfigError(_))));
}

#[tokio::test]
async fn test_exact_chunk_query_scores_at_most_one() {
    let mock = Arc::new(MockCompletionProvider::new("ok"));
    let config = RagConfig::builder().chunk_size(40).chunk_overlap(0).build().unwrap();
    let mut session = session(config, &mock);

    for text in [
        "Volcanoes erupt molten lava and ash.....",
        "Penguins swim in cold antarctic seas near the ice shelf",
        "Bread dough rises with yeast, sugar, and warm water",
    ] {
        session.ingest_text(text, "self").unwrap();
        let chunk = session.chunks()[0].text.clone();
        let results = session.retrieve(&chunk, 1).unwrap();
        assert_eq!(results[0].chunk.index, 0);
        assert!(results[0].score <= 1.0, "score {} above 1", results[0].score);
        assert!(results[0].score > 0.999);
    }
}

/// Wraps TF-IDF but returns one vector too many from `embed_batch`.
struct ExtraVectorizer;

struct ExtraEmbedder(Box<dyn Embedder>);

impl Embedder for ExtraEmbedder {
    fn embed(&self, text: &str) -> SparseVector {
        self.0.embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Vec<SparseVector> {
        let mut vectors = self.0.embed_batch(texts);
        vectors.push(SparseVector::from_entries(vec![(0, 1.0)]));
        vectors
    }

    fn dimensions(&self) -> usize {
        self.0.dimensions()
    }
}

impl Vectorizer for ExtraVectorizer {
    fn fit(&self, corpus: &[&str]) -> docqa_rag::Result<Box<dyn Embedder>> {
        Ok(Box::new(ExtraEmbedder(TfIdfVectorizer::new().fit(corpus)?)))
    }
}

#[tokio::test]
async fn test_vector_count_mismatch_rejects_build() {
    let mock = Arc::new(MockCompletionProvider::new("ok"));
    let mut session = RagSession::builder()
        .config(small_config())
        .vectorizer(Arc::new(ExtraVectorizer))
        .completion_provider(mock)
        .build()
        .unwrap();

    let err = session.ingest_text("sky", "short").unwrap_err();
    assert!(matches!(err, RagError::IndexMismatch { chunks: 1, vectors: 2 }));
    assert!(!session.is_ready());
    assert!(matches!(session.retrieve("sky", 5), Err(RagError::NoIndexBuilt)));
}
