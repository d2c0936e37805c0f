use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{FetchError, PayloadError};
use crate::models::{RecommendationResult, Selection, SelectionState};
use crate::network::{GenerateContentResponse, GenerationClient};
use crate::prompts::recommendation_prompt;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Selection incomplete, nothing happened.
    Skipped,
    Recorded,
    Failed,
    /// The store was reset while the request ran; the completion was dropped.
    Discarded,
}

/// A fetch that has been started but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFetch {
    pub selection: Selection,
    session: u64,
}

/// Snapshots the selection and marks the store as loading.
///
/// Takes the already locked state, so callers can check other conditions in
/// the same critical section. `session` must be read under that lock.
pub fn begin_fetch(state: &mut SelectionState, session: u64) -> Option<PendingFetch> {
    let selection = state.selection()?;
    state.start_fetch();
    Some(PendingFetch { selection, session })
}

/// Extracts the recommendation text from a raw response body.
pub fn decode_recommendation(body: &str) -> Result<String, PayloadError> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    match response.first_text() {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(PayloadError::NoRecommendations),
    }
}

async fn request(client: &dyn GenerationClient, selection: &Selection) -> Result<String, FetchError> {
    let prompt = recommendation_prompt(selection);
    let body = client.generate(&prompt).await?;
    debug!(%body, "API response");
    Ok(decode_recommendation(&body)?)
}

/// Sends the request for `pending` and records its outcome.
pub async fn complete_fetch(
    store: &Store,
    client: &dyn GenerationClient,
    pending: PendingFetch,
) -> FetchOutcome {
    let PendingFetch { selection, session } = pending;
    info!(
        genre = %selection.genre,
        mood = %selection.mood,
        level = %selection.level,
        "fetching recommendations"
    );

    let outcome = request(client, &selection).await;

    let mut state = store.lock();
    if store.session() != session {
        info!("store was reset during the request, dropping its outcome");
        return FetchOutcome::Discarded;
    }
    match outcome {
        Ok(text) => {
            state.record_success(RecommendationResult::new(text, selection, Utc::now()));
            info!(total = state.results.len(), "recommendations recorded");
            FetchOutcome::Recorded
        }
        Err(err) => {
            warn!(error = %err, "recommendation fetch failed");
            state.record_error(err.to_string());
            FetchOutcome::Failed
        }
    }
}

/// Runs one recommendation round trip against `store`.
///
/// The selection is captured before the request is sent, so the stored result
/// reflects what was asked for even if the user changes the lists meanwhile.
/// `App::trigger_fetch` runs the two halves itself to set `loading` before the
/// key handler returns.
#[allow(dead_code)]
pub async fn fetch_recommendation(store: &Store, client: &dyn GenerationClient) -> FetchOutcome {
    let pending = {
        let mut state = store.lock();
        begin_fetch(&mut state, store.session())
    };
    match pending {
        Some(pending) => complete_fetch(store, client, pending).await,
        None => FetchOutcome::Skipped,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::models::Level;
    use crate::store::new_shared;
    use futures::future::BoxFuture;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    pub(crate) enum Reply {
        Body(String),
        Fail,
    }

    /// A real reqwest error, produced without touching the network.
    pub(crate) fn connection_error() -> reqwest::Error {
        reqwest::Client::new().get("http://[::1").build().unwrap_err()
    }

    pub(crate) struct MockClient {
        reply: Reply,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl MockClient {
        pub(crate) fn body(body: &str) -> Self {
            Self::new(Reply::Body(body.to_string()))
        }

        pub(crate) fn failing() -> Self {
            Self::new(Reply::Fail)
        }

        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GenerationClient for MockClient {
        fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, TransportError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            let reply = match &self.reply {
                Reply::Body(body) => Ok(body.clone()),
                Reply::Fail => Err(TransportError::Http(connection_error())),
            };
            Box::pin(async move { reply })
        }
    }

    /// Holds every request until `release` is called.
    pub(crate) struct GatedClient {
        gate: Notify,
        body: String,
    }

    impl GatedClient {
        pub(crate) fn new(body: &str) -> Self {
            Self {
                gate: Notify::new(),
                body: body.to_string(),
            }
        }

        pub(crate) fn release(&self) {
            self.gate.notify_one();
        }
    }

    impl GenerationClient for GatedClient {
        fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, TransportError>> {
            Box::pin(async move {
                self.gate.notified().await;
                Ok(self.body.clone())
            })
        }
    }

    async fn until_loading(store: &Store) {
        while !store.lock().loading {
            tokio::task::yield_now().await;
        }
    }

    pub(crate) const BOOK_A: &str =
        r#"{"candidates":[{"content":{"parts":[{"text":"1. Book A..."}]}}]}"#;

    fn complete_store() -> crate::store::SharedStore {
        let store = new_shared();
        {
            let mut state = store.lock();
            state.set_genre("Fiction");
            state.set_mood("Happy");
            state.set_level(Level::Beginner);
        }
        store
    }

    #[tokio::test]
    async fn incomplete_selection_is_a_no_op() {
        let client = MockClient::body(BOOK_A);
        let cases: [(&str, &str, Option<Level>); 3] = [
            ("", "Happy", Some(Level::Beginner)),
            ("Fiction", "", Some(Level::Beginner)),
            ("Fiction", "Happy", None),
        ];
        for (genre, mood, level) in cases {
            let store = new_shared();
            {
                let mut state = store.lock();
                state.genre = genre.into();
                state.mood = mood.into();
                state.level = level;
            }
            let before = store.lock().clone();
            let outcome = fetch_recommendation(&store, &client).await;
            assert_eq!(outcome, FetchOutcome::Skipped);
            assert_eq!(*store.lock(), before);
        }
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn success_appends_one_result() {
        let store = complete_store();
        let client = MockClient::body(BOOK_A);
        let started = Utc::now();

        let outcome = fetch_recommendation(&store, &client).await;

        assert_eq!(outcome, FetchOutcome::Recorded);
        assert_eq!(client.calls(), 1);
        let state = store.lock();
        assert_eq!(state.results.len(), 1);
        let result = &state.results[0];
        assert_eq!(result.text, "1. Book A...");
        assert_eq!(result.genre, "Fiction");
        assert_eq!(result.mood, "Happy");
        assert_eq!(result.level, Level::Beginner);
        assert!(result.timestamp >= started);
        assert!(!state.loading);
        assert_eq!(state.last_error, None);
    }

    #[tokio::test]
    async fn result_keeps_selection_from_call_time() {
        let store = complete_store();
        let client = GatedClient::new(BOOK_A);

        let change_while_pending = async {
            until_loading(&store).await;
            {
                let mut state = store.lock();
                state.set_genre("Mystery");
                state.set_mood("Tense");
                state.set_level(Level::Expert);
            }
            client.release();
        };
        let (outcome, ()) = tokio::join!(fetch_recommendation(&store, &client), change_while_pending);

        assert_eq!(outcome, FetchOutcome::Recorded);
        let state = store.lock();
        let result = &state.results[0];
        assert_eq!(
            (result.genre.as_str(), result.mood.as_str(), result.level),
            ("Fiction", "Happy", Level::Beginner)
        );
        assert_eq!(state.genre, "Mystery");
    }

    #[tokio::test]
    async fn reset_during_request_drops_the_completion() {
        let store = complete_store();
        let client = GatedClient::new(BOOK_A);

        let reset_while_pending = async {
            until_loading(&store).await;
            store.reset();
            assert!(!store.lock().loading);
            client.release();
        };
        let (outcome, ()) = tokio::join!(fetch_recommendation(&store, &client), reset_while_pending);

        assert_eq!(outcome, FetchOutcome::Discarded);
        assert_eq!(*store.lock(), SelectionState::default());
    }

    #[test]
    fn begin_fetch_marks_loading_and_snapshots() {
        let store = complete_store();
        let mut state = store.lock();
        let pending = begin_fetch(&mut state, store.session()).unwrap();
        assert!(state.loading);
        assert_eq!(pending.selection.genre, "Fiction");

        let mut empty = SelectionState::default();
        assert!(begin_fetch(&mut empty, 0).is_none());
        assert!(!empty.loading);
    }

    #[tokio::test]
    async fn prompt_is_built_from_selection() {
        let store = complete_store();
        let client = MockClient::body(BOOK_A);
        fetch_recommendation(&store, &client).await;
        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[0].starts_with("Recommend 6 books for a Beginner Fiction reader feeling Happy."));
    }

    #[tokio::test]
    async fn results_accumulate_across_fetches() {
        let store = complete_store();
        let client = MockClient::body(BOOK_A);
        fetch_recommendation(&store, &client).await;
        store.lock().set_level(Level::Expert);
        fetch_recommendation(&store, &client).await;
        let state = store.lock();
        let levels: Vec<_> = state.results.iter().map(|r| r.level).collect();
        assert_eq!(levels, [Level::Beginner, Level::Expert]);
    }

    #[tokio::test]
    async fn empty_body_reports_no_recommendations() {
        let store = complete_store();
        let client = MockClient::body("{}");
        let outcome = fetch_recommendation(&store, &client).await;
        assert_eq!(outcome, FetchOutcome::Failed);
        let state = store.lock();
        assert!(state.results.is_empty());
        assert!(!state.loading);
        assert_eq!(state.last_error.as_deref(), Some("No recommendations received"));
    }

    #[tokio::test]
    async fn transport_error_message_is_surfaced() {
        let store = complete_store();
        let client = MockClient::failing();
        fetch_recommendation(&store, &client).await;
        let state = store.lock();
        assert!(state.results.is_empty());
        assert!(!state.loading);
        assert_eq!(state.last_error, Some(connection_error().to_string()));
    }

    #[tokio::test]
    async fn failure_keeps_earlier_results() {
        let store = complete_store();
        fetch_recommendation(&store, &MockClient::body(BOOK_A)).await;
        fetch_recommendation(&store, &MockClient::body("not json")).await;
        let state = store.lock();
        assert_eq!(state.results.len(), 1);
        let message = state.last_error.as_deref().unwrap();
        assert!(message.starts_with("Malformed response:"), "{message}");
    }

    #[test]
    fn blank_text_is_not_a_recommendation() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#;
        assert!(matches!(
            decode_recommendation(body),
            Err(PayloadError::NoRecommendations)
        ));
        assert!(matches!(
            decode_recommendation(r#"{"candidates":[]}"#),
            Err(PayloadError::NoRecommendations)
        ));
    }
}
