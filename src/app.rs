use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::fetcher::{begin_fetch, complete_fetch};
use crate::models::{FocusArea, KeyPrompt, Level, ResultView};
use crate::network::{Endpoint, GeminiClient, GenerationClient};
use crate::store::{self, SharedStore};

/// View state around the shared store. Cursors live here, choices live in the store.
pub struct App {
    pub store: SharedStore,
    pub catalog: Catalog,
    pub focus: FocusArea,
    pub genre_cursor: usize,
    pub mood_cursor: usize,
    pub level_cursor: usize,
    pub results: ResultView,
    pub key_prompt: KeyPrompt,
    pub status: Option<String>,
    client: Arc<dyn GenerationClient>,
    endpoint: Endpoint,
    rt: Handle,
}

impl App {
    pub fn new(catalog: Catalog, endpoint: Endpoint, ask_for_key: bool, rt: Handle) -> Self {
        let client = Arc::new(GeminiClient::new(endpoint.clone()));
        let mut app = Self::with_client(catalog, client, endpoint, rt);
        app.key_prompt.visible = ask_for_key;
        app
    }

    pub fn with_client(
        catalog: Catalog,
        client: Arc<dyn GenerationClient>,
        endpoint: Endpoint,
        rt: Handle,
    ) -> Self {
        Self {
            store: store::new_shared(),
            catalog,
            focus: FocusArea::Genre,
            genre_cursor: 0,
            mood_cursor: 0,
            level_cursor: 0,
            results: ResultView::default(),
            key_prompt: KeyPrompt {
                visible: false,
                buffer: String::new(),
                save: false,
            },
            status: None,
            client,
            endpoint,
            rt,
        }
    }

    /// Applies the list entry under the cursor of the focused list.
    pub fn choose(&mut self) {
        match self.focus {
            FocusArea::Genre => {
                if let Some(genre) = self.catalog.genre_at(self.genre_cursor) {
                    self.store.lock().set_genre(genre);
                    self.mood_cursor = 0;
                    self.level_cursor = 0;
                    self.focus = FocusArea::Mood;
                }
            }
            FocusArea::Mood => {
                let mut state = self.store.lock();
                if let Some(mood) = self.catalog.moods_for(&state.genre).get(self.mood_cursor) {
                    state.set_mood(mood.clone());
                    drop(state);
                    self.focus = FocusArea::Level;
                }
            }
            FocusArea::Level => {
                if let Some(level) = Level::ALL.get(self.level_cursor) {
                    self.store.lock().set_level(*level);
                }
            }
            FocusArea::Results => {
                let count = self.store.lock().results.len();
                if self.results.cursor < count {
                    self.results.toggle(self.results.cursor);
                }
            }
        }
    }

    pub fn move_cursor(&mut self, down: bool) {
        use crate::utils::step_cursor;
        match self.focus {
            FocusArea::Genre => {
                self.genre_cursor = step_cursor(self.genre_cursor, self.catalog.genre_count(), down)
            }
            FocusArea::Mood => {
                let len = self.catalog.moods_for(&self.store.lock().genre).len();
                self.mood_cursor = step_cursor(self.mood_cursor, len, down);
            }
            FocusArea::Level => {
                self.level_cursor = step_cursor(self.level_cursor, Level::ALL.len(), down)
            }
            FocusArea::Results => {
                let len = self.store.lock().results.len();
                self.results.cursor = step_cursor(self.results.cursor, len, down);
            }
        }
    }

    /// Starts a fetch if the trigger is enabled. Returns whether one was started.
    ///
    /// `loading` is set before returning, so a second press sees the request in flight.
    pub fn trigger_fetch(&self) -> bool {
        let pending = {
            let mut state = self.store.lock();
            if !state.can_fetch() {
                debug!("fetch trigger ignored, selection incomplete or request in flight");
                return false;
            }
            begin_fetch(&mut state, self.store.session())
        };
        let Some(pending) = pending else {
            return false;
        };
        let store = self.store.clone();
        let client = self.client.clone();
        self.rt.spawn(async move {
            complete_fetch(&store, client.as_ref(), pending).await;
        });
        true
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.genre_cursor = 0;
        self.mood_cursor = 0;
        self.level_cursor = 0;
        self.results = ResultView::default();
        self.focus = FocusArea::Genre;
        info!("selection reset");
    }

    /// Swaps in a client that uses `api_key`.
    pub fn set_api_key(&mut self, api_key: String) {
        self.endpoint.api_key = Some(api_key);
        self.client = Arc::new(GeminiClient::new(self.endpoint.clone()));
        info!("API key updated");
    }

    pub fn expanded_text(&self) -> Option<String> {
        let idx = self.results.expanded?;
        self.store.lock().results.get(idx).map(|r| r.text.clone())
    }
}
