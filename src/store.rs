use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::{Level, RecommendationResult, SelectionState};

pub type SharedStore = Arc<Store>;

/// Named transitions of the selection store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetGenre(String),
    SetMood(String),
    SetLevel(Level),
    StartFetch,
    RecordSuccess(RecommendationResult),
    RecordError(String),
    Reset,
}

pub fn reduce(state: SelectionState, action: Action) -> SelectionState {
    match action {
        // mood and level depend on genre
        Action::SetGenre(genre) => SelectionState {
            genre,
            mood: String::new(),
            level: None,
            ..state
        },
        Action::SetMood(mood) => SelectionState { mood, ..state },
        Action::SetLevel(level) => SelectionState {
            level: Some(level),
            ..state
        },
        Action::StartFetch => SelectionState {
            loading: true,
            last_error: None,
            ..state
        },
        Action::RecordSuccess(result) => {
            let mut results = state.results;
            results.push(result);
            SelectionState {
                results,
                loading: false,
                last_error: None,
                ..state
            }
        }
        Action::RecordError(message) => SelectionState {
            last_error: Some(message),
            loading: false,
            ..state
        },
        Action::Reset => SelectionState::default(),
    }
}

impl SelectionState {
    pub fn apply(&mut self, action: Action) {
        *self = reduce(std::mem::take(self), action);
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.apply(Action::SetGenre(genre.into()));
    }

    pub fn set_mood(&mut self, mood: impl Into<String>) {
        self.apply(Action::SetMood(mood.into()));
    }

    pub fn set_level(&mut self, level: Level) {
        self.apply(Action::SetLevel(level));
    }

    pub fn start_fetch(&mut self) {
        self.apply(Action::StartFetch);
    }

    pub fn record_success(&mut self, result: RecommendationResult) {
        self.apply(Action::RecordSuccess(result));
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.apply(Action::RecordError(message.into()));
    }

    pub fn reset(&mut self) {
        self.apply(Action::Reset);
    }
}

/// The state shared between the UI thread and fetch tasks.
///
/// `session` is bumped on every reset, so a fetch started before a reset can
/// tell that its completion no longer belongs in the store.
#[derive(Default)]
pub struct Store {
    state: Mutex<SelectionState>,
    session: AtomicU64,
}

impl Store {
    /// Locks the state, recovering it if a previous holder panicked.
    pub fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current session. Read it while holding the lock to pair it with the state.
    pub fn session(&self) -> u64 {
        self.session.load(Ordering::Acquire)
    }

    pub fn reset(&self) {
        let mut state = self.lock();
        state.reset();
        self.session.fetch_add(1, Ordering::AcqRel);
    }
}

pub fn new_shared() -> SharedStore {
    Arc::new(Store::default())
}
