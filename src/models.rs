use std::cell::Cell;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Genre,
    Mood,
    Level,
    Results,
}

impl FocusArea {
    pub fn next(self) -> Self {
        match self {
            FocusArea::Genre => FocusArea::Mood,
            FocusArea::Mood => FocusArea::Level,
            FocusArea::Level => FocusArea::Results,
            FocusArea::Results => FocusArea::Genre,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusArea::Genre => FocusArea::Results,
            FocusArea::Mood => FocusArea::Genre,
            FocusArea::Level => FocusArea::Mood,
            FocusArea::Results => FocusArea::Level,
        }
    }
}

/// Reading level of the person asking for recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Beginner,
    Intermediate,
    Expert,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Expert];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Expert => "Expert",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete genre/mood/level triple, captured when a fetch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub genre: String,
    pub mood: String,
    pub level: Level,
}

/// One stored response from the remote service, tied to the selection that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationResult {
    pub text: String,
    pub genre: String,
    pub mood: String,
    pub level: Level,
    pub timestamp: DateTime<Utc>,
}

impl RecommendationResult {
    pub fn new(text: String, selection: Selection, timestamp: DateTime<Utc>) -> Self {
        Self {
            text,
            genre: selection.genre,
            mood: selection.mood,
            level: selection.level,
            timestamp,
        }
    }

    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Label shown in the collapsed result list, `index` is zero based.
    pub fn summary(&self, index: usize) -> String {
        format!(
            "Recommendation {} - {} / {} / {}",
            index + 1,
            self.genre,
            self.mood,
            self.level
        )
    }
}

/// Everything the session knows. Mutated only through [`crate::store::Action`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub genre: String,
    pub mood: String,
    pub level: Option<Level>,
    pub results: Vec<RecommendationResult>,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl SelectionState {
    /// The current triple if every field is set.
    pub fn selection(&self) -> Option<Selection> {
        if self.genre.is_empty() || self.mood.is_empty() {
            return None;
        }
        let level = self.level?;
        Some(Selection {
            genre: self.genre.clone(),
            mood: self.mood.clone(),
            level,
        })
    }

    pub fn can_fetch(&self) -> bool {
        !self.loading && self.selection().is_some()
    }
}

/// Expand/collapse state of the result list. Only one entry is open at a time.
#[derive(Default)]
pub struct ResultView {
    pub cursor: usize,
    pub expanded: Option<usize>,
    pub scroll: u16,
    /// Wrapped lines below the detail pane at the last draw.
    pub max_scroll: Cell<u16>,
}

impl ResultView {
    pub fn toggle(&mut self, index: usize) {
        self.expanded = if self.expanded == Some(index) { None } else { Some(index) };
        self.scroll = 0;
        self.max_scroll.set(0);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = (self.scroll + 1).min(self.max_scroll.get());
    }
}

pub struct KeyPrompt {
    pub visible: bool,
    pub buffer: String,
    pub save: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn selection_requires_all_fields() {
        let mut state = SelectionState {
            genre: "Fiction".into(),
            mood: "Happy".into(),
            ..Default::default()
        };
        assert!(state.selection().is_none());
        assert!(!state.can_fetch());

        state.level = Some(Level::Expert);
        assert_eq!(
            state.selection(),
            Some(Selection {
                genre: "Fiction".into(),
                mood: "Happy".into(),
                level: Level::Expert,
            })
        );
        assert!(state.can_fetch());

        state.loading = true;
        assert!(!state.can_fetch());
    }

    #[test]
    fn result_summary_is_one_based() {
        let selection = Selection {
            genre: "Mystery".into(),
            mood: "Curious".into(),
            level: Level::Intermediate,
        };
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let result = RecommendationResult::new("text".into(), selection, at);
        assert_eq!(result.summary(0), "Recommendation 1 - Mystery / Curious / Intermediate");
        assert_eq!(result.timestamp_iso(), "2024-03-01T12:00:00.000Z");
    }

    #[test]
    fn expansion_is_exclusive() {
        let mut view = ResultView::default();
        view.toggle(0);
        assert_eq!(view.expanded, Some(0));
        view.toggle(2);
        assert_eq!(view.expanded, Some(2));
        view.toggle(2);
        assert_eq!(view.expanded, None);
    }

    #[test]
    fn level_text_comes_from_as_str() {
        let labels: Vec<String> = Level::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["Beginner", "Intermediate", "Expert"]);
        assert_eq!(Level::Intermediate.as_str(), "Intermediate");
    }

    #[test]
    fn scroll_down_stops_at_last_draw_limit() {
        let mut view = ResultView::default();
        view.toggle(0);
        view.scroll_down();
        assert_eq!(view.scroll, 0);
        view.max_scroll.set(2);
        for _ in 0..5 {
            view.scroll_down();
        }
        assert_eq!(view.scroll, 2);
        view.toggle(0);
        assert_eq!((view.scroll, view.max_scroll.get()), (0, 0));
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut focus = FocusArea::Genre;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert!(focus == FocusArea::Genre);
        assert!(FocusArea::Genre.prev() == FocusArea::Results);
    }
}
