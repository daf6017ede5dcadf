use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

use crate::keys::KeyChord;

pub type ActionHandler = Box<dyn Fn() + Send + 'static>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IconRef {
    #[default]
    None,
    Glyph(char),
    Thumbnail(PathBuf),
    Image(PathBuf),
}

/// Something the user can do with a result. The handler belongs to the
/// provider that built the action; the core only ever calls it.
pub struct Action {
    pub icon: Option<char>,
    pub shortcut: Option<KeyChord>,
    handler: ActionHandler,
}

impl Action {
    pub fn new(handler: impl Fn() + Send + 'static) -> Self {
        Self {
            icon: None,
            shortcut: None,
            handler: Box::new(handler),
        }
    }

    pub fn with_icon(mut self, glyph: char) -> Self {
        self.icon = Some(glyph);
        self
    }

    pub fn with_shortcut(mut self, shortcut: KeyChord) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn invoke(&self) {
        (self.handler)();
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("icon", &self.icon)
            .field("shortcut", &self.shortcut)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct ResultCandidate {
    pub title: String,
    pub subtitle: String,
    pub icon: IconRef,
    pub actions: Vec<Action>,
    /// Empty means invocations are not written to history.
    pub history_key: String,
    pub match_score: f64,
}

impl ResultCandidate {
    pub fn new(title: &str, subtitle: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            match_score: 1.0,
            ..Default::default()
        }
    }

    pub fn with_icon(mut self, icon: IconRef) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_history_key(mut self, key: &str) -> Self {
        self.history_key = key.to_string();
        self
    }

    pub fn with_score(mut self, match_score: f64) -> Self {
        self.match_score = match_score;
        self
    }

    pub fn is_match(&self) -> bool {
        self.match_score > 0.0
    }

    pub fn primary_action(&self) -> Option<&Action> {
        self.actions.first()
    }

    pub fn find_shortcut(&self, chord: &KeyChord) -> Option<usize> {
        self.actions
            .iter()
            .position(|action| action.shortcut.as_ref() == Some(chord))
    }
}

pub fn normalize_for_search(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// How well `text` matches an already normalized `needle`: exact 2.0,
/// prefix 1.5, substring 1.0, else 0. An empty needle matches nothing.
pub fn match_quality(text: &str, needle: &str) -> f64 {
    if needle.is_empty() {
        return 0.0;
    }
    let text = normalize_for_search(text);
    if text == needle {
        2.0
    } else if text.starts_with(needle) {
        1.5
    } else if text.contains(needle) {
        1.0
    } else {
        0.0
    }
}
