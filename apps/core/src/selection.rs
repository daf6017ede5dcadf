//! Highlighted row and focused action, driven by key and mouse events.
//!
//! Action index 0 is the primary action; 1.. are the secondary buttons of the
//! highlighted row. Tab (or Right with the caret at the end of the text)
//! walks forward through the actions and wraps back to the primary one; Left
//! with the caret at the start walks back and stops at 0. Any modified chord
//! is looked up in the highlighted row's action shortcuts.

use crate::history::HistoryStore;
use crate::keys::{Key, KeyChord};
use crate::overlay_state::OverlayState;
use crate::ranking::RankedResult;

/// Where the text cursor sits in the search box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caret {
    pub at_start: bool,
    pub at_end: bool,
}

impl Caret {
    pub const INSIDE: Self = Self {
        at_start: false,
        at_end: false,
    };

    pub const EMPTY_TEXT: Self = Self {
        at_start: true,
        at_end: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub chord: KeyChord,
    pub caret: Caret,
}

impl KeyEvent {
    pub fn new(chord: KeyChord, caret: Caret) -> Self {
        Self { chord, caret }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(KeyChord::plain(key), Caret::EMPTY_TEXT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub row: usize,
    /// `None` when the row had no actions and was only dismissed.
    pub action: Option<usize>,
    pub history_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not ours; the text box should handle it.
    Ignored,
    Handled,
    Invoked(Invocation),
}

impl KeyOutcome {
    pub fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// What an invocation needs besides the selection itself.
pub struct InvokeContext<'a> {
    pub results: &'a [RankedResult],
    pub history: &'a mut HistoryStore,
    pub overlay: &'a mut OverlayState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionController {
    highlighted: Option<usize>,
    focused_action: usize,
    hover: Option<(usize, usize)>,
}

impl SelectionController {
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn focused_action(&self) -> usize {
        self.focused_action
    }

    /// `(row, action)` under the mouse. Repaint only; never changes focus.
    pub fn hover(&self) -> Option<(usize, usize)> {
        self.hover
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn on_list_rebuilt(&mut self, len: usize) {
        self.highlighted = if len > 0 { Some(0) } else { None };
        self.focused_action = 0;
        self.hover = None;
    }

    pub fn set_hover(&mut self, hover: Option<(usize, usize)>) {
        self.hover = hover;
    }

    /// Moves by `delta` rows, clamped to the list. Returns whether the
    /// highlighted row changed.
    pub fn move_highlight(&mut self, len: usize, delta: isize) -> bool {
        let Some(current) = self.highlighted else {
            return false;
        };
        if len == 0 {
            return false;
        }

        self.focused_action = 0;
        let next = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as usize).min(len - 1)
        };
        if next == current {
            return false;
        }
        self.highlighted = Some(next);
        true
    }

    pub fn select_row(&mut self, len: usize, row: usize) -> bool {
        if row >= len {
            return false;
        }
        if self.highlighted != Some(row) {
            self.highlighted = Some(row);
            self.focused_action = 0;
        }
        true
    }

    pub fn next_action(&mut self, results: &[RankedResult]) -> bool {
        let count = self.action_count(results);
        if count < 2 {
            return false;
        }
        self.focused_action = (self.focused_action + 1) % count;
        true
    }

    pub fn previous_action(&mut self) -> bool {
        if self.focused_action == 0 {
            return false;
        }
        self.focused_action -= 1;
        true
    }

    pub fn handle_key(&mut self, event: &KeyEvent, ctx: InvokeContext<'_>) -> KeyOutcome {
        let chord = event.chord;
        if chord.has_modifiers() {
            let shortcut = self.highlighted.and_then(|row| {
                ctx.results
                    .get(row)
                    .and_then(|result| result.candidate.find_shortcut(&chord))
                    .map(|action| (row, action))
            });
            return match shortcut {
                Some((row, action)) => KeyOutcome::Invoked(invoke(row, action, ctx)),
                None => KeyOutcome::Ignored,
            };
        }

        match chord.key {
            Key::Down => {
                self.move_highlight(ctx.results.len(), 1);
                KeyOutcome::Handled
            }
            Key::Up => {
                self.move_highlight(ctx.results.len(), -1);
                KeyOutcome::Handled
            }
            Key::Tab => {
                self.next_action(ctx.results);
                KeyOutcome::Handled
            }
            Key::Right if event.caret.at_end => {
                self.next_action(ctx.results);
                KeyOutcome::Handled
            }
            Key::Left if event.caret.at_start => {
                self.previous_action();
                KeyOutcome::Handled
            }
            Key::Enter => match self.highlighted {
                Some(row) => activate(row, self.focused_action, ctx),
                None => KeyOutcome::Handled,
            },
            _ => KeyOutcome::Ignored,
        }
    }

    /// Click on the button for `action` in `row`, or `action == 0` for a
    /// double-click on the row itself.
    pub fn click_action(&mut self, row: usize, action: usize, ctx: InvokeContext<'_>) -> KeyOutcome {
        if !self.select_row(ctx.results.len(), row) {
            return KeyOutcome::Ignored;
        }
        activate(row, action, ctx)
    }

    fn action_count(&self, results: &[RankedResult]) -> usize {
        self.highlighted
            .and_then(|row| results.get(row))
            .map(|result| result.candidate.actions.len())
            .unwrap_or(0)
    }
}

fn activate(row: usize, action: usize, ctx: InvokeContext<'_>) -> KeyOutcome {
    let Some(result) = ctx.results.get(row) else {
        return KeyOutcome::Handled;
    };

    if result.candidate.actions.is_empty() {
        ctx.overlay.on_action_invoked();
        return KeyOutcome::Invoked(Invocation {
            row,
            action: None,
            history_key: String::new(),
        });
    }
    if action >= result.candidate.actions.len() {
        return KeyOutcome::Handled;
    }

    KeyOutcome::Invoked(invoke(row, action, ctx))
}

fn invoke(row: usize, action: usize, ctx: InvokeContext<'_>) -> Invocation {
    let candidate = &ctx.results[row].candidate;
    candidate.actions[action].invoke();
    ctx.overlay.on_action_invoked();
    if !candidate.history_key.is_empty() {
        ctx.history.record_use(&candidate.history_key);
    }

    Invocation {
        row,
        action: Some(action),
        history_key: candidate.history_key.clone(),
    }
}
