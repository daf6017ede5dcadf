use serde::{Deserialize, Serialize};

use crate::model::IconRef;
use crate::overlay_state::HotkeyAction;
use crate::ranking::{ListState, RankedResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub text: String,
}

fn caret_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyRequest {
    /// Canonical chord text such as `"Tab"` or `"Ctrl+Shift+C"`.
    pub chord: String,
    #[serde(default = "caret_default")]
    pub caret_at_start: bool,
    #[serde(default = "caret_default")]
    pub caret_at_end: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClickRequest {
    pub row: usize,
    /// `None` selects the row without invoking anything.
    #[serde(default)]
    pub action: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowRequest {
    pub row: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HoverRequest {
    #[serde(default)]
    pub row: Option<usize>,
    #[serde(default)]
    pub action: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HotkeyRequest {
    pub has_focus: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreRequest {
    Query(QueryRequest),
    Key(KeyRequest),
    Click(ClickRequest),
    DoubleClick(RowRequest),
    Hover(HoverRequest),
    Hotkey(HotkeyRequest),
    Escape,
    Poll,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum IconDto {
    None,
    Glyph(String),
    Thumbnail(String),
    Image(String),
}

impl From<&IconRef> for IconDto {
    fn from(value: &IconRef) -> Self {
        match value {
            IconRef::None => Self::None,
            IconRef::Glyph(glyph) => Self::Glyph(glyph.to_string()),
            IconRef::Thumbnail(path) => Self::Thumbnail(path.to_string_lossy().to_string()),
            IconRef::Image(path) => Self::Image(path.to_string_lossy().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionDto {
    pub icon: Option<String>,
    pub shortcut: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultDto {
    pub title: String,
    pub subtitle: String,
    pub icon: IconDto,
    pub module: String,
    pub score: f64,
    pub history_key: String,
    pub actions: Vec<ActionDto>,
}

impl From<&RankedResult> for ResultDto {
    fn from(value: &RankedResult) -> Self {
        let candidate = &value.candidate;
        Self {
            title: candidate.title.clone(),
            subtitle: candidate.subtitle.clone(),
            icon: IconDto::from(&candidate.icon),
            module: value.module_id.clone(),
            score: value.final_score,
            history_key: candidate.history_key.clone(),
            actions: candidate
                .actions
                .iter()
                .map(|action| ActionDto {
                    icon: action.icon.map(|glyph| glyph.to_string()),
                    shortcut: action.shortcut.map(|chord| chord.to_string()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewResponse {
    pub state: ListState,
    pub generation: u64,
    pub visible: bool,
    pub query: String,
    pub highlighted: Option<usize>,
    pub focused_action: usize,
    pub hover: Option<(usize, usize)>,
    pub results: Vec<ResultDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvokedDto {
    pub row: usize,
    pub action: Option<usize>,
    pub history_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyResponse {
    /// False when the key belongs to the text box.
    pub consumed: bool,
    pub invoked: Option<InvokedDto>,
    pub view: ViewResponse,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowCommand {
    ShowAndFocus,
    Hide,
    FocusExisting,
}

impl From<HotkeyAction> for WindowCommand {
    fn from(value: HotkeyAction) -> Self {
        match value {
            HotkeyAction::ShowAndFocus => Self::ShowAndFocus,
            HotkeyAction::Hide => Self::Hide,
            HotkeyAction::FocusExisting => Self::FocusExisting,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotkeyResponse {
    pub window: WindowCommand,
    pub view: ViewResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreResponse {
    View(ViewResponse),
    Key(KeyResponse),
    Hotkey(HotkeyResponse),
}
