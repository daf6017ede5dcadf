use serde::{Deserialize, Serialize};

use crate::contract::{
    CoreRequest, CoreResponse, HotkeyResponse, InvokedDto, KeyRequest, KeyResponse, ResultDto,
    ViewResponse,
};
use crate::keys::KeyChord;
use crate::launcher::Launcher;
use crate::selection::{Caret, KeyEvent, KeyOutcome};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

const ENCODE_FAILURE: &str =
    r#"{"status":"err","error":{"code":"internal","message":"response could not be encoded"}}"#;

pub fn handle_request(launcher: &mut Launcher, request: CoreRequest) -> TransportResponse {
    match dispatch(launcher, request) {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err { error },
    }
}

pub fn handle_json(launcher: &mut Launcher, payload: &str) -> String {
    let response = match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => handle_request(launcher, request),
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|_| ENCODE_FAILURE.to_string())
}

/// Snapshot of what the UI should draw: the visible slice of the ranked list
/// plus selection and visibility.
pub fn view_of(launcher: &Launcher) -> ViewResponse {
    let selection = launcher.selection();
    ViewResponse {
        state: launcher.list_state(),
        generation: launcher.generation(),
        visible: launcher.overlay().is_visible(),
        query: launcher.query_text().to_string(),
        highlighted: selection.highlighted(),
        focused_action: selection.focused_action(),
        hover: selection.hover(),
        results: launcher
            .visible_results()
            .iter()
            .map(ResultDto::from)
            .collect(),
    }
}

fn dispatch(launcher: &mut Launcher, request: CoreRequest) -> Result<CoreResponse, ErrorResponse> {
    match request {
        CoreRequest::Query(query) => {
            launcher.on_input_changed(&query.text);
            Ok(CoreResponse::View(view_of(launcher)))
        }
        CoreRequest::Key(key) => {
            let event = key_event(&key)?;
            let outcome = launcher.handle_key(&event);
            Ok(CoreResponse::Key(key_response(launcher, outcome)))
        }
        CoreRequest::Click(click) => match click.action {
            Some(action) => {
                let outcome = launcher.click_action(click.row, action);
                Ok(CoreResponse::Key(key_response(launcher, outcome)))
            }
            None => {
                if !launcher.click_row(click.row) {
                    return Err(invalid_request(format!("row {} is not in the list", click.row)));
                }
                Ok(CoreResponse::View(view_of(launcher)))
            }
        },
        CoreRequest::DoubleClick(row) => {
            let outcome = launcher.double_click_row(row.row);
            Ok(CoreResponse::Key(key_response(launcher, outcome)))
        }
        CoreRequest::Hover(hover) => {
            let target = hover.row.map(|row| (row, hover.action.unwrap_or(0)));
            launcher.hover(target);
            Ok(CoreResponse::View(view_of(launcher)))
        }
        CoreRequest::Hotkey(hotkey) => {
            let action = launcher.on_hotkey(hotkey.has_focus);
            Ok(CoreResponse::Hotkey(HotkeyResponse {
                window: action.into(),
                view: view_of(launcher),
            }))
        }
        CoreRequest::Escape => {
            launcher.on_escape();
            Ok(CoreResponse::View(view_of(launcher)))
        }
        CoreRequest::Poll => {
            launcher.pump();
            Ok(CoreResponse::View(view_of(launcher)))
        }
    }
}

fn key_event(request: &KeyRequest) -> Result<KeyEvent, ErrorResponse> {
    let chord = KeyChord::parse(&request.chord).map_err(invalid_request)?;
    Ok(KeyEvent::new(
        chord,
        Caret {
            at_start: request.caret_at_start,
            at_end: request.caret_at_end,
        },
    ))
}

fn key_response(launcher: &Launcher, outcome: KeyOutcome) -> KeyResponse {
    let consumed = outcome.is_consumed();
    let invoked = match outcome {
        KeyOutcome::Invoked(invocation) => Some(InvokedDto {
            row: invocation.row,
            action: invocation.action,
            history_key: invocation.history_key,
        }),
        KeyOutcome::Handled | KeyOutcome::Ignored => None,
    };
    KeyResponse {
        consumed,
        invoked,
        view: view_of(launcher),
    }
}

fn invalid_request(message: String) -> ErrorResponse {
    ErrorResponse {
        code: ErrorCode::InvalidRequest,
        message,
    }
}
