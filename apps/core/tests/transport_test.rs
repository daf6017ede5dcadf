use quickrun_core::config::{AppConfig, ModuleConfig};
use quickrun_core::contract::{
    ClickRequest, CoreRequest, CoreResponse, HotkeyRequest, KeyRequest, QueryRequest,
    WindowCommand,
};
use quickrun_core::history::HistoryStore;
use quickrun_core::keys::{Key, KeyChord};
use quickrun_core::launcher::Launcher;
use quickrun_core::model::{Action, IconRef, ResultCandidate};
use quickrun_core::provider::{Provider, ResultSink};
use quickrun_core::ranking::ListState;
use quickrun_core::transport::{handle_json, handle_request, ErrorCode, TransportResponse};

struct Apps;

impl Provider for Apps {
    fn name(&self) -> &str {
        "Apps Search"
    }

    fn query(&self, text: &str, sink: ResultSink) {
        let rows = ["Code", "Calculator", "Terminal"]
            .iter()
            .filter(|title| title.to_lowercase().contains(&text.to_lowercase()))
            .map(|title| {
                ResultCandidate::new(title, "/usr/bin")
                    .with_icon(IconRef::Glyph('\u{e7c3}'))
                    .with_history_key(&format!("app_{title}"))
                    .with_action(Action::new(|| {}))
                    .with_action(
                        Action::new(|| {})
                            .with_icon('\u{e838}')
                            .with_shortcut(KeyChord::ctrl(Key::Char('O'))),
                    )
            })
            .collect();
        sink.deliver(rows).unwrap();
    }
}

fn launcher() -> Launcher {
    let mut launcher = Launcher::new(
        AppConfig::with_dir(std::env::temp_dir()),
        HistoryStore::in_memory(Default::default()),
    )
    .with_providers(vec![Box::new(Apps)]);
    launcher.overlay_mut().set_visible(true);
    launcher
}

#[test]
fn query_returns_ranked_view() {
    let mut launcher = launcher();

    let response = handle_request(
        &mut launcher,
        CoreRequest::Query(QueryRequest { text: "c".into() }),
    );

    match response {
        TransportResponse::Ok {
            response: CoreResponse::View(view),
        } => {
            assert_eq!(view.state, ListState::Results);
            assert_eq!(view.results.len(), 2);
            assert_eq!(view.results[0].module, "Apps Search");
            assert_eq!(view.results[0].actions[1].shortcut.as_deref(), Some("Ctrl+O"));
            assert_eq!(view.highlighted, Some(0));
            assert!(view.visible);
        }
        other => panic!("expected view response, got {other:?}"),
    }
}

#[test]
fn key_request_reports_invocation() {
    let mut launcher = launcher();
    handle_request(
        &mut launcher,
        CoreRequest::Query(QueryRequest { text: "term".into() }),
    );

    let response = handle_request(
        &mut launcher,
        CoreRequest::Key(KeyRequest {
            chord: "Enter".into(),
            caret_at_start: false,
            caret_at_end: true,
        }),
    );

    match response {
        TransportResponse::Ok {
            response: CoreResponse::Key(key),
        } => {
            assert!(key.consumed);
            let invoked = key.invoked.expect("enter should invoke");
            assert_eq!(invoked.history_key, "app_Terminal");
            assert_eq!(invoked.action, Some(0));
            assert!(!key.view.visible);
            assert_eq!(key.view.state, ListState::Idle);
        }
        other => panic!("expected key response, got {other:?}"),
    }
    assert_eq!(launcher.history().score("app_Terminal"), Some(1.0));
}

#[test]
fn unconsumed_key_is_reported() {
    let mut launcher = launcher();
    handle_request(
        &mut launcher,
        CoreRequest::Query(QueryRequest { text: "code".into() }),
    );

    let response = handle_request(
        &mut launcher,
        CoreRequest::Key(KeyRequest {
            chord: "Left".into(),
            caret_at_start: false,
            caret_at_end: true,
        }),
    );

    assert!(matches!(
        response,
        TransportResponse::Ok {
            response: CoreResponse::Key(ref key)
        } if !key.consumed && key.invoked.is_none()
    ));
}

#[test]
fn bad_chord_is_an_invalid_request() {
    let mut launcher = launcher();
    let response = handle_request(
        &mut launcher,
        CoreRequest::Key(KeyRequest {
            chord: "Win+R".into(),
            caret_at_start: true,
            caret_at_end: true,
        }),
    );

    assert!(matches!(
        response,
        TransportResponse::Err { ref error } if error.code == ErrorCode::InvalidRequest
    ));
}

#[test]
fn click_outside_the_list_is_an_invalid_request() {
    let mut launcher = launcher();
    let response = handle_request(
        &mut launcher,
        CoreRequest::Click(ClickRequest {
            row: 4,
            action: None,
        }),
    );

    assert!(matches!(
        response,
        TransportResponse::Err { ref error } if error.code == ErrorCode::InvalidRequest
    ));
}

#[test]
fn hotkey_answers_with_window_command() {
    let mut launcher = launcher();
    let response = handle_request(&mut launcher, CoreRequest::Hotkey(HotkeyRequest { has_focus: true }));

    assert!(matches!(
        response,
        TransportResponse::Ok {
            response: CoreResponse::Hotkey(ref hotkey)
        } if hotkey.window == WindowCommand::Hide && !hotkey.view.visible
    ));
}

#[test]
fn json_handler_returns_invalid_json_error_code() {
    let mut launcher = launcher();

    let raw = handle_json(&mut launcher, "{not-json");
    let decoded: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(decoded["status"], "err");
    assert_eq!(decoded["error"]["code"], "invalid_json");
}

#[test]
fn json_handler_speaks_the_tagged_protocol() {
    let mut launcher = launcher();

    let raw = handle_json(
        &mut launcher,
        r#"{"kind":"Query","payload":{"text":"calc"}}"#,
    );
    let decoded: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded["status"], "ok");
    assert_eq!(decoded["response"]["kind"], "View");
    assert_eq!(decoded["response"]["payload"]["state"], "results");
    assert_eq!(decoded["response"]["payload"]["results"][0]["title"], "Calculator");
    assert_eq!(
        decoded["response"]["payload"]["results"][0]["icon"]["type"],
        "glyph"
    );

    let raw = handle_json(
        &mut launcher,
        r#"{"kind":"Key","payload":{"chord":"ctrl+o"}}"#,
    );
    let decoded: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded["response"]["kind"], "Key");
    assert_eq!(decoded["response"]["payload"]["invoked"]["action"], 1);

    let raw = handle_json(&mut launcher, r#"{"kind":"Poll"}"#);
    let decoded: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded["response"]["payload"]["state"], "idle");
}

#[test]
fn disabled_module_produces_no_results_state() {
    let mut cfg = AppConfig::with_dir(std::env::temp_dir());
    cfg.modules
        .insert("appsSearch".into(), ModuleConfig::new(false, true, 1.0, ' '));
    let mut launcher = Launcher::new(cfg, HistoryStore::disabled()).with_providers(vec![Box::new(Apps)]);

    let raw = handle_json(&mut launcher, r#"{"kind":"Query","payload":{"text":"code"}}"#);
    let decoded: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(decoded["response"]["payload"]["state"], "no_results");
}
