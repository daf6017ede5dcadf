use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use quickrun_core::runtime::{build_launcher, serve_lines};

fn unique_temp_dir(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "quickrun-{label}-{}-{unique}",
        std::process::id()
    ))
}

/// Seeds an empty apps catalog so start-up never scans the real machine.
fn seeded_config_dir(label: &str) -> PathBuf {
    let dir = unique_temp_dir(label);
    fs::create_dir_all(dir.join("Modules")).unwrap();
    fs::write(
        dir.join("Modules").join("Apps Search.json"),
        r#"{ "apps": [ { "name": "Notes", "path": "/opt/notes", "keywords": ["notes", "memo"] } ] }"#,
    )
    .unwrap();
    dir
}

#[test]
fn first_start_writes_config_with_every_module() {
    let dir = seeded_config_dir("runtime-first-start");

    let launcher = build_launcher(&dir).unwrap();

    let raw = fs::read_to_string(dir.join("Launcher.json")).unwrap();
    assert!(raw.contains("\"launcherCommands\""));
    assert!(raw.contains("\"appsSearch\""));
    assert!(raw.contains("\"terminalProfiles\""));
    assert!(dir.join("History.json").exists());
    assert_eq!(launcher.registry().len(), 3);
    assert_eq!(launcher.registry().find_prefix_match('>').unwrap().module_id, "Launcher Commands");

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn serves_one_response_per_request_line() {
    let dir = seeded_config_dir("runtime-serve");
    let mut launcher = build_launcher(&dir).unwrap();
    launcher.overlay_mut().set_visible(true);

    let input = concat!(
        "{\"kind\":\"Query\",\"payload\":{\"text\":\"memo\"}}\n",
        "\n",
        "garbage\n",
        "{\"kind\":\"Key\",\"payload\":{\"chord\":\"Down\"}}\n",
    );
    let mut output = Vec::new();
    let handled = serve_lines(&mut launcher, Cursor::new(input), &mut output, &dir).unwrap();

    assert_eq!(handled, 3);
    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["response"]["payload"]["results"][0]["title"], "Notes");
    assert_eq!(lines[0]["response"]["payload"]["results"][0]["history_key"], "app_/opt/notes");
    assert_eq!(lines[1]["error"]["code"], "invalid_json");
    assert_eq!(lines[2]["response"]["payload"]["consumed"], true);

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn reload_command_picks_up_edited_config() {
    let dir = seeded_config_dir("runtime-reload");
    let mut launcher = build_launcher(&dir).unwrap();
    launcher.overlay_mut().set_visible(true);

    let edited = fs::read_to_string(dir.join("Launcher.json"))
        .unwrap()
        .replace("\"prefix\": \">\"", "\"prefix\": \"!\"");
    fs::write(dir.join("Launcher.json"), edited).unwrap();

    let input = concat!(
        "{\"kind\":\"Query\",\"payload\":{\"text\":\">reload\"}}\n",
        "{\"kind\":\"Key\",\"payload\":{\"chord\":\"Enter\"}}\n",
    );
    let mut output = Vec::new();
    serve_lines(&mut launcher, Cursor::new(input), &mut output, &dir).unwrap();

    assert!(launcher.registry().find_prefix_match('>').is_none());
    assert_eq!(launcher.registry().find_prefix_match('!').unwrap().module_id, "Launcher Commands");
    assert_eq!(launcher.history().score("launcher_reload"), Some(1.0));

    fs::remove_dir_all(dir).unwrap();
}
