use std::sync::Arc;
use std::time::Duration;

use livedesk_common::{DesktopError, Message, Phase, WindowError, WindowId, WindowKind};
use livedesk_config::schema::Isolation;
use livedesk_config::{DeckConfig, LivedeskConfig, WindowDecl};
use livedesk_desktop::metrics::{Calibration, GridSize};
use livedesk_desktop::testing::RecordingPlatform;
use livedesk_desktop::{Desktop, Diagnostic, InputEvent};
use livedesk_platform::{Binding, KeyCombo};
use livedesk_runtime::calc::CalcLanguage;
use livedesk_runtime::LanguageRegistry;

fn id(s: &str) -> WindowId {
    WindowId::from(s)
}

fn inline_config() -> LivedeskConfig {
    let mut config = LivedeskConfig::default();
    config.runtime.isolation = Isolation::Inline;
    config
}

fn deck() -> DeckConfig {
    DeckConfig {
        windows: vec![
            WindowDecl::new("editor", "editor", Some("repl"), "calc").with_content("let x = 20"),
            WindowDecl::new("repl", "repl", Some("editor"), "calc"),
            WindowDecl::new("frame", "frame", None, "calc").with_content("<frame>"),
        ],
    }
}

fn build(platform: &RecordingPlatform, config: LivedeskConfig) -> Desktop {
    Desktop::construct(
        &deck(),
        &LanguageRegistry::with_builtins(),
        config,
        Box::new(platform.clone()),
    )
    .unwrap()
}

fn ready(platform: &RecordingPlatform) -> Desktop {
    let mut desktop = build(platform, inline_config());
    desktop.activate().unwrap();
    desktop.stabilise().unwrap();
    desktop
}

fn submit(desktop: &mut Desktop, line: &str) {
    desktop
        .input(&id("repl"), InputEvent::Command(line.into()))
        .unwrap();
    desktop.run_pending();
}

fn construct_err(windows: Vec<WindowDecl>) -> DesktopError {
    match Desktop::construct(
        &DeckConfig { windows },
        &LanguageRegistry::with_builtins(),
        inline_config(),
        Box::new(RecordingPlatform::new()),
    ) {
        Ok(_) => panic!("construction should fail"),
        Err(err) => err,
    }
}

// --- construction ---

#[test]
fn construct_builds_registry_in_declaration_order() {
    let desktop = build(&RecordingPlatform::new(), inline_config());
    assert_eq!(desktop.window_ids(), vec![id("editor"), id("repl"), id("frame")]);
    assert_eq!(desktop.kind(&id("repl")), Some(WindowKind::Console));
    assert_eq!(desktop.peer(&id("editor")), Some(&id("repl")));
    assert_eq!(desktop.phase(&id("frame")), Some(Phase::Constructed));
}

#[test]
fn construct_rejects_bad_declarations() {
    let err = construct_err(vec![WindowDecl::new("w", "spreadsheet", None, "calc")]);
    assert!(matches!(err, DesktopError::UnknownKind { ref kind, .. } if kind == "spreadsheet"));

    let err = construct_err(vec![WindowDecl::new("w", "editor", None, "cobol")]);
    assert!(matches!(err, DesktopError::UnknownLanguage { ref lang, .. } if lang == "cobol"));

    let err = construct_err(vec![
        WindowDecl::new("w", "editor", None, "calc"),
        WindowDecl::new("w", "repl", None, "calc"),
    ]);
    assert!(matches!(err, DesktopError::DuplicateId(ref w) if w.as_str() == "w"));

    let err = construct_err(vec![WindowDecl::new("w", "editor", Some("ghost"), "calc")]);
    assert!(matches!(err, DesktopError::UnresolvedPeer { ref peer, .. } if peer.as_str() == "ghost"));

    assert!(matches!(construct_err(Vec::new()), DesktopError::Empty));
}

// --- lifecycle ---

#[test]
fn lifecycle_order_is_enforced() {
    let platform = RecordingPlatform::new();
    let mut desktop = build(&platform, inline_config());

    let err = desktop.stabilise().unwrap_err();
    assert!(matches!(
        err,
        DesktopError::Lifecycle {
            operation: "stabilise",
            phase: Phase::Constructed,
            ..
        }
    ));
    assert!(desktop.cleanup().is_err());

    desktop.activate().unwrap();
    assert!(desktop.activate().is_err());
    desktop.stabilise().unwrap();
    assert_eq!(desktop.phase(&id("repl")), Some(Phase::Stable));

    desktop.cleanup().unwrap();
    let err = desktop.cleanup().unwrap_err();
    assert!(matches!(
        err,
        DesktopError::Lifecycle {
            operation: "cleanup",
            phase: Phase::Destroyed,
            ..
        }
    ));
}

#[test]
fn cleanup_releases_layout_before_runtime_and_restores_panes() {
    let platform = RecordingPlatform::new();
    let mut languages = LanguageRegistry::new();
    languages.register(platform.language(Arc::new(CalcLanguage)));
    let mut desktop = Desktop::construct(
        &deck(),
        &languages,
        inline_config(),
        Box::new(platform.clone()),
    )
    .unwrap();
    desktop.activate().unwrap();
    desktop.stabilise().unwrap();
    desktop.cleanup().unwrap();

    // Only the console starts a runtime, so the calc release is its own.
    let repl: Vec<String> = platform
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("repl: ") || c.starts_with("calc: "))
        .collect();
    assert_eq!(
        repl,
        vec![
            "repl: metrics.create",
            "repl: terminal.create",
            "repl: terminal.cleanup",
            "repl: metrics.destroy",
            "calc: runtime.cleanup",
            "repl: pane.restore",
        ]
    );

    let restored = platform.state().restored.clone();
    assert!(restored.contains(&(id("editor"), "let x = 20".to_string())));
    assert!(restored.contains(&(id("frame"), "<frame>".to_string())));
    assert!(platform.editor("editor").unwrap().destroyed);
    assert_eq!(platform.state().frames_detached, 1);
}

#[test]
fn reactivation_reproduces_the_initial_state() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);
    desktop
        .send(&id("editor"), &id("frame"), Message::load("1"))
        .unwrap();
    submit(&mut desktop, "let y = 1");

    desktop.cleanup().unwrap();
    desktop.activate().unwrap();
    desktop.stabilise().unwrap();

    desktop
        .send(&id("editor"), &id("frame"), Message::load("2"))
        .unwrap();
    assert_eq!(
        platform.frame_commands("frame"),
        vec!["prelude", "load", "prelude", "load"]
    );
    assert_eq!(platform.state().frames_created, 2);

    // A fresh runtime: earlier bindings are gone, the prelude is back.
    submit(&mut desktop, "y");
    submit(&mut desktop, "tau / pi");
    let text = platform.terminal_text("repl");
    assert_eq!(text, vec!["`y` is not defined", "2"]);
}

// --- frame ---

#[test]
fn frame_receives_prelude_exactly_once() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);

    desktop
        .send(&id("editor"), &id("frame"), Message::focus())
        .unwrap();
    desktop
        .send(&id("editor"), &id("frame"), Message::load("1 + 1"))
        .unwrap();
    desktop
        .send(&id("editor"), &id("frame"), Message::load("2 + 2"))
        .unwrap();

    assert_eq!(
        platform.frame_commands("frame"),
        vec!["focus", "prelude", "load", "load"]
    );
    let posts = platform.state().frame_posts.clone();
    assert!(posts.iter().all(|p| p.origin == "*"));
    let prelude = Message::from_json(&posts[1].payload).unwrap();
    assert!(prelude.command.data().as_str().unwrap().contains("let pi"));
}

#[test]
fn failed_prelude_is_posted_again_with_the_next_load() {
    let platform = RecordingPlatform::new().with_refused_posts(1);
    let mut desktop = ready(&platform);

    desktop
        .send(&id("editor"), &id("frame"), Message::load("1"))
        .unwrap();
    let diagnostics = desktop.take_diagnostics();
    assert!(matches!(
        diagnostics.as_slice(),
        [Diagnostic::Window(WindowError::Runtime(_))]
    ));
    assert!(platform.frame_commands("frame").is_empty());

    desktop
        .send(&id("editor"), &id("frame"), Message::load("2"))
        .unwrap();
    assert_eq!(platform.frame_commands("frame"), vec!["prelude", "load"]);
}

#[test]
fn refused_blur_still_releases_focus() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);
    desktop.focus(&id("frame")).unwrap();
    assert_eq!(desktop.focused(), Some(&id("frame")));

    platform.state().refused_posts = 1;
    desktop.blur(&id("frame")).unwrap();
    assert_eq!(desktop.focused(), None);
    assert!(desktop.diagnostics().is_empty());
    assert_eq!(platform.frame_commands("frame"), vec!["focus"]);
}

#[test]
fn frame_rejects_messages_before_stabilise() {
    let platform = RecordingPlatform::new();
    let mut desktop = build(&platform, inline_config());
    desktop.activate().unwrap();

    desktop
        .send(&id("editor"), &id("frame"), Message::load("1"))
        .unwrap();
    let diagnostics = desktop.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(
        diagnostics[0],
        Diagnostic::Window(WindowError::NotReady { .. })
    ));
    assert!(platform.frame_commands("frame").is_empty());
}

// --- routing ---

#[test]
fn unresolved_route_is_reported_not_fatal() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);

    let err = desktop
        .send(&id("editor"), &id("ghost"), Message::load("1"))
        .unwrap_err();
    assert!(matches!(err, DesktopError::UnresolvedRoute { ref to, .. } if to.as_str() == "ghost"));
    assert_eq!(desktop.diagnostics().len(), 1);
    assert_eq!(
        desktop.diagnostics()[0].to_string(),
        "cannot route `load` from `editor` to unknown window `ghost`"
    );

    submit(&mut desktop, "1 + 1");
    assert_eq!(platform.terminal_text("repl"), vec!["2"]);
}

#[test]
fn unknown_command_is_a_diagnostic() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);

    desktop
        .send(&id("editor"), &id("repl"), Message::save())
        .unwrap();
    let diagnostics = desktop.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].to_string().contains("unknown command `save`"));

    submit(&mut desktop, "3 * 3");
    assert_eq!(platform.terminal_text("repl"), vec!["9"]);
}

// --- console ---

#[test]
fn save_load_round_trip_loads_once() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);

    desktop.input(&id("repl"), InputEvent::LoadBuffer).unwrap();
    desktop.run_pending();
    assert_eq!(platform.terminal_text("repl"), vec!["Buffer loaded."]);

    submit(&mut desktop, "x");
    assert_eq!(platform.terminal_text("repl"), vec!["Buffer loaded.", "20"]);
    assert!(desktop.diagnostics().is_empty());
}

#[test]
fn load_with_a_stale_token_is_ignored() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);

    desktop
        .send(
            &id("editor"),
            &id("repl"),
            Message::load("let x = 1").with_token("deadbeef"),
        )
        .unwrap();
    desktop.run_pending();
    assert!(platform.terminal_text("repl").is_empty());

    // An editor-initiated push carries no token and is always accepted.
    desktop
        .input(&id("editor"), InputEvent::Binding(Binding::SendToRepl))
        .unwrap();
    desktop.run_pending();
    assert_eq!(platform.terminal_text("repl"), vec!["Buffer loaded."]);
}

#[test]
fn expand_sentinel_echoes_bindings() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);

    submit(&mut desktop, "1+1");
    submit(&mut desktop, "&1+1");
    submit(&mut desktop, "let a = 4");
    submit(&mut desktop, "&let b = 5");
    submit(&mut desktop, "print(\"hi\")");

    assert_eq!(platform.terminal_text("repl"), vec!["2", "2", "5", "hi"]);
}

#[test]
fn compile_errors_reach_editor_and_console() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);

    submit(&mut desktop, "1 +");

    let text = platform.terminal_text("repl");
    assert_eq!(text[0], "At line 1, column 3:");
    assert_eq!(text[1], "");
    assert_eq!(text[2], "1 +");
    assert_eq!(text[3], "   ^");
    assert_eq!(text[4], "   |");
    assert!(text[5].contains("expected an expression"));

    let annotations = platform.editor("editor").unwrap().annotations;
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].row, 0);
    assert_eq!(annotations[0].column, 3);
}

#[test]
fn events_from_a_released_runtime_are_dropped() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);

    desktop
        .input(&id("repl"), InputEvent::Command("1 + 1".into()))
        .unwrap();
    desktop.cleanup().unwrap();
    desktop.activate().unwrap();
    desktop.stabilise().unwrap();

    assert_eq!(desktop.run_pending(), 1);
    assert!(platform.terminal_text("repl").is_empty());
    assert!(desktop.diagnostics().is_empty());
}

#[test]
fn output_before_stabilise_is_flushed_to_the_terminal() {
    let platform = RecordingPlatform::new();
    let mut desktop = build(&platform, inline_config());
    desktop.activate().unwrap();

    desktop
        .send(&id("editor"), &id("repl"), Message::load("let z = 1"))
        .unwrap();
    desktop.run_pending();
    assert!(platform.terminal("repl").is_none());

    desktop.stabilise().unwrap();
    assert_eq!(platform.terminal_text("repl"), vec!["Buffer loaded."]);
}

#[test]
fn terminal_grid_fits_the_pane() {
    let platform = RecordingPlatform::new()
        .with_pane("repl", 801.0, 480.0)
        .with_sample(400.9, 16.5)
        .with_calibration(Calibration {
            fractional_rects: false,
        });
    let _desktop = ready(&platform);

    let terminal = platform.terminal("repl").unwrap();
    assert_eq!(terminal.grid, GridSize { cols: 200, rows: 30 });
    assert!(terminal.options.prompt.contains("λ "));
}

#[test]
fn unmeasurable_pane_uses_the_fallback_grid() {
    let platform = RecordingPlatform::new();
    let _desktop = ready(&platform);
    let terminal = platform.terminal("repl").unwrap();
    assert_eq!(terminal.grid, GridSize { cols: 80, rows: 24 });
}

#[test]
fn character_size_change_resizes_the_terminal() {
    let platform = RecordingPlatform::new()
        .with_pane("repl", 800.0, 480.0)
        .with_sample(400.0, 16.0);
    let mut desktop = ready(&platform);

    platform.state().sample = Some(livedesk_desktop::metrics::SampleRect {
        width: 800.0,
        height: 20.0,
    });
    desktop
        .input(&id("repl"), InputEvent::CharacterSizeChanged)
        .unwrap();

    let terminal = platform.terminal("repl").unwrap();
    assert_eq!(terminal.grid, GridSize { cols: 100, rows: 24 });
}

// --- focus ---

#[test]
fn focus_out_hands_focus_to_the_peer() {
    let platform = RecordingPlatform::new();
    let mut desktop = ready(&platform);

    desktop.focus(&id("repl")).unwrap();
    assert_eq!(desktop.focused(), Some(&id("repl")));

    desktop.input(&id("repl"), InputEvent::FocusOut).unwrap();
    assert_eq!(desktop.focused(), Some(&id("editor")));
    assert!(platform.editor("editor").unwrap().focused);

    desktop.input(&id("editor"), InputEvent::Binding(Binding::Blur)).unwrap();
    assert_eq!(desktop.focused(), None);
}

#[test]
fn global_shortcut_lives_between_stabilise_and_cleanup() {
    let platform = RecordingPlatform::new();
    let mut desktop = build(&platform, inline_config());
    let ctrl_o = KeyCombo::parse("Ctrl+O").unwrap();

    desktop.activate().unwrap();
    assert!(!desktop.key_down(&ctrl_o));

    desktop.stabilise().unwrap();
    assert_eq!(desktop.shortcut(), Some(&ctrl_o));
    assert!(!desktop.key_down(&KeyCombo::parse("Ctrl+P").unwrap()));
    assert!(desktop.key_down(&ctrl_o));
    assert_eq!(desktop.focused(), Some(&id("editor")));

    desktop.cleanup().unwrap();
    assert!(desktop.shortcut().is_none());
    assert!(!desktop.key_down(&ctrl_o));
}

#[test]
fn editor_binds_its_keys() {
    let platform = RecordingPlatform::new();
    let _desktop = ready(&platform);

    let editor = platform.editor("editor").unwrap();
    assert_eq!(editor.mode.as_deref(), Some("calc"));
    assert_eq!(editor.options.unwrap().tab_size, 2);
    let bound: Vec<Binding> = editor.bindings.iter().map(|(_, b)| *b).collect();
    assert_eq!(
        bound,
        vec![Binding::SendToRepl, Binding::FocusTarget, Binding::Blur]
    );
}

// --- worker isolation ---

#[tokio::test]
async fn worker_results_arrive_on_a_later_turn() {
    let platform = RecordingPlatform::new();
    let mut desktop = build(&platform, LivedeskConfig::default());
    desktop.activate().unwrap();
    desktop.stabilise().unwrap();

    desktop
        .input(&id("repl"), InputEvent::Command("&tau > pi".into()))
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), desktop.next_turn())
        .await
        .unwrap();
    assert_eq!(platform.terminal_text("repl"), vec!["true"]);

    desktop.cleanup().unwrap();
}
