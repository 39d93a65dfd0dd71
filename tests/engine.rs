use vim_modal::{Engine, KeyInput, ModeKind, Operations, Position, ProcessResult, Settings, VimError, VisualKind};

mod support;
use support::{MockClipboard, MockHost, feed};

#[test]
fn test_starts_in_normal_mode() {
    let mut engine = Engine::new();
    let mut host = MockHost::new("abc");
    assert_eq!(engine.mode(), ModeKind::Normal);
    assert_eq!(engine.previous_mode(), None);
    feed(&mut engine, &mut host, "i");
    assert_eq!(engine.mode(), ModeKind::Insert);
    assert_eq!(engine.previous_mode(), Some(ModeKind::Normal));
}

#[test]
fn test_escape_discards_partial_commands() {
    for pending in ["d", "2", "\"a", "g", "f", "r", "m", "2d3", "di", "\"a2y"] {
        let mut engine = Engine::new();
        let mut host = MockHost::new("abc def\nghi\n");
        feed(&mut engine, &mut host, pending);
        assert!(engine.is_waiting_for_input(), "{pending} should wait for more keys");
        feed(&mut engine, &mut host, "<Esc>");
        assert!(!engine.is_waiting_for_input(), "{pending}<Esc> left pending state");
        assert_eq!(engine.snapshot().pending_keys, "");
        assert_eq!(engine.mode(), ModeKind::Normal);
        assert_eq!(host.text(), "abc def\nghi\n");
        assert!(host.errors.is_empty());
        assert_eq!(host.beeps, 0);
    }
}

#[test]
fn test_operator_pending_snapshot() {
    let mut engine = Engine::new();
    let mut host = MockHost::new("abc");
    feed(&mut engine, &mut host, "2d");
    let snapshot = engine.snapshot();
    assert!(snapshot.operator_pending);
    assert!(snapshot.waiting_for_input);
    assert_eq!(snapshot.pending_keys, "2d");
    feed(&mut engine, &mut host, "l");
    assert!(!engine.snapshot().operator_pending);
}

#[test]
fn test_command_line_executes_on_enter() {
    let mut engine = Engine::new();
    let mut host = MockHost::new("abc");
    feed(&mut engine, &mut host, ":wq");
    assert_eq!(engine.mode(), ModeKind::Command);
    assert_eq!(engine.snapshot().command_line.as_deref(), Some("wq"));
    feed(&mut engine, &mut host, "<CR>");
    assert_eq!(engine.mode(), ModeKind::Normal);
    assert_eq!(host.executed_command_lines(), vec!["wq".to_string()]);
    assert_eq!(engine.context_mut().registers.get(':').map(|v| v.text), Some("wq".into()));
    assert_eq!(engine.snapshot().command_line, None);
}

#[test]
fn test_command_line_backspace_and_escape() {
    for notation in [":<BS>", ":ab<BS><BS><BS>", ":abc<Esc>"] {
        let mut engine = Engine::new();
        let mut host = MockHost::new("abc");
        feed(&mut engine, &mut host, notation);
        assert_eq!(engine.mode(), ModeKind::Normal, "{notation}");
        assert!(host.executed_command_lines().is_empty());
    }

    let mut engine = Engine::new();
    let mut host = MockHost::new("abc");
    feed(&mut engine, &mut host, ":ab<BS>c");
    assert_eq!(engine.snapshot().command_line.as_deref(), Some("ac"));
}

#[test]
fn test_tilde_op_setting_rebuilds_commands() {
    let mut engine = Engine::new();
    let mut host = MockHost::new("foo bar");
    engine.set_settings(Settings::from_json(r#"{ "tilde_op": true }"#).unwrap());
    assert!(engine.settings().tilde_op);
    feed(&mut engine, &mut host, "~");
    assert!(engine.snapshot().operator_pending);
    feed(&mut engine, &mut host, "w");
    assert_eq!(host.text(), "FOO bar");

    engine.set_settings(Settings::default());
    feed(&mut engine, &mut host, "w~");
    assert_eq!(host.text(), "FOO Bar");
}

#[test]
fn test_clipboard_registers() {
    let clipboard = MockClipboard::new();
    let mut engine = Engine::builder().clipboard(Box::new(clipboard.clone())).build();
    let mut host = MockHost::new("foo\nbar\n");
    feed(&mut engine, &mut host, "\"+yy");
    assert_eq!(clipboard.content().as_deref(), Some("foo\n"));
    feed(&mut engine, &mut host, "j\"*p");
    assert_eq!(host.text(), "foo\nbar\nfoo\n");
}

#[test]
fn test_clipboard_unnamed_mirrors_yanks() {
    let clipboard = MockClipboard::new();
    let mut engine = Engine::builder().clipboard(Box::new(clipboard.clone())).build();
    engine.set_settings(Settings {
        clipboard_unnamed: true,
        ..Settings::default()
    });
    let mut host = MockHost::new("foo\n");
    feed(&mut engine, &mut host, "yy");
    assert_eq!(clipboard.content().as_deref(), Some("foo\n"));
}

#[test]
fn test_invalid_key_notation() {
    let mut engine = Engine::new();
    let mut host = MockHost::new("abc");
    let result = engine.process_notation(&mut host, "<Bogus>");
    assert!(matches!(result, Err(VimError::InvalidKeyNotation(_))));
    assert_eq!(host.text(), "abc");

    let result = engine.process_notation(&mut host, "x").unwrap();
    assert!(matches!(result, ProcessResult::Processed));
    assert_eq!(host.text(), "bc");
}

#[test]
fn test_commands_lists_first_keys() {
    let engine = Engine::new();
    let commands = engine.commands();
    for c in ['d', 'i', ':', 'g', 'w'] {
        assert!(commands.contains(&KeyInput::from_char(c)), "missing {c}");
    }
}

#[test]
fn test_switch_mode_directly() {
    let mut engine = Engine::new();
    let mut host = MockHost::at("abc", 0, 1);
    engine.switch_mode(&mut host, ModeKind::Insert);
    assert_eq!(engine.mode(), ModeKind::Insert);
    feed(&mut engine, &mut host, "x<Esc>");
    assert_eq!(host.text(), "axbc");
    assert_eq!(engine.mode(), ModeKind::Normal);

    engine.switch_mode(&mut host, ModeKind::Visual(VisualKind::Line));
    assert_eq!(host.selection().map(|s| s.kind), Some(VisualKind::Line));
    engine.switch_mode(&mut host, ModeKind::Normal);
    assert_eq!(host.selection(), None);
    assert_eq!(engine.previous_mode(), Some(ModeKind::Visual(VisualKind::Line)));
}

#[test]
fn test_escape_in_insert_moves_caret_left() {
    let mut engine = Engine::new();
    let mut host = MockHost::at("abc", 0, 3);
    engine.switch_mode(&mut host, ModeKind::Insert);
    feed(&mut engine, &mut host, "<Esc>");
    assert_eq!(host.cursor(), Position::new(0, 2));
}
