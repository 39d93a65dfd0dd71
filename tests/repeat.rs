use vim_modal::{Engine, KeyInput, Operations, Position, ProcessResult, RepeatableChange, VimError};

mod support;
use support::{MockHost, feed};

fn session(text: &str, line: u32, col: u32) -> (Engine, MockHost) {
    (Engine::new(), MockHost::at(text, line, col))
}

#[test]
fn test_repeat_count_overrides_recorded_count_once() {
    let (mut engine, mut host) = session("abcdefghijklmnop", 0, 12);
    engine.context_mut().changes.set_last_change(RepeatableChange::Normal {
        keys: vec![KeyInput::from_char('h')],
        count: Some(3),
        register: None,
    });
    feed(&mut engine, &mut host, ".");
    assert_eq!(host.cursor(), Position::new(0, 9));
    feed(&mut engine, &mut host, ".");
    assert_eq!(host.cursor(), Position::new(0, 6));
    feed(&mut engine, &mut host, "2.");
    assert_eq!(host.cursor(), Position::new(0, 4));
    feed(&mut engine, &mut host, ".");
    assert_eq!(host.cursor(), Position::new(0, 1));
}

#[test]
fn test_recursive_repeat_reports_once_per_press() {
    let (mut engine, mut host) = session("abc", 0, 0);
    engine.context_mut().changes.set_last_change(RepeatableChange::Normal {
        keys: vec![KeyInput::from_char('.')],
        count: None,
        register: None,
    });
    let result = feed(&mut engine, &mut host, ".");
    assert!(matches!(result, ProcessResult::Error(VimError::RecursiveRepeat)));
    assert_eq!(host.errors, vec!["Cannot repeat a repeat command recursively".to_string()]);
    assert_eq!(host.beeps, 1);
    assert!(!engine.context().changes.is_repeating());

    feed(&mut engine, &mut host, ".");
    assert_eq!(host.errors.len(), 2);
    assert!(!engine.is_waiting_for_input());
}

#[test]
fn test_nothing_to_repeat() {
    let (mut engine, mut host) = session("abc", 0, 0);
    let result = feed(&mut engine, &mut host, ".");
    assert!(result.is_error());
    assert_eq!(host.errors, vec!["No previous change to repeat".to_string()]);
}

#[test]
fn test_repeat_delete_char() {
    let (mut engine, mut host) = session("abcd", 0, 0);
    feed(&mut engine, &mut host, "x..");
    assert_eq!(host.text(), "d");
}

#[test]
fn test_repeat_keeps_recorded_count() {
    let (mut engine, mut host) = session("abcdefgh", 0, 0);
    feed(&mut engine, &mut host, "3x");
    assert_eq!(host.text(), "defgh");
    feed(&mut engine, &mut host, "2.");
    assert_eq!(host.text(), "fgh");
    feed(&mut engine, &mut host, ".");
    assert_eq!(host.text(), "");
}

#[test]
fn test_repeat_line_delete() {
    let (mut engine, mut host) = session("1\n2\n3\n4\n", 0, 0);
    feed(&mut engine, &mut host, "dd.");
    assert_eq!(host.text(), "3\n4\n");
}

#[test]
fn test_repeat_with_register() {
    let (mut engine, mut host) = session("1\n2\n3\n", 0, 0);
    feed(&mut engine, &mut host, "\"add.");
    assert_eq!(host.text(), "3\n");
    let a = engine.context_mut().registers.get('a').map(|v| v.text);
    assert_eq!(a, Some("2\n".to_string()));
}

#[test]
fn test_repeat_change_word() {
    let (mut engine, mut host) = session("foo foo foo", 0, 0);
    feed(&mut engine, &mut host, "cwbar<Esc>");
    assert_eq!(host.text(), "bar foo foo");
    feed(&mut engine, &mut host, "w.");
    assert_eq!(host.text(), "bar bar foo");
    assert_eq!(host.cursor(), Position::new(0, 6));
}

#[test]
fn test_repeat_append_on_next_line() {
    let (mut engine, mut host) = session("a\nb\n", 0, 0);
    feed(&mut engine, &mut host, "A;<Esc>j.");
    assert_eq!(host.text(), "a;\nb;\n");
}

#[test]
fn test_repeat_insert() {
    let (mut engine, mut host) = session("", 0, 0);
    feed(&mut engine, &mut host, "ix<Esc>.");
    assert_eq!(host.text(), "xx");
    let (mut engine, mut host) = session("", 0, 0);
    feed(&mut engine, &mut host, "2ia<Esc>.");
    assert_eq!(host.text(), "aaaa");
}

#[test]
fn test_repeat_open_line() {
    let (mut engine, mut host) = session("a\n", 0, 0);
    feed(&mut engine, &mut host, "ob<Esc>.");
    assert_eq!(host.text(), "a\nb\nb\n");
}

#[test]
fn test_repeat_replace_mode() {
    let (mut engine, mut host) = session("abcdef", 0, 0);
    feed(&mut engine, &mut host, "Rxy<Esc>l.");
    assert_eq!(host.text(), "xyxyef");
    assert_eq!(host.cursor(), Position::new(0, 3));
}

#[test]
fn test_repeat_replace_char() {
    let (mut engine, mut host) = session("abcdef", 0, 0);
    feed(&mut engine, &mut host, "2rxl.");
    assert_eq!(host.text(), "xxxxef");
}

#[test]
fn test_undo_and_yank_are_not_recorded() {
    let (mut engine, mut host) = session("abcd", 0, 0);
    feed(&mut engine, &mut host, "xuyy.");
    assert_eq!(host.text(), "cd");
}

#[test]
fn test_escape_after_operator_keeps_last_change() {
    let (mut engine, mut host) = session("abcd", 0, 0);
    feed(&mut engine, &mut host, "xd<Esc>.");
    assert_eq!(host.text(), "cd");
}

#[test]
fn test_repeat_visual_change() {
    let (mut engine, mut host) = session("abcdef", 0, 0);
    feed(&mut engine, &mut host, "vlcX<Esc>");
    assert_eq!(host.text(), "Xcdef");
    feed(&mut engine, &mut host, "l.");
    assert_eq!(host.text(), "XXef");
}

#[test]
fn test_repeat_append_after_erasing_old_text() {
    let (mut engine, mut host) = session("abc\ndef\n", 0, 0);
    feed(&mut engine, &mut host, "A<BS>x<Esc>j.");
    assert_eq!(host.text(), "abx\ndex\n");
    assert_eq!(host.cursor(), Position::new(1, 2));
}

#[test]
fn test_repeat_erase_past_typed_text() {
    let (mut engine, mut host) = session("ab\ncd\n", 0, 0);
    feed(&mut engine, &mut host, "Axy<BS><BS><BS>z<Esc>");
    assert_eq!(host.text(), "az\ncd\n");
    assert_eq!(engine.context_mut().registers.get('.').map(|v| v.text), Some("z".into()));
    feed(&mut engine, &mut host, "j.");
    assert_eq!(host.text(), "az\ncz\n");
}

#[test]
fn test_repeat_forward_delete_in_insert() {
    let (mut engine, mut host) = session("abc\ndef\n", 0, 0);
    feed(&mut engine, &mut host, "i<Del>x<Esc>j0.");
    assert_eq!(host.text(), "xbc\nxef\n");
}

#[test]
fn test_repeat_backspace_across_line_break() {
    let (mut engine, mut host) = session("ab\ncd\nef\n", 1, 0);
    feed(&mut engine, &mut host, "i<BS><Esc>");
    assert_eq!(host.text(), "abcd\nef\n");
    feed(&mut engine, &mut host, "j0.");
    assert_eq!(host.text(), "abcdef\n");
    assert_eq!(host.cursor(), Position::new(0, 3));
}

#[test]
fn test_repeat_with_huge_count_is_an_error() {
    let (mut engine, mut host) = session("", 0, 0);
    feed(&mut engine, &mut host, "ix<Esc>");
    let result = feed(&mut engine, &mut host, "4000000000.");
    assert!(matches!(result, ProcessResult::Error(VimError::TextTooLong)));
    assert_eq!(host.text(), "x");
    assert_eq!(host.errors, vec!["E1240: Resulting text too long".to_string()]);
    assert!(!engine.context().changes.is_repeating());
}
