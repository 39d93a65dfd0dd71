use vim_modal::{
    Engine, ModeKind, Operation, Operations, Position, RegisterKind, RegisterValue, ScrollKind, TabTarget,
};

mod support;
use support::{MockHost, feed, run};

#[test]
fn test_dd_deletes_line() {
    let (_, host) = run("a\nb\nc\n", 1, 0, "dd");
    assert_eq!(host.text(), "a\nc\n");
    assert_eq!(host.cursor(), Position::new(1, 0));
}

#[test]
fn test_dd_on_last_line_moves_up() {
    let (_, host) = run("a\nb\n", 1, 0, "dd");
    assert_eq!(host.text(), "a\n");
    assert_eq!(host.cursor(), Position::new(0, 0));
}

#[test]
fn test_dd_on_only_line_empties_buffer() {
    let (mut engine, host) = run("abc", 0, 1, "dd");
    assert_eq!(host.text(), "");
    assert_eq!(host.cursor(), Position::ZERO);
    assert_eq!(
        engine.context_mut().registers.unnamed(),
        Some(RegisterValue::new("abc\n", RegisterKind::LineWise))
    );
}

#[test]
fn test_delete_to_line_end() {
    let (_, host) = run("hello world", 0, 5, "D");
    assert_eq!(host.text(), "hello");
    assert_eq!(host.cursor(), Position::new(0, 4));
}

#[test]
fn test_x_and_capital_x() {
    let (_, host) = run("abc", 0, 2, "x");
    assert_eq!(host.text(), "ab");
    assert_eq!(host.cursor(), Position::new(0, 1));
    let (_, host) = run("abc", 0, 2, "X");
    assert_eq!(host.text(), "ac");
    assert_eq!(host.cursor(), Position::new(0, 1));
}

#[test]
fn test_x_on_empty_line_does_nothing() {
    let (_, host) = run("\nabc\n", 0, 0, "x");
    assert_eq!(host.text(), "\nabc\n");
    assert!(host.errors.is_empty());
}

#[test]
fn test_yank_line_and_put() {
    let (_, host) = run("a\nb\n", 0, 0, "yyp");
    assert_eq!(host.text(), "a\na\nb\n");
    assert_eq!(host.cursor(), Position::new(1, 0));
    let (_, host) = run("a\nb\n", 1, 0, "yyP");
    assert_eq!(host.text(), "a\nb\nb\n");
    assert_eq!(host.cursor(), Position::new(1, 0));
}

#[test]
fn test_put_with_count() {
    let (_, host) = run("a\n", 0, 0, "yy3p");
    assert_eq!(host.text(), "a\na\na\na\n");
    let (_, host) = run("ab", 0, 0, "yl2p");
    assert_eq!(host.text(), "aaab");
}

#[test]
fn test_put_with_huge_count_is_an_error() {
    let (mut engine, mut host) = run("abcdefgh", 0, 0, "yl4000000000p");
    assert_eq!(host.text(), "abcdefgh");
    assert_eq!(host.errors, vec!["E1240: Resulting text too long".to_string()]);
    assert_eq!(host.beeps, 1);
    assert!(!engine.is_waiting_for_input());
    feed(&mut engine, &mut host, "p");
    assert_eq!(host.text(), "aabcdefgh");

    let (_, host) = run("a
", 0, 0, "yy100000000p");
    assert_eq!(host.text(), "a
");
    assert_eq!(host.errors, vec!["E1240: Resulting text too long".to_string()]);
}

#[test]
fn test_swap_characters() {
    let (_, host) = run("abc", 0, 0, "xp");
    assert_eq!(host.text(), "bac");
    assert_eq!(host.cursor(), Position::new(0, 1));
}

#[test]
fn test_charwise_put_before() {
    let (_, host) = run("foo bar", 0, 0, "ywP");
    assert_eq!(host.text(), "foo foo bar");
    assert_eq!(host.cursor(), Position::new(0, 3));
}

#[test]
fn test_named_register_and_append() {
    let (_, host) = run("one\ntwo\n", 0, 0, "\"ayyj\"ap");
    assert_eq!(host.text(), "one\ntwo\none\n");

    let (mut engine, _) = run("foo bar", 0, 0, "\"ayww\"Ayw");
    assert_eq!(
        engine.context_mut().registers.get('a'),
        Some(RegisterValue::new("foo bar", RegisterKind::CharacterWise))
    );
}

#[test]
fn test_delete_feeds_numbered_and_small_delete_registers() {
    let (mut engine, _) = run("one\ntwo\nthree four\n", 0, 0, "dddd");
    let registers = &mut engine.context_mut().registers;
    assert_eq!(registers.get('1').map(|v| v.text), Some("two\n".to_string()));
    assert_eq!(registers.get('2').map(|v| v.text), Some("one\n".to_string()));

    let (mut engine, _) = run("three four", 0, 0, "dw");
    assert_eq!(
        engine.context_mut().registers.get('-').map(|v| v.text),
        Some("three ".to_string())
    );
}

#[test]
fn test_black_hole_register_keeps_unnamed() {
    let (mut engine, host) = run("abc", 0, 0, "yl\"_x");
    assert_eq!(host.text(), "bc");
    assert_eq!(engine.context_mut().registers.unnamed().map(|v| v.text), Some("a".into()));
}

#[test]
fn test_put_from_empty_register_is_an_error() {
    let (_, host) = run("abc", 0, 0, "p");
    assert_eq!(host.errors, vec!["E353: Nothing in register \"".to_string()]);
    assert_eq!(host.text(), "abc");
}

#[test]
fn test_yank_into_read_only_register_is_an_error() {
    let (_, host) = run("abc", 0, 0, "\".yy");
    assert_eq!(host.errors, vec!["E354: Invalid register name: '.'".to_string()]);
}

#[test]
fn test_yank_text_object_moves_to_start() {
    let (mut engine, host) = run("foo bar", 0, 5, "yiw");
    assert_eq!(host.cursor(), Position::new(0, 4));
    assert_eq!(engine.context_mut().registers.get('0').map(|v| v.text), Some("bar".into()));
}

#[test]
fn test_delete_word_objects() {
    assert_eq!(run("foo bar baz", 0, 5, "diw").1.text(), "foo  baz");
    assert_eq!(run("foo bar baz", 0, 5, "daw").1.text(), "foo baz");
}

#[test]
fn test_join_lines() {
    let (_, host) = run("a\n  b\nc\n", 0, 0, "J");
    assert_eq!(host.text(), "a b\nc\n");
    assert_eq!(host.cursor(), Position::new(0, 1));

    let (_, host) = run("a\n  b\nc\n", 0, 0, "3J");
    assert_eq!(host.text(), "a b c\n");
    assert_eq!(host.cursor(), Position::new(0, 3));

    let (_, host) = run("a\n  b\nc\n", 0, 0, "gJ");
    assert_eq!(host.text(), "a  b\nc\n");
}

#[test]
fn test_join_on_last_line_is_an_error() {
    let (_, host) = run("a\nb\n", 1, 0, "J");
    assert_eq!(host.errors, vec!["Cannot join lines: not enough lines".to_string()]);
    assert_eq!(host.text(), "a\nb\n");
}

#[test]
fn test_toggle_case() {
    let (_, host) = run("abc", 0, 0, "~");
    assert_eq!(host.text(), "Abc");
    assert_eq!(host.cursor(), Position::new(0, 1));
    let (_, host) = run("abc", 0, 0, "5~");
    assert_eq!(host.text(), "ABC");
    assert_eq!(host.cursor(), Position::new(0, 2));
}

#[test]
fn test_case_operators() {
    assert_eq!(run("foo bar", 0, 0, "g~iw").1.text(), "FOO bar");
    assert_eq!(run("foo bar\nx\n", 0, 3, "gUU").1.text(), "FOO BAR\nx\n");
    assert_eq!(run("FOO BAR", 0, 0, "guu").1.text(), "foo bar");
    assert_eq!(run("foo bar", 0, 0, "gUw").1.text(), "FOO bar");
}

#[test]
fn test_shift_lines() {
    let (_, host) = run("a\nb\n", 0, 0, ">>");
    assert_eq!(host.text(), "    a\nb\n");
    assert_eq!(host.cursor(), Position::new(0, 4));

    let (_, host) = run("a\nb\nc\n", 0, 0, "2>>");
    assert_eq!(host.text(), "    a\n    b\nc\n");

    let (_, host) = run("    a\nb\n", 0, 0, "<lt><lt>");
    assert_eq!(host.text(), "a\nb\n");

    let (_, host) = run("a\nb\nc\n", 0, 0, ">j");
    assert_eq!(host.text(), "    a\n    b\nc\n");
}

#[test]
fn test_replace_char() {
    let (_, host) = run("abcd", 0, 1, "rx");
    assert_eq!(host.text(), "axcd");
    assert_eq!(host.cursor(), Position::new(0, 1));

    let (_, host) = run("abcd", 0, 0, "3rx");
    assert_eq!(host.text(), "xxxd");
    assert_eq!(host.cursor(), Position::new(0, 2));

    let (_, host) = run("ab cd", 0, 2, "r<CR>");
    assert_eq!(host.text(), "ab\ncd");
    assert_eq!(host.cursor(), Position::new(1, 0));
}

#[test]
fn test_replace_past_line_end_is_an_error() {
    let (_, host) = run("abcd", 0, 0, "5rx");
    assert_eq!(host.text(), "abcd");
    assert_eq!(host.errors, vec!["Not enough characters to replace".to_string()]);
}

#[test]
fn test_change_word() {
    let (engine, host) = run("foo bar", 0, 0, "cw");
    assert_eq!(engine.mode(), ModeKind::Insert);
    assert_eq!(host.text(), " bar");

    let (engine, host) = run("foo bar", 0, 0, "cwX<Esc>");
    assert_eq!(engine.mode(), ModeKind::Normal);
    assert_eq!(host.text(), "X bar");
}

#[test]
fn test_change_lines_keeps_one_line() {
    let (_, host) = run("  foo\nbar\n", 0, 2, "ccx<Esc>");
    assert_eq!(host.text(), "x\nbar\n");
    let (_, host) = run("  foo\nbar\n", 0, 2, "Sx<Esc>");
    assert_eq!(host.text(), "x\nbar\n");
}

#[test]
fn test_change_shortcuts() {
    assert_eq!(run("abc def", 0, 4, "Cx<Esc>").1.text(), "abc x");
    assert_eq!(run("abc", 0, 0, "sx<Esc>").1.text(), "xbc");
}

#[test]
fn test_yank_and_change_with_empty_motion() {
    let (engine, host) = run("abc", 0, 0, "d0");
    assert_eq!(host.text(), "abc");
    assert_eq!(engine.mode(), ModeKind::Normal);
    let (engine, _) = run("abc", 0, 0, "c0");
    assert_eq!(engine.mode(), ModeKind::Insert);
}

#[test]
fn test_undo_and_redo_are_forwarded() {
    let (_, host) = run("abc", 0, 0, "u3<C-r>");
    assert!(host.ops.contains(&Operation::Undo { count: 1 }));
    assert!(host.ops.contains(&Operation::Redo { count: 3 }));
}

#[test]
fn test_scroll_commands() {
    let (_, host) = run("abc", 0, 0, "<C-e><C-d>5<C-u>");
    assert!(host.ops.contains(&Operation::Scroll {
        kind: ScrollKind::LineDown,
        count: 1,
    }));
    assert!(host.ops.contains(&Operation::Scroll {
        kind: ScrollKind::HalfPageDown,
        count: 0,
    }));
    assert!(host.ops.contains(&Operation::Scroll {
        kind: ScrollKind::HalfPageUp,
        count: 5,
    }));
}

#[test]
fn test_tab_commands() {
    let (_, host) = run("abc", 0, 0, "gt3gt2gT");
    let tabs: Vec<TabTarget> = host
        .ops
        .iter()
        .filter_map(|op| match op {
            Operation::GoToTab(target) => Some(*target),
            _ => None,
        })
        .collect();
    assert_eq!(
        tabs,
        vec![TabTarget::Next, TabTarget::Index(3), TabTarget::Previous, TabTarget::Previous]
    );
}

#[test]
fn test_operator_escape_leaves_text_alone() {
    let mut engine = Engine::new();
    let mut host = MockHost::new("abc");
    feed(&mut engine, &mut host, "d<Esc>");
    assert!(!engine.is_waiting_for_input());
    feed(&mut engine, &mut host, "x");
    assert_eq!(host.text(), "bc");
}
