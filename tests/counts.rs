use vim_modal::{Operations, Position, RegisterKind, RegisterValue};

mod support;
use support::{MockHost, run};

const LINES: &str = "1\n2\n3\n4\n5\n6\n";

#[test]
fn test_count_moves_cursor() {
    let (_, host) = run("abcdefgh", 0, 0, "3l");
    assert_eq!(host.cursor(), Position::new(0, 3));
}

#[test]
fn test_count_clamps_at_line_end() {
    let (_, host) = run("abcdefgh", 0, 0, "12l");
    assert_eq!(host.cursor(), Position::new(0, 7));
    assert!(host.errors.is_empty());
}

#[test]
fn test_multi_digit_count_with_zero() {
    let (_, host) = run("abcdefghijklmnop", 0, 0, "10l");
    assert_eq!(host.cursor(), Position::new(0, 10));
}

#[test]
fn test_zero_alone_is_line_start() {
    let (_, host) = run("abc def", 0, 5, "0");
    assert_eq!(host.cursor(), Position::ZERO);
}

#[test]
fn test_operator_and_motion_counts_multiply() {
    let (_, host) = run("a b c d e f g h", 0, 0, "2d3w");
    assert_eq!(host.text(), "g h");
}

#[test]
fn test_line_counts() {
    assert_eq!(run(LINES, 0, 0, "2dd").1.text(), "3\n4\n5\n6\n");
    assert_eq!(run(LINES, 0, 0, "d2d").1.text(), "3\n4\n5\n6\n");
    assert_eq!(run(LINES, 0, 0, "2d2d").1.text(), "5\n6\n");
}

#[test]
fn test_count_past_last_line_deletes_to_end() {
    let (_, host) = run(LINES, 4, 0, "5dd");
    assert_eq!(host.text(), "1\n2\n3\n4\n");
    assert_eq!(host.cursor(), Position::new(3, 0));
}

#[test]
fn test_count_on_simple_command() {
    let (_, host) = run("abcdef", 0, 0, "3x");
    assert_eq!(host.text(), "def");
}

#[test]
fn test_register_and_count_in_either_order() {
    for notation in ["\"a3yy", "3\"ayy"] {
        let (mut engine, host) = run(LINES, 0, 0, notation);
        assert_eq!(
            engine.context_mut().registers.get('a'),
            Some(RegisterValue::new("1\n2\n3\n", RegisterKind::LineWise)),
            "{notation}"
        );
        assert_eq!(host.text(), LINES);
    }
}

#[test]
fn test_count_for_line_motions() {
    let (_, host) = run(LINES, 0, 0, "3G");
    assert_eq!(host.cursor(), Position::new(2, 0));
    let (_, host) = run(LINES, 5, 0, "2gg");
    assert_eq!(host.cursor(), Position::new(1, 0));
    let (_, host) = run(LINES, 0, 0, "4j");
    assert_eq!(host.cursor(), Position::new(4, 0));
}

#[test]
fn test_escape_drops_count() {
    let mut engine = vim_modal::Engine::new();
    let mut host = MockHost::new("abcdef");
    support::feed(&mut engine, &mut host, "3<Esc>x");
    assert_eq!(host.text(), "bcdef");
}
