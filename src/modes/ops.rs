//! Operators shared by normal and visual mode.

use crate::context::Context;
use crate::error::VimError;
use crate::marks::LAST_CHANGE;
use crate::motion::{self, MotionData};
use crate::register::{RegisterKind, RegisterOperation};
use crate::traits::{Host, TextOps};
use crate::types::{OperationKind, Operation, Position, Range, ShiftDirection};

use super::{grapheme_len, repeated, set_normal_caret};

/// The text an operator works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Span {
    Chars(Range),
    /// Whole lines `first..=last`.
    Lines { first: u32, last: u32 },
    /// Columns `left..right` of lines `first..=last`.
    Block {
        first: u32,
        last: u32,
        left: u32,
        right: u32,
    },
}

/// An operator: a command that works on the text a motion or a visual
/// selection covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Delete,
    Yank,
    Change,
    Shift(ShiftDirection),
    Case(CaseChange),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseChange {
    Toggle,
    Lower,
    Upper,
}

impl CaseChange {
    pub fn apply(self, text: &str) -> String {
        match self {
            CaseChange::Lower => text.to_lowercase(),
            CaseChange::Upper => text.to_uppercase(),
            CaseChange::Toggle => text
                .chars()
                .flat_map(|c| -> Box<dyn Iterator<Item = char>> {
                    if c.is_uppercase() {
                        Box::new(c.to_lowercase())
                    } else if c.is_lowercase() {
                        Box::new(c.to_uppercase())
                    } else {
                        Box::new(std::iter::once(c))
                    }
                })
                .collect(),
        }
    }
}

impl Span {
    pub(crate) fn from_motion(data: &MotionData) -> Self {
        match data.operation_kind {
            OperationKind::LineWise => Span::Lines {
                first: data.span.start.line,
                last: data.span.end.line.saturating_sub(1).max(data.span.start.line),
            },
            OperationKind::CharacterWise => Span::Chars(data.span),
        }
    }

    pub(crate) fn register_kind(&self) -> RegisterKind {
        match self {
            Span::Chars(_) => RegisterKind::CharacterWise,
            Span::Lines { .. } => RegisterKind::LineWise,
            Span::Block { .. } => RegisterKind::BlockWise,
        }
    }

    pub(crate) fn first_line(&self) -> u32 {
        match *self {
            Span::Chars(range) => range.start.line,
            Span::Lines { first, .. } | Span::Block { first, .. } => first,
        }
    }

    pub(crate) fn last_line(&self) -> u32 {
        match *self {
            Span::Chars(range) => range.end.line,
            Span::Lines { last, .. } | Span::Block { last, .. } => last,
        }
    }

    pub(crate) fn start(&self) -> Position {
        match *self {
            Span::Chars(range) => range.start,
            Span::Lines { first, .. } => Position::new(first, 0),
            Span::Block { first, left, .. } => Position::new(first, left),
        }
    }

    /// Per-line ranges of a block, clipped to each line.
    fn block_ranges<T: TextOps + ?Sized>(text: &T, first: u32, last: u32, left: u32, right: u32) -> Vec<Range> {
        (first..=last)
            .map(|line| {
                let len = text.line_len(line);
                Range {
                    start: Position::new(line, left.min(len)),
                    end: Position::new(line, right.min(len)),
                }
            })
            .collect()
    }

    /// The text stored in a register for this span.
    pub(crate) fn text<T: TextOps + ?Sized>(&self, text: &T) -> String {
        match *self {
            Span::Chars(range) => text.slice_to_string(range),
            Span::Lines { first, last } => {
                let mut out = text.slice_to_string(Range {
                    start: Position::new(first, 0),
                    end: Position::new(last + 1, 0),
                });
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out
            }
            Span::Block {
                first,
                last,
                left,
                right,
            } => Self::block_ranges(text, first, last, left, right)
                .into_iter()
                .map(|range| text.slice_to_string(range))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Ranges a delete removes, bottom-most first so earlier ranges stay
    /// valid while later ones are applied.
    fn delete_ranges<T: TextOps + ?Sized>(&self, text: &T) -> Vec<Range> {
        match *self {
            Span::Chars(range) => vec![range],
            Span::Lines { first, last } => vec![motion::line_delete_range(text, first, last)],
            Span::Block {
                first,
                last,
                left,
                right,
            } => {
                let mut ranges = Self::block_ranges(text, first, last, left, right);
                ranges.reverse();
                ranges
            }
        }
    }

    /// Ranges whose characters are rewritten in place (case changes, `r`).
    fn rewrite_ranges<T: TextOps + ?Sized>(&self, text: &T) -> Vec<Range> {
        match *self {
            Span::Chars(range) => vec![range],
            Span::Lines { first, last } => (first..=last)
                .map(|line| Range {
                    start: Position::new(line, 0),
                    end: Position::new(line, text.line_len(line)),
                })
                .collect(),
            Span::Block {
                first,
                last,
                left,
                right,
            } => Self::block_ranges(text, first, last, left, right),
        }
    }
}

pub(crate) fn delete<H: Host>(
    ctx: &mut Context,
    host: &mut H,
    span: Span,
    register: Option<char>,
) -> Result<Position, VimError> {
    let text = span.text(&*host);
    ctx.store_register(register, text, span.register_kind(), RegisterOperation::Delete)?;
    for range in span.delete_ranges(&*host) {
        host.apply(Operation::Delete { range });
    }
    let target = match span {
        Span::Lines { first, .. } => {
            let line = first.min(host.last_line());
            Position::new(line, host.first_non_blank(line))
        }
        _ => span.start(),
    };
    let caret = set_normal_caret(host, target);
    ctx.marks.set_internal(LAST_CHANGE, caret);
    Ok(caret)
}

pub(crate) fn yank<H: Host>(
    ctx: &mut Context,
    host: &mut H,
    span: Span,
    register: Option<char>,
) -> Result<(), VimError> {
    let text = span.text(&*host);
    ctx.store_register(register, text, span.register_kind(), RegisterOperation::Yank)
}

/// Delete the span and leave the caret where insert mode should start.
/// Line-wise changes keep one empty line.
pub(crate) fn change<H: Host>(
    ctx: &mut Context,
    host: &mut H,
    span: Span,
    register: Option<char>,
) -> Result<Position, VimError> {
    let text = span.text(&*host);
    ctx.store_register(register, text, span.register_kind(), RegisterOperation::Delete)?;
    let caret = match span {
        Span::Lines { first, last } => {
            let last = last.min(host.last_line());
            host.apply(Operation::Delete {
                range: Range {
                    start: Position::new(first, 0),
                    end: Position::new(last, host.line_len(last)),
                },
            });
            Position::new(first, 0)
        }
        _ => {
            for range in span.delete_ranges(&*host) {
                host.apply(Operation::Delete { range });
            }
            host.clamp(span.start())
        }
    };
    host.apply(Operation::SetCursor(caret));
    ctx.marks.set_internal(LAST_CHANGE, caret);
    ctx.text_repeat = Default::default();
    Ok(caret)
}

pub(crate) fn change_case<H: Host>(ctx: &mut Context, host: &mut H, span: Span, case: CaseChange) -> Position {
    for range in span.rewrite_ranges(&*host) {
        let before = host.slice_to_string(range);
        let after = case.apply(&before);
        if before != after {
            host.apply(Operation::Replace { range, text: after });
        }
    }
    let caret = set_normal_caret(host, span.start());
    ctx.marks.set_internal(LAST_CHANGE, caret);
    caret
}

/// Replace every character of the span with `with`, keeping line breaks.
pub(crate) fn replace_chars<H: Host>(ctx: &mut Context, host: &mut H, span: Span, with: char) -> Position {
    for range in span.rewrite_ranges(&*host) {
        let original = host.slice_to_string(range);
        let replaced: String = original
            .split('\n')
            .map(|line| with.to_string().repeat(grapheme_len(line) as usize))
            .collect::<Vec<_>>()
            .join("\n");
        host.apply(Operation::Replace { range, text: replaced });
    }
    let caret = set_normal_caret(host, span.start());
    ctx.marks.set_internal(LAST_CHANGE, caret);
    caret
}

pub(crate) fn shift<H: Host>(host: &mut H, span: Span, direction: ShiftDirection, times: u32) -> Position {
    let first = span.first_line();
    let last = span.last_line().min(host.last_line()).max(first);
    for _ in 0..times.max(1) {
        host.apply(Operation::ShiftLines {
            first_line: first,
            count: last - first + 1,
            direction,
        });
    }
    let col = host.first_non_blank(first);
    set_normal_caret(host, Position::new(first, col))
}

/// Join lines `first..=last` into one. `J` collapses the leading
/// whitespace of each joined line into one space; `gJ` keeps it.
pub(crate) fn join_lines<H: Host>(host: &mut H, first: u32, last: u32, spaces: bool) -> Result<Position, VimError> {
    let last = last.min(host.last_line());
    if last <= first {
        return Err(VimError::CannotJoin);
    }
    let mut joined = host.line_text(first).into_owned();
    let mut join_col = 0;
    for line in first + 1..=last {
        let next = host.line_text(line);
        if spaces {
            let trimmed = next.trim_start();
            join_col = grapheme_len(&joined);
            if !trimmed.is_empty()
                && !joined.is_empty()
                && !joined.ends_with([' ', '\t'])
                && !trimmed.starts_with(')')
            {
                joined.push(' ');
            }
            joined.push_str(trimmed);
        } else {
            join_col = grapheme_len(&joined);
            joined.push_str(&next);
        }
    }
    let range = Range {
        start: Position::new(first, 0),
        end: Position::new(last, host.line_len(last)),
    };
    host.apply(Operation::Replace { range, text: joined });
    Ok(set_normal_caret(host, Position::new(first, join_col)))
}

/// Put register text after (`p`) or before (`P`) the cursor `count` times.
pub(crate) fn put<H: Host>(
    host: &mut H,
    cursor: Position,
    text: &str,
    kind: RegisterKind,
    count: u32,
    after: bool,
) -> Result<Position, VimError> {
    let count = count.max(1);
    Ok(match kind {
        RegisterKind::LineWise => {
            let body = text.strip_suffix('\n').unwrap_or(text);
            let block = format!("{body}{}", repeated(body, count - 1, true)?);
            let target_line = if after {
                let len = host.line_len(cursor.line);
                host.apply(Operation::InsertText {
                    at: Position::new(cursor.line, len),
                    text: format!("\n{block}"),
                });
                cursor.line + 1
            } else {
                host.apply(Operation::InsertText {
                    at: Position::new(cursor.line, 0),
                    text: format!("{block}\n"),
                });
                cursor.line
            };
            let col = host.first_non_blank(target_line);
            set_normal_caret(host, Position::new(target_line, col))
        }
        RegisterKind::CharacterWise | RegisterKind::BlockWise => {
            let at = if after && host.line_len(cursor.line) > 0 {
                Position::new(cursor.line, cursor.col + 1)
            } else {
                cursor
            };
            let all = repeated(text, count, false)?;
            let at = host.clamp(at);
            host.apply(Operation::InsertText {
                at,
                text: all.clone(),
            });
            let target = if all.contains('\n') {
                at
            } else {
                Position::new(at.line, (at.col + grapheme_len(&all)).saturating_sub(1))
            };
            set_normal_caret(host, target)
        }
    })
}
