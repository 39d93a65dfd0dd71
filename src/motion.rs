//! Motion evaluation.
//!
//! A [`Motion`] plus a count and a cursor evaluates to a [`MotionData`]: the
//! range an operator works on, the caret a plain movement lands on, and the
//! inclusive/exclusive and character/line classification. Evaluation only
//! reads the snapshot; state a motion produces (a new search pattern, a new
//! `f` target) is returned in the result for the caller to store.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::VimError;
use crate::key::{KeyCode, KeyInput, KeyInputSet, Modifiers};
use crate::marks::MarkMap;
use crate::traits::TextOps;
use crate::types::{Direction, MotionKind, OperationKind, Position, Range};
use crate::word::{self, Walker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordKind {
    /// Letters/digits/underscore runs and punctuation runs are distinct words.
    Normal,
    /// Any run of non-blank characters (WORD).
    Big,
}

/// `f`/`F` stop on the target, `t`/`T` stop next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharSearchKind {
    To,
    Till,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharSearch {
    pub kind: CharSearchKind,
    pub direction: Direction,
    pub target: char,
}

/// The last `/`, `?`, `*` or `#` search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub pattern: String,
    pub direction: Direction,
}

/// A motion specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    FirstNonBlank,
    LineEnd,
    Column,
    /// `+` and `<CR>`.
    LineDownFirstNonBlank,
    /// `-`.
    LineUpFirstNonBlank,
    /// `_`, and the doubled operator (`dd`, `yy`, `>>`).
    CurrentLines,
    WordForward(WordKind),
    WordBackward(WordKind),
    WordEnd(WordKind),
    WordEndBackward(WordKind),
    InnerWord(WordKind),
    AroundWord(WordKind),
    FirstLine,
    LastLine,
    ParagraphForward,
    ParagraphBackward,
    FindChar(CharSearch),
    RepeatCharSearch,
    RepeatCharSearchReverse,
    SearchNext,
    SearchPrevious,
    SearchWordUnderCursor(Direction),
    /// `` `x ``: the exact marked position.
    MarkExact(char),
    /// `'x`: the first non-blank of the marked line.
    MarkLine(char),
    MatchingPair,
}

impl Motion {
    /// Motions that set the previous-context mark.
    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Motion::FirstLine
                | Motion::LastLine
                | Motion::SearchNext
                | Motion::SearchPrevious
                | Motion::SearchWordUnderCursor(_)
                | Motion::MarkExact(_)
                | Motion::MarkLine(_)
                | Motion::MatchingPair
                | Motion::ParagraphForward
                | Motion::ParagraphBackward
        )
    }
}

/// Which operator a motion is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorContext {
    /// A plain cursor movement.
    Movement,
    Change,
    /// Delete, yank, shift and case operators.
    Other,
}

/// Session state a motion may read.
#[derive(Debug, Clone, Copy)]
pub struct MotionContext<'a> {
    pub operator: OperatorContext,
    pub char_search: Option<CharSearch>,
    pub last_search: Option<&'a SearchState>,
    pub marks: &'a MarkMap,
    pub wrap_scan: bool,
    /// Sticky column for `j`/`k`; `u32::MAX` sticks to the line end.
    pub preferred_col: Option<u32>,
}

/// A fully evaluated motion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionData {
    /// The range an operator works on, in buffer order. Inclusive motions
    /// already include their last character; line-wise spans include the
    /// line break of their last line.
    pub span: Range,
    pub is_forward: bool,
    pub motion_kind: MotionKind,
    pub operation_kind: OperationKind,
    /// Where a plain movement puts the cursor.
    pub caret: Position,
    /// Sticky column to keep after the move, if any.
    pub column: Option<u32>,
    pub is_jump: bool,
    pub new_char_search: Option<CharSearch>,
    pub new_search: Option<SearchState>,
}

#[derive(Debug)]
pub enum MotionResult {
    Complete(MotionData),
    NeedMoreInput,
    Invalid(VimError),
}

impl MotionResult {
    pub fn into_result(self) -> Result<Option<MotionData>, VimError> {
        match self {
            MotionResult::Complete(data) => Ok(Some(data)),
            MotionResult::NeedMoreInput => Ok(None),
            MotionResult::Invalid(err) => Err(err),
        }
    }
}

// ── Motion table ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Binding {
    Fixed(Motion),
    /// Takes one more key as a character argument (`f{char}`, `'{mark}`).
    WithChar(fn(char) -> Motion),
}

#[derive(Debug, PartialEq, Eq)]
pub enum MotionLookup {
    Found(Motion),
    NeedMoreInput,
    NoMatch,
}

/// Key sequences recognized as motions.
#[derive(Debug, Clone)]
pub struct MotionTable {
    entries: Vec<(KeyInputSet, Binding)>,
}

fn key(code: KeyCode) -> KeyInputSet {
    KeyInputSet::from(KeyInput::from_key(code, Modifiers::empty()))
}

fn ctrl(c: char) -> KeyInputSet {
    KeyInputSet::from(KeyInput::ctrl(c))
}

impl MotionTable {
    /// Motions usable as plain cursor movements.
    pub fn movements() -> Self {
        use Motion::*;
        let fixed: Vec<(KeyInputSet, Motion)> = vec![
            ("h".into(), Left),
            (key(KeyCode::Left), Left),
            (key(KeyCode::Backspace), Left),
            (ctrl('h'), Left),
            ("l".into(), Right),
            (key(KeyCode::Right), Right),
            (" ".into(), Right),
            ("k".into(), Up),
            (key(KeyCode::Up), Up),
            (ctrl('p'), Up),
            ("j".into(), Down),
            (key(KeyCode::Down), Down),
            (ctrl('n'), Down),
            (ctrl('j'), Down),
            ("0".into(), LineStart),
            (key(KeyCode::Home), LineStart),
            ("^".into(), FirstNonBlank),
            ("$".into(), LineEnd),
            (key(KeyCode::End), LineEnd),
            ("|".into(), Column),
            ("+".into(), LineDownFirstNonBlank),
            (key(KeyCode::Enter), LineDownFirstNonBlank),
            ("-".into(), LineUpFirstNonBlank),
            ("_".into(), CurrentLines),
            ("w".into(), WordForward(WordKind::Normal)),
            ("W".into(), WordForward(WordKind::Big)),
            ("b".into(), WordBackward(WordKind::Normal)),
            ("B".into(), WordBackward(WordKind::Big)),
            ("e".into(), WordEnd(WordKind::Normal)),
            ("E".into(), WordEnd(WordKind::Big)),
            ("ge".into(), WordEndBackward(WordKind::Normal)),
            ("gE".into(), WordEndBackward(WordKind::Big)),
            ("gg".into(), FirstLine),
            ("G".into(), LastLine),
            ("}".into(), ParagraphForward),
            ("{".into(), ParagraphBackward),
            (";".into(), RepeatCharSearch),
            (",".into(), RepeatCharSearchReverse),
            ("n".into(), SearchNext),
            ("N".into(), SearchPrevious),
            ("*".into(), SearchWordUnderCursor(Direction::Forward)),
            ("#".into(), SearchWordUnderCursor(Direction::Backward)),
            ("%".into(), MatchingPair),
        ];
        let with_char: [(&str, fn(char) -> Motion); 6] = [
            ("f", find_forward as fn(char) -> Motion),
            ("F", find_backward),
            ("t", till_forward),
            ("T", till_backward),
            ("`", Motion::MarkExact),
            ("'", Motion::MarkLine),
        ];

        let mut entries: Vec<(KeyInputSet, Binding)> = fixed
            .into_iter()
            .map(|(name, motion)| (name, Binding::Fixed(motion)))
            .collect();
        entries.extend(
            with_char
                .into_iter()
                .map(|(name, f)| (KeyInputSet::from(name), Binding::WithChar(f))),
        );
        Self { entries }
    }

    /// Movements plus the text objects available after an operator or in
    /// visual mode.
    pub fn with_text_objects() -> Self {
        let mut table = Self::movements();
        for (name, motion) in [
            ("iw", Motion::InnerWord(WordKind::Normal)),
            ("iW", Motion::InnerWord(WordKind::Big)),
            ("aw", Motion::AroundWord(WordKind::Normal)),
            ("aW", Motion::AroundWord(WordKind::Big)),
        ] {
            table.entries.push((name.into(), Binding::Fixed(motion)));
        }
        table
    }

    /// Match a (possibly partial) key sequence.
    pub fn lookup(&self, keys: &[KeyInput]) -> MotionLookup {
        let mut partial = false;
        for (name, binding) in &self.entries {
            let name = name.keys();
            match binding {
                Binding::Fixed(motion) if name == keys => return MotionLookup::Found(*motion),
                Binding::WithChar(f) if keys.len() == name.len() + 1 && keys.starts_with(name) => {
                    return match keys[name.len()].plain_char() {
                        Some(c) => MotionLookup::Found(f(c)),
                        None => MotionLookup::NoMatch,
                    };
                }
                Binding::WithChar(_) if name == keys => partial = true,
                _ if name.len() > keys.len() && name.starts_with(keys) => partial = true,
                _ => {}
            }
        }
        if partial {
            MotionLookup::NeedMoreInput
        } else {
            MotionLookup::NoMatch
        }
    }

    /// Every key sequence naming a motion (argument keys excluded).
    pub fn names(&self) -> impl Iterator<Item = &KeyInputSet> {
        self.entries.iter().map(|(name, _)| name)
    }

    /// Every motion as a complete key sequence, with `arg` typed after the
    /// motions that take a character.
    #[cfg(test)]
    pub(crate) fn complete_sequences(&self, arg: KeyInput) -> Vec<Vec<KeyInput>> {
        self.entries
            .iter()
            .map(|(name, binding)| {
                let mut keys = name.keys().to_vec();
                if let Binding::WithChar(_) = binding {
                    keys.push(arg);
                }
                keys
            })
            .collect()
    }
}

fn find(kind: CharSearchKind, direction: Direction, target: char) -> Motion {
    Motion::FindChar(CharSearch {
        kind,
        direction,
        target,
    })
}

fn find_forward(c: char) -> Motion {
    find(CharSearchKind::To, Direction::Forward, c)
}

fn find_backward(c: char) -> Motion {
    find(CharSearchKind::To, Direction::Backward, c)
}

fn till_forward(c: char) -> Motion {
    find(CharSearchKind::Till, Direction::Forward, c)
}

fn till_backward(c: char) -> Motion {
    find(CharSearchKind::Till, Direction::Backward, c)
}

// ── Evaluation ───────────────────────────────────────────────────────────

/// Parse `keys` as a motion and evaluate it.
pub fn evaluate_keys<T: TextOps + ?Sized>(
    table: &MotionTable,
    text: &T,
    cursor: Position,
    keys: &[KeyInput],
    count: Option<u32>,
    ctx: &MotionContext<'_>,
) -> MotionResult {
    match table.lookup(keys) {
        MotionLookup::Found(motion) => evaluate(text, cursor, motion, count, ctx),
        MotionLookup::NeedMoreInput => MotionResult::NeedMoreInput,
        MotionLookup::NoMatch => MotionResult::Invalid(VimError::InvalidMotion(
            KeyInputSet::new(keys.to_vec()).to_string(),
        )),
    }
}

/// Evaluate `motion` from `cursor`. A missing count behaves as 1, except
/// for motions where Vim distinguishes "no count" (`G`, `gg`, `|`).
pub fn evaluate<T: TextOps + ?Sized>(
    text: &T,
    cursor: Position,
    motion: Motion,
    count: Option<u32>,
    ctx: &MotionContext<'_>,
) -> MotionResult {
    let cursor = text.clamp(cursor);
    match eval(text, cursor, motion, count, ctx) {
        Ok(mut data) => {
            data.is_jump = motion.is_jump();
            if ctx.operator != OperatorContext::Movement {
                adjust_exclusive(text, &mut data);
            }
            MotionResult::Complete(data)
        }
        Err(err) => MotionResult::Invalid(err),
    }
}

fn char_data(cursor: Position, target: Position, kind: MotionKind, caret: Position) -> MotionData {
    let forward = target >= cursor;
    let span = match kind {
        MotionKind::Exclusive => Range::new(cursor, target),
        MotionKind::Inclusive => {
            let (start, last) = if forward { (cursor, target) } else { (target, cursor) };
            Range {
                start,
                end: Position::new(last.line, last.col + 1),
            }
        }
    };
    MotionData {
        span,
        is_forward: forward,
        motion_kind: kind,
        operation_kind: OperationKind::CharacterWise,
        caret,
        column: None,
        is_jump: false,
        new_char_search: None,
        new_search: None,
    }
}

fn line_data(cursor: Position, target_line: u32, caret: Position) -> MotionData {
    let first = cursor.line.min(target_line);
    let last = cursor.line.max(target_line);
    MotionData {
        span: Range {
            start: Position::new(first, 0),
            end: Position::new(last + 1, 0),
        },
        is_forward: target_line >= cursor.line,
        motion_kind: MotionKind::Inclusive,
        operation_kind: OperationKind::LineWise,
        caret,
        column: None,
        is_jump: false,
        new_char_search: None,
        new_search: None,
    }
}

/// The last valid caret column of a line in normal mode.
fn last_col<T: TextOps + ?Sized>(text: &T, line: u32) -> u32 {
    text.line_len(line).saturating_sub(1)
}

fn fnb<T: TextOps + ?Sized>(text: &T, line: u32) -> Position {
    Position::new(line, text.first_non_blank(line).min(last_col(text, line)))
}

fn column_on<T: TextOps + ?Sized>(text: &T, line: u32, want: u32) -> Position {
    Position::new(line, want.min(last_col(text, line)))
}

fn eval<T: TextOps + ?Sized>(
    text: &T,
    cursor: Position,
    motion: Motion,
    count: Option<u32>,
    ctx: &MotionContext<'_>,
) -> Result<MotionData, VimError> {
    let n = count.unwrap_or(1).max(1);
    let last_line = text.last_line();
    let line = cursor.line;

    Ok(match motion {
        Motion::Left => {
            let target = Position::new(line, cursor.col.saturating_sub(n));
            char_data(cursor, target, MotionKind::Exclusive, target)
        }
        Motion::Right => {
            let len = text.line_len(line);
            let target = Position::new(line, cursor.col.saturating_add(n).min(len));
            let caret = column_on(text, line, target.col);
            char_data(cursor, target, MotionKind::Exclusive, caret)
        }
        Motion::Up | Motion::Down => {
            let target_line = if motion == Motion::Up {
                line.saturating_sub(n)
            } else {
                line.saturating_add(n).min(last_line)
            };
            let want = ctx.preferred_col.unwrap_or(cursor.col);
            let mut data = line_data(cursor, target_line, column_on(text, target_line, want));
            data.column = Some(want);
            data
        }
        Motion::LineStart => {
            let target = Position::new(line, 0);
            char_data(cursor, target, MotionKind::Exclusive, target)
        }
        Motion::FirstNonBlank => {
            let target = fnb(text, line);
            char_data(cursor, target, MotionKind::Exclusive, target)
        }
        Motion::LineEnd => {
            let target_line = line.saturating_add(n - 1).min(last_line);
            let len = text.line_len(target_line);
            let caret = Position::new(target_line, len.saturating_sub(1));
            let mut data = if len == 0 {
                char_data(cursor, caret, MotionKind::Exclusive, caret)
            } else {
                char_data(cursor, caret, MotionKind::Inclusive, caret)
            };
            data.column = Some(u32::MAX);
            data
        }
        Motion::Column => {
            let target = column_on(text, line, n - 1);
            char_data(cursor, target, MotionKind::Exclusive, target)
        }
        Motion::LineDownFirstNonBlank => {
            let target_line = line.saturating_add(n).min(last_line);
            line_data(cursor, target_line, fnb(text, target_line))
        }
        Motion::LineUpFirstNonBlank => {
            let target_line = line.saturating_sub(n);
            line_data(cursor, target_line, fnb(text, target_line))
        }
        Motion::CurrentLines => {
            let target_line = line.saturating_add(n - 1).min(last_line);
            let mut data = line_data(cursor, target_line, fnb(text, target_line));
            if ctx.operator != OperatorContext::Movement {
                data.caret = fnb(text, line);
            }
            data
        }
        Motion::FirstLine | Motion::LastLine => {
            let target_line = match count {
                Some(c) => c.saturating_sub(1).min(last_line),
                None if motion == Motion::FirstLine => 0,
                None => last_line,
            };
            line_data(cursor, target_line, fnb(text, target_line))
        }
        Motion::WordForward(kind) => word_forward(text, cursor, kind, n, ctx.operator),
        Motion::WordBackward(kind) => {
            let mut w = Walker::new(text, kind == WordKind::Big);
            let mut p = cursor;
            for _ in 0..n {
                p = word::prev_word_start(&mut w, p);
            }
            char_data(cursor, p, MotionKind::Exclusive, p)
        }
        Motion::WordEnd(kind) => {
            let mut w = Walker::new(text, kind == WordKind::Big);
            let mut p = cursor;
            for _ in 0..n {
                match word::next_word_end(&mut w, p) {
                    Some(next) => p = next,
                    None => break,
                }
            }
            char_data(cursor, p, MotionKind::Inclusive, p)
        }
        Motion::WordEndBackward(kind) => {
            let mut w = Walker::new(text, kind == WordKind::Big);
            let mut p = cursor;
            for _ in 0..n {
                p = word::prev_word_end(&mut w, p);
            }
            let p = text.clamp(p);
            char_data(cursor, p, MotionKind::Inclusive, p)
        }
        Motion::InnerWord(kind) | Motion::AroundWord(kind) => {
            let around = matches!(motion, Motion::AroundWord(_));
            let mut w = Walker::new(text, kind == WordKind::Big);
            let (start, end) = word::word_object(&mut w, cursor, n, around)
                .ok_or_else(|| VimError::InvalidMotion("no word under cursor".into()))?;
            char_data(start, end, MotionKind::Inclusive, end)
        }
        Motion::ParagraphForward | Motion::ParagraphBackward => {
            let forward = motion == Motion::ParagraphForward;
            let mut l = line;
            for _ in 0..n {
                l = paragraph_boundary(text, l, forward);
            }
            let target = if forward && l == last_line && !is_blank_line(text, l) {
                Position::new(l, text.line_len(l))
            } else {
                Position::new(l, 0)
            };
            let caret = column_on(text, target.line, target.col);
            char_data(cursor, target, MotionKind::Exclusive, caret)
        }
        Motion::FindChar(search) => {
            let mut data = find_char(text, cursor, search, n, false)?;
            data.new_char_search = Some(search);
            data
        }
        Motion::RepeatCharSearch | Motion::RepeatCharSearchReverse => {
            let mut search = ctx.char_search.ok_or_else(|| {
                VimError::InvalidMotion("no previous character search".into())
            })?;
            if motion == Motion::RepeatCharSearchReverse {
                search.direction = search.direction.reverse();
            }
            find_char(text, cursor, search, n, true)?
        }
        Motion::SearchNext | Motion::SearchPrevious => {
            let state = ctx.last_search.ok_or(VimError::NoPreviousPattern)?;
            let direction = if motion == Motion::SearchNext {
                state.direction
            } else {
                state.direction.reverse()
            };
            let target = search_pattern(text, cursor, &state.pattern, direction, n, ctx.wrap_scan)?;
            char_data(cursor, target, MotionKind::Exclusive, target)
        }
        Motion::SearchWordUnderCursor(direction) => {
            let mut w = Walker::new(text, false);
            let (start, pattern) = word::word_under_cursor(&mut w, cursor)
                .ok_or_else(|| VimError::InvalidMotion("E348: No string under cursor".into()))?;
            let target = search_pattern(text, start, &pattern, direction, n, ctx.wrap_scan)?;
            let mut data = char_data(cursor, target, MotionKind::Exclusive, target);
            data.new_search = Some(SearchState { pattern, direction });
            data
        }
        Motion::MarkExact(name) => {
            let target = text.clamp(ctx.marks.get(name)?);
            let caret = column_on(text, target.line, target.col);
            char_data(cursor, target, MotionKind::Exclusive, caret)
        }
        Motion::MarkLine(name) => {
            let target_line = ctx.marks.get(name)?.line.min(last_line);
            line_data(cursor, target_line, fnb(text, target_line))
        }
        Motion::MatchingPair => {
            let target = matching_pair(text, cursor)
                .ok_or_else(|| VimError::InvalidMotion("no matching bracket".into()))?;
            char_data(cursor, target, MotionKind::Inclusive, target)
        }
    })
}

fn word_forward<T: TextOps + ?Sized>(
    text: &T,
    cursor: Position,
    kind: WordKind,
    n: u32,
    operator: OperatorContext,
) -> MotionData {
    let mut w = Walker::new(text, kind == WordKind::Big);

    // `cw` on a non-blank changes to the end of the word, like `ce`.
    if operator == OperatorContext::Change
        && matches!(
            w.class(cursor),
            word::CharClass::Word | word::CharClass::Punctuation
        )
    {
        let mut p = cursor;
        let class = w.class(p);
        while let Some(q) = w.next(p) {
            if w.class(q) != class {
                break;
            }
            p = q;
        }
        for _ in 1..n {
            match word::next_word_end(&mut w, p) {
                Some(next) => p = next,
                None => break,
            }
        }
        return char_data(cursor, p, MotionKind::Inclusive, p);
    }

    let mut p = cursor;
    for i in 0..n {
        let last_step = i + 1 == n;
        match word::next_word_start(&mut w, p) {
            // The last word moved over ends the operated text at its line end.
            Some(next) if last_step && operator != OperatorContext::Movement && next.line > p.line => {
                p = Position::new(p.line, w.line_len(p.line));
            }
            Some(next) => p = next,
            None => {
                p = w.end();
                break;
            }
        }
    }
    let caret = if p.col >= text.line_len(p.line) {
        column_on(text, p.line, p.col)
    } else {
        p
    };
    char_data(cursor, p, MotionKind::Exclusive, caret)
}

/// `:help exclusive`: an exclusive span ending in column 0 of a later line
/// ends at the end of the previous line instead.
fn adjust_exclusive<T: TextOps + ?Sized>(text: &T, data: &mut MotionData) {
    if data.operation_kind == OperationKind::CharacterWise
        && data.motion_kind == MotionKind::Exclusive
        && data.span.end.col == 0
        && data.span.end.line > data.span.start.line
    {
        let line = data.span.end.line - 1;
        data.span.end = Position::new(line, text.line_len(line));
    }
}

fn is_blank_line<T: TextOps + ?Sized>(text: &T, line: u32) -> bool {
    text.line_text(line).trim().is_empty()
}

fn paragraph_boundary<T: TextOps + ?Sized>(text: &T, from: u32, forward: bool) -> u32 {
    let last = text.last_line();
    let step = |l: u32| -> Option<u32> {
        if forward {
            (l < last).then(|| l + 1)
        } else {
            l.checked_sub(1)
        }
    };
    let mut l = from;
    // Skip blank lines we are on, then the paragraph itself.
    while is_blank_line(text, l) {
        match step(l) {
            Some(next) => l = next,
            None => return l,
        }
    }
    while !is_blank_line(text, l) {
        match step(l) {
            Some(next) => l = next,
            None => return l,
        }
    }
    l
}

fn find_char<T: TextOps + ?Sized>(
    text: &T,
    cursor: Position,
    search: CharSearch,
    n: u32,
    repeat: bool,
) -> Result<MotionData, VimError> {
    let line_text = text.line_text(cursor.line);
    let cells: Vec<&str> = line_text.graphemes(true).collect();
    let matches = |g: &str| g.chars().next() == Some(search.target) && g.chars().count() == 1;
    let col = cursor.col as usize;
    let not_found = VimError::FindCharNotFound(search.target);

    // A repeated till must not stick on the match right next to the cursor.
    let skip = usize::from(repeat && search.kind == CharSearchKind::Till);

    let found = match search.direction {
        Direction::Forward => cells
            .iter()
            .enumerate()
            .skip(col + 1 + skip)
            .filter(|(_, g)| matches(g))
            .nth(n as usize - 1)
            .map(|(i, _)| i),
        Direction::Backward => cells[..col.min(cells.len()).saturating_sub(skip)]
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, g)| matches(g))
            .nth(n as usize - 1)
            .map(|(i, _)| i),
    }
    .ok_or(not_found)? as u32;

    let target = match (search.kind, search.direction) {
        (CharSearchKind::To, _) => found,
        (CharSearchKind::Till, Direction::Forward) => found - 1,
        (CharSearchKind::Till, Direction::Backward) => found + 1,
    };
    let target = Position::new(cursor.line, target);
    let kind = match search.direction {
        Direction::Forward => MotionKind::Inclusive,
        Direction::Backward => MotionKind::Exclusive,
    };
    Ok(char_data(cursor, target, kind, target))
}

fn search_pattern<T: TextOps + ?Sized>(
    text: &T,
    from: Position,
    pattern: &str,
    direction: Direction,
    n: u32,
    wrap: bool,
) -> Result<Position, VimError> {
    let mut p = from;
    for _ in 0..n {
        let next = match direction {
            Direction::Forward => text.search_forward(p, pattern, wrap),
            Direction::Backward => text.search_backward(p, pattern, wrap),
        };
        p = next.ok_or_else(|| VimError::PatternNotFound(pattern.to_string()))?;
    }
    Ok(p)
}

const PAIRS: [(char, char); 3] = [('(', ')'), ('[', ']'), ('{', '}')];

fn matching_pair<T: TextOps + ?Sized>(text: &T, cursor: Position) -> Option<Position> {
    let mut w = Walker::new(text, false);
    let is_bracket = |g: Option<&str>| {
        g.and_then(|g| g.chars().next())
            .filter(|c| PAIRS.iter().any(|&(o, cl)| *c == o || *c == cl))
    };

    // The first bracket at or after the cursor on this line.
    let mut start = cursor;
    let bracket = loop {
        if let Some(c) = is_bracket(w.grapheme(start)) {
            break c;
        }
        if start.col + 1 >= w.line_len(start.line) {
            return None;
        }
        start.col += 1;
    };

    let (open, close, forward) = PAIRS.iter().find_map(|&(o, c)| {
        if bracket == o {
            Some((o, c, true))
        } else if bracket == c {
            Some((o, c, false))
        } else {
            None
        }
    })?;

    let mut depth = 0i32;
    let mut p = start;
    loop {
        match w.grapheme(p).and_then(|g| g.chars().next()) {
            Some(c) if c == open => depth += if forward { 1 } else { -1 },
            Some(c) if c == close => depth += if forward { -1 } else { 1 },
            _ => {}
        }
        if depth == 0 {
            return Some(p);
        }
        p = if forward { w.next(p)? } else { w.prev(p)? };
    }
}

/// The range a delete removes for `data`.
pub fn delete_range<T: TextOps + ?Sized>(text: &T, data: &MotionData) -> Range {
    match data.operation_kind {
        OperationKind::LineWise => {
            line_delete_range(text, data.span.start.line, data.span.end.line.saturating_sub(1))
        }
        OperationKind::CharacterWise => data.span,
    }
}

/// The range removed when deleting lines `first..=last`.
///
/// Deleting the last lines of the buffer removes the line break before them
/// instead of the (possibly missing) one after them.
pub fn line_delete_range<T: TextOps + ?Sized>(text: &T, first: u32, last: u32) -> Range {
    let last_line = text.last_line();
    if last < last_line {
        return Range {
            start: Position::new(first, 0),
            end: Position::new(last + 1, 0),
        };
    }
    let end = Position::new(last_line, text.line_len(last_line));
    if first == 0 {
        Range {
            start: Position::ZERO,
            end,
        }
    } else {
        let prev = first - 1;
        Range {
            start: Position::new(prev, text.line_len(prev)),
            end,
        }
    }
}

/// The register text for `data`: line-wise text always ends in a line break.
pub fn span_text<T: TextOps + ?Sized>(text: &T, data: &MotionData) -> String {
    let mut out = text.slice_to_string(data.span);
    if data.operation_kind == OperationKind::LineWise && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
