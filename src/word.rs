//! Word motions over a [`TextOps`] snapshot.
//!
//! A **word** is a run of word characters (letters, digits, underscore) or a
//! run of other non-blank characters. A **WORD** is any run of non-blank
//! characters. Line breaks are walked as a virtual cell at column
//! `line_len`, and an empty line counts as a word of its own for `w` and `b`.

use unicode_segmentation::UnicodeSegmentation;

use crate::traits::TextOps;
use crate::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word characters.
    Punctuation,
    /// Whitespace within a line.
    Blank,
    /// The virtual line-break cell.
    Newline,
}

pub(crate) fn classify(grapheme: &str, big: bool) -> CharClass {
    let Some(ch) = grapheme.chars().next() else {
        return CharClass::Newline;
    };
    if ch.is_whitespace() {
        CharClass::Blank
    } else if big || ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

/// Grapheme-by-grapheme walker with a one-line cache.
pub(crate) struct Walker<'a, T: TextOps + ?Sized> {
    text: &'a T,
    big: bool,
    cached_line: Option<u32>,
    cells: Vec<String>,
}

impl<'a, T: TextOps + ?Sized> Walker<'a, T> {
    pub(crate) fn new(text: &'a T, big: bool) -> Self {
        Self {
            text,
            big,
            cached_line: None,
            cells: Vec::new(),
        }
    }

    fn load(&mut self, line: u32) {
        if self.cached_line != Some(line) {
            self.cells = self
                .text
                .line_text(line)
                .graphemes(true)
                .map(str::to_owned)
                .collect();
            self.cached_line = Some(line);
        }
    }

    pub(crate) fn line_len(&mut self, line: u32) -> u32 {
        self.load(line);
        self.cells.len() as u32
    }

    pub(crate) fn class(&mut self, pos: Position) -> CharClass {
        self.load(pos.line);
        match self.cells.get(pos.col as usize) {
            Some(g) => classify(g, self.big),
            None => CharClass::Newline,
        }
    }

    pub(crate) fn grapheme(&mut self, pos: Position) -> Option<&str> {
        self.load(pos.line);
        self.cells.get(pos.col as usize).map(String::as_str)
    }

    /// The end of the buffer: one past the last character of the last line.
    pub(crate) fn end(&mut self) -> Position {
        let last = self.text.last_line();
        Position::new(last, self.line_len(last))
    }

    pub(crate) fn next(&mut self, pos: Position) -> Option<Position> {
        let len = self.line_len(pos.line);
        if pos.col < len {
            Some(Position::new(pos.line, pos.col + 1))
        } else if pos.line < self.text.last_line() {
            Some(Position::new(pos.line + 1, 0))
        } else {
            None
        }
    }

    pub(crate) fn prev(&mut self, pos: Position) -> Option<Position> {
        if pos.col > 0 {
            let len = self.line_len(pos.line);
            Some(Position::new(pos.line, (pos.col - 1).min(len)))
        } else if pos.line > 0 {
            let line = pos.line - 1;
            Some(Position::new(line, self.line_len(line)))
        } else {
            None
        }
    }

    fn is_empty_line_cell(&mut self, pos: Position) -> bool {
        pos.col == 0 && self.line_len(pos.line) == 0
    }
}

fn is_text(class: CharClass) -> bool {
    matches!(class, CharClass::Word | CharClass::Punctuation)
}

/// `w` / `W`: start of the next word, or `None` past the last word.
pub(crate) fn next_word_start<T: TextOps + ?Sized>(
    w: &mut Walker<'_, T>,
    pos: Position,
) -> Option<Position> {
    let start_class = w.class(pos);
    let mut p = pos;

    if is_text(start_class) {
        while w.class(p) == start_class {
            p = w.next(p)?;
        }
    }

    loop {
        match w.class(p) {
            CharClass::Word | CharClass::Punctuation => return Some(p),
            CharClass::Blank => p = w.next(p)?,
            CharClass::Newline => {
                p = w.next(p)?;
                if w.is_empty_line_cell(p) {
                    return Some(p);
                }
            }
        }
    }
}

/// `b` / `B`: start of the current or previous word.
pub(crate) fn prev_word_start<T: TextOps + ?Sized>(
    w: &mut Walker<'_, T>,
    pos: Position,
) -> Position {
    let Some(mut p) = w.prev(pos) else {
        return Position::ZERO;
    };

    loop {
        match w.class(p) {
            CharClass::Word | CharClass::Punctuation => break,
            CharClass::Newline if w.is_empty_line_cell(p) => return p,
            CharClass::Blank | CharClass::Newline => match w.prev(p) {
                Some(q) => p = q,
                None => return Position::ZERO,
            },
        }
    }

    let class = w.class(p);
    while let Some(q) = w.prev(p) {
        if w.class(q) != class {
            break;
        }
        p = q;
    }
    p
}

/// `e` / `E`: end of the current or next word.
pub(crate) fn next_word_end<T: TextOps + ?Sized>(
    w: &mut Walker<'_, T>,
    pos: Position,
) -> Option<Position> {
    let mut p = w.next(pos)?;
    while !is_text(w.class(p)) {
        p = w.next(p)?;
    }
    let class = w.class(p);
    while let Some(q) = w.next(p) {
        if w.class(q) != class {
            break;
        }
        p = q;
    }
    Some(p)
}

/// `ge` / `gE`: end of the previous word.
pub(crate) fn prev_word_end<T: TextOps + ?Sized>(
    w: &mut Walker<'_, T>,
    pos: Position,
) -> Position {
    let start_class = w.class(pos);
    let mut p = pos;
    if is_text(start_class) {
        while w.class(p) == start_class {
            match w.prev(p) {
                Some(q) => p = q,
                None => return Position::ZERO,
            }
        }
    }
    loop {
        match w.class(p) {
            CharClass::Word | CharClass::Punctuation => return p,
            CharClass::Newline if w.is_empty_line_cell(p) && p != pos => return p,
            _ => match w.prev(p) {
                Some(q) => p = q,
                None => return Position::ZERO,
            },
        }
    }
}

/// Same-class runs of one line as `(start, end_inclusive, class)`.
fn line_runs<T: TextOps + ?Sized>(w: &mut Walker<'_, T>, line: u32) -> Vec<(u32, u32, CharClass)> {
    let len = w.line_len(line);
    let mut runs: Vec<(u32, u32, CharClass)> = Vec::new();
    for col in 0..len {
        let class = w.class(Position::new(line, col));
        match runs.last_mut() {
            Some(run) if run.2 == class => run.1 = col,
            _ => runs.push((col, col, class)),
        }
    }
    runs
}

/// `iw` / `aw` (and the WORD forms): the inclusive column span of `count`
/// words around `pos`, or `None` on an empty line.
pub(crate) fn word_object<T: TextOps + ?Sized>(
    w: &mut Walker<'_, T>,
    pos: Position,
    count: u32,
    around: bool,
) -> Option<(Position, Position)> {
    let runs = line_runs(w, pos.line);
    let idx = runs
        .iter()
        .position(|&(s, e, _)| s <= pos.col && pos.col <= e)?;

    let line = pos.line;
    let count = count.max(1) as usize;
    let mut first = idx;
    let mut last;

    if !around {
        last = (idx + count - 1).min(runs.len() - 1);
        return Some((
            Position::new(line, runs[first].0),
            Position::new(line, runs[last].1),
        ));
    }

    if runs[idx].2 == CharClass::Blank {
        // Leading blanks plus the following word(s).
        last = (idx + 2 * count - 1).min(runs.len() - 1);
    } else {
        last = (idx + 2 * count - 2).min(runs.len() - 1);
        if last + 1 < runs.len() && runs[last + 1].2 == CharClass::Blank {
            last += 1;
        } else if first > 0 && runs[first - 1].2 == CharClass::Blank {
            first -= 1;
        }
    }
    Some((
        Position::new(line, runs[first].0),
        Position::new(line, runs[last].1),
    ))
}

/// The word under or after the cursor on its line, for `*` and `#`.
pub(crate) fn word_under_cursor<T: TextOps + ?Sized>(
    w: &mut Walker<'_, T>,
    pos: Position,
) -> Option<(Position, String)> {
    let runs = line_runs(w, pos.line);
    let &(start, end, _) = runs
        .iter()
        .find(|&&(_, e, class)| e >= pos.col && class == CharClass::Word)?;
    let mut word = String::new();
    for col in start..=end {
        if let Some(g) = w.grapheme(Position::new(pos.line, col)) {
            word.push_str(g);
        }
    }
    Some((Position::new(pos.line, start), word))
}
