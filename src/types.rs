use std::fmt;

/// A position within a text buffer.
///
/// Positions are zero-indexed and column values are counted in grapheme clusters,
/// not bytes or chars. This ensures correct handling of emoji and combining characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based column position in grapheme clusters.
    pub col: u32,
}

impl Position {
    /// The origin position (0, 0).
    pub const ZERO: Position = Position { line: 0, col: 0 };

    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// A range of text defined by start and end positions.
///
/// Ranges are half-open intervals [start, end), meaning the start position
/// is included but the end position is excluded. An end of
/// `(line + 1, 0)` covers the line break of `line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// The start position (inclusive).
    pub start: Position,
    /// The end position (exclusive).
    pub end: Position,
}

impl Range {
    /// Build a range from two positions in any order.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// The editing mode an [`Engine`](crate::Engine) is in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    /// Keys are commands, not text input.
    #[default]
    Normal,
    /// Keys produce characters in the buffer.
    Insert,
    /// Typed characters overwrite existing text (`R`).
    Replace,
    /// Movement extends a selection.
    Visual(VisualKind),
    /// A `:` command line is being typed.
    Command,
}

impl ModeKind {
    pub const fn is_visual(self) -> bool {
        matches!(self, ModeKind::Visual(_))
    }

    /// Human-readable name for a status line.
    pub const fn display_name(self) -> &'static str {
        match self {
            ModeKind::Normal => "NORMAL",
            ModeKind::Insert => "INSERT",
            ModeKind::Replace => "REPLACE",
            ModeKind::Visual(VisualKind::Character) => "VISUAL",
            ModeKind::Visual(VisualKind::Line) => "VISUAL LINE",
            ModeKind::Visual(VisualKind::Block) => "VISUAL BLOCK",
            ModeKind::Command => "COMMAND",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The type of visual selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// Character-wise selection (`v`).
    Character,
    /// Line-wise selection (`V`).
    Line,
    /// Block (column) selection (`<C-v>`).
    Block,
}

/// A text selection with its type.
///
/// `start` is the anchor that stays put while the caret (`end`) moves, so
/// `start` may come after `end` in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// The anchor of the selection.
    pub start: Position,
    /// The caret end of the selection.
    pub end: Position,
    /// The type of selection.
    pub kind: VisualKind,
}

impl Selection {
    /// The selection bounds in buffer order.
    pub fn ordered(&self) -> (Position, Position) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    pub fn first_line(&self) -> u32 {
        self.start.line.min(self.end.line)
    }

    pub fn last_line(&self) -> u32 {
        self.start.line.max(self.end.line)
    }
}

/// Whether the end point of a motion belongs to the operated range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Inclusive,
    Exclusive,
}

/// Granularity an operator works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    CharacterWise,
    LineWise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub const fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollKind {
    LineDown,
    LineUp,
    HalfPageDown,
    HalfPageUp,
    PageDown,
    PageUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabTarget {
    Next,
    Previous,
    /// One-based tab index, as typed before `gt`.
    Index(u32),
}

/// Operations emitted by the engine for the host to perform.
///
/// The engine never mutates text itself. Every span is computed against
/// the snapshot the host exposes at the moment the operation is requested,
/// and the host applies operations in the order they are emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Update the cursor position.
    SetCursor(Position),
    /// Set or clear the current selection.
    SetSelection(Option<Selection>),

    /// Delete text in the specified range.
    Delete { range: Range },
    /// Insert text at the specified position.
    InsertText { at: Position, text: String },
    /// Replace the text in a range.
    Replace { range: Range, text: String },
    /// Shift `count` lines starting at `first_line` by one shift width.
    ShiftLines {
        first_line: u32,
        count: u32,
        direction: ShiftDirection,
    },
    /// Scroll the view; a `count` of 0 leaves the amount to the host.
    Scroll { kind: ScrollKind, count: u32 },
    Undo { count: u32 },
    Redo { count: u32 },
    GoToTab(TabTarget),
    /// Run a `:` command line; its grammar belongs to the host.
    ExecuteCommandLine(String),
}
