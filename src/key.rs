use std::fmt;

use crate::error::VimError;

/// Key codes representing individual keys on the keyboard.
///
/// This enum provides a platform-agnostic representation of keys.
/// Hosts should map their platform-specific key events to these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key. Letters combined with CTRL are stored lowercase.
    Char(char),
    /// The Escape key, used to exit modes and cancel operations.
    Esc,
    /// The Enter/Return key.
    Enter,
    /// The Backspace key for deleting characters in insert/search modes.
    Backspace,
    Tab,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
}

impl KeyCode {
    /// The character a key produces when it has a text representation.
    pub const fn text(self) -> Option<char> {
        match self {
            KeyCode::Char(c) => Some(c),
            KeyCode::Esc => Some('\u{1b}'),
            KeyCode::Enter => Some('\r'),
            KeyCode::Backspace => Some('\u{8}'),
            KeyCode::Tab => Some('\t'),
            _ => None,
        }
    }

    fn notation_name(self) -> Option<&'static str> {
        Some(match self {
            KeyCode::Char(_) => return None,
            KeyCode::Esc => "Esc",
            KeyCode::Enter => "CR",
            KeyCode::Backspace => "BS",
            KeyCode::Tab => "Tab",
            KeyCode::Delete => "Del",
            KeyCode::Up => "Up",
            KeyCode::Down => "Down",
            KeyCode::Left => "Left",
            KeyCode::Right => "Right",
            KeyCode::Home => "Home",
            KeyCode::End => "End",
            KeyCode::PageUp => "PageUp",
            KeyCode::PageDown => "PageDown",
            KeyCode::Insert => "Insert",
        })
    }
}

bitflags::bitflags! {
    /// Keyboard modifier flags.
    ///
    /// These can be combined to represent multiple modifiers held simultaneously.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// One logical key press.
///
/// Equality and hashing are structural, so command names can be matched by
/// comparing sequences of `KeyInput`. Character keys always carry their
/// character; symbolic keys without a text form carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyInput {
    ch: Option<char>,
    code: KeyCode,
    mods: Modifiers,
}

impl KeyInput {
    /// Build a key from a typed character, inferring modifiers from case and
    /// ASCII control codes.
    pub fn from_char(c: char) -> Self {
        match c {
            '\u{1b}' => Self::from_key(KeyCode::Esc, Modifiers::empty()),
            '\r' | '\n' => Self::from_key(KeyCode::Enter, Modifiers::empty()),
            '\t' => Self::from_key(KeyCode::Tab, Modifiers::empty()),
            '\u{8}' | '\u{7f}' => Self::from_key(KeyCode::Backspace, Modifiers::empty()),
            '\u{1}'..='\u{1a}' => {
                let letter = (b'a' + (c as u8) - 1) as char;
                Self::ctrl(letter)
            }
            _ => Self::from_key(KeyCode::Char(c), Modifiers::empty()),
        }
    }

    /// Build a key from a key code and explicit modifiers.
    ///
    /// Uppercase letters always carry SHIFT and CTRL letters are normalized to
    /// lowercase, so `from_key(Char('D'), CTRL)` equals `ctrl('d')` plus SHIFT.
    pub fn from_key(code: KeyCode, mods: Modifiers) -> Self {
        match code {
            KeyCode::Char(c) if mods.contains(Modifiers::CTRL) && c.is_ascii_alphabetic() => {
                let lower = c.to_ascii_lowercase();
                let mut mods = mods;
                if c.is_ascii_uppercase() {
                    mods |= Modifiers::SHIFT;
                }
                let control = char::from(lower as u8 - b'a' + 1);
                Self {
                    ch: Some(control),
                    code: KeyCode::Char(lower),
                    mods,
                }
            }
            KeyCode::Char(c) => {
                let mods = if c.is_uppercase() {
                    mods | Modifiers::SHIFT
                } else {
                    mods
                };
                Self {
                    ch: Some(c),
                    code,
                    mods,
                }
            }
            _ => Self {
                ch: code.text(),
                code,
                mods,
            },
        }
    }

    /// A key pressed together with CTRL, e.g. `ctrl('r')` for `<C-r>`.
    pub fn ctrl(c: char) -> Self {
        Self::from_key(KeyCode::Char(c), Modifiers::CTRL)
    }

    pub fn escape() -> Self {
        Self::from_key(KeyCode::Esc, Modifiers::empty())
    }

    pub fn enter() -> Self {
        Self::from_key(KeyCode::Enter, Modifiers::empty())
    }

    pub fn backspace() -> Self {
        Self::from_key(KeyCode::Backspace, Modifiers::empty())
    }

    /// The character this key produces, if any.
    pub fn char(&self) -> Option<char> {
        self.ch
    }

    pub fn code(&self) -> KeyCode {
        self.code
    }

    pub fn mods(&self) -> Modifiers {
        self.mods
    }

    /// The plain character of a key with no CTRL/ALT/META modifier.
    ///
    /// This is what counts, register names and `f{char}` arguments read.
    pub fn plain_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c)
                if !self
                    .mods
                    .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::META) =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    pub fn is_escape(&self) -> bool {
        self.code == KeyCode::Esc
    }

    /// The digit value when this key can contribute to a count.
    pub fn digit(&self) -> Option<u32> {
        self.plain_char().and_then(|c| c.to_digit(10))
    }

    /// Parse Vim key notation such as `2d<Esc>`, `<C-r>` or `<lt>`.
    pub fn parse(notation: &str) -> Result<Vec<KeyInput>, VimError> {
        let mut keys = Vec::new();
        let mut rest = notation;
        while let Some(c) = rest.chars().next() {
            if c == '<'
                && let Some(close) = rest.find('>')
                && close > 1
            {
                keys.push(parse_bracketed(&rest[1..close])?);
                rest = &rest[close + 1..];
                continue;
            }
            keys.push(KeyInput::from_char(c));
            rest = &rest[c.len_utf8()..];
        }
        Ok(keys)
    }
}

fn parse_bracketed(inner: &str) -> Result<KeyInput, VimError> {
    let invalid = || VimError::InvalidKeyNotation(format!("<{inner}>"));
    let mut mods = Modifiers::empty();
    let mut name = inner;
    // Modifier prefixes are single letters followed by '-', as in <C-S-x>.
    while name.len() > 2 && name.as_bytes()[1] == b'-' {
        let flag = match name.as_bytes()[0].to_ascii_uppercase() {
            b'C' => Modifiers::CTRL,
            b'S' => Modifiers::SHIFT,
            b'A' | b'M' => Modifiers::ALT,
            b'D' => Modifiers::META,
            _ => return Err(invalid()),
        };
        mods |= flag;
        name = &name[2..];
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyInput::from_key(KeyCode::Char(c), mods));
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "del" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "bar" => KeyCode::Char('|'),
        "bslash" => KeyCode::Char('\\'),
        _ => return Err(invalid()),
    };
    Ok(KeyInput::from_key(code, mods))
}

impl From<char> for KeyInput {
    fn from(c: char) -> Self {
        KeyInput::from_char(c)
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefix = String::new();
        if self.mods.contains(Modifiers::CTRL) {
            prefix.push_str("C-");
        }
        if self.mods.contains(Modifiers::ALT) {
            prefix.push_str("A-");
        }
        if self.mods.contains(Modifiers::META) {
            prefix.push_str("D-");
        }
        match (self.code, self.code.notation_name()) {
            (_, Some(name)) => write!(f, "<{prefix}{name}>"),
            (KeyCode::Char('<'), None) if prefix.is_empty() => f.write_str("<lt>"),
            (KeyCode::Char(c), None) if prefix.is_empty() => write!(f, "{c}"),
            (KeyCode::Char(c), None) => write!(f, "<{prefix}{c}>"),
            (_, None) => Ok(()),
        }
    }
}

/// Printable characters every host must be able to deliver as plain keys.
pub const CORE_CHARS: &str = concat!(
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "0123456789",
    " !\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
);

/// The core key set: one key per [`CORE_CHARS`] character.
pub fn core_keys() -> impl Iterator<Item = KeyInput> {
    CORE_CHARS.chars().map(KeyInput::from_char)
}

/// An ordered sequence of keys, used as a command name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyInputSet(Vec<KeyInput>);

impl KeyInputSet {
    pub fn new(keys: Vec<KeyInput>) -> Self {
        Self(keys)
    }

    pub fn keys(&self) -> &[KeyInput] {
        &self.0
    }

    pub fn first(&self) -> Option<KeyInput> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<KeyInput> {
        self.0.last().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `prefix` is a (not necessarily strict) prefix of this set.
    pub fn starts_with(&self, prefix: &[KeyInput]) -> bool {
        self.0.starts_with(prefix)
    }
}

impl From<&str> for KeyInputSet {
    fn from(s: &str) -> Self {
        Self(s.chars().map(KeyInput::from_char).collect())
    }
}

impl From<KeyInput> for KeyInputSet {
    fn from(key: KeyInput) -> Self {
        Self(vec![key])
    }
}

impl fmt::Display for KeyInputSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.0 {
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
