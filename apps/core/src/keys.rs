use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
    };

    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Tab,
    Enter,
    Escape,
    Space,
    Backspace,
    Delete,
    Function(u8),
    Char(char),
}

/// A key plus the modifiers held while pressing it, e.g. `Ctrl+Shift+C`.
///
/// Parsing accepts any modifier order and casing; `Display` always yields the
/// canonical `Ctrl+Alt+Shift+Key` form so two chords that compare equal also
/// print the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl KeyChord {
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(Modifiers::NONE, key)
    }

    pub fn ctrl(key: Key) -> Self {
        Self::new(Modifiers::CTRL, key)
    }

    pub fn has_modifiers(&self) -> bool {
        !self.modifiers.is_empty()
    }

    pub fn parse(input: &str) -> Result<Self, String> {
        let raw_parts: Vec<&str> = input
            .split('+')
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect();

        // "Ctrl++" names the plus key itself.
        let (modifier_parts, key_raw) = if input.trim_end().ends_with("++") {
            (&raw_parts[..], "+")
        } else {
            match raw_parts.split_last() {
                Some((last, rest)) => (rest, *last),
                None => return Err("Key chord is empty.".to_string()),
            }
        };

        let key = normalize_key(key_raw)?;
        let mut modifiers = Modifiers::NONE;
        for part in modifier_parts {
            match normalize_modifier(part)? {
                "Ctrl" => modifiers.ctrl = true,
                "Alt" => modifiers.alt = true,
                _ => modifiers.shift = true,
            }
        }

        Ok(Self { modifiers, key })
    }
}

impl Display for KeyChord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "Alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "Shift+")?;
        }
        match self.key {
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Tab => write!(f, "Tab"),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Esc"),
            Key::Space => write!(f, "Space"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Function(number) => write!(f, "F{number}"),
            Key::Char(c) => write!(f, "{c}"),
        }
    }
}

fn normalize_modifier(input: &str) -> Result<&'static str, String> {
    match input.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Ok("Ctrl"),
        "alt" => Ok("Alt"),
        "shift" => Ok("Shift"),
        "win" | "windows" | "meta" | "super" => {
            Err("Win/Meta combinations are not supported.".to_string())
        }
        _ => Err(format!(
            "Unsupported modifier '{input}'. Use Ctrl, Alt, or Shift."
        )),
    }
}

fn normalize_key(input: &str) -> Result<Key, String> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err("Key is required.".to_string());
    }

    let upper = raw.to_ascii_uppercase();
    let named = match upper.as_str() {
        "UP" => Some(Key::Up),
        "DOWN" => Some(Key::Down),
        "LEFT" => Some(Key::Left),
        "RIGHT" => Some(Key::Right),
        "TAB" => Some(Key::Tab),
        "ENTER" | "RETURN" => Some(Key::Enter),
        "ESC" | "ESCAPE" => Some(Key::Escape),
        "SPACE" => Some(Key::Space),
        "BACKSPACE" => Some(Key::Backspace),
        "DEL" | "DELETE" => Some(Key::Delete),
        _ => None,
    };
    if let Some(key) = named {
        return Ok(key);
    }

    let mut chars = upper.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if !c.is_whitespace() {
            return Ok(Key::Char(c));
        }
    }

    if let Some(number) = upper.strip_prefix('F') {
        if let Ok(parsed) = number.parse::<u8>() {
            if (1..=24).contains(&parsed) {
                return Ok(Key::Function(parsed));
            }
        }
        return Err("Function key must be between F1 and F24.".to_string());
    }

    Err(format!("Unsupported key '{raw}'."))
}
