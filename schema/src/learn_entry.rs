use std::fmt;
use std::str::FromStr;

/// How a move is learned. Encoded as the single letter after the generation digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LearnMethod {
    LevelUp,
    Machine,
    Tutor,
    Egg,
    Event,
    DreamWorld,
    VirtualConsole,
    Restricted,
    Other(char),
}

impl LearnMethod {
    pub fn from_letter(letter: char) -> Option<Self> {
        let method = match letter {
            'L' => LearnMethod::LevelUp,
            'M' => LearnMethod::Machine,
            'T' => LearnMethod::Tutor,
            'E' => LearnMethod::Egg,
            'S' => LearnMethod::Event,
            'D' => LearnMethod::DreamWorld,
            'V' => LearnMethod::VirtualConsole,
            'R' => LearnMethod::Restricted,
            other if other.is_ascii_uppercase() => LearnMethod::Other(other),
            _ => return None,
        };
        Some(method)
    }

    pub fn letter(self) -> char {
        match self {
            LearnMethod::LevelUp => 'L',
            LearnMethod::Machine => 'M',
            LearnMethod::Tutor => 'T',
            LearnMethod::Egg => 'E',
            LearnMethod::Event => 'S',
            LearnMethod::DreamWorld => 'D',
            LearnMethod::VirtualConsole => 'V',
            LearnMethod::Restricted => 'R',
            LearnMethod::Other(letter) => letter,
        }
    }

    pub fn is_level_up(self) -> bool {
        self == LearnMethod::LevelUp
    }
}

impl fmt::Display for LearnMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A parsed learn-entry: `{generation}{method}[{level}{suffix}]`.
///
/// `Display` writes the canonical form, in which a level-up level is always
/// zero-padded to three digits. Lexical order of canonical level-up entries
/// within one generation therefore matches numeric level order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LearnEntry {
    pub generation: u8,
    pub method: LearnMethod,
    pub level: Option<u16>, // only set for level-up entries
    pub tail: String,       // disambiguation suffix (level-up) or raw detail (other methods)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryParseError {
    #[error("empty learn entry")]
    Empty,
    #[error("invalid generation digit {0:?}")]
    InvalidGeneration(char),
    #[error("missing learn method")]
    MissingMethod,
    #[error("unknown learn method {0:?}")]
    UnknownMethod(char),
    #[error("level-up entry has no level")]
    MissingLevel,
    #[error("level {0} does not fit in three digits")]
    LevelOutOfRange(String),
}

impl LearnEntry {
    pub fn level_up(generation: u8, level: u16, suffix: impl Into<String>) -> Self {
        Self {
            generation,
            method: LearnMethod::LevelUp,
            level: Some(level),
            tail: suffix.into(),
        }
    }

    pub fn is_level_up(&self) -> bool {
        self.method.is_level_up()
    }

    /// Both entries are level-up entries at the same numeric level.
    /// Generation and disambiguation suffix do not take part.
    pub fn same_level(&self, other: &LearnEntry) -> bool {
        self.is_level_up() && other.is_level_up() && self.level == other.level
    }

    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl FromStr for LearnEntry {
    type Err = EntryParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut chars = raw.chars();

        let generation = match chars.next() {
            None => return Err(EntryParseError::Empty),
            Some(c) => c
                .to_digit(10)
                .filter(|digit| *digit > 0)
                .ok_or(EntryParseError::InvalidGeneration(c))? as u8,
        };

        let method = match chars.next() {
            None => return Err(EntryParseError::MissingMethod),
            Some(c) => LearnMethod::from_letter(c).ok_or(EntryParseError::UnknownMethod(c))?,
        };

        let rest = chars.as_str();
        if !method.is_level_up() {
            return Ok(LearnEntry {
                generation,
                method,
                level: None,
                tail: rest.to_string(),
            });
        }

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, suffix) = rest.split_at(digits_end);
        if digits.is_empty() {
            return Err(EntryParseError::MissingLevel);
        }

        // Leading zeros are padding, not magnitude.
        let significant = digits.trim_start_matches('0');
        let level = if significant.is_empty() {
            0
        } else if significant.len() > 3 {
            return Err(EntryParseError::LevelOutOfRange(digits.to_string()));
        } else {
            significant
                .parse::<u16>()
                .map_err(|_| EntryParseError::LevelOutOfRange(digits.to_string()))?
        };

        Ok(LearnEntry::level_up(generation, level, suffix))
    }
}

impl fmt::Display for LearnEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.generation, self.method)?;
        if let Some(level) = self.level {
            write!(f, "{:03}", level)?;
        }
        write!(f, "{}", self.tail)
    }
}

/// Parse and re-format an entry in canonical form.
pub fn canonicalize(raw: &str) -> Result<String, EntryParseError> {
    raw.parse::<LearnEntry>().map(|entry| entry.to_string())
}
