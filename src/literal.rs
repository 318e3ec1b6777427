//! Reader for exported literal files.
//!
//! Snapshots are persisted as `exports.<Name> = { ... };`, a literal that the
//! consuming side loads as code. Keys may be bare identifiers, quoted strings
//! or numbers, and the body may carry trailing commas and comments. This module
//! reads that shape back into a [`serde_json::Value`] so the previous output
//! can serve as the next run's prior snapshot.

use serde_json::{Map, Number, Value};

/// A parsed `exports.<name> = <value>;` module.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedLiteral {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}, column {column}: {message}")]
pub struct LiteralError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse a complete exported literal module.
pub fn parse_exported(source: &str) -> Result<ExportedLiteral, LiteralError> {
    let mut parser = Parser::new(source);
    parser.skip_trivia()?;
    parser.expect_word("exports")?;
    parser.expect_char('.')?;
    let name = parser.identifier()?;
    parser.skip_trivia()?;
    parser.expect_char('=')?;
    let value = parser.value()?;
    parser.skip_trivia()?;
    if parser.peek() == Some(';') {
        parser.bump();
        parser.skip_trivia()?;
    }
    if parser.peek().is_some() {
        return Err(parser.error("unexpected content after exported literal"));
    }
    Ok(ExportedLiteral { name, value })
}

struct Parser<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self { source, pos: 0 }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        let consumed = &self.source[..self.pos];
        let line = consumed.matches('\n').count() + 1;
        let column = match consumed.rfind('\n') {
            Some(newline) => consumed[newline + 1..].chars().count() + 1,
            None => consumed.chars().count() + 1,
        };
        LiteralError {
            line,
            column,
            message: message.into(),
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            let rest = self.rest();
            if let Some(c) = rest.chars().next().filter(|c| c.is_whitespace()) {
                self.pos += c.len_utf8();
            } else if rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => return Err(self.error("unterminated block comment")),
                }
            } else {
                return Ok(());
            }
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of input", expected))),
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), LiteralError> {
        if self.rest().starts_with(word) {
            self.pos += word.len();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", word)))
        }
    }

    fn word(&mut self) -> &'s str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn identifier(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                Ok(self.word().to_string())
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some(quote @ ('"' | '\'')) => self.string(quote).map(Value::String),
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(c) if c.is_ascii_alphabetic() => match self.word() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                other => Err(self.error(format!("unexpected identifier '{}'", other))),
            },
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn object(&mut self) -> Result<Value, LiteralError> {
        self.expect_char('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            let key = self.key()?;
            self.skip_trivia()?;
            self.expect_char(':')?;
            let value = self.value()?;
            if map.insert(key.clone(), value).is_some() {
                return Err(self.error(format!("duplicate key '{}'", key)));
            }
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => return Err(self.error("expected ',' or '}' in object")),
            }
        }
    }

    fn key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.string(quote),
            Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '$' => {
                Ok(self.word().to_string())
            }
            _ => Err(self.error("expected object key")),
        }
    }

    fn array(&mut self) -> Result<Value, LiteralError> {
        self.expect_char('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                _ => return Err(self.error("expected ',' or ']' in array")),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.expect_char(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('b') => '\u{0008}',
                        Some('f') => '\u{000C}',
                        Some('0') => '\0',
                        Some('u') => self.unicode_escape()?,
                        Some(other) => other,
                        None => return Err(self.error("unterminated escape")),
                    };
                    out.push(escaped);
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, LiteralError> {
        let hex = self.rest().get(..4).unwrap_or("");
        if hex.len() != 4 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.error("invalid \\u escape"));
        }
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| self.error("invalid \\u escape"))?;
        self.pos += 4;
        char::from_u32(code).ok_or_else(|| self.error("invalid unicode scalar"))
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .find(|&(i, c)| {
                !(c.is_ascii_digit()
                    || c == '.'
                    || c == 'e'
                    || c == 'E'
                    || c == '+'
                    || (c == '-' && (i == 0 || rest[..i].ends_with(['e', 'E']))))
            })
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let text = &rest[..end];
        let number = if let Ok(int) = text.parse::<i64>() {
            Number::from(int)
        } else {
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| self.error(format!("invalid number '{}'", text)))?
        };
        self.pos += end;
        Ok(Value::Number(number))
    }
}
