//! Tolerant parser for the object-literal subset of TypeScript.
//!
//! Accepts everything JSON accepts plus what hand-edited data modules tend to
//! contain: unquoted and single-quoted keys, single-quoted and backtick
//! strings, comments, trailing commas, hex/octal/binary numbers and
//! `undefined`. Nothing is ever evaluated; template interpolation (`${`) is
//! rejected rather than executed.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Maximum nesting of objects and arrays.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}, column {column}")]
pub struct LiteralError {
    pub kind: ErrorKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("template interpolation is not supported")]
    Interpolation,
    #[error("invalid number")]
    InvalidNumber,
    #[error("number is not finite")]
    NonFiniteNumber,
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("nesting deeper than {MAX_DEPTH} levels")]
    TooDeep,
    #[error("unexpected content after value")]
    TrailingContent,
}

/// Parse a single literal value. Surrounding whitespace and comments are
/// allowed; anything else after the value is an error.
pub fn parse_literal(src: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser { src, pos: 0, depth: 0 };
    parser.skip_trivia()?;
    let value = parser.value()?;
    parser.skip_trivia()?;
    if parser.pos < src.len() {
        return Err(parser.error(ErrorKind::TrailingContent));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, kind: ErrorKind) -> LiteralError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, pos: usize, kind: ErrorKind) -> LiteralError {
        let before = &self.src[..pos];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before, |nl| &before[nl + 1..])
            .chars()
            .count()
            + 1;
        LiteralError { kind, line, column }
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(c) => self.error(ErrorKind::UnexpectedChar(c)),
            None => self.error(ErrorKind::UnexpectedEnd),
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), LiteralError> {
        if self.peek() == Some(wanted) {
            self.pos += wanted.len_utf8();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Skip whitespace, line comments and block comments.
    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    self.pos += 2;
                    match self.src[self.pos..].find("*/") {
                        Some(end) => self.pos += end + 2,
                        None => return Err(self.error_at(start, ErrorKind::UnterminatedComment)),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some('{') => self.nested(Self::object),
            Some('[') => self.nested(Self::array),
            Some(q @ ('"' | '\'' | '`')) => self.string(q).map(Value::String),
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if is_ident_start(c) => self.keyword(),
            _ => Err(self.unexpected()),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(ErrorKind::TooDeep));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn object(&mut self) -> Result<Value, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }
            let key = self.key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.value()?;
            map.insert(key, value);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => self.string(q),
            Some(c) if is_ident_start(c) => Ok(self.identifier().to_string()),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '.') {
                    self.bump();
                }
                Ok(self.src[start..self.pos].to_string())
            }
            _ => Err(self.unexpected()),
        }
    }

    fn array(&mut self) -> Result<Value, LiteralError> {
        self.expect('[')?;
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
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        match self.identifier() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" | "undefined" => Ok(Value::Null),
            "Infinity" | "NaN" => Err(self.error_at(start, ErrorKind::NonFiniteNumber)),
            other => Err(self.error_at(start, ErrorKind::UnknownIdentifier(other.to_string()))),
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.error_at(start, ErrorKind::UnterminatedString));
            };
            match c {
                c if c == quote => return Ok(out),
                '\\' => self.escape(&mut out)?,
                '$' if quote == '`' && self.peek() == Some('{') => {
                    return Err(self.error_at(self.pos - 1, ErrorKind::Interpolation));
                }
                '\n' | '\r' if quote != '`' => {
                    return Err(self.error_at(start, ErrorKind::UnterminatedString));
                }
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let at = self.pos - 1;
        let Some(c) = self.bump() else {
            return Err(self.error(ErrorKind::UnexpectedEnd));
        };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.hex_digits(2).ok_or_else(|| self.error_at(at, ErrorKind::InvalidEscape))?;
                out.push(char::from_u32(code).ok_or_else(|| self.error_at(at, ErrorKind::InvalidEscape))?);
            }
            'u' => {
                let code = self.unicode_escape().ok_or_else(|| self.error_at(at, ErrorKind::InvalidEscape))?;
                out.push(code);
            }
            // Line continuation.
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            c if c.is_ascii_digit() => return Err(self.error_at(at, ErrorKind::InvalidEscape)),
            // Any other escaped character stands for itself.
            c => out.push(c),
        }
        Ok(())
    }

    fn hex_digits(&mut self, count: usize) -> Option<u32> {
        let digits = self.src.get(self.pos..self.pos + count)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let code = u32::from_str_radix(digits, 16).ok()?;
        self.pos += count;
        Some(code)
    }

    fn unicode_escape(&mut self) -> Option<char> {
        if self.peek() == Some('{') {
            self.bump();
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.bump();
            }
            let digits = &self.src[start..self.pos];
            if digits.is_empty() || self.bump() != Some('}') {
                return None;
            }
            return char::from_u32(u32::from_str_radix(digits, 16).ok()?);
        }

        let high = self.hex_digits(4)?;
        if !(0xD800..0xDC00).contains(&high) {
            // Lone low surrogates are not representable.
            return Some(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        // High surrogate: pair it with a following \uXXXX low surrogate.
        if self.src[self.pos..].starts_with("\\u") {
            let save = self.pos;
            self.pos += 2;
            if let Some(low) = self.hex_digits(4) {
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code);
                }
            }
            self.pos = save;
        }
        Some(char::REPLACEMENT_CHARACTER)
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };
        if self.peek().is_some_and(is_ident_start) {
            // -Infinity, +NaN and friends.
            return match self.identifier() {
                "Infinity" | "NaN" => Err(self.error_at(start, ErrorKind::NonFiniteNumber)),
                _ => Err(self.error_at(start, ErrorKind::InvalidNumber)),
            };
        }

        let radix = match (self.peek(), self.peek_second()) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                self.bump();
            }
            let digits: String = self.src[digits_start..self.pos].chars().filter(|&c| c != '_').collect();
            let magnitude = i64::from_str_radix(&digits, radix)
                .map_err(|_| self.error_at(start, ErrorKind::InvalidNumber))?;
            return Ok(Value::from(if negative { -magnitude } else { magnitude }));
        }

        let body_start = self.pos;
        let mut is_integer = true;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' => is_integer = false,
                'e' | 'E' => {
                    is_integer = false;
                    if matches!(self.peek_second(), Some('+' | '-')) {
                        self.bump();
                    }
                }
                _ => break,
            }
            self.bump();
        }
        let body: String = self.src[body_start..self.pos].chars().filter(|&c| c != '_').collect();
        if body.is_empty() || body == "." {
            return Err(self.error_at(start, ErrorKind::InvalidNumber));
        }
        if self.peek().is_some_and(is_ident_continue) {
            return Err(self.error_at(start, ErrorKind::InvalidNumber));
        }

        if is_integer {
            if let Ok(n) = body.parse::<i64>() {
                return Ok(Value::from(if negative { -n } else { n }));
            }
        }
        let f: f64 = body
            .parse()
            .map_err(|_| self.error_at(start, ErrorKind::InvalidNumber))?;
        let f = if negative { -f } else { f };
        Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| self.error_at(start, ErrorKind::NonFiniteNumber))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        let v = parse_literal(r#"{"a": [1, 2.5, -3], "b": {"c": null, "d": true}}"#).unwrap();
        assert_eq!(v, json!({"a": [1, 2.5, -3], "b": {"c": null, "d": true}}));
    }

    #[test]
    fn test_typescript_object_literal() {
        let src = r#"
        {
          // creator profile
          celebData: {
            name: 'Chef Kim',
            handle: "@chef_kim",
            /* scores */
            dna: [{ label: 'Persuasion', value: 85, }, ],
          },
          'matchScore': { score: 92, summary: `multi
line`, },
          notes: undefined,
        }"#;
        let v = parse_literal(src).unwrap();
        assert_eq!(v["celebData"]["name"], json!("Chef Kim"));
        assert_eq!(v["celebData"]["dna"][0]["value"], json!(85));
        assert_eq!(v["matchScore"]["summary"], json!("multi\nline"));
        assert_eq!(v["notes"], Value::Null);
    }

    #[test]
    fn test_key_order_is_preserved() {
        let v = parse_literal("{ z: 1, a: 2, m: 3 }").unwrap();
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_string_escapes() {
        let v = parse_literal(r#"['it\'s', "tab\there", '\x41B\u{1F600}', '😀', 'a\
b']"#)
        .unwrap();
        assert_eq!(v, json!(["it's", "tab\there", "AB\u{1F600}", "\u{1F600}", "ab"]));
    }

    #[test]
    fn test_numbers() {
        let v = parse_literal("[0x1F, 0o17, 0b101, 1_000, .5, 1e3, -2, +7]").unwrap();
        assert_eq!(v, json!([31, 15, 5, 1000, 0.5, 1000.0, -2, 7]));
    }

    #[test]
    fn test_rejects_interpolation() {
        let err = parse_literal("{ a: `hello ${name}` }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Interpolation);
        assert_eq!((err.line, err.column), (1, 13));
    }

    #[test]
    fn test_rejects_code() {
        let err = parse_literal("{ a: process.exit(1) }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownIdentifier("process".to_string()));

        let err = parse_literal("{ a: NaN }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NonFiniteNumber);
    }

    #[test]
    fn test_error_positions() {
        let err = parse_literal("{\n  a: 1,\n  b: 'open\n}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedString);
        assert_eq!((err.line, err.column), (3, 6));

        let err = parse_literal("{ a: 1 } extra").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TrailingContent);

        let err = parse_literal("{ a: 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEnd);

        let err = parse_literal("/* never closed").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedComment);
    }

    #[test]
    fn test_depth_limit() {
        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&ok).is_ok());

        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert_eq!(parse_literal(&deep).unwrap_err().kind, ErrorKind::TooDeep);
    }

    #[test]
    fn test_non_ascii_text() {
        let v = parse_literal("{ 이름: '김셰프', tagline: '맛있는 \"일상\"' }").unwrap();
        assert_eq!(v["이름"], json!("김셰프"));
        assert_eq!(v["tagline"], json!("맛있는 \"일상\""));
    }
}
