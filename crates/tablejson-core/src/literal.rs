//! Table-constructor syntax — the host's own textual form for values.
//!
//! [`parse`] reads a single expression such as
//! `{ "a", "b", name = "x", [10] = 1.5, nested = { true } }` and [`render`]
//! writes a value back in compact constructor form. The CLI uses this to
//! accept dynamic values on the encode side and to show them on the decode
//! side.
//!
//! Supported syntax:
//!
//! - `nil`, `true`, `false`
//! - Numbers: decimal integers, `0x` hex integers (wrapping into `i64`),
//!   decimal floats with fraction and/or exponent, unary minus. A decimal
//!   integer that overflows `i64` becomes a float.
//! - Strings: `"..."` / `'...'` with the usual escapes (`\n`, `\ddd`,
//!   `\xXX`, `\u{XXXX}`, `\z`, ...) and long brackets `[[...]]`, `[==[...]==]`
//! - Tables: positional, `name = v` and `[k] = v` fields separated by `,`
//!   or `;`. Positional fields take indices 1, 2, 3… in source order.
//! - `--` line comments and `--[[ ]]` block comments
//!
//! `nil` values are stored explicitly, the same way the decoder keeps a JSON
//! `null`, so `parse(&render(v)) == v` for any value without `NaN`.

use crate::encoder::{classify, Shape};
use crate::error::{Error, Result};
use crate::value::{format_float, Key, Table, Value, MAX_DEPTH};

const KEYWORDS: [&str; 22] = [
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Parse one table-constructor expression. Anything but whitespace and
/// comments after the expression is an error.
pub fn parse(text: &str) -> Result<Value> {
    let mut parser = Parser::new(text);
    parser.skip_trivia()?;
    let value = parser.expression()?;
    parser.skip_trivia()?;
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

/// Render a value in compact table-constructor form.
pub fn render(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Build a positioned error from the current byte offset.
    fn error(&self, message: impl Into<String>) -> Error {
        let consumed = self.src.get(..self.pos).unwrap_or(self.src);
        let line = consumed.matches('\n').count() + 1;
        let line_start = consumed.rfind('\n').map_or(0, |i| i + 1);
        let column = consumed[line_start..].chars().count() + 1;
        Error::Literal {
            line,
            column,
            message: message.into(),
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        self.skip_trivia()?;
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", byte as char)))
        }
    }

    /// Skip whitespace, `--` line comments and `--[[ ]]` block comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    self.pos += 2;
                    if self.long_bracket_level().is_some() {
                        self.long_bracket()?;
                    } else {
                        while let Some(b) = self.peek() {
                            if b == b'\n' {
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn expression(&mut self) -> Result<Value> {
        match self.peek() {
            Some(b'{') => self.table(),
            Some(q @ (b'"' | b'\'')) => self.quoted_string(q).map(Value::String),
            Some(b'[') if self.long_bracket_level().is_some() => {
                self.long_bracket().map(Value::String)
            }
            Some(b'-') => {
                self.pos += 1;
                self.skip_trivia()?;
                match self.peek() {
                    Some(b) if b.is_ascii_digit() || b == b'.' => Ok(negate(self.number()?)),
                    _ => Err(self.error("expected number after '-'")),
                }
            }
            Some(b) if b.is_ascii_digit() => self.number(),
            Some(b'.') if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => self.number(),
            Some(b) if is_ident_start(b) => {
                let start = self.pos;
                let name = self.identifier();
                match name {
                    "nil" => Ok(Value::Nil),
                    "true" => Ok(Value::Boolean(true)),
                    "false" => Ok(Value::Boolean(false)),
                    _ => {
                        self.pos = start;
                        Err(self.error(format!("unexpected identifier '{}'", name)))
                    }
                }
            }
            Some(_) => {
                let ch = self.src[self.pos..].chars().next().unwrap_or('?');
                Err(self.error(format!("unexpected character '{}'", ch)))
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn identifier(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        &src[start..self.pos]
    }

    fn number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek() == Some(b'0') && matches!(self.peek_at(1), Some(b'x' | b'X')) {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|b| b.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            if self.pos == digits_start {
                return Err(self.error("malformed number"));
            }
            let src = self.src;
            let value = src[digits_start..self.pos]
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(16).wrapping_add(hex_digit(b)));
            self.reject_number_suffix(start)?;
            return Ok(Value::Integer(value as i64));
        }

        let mut is_float = false;
        self.digits();
        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos = start;
                return Err(self.error("malformed number"));
            }
            self.digits();
        }
        self.reject_number_suffix(start)?;

        let src = self.src;
        let text = &src[start..self.pos];
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
        }
        text.parse::<f64>().map(Value::Float).map_err(|_| {
            self.pos = start;
            self.error("malformed number")
        })
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn reject_number_suffix(&mut self, start: usize) -> Result<()> {
        if self.peek().is_some_and(|b| is_ident_continue(b) || b == b'.') {
            self.pos = start;
            return Err(self.error("malformed number"));
        }
        Ok(())
    }

    fn quoted_string(&mut self, quote: u8) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                self.pos = start;
                return Err(self.error("unfinished string"));
            };
            match b {
                b'\n' | b'\r' => {
                    self.pos = start;
                    return Err(self.error("unfinished string"));
                }
                b'\\' => {
                    self.pos += 1;
                    self.escape(&mut buf)?;
                }
                _ if b == quote => {
                    self.pos += 1;
                    break;
                }
                _ => {
                    buf.push(b);
                    self.pos += 1;
                }
            }
        }
        String::from_utf8(buf).map_err(|_| {
            self.pos = start;
            self.error("string is not valid UTF-8")
        })
    }

    /// Decode one escape sequence; `self.pos` is just past the backslash.
    fn escape(&mut self, buf: &mut Vec<u8>) -> Result<()> {
        let Some(b) = self.peek() else {
            return Err(self.error("unfinished string"));
        };
        self.pos += 1;
        match b {
            b'n' | b'\n' => buf.push(b'\n'),
            b't' => buf.push(b'\t'),
            b'r' => buf.push(b'\r'),
            b'a' => buf.push(0x07),
            b'b' => buf.push(0x08),
            b'f' => buf.push(0x0c),
            b'v' => buf.push(0x0b),
            b'\\' | b'"' | b'\'' => buf.push(b),
            b'x' => {
                let hi = self.peek().filter(u8::is_ascii_hexdigit);
                let lo = self.peek_at(1).filter(u8::is_ascii_hexdigit);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        self.pos += 2;
                        buf.push((hex_digit(hi) * 16 + hex_digit(lo)) as u8);
                    }
                    _ => return Err(self.error("hexadecimal digit expected")),
                }
            }
            b'z' => {
                while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                    self.pos += 1;
                }
            }
            b'u' => {
                if self.peek() != Some(b'{') {
                    return Err(self.error("missing '{' in \\u{xxxx}"));
                }
                self.pos += 1;
                let mut code: u32 = 0;
                let digits_start = self.pos;
                while let Some(d) = self.peek().filter(u8::is_ascii_hexdigit) {
                    code = code.saturating_mul(16).saturating_add(hex_digit(d) as u32);
                    self.pos += 1;
                }
                if self.pos == digits_start || self.peek() != Some(b'}') {
                    return Err(self.error("malformed \\u{xxxx} escape"));
                }
                self.pos += 1;
                let ch = char::from_u32(code)
                    .ok_or_else(|| self.error("invalid Unicode code point in escape"))?;
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
            }
            b'0'..=b'9' => {
                let mut code = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d) if d.is_ascii_digit() => {
                            code = code * 10 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                let byte = u8::try_from(code).map_err(|_| self.error("decimal escape too large"))?;
                buf.push(byte);
            }
            _ => {
                self.pos -= 1;
                return Err(self.error("invalid escape sequence"));
            }
        }
        Ok(())
    }

    /// `Some(level)` when a long bracket `[`, `=`*level, `[` starts here.
    fn long_bracket_level(&self) -> Option<usize> {
        if self.peek() != Some(b'[') {
            return None;
        }
        let mut level = 0;
        while self.peek_at(1 + level) == Some(b'=') {
            level += 1;
        }
        (self.peek_at(1 + level) == Some(b'[')).then_some(level)
    }

    fn long_bracket(&mut self) -> Result<String> {
        let start = self.pos;
        let level = self.long_bracket_level().unwrap_or(0);
        self.pos += level + 2;
        // A newline right after the opening bracket is not part of the text.
        if self.peek() == Some(b'\r') {
            self.pos += 1;
        }
        if self.peek() == Some(b'\n') {
            self.pos += 1;
        }
        let close = format!("]{}]", "=".repeat(level));
        match self.src[self.pos..].find(&close) {
            Some(offset) => {
                let text = self.src[self.pos..self.pos + offset].to_string();
                self.pos += offset + close.len();
                Ok(text)
            }
            None => {
                self.pos = start;
                Err(self.error("unfinished long string"))
            }
        }
    }

    fn table(&mut self) -> Result<Value> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("table nesting too deep"));
        }
        self.pos += 1;

        let mut table = Table::new();
        let mut next_index: i64 = 1;
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') {
                self.pos += 1;
                break;
            }

            if self.peek() == Some(b'[') && self.long_bracket_level().is_none() {
                self.pos += 1;
                self.skip_trivia()?;
                let key_pos = self.pos;
                let key = self.expression()?;
                self.expect(b']')?;
                self.expect(b'=')?;
                self.skip_trivia()?;
                let value = self.expression()?;
                let key = value_to_key(key).map_err(|msg| {
                    self.pos = key_pos;
                    self.error(msg)
                })?;
                table.insert(key, value);
            } else if let Some(name) = self.field_name() {
                self.skip_trivia()?;
                let value = self.expression()?;
                table.insert(name, value);
            } else {
                let value = self.expression()?;
                table.insert(next_index, value);
                next_index += 1;
            }

            self.skip_trivia()?;
            match self.peek() {
                Some(b',' | b';') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expected ',' or '}' in table")),
            }
        }

        self.depth -= 1;
        Ok(Value::Table(table))
    }

    /// Consume `name =` if it starts here; otherwise leave the position alone.
    fn field_name(&mut self) -> Option<&'a str> {
        if !self.peek().is_some_and(is_ident_start) {
            return None;
        }
        let start = self.pos;
        let name = self.identifier();
        if !KEYWORDS.contains(&name) {
            let after_name = self.pos;
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if self.peek() == Some(b'=') && self.peek_at(1) != Some(b'=') {
                self.pos += 1;
                return Some(name);
            }
            self.pos = after_name;
        }
        self.pos = start;
        None
    }
}

fn value_to_key(value: Value) -> std::result::Result<Key, &'static str> {
    match value {
        Value::Nil => Err("table index is nil"),
        Value::Float(f) if f.is_nan() => Err("table index is NaN"),
        Value::Float(f) => Ok(Key::from(f)),
        Value::Integer(i) => Ok(Key::Integer(i)),
        Value::Boolean(b) => Ok(Key::Boolean(b)),
        Value::String(s) => Ok(Key::String(s)),
        Value::Table(_) => Err("table keys must be scalars"),
    }
}

fn negate(value: Value) -> Value {
    match value {
        Value::Integer(i) => Value::Integer(i.wrapping_neg()),
        Value::Float(f) => Value::Float(-f),
        other => other,
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    bytes.next().is_some_and(is_ident_start)
        && bytes.all(is_ident_continue)
        && !KEYWORDS.contains(&s)
}

fn hex_digit(b: u8) -> u64 {
    match b {
        b'0'..=b'9' => u64::from(b - b'0'),
        b'a'..=b'f' => u64::from(b - b'a' + 10),
        b'A'..=b'F' => u64::from(b - b'A' + 10),
        _ => 0,
    }
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Nil => out.push_str("nil"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        // `-9223372036854775808` would read back as a float.
        Value::Integer(i64::MIN) => out.push_str("0x8000000000000000"),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Float(f) => write_float(*f, out),
        Value::String(s) => write_string(s, out),
        Value::Table(t) => write_table(t, out),
    }
}

fn write_float(f: f64, out: &mut String) {
    if f.is_nan() {
        out.push_str("(0/0)");
    } else if f == f64::INFINITY {
        out.push_str("1e9999");
    } else if f == f64::NEG_INFINITY {
        out.push_str("-1e9999");
    } else {
        out.push_str(&format_float(f));
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => {
                // Pad to three digits when a digit follows.
                if chars.peek().is_some_and(|next| next.is_ascii_digit()) {
                    out.push_str(&format!("\\{:03}", c as u32));
                } else {
                    out.push_str(&format!("\\{}", c as u32));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_table(table: &Table, out: &mut String) {
    out.push('{');
    match classify(table) {
        Shape::Empty => {}
        Shape::Array => {
            let mut slots: Vec<Option<&Value>> = vec![None; table.len()];
            for (key, value) in table.iter() {
                if let Key::Integer(i) = key {
                    slots[(*i - 1) as usize] = Some(value);
                }
            }
            for (i, value) in slots.into_iter().flatten().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(value, out);
            }
        }
        Shape::Object => {
            for (i, (key, value)) in table.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                match key {
                    Key::String(s) if is_identifier(s) => out.push_str(s),
                    _ => {
                        out.push('[');
                        write_value(&key.to_value(), out);
                        out.push(']');
                    }
                }
                out.push('=');
                write_value(value, out);
            }
        }
    }
    out.push('}');
}
