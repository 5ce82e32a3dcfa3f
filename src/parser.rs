use crate::ast::{Key, Pair, Value};
use crate::error::ParseError;
use std::collections::HashMap;
use std::io::{BufRead, Lines};

type Result<T> = std::result::Result<T, ParseError>;

pub const MAX_DEPTH: usize = 512;

macro_rules! bail {
    ($line:expr, $($arg:tt)*) => {
        return Err(ParseError::new(format!($($arg)*), $line))
    };
}

pub struct Parser<R> {
    pos: usize,
    lines: Lines<R>,
    line: Option<Vec<char>>,
    line_number: usize,
    depth: usize,
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R) -> Result<Self> {
        let mut lines = reader.lines();
        let line = lines.next().transpose()?;
        let mut parser = Self {
            pos: 0,
            lines,
            line: line.map(|l| l.chars().collect()),
            line_number: 1,
            depth: 0,
        };
        parser.settle()?;
        Ok(parser)
    }
    // move past exhausted (or empty) lines
    fn settle(&mut self) -> Result<()> {
        while let Some(line) = self.line.as_ref() {
            if self.pos < line.len() {
                break;
            }
            self.pos = 0;
            let line = self.lines.next().transpose()?;
            self.line = line.map(|s| s.chars().collect());
            self.line_number += 1;
        }
        Ok(())
    }
    fn succ(&mut self) -> Result<()> {
        self.pos += 1;
        self.settle()
    }
    fn get_cur_char(&self) -> Option<&char> {
        self.line.as_ref().and_then(|l| l.get(self.pos))
    }
    fn cur_char_is(&self, ch: char) -> bool {
        match self.get_cur_char() {
            Some(&c) => c == ch,
            None => false,
        }
    }
    fn expect_char(&self, expect: char) -> Result<()> {
        match self.get_cur_char() {
            Some(&actual) if actual == expect => Ok(()),
            Some(&actual) => bail!(
                self.line_number,
                "expected: `{}`, found: `{}`",
                expect,
                actual
            ),
            None => bail!(self.line_number, "expected `{}`", expect),
        }
    }
    // check current token and skip it
    fn consume_char(&mut self, ch: char) -> Result<()> {
        self.expect_char(ch)?;
        self.succ()
    }
    fn skip_whitespace(&mut self) -> Result<()> {
        while self
            .get_cur_char()
            .map_or(false, |ch| matches!(ch, ' ' | '\t' | '\n' | '\r'))
        {
            self.succ()?;
        }
        Ok(())
    }
    fn parse_hex4(&mut self) -> Result<u32> {
        let mut code = 0;
        for _ in 0..4 {
            match self.get_cur_char().and_then(|ch| ch.to_digit(16)) {
                Some(d) => code = code * 16 + d,
                None => bail!(self.line_number, "invalid unicode escape"),
            }
            self.pos += 1;
        }
        Ok(code)
    }
    fn parse_unicode_escape(&mut self) -> Result<char> {
        let high = self.parse_hex4()?;
        let code = if (0xd800..0xdc00).contains(&high) {
            if !(self.cur_char_is('\\') && self.peek_char_is('u')) {
                bail!(self.line_number, "unpaired surrogate `\\u{:04x}`", high);
            }
            self.pos += 2;
            let low = self.parse_hex4()?;
            if !(0xdc00..0xe000).contains(&low) {
                bail!(self.line_number, "unpaired surrogate `\\u{:04x}`", high);
            }
            0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00)
        } else {
            high
        };
        match std::char::from_u32(code) {
            Some(ch) => Ok(ch),
            None => bail!(self.line_number, "unpaired surrogate `\\u{:04x}`", code),
        }
    }
    fn peek_char_is(&self, ch: char) -> bool {
        self.line
            .as_ref()
            .and_then(|l| l.get(self.pos + 1))
            .map_or(false, |&c| c == ch)
    }
    // a string never spans lines, so it is scanned within the current one
    fn parse_inner_string(&mut self) -> Result<String> {
        self.expect_char('"')?; // left quotes
        let start_line = self.line_number;
        self.pos += 1;
        let mut s = String::new();
        loop {
            let ch = match self.get_cur_char() {
                Some(&ch) => ch,
                None => bail!(start_line, "unterminated string"),
            };
            match ch {
                '"' => break,
                '\\' => {
                    self.pos += 1;
                    let escaped = match self.get_cur_char() {
                        Some(&c) => c,
                        None => bail!(start_line, "unterminated string"),
                    };
                    self.pos += 1;
                    match escaped {
                        '"' => s.push('"'),
                        '\\' => s.push('\\'),
                        '/' => s.push('/'),
                        'b' => s.push('\u{8}'),
                        'f' => s.push('\u{c}'),
                        'n' => s.push('\n'),
                        'r' => s.push('\r'),
                        't' => s.push('\t'),
                        'u' => s.push(self.parse_unicode_escape()?),
                        other => bail!(self.line_number, "invalid escape: `\\{}`", other),
                    }
                }
                c if (c as u32) < 0x20 => {
                    bail!(self.line_number, "control character in string")
                }
                c => {
                    s.push(c);
                    self.pos += 1;
                }
            }
        }
        self.consume_char('"')?; // right quotes
        Ok(s)
    }
    fn parse_string_value(&mut self) -> Result<Value> {
        let s = self.parse_inner_string()?;
        Ok(Value::String(s))
    }
    fn parse_string_key(&mut self) -> Result<Key> {
        let s = self.parse_inner_string()?;
        Ok(Key(s))
    }
    fn take_digits(&mut self, num: &mut String) -> usize {
        let mut count = 0;
        while let Some(&ch) = self.get_cur_char() {
            if !ch.is_ascii_digit() {
                break;
            }
            num.push(ch);
            self.pos += 1;
            count += 1;
        }
        count
    }
    // numbers never span lines either
    fn parse_number(&mut self) -> Result<Value> {
        let mut num = String::new();
        if self.cur_char_is('-') {
            num.push('-');
            self.pos += 1;
        }
        let leading_zero = self.cur_char_is('0');
        let int_digits = self.take_digits(&mut num);
        if int_digits == 0 {
            bail!(self.line_number, "invalid number: `{}`", num);
        }
        if leading_zero && int_digits > 1 {
            bail!(self.line_number, "leading zero in number: `{}`", num);
        }
        let mut is_float = false;
        if self.cur_char_is('.') {
            num.push('.');
            self.pos += 1;
            is_float = true;
            if self.take_digits(&mut num) == 0 {
                bail!(self.line_number, "invalid number: `{}`", num);
            }
        }
        if self.cur_char_is('e') || self.cur_char_is('E') {
            num.push('e');
            self.pos += 1;
            is_float = true;
            if let Some(&sign) = self.get_cur_char() {
                if sign == '+' || sign == '-' {
                    num.push(sign);
                    self.pos += 1;
                }
            }
            if self.take_digits(&mut num) == 0 {
                bail!(self.line_number, "invalid number: `{}`", num);
            }
        }
        self.settle()?;
        if !is_float {
            if let Ok(n) = num.parse::<i64>() {
                return Ok(Value::Integer(n));
            }
        }
        match num.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(Value::Float(x)),
            _ => bail!(self.line_number, "number out of range: `{}`", num),
        }
    }
    fn parse_literal(&mut self, word: &str, value: Value) -> Result<Value> {
        for expect in word.chars() {
            if !self.cur_char_is(expect) {
                bail!(self.line_number, "invalid literal, expected `{}`", word);
            }
            self.pos += 1;
        }
        self.settle()?;
        Ok(value)
    }
    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            bail!(
                self.line_number,
                "nesting depth exceeds the limit of {}",
                MAX_DEPTH
            );
        }
        self.depth += 1;
        Ok(())
    }
    fn parse_object(&mut self) -> Result<Value> {
        self.enter()?;
        self.consume_char('{')?;
        self.skip_whitespace()?;
        if self.cur_char_is('}') {
            self.succ()?;
            self.depth -= 1;
            return Ok(Value::Object(Vec::new()));
        }
        let mut pairs: Vec<Pair> = vec![];
        let mut index: HashMap<Key, usize> = HashMap::new();
        loop {
            self.skip_whitespace()?;
            let key = self.parse_string_key()?;
            self.skip_whitespace()?;
            self.consume_char(':')?;
            let value = self.parse_value()?;
            self.skip_whitespace()?;
            // a repeated key keeps its first position and takes the last value
            match index.get(&key) {
                Some(&i) => pairs[i].value = value,
                None => {
                    index.insert(key.clone(), pairs.len());
                    pairs.push(Pair::new(key, value));
                }
            }
            match self.get_cur_char() {
                Some(',') => self.succ()?,
                Some('}') => break,
                Some(&other) => bail!(
                    self.line_number,
                    "expected: `,` or `}}`, found: `{}`",
                    other
                ),
                None => bail!(self.line_number, "expected `,` or `}}`"),
            }
        }
        self.consume_char('}')?;
        self.depth -= 1;
        Ok(Value::Object(pairs))
    }
    fn parse_array(&mut self) -> Result<Value> {
        self.enter()?;
        self.consume_char('[')?;
        self.skip_whitespace()?;
        if self.cur_char_is(']') {
            self.succ()?;
            self.depth -= 1;
            return Ok(Value::Array(Vec::new()));
        }
        let mut values = vec![];
        loop {
            let value = self.parse_value()?;
            self.skip_whitespace()?;
            values.push(value);
            match self.get_cur_char() {
                Some(',') => self.succ()?,
                Some(']') => break,
                Some(&other) => bail!(
                    self.line_number,
                    "expected: `,` or `]`, found: `{}`",
                    other
                ),
                None => bail!(self.line_number, "expected `,` or `]`"),
            }
        }
        self.consume_char(']')?;
        self.depth -= 1;
        Ok(Value::Array(values))
    }
    pub fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace()?;
        match self.get_cur_char() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => self.parse_string_value(),
            Some('t') => self.parse_literal("true", Value::Bool(true)),
            Some('f') => self.parse_literal("false", Value::Bool(false)),
            Some('n') => self.parse_literal("null", Value::Null),
            Some(&ch) if (ch == '-' || ch.is_ascii_digit()) => self.parse_number(),
            Some(&other) => bail!(self.line_number, "invalid token: `{}`", other),
            None => bail!(self.line_number, "no token found"),
        }
    }
    /// Parses a single JSON value that must make up the whole input.
    pub fn parse_document(&mut self) -> Result<Value> {
        let value = self.parse_value()?;
        self.skip_whitespace()?;
        if let Some(&other) = self.get_cur_char() {
            bail!(self.line_number, "trailing characters: `{}`", other);
        }
        Ok(value)
    }
}
