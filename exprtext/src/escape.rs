//! Decoding of quoted string and bytes literals.
//!
//! A literal token is delimited by either single (`'`) or double (`"`) quotes.
//! Tripled delimiters (`'''` or `"""`) allow the quote character to appear
//! unescaped inside the literal. Within the delimiters, the following escapes
//! are recognized:
//!
//! - `\a`, `\b`, `\f`, `\n`, `\r`, `\t`, `\v` for the usual control characters,
//!   and `\'`, `\"`, `\\`, `\?` for the escaped character itself.
//! - `\ddd` with one to three octal digits, for a value up to 255.
//! - `\xHH` with exactly two hexadecimal digits.
//! - `\uHHHH` and `\UHHHHHHHH` for a unicode code point. These are only
//!   allowed in text literals.
//!
//! Octal and hexadecimal escapes always produce a single unit: a byte in bytes
//! literals and the code point with the same value in text literals.
//! Consecutive escapes are never combined into a UTF-8 sequence.
use logos::Logos;
use std::fmt::Write as _;
use tracing::{debug, trace};

/// Lexer token for the body of a quoted literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Logos)]
enum EscapedToken {
    #[token(r#"\a"#, |_| '\x07')]
    #[token(r#"\b"#, |_| '\x08')]
    #[token(r#"\f"#, |_| '\x0c')]
    #[token(r#"\n"#, |_| '\n')]
    #[token(r#"\r"#, |_| '\r')]
    #[token(r#"\t"#, |_| '\t')]
    #[token(r#"\v"#, |_| '\x0b')]
    #[token(r#"\'"#, |_| '\'')]
    #[token(r#"\""#, |_| '"')]
    #[token(r#"\\"#, |_| '\\')]
    #[token(r#"\?"#, |_| '?')]
    Escaped(char),

    #[regex(r#"\\[0-7]{1,3}"#, |lex| parse_radix(&lex.slice()[1..], 8))]
    Octal(u32),

    #[regex(r#"\\x[0-9a-fA-F]{2}"#, |lex| parse_radix(&lex.slice()[2..], 16))]
    Hex(u32),

    #[regex(r#"\\u[0-9a-fA-F]{4}"#, |lex| parse_radix(&lex.slice()[2..], 16))]
    #[regex(r#"\\U[0-9a-fA-F]{8}"#, |lex| parse_radix(&lex.slice()[2..], 16))]
    Unicode(u32),

    #[regex(r#"[^\\]+"#)]
    Literal,
}

fn parse_radix(digits: &str, radix: u32) -> Option<u32> {
    u32::from_str_radix(digits, radix).ok()
}

/// Whether a literal is decoded into text or into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    Text,
    Bytes,
}

/// The value of a decoded literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Text(String),
    Bytes(Vec<u8>),
}

impl Decoded {
    pub fn into_text(self) -> Option<String> {
        match self {
            Decoded::Text(text) => Some(text),
            Decoded::Bytes(_) => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Decoded::Text(_) => None,
            Decoded::Bytes(bytes) => Some(bytes),
        }
    }
}

/// Error decoding a literal. Every variant carries the offending text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed quotes in literal {0}")]
    MalformedQuotes(String),
    #[error("illegal escape sequence {0}")]
    IllegalEscape(String),
    #[error("unterminated escape sequence {0}")]
    UnterminatedEscape(String),
    #[error("wrong number of hexadecimal digits in escape sequence {0}")]
    InvalidDigits(String),
    #[error("escape sequence {0} is out of range")]
    OutOfRange(String),
    #[error("escape sequence {0} is not a valid code point")]
    InvalidCodePoint(String),
    #[error("unicode escape sequence {0} is not allowed in bytes literals")]
    UnicodeInBytes(String),
}

impl DecodeError {
    /// The part of the literal that could not be decoded.
    pub fn offending(&self) -> &str {
        match self {
            DecodeError::MalformedQuotes(text)
            | DecodeError::IllegalEscape(text)
            | DecodeError::UnterminatedEscape(text)
            | DecodeError::InvalidDigits(text)
            | DecodeError::OutOfRange(text)
            | DecodeError::InvalidCodePoint(text)
            | DecodeError::UnicodeInBytes(text) => text,
        }
    }
}

/// Shorthand for a result specialised to decode errors.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

/// Output of the decoder, either text or bytes.
trait Sink: Default {
    const MODE: DecodeMode;

    fn push_str(&mut self, str: &str);

    fn push_char(&mut self, c: char);

    /// Pushes a single unit with a value in `0..=255`.
    fn push_unit(&mut self, unit: u8);
}

impl Sink for String {
    const MODE: DecodeMode = DecodeMode::Text;

    fn push_str(&mut self, str: &str) {
        String::push_str(self, str);
    }

    fn push_char(&mut self, c: char) {
        self.push(c);
    }

    fn push_unit(&mut self, unit: u8) {
        self.push(char::from(unit));
    }
}

impl Sink for Vec<u8> {
    const MODE: DecodeMode = DecodeMode::Bytes;

    fn push_str(&mut self, str: &str) {
        self.extend_from_slice(str.as_bytes());
    }

    fn push_char(&mut self, c: char) {
        let mut encoded = [0; 4];
        self.extend_from_slice(c.encode_utf8(&mut encoded).as_bytes());
    }

    fn push_unit(&mut self, unit: u8) {
        self.push(unit);
    }
}

/// Delimiters of a quoted literal.
struct Delimiters {
    quote: char,
    triple: bool,
}

/// Splits a literal token into its delimiters and the body between them.
fn strip_quotes(token: &str) -> Result<(Delimiters, &str)> {
    let malformed = || DecodeError::MalformedQuotes(token.to_string());

    let quote = match token.chars().next() {
        Some(quote @ ('\'' | '"')) => quote,
        _ => return Err(malformed()),
    };

    let triple = if quote == '"' { "\"\"\"" } else { "'''" };
    if token.len() >= 6 && token.starts_with(triple) && token.ends_with(triple) {
        let body = &token[3..token.len() - 3];
        return Ok((Delimiters { quote, triple: true }, body));
    }

    if token.len() >= 2 && token.ends_with(quote) {
        let body = &token[1..token.len() - 1];
        return Ok((
            Delimiters {
                quote,
                triple: false,
            },
            body,
        ));
    }

    Err(malformed())
}

/// Builds the error for an escape sequence at the start of `rest` that the
/// lexer could not match.
fn escape_error(rest: &str) -> DecodeError {
    let mut chars = rest.chars();
    chars.next();

    match chars.next() {
        None => DecodeError::UnterminatedEscape(rest.to_string()),
        Some(kind @ ('x' | 'u' | 'U')) => {
            let digits: String = chars.take_while(char::is_ascii_hexdigit).take(8).collect();
            DecodeError::InvalidDigits(format!("\\{kind}{digits}"))
        }
        Some(c) => DecodeError::IllegalEscape(format!("\\{c}")),
    }
}

/// Decodes a quoted literal token, including its delimiters, into text or
/// bytes.
pub fn decode(token: &str, mode: DecodeMode) -> Result<Decoded> {
    match mode {
        DecodeMode::Text => decode_string(token).map(Decoded::Text),
        DecodeMode::Bytes => decode_bytes(token).map(Decoded::Bytes),
    }
}

/// Decodes a quoted string literal.
pub fn decode_string(token: &str) -> Result<String> {
    decode_into(token)
}

/// Decodes a quoted bytes literal, without its `b` prefix.
pub fn decode_bytes(token: &str) -> Result<Vec<u8>> {
    decode_into(token)
}

fn decode_into<S: Sink>(token: &str) -> Result<S> {
    trace!(token, mode = ?S::MODE, "decoding literal");

    scan(token).inspect_err(|err| debug!(token, %err, "failed to decode literal"))
}

fn scan<S: Sink>(token: &str) -> Result<S> {
    let (delimiters, body) = strip_quotes(token)?;
    let closing = if delimiters.triple {
        delimiters.quote.to_string().repeat(3)
    } else {
        delimiters.quote.to_string()
    };

    let mut lexer = EscapedToken::lexer(body);
    let mut output = S::default();

    while let Some(next) = lexer.next() {
        let slice = lexer.slice();
        let Ok(next) = next else {
            return Err(escape_error(&body[lexer.span().start..]));
        };

        match next {
            EscapedToken::Escaped(c) => output.push_char(c),
            EscapedToken::Octal(value) | EscapedToken::Hex(value) => {
                let unit = u8::try_from(value).map_err(|_| DecodeError::OutOfRange(slice.into()))?;
                output.push_unit(unit);
            }
            EscapedToken::Unicode(value) => {
                if S::MODE == DecodeMode::Bytes {
                    return Err(DecodeError::UnicodeInBytes(slice.into()));
                }
                let c = char::from_u32(value)
                    .ok_or_else(|| DecodeError::InvalidCodePoint(slice.into()))?;
                output.push_char(c);
            }
            EscapedToken::Literal => {
                // The closing delimiter can only appear escaped.
                if slice.contains(closing.as_str()) {
                    return Err(DecodeError::MalformedQuotes(slice.into()));
                }
                output.push_str(slice);
            }
        }
    }

    Ok(output)
}

/// Quotes a string as a double-quoted literal that decodes back to it.
pub fn quote_string(str: &str) -> String {
    let mut output = String::with_capacity(str.len() + 2);
    output.push('"');

    for c in str.chars() {
        match c {
            '\x07' => output.push_str(r#"\a"#),
            '\x08' => output.push_str(r#"\b"#),
            '\x0c' => output.push_str(r#"\f"#),
            '\n' => output.push_str(r#"\n"#),
            '\r' => output.push_str(r#"\r"#),
            '\t' => output.push_str(r#"\t"#),
            '\x0b' => output.push_str(r#"\v"#),
            '"' => output.push_str(r#"\""#),
            '\\' => output.push_str(r#"\\"#),
            c if c.is_ascii_control() => {
                let _ = write!(output, "\\x{:02x}", u32::from(c));
            }
            c if c.is_control() => {
                let _ = write!(output, "\\u{:04x}", u32::from(c));
            }
            c => output.push(c),
        }
    }

    output.push('"');
    output
}
