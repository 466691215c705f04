//! The lexer.
//!
//! Scanning follows the teacher's `lexeme` module in spirit — a `FieldTree` trie for
//! longest-match punctuation/keyword recognition (`lexeme::pattern`/`lexeme::builder`),
//! `regex::Regex` for the free-form token shapes (identifiers, numbers), `OnceCell` to
//! build each regex/trie exactly once. What differs from the teacher is that this
//! lexer's grammar is fixed rather than user-assembled, so the trie and regex set are
//! built once per [`Lexer::new`] call rather than wired together by a caller's grammar
//! description.
//!
//! Two numeric-lexing quirks are carried over faithfully from
//! `original_source/jqi/lexer.py` rather than "fixed" (see `SPEC_FULL.md`): an integer
//! pattern is tried before the float pattern (so `INT_RE` must itself refuse to match a
//! prefix of a float literal via lookahead, rather than the float pattern never being
//! reached), and a leading `-` is folded into a numeric literal whenever a digit
//! immediately follows it, with no lookback at the previous token — so `1-2` lexes as
//! `Number(1)` directly adjacent to `Number(-2)`, a parse error, rather than `1 - 2`.

use crate::error::LexError;
use crate::field_tree::FieldTree;
use crate::position::Span;
use crate::token::{Punct, Token, TokenKind};
use crate::value::Value;
use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;

static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+(?:[^.eE]|$)").unwrap());
static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?").unwrap());
static IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());
static FIELD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());

thread_local! {
    static PUNCT_TREE: OnceCell<FieldTree<Punct>> = OnceCell::new();
}

fn punctuation_tree() -> FieldTree<Punct> {
    let mut tree = FieldTree::new();
    for &p in Punct::ALL {
        let _ = tree.insert(p.lexeme().as_bytes(), p);
    }
    tree
}

/// Scans `source` into a flat token stream. `cursor`, when present, is a byte offset
/// into `source` at which a single [`TokenKind::Cursor`] marker token is spliced into
/// the stream — used by the completion engine to mark where candidate continuations
/// should be gathered (distilled-spec §6). The splice happens at most once per call,
/// tracked by `cursor_emitted` rather than any state surviving across calls.
pub struct Lexer<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    cursor: Option<usize>,
    cursor_emitted: bool,
    completion_mode: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str, cursor: Option<usize>) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            cursor,
            cursor_emitted: false,
            completion_mode: cursor.is_some(),
        }
    }

    fn rest(&self) -> &'s str {
        &self.source[self.pos..]
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_trivia(&mut self) {
        loop {
            while !self.at_eof() && (self.bytes[self.pos] as char).is_whitespace() {
                self.pos += 1;
            }
            if !self.at_eof() && self.bytes[self.pos] == b'#' {
                while !self.at_eof() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    /// Scan the whole source into tokens, ending with [`TokenKind::Eof`].
    pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
        crate::util::log::trace(crate::util::log::Level::Default, || {
            format!("lexing {} bytes (completion_mode={})", self.bytes.len(), self.completion_mode)
        });
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();

            if !self.cursor_emitted {
                if let Some(cursor) = self.cursor {
                    if self.pos >= cursor {
                        tokens.push(Token::new(TokenKind::Cursor, Span::point(self.pos)));
                        self.cursor_emitted = true;
                        crate::util::log::trace(crate::util::log::Level::Verbose, || {
                            format!("cursor token spliced at byte {}", self.pos)
                        });
                    }
                }
            }

            if self.at_eof() {
                tokens.push(Token::new(TokenKind::Eof, Span::point(self.pos)));
                break;
            }

            let start = self.pos;
            let token = self.scan_one()?;
            // A Field's span covers the name only, after the leading dot (distilled-spec
            // §3/§4.1) — every other token's span is the full text `scan_one` consumed.
            let span = match &token {
                TokenKind::Field(name) => Span::new(start + 1, start + 1 + name.len()),
                _ => Span::new(start, self.pos),
            };
            tokens.push(Token::new(token, span));
        }
        Ok(tokens)
    }

    fn scan_one(&mut self) -> Result<TokenKind, LexError> {
        let c = self.bytes[self.pos] as char;

        if c == '.' {
            if let Some(m) = FIELD_RE.find(&self.rest()[1..]) {
                self.pos += 1 + m.end();
                return Ok(TokenKind::Field(m.as_str().to_string()));
            }
        }

        if c == '@' {
            if let Some(m) = IDENT_RE.find(&self.rest()[1..]) {
                self.pos += 1 + m.end();
                return Ok(TokenKind::Format(m.as_str().to_string()));
            }
        }

        if c == '"' {
            return self.scan_string();
        }

        if c.is_ascii_digit() || (c == '-' && self.peek_digit_after_minus()) {
            return self.scan_number();
        }

        if let Some((punct, len)) = punctuation_tree_find(self.rest().as_bytes()) {
            if !punct.is_keyword() || !self.keyword_followed_by_ident_continuation(len) {
                self.pos += len;
                return Ok(TokenKind::Punct(punct));
            }
        }

        if let Some(m) = IDENT_RE.find(self.rest()) {
            self.pos += m.end();
            return Ok(TokenKind::Ident(m.as_str().to_string()));
        }

        Err(LexError::new(
            self.pos,
            format!("unrecognized character '{}'", c),
        ))
    }

    fn peek_digit_after_minus(&self) -> bool {
        self.bytes
            .get(self.pos + 1)
            .map(|b| b.is_ascii_digit())
            .unwrap_or(false)
    }

    /// A matched keyword like `and` must not actually be a prefix of a longer
    /// identifier (`andrew`) — re-check that the byte right after the match isn't
    /// itself an identifier continuation character.
    fn keyword_followed_by_ident_continuation(&self, matched_len: usize) -> bool {
        self.bytes
            .get(self.pos + matched_len)
            .map(|&b| (b as char).is_alphanumeric() || b == b'_')
            .unwrap_or(false)
    }

    fn scan_number(&mut self) -> Result<TokenKind, LexError> {
        let rest = self.rest();
        // Faithful quirk: try the integer shape first; it refuses to match a prefix of
        // a float literal via the trailing lookahead baked into `INT_RE`.
        if let Some(m) = INT_RE.find(rest) {
            let text = &rest[..int_digits_len(m.as_str())];
            self.pos += text.len();
            let value: i64 = text.parse().map_err(|_| {
                LexError::new(self.pos, format!("invalid integer literal '{}'", text))
            })?;
            return Ok(TokenKind::Number(Value::Int(value)));
        }
        if let Some(m) = FLOAT_RE.find(rest) {
            let text = m.as_str();
            self.pos += text.len();
            let value: f64 = text.parse().map_err(|_| {
                LexError::new(self.pos, format!("invalid number literal '{}'", text))
            })?;
            if text.contains('.') || text.contains('e') || text.contains('E') {
                return Ok(TokenKind::Number(Value::Float(value)));
            }
            return Ok(TokenKind::Number(Value::Int(value as i64)));
        }
        Err(LexError::new(self.pos, "malformed number literal"))
    }

    fn scan_string(&mut self) -> Result<TokenKind, LexError> {
        self.pos += 1; // opening quote
        let mut literal = String::new();
        loop {
            if self.at_eof() {
                if self.completion_mode {
                    return Ok(TokenKind::PartialStr(literal));
                }
                return Err(LexError::new(self.pos, "unterminated string literal"));
            }
            let c = self.bytes[self.pos] as char;
            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(TokenKind::Str(literal));
                }
                '\\' => {
                    self.pos += 1;
                    let escape = self.bytes.get(self.pos).copied().ok_or_else(|| {
                        LexError::new(self.pos, "unterminated escape sequence")
                    })?;
                    self.pos += 1;
                    literal.push(match escape as char {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '"' => '"',
                        '\\' => '\\',
                        '/' => '/',
                        'u' => {
                            let hex = self
                                .source
                                .get(self.pos..self.pos + 4)
                                .ok_or_else(|| LexError::new(self.pos, "invalid \\u escape"))?;
                            self.pos += 4;
                            let code = u32::from_str_radix(hex, 16)
                                .map_err(|_| LexError::new(self.pos, "invalid \\u escape"))?;
                            char::from_u32(code).unwrap_or('\u{FFFD}')
                        }
                        other => {
                            return Err(LexError::new(
                                self.pos,
                                format!("invalid escape '\\{}'", other),
                            ))
                        }
                    });
                }
                _ => {
                    literal.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }
}

/// Strip the `INT_RE` match down to just the run of ASCII digits (and leading `-`),
/// discarding whatever single lookahead byte the regex consumed to rule out a float
/// continuation.
fn int_digits_len(matched: &str) -> usize {
    let mut len = 0;
    let mut chars = matched.chars().peekable();
    if chars.peek() == Some(&'-') {
        len += 1;
        chars.next();
    }
    for c in chars {
        if c.is_ascii_digit() {
            len += c.len_utf8();
        } else {
            break;
        }
    }
    len
}

fn punctuation_tree_find(bytes: &[u8]) -> Option<(Punct, usize)> {
    PUNCT_TREE.with(|cell| cell.get_or_init(punctuation_tree).find(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source, None)
            .lex()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_field_and_pipe() {
        let ks = kinds(".foo | .bar");
        assert_eq!(
            ks,
            vec![
                TokenKind::Field("foo".into()),
                TokenKind::Punct(Punct::Pipe),
                TokenKind::Field("bar".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn leading_minus_quirk_folds_into_number() {
        let ks = kinds("1-2");
        assert_eq!(
            ks,
            vec![
                TokenKind::Number(Value::Int(1)),
                TokenKind::Number(Value::Int(-2)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_not_matched_inside_longer_identifier() {
        let ks = kinds("andrew");
        assert_eq!(ks, vec![TokenKind::Ident("andrew".into()), TokenKind::Eof]);
    }

    #[test]
    fn cursor_marker_spliced_at_offset() {
        let ks: Vec<TokenKind> = Lexer::new(".foo", Some(1))
            .lex()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(ks[0], TokenKind::Punct(Punct::Dot));
        assert_eq!(ks[1], TokenKind::Cursor);
    }

    #[test]
    fn unterminated_string_in_completion_mode_yields_partial() {
        let tokens = Lexer::new("\"abc", Some(4)).lex().unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::PartialStr(_)) || matches!(tokens[1].kind, TokenKind::PartialStr(_)));
    }
}
