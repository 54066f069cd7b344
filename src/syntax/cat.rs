// Copyright (c) 2016-2021 Fabian Schuiki

//! The categorizing lexer. Tokenizes an input stream of characters, yielding a
//! stream of newline, whitespace, comment, symbol, text, and digits tokens.
//!
//! # Example
//! ```
//! use svfront_syntax::cat::{Cat, CatTokenKind};
//! let cat = Cat::new("wire [7:0] x;".to_string());
//! let kinds: Vec<CatTokenKind> = cat.map(|t| t.0).collect();
//! assert_eq!(kinds[0], CatTokenKind::Text);
//! ```

pub use self::CatTokenKind::*;

/// The categorizing lexer. Divides an input stream of characters (unicode) into
/// coarse groups of tokens. These include whitespace, comments, symbols, and
/// text. The strings contained in the emitted tokens can be concatenated to
/// arrive at the original file, i.e. no information is lost.
pub struct Cat {
    text: String,
    pos: usize,
}

impl Cat {
    /// Create a new categorizing lexer over a piece of text.
    pub fn new(text: String) -> Cat {
        Cat { text: text, pos: 0 }
    }

    /// The text this lexer operates on.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text covered by a range of byte offsets.
    pub fn slice(&self, begin: usize, end: usize) -> &str {
        self.text.get(begin..end).unwrap_or("")
    }

    /// Look at a character relative to the current position.
    fn peek_char(&self, offset: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(offset)
    }

    /// Advance to the next character in the input stream.
    fn bump(&mut self) {
        if let Some(c) = self.peek_char(0) {
            self.pos += c.len_utf8();
        }
    }

    /// Consume characters as long as they satisfy a predicate.
    fn bump_while<F: Fn(char) -> bool>(&mut self, pred: F) {
        while let Some(c) = self.peek_char(0) {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}

impl Iterator for Cat {
    type Item = CatToken;

    fn next(&mut self) -> Option<Self::Item> {
        let p0 = self.pos;
        let kind = match (self.peek_char(0), self.peek_char(1)) {
            (None, _) => return None,

            // Newlines
            (Some('\n'), _) => {
                self.bump();
                Newline
            }

            // Whitespace characters
            (Some(c), _) if is_whitespace(c) => {
                self.bump_while(is_whitespace);
                Whitespace
            }

            // IEEE 1800-2017 5.4 Comments
            // Consume single-line comments initiated by "//".
            (Some('/'), Some('/')) => {
                self.bump_while(|c| c != '\n');
                Comment
            }

            // Consume multi-line comments inititated by "/*".
            (Some('/'), Some('*')) => {
                self.bump();
                self.bump();
                loop {
                    match (self.peek_char(0), self.peek_char(1)) {
                        (Some('*'), Some('/')) => {
                            self.bump();
                            self.bump();
                            break;
                        }
                        (None, _) => break,
                        _ => self.bump(),
                    }
                }
                Comment
            }

            // Consume symbols.
            // IEEE 1800-2017 5.5 Operators & 11.3 Operators
            (Some(c), _) if is_symbol(c) => {
                self.bump();
                Symbol(c)
            }

            // Consume digits.
            (Some(c), _) if c.is_ascii_digit() => {
                self.bump_while(|c| c.is_ascii_digit());
                Digits
            }

            // Consume text.
            (Some(_), _) => {
                self.bump_while(|c| {
                    c != '\n' && !is_whitespace(c) && !is_symbol(c) && !c.is_ascii_digit()
                });
                Text
            }
        };
        Some(CatToken(kind, p0, self.pos))
    }
}

/// Check whether the given character is considered a whitespace in
/// SystemVerilog.
fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r' || c == (0xA0 as char) || c == '\x0c'
}

/// Check whether the given character is considered a symbol in SystemVerilog.
fn is_symbol(c: char) -> bool {
    match c {
        '(' | ')' | '[' | ']' | '{' | '}' | '#' | ':' | ';' | '.' | ',' | '=' | '+' | '-'
        | '*' | '/' | '~' | '|' | '<' | '>' | '!' | '%' | '^' | '&' | '?' | '\'' | '"'
        | '`' | '$' | '_' | '\\' | '@' => true,
        _ => false,
    }
}

/// A token emitted by the categorizing lexer, together with the byte offsets
/// of its first and one-past-last character.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CatToken(pub CatTokenKind, pub usize, pub usize);

/// The different kinds of tokens the categorizing lexer can emit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CatTokenKind {
    Newline,
    Whitespace,
    Comment,
    Symbol(char),
    Text,
    Digits,
    Eof,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<CatToken> {
        Cat::new(input.to_string()).collect()
    }

    #[test]
    fn empty() {
        assert_eq!(lex(""), vec![]);
    }

    #[test]
    fn non_empty() {
        assert_eq!(
            lex("Löwe 老虎 Léopard\n"),
            vec![
                CatToken(Text, 0, 5),
                CatToken(Whitespace, 5, 6),
                CatToken(Text, 6, 12),
                CatToken(Whitespace, 12, 13),
                CatToken(Text, 13, 21),
                CatToken(Newline, 21, 22),
            ]
        );
    }

    #[test]
    fn digits_split_text() {
        assert_eq!(
            lex("8'hff_0"),
            vec![
                CatToken(Digits, 0, 1),
                CatToken(Symbol('\''), 1, 2),
                CatToken(Text, 2, 5),
                CatToken(Symbol('_'), 5, 6),
                CatToken(Digits, 6, 7),
            ]
        );
    }

    #[test]
    fn comments() {
        assert_eq!(
            lex("a // one\n/* two\n */b"),
            vec![
                CatToken(Text, 0, 1),
                CatToken(Whitespace, 1, 2),
                CatToken(Comment, 2, 8),
                CatToken(Newline, 8, 9),
                CatToken(Comment, 9, 19),
                CatToken(Text, 19, 20),
            ]
        );
    }
}
