// Copyright (c) 2016-2021 Fabian Schuiki

//! A lexical analyzer for Verilog and SystemVerilog files, based on IEEE
//! 1800-2017, section 5. The input is expected to be preprocessed already.

use crate::cat::{Cat, CatToken, CatTokenKind};
pub use crate::token::*;
use crate::ParseOptions;
use std::collections::VecDeque;
use svfront_common::errors::*;
use svfront_common::name::*;
use svfront_common::source::*;

type CatTokenAndSpan = (CatTokenKind, Span);
pub type TokenAndSpan = (Token, Span);

/// Compiler directives that may survive preprocessing and carry no meaning
/// for the syntax tree. They are skipped up to the end of the line.
const IGNORED_DIRECTIVES: &[&str] = &[
    "timescale",
    "celldefine",
    "endcelldefine",
    "resetall",
    "default_nettype",
    "nounconnected_drive",
    "unconnected_drive",
    "line",
];

/// A lexical analyzer for Verilog and SystemVerilog files.
pub struct Lexer {
    input: Cat,
    source: Source,
    peek: [CatTokenAndSpan; 4],
    pending: VecDeque<TokenAndSpan>,
    primed: bool,
    sv: bool,
    formal: bool,
    translate_off: bool,
}

impl Lexer {
    pub fn new(source: Source, opts: &ParseOptions) -> Lexer {
        let text = source.get_content().text().to_string();
        Lexer {
            input: Cat::new(text),
            source: source,
            peek: [(CatTokenKind::Eof, INVALID_SPAN); 4],
            pending: VecDeque::new(),
            primed: false,
            sv: opts.sv,
            formal: opts.formal,
            translate_off: false,
        }
    }

    /// The source file this lexer operates on.
    pub fn source(&self) -> Source {
        self.source
    }

    fn bump(&mut self) {
        self.peek[0] = self.peek[1];
        self.peek[1] = self.peek[2];
        self.peek[2] = self.peek[3];
        self.peek[3] = match self.input.next() {
            Some(CatToken(kind, begin, end)) => (kind, Span::new(self.source, begin, end)),
            None => {
                let end = self.input.text().len();
                (CatTokenKind::Eof, Span::new(self.source, end, end))
            }
        };
    }

    /// The text covered by a categorized token.
    fn text(&self, sp: Span) -> String {
        self.input.slice(sp.begin, sp.end).to_string()
    }

    pub fn next_token(&mut self) -> DiagResult2<TokenAndSpan> {
        // Upon the first invocation the peek buffer is still empty. In that
        // case we need to load the first batch of tokens.
        if !self.primed {
            self.bump();
            self.bump();
            self.bump();
            self.bump();
            self.primed = true;
        }

        if let Some(tkn) = self.pending.pop_front() {
            return Ok(tkn);
        }

        let name_table = get_name_table();

        self.skip_noise()?;
        if let Some(tkn) = self.pending.pop_front() {
            return Ok(tkn);
        }

        // `@(*)` is an event list wildcard rather than an attribute.
        if let (
            CatTokenKind::Symbol('('),
            CatTokenKind::Symbol('*'),
            CatTokenKind::Symbol(')'),
        ) = (self.peek[0].0, self.peek[1].0, self.peek[2].0)
        {
            let sp = self.peek[0].1;
            self.pending.push_back((Operator(Op::Mul), self.peek[1].1));
            self.pending.push_back((CloseDelim(Paren), self.peek[2].1));
            self.bump();
            self.bump();
            self.bump();
            return Ok((OpenDelim(Paren), sp));
        }

        // Match 4-character symbols
        if let (
            CatTokenKind::Symbol(c0),
            CatTokenKind::Symbol(c1),
            CatTokenKind::Symbol(c2),
            CatTokenKind::Symbol(c3),
        ) = (
            self.peek[0].0,
            self.peek[1].0,
            self.peek[2].0,
            self.peek[3].0,
        ) {
            let sym = match (c0, c1, c2, c3) {
                // Assignment
                ('<', '<', '<', '=') => Some(Operator(Op::AssignArithShL)),
                ('>', '>', '>', '=') => Some(Operator(Op::AssignArithShR)),
                _ => None,
            };
            if let Some(tkn) = sym {
                let sp = Span::union(self.peek[0].1, self.peek[3].1);
                self.bump();
                self.bump();
                self.bump();
                self.bump();
                return Ok((tkn, sp));
            }
        }

        // Match 3-character symbols
        if let (CatTokenKind::Symbol(c0), CatTokenKind::Symbol(c1), CatTokenKind::Symbol(c2)) =
            (self.peek[0].0, self.peek[1].0, self.peek[2].0)
        {
            let sym = match (c0, c1, c2) {
                // Assignment
                ('<', '<', '=') => Some(Operator(Op::AssignLogicShL)),
                ('>', '>', '=') => Some(Operator(Op::AssignLogicShR)),

                // Equality
                ('=', '=', '=') => Some(Operator(Op::CaseEq)),
                ('!', '=', '=') => Some(Operator(Op::CaseNeq)),
                ('=', '=', '?') => Some(Operator(Op::WildcardEq)),
                ('!', '=', '?') => Some(Operator(Op::WildcardNeq)),

                // Logic
                ('<', '-', '>') => Some(Operator(Op::LogicEquiv)),

                // Shift
                ('<', '<', '<') => Some(Operator(Op::ArithShL)),
                ('>', '>', '>') => Some(Operator(Op::ArithShR)),

                // Specify paths
                ('+', '=', '>') => Some(PathConn {
                    full: false,
                    polarity: Some('+'),
                }),
                ('-', '=', '>') => Some(PathConn {
                    full: false,
                    polarity: Some('-'),
                }),
                ('+', '*', '>') => Some(PathConn {
                    full: true,
                    polarity: Some('+'),
                }),
                ('-', '*', '>') => Some(PathConn {
                    full: true,
                    polarity: Some('-'),
                }),
                ('&', '&', '&') => Some(TripleAnd),

                // Others
                ('.', '.', '.') => Some(Ellipsis),
                _ => None,
            };
            if let Some(tkn) = sym {
                let sp = Span::union(self.peek[0].1, self.peek[2].1);
                self.bump();
                self.bump();
                self.bump();
                return Ok((tkn, sp));
            }
        }

        // Match 2-character symbols
        if let (CatTokenKind::Symbol(c0), CatTokenKind::Symbol(c1)) =
            (self.peek[0].0, self.peek[1].0)
        {
            let sym = match (c0, c1) {
                // Assignment
                ('+', '=') => Some(Operator(Op::AssignAdd)),
                ('-', '=') => Some(Operator(Op::AssignSub)),
                ('*', '=') => Some(Operator(Op::AssignMul)),
                ('/', '=') => Some(Operator(Op::AssignDiv)),
                ('%', '=') => Some(Operator(Op::AssignMod)),
                ('&', '=') => Some(Operator(Op::AssignBitAnd)),
                ('|', '=') => Some(Operator(Op::AssignBitOr)),
                ('^', '=') => Some(Operator(Op::AssignBitXor)),

                // Arithmetic
                ('+', '+') => Some(Operator(Op::Inc)),
                ('-', '-') => Some(Operator(Op::Dec)),
                ('*', '*') => Some(Operator(Op::Pow)),

                // Relational
                ('<', '=') => Some(Operator(Op::Leq)),
                ('>', '=') => Some(Operator(Op::Geq)),

                // Logic
                ('=', '=') => Some(Operator(Op::LogicEq)),
                ('!', '=') => Some(Operator(Op::LogicNeq)),
                ('-', '>') => Some(Operator(Op::LogicImpl)),
                ('|', '|') => Some(Operator(Op::LogicOr)),
                ('&', '&') => Some(Operator(Op::LogicAnd)),

                // Bitwise
                ('~', '&') => Some(Operator(Op::BitNand)),
                ('~', '|') => Some(Operator(Op::BitNor)),
                ('~', '^') => Some(Operator(Op::BitNxor)),
                ('^', '~') => Some(Operator(Op::BitXnor)),

                // Shift
                ('<', '<') => Some(Operator(Op::LogicShL)),
                ('>', '>') => Some(Operator(Op::LogicShR)),

                // Attributes
                ('(', '*') => Some(AttrBegin),
                ('*', ')') => Some(AttrEnd),
                ('{', '*') => Some(DefattrBegin),
                ('*', '}') => Some(DefattrEnd),

                // Specify paths
                ('=', '>') => Some(PathConn {
                    full: false,
                    polarity: None,
                }),
                ('*', '>') => Some(PathConn {
                    full: true,
                    polarity: None,
                }),

                // Others
                (':', ':') => Some(Namespace),
                ('+', ':') => Some(AddColon),
                ('-', ':') => Some(SubColon),
                ('.', '*') => Some(WildcardConn),
                _ => None,
            };
            if let Some(tkn) = sym {
                let sp = Span::union(self.peek[0].1, self.peek[1].1);
                self.bump();
                self.bump();
                return Ok((tkn, sp));
            }
        }

        // Match 1-character symbols.
        if let CatTokenKind::Symbol(c0) = self.peek[0].0 {
            let sym = match c0 {
                // Assignment
                '=' => Some(Operator(Op::Assign)),

                // Arithmetic
                '+' => Some(Operator(Op::Add)),
                '-' => Some(Operator(Op::Sub)),
                '*' => Some(Operator(Op::Mul)),
                '/' => Some(Operator(Op::Div)),
                '%' => Some(Operator(Op::Mod)),

                // Relational
                '<' => Some(Operator(Op::Lt)),
                '>' => Some(Operator(Op::Gt)),

                // Logic
                '!' => Some(Operator(Op::LogicNot)),

                // Bitwise
                '~' => Some(Operator(Op::BitNot)),
                '&' => Some(Operator(Op::BitAnd)),
                '|' => Some(Operator(Op::BitOr)),
                '^' => Some(Operator(Op::BitXor)),

                // Others
                '(' => Some(OpenDelim(Paren)),
                ')' => Some(CloseDelim(Paren)),
                '[' => Some(OpenDelim(Brack)),
                ']' => Some(CloseDelim(Brack)),
                '{' => Some(OpenDelim(Brace)),
                '}' => Some(CloseDelim(Brace)),
                '#' => Some(Hashtag),
                ',' => Some(Comma),
                '.' => Some(Period),
                ':' => Some(Colon),
                ';' => Some(Semicolon),
                '?' => Some(Ternary),
                '@' => Some(At),
                _ => None,
            };
            if let Some(tkn) = sym {
                let sp = self.peek[0].1;
                self.bump();
                return Ok((tkn, sp));
            }
        }

        match self.peek[0] {
            // A text token either represents an identifier or a keyword. In
            // addition to that, underscores '_' also introduce an identifier.
            // Keywords of a language revision that is not enabled are treated
            // as identifiers.
            // IEEE 1800-2017 5.6 Identifiers
            // IEEE 1800-2017 5.6.2 Keywords
            (CatTokenKind::Text, _) | (CatTokenKind::Symbol('_'), _) => {
                let (m, msp) = self.match_ident()?;
                return match find_keyword(&m) {
                    Some(kw) if self.keyword_enabled(kw) => match kw {
                        Kw::Begin => Ok((OpenDelim(Bgend), msp)),
                        Kw::End => Ok((CloseDelim(Bgend), msp)),
                        kw => Ok((Keyword(kw), msp)),
                    },
                    _ => Ok((Ident(name_table.intern(&m)), msp)),
                };
            }

            // System tasks and system functions start with the dollar sign
            // '$', after which all regular identifier characters are
            // allowed.
            // IEEE 1800-2017 5.6.3 System tasks and system functions
            (CatTokenKind::Symbol('$'), sp) => {
                self.bump();
                return match self.peek[0].0 {
                    CatTokenKind::Text
                    | CatTokenKind::Digits
                    | CatTokenKind::Symbol('_')
                    | CatTokenKind::Symbol('$') => {
                        let (m, msp) = self.match_ident()?;
                        Ok((SysIdent(name_table.intern(&m)), Span::union(sp, msp)))
                    }
                    _ => Ok((Dollar, sp)),
                };
            }

            // Escaped identifiers are introduced with a backslash and last
            // until the next whitespace or newline character.
            // IEEE 1800-2017 5.6.1 Escaped identifiers
            (CatTokenKind::Symbol('\\'), mut sp) => {
                let mut s = String::new();
                loop {
                    self.bump();
                    match self.peek[0].0 {
                        CatTokenKind::Whitespace | CatTokenKind::Newline | CatTokenKind::Eof => {
                            break
                        }
                        _ => (),
                    }
                    sp.expand(self.peek[0].1);
                    s.push_str(&self.text(self.peek[0].1));
                }
                if s.is_empty() {
                    return Err(DiagBuilder2::fatal(
                        "Expected escaped identifier after backslash '\\'",
                    )
                    .span(sp));
                }
                return Ok((EscIdent(name_table.intern(&s)), sp));
            }

            // Numbers are either introduced by a set of digits in the case
            // of a sized literal or unsigned number, or an apostrophe in
            // the case of an unsized based number.
            // IEEE 1800-2017 5.7 Numbers
            (CatTokenKind::Symbol('\''), sp) => {
                self.bump(); // eat the apostrophe
                return self.match_based_number(sp);
            }
            (CatTokenKind::Digits, mut sp) => {
                let mut s = self.text(sp);
                let mut real = false;
                self.bump(); // eat the digits that were pushed onto the string above
                self.eat_number_body_into(&mut s, &mut sp, false);

                // Optional fractional part.
                if self.peek[0].0 == CatTokenKind::Symbol('.')
                    && self.peek[1].0 == CatTokenKind::Digits
                {
                    self.bump(); // eat the period
                    s.push('.');
                    self.eat_number_body_into(&mut s, &mut sp, false);
                    real = true;
                }

                // Optional exponent.
                if self.peek[0].0 == CatTokenKind::Text {
                    let t = self.text(self.peek[0].1);
                    let signed_exp = match self.peek[1].0 {
                        CatTokenKind::Symbol('+') | CatTokenKind::Symbol('-') => {
                            self.peek[2].0 == CatTokenKind::Digits
                        }
                        _ => false,
                    };
                    if (t == "e" || t == "E")
                        && (self.peek[1].0 == CatTokenKind::Digits || signed_exp)
                    {
                        s.push('e');
                        sp.expand(self.peek[0].1);
                        self.bump();
                        if let CatTokenKind::Symbol(c) = self.peek[0].0 {
                            s.push(c);
                            sp.expand(self.peek[0].1);
                            self.bump();
                        }
                        self.eat_number_body_into(&mut s, &mut sp, false);
                        real = true;
                    }
                }

                if let Some(unit) = self.try_time_unit() {
                    sp.expand(self.peek[0].1);
                    self.bump(); // eat the unit
                    return Ok((Literal(Time(name_table.intern(&s), unit)), sp));
                }
                if self.peek[0].0 == CatTokenKind::Text {
                    return Err(DiagBuilder2::fatal(format!(
                        "number literal `{}` may not directly be followed by letters `{}`",
                        self.text(sp),
                        self.text(self.peek[0].1),
                    ))
                    .span(sp));
                }
                let value = name_table.intern(&s);
                if real {
                    return Ok((Literal(Real(value)), sp));
                }
                return Ok((Literal(Number(value)), sp));
            }

            // IEEE 1800-2017 5.9 String literals
            (CatTokenKind::Symbol('"'), mut span) => {
                self.bump();
                let mut s = String::new();
                loop {
                    match self.peek[0] {
                        (CatTokenKind::Symbol('"'), sp) => {
                            span.expand(sp);
                            self.bump();
                            break;
                        }
                        (CatTokenKind::Symbol('\\'), sp) => {
                            span.expand(sp);
                            self.bump();
                            let (kind, sp) = self.peek[0];
                            span.expand(sp);
                            match kind {
                                CatTokenKind::Newline => (),
                                CatTokenKind::Symbol(c) => s.push(c),
                                CatTokenKind::Text => {
                                    let t = self.text(sp);
                                    let mut chars = t.chars();
                                    match chars.next() {
                                        Some('n') => s.push('\n'),
                                        Some('t') => s.push('\t'),
                                        Some('a') => s.push('\x07'),
                                        Some('f') => s.push('\x0c'),
                                        Some('v') => s.push('\x0b'),
                                        Some(c) => s.push(c),
                                        None => (),
                                    }
                                    s.push_str(chars.as_str());
                                }
                                CatTokenKind::Digits => {
                                    // Up to three octal digits form a character code.
                                    let t = self.text(sp);
                                    let n = t
                                        .chars()
                                        .take(3)
                                        .take_while(|c| c.is_digit(8))
                                        .count();
                                    let code = u32::from_str_radix(&t[..n.max(1)], 8).unwrap_or(0);
                                    s.push(std::char::from_u32(code).unwrap_or('\0'));
                                    s.push_str(&t[n.max(1)..]);
                                }
                                _ => {
                                    return Err(DiagBuilder2::fatal(
                                        "Unknown escape sequence in string",
                                    )
                                    .span(span))
                                }
                            }
                        }
                        (CatTokenKind::Newline, sp) => {
                            return Err(DiagBuilder2::fatal(
                                "String literals cannot contain unescaped newlines",
                            )
                            .span(sp))
                        }
                        (CatTokenKind::Eof, _) => {
                            return Err(
                                DiagBuilder2::fatal("Unterminated string literal").span(span)
                            )
                        }
                        (_, sp) => {
                            span.expand(sp);
                            s.push_str(&self.text(sp));
                        }
                    }
                    self.bump();
                }
                return Ok((Literal(Str(name_table.intern(&s))), span));
            }

            (CatTokenKind::Eof, sp) => return Ok((Eof, sp)),
            (tkn, sp) => {
                return Err(DiagBuilder2::fatal(format!("Unknown token {:?}", tkn)).span(sp))
            }
        }
    }

    /// Check whether a keyword is available in the current language mode.
    fn keyword_enabled(&self, kw: Kw) -> bool {
        match kw.dialect() {
            Dialect::Verilog => true,
            Dialect::SystemVerilog => self.sv,
            Dialect::Formal => self.sv || self.formal,
        }
    }

    /// Skips all input tokens that are excluded from the language's syntax,
    /// i.e. whitespace, newlines, comments, leftover compiler directives, and
    /// everything between `translate_off` and `translate_on` pragmas. Comments
    /// carrying case pragmas queue up the corresponding tokens.
    fn skip_noise(&mut self) -> DiagResult2<()> {
        loop {
            match self.peek[0] {
                (CatTokenKind::Whitespace, _) | (CatTokenKind::Newline, _) => self.bump(),
                (CatTokenKind::Comment, sp) => {
                    self.check_pragma_comment(sp);
                    self.bump();
                }
                (CatTokenKind::Eof, _) => return Ok(()),
                _ if self.translate_off => self.bump(),
                (CatTokenKind::Symbol('`'), sp) => {
                    let name = match self.peek[1] {
                        (CatTokenKind::Text, _) | (CatTokenKind::Symbol('_'), _) => {
                            self.bump();
                            self.match_ident()?.0
                        }
                        _ => {
                            return Err(
                                DiagBuilder2::fatal("Expected compiler directive after '`'")
                                    .span(sp),
                            )
                        }
                    };
                    if !IGNORED_DIRECTIVES.contains(&name.as_str()) {
                        return Err(DiagBuilder2::fatal(format!(
                            "Unsupported compiler directive `{}`; the input must be preprocessed",
                            name
                        ))
                        .span(sp));
                    }
                    trace!("skipping compiler directive `{}", name);
                    while self.peek[0].0 != CatTokenKind::Newline
                        && self.peek[0].0 != CatTokenKind::Eof
                    {
                        self.bump();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Look for `synopsys` and `synthesis` pragmas in a comment.
    fn check_pragma_comment(&mut self, sp: Span) {
        let text = self.text(sp);
        let body = if text.starts_with("//") {
            &text[2..]
        } else {
            let t = &text[2..];
            t.strip_suffix("*/").unwrap_or(t)
        };
        let mut words = body.split_whitespace();
        match words.next() {
            Some("synopsys") | Some("synthesis") => (),
            _ => return,
        }
        for word in words {
            match word {
                "translate_off" => self.translate_off = true,
                "translate_on" => self.translate_off = false,
                _ if self.translate_off => (),
                "full_case" => self.pending.push_back((Pragma(CasePragma::FullCase), sp)),
                "parallel_case" => self
                    .pending
                    .push_back((Pragma(CasePragma::ParallelCase), sp)),
                _ => (),
            }
        }
    }

    /// Matches an identifier. This consumes all tokens from the input that when
    /// combined still make up a valid identifier and returns the consumed
    /// characters as a String, alongside the span they covered. In
    /// SystemVerilog upper- and lowercase characters, digits, underscores '_',
    /// and dollar signs '$' are all valid within an identifier.
    fn match_ident(&mut self) -> DiagResult2<(String, Span)> {
        let mut s = String::new();
        let mut sp = self.peek[0].1;
        loop {
            match self.peek[0] {
                (CatTokenKind::Text, this_sp)
                | (CatTokenKind::Digits, this_sp)
                | (CatTokenKind::Symbol('_'), this_sp)
                | (CatTokenKind::Symbol('$'), this_sp) => {
                    s.push_str(&self.text(this_sp));
                    sp.expand(this_sp);
                    self.bump();
                }
                _ => break,
            }
        }
        if s.is_empty() {
            return Err(DiagBuilder2::fatal("Could not match an identifier here").span(sp));
        }
        Ok((s, sp))
    }

    /// This function assumes that we have just consumed the apostrophe `'`
    /// before the base indication. Emits the base as one token and queues the
    /// digits as a second one.
    fn match_based_number(&mut self, mut span: Span) -> DiagResult2<TokenAndSpan> {
        let name_table = get_name_table();
        match self.peek[0] {
            (CatTokenKind::Text, sp) => {
                self.bump();
                let text = self.text(sp);
                span.expand(sp);
                let mut chars = text.chars();
                let mut c = chars.next();

                // Consume the optional sign indicator or emit an unbased and
                // unsized literal if the apostrophe is immediately followed by
                // [zZxX].
                let signed = match c {
                    Some('s') | Some('S') => {
                        c = chars.next();
                        true
                    }
                    Some('z') | Some('Z') if text.len() == 1 => {
                        return Ok((Literal(UnbasedUnsized('z')), span))
                    }
                    Some('x') | Some('X') if text.len() == 1 => {
                        return Ok((Literal(UnbasedUnsized('x')), span))
                    }
                    _ => false,
                };

                // Consume the base of the number.
                let base = match c {
                    Some('d') | Some('D') => 'd',
                    Some('b') | Some('B') => 'b',
                    Some('o') | Some('O') => 'o',
                    Some('h') | Some('H') => 'h',
                    Some(x) => {
                        return Err(DiagBuilder2::fatal(format!(
                            "`{}` is not a valid number base",
                            x
                        ))
                        .span(span))
                    }
                    None => return Err(DiagBuilder2::fatal("Missing number base").span(span)),
                };
                let base_text = format!("'{}{}", if signed { "s" } else { "" }, base);

                // If no more characters remain, a whitespace and subsequent
                // digits may follow. Otherwise, the remaining characters are to
                // be treated as part of the number body and no whitespace
                // follows.
                let mut body = String::new();
                let rest = chars.as_str();
                let mut body_span;
                if rest.is_empty() {
                    self.skip_noise()?;
                    body_span = self.peek[0].1;
                    body_span.end = body_span.begin;
                } else {
                    body.push_str(rest);
                    body_span = Span::new(self.source, sp.end - rest.len(), sp.end);
                }
                self.eat_number_body_into(&mut body, &mut body_span, true);
                if body.is_empty() {
                    return Err(DiagBuilder2::fatal(format!(
                        "Missing digits after number base `{}`",
                        base_text
                    ))
                    .span(span));
                }

                self.pending.push_back((
                    Literal(BasedDigits(name_table.intern(&body))),
                    body_span,
                ));
                return Ok((Literal(BaseSpec(name_table.intern(&base_text))), span));
            }

            (CatTokenKind::Digits, sp) => {
                self.bump();
                let value = self.text(sp);
                span.expand(sp);
                match value.as_str() {
                    "0" => return Ok((Literal(UnbasedUnsized('0')), span)),
                    "1" => return Ok((Literal(UnbasedUnsized('1')), span)),
                    _ => {
                        return Err(DiagBuilder2::fatal(
                            "Unbased unsized literal may only be '0, '1, 'x, or 'z",
                        )
                        .span(span))
                    }
                }
            }

            (CatTokenKind::Symbol('?'), sp) => {
                self.bump();
                span.expand(sp);
                return Ok((Literal(UnbasedUnsized('z')), span));
            }

            _ => return Ok((Apostrophe, span)),
        }
    }

    /// Eats all text, digits, and underscore tokens, accumulating them (except
    /// for the underscores) in a String.
    fn eat_number_body_into(&mut self, into: &mut String, span: &mut Span, allow_alphabetic: bool) {
        loop {
            match self.peek[0] {
                (CatTokenKind::Digits, sp) | (CatTokenKind::Text, sp) => {
                    if self.peek[0].0 == CatTokenKind::Text && !allow_alphabetic {
                        break;
                    }
                    into.push_str(&self.text(sp));
                    span.expand(sp);
                }
                (CatTokenKind::Symbol('_'), sp) => {
                    span.expand(sp);
                }
                (CatTokenKind::Symbol('?'), sp) if allow_alphabetic => {
                    into.push('?');
                    span.expand(sp);
                }
                _ => break,
            }
            self.bump();
        }
    }

    /// Try to parse the next text token as a time unit.
    fn try_time_unit(&mut self) -> Option<TimeUnit> {
        if self.peek[0].0 == CatTokenKind::Text {
            TimeUnit::from_str(self.input.slice(self.peek[0].1.begin, self.peek[0].1.end))
        } else {
            None
        }
    }
}

impl Iterator for Lexer {
    type Item = DiagResult2<TokenAndSpan>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok((Eof, _)) => None,
            x => Some(x),
        }
    }
}
