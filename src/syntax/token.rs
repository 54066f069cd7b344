// Copyright (c) 2016-2021 Fabian Schuiki

//! Defines all tokens that may result from performing lexical analysis on a
//! Verilog or SystemVerilog source file.

pub use self::DelimToken::*;
pub use self::Lit::*;
pub use self::Token::*;
use std::fmt::{Display, Formatter, Result};
use svfront_common::name::Name;

/// A primary token as emitted by the lexer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Token {
    /// An operator.
    Operator(Op),
    /// An opening delimiter.
    OpenDelim(DelimToken),
    /// A closing delimiter.
    CloseDelim(DelimToken),
    /// A literal.
    Literal(Lit),
    /// A simple identifier.
    Ident(Name),
    /// An escaped identifier, without the leading backslash.
    EscIdent(Name),
    /// A system identifier such as `$display`, without the leading dollar.
    SysIdent(Name),
    /// A keyword.
    Keyword(Kw),

    Apostrophe,
    At,
    Colon,
    Comma,
    Dollar,
    Ellipsis,
    Hashtag,
    Namespace,
    Period,
    Semicolon,
    Ternary,
    AddColon,
    SubColon,
    /// The `.*` connecting all remaining ports of an instance by name.
    WildcardConn,

    /// The `(*` opening an attribute list.
    AttrBegin,
    /// The `*)` closing an attribute list.
    AttrEnd,
    /// The `{*` opening a default attribute list.
    DefattrBegin,
    /// The `*}` closing a default attribute list.
    DefattrEnd,
    /// A specify path connection: `=>` for parallel, `*>` for full
    /// connections, optionally preceded by a `+` or `-` polarity.
    PathConn {
        full: bool,
        polarity: Option<char>,
    },
    /// The `&&&` that introduces a specify path condition.
    TripleAnd,
    /// A synthesis pragma found in a comment.
    Pragma(CasePragma),

    /// The end of the input file.
    Eof,
}

impl Token {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator(op) => op.as_str(),
            OpenDelim(Paren) => "(",
            CloseDelim(Paren) => ")",
            OpenDelim(Brack) => "[",
            CloseDelim(Brack) => "]",
            OpenDelim(Brace) => "{",
            CloseDelim(Brace) => "}",
            OpenDelim(Bgend) => "begin",
            CloseDelim(Bgend) => "end",
            Literal(l) => l.as_str(),
            Ident(_) | EscIdent(_) => "identifier",
            SysIdent(_) => "system identifier",
            Keyword(kw) => kw.as_str(),

            Apostrophe => "'",
            At => "@",
            Colon => ":",
            Comma => ",",
            Dollar => "$",
            Ellipsis => "...",
            Hashtag => "#",
            Namespace => "::",
            Period => ".",
            Semicolon => ";",
            Ternary => "?",
            AddColon => "+:",
            SubColon => "-:",
            WildcardConn => ".*",

            AttrBegin => "(*",
            AttrEnd => "*)",
            DefattrBegin => "{*",
            DefattrEnd => "*}",
            PathConn { full: false, .. } => "=>",
            PathConn { full: true, .. } => "*>",
            TripleAnd => "&&&",
            Pragma(CasePragma::FullCase) => "full_case pragma",
            Pragma(CasePragma::ParallelCase) => "parallel_case pragma",

            Eof => "end of file",
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match *self {
            Ident(n) => write!(f, "{}", n),
            EscIdent(n) => write!(f, "\\{} ", n),
            SysIdent(n) => write!(f, "${}", n),
            Literal(l) => write!(f, "{}", l),
            PathConn {
                full,
                polarity: Some(c),
            } => write!(f, "{}{}", c, if full { "*>" } else { "=>" }),
            tkn => write!(f, "{}", tkn.as_str()),
        }
    }
}

/// A delimiter token such as parentheses or brackets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DelimToken {
    /// A round paranthesis `(` or `)`.
    Paren,
    /// A square bracket `[` or `]`.
    Brack,
    /// A curly brace `{` or `}`.
    Brace,
    /// A `begin` or `end`.
    Bgend,
}

/// Abstract literals such as strings or numbers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Lit {
    Str(Name),
    /// An unsigned decimal number without base, underscores removed.
    Number(Name),
    /// A real number, e.g. `1.5e-3`, underscores removed.
    Real(Name),
    /// A time literal, e.g. `10ns`.
    Time(Name, TimeUnit),
    /// The base part of a based number, e.g. `'sh`. Always lowercase.
    BaseSpec(Name),
    /// The digits following a base, e.g. `FF` or `1x0?`.
    BasedDigits(Name),
    /// One of `'0`, `'1`, `'x`, or `'z`.
    UnbasedUnsized(char),
}

impl Lit {
    pub fn as_str(self) -> &'static str {
        match self {
            Str(_) => "string literal",
            Number(_) | BasedDigits(_) => "number literal",
            Real(_) => "real literal",
            Time(..) => "time literal",
            BaseSpec(_) => "number base",
            UnbasedUnsized(_) => "unbased unsized literal",
        }
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match *self {
            Str(n) => write!(f, "\"{}\"", n),
            Number(n) | Real(n) | BaseSpec(n) | BasedDigits(n) => write!(f, "{}", n),
            Time(n, unit) => write!(f, "{}{}", n, unit.as_str()),
            UnbasedUnsized(c) => write!(f, "'{}", c),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TimeUnit {
    Second,
    MilliSecond,
    MicroSecond,
    NanoSecond,
    PicoSecond,
    FemtoSecond,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Second => "s",
            TimeUnit::MilliSecond => "ms",
            TimeUnit::MicroSecond => "us",
            TimeUnit::NanoSecond => "ns",
            TimeUnit::PicoSecond => "ps",
            TimeUnit::FemtoSecond => "fs",
        }
    }

    pub fn from_str(s: &str) -> Option<TimeUnit> {
        match s {
            "s" => Some(TimeUnit::Second),
            "ms" => Some(TimeUnit::MilliSecond),
            "us" => Some(TimeUnit::MicroSecond),
            "ns" => Some(TimeUnit::NanoSecond),
            "ps" => Some(TimeUnit::PicoSecond),
            "fs" => Some(TimeUnit::FemtoSecond),
            _ => None,
        }
    }
}

/// Synthesis pragmas recognized in `// synopsys ...` comments.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CasePragma {
    FullCase,
    ParallelCase,
}

/// An operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Op {
    // Assignment
    Assign,
    AssignAdd,
    AssignSub,
    AssignMul,
    AssignDiv,
    AssignMod,
    AssignBitAnd,
    AssignBitOr,
    AssignBitXor,
    AssignLogicShL,
    AssignLogicShR,
    AssignArithShL,
    AssignArithShR,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Inc,
    Dec,

    // Equality
    LogicEq,
    LogicNeq,
    CaseEq,
    CaseNeq,
    WildcardEq,
    WildcardNeq,

    // Relational
    Lt,
    Leq,
    Gt,
    Geq,

    // Logic
    LogicNot,
    LogicAnd,
    LogicOr,
    LogicImpl,
    LogicEquiv,

    // Bitwise
    BitNot,
    BitAnd,
    BitNand,
    BitOr,
    BitNor,
    BitXor,
    BitXnor,
    BitNxor,

    // Shift
    LogicShL,
    LogicShR,
    ArithShL,
    ArithShR,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Assign => "=",
            Op::AssignAdd => "+=",
            Op::AssignSub => "-=",
            Op::AssignMul => "*=",
            Op::AssignDiv => "/=",
            Op::AssignMod => "%=",
            Op::AssignBitAnd => "&=",
            Op::AssignBitOr => "|=",
            Op::AssignBitXor => "^=",
            Op::AssignLogicShL => "<<=",
            Op::AssignLogicShR => ">>=",
            Op::AssignArithShL => "<<<=",
            Op::AssignArithShR => ">>>=",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Mod => "%",
            Op::Pow => "**",
            Op::Inc => "++",
            Op::Dec => "--",
            Op::LogicEq => "==",
            Op::LogicNeq => "!=",
            Op::CaseEq => "===",
            Op::CaseNeq => "!==",
            Op::WildcardEq => "==?",
            Op::WildcardNeq => "!=?",
            Op::Lt => "<",
            Op::Leq => "<=",
            Op::Gt => ">",
            Op::Geq => ">=",
            Op::LogicNot => "!",
            Op::LogicAnd => "&&",
            Op::LogicOr => "||",
            Op::LogicImpl => "->",
            Op::LogicEquiv => "<->",
            Op::BitNot => "~",
            Op::BitAnd => "&",
            Op::BitNand => "~&",
            Op::BitOr => "|",
            Op::BitNor => "~|",
            Op::BitXor => "^",
            Op::BitXnor => "^~",
            Op::BitNxor => "~^",
            Op::LogicShL => "<<",
            Op::LogicShR => ">>",
            Op::ArithShL => "<<<",
            Op::ArithShR => ">>>",
        }
    }

    /// The binding strength of this operator when used as a binary operator,
    /// as per IEEE 1800-2017 table 11-2.
    pub fn get_precedence(self) -> Precedence {
        match self {
            Op::Assign
            | Op::AssignAdd
            | Op::AssignSub
            | Op::AssignMul
            | Op::AssignDiv
            | Op::AssignMod
            | Op::AssignBitAnd
            | Op::AssignBitOr
            | Op::AssignBitXor
            | Op::AssignLogicShL
            | Op::AssignLogicShR
            | Op::AssignArithShL
            | Op::AssignArithShR => Precedence::Assignment,
            Op::LogicImpl | Op::LogicEquiv => Precedence::Implication,
            Op::LogicOr => Precedence::LogicOr,
            Op::LogicAnd => Precedence::LogicAnd,
            Op::BitOr | Op::BitNor => Precedence::BitOr,
            Op::BitXor | Op::BitXnor | Op::BitNxor => Precedence::BitXor,
            Op::BitAnd | Op::BitNand => Precedence::BitAnd,
            Op::LogicEq
            | Op::LogicNeq
            | Op::CaseEq
            | Op::CaseNeq
            | Op::WildcardEq
            | Op::WildcardNeq => Precedence::Equality,
            Op::Lt | Op::Leq | Op::Gt | Op::Geq => Precedence::Relational,
            Op::LogicShL | Op::LogicShR | Op::ArithShL | Op::ArithShR => Precedence::Shift,
            Op::Add | Op::Sub => Precedence::Add,
            Op::Mul | Op::Div | Op::Mod => Precedence::Mul,
            Op::Pow => Precedence::Pow,
            Op::LogicNot | Op::BitNot | Op::Inc | Op::Dec => Precedence::Unary,
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator binding strength, from weakest to strongest.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Precedence {
    Min,
    Assignment,
    Implication,
    Ternary,
    LogicOr,
    LogicAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Shift,
    Add,
    Mul,
    Pow,
    Unary,
    Postfix,
    Scope,
    Max,
}

/// The language revision a keyword was introduced with. Keywords of a later
/// revision are lexed as plain identifiers if that revision is not enabled.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dialect {
    /// IEEE 1364-2005 Verilog.
    Verilog,
    /// IEEE 1800 SystemVerilog.
    SystemVerilog,
    /// SystemVerilog assertion keywords, also enabled by formal mode.
    Formal,
}

macro_rules! declare_keywords {(
    $( ($konst: ident, $string: expr, $dialect: ident) )*
) => {
    #[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Debug, Hash)]
    pub enum Kw {
        $($konst,)*
    }

    impl Kw {
        pub fn as_str(self) -> &'static str {
            match self {
                $(Kw::$konst => $string,)*
            }
        }

        pub fn dialect(self) -> Dialect {
            match self {
                $(Kw::$konst => Dialect::$dialect,)*
            }
        }
    }

    impl std::fmt::Display for Kw {
        fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "{}", self.as_str())
        }
    }

    pub fn find_keyword<S: AsRef<str>>(name: S) -> Option<Kw> {
        use std::collections::HashMap;
        use once_cell::sync::Lazy;
        static TBL: Lazy<HashMap<&'static str, Kw>> = Lazy::new(|| {
            let mut tbl = HashMap::new();
            $(tbl.insert($string, Kw::$konst);)*
            tbl
        });
        TBL.get(name.as_ref()).map(|kw| *kw)
    }
}}

declare_keywords! {
    // IEEE 1364-2005 keywords
    (Always,        "always",        Verilog)
    (And,           "and",           Verilog)
    (Assign,        "assign",        Verilog)
    (Automatic,     "automatic",     Verilog)
    (Begin,         "begin",         Verilog)
    (Buf,           "buf",           Verilog)
    (Bufif0,        "bufif0",        Verilog)
    (Bufif1,        "bufif1",        Verilog)
    (Case,          "case",          Verilog)
    (Casex,         "casex",         Verilog)
    (Casez,         "casez",         Verilog)
    (Default,       "default",       Verilog)
    (Defparam,      "defparam",      Verilog)
    (Edge,          "edge",          Verilog)
    (Else,          "else",          Verilog)
    (End,           "end",           Verilog)
    (Endcase,       "endcase",       Verilog)
    (Endfunction,   "endfunction",   Verilog)
    (Endgenerate,   "endgenerate",   Verilog)
    (Endmodule,     "endmodule",     Verilog)
    (Endspecify,    "endspecify",    Verilog)
    (Endtask,       "endtask",       Verilog)
    (For,           "for",           Verilog)
    (Function,      "function",      Verilog)
    (Generate,      "generate",      Verilog)
    (Genvar,        "genvar",        Verilog)
    (If,            "if",            Verilog)
    (Ifnone,        "ifnone",        Verilog)
    (Initial,       "initial",       Verilog)
    (Inout,         "inout",         Verilog)
    (Input,         "input",         Verilog)
    (Integer,       "integer",       Verilog)
    (Localparam,    "localparam",    Verilog)
    (Macromodule,   "macromodule",   Verilog)
    (Module,        "module",        Verilog)
    (Nand,          "nand",          Verilog)
    (Negedge,       "negedge",       Verilog)
    (Nor,           "nor",           Verilog)
    (Not,           "not",           Verilog)
    (Notif0,        "notif0",        Verilog)
    (Notif1,        "notif1",        Verilog)
    (Or,            "or",            Verilog)
    (Output,        "output",        Verilog)
    (Parameter,     "parameter",     Verilog)
    (Posedge,       "posedge",       Verilog)
    (Real,          "real",          Verilog)
    (Realtime,      "realtime",      Verilog)
    (Reg,           "reg",           Verilog)
    (Repeat,        "repeat",        Verilog)
    (Signed,        "signed",        Verilog)
    (Specify,       "specify",       Verilog)
    (Specparam,     "specparam",     Verilog)
    (Supply0,       "supply0",       Verilog)
    (Supply1,       "supply1",       Verilog)
    (Task,          "task",          Verilog)
    (Tri,           "tri",           Verilog)
    (Unsigned,      "unsigned",      Verilog)
    (Wand,          "wand",          Verilog)
    (While,         "while",         Verilog)
    (Wire,          "wire",          Verilog)
    (Wor,           "wor",           Verilog)
    (Xnor,          "xnor",          Verilog)
    (Xor,           "xor",           Verilog)

    // IEEE 1800-2017 keywords
    (AlwaysComb,    "always_comb",   SystemVerilog)
    (AlwaysFf,      "always_ff",     SystemVerilog)
    (AlwaysLatch,   "always_latch",  SystemVerilog)
    (Bit,           "bit",           SystemVerilog)
    (Byte,          "byte",          SystemVerilog)
    (Const,         "const",         SystemVerilog)
    (Endinterface,  "endinterface",  SystemVerilog)
    (Endpackage,    "endpackage",    SystemVerilog)
    (Enum,          "enum",          SystemVerilog)
    (Final,         "final",         SystemVerilog)
    (Int,           "int",           SystemVerilog)
    (Interface,     "interface",     SystemVerilog)
    (Logic,         "logic",         SystemVerilog)
    (Longint,       "longint",       SystemVerilog)
    (Modport,       "modport",       SystemVerilog)
    (Package,       "package",       SystemVerilog)
    (Packed,        "packed",        SystemVerilog)
    (Priority,      "priority",      SystemVerilog)
    (Shortint,      "shortint",      SystemVerilog)
    (Static,        "static",        SystemVerilog)
    (Struct,        "struct",        SystemVerilog)
    (Typedef,       "typedef",       SystemVerilog)
    (Union,         "union",         SystemVerilog)
    (Unique,        "unique",        SystemVerilog)
    (Unique0,       "unique0",       SystemVerilog)
    (Var,           "var",           SystemVerilog)
    (Void,          "void",          SystemVerilog)

    // Assertion keywords, also available in formal mode
    (Assert,        "assert",        Formal)
    (Assume,        "assume",        Formal)
    (Cover,         "cover",         Formal)
    (Eventually,    "eventually",    Formal)
    (Property,      "property",      Formal)
    (Restrict,      "restrict",      Formal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(find_keyword("module"), Some(Kw::Module));
        assert_eq!(find_keyword("always_ff"), Some(Kw::AlwaysFf));
        assert_eq!(find_keyword("Module"), None);
        assert_eq!(find_keyword("foo"), None);
        assert_eq!(Kw::Typedef.dialect(), Dialect::SystemVerilog);
        assert_eq!(Kw::Assert.dialect(), Dialect::Formal);
    }

    #[test]
    fn precedence_order() {
        assert!(Op::Mul.get_precedence() > Op::Add.get_precedence());
        assert!(Op::Add.get_precedence() > Op::LogicShL.get_precedence());
        assert!(Op::LogicShL.get_precedence() > Op::Lt.get_precedence());
        assert!(Op::Lt.get_precedence() > Op::LogicEq.get_precedence());
        assert!(Op::BitAnd.get_precedence() > Op::BitXor.get_precedence());
        assert!(Op::BitXor.get_precedence() > Op::BitOr.get_precedence());
        assert!(Op::LogicAnd.get_precedence() > Op::LogicOr.get_precedence());
        assert!(Op::Pow.get_precedence() > Op::Mul.get_precedence());
    }
}
