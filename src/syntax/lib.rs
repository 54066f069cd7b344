// Copyright (c) 2016-2021 Fabian Schuiki

//! This crate implements parsing Verilog and SystemVerilog source files into
//! the abstract syntax tree handed to a Yosys-style elaboration backend. The
//! tree is built in a single pass; the handful of desugarings the backend
//! relies on (generate-for declarations, increments, compound assignments)
//! are applied while the tree is constructed.

#[macro_use]
extern crate log;

pub mod ast;
pub mod builtin;
pub mod cat;
pub mod const2ast;
pub mod desugar;
pub mod dump;
pub mod lexer;
pub mod parser;
pub mod scope;
mod state;
pub mod token;

pub use crate::ast::{AstKind, AstNode};

use svfront_common::errors::DiagEmitter;
use svfront_common::source::Source;

/// The mode flags consulted throughout lexing and parsing.
///
/// These are read but never modified by a parse, and a fresh copy may be
/// handed to each invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accept SystemVerilog constructs.
    pub sv: bool,
    /// Accept the formal verification keywords even in Verilog mode.
    pub formal: bool,
    /// Library mode; suppresses the warning about `z` bits in constants.
    pub lib: bool,
    /// Build cells for specify blocks instead of discarding them.
    pub specify: bool,
    /// Discard `assert` statements.
    pub noassert: bool,
    /// Discard `assume` statements.
    pub noassume: bool,
    /// Discard `restrict` statements.
    pub norestrict: bool,
    /// Treat `assert` statements as `assume`.
    pub assert_assumes: bool,
    /// Treat `assume` statements as `assert`.
    pub assume_asserts: bool,
}

impl ParseOptions {
    /// Options for plain Verilog-2005 input.
    pub fn verilog() -> ParseOptions {
        Default::default()
    }

    /// Options for SystemVerilog input.
    pub fn system_verilog() -> ParseOptions {
        ParseOptions {
            sv: true,
            ..Default::default()
        }
    }
}

/// Lex and parse an entire source file, returning the design root.
///
/// All diagnostics are passed to `emitter`. Returns `Err(())` if any error
/// was reported.
pub fn parse_source(
    source: Source,
    opts: &ParseOptions,
    emitter: &dyn DiagEmitter,
) -> Result<AstNode, ()> {
    let lexer = lexer::Lexer::new(source, opts);
    parser::parse(lexer, opts, emitter)
}
