// Copyright (c) 2016-2021 Fabian Schuiki

//! A Verilog and SystemVerilog front end.
//!
//! Source files are lexed and parsed into the syntax tree consumed by a
//! Yosys-style elaboration backend. The heavy lifting happens in the
//! `svfront-syntax` crate; this crate ties it together with the common
//! infrastructure and provides the command line driver.

// Re-export everything from the common crate.
pub extern crate svfront_common as common;
pub use crate::common::*;

pub extern crate svfront_syntax as syntax;
pub use crate::syntax::{parse_source, AstKind, AstNode, ParseOptions};
