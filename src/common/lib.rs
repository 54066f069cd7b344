// Copyright (c) 2016-2021 Fabian Schuiki

//! This crate contains the fundamental utilities used by the rest of the
//! svfront Verilog front end: source files and spans, name interning, and
//! diagnostics.

pub mod errors;
pub mod name;
pub mod source;
pub mod util;
