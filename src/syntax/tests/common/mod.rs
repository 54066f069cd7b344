// Copyright (c) 2016-2021 Fabian Schuiki

#![allow(dead_code)]

use svfront_common::errors::{DiagStore, Severity};
use svfront_common::source::get_source_manager;
use svfront_syntax::parse_source;

pub(crate) use svfront_syntax::ast::{AstKind, AstNode};
pub(crate) use svfront_syntax::ParseOptions;

/// Parse `input` with the given options, returning the result together with
/// all diagnostics that were reported.
pub(crate) fn parse_with(input: &str, opts: &ParseOptions) -> (Result<AstNode, ()>, DiagStore) {
    use std::cell::Cell;
    thread_local!(static INDEX: Cell<usize> = Cell::new(0));
    let sm = get_source_manager();
    let idx = INDEX.with(|i| {
        let v = i.get();
        i.set(v + 1);
        v
    });
    let source = sm.add(&format!("test_{}.sv", idx), input).unwrap();
    let diag = DiagStore::new();
    let result = parse_source(source, opts, &diag);
    (result, diag)
}

/// Parse a SystemVerilog input that is expected to be accepted.
pub(crate) fn parse_sv(input: &str) -> AstNode {
    parse_ok(input, &ParseOptions::system_verilog())
}

/// Parse a Verilog input that is expected to be accepted.
pub(crate) fn parse_v(input: &str) -> AstNode {
    parse_ok(input, &ParseOptions::verilog())
}

pub(crate) fn parse_ok(input: &str, opts: &ParseOptions) -> AstNode {
    let (result, diag) = parse_with(input, opts);
    match result {
        Ok(root) => root,
        Err(()) => panic!("unexpected parse failure: {:?}", diag.messages()),
    }
}

/// Parse an input that is expected to be rejected, and return the messages
/// of the reported diagnostics.
pub(crate) fn parse_err(input: &str, opts: &ParseOptions) -> Vec<String> {
    let (result, diag) = parse_with(input, opts);
    assert!(result.is_err(), "input unexpectedly accepted: {}", input);
    assert!(diag.has(Severity::Error));
    diag.messages()
}

/// Run `f` on a thread with a large stack. Inputs that hit the nesting
/// limit recurse a few hundred levels first, and debug builds use large
/// stack frames.
pub(crate) fn with_large_stack<F: FnOnce() + Send + 'static>(f: F) {
    std::thread::Builder::new()
        .stack_size(64 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

/// Whether any of the messages contains `needle`.
pub(crate) fn mentions(messages: &[String], needle: &str) -> bool {
    messages.iter().any(|m| m.contains(needle))
}

/// The module called `name` in a design.
pub(crate) fn module<'a>(root: &'a AstNode, name: &str) -> &'a AstNode {
    root.children
        .iter()
        .find(|c| c.name == name && (c.kind == AstKind::Module || c.kind == AstKind::Interface))
        .unwrap_or_else(|| panic!("no module `{}`", name))
}

/// The first module of a design.
pub(crate) fn first_module(root: &AstNode) -> &AstNode {
    root.children.first().expect("empty design")
}

/// The kinds of the direct children of a node.
pub(crate) fn kinds(node: &AstNode) -> Vec<AstKind> {
    node.children.iter().map(|c| c.kind).collect()
}

/// All nodes of the given kind anywhere below `node`, in pre-order.
pub(crate) fn collect(node: &AstNode, kind: AstKind) -> Vec<AstNode> {
    let mut out = vec![];
    node.walk(&mut |n| {
        if n.kind == kind {
            out.push(n.clone());
        }
    });
    out
}

/// Compare two trees by kind, name, flags, and constant value, ignoring
/// their source locations.
pub(crate) fn same_shape(a: &AstNode, b: &AstNode) -> bool {
    a.kind == b.kind
        && a.name == b.name
        && a.flags == b.flags
        && a.bits == b.bits
        && a.port_id == b.port_id
        && a.children.len() == b.children.len()
        && a.children
            .iter()
            .zip(b.children.iter())
            .all(|(x, y)| same_shape(x, y))
}
