// Copyright (c) 2016-2021 Fabian Schuiki

//! A textual rendering of syntax trees, for debugging.

use crate::ast::{AstNode, NodeFlags};
use std::fmt::Write;

const FLAG_NAMES: &[(NodeFlags, &str)] = &[
    (NodeFlags::INPUT, "input"),
    (NodeFlags::OUTPUT, "output"),
    (NodeFlags::REG, "reg"),
    (NodeFlags::LOGIC, "logic"),
    (NodeFlags::SIGNED, "signed"),
    (NodeFlags::STRING, "string"),
    (NodeFlags::CUSTOM_TYPE, "custom_type"),
    (NodeFlags::ENUM, "enum"),
    (NodeFlags::WOR, "wor"),
    (NodeFlags::WAND, "wand"),
    (NodeFlags::UNSIZED, "unsized"),
];

/// Render a tree, one node per line with children indented below their
/// parent.
pub fn dump_ast(node: &AstNode) -> String {
    let mut out = String::new();
    dump_node(&mut out, node, 0);
    out
}

fn dump_node(out: &mut String, node: &AstNode, indent: usize) {
    let pad = "  ".repeat(indent);
    out.push_str(&pad);
    out.push_str(node.kind.as_str());
    if node.span.is_valid() {
        let (l0, c0, l1, c1) = node.location();
        let _ = write!(out, " <{}.{}-{}.{}>", l0, c0, l1, c1);
    }
    if !node.name.is_empty() {
        let _ = write!(out, " str='{}'", node.name);
    }
    for &(flag, name) in FLAG_NAMES {
        if node.flags.contains(flag) {
            out.push(' ');
            out.push_str(name);
        }
    }
    if node.port_id > 0 {
        let _ = write!(out, " port={}", node.port_id);
    }
    if !node.bits.is_empty() {
        let bits: String = node.bits.iter().rev().map(|b| b.as_char()).collect();
        let _ = write!(out, " bits='{}'({})", bits, node.bits.len());
        let _ = write!(out, " int={}", node.integer);
    } else if let Some((l, r)) = node.range {
        let _ = write!(out, " range=[{}:{}]", l, r);
    }
    if node.real != 0.0 {
        let _ = write!(out, " real={}", node.real);
    }
    out.push('\n');

    for (key, value) in &node.attributes {
        let _ = writeln!(out, "{}  ATTR {}:", pad, key);
        dump_node(out, value, indent + 2);
    }
    for child in &node.children {
        dump_node(out, child, indent + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstKind;
    use svfront_common::source::INVALID_SPAN;

    #[test]
    fn renders_tree() {
        let mut wire = AstNode::named(AstKind::Wire, "a", INVALID_SPAN);
        wire.flags |= NodeFlags::INPUT;
        wire.port_id = 1;
        wire.set_bool_attribute("keep");
        wire.children.push(AstNode::mkconst_int(5, false, 3, INVALID_SPAN));
        let text = dump_ast(&wire);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "AST_WIRE str='a' input port=1");
        assert_eq!(lines[1], "  ATTR keep:");
        assert!(lines[2].starts_with("    AST_CONSTANT bits='000"));
        assert_eq!(lines[3], "  AST_CONSTANT bits='101'(3) int=5");
    }
}
