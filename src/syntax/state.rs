// Copyright (c) 2016-2021 Fabian Schuiki

//! The mutable state of a single parse.

use crate::ast::{AstKind, AstNode};
use crate::const2ast::CaseType;
use crate::scope::TypeScopes;
use std::collections::BTreeMap;
use svfront_common::source::Span;

pub type Attributes = BTreeMap<String, AstNode>;

/// Everything the grammar actions of one parse share. A fresh instance is
/// created for every call to `parse`.
#[derive(Debug, Default)]
pub struct ParserState {
    /// The containers currently open, outermost first. The bottom entry is
    /// the design root.
    pub ast_stack: Vec<AstNode>,
    /// The user-defined types in scope.
    pub types: TypeScopes,
    /// Attributes added to every attribute list, as set by `{* ... *}`.
    pub default_attrs: Attributes,
    /// The ordinal handed out to the most recent module port.
    pub port_counter: u32,
    /// Ports named in a module header without details, with their ordinal.
    pub port_stubs: BTreeMap<String, (u32, Span)>,
    /// Set by `...` in a port list; body declarations then add ports.
    pub do_not_require_port_stubs: bool,
    /// Whether a function or task body is being parsed.
    pub in_function_or_task: bool,
    /// The ordinal handed out to the next function or task port.
    pub function_port_id: u32,
    /// The kind of the case statements being parsed, innermost last.
    pub case_types: Vec<CaseType>,
    /// The package being parsed, if any.
    pub current_package: Option<String>,
    /// How many statements and expressions are currently being parsed
    /// within one another.
    pub nesting: usize,
    autoidx: usize,
    enum_count: usize,
}

impl ParserState {
    pub fn new() -> ParserState {
        Default::default()
    }

    /// The innermost open container.
    pub fn top_mut(&mut self) -> Option<&mut AstNode> {
        self.ast_stack.last_mut()
    }

    /// The kind of the innermost open container.
    pub fn top_kind(&self) -> AstKind {
        self.ast_stack.last().map(|n| n.kind).unwrap_or(AstKind::None)
    }

    /// Append a node to the innermost open container.
    pub fn push_child(&mut self, node: AstNode) {
        if let Some(top) = self.ast_stack.last_mut() {
            top.children.push(node);
        }
    }

    /// The module, interface, or package currently being parsed.
    pub fn current_module_mut(&mut self) -> Option<&mut AstNode> {
        self.ast_stack.get_mut(1)
    }

    /// Reset the per-module port bookkeeping.
    pub fn reset_ports(&mut self) {
        self.port_counter = 0;
        self.port_stubs.clear();
        self.do_not_require_port_stubs = false;
    }

    /// The case type to use for literals at the current position.
    pub fn case_type(&self) -> CaseType {
        self.case_types.last().copied().unwrap_or(CaseType::Normal)
    }

    /// Hand out a new index for a synthesized name.
    pub fn next_autoidx(&mut self) -> usize {
        self.autoidx += 1;
        self.autoidx
    }

    /// Hand out the name of a new anonymous enum.
    pub fn next_enum_name(&mut self) -> String {
        let name = format!("$enum{}", self.enum_count);
        self.enum_count += 1;
        name
    }
}
