// Copyright (c) 2016-2021 Fabian Schuiki

//! Tracking of user-defined type names.
//!
//! Whether an identifier names a type decides how a declaration or statement
//! is parsed, so the parser keeps a stack of typedef frames mirroring the
//! lexical scopes it is in.

use crate::ast::AstNode;
use std::collections::HashMap;

/// A stack of typedef frames plus the package-qualified names seen so far.
#[derive(Debug, Default)]
pub struct TypeScopes {
    frames: Vec<HashMap<String, AstNode>>,
    pkg_types: HashMap<String, AstNode>,
}

impl TypeScopes {
    pub fn new() -> TypeScopes {
        Default::default()
    }

    /// Open a new innermost frame.
    pub fn enter(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Close the innermost frame, forgetting the types declared in it.
    pub fn exit(&mut self) {
        self.frames.pop();
    }

    /// The number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Declare a type in the innermost frame.
    ///
    /// If no frame is open, the type is declared in a new outermost one, as
    /// happens for typedefs at the top level of a file.
    pub fn declare<S: Into<String>>(&mut self, name: S, def: AstNode) {
        if self.frames.is_empty() {
            self.enter();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), def);
        }
    }

    /// Declare a type under its package-qualified name `pkg::name`.
    pub fn declare_in_package(&mut self, package: &str, name: &str, def: AstNode) {
        self.pkg_types.insert(format!("{}::{}", package, name), def);
    }

    /// Check whether `name` was declared in the innermost frame.
    pub fn is_in_local_scope(&self, name: &str) -> bool {
        self.frames
            .last()
            .map(|f| f.contains_key(name))
            .unwrap_or(false)
    }

    /// Find the definition of a type, searching from the innermost frame
    /// outwards. Package-qualified names are looked up directly.
    pub fn lookup(&self, name: &str) -> Option<&AstNode> {
        if name.contains("::") {
            return self.pkg_types.get(name);
        }
        self.frames.iter().rev().find_map(|f| f.get(name))
    }

    /// Check whether `name` refers to a type in the current scope.
    pub fn is_user_type(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstKind;
    use svfront_common::source::INVALID_SPAN;

    fn ty(name: &str) -> AstNode {
        AstNode::named(AstKind::Typedef, name, INVALID_SPAN)
    }

    #[test]
    fn nested_frames() {
        let mut s = TypeScopes::new();
        s.enter();
        s.declare("outer_t", ty("outer_t"));
        s.enter();
        assert!(s.is_user_type("outer_t"));
        assert!(!s.is_in_local_scope("outer_t"));
        s.declare("inner_t", ty("inner_t"));
        assert!(s.is_in_local_scope("inner_t"));
        s.exit();
        assert!(!s.is_user_type("inner_t"));
        assert!(s.is_user_type("outer_t"));
        s.exit();
        assert!(!s.is_user_type("outer_t"));
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn sibling_frames_are_isolated() {
        let mut s = TypeScopes::new();
        s.enter();
        s.enter();
        s.declare("a_t", ty("a_t"));
        s.exit();
        s.enter();
        assert!(!s.is_user_type("a_t"));
        s.exit();
    }

    #[test]
    fn shadowing() {
        let mut s = TypeScopes::new();
        s.enter();
        s.declare("t", ty("outer"));
        s.enter();
        s.declare("t", ty("inner"));
        assert_eq!(s.lookup("t").map(|n| n.name.as_str()), Some("inner"));
        s.exit();
        assert_eq!(s.lookup("t").map(|n| n.name.as_str()), Some("outer"));
    }

    #[test]
    fn package_types() {
        let mut s = TypeScopes::new();
        s.declare_in_package("pkg", "word_t", ty("word_t"));
        assert!(s.is_user_type("pkg::word_t"));
        assert!(!s.is_user_type("word_t"));
        assert!(!s.is_user_type("other::word_t"));
    }
}
