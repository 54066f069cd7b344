// Copyright (c) 2016-2021 Fabian Schuiki

//! The abstract syntax tree handed to the elaboration backend.
//!
//! Every node is an `AstNode`, tagged with an `AstKind`. A node owns its
//! children and attribute values outright, so cloning a node deep-copies the
//! whole subtree.

use std::collections::BTreeMap;
use svfront_common::{
    source::{Location, Span, INVALID_SPAN},
    util::HasDesc,
};

macro_rules! declare_kinds {(
    $( ($konst: ident, $string: expr, $desc: expr) )*
) => {
    /// The closed set of node kinds.
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
    pub enum AstKind {
        $($konst,)*
    }

    impl AstKind {
        /// The name of this kind as it appears in AST dumps.
        pub fn as_str(self) -> &'static str {
            match self {
                $(AstKind::$konst => $string,)*
            }
        }

        /// A human-readable description of this kind.
        pub fn desc(self) -> &'static str {
            match self {
                $(AstKind::$konst => $desc,)*
            }
        }
    }
}}

declare_kinds! {
    (None,               "AST_NONE",               "empty node")
    (Design,             "AST_DESIGN",             "design")
    (Module,             "AST_MODULE",             "module")
    (Package,            "AST_PACKAGE",            "package")
    (Interface,          "AST_INTERFACE",          "interface")
    (Modport,            "AST_MODPORT",            "modport")
    (ModportMember,      "AST_MODPORTMEMBER",      "modport member")
    (InterfacePort,      "AST_INTERFACEPORT",      "interface port")
    (InterfacePortType,  "AST_INTERFACEPORTTYPE",  "interface port type")
    (Task,               "AST_TASK",               "task")
    (Function,           "AST_FUNCTION",           "function")
    (Wire,               "AST_WIRE",               "wire")
    (Memory,             "AST_MEMORY",             "memory")
    (Genvar,             "AST_GENVAR",             "genvar")
    (Parameter,          "AST_PARAMETER",          "parameter")
    (Localparam,         "AST_LOCALPARAM",         "localparam")
    (Defparam,           "AST_DEFPARAM",           "defparam")
    (Paraset,            "AST_PARASET",            "parameter override")
    (Argument,           "AST_ARGUMENT",           "port connection")
    (Typedef,            "AST_TYPEDEF",            "typedef")
    (WireType,           "AST_WIRETYPE",           "type reference")
    (Enum,               "AST_ENUM",               "enum")
    (EnumItem,           "AST_ENUM_ITEM",          "enum item")
    (Struct,             "AST_STRUCT",             "struct")
    (Union,              "AST_UNION",              "union")
    (StructItem,         "AST_STRUCT_ITEM",        "struct member")
    (Range,              "AST_RANGE",              "range")
    (MultiRange,         "AST_MULTIRANGE",         "multi-dimensional range")
    (Constant,           "AST_CONSTANT",           "constant")
    (RealValue,          "AST_REALVALUE",          "real constant")
    (Identifier,         "AST_IDENTIFIER",         "identifier")
    (FCall,              "AST_FCALL",              "function call")
    (TCall,              "AST_TCALL",              "task call")
    (ToSigned,           "AST_TO_SIGNED",          "signed conversion")
    (ToUnsigned,         "AST_TO_UNSIGNED",        "unsigned conversion")
    (CastSize,           "AST_CAST_SIZE",          "size cast")
    (SelfSz,             "AST_SELFSZ",             "self-determined expression")
    (Concat,             "AST_CONCAT",             "concatenation")
    (Replicate,          "AST_REPLICATE",          "replication")
    (BitNot,             "AST_BIT_NOT",            "bitwise not")
    (BitAnd,             "AST_BIT_AND",            "bitwise and")
    (BitOr,              "AST_BIT_OR",             "bitwise or")
    (BitXor,             "AST_BIT_XOR",            "bitwise xor")
    (BitXnor,            "AST_BIT_XNOR",           "bitwise xnor")
    (ReduceAnd,          "AST_REDUCE_AND",         "and reduction")
    (ReduceOr,           "AST_REDUCE_OR",          "or reduction")
    (ReduceXor,          "AST_REDUCE_XOR",         "xor reduction")
    (ReduceXnor,         "AST_REDUCE_XNOR",        "xnor reduction")
    (ReduceBool,         "AST_REDUCE_BOOL",        "boolean reduction")
    (ShiftLeft,          "AST_SHIFT_LEFT",         "left shift")
    (ShiftRight,         "AST_SHIFT_RIGHT",        "right shift")
    (ShiftSLeft,         "AST_SHIFT_SLEFT",        "arithmetic left shift")
    (ShiftSRight,        "AST_SHIFT_SRIGHT",       "arithmetic right shift")
    (Lt,                 "AST_LT",                 "less-than comparison")
    (Le,                 "AST_LE",                 "less-or-equal comparison")
    (Eq,                 "AST_EQ",                 "equality comparison")
    (Ne,                 "AST_NE",                 "inequality comparison")
    (EqX,                "AST_EQX",                "case equality comparison")
    (NeX,                "AST_NEX",                "case inequality comparison")
    (Ge,                 "AST_GE",                 "greater-or-equal comparison")
    (Gt,                 "AST_GT",                 "greater-than comparison")
    (Add,                "AST_ADD",                "addition")
    (Sub,                "AST_SUB",                "subtraction")
    (Mul,                "AST_MUL",                "multiplication")
    (Div,                "AST_DIV",                "division")
    (Mod,                "AST_MOD",                "modulo")
    (Pow,                "AST_POW",                "power")
    (Pos,                "AST_POS",                "unary plus")
    (Neg,                "AST_NEG",                "negation")
    (LogicAnd,           "AST_LOGIC_AND",          "logic and")
    (LogicOr,            "AST_LOGIC_OR",           "logic or")
    (LogicNot,           "AST_LOGIC_NOT",          "logic not")
    (Ternary,            "AST_TERNARY",            "conditional expression")
    (Assign,             "AST_ASSIGN",             "continuous assignment")
    (Cell,               "AST_CELL",               "instance")
    (CellType,           "AST_CELLTYPE",           "instance type")
    (CellArray,          "AST_CELLARRAY",          "instance array")
    (Primitive,          "AST_PRIMITIVE",          "gate primitive")
    (Always,             "AST_ALWAYS",             "always block")
    (Initial,            "AST_INITIAL",            "initial block")
    (Block,              "AST_BLOCK",              "block")
    (AssignEq,           "AST_ASSIGN_EQ",          "blocking assignment")
    (AssignLe,           "AST_ASSIGN_LE",          "non-blocking assignment")
    (Case,               "AST_CASE",               "case statement")
    (Cond,               "AST_COND",               "case item")
    (CondX,              "AST_CONDX",              "casex item")
    (CondZ,              "AST_CONDZ",              "casez item")
    (Default,            "AST_DEFAULT",            "default case")
    (For,                "AST_FOR",                "for loop")
    (While,              "AST_WHILE",              "while loop")
    (Repeat,             "AST_REPEAT",             "repeat loop")
    (GenFor,             "AST_GENFOR",             "generate for loop")
    (GenIf,              "AST_GENIF",              "generate if")
    (GenCase,            "AST_GENCASE",            "generate case")
    (GenBlock,           "AST_GENBLOCK",           "generate block")
    (Posedge,            "AST_POSEDGE",            "posedge event")
    (Negedge,            "AST_NEGEDGE",            "negedge event")
    (Edge,               "AST_EDGE",               "event")
    (Assert,             "AST_ASSERT",             "assertion")
    (Assume,             "AST_ASSUME",             "assumption")
    (Live,               "AST_LIVE",               "liveness assertion")
    (Fair,               "AST_FAIR",               "fairness assumption")
    (Cover,              "AST_COVER",              "cover statement")
}

bitflags::bitflags! {
    /// Boolean properties of a node.
    #[derive(Default)]
    pub struct NodeFlags: u32 {
        const INPUT       = 1 << 0;
        const OUTPUT      = 1 << 1;
        const REG         = 1 << 2;
        const LOGIC       = 1 << 3;
        const SIGNED      = 1 << 4;
        const STRING      = 1 << 5;
        const CUSTOM_TYPE = 1 << 6;
        const ENUM        = 1 << 7;
        const WOR         = 1 << 8;
        const WAND        = 1 << 9;
        const UNSIZED     = 1 << 10;
    }
}

/// A single bit of a constant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Bit {
    S0,
    S1,
    /// Undefined.
    Sx,
    /// High impedance.
    Sz,
    /// Don't care, as found in `casez` and `casex` items.
    Sa,
}

impl Bit {
    pub fn as_char(self) -> char {
        match self {
            Bit::S0 => '0',
            Bit::S1 => '1',
            Bit::Sx => 'x',
            Bit::Sz => 'z',
            Bit::Sa => '-',
        }
    }
}

/// A syntax tree node.
#[derive(Clone, Debug, PartialEq)]
pub struct AstNode {
    pub kind: AstKind,
    /// The name of declarations, instances, and referenced identifiers. For
    /// string constants this holds the string itself.
    pub name: String,
    pub children: Vec<AstNode>,
    pub attributes: BTreeMap<String, AstNode>,
    pub span: Span,
    pub flags: NodeFlags,
    /// Position of a module or subroutine port, counting from 1. Zero for
    /// everything else.
    pub port_id: u32,
    /// The bits of a constant, least significant bit first.
    pub bits: Vec<Bit>,
    /// The value of a constant, truncated to 64 bits.
    pub integer: u64,
    pub real: f64,
    /// A range implied by the type of a declaration, such as `[31:0]` for
    /// `integer`. Converted into a range child once the declaration is
    /// complete.
    pub range: Option<(i32, i32)>,
}

impl AstNode {
    /// Create a new node without children.
    pub fn new(kind: AstKind, span: Span) -> AstNode {
        AstNode {
            kind,
            name: String::new(),
            children: Vec::new(),
            attributes: BTreeMap::new(),
            span,
            flags: NodeFlags::empty(),
            port_id: 0,
            bits: Vec::new(),
            integer: 0,
            real: 0.0,
            range: None,
        }
    }

    /// Create a new node with the given children.
    pub fn with_children(kind: AstKind, children: Vec<AstNode>, span: Span) -> AstNode {
        let mut node = AstNode::new(kind, span);
        node.children = children;
        node
    }

    /// Create a new named node.
    pub fn named<S: Into<String>>(kind: AstKind, name: S, span: Span) -> AstNode {
        let mut node = AstNode::new(kind, span);
        node.name = name.into();
        node
    }

    /// Replace the name of a node.
    pub fn renamed<S: Into<String>>(mut self, name: S) -> AstNode {
        self.name = name.into();
        self
    }

    /// Create an identifier referring to `name`.
    pub fn ident<S: Into<String>>(name: S, span: Span) -> AstNode {
        AstNode::named(AstKind::Identifier, name, span)
    }

    /// Create a unary node.
    pub fn unary(kind: AstKind, arg: AstNode, span: Span) -> AstNode {
        AstNode::with_children(kind, vec![arg], span)
    }

    /// Create a binary node.
    pub fn binary(kind: AstKind, lhs: AstNode, rhs: AstNode, span: Span) -> AstNode {
        AstNode::with_children(kind, vec![lhs, rhs], span)
    }

    /// Create an integer constant of `width` bits. Bits beyond the 64 bits of
    /// `value` are filled with its sign.
    pub fn mkconst_int(value: i64, signed: bool, width: usize, span: Span) -> AstNode {
        let bits = (0..width)
            .map(|i| {
                let bit = if i < 64 { (value >> i) & 1 } else { (value >> 63) & 1 };
                if bit != 0 {
                    Bit::S1
                } else {
                    Bit::S0
                }
            })
            .collect();
        let mut node = AstNode::mkconst_bits(bits, signed, span);
        node.integer = value as u64;
        node
    }

    /// Create a constant from a vector of bits, least significant bit first.
    pub fn mkconst_bits(bits: Vec<Bit>, signed: bool, span: Span) -> AstNode {
        let mut node = AstNode::new(AstKind::Constant, span);
        node.integer = bits
            .iter()
            .take(64)
            .enumerate()
            .filter(|(_, b)| **b == Bit::S1)
            .fold(0, |acc, (i, _)| acc | (1 << i));
        node.range = Some((bits.len() as i32 - 1, 0));
        node.bits = bits;
        node.flags.set(NodeFlags::SIGNED, signed);
        node
    }

    /// Create a string constant. Each character occupies eight bits, with the
    /// last character in the least significant position.
    pub fn mkconst_str<S: Into<String>>(value: S, span: Span) -> AstNode {
        let value = value.into();
        let mut bits = Vec::with_capacity(value.len() * 8);
        for byte in value.bytes().rev() {
            for i in 0..8 {
                bits.push(if byte & (1 << i) != 0 { Bit::S1 } else { Bit::S0 });
            }
        }
        if bits.is_empty() {
            bits.resize(8, Bit::S0);
        }
        let mut node = AstNode::mkconst_bits(bits, false, span);
        node.name = value;
        node.flags |= NodeFlags::STRING;
        node
    }

    /// Create a real-valued constant.
    pub fn mkconst_real(value: f64, span: Span) -> AstNode {
        let mut node = AstNode::new(AstKind::RealValue, span);
        node.real = value;
        node
    }

    /// Create a `[left:right]` range with constant bounds.
    pub fn make_range(left: i32, right: i32, signed: bool, span: Span) -> AstNode {
        let mut node = AstNode::with_children(
            AstKind::Range,
            vec![
                AstNode::mkconst_int(left as i64, true, 32, span),
                AstNode::mkconst_int(right as i64, true, 32, span),
            ],
            span,
        );
        node.flags.set(NodeFlags::SIGNED, signed);
        node
    }

    pub fn is(&self, flag: NodeFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_input(&self) -> bool {
        self.is(NodeFlags::INPUT)
    }

    pub fn is_output(&self) -> bool {
        self.is(NodeFlags::OUTPUT)
    }

    pub fn is_reg(&self) -> bool {
        self.is(NodeFlags::REG)
    }

    pub fn is_logic(&self) -> bool {
        self.is(NodeFlags::LOGIC)
    }

    pub fn is_signed(&self) -> bool {
        self.is(NodeFlags::SIGNED)
    }

    pub fn is_custom_type(&self) -> bool {
        self.is(NodeFlags::CUSTOM_TYPE)
    }

    /// Set or replace an attribute.
    pub fn set_attribute<S: Into<String>>(&mut self, key: S, value: AstNode) {
        self.attributes.insert(key.into(), value);
    }

    /// Mark the node with a `key = 1` attribute.
    pub fn set_bool_attribute<S: Into<String>>(&mut self, key: S) {
        let span = self.span;
        self.set_attribute(key, AstNode::mkconst_int(1, false, 32, span));
    }

    /// Check whether an attribute is present and holds a non-zero constant.
    pub fn get_bool_attribute(&self, key: &str) -> bool {
        match self.attributes.get(key) {
            Some(a) if a.kind == AstKind::Constant => a.bits.iter().any(|b| *b == Bit::S1),
            _ => false,
        }
    }

    /// Merge a set of attributes into this node, replacing existing ones.
    pub fn append_attributes(&mut self, attrs: BTreeMap<String, AstNode>) {
        self.attributes.extend(attrs);
    }

    /// The first child of the given kind.
    pub fn find_child(&self, kind: AstKind) -> Option<&AstNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// The first direct child declaring `name`.
    pub fn find_named(&self, name: &str) -> Option<&AstNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Visit this node and all its descendants in pre-order.
    pub fn walk<F: FnMut(&AstNode)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Visit this node and all its descendants in pre-order, with the option
    /// to modify them.
    pub fn walk_mut<F: FnMut(&mut AstNode)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// The human-readable first and last line and column covered by this node,
    /// as `(first_line, first_column, last_line, last_column)`.
    pub fn location(&self) -> (usize, usize, usize, usize) {
        if !self.span.is_valid() {
            return (0, 0, 0, 0);
        }
        let (l0, c0, _) = self.span.begin().human();
        let (l1, c1, _) = Location::new(self.span.source, self.span.end).human();
        (l0, c0, l1, c1)
    }
}

impl Default for AstNode {
    fn default() -> AstNode {
        AstNode::new(AstKind::None, INVALID_SPAN)
    }
}

impl HasDesc for AstKind {
    fn desc(&self) -> &'static str {
        AstKind::desc(*self)
    }
}

impl HasDesc for AstNode {
    fn desc(&self) -> &'static str {
        self.kind.desc()
    }

    fn desc_full(&self) -> String {
        if self.name.is_empty() {
            self.kind.desc().into()
        } else {
            format!("{} `{}`", self.kind.desc(), self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_constants() {
        let c = AstNode::mkconst_int(5, false, 4, INVALID_SPAN);
        assert_eq!(c.bits, vec![Bit::S1, Bit::S0, Bit::S1, Bit::S0]);
        assert_eq!(c.integer, 5);
        assert_eq!(c.range, Some((3, 0)));
        assert!(!c.is_signed());

        let m = AstNode::mkconst_int(-1, true, 1, INVALID_SPAN);
        assert_eq!(m.bits, vec![Bit::S1]);
        assert!(m.is_signed());
    }

    #[test]
    fn string_constants() {
        let c = AstNode::mkconst_str("AB", INVALID_SPAN);
        assert_eq!(c.bits.len(), 16);
        assert_eq!(c.integer, 0x4142);
        assert!(c.is(NodeFlags::STRING));
        assert_eq!(c.name, "AB");
    }

    #[test]
    fn clone_is_deep() {
        let mut a = AstNode::named(AstKind::Wire, "a", INVALID_SPAN);
        a.children.push(AstNode::make_range(3, 0, false, INVALID_SPAN));
        a.set_bool_attribute("keep");
        let mut b = a.clone();
        assert_eq!(a, b);
        b.children[0].children[0] = AstNode::mkconst_int(7, true, 32, INVALID_SPAN);
        b.attributes.clear();
        assert_ne!(a, b);
        assert_eq!(a.children[0].children[0].integer, 3);
        assert!(a.get_bool_attribute("keep"));
    }

    #[test]
    fn kinds_describe_themselves() {
        assert_eq!(AstKind::Module.as_str(), "AST_MODULE");
        let m = AstNode::named(AstKind::Module, "top", INVALID_SPAN);
        assert_eq!(m.desc_full(), "module `top`");
    }
}
