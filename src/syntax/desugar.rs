// Copyright (c) 2016-2021 Fabian Schuiki

//! Rewrites applied while the tree is being built.
//!
//! The elaboration backend expects a handful of constructs in a more
//! primitive form than they are written in. Each rewrite is a plain function
//! over owned nodes, invoked by the parser at the point where the construct
//! has been fully recognized.

use crate::ast::{AstKind, AstNode};
use svfront_common::source::Span;

/// Attributes that leave the value of a wire to the formal solver.
const FORMAL_WIRE_ATTRS: &[&str] = &["anyconst", "anyseq", "allconst", "allseq"];

/// Rewrite a generate for loop that declares its genvar inline.
///
/// The loop is expected to have the children `[genvar, init, cond, step,
/// body]`. The genvar is renamed to `$genfordecl$<idx>$<name>`, removed from
/// the loop, and returned so the caller can hoist it into the enclosing
/// module. A localparam under the original name, referring to the renamed
/// genvar, is inserted at the beginning of the body. References in the
/// init, condition, and step clauses are renamed; references in the body
/// resolve through the localparam.
///
/// Returns `None` and leaves the loop untouched if it has no inline genvar.
pub fn rewrite_genfor_decl(genfor: &mut AstNode, idx: usize) -> Option<AstNode> {
    if genfor.kind != AstKind::GenFor
        || genfor.children.len() != 5
        || genfor.children[0].kind != AstKind::Genvar
    {
        return None;
    }
    let mut decl = genfor.children.remove(0);
    let old_name = std::mem::take(&mut decl.name);
    let new_name = format!("$genfordecl${}${}", idx, old_name);
    decl.name = new_name.clone();
    trace!("renaming genvar `{}` to `{}`", old_name, new_name);

    let span = decl.span;
    let mut shadow = AstNode::named(AstKind::Localparam, old_name.clone(), span);
    shadow.children.push(AstNode::ident(new_name.clone(), span));

    for clause in &mut genfor.children[0..3] {
        clause.walk_mut(&mut |n| {
            if n.kind == AstKind::Identifier && n.name == old_name {
                n.name = new_name.clone();
            }
        });
    }
    genfor.children[3].children.insert(0, shadow);
    Some(decl)
}

/// Desugar `lhs++` or `lhs--` as a statement into `lhs = lhs +/- 1`.
pub fn inc_or_dec_stmt(lhs: AstNode, increment: bool, span: Span) -> AstNode {
    let kind = if increment { AstKind::Add } else { AstKind::Sub };
    let value = AstNode::binary(
        kind,
        lhs.clone(),
        AstNode::mkconst_int(1, true, 32, span),
        span,
    );
    AstNode::binary(AstKind::AssignEq, lhs, value, span)
}

/// Desugar an increment or decrement used as an expression.
///
/// Returns the assignment statement to be emitted into the enclosing block,
/// together with the expression yielding the value of the operation. For
/// the postfix forms the update is undone in the yielded value.
pub fn inc_or_dec_expr(
    lhs: AstNode,
    increment: bool,
    postfix: bool,
    span: Span,
) -> (AstNode, AstNode) {
    let stmt = inc_or_dec_stmt(lhs, increment, span);
    let mut value = stmt.children[0].clone();
    if postfix {
        let kind = if increment { AstKind::Add } else { AstKind::Sub };
        value = AstNode::binary(
            kind,
            value,
            AstNode::mkconst_int(-1, true, 1, span),
            span,
        );
    }
    (stmt, value)
}

/// Desugar a compound assignment `lhs op= rhs` into `lhs = lhs op rhs`.
pub fn asgn_binop_stmt(lhs: AstNode, op: AstKind, rhs: AstNode, span: Span) -> AstNode {
    let rhs = if is_shift(op) {
        AstNode::unary(AstKind::ToUnsigned, rhs, span)
    } else {
        rhs
    };
    let value = AstNode::binary(op, lhs.clone(), rhs, span);
    AstNode::binary(AstKind::AssignEq, lhs, value, span)
}

/// Whether an operator is one of the shifts, whose amount is always treated
/// as unsigned.
pub fn is_shift(op: AstKind) -> bool {
    match op {
        AstKind::ShiftLeft | AstKind::ShiftRight | AstKind::ShiftSLeft | AstKind::ShiftSRight => {
            true
        }
        _ => false,
    }
}

/// Wrap a for loop whose loop variable is declared inline into a block that
/// declares the variable.
pub fn wrap_for_decl(decl: AstNode, for_loop: AstNode, idx: usize) -> AstNode {
    let span = for_loop.span;
    trace!("wrapping for loop over `{}` in a block", decl.name);
    let mut block = AstNode::named(AstKind::Block, format!("$fordecl_block${}", idx), span);
    block.children.push(decl);
    block.children.push(for_loop);
    block
}

/// Turn a declaration with unpacked dimensions into a memory.
///
/// Single-bound dimensions `[n]` are canonicalized to `[0:n-1]`.
pub fn rewrite_as_memory(decl: &mut AstNode, mut dims: AstNode) {
    decl.kind = AstKind::Memory;
    match dims.kind {
        AstKind::Range => canonicalize_dim(&mut dims),
        AstKind::MultiRange => dims.children.iter_mut().for_each(canonicalize_dim),
        _ => (),
    }
    decl.children.push(dims);
}

fn canonicalize_dim(range: &mut AstNode) {
    if range.kind != AstKind::Range || range.children.len() != 1 {
        return;
    }
    let span = range.span;
    let size = range.children.remove(0);
    range
        .children
        .push(AstNode::mkconst_int(0, false, 32, span));
    range.children.push(AstNode::binary(
        AstKind::Sub,
        size,
        AstNode::mkconst_int(1, true, 32, span),
        span,
    ));
}

/// Build the case statement an `if` is represented as.
///
/// The condition is reduced to a single bit and compared against `1'b1`. An
/// `else` branch becomes the default item.
pub fn if_to_case(cond: AstNode, then_block: AstNode, else_block: Option<AstNode>, span: Span) -> AstNode {
    let cond_span = cond.span;
    let mut case = AstNode::new(AstKind::Case, span);
    case.children
        .push(AstNode::unary(AstKind::ReduceBool, cond, cond_span));
    case.children.push(AstNode::binary(
        AstKind::Cond,
        AstNode::mkconst_int(1, false, 1, cond_span),
        then_block,
        cond_span,
    ));
    if let Some(else_block) = else_block {
        let else_span = else_block.span;
        case.children.push(AstNode::binary(
            AstKind::Cond,
            AstNode::new(AstKind::Default, else_span),
            else_block,
            else_span,
        ));
    }
    case
}

/// Build the range of an indexed part select `[base +: width]` or
/// `[base -: width]`.
pub fn indexed_range(base: AstNode, width: AstNode, ascending: bool, span: Span) -> AstNode {
    let base = AstNode::unary(AstKind::SelfSz, base, span);
    let one = || AstNode::mkconst_int(1, true, 32, span);
    let zero = || AstNode::mkconst_int(0, true, 32, span);
    let (left, right) = if ascending {
        (
            AstNode::binary(
                AstKind::Sub,
                AstNode::binary(AstKind::Add, base.clone(), width, span),
                one(),
                span,
            ),
            AstNode::binary(AstKind::Add, base, zero(), span),
        )
    } else {
        (
            AstNode::binary(AstKind::Add, base.clone(), zero(), span),
            AstNode::binary(
                AstKind::Sub,
                AstNode::binary(AstKind::Add, base, one(), span),
                width,
                span,
            ),
        )
    };
    AstNode::binary(AstKind::Range, left, right, span)
}

/// Whether an unnamed block declares something and therefore needs a
/// synthesized name to become addressable.
pub fn needs_scope_name(block: &AstNode) -> bool {
    block.name.is_empty()
        && block.children.iter().any(|c| match c.kind {
            AstKind::Wire
            | AstKind::Memory
            | AstKind::Parameter
            | AstKind::Localparam
            | AstKind::Typedef => true,
            _ => false,
        })
}

/// Lower the initializer of a net or variable declaration.
///
/// Input ports keep the value as their `defaultvalue` attribute and `None`
/// is returned. Variables are initialized by an initial block, nets by a
/// continuous assignment; the returned node is to be emitted next to the
/// declaration.
pub fn decl_assignment(decl: &mut AstNode, value: AstNode, span: Span) -> Option<AstNode> {
    if decl.is_input() {
        decl.set_attribute("defaultvalue", value);
        return None;
    }
    let target = AstNode::ident(decl.name.clone(), decl.span);
    if decl.is_reg() || decl.is_logic() {
        let assign = AstNode::binary(AstKind::AssignLe, target, value, span);
        let block = AstNode::with_children(AstKind::Block, vec![assign], span);
        Some(AstNode::with_children(AstKind::Initial, vec![block], span))
    } else {
        Some(AstNode::binary(AstKind::Assign, target, value, span))
    }
}

/// Drive a wire carrying one of the formal attributes (`anyconst`, etc.)
/// with the corresponding system function.
pub fn formal_wire_assign(decl: &AstNode) -> Option<AstNode> {
    let attr = FORMAL_WIRE_ATTRS
        .iter()
        .find(|a| decl.get_bool_attribute(a))?;
    let span = decl.span;
    let mut fcall = AstNode::named(AstKind::FCall, format!("${}", attr), span);
    fcall.set_attribute("reg", AstNode::mkconst_str(decl.name.clone(), span));
    Some(AstNode::binary(
        AstKind::Assign,
        AstNode::ident(decl.name.clone(), span),
        fcall,
        span,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfront_common::source::INVALID_SPAN;

    fn ident(name: &str) -> AstNode {
        AstNode::ident(name, INVALID_SPAN)
    }

    fn int(v: i64) -> AstNode {
        AstNode::mkconst_int(v, true, 32, INVALID_SPAN)
    }

    fn genfor() -> AstNode {
        let sp = INVALID_SPAN;
        let genvar = AstNode::named(AstKind::Genvar, "i", sp);
        let init = AstNode::binary(AstKind::AssignEq, ident("i"), int(0), sp);
        let cond = AstNode::binary(AstKind::Lt, ident("i"), int(4), sp);
        let step = AstNode::binary(
            AstKind::AssignEq,
            ident("i"),
            AstNode::binary(AstKind::Add, ident("i"), int(1), sp),
            sp,
        );
        let mut body = AstNode::named(AstKind::GenBlock, "blk", sp);
        body.children
            .push(AstNode::binary(AstKind::Assign, ident("x"), ident("i"), sp));
        AstNode::with_children(AstKind::GenFor, vec![genvar, init, cond, step, body], sp)
    }

    #[test]
    fn genfor_decl_is_hoisted_and_shadowed() {
        let mut gf = genfor();
        let decl = rewrite_genfor_decl(&mut gf, 7).unwrap();
        assert_eq!(decl.kind, AstKind::Genvar);
        assert_eq!(decl.name, "$genfordecl$7$i");
        assert_eq!(gf.children.len(), 4);
        assert_eq!(gf.children[0].children[0].name, "$genfordecl$7$i");
        assert_eq!(gf.children[1].children[0].name, "$genfordecl$7$i");
        assert_eq!(gf.children[2].children[0].name, "$genfordecl$7$i");
        assert_eq!(gf.children[2].children[1].children[0].name, "$genfordecl$7$i");

        let body = &gf.children[3];
        assert_eq!(body.children[0].kind, AstKind::Localparam);
        assert_eq!(body.children[0].name, "i");
        assert_eq!(body.children[0].children[0].name, "$genfordecl$7$i");
        // The body still refers to the original name.
        assert_eq!(body.children[1].children[1].name, "i");
    }

    #[test]
    fn genfor_without_decl_is_untouched() {
        let mut gf = genfor();
        gf.children.remove(0);
        let before = gf.clone();
        assert!(rewrite_genfor_decl(&mut gf, 0).is_none());
        assert_eq!(gf, before);
    }

    #[test]
    fn compound_assignment() {
        let stmt = asgn_binop_stmt(ident("a"), AstKind::Add, int(1), INVALID_SPAN);
        assert_eq!(stmt.kind, AstKind::AssignEq);
        assert_eq!(stmt.children[0], ident("a"));
        assert_eq!(stmt.children[1].kind, AstKind::Add);
        assert_eq!(stmt.children[1].children[0], ident("a"));

        let stmt = asgn_binop_stmt(ident("a"), AstKind::ShiftLeft, ident("b"), INVALID_SPAN);
        assert_eq!(stmt.children[1].children[1].kind, AstKind::ToUnsigned);
    }

    #[test]
    fn increments() {
        let stmt = inc_or_dec_stmt(ident("a"), false, INVALID_SPAN);
        assert_eq!(stmt.children[1].kind, AstKind::Sub);
        assert_eq!(stmt.children[1].children[1].integer, 1);

        let (stmt, value) = inc_or_dec_expr(ident("a"), true, false, INVALID_SPAN);
        assert_eq!(stmt.kind, AstKind::AssignEq);
        assert_eq!(value, ident("a"));

        let (_, value) = inc_or_dec_expr(ident("a"), true, true, INVALID_SPAN);
        assert_eq!(value.kind, AstKind::Add);
        assert_eq!(value.children[1].bits.len(), 1);
        assert!(value.children[1].is_signed());
    }

    #[test]
    fn memory_dimensions() {
        let mut mem = AstNode::named(AstKind::Wire, "m", INVALID_SPAN);
        let dims = AstNode::with_children(AstKind::Range, vec![int(16)], INVALID_SPAN);
        rewrite_as_memory(&mut mem, dims);
        assert_eq!(mem.kind, AstKind::Memory);
        let range = &mem.children[0];
        assert_eq!(range.children.len(), 2);
        assert_eq!(range.children[0].integer, 0);
        assert!(!range.children[0].is_signed());
        assert_eq!(range.children[1].kind, AstKind::Sub);
        assert_eq!(range.children[1].children[0].integer, 16);
    }

    #[test]
    fn indexed_part_select() {
        let r = indexed_range(ident("i"), int(8), true, INVALID_SPAN);
        assert_eq!(r.children[0].kind, AstKind::Sub);
        assert_eq!(r.children[0].children[0].children[0].kind, AstKind::SelfSz);
        assert_eq!(r.children[1].kind, AstKind::Add);

        let r = indexed_range(ident("i"), int(8), false, INVALID_SPAN);
        assert_eq!(r.children[0].kind, AstKind::Add);
        assert_eq!(r.children[1].kind, AstKind::Sub);
        assert_eq!(r.children[1].children[1].integer, 8);
    }

    #[test]
    fn initializers() {
        let mut reg = AstNode::named(AstKind::Wire, "r", INVALID_SPAN);
        reg.flags |= crate::ast::NodeFlags::REG;
        let init = decl_assignment(&mut reg, int(0), INVALID_SPAN).unwrap();
        assert_eq!(init.kind, AstKind::Initial);
        assert_eq!(init.children[0].children[0].kind, AstKind::AssignLe);

        let mut wire = AstNode::named(AstKind::Wire, "w", INVALID_SPAN);
        let assign = decl_assignment(&mut wire, int(0), INVALID_SPAN).unwrap();
        assert_eq!(assign.kind, AstKind::Assign);

        let mut input = AstNode::named(AstKind::Wire, "i", INVALID_SPAN);
        input.flags |= crate::ast::NodeFlags::INPUT;
        assert!(decl_assignment(&mut input, int(3), INVALID_SPAN).is_none());
        assert_eq!(input.attributes["defaultvalue"].integer, 3);
    }

    #[test]
    fn formal_wires() {
        let mut w = AstNode::named(AstKind::Wire, "w", INVALID_SPAN);
        assert!(formal_wire_assign(&w).is_none());
        w.set_bool_attribute("anyseq");
        let assign = formal_wire_assign(&w).unwrap();
        assert_eq!(assign.children[1].name, "$anyseq");
        assert_eq!(assign.children[1].attributes["reg"].name, "w");
    }

    #[test]
    fn block_naming() {
        let mut b = AstNode::new(AstKind::Block, INVALID_SPAN);
        assert!(!needs_scope_name(&b));
        b.children.push(AstNode::named(AstKind::Wire, "t", INVALID_SPAN));
        assert!(needs_scope_name(&b));
        b.name = "named".into();
        assert!(!needs_scope_name(&b));
    }
}
