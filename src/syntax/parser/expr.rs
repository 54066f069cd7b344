// Copyright (c) 2016-2021 Fabian Schuiki

//! Expressions, selects, lvalues, and delays.

use super::*;
use crate::builtin::Builtin;
use crate::const2ast::{const2ast, has_z_bits, ConvError, MAX_LITERAL_WIDTH};
use crate::desugar;

pub fn parse_expr(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    parse_expr_prec(p, Precedence::Min)
}

fn parse_expr_prec(p: &mut dyn AbstractParser, precedence: Precedence) -> ReportedResult<AstNode> {
    deeper(p, |p| {
        let prefix = parse_expr_first(p, precedence)?;
        parse_expr_suffix(p, prefix, precedence)
    })
}

fn parse_expr_suffix(
    p: &mut dyn AbstractParser,
    mut prefix: AstNode,
    precedence: Precedence,
) -> ReportedResult<AstNode> {
    loop {
        let (tkn, sp) = p.peek(0);
        match tkn {
            // expr "'" "(" expr ")"
            Apostrophe if precedence <= Precedence::Postfix => {
                p.bump();
                if !p.opts().sv {
                    return fatal(p, "Static cast is only supported in SystemVerilog mode.", sp);
                }
                let inner = flanked(p, Paren, parse_expr)?;
                let span = Span::union(prefix.span, p.last_span());
                prefix = AstNode::binary(AstKind::CastSize, prefix, inner, span);
                continue;
            }

            // expr "++" and expr "--"
            Operator(op @ Op::Inc) | Operator(op @ Op::Dec) if precedence <= Precedence::Unary => {
                p.bump();
                let span = Span::union(prefix.span, p.last_span());
                let (stmt, value) = desugar::inc_or_dec_expr(prefix, op == Op::Inc, true, span);
                emit_assign_expr(p, stmt, span)?;
                prefix = value;
                continue;
            }

            // expr "?" expr ":" expr
            Ternary if precedence < Precedence::Ternary => {
                p.bump();
                let attrs = parse_attributes(p)?;
                let true_expr = parse_expr(p)?;
                p.require_reported(Colon)?;
                let false_expr = parse_expr_prec(p, Precedence::Implication)?;
                let span = Span::union(prefix.span, p.last_span());
                let mut expr = AstNode::with_children(
                    AstKind::Ternary,
                    vec![prefix, true_expr, false_expr],
                    span,
                );
                expr.append_attributes(attrs);
                prefix = expr;
                continue;
            }

            // expr op expr
            Operator(op) if precedence < op.get_precedence() && is_binary_operator(op) => {
                p.bump();
                let attrs = parse_attributes(p)?;
                let rhs = parse_expr_prec(p, op.get_precedence())?;
                let span = Span::union(prefix.span, p.last_span());
                let mut expr = make_binary(p, op, prefix, rhs, sp, span)?;
                expr.append_attributes(attrs);
                prefix = expr;
                continue;
            }

            _ => return Ok(prefix),
        }
    }
}

fn is_binary_operator(op: Op) -> bool {
    match op {
        Op::Inc | Op::Dec | Op::LogicNot | Op::BitNot => false,
        op => op.get_precedence() > Precedence::Assignment,
    }
}

fn make_binary(
    p: &mut dyn AbstractParser,
    op: Op,
    lhs: AstNode,
    rhs: AstNode,
    op_span: Span,
    span: Span,
) -> ReportedResult<AstNode> {
    let kind = match op {
        Op::Add => AstKind::Add,
        Op::Sub => AstKind::Sub,
        Op::Mul => AstKind::Mul,
        Op::Div => AstKind::Div,
        Op::Mod => AstKind::Mod,
        Op::Pow => AstKind::Pow,
        Op::LogicEq => AstKind::Eq,
        Op::LogicNeq => AstKind::Ne,
        Op::CaseEq => AstKind::EqX,
        Op::CaseNeq => AstKind::NeX,
        Op::Lt => AstKind::Lt,
        Op::Leq => AstKind::Le,
        Op::Gt => AstKind::Gt,
        Op::Geq => AstKind::Ge,
        Op::LogicAnd => AstKind::LogicAnd,
        Op::LogicOr => AstKind::LogicOr,
        Op::BitAnd => AstKind::BitAnd,
        Op::BitOr => AstKind::BitOr,
        Op::BitXor => AstKind::BitXor,
        Op::BitXnor | Op::BitNxor => AstKind::BitXnor,
        Op::BitNand => {
            let and = AstNode::binary(AstKind::BitAnd, lhs, rhs, span);
            return Ok(AstNode::unary(AstKind::BitNot, and, span));
        }
        Op::BitNor => {
            let or = AstNode::binary(AstKind::BitOr, lhs, rhs, span);
            return Ok(AstNode::unary(AstKind::BitNot, or, span));
        }
        Op::LogicShL | Op::LogicShR | Op::ArithShL | Op::ArithShR => {
            let kind = match op {
                Op::LogicShL => AstKind::ShiftLeft,
                Op::LogicShR => AstKind::ShiftRight,
                Op::ArithShL => AstKind::ShiftSLeft,
                _ => AstKind::ShiftSRight,
            };
            let amount = AstNode::unary(AstKind::ToUnsigned, rhs, span);
            return Ok(AstNode::binary(kind, lhs, amount, span));
        }
        Op::WildcardEq | Op::WildcardNeq => {
            return fatal(p, "Wildcard equality operators are not supported.", op_span);
        }
        Op::LogicImpl | Op::LogicEquiv => {
            return fatal(
                p,
                format!("Logical operator `{}` is not supported.", op),
                op_span,
            );
        }
        _ => {
            p.add_diag(
                DiagBuilder2::error(format!("`{}` is not a binary operator", op)).span(op_span),
            );
            return Err(());
        }
    };
    Ok(AstNode::binary(kind, lhs, rhs, span))
}

fn parse_expr_first(p: &mut dyn AbstractParser, precedence: Precedence) -> ReportedResult<AstNode> {
    let (tkn, first) = p.peek(0);
    match tkn {
        Operator(op @ Op::Inc) | Operator(op @ Op::Dec) if precedence <= Precedence::Unary => {
            p.bump();
            let target = parse_expr_prec(p, Precedence::Unary)?;
            let span = Span::union(first, p.last_span());
            let (stmt, value) = desugar::inc_or_dec_expr(target, op == Op::Inc, false, span);
            emit_assign_expr(p, stmt, span)?;
            return Ok(value);
        }
        Operator(op) => {
            if let Some((kind, negate)) = as_unary_operator(op) {
                p.bump();
                let attrs = parse_attributes(p)?;
                let arg = parse_expr_prec(p, Precedence::Unary)?;
                let span = Span::union(first, p.last_span());
                let mut expr = AstNode::unary(kind, arg, span);
                expr.append_attributes(attrs);
                if negate {
                    expr = AstNode::unary(AstKind::LogicNot, expr, span);
                }
                return Ok(expr);
            }
        }
        _ => (),
    }
    parse_primary_expr(p)
}

/// Map a prefix operator to the node it creates, and whether the result is
/// logically negated.
fn as_unary_operator(op: Op) -> Option<(AstKind, bool)> {
    Some(match op {
        Op::BitNot => (AstKind::BitNot, false),
        Op::BitAnd => (AstKind::ReduceAnd, false),
        Op::BitNand => (AstKind::ReduceAnd, true),
        Op::BitOr => (AstKind::ReduceOr, false),
        Op::BitNor => (AstKind::ReduceOr, true),
        Op::BitXor => (AstKind::ReduceXor, false),
        Op::BitXnor | Op::BitNxor => (AstKind::ReduceXnor, false),
        Op::LogicNot => (AstKind::LogicNot, false),
        Op::Add => (AstKind::Pos, false),
        Op::Sub => (AstKind::Neg, false),
        _ => return None,
    })
}

/// Emit the update performed by an assignment used as an expression into the
/// enclosing procedural block.
fn emit_assign_expr(p: &mut dyn AbstractParser, stmt: AstNode, span: Span) -> ReportedResult<()> {
    if !p.opts().sv {
        return fatal(
            p,
            "Assignments within expressions are only supported in SystemVerilog mode.",
            span,
        );
    }
    if p.state().top_kind() != AstKind::Block {
        return fatal(
            p,
            "Assignments within expressions are only permitted within procedures.",
            span,
        );
    }
    emit(p, stmt);
    Ok(())
}

fn parse_primary_expr(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let (tkn, sp) = p.peek(0);
    match tkn {
        Literal(Number(_)) | Literal(BaseSpec(_)) | Literal(UnbasedUnsized(_)) => {
            parse_number(p)
        }

        Literal(Real(value)) => {
            p.bump();
            match value.as_str().parse::<f64>() {
                Ok(v) => Ok(AstNode::mkconst_real(v, sp)),
                Err(_) => fatal(p, format!("Value conversion failed: `{}'", value), sp),
            }
        }

        Literal(Str(value)) => {
            p.bump();
            Ok(AstNode::mkconst_str(value.to_string(), sp))
        }

        Ident(_) | EscIdent(_) => {
            let (name, name_span) = parse_hierarchical_name(p, "identifier")?;
            if p.peek(0).0 == OpenDelim(Paren) {
                let args = flanked(p, Paren, parse_call_args)?;
                let span = Span::union(name_span, p.last_span());
                return Ok(AstNode::with_children(AstKind::FCall, args, span).renamed(name));
            }
            let mut node = AstNode::ident(name, name_span);
            if let Some(sel) = parse_dims(p)? {
                node.children.push(sel);
            }
            node.span.expand(p.last_span());
            Ok(node)
        }

        SysIdent(name) => {
            p.bump();
            let name = format!("${}", name);
            let builtin = Builtin::from_name(&name);
            if p.peek(0).0 == OpenDelim(Paren) {
                let args = flanked(p, Paren, parse_call_args)?;
                let span = Span::union(sp, p.last_span());
                return match builtin {
                    Some(Builtin::Signed) | Some(Builtin::Unsigned) if args.len() == 1 => {
                        let kind = if builtin == Some(Builtin::Signed) {
                            AstKind::ToSigned
                        } else {
                            AstKind::ToUnsigned
                        };
                        Ok(AstNode::with_children(kind, args, span))
                    }
                    Some(Builtin::Signed) | Some(Builtin::Unsigned) => fatal(
                        p,
                        format!("System function `{}` takes exactly one argument.", name),
                        span,
                    ),
                    _ => Ok(AstNode::with_children(AstKind::FCall, args, span).renamed(name)),
                };
            }
            let is_pseudo = builtin.map(|b| b.is_pseudo_function()).unwrap_or(false);
            let mut node = AstNode::ident(name.clone(), sp);
            if is_pseudo {
                node.kind = AstKind::FCall;
            } else if let Some(sel) = parse_dims(p)? {
                node.children.push(sel);
                node.span.expand(p.last_span());
            }
            Ok(node)
        }

        // "signed" "'" "(" expr ")"
        Keyword(Kw::Signed) | Keyword(Kw::Unsigned) => {
            p.bump();
            if !p.opts().sv {
                return fatal(p, "Static cast is only supported in SystemVerilog mode.", sp);
            }
            p.require_reported(Apostrophe)?;
            let inner = flanked(p, Paren, parse_expr)?;
            let kind = if tkn == Keyword(Kw::Signed) {
                AstKind::ToSigned
            } else {
                AstKind::ToUnsigned
            };
            Ok(AstNode::unary(kind, inner, Span::union(sp, p.last_span())))
        }

        OpenDelim(Paren) => parse_paren_expr(p),
        OpenDelim(Brace) => parse_concat(p),

        tkn => {
            p.add_diag(
                DiagBuilder2::error(format!("expected expression, but found `{}` instead", tkn))
                    .span(sp),
            );
            Err(())
        }
    }
}

/// Reassemble an integer literal from its tokens and convert it.
fn parse_number(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let (tkn, mut span) = p.peek(0);
    let mut code = String::new();
    match tkn {
        Literal(Number(size)) => {
            p.bump();
            code.push_str(&size.as_str());
            if let Literal(BaseSpec(_)) = p.peek(0).0 {
                parse_based_digits(p, &mut code)?;
            }
        }
        Literal(BaseSpec(_)) => parse_based_digits(p, &mut code)?,
        Literal(UnbasedUnsized(c)) => {
            p.bump();
            code.push('\'');
            code.push(c);
        }
        _ => {
            p.add_diag(DiagBuilder2::error(format!("expected number, found `{}`", tkn)).span(span));
            return Err(());
        }
    }
    span.expand(p.last_span());
    let case_type = p.state().case_type();
    match const2ast(&code, case_type, span) {
        Ok(node) => {
            if !p.opts().lib && has_z_bits(&node) {
                p.add_diag(
                    DiagBuilder2::warning("only limited support for tri-state logic at the moment")
                        .span(span),
                );
            }
            Ok(node)
        }
        Err(ConvError::Malformed) => fatal(p, format!("Value conversion failed: `{}'", code), span),
        Err(ConvError::TooWide) => fatal(
            p,
            format!(
                "Literal width too large: `{}' exceeds {} bits.",
                code, MAX_LITERAL_WIDTH
            ),
            span,
        ),
    }
}

fn parse_based_digits(p: &mut dyn AbstractParser, code: &mut String) -> ReportedResult<()> {
    if let (Literal(BaseSpec(base)), _) = p.peek(0) {
        p.bump();
        code.push_str(&base.as_str());
    }
    match p.peek(0) {
        (Literal(BasedDigits(digits)), _) => {
            p.bump();
            code.push_str(&digits.as_str());
            Ok(())
        }
        (Literal(Number(digits)), _) => {
            p.bump();
            code.push_str(&digits.as_str());
            Ok(())
        }
        (tkn, sp) => {
            p.add_diag(
                DiagBuilder2::error(format!("expected digits after number base, found `{}`", tkn))
                    .span(sp),
            );
            Err(())
        }
    }
}

/// Parse a parenthesized expression. Also covers `(min:typ:max)` triples, of
/// which the typical value is kept, and assignments used as expressions.
fn parse_paren_expr(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    flanked(p, Paren, |p| {
        let first = parse_expr(p)?;
        match p.peek(0) {
            (Colon, _) => {
                p.bump();
                let typ = parse_expr(p)?;
                p.require_reported(Colon)?;
                parse_expr(p)?;
                Ok(typ)
            }
            (Operator(op), sp) if op.get_precedence() == Precedence::Assignment => {
                p.bump();
                let rhs = parse_expr(p)?;
                let span = Span::union(first.span, p.last_span());
                let lhs = first.clone();
                let stmt = match assign_operator(op) {
                    Some(kind) => desugar::asgn_binop_stmt(first, kind, rhs, span),
                    None => AstNode::binary(AstKind::AssignEq, first, rhs, span),
                };
                emit_assign_expr(p, stmt, sp)?;
                Ok(lhs)
            }
            _ => Ok(first),
        }
    })
}

/// Map a compound assignment operator to the binary operation it performs.
/// Returns `None` for the plain `=`.
pub fn assign_operator(op: Op) -> Option<AstKind> {
    match op {
        Op::AssignAdd => Some(AstKind::Add),
        Op::AssignSub => Some(AstKind::Sub),
        Op::AssignMul => Some(AstKind::Mul),
        Op::AssignDiv => Some(AstKind::Div),
        Op::AssignMod => Some(AstKind::Mod),
        Op::AssignBitAnd => Some(AstKind::BitAnd),
        Op::AssignBitOr => Some(AstKind::BitOr),
        Op::AssignBitXor => Some(AstKind::BitXor),
        Op::AssignLogicShL => Some(AstKind::ShiftLeft),
        Op::AssignLogicShR => Some(AstKind::ShiftRight),
        Op::AssignArithShL => Some(AstKind::ShiftSLeft),
        Op::AssignArithShR => Some(AstKind::ShiftSRight),
        _ => None,
    }
}

/// Parse a concatenation `{a, b}` or replication `{n{a, b}}`. The operands
/// of a concatenation are stored last to first.
pub fn parse_concat(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let first_span = p.peek(0).1;
    flanked(p, Brace, |p| {
        let first = parse_expr(p)?;
        if p.peek(0).0 == OpenDelim(Brace) {
            let inner = parse_concat(p)?;
            let span = Span::union(first_span, p.last_span());
            return Ok(AstNode::binary(AstKind::Replicate, first, inner, span));
        }
        let mut items = vec![first];
        while p.try_eat(Comma) {
            items.push(parse_expr(p)?);
        }
        items.reverse();
        let span = Span::union(first_span, p.peek(0).1);
        Ok(AstNode::with_children(AstKind::Concat, items, span))
    })
}

fn parse_call_args(p: &mut dyn AbstractParser) -> ReportedResult<Vec<AstNode>> {
    comma_list(p, CloseDelim(Paren), "argument", parse_expr)
}

/// Parse a possibly hierarchical or package-qualified name such as `a.b.c`
/// or `pkg::name`.
pub fn parse_hierarchical_name(
    p: &mut dyn AbstractParser,
    msg: &str,
) -> ReportedResult<(String, Span)> {
    let (mut name, mut span) = p.eat_ident(msg)?;
    loop {
        let sep = match p.peek(0).0 {
            Period => ".",
            Namespace => "::",
            _ => break,
        };
        match p.peek(1).0 {
            Ident(n) | EscIdent(n) => {
                p.bump();
                p.bump();
                name.push_str(sep);
                name.push_str(&n.as_str());
                span.expand(p.last_span());
            }
            _ => break,
        }
    }
    Ok((name, span))
}

/// Parse a single `[...]` dimension or select.
///
/// Yields a range with one child for `[e]`, two for `[l:r]`, and the
/// equivalent two-child range for `[b+:w]` and `[b-:w]`.
fn parse_dim(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let q = p.peek(0).1;
    flanked(p, Brack, |p| {
        let first = parse_expr(p)?;
        let (tkn, _) = p.peek(0);
        let range = match tkn {
            Colon => {
                p.bump();
                let second = parse_expr(p)?;
                AstNode::binary(AstKind::Range, first, second, q)
            }
            AddColon | SubColon => {
                p.bump();
                let width = parse_expr(p)?;
                desugar::indexed_range(first, width, tkn == AddColon, q)
            }
            _ => AstNode::unary(AstKind::Range, first, q),
        };
        Ok(range)
    })
    .map(|mut r| {
        r.span.expand(p.last_span());
        r
    })
}

/// Parse any number of consecutive dimensions. One dimension yields a
/// range, several yield a multirange.
pub fn parse_dims(p: &mut dyn AbstractParser) -> ReportedResult<Option<AstNode>> {
    let mut dims = Vec::new();
    while !p.is_fatal() && p.peek(0).0 == OpenDelim(Brack) {
        dims.push(parse_dim(p)?);
    }
    Ok(match dims.len() {
        0 => None,
        1 => dims.pop(),
        _ => {
            let span = Span::union(dims[0].span, p.last_span());
            Some(AstNode::with_children(AstKind::MultiRange, dims, span))
        }
    })
}

/// Parse a single dimension, if present. Declarations accept at most one
/// packed dimension.
pub fn parse_range_opt(p: &mut dyn AbstractParser) -> ReportedResult<Option<AstNode>> {
    if p.peek(0).0 == OpenDelim(Brack) {
        parse_dim(p).map(Some)
    } else {
        Ok(None)
    }
}

/// Parse the target of an assignment: an identifier with optional selects,
/// or a concatenation.
pub fn parse_lvalue(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    if p.peek(0).0 == OpenDelim(Brace) {
        return parse_concat(p);
    }
    let (name, span) = parse_hierarchical_name(p, "assignment target")?;
    let mut node = AstNode::ident(name, span);
    if let Some(sel) = parse_dims(p)? {
        node.children.push(sel);
        node.span.expand(p.last_span());
    }
    Ok(node)
}

/// Skip an optional `#delay`. Delays carry no meaning for synthesis.
pub fn skip_delay(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    if !p.try_eat(Hashtag) {
        return Ok(());
    }
    match p.peek(0) {
        (OpenDelim(Paren), _) => {
            p.bump();
            p.recover_balanced(&[CloseDelim(Paren)], true);
            Ok(())
        }
        (Literal(Number(_)), _) | (Literal(BaseSpec(_)), _) => parse_number(p).map(|_| ()),
        (Literal(Real(_)), _) | (Literal(Time(..)), _) => {
            p.bump();
            Ok(())
        }
        (Ident(_), _) | (EscIdent(_), _) => parse_hierarchical_name(p, "delay").map(|_| ()),
        (tkn, sp) => {
            p.add_diag(
                DiagBuilder2::error(format!("expected delay value, found `{}`", tkn)).span(sp),
            );
            Err(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unary_operators() {
        assert_eq!(as_unary_operator(Op::BitNand), Some((AstKind::ReduceAnd, true)));
        assert_eq!(as_unary_operator(Op::BitNxor), Some((AstKind::ReduceXnor, false)));
        assert_eq!(as_unary_operator(Op::Mul), None);
    }

    #[test]
    fn binary_operators() {
        assert!(is_binary_operator(Op::Pow));
        assert!(is_binary_operator(Op::BitNand));
        assert!(!is_binary_operator(Op::LogicNot));
        assert!(!is_binary_operator(Op::AssignAdd));
    }

    #[test]
    fn compound_assignments() {
        assert_eq!(assign_operator(Op::AssignArithShR), Some(AstKind::ShiftSRight));
        assert_eq!(assign_operator(Op::Assign), None);
    }
}
