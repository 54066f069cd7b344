// Copyright (c) 2016-2021 Fabian Schuiki

//! Procedural statements and the `always` and `initial` constructs that
//! contain them.

use super::decl::{self, at_wire_type, check_range};
use super::expr::{assign_operator, parse_dims, parse_expr, parse_hierarchical_name, parse_lvalue, skip_delay};
use super::*;
use crate::const2ast::CaseType;
use crate::desugar;

/// Parse an `always`, `always_comb`, `always_ff`, `always_latch`, or
/// `initial` construct.
pub fn parse_always(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let (tkn, span) = p.peek(0);
    p.bump();
    let kind = if tkn == Keyword(Kw::Initial) {
        AstKind::Initial
    } else {
        AstKind::Always
    };
    let mut node = AstNode::new(kind, span);
    node.append_attributes(attrs);
    match tkn {
        Keyword(Kw::AlwaysFf) => node.set_bool_attribute("always_ff"),
        Keyword(Kw::AlwaysComb) => node.set_bool_attribute("always_comb"),
        Keyword(Kw::AlwaysLatch) => node.set_bool_attribute("always_latch"),
        _ => (),
    }
    if tkn == Keyword(Kw::Always) || tkn == Keyword(Kw::AlwaysFf) {
        parse_event_control(p, &mut node)?;
    }
    let block_span = p.peek(0).1;
    let block = nested(p, AstNode::new(AstKind::Block, block_span), false, parse_stmt)?;
    node.children.push(block);
    node.span.expand(p.last_span());
    emit(p, node);
    Ok(())
}

/// Parse the optional `@(...)` sensitivity list of an `always`. Implicit
/// lists such as `@*` produce no events.
fn parse_event_control(p: &mut dyn AbstractParser, node: &mut AstNode) -> ReportedResult<()> {
    if !p.try_eat(At) {
        return Ok(());
    }
    match (p.peek(0).0, p.peek(1).0, p.peek(2).0) {
        (Operator(Op::Mul), _, _) => {
            p.bump();
            return Ok(());
        }
        (OpenDelim(Paren), Operator(Op::Mul), CloseDelim(Paren)) => {
            p.bump();
            p.bump();
            p.bump();
            return Ok(());
        }
        (AttrBegin, CloseDelim(Paren), _) | (OpenDelim(Paren), AttrEnd, _) => {
            p.bump();
            p.bump();
            return Ok(());
        }
        _ => (),
    }
    flanked(p, Paren, |p| loop {
        let (tkn, sp) = p.peek(0);
        let kind = match tkn {
            Keyword(Kw::Posedge) => {
                p.bump();
                AstKind::Posedge
            }
            Keyword(Kw::Negedge) => {
                p.bump();
                AstKind::Negedge
            }
            _ => AstKind::Edge,
        };
        let expr = parse_expr(p)?;
        let span = Span::union(sp, p.last_span());
        node.children.push(AstNode::unary(kind, expr, span));
        if !p.try_eat(Keyword(Kw::Or)) && !p.try_eat(Comma) {
            return Ok(());
        }
    })
}

/// Parse a single statement into the innermost open block.
pub fn parse_stmt(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    deeper(p, parse_stmt_inner)
}

fn parse_stmt_inner(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    match p.peek(0).0 {
        DefattrBegin => return parse_defattr(p),
        Hashtag => {
            skip_delay(p)?;
            return parse_stmt(p);
        }
        _ => (),
    }
    let mut attrs = parse_attributes(p)?;
    let (tkn, sp) = p.peek(0);
    match tkn {
        Semicolon => {
            p.bump();
            Ok(())
        }
        OpenDelim(Bgend) => parse_block(p, attrs),
        Keyword(Kw::Unique) | Keyword(Kw::Unique0) | Keyword(Kw::Priority) => {
            p.bump();
            let full = tkn != Keyword(Kw::Unique0);
            let parallel = tkn != Keyword(Kw::Priority);
            if full {
                attrs.insert("full_case".into(), AstNode::mkconst_int(1, false, 32, sp));
            }
            if parallel {
                attrs.insert("parallel_case".into(), AstNode::mkconst_int(1, false, 32, sp));
            }
            match p.peek(0).0 {
                Keyword(Kw::If) => parse_if(p, attrs),
                Keyword(Kw::Case) | Keyword(Kw::Casex) | Keyword(Kw::Casez) => {
                    parse_case(p, attrs)
                }
                tkn => {
                    let sp = p.peek(0).1;
                    p.add_diag(
                        DiagBuilder2::error(format!("expected `if` or `case`, found `{}`", tkn))
                            .span(sp),
                    );
                    Err(())
                }
            }
        }
        Keyword(Kw::If) => parse_if(p, attrs),
        Keyword(Kw::Case) | Keyword(Kw::Casex) | Keyword(Kw::Casez) => parse_case(p, attrs),
        Keyword(Kw::For) => parse_for(p, attrs),
        Keyword(Kw::While) | Keyword(Kw::Repeat) => parse_loop(p, attrs),
        Keyword(Kw::Assert) | Keyword(Kw::Assume) | Keyword(Kw::Cover) | Keyword(Kw::Restrict) => {
            super::assertion::parse_assertion(p, attrs, None)
        }
        Ident(_) | EscIdent(_) if p.peek(1).0 == Colon => {
            let label = p.eat_ident("label")?;
            p.require_reported(Colon)?;
            super::assertion::parse_assertion(p, attrs, Some(label))
        }
        Keyword(Kw::Parameter) | Keyword(Kw::Localparam) => decl::parse_param_decl(p, attrs),
        Keyword(Kw::Typedef) => decl::parse_typedef(p),
        _ if at_wire_type(p) => decl::parse_wire_decl(p, attrs),
        SysIdent(name) => {
            p.bump();
            parse_task_call(p, format!("${}", name), sp, attrs)
        }
        Ident(_) | EscIdent(_) => {
            let (name, span) = parse_hierarchical_name(p, "statement")?;
            match p.peek(0).0 {
                OpenDelim(Paren) | Semicolon => parse_task_call(p, name, span, attrs),
                _ => {
                    let mut lhs = AstNode::ident(name, span);
                    if let Some(sel) = parse_dims(p)? {
                        lhs.children.push(sel);
                        lhs.span.expand(p.last_span());
                    }
                    let mut node = parse_assignment(p, lhs)?;
                    node.append_attributes(attrs);
                    emit(p, node);
                    p.require_reported(Semicolon)
                }
            }
        }
        OpenDelim(Brace) | Operator(Op::Inc) | Operator(Op::Dec) => {
            let node = parse_simple_stmt(p, attrs)?;
            emit(p, node);
            p.require_reported(Semicolon)
        }
        _ => {
            p.add_diag(
                DiagBuilder2::error(format!("expected statement, found `{}`", tkn)).span(sp),
            );
            Err(())
        }
    }
}

/// Parse the remainder of a task call statement after its name.
fn parse_task_call(
    p: &mut dyn AbstractParser,
    name: String,
    span: Span,
    attrs: Attributes,
) -> ReportedResult<()> {
    let args = try_flanked(p, Paren, |p| {
        comma_list(p, CloseDelim(Paren), "argument", parse_expr)
    })?
    .unwrap_or_default();
    let mut node =
        AstNode::with_children(AstKind::TCall, args, Span::union(span, p.last_span())).renamed(name);
    node.append_attributes(attrs);
    emit(p, node);
    p.require_reported(Semicolon)
}

/// Parse an assignment or increment without the trailing semicolon, as
/// found in statements and the step of a for loop.
pub fn parse_simple_stmt(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<AstNode> {
    let (tkn, sp) = p.peek(0);
    let mut node = match tkn {
        Operator(op @ Op::Inc) | Operator(op @ Op::Dec) => {
            p.bump();
            let lhs = parse_lvalue(p)?;
            let span = Span::union(sp, p.last_span());
            desugar::inc_or_dec_stmt(lhs, op == Op::Inc, span)
        }
        _ => {
            let lhs = parse_lvalue(p)?;
            parse_assignment(p, lhs)?
        }
    };
    node.append_attributes(attrs);
    Ok(node)
}

/// Parse the operator and right hand side of an assignment to `lhs`.
fn parse_assignment(p: &mut dyn AbstractParser, lhs: AstNode) -> ReportedResult<AstNode> {
    let (tkn, sp) = p.peek(0);
    match tkn {
        Operator(Op::Assign) | Operator(Op::Leq) => {
            p.bump();
            skip_delay(p)?;
            let rhs = parse_expr(p)?;
            let span = Span::union(lhs.span, p.last_span());
            let kind = if tkn == Operator(Op::Assign) {
                AstKind::AssignEq
            } else {
                AstKind::AssignLe
            };
            Ok(AstNode::binary(kind, lhs, rhs, span))
        }
        Operator(op @ Op::Inc) | Operator(op @ Op::Dec) => {
            p.bump();
            let span = Span::union(lhs.span, p.last_span());
            Ok(desugar::inc_or_dec_stmt(lhs, op == Op::Inc, span))
        }
        Operator(op) if assign_operator(op).is_some() => {
            p.bump();
            skip_delay(p)?;
            let rhs = parse_expr(p)?;
            let span = Span::union(lhs.span, p.last_span());
            let kind = assign_operator(op).unwrap_or(AstKind::Add);
            Ok(desugar::asgn_binop_stmt(lhs, kind, rhs, span))
        }
        _ => {
            p.add_diag(
                DiagBuilder2::error(format!("expected assignment operator, found `{}`", tkn))
                    .span(sp),
            );
            Err(())
        }
    }
}

/// Parse a `begin ... end` block.
fn parse_block(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let span = p.peek(0).1;
    p.require_reported(OpenDelim(Bgend))?;
    let label = parse_end_label(p)?;
    let mut block = AstNode::new(AstKind::Block, span);
    if let Some((ref name, _)) = label {
        block.name = name.clone();
    }
    block.append_attributes(attrs);
    let mut block = nested(p, block, true, |p| {
        parse_items(p, &[CloseDelim(Bgend)], parse_stmt);
        p.require_reported(CloseDelim(Bgend))
    })?;
    block.span.expand(p.last_span());
    let end_label = parse_end_label(p)?;
    let name = label.map(|(n, _)| n);
    check_label(p, "Begin label", name.as_ref().map(String::as_str), end_label)?;
    if p.opts().sv && desugar::needs_scope_name(&block) {
        block.name = format!("$unnamed_block${}", p.state().next_autoidx());
        trace!("naming block with declarations `{}`", block.name);
    }
    emit(p, block);
    Ok(())
}

/// Parse a single statement into a fresh block.
fn parse_stmt_block(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let span = p.peek(0).1;
    let mut block = nested(p, AstNode::new(AstKind::Block, span), false, parse_stmt)?;
    block.span.expand(p.last_span());
    Ok(block)
}

/// Parse an `if` statement, which is represented as a case statement over
/// the condition.
fn parse_if(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let span = p.peek(0).1;
    p.require_reported(Keyword(Kw::If))?;
    let cond = flanked(p, Paren, parse_expr)?;
    let then_block = parse_stmt_block(p)?;
    let else_block = if p.try_eat(Keyword(Kw::Else)) {
        Some(parse_stmt_block(p)?)
    } else {
        None
    };
    let mut case = desugar::if_to_case(cond, then_block, else_block, Span::union(span, p.last_span()));
    case.append_attributes(attrs);
    emit(p, case);
    Ok(())
}

/// Parse a `case`, `casex`, or `casez` statement.
fn parse_case(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let (tkn, span) = p.peek(0);
    p.bump();
    let (case_type, item_kind) = match tkn {
        Keyword(Kw::Casex) => (CaseType::CaseX, AstKind::CondX),
        Keyword(Kw::Casez) => (CaseType::CaseZ, AstKind::CondZ),
        _ => (CaseType::Normal, AstKind::Cond),
    };
    p.state().case_types.push(case_type);
    let result = parse_case_inner(p, attrs, span, item_kind);
    p.state().case_types.pop();
    let case = result?;
    emit(p, case);
    Ok(())
}

fn parse_case_inner(
    p: &mut dyn AbstractParser,
    attrs: Attributes,
    span: Span,
    item_kind: AstKind,
) -> ReportedResult<AstNode> {
    let selector = flanked(p, Paren, parse_expr)?;
    let mut case = AstNode::with_children(AstKind::Case, vec![selector], span);
    case.append_attributes(attrs);
    for pragma in p.take_case_pragmas() {
        let key = match pragma {
            CasePragma::FullCase => "full_case",
            CasePragma::ParallelCase => "parallel_case",
        };
        if !case.attributes.contains_key(key) {
            case.set_bool_attribute(key);
        }
    }

    while !p.is_fatal() && p.peek(0).0 != Keyword(Kw::Endcase) && p.peek(0).0 != Eof {
        let item = parse_case_item(p, item_kind)?;
        case.children.push(item);
    }
    p.require_reported(Keyword(Kw::Endcase))?;
    case.span.expand(p.last_span());
    Ok(case)
}

/// Parse one `exprs: stmt` or `default: stmt` item of a case statement.
fn parse_case_item(p: &mut dyn AbstractParser, kind: AstKind) -> ReportedResult<AstNode> {
    let span = p.peek(0).1;
    let mut item = AstNode::new(kind, span);
    let mut only_default = true;
    loop {
        let (tkn, sp) = p.peek(0);
        if tkn == Keyword(Kw::Default) {
            p.bump();
            item.children.push(AstNode::new(AstKind::Default, sp));
        } else {
            only_default = false;
            item.children.push(parse_expr(p)?);
        }
        if !p.try_eat(Comma) {
            break;
        }
    }
    if !p.try_eat(Colon) && !only_default {
        let (tkn, sp) = p.peek(0);
        p.add_diag(
            DiagBuilder2::error(format!("expected `:` after case item, found `{}`", tkn)).span(sp),
        );
        return Err(());
    }

    p.state().case_types.push(CaseType::Normal);
    let block = parse_stmt_block(p);
    p.state().case_types.pop();
    item.children.push(block?);
    item.span.expand(p.last_span());
    Ok(item)
}

/// Parse a `for` loop.
fn parse_for(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let span = p.peek(0).1;
    p.require_reported(Keyword(Kw::For))?;
    p.require_reported(OpenDelim(Paren))?;

    // The loop variable, possibly declared inline.
    let mut decl = None;
    let (name, name_span) = if at_wire_type(p) {
        let sp = p.peek(0).1;
        if !p.opts().sv {
            return fatal(
                p,
                "For loop inline variable declaration is only supported in SystemVerilog mode!",
                sp,
            );
        }
        let mut ty = decl::parse_wire_type(p)?;
        let dims = parse_dims(p)?;
        let range = check_range(p, &mut ty, dims, sp)?;
        let (name, name_span) = p.eat_ident("loop variable")?;
        if p.peek(0).0 != Operator(Op::Assign) {
            return fatal(
                p,
                "For loop variable declaration is missing initialization!",
                name_span,
            );
        }
        let mut wire = ty;
        wire.name = name.clone();
        wire.span = name_span;
        if let Some(range) = range {
            wire.children.push(range);
        }
        let idx = p.state().next_autoidx();
        decl = Some((wire, idx));
        (name, name_span)
    } else {
        p.eat_ident("loop variable")?
    };
    p.require_reported(Operator(Op::Assign))?;

    let mut for_node = AstNode::new(AstKind::For, span);
    for_node.append_attributes(attrs);
    let mut for_node = nested(p, for_node, false, |p| {
        let init_value = parse_expr(p)?;
        let init_span = Span::union(name_span, p.last_span());
        let init = AstNode::binary(
            AstKind::AssignEq,
            AstNode::ident(name.clone(), name_span),
            init_value,
            init_span,
        );
        emit(p, init);
        p.require_reported(Semicolon)?;
        let cond = parse_expr(p)?;
        emit(p, cond);
        p.require_reported(Semicolon)?;
        let step = parse_simple_stmt(p, Attributes::new())?;
        emit(p, step);
        p.require_reported(CloseDelim(Paren))?;

        let body_span = p.peek(0).1;
        let body = AstNode::named(
            AstKind::Block,
            format!("$for_loop${}", p.state().next_autoidx()),
            body_span,
        );
        let mut body = nested(p, body, false, parse_stmt)?;
        body.span.expand(p.last_span());
        emit(p, body);
        Ok(())
    })?;
    for_node.span.expand(p.last_span());

    let node = match decl {
        Some((wire, idx)) => desugar::wrap_for_decl(wire, for_node, idx),
        None => for_node,
    };
    emit(p, node);
    Ok(())
}

/// Parse a `while` or `repeat` loop.
fn parse_loop(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let (tkn, span) = p.peek(0);
    p.bump();
    let kind = if tkn == Keyword(Kw::While) {
        AstKind::While
    } else {
        AstKind::Repeat
    };
    let expr = flanked(p, Paren, parse_expr)?;
    let body = parse_stmt_block(p)?;
    let mut node = AstNode::with_children(kind, vec![expr, body], span);
    node.span.expand(p.last_span());
    node.append_attributes(attrs);
    emit(p, node);
    Ok(())
}
