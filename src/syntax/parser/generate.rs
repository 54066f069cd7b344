// Copyright (c) 2016-2021 Fabian Schuiki

//! Generate constructs: `generate` regions, generate loops, conditionals,
//! case statements, and blocks.

use super::expr::parse_expr;
use super::module::parse_module_item;
use super::stmt::parse_simple_stmt;
use super::*;
use crate::ast::NodeFlags;
use crate::const2ast::CaseType;
use crate::desugar;

/// Parse a `generate ... endgenerate` region. Its items are added directly
/// to the enclosing container.
pub fn parse_generate_region(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    p.require_reported(Keyword(Kw::Generate))?;
    parse_items(p, &[Keyword(Kw::Endgenerate)], parse_module_item);
    p.require_reported(Keyword(Kw::Endgenerate))
}

/// Parse a generate loop, conditional, case, or block.
pub fn parse_gen_stmt(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    let node = deeper(p, |p| match p.peek(0).0 {
        Keyword(Kw::For) => parse_gen_for(p),
        Keyword(Kw::If) => parse_gen_if(p),
        Keyword(Kw::Case) | Keyword(Kw::Casex) | Keyword(Kw::Casez) => parse_gen_case(p),
        _ => parse_gen_block(p),
    })?;
    emit(p, node);
    Ok(())
}

/// Parse a `begin ... end` generate block.
fn parse_gen_block(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let span = p.peek(0).1;
    p.require_reported(OpenDelim(Bgend))?;
    let label = parse_end_label(p)?;
    let mut block = AstNode::new(AstKind::GenBlock, span);
    if let Some((ref name, _)) = label {
        block.name = name.clone();
    }
    let mut block = nested(p, block, true, |p| {
        parse_items(p, &[CloseDelim(Bgend)], parse_module_item);
        p.require_reported(CloseDelim(Bgend))
    })?;
    block.span.expand(p.last_span());
    let end_label = parse_end_label(p)?;
    let name = label.map(|(n, _)| n);
    check_label(p, "Begin label", name.as_ref().map(String::as_str), end_label)?;
    Ok(block)
}

/// Parse the body of a generate construct. Anything but a `begin ... end`
/// block is wrapped in an unnamed generate block.
fn parse_gen_stmt_block(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    if p.peek(0).0 == OpenDelim(Bgend) {
        return parse_gen_block(p);
    }
    let span = p.peek(0).1;
    let mut block = nested(p, AstNode::new(AstKind::GenBlock, span), false, parse_module_item)?;
    block.span.expand(p.last_span());
    Ok(block)
}

/// Parse a generate `for` loop.
///
/// A genvar declared inline is renamed and hoisted into the enclosing
/// module.
fn parse_gen_for(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let span = p.peek(0).1;
    p.require_reported(Keyword(Kw::For))?;
    p.require_reported(OpenDelim(Paren))?;

    let mut node = nested(p, AstNode::new(AstKind::GenFor, span), false, |p| {
        let declared = p.try_eat(Keyword(Kw::Genvar));
        let (name, name_span) = p.eat_ident("genvar name")?;
        if declared {
            if p.peek(0).0 != Operator(Op::Assign) {
                return fatal(
                    p,
                    "Generate for loop variable declaration is missing initialization!",
                    name_span,
                );
            }
            if !p.opts().sv {
                return fatal(
                    p,
                    "Generate for loop inline variable declaration is only supported in SystemVerilog mode!",
                    name_span,
                );
            }
            let mut genvar = AstNode::named(AstKind::Genvar, name.clone(), name_span);
            genvar.flags |= NodeFlags::REG | NodeFlags::SIGNED;
            genvar
                .children
                .push(AstNode::make_range(31, 0, false, name_span));
            emit(p, genvar);
        }
        p.require_reported(Operator(Op::Assign))?;
        let value = parse_expr(p)?;
        let init_span = Span::union(name_span, p.last_span());
        let init = AstNode::binary(
            AstKind::AssignEq,
            AstNode::ident(name, name_span),
            value,
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
        let body = parse_gen_stmt_block(p)?;
        emit(p, body);
        Ok(())
    })?;
    node.span.expand(p.last_span());

    let has_decl = node
        .children
        .first()
        .map(|c| c.kind == AstKind::Genvar)
        .unwrap_or(false);
    if has_decl {
        let idx = p.state().next_autoidx();
        if let Some(decl) = desugar::rewrite_genfor_decl(&mut node, idx) {
            match p.state().current_module_mut() {
                Some(module) => module.children.push(decl),
                None => emit(p, decl),
            }
        }
    }
    Ok(node)
}

/// Parse a generate `if`, with an optional `else` branch.
fn parse_gen_if(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let span = p.peek(0).1;
    p.require_reported(Keyword(Kw::If))?;
    let cond = flanked(p, Paren, parse_expr)?;
    let then_block = parse_gen_stmt_block(p)?;
    let mut node = AstNode::with_children(AstKind::GenIf, vec![cond, then_block], span);
    if p.try_eat(Keyword(Kw::Else)) {
        node.children.push(parse_gen_stmt_block(p)?);
    }
    node.span.expand(p.last_span());
    Ok(node)
}

/// Parse a generate `case`.
fn parse_gen_case(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let (tkn, span) = p.peek(0);
    p.bump();
    let (case_type, item_kind) = match tkn {
        Keyword(Kw::Casex) => (CaseType::CaseX, AstKind::CondX),
        Keyword(Kw::Casez) => (CaseType::CaseZ, AstKind::CondZ),
        _ => (CaseType::Normal, AstKind::Cond),
    };
    p.state().case_types.push(case_type);
    let result = parse_gen_case_inner(p, span, item_kind);
    p.state().case_types.pop();
    result
}

fn parse_gen_case_inner(
    p: &mut dyn AbstractParser,
    span: Span,
    item_kind: AstKind,
) -> ReportedResult<AstNode> {
    let selector = flanked(p, Paren, parse_expr)?;
    let mut node = AstNode::with_children(AstKind::GenCase, vec![selector], span);
    while !p.is_fatal() && p.peek(0).0 != Keyword(Kw::Endcase) && p.peek(0).0 != Eof {
        let item_span = p.peek(0).1;
        let mut item = AstNode::new(item_kind, item_span);
        if p.try_eat(Keyword(Kw::Default)) {
            item.children.push(AstNode::new(AstKind::Default, item_span));
            p.try_eat(Colon);
        } else {
            separated(p, |p| {
                item.children.push(parse_expr(p)?);
                Ok(())
            })?;
            p.require_reported(Colon)?;
        }
        p.state().case_types.push(CaseType::Normal);
        let body = parse_gen_stmt_block(p);
        p.state().case_types.pop();
        item.children.push(body?);
        item.span.expand(p.last_span());
        node.children.push(item);
    }
    p.require_reported(Keyword(Kw::Endcase))?;
    node.span.expand(p.last_span());
    Ok(node)
}
