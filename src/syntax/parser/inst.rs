// Copyright (c) 2016-2021 Fabian Schuiki

//! Module instances and gate primitives.

use super::expr::{parse_expr, parse_range_opt, skip_delay};
use super::*;

/// Parse a module instantiation such as `foo #(.W(8)) u0 (.a(x)), u1 (y);`.
pub fn parse_cell(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let (ty, ty_span) = p.eat_ident("module name")?;
    let mut proto = AstNode::with_children(
        AstKind::Cell,
        vec![AstNode::named(AstKind::CellType, ty, ty_span)],
        ty_span,
    );
    proto.append_attributes(attrs);
    if p.try_eat(Hashtag) {
        flanked(p, Paren, |p| parse_parameter_list(p, &mut proto))?;
    }
    separated(p, |p| parse_instance(p, &proto))?;
    p.require_reported(Semicolon)
}

/// Parse a gate primitive such as `and g0 (y, a, b);`. Instance names are
/// accepted but not kept.
pub fn parse_primitive(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let (tkn, span) = p.peek(0);
    let gate = match tkn {
        Keyword(kw) => kw.as_str(),
        _ => {
            p.add_diag(DiagBuilder2::bug(format!("`{}` is not a primitive", tkn)).span(span));
            return Err(());
        }
    };
    p.bump();
    skip_delay(p)?;
    let mut proto = AstNode::named(AstKind::Primitive, gate, span);
    proto.append_attributes(attrs);
    separated(p, |p| parse_instance(p, &proto))?;
    p.require_reported(Semicolon)
}

/// Parse the entries of a `#(...)` parameter value list.
fn parse_parameter_list(p: &mut dyn AbstractParser, cell: &mut AstNode) -> ReportedResult<()> {
    loop {
        let (tkn, sp) = p.peek(0);
        match tkn {
            Comma | CloseDelim(Paren) => (),
            Period => {
                p.bump();
                let (name, _) = p.eat_ident("parameter name")?;
                let value = flanked(p, Paren, |p| {
                    if p.peek(0).0 == CloseDelim(Paren) {
                        Ok(None)
                    } else {
                        parse_expr(p).map(Some)
                    }
                })?;
                if let Some(value) = value {
                    let span = Span::union(sp, p.last_span());
                    let node = AstNode::with_children(AstKind::Paraset, vec![value], span)
                        .renamed(name);
                    cell.children.push(node);
                }
            }
            _ => {
                let value = parse_expr(p)?;
                let span = value.span;
                cell.children
                    .push(AstNode::with_children(AstKind::Paraset, vec![value], span));
            }
        }
        if !p.try_eat(Comma) {
            return Ok(());
        }
    }
}

/// Parse a single instance of a module or primitive, with its optional name,
/// array range, and port connections.
fn parse_instance(p: &mut dyn AbstractParser, proto: &AstNode) -> ReportedResult<()> {
    let mut cell = proto.clone();
    let mut range = None;
    if p.is_ident() {
        let (name, span) = p.eat_ident("instance name")?;
        if cell.kind != AstKind::Primitive {
            cell.name = name;
        }
        cell.span = span;
        range = parse_range_opt(p)?;
    } else if cell.kind != AstKind::Primitive {
        let (tkn, sp) = p.peek(0);
        p.add_diag(
            DiagBuilder2::error(format!("expected instance name, found `{}`", tkn)).span(sp),
        );
        return Err(());
    }
    flanked(p, Paren, |p| parse_port_connections(p, &mut cell))?;
    cell.span.expand(p.last_span());
    check_port_connections(p, &mut cell)?;
    let node = match range {
        Some(range) => {
            let span = cell.span;
            AstNode::binary(AstKind::CellArray, range, cell, span)
        }
        None => cell,
    };
    emit(p, node);
    Ok(())
}

/// Parse the port connections of an instance into argument nodes.
fn parse_port_connections(p: &mut dyn AbstractParser, cell: &mut AstNode) -> ReportedResult<()> {
    loop {
        // Attributes on port connections are accepted and dropped.
        parse_attributes(p)?;
        let (tkn, sp) = p.peek(0);
        match tkn {
            Comma | CloseDelim(Paren) => {
                cell.children.push(AstNode::new(AstKind::Argument, sp));
            }
            WildcardConn => {
                p.bump();
                if !p.opts().sv {
                    return fatal(
                        p,
                        "Wildcard port connections are only supported in SystemVerilog mode.",
                        sp,
                    );
                }
                cell.set_bool_attribute("wildcard_port_conns");
            }
            Period => {
                p.bump();
                let (name, name_span) = p.eat_ident("port name")?;
                let mut arg = AstNode::named(AstKind::Argument, name.clone(), sp);
                if p.peek(0).0 == OpenDelim(Paren) {
                    let value = flanked(p, Paren, |p| {
                        if p.peek(0).0 == CloseDelim(Paren) {
                            Ok(None)
                        } else {
                            parse_expr(p).map(Some)
                        }
                    })?;
                    arg.children.extend(value);
                } else {
                    arg.children.push(AstNode::ident(name, name_span));
                }
                arg.span.expand(p.last_span());
                cell.children.push(arg);
            }
            _ => {
                let value = parse_expr(p)?;
                let span = value.span;
                cell.children
                    .push(AstNode::with_children(AstKind::Argument, vec![value], span));
            }
        }
        if !p.try_eat(Comma) {
            return Ok(());
        }
    }
}

/// Strip trailing empty connections and reject instances that mix
/// positional and named connections.
fn check_port_connections(p: &mut dyn AbstractParser, cell: &mut AstNode) -> ReportedResult<()> {
    while let Some(last) = cell.children.last() {
        if last.kind != AstKind::Argument || !last.children.is_empty() || !last.name.is_empty() {
            break;
        }
        cell.children.pop();
    }
    let args = cell.children.iter().filter(|c| c.kind == AstKind::Argument);
    let positional = args.clone().any(|c| c.name.is_empty());
    let named = args.clone().any(|c| !c.name.is_empty());
    if positional && named {
        return fatal(p, "Mix of positional and named cell ports.", cell.span);
    }
    Ok(())
}
