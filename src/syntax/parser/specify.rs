// Copyright (c) 2016-2021 Fabian Schuiki

//! Specify blocks.
//!
//! Path delays and timing checks are turned into cells of the internal types
//! `$specify2`, `$specify3`, and `$specrule`, which carry the timing values
//! as parameters. Unless enabled in the options, specify blocks are skipped.

use super::expr::parse_expr;
use super::*;
use crate::builtin::Builtin;

/// A `min:typ:max` delay triple.
#[derive(Clone)]
struct Triple {
    min: AstNode,
    typ: AstNode,
    max: AstNode,
}

/// The edge a path or timing check is sensitive to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Edge {
    None,
    Pos,
    Neg,
}

/// Parse a `specify ... endspecify` block.
pub fn parse_specify_block(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    p.require_reported(Keyword(Kw::Specify))?;
    if !p.opts().specify {
        trace!("skipping specify block");
        p.recover_balanced(&[Keyword(Kw::Endspecify)], true);
        return Ok(());
    }
    parse_items(p, &[Keyword(Kw::Endspecify)], parse_specify_item);
    p.require_reported(Keyword(Kw::Endspecify))
}

/// Skip a `specparam` declaration.
pub fn skip_specparam(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    p.require_reported(Keyword(Kw::Specparam))?;
    p.recover_balanced(&[Semicolon], true);
    Ok(())
}

fn parse_specify_item(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    let (tkn, sp) = p.peek(0);
    match tkn {
        Semicolon => {
            p.bump();
            Ok(())
        }
        Keyword(Kw::Specparam) => skip_specparam(p),
        Keyword(Kw::Ifnone) => {
            p.bump();
            p.recover_balanced(&[Semicolon], true);
            Ok(())
        }
        Keyword(Kw::If) => {
            p.bump();
            let cond = flanked(p, Paren, parse_expr)?;
            parse_path(p, Some(cond), sp)
        }
        OpenDelim(Paren) => parse_path(p, None, sp),
        SysIdent(name) => {
            p.bump();
            parse_timing_check(p, &format!("${}", name), sp)
        }
        _ => {
            p.add_diag(
                DiagBuilder2::error(format!("expected specify item, found `{}`", tkn)).span(sp),
            );
            Err(())
        }
    }
}

fn parse_edge(p: &mut dyn AbstractParser) -> Edge {
    if p.try_eat(Keyword(Kw::Posedge)) {
        Edge::Pos
    } else if p.try_eat(Keyword(Kw::Negedge)) {
        Edge::Neg
    } else {
        Edge::None
    }
}

fn parse_triple(p: &mut dyn AbstractParser) -> ReportedResult<Triple> {
    let min = parse_expr(p)?;
    if !p.try_eat(Colon) {
        return Ok(Triple {
            typ: min.clone(),
            max: min.clone(),
            min,
        });
    }
    let typ = parse_expr(p)?;
    p.require_reported(Colon)?;
    let max = parse_expr(p)?;
    Ok(Triple { min, typ, max })
}

/// Parse the delay of a path: one triple, or a parenthesized list of 1, 2,
/// 3, 6, or 12 triples. Only the rise and fall delays are kept.
fn parse_rise_fall(p: &mut dyn AbstractParser) -> ReportedResult<(Triple, Triple)> {
    if p.peek(0).0 != OpenDelim(Paren) {
        let rise = parse_triple(p)?;
        return Ok((rise.clone(), rise));
    }
    let sp = p.peek(0).1;
    let mut triples = flanked(p, Paren, |p| {
        comma_list_nonempty(p, CloseDelim(Paren), "delay", parse_triple)
    })?;
    let span = Span::union(sp, p.last_span());
    match triples.len() {
        1 | 2 => (),
        3 | 6 | 12 => {
            p.add_diag(
                DiagBuilder2::warning(
                    "Path delay expressions beyond rise/fall not currently supported. Ignoring.",
                )
                .span(span)
                .add_note("only the first two delay values are kept"),
            );
        }
        n => {
            p.add_diag(
                DiagBuilder2::error(format!(
                    "expected 1, 2, 3, 6, or 12 path delay values, found {}",
                    n
                ))
                .span(span),
            );
            return Err(());
        }
    }
    triples.truncate(2);
    let rise = triples.remove(0);
    let fall = triples.pop().unwrap_or_else(|| rise.clone());
    Ok((rise, fall))
}

fn paraset(name: &str, value: AstNode) -> AstNode {
    let span = value.span;
    AstNode::with_children(AstKind::Paraset, vec![value], span).renamed(name)
}

fn argument(name: &str, value: AstNode) -> AstNode {
    let span = value.span;
    AstNode::with_children(AstKind::Argument, vec![value], span).renamed(name)
}

fn flag(value: bool, span: Span) -> AstNode {
    AstNode::mkconst_int(value as i64, false, 1, span)
}

fn new_specify_cell(p: &mut dyn AbstractParser, cell_type: &str, span: Span) -> AstNode {
    let name = format!("$specify${}", p.state().next_autoidx());
    AstNode::with_children(
        AstKind::Cell,
        vec![AstNode::named(AstKind::CellType, cell_type, span)],
        span,
    )
    .renamed(name)
}

/// Parse a path declaration such as `(posedge clk => (q : d)) = (1, 2);`.
fn parse_path(p: &mut dyn AbstractParser, cond: Option<AstNode>, span: Span) -> ReportedResult<()> {
    let (edge, src, full, polarity, dst, dat) = flanked(p, Paren, |p| {
        let edge = parse_edge(p);
        let src = parse_expr(p)?;
        let (full, polarity) = match p.peek(0) {
            (PathConn { full, polarity }, _) => {
                p.bump();
                (full, polarity)
            }
            (tkn, sp) => {
                p.add_diag(
                    DiagBuilder2::error(format!("expected `=>` or `*>`, found `{}`", tkn))
                        .span(sp),
                );
                return Err(());
            }
        };
        let (dst, dat) = parse_path_target(p)?;
        Ok((edge, src, full, polarity, dst, dat))
    })?;
    p.require_reported(Operator(Op::Assign))?;
    let (rise, fall) = parse_rise_fall(p)?;
    p.require_reported(Semicolon)?;
    let span = Span::union(span, p.last_span());

    if edge != Edge::None && dat.is_none() {
        return fatal(p, "Found specify edge but no data spec.", span);
    }

    let cell_type = if dat.is_some() { "$specify3" } else { "$specify2" };
    let mut cell = new_specify_cell(p, cell_type, span);
    let c = &mut cell.children;
    c.push(paraset("FULL", flag(full, span)));
    c.push(paraset("SRC_DST_PEN", flag(polarity.is_some(), span)));
    c.push(paraset("SRC_DST_POL", flag(polarity == Some('+'), span)));
    c.push(paraset("T_RISE_MIN", rise.min));
    c.push(paraset("T_RISE_TYP", rise.typ));
    c.push(paraset("T_RISE_MAX", rise.max));
    c.push(paraset("T_FALL_MIN", fall.min));
    c.push(paraset("T_FALL_TYP", fall.typ));
    c.push(paraset("T_FALL_MAX", fall.max));
    c.push(argument("EN", cond.unwrap_or_else(|| flag(true, span))));
    c.push(argument("SRC", src));
    c.push(argument("DST", dst));
    if let Some((dat, dat_polarity)) = dat {
        c.push(paraset("EDGE_EN", flag(edge != Edge::None, span)));
        c.push(paraset("EDGE_POL", flag(edge == Edge::Pos, span)));
        c.push(paraset("DAT_DST_PEN", flag(dat_polarity.is_some(), span)));
        c.push(paraset("DAT_DST_POL", flag(dat_polarity == Some('+'), span)));
        c.push(argument("DAT", dat));
    }
    emit(p, cell);
    Ok(())
}

/// Parse the target of a path: either a plain expression or a
/// parenthesized `dst : data`, `dst +: data`, or `dst -: data`.
fn parse_path_target(
    p: &mut dyn AbstractParser,
) -> ReportedResult<(AstNode, Option<(AstNode, Option<char>)>)> {
    if p.peek(0).0 != OpenDelim(Paren) {
        return Ok((parse_expr(p)?, None));
    }
    flanked(p, Paren, |p| {
        let dst = parse_expr(p)?;
        let polarity = match p.peek(0).0 {
            Colon => None,
            AddColon => Some('+'),
            SubColon => Some('-'),
            _ => return Ok((dst, None)),
        };
        p.bump();
        let dat = parse_expr(p)?;
        Ok((dst, Some((dat, polarity))))
    })
}

/// Parse one of the `edge signal [&&& condition]` operands of a timing
/// check.
fn parse_check_operand(p: &mut dyn AbstractParser) -> ReportedResult<(Edge, AstNode, AstNode)> {
    let edge = parse_edge(p);
    let signal = parse_expr(p)?;
    let en = if p.try_eat(TripleAnd) {
        parse_expr(p)?
    } else {
        flag(true, signal.span)
    };
    Ok((edge, signal, en))
}

/// Parse a timing check such as `$setup(d, posedge clk, 1);`.
fn parse_timing_check(p: &mut dyn AbstractParser, name: &str, span: Span) -> ReportedResult<()> {
    let supported = Builtin::from_name(name)
        .map(|b| b.is_timing_check())
        .unwrap_or(false);
    if !supported {
        return fatal(p, format!("Unsupported specify rule type: {}", name), span);
    }
    let (src, dst, limit, limit2) = flanked(p, Paren, |p| {
        let src = parse_check_operand(p)?;
        p.require_reported(Comma)?;
        let dst = parse_check_operand(p)?;
        p.require_reported(Comma)?;
        let limit = parse_triple(p)?;
        let limit2 = if p.try_eat(Comma) {
            Some(parse_triple(p)?)
        } else {
            None
        };
        Ok((src, dst, limit, limit2))
    })?;
    p.require_reported(Semicolon)?;
    let span = Span::union(span, p.last_span());

    let limit2 = limit2.unwrap_or_else(|| {
        let zero = AstNode::mkconst_int(0, true, 32, span);
        Triple {
            min: zero.clone(),
            typ: zero.clone(),
            max: zero,
        }
    });
    let (src_edge, src, src_en) = src;
    let (dst_edge, dst, dst_en) = dst;

    let mut cell = new_specify_cell(p, "$specrule", span);
    let c = &mut cell.children;
    c.push(paraset("TYPE", AstNode::mkconst_str(name, span)));
    c.push(paraset("T_LIMIT_MIN", limit.min));
    c.push(paraset("T_LIMIT_TYP", limit.typ));
    c.push(paraset("T_LIMIT_MAX", limit.max));
    c.push(paraset("T_LIMIT2_MIN", limit2.min));
    c.push(paraset("T_LIMIT2_TYP", limit2.typ));
    c.push(paraset("T_LIMIT2_MAX", limit2.max));
    c.push(paraset("SRC_PEN", flag(src_edge != Edge::None, span)));
    c.push(paraset("SRC_POL", flag(src_edge == Edge::Pos, span)));
    c.push(paraset("DST_PEN", flag(dst_edge != Edge::None, span)));
    c.push(paraset("DST_POL", flag(dst_edge == Edge::Pos, span)));
    c.push(argument("SRC_EN", src_en));
    c.push(argument("SRC", src));
    c.push(argument("DST_EN", dst_en));
    c.push(argument("DST", dst));
    emit(p, cell);
    Ok(())
}
