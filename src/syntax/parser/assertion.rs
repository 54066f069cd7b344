// Copyright (c) 2016-2021 Fabian Schuiki

//! Immediate and concurrent assertions: `assert`, `assume`, `cover`, and
//! `restrict`.

use super::expr::parse_expr;
use super::*;

/// Parse an assertion, optionally preceded by a `label:` that has already
/// been consumed.
///
/// The options may discard assertions or swap asserts and assumes; a
/// discarded assertion is still parsed in full.
pub fn parse_assertion(
    p: &mut dyn AbstractParser,
    attrs: Attributes,
    label: Option<(String, Span)>,
) -> ReportedResult<()> {
    let (tkn, sp) = p.peek(0);
    match tkn {
        Keyword(Kw::Assert) | Keyword(Kw::Assume) | Keyword(Kw::Cover) | Keyword(Kw::Restrict) => {}
        _ => {
            let name = label.as_ref().map(|(n, _)| n.as_str()).unwrap_or("");
            p.add_diag(
                DiagBuilder2::error(format!(
                    "expected assertion after label `{}`, found `{}`",
                    name, tkn
                ))
                .span(sp),
            );
            return Err(());
        }
    }
    let span = label.as_ref().map(|&(_, sp)| sp).unwrap_or(sp);
    p.bump();
    let has_property = p.try_eat(Keyword(Kw::Property));
    if !has_property {
        p.try_eat(Keyword(Kw::Final));
    }

    // `cover;` and `cover()` cover any cycle.
    let (eventually, expr) = if tkn == Keyword(Kw::Cover) && p.peek(0).0 == Semicolon {
        (false, AstNode::mkconst_int(1, false, 32, sp))
    } else {
        flanked(p, Paren, |p| {
            if tkn == Keyword(Kw::Cover) && p.peek(0).0 == CloseDelim(Paren) {
                return Ok((false, AstNode::mkconst_int(1, false, 32, sp)));
            }
            let eventually = tkn != Keyword(Kw::Cover) && p.try_eat(Keyword(Kw::Eventually));
            Ok((eventually, parse_expr(p)?))
        })?
    };
    p.require_reported(Semicolon)?;
    let span = Span::union(span, p.last_span());

    let opts = p.opts().clone();
    let kind = match tkn {
        Keyword(Kw::Assert) => {
            if opts.noassert {
                None
            } else if eventually {
                Some(if opts.assume_asserts {
                    AstKind::Fair
                } else {
                    AstKind::Live
                })
            } else {
                Some(if opts.assume_asserts {
                    AstKind::Assume
                } else {
                    AstKind::Assert
                })
            }
        }
        Keyword(Kw::Assume) => {
            if opts.noassume {
                None
            } else if eventually {
                Some(if opts.assert_assumes {
                    AstKind::Live
                } else {
                    AstKind::Fair
                })
            } else {
                Some(if opts.assert_assumes {
                    AstKind::Assert
                } else {
                    AstKind::Assume
                })
            }
        }
        Keyword(Kw::Restrict) => {
            if !has_property {
                p.add_diag(
                    DiagBuilder2::warning(
                        "SystemVerilog does not allow \"restrict\" without \"property\".",
                    )
                    .span(span),
                );
            }
            if opts.norestrict {
                None
            } else if eventually {
                Some(AstKind::Fair)
            } else {
                Some(AstKind::Assume)
            }
        }
        _ => Some(AstKind::Cover),
    };

    match kind {
        Some(kind) => {
            let mut node = AstNode::unary(kind, expr, span);
            if let Some((name, _)) = label {
                node.name = name;
            }
            node.append_attributes(attrs);
            emit(p, node);
        }
        None => trace!("dropping {} at {:?}", tkn, span),
    }
    Ok(())
}
