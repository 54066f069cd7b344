// Copyright (c) 2016-2021 Fabian Schuiki

//! Modules, interfaces, and packages, and the items that make up their
//! bodies.

use super::decl::{self, at_wire_type, check_range};
use super::expr::{parse_expr, parse_hierarchical_name, parse_lvalue, skip_delay};
use super::*;
use crate::ast::NodeFlags;
use svfront_common::util::HasDesc;

/// Parse a module or interface declaration and add it to the design.
pub fn parse_module(
    p: &mut dyn AbstractParser,
    attrs: Attributes,
    kind: AstKind,
) -> ReportedResult<()> {
    let span = p.peek(0).1;
    p.bump();
    let (name, _) = p.eat_ident(if kind == AstKind::Interface {
        "interface name"
    } else {
        "module name"
    })?;
    debug!("parsing {} `{}`", kind.desc(), name);
    p.state().reset_ports();

    let end_kw = if kind == AstKind::Interface {
        Kw::Endinterface
    } else {
        Kw::Endmodule
    };
    let mut node = AstNode::named(kind, name.clone(), span);
    node.append_attributes(attrs);
    let mut node = nested(p, node, true, |p| {
        if p.peek(0).0 == Hashtag {
            decl::parse_param_ports(p)?;
        }
        if p.peek(0).0 == OpenDelim(Paren) {
            flanked(p, Paren, |p| {
                comma_list(p, CloseDelim(Paren), "port", parse_port).map(|_| ())
            })?;
        }
        p.require_reported(Semicolon)?;
        if kind == AstKind::Interface {
            parse_items(p, &[Keyword(end_kw)], parse_interface_item);
        } else {
            parse_items(p, &[Keyword(end_kw)], parse_module_item);
        }
        p.require_reported(Keyword(end_kw))?;
        let missing = p
            .state()
            .port_stubs
            .iter()
            .next()
            .map(|(name, &(_, sp))| (name.clone(), sp));
        match missing {
            Some((port, sp)) => fatal(
                p,
                format!("Missing details for module port `{}'.", port),
                sp,
            ),
            None => Ok(()),
        }
    })?;
    node.span.expand(p.last_span());
    let label = parse_end_label(p)?;
    let element = if kind == AstKind::Interface {
        "Interface name"
    } else {
        "Module name"
    };
    check_label(p, element, Some(&name), label)?;
    debug!("closing {}", node.desc_full());
    emit(p, node);
    Ok(())
}

/// Parse one entry of the port list in a module header.
fn parse_port(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    if p.try_eat(Ellipsis) {
        p.state().do_not_require_port_stubs = true;
        return Ok(());
    }
    let attrs = parse_attributes(p)?;
    let sp = p.peek(0).1;

    if at_wire_type(p) {
        let mut ty = decl::parse_wire_type(p)?;
        let dims = super::expr::parse_dims(p)?;
        let range = check_range(p, &mut ty, dims, sp)?;
        let (name, name_span) = p.eat_ident("port name")?;
        let mut node = ty;
        node.name = name.clone();
        node.span = name_span;
        let st = p.state();
        st.port_counter += 1;
        node.port_id = st.port_counter;
        if let Some(range) = range {
            node.children.push(range);
        }
        if !node.is_input() && !node.is_output() {
            return fatal(
                p,
                format!("Module port `{}' is neither input nor output.", name),
                name_span,
            );
        }
        if node.is_reg() && node.is_input() && !node.is_output() && !p.opts().sv {
            return fatal(
                p,
                format!("Input port `{}' is declared as register.", name),
                name_span,
            );
        }
        node.append_attributes(attrs);
        emit(p, node);
        return parse_port_default(p);
    }

    // An interface port is written as a type name, optionally followed by a
    // modport, and the port name.
    let is_interface = match (p.peek(0).0, p.peek(1).0, p.peek(2).0, p.peek(3).0) {
        (Ident(_), Ident(_), _, _) => true,
        (Ident(_), Period, Ident(_), Ident(_)) => true,
        _ => false,
    };
    if is_interface {
        let (intf, intf_span) = parse_hierarchical_name(p, "interface name")?;
        let (name, name_span) = p.eat_ident("port name")?;
        if !p.opts().sv {
            return fatal(
                p,
                format!("Interface found in port list ({}). This is only supported in SystemVerilog mode.", name),
                name_span,
            );
        }
        let mut node = AstNode::with_children(
            AstKind::InterfacePort,
            vec![AstNode::named(AstKind::InterfacePortType, intf, intf_span)],
            Span::union(intf_span, name_span),
        )
        .renamed(name);
        let st = p.state();
        st.port_counter += 1;
        node.port_id = st.port_counter;
        emit(p, node);
        return parse_port_default(p);
    }

    // A bare name either continues the previous typed port or refers to a
    // declaration in the module body.
    let (name, name_span) = p.eat_ident("port name")?;
    let st = p.state();
    let prev = st
        .top_mut()
        .and_then(|m| m.children.last())
        .filter(|n| n.kind == AstKind::Wire)
        .cloned();
    match prev {
        Some(mut node) => {
            st.port_counter += 1;
            node.name = name;
            node.span = name_span;
            node.port_id = st.port_counter;
            emit(p, node);
        }
        None => {
            if st.port_stubs.contains_key(&name) {
                return fatal(p, format!("Duplicate module port `{}'.", name), name_span);
            }
            st.port_counter += 1;
            let id = st.port_counter;
            st.port_stubs.insert(name, (id, name_span));
        }
    }
    parse_port_default(p)
}

/// Parse the optional `= expr` default value after a port.
fn parse_port_default(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    if !p.try_eat(Operator(Op::Assign)) {
        return Ok(());
    }
    let sp = p.last_span();
    let value = parse_expr(p)?;
    let span = Span::union(sp, p.last_span());
    let last = p
        .state()
        .top_mut()
        .and_then(|m| m.children.last_mut())
        .filter(|n| n.kind == AstKind::Wire);
    let (name, is_var) = match last {
        Some(wire) if wire.is_input() => {
            wire.set_attribute("defaultvalue", value);
            return Ok(());
        }
        Some(wire) => (wire.name.clone(), wire.is_reg() || wire.is_logic()),
        None => {
            return fatal(
                p,
                "SystemVerilog interface in module port list cannot have a default value.",
                span,
            )
        }
    };
    let lhs = AstNode::ident(name, span);
    let init = if is_var {
        AstNode::unary(
            AstKind::Initial,
            AstNode::unary(
                AstKind::Block,
                AstNode::binary(AstKind::AssignLe, lhs, value, span),
                span,
            ),
            span,
        )
    } else {
        AstNode::binary(AstKind::Assign, lhs, value, span)
    };
    emit(p, init);
    Ok(())
}

fn is_gate_keyword(kw: Kw) -> bool {
    match kw {
        Kw::And
        | Kw::Or
        | Kw::Nand
        | Kw::Nor
        | Kw::Xor
        | Kw::Xnor
        | Kw::Not
        | Kw::Buf
        | Kw::Bufif0
        | Kw::Bufif1
        | Kw::Notif0
        | Kw::Notif1 => true,
        _ => false,
    }
}

/// Parse an item of a module body or generate region.
pub fn parse_module_item(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    match p.peek(0).0 {
        DefattrBegin => return parse_defattr(p),
        Semicolon => {
            p.bump();
            return Ok(());
        }
        _ => (),
    }
    let attrs = parse_attributes(p)?;
    let (tkn, sp) = p.peek(0);
    match tkn {
        Semicolon => {
            p.bump();
            Ok(())
        }
        Keyword(Kw::Generate) => super::generate::parse_generate_region(p),
        Keyword(Kw::For) | Keyword(Kw::If) | Keyword(Kw::Case) | OpenDelim(Bgend) => {
            super::generate::parse_gen_stmt(p)
        }
        Keyword(Kw::Specify) => super::specify::parse_specify_block(p),
        Keyword(Kw::Specparam) => super::specify::skip_specparam(p),
        Keyword(Kw::Task) | Keyword(Kw::Function) => decl::parse_subroutine(p, attrs),
        Keyword(Kw::Parameter) | Keyword(Kw::Localparam) => decl::parse_param_decl(p, attrs),
        Keyword(Kw::Defparam) => decl::parse_defparam(p),
        Keyword(Kw::Typedef) => decl::parse_typedef(p),
        Keyword(Kw::Supply0) | Keyword(Kw::Supply1) => decl::parse_supply_decl(p, attrs),
        Keyword(Kw::Enum) => decl::parse_enum_decl(p, attrs),
        Keyword(Kw::Struct) | Keyword(Kw::Union) => decl::parse_struct_decl(p, attrs),
        Keyword(Kw::Always)
        | Keyword(Kw::AlwaysComb)
        | Keyword(Kw::AlwaysFf)
        | Keyword(Kw::AlwaysLatch)
        | Keyword(Kw::Initial) => super::stmt::parse_always(p, attrs),
        Keyword(Kw::Assign) => parse_continuous_assign(p, attrs),
        Keyword(Kw::Assert) | Keyword(Kw::Assume) | Keyword(Kw::Cover) | Keyword(Kw::Restrict) => {
            super::assertion::parse_assertion(p, attrs, None)
        }
        Keyword(kw) if is_gate_keyword(kw) => super::inst::parse_primitive(p, attrs),
        Ident(_) | EscIdent(_) if p.peek(1).0 == Colon => {
            let label = p.eat_ident("label")?;
            p.require_reported(Colon)?;
            super::assertion::parse_assertion(p, attrs, Some(label))
        }
        _ if at_wire_type(p) => decl::parse_wire_decl(p, attrs),
        Ident(_) | EscIdent(_) => super::inst::parse_cell(p, attrs),
        _ => {
            p.add_diag(
                DiagBuilder2::error(format!("expected module item, found `{}`", tkn)).span(sp),
            );
            Err(())
        }
    }
}

/// Parse an item of an interface body.
fn parse_interface_item(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    match p.peek(0).0 {
        DefattrBegin => return parse_defattr(p),
        Semicolon => {
            p.bump();
            return Ok(());
        }
        _ => (),
    }
    let attrs = parse_attributes(p)?;
    let (tkn, sp) = p.peek(0);
    match tkn {
        Keyword(Kw::Parameter) | Keyword(Kw::Localparam) => decl::parse_param_decl(p, attrs),
        Keyword(Kw::Typedef) => decl::parse_typedef(p),
        Keyword(Kw::Defparam) => decl::parse_defparam(p),
        Keyword(Kw::Always)
        | Keyword(Kw::AlwaysComb)
        | Keyword(Kw::AlwaysFf)
        | Keyword(Kw::AlwaysLatch)
        | Keyword(Kw::Initial) => super::stmt::parse_always(p, attrs),
        Keyword(Kw::Assign) => parse_continuous_assign(p, attrs),
        Keyword(Kw::Modport) => parse_modport(p),
        _ if at_wire_type(p) => decl::parse_wire_decl(p, attrs),
        _ => {
            p.add_diag(
                DiagBuilder2::error(format!("expected interface item, found `{}`", tkn)).span(sp),
            );
            Err(())
        }
    }
}

/// Parse a `modport` declaration.
fn parse_modport(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    p.require_reported(Keyword(Kw::Modport))?;
    let (name, span) = p.eat_ident("modport name")?;
    let mut modport = AstNode::named(AstKind::Modport, name, span);
    let mut dir = NodeFlags::empty();
    if p.peek(0).0 == OpenDelim(Paren) {
        flanked(p, Paren, |p| {
            comma_list(p, CloseDelim(Paren), "modport member", |p| {
                let new_dir = match p.peek(0).0 {
                    Keyword(Kw::Input) => Some(NodeFlags::INPUT),
                    Keyword(Kw::Output) => Some(NodeFlags::OUTPUT),
                    Keyword(Kw::Inout) => Some(NodeFlags::INPUT | NodeFlags::OUTPUT),
                    _ => None,
                };
                if let Some(new_dir) = new_dir {
                    p.bump();
                    dir = new_dir;
                }
                let (name, span) = p.eat_ident("modport member")?;
                let mut member = AstNode::named(AstKind::ModportMember, name, span);
                member.flags |= dir;
                modport.children.push(member);
                Ok(())
            })
            .map(|_| ())
        })?;
    }
    p.require_reported(Semicolon)?;
    modport.span.expand(p.last_span());
    emit(p, modport);
    Ok(())
}

/// Parse a continuous assignment such as `assign a = b, c = d;`.
pub fn parse_continuous_assign(
    p: &mut dyn AbstractParser,
    attrs: Attributes,
) -> ReportedResult<()> {
    p.require_reported(Keyword(Kw::Assign))?;
    skip_delay(p)?;
    separated(p, |p| {
        let lhs = parse_lvalue(p)?;
        p.require_reported(Operator(Op::Assign))?;
        let rhs = parse_expr(p)?;
        let span = Span::union(lhs.span, p.last_span());
        let mut node = AstNode::binary(AstKind::Assign, lhs, rhs, span);
        node.append_attributes(attrs.clone());
        emit(p, node);
        Ok(())
    })?;
    p.require_reported(Semicolon)
}

/// Parse a package declaration and add it to the design.
pub fn parse_package(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let span = p.peek(0).1;
    p.require_reported(Keyword(Kw::Package))?;
    let (name, _) = p.eat_ident("package name")?;
    debug!("parsing package `{}`", name);
    let mut node = AstNode::named(AstKind::Package, name.clone(), span);
    node.append_attributes(attrs);
    p.state().current_package = Some(name.clone());
    let result = nested(p, node, true, |p| {
        p.require_reported(Semicolon)?;
        parse_items(p, &[Keyword(Kw::Endpackage)], parse_package_item);
        p.require_reported(Keyword(Kw::Endpackage))
    });
    p.state().current_package = None;
    let mut node = result?;
    node.span.expand(p.last_span());
    let label = parse_end_label(p)?;
    check_label(p, "Package name", Some(&name), label)?;
    emit(p, node);
    Ok(())
}

fn parse_package_item(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    if p.try_eat(Semicolon) {
        return Ok(());
    }
    let attrs = parse_attributes(p)?;
    let (tkn, sp) = p.peek(0);
    match tkn {
        Keyword(Kw::Typedef) => decl::parse_typedef(p),
        Keyword(Kw::Parameter) | Keyword(Kw::Localparam) => decl::parse_param_decl(p, attrs),
        Keyword(Kw::Task) | Keyword(Kw::Function) => decl::parse_subroutine(p, attrs),
        _ => {
            p.add_diag(
                DiagBuilder2::error(format!("expected package item, found `{}`", tkn)).span(sp),
            );
            Err(())
        }
    }
}
