// Copyright (c) 2016-2021 Fabian Schuiki

//! Declarations: nets and variables, parameters, typedefs, enums, structs,
//! tasks, and functions.
//!
//! A declaration list such as `wire [3:0] a, b;` is parsed by first building
//! a prototype node for the type, which is then cloned for every declared
//! name. The prototype itself never enters the tree.

use super::expr::{parse_dims, parse_expr, parse_hierarchical_name, parse_range_opt, skip_delay};
use super::*;
use crate::ast::NodeFlags;
use crate::desugar;
use crate::state::Attributes;

/// The width of the integer atom types.
fn integer_atom_width(kw: Kw) -> Option<i32> {
    match kw {
        Kw::Integer | Kw::Int => Some(32),
        Kw::Shortint => Some(16),
        Kw::Longint => Some(64),
        Kw::Byte => Some(8),
        _ => None,
    }
}

fn is_wire_type_keyword(kw: Kw) -> bool {
    match kw {
        Kw::Input
        | Kw::Output
        | Kw::Inout
        | Kw::Wire
        | Kw::Tri
        | Kw::Wor
        | Kw::Wand
        | Kw::Reg
        | Kw::Logic
        | Kw::Bit
        | Kw::Var
        | Kw::Signed
        | Kw::Unsigned
        | Kw::Const
        | Kw::Genvar => true,
        kw => integer_atom_width(kw).is_some(),
    }
}

/// Check whether a net or variable declaration starts at the current token.
pub fn at_wire_type(p: &mut dyn AbstractParser) -> bool {
    match p.peek(0).0 {
        Keyword(kw) => is_wire_type_keyword(kw),
        Ident(_) | EscIdent(_) => peek_type_name(p).is_some(),
        _ => false,
    }
}

/// Consume a user-defined type name spanning `len` tokens and attach it to
/// `node` as its type.
fn take_user_type(p: &mut dyn AbstractParser, node: &mut AstNode, name: String, len: usize) {
    let sp = p.peek(0).1;
    for _ in 0..len {
        p.bump();
    }
    let span = Span::union(sp, p.last_span());
    node.flags |= NodeFlags::CUSTOM_TYPE;
    node.children.push(AstNode::named(AstKind::WireType, name, span));
}

/// Parse an optional `signed` or `unsigned` qualifier.
fn parse_signing(p: &mut dyn AbstractParser, node: &mut AstNode) {
    if p.try_eat(Keyword(Kw::Signed)) {
        node.flags.insert(NodeFlags::SIGNED);
    } else if p.try_eat(Keyword(Kw::Unsigned)) {
        node.flags.remove(NodeFlags::SIGNED);
    }
}

/// Parse the keywords and user type making up the type of a net or variable
/// into a prototype declaration.
pub fn parse_wire_type(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let (_, span) = p.peek(0);
    let mut node = AstNode::new(AstKind::Wire, span);
    let mut seen = false;
    let mut has_base = false;
    loop {
        let kw = match p.peek(0).0 {
            Keyword(kw) if is_wire_type_keyword(kw) => kw,
            Ident(_) | EscIdent(_) if !has_base => match peek_type_name(p) {
                Some((name, len)) => {
                    take_user_type(p, &mut node, name, len);
                    seen = true;
                    has_base = true;
                    continue;
                }
                None => break,
            },
            _ => break,
        };
        p.bump();
        seen = true;
        match kw {
            Kw::Input => node.flags |= NodeFlags::INPUT,
            Kw::Output => node.flags |= NodeFlags::OUTPUT,
            Kw::Inout => node.flags |= NodeFlags::INPUT | NodeFlags::OUTPUT,
            Kw::Wor => node.flags |= NodeFlags::WOR,
            Kw::Wand => node.flags |= NodeFlags::WAND,
            Kw::Reg => {
                node.flags |= NodeFlags::REG;
                has_base = true;
            }
            Kw::Logic | Kw::Bit | Kw::Var => {
                node.flags |= NodeFlags::LOGIC;
                has_base = true;
            }
            Kw::Signed => node.flags.insert(NodeFlags::SIGNED),
            Kw::Unsigned => node.flags.remove(NodeFlags::SIGNED),
            Kw::Genvar => {
                node.kind = AstKind::Genvar;
                node.flags |= NodeFlags::REG | NodeFlags::SIGNED;
                node.range = Some((31, 0));
                has_base = true;
            }
            kw => {
                if let Some(width) = integer_atom_width(kw) {
                    node.flags |= NodeFlags::REG | NodeFlags::SIGNED;
                    node.range = Some((width - 1, 0));
                    has_base = true;
                }
            }
        }
    }
    if !seen {
        let (tkn, sp) = p.peek(0);
        p.add_diag(DiagBuilder2::error(format!("expected data type, found `{}`", tkn)).span(sp));
        return Err(());
    }
    node.span.expand(p.last_span());
    Ok(node)
}

/// Validate the packed dimension of a declaration, and produce the range
/// implied by an integer or genvar type. The implied range is taken out of
/// `ty`, so declarations cloned from it only carry the range child.
pub fn check_range(
    p: &mut dyn AbstractParser,
    ty: &mut AstNode,
    range: Option<AstNode>,
    span: Span,
) -> ReportedResult<Option<AstNode>> {
    let range = match ty.range.take() {
        Some((left, right)) => {
            if range.is_some() {
                return fatal(p, "integer/genvar types cannot have packed dimensions.", span);
            }
            Some(AstNode::make_range(left, right, false, span))
        }
        None => range,
    };
    if let Some(ref r) = range {
        if r.children.len() != 2 {
            return fatal(
                p,
                "wire/reg/logic packed dimension must be of the form: [<expr>:<expr>], [<expr>+:<expr>], or [<expr>-:<expr>]",
                r.span,
            );
        }
    }
    Ok(range)
}

/// Parse one declared name of a net or variable declaration and emit the
/// declaration, together with the logic implementing its initializer.
pub fn declare_name(
    p: &mut dyn AbstractParser,
    proto: &AstNode,
    range: Option<&AstNode>,
    attrs: &Attributes,
) -> ReportedResult<()> {
    let (name, span) = p.eat_ident("declaration name")?;
    let mut node = proto.clone();
    node.name = name.clone();
    node.span = span;
    node.append_attributes(attrs.clone());
    if let Some(range) = range {
        node.children.push(range.clone());
    }
    if let Some(dims) = parse_dims(p)? {
        if node.is_input() || node.is_output() {
            return fatal(
                p,
                "input/output/inout ports cannot have unpacked dimensions.",
                dims.span,
            );
        }
        if range.is_none() && !node.is_custom_type() {
            node.children.push(AstNode::make_range(0, 0, false, span));
        }
        desugar::rewrite_as_memory(&mut node, dims);
    }
    assign_port_id(p, &mut node, span)?;

    let extra = if p.try_eat(Operator(Op::Assign)) {
        let value = parse_expr(p)?;
        let assign_span = Span::union(span, p.last_span());
        desugar::decl_assignment(&mut node, value, assign_span)
    } else {
        desugar::formal_wire_assign(&node)
    };
    emit(p, node);
    if let Some(extra) = extra {
        emit(p, extra);
    }
    Ok(())
}

/// Give a declaration its port position, reconciling it with the port list
/// of the module header.
fn assign_port_id(p: &mut dyn AbstractParser, node: &mut AstNode, span: Span) -> ReportedResult<()> {
    let is_port = node.is_input() || node.is_output();
    if p.state().in_function_or_task {
        if is_port {
            let st = p.state();
            node.port_id = st.function_port_id;
            st.function_port_id += 1;
        }
        return Ok(());
    }
    if p.state().top_kind() == AstKind::GenBlock {
        if is_port {
            return fatal(
                p,
                format!(
                    "Cannot declare module port `{}' within a generate block.",
                    node.name
                ),
                span,
            );
        }
        return Ok(());
    }

    let st = p.state();
    if st.do_not_require_port_stubs && is_port && !st.port_stubs.contains_key(&node.name) {
        st.port_counter += 1;
        let id = st.port_counter;
        st.port_stubs.insert(node.name.clone(), (id, span));
    }
    let stub = st.port_stubs.get(&node.name).map(|&(id, _)| id);
    match stub {
        Some(id) => {
            if !is_port {
                return fatal(
                    p,
                    format!("Module port `{}' is neither input nor output.", node.name),
                    span,
                );
            }
            if node.is_reg() && node.is_input() && !node.is_output() && !p.opts().sv {
                return fatal(
                    p,
                    format!("Input port `{}' is declared as register.", node.name),
                    span,
                );
            }
            node.port_id = id;
            p.state().port_stubs.remove(&node.name);
            Ok(())
        }
        None if is_port => fatal(
            p,
            format!(
                "Module port `{}' is not declared in module header.",
                node.name
            ),
            span,
        ),
        None => Ok(()),
    }
}

/// Parse a net or variable declaration such as `wire [3:0] a, b = c;`.
pub fn parse_wire_decl(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let span = p.peek(0).1;
    let mut proto = parse_wire_type(p)?;
    let dims = parse_dims(p)?;
    let range = check_range(p, &mut proto, dims, span)?;
    skip_delay(p)?;
    separated(p, |p| declare_name(p, &proto, range.as_ref(), &attrs))?;
    p.require_reported(Semicolon)
}

/// Parse a `supply0` or `supply1` declaration, which declares wires tied to
/// a constant.
pub fn parse_supply_decl(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let value = if p.try_eat(Keyword(Kw::Supply1)) {
        1
    } else {
        p.require_reported(Keyword(Kw::Supply0))?;
        0
    };
    let mut attrs = Some(attrs);
    separated(p, |p| {
        let (name, span) = p.eat_ident("net name")?;
        let mut wire = AstNode::named(AstKind::Wire, name.clone(), span);
        if let Some(attrs) = attrs.take() {
            wire.append_attributes(attrs);
        }
        emit(p, wire);
        let assign = AstNode::binary(
            AstKind::Assign,
            AstNode::ident(name, span),
            AstNode::mkconst_int(value, false, 1, span),
            span,
        );
        emit(p, assign);
        Ok(())
    })?;
    p.require_reported(Semicolon)
}

/// Parse the `parameter` or `localparam` keyword and the type following it
/// into a prototype.
fn parse_param_head(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<AstNode> {
    let (tkn, sp) = p.peek(0);
    let kind = match tkn {
        Keyword(Kw::Parameter) => AstKind::Parameter,
        Keyword(Kw::Localparam) => AstKind::Localparam,
        _ => {
            p.add_diag(
                DiagBuilder2::error(format!("expected `parameter` or `localparam`, found `{}`", tkn))
                    .span(sp),
            );
            return Err(());
        }
    };
    p.bump();
    let mut proto =
        AstNode::with_children(kind, vec![AstNode::mkconst_int(0, true, 32, sp)], sp);
    proto.append_attributes(attrs);
    parse_param_type(p, &mut proto)?;
    Ok(proto)
}

fn parse_param_type(p: &mut dyn AbstractParser, proto: &mut AstNode) -> ReportedResult<()> {
    let (tkn, sp) = p.peek(0);
    match tkn {
        Keyword(kw) if integer_atom_width(kw).is_some() => {
            p.bump();
            let width = integer_atom_width(kw).unwrap_or(32);
            proto.flags |= NodeFlags::SIGNED;
            proto.children.push(AstNode::make_range(width - 1, 0, false, sp));
            parse_signing(p, proto);
        }
        Keyword(Kw::Real) => {
            p.bump();
            proto.children.push(AstNode::new(AstKind::RealValue, sp));
        }
        Keyword(Kw::Reg) | Keyword(Kw::Logic) => {
            p.bump();
            proto.flags |= if tkn == Keyword(Kw::Reg) {
                NodeFlags::REG
            } else {
                NodeFlags::LOGIC
            };
            parse_signing(p, proto);
            let range = parse_range_opt(p)?
                .unwrap_or_else(|| AstNode::make_range(0, 0, false, sp));
            proto.children.push(range);
        }
        Ident(_) | EscIdent(_) => {
            if let Some((name, len)) = peek_type_name(p) {
                take_user_type(p, proto, name, len);
            }
        }
        _ => {
            parse_signing(p, proto);
            if let Some(range) = parse_range_opt(p)? {
                proto.children.push(range);
            }
        }
    }
    Ok(())
}

/// Parse a single `name = value` of a parameter declaration, cloning the
/// prototype. Without a prototype, a parameter is implied.
fn parse_param_assign(p: &mut dyn AbstractParser, proto: Option<&AstNode>) -> ReportedResult<()> {
    let (name, span) = p.eat_ident("parameter name")?;
    let mut node = match proto {
        Some(proto) => proto.clone(),
        None => {
            if !p.opts().sv {
                return fatal(p, "In pure Verilog (not SystemVerilog), parameter/localparam with an initializer must use the parameter/localparam keyword", span);
            }
            AstNode::with_children(
                AstKind::Parameter,
                vec![AstNode::mkconst_int(0, true, 32, span)],
                span,
            )
        }
    };
    node.name = name;
    node.span = span;
    if p.try_eat(Operator(Op::Assign)) {
        let value = parse_expr(p)?;
        match node.children.first_mut() {
            Some(slot) => *slot = value,
            None => node.children.push(value),
        }
    } else {
        if node.kind != AstKind::Parameter {
            return fatal(p, "localparam initialization is missing!", span);
        }
        if !p.opts().sv {
            return fatal(
                p,
                "Parameter defaults can only be omitted in SystemVerilog mode!",
                span,
            );
        }
        if !node.children.is_empty() {
            node.children.remove(0);
        }
    }
    emit(p, node);
    Ok(())
}

/// Parse a `parameter` or `localparam` declaration.
pub fn parse_param_decl(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let proto = parse_param_head(p, attrs)?;
    separated(p, |p| parse_param_assign(p, Some(&proto)))?;
    p.require_reported(Semicolon)
}

/// Parse the `#(...)` parameter port list of a module or interface header.
/// Entries without a keyword inherit the type of the previous entry.
pub fn parse_param_ports(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    p.require_reported(Hashtag)?;
    flanked(p, Paren, |p| {
        let mut proto: Option<AstNode> = None;
        comma_list(p, CloseDelim(Paren), "parameter", |p| {
            let attrs = parse_attributes(p)?;
            match p.peek(0).0 {
                Keyword(Kw::Parameter) | Keyword(Kw::Localparam) => {
                    proto = Some(parse_param_head(p, attrs)?);
                }
                _ => (),
            }
            parse_param_assign(p, proto.as_ref())
        })
        .map(|_| ())
    })
}

/// Parse a `defparam` statement.
pub fn parse_defparam(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    p.require_reported(Keyword(Kw::Defparam))?;
    separated(p, |p| {
        let range = parse_range_opt(p)?;
        let (name, span) = parse_hierarchical_name(p, "parameter name")?;
        p.require_reported(Operator(Op::Assign))?;
        let value = parse_expr(p)?;
        let mut node = AstNode::with_children(
            AstKind::Defparam,
            vec![AstNode::ident(name, span), value],
            Span::union(span, p.last_span()),
        );
        if let Some(range) = range {
            node.children.push(range);
        }
        emit(p, node);
        Ok(())
    })?;
    p.require_reported(Semicolon)
}

/// Parse the name declared by a typedef, which must not clash with another
/// type of the same scope.
fn parse_type_name(p: &mut dyn AbstractParser) -> ReportedResult<(String, Span)> {
    let (name, span) = p.eat_ident("type name")?;
    if p.state().types.is_in_local_scope(&name) {
        return fatal(
            p,
            format!("Duplicate declaration of TYPEDEF '{}'", name),
            span,
        );
    }
    Ok((name, span))
}

/// Register a type in the current scope and emit its typedef node.
fn add_typedef(p: &mut dyn AbstractParser, name: String, span: Span, def: AstNode) {
    trace!("declaring type `{}`", name);
    let tnode = AstNode::with_children(AstKind::Typedef, vec![def], span).renamed(name.clone());
    let st = p.state();
    st.types.declare(name.clone(), tnode.clone());
    if let Some(pkg) = st.current_package.clone() {
        st.types.declare_in_package(&pkg, &name, tnode.clone());
    }
    emit(p, tnode);
}

/// Parse the base type of a typedef that is neither an enum nor a struct.
fn parse_typedef_base(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let (tkn, sp) = p.peek(0);
    let mut node = AstNode::new(AstKind::Wire, sp);
    match tkn {
        Keyword(Kw::Reg) => {
            p.bump();
            node.flags |= NodeFlags::REG;
            parse_signing(p, &mut node);
        }
        Keyword(Kw::Logic) | Keyword(Kw::Bit) => {
            p.bump();
            node.flags |= NodeFlags::LOGIC;
            parse_signing(p, &mut node);
        }
        Keyword(kw) if integer_atom_width(kw).is_some() => {
            p.bump();
            let width = integer_atom_width(kw).unwrap_or(32);
            node.flags |= NodeFlags::LOGIC | NodeFlags::SIGNED;
            node.range = Some((width - 1, 0));
            parse_signing(p, &mut node);
        }
        _ => match peek_type_name(p) {
            Some((name, len)) => {
                node.flags |= NodeFlags::LOGIC;
                take_user_type(p, &mut node, name, len);
            }
            None => {
                p.add_diag(
                    DiagBuilder2::error(format!("expected type, found `{}`", tkn)).span(sp),
                );
                return Err(());
            }
        },
    }
    Ok(node)
}

/// Parse a `typedef` declaration.
pub fn parse_typedef(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    let span = p.peek(0).1;
    p.require_reported(Keyword(Kw::Typedef))?;
    let (def, (name, name_span)) = match p.peek(0).0 {
        Keyword(Kw::Enum) => {
            let def = parse_enum_type(p)?;
            (def, parse_type_name(p)?)
        }
        Keyword(Kw::Struct) | Keyword(Kw::Union) => {
            let def = parse_struct_type(p)?;
            (def, parse_type_name(p)?)
        }
        _ => {
            let mut def = parse_typedef_base(p)?;
            let dims = parse_dims(p)?;
            let range = check_range(p, &mut def, dims, span)?;
            let has_range = range.is_some();
            if let Some(range) = range {
                def.children.push(range);
            }
            let name = parse_type_name(p)?;
            if let Some(dims) = parse_dims(p)? {
                if !has_range {
                    def.children.push(AstNode::make_range(0, 0, false, span));
                }
                desugar::rewrite_as_memory(&mut def, dims);
            }
            (def, name)
        }
    };
    p.require_reported(Semicolon)?;
    add_typedef(p, name, name_span, def);
    Ok(())
}

/// Parse an `enum` type.
///
/// Emits the enum node holding the items into the current container, and
/// returns the prototype of variables of the enum type.
pub fn parse_enum_type(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let span = p.peek(0).1;
    p.require_reported(Keyword(Kw::Enum))?;
    let enum_name = p.state().next_enum_name();
    let mut item = AstNode::with_children(
        AstKind::EnumItem,
        vec![AstNode::mkconst_int(0, true, 32, span)],
        span,
    );

    match p.peek(0).0 {
        Keyword(kw) if integer_atom_width(kw).is_some() => {
            p.bump();
            let width = integer_atom_width(kw).unwrap_or(32);
            item.flags |= NodeFlags::REG | NodeFlags::SIGNED;
            item.children
                .push(AstNode::make_range(width - 1, 0, true, span));
            parse_signing(p, &mut item);
        }
        Keyword(Kw::Reg) | Keyword(Kw::Logic) | Keyword(Kw::Bit) => {
            item.flags |= if p.peek(0).0 == Keyword(Kw::Reg) {
                NodeFlags::REG
            } else {
                NodeFlags::LOGIC
            };
            p.bump();
            parse_signing(p, &mut item);
            if let Some(range) = parse_range_opt(p)? {
                item.children.push(range);
            }
        }
        _ => {
            item.flags |= NodeFlags::REG;
            item.children.push(AstNode::make_range(31, 0, true, span));
        }
    }

    let mut enum_node = AstNode::named(AstKind::Enum, enum_name.clone(), span);
    flanked(p, Brace, |p| {
        comma_list_nonempty(p, CloseDelim(Brace), "enum item", |p| {
            let (name, span) = p.eat_ident("enum item name")?;
            let init = if p.try_eat(Operator(Op::Assign)) {
                parse_expr(p)?
            } else {
                AstNode::new(AstKind::None, span)
            };
            let mut node = item.clone();
            node.name = name;
            node.span = span;
            node.children[0] = init;
            enum_node.children.push(node);
            Ok(())
        })
    })?;
    enum_node.span.expand(p.last_span());
    emit(p, enum_node);

    let mut proto = item;
    proto.kind = AstKind::Wire;
    proto.children.remove(0);
    proto.set_attribute("enum_type", AstNode::mkconst_str(enum_name, span));
    Ok(proto)
}

/// Parse an enum declaration such as `enum {A, B} state;`.
pub fn parse_enum_decl(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let proto = parse_enum_type(p)?;
    separated(p, |p| {
        let (name, span) = p.eat_ident("variable name")?;
        let mut node = proto.clone();
        node.name = name;
        node.span = span;
        node.flags |= NodeFlags::ENUM;
        node.append_attributes(attrs.clone());
        emit(p, node);
        Ok(())
    })?;
    p.require_reported(Semicolon)
}

/// Parse a packed `struct` or `union` type.
pub fn parse_struct_type(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let (tkn, span) = p.peek(0);
    let kind = match tkn {
        Keyword(Kw::Union) => AstKind::Union,
        _ => AstKind::Struct,
    };
    p.bump();
    let mut node = AstNode::new(kind, span);
    if !p.try_eat(Keyword(Kw::Packed)) {
        let sp = p.peek(0).1;
        return fatal(p, "Only PACKED supported at this time", sp);
    }
    parse_signing(p, &mut node);
    flanked(p, Brace, |p| {
        while !p.is_fatal() && p.peek(0).0 != CloseDelim(Brace) && p.peek(0).0 != Eof {
            parse_struct_member(p, &mut node)?;
        }
        Ok(())
    })?;
    node.span.expand(p.last_span());
    Ok(node)
}

fn parse_struct_member(p: &mut dyn AbstractParser, parent: &mut AstNode) -> ReportedResult<()> {
    let (tkn, sp) = p.peek(0);
    let proto = match tkn {
        Keyword(Kw::Struct) | Keyword(Kw::Union) => parse_struct_type(p)?,
        _ => {
            let mut item = AstNode::new(AstKind::StructItem, sp);
            match tkn {
                Keyword(kw) if integer_atom_width(kw).is_some() => {
                    p.bump();
                    let width = integer_atom_width(kw).unwrap_or(32);
                    item.flags |= NodeFlags::REG | NodeFlags::SIGNED;
                    item.range = Some((width - 1, 0));
                    parse_signing(p, &mut item);
                }
                Keyword(Kw::Reg) => {
                    p.bump();
                    item.flags |= NodeFlags::REG;
                    parse_signing(p, &mut item);
                }
                Keyword(Kw::Logic) | Keyword(Kw::Bit) => {
                    p.bump();
                    item.flags |= NodeFlags::LOGIC;
                    parse_signing(p, &mut item);
                }
                _ => match peek_type_name(p) {
                    Some((name, len)) => take_user_type(p, &mut item, name, len),
                    None => {
                        p.add_diag(
                            DiagBuilder2::error(format!(
                                "expected struct member type, found `{}`",
                                tkn
                            ))
                            .span(sp),
                        );
                        return Err(());
                    }
                },
            }
            let dims = parse_dims(p)?;
            if let Some(range) = check_range(p, &mut item, dims, sp)? {
                item.children.push(range);
            }
            item
        }
    };
    separated(p, |p| {
        let (name, span) = p.eat_ident("member name")?;
        let mut member = proto.clone();
        member.name = name;
        member.span = span;
        if let Some(range) = parse_range_opt(p)? {
            member.children.push(range);
        }
        parent.children.push(member);
        Ok(())
    })?;
    p.require_reported(Semicolon)
}

/// Parse a struct or union variable declaration.
pub fn parse_struct_decl(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let mut proto = parse_struct_type(p)?;
    proto.append_attributes(attrs);
    separated(p, |p| {
        let (name, span) = p.eat_ident("variable name")?;
        let mut node = proto.clone();
        node.name = name;
        node.span = span;
        emit(p, node);
        Ok(())
    })?;
    p.require_reported(Semicolon)
}

/// Parse the return type of a function into the range or type node attached
/// to the result variable.
fn parse_return_type(p: &mut dyn AbstractParser) -> ReportedResult<AstNode> {
    let (tkn, sp) = p.peek(0);
    if let Keyword(kw) = tkn {
        if let Some(width) = integer_atom_width(kw) {
            p.bump();
            let mut signed = AstNode::new(AstKind::None, sp);
            signed.flags |= NodeFlags::SIGNED;
            parse_signing(p, &mut signed);
            return Ok(AstNode::make_range(width - 1, 0, signed.is_signed(), sp));
        }
    }
    if let Some((name, len)) = peek_type_name(p) {
        if p.peek(len).0 != Semicolon && p.peek(len).0 != OpenDelim(Paren) {
            let mut holder = AstNode::new(AstKind::None, sp);
            take_user_type(p, &mut holder, name, len);
            return Ok(holder.children.remove(0));
        }
    }
    if !p.try_eat(Keyword(Kw::Reg)) {
        p.try_eat(Keyword(Kw::Logic));
    }
    let mut signed = AstNode::new(AstKind::None, sp);
    parse_signing(p, &mut signed);
    Ok(match parse_range_opt(p)? {
        Some(mut range) => {
            range.flags.set(NodeFlags::SIGNED, signed.is_signed());
            range
        }
        None => AstNode::make_range(0, 0, signed.is_signed(), sp),
    })
}

/// Parse a task or function declaration.
pub fn parse_subroutine(p: &mut dyn AbstractParser, attrs: Attributes) -> ReportedResult<()> {
    let (tkn, span) = p.peek(0);
    let is_task = tkn == Keyword(Kw::Task);
    p.bump();
    p.try_eat(Keyword(Kw::Automatic));
    let return_type = if is_task || p.try_eat(Keyword(Kw::Void)) {
        None
    } else {
        Some(parse_return_type(p)?)
    };
    let (name, name_span) = p.eat_ident(if is_task { "task name" } else { "function name" })?;
    debug!("parsing subroutine `{}`", name);

    let kind = if return_type.is_some() {
        AstKind::Function
    } else {
        AstKind::Task
    };
    let mut node = AstNode::named(kind, name.clone(), span);
    node.append_attributes(attrs);
    if let Some(mut rtype) = return_type {
        let mut outreg = AstNode::named(AstKind::Wire, name.clone(), name_span);
        outreg.flags |= NodeFlags::REG;
        outreg.flags.set(NodeFlags::SIGNED, rtype.is_signed());
        outreg
            .flags
            .set(NodeFlags::CUSTOM_TYPE, rtype.kind == AstKind::WireType);
        rtype.flags.remove(NodeFlags::SIGNED);
        outreg.children.push(rtype);
        node.children.push(outreg);
    }

    let end_kw = if is_task {
        Kw::Endtask
    } else {
        Kw::Endfunction
    };
    p.state().in_function_or_task = true;
    p.state().function_port_id = 1;
    let result = nested(p, node, true, |p| {
        if p.peek(0).0 == OpenDelim(Paren) {
            flanked(p, Paren, parse_subroutine_args)?;
        }
        p.require_reported(Semicolon)?;
        parse_items(p, &[Keyword(end_kw)], super::stmt::parse_stmt);
        p.require_reported(Keyword(end_kw))
    });
    p.state().in_function_or_task = false;
    let mut node = result?;
    node.span.expand(p.last_span());
    let label = parse_end_label(p)?;
    let element = if is_task { "Task name" } else { "Function name" };
    check_label(p, element, Some(&name), label)?;
    emit(p, node);
    Ok(())
}

/// Parse the ANSI-style argument list of a task or function. Arguments
/// without a type inherit the type of the previous one.
fn parse_subroutine_args(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    let mut proto: Option<(AstNode, Option<AstNode>, Attributes)> = None;
    comma_list(p, CloseDelim(Paren), "argument", |p| {
        let attrs = parse_attributes(p)?;
        let sp = p.peek(0).1;
        if at_wire_type(p) {
            let (prev_input, prev_output) = proto
                .as_ref()
                .map(|(ty, _, _)| (ty.is_input(), ty.is_output()))
                .unwrap_or((true, false));
            let mut ty = parse_wire_type(p)?;
            let dims = parse_dims(p)?;
            let range = check_range(p, &mut ty, dims, sp)?;
            if !ty.is_input() && !ty.is_output() {
                if !p.opts().sv {
                    return fatal(p, "task/function argument direction missing", sp);
                }
                ty.flags.set(NodeFlags::INPUT, prev_input);
                ty.flags.set(NodeFlags::OUTPUT, prev_output);
            }
            proto = Some((ty, range, attrs));
        } else if proto.is_none() {
            if !p.opts().sv {
                return fatal(p, "task/function argument direction missing", sp);
            }
            let mut ty = AstNode::new(AstKind::Wire, sp);
            ty.flags |= NodeFlags::INPUT;
            proto = Some((ty, None, Attributes::new()));
        }
        match proto {
            Some((ref ty, ref range, ref attrs)) => declare_name(p, ty, range.as_ref(), attrs),
            None => Err(()),
        }
    })
    .map(|_| ())
}
