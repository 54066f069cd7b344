// Copyright (c) 2016-2021 Fabian Schuiki

//! Nets, variables, parameters, and user-defined types.

mod common;
use crate::common::*;
use svfront_syntax::ast::NodeFlags;

fn body(src: &str) -> AstNode {
    let root = parse_sv(&format!("module m; {} endmodule", src));
    module(&root, "m").clone()
}

#[test]
fn multiple_names_get_own_ranges() {
    let m = body("wire [3:0] a, b;");
    assert_eq!(kinds(&m), vec![AstKind::Wire, AstKind::Wire]);
    let mut a = m.children[0].clone();
    let b = &m.children[1];
    let ra = a.find_child(AstKind::Range).unwrap().clone();
    let rb = b.find_child(AstKind::Range).unwrap();
    assert!(same_shape(&ra, rb));
    assert_eq!(rb.children[0].integer, 3);
    assert_eq!(rb.children[1].integer, 0);

    // Changing one declaration's range leaves the sibling alone.
    a.children[0].children.clear();
    assert_eq!(m.children[1].find_child(AstKind::Range).unwrap().children.len(), 2);
}

#[test]
fn net_and_variable_flags() {
    let m = body("wire signed [7:0] a; reg r; logic l; wor o; wand n; integer i;");
    let a = m.find_named("a").unwrap();
    assert!(a.is_signed() && !a.is_reg());
    assert!(m.find_named("r").unwrap().is_reg());
    assert!(m.find_named("l").unwrap().is_logic());
    assert!(m.find_named("o").unwrap().is(NodeFlags::WOR));
    assert!(m.find_named("n").unwrap().is(NodeFlags::WAND));
    let i = m.find_named("i").unwrap();
    assert!(i.is_reg() && i.is_signed());
    let range = i.find_child(AstKind::Range).unwrap();
    assert_eq!((range.children[0].integer, range.children[1].integer), (31, 0));
}

#[test]
fn integer_rejects_packed_dimensions() {
    let msgs = parse_err(
        "module m; integer [3:0] i; endmodule",
        &ParseOptions::verilog(),
    );
    assert!(mentions(&msgs, "integer/genvar types cannot have packed dimensions."));
}

#[test]
fn implied_ranges_become_children() {
    let m = body("genvar g; integer i, j; byte b; parameter integer P = 1;");
    for name in &["g", "i", "j", "b", "P"] {
        let node = m.find_named(name).unwrap();
        assert_eq!(node.range, None, "{}", name);
        assert_eq!(collect(node, AstKind::Range).len(), 1, "{}", name);
    }
    let b = m.find_named("b").unwrap().find_child(AstKind::Range).unwrap();
    assert_eq!(b.children[0].integer, 7);
    let p = m.find_named("P").unwrap();
    assert_eq!(p.children[0].integer, 1);
    assert_eq!(p.children[1].kind, AstKind::Range);
}

#[test]
fn unpacked_dimensions_make_memories() {
    let m = body("reg [7:0] mem [16]; reg bits [0:3];");
    let mem = m.find_named("mem").unwrap();
    assert_eq!(mem.kind, AstKind::Memory);
    assert_eq!(kinds(mem), vec![AstKind::Range, AstKind::Range]);
    let dim = &mem.children[1];
    assert_eq!(dim.children[0].kind, AstKind::Constant);
    assert_eq!(dim.children[0].integer, 0);
    assert_eq!(dim.children[1].kind, AstKind::Sub);
    assert_eq!(dim.children[1].children[0].integer, 16);

    let bits = m.find_named("bits").unwrap();
    assert_eq!(bits.kind, AstKind::Memory);
    let packed = &bits.children[0];
    assert_eq!((packed.children[0].integer, packed.children[1].integer), (0, 0));
}

#[test]
fn declaration_initializers() {
    let m = body("wire w = 1'b1; reg r = 1'b0;");
    assert_eq!(
        kinds(&m),
        vec![AstKind::Wire, AstKind::Assign, AstKind::Wire, AstKind::Initial]
    );
    assert_eq!(m.children[1].children[0].name, "w");
    let block = &m.children[3].children[0];
    assert_eq!(block.kind, AstKind::Block);
    assert_eq!(block.children[0].kind, AstKind::AssignLe);
}

#[test]
fn formal_wire_attributes() {
    let m = body("(* anyconst *) wire [3:0] c;");
    let assign = m.find_child(AstKind::Assign).unwrap();
    assert_eq!(assign.children[1].kind, AstKind::FCall);
    assert_eq!(assign.children[1].name, "$anyconst");
}

#[test]
fn supply_nets() {
    let m = body("supply0 gnd; supply1 vdd;");
    assert_eq!(
        kinds(&m),
        vec![AstKind::Wire, AstKind::Assign, AstKind::Wire, AstKind::Assign]
    );
    assert_eq!(m.children[3].children[1].integer, 1);
}

#[test]
fn parameters() {
    let m = body("parameter integer W = 8, D = 2; localparam [3:0] L = 4'd3;");
    assert_eq!(
        kinds(&m),
        vec![AstKind::Parameter, AstKind::Parameter, AstKind::Localparam]
    );
    let d = m.find_named("D").unwrap();
    assert!(d.is_signed());
    assert_eq!(d.children[0].integer, 2);
}

#[test]
fn parameter_ports() {
    let root = parse_v("module m #(parameter W = 8, D = 2) (input [W-1:0] a); endmodule");
    let m = module(&root, "m");
    assert_eq!(m.children[0].kind, AstKind::Parameter);
    assert_eq!(m.children[1].kind, AstKind::Parameter);
    assert_eq!(m.children[1].name, "D");
    assert_eq!(m.find_named("a").unwrap().port_id, 1);
}

#[test]
fn parameter_default_only_in_sv() {
    body("parameter W;");
    let msgs = parse_err("module m; parameter W; endmodule", &ParseOptions::verilog());
    assert!(mentions(&msgs, "Parameter defaults can only be omitted in SystemVerilog mode!"));
}

#[test]
fn localparam_requires_initializer() {
    let msgs = parse_err(
        "module m; localparam W; endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(mentions(&msgs, "localparam initialization is missing!"));
}

#[test]
fn defparam() {
    let m = body("defparam u0.W = 4;");
    let d = m.find_child(AstKind::Defparam).unwrap();
    assert_eq!(d.children[0].name, "u0.W");
}

#[test]
fn typedefs_declare_custom_types() {
    let m = body("typedef logic [3:0] nib_t; nib_t a, b;");
    assert_eq!(kinds(&m), vec![AstKind::Typedef, AstKind::Wire, AstKind::Wire]);
    let a = m.find_named("a").unwrap();
    assert!(a.is_custom_type());
    assert_eq!(a.find_child(AstKind::WireType).unwrap().name, "nib_t");
}

#[test]
fn duplicate_typedef() {
    let msgs = parse_err(
        "module m; typedef logic t; typedef reg t; endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(mentions(&msgs, "Duplicate declaration of TYPEDEF 't'"));
}

#[test]
fn typedef_visibility_follows_blocks() {
    // Visible in the declaring block and blocks nested in it.
    parse_sv(
        "module m;
            initial begin
                begin
                    typedef logic [3:0] nib_t;
                    nib_t x;
                    begin
                        nib_t y;
                    end
                end
            end
        endmodule",
    );
    // Not visible in a sibling block.
    let (result, _) = parse_with(
        "module m;
            initial begin
                begin
                    typedef logic [3:0] nib_t;
                    nib_t x;
                end
                begin
                    nib_t z;
                end
            end
        endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(result.is_err());
}

#[test]
fn typedef_shadowing_in_nested_scope() {
    parse_sv(
        "module m;
            typedef logic t;
            initial begin
                typedef logic [1:0] t;
                t x;
            end
        endmodule",
    );
}

#[test]
fn enums() {
    let m = body("enum logic [1:0] {IDLE, RUN = 2'd2, DONE} state, next;");
    assert_eq!(kinds(&m), vec![AstKind::Enum, AstKind::Wire, AstKind::Wire]);
    let e = &m.children[0];
    assert!(e.name.starts_with("$enum"));
    let items: Vec<_> = e.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(items, vec!["IDLE", "RUN", "DONE"]);
    assert!(e.children.iter().all(|c| c.kind == AstKind::EnumItem));
    assert_eq!(e.children[0].children[0].kind, AstKind::None);
    assert_eq!(e.children[1].children[0].kind, AstKind::Constant);

    let state = m.find_named("state").unwrap();
    assert!(state.is(NodeFlags::ENUM));
    assert_eq!(state.attributes["enum_type"].name, e.name);
}

#[test]
fn anonymous_enums_are_numbered() {
    let m = body("enum {A, B} x; enum {C, D} y;");
    let enums = collect(&m, AstKind::Enum);
    assert_eq!(enums.len(), 2);
    assert_ne!(enums[0].name, enums[1].name);
}

#[test]
fn typedef_enum() {
    let m = body("typedef enum {S0, S1} st_t; st_t s;");
    assert_eq!(kinds(&m), vec![AstKind::Enum, AstKind::Typedef, AstKind::Wire]);
    assert!(m.find_named("s").unwrap().is_custom_type());
}

#[test]
fn packed_structs() {
    let m = body(
        "typedef struct packed { logic [7:0] hi; logic [7:0] lo; } pair_t;
         struct packed { bit a, b; } flags;
         union packed { logic [3:0] x; logic [3:0] y; } u;",
    );
    let td = m.find_named("pair_t").unwrap();
    let st = &td.children[0];
    assert_eq!(st.kind, AstKind::Struct);
    assert_eq!(kinds(st), vec![AstKind::StructItem, AstKind::StructItem]);
    let flags = m.find_named("flags").unwrap();
    assert_eq!(flags.kind, AstKind::Struct);
    assert_eq!(flags.children.len(), 2);
    assert_eq!(m.find_named("u").unwrap().kind, AstKind::Union);
}

#[test]
fn struct_requires_packed() {
    let msgs = parse_err(
        "module m; struct { logic a; } s; endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(mentions(&msgs, "Only PACKED supported at this time"));
}

#[test]
fn ports_cannot_have_unpacked_dimensions() {
    let msgs = parse_err(
        "module m(a); input a [1:0]; endmodule",
        &ParseOptions::verilog(),
    );
    assert!(mentions(&msgs, "ports cannot have unpacked dimensions"));
}
