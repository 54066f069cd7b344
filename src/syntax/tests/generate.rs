// Copyright (c) 2016-2021 Fabian Schuiki

//! Generate loops, conditionals, case statements, and blocks.

mod common;
use crate::common::*;

#[test]
fn inline_genvar_is_hoisted() {
    let root = parse_sv(
        "module m(output [3:0] y);
            for (genvar i = 0; i < 4; i = i + 1) begin : blk
                assign y[i] = 1'b0;
            end
        endmodule",
    );
    let m = module(&root, "m");
    assert_eq!(kinds(m), vec![AstKind::Wire, AstKind::Genvar, AstKind::GenFor]);

    let genvar = &m.children[1];
    assert!(genvar.name.starts_with("$genfordecl$"));
    assert!(genvar.name.ends_with("$i"));
    assert_ne!(genvar.name, "i");
    assert!(genvar.is_signed());
    assert_eq!(genvar.range, None);
    assert_eq!(kinds(genvar), vec![AstKind::Range]);
    assert_eq!(genvar.children[0].children[0].integer, 31);

    let genfor = &m.children[2];
    assert_eq!(
        kinds(genfor),
        vec![AstKind::AssignEq, AstKind::Lt, AstKind::AssignEq, AstKind::GenBlock]
    );
    // The loop clauses refer to the hoisted genvar.
    for clause in &genfor.children[0..3] {
        let idents = collect(clause, AstKind::Identifier);
        assert!(idents.iter().all(|n| n.name == genvar.name));
    }

    // The body sees the original name through a localparam.
    let body = &genfor.children[3];
    assert_eq!(body.name, "blk");
    let shadow = &body.children[0];
    assert_eq!(shadow.kind, AstKind::Localparam);
    assert_eq!(shadow.name, "i");
    assert_eq!(shadow.children[0].name, genvar.name);
    let assign = &body.children[1];
    assert_eq!(assign.kind, AstKind::Assign);
    let lhs_idents = collect(&assign.children[0], AstKind::Identifier);
    assert!(lhs_idents.iter().any(|n| n.name == "i"));
}

#[test]
fn inline_genvar_needs_sv() {
    let msgs = parse_err(
        "module m; for (genvar i = 0; i < 4; i = i + 1) begin end endmodule",
        &ParseOptions::verilog(),
    );
    assert!(mentions(&msgs, "only supported in SystemVerilog mode!"));
}

#[test]
fn generate_region_with_genvar() {
    let root = parse_v(
        "module m(input [3:0] a, output [3:0] y);
            genvar i;
            generate
                for (i = 0; i < 4; i = i + 1) begin : g
                    assign y[i] = ~a[i];
                end
            endgenerate
        endmodule",
    );
    let m = module(&root, "m");
    assert_eq!(
        kinds(m),
        vec![AstKind::Wire, AstKind::Wire, AstKind::Genvar, AstKind::GenFor]
    );
    let genfor = &m.children[3];
    assert_eq!(genfor.children[0].children[0].name, "i");
    assert_eq!(genfor.children[3].kind, AstKind::GenBlock);
    assert_eq!(genfor.children[3].children[0].kind, AstKind::Assign);
}

#[test]
fn generate_if_and_case() {
    let root = parse_v(
        "module m #(parameter W = 1) (output y);
            if (W == 1) assign y = 1'b0;
            else begin : other
                assign y = 1'b1;
            end
            case (W)
                0, 1: wire a;
                default: begin wire b; end
            endcase
        endmodule",
    );
    let m = module(&root, "m");
    let gen_if = m.find_child(AstKind::GenIf).unwrap();
    assert_eq!(
        kinds(gen_if),
        vec![AstKind::Eq, AstKind::GenBlock, AstKind::GenBlock]
    );
    assert!(gen_if.children[1].name.is_empty());
    assert_eq!(gen_if.children[2].name, "other");

    let gen_case = m.find_child(AstKind::GenCase).unwrap();
    assert_eq!(
        kinds(gen_case),
        vec![AstKind::Identifier, AstKind::Cond, AstKind::Cond]
    );
    assert_eq!(
        kinds(&gen_case.children[1]),
        vec![AstKind::Constant, AstKind::Constant, AstKind::GenBlock]
    );
    assert_eq!(gen_case.children[2].children[0].kind, AstKind::Default);
}

#[test]
fn ports_cannot_be_declared_in_generate_blocks() {
    let msgs = parse_err(
        "module m(a); begin input a; end endmodule",
        &ParseOptions::verilog(),
    );
    assert!(mentions(&msgs, "Cannot declare module port `a' within a generate block."));
}

#[test]
fn nested_generate_loops_use_distinct_names() {
    let root = parse_sv(
        "module m;
            for (genvar i = 0; i < 2; i++) begin : outer
                for (genvar i = 0; i < 2; i++) begin : inner
                end
            end
        endmodule",
    );
    let m = module(&root, "m");
    let genvars = collect(m, AstKind::Genvar);
    assert_eq!(genvars.len(), 2);
    assert_ne!(genvars[0].name, genvars[1].name);
}
