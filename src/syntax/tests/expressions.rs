// Copyright (c) 2016-2021 Fabian Schuiki

//! Expressions and constants.

mod common;
use crate::common::*;
use svfront_syntax::ast::NodeFlags;

fn rhs_with(expr: &str, opts: &ParseOptions) -> AstNode {
    let root = parse_ok(
        &format!(
            "module m(input [7:0] a, b, c, output [7:0] y); assign y = {}; endmodule",
            expr
        ),
        opts,
    );
    let assign = module(&root, "m").find_child(AstKind::Assign).unwrap().clone();
    assign.children[1].clone()
}

fn rhs(expr: &str) -> AstNode {
    rhs_with(expr, &ParseOptions::system_verilog())
}

#[test]
fn precedence() {
    let e = rhs("a + b * c");
    assert_eq!(e.kind, AstKind::Add);
    assert_eq!(e.children[1].kind, AstKind::Mul);

    let e = rhs("a | b & c");
    assert_eq!(e.kind, AstKind::BitOr);
    assert_eq!(e.children[1].kind, AstKind::BitAnd);

    let e = rhs("a == b && b < c");
    assert_eq!(e.kind, AstKind::LogicAnd);
    assert_eq!(kinds(&e), vec![AstKind::Eq, AstKind::Lt]);

    let e = rhs("a - b - c");
    assert_eq!(e.kind, AstKind::Sub);
    assert_eq!(e.children[0].kind, AstKind::Sub);
}

#[test]
fn ternary_is_right_associative() {
    let e = rhs("a ? b : c ? a : b");
    assert_eq!(e.kind, AstKind::Ternary);
    assert_eq!(e.children[2].kind, AstKind::Ternary);
}

#[test]
fn unary_operators() {
    let e = rhs("~&a");
    assert_eq!(e.kind, AstKind::LogicNot);
    assert_eq!(e.children[0].kind, AstKind::ReduceAnd);
    assert_eq!(rhs("^a").kind, AstKind::ReduceXor);
    assert_eq!(rhs("-a").kind, AstKind::Neg);
    assert_eq!(rhs("!a").kind, AstKind::LogicNot);
}

#[test]
fn shifts_take_unsigned_amounts() {
    let e = rhs("a <<< b");
    assert_eq!(e.kind, AstKind::ShiftSLeft);
    assert_eq!(e.children[1].kind, AstKind::ToUnsigned);
}

#[test]
fn negated_binary_operators() {
    let e = rhs("a ~& b");
    assert_eq!(e.kind, AstKind::BitNot);
    assert_eq!(e.children[0].kind, AstKind::BitAnd);
}

#[test]
fn constants() {
    let e = rhs("8'hA5");
    assert_eq!(e.kind, AstKind::Constant);
    assert_eq!(e.bits.len(), 8);
    assert_eq!(e.integer, 0xa5);

    let e = rhs("42");
    assert_eq!(e.integer, 42);
    assert!(e.is_signed());

    let e = rhs("\"hi\"");
    assert!(e.is(NodeFlags::STRING));
    assert_eq!(e.bits.len(), 16);

    let e = rhs("1.5");
    assert_eq!(e.kind, AstKind::RealValue);
    assert_eq!(e.real, 1.5);
}

#[test]
fn concatenation_and_replication() {
    let e = rhs("{a, b[3:0], c[0]}");
    assert_eq!(e.kind, AstKind::Concat);
    // Stored last to first.
    assert_eq!(
        e.children.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["c", "b", "a"]
    );

    let e = rhs("{4{a[1:0]}}");
    assert_eq!(e.kind, AstKind::Replicate);
    assert_eq!(e.children[1].kind, AstKind::Concat);
}

#[test]
fn selects() {
    let e = rhs("a[3:1]");
    let range = e.find_child(AstKind::Range).unwrap();
    assert_eq!(range.children.len(), 2);

    let e = rhs("a[b +: 2]");
    let range = e.find_child(AstKind::Range).unwrap();
    assert_eq!(range.children[0].kind, AstKind::Sub);
    assert_eq!(range.children[1].kind, AstKind::Add);
}

#[test]
fn casts() {
    assert_eq!(rhs("$signed(a)").kind, AstKind::ToSigned);
    assert_eq!(rhs("unsigned'(a)").kind, AstKind::ToUnsigned);
    let e = rhs("8'(a)");
    assert_eq!(e.kind, AstKind::CastSize);

    let (result, diag) = parse_with(
        "module m(input a, output y); assign y = signed'(a); endmodule",
        &ParseOptions::verilog(),
    );
    assert!(result.is_err());
    assert!(mentions(&diag.messages(), "Static cast is only supported in SystemVerilog mode."));
}

#[test]
fn function_calls_and_pseudo_functions() {
    let e = rhs("f(a, b)");
    assert_eq!(e.kind, AstKind::FCall);
    assert_eq!(e.name, "f");
    assert_eq!(e.children.len(), 2);

    let e = rhs("$anyseq");
    assert_eq!(e.kind, AstKind::FCall);
    assert_eq!(e.name, "$anyseq");

    let e = rhs("$clog2(a)");
    assert_eq!(e.kind, AstKind::FCall);
    assert_eq!(e.name, "$clog2");
}

#[test]
fn hierarchical_and_package_names() {
    assert_eq!(rhs("u0.sig").name, "u0.sig");
    assert_eq!(rhs("pkg::W").name, "pkg::W");
}

#[test]
fn wildcard_equality_is_rejected() {
    let msgs = parse_err(
        "module m(input a, b, output y); assign y = a ==? b; endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(mentions(&msgs, "Wildcard equality operators are not supported."));
}

#[test]
fn oversized_literal_width() {
    let msgs = parse_err(
        "module m; wire [3:0] a = 99999999999'h0; endmodule",
        &ParseOptions::verilog(),
    );
    assert!(mentions(&msgs, "Literal width too large"));
    let msgs = parse_err(
        "module m; wire [3:0] a = 4000000000'h0; endmodule",
        &ParseOptions::verilog(),
    );
    assert!(mentions(&msgs, "exceeds 16777216 bits"));
}

fn nested_parens(depth: usize) -> String {
    format!(
        "module m(input a, output y); assign y = {}a{}; endmodule",
        "(".repeat(depth),
        ")".repeat(depth)
    )
}

#[test]
fn deeply_nested_expressions_are_rejected() {
    with_large_stack(|| {
        let msgs = parse_err(&nested_parens(20000), &ParseOptions::verilog());
        assert!(mentions(&msgs, "Nesting too deep"));
        let root = parse_v(&nested_parens(100));
        let assign = module(&root, "m").find_child(AstKind::Assign).unwrap();
        assert_eq!(assign.children[1].name, "a");
    });
}

#[test]
fn long_operator_chains() {
    with_large_stack(|| {
        let terms = vec!["a"; 5000].join(" + ");
        let root = parse_v(&format!(
            "module m(input [7:0] a, output [7:0] y); assign y = {}; endmodule",
            terms
        ));
        let assign = module(&root, "m").find_child(AstKind::Assign).unwrap();
        let mut depth = 0;
        let mut e = &assign.children[1];
        while e.kind == AstKind::Add {
            depth += 1;
            e = &e.children[0];
        }
        assert_eq!(depth, 4999);
    });
}
