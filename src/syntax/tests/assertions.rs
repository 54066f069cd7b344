// Copyright (c) 2016-2021 Fabian Schuiki

//! Immediate and concurrent assertions, and the options that drop or swap
//! them.

mod common;
use crate::common::*;

const SRC: &str = "module m(input a, input b);
    reg r;
    always @* begin
        assert(a);
        r = a;
    end
    assume property (b);
    check: assert property (a || b);
    cover (a && b);
    restrict property (a);
    assert property (eventually a);
endmodule";

fn assertion_kinds(opts: &ParseOptions) -> Vec<AstKind> {
    let root = parse_ok(SRC, opts);
    let mut out = vec![];
    root.walk(&mut |n| match n.kind {
        AstKind::Assert
        | AstKind::Assume
        | AstKind::Cover
        | AstKind::Live
        | AstKind::Fair => out.push(n.kind),
        _ => (),
    });
    out
}

fn sv_with<F: FnOnce(&mut ParseOptions)>(f: F) -> ParseOptions {
    let mut opts = ParseOptions::system_verilog();
    f(&mut opts);
    opts
}

#[test]
fn assertion_kinds_by_default() {
    assert_eq!(
        assertion_kinds(&ParseOptions::system_verilog()),
        vec![
            AstKind::Assert,
            AstKind::Assume,
            AstKind::Assert,
            AstKind::Cover,
            AstKind::Assume,
            AstKind::Live,
        ]
    );
}

#[test]
fn labels_name_assertions() {
    let root = parse_sv(SRC);
    let m = module(&root, "m");
    let labeled = m.find_named("check").unwrap();
    assert_eq!(labeled.kind, AstKind::Assert);
    assert_eq!(labeled.children[0].kind, AstKind::LogicOr);
}

#[test]
fn disabled_asserts_are_dropped() {
    let opts = sv_with(|o| o.noassert = true);
    assert_eq!(
        assertion_kinds(&opts),
        vec![AstKind::Assume, AstKind::Cover, AstKind::Assume]
    );
    // Parsing continues normally after a dropped assertion.
    let root = parse_ok(SRC, &opts);
    let always = module(&root, "m").find_child(AstKind::Always).unwrap();
    let block = &always.children[0].children[0];
    assert_eq!(kinds(block), vec![AstKind::AssignEq]);
}

#[test]
fn disabled_assumes_and_restricts_are_dropped() {
    let opts = sv_with(|o| {
        o.noassume = true;
        o.norestrict = true;
    });
    assert_eq!(
        assertion_kinds(&opts),
        vec![AstKind::Assert, AstKind::Assert, AstKind::Cover, AstKind::Live]
    );
}

#[test]
fn asserts_as_assumes() {
    let opts = sv_with(|o| o.assume_asserts = true);
    assert_eq!(
        assertion_kinds(&opts),
        vec![
            AstKind::Assume,
            AstKind::Assume,
            AstKind::Assume,
            AstKind::Cover,
            AstKind::Assume,
            AstKind::Fair,
        ]
    );
}

#[test]
fn assumes_as_asserts() {
    let opts = sv_with(|o| o.assert_assumes = true);
    assert_eq!(
        assertion_kinds(&opts),
        vec![
            AstKind::Assert,
            AstKind::Assert,
            AstKind::Assert,
            AstKind::Cover,
            AstKind::Assume,
            AstKind::Live,
        ]
    );
}

#[test]
fn cover_without_expression() {
    let root = parse_sv("module m; initial cover; endmodule");
    let covers = collect(&root, AstKind::Cover);
    assert_eq!(covers.len(), 1);
    assert_eq!(covers[0].children[0].integer, 1);
}

#[test]
fn restrict_without_property_warns() {
    let (result, diag) = parse_with(
        "module m(input a); initial restrict (a); endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(result.is_ok());
    assert!(mentions(&diag.messages(), "\"restrict\" without \"property\""));
}

#[test]
fn label_without_assertion() {
    let msgs = parse_err(
        "module m(input a); chk: wire w; endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(mentions(&msgs, "expected assertion after label `chk`, found `wire`"));

    let msgs = parse_err(
        "module m(input a); reg r; always @* begin upd: r = a; end endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(mentions(&msgs, "expected assertion after label `upd`"));
}
