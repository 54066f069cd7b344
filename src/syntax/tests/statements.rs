// Copyright (c) 2016-2021 Fabian Schuiki

//! Procedural blocks and the statements within them.

mod common;
use crate::common::*;

fn body(src: &str) -> AstNode {
    let root = parse_sv(&format!("module m(input clk, input [3:0] d); {} endmodule", src));
    module(&root, "m").clone()
}

fn always_blocks(m: &AstNode) -> Vec<&AstNode> {
    m.children
        .iter()
        .filter(|c| c.kind == AstKind::Always || c.kind == AstKind::Initial)
        .collect()
}

/// The block holding the body of the first `always` or `initial`.
fn first_block(m: &AstNode) -> AstNode {
    let always = always_blocks(m)[0];
    always.find_child(AstKind::Block).unwrap().clone()
}

#[test]
fn always_flavours() {
    let m = body(
        "logic a, b, c;
         always_comb a = d[0];
         always_latch if (clk) b = d[1];
         always_ff @(posedge clk) c <= d[2];
         always @(posedge clk or negedge d[0], d[1]) c <= 1'b0;",
    );
    let blocks = always_blocks(&m);
    assert_eq!(blocks.len(), 4);

    assert!(blocks[0].get_bool_attribute("always_comb"));
    assert!(!blocks[0].get_bool_attribute("always_latch"));
    assert_eq!(kinds(blocks[0]), vec![AstKind::Block]);

    assert!(blocks[1].get_bool_attribute("always_latch"));
    assert!(!blocks[1].get_bool_attribute("always_comb"));
    assert_eq!(kinds(blocks[1]), vec![AstKind::Block]);

    assert!(blocks[2].get_bool_attribute("always_ff"));
    assert_eq!(kinds(blocks[2]), vec![AstKind::Posedge, AstKind::Block]);

    assert!(blocks[3].attributes.is_empty());
    assert_eq!(
        kinds(blocks[3]),
        vec![AstKind::Posedge, AstKind::Negedge, AstKind::Edge, AstKind::Block]
    );
}

#[test]
fn implicit_sensitivity() {
    let m = body("reg a, b; always @* a = d[0]; always @(*) b = d[1];");
    for always in always_blocks(&m) {
        assert_eq!(kinds(always), vec![AstKind::Block]);
    }
}

#[test]
fn compound_assignment_desugars() {
    let m = body("reg [3:0] a; always @(posedge clk) a += 1;");
    let block = first_block(&m);
    let assign = &block.children[0];
    assert_eq!(assign.kind, AstKind::AssignEq);
    let (lhs, rhs) = (&assign.children[0], &assign.children[1]);
    assert_eq!(rhs.kind, AstKind::Add);
    assert!(same_shape(lhs, &rhs.children[0]));
    assert_eq!(lhs.name, "a");
    assert_eq!(rhs.children[1].integer, 1);
}

#[test]
fn compound_shift_amount_is_unsigned() {
    let m = body("reg [3:0] a; always @(posedge clk) a <<= d;");
    let assign = &first_block(&m).children[0];
    let rhs = &assign.children[1];
    assert_eq!(rhs.kind, AstKind::ShiftLeft);
    assert_eq!(rhs.children[1].kind, AstKind::ToUnsigned);
}

#[test]
fn increment_statements() {
    let m = body("integer i; initial begin i++; --i; end");
    let block = first_block(&m);
    let inner = &block.children[0];
    assert_eq!(kinds(inner), vec![AstKind::AssignEq, AstKind::AssignEq]);
    assert_eq!(inner.children[0].children[1].kind, AstKind::Add);
    assert_eq!(inner.children[1].children[1].kind, AstKind::Sub);
}

#[test]
fn increment_expressions() {
    let m = body("integer i, j; initial begin j = i++; end");
    let block = &first_block(&m).children[0];
    // The update of `i` precedes the assignment that uses its value.
    assert_eq!(kinds(block), vec![AstKind::AssignEq, AstKind::AssignEq]);
    assert_eq!(block.children[0].children[0].name, "i");
    assert_eq!(block.children[1].children[0].name, "j");
}

#[test]
fn increment_expressions_need_sv() {
    let msgs = parse_err(
        "module m; integer i, j; initial begin j = i++; end endmodule",
        &ParseOptions::verilog(),
    );
    assert!(mentions(&msgs, "only supported in SystemVerilog mode"));
}

#[test]
fn increment_expressions_need_procedure() {
    let msgs = parse_err(
        "module m; integer i; wire w; assign w = i++; endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(mentions(
        &msgs,
        "Assignments within expressions are only permitted within procedures."
    ));
}

#[test]
fn if_becomes_case() {
    let m = body("reg q; always @(posedge clk) if (d[0]) q <= 1'b1; else q <= 1'b0;");
    let case = &first_block(&m).children[0];
    assert_eq!(case.kind, AstKind::Case);
    assert_eq!(
        kinds(case),
        vec![AstKind::ReduceBool, AstKind::Cond, AstKind::Cond]
    );
    assert_eq!(case.children[2].children[0].kind, AstKind::Default);
}

#[test]
fn case_statements() {
    let m = body(
        "reg [1:0] q;
         always @* begin
            casez (d) // synopsys full_case parallel_case
                4'b1???: q = 2'd3;
                4'b01??, 4'b001?: q = 2'd2;
                default: q = 2'd0;
            endcase
         end",
    );
    let case = &first_block(&m).children[0].children[0];
    assert_eq!(case.kind, AstKind::Case);
    assert!(case.get_bool_attribute("full_case"));
    assert!(case.get_bool_attribute("parallel_case"));
    assert_eq!(
        kinds(case),
        vec![AstKind::Identifier, AstKind::CondZ, AstKind::CondZ, AstKind::CondZ]
    );
    assert_eq!(case.children[2].children.len(), 3);
    assert_eq!(case.children[3].children[0].kind, AstKind::Default);
}

#[test]
fn unique_and_priority() {
    let m = body(
        "reg q;
         always @* begin
            unique case (d) 4'd0: q = 1'b0; endcase
            priority if (d[0]) q = 1'b1;
         end",
    );
    let block = &first_block(&m).children[0];
    let unique = &block.children[0];
    assert!(unique.get_bool_attribute("full_case"));
    assert!(unique.get_bool_attribute("parallel_case"));
    let priority = &block.children[1];
    assert!(priority.get_bool_attribute("full_case"));
    assert!(!priority.get_bool_attribute("parallel_case"));
}

#[test]
fn for_loops() {
    let m = body("integer i; reg [3:0] q; always @* for (i = 0; i < 4; i = i + 1) q[i] = d[i];");
    let for_loop = &first_block(&m).children[0];
    assert_eq!(for_loop.kind, AstKind::For);
    assert_eq!(
        kinds(for_loop),
        vec![AstKind::AssignEq, AstKind::Lt, AstKind::AssignEq, AstKind::Block]
    );
}

#[test]
fn for_loop_inline_declaration() {
    let m = body("reg [3:0] q; always @* for (int i = 0; i < 4; i++) q[i] = d[i];");
    let wrapper = &first_block(&m).children[0];
    assert_eq!(wrapper.kind, AstKind::Block);
    assert!(wrapper.name.starts_with("$fordecl_block$"));
    assert_eq!(kinds(wrapper), vec![AstKind::Wire, AstKind::For]);
    assert_eq!(wrapper.children[0].name, "i");
    assert!(wrapper.children[0].is_signed());

    let msgs = parse_err(
        "module m; reg [3:0] q; always @* for (integer i = 0; i < 4; i = i + 1) q[i] = 0; endmodule",
        &ParseOptions::verilog(),
    );
    assert!(mentions(
        &msgs,
        "For loop inline variable declaration is only supported in SystemVerilog mode!"
    ));
}

#[test]
fn while_and_repeat() {
    let m = body("integer i; initial begin while (i < 4) i = i + 1; repeat (3) i = i - 1; end");
    let block = &first_block(&m).children[0];
    assert_eq!(kinds(block), vec![AstKind::While, AstKind::Repeat]);
    assert_eq!(block.children[1].children[1].kind, AstKind::Block);
}

#[test]
fn task_calls() {
    let m = body("initial begin $display(\"%d\", d); $finish; end");
    let block = &first_block(&m).children[0];
    assert_eq!(kinds(block), vec![AstKind::TCall, AstKind::TCall]);
    assert_eq!(block.children[0].name, "$display");
    assert_eq!(block.children[0].children.len(), 2);
    assert_eq!(block.children[1].name, "$finish");
}

#[test]
fn unnamed_blocks_with_declarations_get_names() {
    let m = body("initial begin begin integer k; k = 0; end begin end end");
    let outer = &first_block(&m).children[0];
    assert!(outer.name.is_empty());
    assert!(outer.children[0].name.starts_with("$unnamed_block$"));
    assert!(outer.children[1].name.is_empty());

    let root = parse_v("module m; initial begin integer k; k = 0; end endmodule");
    let block = &first_block(module(&root, "m")).children[0];
    assert!(block.name.is_empty());
}

#[test]
fn block_labels() {
    let m = body("initial begin : outer end : outer");
    assert_eq!(first_block(&m).children[0].name, "outer");

    let msgs = parse_err(
        "module m; initial begin : a end : b endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(mentions(&msgs, "Begin label (a) and end label (b) don't match."));
    let msgs = parse_err(
        "module m; initial begin end : b endmodule",
        &ParseOptions::system_verilog(),
    );
    assert!(mentions(&msgs, "Begin label missing where end label (b) was given."));
}

#[test]
fn delays_are_skipped() {
    let m = body("reg q; initial begin #10 q = 1'b0; q <= #2 1'b1; end");
    let block = &first_block(&m).children[0];
    assert_eq!(kinds(block), vec![AstKind::AssignEq, AstKind::AssignLe]);
}

#[test]
fn tasks_and_functions() {
    let root = parse_sv(
        "module m;
            function automatic [7:0] add(input [7:0] a, b);
                add = a + b;
            endfunction
            task t(input x, output y);
                y = x;
            endtask : t
        endmodule",
    );
    let m = module(&root, "m");
    let func = m.find_child(AstKind::Function).unwrap();
    assert_eq!(func.name, "add");
    let args: Vec<_> = func
        .children
        .iter()
        .filter(|c| c.is_input())
        .map(|c| (c.name.as_str(), c.port_id))
        .collect();
    assert_eq!(args, vec![("a", 1), ("b", 2)]);
    let task = m.find_child(AstKind::Task).unwrap();
    assert_eq!(task.name, "t");
    assert!(task.find_named("y").unwrap().is_output());
}

#[test]
fn argument_direction_required_in_verilog() {
    let msgs = parse_err(
        "module m; function f(a); f = a; endfunction endmodule",
        &ParseOptions::verilog(),
    );
    assert!(mentions(&msgs, "task/function argument direction missing"));
}

#[test]
fn deeply_nested_blocks_are_rejected() {
    with_large_stack(|| {
        let nested = |depth: usize| {
            format!(
                "module m(input a); reg r; always @* {} r = a; {} endmodule",
                "begin ".repeat(depth),
                "end ".repeat(depth)
            )
        };
        let msgs = parse_err(&nested(20000), &ParseOptions::verilog());
        assert!(mentions(&msgs, "Nesting too deep"));
        parse_v(&nested(50));
    });
}
