// Copyright (c) 2016-2021 Fabian Schuiki

//! A recursive-descent parser for Verilog and SystemVerilog.
//!
//! The parser builds the syntax tree in the shape the elaboration backend of
//! a Yosys-style synthesis flow expects. Containers under construction
//! (modules, blocks, generate blocks, case items) live on an explicit stack
//! in the `ParserState`; each grammar function appends its result to the
//! innermost one. Syntax errors are reported and recovered from, such that
//! multiple independent errors can be reported in one pass. Semantic errors
//! are fatal and abort the parse.

mod assertion;
mod decl;
mod expr;
mod generate;
mod inst;
mod module;
mod specify;
mod stmt;

use crate::ast::{AstKind, AstNode};
use crate::lexer::{Lexer, TokenAndSpan};
use crate::state::{Attributes, ParserState};
use crate::token::*;
use crate::ParseOptions;
use std::collections::VecDeque;
use svfront_common::{errors::*, source::*};

/// Return type of the lower parse primitives, allowing for further adjustment
/// of the diagnostic message that would be generated.
type ParseResult<T> = Result<T, DiagBuilder2>;

/// Return type of functions that emit diagnostic messages and only need to
/// communicate success to the parent.
type ReportedResult<T> = Result<T, ()>;

/// An abstraction around concrete parsers.
trait AbstractParser {
    fn peek(&mut self, offset: usize) -> TokenAndSpan;
    fn bump(&mut self);
    fn skip(&mut self);
    fn consumed(&self) -> usize;
    fn last_span(&self) -> Span;
    fn add_diag(&mut self, diag: DiagBuilder2);
    fn severity(&self) -> Severity;
    fn state(&mut self) -> &mut ParserState;
    fn opts(&self) -> &ParseOptions;
    /// Consume the `full_case`/`parallel_case` pragmas immediately preceding
    /// the next token.
    fn take_case_pragmas(&mut self) -> Vec<CasePragma>;

    fn try_eat_ident(&mut self) -> Option<(String, Span)> {
        match self.peek(0) {
            (Ident(name), span) | (EscIdent(name), span) => {
                self.bump();
                Some((name.to_string(), span))
            }
            _ => None,
        }
    }

    fn eat_ident(&mut self, msg: &str) -> ReportedResult<(String, Span)> {
        match self.peek(0) {
            (Ident(name), span) | (EscIdent(name), span) => {
                self.bump();
                Ok((name.to_string(), span))
            }
            (tkn, span) => {
                self.add_diag(
                    DiagBuilder2::error(format!("expected {} before `{}`", msg, tkn)).span(span),
                );
                Err(())
            }
        }
    }

    fn is_ident(&mut self) -> bool {
        match self.peek(0).0 {
            Ident(_) | EscIdent(_) => true,
            _ => false,
        }
    }

    fn require(&mut self, expect: Token) -> ParseResult<()> {
        match self.peek(0) {
            (actual, _) if actual == expect => {
                self.bump();
                Ok(())
            }
            (wrong, span) => Err(DiagBuilder2::error(format!(
                "expected `{}`, but found `{}` instead",
                expect, wrong
            ))
            .span(span)),
        }
    }

    fn require_reported(&mut self, expect: Token) -> ReportedResult<()> {
        match self.require(expect) {
            Ok(x) => Ok(x),
            Err(e) => {
                self.add_diag(e);
                Err(())
            }
        }
    }

    fn try_eat(&mut self, expect: Token) -> bool {
        match self.peek(0) {
            (actual, _) if actual == expect => {
                self.bump();
                true
            }
            _ => false,
        }
    }

    fn recover_balanced(&mut self, terminators: &[Token], eat_terminator: bool) {
        let mut stack = Vec::new();
        loop {
            let (tkn, sp) = self.peek(0);
            if stack.is_empty() {
                for t in terminators {
                    if *t == tkn {
                        if eat_terminator {
                            self.skip();
                        }
                        return;
                    }
                }
            }

            match tkn {
                OpenDelim(x) => stack.push(x),
                CloseDelim(x) => {
                    if let Some(open) = stack.pop() {
                        if open != x {
                            self.add_diag(DiagBuilder2::fatal(format!("found closing `{}` which is not the complement to the previous opening `{}`", CloseDelim(x), OpenDelim(open))).span(sp));
                            break;
                        }
                    } else {
                        self.add_diag(
                            DiagBuilder2::fatal(format!(
                                "found closing `{}` without an earlier opening `{}`",
                                CloseDelim(x),
                                OpenDelim(x)
                            ))
                            .span(sp),
                        );
                        break;
                    }
                }
                Eof => break,
                _ => (),
            }
            self.skip();
        }
    }

    fn is_fatal(&self) -> bool {
        self.severity() >= Severity::Fatal
    }

    fn is_error(&self) -> bool {
        self.severity() >= Severity::Error
    }

    fn anticipate(&mut self, tokens: &[Token]) -> ReportedResult<()> {
        let (tkn, sp) = self.peek(0);
        for t in tokens {
            if *t == tkn {
                return Ok(());
            }
        }
        self.add_diag(
            DiagBuilder2::error(format!(
                "expected {}, but found `{}` instead",
                tokens
                    .iter()
                    .map(|t| format!("`{}`", t))
                    .collect::<Vec<_>>()
                    .join(" or "),
                tkn
            ))
            .span(sp),
        );
        Err(())
    }
}

struct Parser<'a> {
    input: Lexer,
    queue: VecDeque<TokenAndSpan>,
    emitter: &'a dyn DiagEmitter,
    last_span: Span,
    severity: Severity,
    consumed: usize,
    state: ParserState,
    opts: ParseOptions,
}

impl AbstractParser for Parser<'_> {
    fn peek(&mut self, offset: usize) -> TokenAndSpan {
        let mut seen = 0;
        let mut idx = 0;
        loop {
            self.ensure_queue_filled(idx);
            match self.queue.get(idx) {
                Some(&(Pragma(_), _)) => (),
                Some(&tkn) if seen == offset || tkn.0 == Eof => return tkn,
                Some(_) => seen += 1,
                None => return (Eof, self.last_span),
            }
            idx += 1;
        }
    }

    fn bump(&mut self) {
        self.peek(0);
        while let Some(&(Pragma(_), _)) = self.queue.front() {
            self.queue.pop_front();
        }
        if let Some((tkn, sp)) = self.queue.pop_front() {
            if tkn == Eof {
                self.queue.push_front((tkn, sp));
            }
            self.last_span = sp;
            self.consumed += 1;
        }
    }

    fn skip(&mut self) {
        self.bump()
    }

    fn consumed(&self) -> usize {
        self.consumed
    }

    fn last_span(&self) -> Span {
        self.last_span
    }

    fn add_diag(&mut self, diag: DiagBuilder2) {
        // Emit a backtrace for this diagnostic.
        if diag.get_severity() >= Severity::Warning {
            trace!(
                "Diagnostic triggered here:\n{:?}",
                backtrace::Backtrace::new()
            );
        }

        // Keep track of the worst diagnostic severity we've encountered, such
        // that parsing can be aborted accordingly.
        if diag.get_severity() > self.severity {
            self.severity = diag.get_severity();
        }
        self.emitter.emit(diag);
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn state(&mut self) -> &mut ParserState {
        &mut self.state
    }

    fn opts(&self) -> &ParseOptions {
        &self.opts
    }

    fn take_case_pragmas(&mut self) -> Vec<CasePragma> {
        self.peek(0);
        let mut pragmas = Vec::new();
        while let Some(&(Pragma(pragma), _)) = self.queue.front() {
            pragmas.push(pragma);
            self.queue.pop_front();
        }
        pragmas
    }
}

impl<'a> Parser<'a> {
    fn new(input: Lexer, opts: &ParseOptions, emitter: &'a dyn DiagEmitter) -> Parser<'a> {
        Parser {
            input: input,
            queue: VecDeque::new(),
            emitter: emitter,
            last_span: INVALID_SPAN,
            severity: Severity::Note,
            consumed: 0,
            state: ParserState::new(),
            opts: opts.clone(),
        }
    }

    fn ensure_queue_filled(&mut self, min_tokens: usize) {
        if let Some(&(Eof, _)) = self.queue.back() {
            return;
        }
        while self.queue.len() <= min_tokens {
            match self.input.next_token() {
                Ok(tkn) => {
                    let eof = tkn.0 == Eof;
                    self.queue.push_back(tkn);
                    if eof {
                        break;
                    }
                }
                Err(x) => {
                    // Lexical errors are fatal; nothing after them is read.
                    let sp = x.primary_span().unwrap_or(self.last_span);
                    self.add_diag(x);
                    self.queue.push_back((Eof, sp));
                    break;
                }
            }
        }
    }
}

/// Parses the opening delimiter, calls the `inner` function, and parses the
/// closing delimiter. Properly recovers to and including the closing
/// delimiter if the `inner` function throws an error.
fn flanked<R, F>(p: &mut dyn AbstractParser, delim: DelimToken, mut inner: F) -> ReportedResult<R>
where
    F: FnMut(&mut dyn AbstractParser) -> ReportedResult<R>,
{
    p.require_reported(OpenDelim(delim))?;
    match inner(p) {
        Ok(r) => match p.require_reported(CloseDelim(delim)) {
            Ok(_) => Ok(r),
            Err(e) => {
                p.recover_balanced(&[CloseDelim(delim)], true);
                Err(e)
            }
        },
        Err(e) => {
            if !p.is_fatal() {
                p.recover_balanced(&[CloseDelim(delim)], true);
            }
            Err(e)
        }
    }
}

/// If the opening delimiter is present, consumes it, calls the `inner`
/// function, and parses the closing delimiter. Properly recovers to and
/// including the closing delimiter if the `inner` function throws an error.
/// If the opening delimiter is not present, returns `None`.
fn try_flanked<R, F>(
    p: &mut dyn AbstractParser,
    delim: DelimToken,
    inner: F,
) -> ReportedResult<Option<R>>
where
    F: FnMut(&mut dyn AbstractParser) -> ReportedResult<R>,
{
    if p.peek(0).0 == OpenDelim(delim) {
        flanked(p, delim, inner).map(|r| Some(r))
    } else {
        Ok(None)
    }
}

/// Parse a comma-separated list of items, until a terminator token has been
/// reached. The terminator is not consumed. A single trailing comma is
/// accepted.
fn comma_list<R, F, T>(
    p: &mut dyn AbstractParser,
    mut term: T,
    msg: &str,
    mut item: F,
) -> ReportedResult<Vec<R>>
where
    F: FnMut(&mut dyn AbstractParser) -> ReportedResult<R>,
    T: Predicate,
{
    let mut v = Vec::new();
    while !p.is_fatal() && p.peek(0).0 != Eof && !term.matches(p) {
        // Parse the item.
        match item(p) {
            Ok(x) => v.push(x),
            Err(e) => {
                if !p.is_fatal() {
                    term.recover(p, false);
                }
                return Err(e);
            }
        }

        // Try to match the terminator. If it does not, consume a comma. A
        // comma immediately followed by the terminator is allowed.
        if term.matches(p) {
            break;
        } else if p.try_eat(Comma) {
            if term.matches(p) {
                break;
            }
        } else {
            let sp = p.peek(0).1;
            p.add_diag(
                DiagBuilder2::error(format!("expected , or {} after {}", term.describe(), msg))
                    .span(sp),
            );
            term.recover(p, false);
            return Err(());
        }
    }
    Ok(v)
}

/// Same as `comma_list`, but at least one item is required.
fn comma_list_nonempty<R, F, T>(
    p: &mut dyn AbstractParser,
    term: T,
    msg: &str,
    item: F,
) -> ReportedResult<Vec<R>>
where
    F: FnMut(&mut dyn AbstractParser) -> ReportedResult<R>,
    T: Predicate,
{
    let q = p.peek(0).1;
    let v = comma_list(p, term, msg, item)?;
    if v.is_empty() {
        p.add_diag(DiagBuilder2::error(format!("expected at least one {}", msg)).span(q));
        Err(())
    } else {
        Ok(v)
    }
}

/// Parse items separated by commas, up to but excluding a terminator token.
/// Unlike `comma_list`, no trailing comma is allowed and the list may not be
/// empty. Used for declarator lists, which are terminated by `;`.
fn separated<F>(p: &mut dyn AbstractParser, mut item: F) -> ReportedResult<()>
where
    F: FnMut(&mut dyn AbstractParser) -> ReportedResult<()>,
{
    loop {
        item(p)?;
        if p.is_fatal() || !p.try_eat(Comma) {
            return Ok(());
        }
    }
}

/// Call `item` and, if it fails with a syntax error, skip ahead to the
/// terminator.
fn recovered<R, F>(p: &mut dyn AbstractParser, term: Token, mut item: F) -> ReportedResult<R>
where
    F: FnMut(&mut dyn AbstractParser) -> ReportedResult<R>,
{
    match item(p) {
        Ok(x) => Ok(x),
        Err(e) => {
            if !p.is_fatal() {
                p.recover_balanced(&[term], false);
            }
            Err(e)
        }
    }
}

/// Skip ahead past the item that just failed to parse. Stops at `;` (which is
/// consumed) or at one of the `ends` without consuming it.
fn recover_item(p: &mut dyn AbstractParser, ends: &[Token]) {
    if p.is_fatal() {
        return;
    }
    let mut terms = vec![Semicolon];
    terms.extend_from_slice(ends);
    p.recover_balanced(&terms, false);
    p.try_eat(Semicolon);
}

/// Parse items with `item` until one of the `ends` tokens, which is not
/// consumed. Items that fail to parse are skipped.
fn parse_items<F>(p: &mut dyn AbstractParser, ends: &[Token], mut item: F)
where
    F: FnMut(&mut dyn AbstractParser) -> ReportedResult<()>,
{
    loop {
        let (tkn, sp) = p.peek(0);
        if p.is_fatal() || tkn == Eof || ends.contains(&tkn) {
            return;
        }
        let before = p.consumed();
        match item(p) {
            Ok(()) if p.consumed() == before => {
                p.add_diag(DiagBuilder2::error(format!("unexpected `{}`", tkn)).span(sp));
                recover_item(p, ends);
            }
            Ok(()) => (),
            Err(()) => recover_item(p, ends),
        }
    }
}

trait Predicate {
    fn matches(&mut self, _: &mut dyn AbstractParser) -> bool;
    fn recover(&mut self, _: &mut dyn AbstractParser, consume: bool);
    fn describe(&self) -> String;
}

impl Predicate for Token {
    fn matches(&mut self, p: &mut dyn AbstractParser) -> bool {
        p.peek(0).0 == *self
    }

    fn recover(&mut self, p: &mut dyn AbstractParser, consume: bool) {
        p.recover_balanced(&[*self], consume)
    }

    fn describe(&self) -> String {
        self.as_str().into()
    }
}

/// Report a fatal error and abort the current production.
fn fatal<T, S: Into<String>>(p: &mut dyn AbstractParser, msg: S, span: Span) -> ReportedResult<T> {
    p.add_diag(DiagBuilder2::fatal(msg).span(span));
    Err(())
}

/// The deepest nesting of statements and expressions accepted.
const MAX_NESTING: usize = 256;

/// Run `inner` one nesting level deeper. Input nested beyond `MAX_NESTING`
/// levels is rejected before it can exhaust the stack.
fn deeper<R, F>(p: &mut dyn AbstractParser, inner: F) -> ReportedResult<R>
where
    F: FnOnce(&mut dyn AbstractParser) -> ReportedResult<R>,
{
    if p.state().nesting >= MAX_NESTING {
        let sp = p.peek(0).1;
        return fatal(
            p,
            format!("Nesting too deep; at most {} levels are supported.", MAX_NESTING),
            sp,
        );
    }
    p.state().nesting += 1;
    let result = inner(p);
    p.state().nesting -= 1;
    result
}

/// Open a container, parse its contents with `inner`, and close it again.
///
/// While `inner` runs, `node` is the innermost open container and receives
/// the nodes produced by `inner`. If `scope` is set, the container also opens
/// a new typedef scope. The container is closed on every path out of this
/// function; the filled-in node is returned on success.
fn nested<F>(
    p: &mut dyn AbstractParser,
    node: AstNode,
    scope: bool,
    mut inner: F,
) -> ReportedResult<AstNode>
where
    F: FnMut(&mut dyn AbstractParser) -> ReportedResult<()>,
{
    let depth = p.state().ast_stack.len();
    p.state().ast_stack.push(node);
    if scope {
        p.state().types.enter();
    }
    let result = inner(p);
    if scope {
        p.state().types.exit();
    }
    let node = p.state().ast_stack.pop();
    if p.state().ast_stack.len() != depth {
        let sp = p.last_span();
        p.add_diag(DiagBuilder2::bug("container stack out of balance").span(sp));
        return Err(());
    }
    result?;
    node.ok_or(())
}

/// Append a node to the innermost open container.
fn emit(p: &mut dyn AbstractParser, node: AstNode) {
    p.state().push_child(node);
}

/// Check that the label after an `end...` keyword matches the name of the
/// construct it closes.
fn check_label(
    p: &mut dyn AbstractParser,
    element: &str,
    name: Option<&str>,
    label: Option<(String, Span)>,
) -> ReportedResult<()> {
    match (name, label) {
        (None, Some((label, sp))) => fatal(
            p,
            format!("{} missing where end label ({}) was given.", element, label),
            sp,
        ),
        (Some(name), Some((label, sp))) if name != label => fatal(
            p,
            format!(
                "{} ({}) and end label ({}) don't match.",
                element, name, label
            ),
            sp,
        ),
        _ => Ok(()),
    }
}

/// Parse the optional `: label` after a closing keyword.
fn parse_end_label(p: &mut dyn AbstractParser) -> ReportedResult<Option<(String, Span)>> {
    if p.try_eat(Colon) {
        Ok(Some(p.eat_ident("end label")?))
    } else {
        Ok(None)
    }
}

/// Parse any number of `(* ... *)` attribute lists, seeded with the default
/// attributes.
fn parse_attributes(p: &mut dyn AbstractParser) -> ReportedResult<Attributes> {
    let mut attrs = p.state().default_attrs.clone();
    while p.peek(0).0 == AttrBegin {
        p.bump();
        let list = recovered(p, AttrEnd, |p| {
            comma_list(p, AttrEnd, "attribute", parse_attribute)
        });
        p.require_reported(AttrEnd)?;
        attrs.extend(list?);
    }
    Ok(attrs)
}

/// Parse a `{* ... *}` list, replacing the default attributes.
fn parse_defattr(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    p.require_reported(DefattrBegin)?;
    p.state().default_attrs.clear();
    let list = recovered(p, DefattrEnd, |p| {
        comma_list(p, DefattrEnd, "attribute", parse_attribute)
    });
    p.require_reported(DefattrEnd)?;
    p.state().default_attrs = list?.into_iter().collect();
    Ok(())
}

/// Parse a single `name` or `name = expr` attribute.
fn parse_attribute(p: &mut dyn AbstractParser) -> ReportedResult<(String, AstNode)> {
    let (name, sp) = expr::parse_hierarchical_name(p, "attribute name")?;
    let value = if p.try_eat(Operator(Op::Assign)) {
        expr::parse_expr(p)?
    } else {
        AstNode::mkconst_int(1, false, 32, sp)
    };
    Ok((name, value))
}

/// Check whether a user-defined type name, possibly package-qualified,
/// starts at the current token. Returns the name and the number of tokens it
/// spans.
fn peek_type_name(p: &mut dyn AbstractParser) -> Option<(String, usize)> {
    let first = match p.peek(0).0 {
        Ident(n) | EscIdent(n) => n.to_string(),
        _ => return None,
    };
    if p.peek(1).0 == Namespace {
        if let Ident(n) | EscIdent(n) = p.peek(2).0 {
            let qualified = format!("{}::{}", first, n);
            if p.state().types.is_user_type(&qualified) {
                return Some((qualified, 3));
            }
        }
        return None;
    }
    if p.state().types.is_user_type(&first) {
        Some((first, 1))
    } else {
        None
    }
}

/// Parse a source file into a design.
///
/// Returns the design root if no errors were reported through `emitter`.
pub fn parse(input: Lexer, opts: &ParseOptions, emitter: &dyn DiagEmitter) -> Result<AstNode, ()> {
    let mut p = Parser::new(input, opts, emitter);
    let root = parse_design(&mut p);
    if p.is_error() {
        Err(())
    } else {
        Ok(root)
    }
}

fn parse_design(p: &mut dyn AbstractParser) -> AstNode {
    let span = p.peek(0).1;
    p.state().ast_stack.push(AstNode::new(AstKind::Design, span));
    p.state().types.enter();

    while !p.is_fatal() && p.peek(0).0 != Eof {
        match parse_top_item(p) {
            Ok(()) => (),
            Err(()) => recover_item(p, &[]),
        }
    }

    p.state().types.exit();
    let mut root = p
        .state()
        .ast_stack
        .pop()
        .unwrap_or_else(|| AstNode::new(AstKind::Design, span));
    root.span.expand(p.last_span());
    root
}

fn parse_top_item(p: &mut dyn AbstractParser) -> ReportedResult<()> {
    if p.peek(0).0 == DefattrBegin {
        return parse_defattr(p);
    }
    if p.try_eat(Semicolon) {
        return Ok(());
    }
    let attrs = parse_attributes(p)?;
    let (tkn, sp) = p.peek(0);
    match tkn {
        Keyword(Kw::Module) | Keyword(Kw::Macromodule) => {
            module::parse_module(p, attrs, AstKind::Module)
        }
        Keyword(Kw::Interface) => module::parse_module(p, attrs, AstKind::Interface),
        Keyword(Kw::Package) => module::parse_package(p, attrs),
        Keyword(Kw::Typedef) => decl::parse_typedef(p),
        Keyword(Kw::Parameter) | Keyword(Kw::Localparam) => decl::parse_param_decl(p, attrs),
        Keyword(Kw::Task) | Keyword(Kw::Function) => decl::parse_subroutine(p, attrs),
        _ => {
            p.add_diag(
                DiagBuilder2::error(format!(
                    "expected module, interface, package, or declaration, but found `{}` instead",
                    tkn
                ))
                .span(sp),
            );
            Err(())
        }
    }
}
