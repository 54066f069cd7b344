// Copyright (c) 2016-2021 Fabian Schuiki

//! Utilities to implement diagnostics and error reporting facilities.

use crate::source::Span;
use std::cell::RefCell;
use std::fmt;

/// Emits diagnostic messages.
pub trait DiagEmitter {
    /// Emit a diagnostic message.
    fn emit(&self, diag: DiagBuilder2);
}

impl<'a, T> DiagEmitter for &'a T
where
    T: DiagEmitter + ?Sized,
{
    fn emit(&self, diag: DiagBuilder2) {
        (*self).emit(diag)
    }
}

/// A diagnostic emitter that prints every message to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrEmitter;

impl DiagEmitter for StderrEmitter {
    fn emit(&self, diag: DiagBuilder2) {
        eprintln!("");
        eprintln!("{}", diag);
    }
}

/// A diagnostic emitter that keeps every message for later inspection.
#[derive(Debug, Default)]
pub struct DiagStore {
    diags: RefCell<Vec<DiagBuilder2>>,
}

impl DiagStore {
    pub fn new() -> DiagStore {
        Default::default()
    }

    /// Take the collected diagnostics out of the store.
    pub fn take(&self) -> Vec<DiagBuilder2> {
        std::mem::replace(&mut *self.diags.borrow_mut(), Vec::new())
    }

    /// Check whether any diagnostic of at least the given severity has been
    /// collected.
    pub fn has(&self, severity: Severity) -> bool {
        self.diags.borrow().iter().any(|d| d.severity >= severity)
    }

    /// Return the messages of all diagnostics collected so far.
    pub fn messages(&self) -> Vec<String> {
        self.diags.borrow().iter().map(|d| d.message.clone()).collect()
    }
}

impl DiagEmitter for DiagStore {
    fn emit(&self, diag: DiagBuilder2) {
        self.diags.borrow_mut().push(diag);
    }
}

#[must_use]
#[derive(Clone, Debug)]
pub struct DiagBuilder2 {
    pub severity: Severity,
    pub message: String,
    pub segments: Vec<DiagSegment>,
}

#[derive(Clone, Debug)]
pub enum DiagSegment {
    Span(Span),
    Note(String),
}

/// A diagnostic result type. Either carries the result `T` in the Ok variant,
/// or an assembled diagnostic in the Err variant.
pub type DiagResult2<T> = Result<T, DiagBuilder2>;

impl DiagBuilder2 {
    pub fn new<S: Into<String>>(severity: Severity, message: S) -> DiagBuilder2 {
        DiagBuilder2 {
            severity: severity,
            message: message.into(),
            segments: Vec::new(),
        }
    }

    pub fn bug<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Bug, message)
    }

    pub fn fatal<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Fatal, message)
    }

    pub fn error<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Error, message)
    }

    pub fn warning<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Warning, message)
    }

    pub fn note<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Note, message)
    }

    pub fn segment(self, segment: DiagSegment) -> DiagBuilder2 {
        let mut segments = self.segments;
        segments.push(segment);
        DiagBuilder2 {
            segments: segments,
            ..self
        }
    }

    pub fn span<S: Into<Span>>(self, span: S) -> DiagBuilder2 {
        self.segment(DiagSegment::Span(span.into()))
    }

    pub fn add_note<S: Into<String>>(self, message: S) -> DiagBuilder2 {
        self.segment(DiagSegment::Note(message.into()))
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn get_message(&self) -> &String {
        &self.message
    }

    /// Return the first span attached to this diagnostic, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.segments.iter().find_map(|s| match *s {
            DiagSegment::Span(sp) => Some(sp),
            _ => None,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
    Bug,
}

impl Severity {
    pub fn to_str(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Bug => "compiler bug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl fmt::Display for DiagBuilder2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut colorcode = match self.get_severity() {
            Severity::Bug | Severity::Fatal | Severity::Error => "\x1B[31;1m",
            Severity::Warning => "\x1B[33;1m",
            Severity::Note => "\x1B[36;1m",
        };
        write!(
            f,
            "{}{}:\x1B[m\x1B[1m {}\x1B[m\n",
            colorcode,
            self.get_severity(),
            self.get_message()
        )?;

        for segment in &self.segments {
            match *segment {
                DiagSegment::Span(sp) if sp.is_valid() => {
                    let (line, col, line_offset) = sp.begin().human();
                    let c = sp.source.get_content();

                    // Print the line in question.
                    let text: String = c
                        .text()
                        .get(line_offset..)
                        .unwrap_or("")
                        .chars()
                        .take_while(|c| *c != '\n' && *c != '\r')
                        .collect();
                    write!(
                        f,
                        "  --> {}:{}:{}-{}:\n",
                        sp.source.get_path(),
                        line,
                        col,
                        col + sp.extract().chars().count()
                    )?;
                    write!(f, "   | \n")?;
                    write!(f, "   | ")?;
                    for (mut i, c) in text.char_indices() {
                        i += line_offset;
                        if sp.begin != sp.end {
                            if i == sp.begin {
                                write!(f, "{}", colorcode)?;
                            }
                            if i == sp.end {
                                write!(f, "\x1B[m")?;
                            }
                        }
                        match c {
                            '\t' => write!(f, "    ")?,
                            c => write!(f, "{}", c)?,
                        }
                    }
                    write!(f, "\x1B[m\n")?;
                    write!(f, "   | ")?;

                    // Print the caret markers for the line in question.
                    let mut pd = ' ';
                    for (mut i, c) in text.char_indices() {
                        i += line_offset;
                        let d = if (i >= sp.begin && i < sp.end)
                            || (i == sp.begin && sp.begin == sp.end)
                        {
                            '^'
                        } else {
                            ' '
                        };
                        if d != pd {
                            write!(f, "{}", if d == ' ' { "\x1B[m" } else { colorcode })?;
                        }
                        pd = d;
                        match c {
                            '\t' => write!(f, "{}{}{}{}", d, d, d, d)?,
                            _ => write!(f, "{}", d)?,
                        }
                    }
                    write!(f, "\x1B[m\n")?;
                    colorcode = "\x1B[1m";
                }
                DiagSegment::Span(_) => (),
                DiagSegment::Note(ref message) => {
                    write!(f, "   = \x1B[1mnote:\x1B[m {}\n", message)?
                }
            }
        }

        if self.get_severity() == Severity::Bug {
            write!(
                f,
                "\nYou have encountered a bug in the Verilog front end. Please report it together with a minimal snippet of code to reproduce it.\n"
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::get_source_manager;

    #[test]
    fn severity_order() {
        assert!(Severity::Fatal > Severity::Error);
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Note);
    }

    #[test]
    fn store_collects() {
        let store = DiagStore::new();
        store.emit(DiagBuilder2::warning("careful"));
        assert!(store.has(Severity::Warning));
        assert!(!store.has(Severity::Error));
        store.emit(DiagBuilder2::fatal("boom"));
        assert_eq!(store.messages(), vec!["careful", "boom"]);
        assert_eq!(store.take().len(), 2);
        assert!(store.take().is_empty());
    }

    #[test]
    fn render_location() {
        let source = get_source_manager().add("errors_render.v", "module m;\n  wire x;\n").unwrap();
        let diag = DiagBuilder2::error("bad wire").span(crate::source::Span::new(source, 17, 18));
        let text = format!("{}", diag);
        assert!(text.contains("errors_render.v:2:8-9"));
        assert!(text.contains("bad wire"));
    }
}
