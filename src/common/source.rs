// Copyright (c) 2016-2021 Fabian Schuiki

//! A per-thread table of the source files the front end has seen. Each file is
//! identified by a small integer, which keeps locations and spans lean.

use crate::name::RcStr;
use memmap2::Mmap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::rc::Rc;

pub const INVALID_SOURCE: Source = Source(0);
pub const INVALID_SPAN: Span = Span {
    source: INVALID_SOURCE,
    begin: 0,
    end: 0,
};

/// An opaque handle to a file registered with the source manager.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Source(pub u32);

impl Source {
    /// The path under which this source was registered.
    pub fn get_path(self) -> RcStr {
        get_source_manager().lookup(self, |f| f.path.clone())
    }

    /// The text of this source.
    pub fn get_content(self) -> Rc<dyn SourceContent> {
        get_source_manager().lookup(self, |f| f.content.clone())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 > 0 {
            write!(f, "Source({}; \"{}\")", self.0, self.get_path())
        } else {
            write!(f, "Source(INVALID)")
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.get_path(), f)
    }
}

/// The text of a source file.
pub trait SourceContent {
    /// The entire content as a string slice.
    fn text(&self) -> &str;

    /// Copy the bytes `[begin,end)` into an owned string. Out of range or
    /// misaligned offsets yield an empty string.
    fn extract(&self, begin: usize, end: usize) -> String {
        self.text().get(begin..end).unwrap_or("").to_string()
    }
}

struct SourceFile {
    path: RcStr,
    content: Rc<dyn SourceContent>,
}

/// Assigns IDs to source files and keeps their contents alive.
pub struct SourceManager {
    map: RefCell<HashMap<RcStr, Source>>,
    files: RefCell<Vec<SourceFile>>,
}

impl SourceManager {
    fn new() -> SourceManager {
        SourceManager {
            map: RefCell::new(HashMap::new()),
            files: RefCell::new(Vec::new()),
        }
    }

    fn lookup<F, R>(&self, id: Source, f: F) -> R
    where
        F: FnOnce(&SourceFile) -> R,
    {
        let files = self.files.borrow();
        assert!(id.0 > 0, "invalid source");
        match files.get(id.0 as usize - 1) {
            Some(file) => f(file),
            None => panic!("unknown source file: {:?} >= {}", id.0, files.len()),
        }
    }

    fn register(&self, path: &str, content: Rc<dyn SourceContent>) -> Source {
        let mut files = self.files.borrow_mut();
        let id = Source(files.len() as u32 + 1);
        let path = RcStr::new(path);
        self.map.borrow_mut().insert(path.clone(), id);
        files.push(SourceFile { path, content });
        id
    }

    /// Open a file on disk. The file is mapped into memory and must contain
    /// valid UTF-8. Returns `None` if the file cannot be read. Opening the
    /// same path twice yields the same source.
    pub fn open(&self, filename: &str) -> Option<Source> {
        if let Some(&id) = self.map.borrow().get(filename) {
            return Some(id);
        }
        let file = File::open(filename).ok()?;
        // Empty files cannot be mapped on all platforms.
        let mmap = if file.metadata().ok()?.len() == 0 {
            None
        } else {
            let mmap = unsafe { Mmap::map(&file) }.ok()?;
            std::str::from_utf8(&mmap).ok()?;
            Some(mmap)
        };
        Some(self.register(filename, Rc::new(MappedContent(mmap))))
    }

    /// Register an in-memory file under `filename`. Later calls to `open()`
    /// with that name yield this content. Returns `None` if a source of that
    /// name already exists.
    pub fn add(&self, filename: &str, content: &str) -> Option<Source> {
        if self.map.borrow().contains_key(filename) {
            return None;
        }
        Some(self.register(filename, Rc::new(StringContent(content.to_string()))))
    }
}

/// Get this thread's source manager.
pub fn get_source_manager() -> Rc<SourceManager> {
    thread_local!(static MNGR: Rc<SourceManager> = {
        Rc::new(SourceManager::new())
    });
    MNGR.with(|x| x.clone())
}

struct StringContent(String);

impl SourceContent for StringContent {
    fn text(&self) -> &str {
        &self.0
    }
}

/// Checked to be UTF-8 upon opening.
struct MappedContent(Option<Mmap>);

impl SourceContent for MappedContent {
    fn text(&self) -> &str {
        match self.0 {
            Some(ref mmap) => std::str::from_utf8(mmap).unwrap_or_default(),
            None => "",
        }
    }
}

/// A byte offset into a source file.
#[derive(Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Location {
    pub source: Source,
    pub offset: usize,
}

impl Location {
    pub fn new(source: Source, offset: usize) -> Location {
        Location { source, offset }
    }

    /// Compute the 1-based line and column of this location, together with
    /// the byte offset at which its line starts.
    pub fn human(self) -> (usize, usize, usize) {
        if self.source == INVALID_SOURCE {
            return (0, 0, 0);
        }
        let content = self.source.get_content();
        let before = content.text().get(..self.offset).unwrap_or("");
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line = before.matches('\n').count() + 1;
        let col = before[line_start..].chars().filter(|&c| c != '\r').count() + 1;
        (line, col, line_start)
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}:{}", self.source, self.offset)
    }
}

impl From<Location> for Span {
    fn from(l: Location) -> Span {
        Span::new(l.source, l.offset, l.offset)
    }
}

/// A half-open byte range `[begin,end)` within a source file.
#[derive(Copy, Clone, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub struct Span {
    pub source: Source,
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(source: Source, begin: usize, end: usize) -> Span {
        Span { source, begin, end }
    }

    /// The smallest span covering both `a` and `b`. Spans from different
    /// sources yield `a`.
    pub fn union<S: Into<Span>>(a: S, b: S) -> Span {
        let mut sa = a.into();
        sa.expand(b);
        sa
    }

    /// Grow this span to also cover `other`, if both lie in the same source.
    pub fn expand<S: Into<Span>>(&mut self, other: S) -> &mut Self {
        let o = other.into();
        if self.source == o.source {
            self.begin = self.begin.min(o.begin);
            self.end = self.end.max(o.end);
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.source != INVALID_SOURCE
    }

    pub fn begin(&self) -> Location {
        Location::new(self.source, self.begin)
    }

    pub fn end(&self) -> Location {
        Location::new(self.source, self.end)
    }

    /// The source text covered by this span.
    pub fn extract(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        self.source.get_content().extract(self.begin, self.end)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}:{}-{}", self.source, self.begin, self.end)
    }
}
