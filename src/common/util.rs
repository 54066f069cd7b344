// Copyright (c) 2016-2021 Fabian Schuiki

//! Traits shared by the syntax nodes.

/// Describes syntax nodes in diagnostics and log output.
pub trait HasDesc {
    /// A short name for what this is, such as "module" or "wire".
    fn desc(&self) -> &'static str;

    /// A description that includes the node's name if it has one, such as
    /// "module `top`".
    fn desc_full(&self) -> String {
        self.desc().into()
    }
}
