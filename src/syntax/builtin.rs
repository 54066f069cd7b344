// Copyright (c) 2016-2021 Fabian Schuiki

//! System functions and tasks that the parser treats specially.

macro_rules! declare_builtins {(
    $( ($konst: ident, $string: expr) )*
) => {
    /// A system identifier with dedicated handling in the parser.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub enum Builtin {
        $($konst,)*
    }

    impl Builtin {
        /// Look up a builtin by its name, including the leading `$`.
        pub fn from_name(name: &str) -> Option<Builtin> {
            match name {
                $($string => Some(Builtin::$konst),)*
                _ => None,
            }
        }

        /// The name of this builtin, including the leading `$`.
        pub fn as_str(self) -> &'static str {
            match self {
                $(Builtin::$konst => $string,)*
            }
        }
    }
}}

declare_builtins! {
    (Signed,    "$signed")
    (Unsigned,  "$unsigned")
    (InitState, "$initstate")
    (AnyConst,  "$anyconst")
    (AnySeq,    "$anyseq")
    (AllConst,  "$allconst")
    (AllSeq,    "$allseq")
    (Setup,     "$setup")
    (Hold,      "$hold")
    (SetupHold, "$setuphold")
    (Removal,   "$removal")
    (Recovery,  "$recovery")
    (RecRem,    "$recrem")
    (Skew,      "$skew")
    (TimeSkew,  "$timeskew")
    (FullSkew,  "$fullskew")
    (NoChange,  "$nochange")
}

impl Builtin {
    /// Whether the builtin may appear without an argument list, in which case
    /// it is still turned into a function call.
    pub fn is_pseudo_function(self) -> bool {
        match self {
            Builtin::InitState
            | Builtin::AnyConst
            | Builtin::AnySeq
            | Builtin::AllConst
            | Builtin::AllSeq => true,
            _ => false,
        }
    }

    /// Whether this is a timing check permitted in specify blocks.
    pub fn is_timing_check(self) -> bool {
        match self {
            Builtin::Setup
            | Builtin::Hold
            | Builtin::SetupHold
            | Builtin::Removal
            | Builtin::Recovery
            | Builtin::RecRem
            | Builtin::Skew
            | Builtin::TimeSkew
            | Builtin::FullSkew
            | Builtin::NoChange => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        assert_eq!(Builtin::from_name("$signed"), Some(Builtin::Signed));
        assert_eq!(Builtin::from_name("$display"), None);
        assert_eq!(Builtin::SetupHold.as_str(), "$setuphold");
        assert!(Builtin::AnyConst.is_pseudo_function());
        assert!(!Builtin::Signed.is_pseudo_function());
        assert!(Builtin::Skew.is_timing_check());
        assert!(!Builtin::InitState.is_timing_check());
    }
}
