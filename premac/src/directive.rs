//! Recognition of `#`-prefixed directives.
//!
//! Matching is an ordered walk over anchored patterns: conditionals first,
//! then standalone directives, then the two define forms, where the
//! function-like form must be tried before the object-like one. Whitespace
//! between `#` and the keyword is accepted (`#  define` is a define).

use lazy_static::lazy_static;
use regex::Regex;

/// A recognized directive with its payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Directive {
    /// `#if EXPR`
    If(String),
    /// `#ifdef ID`
    Ifdef(String),
    /// `#ifndef ID`
    Ifndef(String),
    /// `#elif EXPR`
    Elif(String),
    /// `#endif`
    Endif,
    /// `#else`
    Else,
    /// `#pragma REST`
    Pragma(String),
    /// `#error TEXT`
    Error(String),
    /// `#warning TEXT`
    Warning(String),
    /// `#include "PATH"` or `#include <PATH>`
    Include {
        /// The path as written between the delimiters
        path: String,
        /// True for the `<...>` form
        system: bool,
    },
    /// `#undef ID`
    Undef(String),
    /// `#define ID(PARAMS) BODY`
    DefineFn {
        /// Macro name
        name: String,
        /// Raw text between the parameter parens
        params: String,
        /// Replacement body, possibly empty
        body: String,
    },
    /// `#define ID BODY`
    DefineObj {
        /// Macro name
        name: String,
        /// Replacement body, possibly empty
        body: String,
    },
}

impl Directive {
    /// Conditional directives maintain the enable stack and must be
    /// dispatched even inside non-active regions.
    pub(crate) fn is_conditional(&self) -> bool {
        matches!(
            self,
            Directive::If(_)
                | Directive::Ifdef(_)
                | Directive::Ifndef(_)
                | Directive::Elif(_)
                | Directive::Endif
                | Directive::Else
        )
    }
}

// The patterns are compile-time constants; failing to build one is a bug.
#[allow(clippy::expect_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("invalid directive pattern")
}

lazy_static! {
    static ref RE_IF: Regex = pattern(r"^#\s*if\s+(.*)$");
    static ref RE_IFDEF: Regex = pattern(r"^#\s*ifdef\s+(\w+)");
    static ref RE_IFNDEF: Regex = pattern(r"^#\s*ifndef\s+(\w+)");
    static ref RE_ELIF: Regex = pattern(r"^#\s*elif\s+(.*)$");
    static ref RE_ENDIF: Regex = pattern(r"^#\s*endif");
    static ref RE_ELSE: Regex = pattern(r"^#\s*else");
    static ref RE_PRAGMA: Regex = pattern(r"^#\s*pragma\s+(.*)$");
    static ref RE_ERROR: Regex = pattern(r"^#\s*error\s+(.*)$");
    static ref RE_WARNING: Regex = pattern(r"^#\s*warning\s+(.*)$");
    static ref RE_INCLUDE_LOCAL: Regex = pattern(r#"^#\s*include\s*"([^"]*)""#);
    static ref RE_INCLUDE_SYSTEM: Regex = pattern(r"^#\s*include\s*<([^>]*)>");
    static ref RE_UNDEF: Regex = pattern(r"^#\s*undef\s+(\w+)");
    static ref RE_DEFINE_FN: Regex = pattern(r"^#\s*define\s+(\w+)\(([^)]*)\)\s*(.*)$");
    static ref RE_DEFINE_OBJ: Regex = pattern(r"^#\s*define\s+(\w+)\s*(.*)$");
}

/// Match a trimmed logical line against the directive table. `None` means
/// the line is either not a directive or an unrecognized one.
pub(crate) fn parse(line: &str) -> Option<Directive> {
    if let Some(c) = RE_IF.captures(line) {
        return Some(Directive::If(c[1].to_string()));
    }
    if let Some(c) = RE_IFDEF.captures(line) {
        return Some(Directive::Ifdef(c[1].to_string()));
    }
    if let Some(c) = RE_IFNDEF.captures(line) {
        return Some(Directive::Ifndef(c[1].to_string()));
    }
    if let Some(c) = RE_ELIF.captures(line) {
        return Some(Directive::Elif(c[1].to_string()));
    }
    if RE_ENDIF.is_match(line) {
        return Some(Directive::Endif);
    }
    if RE_ELSE.is_match(line) {
        return Some(Directive::Else);
    }
    if let Some(c) = RE_PRAGMA.captures(line) {
        return Some(Directive::Pragma(c[1].to_string()));
    }
    if let Some(c) = RE_ERROR.captures(line) {
        return Some(Directive::Error(c[1].to_string()));
    }
    if let Some(c) = RE_WARNING.captures(line) {
        return Some(Directive::Warning(c[1].to_string()));
    }
    if let Some(c) = RE_INCLUDE_LOCAL.captures(line) {
        return Some(Directive::Include {
            path: c[1].to_string(),
            system: false,
        });
    }
    if let Some(c) = RE_INCLUDE_SYSTEM.captures(line) {
        return Some(Directive::Include {
            path: c[1].to_string(),
            system: true,
        });
    }
    if let Some(c) = RE_UNDEF.captures(line) {
        return Some(Directive::Undef(c[1].to_string()));
    }
    if let Some(c) = RE_DEFINE_FN.captures(line) {
        return Some(Directive::DefineFn {
            name: c[1].to_string(),
            params: c[2].to_string(),
            body: c[3].to_string(),
        });
    }
    if let Some(c) = RE_DEFINE_OBJ.captures(line) {
        return Some(Directive::DefineObj {
            name: c[1].to_string(),
            body: c[2].to_string(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_conditionals() {
        assert_eq!(
            parse("#if defined(A) && B"),
            Some(Directive::If("defined(A) && B".to_string()))
        );
        assert_eq!(parse("#ifdef FOO"), Some(Directive::Ifdef("FOO".into())));
        assert_eq!(parse("#ifndef FOO"), Some(Directive::Ifndef("FOO".into())));
        assert_eq!(parse("#elif X == 1"), Some(Directive::Elif("X == 1".into())));
        assert_eq!(parse("#else"), Some(Directive::Else));
        assert_eq!(parse("#endif"), Some(Directive::Endif));
    }

    #[test]
    fn spacing_between_hash_and_keyword() {
        assert_eq!(
            parse("#   define X 1"),
            Some(Directive::DefineObj {
                name: "X".into(),
                body: "1".into()
            })
        );
        assert_eq!(parse("#  endif"), Some(Directive::Endif));
    }

    #[test]
    fn function_like_define_wins_over_object_like() {
        assert_eq!(
            parse("#define ADD(a, b) a + b"),
            Some(Directive::DefineFn {
                name: "ADD".into(),
                params: "a, b".into(),
                body: "a + b".into()
            })
        );
        // a space before the paren makes it object-like with a paren body
        assert_eq!(
            parse("#define F (x)"),
            Some(Directive::DefineObj {
                name: "F".into(),
                body: "(x)".into()
            })
        );
    }

    #[test]
    fn empty_define_body() {
        assert_eq!(
            parse("#define GUARD"),
            Some(Directive::DefineObj {
                name: "GUARD".into(),
                body: String::new()
            })
        );
    }

    #[test]
    fn include_forms() {
        assert_eq!(
            parse("#include \"a/b.h\""),
            Some(Directive::Include {
                path: "a/b.h".into(),
                system: false
            })
        );
        assert_eq!(
            parse("#include <stdio.h>"),
            Some(Directive::Include {
                path: "stdio.h".into(),
                system: true
            })
        );
    }

    #[test]
    fn unknown_directives_do_not_match() {
        assert_eq!(parse("#frobnicate all the things"), None);
        assert_eq!(parse("#error"), None);
        assert_eq!(parse("#include stdio.h"), None);
    }
}
