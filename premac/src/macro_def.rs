//! Macro definitions and the macro table.

use crate::error::PreprocessError;
use crate::scan;
use std::collections::HashMap;

/// A preprocessor macro definition.
///
/// Object-like macros have no parameter list and expand wherever their name
/// appears as an identifier. Function-like macros carry a (possibly empty)
/// list of fixed parameters and expand only when invoked with parentheses.
/// A final parameter written `...` (or `name...`) makes the macro variadic;
/// the comma-joined tail binds to `__VA_ARGS__` (or to `name`).
#[derive(Clone, Debug)]
pub struct Macro {
    name: String,
    body: String,
    /// `None` for object-like macros; the fixed parameter names otherwise
    params: Option<Vec<String>>,
    /// Identifier the variadic tail binds to, when the macro is variadic
    va_name: Option<String>,
}

impl Macro {
    /// Build a macro, validating the parameter list: a variadic marker must
    /// be the final parameter and appear exactly once, and every other entry
    /// must be an identifier.
    pub(crate) fn new(
        name: &str,
        body: &str,
        params: Option<Vec<String>>,
    ) -> Result<Self, PreprocessError> {
        let invalid = |reason: String| PreprocessError::InvalidParameters {
            name: name.to_string(),
            reason,
        };
        let mut fixed = None;
        let mut va_name = None;
        if let Some(list) = params {
            let mut names = Vec::with_capacity(list.len());
            for (idx, param) in list.iter().enumerate() {
                if let Some(stem) = param.strip_suffix("...") {
                    if va_name.is_some() {
                        return Err(invalid("more than one variadic parameter".to_string()));
                    }
                    if idx + 1 != list.len() {
                        return Err(invalid("variadic parameter must come last".to_string()));
                    }
                    if stem.is_empty() {
                        va_name = Some("__VA_ARGS__".to_string());
                    } else if scan::is_identifier(stem) {
                        va_name = Some(stem.to_string());
                    } else {
                        return Err(invalid(format!("\"{param}\" is not a valid parameter")));
                    }
                } else if scan::is_identifier(param) {
                    names.push(param.clone());
                } else {
                    return Err(invalid(format!("\"{param}\" is not a valid parameter")));
                }
            }
            fixed = Some(names);
        }
        Ok(Macro {
            name: name.to_string(),
            body: body.to_string(),
            params: fixed,
            va_name,
        })
    }

    /// The macro's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The replacement body as written.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The fixed parameter names, or `None` for an object-like macro.
    pub fn parameters(&self) -> Option<&[String]> {
        self.params.as_deref()
    }

    /// Whether the macro collects a variadic tail.
    pub fn is_variadic(&self) -> bool {
        self.va_name.is_some()
    }

    pub(crate) fn is_function_like(&self) -> bool {
        self.params.is_some()
    }

    pub(crate) fn fixed_arity(&self) -> usize {
        self.params.as_ref().map_or(0, Vec::len)
    }

    /// Enforce the invocation arity: exact for plain function-like macros,
    /// a lower bound for variadics.
    pub(crate) fn check_arity(&self, found: usize) -> Result<(), PreprocessError> {
        let expected = self.fixed_arity();
        let ok = if self.va_name.is_some() {
            found >= expected
        } else {
            found == expected
        };
        if ok {
            return Ok(());
        }
        Err(PreprocessError::ArityMismatch {
            name: self.name.clone(),
            expected: if self.va_name.is_some() {
                format!("at least {expected}")
            } else {
                expected.to_string()
            },
            found,
        })
    }

    /// Single-sweep parameter substitution: every identifier in the body
    /// equal to a parameter name is replaced by that argument's text, and
    /// the variadic binding by the comma-joined tail. Substituted argument
    /// text is not re-scanned for parameter names here; the expansion loop
    /// picks up any macro invocations it introduces.
    pub(crate) fn substitute(&self, args: &[String]) -> Result<String, PreprocessError> {
        let Some(fixed) = &self.params else {
            return Ok(self.body.clone());
        };
        let tail = args.get(fixed.len()..).unwrap_or_default().join(", ");
        let mut out = String::with_capacity(self.body.len());
        let mut pos = 0usize;
        while let Some(span) = scan::next_identifier(&self.body, pos)? {
            out.push_str(&self.body[pos..span.start]);
            let ident = &self.body[span.clone()];
            if let Some(idx) = fixed.iter().position(|p| p == ident) {
                out.push_str(&args[idx]);
            } else if self.va_name.as_deref() == Some(ident) {
                out.push_str(&tail);
            } else {
                out.push_str(ident);
            }
            pos = span.end;
        }
        out.push_str(&self.body[pos..]);
        Ok(out)
    }
}

/// A mapping from name to [`Macro`], unique on name. Later defines
/// overwrite earlier ones; removing an absent name is a no-op.
#[derive(Default)]
pub(crate) struct MacroTable {
    macros: HashMap<String, Macro>,
}

impl MacroTable {
    pub(crate) fn define(&mut self, mac: Macro) {
        self.macros.insert(mac.name.clone(), mac);
    }

    pub(crate) fn undef(&mut self, name: &str) {
        self.macros.remove(name);
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.values()
    }
}
