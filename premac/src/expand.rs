//! The macro expansion engine.
//!
//! One forward pass with a restart after every substitution: the scanner
//! resumes at the splice point, so text introduced by a replacement is
//! itself a candidate for further expansion. A single counter across the
//! whole pass bounds self-referential macro sets.

use crate::error::PreprocessError;
use crate::macro_def::MacroTable;
use crate::scan::{self, ArgSpan};
use log::trace;

/// Result of one expansion pass over a buffer.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Expansion {
    /// Expansion ran to the end of the buffer.
    Complete(String),
    /// A function-like argument list ran off the end of the buffer; the
    /// caller must append the next logical line and re-submit the whole
    /// text.
    Incomplete(String),
}

pub(crate) struct Expander<'a> {
    table: &'a MacroTable,
    max_expansions: usize,
    /// Resolve `defined(X)` ahead of table lookup; enabled only while an
    /// expression is being evaluated.
    bind_defined: bool,
}

impl<'a> Expander<'a> {
    pub(crate) fn new(table: &'a MacroTable, max_expansions: usize) -> Self {
        Expander {
            table,
            max_expansions,
            bind_defined: false,
        }
    }

    pub(crate) fn with_defined(mut self) -> Self {
        self.bind_defined = true;
        self
    }

    /// Rewrite `text` until no further replacement applies.
    pub(crate) fn expand(&self, text: &str) -> Result<Expansion, PreprocessError> {
        let mut buf = text.to_string();
        let mut pos = 0usize;
        let mut expansions = 0usize;
        loop {
            let Some(span) = scan::next_identifier(&buf, pos)? else {
                break;
            };
            let name = buf[span.clone()].to_string();

            if self.bind_defined && name == "defined" {
                match scan::find_arguments(&buf, span.end)? {
                    ArgSpan::None => pos = span.end,
                    ArgSpan::Unterminated => return Ok(Expansion::Incomplete(buf)),
                    ArgSpan::Found { open, close } => {
                        let args = scan::split_arguments(&buf[open + 1..close])?;
                        if args.len() != 1 {
                            return Err(PreprocessError::ArityMismatch {
                                name,
                                expected: "1".to_string(),
                                found: args.len(),
                            });
                        }
                        let replacement = if self.table.contains(&args[0]) { "1" } else { "0" };
                        buf.replace_range(span.start..close + 1, replacement);
                        pos = span.start;
                    }
                }
                continue;
            }

            let Some(mac) = self.table.get(&name) else {
                pos = span.end;
                continue;
            };

            if expansions >= self.max_expansions {
                return Err(PreprocessError::ExpansionLimit(buf.trim().to_string()));
            }

            let (replacement, splice_end) = if mac.is_function_like() {
                match scan::find_arguments(&buf, span.end)? {
                    // a function-like macro name with no argument list is
                    // not an invocation
                    ArgSpan::None => {
                        pos = span.end;
                        continue;
                    }
                    ArgSpan::Unterminated => return Ok(Expansion::Incomplete(buf)),
                    ArgSpan::Found { open, close } => {
                        let mut args = scan::split_arguments(&buf[open + 1..close])?;
                        if args.len() == 1 && args[0].is_empty() && mac.fixed_arity() == 0 {
                            args.clear();
                        }
                        mac.check_arity(args.len())?;
                        (mac.substitute(&args)?, close + 1)
                    }
                }
            } else {
                (mac.body().to_string(), span.end)
            };

            trace!("expand {name} -> {replacement}");
            buf.replace_range(span.start..splice_end, &replacement);
            // restart at the splice point: the replacement may itself begin
            // or complete another invocation
            pos = span.start;
            expansions += 1;
        }
        Ok(Expansion::Complete(buf))
    }
}
