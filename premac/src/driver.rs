//! Public driver: directive dispatch and the include orchestrator.

use crate::config::{self, IncludeFilter, IncludeResolver, PragmaHandler, SourceOpener};
use crate::directive::{self, Directive};
use crate::error::PreprocessError;
use crate::eval::{self, Value};
use crate::expand::{Expander, Expansion};
use crate::flow::FlowStack;
use crate::lines::LineAssembler;
use crate::macro_def::{Macro, MacroTable};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Default bound on the number of substitutions performed while expanding a
/// single input string.
pub const DEFAULT_MAX_EXPANSIONS: usize = 4096;

/// A C-family preprocessor instance.
///
/// The macro table persists for the life of the instance and survives across
/// included files; conditional nesting is checked per file. Emitted lines
/// accumulate in order and are retrieved with [`source`].
///
/// [`source`]: Preprocessor::source
pub struct Preprocessor {
    macros: MacroTable,
    flow: FlowStack,
    source_lines: Vec<String>,
    include_paths: Vec<PathBuf>,
    local_dir: PathBuf,
    current_file: Option<PathBuf>,
    include_stack: Vec<PathBuf>,
    included_once: HashSet<PathBuf>,
    ignored_definitions: HashSet<String>,
    resolver: IncludeResolver,
    opener: SourceOpener,
    include_filter: Option<IncludeFilter>,
    pragma_handler: Option<PragmaHandler>,
    ignore_missing: bool,
    max_expansions: usize,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    /// Create a preprocessor with an empty macro table, no open
    /// conditionals, and the filesystem collaborators.
    #[must_use]
    pub fn new() -> Self {
        Preprocessor {
            macros: MacroTable::default(),
            flow: FlowStack::new(),
            source_lines: Vec::new(),
            include_paths: Vec::new(),
            local_dir: PathBuf::new(),
            current_file: None,
            include_stack: Vec::new(),
            included_once: HashSet::new(),
            ignored_definitions: HashSet::new(),
            resolver: Rc::new(config::resolve_path),
            opener: Rc::new(config::open_source),
            include_filter: None,
            pragma_handler: None,
            ignore_missing: false,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }

    /// Replace the include resolver.
    #[must_use]
    pub fn with_include_resolver<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Path, &[PathBuf]) -> Option<PathBuf> + 'static,
    {
        self.resolver = Rc::new(f);
        self
    }

    /// Replace the source opener.
    #[must_use]
    pub fn with_source_opener<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> std::io::Result<String> + 'static,
    {
        self.opener = Rc::new(f);
        self
    }

    /// Install a predicate consulted before any `#include` is honored;
    /// rejected includes are skipped silently.
    #[must_use]
    pub fn with_include_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> bool + 'static,
    {
        self.include_filter = Some(Rc::new(f));
        self
    }

    /// Install a receiver for `#pragma` payloads the library does not
    /// handle itself.
    #[must_use]
    pub fn with_pragma_handler<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        self.pragma_handler = Some(Rc::new(f));
        self
    }

    /// Treat unresolved `#include` directives as silent skips instead of
    /// errors.
    pub fn ignore_missing_includes(&mut self, ignore: bool) {
        self.ignore_missing = ignore;
    }

    /// Change the bound on substitutions per expanded input.
    pub fn set_max_expansions(&mut self, limit: usize) {
        self.max_expansions = limit;
    }

    /// Append a directory to the include search list.
    pub fn add_include_path<P: AsRef<Path>>(&mut self, path: P) {
        self.include_paths
            .push(config::normalize_path(path.as_ref()));
    }

    /// Append several directories to the include search list.
    pub fn add_include_paths<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self.add_include_path(path);
        }
    }

    /// Suppress `#define` directives for the given macro names.
    pub fn ignore_definitions<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.ignored_definitions.insert(name.as_ref().to_string());
        }
    }

    /// Insert or replace a macro. `body` defaults to empty; `params` makes
    /// the macro function-like and is validated for variadic placement.
    ///
    /// # Errors
    /// Returns [`PreprocessError::InvalidParameters`] for a malformed
    /// parameter list.
    pub fn define(
        &mut self,
        name: &str,
        body: Option<&str>,
        params: Option<Vec<String>>,
    ) -> Result<(), PreprocessError> {
        let mac = Macro::new(name, body.unwrap_or(""), params)?;
        debug!("define {name}");
        self.macros.define(mac);
        Ok(())
    }

    /// Remove a macro; absent names are a no-op.
    pub fn undefine(&mut self, name: &str) {
        self.macros.undef(name);
    }

    /// Whether a macro of this name is currently defined.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains(name)
    }

    /// Iterate over the currently defined macros, in no particular order.
    pub fn macros(&self) -> impl Iterator<Item = &Macro> {
        self.macros.iter()
    }

    /// The concatenated emitted output, line terminators preserved.
    #[must_use]
    pub fn source(&self) -> String {
        self.source_lines.concat()
    }

    /// Preprocess the file at `path`, resolving it like an `#include`.
    /// Missing files are an error unless
    /// [`ignore_missing_includes`](Preprocessor::ignore_missing_includes)
    /// is set.
    ///
    /// # Errors
    /// Any [`PreprocessError`] raised while processing the file or its
    /// includes.
    pub fn include<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PreprocessError> {
        self.include_with(path, self.ignore_missing)
    }

    /// Preprocess the file at `path`; `may_ignore` controls whether a
    /// resolution failure is silent.
    ///
    /// # Errors
    /// Any [`PreprocessError`] raised while processing the file or its
    /// includes.
    pub fn include_with<P: AsRef<Path>>(
        &mut self,
        path: P,
        may_ignore: bool,
    ) -> Result<(), PreprocessError> {
        let written = path.as_ref().to_string_lossy().into_owned();
        let Some(resolved) = (self.resolver)(&written, &self.local_dir, &self.include_paths)
        else {
            if may_ignore {
                warn!("ignoring missing include \"{written}\"");
                return Ok(());
            }
            return Err(PreprocessError::IncludeNotFound(written));
        };
        if self.included_once.contains(&resolved) {
            return Ok(());
        }
        if self.include_stack.contains(&resolved) {
            return Err(PreprocessError::IncludeCycle(written));
        }
        let content = (self.opener)(&resolved)?;
        debug!("including {}", resolved.display());
        self.include_stack.push(resolved.clone());
        let result = self.run_file(&resolved, &content);
        self.include_stack.pop();
        result
    }

    /// Preprocess `source` as if it were the contents of a file at `path`;
    /// relative includes resolve against the path's parent directory.
    ///
    /// # Errors
    /// Any [`PreprocessError`] raised while processing the source or its
    /// includes.
    pub fn include_source<P: AsRef<Path>, S: AsRef<str>>(
        &mut self,
        path: P,
        source: S,
    ) -> Result<(), PreprocessError> {
        self.run_file(path.as_ref(), source.as_ref())
    }

    /// Fully expand all macros in `text`.
    ///
    /// # Errors
    /// [`PreprocessError::UnterminatedArguments`] when an argument list runs
    /// off the end of the text, plus any expansion failure.
    pub fn expand<S: AsRef<str>>(&self, text: S) -> Result<String, PreprocessError> {
        let expansion = self.expander().expand(text.as_ref())?;
        match expansion {
            Expansion::Complete(expanded) => Ok(expanded),
            Expansion::Incomplete(rest) => Err(PreprocessError::UnterminatedArguments(
                rest.trim().to_string(),
            )),
        }
    }

    /// Evaluate a macro expression to an integer, boolean, or string value,
    /// with `defined(X)` bound during expansion.
    ///
    /// # Errors
    /// Any expansion failure, or [`PreprocessError::Evaluation`] when the
    /// expanded text is not a valid expression.
    pub fn evaluate<S: AsRef<str>>(&self, expr: S) -> Result<Value, PreprocessError> {
        let expr = expr.as_ref();
        let expansion = self.expander().with_defined().expand(expr)?;
        let expanded = match expansion {
            Expansion::Complete(expanded) => expanded,
            Expansion::Incomplete(rest) => {
                return Err(PreprocessError::UnterminatedArguments(
                    rest.trim().to_string(),
                ));
            }
        };
        eval::evaluate(&expanded).map_err(|reason| PreprocessError::Evaluation {
            expr: expr.to_string(),
            reason,
        })
    }

    /// Truth-test an expression. Every failure, and every string result,
    /// counts as false.
    #[must_use]
    pub fn test_expression<S: AsRef<str>>(&self, expr: S) -> bool {
        match self.evaluate(expr) {
            Ok(Value::Str(_)) | Err(_) => false,
            Ok(value) => value.truthy(),
        }
    }

    fn expander(&self) -> Expander<'_> {
        Expander::new(&self.macros, self.max_expansions)
    }

    /// Process one file's content with the local directory and current-file
    /// markers swapped in, restoring them on every exit path.
    fn run_file(&mut self, path: &Path, content: &str) -> Result<(), PreprocessError> {
        let dir = config::normalize_path(path.parent().unwrap_or_else(|| Path::new("")));
        let prior_dir = std::mem::replace(&mut self.local_dir, dir);
        let prior_file = std::mem::replace(&mut self.current_file, Some(path.to_path_buf()));
        let result = self.run_source(content);
        self.local_dir = prior_dir;
        self.current_file = prior_file;
        result
    }

    fn run_source(&mut self, content: &str) -> Result<(), PreprocessError> {
        let entry_depth = self.flow.depth();
        let mut assembler = LineAssembler::new();
        let mut remainder: Option<String> = None;

        for physical in content.split_inclusive('\n') {
            let Some(logical) = assembler.join(physical) else {
                continue;
            };
            let line = assembler.strip_comments(&logical);
            self.process_line(line, &mut remainder)?;
        }
        // a trailing backslash continuation still holds text; flush it as a
        // final logical line
        if let Some(pending) = assembler.take_pending() {
            let line = assembler.strip_comments(&pending);
            self.process_line(line, &mut remainder)?;
        }

        if assembler.in_comment() {
            return Err(PreprocessError::UnterminatedComment);
        }
        if let Some(rest) = remainder {
            return Err(PreprocessError::UnterminatedArguments(
                rest.trim().to_string(),
            ));
        }
        if self.flow.depth() != entry_depth {
            return Err(PreprocessError::UnterminatedConditional);
        }
        Ok(())
    }

    fn process_line(
        &mut self,
        line: String,
        remainder: &mut Option<String>,
    ) -> Result<(), PreprocessError> {
        if line.is_empty() {
            // swallowed whole by a block comment
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            if let Some(parsed) = directive::parse(trimmed) {
                if parsed.is_conditional() || self.flow.is_active() {
                    self.handle_directive(parsed)?;
                }
            }
            // unrecognized directives are dropped
            return Ok(());
        }
        if !self.flow.is_active() {
            return Ok(());
        }
        let text = match remainder.take() {
            Some(mut prior) => {
                prior.push_str(&line);
                prior
            }
            None => line,
        };
        let expansion = self.expander().expand(&text)?;
        match expansion {
            Expansion::Complete(expanded) => {
                if !expanded.is_empty() {
                    self.source_lines.push(expanded);
                }
            }
            Expansion::Incomplete(rest) => *remainder = Some(rest),
        }
        Ok(())
    }

    fn handle_directive(&mut self, parsed: Directive) -> Result<(), PreprocessError> {
        match parsed {
            Directive::If(expr) => {
                let taken = self.flow.is_active() && self.test_expression(&expr);
                self.flow.enter(taken);
            }
            Directive::Ifdef(name) => {
                let taken = self.flow.is_active() && self.is_defined(&name);
                self.flow.enter(taken);
            }
            Directive::Ifndef(name) => {
                let taken = self.flow.is_active() && !self.is_defined(&name);
                self.flow.enter(taken);
            }
            Directive::Elif(expr) => {
                let taken = self.flow.is_seeking() && self.test_expression(&expr);
                if !self.flow.branch(taken) {
                    return Err(PreprocessError::UnmatchedConditional("elif"));
                }
            }
            Directive::Else => {
                if !self.flow.branch(true) {
                    return Err(PreprocessError::UnmatchedConditional("else"));
                }
            }
            Directive::Endif => {
                if !self.flow.exit() {
                    return Err(PreprocessError::UnmatchedConditional("endif"));
                }
            }
            Directive::Pragma(rest) => self.handle_pragma(&rest),
            Directive::Error(text) => return Err(PreprocessError::ErrorDirective(text)),
            Directive::Warning(text) => warn!("#warning {text}"),
            Directive::Include { path, system: _ } => {
                if self.include_filter.as_ref().is_none_or(|allow| allow(&path)) {
                    self.include_with(&path, self.ignore_missing)?;
                }
            }
            Directive::Undef(name) => self.undefine(&name),
            Directive::DefineObj { name, body } => {
                if !self.ignored_definitions.contains(&name) {
                    self.define(&name, Some(&body), None)?;
                }
            }
            Directive::DefineFn { name, params, body } => {
                if !self.ignored_definitions.contains(&name) {
                    let params = split_parameters(&params);
                    self.define(&name, Some(&body), Some(params))?;
                }
            }
        }
        Ok(())
    }

    fn handle_pragma(&mut self, rest: &str) {
        let rest = rest.trim();
        if rest == "once" {
            if let Some(file) = &self.current_file {
                self.included_once.insert(file.clone());
            }
            return;
        }
        if let Some(handler) = &self.pragma_handler {
            handler(rest);
        }
    }
}

/// Split a define's parameter text on commas. An all-whitespace list means
/// zero parameters; individual entries are validated at define time.
fn split_parameters(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    text.split(',').map(|p| p.trim().to_string()).collect()
}
