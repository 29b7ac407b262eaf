//! Collaborator interfaces: include resolution, source opening, include
//! filtering, and pragma delegation.
//!
//! Each collaborator is a plain closure behind an `Rc`, with a filesystem
//! default where one makes sense. Swapping them lets the preprocessor run
//! against virtual file sets (tests, archives, editor buffers).

use std::path::{Component, Path, PathBuf};
use std::rc::Rc;
use std::{fs, io};

/// Resolves an include path, as written in the directive, to an absolute
/// file: `(written, local_dir, search_paths) -> resolved`. Returning `None`
/// means the include cannot be found.
pub type IncludeResolver = Rc<dyn Fn(&str, &Path, &[PathBuf]) -> Option<PathBuf>>;

/// Reads the contents of a resolved file as source text.
pub type SourceOpener = Rc<dyn Fn(&Path) -> io::Result<String>>;

/// Predicate deciding whether an `#include` directive is honored at all.
pub type IncludeFilter = Rc<dyn Fn(&str) -> bool>;

/// Receiver for `#pragma` payloads the library does not handle itself.
pub type PragmaHandler = Rc<dyn Fn(&str)>;

/// Default resolver: the including file's directory first, then each search
/// path in order.
pub(crate) fn resolve_path(
    written: &str,
    local_dir: &Path,
    search_paths: &[PathBuf],
) -> Option<PathBuf> {
    let candidate = normalize_path(&local_dir.join(written));
    if candidate.exists() {
        return Some(candidate);
    }
    for dir in search_paths {
        let candidate = normalize_path(&dir.join(written));
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Default opener: read the whole file as UTF-8 text.
pub(crate) fn open_source(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component where possible. No filesystem access.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_lexical() {
        assert_eq!(normalize_path(Path::new("a/./b")), PathBuf::from("a/b"));
        assert_eq!(normalize_path(Path::new("a/x/../b")), PathBuf::from("a/b"));
        assert_eq!(normalize_path(Path::new("../b")), PathBuf::from("../b"));
    }
}
