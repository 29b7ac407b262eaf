//! Filesystem include resolution, exercised against a real directory tree.

use premac::{PreprocessError, Preprocessor, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn includes_resolve_against_search_paths() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "test.h",
        "#define MACRO_A(a, b) (a + b)\n#define MACRO_B(a) (a + 1)\n",
    );

    let mut pp = Preprocessor::new();
    pp.add_include_path(tmp.path());
    pp.include("test.h").unwrap();

    assert_eq!(pp.evaluate("MACRO_A(1, 2)").unwrap(), Value::Int(3));
    assert_eq!(pp.evaluate("MACRO_B(1)").unwrap(), Value::Int(2));
}

#[test]
fn nested_includes_resolve_against_the_including_file() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "usb/USB_Config.h", "#define USB_ENDPOINTS 2\n");
    write(
        tmp.path(),
        "usb/USB_Class.h",
        "#include \"USB_Config.h\"\nint endpoints = USB_ENDPOINTS;\n",
    );

    let mut pp = Preprocessor::new();
    pp.add_include_path(tmp.path());
    pp.include("usb/USB_Class.h").unwrap();

    assert!(pp.source().contains("int endpoints = 2;"));
}

#[test]
fn include_order_is_depth_first() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "inner.h", "int inner;\n");
    write(
        tmp.path(),
        "outer.c",
        "int before;\n#include \"inner.h\"\nint after;\n",
    );

    let mut pp = Preprocessor::new();
    pp.add_include_path(tmp.path());
    pp.include("outer.c").unwrap();

    assert_eq!(pp.source(), "int before;\nint inner;\nint after;\n");
}

#[test]
fn macros_persist_across_included_files() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "config.h", "#define LIMIT 8\n");
    write(tmp.path(), "use.c", "#include \"config.h\"\nint limit = LIMIT;\n");

    let mut pp = Preprocessor::new();
    pp.define("EXTERNAL", Some("1"), None).unwrap();
    pp.add_include_path(tmp.path());
    pp.include("use.c").unwrap();

    assert!(pp.source().contains("int limit = 8;"));
    assert!(pp.is_defined("LIMIT"));
    assert!(pp.is_defined("EXTERNAL"));
}

#[test]
fn missing_file_reports_or_ignores() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "main.c", "#include \"gone.h\"\nint a;\n");

    let mut pp = Preprocessor::new();
    pp.add_include_path(tmp.path());
    let err = pp.include("main.c").unwrap_err();
    assert!(matches!(err, PreprocessError::IncludeNotFound(_)));

    let mut pp = Preprocessor::new();
    pp.add_include_path(tmp.path());
    pp.ignore_missing_includes(true);
    pp.include("main.c").unwrap();
    assert_eq!(pp.source(), "int a;\n");
}

#[test]
fn conditional_guard_pattern_over_files() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "guard.h",
        "#ifndef GUARD_H\n#define GUARD_H\nint guarded;\n#endif\n",
    );
    write(
        tmp.path(),
        "main.c",
        "#include \"guard.h\"\n#include \"guard.h\"\n",
    );

    let mut pp = Preprocessor::new();
    pp.add_include_path(tmp.path());
    pp.include("main.c").unwrap();

    assert_eq!(pp.source().matches("int guarded;").count(), 1);
}
