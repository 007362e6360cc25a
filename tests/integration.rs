//! Integration tests for the cxx2py pipeline.
//!
//! These tests exercise the stages the way the binary wires them together
//! (parse -> prune -> generate -> write), feeding in dump text directly so
//! no clang installation is needed.

use cxx2py::ast::parser::parse_dump;
use cxx2py::ast::prune::{PrunePolicy, prune};
use cxx2py::codegen::{Bindings, generate};
use cxx2py::{render_symbols, write_artifacts};

/// Dump of a header declaring a free function, a namespace-nested free
/// function, and a static member function, mirroring the shapes clang
/// emits for:
///
/// ```c++
/// int foo(int);
/// namespace ns {
///   namespace ns2 { double bar(double); }
///   class BarCls { public: static int fun(); };
/// }
/// ```
const FOO_DUMP: &str = "\
TranslationUnitDecl 0x1000 <<invalid sloc>> <invalid sloc>
|-TypedefDecl 0x1004 <<invalid sloc>> <invalid sloc> implicit __int128_t '__int128'
|-FunctionDecl 0x1010 <foo.hpp:1:1, col:20> col:5 foo 'int (int)'
| `-ParmVarDecl 0x1020 <col:9, col:13> col:13 x 'int'
`-NamespaceDecl 0x1030 <foo.hpp:3:1, line:12:1> line:3:11 ns
  |-NamespaceDecl 0x1040 <line:4:3, line:6:3> line:4:13 ns2
  | `-FunctionDecl 0x1050 <line:5:5, col:32> col:12 bar 'double (double)'
  |   `-ParmVarDecl 0x1060 <col:23, col:30> col:30 y 'double'
  `-CXXRecordDecl 0x1070 <line:8:3, line:11:3> line:8:9 class BarCls definition
    |-AccessSpecDecl 0x1080 <line:9:3, col:10> col:3 public
    `-CXXMethodDecl 0x1090 <line:10:5, col:26> col:16 fun 'int ()' static
";

fn pipeline(dump: &str, modulename: &str, headers: &[&str]) -> Bindings {
    let raw = parse_dump(dump).expect("dump should parse");
    let tree = prune(&raw, &PrunePolicy::default());
    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    generate(&tree, modulename, &headers).expect("generation should succeed")
}

fn export_list(bindings: &Bindings) -> Vec<String> {
    bindings
        .manifest
        .contents
        .lines()
        .filter_map(|line| {
            line.strip_prefix("__all__.append(\"")
                .and_then(|rest| rest.strip_suffix("\")"))
                .map(str::to_string)
        })
        .collect()
}

// ---------- End-to-end generation ----------

#[test]
fn export_list_covers_exactly_the_bindable_declarations() {
    let bindings = pipeline(FOO_DUMP, "libfoo", &["foo.hpp"]);
    assert_eq!(export_list(&bindings), vec!["foo", "ns__ns2__bar", "ns__BarCls__fun"]);
}

#[test]
fn each_symbol_gets_its_own_shim_accessor() {
    let bindings = pipeline(FOO_DUMP, "libfoo", &["foo.hpp"]);
    for (symbol, qualified) in [
        ("foo", "foo"),
        ("ns__ns2__bar", "ns::ns2::bar"),
        ("ns__BarCls__fun", "ns::BarCls::fun"),
    ] {
        let accessor = format!("extern \"C\" intptr_t get_{symbol}_address()");
        assert_eq!(
            bindings.shim.contents.matches(&accessor).count(),
            1,
            "expected one accessor for {symbol}"
        );
        assert!(
            bindings
                .shim
                .contents
                .contains(&format!("std::addressof({qualified})")),
            "expected address of {qualified}"
        );
        assert!(
            bindings
                .manifest
                .contents
                .contains(&format!("_lib.get_{symbol}_address()")),
            "expected the manifest to call the {symbol} accessor"
        );
    }
}

#[test]
fn implicit_builtin_typedefs_never_reach_the_output() {
    let bindings = pipeline(FOO_DUMP, "libfoo", &["foo.hpp"]);
    assert!(!bindings.manifest.contents.contains("__int128_t"));
    assert!(!bindings.shim.contents.contains("__int128_t"));
}

#[test]
fn private_section_members_are_not_bound() {
    let dump = "\
TranslationUnitDecl 0x1000 <<invalid sloc>> <invalid sloc>
`-NamespaceDecl 0x1010 <api.h:1:1, line:9:1> line:1:11 ns
  `-CXXRecordDecl 0x1020 <line:2:1, line:8:1> line:2:7 class Service definition
    |-CXXMethodDecl 0x1030 <line:3:3, col:26> col:16 open 'int ()' static
    |-AccessSpecDecl 0x1040 <line:4:1, col:9> col:1 private
    |-CXXMethodDecl 0x1050 <line:5:3, col:28> col:18 inner 'int ()' static
    |-AccessSpecDecl 0x1060 <line:6:1, col:8> col:1 public
    `-CXXMethodDecl 0x1070 <line:7:3, col:27> col:17 shut 'int ()' static
";
    let bindings = pipeline(dump, "svc", &["api.h"]);
    assert_eq!(export_list(&bindings), vec!["ns__Service__open", "ns__Service__shut"]);
}

#[test]
fn repeated_runs_produce_byte_identical_artifacts() {
    let first = pipeline(FOO_DUMP, "libfoo", &["foo.hpp"]);
    let second = pipeline(FOO_DUMP, "libfoo", &["foo.hpp"]);
    assert_eq!(first.shim, second.shim);
    assert_eq!(first.manifest, second.manifest);
}

#[test]
fn raw_tree_survives_pruning_for_diagnostics() {
    let raw = parse_dump(FOO_DUMP).unwrap();
    let node_count = raw.len();
    let pruned = prune(&raw, &PrunePolicy::default());
    assert!(pruned.len() < node_count);
    // The raw tree still renders in full afterwards.
    assert!(raw.render().contains("TypedefDecl"));
    assert!(!pruned.render().contains("TypedefDecl"));
}

// ---------- Artifact writing ----------

#[test]
fn write_artifacts_places_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let bindings = pipeline(FOO_DUMP, "libfoo", &["foo.hpp"]);

    write_artifacts(dir.path(), &bindings, false).unwrap();

    let shim = std::fs::read_to_string(dir.path().join("cxx2py_libfoo.cpp")).unwrap();
    let manifest = std::fs::read_to_string(dir.path().join("libfoo.py")).unwrap();
    assert_eq!(shim, bindings.shim.contents);
    assert_eq!(manifest, bindings.manifest.contents);
}

#[test]
fn write_artifacts_fails_cleanly_on_a_missing_directory() {
    let bindings = pipeline(FOO_DUMP, "libfoo", &["foo.hpp"]);
    let missing = std::path::Path::new("/nonexistent/cxx2py");
    let err = write_artifacts(missing, &bindings, false).unwrap_err();
    assert!(err.to_string().contains("cxx2py_libfoo.cpp"));
}

// ---------- Symbol listing ----------

#[test]
fn text_listing_is_one_symbol_per_line() {
    let bindings = pipeline(FOO_DUMP, "libfoo", &["foo.hpp"]);
    let listing = render_symbols(&bindings, "text").unwrap();
    assert_eq!(listing, "foo\nns__ns2__bar\nns__BarCls__fun\n");
}

#[test]
fn json_listing_round_trips() {
    let bindings = pipeline(FOO_DUMP, "libfoo", &["foo.hpp"]);
    let listing = render_symbols(&bindings, "json").unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&listing).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1]["symbol"], "ns__ns2__bar");
    assert_eq!(entries[1]["qualified"], "ns::ns2::bar");
    assert_eq!(entries[1]["signature"], "double (double)");
    assert_eq!(entries[2]["name"], "fun");
}

// ---------- Header classification feeding the shim ----------

#[test]
fn only_headers_are_included_by_the_shim() {
    let bindings = pipeline(FOO_DUMP, "libfoo", &["foo.hpp", "extra.h"]);
    assert!(bindings.shim.contents.contains("#include \"foo.hpp\""));
    assert!(bindings.shim.contents.contains("#include \"extra.h\""));
    assert!(!bindings.shim.contents.contains("#include \"foo.cpp\""));
}
