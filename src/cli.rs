use std::path::{Path, PathBuf};

use clap::Parser;

const HEADER_EXTENSIONS: [&str; 3] = ["h", "hpp", "hxx"];

#[derive(Parser, Debug)]
#[command(
    name = "cxx2py",
    version,
    about = "Generate ctypes wrappers to C++ library functions"
)]
pub struct Args {
    /// C++ header/source files (headers: .h, .hpp, .hxx)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Python module name of the generated ctypes wrappers
    #[arg(short, long, default_value = "untitled")]
    pub modulename: String,

    /// Path to the clang compiler
    #[arg(long, default_value = "clang++", value_name = "EXE")]
    pub clang_exe: String,

    /// Override flags for the clang AST dump command
    #[arg(
        long,
        default_value = "-Xclang -ast-dump -fsyntax-only -fno-diagnostics-color",
        value_name = "FLAGS"
    )]
    pub clang_ast_dump_flags: String,

    /// Override flags for the clang shared-library build command
    #[arg(long, default_value = "-shared -fPIC", value_name = "FLAGS")]
    pub clang_build_flags: String,

    /// Extra flags appended to every clang command
    #[arg(long, default_value = "", value_name = "FLAGS")]
    pub clang_extra_flags: String,

    /// Build the shared library after generating the wrappers
    #[arg(long)]
    pub build: bool,

    /// Be verbose
    #[arg(long)]
    pub verbose: bool,

    /// Print the bound symbols instead of writing artifacts, then exit
    #[arg(long)]
    pub list_symbols: bool,

    /// Output format for --list-symbols
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Print the pruned declaration tree instead of writing artifacts,
    /// then exit
    #[arg(long)]
    pub dump_ast: bool,

    /// Treat declarations from headers under this path prefix as
    /// toolchain-internal (repeatable; default: the compiler's resource
    /// directory)
    #[arg(long, value_name = "PATH")]
    pub exclude_prefix: Vec<String>,
}

impl Args {
    /// Input files with a header extension, in argument order.
    pub fn header_files(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|path| is_header(path))
            .map(|path| path.to_string_lossy().into_owned())
            .collect()
    }

    /// The remaining input files, compiled into the shared library.
    pub fn source_files(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|path| !is_header(path))
            .map(|path| path.to_string_lossy().into_owned())
            .collect()
    }
}

fn is_header(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            HEADER_EXTENSIONS.contains(&ext.as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_the_documented_surface() {
        let args = parse(&["cxx2py", "foo.hpp"]);
        assert_eq!(args.modulename, "untitled");
        assert_eq!(args.clang_exe, "clang++");
        assert_eq!(
            args.clang_ast_dump_flags,
            "-Xclang -ast-dump -fsyntax-only -fno-diagnostics-color"
        );
        assert_eq!(args.clang_build_flags, "-shared -fPIC");
        assert_eq!(args.clang_extra_flags, "");
        assert!(!args.build);
        assert!(!args.verbose);
        assert!(!args.list_symbols);
        assert_eq!(args.format, "text");
        assert!(args.exclude_prefix.is_empty());
    }

    #[test]
    fn at_least_one_file_is_required() {
        assert!(Args::try_parse_from(["cxx2py"]).is_err());
    }

    #[test]
    fn modulename_short_flag() {
        let args = parse(&["cxx2py", "-m", "libfoo", "foo.hpp"]);
        assert_eq!(args.modulename, "libfoo");
    }

    #[test]
    fn headers_split_from_sources_by_extension() {
        let args = parse(&["cxx2py", "foo.hpp", "impl.cpp", "api.h", "more.cc", "old.HXX"]);
        assert_eq!(args.header_files(), vec!["foo.hpp", "api.h", "old.HXX"]);
        assert_eq!(args.source_files(), vec!["impl.cpp", "more.cc"]);
    }

    #[test]
    fn extensionless_files_are_sources() {
        let args = parse(&["cxx2py", "Makefile.inc", "noext"]);
        assert!(args.header_files().is_empty());
        assert_eq!(args.source_files(), vec!["Makefile.inc", "noext"]);
    }

    #[test]
    fn format_rejects_unknown_values() {
        assert!(Args::try_parse_from(["cxx2py", "--format", "xml", "f.h"]).is_err());
    }

    #[test]
    fn exclude_prefix_is_repeatable() {
        let args = parse(&[
            "cxx2py",
            "--exclude-prefix",
            "/usr/lib/llvm",
            "--exclude-prefix",
            "/opt/toolchain",
            "f.h",
        ]);
        assert_eq!(
            args.exclude_prefix,
            vec!["/usr/lib/llvm", "/opt/toolchain"]
        );
    }
}
