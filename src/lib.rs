pub mod ast;
pub mod clang;
pub mod cli;
pub mod codegen;

use std::path::Path;

use anyhow::{Context, Result};

use ast::parser::parse_dump;
use ast::prune::{PrunePolicy, prune};
use cli::Args;
use codegen::{Bindings, generate};

/// Run the pipeline. Returns the process exit code: 0 on success, clang's
/// own exit code when the dump or the build fails.
pub fn run(args: Args) -> Result<i32> {
    let headers = args.header_files();
    let mut sources = args.source_files();

    let dump_cmd = clang::dump_command(
        &args.clang_exe,
        &args.clang_ast_dump_flags,
        &args.clang_extra_flags,
        &headers,
    );
    if args.verbose {
        eprintln!("debug: {}", dump_cmd.display());
    }
    let dump = dump_cmd.run()?;
    if !dump.success() {
        eprint!("{}", dump.stderr);
        return Ok(dump.code);
    }

    let raw = parse_dump(&dump.stdout).context("failed to parse the clang AST dump")?;
    let tree = prune(&raw, &prune_policy(&args));

    if args.verbose {
        eprintln!(
            "debug: {} dump nodes, {} after pruning",
            raw.len(),
            tree.len()
        );
        eprintln!("{}", tree.render());
    }

    if args.dump_ast {
        println!("{}", tree.render());
        return Ok(0);
    }

    let bindings = generate(&tree, &args.modulename, &headers)?;

    if args.list_symbols {
        print!("{}", render_symbols(&bindings, &args.format)?);
        return Ok(0);
    }

    write_artifacts(Path::new("."), &bindings, args.verbose)?;

    if args.build {
        sources.push(bindings.shim.filename.clone());
        let build_cmd = clang::build_command(
            &args.clang_exe,
            &args.clang_build_flags,
            &args.clang_extra_flags,
            &sources,
            &bindings.shared_library_filename(),
        );
        if args.verbose {
            eprintln!("debug: {}", build_cmd.display());
        }
        let build = build_cmd.run()?;
        if !build.success() {
            eprint!("{}", build.stderr);
            return Ok(build.code);
        }
    }

    println!(
        "DONE\n\nAs a quick test, try running:\n\n  \
         LD_LIBRARY_PATH=. python -c \"import {m} as m; print(m.__all__)\"",
        m = args.modulename
    );
    Ok(0)
}

/// Exclusion prefixes for prune rule 5: whatever the user passed, or the
/// compiler's own resource directory when nothing was given.
fn prune_policy(args: &Args) -> PrunePolicy {
    let mut prefixes = args.exclude_prefix.clone();
    if prefixes.is_empty() {
        if let Some(dir) = clang::resource_dir(&args.clang_exe) {
            prefixes.push(dir);
        }
    }
    PrunePolicy::with_prefixes(prefixes)
}

/// The `--list-symbols` report.
pub fn render_symbols(bindings: &Bindings, format: &str) -> Result<String> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&bindings.symbols)
                .context("failed to serialize bound symbols")?;
            Ok(format!("{json}\n"))
        }
        _ => {
            let mut out = String::new();
            for sym in &bindings.symbols {
                out.push_str(&sym.symbol);
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// Write both generated artifacts into `dir`.
pub fn write_artifacts(dir: &Path, bindings: &Bindings, verbose: bool) -> Result<()> {
    for artifact in [&bindings.shim, &bindings.manifest] {
        let path = dir.join(&artifact.filename);
        if verbose {
            eprintln!("debug: writing {}", path.display());
        }
        std::fs::write(&path, &artifact.contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
