use std::process::Command;

use anyhow::{Context, Result};

/// A fully resolved compiler invocation, kept separate from execution so
/// command construction stays testable without a compiler installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// The invocation as a single shell-style line, for verbose output.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Run the command and capture both streams. Failing to launch the
    /// program at all is an error; a non-zero exit is reported through
    /// [`ClangOutput::code`] so the caller can mirror it.
    pub fn run(&self) -> Result<ClangOutput> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("failed to execute '{}'", self.program))?;
        Ok(ClangOutput {
            code: output.status.code().unwrap_or(127),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug)]
pub struct ClangOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ClangOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// AST dump invocation over the input headers.
pub fn dump_command(
    exe: &str,
    dump_flags: &str,
    extra_flags: &str,
    headers: &[String],
) -> CommandSpec {
    let mut args: Vec<String> = dump_flags.split_whitespace().map(str::to_string).collect();
    args.extend(extra_flags.split_whitespace().map(str::to_string));
    args.extend(headers.iter().cloned());
    CommandSpec {
        program: exe.to_string(),
        args,
    }
}

/// Shared-library build over the input sources plus the generated shim.
pub fn build_command(
    exe: &str,
    build_flags: &str,
    extra_flags: &str,
    sources: &[String],
    output: &str,
) -> CommandSpec {
    let mut args: Vec<String> = build_flags.split_whitespace().map(str::to_string).collect();
    args.extend(extra_flags.split_whitespace().map(str::to_string));
    args.extend(sources.iter().cloned());
    args.push("-o".to_string());
    args.push(output.to_string());
    CommandSpec {
        program: exe.to_string(),
        args,
    }
}

/// Ask the compiler where its bundled headers live; declarations from under
/// this prefix are toolchain-internal. Best-effort: any failure simply
/// leaves the prune policy without a default prefix.
pub fn resource_dir(exe: &str) -> Option<String> {
    let output = Command::new(exe).arg("-print-resource-dir").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let dir = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if dir.is_empty() { None } else { Some(dir) }
}
