use std::process;

use clap::Parser;

use cxx2py::cli::Args;

fn main() {
    let args = Args::parse();
    match cxx2py::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    }
}
