//! Command-line front end for the premac preprocessor library.

use anyhow::Context;
use clap::Parser;
use premac::Preprocessor;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "premac",
    about = "Expand C-family macros, conditionals, and includes in a source file"
)]
struct Args {
    /// Input file to preprocess; use - for stdin
    input: PathBuf,

    /// Directory to search for include files (repeatable)
    #[arg(short = 'I', long = "include-dir", value_name = "DIR")]
    include_dirs: Vec<PathBuf>,

    /// Define a macro before processing, as NAME or NAME=VALUE
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    defines: Vec<String>,

    /// Undefine a macro before processing
    #[arg(short = 'U', long = "undefine", value_name = "NAME")]
    undefines: Vec<String>,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip #include directives whose target cannot be found
    #[arg(long)]
    ignore_missing_includes: bool,

    /// Bound on macro substitutions per expanded line
    #[arg(long, value_name = "N", default_value_t = premac::DEFAULT_MAX_EXPANSIONS)]
    max_expansions: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut pp = Preprocessor::new();
    pp.ignore_missing_includes(args.ignore_missing_includes);
    pp.set_max_expansions(args.max_expansions);
    pp.add_include_paths(&args.include_dirs);

    for def in &args.defines {
        match def.split_once('=') {
            Some((name, value)) => pp.define(name, Some(value), None)?,
            None => pp.define(def, Some("1"), None)?,
        }
    }
    for name in &args.undefines {
        pp.undefine(name);
    }

    if args.input.as_os_str() == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("reading stdin")?;
        pp.include_source("<stdin>", &source)?;
    } else {
        pp.include(&args.input)
            .with_context(|| format!("processing {}", args.input.display()))?;
    }

    match &args.output {
        Some(path) => std::fs::write(path, pp.source())
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", pp.source()),
    }
    Ok(())
}
