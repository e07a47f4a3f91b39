use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;

use leverr::{default_type_env, infer_source, run_source};

/// Leverr is a small, statically typed, pipeline-oriented scripting
/// language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run; starts the interactive shell when omitted.
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.script {
        Some(path) => {
            let source = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            match run_source(&source) {
                Ok(rendered) => println!("{rendered}"),
                Err(diagnostic) => {
                    eprintln!("{}", diagnostic.render(&source));
                    process::exit(1);
                }
            }
        }
        None => shell()?,
    }

    Ok(())
}

/// Line loop: evaluate each line independently, with colon commands for
/// type inspection, environment listing and exit.
fn shell() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("leverr shell - :type <expr>, :env, :quit");
    loop {
        print!("leverr> ");
        stdout.flush()?;

        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == ":quit" || line == ":q" {
            break;
        }
        if line == ":env" {
            for (name, scheme) in default_type_env().sorted_bindings() {
                println!("{} : {}", name, scheme.ty.pretty_names());
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix(":type ") {
            match infer_source(rest) {
                Ok(ty) => println!("{ty}"),
                Err(diagnostic) => eprintln!("{}", diagnostic.render(rest)),
            }
            continue;
        }

        match run_source(line) {
            Ok(rendered) => println!("{rendered}"),
            Err(diagnostic) => eprintln!("{}", diagnostic.render(line)),
        }
    }

    Ok(())
}
