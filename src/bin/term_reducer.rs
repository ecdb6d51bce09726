use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use term_reducer::{OperDefs, ReduceError, read_term};

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reduces one term per input line
    Reduce {
        /// Input file with operator definitions
        #[arg(short, long)]
        defs: Option<PathBuf>,
        /// Input file with terms (standard input if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Start from an empty operator table instead of the standard one
        #[arg(long)]
        no_iso: bool,
    },
    /// Prints the operator table
    Ops {
        /// Input file with operator definitions
        #[arg(short, long)]
        defs: Option<PathBuf>,
        /// Start from an empty operator table instead of the standard one
        #[arg(long)]
        no_iso: bool,
    },
}

fn load_opers(defs: Option<&Path>, no_iso: bool) -> Result<OperDefs> {
    let mut opers = if no_iso {
        OperDefs::new()
    } else {
        OperDefs::iso()
    };
    if let Some(path) = defs {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        opers
            .define_opers(&text)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    Ok(opers)
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Reduce {
            defs,
            input,
            no_iso,
        } => {
            let opers = load_opers(defs.as_deref(), no_iso)?;
            let mut failed = 0;
            for (line_no, line) in open_input(input.as_deref())?.lines().enumerate() {
                let line = line?;
                let line = line.trim();
                if line.is_empty() || line.starts_with('%') {
                    continue;
                }
                match read_term(line, &opers) {
                    Ok(term) => println!("{}.", term),
                    Err(e) => match e.downcast_ref::<ReduceError>() {
                        Some(ReduceError::Internal(_)) => return Err(e),
                        _ => {
                            failed += 1;
                            eprintln!("line {}: {:#}", line_no + 1, e);
                        }
                    },
                }
            }
            log::info!("Terms rejected: {}", failed);
        }
        Commands::Ops { defs, no_iso } => {
            let opers = load_opers(defs.as_deref(), no_iso)?;
            for triplet in opers.iter() {
                for def in triplet.defs() {
                    println!("{}.", def);
                }
            }
        }
    }

    Ok(())
}
