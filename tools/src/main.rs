mod compile;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Compile and validate conversion dictionaries.
#[derive(Parser)]
#[command(name = "compile_dicts")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a text dictionary into an fst + bincode artifact pair.
    Compile {
        /// Text dictionary, one `key<TAB>value [value...]` record per line.
        input: PathBuf,
        /// Output stem; writes `<stem>.fst` and `<stem>.bincode`.
        out_stem: PathBuf,
    },
    /// Validate a text dictionary without writing anything.
    Check {
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Compile { input, out_stem } => {
            let count = compile::run(&input, &out_stem)?;
            println!(
                "Wrote {} entries to {}.fst and {}.bincode",
                count,
                out_stem.display(),
                out_stem.display()
            );
        }
        Command::Check { input } => {
            let count = compile::check(&input)?;
            println!("{}: {} entries, ok", input.display(), count);
        }
    }
    Ok(())
}
