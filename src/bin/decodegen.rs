//! Decoder generator binary.
//!
//! Reads an ISA specification document and writes the generated decoder and
//! dispatcher sources into a directory.

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use decodegen::compile::Compilation;
use decodegen::error::CompileResult;
use decodegen::{emit, isa};

#[derive(Parser)]
#[command(name = "decodegen", about = "Generate decoder sources from an ISA specification")]
struct Cli {
    /// File with the ISA specification.
    #[arg(short, long, value_name = "FILENAME")]
    isa: PathBuf,

    /// Directory where the decoder will be generated.
    #[arg(short, long = "gen", value_name = "GENERATED_DIR")]
    gen_dir: PathBuf,
}

fn run(cli: &Cli) -> CompileResult<()> {
    let text = fs::read_to_string(&cli.isa)?;
    let spec = isa::parse(&text)?;
    let compilation = Compilation::build(&spec)?;

    // Render every unit before touching the filesystem; an aborted run leaves
    // no partial artifact set behind.
    let files = emit::emit(&compilation);

    fs::create_dir_all(&cli.gen_dir)?;
    for file in &files {
        fs::write(cli.gen_dir.join(file.name), &file.contents)?;
        log::info!("wrote {}", cli.gen_dir.join(file.name).display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
