// main.rs
//
// The driver: parse the command line, assemble every input, link, then
// hand the image to the interpreter. The guest's exit status becomes the
// process exit status; every fatal path prints to stderr and exits
// non-zero.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rivulet::config::{Config, DEFAULT_TIMEOUT};
use rivulet::debug::DebugManager;
use rivulet::device::Device;
use rivulet::interpreter::{Interpreter, Outcome};
use rivulet::{assemble, link};

#[derive(Parser, Debug)]
#[command(version, about = "Assemble, link, and simulate RV32I programs")]
struct Cli {
    /// Assembly source files, linked in order
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Single-step with the interactive debugger
    #[arg(long)]
    debug: bool,

    /// Print the section layout after linking
    #[arg(long)]
    detail: bool,

    /// Maximum number of instructions to retire
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TIMEOUT)]
    timeout: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config {
        input_files: cli.files,
        debug: cli.debug,
        detail: cli.detail,
        timeout: cli.timeout,
    };

    match run(&config) {
        Ok(code) => ExitCode::from(code as u8),
        Err(message) => {
            eprintln!("{:#}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> anyhow::Result<i32> {
    let build_start = Instant::now();

    let mut objects = Vec::with_capacity(config.input_files.len());
    for path in &config.input_files {
        let name = path.display().to_string();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", name))?;
        objects.push(assemble(&name, &source)?);
    }
    let image = link(&objects)?;

    info!("Build time: {}ms", build_start.elapsed().as_millis());
    if config.detail {
        for section in &image.sections {
            info!(
                "Section {:<7} at [0x{:x}, 0x{:x})",
                section.kind.name(),
                section.start,
                section.end()
            );
        }
    }

    let interpret_start = Instant::now();
    let mut interpreter = Interpreter::new(&image, Device::system());
    let result = if config.debug {
        let mut manager = DebugManager::new();
        interpreter.run_debug(config.timeout, &mut manager)
    } else {
        interpreter.run(config.timeout)
    };
    info!("Interpret time: {}ms", interpret_start.elapsed().as_millis());

    match result {
        Ok(Outcome::Exit(code)) => Ok(code),
        Ok(Outcome::TimeLimitExceeded) => anyhow::bail!("Time Limit Exceeded"),
        Err(trap) => anyhow::bail!(
            "{}",
            trap.what(&interpreter.regs, &interpreter.mem, &interpreter.dev)
        ),
    }
}
