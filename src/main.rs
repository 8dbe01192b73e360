use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use log::{debug, error};

use origin::{
    driver::{compile_file, def_path, make_def, render_all, CompileOptions, TARGETS},
    errors::errors::DriverError,
};

/// Front end for the Origin language
#[derive(Parser, Debug)]
#[command(name = "originc")]
#[command(version)]
struct Cli {
    /// Project directory (project mode)
    project: Option<PathBuf>,

    /// List the available targets
    #[arg(long)]
    targets: bool,

    /// Target to emit
    #[arg(long, default_value = "ast")]
    target: String,

    /// Output path, stdout when absent
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Directory whose .og and .odef files are added to the unit
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    includes: Vec<PathBuf>,

    /// Compile a single file
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Parse only and write a definition file (default `<file>.odef`)
    #[arg(long)]
    make_def: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("originc: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the input was free of errors.
fn run(cli: Cli) -> Result<bool, DriverError> {
    if cli.targets {
        for target in TARGETS {
            println!("{}", target);
        }
        return Ok(true);
    }

    let Some(file) = cli.file else {
        if cli.project.is_some() {
            return Err(DriverError::ProjectMode);
        }
        eprintln!("originc: no input, pass --file <PATH>");
        return Ok(false);
    };

    if cli.make_def {
        let (bytes, source, diagnostics) = make_def(&file)?;
        eprint!("{}", render_all(&diagnostics, &[source]));
        if diagnostics.has_errors() {
            return Ok(false);
        }

        let output = cli.output.unwrap_or_else(|| def_path(&file));
        write_output(&output, &bytes)?;
        debug!("wrote {}", output.display());
        return Ok(true);
    }

    let options = CompileOptions {
        file,
        includes: cli.includes,
        target: cli.target,
        output: cli.output,
    };
    let result = compile_file(&options)?;
    eprint!("{}", result.render_diagnostics());
    if result.diagnostics.has_errors() {
        return Ok(false);
    }

    let emitted = result.emit(&options.target)?;
    match &options.output {
        Some(path) => write_output(path, emitted.as_bytes())?,
        None => print!("{}", emitted),
    }
    Ok(true)
}

fn write_output(path: &PathBuf, bytes: &[u8]) -> Result<(), DriverError> {
    fs::write(path, bytes).map_err(|source| DriverError::Io {
        path: path.clone(),
        source,
    })
}
