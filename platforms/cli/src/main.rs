use clap::Parser;
use penrose::config::{
    parse_max_steps, parse_max_tape_len, parse_verbosity, DEFAULT_MAX_STEPS, DEFAULT_MAX_TAPE_LEN,
};
use penrose::{
    decode, render_listing, Limits, Machine, PenroseError, ProgramManager, SourceLoader,
    TuringMachine, Verbosity, PROGRAMS,
};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Execute a Penrose-style Turing machine as described in "The Emperor's New Mind".
///
/// The machine specification (in Penrose's binary encoding) and the initial tape can be
/// given inline or as files; files take precedence. Without a tape, the decoded machine is
/// listed with state numbers in hexadecimal. With a tape, the verbosity level selects
/// between the final answer and a step-by-step trace.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  penrose --tm 101011010111101010
  penrose --tm 101011010111101010 --tape 111
  penrose --program unary-add --tape 11011 -v2
  cat un_plus_1.tm | penrose --tape 111")]
struct Cli {
    /// Turing machine specification
    #[clap(short = 'm', long = "tm", value_name = "TM")]
    tm: Option<String>,

    /// Read the Turing machine specification from FILE
    #[clap(long = "tm-file", value_name = "FILE")]
    tm_file: Option<PathBuf>,

    /// Use a built-in machine instead of a specification
    #[clap(short, long, value_name = "NAME")]
    program: Option<String>,

    /// Initial tape
    #[clap(short, long)]
    tape: Option<String>,

    /// Read the initial tape from FILE
    #[clap(long, value_name = "FILE")]
    tape_file: Option<PathBuf>,

    /// Stop if the number of cells in the working tape exceeds N
    #[clap(long, value_name = "N", default_value_t = DEFAULT_MAX_TAPE_LEN, value_parser = parse_max_tape_len)]
    max_tape_length: usize,

    /// Stop if the number of steps exceeds N
    #[clap(long, value_name = "N", default_value_t = DEFAULT_MAX_STEPS, value_parser = parse_max_steps)]
    max_steps: u64,

    /// Trace level: -v or -v1 prints changed cells, -vv or -v2 prints every step
    #[clap(
        short = 'v',
        long,
        value_name = "LEVEL",
        num_args = 0..=1,
        default_value = "0",
        default_missing_value = "1",
        value_parser = parse_verbosity
    )]
    verbosity: Verbosity,

    /// List the decoded machine as JSON instead of text
    #[clap(long)]
    json: bool,

    /// List the built-in programs and exit
    #[clap(long)]
    list_programs: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        debug!(error = ?e, "run failed");
        report(&e, io::stderr().lock());
        process::exit(1);
    }
}

/// Prints the one-line description of a fatal error.
fn report<W: Write>(error: &PenroseError, mut stderr: W) {
    // Nothing left to do if stderr itself is gone.
    let _ = writeln!(stderr, "{error}");
}

fn run(cli: &Cli) -> Result<(), PenroseError> {
    let mut out = BufWriter::new(io::stdout().lock());

    if cli.list_programs {
        for program in PROGRAMS.iter() {
            writeln!(out, "{:<16} {}", program.name, program.description)?;
        }
        out.flush()?;
        return Ok(());
    }

    // Configuration is checked before any decoding.
    let limits = Limits::new(cli.max_tape_length, cli.max_steps)?;
    let verbosity = cli.verbosity;

    let machine = load_machine(cli)?;
    let tape = SourceLoader::load(cli.tape.as_deref(), cli.tape_file.as_deref())?;

    match tape {
        None if cli.json => {
            let json = serde_json::to_string_pretty(&machine)
                .map_err(|e| PenroseError::FileError(e.to_string()))?;
            writeln!(out, "{json}")?;
        }
        None => write!(out, "{}", render_listing(&machine))?,
        Some(tape) => {
            let engine = TuringMachine::new(&machine, limits);
            let discovery = engine.run(&tape, verbosity, &mut out)?;
            debug!(
                steps = discovery.steps,
                tape_len = discovery.tape_len,
                "machine halted"
            );
        }
    }

    out.flush()?;
    Ok(())
}

/// Resolves the machine from a built-in program, a specification file, an inline
/// specification, or piped stdin, in that order.
fn load_machine(cli: &Cli) -> Result<Machine, PenroseError> {
    if let Some(name) = &cli.program {
        return Ok(ProgramManager::get_program_by_name(name)?.machine.clone());
    }

    let spec = match SourceLoader::load(cli.tm.as_deref(), cli.tm_file.as_deref())? {
        Some(spec) => spec,
        None if atty::isnt(atty::Stream::Stdin) => SourceLoader::load_reader(io::stdin().lock())?,
        None => {
            return Err(PenroseError::InvalidConfig(
                "a Turing machine specification is required (--tm, --tm-file, --program, or stdin)"
                    .to_string(),
            ))
        }
    };

    decode(&spec)
}
