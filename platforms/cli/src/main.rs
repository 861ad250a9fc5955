use clap::{ArgAction, Parser, ValueEnum};
use serde_json::json;
use std::error::Error;
use std::io::{self, Read};
use std::path::Path;
use tmsim::{
    analyze, Definition, DefinitionLoader, Format, HaltReason, SimulationResult,
    TuringMachineError, DEFAULT_MAX_STEPS,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const RULE_WIDTH: usize = 80;

/// Simulates a single-tape Turing machine with a memory register.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli demos/unary-increment.tm
  tmsim-cli demos/even-ones.json --string 1111 --max-steps 50
  cat demos/unary-increment.tm | tmsim-cli --format tm")]
struct Cli {
    /// Path to a machine definition (.tm or .json).
    /// If not provided, the definition is read from stdin.
    definition: Option<String>,

    /// Input to simulate instead of the definition's simulation strings. Can be repeated.
    #[clap(short, long = "string")]
    strings: Vec<String>,

    /// Maximum number of steps per simulation, guarding against infinite loops.
    #[clap(long, env = "TMSIM_MAX_STEPS", default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Format of a definition read from stdin.
    #[clap(long, value_enum, default_value_t = FormatArg::Tm)]
    format: FormatArg,

    /// Only print the verdict of each simulation, not every step.
    #[clap(short, long)]
    quiet: bool,

    /// Print the results as JSON.
    #[clap(long)]
    json: bool,

    /// Refuse to simulate if the analyzer reports anything.
    #[clap(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Tm,
    Json,
}

impl From<FormatArg> for Format {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Tm => Format::Text,
            FormatArg::Json => Format::Json,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let definition = match load_definition(&cli) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let diagnostics = analyze(&definition.machine);
    for diagnostic in &diagnostics {
        warn!("{}", diagnostic);
    }
    if cli.strict && !diagnostics.is_empty() {
        eprintln!(
            "Error: {} analyzer finding(s), refusing to simulate in strict mode",
            diagnostics.len()
        );
        std::process::exit(1);
    }

    let inputs = if cli.strings.is_empty() {
        definition.simulation_strings.clone()
    } else {
        cli.strings.clone()
    };

    if inputs.is_empty() {
        println!("No simulation strings configured in the definition and none given with --string.");
        return Ok(());
    }

    info!(
        name = definition.name.as_deref().unwrap_or("<unnamed>"),
        inputs = inputs.len(),
        max_steps = cli.max_steps,
        "simulating"
    );

    let results = definition.machine.run_batch(&inputs, cli.max_steps);
    let failed = results.iter().any(Result::is_err);

    if cli.json {
        print_json(&inputs, &results)?;
    } else {
        for (i, (input, result)) in inputs.iter().zip(&results).enumerate() {
            print_simulation(i + 1, input, result, cli.max_steps, cli.quiet);
        }
    }

    if failed {
        std::process::exit(1);
    }

    Ok(())
}

/// Installs the stderr log subscriber. `-v` flags take precedence over `RUST_LOG`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Loads the definition from the given path, or from stdin when it is piped.
fn load_definition(cli: &Cli) -> Result<Definition, String> {
    if let Some(path) = &cli.definition {
        DefinitionLoader::load(Path::new(path)).map_err(|e| e.to_string())
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        DefinitionLoader::load_from_str(&buffer, cli.format.into()).map_err(|e| e.to_string())
    } else {
        Err("No definition given. Pass a .tm or .json file, or pipe one via stdin.".to_string())
    }
}

fn print_simulation(
    index: usize,
    input: &str,
    result: &Result<SimulationResult, TuringMachineError>,
    max_steps: usize,
    quiet: bool,
) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Simulation {} | input = {:?}", index, input);

    match result {
        Ok(result) => {
            if !quiet {
                for snapshot in &result.history {
                    println!("{}", snapshot);
                }
                println!("{}", "-".repeat(RULE_WIDTH));
            }

            println!("Final state : {}", result.final_state);
            println!("Final tape  : {}", result.final_tape);
            println!("Steps       : {}", result.steps());
            if result.accepted {
                println!("Result      : ACCEPTED");
            } else {
                println!("Result      : REJECTED");
            }

            if result.halted_by == HaltReason::MaxSteps {
                println!(
                    "[Warning] Reached the maximum of {} steps. Possible infinite loop.",
                    max_steps
                );
            }
        }
        Err(e) => println!("Error       : {}", e),
    }

    println!("{}", "=".repeat(RULE_WIDTH));
    println!();
}

fn print_json(
    inputs: &[String],
    results: &[Result<SimulationResult, TuringMachineError>],
) -> Result<(), serde_json::Error> {
    let report: Vec<_> = inputs
        .iter()
        .zip(results)
        .map(|(input, result)| match result {
            Ok(result) => json!({ "input": input, "result": result }),
            Err(e) => json!({ "input": input, "error": e.to_string() }),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
