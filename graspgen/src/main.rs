//! graspgen - transition dataset generator for the mirror-system trainer.
//!
//! Rolls out the reach-grasp-eat repertoire and writes the executed
//! (before, after, hunger, schema, reward) transitions. A quarter of the
//! dataset comes from isolated steps out of randomized world states, the
//! rest from goal-directed episodes run to satiation or a step cap, so
//! both decorrelated single actions and realistic action chains are
//! represented.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use graspworld::agent::{Agent, FirstEligible};
use graspworld::dataset::{self, Transition};
use graspworld::environment::{ConfigError, Environment, EnvironmentConfig};
use graspworld::schema::Repertoire;
use thiserror::Error;
use tracing::{error, info};

/// Upper bound on actions per episode before a forced reset.
const MAX_ACTIONS_PER_EPISODE: usize = 50;

/// Renew the agent after this many collected episodic transitions.
const AGENT_RENEWAL_PERIOD: usize = 200;

const PROGRESS_EVERY: usize = 200;

#[derive(Debug, Error)]
enum GenError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad environment config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid argument: {0}")]
    Arg(String),
}

#[derive(Debug, Clone)]
struct GenOptions {
    size: usize,
    seed: u64,
    lesion: bool,
    out: PathBuf,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            size: 5000,
            seed: 2026,
            lesion: false,
            out: PathBuf::from("transitions.jsonl"),
        }
    }
}

fn print_help() {
    println!("graspgen - generate reach-grasp-eat transition datasets");
    println!();
    println!("Usage: graspgen [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --size N      total transitions to collect (default 5000)");
    println!("  --seed N      environment PRNG seed (default 2026)");
    println!("  --lesion      use the impaired-motor-control grasp variant");
    println!("  --out PATH    output file; .lz4 selects the compressed");
    println!("                container, anything else JSON Lines");
    println!("  -h, --help    show this help");
}

fn parse_args(args: &[String]) -> Result<Option<GenOptions>, GenError> {
    let mut opts = GenOptions::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" | "help" => return Ok(None),
            "--lesion" => {
                opts.lesion = true;
            }
            "--size" | "--seed" | "--out" => {
                let flag = args[i].clone();
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| GenError::Arg(format!("{flag} needs a value")))?;
                match flag.as_str() {
                    "--size" => {
                        opts.size = value
                            .parse()
                            .map_err(|_| GenError::Arg(format!("bad --size: {value}")))?;
                    }
                    "--seed" => {
                        opts.seed = value
                            .parse()
                            .map_err(|_| GenError::Arg(format!("bad --seed: {value}")))?;
                    }
                    _ => opts.out = PathBuf::from(value),
                }
            }
            other => return Err(GenError::Arg(format!("unknown option: {other}"))),
        }
        i += 1;
    }
    if opts.size == 0 {
        return Err(GenError::Arg("--size must be positive".to_string()));
    }
    Ok(Some(opts))
}

fn collect(opts: &GenOptions) -> Result<Vec<Transition>, GenError> {
    let cfg = EnvironmentConfig {
        seed: opts.seed,
        ..Default::default()
    };
    let mut env = Environment::new(cfg)?;
    let repertoire = Repertoire::standard(opts.lesion);
    let mut policy = FirstEligible;
    let mut agent = Agent::new();

    let mut transitions: Vec<Transition> = Vec::with_capacity(opts.size);

    // Phase 1: isolated steps from randomized states.
    let quarter = opts.size / 4;
    while transitions.len() < quarter {
        env.reset_random();
        agent.hunger = 1.0;
        if let Some(outcome) = agent.act(&mut env, &repertoire, &mut policy) {
            if let Some(t) = Transition::from_step(&agent, &repertoire, outcome) {
                transitions.push(t);
                if transitions.len() % PROGRESS_EVERY == 0 {
                    info!(collected = transitions.len(), phase = "random", "progress");
                }
            }
        }
    }

    // Phase 2: episodic rollouts to satiation.
    env.reset();
    agent = Agent::new();
    let mut since_renewal = 0usize;
    while transitions.len() < opts.size {
        for _ in 0..MAX_ACTIONS_PER_EPISODE {
            let Some(outcome) = agent.act(&mut env, &repertoire, &mut policy) else {
                break;
            };
            if let Some(t) = Transition::from_step(&agent, &repertoire, outcome) {
                transitions.push(t);
                since_renewal += 1;
                if transitions.len() % PROGRESS_EVERY == 0 {
                    info!(
                        collected = transitions.len(),
                        phase = "episodic",
                        "progress"
                    );
                }
            }
            if transitions.len() >= opts.size || agent.sated() {
                break;
            }
        }

        // New episode; occasionally a fresh agent as well.
        agent.hunger = 1.0;
        env.reset();
        if since_renewal >= AGENT_RENEWAL_PERIOD {
            agent = Agent::new();
            since_renewal = 0;
        }
    }

    Ok(transitions)
}

fn write_out(opts: &GenOptions, transitions: &[Transition]) -> Result<(), GenError> {
    let file = File::create(&opts.out)?;
    let mut w = BufWriter::new(file);
    let compressed = opts
        .out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("lz4"));
    if compressed {
        dataset::save(&mut w, transitions)?;
    } else {
        dataset::write_jsonl(&mut w, transitions)?;
    }
    Ok(())
}

fn run(opts: &GenOptions) -> Result<(), GenError> {
    info!(
        size = opts.size,
        seed = opts.seed,
        lesion = opts.lesion,
        out = %opts.out.display(),
        "generating transitions"
    );

    let transitions = collect(opts)?;
    write_out(opts, &transitions)?;

    let rewarded = transitions.iter().filter(|t| t.reward == 1).count();
    info!(
        collected = transitions.len(),
        rewarded, "dataset written"
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(Some(opts)) => opts,
        Ok(None) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            error!("{e}");
            print_help();
            return ExitCode::from(2);
        }
    };

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
