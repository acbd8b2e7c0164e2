//! Interactive driver: play the dialogue policy by hand against a simulated user.
//!
//! Usage:
//!   usersim                         # read goals and frames as JSON lines on stdin
//!   usersim --random --seed 7       # draw a random goal for every dialogue
//!   usersim --config sim.json -v    # load a configuration file, debug logging
//!
//! Goal line:  {"intent": "search", "artist": "周杰倫", "track": "簡單愛", "genre": ""}
//! Frame line: {"action": "confirm", "intent": "search", "slot": {"artist": "周杰倫"}}
//! A frame line may carry a "belief" object; it is checked against what the user said so far.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use usersim::{
    blank_as_none, BeliefState, DialoguePhase, EvaluationStats, Goal, Intent, Simulator,
    SimulatorConfig,
};

#[derive(Parser)]
#[command(name = "usersim")]
#[command(about = "Goal-directed user simulator driven from stdin")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding search.csv, recommend.csv and info.csv
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// artist -> album -> tracks JSON
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// genre map JSON
    #[arg(long)]
    genre_map: Option<PathBuf>,

    /// Draw a random goal instead of reading one
    #[arg(long)]
    random: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Deserialize)]
struct GoalLine {
    intent: String,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    track: Option<String>,
    #[serde(default)]
    genre: Option<String>,
}

impl GoalLine {
    fn into_goal(self) -> Result<Goal> {
        let intent: Intent = self.intent.parse()?;
        Ok(Goal::new(
            intent,
            blank_as_none(self.artist),
            blank_as_none(self.track),
            blank_as_none(self.genre),
        ))
    }
}

#[derive(Deserialize)]
struct BeliefLine {
    #[serde(default)]
    belief: Option<BeliefState>,
}

fn load_config(args: &Args) -> Result<SimulatorConfig> {
    let mut config = match &args.config {
        Some(path) => SimulatorConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SimulatorConfig::default(),
    };
    if let Some(dir) = &args.template_dir {
        config.data.template_dir = dir.clone();
    }
    if let Some(path) = &args.catalog {
        config.data.catalog = path.clone();
    }
    if let Some(path) = &args.genre_map {
        config.data.genre_map = path.clone();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn prompt(text: &str) -> Result<()> {
    println!("{}", text);
    print!("<<< ");
    io::stdout().flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let config = load_config(&args)?;
    let mut simulator = Simulator::from_config(config).context("Failed to build simulator")?;
    let mut stats = EvaluationStats::default();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if matches!(simulator.phase(), DialoguePhase::Idle | DialoguePhase::Ended) {
            if args.random {
                simulator.set_random_goal()?;
            } else {
                prompt(r#": user goal {"intent": "", "artist": "", "track": "", "genre": ""}"#)?;
                let Some(line) = lines.next() else { break };
                let goal = serde_json::from_str::<GoalLine>(&line?)
                    .context("wrong goal format")
                    .and_then(GoalLine::into_goal);
                match goal {
                    Ok(goal) => simulator.set_goal(goal),
                    Err(err) => {
                        eprintln!("{:#}", err);
                        continue;
                    }
                }
            }
            if let Some(goal) = simulator.goal() {
                println!("goal: {}", goal);
            }
            match simulator.start() {
                Ok(turn) => println!(">>> {}", turn.utterance),
                Err(err) => eprintln!("{}", err),
            }
        }

        prompt(r#": action frame {"action": "?", "intent": "", "slot": {"artist": ""}}"#)?;
        let Some(line) = lines.next() else { break };
        let line = line?;

        if let Ok(BeliefLine { belief: Some(belief) }) = serde_json::from_str::<BeliefLine>(&line) {
            let correct = simulator.check_belief_accuracy(&belief);
            stats.record_turn(correct);
            println!("belief correct: {}", correct);
        }

        match simulator.respond_json(&line) {
            Ok(turn) => {
                println!(">>> {}", turn.utterance);
                if let Some(outcome) = turn.outcome {
                    stats.record_dialogue(&outcome);
                    println!(
                        "Dialogue finished!!! turns:[{}] reward:[{}] success:[{}]",
                        outcome.turns, outcome.reward, outcome.success
                    );
                }
            }
            Err(err) => eprintln!("{}", err),
        }
    }

    println!(
        "ACC turn:[{:.6}]  ACC final:[{:.6}]  AVG turns:[{:.3}]  dialogues:[{}]",
        stats.turn_accuracy(),
        stats.final_accuracy(),
        stats.average_turns(),
        stats.dialogues
    );
    Ok(())
}
