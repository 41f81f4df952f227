use std::fmt;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use quiz_core::model::{Lifeline, OptionKey, Phase, QuestionBank};
use quiz_core::parser::parse_bank;
use quiz_core::time::Clock;
use services::{QuizSession, RunnerEvent, SessionRunner};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--bank <path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --bank questions.txt");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK  bank file path (overridden by --bank)");
    eprintln!("  QUIZ_LOG   log filter, e.g. debug (default: warn)");
    eprintln!();
    eprintln!("During a question: a-d answer, 50 fifty-fifty, skip, quit.");
}

struct Args {
    bank_path: String,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut bank_path = std::env::var("QUIZ_BANK")
            .ok()
            .unwrap_or_else(|| "questions.txt".to_string());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bank" => {
                    bank_path = args
                        .next()
                        .ok_or(ArgsError::MissingValue { flag: "--bank" })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { bank_path })
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("QUIZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_bank(path: &str) -> Result<QuestionBank, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read bank file {path}: {err}"))?;
    let bank = parse_bank(&source)
        .map_err(|err| format!("bank file {path} is malformed: {err}"))?;
    Ok(bank)
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn render_question(session: &QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    let progress = session.progress();

    println!();
    println!(
        "Question {} of {}  |  Score: {}",
        progress.answered + 1,
        progress.total,
        progress.score
    );
    println!(
        "{} ({} points, {} seconds)",
        question.prompt(),
        question.point_value(),
        question.time_limit_secs()
    );
    for key in OptionKey::ALL {
        if session.eliminated_options().contains(&key) {
            continue;
        }
        println!("  {}) {}", key.letter(), question.option_text(key));
    }

    let mut hints = Vec::new();
    if progress.eliminate_two_available {
        hints.push("50 = fifty-fifty");
    }
    if progress.skip_available {
        hints.push("skip");
    }
    hints.push("quit");
    println!("[{}]", hints.join(", "));
}

fn render_summary(session: &QuizSession) {
    match session.summary() {
        Ok(summary) => {
            println!();
            println!(
                "Final score: {} / {}",
                summary.total_score(),
                summary.max_score()
            );
            println!(
                "Correct: {}  Incorrect: {}  Timed out: {}  Skipped: {}",
                summary.correct(),
                summary.incorrect(),
                summary.timed_out(),
                summary.skipped()
            );
        }
        Err(err) => eprintln!("could not build summary: {err}"),
    }
}

//
// ─── SESSION LOOP ──────────────────────────────────────────────────────────────
//

enum LoopControl {
    Continue,
    Quit,
}

fn handle_command(runner: &mut SessionRunner, line: &str) -> LoopControl {
    let command = line.trim().to_ascii_lowercase();

    match runner.session().phase() {
        Phase::SessionComplete => LoopControl::Quit,
        Phase::QuestionClosed => {
            if command == "quit" || command == "q" {
                return LoopControl::Quit;
            }
            // Any other input moves on; the prompt said so.
            if advance_and_render(runner) {
                LoopControl::Continue
            } else {
                LoopControl::Quit
            }
        }
        Phase::AwaitingAnswer => match command.as_str() {
            "quit" | "q" => LoopControl::Quit,
            "50" => {
                match runner.use_lifeline(Lifeline::EliminateTwo) {
                    Ok(feedback) => {
                        let gone: Vec<String> =
                            feedback.eliminated.iter().map(ToString::to_string).collect();
                        println!("Eliminated options {}.", gone.join(" and "));
                        render_question(runner.session());
                    }
                    Err(err) => println!("{err}"),
                }
                LoopControl::Continue
            }
            "skip" => {
                match runner.use_lifeline(Lifeline::SkipQuestion) {
                    Ok(_) => {
                        println!("Question skipped.");
                        prompt_next();
                    }
                    Err(err) => println!("{err}"),
                }
                LoopControl::Continue
            }
            "" => {
                render_question(runner.session());
                LoopControl::Continue
            }
            _ => {
                let Ok(key) = command.parse::<OptionKey>() else {
                    println!("Answer with a-d, or one of: 50, skip, quit.");
                    return LoopControl::Continue;
                };
                match runner.submit_answer(key) {
                    Ok(feedback) => {
                        if feedback.correct {
                            println!("Correct! +{} points.", feedback.score_delta);
                        } else {
                            println!("Wrong answer.");
                        }
                        prompt_next();
                    }
                    Err(err) => println!("{err}"),
                }
                LoopControl::Continue
            }
        },
    }
}

fn prompt_next() {
    println!("(press Enter for the next question)");
}

/// Advance past a closed question; false once the session is complete.
fn advance_and_render(runner: &mut SessionRunner) -> bool {
    match runner.advance() {
        Ok(Phase::AwaitingAnswer) => {
            render_question(runner.session());
            true
        }
        Ok(_) => false,
        Err(err) => {
            eprintln!("{err}");
            true
        }
    }
}

async fn run_session(runner: &mut SessionRunner) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    render_question(runner.session());

    while !runner.session().is_complete() {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if matches!(handle_command(runner, &line), LoopControl::Quit) {
                    break;
                }
            }
            event = runner.next_event() => {
                match event {
                    Some(RunnerEvent::Tick { remaining_secs }) if remaining_secs <= 5 => {
                        println!("  {remaining_secs}s left...");
                    }
                    Some(RunnerEvent::Tick { .. }) => {}
                    Some(RunnerEvent::TimeUp) => {
                        println!("Time's up!");
                        prompt_next();
                    }
                    None => break,
                }
            }
        }
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|err| {
        eprintln!("{err}");
        print_usage();
        err
    })?;

    let bank = load_bank(&args.bank_path)?;
    if bank.is_empty() {
        println!("The bank at {} holds no questions.", args.bank_path);
    }

    let mut runner = SessionRunner::start(bank, Clock::default());
    run_session(&mut runner).await?;
    if runner.session().is_complete() {
        render_summary(runner.session());
    } else {
        println!();
        println!("Session abandoned at score {}.", runner.session().score());
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
