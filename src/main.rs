use anyhow::Result;
use clap::{Parser, Subcommand};
use compass_assistant::AssistantSession;
use compass_client::{format_citations, HttpAnswerClient};
use compass_config::CompassConfig;
use compass_core::{CompassError, Role, Turn, Verdict};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "compass")]
#[command(about = "AI governance assistant with cited answers", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,
    },

    /// Interactive conversation with feedback
    Chat,

    /// Check that the answer service responds
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = load_config(cli.config)?;
    let client = HttpAnswerClient::from_config(&config)?;
    let session = AssistantSession::new(Arc::new(client));

    match cli.command {
        Commands::Ask { question } => {
            let index = session.submit(&question).await?;
            print_turn(&session.turn(index).await?, &config.display.source_prefix);
        }
        Commands::Chat => {
            interactive_chat(&session, &config).await?;
        }
        Commands::Check => {
            check_connectivity(&session, &config).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<CompassConfig> {
    let path = path.unwrap_or_else(CompassConfig::default_config_path);
    if path.exists() {
        info!("Loading configuration from: {:?}", path);
        Ok(CompassConfig::from_yaml(&path)?)
    } else {
        info!("Using default configuration");
        let config = CompassConfig::default();
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, PartialEq)]
enum ChatCommand {
    Quit,
    History,
    Stats,
    Export(Option<PathBuf>),
    Feedback(usize, Verdict),
    Ask(String),
    Unknown(String),
}

fn parse_command(line: &str) -> ChatCommand {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return ChatCommand::Quit;
    }

    let Some(command) = trimmed.strip_prefix(':') else {
        return ChatCommand::Ask(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("history"), None) => ChatCommand::History,
        (Some("stats"), None) => ChatCommand::Stats,
        (Some("export"), path) => ChatCommand::Export(path.map(PathBuf::from)),
        (Some(verb @ ("up" | "down")), Some(index)) => match index.parse() {
            Ok(index) => {
                let verdict = if verb == "up" { Verdict::Positive } else { Verdict::Negative };
                ChatCommand::Feedback(index, verdict)
            }
            Err(_) => ChatCommand::Unknown(trimmed.to_string()),
        },
        _ => ChatCommand::Unknown(trimmed.to_string()),
    }
}

async fn interactive_chat(session: &AssistantSession, config: &CompassConfig) -> Result<()> {
    let prefix = &config.display.source_prefix;

    println!("Compass interactive assistant (session {})", session.id());
    println!("Commands: :up N, :down N, :history, :stats, :export [path], exit");
    println!();

    let stdin = io::stdin();
    loop {
        print!("You> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_command(&line) {
            ChatCommand::Quit => {
                println!("Goodbye!");
                break;
            }
            ChatCommand::History => {
                for turn in &session.history().await {
                    print_turn(turn, prefix);
                }
            }
            ChatCommand::Stats => {
                let summary = session.summary().await;
                println!(
                    "questions: {} | answered: {} | failed: {} | 👍 {} | 👎 {}",
                    summary.questions, summary.answered, summary.failed,
                    summary.positive, summary.negative
                );
            }
            ChatCommand::Export(path) => {
                let transcript = session.transcript().await;
                let path = path.unwrap_or_else(|| config.paths.export_dir.join(transcript.file_name()));
                transcript.write_to(&path)?;
                println!("Saved transcript to {}", path.display());
            }
            ChatCommand::Feedback(index, verdict) => {
                match session.give_feedback(index, verdict).await {
                    Ok(()) => println!("Recorded {:?} for answer [{}]", verdict, index),
                    Err(e) => println!("{e}"),
                }
            }
            ChatCommand::Ask(question) => match session.submit(question.trim_end_matches(['\r', '\n'])).await {
                Ok(index) => print_turn(&session.turn(index).await?, prefix),
                Err(CompassError::EmptyQuery) => continue,
                Err(e) => return Err(e.into()),
            },
            ChatCommand::Unknown(input) => println!("Unknown command: {input}"),
        }
    }

    Ok(())
}

fn print_turn(turn: &Turn, prefix: &str) {
    match turn.role {
        Role::User => println!("[{}] You> {}", turn.index, turn.text),
        Role::System if turn.is_failed() => {
            println!("[{}] Assistant> (no answer: the answer service failed)", turn.index)
        }
        Role::System => {
            println!("[{}] Assistant> {}", turn.index, turn.text);
            if let Some(sources) = format_citations(&turn.citations, prefix) {
                println!("    {sources}");
            }
        }
    }
    println!();
}

async fn check_connectivity(session: &AssistantSession, config: &CompassConfig) -> Result<()> {
    println!("Checking answer service at {}", config.answer_service.endpoint());

    let index = session.submit("Hello, can you hear me?").await?;
    let turn = session.turn(index).await?;
    if turn.is_answer() {
        println!("✅ Success! ({} sources cited)", turn.citations.len());
    } else {
        println!("❌ Failed: the answer service did not respond successfully");
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
