use chrono::{NaiveDate, NaiveTime};
use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use tomo_core::{MemoryFilter, Persona, Screen, Sender, TomoConfig};
use tomo_reaction::MockReactionService;
use tomo_session::Session;
use tracing::info;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "tomo.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let config = TomoConfig::load_or_default(&args.config);
    info!("Starting Tomo session");

    let reaction = Arc::new(MockReactionService::new(config.reaction.clone()));
    let session = Session::new(reaction, config.session.clone());

    println!("Tomo ready. Type 'help' for commands, 'quit' to exit.");
    print!("> ");
    io::stdout().flush()?;

    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" {
            break;
        }
        if trimmed.is_empty() {
            print!("> ");
            io::stdout().flush()?;
            continue;
        }

        if let Err(e) = dispatch(&session, trimmed).await {
            println!("error: {}", e);
        }

        print!("> ");
        io::stdout().flush()?;
    }

    Ok(())
}

async fn dispatch(session: &Session, line: &str) -> anyhow::Result<()> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    match command {
        "help" => print_help(),
        "onboard" => {
            let [name, persona, time] = rest[..] else {
                anyhow::bail!("usage: onboard <name> <mom|dad|idol|butler> <HH:MM>");
            };
            let persona = Persona::parse(persona)
                .ok_or_else(|| anyhow::anyhow!("unknown persona: {}", persona))?;
            session.complete_onboarding(name, persona, time).await?;
            println!("Welcome, {}! Your companion is {}.", name, persona.label());
        }
        "wake" => {
            session.report_wake_up().await?;
            print_latest_reply(session).await;
        }
        "chore" => {
            session.report_chore(&rest.join(" ")).await?;
            print_latest_reply(session).await;
        }
        "meal" => {
            session.report_meal().await?;
            print_latest_reply(session).await;
        }
        "event" => match rest[..] {
            ["add", date, time, ref title @ ..] if !title.is_empty() => {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
                let time = NaiveTime::parse_from_str(time, "%H:%M")?;
                let id = session.add_event(&title.join(" "), date, time).await?;
                println!("Added event {}", id);
                print_latest_reply(session).await;
            }
            ["rm", id] => {
                session.remove_event(Uuid::parse_str(id)?).await;
                println!("Removed (if it existed).");
            }
            ["list"] => {
                for e in session.snapshot().await.events {
                    println!(
                        "{}  {}  {}{}",
                        e.id,
                        e.when_text(),
                        e.title,
                        if e.prepared { "  [prepared]" } else { "" }
                    );
                }
            }
            _ => anyhow::bail!("usage: event add <YYYY-MM-DD> <HH:MM> <title> | event rm <id> | event list"),
        },
        "memories" => {
            if let Some(raw) = rest.first() {
                let filter = MemoryFilter::parse(raw)
                    .ok_or_else(|| anyhow::anyhow!("unknown filter: {}", raw))?;
                session.select_filter(filter).await;
            }
            for m in session.snapshot().await.filtered_memories() {
                println!(
                    "[{}] {}{}",
                    m.category.label(),
                    m.note.as_deref().unwrap_or("(no note)"),
                    m.color_tag
                        .map(|c| format!("  ({})", c.label()))
                        .unwrap_or_default()
                );
                if let Some(reaction) = &m.reaction {
                    println!("    └ {}", reaction);
                }
            }
        }
        "memo" => {
            session.update_memo(&rest.join(" ")).await?;
            println!("Memo updated.");
        }
        "screen" => {
            let raw = rest.first().copied().unwrap_or_default();
            let screen = Screen::parse(raw)
                .ok_or_else(|| anyhow::anyhow!("unknown screen: {}", raw))?;
            session.select_screen(screen).await;
        }
        "chat" => {
            for msg in session.snapshot().await.chat {
                let who = match msg.sender {
                    Sender::User => "you",
                    Sender::Companion => "tomo",
                };
                println!("{:>4}: {}", who, msg.text);
            }
        }
        "show" => {
            let snap = session.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snap)?);
        }
        "reset" => {
            session.reset_all().await;
            println!("All data cleared.");
        }
        other => anyhow::bail!("unknown command: {} (try 'help')", other),
    }
    Ok(())
}

async fn print_latest_reply(session: &Session) {
    let snap = session.snapshot().await;
    if let Some(msg) = snap
        .chat
        .iter()
        .rev()
        .find(|m| m.sender == Sender::Companion)
    {
        println!("\nTomo: {}\n", msg.text);
    }
}

fn print_help() {
    println!("commands:");
    println!("  onboard <name> <mom|dad|idol|butler> <HH:MM>   complete onboarding");
    println!("  wake                                           report waking up");
    println!("  chore [description]                            report a finished chore");
    println!("  meal                                           report a meal photo");
    println!("  event add <YYYY-MM-DD> <HH:MM> <title>         schedule an event");
    println!("  event rm <id> | event list                     manage events");
    println!("  memories [all|meal|achievement|morning]        list (and filter) memories");
    println!("  memo <text>                                    update the memo (empty clears)");
    println!("  screen <home|calendar|memories|settings>       switch view");
    println!("  chat | show | reset | quit");
}
