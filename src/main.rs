//! Tasklist CLI - a personal task list kept in sync with a remote store

mod cli;

use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tasklist_auth::{AuthClient, RegisterRequest, SessionGate, TokenStore};
use tasklist_core::{AppError, Config};
use tasklist_services::{Task, TaskClient};
use tasklist_sync::{Confirmation, TaskSynchronizer};

use crate::cli::{join_words, Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<AppError>() {
                Some(app) => {
                    eprintln!("Error: {}", app.user_message());
                    if app.requires_login() {
                        eprintln!("Run `tasklist login <email>` to sign in.");
                    }
                }
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let logging = tasklist_core::init("info")?;
    let config = Config::load()?;

    let level = match config.logging.level.trim() {
        "" => "info",
        level => level,
    };
    logging.set_level(level)?;
    config.check()?;

    let timeout = config.api.request_timeout();
    let gate = SessionGate::new();
    let mut auth = AuthClient::new(&config.api.base_url, gate.clone(), timeout).map_err(AppError::from)?;
    if config.session.persist_token {
        auth = auth.with_store(token_store(&config)?);
    }

    match &config.session.env_token {
        Some(token) => gate.set_token(token.clone()),
        None => {
            if let Err(e) = auth.restore_session() {
                tracing::warn!("Could not restore stored session: {}", e);
            }
        }
    }

    match cli.command {
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            auth.login(&email, &password).await.map_err(AppError::from)?;
            println!("Signed in as {}", email);
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let request = RegisterRequest {
                username,
                email,
                password,
            };
            auth.register(&request).await.map_err(AppError::from)?;
            println!("Account created. Run `tasklist login {}` to sign in.", request.email);
        }
        Commands::Logout => {
            auth.logout().map_err(AppError::from)?;
            println!("Signed out");
        }
        Commands::List => {
            let sync = connect(&config, gate).await?;
            let tasks = sync.tasks();
            if tasks.is_empty() {
                println!("No tasks yet. Add one with `tasklist add <title>`.");
            }
            for task in &tasks {
                print_task(task);
            }
        }
        Commands::Add { title } => {
            let sync = connect(&config, gate).await?;
            let task = sync.create(&join_words(&title)).await.map_err(AppError::from)?;
            print_task(&task);
        }
        Commands::Toggle { id } => {
            let sync = connect(&config, gate).await?;
            let task = sync.toggle(&id).await.map_err(AppError::from)?;
            print_task(&task);
        }
        Commands::Rename { id, title } => {
            let sync = connect(&config, gate).await?;
            sync.begin_edit(&id, Confirmation::Confirmed)
                .map_err(AppError::from)?;
            sync.set_draft(&join_words(&title));
            match sync.commit_edit().await.map_err(AppError::from)? {
                Some(task) => print_task(&task),
                None => println!("Title unchanged"),
            }
        }
        Commands::Remove { id, yes } => {
            let sync = connect(&config, gate).await?;
            let confirmation = if yes {
                Confirmation::Confirmed
            } else {
                let title = sync.task(&id).map(|t| t.title).unwrap_or_else(|| id.clone());
                confirm(&format!("Delete \"{}\"?", title))?
            };
            if sync.remove(&id, confirmation).await.map_err(AppError::from)? {
                println!("Deleted {}", id);
            } else {
                println!("Kept {}", id);
            }
        }
    }

    Ok(())
}

/// Build the synchronizer and fetch the current list
async fn connect(config: &Config, gate: SessionGate) -> Result<TaskSynchronizer<TaskClient>> {
    let timeout = config.api.request_timeout();
    let client = TaskClient::new(&config.api.base_url, gate, timeout).map_err(AppError::from)?;
    let sync = TaskSynchronizer::new(client).with_timeout(timeout);
    sync.load().await.map_err(AppError::from)?;
    Ok(sync)
}

fn token_store(config: &Config) -> Result<TokenStore> {
    match &config.session.token_file {
        Some(path) => Ok(TokenStore::new(path)),
        None => Ok(TokenStore::default_location().map_err(AppError::from)?),
    }
}

fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    println!("[{}] {}  {}", mark, task.id, task.title);
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let line = prompt("Password: ")?;
    if line.is_empty() {
        anyhow::bail!("No password provided");
    }
    Ok(line)
}

/// Ask a yes/no question. Anything but "y"/"yes" declines, as does a
/// non-interactive stdin.
fn confirm(question: &str) -> Result<Confirmation> {
    if !io::stdin().is_terminal() {
        return Ok(Confirmation::Declined);
    }
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(Confirmation::from(matches!(
        answer.to_ascii_lowercase().as_str(),
        "y" | "yes"
    )))
}

fn prompt(text: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", text)?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
