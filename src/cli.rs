use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Keep a personal task list in sync with the remote store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show all tasks
    #[command(alias = "ls")]
    List,
    /// Create a task
    #[command(alias = "new")]
    Add {
        /// Task title
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Flip a task between done and not done
    Toggle {
        /// Task ID
        id: String,
    },
    /// Change the title of a task
    Rename {
        /// Task ID
        id: String,
        /// New title
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// Delete a task
    #[command(alias = "rm")]
    Remove {
        /// Task ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Sign in and keep the session token
    Login {
        email: String,
        /// Read from the terminal when omitted
        #[arg(long, env = "TASKLIST_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account (does not sign in)
    Register {
        username: String,
        email: String,
        /// Read from the terminal when omitted
        #[arg(long, env = "TASKLIST_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the session token
    Logout,
}

/// Join trailing words into one title
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multi_word_add() {
        let cli = Cli::try_parse_from(["tasklist", "add", "buy", "oat", "milk"]).unwrap();
        match cli.command {
            Commands::Add { title } => assert_eq!(join_words(&title), "buy oat milk"),
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn remove_defaults_to_prompting() {
        let cli = Cli::try_parse_from(["tasklist", "rm", "42"]).unwrap();
        match cli.command {
            Commands::Remove { id, yes } => {
                assert_eq!(id, "42");
                assert!(!yes);
            }
            _ => panic!("expected remove"),
        }
    }

    #[test]
    fn add_requires_a_title() {
        assert!(Cli::try_parse_from(["tasklist", "add"]).is_err());
    }
}
