use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "uni-enroll")]
#[command(about = "Enrollment records service for a university course catalog")]
pub struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Apply migrations and serve the HTTP API
    Serve {
        /// Override `server.bind` from the configuration
        #[arg(long)]
        bind: Option<String>,
    },
    /// Create tables and indexes, then exit
    Migrate,
    /// Load courses, students and lecturers from a TOML roster file
    Seed {
        /// Roster file path
        roster: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_overrides() {
        let cli = Cli::parse_from([
            "uni-enroll",
            "--config",
            "enroll.toml",
            "serve",
            "--bind",
            "0.0.0.0:9000",
        ]);

        assert_eq!(cli.config.as_deref(), Some("enroll.toml"));
        match cli.command {
            Command::Serve { bind } => assert_eq!(bind.as_deref(), Some("0.0.0.0:9000")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_seed() {
        let cli = Cli::parse_from(["uni-enroll", "seed", "roster.toml", "-v"]);

        assert!(cli.verbose);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Command::Seed { roster } if roster == "roster.toml"));
    }
}
