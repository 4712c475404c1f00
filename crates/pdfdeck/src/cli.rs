use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfdeck")]
#[command(author, version, about)]
#[command(long_about = "A dual-screen PDF presenter.\n\n\
    Groups beamer overlays into slides, finds speaker notes from the file\n\
    name (talk.right.pdf, talk.end.pdf, talk.notes.pdf...) or from pages\n\
    labelled 0, and drives a presenter console.\n\n\
    Examples:\n  \
    pdfdeck talk.pdf                 Rehearse in the presenter console\n  \
    pdfdeck talk.pdf --slide 5       Start on slide 5\n  \
    pdfdeck inspect talk.pdf         Show slides, overlays and notes\n  \
    pdfdeck inspect talk.pdf --json  Same, as JSON")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// PDF file to present
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Increase output verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Args, Clone, Default)]
pub struct SessionArgs {
    /// Start on a specific slide (1-indexed)
    #[arg(long)]
    pub slide: Option<usize>,

    /// One output surface: no separate audience view, freeze is unavailable
    #[arg(long)]
    pub single: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Step through a deck in the terminal presenter console
    Rehearse {
        /// PDF file to present
        file: PathBuf,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Print the slide structure of a deck
    Inspect {
        /// PDF file to inspect
        file: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. navigation.prev_policy, defaults.start_slide, defaults.surfaces)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Rehearse { file, session }) => rehearse(file, session),
            Some(Commands::Inspect { file, json }) => {
                check_exists(&file)?;
                crate::commands::inspect::run(&file, json)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("pdfdeck {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if let Some(file) = self.file {
                    rehearse(file, self.session)
                } else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    Ok(())
                }
            }
        }
    }
}

fn rehearse(file: PathBuf, session: SessionArgs) -> anyhow::Result<()> {
    check_exists(&file)?;
    crate::commands::rehearse::run(&file, session.slide, session.single)
}

fn check_exists(file: &std::path::Path) -> anyhow::Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_alone_means_rehearse() {
        let cli = Cli::try_parse_from(["pdfdeck", "talk.pdf", "--slide", "3", "-vv"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("talk.pdf")));
        assert!(cli.command.is_none());
        assert_eq!(cli.session.slide, Some(3));
        assert!(!cli.session.single);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["pdfdeck", "inspect", "talk.pdf", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Inspect { json: true, .. })));

        let cli = Cli::try_parse_from(["pdfdeck", "rehearse", "talk.pdf", "--single"]).unwrap();
        match cli.command {
            Some(Commands::Rehearse { session, .. }) => assert!(session.single),
            _ => panic!("expected rehearse"),
        }

        let cli = Cli::try_parse_from(["pdfdeck", "config", "set", "defaults.start_slide", "2"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: ConfigCommands::Set { .. }
            })
        ));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
