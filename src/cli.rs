use clap::{Parser, Subcommand};
use portprobe::PortRange;

#[derive(Parser)]
#[command(
    name = "portprobe",
    about = "Find free ports in the dynamic range",
    long_about = "Find free ports in the dynamic range.\n\nWith no command, prints one free port and exits.",
    version
)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print free ports, one per line
    Free {
        /// Number of distinct ports to print
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
        /// Candidate range as MIN-MAX, upper bound exclusive (overrides config)
        #[arg(long)]
        range: Option<PortRange>,
        /// Give up after this many probes (overrides config)
        #[arg(long)]
        max_attempts: Option<u64>,
    },
    /// Check whether ports are free for TCP and UDP
    Check {
        /// Ports to probe
        #[arg(required = true)]
        ports: Vec<u16>,
    },
    /// Print a random candidate port without probing it
    Candidate,
    /// Initialize or edit ~/.portprobe/config.toml
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (reads from config if omitted)
        shell: Option<clap_complete::Shell>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_args_means_no_command() {
        let cli = Cli::try_parse_from(["portprobe"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.no_color);
    }

    #[test]
    fn free_with_options() {
        let cli = Cli::try_parse_from([
            "portprobe",
            "free",
            "-n",
            "3",
            "--range",
            "50000-50100",
            "--max-attempts",
            "10",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Free {
                count,
                range,
                max_attempts,
            }) => {
                assert_eq!(count, 3);
                assert_eq!(range, Some(PortRange::new(50000, 50100).unwrap()));
                assert_eq!(max_attempts, Some(10));
            }
            _ => panic!("expected free command"),
        }
    }

    #[test]
    fn check_rejects_out_of_range_port() {
        assert!(Cli::try_parse_from(["portprobe", "check", "70000"]).is_err());
        assert!(Cli::try_parse_from(["portprobe", "check"]).is_err());
    }

    #[test]
    fn bad_range_is_rejected() {
        assert!(Cli::try_parse_from(["portprobe", "free", "--range", "6-5"]).is_err());
    }
}
