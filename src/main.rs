mod cli;
mod display;
mod logging;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use cli::{Cli, Command};
use display::PortStatus;
use portprobe::{Config, PortProbe, PortRange, check_on};

fn main() -> Result<()> {
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();
    let cfg = Config::load();
    logging::init(&cfg.log_level);

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        None => cmd_free(1, None, None, &cfg),
        Some(Command::Free {
            count,
            range,
            max_attempts,
        }) => cmd_free(count, range, max_attempts, &cfg),
        Some(Command::Check { ports }) => cmd_check(&ports, &cfg),
        Some(Command::Candidate) => cmd_candidate(&cfg),
        Some(Command::Config) => cmd_config(&cfg),
        Some(Command::Completions { shell }) => cmd_completions(shell, &cfg),
    }
}

fn probe_from_config(cfg: &Config) -> Result<PortProbe> {
    PortProbe::from_config(cfg).context("invalid port range in ~/.portprobe/config.toml")
}

fn cmd_free(
    count: usize,
    range: Option<PortRange>,
    max_attempts: Option<u64>,
    cfg: &Config,
) -> Result<()> {
    let mut probe = probe_from_config(cfg)?;
    if let Some(range) = range {
        probe = probe.range(range);
    }
    if max_attempts.is_some() {
        probe = probe.max_attempts(max_attempts);
    }

    let range = probe.port_range();
    if count > usize::from(range.len()) {
        anyhow::bail!(
            "cannot find {} distinct ports in {} ({} candidates)",
            count,
            range,
            range.len()
        );
    }

    for port in probe.free_ports(count)? {
        println!("{}", port);
    }
    Ok(())
}

fn cmd_check(ports: &[u16], cfg: &Config) -> Result<()> {
    let statuses: Vec<PortStatus> = ports
        .iter()
        .map(|&port| PortStatus {
            port,
            result: check_on(cfg.bind_host, port),
        })
        .collect();

    display::print_check_results(&statuses);
    display::print_check_summary(&statuses);

    let busy = statuses.iter().filter(|s| !s.is_free()).count();
    if busy > 0 {
        anyhow::bail!("{} of {} ports in use", busy, statuses.len());
    }
    Ok(())
}

fn cmd_candidate(cfg: &Config) -> Result<()> {
    let mut probe = probe_from_config(cfg)?;
    println!("{}", probe.random_candidate());
    Ok(())
}

fn cmd_config(cfg: &Config) -> Result<()> {
    let path = Config::init()?;
    let editor = cfg.resolve_editor();

    let status = std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("failed to launch editor '{}'", editor))?;

    if !status.success() {
        anyhow::bail!("editor exited with {}", status);
    }

    Ok(())
}

fn cmd_completions(shell: Option<clap_complete::Shell>, cfg: &Config) -> Result<()> {
    let shell = match (shell, cfg.shell.as_deref()) {
        (Some(s), _) => s,
        (None, Some(name)) => name
            .parse::<clap_complete::Shell>()
            .map_err(|_| {
                anyhow::anyhow!(
                    "`shell = \"{}\"` in ~/.portprobe/config.toml is not a supported shell",
                    name
                )
            })?,
        (None, None) => anyhow::bail!(
            "pass a shell (e.g. `portprobe completions zsh`) or add `shell = \"zsh\"` to ~/.portprobe/config.toml"
        ),
    };

    // Shell's Display yields the names CompleteEnv expects (bash, zsh, fish, ...).
    unsafe { std::env::set_var("COMPLETE", shell.to_string()) };
    clap_complete::CompleteEnv::with_factory(Cli::command).complete();
    Ok(())
}
