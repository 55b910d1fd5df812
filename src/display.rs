use std::io;

use colored::Colorize;
use console::Alignment;

/// Outcome of probing one port.
pub struct PortStatus {
    pub port: u16,
    pub result: io::Result<()>,
}

impl PortStatus {
    pub fn is_free(&self) -> bool {
        self.result.is_ok()
    }
}

/// Print a table of probed ports with their status and the bind error, if any.
pub fn print_check_results(statuses: &[PortStatus]) {
    let w_port = statuses
        .iter()
        .map(|s| s.port.to_string().len())
        .max()
        .unwrap_or(0);
    let w_status = "in use".len();

    for s in statuses {
        let (bullet, status) = if s.is_free() {
            ("●".green().to_string(), "free".green().to_string())
        } else {
            ("○".red().to_string(), "in use".red().to_string())
        };
        let port = pad(&s.port.to_string().bold().to_string(), w_port);
        let status_pad = pad(&status, w_status);

        match &s.result {
            Ok(()) => println!("  {} {}  {}", bullet, port, status_pad),
            Err(e) => println!(
                "  {} {}  {}  {}",
                bullet,
                port,
                status_pad,
                e.to_string().dimmed()
            ),
        }
    }
}

/// Print the one-line summary under the check table.
pub fn print_check_summary(statuses: &[PortStatus]) {
    let free = statuses.iter().filter(|s| s.is_free()).count();
    let total = statuses.len();
    let line = format!("{}/{} ports free", free, total);
    if free == total {
        println!("\n{}", line.green());
    } else {
        println!("\n{}", line.yellow());
    }
}

/// Left-align to `width` visible columns; escape codes don't count.
fn pad(s: &str, width: usize) -> String {
    console::pad_str(s, width, Alignment::Left, None).to_string()
}
