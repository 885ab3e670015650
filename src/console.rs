//! Colored console output and terminal title control

use crate::probe::models::{Endpoint, RunSummary};
use colored::Colorize;
use crossterm::{execute, terminal::SetTitle};
use std::io;

/// Print the startup banner with the crate version
pub fn print_banner(version: &str) {
    println!(
        "{}",
        r#"
  ____                _
 |  _ \ _ __ _____  _(_)_ __ ___  _   _ ___
 | |_) | '__/ _ \ \/ / | '_ ` _ \| | | / __|
 |  __/| | | (_) >  <| | | | | | | |_| \__ \
 |_|   |_|  \___/_/\_\_|_| |_| |_|\__,_|___/
"#
        .cyan()
        .bold()
    );
    println!("{}", format!("Version: {}", version).yellow());
}

pub fn info(msg: &str) {
    println!("{} {}", "i".blue().bold(), msg);
}

pub fn check(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn cross(msg: &str) {
    println!("{} {}", "✗".red().bold(), msg);
}

pub fn warn(msg: &str) {
    println!("{} {}", "!".yellow().bold(), msg);
}

pub fn comment(msg: &str) {
    println!("{}", msg.bright_black());
}

/// Update the terminal title; failures are ignored, the title is cosmetic
pub fn set_title(title: &str) {
    let _ = execute!(io::stdout(), SetTitle(title));
}

/// Styled `[host:port]` label; width math uses `Endpoint::label` since the
/// color codes here inflate the byte length
pub fn endpoint_label(endpoint: &Endpoint) -> String {
    format!(
        "[{}:{}]",
        endpoint.host.green(),
        endpoint.port.bright_black()
    )
}

/// Render the final tri-count summary framed by comment separators
pub fn print_summary(summary: &RunSummary) {
    let plain = format!(
        "[ {} ] working / [ {} ] timed out / [ {} ] sent errors",
        summary.up, summary.timed_out, summary.errored
    );
    let separator = "=".repeat(plain.len() / 2);

    let styled = format!(
        "[ {} ] working / [ {} ] timed out / [ {} ] sent errors",
        summary.up.to_string().green(),
        summary.timed_out.to_string().yellow(),
        summary.errored.to_string().red()
    );

    comment(&separator);
    info(&styled);
    comment(&separator);
}
