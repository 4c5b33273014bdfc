//! Text rendering for the terminal.

use backoffice_types::{GameStatus, PlayerStatus, RiskLevel};
use colored::*;
use serde_json::Value;
use std::fmt::Write;

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", "━".repeat(60).bright_black());
    println!(" {}", title.bright_white().bold());
    println!("{}", "━".repeat(60).bright_black());
}

/// Print a success message
pub fn success(message: &str) {
    println!("  {} {}", "✓".bright_green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("  {} {}", "✗".bright_red(), message.bright_red());
}

/// Print an info message
pub fn info(message: &str) {
    println!("  {} {}", "→".bright_blue(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("  {} {}", "⚠".yellow(), message.yellow());
}

/// `12500` → `12,500.00`
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{}{grouped}.{cents}", if negative { "-" } else { "" })
}

pub fn status_badge(status: PlayerStatus) -> ColoredString {
    let label = status.label();
    match status {
        PlayerStatus::Active => label.bright_green(),
        PlayerStatus::Inactive => label.bright_black(),
        PlayerStatus::Suspended => label.yellow(),
        PlayerStatus::Deleted => label.bright_red(),
    }
}

pub fn risk_badge(risk: RiskLevel) -> ColoredString {
    let label = risk.label();
    match risk {
        RiskLevel::Low => label.green(),
        RiskLevel::Medium => label.yellow(),
        RiskLevel::High => label.red(),
        RiskLevel::Blacklist => label.on_red().white().bold(),
    }
}

pub fn game_status_badge(status: GameStatus) -> ColoredString {
    let label = status.label();
    match status {
        GameStatus::Active => label.bright_green(),
        GameStatus::Inactive => label.bright_black(),
        GameStatus::Maintenance => label.yellow(),
    }
}

/// Fixed-width table. Cells are plain text so widths line up.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{h:<w$}"))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").bold());
    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  ").bright_black());
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", cells.join("  ").trim_end());
    }
    out
}

/// Titled key/value card.
pub fn card(title: &str, rows: &[(&str, String)]) -> String {
    let width = rows
        .iter()
        .map(|(k, _)| k.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "{}", title.bright_white().bold());
    for (key, value) in rows {
        let _ = writeln!(out, "  {:<width$}  {}", key, value.bright_cyan());
    }
    out
}

/// Opaque backend payloads are shown as indented JSON.
pub fn json_block(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
