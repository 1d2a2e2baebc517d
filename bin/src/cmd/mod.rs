//! CLI subcommand modules.
//!
//! This module contains the implementations for all ronda CLI subcommands,
//! plus the small set of formatting helpers they share.

pub(crate) mod composite;
pub(crate) mod credit;
pub(crate) mod intrinsic;
pub(crate) mod models;
pub(crate) mod operating;
pub(crate) mod relative;
pub(crate) mod transaction;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON on stdout
    Json,
}

/// Print `value` as JSON, or hand it to the text renderer.
pub(crate) fn emit<T: Serialize>(format: Format, value: &T, text: impl FnOnce(&T)) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Text => text(value),
    }
    Ok(())
}

pub(crate) fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{title:^62}║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

pub(crate) fn section(title: &str) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{title}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

/// Label/value row.
pub(crate) fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {label:<28} {value:>16}");
}

/// Currency amount scaled to B/M/K.
pub(crate) fn money(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("${:.1}K", value / 1e3)
    } else {
        format!("${value:.2}")
    }
}

pub(crate) fn price(value: f64) -> String {
    format!("${value:.2}")
}

pub(crate) fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

pub(crate) fn opt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), pct)
}

pub(crate) fn multiple(value: f64) -> String {
    format!("{value:.1}x")
}

pub(crate) fn opt_multiple(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), multiple)
}

/// Implied price, current price and upside block shared by the valuation commands.
pub(crate) fn price_summary(implied: f64, current: f64, upside: Option<f64>) {
    row("Implied share price", price(implied));
    row("Current share price", price(current));
    row("Upside", upside.map_or_else(|| "n/a".to_string(), |u| format!("{:+.1}%", u * 100.0)));
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_scales() {
        assert_eq!(money(280e9), "$280.00B");
        assert_eq!(money(-3.5e6), "$-3.50M");
        assert_eq!(money(1_500.0), "$1.5K");
        assert_eq!(money(12.0), "$12.00");
    }

    #[test]
    fn test_optional_formats() {
        assert_eq!(opt_pct(None), "n/a");
        assert_eq!(opt_pct(Some(0.125)), "12.5%");
        assert_eq!(opt_multiple(Some(9.96)), "10.0x");
    }
}
