// Terminal UI utilities

use colored::Colorize;
use std::time::Duration;

use crate::domain::{DiscoveryReport, PassReport};

pub fn print_header(title: &str) {
    println!();
    println!(
        "{}",
        "╔════════════════════════════════════════════════════════════╗".bright_blue()
    );
    println!("{}", format!("║  {:<58}║", title).bright_blue());
    println!(
        "{}",
        "╚════════════════════════════════════════════════════════════╝".bright_blue()
    );
    println!();
}

pub fn print_success(message: &str) {
    println!("{}", format!("✅ {}", message).bright_green().bold());
}

pub fn print_error(message: &str) {
    eprintln!("{}", format!("❌ {}", message).bright_red().bold());
}

pub fn print_info(message: &str) {
    println!("{}", format!("ℹ️  {}", message).bright_cyan());
}

pub fn print_warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).bright_yellow());
}

fn format_elapsed(duration: Duration) -> String {
    // Millisecond precision is plenty for a summary line
    humantime::format_duration(Duration::from_millis(duration.as_millis() as u64)).to_string()
}

/// One line per service, then a summary
pub fn print_pass_report(report: &PassReport) {
    println!();
    if report.outcomes.is_empty() {
        print_warning("No migration-eligible services found");
        return;
    }

    for outcome in &report.outcomes {
        let decision = outcome
            .decision
            .as_ref()
            .map(|d| d.label())
            .unwrap_or("-");
        match &outcome.error {
            None => println!(
                "   {} {:<20} {}",
                "✅".green(),
                outcome.service.bold(),
                decision.dimmed()
            ),
            Some(error) => println!(
                "   {} {:<20} {} {}",
                "❌".red(),
                outcome.service.bold(),
                format!("[{}]", error.phase()).yellow(),
                error.to_string().red()
            ),
        }
    }

    println!();
    let summary = format!(
        "{} succeeded, {} failed in {}",
        report.succeeded(),
        report.failed(),
        format_elapsed(report.duration)
    );
    if report.is_clean() {
        print_success(&summary);
    } else {
        print_warning(&summary);
    }
}

pub fn print_discovery(report: &DiscoveryReport) {
    println!("{}", "Migration-eligible services:".bold());
    if report.eligible.is_empty() {
        println!("   {}", "(none)".dimmed());
    }
    for service in &report.eligible {
        println!(
            "   {} {:<20} {}",
            "•".green(),
            service.name.bold(),
            service.descriptor_path.display().to_string().dimmed()
        );
    }

    if !report.excluded.is_empty() {
        println!();
        println!("{}", "Skipped:".bold());
        for service in &report.excluded {
            let reason = service.reason.to_string();
            let reason = if service.reason.is_anomaly() {
                reason.yellow()
            } else {
                reason.dimmed()
            };
            println!(
                "   {} {:<20} {} {}",
                "•".dimmed(),
                service.name,
                reason,
                service.root_path.display().to_string().dimmed()
            );
        }
    }
}
