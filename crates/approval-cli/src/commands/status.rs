//! Status command - show review progress and summary.

use std::path::PathBuf;

use approval::{Action, DecisionQueue, PortalConfig};
use colored::Colorize;

pub fn run(
    config: &PortalConfig,
    snapshot: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot_path = snapshot.unwrap_or_else(|| config.snapshot_path.clone());

    if !snapshot_path.exists() {
        return Err(format!(
            "No review in progress: {} not found\nRun 'approval review' to start one.",
            snapshot_path.display()
        )
        .into());
    }

    let queue = DecisionQueue::load(&snapshot_path)?;
    let (decided, total) = queue.position();
    let counts = queue.partial_summary();

    if json_output {
        let status = serde_json::json!({
            "snapshot": snapshot_path.display().to_string(),
            "progress": queue.progress(),
            "decided": decided,
            "total": total,
            "pending": total - decided,
            "decisions": counts,
            "current": queue.current().item().map(|item| item.id()),
            "is_complete": queue.is_terminal(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Review status for".cyan().bold(),
        snapshot_path.display().to_string().white()
    );
    println!();

    let progress = queue.progress();
    let bar_width = 30;
    let filled = (progress * bar_width as f64).round() as usize;
    let bar: String = "█".repeat(filled) + &"░".repeat(bar_width - filled);
    println!(
        "Progress: {} {}/{} ({:.0}%)",
        bar.cyan(),
        decided.to_string().white().bold(),
        total,
        progress * 100.0
    );
    println!();

    println!("{}", "Decisions:".yellow().bold());
    println!("  Pending:       {}", (total - decided).to_string().white());
    println!(
        "  Approved:      {}",
        counts.count(Action::Approved).to_string().green()
    );
    println!(
        "  Rejected:      {}",
        counts.count(Action::Rejected).to_string().red()
    );
    println!(
        "  Manual review: {}",
        counts.count(Action::ManualReview).to_string().yellow()
    );
    println!();

    match queue.current().item() {
        Some(item) => println!(
            "Next up: {}. Run {} to continue reviewing.",
            item.id().white().bold(),
            "approval review".cyan().bold()
        ),
        None => println!(
            "All requests decided. Run {} to save the results.",
            "approval review".cyan().bold()
        ),
    }

    Ok(())
}
