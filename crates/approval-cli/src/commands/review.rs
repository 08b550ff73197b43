//! Review command - terminal decision mode.
//!
//! Steps through the batch one request at a time. Progress is saved to the
//! queue snapshot after every decision, so quitting (or crashing) and running
//! the command again picks up at the same request.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use approval::queue::{Current, DecisionQueue, Item};
use approval::request::{read_requests, write_requests};
use approval::sink::{write_scored, FileResultSink, OutputFormat, ResultSink};
use approval::{Action, ApprovalModel, Batch, PortalConfig, RequestGenerator, Summary};
use colored::Colorize;
use tracing::{info, warn};

pub fn run(
    config: &PortalConfig,
    input: Option<PathBuf>,
    fresh: bool,
    format: OutputFormat,
    seed: Option<u64>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot_path = &config.snapshot_path;

    let mut batch = if snapshot_path.exists() && !fresh {
        let queue = DecisionQueue::load(snapshot_path)?;
        let (decided, total) = queue.position();
        println!(
            "{} {} of {} requests already decided",
            "Resuming review:".yellow().bold(),
            decided,
            total
        );
        for option in ignored_on_resume(input.as_deref(), seed) {
            warn!(option, "ignored while resuming a saved review");
            println!(
                "{} {} is ignored; use --fresh to start a new batch",
                "Note:".yellow().bold(),
                option
            );
        }
        Batch::from_queue(queue)
    } else {
        start_batch(config, input, seed, verbose)?
    };

    let queue = batch.queue_mut()?;
    let stdin = io::stdin();
    let completed = decision_loop(
        queue,
        snapshot_path,
        &config.operator.username,
        stdin.lock(),
        io::stdout(),
    )?;

    if !completed {
        println!();
        println!(
            "Progress saved. Run {} to continue.",
            "approval review".cyan().bold()
        );
        return Ok(());
    }

    let summary = queue.summary()?;
    print_summary(&summary);

    let sink = FileResultSink::new(&config.results_dir).with_format(format);
    let path = finish_review(queue, snapshot_path, &sink)?;
    println!("Results saved to: {}", path.display().to_string().white().bold());

    Ok(())
}

/// Options that only matter when starting a batch.
fn ignored_on_resume(input: Option<&Path>, seed: Option<u64>) -> Vec<&'static str> {
    let mut ignored = Vec::new();
    if input.is_some() {
        ignored.push("FILE");
    }
    if seed.is_some() {
        ignored.push("--seed");
    }
    ignored
}

/// Persist a finished queue and retire its snapshot.
///
/// The snapshot goes first so a rerun can never persist the same batch
/// twice. If persisting then fails, the snapshot is written back.
fn finish_review(
    queue: &DecisionQueue,
    snapshot_path: &Path,
    sink: &FileResultSink,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if snapshot_path.exists() {
        fs::remove_file(snapshot_path).map_err(|e| {
            format!(
                "Could not remove snapshot {}: {}",
                snapshot_path.display(),
                e
            )
        })?;
    }

    match sink.persist(queue) {
        Ok(path) => Ok(path),
        Err(e) => {
            if let Err(restore) = queue.save(snapshot_path) {
                warn!(error = %restore, "could not restore snapshot");
            }
            Err(e.into())
        }
    }
}

/// Build, export and score a new batch, then save its first snapshot.
fn start_batch(
    config: &PortalConfig,
    input: Option<PathBuf>,
    seed: Option<u64>,
    verbose: bool,
) -> Result<Batch, Box<dyn std::error::Error>> {
    let requests = match input {
        Some(path) => read_requests(&path)?,
        None => {
            let mut generator = match seed {
                Some(seed) => RequestGenerator::with_seed(seed),
                None => RequestGenerator::new(),
            };
            generator.generate(config.batch_size)?
        }
    };
    let mut batch = Batch::new(requests)?;

    let pending_path = config.pending_export_path();
    write_requests(&pending_path, batch.requests())?;
    if verbose {
        println!("Pending requests exported to {}", pending_path.display());
    }

    if !config.model_path.exists() {
        return Err(format!(
            "Model file not found: {}\nRun 'approval train' first.",
            config.model_path.display()
        )
        .into());
    }
    let model = ApprovalModel::load(&config.model_path)?;

    let items = batch.score(&model, &config.band)?;
    write_scored(config.scored_export_path(), items)?;
    info!(
        requests = items.len(),
        model = model.fingerprint.as_deref().unwrap_or("unknown"),
        "batch ready for review"
    );

    batch.queue()?.save(&config.snapshot_path)?;
    println!(
        "{} {} requests scored and ready for review",
        "AI automation completed:".green().bold(),
        batch.requests().len()
    );

    Ok(batch)
}

/// Prompt for decisions until the queue is finished or input ends.
///
/// Returns `true` once every item has a decision.
fn decision_loop<R: BufRead, W: Write>(
    queue: &mut DecisionQueue,
    snapshot_path: &Path,
    operator: &str,
    mut input: R,
    mut out: W,
) -> Result<bool, Box<dyn std::error::Error>> {
    loop {
        let item = match queue.current() {
            Current::Item(item) => item.clone(),
            Current::Terminal => return Ok(true),
        };
        let (decided, total) = queue.position();

        writeln!(out)?;
        writeln!(
            out,
            "{}",
            format!("Processing request {} of {}", decided + 1, total).cyan()
        )?;
        print_item(&mut out, &item)?;

        let action = loop {
            write!(
                out,
                "[{}]pprove / [{}]eject / [{}]anual review / [{}]uit: ",
                "a".green().bold(),
                "r".red().bold(),
                "m".yellow().bold(),
                "q".bold()
            )?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            let answer = line.trim();
            if answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("quit") {
                return Ok(false);
            }
            match answer.parse::<Action>() {
                Ok(action) => break action,
                Err(e) => writeln!(out, "{}", e.as_str().yellow())?,
            }
        };

        let decision = queue.decide_as(item.id(), action, operator)?;
        writeln!(out, "{} {}", "Recorded:".green(), decision.action)?;
        queue.save(snapshot_path)?;
    }
}

fn print_item<W: Write>(out: &mut W, item: &Item) -> io::Result<()> {
    writeln!(out, "{}", format!("Request: {}", item.id()).white().bold())?;
    for (name, value) in item.features() {
        writeln!(out, "  {}: {}", name, value)?;
    }
    writeln!(out, "  AI confidence: {:.1}%", item.confidence())?;
    writeln!(
        out,
        "  AI suggestion: {}",
        item.recommendation().label().bold()
    )
}

fn print_summary(summary: &Summary) {
    println!();
    println!("{}", "All requests processed!".green().bold());
    println!();
    println!("{}", "Summary:".yellow().bold());
    println!("  Total processed: {}", summary.total().to_string().white().bold());
    println!("  Approved:        {}", summary.approved.to_string().green());
    println!("  Rejected:        {}", summary.rejected.to_string().red());
    println!("  Manual review:   {}", summary.manual_review.to_string().yellow());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval::queue::{AmbiguityBand, Suggestion};
    use approval::request::{Features, Request};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn queue() -> DecisionQueue {
        let items = ["INV-1001", "INV-1002", "INV-1003"]
            .iter()
            .map(|id| {
                Item::annotate(
                    Request::new(*id, Features::new()).with_feature("amount", 640.0),
                    Suggestion::Approve,
                    72.4,
                    &AmbiguityBand::default(),
                )
            })
            .collect();
        DecisionQueue::new(items).unwrap()
    }

    #[test]
    fn test_loop_completes_batch() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("queue.snapshot.json");
        let mut queue = queue();

        let input = Cursor::new("a\nbogus\nr\nmanual\n");
        let mut output = Vec::new();
        let completed = decision_loop(&mut queue, &snapshot, "admin", input, &mut output).unwrap();

        assert!(completed);
        let summary = queue.summary().unwrap();
        assert_eq!((summary.approved, summary.rejected, summary.manual_review), (1, 1, 1));
        assert!(queue.decisions().iter().all(|d| d.decided_by.as_deref() == Some("admin")));

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Processing request 3 of 3"));
        assert!(text.contains("Unknown action"));
    }

    #[test]
    fn test_quit_saves_progress() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("queue.snapshot.json");
        let mut queue = queue();

        let completed =
            decision_loop(&mut queue, &snapshot, "admin", Cursor::new("a\nq\n"), Vec::new()).unwrap();

        assert!(!completed);
        let restored = DecisionQueue::load(&snapshot).unwrap();
        assert_eq!(restored.position(), (1, 3));
    }

    #[test]
    fn test_end_of_input_stops_loop() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("queue.snapshot.json");
        let mut queue = queue();

        let completed =
            decision_loop(&mut queue, &snapshot, "admin", Cursor::new(""), Vec::new()).unwrap();

        assert!(!completed);
        assert_eq!(queue.cursor(), 0);
    }

    fn finished_queue() -> DecisionQueue {
        let mut queue = queue();
        for action in [Action::Approved, Action::Rejected, Action::ManualReview] {
            let id = queue.current().item().unwrap().id().to_string();
            queue.decide_as(&id, action, "admin").unwrap();
        }
        queue
    }

    #[test]
    fn test_finish_removes_snapshot() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("queue.snapshot.json");
        let queue = finished_queue();
        queue.save(&snapshot).unwrap();

        let sink = FileResultSink::new(dir.path().join("results"));
        let path = finish_review(&queue, &snapshot, &sink).unwrap();

        assert!(path.exists());
        assert!(!snapshot.exists());
    }

    #[test]
    fn test_failed_persist_restores_snapshot() {
        let dir = TempDir::new().unwrap();
        let snapshot = dir.path().join("queue.snapshot.json");
        let queue = finished_queue();
        queue.save(&snapshot).unwrap();

        // The results directory cannot be created over a plain file.
        let results = dir.path().join("results");
        fs::write(&results, "").unwrap();
        let sink = FileResultSink::new(&results);

        assert!(finish_review(&queue, &snapshot, &sink).is_err());
        let restored = DecisionQueue::load(&snapshot).unwrap();
        assert_eq!(restored, queue);
    }

    #[test]
    fn test_resume_reports_ignored_options() {
        assert!(ignored_on_resume(None, None).is_empty());
        assert_eq!(
            ignored_on_resume(Some(Path::new("requests.csv")), Some(7)),
            vec!["FILE", "--seed"]
        );
        assert_eq!(ignored_on_resume(None, Some(7)), vec!["--seed"]);
    }
}
