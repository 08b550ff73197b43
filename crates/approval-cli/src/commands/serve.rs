//! Serve command - run the review API.

use std::sync::Arc;

use approval::{ApprovalModel, Batch, DecisionQueue, PortalConfig, Scorer};
use colored::Colorize;

use crate::server::app;
use crate::server::state::{AppState, Session};

pub fn run(config: PortalConfig, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    if !config.model_path.exists() {
        return Err(format!(
            "Model file not found: {}\nRun 'approval train' first.",
            config.model_path.display()
        )
        .into());
    }
    let model = ApprovalModel::load(&config.model_path)?;
    let scorer: Arc<dyn Scorer> = Arc::new(model);

    let port = port.unwrap_or(config.server.port);
    let resumed = if config.snapshot_path.exists() {
        let queue = DecisionQueue::load(&config.snapshot_path)?;
        let (decided, total) = queue.position();
        println!(
            "{} {} of {} requests already decided",
            "Resuming review:".yellow().bold(),
            decided,
            total
        );
        Some(Batch::from_queue(queue))
    } else {
        None
    };

    let mut session = Session::default();
    if let Some(batch) = resumed {
        session = session.with_batch(batch);
    }
    let state = AppState::with_session(config, scorer, session);

    println!(
        "{} http://127.0.0.1:{}/api",
        "Review API available at".green().bold(),
        port
    );
    println!("Press Ctrl+C to stop the server.");
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, port))
}
