//! Generate a whole pack and export it as a zip

use super::{open_session, parse_scope, SessionOptions};
use anyhow::Result;
use artpack_core::Catalog;
use artpack_gen::{write_archive, BatchOutcome, OrchestratorEvent, BILLING_DOCS_URL};
use std::path::Path;
use tokio::sync::broadcast::error::RecvError;

pub async fn run(options: SessionOptions<'_>, category: Option<&str>, output: &str) -> Result<()> {
    let scope = parse_scope(category)?;
    let session = open_session(options).await?;
    let orchestrator = &session.orchestrator;
    let catalog = orchestrator.catalog();

    println!(
        "Generating {} ({} asset(s)) via {}...",
        scope,
        catalog.in_scope(scope).count(),
        session.provider_name()
    );

    let mut events = orchestrator.subscribe();
    let batch = orchestrator.generate_all(scope);
    tokio::pin!(batch);

    let outcome = loop {
        tokio::select! {
            outcome = &mut batch => break outcome,
            event = events.recv() => match event {
                Ok(event) => print_event(&event, catalog),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "progress output fell behind");
                }
                Err(RecvError::Closed) => {}
            },
        }
    };
    while let Ok(event) = events.try_recv() {
        print_event(&event, catalog);
    }

    let report = match outcome {
        BatchOutcome::Completed(report) => report,
        BatchOutcome::AlreadyRunning => anyhow::bail!("A batch is already running"),
    };

    let stats = orchestrator.stats();
    println!("\n{} ({:.0}%)", stats, stats.progress() * 100.0);

    let written = write_archive(Path::new(output), &orchestrator.snapshot())?;
    if written == 0 {
        println!("Nothing to export: no images were generated.");
    } else {
        println!("Archive: {} ({} image(s))", output, written);
    }

    if report.failed > 0 {
        anyhow::bail!("{} asset(s) failed to generate", report.failed);
    }
    Ok(())
}

fn print_event(event: &OrchestratorEvent, catalog: &Catalog) {
    let name_of = |id: &str| {
        catalog
            .get(id)
            .map(|spec| spec.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    match event {
        OrchestratorEvent::BatchStarted { queued, .. } => {
            println!("  {} queued", queued);
        }
        OrchestratorEvent::StateChanged { id, state } => {
            if state.is_loading {
                println!("  ... {}", name_of(id));
            } else if state.image.is_some() {
                println!("  ok  {}", name_of(id));
            }
        }
        OrchestratorEvent::GenerationFailed(notice) => {
            eprintln!("  !!  {}", notice);
        }
        OrchestratorEvent::CredentialReset => {
            eprintln!(
                "  The API key was rejected. Run `artpack key select` (billing: {})",
                BILLING_DOCS_URL
            );
        }
        OrchestratorEvent::BatchFinished(report) => {
            println!(
                "  {} generated, {} failed, {} skipped",
                report.generated, report.failed, report.skipped
            );
        }
    }
}
