//! Generate individual assets

use super::{open_session, SessionOptions};
use anyhow::Result;
use artpack_core::GenerationErrorKind;
use artpack_gen::{write_single, GenerateOutcome, BILLING_DOCS_URL};
use std::path::Path;

pub async fn run(options: SessionOptions<'_>, ids: &[String], output_dir: &str) -> Result<()> {
    let session = open_session(options).await?;
    let orchestrator = &session.orchestrator;
    let out_dir = Path::new(output_dir);

    let mut generated = 0;
    let mut failed = 0;

    for id in ids {
        let spec = match orchestrator.catalog().require(id) {
            Ok(spec) => spec,
            Err(e) => {
                eprintln!("Skipping: {}", e);
                continue;
            }
        };
        println!("Generating '{}' via {}...", spec.name, session.provider_name());

        match orchestrator.generate_one(id).await {
            GenerateOutcome::Generated => {
                let Some(image) = orchestrator.state(id).and_then(|s| s.image) else {
                    continue;
                };
                let path = write_single(out_dir, spec, &image)?;
                println!("  Saved: {}", path.display());
                println!("  Hash: {}", image.content_hash()?.to_prefixed_hex());
                generated += 1;
            }
            GenerateOutcome::Failed(notice) => {
                eprintln!("  {}", notice);
                if notice.kind == GenerationErrorKind::InvalidCredential {
                    eprintln!(
                        "  The API key was rejected. Run `artpack key select` (billing: {})",
                        BILLING_DOCS_URL
                    );
                }
                failed += 1;
            }
            GenerateOutcome::AlreadyInFlight | GenerateOutcome::UnknownAsset => {}
        }
    }

    println!("\nDone: {} generated, {} failed", generated, failed);
    if failed > 0 {
        anyhow::bail!("{} asset(s) failed to generate", failed);
    }
    Ok(())
}
