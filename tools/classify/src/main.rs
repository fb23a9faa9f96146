/// Batch driver: consolidate candidate polygons, compute attribute records,
/// and classify each feature. Reads a job description JSON and writes one
/// result row per polygon.
use anyhow::{bail, Context, Result};
use clap::Parser;
use geo::Polygon;
use serde::{Deserialize, Serialize};

use benthos_core::{
    classify, compute_attributes, consolidate, AttributeRecord, BathyGrid, ExecutionContext,
    FeaturePolarity, FeatureType, ThresholdConfig,
};

#[derive(Parser, Debug)]
#[command(name = "classify", about = "Classify seabed feature polygons from bathymetry")]
struct Args {
    /// Job description JSON (grids, polygons, polarity, thresholds).
    #[arg(short, long)]
    input: String,

    /// Output results JSON file.
    #[arg(short, long, default_value = "results.json")]
    output: String,

    /// Keep going past polygons whose attributes cannot be computed,
    /// recording the error in their result row.
    #[arg(long)]
    skip_errors: bool,
}

#[derive(Debug, Deserialize)]
struct Job {
    bathymetry: BathyGrid,
    slope: BathyGrid,
    polygons: Vec<Polygon<f64>>,
    polarity: FeaturePolarity,
    #[serde(default)]
    thresholds: ThresholdConfig,
    /// Polygons below this area (m²) are merged into a neighbour before
    /// attribution. Zero or absent skips consolidation.
    #[serde(default)]
    consolidation_area_threshold: f64,
    #[serde(default)]
    profile_area_threshold: Option<f64>,
    #[serde(default)]
    knick_tolerance_deg: Option<f64>,
}

#[derive(Debug, Serialize)]
struct FeatureRow {
    feature: usize,
    attributes: Option<AttributeRecord>,
    feature_type: Option<FeatureType>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct Results {
    polarity: FeaturePolarity,
    consolidation_converged: bool,
    consolidation_iterations: u32,
    isolated_small: usize,
    features: Vec<FeatureRow>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let job: Job = serde_json::from_reader(
        std::fs::File::open(&args.input)
            .with_context(|| format!("opening job file {}", args.input))?,
    )
    .context("parsing job JSON")?;

    let mut ctx = ExecutionContext::new(&job.bathymetry, &job.slope, job.thresholds, job.polarity)
        .context("invalid threshold configuration")?;
    if let Some(t) = job.profile_area_threshold {
        ctx.profile_area_threshold = t;
    }
    if let Some(t) = job.knick_tolerance_deg {
        ctx.knick_tolerance_deg = t;
    }

    let polygons = if job.consolidation_area_threshold > 0.0 {
        let outcome = consolidate(job.polygons, job.consolidation_area_threshold);
        log::info!(
            "consolidation: {} polygons after {} rounds (converged: {}, isolated small: {})",
            outcome.polygons.len(),
            outcome.iterations,
            outcome.converged,
            outcome.isolated_small
        );
        outcome
    } else {
        benthos_core::ConsolidationOutcome {
            polygons: job.polygons,
            converged: true,
            iterations: 0,
            isolated_small: 0,
        }
    };

    let records = compute_attributes(&polygons.polygons, &ctx);
    let mut features = Vec::with_capacity(records.len());
    for (i, record) in records.into_iter().enumerate() {
        match record {
            Ok(rec) => {
                let label = classify(&rec, ctx.polarity, &ctx.thresholds);
                features.push(FeatureRow {
                    feature: i,
                    attributes: Some(rec),
                    feature_type: Some(label),
                    error: None,
                });
            }
            Err(e) if args.skip_errors => {
                log::warn!("polygon {i}: {e}");
                features.push(FeatureRow {
                    feature: i,
                    attributes: None,
                    feature_type: None,
                    error: Some(e.to_string()),
                });
            }
            Err(e) => bail!("polygon {i}: {e} (rerun with --skip-errors to continue past failures)"),
        }
    }

    let results = Results {
        polarity: ctx.polarity,
        consolidation_converged: polygons.converged,
        consolidation_iterations: polygons.iterations,
        isolated_small: polygons.isolated_small,
        features,
    };
    serde_json::to_writer_pretty(
        std::fs::File::create(&args.output)
            .with_context(|| format!("creating output file {}", args.output))?,
        &results,
    )
    .context("writing results JSON")?;
    log::info!("wrote {} feature rows to {}", results.features.len(), args.output);
    Ok(())
}
