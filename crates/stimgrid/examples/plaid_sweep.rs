use std::error::Error;

use stimgrid::{DiffOfGaussiansConfig, DiffOfGaussiansSet, ParameterSpace, PlaidSet};

const PLAID_JSON: &str = r#"{
    "canvas": {"width": 48, "height": 48},
    "locations": {"grid": {"x_range": [22, 26], "y_range": [24, 25]}},
    "sizes": [16.0, 24.0],
    "spatial_frequencies": [2.0],
    "orientations": {"evenly_spaced": 4},
    "phases": {"values": [0.0]},
    "contrasts_preferred": [0.5],
    "contrasts_orthogonal": [0.0, 0.25, 0.5],
    "grey_level": 0.0,
    "pixel_boundaries": [-1.0, 1.0]
}"#;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let batch_size: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 16,
    };

    let plaids = PlaidSet::from_json_str(PLAID_JSON)?;
    println!(
        "{} plaids over {:?}",
        plaids.total_combinations(),
        plaids.parameter_names()
    );
    println!(
        "first combination: {}",
        serde_json::to_string(&plaids.assignment_at(0)?)?
    );

    for (i, batch) in plaids.stimulus_batches(batch_size)?.enumerate() {
        let batch = batch?;
        let peak = batch.as_raw().iter().fold(0.0f32, |m, v| m.max(v.abs()));
        println!("batch {i}: shape {:?}, peak |v| = {peak:.3}", batch.shape());
    }

    // One invalid surround scale: skip it instead of aborting the sweep.
    let dogs = DiffOfGaussiansSet::new(DiffOfGaussiansConfig {
        sizes_scale_surround: vec![0.8, 1.6, 3.2],
        ..DiffOfGaussiansConfig::default()
    })?;
    let mut rendered = 0;
    for (idx, result) in dogs.iter_stimuli() {
        match result {
            Ok(_) => rendered += 1,
            Err(e) => println!("skipping combination {idx}: {e}"),
        }
    }
    println!("rendered {rendered} of {} DoG stimuli", dogs.total_combinations());
    Ok(())
}
