//! `decisim stress` - run the stress preset sweep and print metric deltas.

use anyhow::Context;
use sim_engine::{RunCache, Simulator};
use sim_risk::{preset_sweep, CancellationToken, StressPreset};

use super::load_config;

pub fn run(config_path: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let baseline = Simulator::new(config.clone())
        .context("invalid run configuration")?
        .run();
    let cache = RunCache::new();
    let outcome = preset_sweep(
        &config,
        &baseline,
        &StressPreset::all(),
        &cache,
        &CancellationToken::new(),
    )
    .context("stress sweep failed")?;

    for report in &outcome.reports {
        println!("stress: {}", report.name);
        println!(
            "{:<12} {:>12} {:>12} {:>12} {:>12} {:>10}",
            "option", "ΔEV", "ΔVaR95", "ΔCVaR95", "Δcapital", "ΔRAROC"
        );
        for delta in &report.deltas {
            println!(
                "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>10.3}",
                delta.option_id,
                delta.ev,
                delta.var95,
                delta.cvar95,
                delta.economic_capital,
                delta.raroc
            );
        }
        println!();
    }
    Ok(())
}
