//! `decisim run` - execute a simulation and print its metrics.

use anyhow::Context;
use sim_engine::Simulator;
use sim_risk::RunSnapshot;

use super::load_config;

pub fn run(config_path: &str, format: &str, decision_id: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let simulator = Simulator::new(config.clone()).context("invalid run configuration")?;
    let artifacts = simulator.run();
    let outcome = &artifacts.outcome;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(outcome)?),
        _ => {
            println!("run {}", outcome.fingerprint);
            println!(
                "{:<12} {:>12} {:>12} {:>12} {:>12} {:>10}",
                "option", "EV", "VaR95", "CVaR95", "capital", "RAROC"
            );
            for m in &outcome.metrics {
                println!(
                    "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>10.3}",
                    m.option_id, m.ev, m.var95, m.cvar95, m.economic_capital, m.raroc
                );
            }
            if let Some(fit) = &outcome.metadata.dependence_fit {
                println!(
                    "dependence: repair frobenius {:.6}, achieved spearman {:?}",
                    fit.repair_frobenius, fit.achieved_spearman
                );
            }
            for notice in &outcome.metadata.notices {
                println!("notice [{}]: {}", notice.option_id, notice.kind.description());
            }
        }
    }

    if let Some(decision_id) = decision_id {
        let snapshot = RunSnapshot::new(decision_id, &config, outcome);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    Ok(())
}
