//! `decisim tornado` - rank scenario variables by impact on one option.

use anyhow::{bail, Context};
use sim_engine::Simulator;
use sim_risk::{tornado, SensitivityMethod};

use super::load_config;

pub fn run(config_path: &str, option_id: &str, method: &str, bump: f64) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let method = match method {
        "rank" => SensitivityMethod::RankCorrelation,
        "one-at-a-time" | "oat" => SensitivityMethod::OneAtATime {
            relative_bump: bump,
        },
        other => bail!("unknown sensitivity method '{other}' (expected rank or one-at-a-time)"),
    };

    let baseline = Simulator::new(config.clone())
        .context("invalid run configuration")?
        .run();
    let entries =
        tornado(&config, &baseline, option_id, method).context("sensitivity analysis failed")?;

    println!("tornado for option '{option_id}'");
    println!("{:<24} {:>10}", "variable", "impact");
    for entry in entries {
        println!("{:<24} {:>10.4}", entry.param_name, entry.impact);
    }
    Ok(())
}
