// main.rs
// Command-line entry: run one scenario file and write its results

use std::path::PathBuf;
use std::process::ExitCode;

use em_particle_sim::scenario::Scenario;
use em_particle_sim::SimResult;

const USAGE: &str = "usage: em_particle_sim <scenario.toml> [output_base]";

fn run(scenario_path: PathBuf, output_base: Option<PathBuf>) -> SimResult<()> {
    let (mut scenario, config) = Scenario::load(&scenario_path)?;
    let outcome = scenario.run()?;
    log::info!("{:?} run ended: {:?}", scenario.kind(), outcome);

    let base = output_base
        .or_else(|| config.output.base.clone())
        .unwrap_or_else(|| scenario_path.with_extension(""));
    let saved = scenario.save(&base, config.output.format)?;
    log::info!("results written to {}", saved.display());
    if config.output.csv {
        for path in scenario.export_csv(&base)? {
            log::info!("table written to {}", path.display());
        }
    }

    #[cfg(feature = "profiling")]
    em_particle_sim::PROFILER.lock().log_and_clear();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut args = std::env::args_os().skip(1);
    let Some(scenario_path) = args.next().map(PathBuf::from) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let output_base = args.next().map(PathBuf::from);

    match run(scenario_path, output_base) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
