// export.rs
// CSV export of recorded series for spreadsheet and plotting tools

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::SimResult;
use crate::simulation::{ConservationHistory, PhaseSweepResults, RunHistory, RunOutcome};

fn outcome_label(outcome: &RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::Completed { .. } => "completed",
        RunOutcome::Unstable { .. } => "unstable",
        RunOutcome::OutOfBounds { .. } => "out_of_bounds",
    }
}

/// One row per sample: time, bunch energy statistics and mean position.
pub fn write_run_csv<W: Write>(mut out: W, history: &RunHistory) -> SimResult<()> {
    writeln!(out, "time,mean_energy,energy_spread,mean_x,mean_y,mean_z")?;
    for (i, time) in history.time.iter().enumerate() {
        let states = &history.states[i];
        let n = states.len().max(1) as f64;
        let mut mean = [0.0; 3];
        for s in states {
            for (m, p) in mean.iter_mut().zip(s.position) {
                *m += p / n;
            }
        }
        writeln!(
            out,
            "{},{},{},{},{},{}",
            time, history.mean_energy[i], history.energy_spread[i], mean[0], mean[1], mean[2]
        )?;
    }
    Ok(())
}

/// Long format: one row per particle per sample.
pub fn write_trajectories_csv<W: Write>(mut out: W, history: &RunHistory) -> SimResult<()> {
    writeln!(out, "time,particle,x,y,z,vx,vy,vz")?;
    for (time, states) in history.time.iter().zip(&history.states) {
        for s in states {
            let [x, y, z] = s.position;
            let [vx, vy, vz] = s.velocity;
            writeln!(out, "{time},{},{x},{y},{z},{vx},{vy},{vz}", s.name)?;
        }
    }
    Ok(())
}

pub fn write_sweep_csv<W: Write>(mut out: W, results: &PhaseSweepResults) -> SimResult<()> {
    writeln!(out, "phase,final_spread,outcome")?;
    for point in &results.points {
        writeln!(
            out,
            "{},{},{}",
            point.phase,
            point.final_spread,
            outcome_label(&point.outcome)
        )?;
    }
    Ok(())
}

pub fn write_conservation_csv<W: Write>(mut out: W, history: &ConservationHistory) -> SimResult<()> {
    writeln!(
        out,
        "time,momentum,angular_momentum,kinetic_energy,field_energy,total_energy"
    )?;
    let totals = history.total_energy();
    for (i, time) in history.run.time.iter().enumerate() {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            time,
            history.momentum[i],
            history.angular_momentum[i],
            history.kinetic_energy[i],
            history.field_energy[i],
            totals[i]
        )?;
    }
    Ok(())
}

/// Create `path` (and its parent directories) and hand a buffered writer to `write`.
pub fn export_csv<F>(path: &Path, write: F) -> SimResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> SimResult<()>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut out = BufWriter::new(File::create(path)?);
    write(&mut out)?;
    out.flush()?;
    log::info!("exported {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::{Particle, ParticleBunch};
    use crate::simulation::SweepPoint;
    use ultraviolet::DVec3;

    fn history() -> RunHistory {
        let bunch = ParticleBunch::from_particles(
            "b",
            vec![
                Particle::new("b 1", DVec3::new(1.0, 0.0, 0.0), DVec3::zero(), 1.0, 1.0),
                Particle::new("b 2", DVec3::new(3.0, 2.0, 0.0), DVec3::zero(), 1.0, 1.0),
            ],
        )
        .unwrap();
        let mut history = RunHistory::default();
        history.record(0.0, &bunch);
        history.record(0.5, &bunch);
        history
    }

    fn lines(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes).unwrap().lines().map(str::to_owned).collect()
    }

    #[test]
    fn run_csv_has_one_row_per_sample() {
        let mut buf = Vec::new();
        write_run_csv(&mut buf, &history()).unwrap();
        let lines = lines(buf);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0,"));
        assert!(lines[2].ends_with(",2,1,0"), "{}", lines[2]);
    }

    #[test]
    fn trajectories_csv_lists_every_particle() {
        let mut buf = Vec::new();
        write_trajectories_csv(&mut buf, &history()).unwrap();
        let lines = lines(buf);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "0.5,b 2,3,2,0,0,0,0");
    }

    #[test]
    fn sweep_csv_labels_outcomes() {
        let results = PhaseSweepResults {
            points: vec![SweepPoint {
                phase: 0.25,
                final_spread: 2.0,
                outcome: RunOutcome::Unstable {
                    time: 0.1,
                    shrink_attempts: 5,
                },
            }],
        };
        let mut buf = Vec::new();
        write_sweep_csv(&mut buf, &results).unwrap();
        assert_eq!(lines(buf), vec!["phase,final_spread,outcome", "0.25,2,unstable"]);
    }

    #[test]
    fn export_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/run.csv");
        export_csv(&path, |w| write_run_csv(w, &history())).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("time,"));
    }
}
