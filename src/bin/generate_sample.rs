//! Writes a few sample input files into `samples/` for trying the app:
//! two overlapping CSV batches with gaps and two `.rowOut` simulation runs.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// `run_id,temperature,pressure,operator`; about one cell in ten is empty.
fn write_batch_a(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating batch_a.csv")?;
    writer.write_record(["run_id", "temperature", "pressure", "operator"])?;
    let operators = ["Alice", "Bob"];
    for run in 0..20 {
        let temperature = rng.gauss(300.0, 5.0);
        let pressure = rng.gauss(1.0, 0.05);
        let mut record = vec![
            run.to_string(),
            format!("{temperature:.2}"),
            format!("{pressure:.4}"),
            operators[run % operators.len()].to_string(),
        ];
        for cell in record.iter_mut().skip(1) {
            if rng.chance(0.1) {
                cell.clear();
            }
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// `run_id,pressure,yield`; shares `run_id` and `pressure` with batch A.
fn write_batch_b(path: &Path, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating batch_b.csv")?;
    writer.write_record(["run_id", "pressure", "yield"])?;
    for run in 20..30 {
        let pressure = rng.gauss(1.2, 0.05);
        let yield_ = if rng.chance(0.15) {
            "NA".to_string()
        } else {
            format!("{:.3}", rng.gauss(0.8, 0.1))
        };
        writer.write_record([run.to_string(), format!("{pressure:.4}"), yield_])?;
    }
    writer.flush()?;
    Ok(())
}

/// Fixed-width simulation output with Fortran `D` exponents.
fn write_row_out(path: &Path, rng: &mut SimpleRng, steps: usize) -> Result<()> {
    let mut text = String::new();
    writeln!(text, "{:>6} {:>14} {:>14} {:>6}", "STEP", "TIME", "ENERGY", "ITER")?;
    for step in 0..steps {
        let time = step as f64 * 0.5;
        let energy = rng.gauss(1.0e3, 25.0);
        let mantissa = energy / 1.0e3;
        writeln!(
            text,
            "{step:>6} {time:>14.4} {:>14} {:>6}",
            format!("{mantissa:.6}D+03"),
            3 + step % 4
        )?;
    }
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let dir = Path::new("samples");
    fs::create_dir_all(dir).context("creating samples/")?;

    write_batch_a(&dir.join("batch_a.csv"), &mut rng)?;
    write_batch_b(&dir.join("batch_b.csv"), &mut rng)?;
    write_row_out(&dir.join("sim_001.rowOut"), &mut rng, 12)?;
    write_row_out(&dir.join("sim_002.rowOut"), &mut rng, 8)?;

    println!("Wrote sample files to {}", dir.display());
    Ok(())
}
