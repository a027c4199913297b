use std::fmt::Write as _;

use anyhow::{Context, Result};

/// Number of frequency samples (columns) in the synthetic image.
const NF: usize = 120;
/// Number of velocity samples (rows).
const NV: usize = 200;
const F_RANGE: (f64, f64) = (0.0, 0.8);
const V_RANGE: (f64, f64) = (2.5, 5.0);

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Phase velocity of a normally dispersive branch: slow at high frequency,
/// fast at low frequency.
fn branch_velocity(f: f64, v_fast: f64, v_slow: f64, corner: f64) -> f64 {
    v_fast + (v_slow - v_fast) * (f / corner).tanh()
}

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
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let freqs: Vec<f64> = (0..NF)
        .map(|i| F_RANGE.0 + (F_RANGE.1 - F_RANGE.0) * i as f64 / (NF - 1) as f64)
        .collect();
    let vels: Vec<f64> = (0..NV)
        .map(|j| V_RANGE.0 + (V_RANGE.1 - V_RANGE.0) * j as f64 / (NV - 1) as f64)
        .collect();

    // (v at f=0, v at high f, corner frequency, amplitude)
    let branches = [(4.6, 2.9, 0.25, 1.0), (4.9, 3.6, 0.45, 0.45)];

    let mut spectrum = String::new();
    for &v in &vels {
        let row: Vec<String> = freqs
            .iter()
            .map(|&f| {
                let signal: f64 = branches
                    .iter()
                    .map(|&(hi, lo, corner, amp)| {
                        let width = 0.15 - 0.1 * f / F_RANGE.1;
                        gaussian(v, branch_velocity(f, hi, lo, corner), width, amp)
                    })
                    .sum();
                // Aliasing-like streaks grow with frequency.
                let streak = 0.2 * (f / F_RANGE.1) * (0.5 + 0.5 * (40.0 * v + 25.0 * f).sin());
                let energy = signal + streak + rng.gauss(0.0, 0.02);
                format!("{:.6}", energy.max(0.0))
            })
            .collect();
        let _ = writeln!(spectrum, "{}", row.join(" "));
    }

    let mut picks = String::new();
    let mut n_picks = 0;
    for (mode, &(hi, lo, corner, _)) in branches.iter().enumerate() {
        // Picks cover only part of each branch; the rest is extrapolated.
        let f_start = 0.1 + 0.1 * mode as f64;
        for k in 0..12 {
            let f = f_start + 0.03 * k as f64;
            let v = branch_velocity(f, hi, lo, corner) + rng.gauss(0.0, 0.01);
            let _ = writeln!(picks, "{f:.4} {v:.4} {mode}");
            n_picks += 1;
        }
    }

    let spectrum_path = "sample_spectrum.txt";
    let picks_path = "sample_picks.txt";
    std::fs::write(spectrum_path, spectrum).with_context(|| format!("writing {spectrum_path}"))?;
    std::fs::write(picks_path, picks).with_context(|| format!("writing {picks_path}"))?;

    println!(
        "Wrote {NV}x{NF} spectrum to {spectrum_path} and {n_picks} picks to {picks_path} \
         (f {:?}, v {:?})",
        F_RANGE, V_RANGE
    );
    Ok(())
}
