// ============================================================================
// fit.rs — Biosfera
// Offline Lotka-Volterra parameter recovery: normalize the recorded
// population series, integrate the two-state ODE with RK4, and minimize the
// mean-squared error with a bounded coordinate-descent optimizer.
// ============================================================================

use serde::Serialize;

use crate::error::{BiosferaError, BiosferaResult};

/// The classic predator-prey coefficients:
///   dN/dt = r·N − a·N·P
///   dP/dt = b·N·P − d·P
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LotkaVolterra {
    pub r: f64,
    pub a: f64,
    pub b: f64,
    pub d: f64,
}

impl LotkaVolterra {
    fn derivatives(&self, n: f64, p: f64) -> (f64, f64) {
        (
            self.r * n - self.a * n * p,
            self.b * n * p - self.d * p,
        )
    }
}

/// Fitting knobs. Defaults: stride-10 decimation, characteristic time =
/// mean lifespan / 10, parameters bounded to [0, 1], initial guess
/// (0.5, 0.02, 0.02, 0.5).
#[derive(Clone, Debug)]
pub struct FitOptions {
    /// Keep every `stride`-th sample for the objective.
    pub stride: usize,
    /// The tick axis is divided by mean_lifespan / lifespan_divisor.
    pub lifespan_divisor: f64,
    /// RK4 substeps between consecutive samples.
    pub substeps: usize,
    /// Coordinate-descent sweep budget.
    pub max_sweeps: usize,
    /// Golden-section bracket tolerance per coordinate.
    pub line_tolerance: f64,
    pub initial_guess: LotkaVolterra,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            stride: 10,
            lifespan_divisor: 10.0,
            substeps: 4,
            max_sweeps: 60,
            line_tolerance: 1e-4,
            initial_guess: LotkaVolterra {
                r: 0.5,
                a: 0.02,
                b: 0.02,
                d: 0.5,
            },
            lower_bound: 0.0,
            upper_bound: 1.0,
        }
    }
}

/// Outcome of a fit: the coefficients, the final objective value, and the
/// model re-integrated over the full tick axis in original (de-normalized)
/// population units.
#[derive(Clone, Debug, Serialize)]
pub struct FitResult {
    pub params: LotkaVolterra,
    pub loss: f64,
    pub prey_fit: Vec<f64>,
    pub predator_fit: Vec<f64>,
}

/// Integrate the ODE over `times` with fixed RK4 substeps per interval,
/// starting from (n0, p0). Populations are floored at zero, matching the
/// model's domain.
pub fn integrate(
    params: &LotkaVolterra,
    n0: f64,
    p0: f64,
    times: &[f64],
    substeps: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mut n_out = Vec::with_capacity(times.len());
    let mut p_out = Vec::with_capacity(times.len());
    let (mut n, mut p) = (n0, p0);
    n_out.push(n);
    p_out.push(p);

    for window in times.windows(2) {
        let h = (window[1] - window[0]) / substeps as f64;
        for _ in 0..substeps {
            let (k1n, k1p) = params.derivatives(n, p);
            let (k2n, k2p) = params.derivatives(n + 0.5 * h * k1n, p + 0.5 * h * k1p);
            let (k3n, k3p) = params.derivatives(n + 0.5 * h * k2n, p + 0.5 * h * k2p);
            let (k4n, k4p) = params.derivatives(n + h * k3n, p + h * k3p);
            n += h / 6.0 * (k1n + 2.0 * k2n + 2.0 * k3n + k4n);
            p += h / 6.0 * (k1p + 2.0 * k2p + 2.0 * k3p + k4p);
            n = n.max(0.0);
            p = p.max(0.0);
        }
        n_out.push(n);
        p_out.push(p);
    }
    (n_out, p_out)
}

/// Fit (r, a, b, d) to the recorded per-tick counts.
///
/// `mean_prey_lifespan` is the characteristic time from the run's death
/// records; callers obtain it from `HistoryRecorder::mean_prey_lifespan()`
/// and a run without deaths cannot be fitted.
///
/// Fails with `DegenerateInput` before touching any arithmetic that would
/// produce NaN, and with `OptimizationDiverged` if the optimizer cannot
/// improve on the initial guess within its budget.
pub fn fit_lotka_volterra(
    prey: &[u32],
    predators: &[u32],
    mean_prey_lifespan: f64,
    opts: &FitOptions,
) -> BiosferaResult<FitResult> {
    if prey.len() != predators.len() {
        return Err(BiosferaError::DegenerateInput(format!(
            "series lengths differ: {} prey vs {} predator samples",
            prey.len(),
            predators.len()
        )));
    }
    if prey.len() < 2 {
        return Err(BiosferaError::DegenerateInput(format!(
            "need at least 2 samples, got {}",
            prey.len()
        )));
    }
    let n_max = prey.iter().copied().max().unwrap_or(0) as f64;
    let p_max = predators.iter().copied().max().unwrap_or(0) as f64;
    if n_max == 0.0 || p_max == 0.0 {
        return Err(BiosferaError::DegenerateInput(
            "a population is zero for the whole run; cannot normalize".into(),
        ));
    }
    if !mean_prey_lifespan.is_finite() || mean_prey_lifespan <= 0.0 {
        return Err(BiosferaError::DegenerateInput(format!(
            "mean prey lifespan {mean_prey_lifespan} is not a usable characteristic time"
        )));
    }
    if opts.stride == 0 || opts.substeps == 0 {
        return Err(BiosferaError::InvalidConfiguration(
            "fit stride and substeps must be at least 1".into(),
        ));
    }
    if !(opts.lower_bound < opts.upper_bound) {
        return Err(BiosferaError::InvalidConfiguration(format!(
            "fit bounds [{}, {}] are empty or inverted",
            opts.lower_bound, opts.upper_bound
        )));
    }

    // Characteristic-time rescaled axis and [0,1]-normalized series.
    let time_unit = mean_prey_lifespan / opts.lifespan_divisor;
    let times: Vec<f64> = (0..prey.len()).map(|i| i as f64 / time_unit).collect();
    let n_data: Vec<f64> = prey.iter().map(|&v| v as f64 / n_max).collect();
    let p_data: Vec<f64> = predators.iter().map(|&v| v as f64 / p_max).collect();
    let n0 = n_data[0];
    let p0 = p_data[0];

    // Stride decimation keeps the objective cheap.
    let sub_times: Vec<f64> = times.iter().copied().step_by(opts.stride).collect();
    let sub_n: Vec<f64> = n_data.iter().copied().step_by(opts.stride).collect();
    let sub_p: Vec<f64> = p_data.iter().copied().step_by(opts.stride).collect();

    let objective = |candidate: &LotkaVolterra| -> f64 {
        let (n_model, p_model) = integrate(candidate, n0, p0, &sub_times, opts.substeps);
        let count = sub_n.len() as f64;
        let err_n: f64 = n_model
            .iter()
            .zip(&sub_n)
            .map(|(m, o)| (m - o) * (m - o))
            .sum::<f64>()
            / count;
        let err_p: f64 = p_model
            .iter()
            .zip(&sub_p)
            .map(|(m, o)| (m - o) * (m - o))
            .sum::<f64>()
            / count;
        err_n + err_p
    };

    let (params, loss) = minimize_coordinate_descent(&objective, opts)?;

    // Re-integrate over the full axis and de-normalize for reporting.
    let (n_fit, p_fit) = integrate(&params, n0, p0, &times, opts.substeps);
    Ok(FitResult {
        params,
        loss,
        prey_fit: n_fit.into_iter().map(|v| v * n_max).collect(),
        predator_fit: p_fit.into_iter().map(|v| v * p_max).collect(),
    })
}

/// Cyclic coordinate descent: golden-section line search per coordinate over
/// the full bounded interval, repeated until the sweep budget runs out or a
/// sweep stops improving. Derivative-free by construction.
fn minimize_coordinate_descent(
    objective: &dyn Fn(&LotkaVolterra) -> f64,
    opts: &FitOptions,
) -> BiosferaResult<(LotkaVolterra, f64)> {
    let initial_loss = objective(&opts.initial_guess);
    let mut best = opts.initial_guess;
    let mut best_loss = initial_loss;

    for _ in 0..opts.max_sweeps {
        let sweep_start = best_loss;
        for coord in 0..4 {
            let line = |x: f64| {
                let mut candidate = best;
                *coordinate_mut(&mut candidate, coord) = x;
                objective(&candidate)
            };
            let (x, fx) = golden_section(
                &line,
                opts.lower_bound,
                opts.upper_bound,
                opts.line_tolerance,
            );
            if fx < best_loss {
                *coordinate_mut(&mut best, coord) = x;
                best_loss = fx;
            }
        }
        if sweep_start - best_loss < 1e-12 {
            break;
        }
    }

    if best_loss >= initial_loss {
        return Err(BiosferaError::OptimizationDiverged {
            sweeps: opts.max_sweeps,
            loss: best_loss,
        });
    }
    Ok((best, best_loss))
}

fn coordinate_mut(params: &mut LotkaVolterra, coord: usize) -> &mut f64 {
    match coord {
        0 => &mut params.r,
        1 => &mut params.a,
        2 => &mut params.b,
        _ => &mut params.d,
    }
}

/// Golden-section search for a minimum of `f` on [lo, hi]. Assumes the
/// restriction of the loss to one coordinate is unimodal, which holds in
/// practice for this objective.
fn golden_section(f: &dyn Fn(f64) -> f64, lo: f64, hi: f64, tolerance: f64) -> (f64, f64) {
    const INV_PHI: f64 = 0.618_033_988_749_894_8;
    let (mut a, mut b) = (lo, hi);
    let mut c = b - (b - a) * INV_PHI;
    let mut d = a + (b - a) * INV_PHI;
    let mut fc = f(c);
    let mut fd = f(d);

    while (b - a) > tolerance {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - (b - a) * INV_PHI;
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + (b - a) * INV_PHI;
            fd = f(d);
        }
    }
    let mid = (a + b) / 2.0;
    (mid, f(mid))
}
