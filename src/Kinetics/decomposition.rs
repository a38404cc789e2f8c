//! # First-Order Decomposition Kinetics
//!
//! Closed-form model of a first-order decomposition `A -> products`:
//!
//! ```text
//! [A](t) = A0 * exp(-k * t)
//! ```
//!
//! evaluated on `steps` evenly spaced time points from 0 to `t_final` inclusive.
//!
//! ## Usage
//! - **Function**: [`kinetic_decomp`] returns the concentration vector directly
//! - **Struct**: `new()` → `set_problem()` → `solve()` → `pretty_print()` or `save_result()`
//!
//! ```rust
//! use chempkg::Kinetics::decomposition::FirstOrderDecomposition;
//!
//! let mut model = FirstOrderDecomposition::new();
//! model.set_problem(1.0, 0.5, 10.0, 11).unwrap();
//! model.solve().unwrap();
//! assert_eq!(model.concentration().unwrap().len(), 11);
//! ```
use log::info;
use nalgebra::DVector;
use prettytable::{Table, row};
use std::fs::File;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KineticsError {
    #[error("parameter '{name}' must be finite and non-negative, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("problem has not been solved yet")]
    NotSolved,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn check_parameter(name: &'static str, value: f64) -> Result<(), KineticsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(KineticsError::InvalidParameter { name, value })
    }
}

/// `steps` evenly spaced points from 0 to `t_final` inclusive; a single point is `[0]`.
pub fn time_grid(t_final: f64, steps: usize) -> DVector<f64> {
    match steps {
        0 => DVector::zeros(0),
        1 => DVector::from_element(1, 0.0),
        _ => {
            let dt = t_final / (steps - 1) as f64;
            DVector::from_fn(steps, |i, _| if i == steps - 1 { t_final } else { i as f64 * dt })
        }
    }
}

/// Concentration `a0 * exp(-k * t_i)` on the time grid of `steps` points over `[0, t_final]`.
pub fn kinetic_decomp(
    a0: f64,
    k: f64,
    t_final: f64,
    steps: usize,
) -> Result<DVector<f64>, KineticsError> {
    check_parameter("a0", a0)?;
    check_parameter("k", k)?;
    check_parameter("t", t_final)?;
    Ok(time_grid(t_final, steps).map(|t| a0 * (-k * t).exp()))
}

#[derive(Debug, Clone)]
pub struct FirstOrderDecomposition {
    pub a0: f64,
    pub k: f64,
    pub t_final: f64,
    pub steps: usize,
    time: Option<DVector<f64>>,
    concentration: Option<DVector<f64>>,
}

impl Default for FirstOrderDecomposition {
    fn default() -> Self {
        Self::new()
    }
}

impl FirstOrderDecomposition {
    pub fn new() -> Self {
        Self {
            a0: 1.0,
            k: 0.0,
            t_final: 0.0,
            steps: 10,
            time: None,
            concentration: None,
        }
    }

    /// Sets initial concentration (mol/L), rate constant (1/s), total time (s) and number of points.
    /// Any previous solution is discarded.
    pub fn set_problem(
        &mut self,
        a0: f64,
        k: f64,
        t_final: f64,
        steps: usize,
    ) -> Result<(), KineticsError> {
        check_parameter("a0", a0)?;
        check_parameter("k", k)?;
        check_parameter("t", t_final)?;
        self.a0 = a0;
        self.k = k;
        self.t_final = t_final;
        self.steps = steps;
        self.time = None;
        self.concentration = None;
        Ok(())
    }

    pub fn solve(&mut self) -> Result<(), KineticsError> {
        let concentration = kinetic_decomp(self.a0, self.k, self.t_final, self.steps)?;
        info!(
            "first-order decomposition solved: a0 = {}, k = {}, t = {}, {} points",
            self.a0, self.k, self.t_final, self.steps
        );
        self.time = Some(time_grid(self.t_final, self.steps));
        self.concentration = Some(concentration);
        Ok(())
    }

    pub fn time(&self) -> Option<&DVector<f64>> {
        self.time.as_ref()
    }

    pub fn concentration(&self) -> Option<&DVector<f64>> {
        self.concentration.as_ref()
    }

    /// ln(2)/k; infinite when nothing decomposes (k = 0).
    pub fn half_life(&self) -> f64 {
        if self.k > 0.0 {
            std::f64::consts::LN_2 / self.k
        } else {
            f64::INFINITY
        }
    }

    fn solution(&self) -> Result<(&DVector<f64>, &DVector<f64>), KineticsError> {
        match (&self.time, &self.concentration) {
            (Some(time), Some(concentration)) => Ok((time, concentration)),
            _ => Err(KineticsError::NotSolved),
        }
    }

    pub fn result_table(&self) -> Result<Table, KineticsError> {
        let (time, concentration) = self.solution()?;
        let mut table = Table::new();
        table.set_titles(row!["t, s", "[A](t), mol/L"]);
        for (t, a) in time.iter().zip(concentration.iter()) {
            table.add_row(row![format!("{:.4}", t), format!("{:.6e}", a)]);
        }
        Ok(table)
    }

    pub fn pretty_print(&self) -> Result<(), KineticsError> {
        self.result_table()?.printstd();
        Ok(())
    }

    /// Writes the solution as tab-separated `t` / `[A](t)` columns with a header line.
    pub fn save_result(&self, path: &str) -> Result<(), KineticsError> {
        let (time, concentration) = self.solution()?;
        let mut file = File::create(path)?;
        writeln!(file, "t\tA")?;
        for (t, a) in time.iter().zip(concentration.iter()) {
            writeln!(file, "{}\t{}", t, a)?;
        }
        info!("decomposition result saved to '{}'", path);
        Ok(())
    }
}
