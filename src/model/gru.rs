//! Gated recurrent unit
//!
//! ```text
//! Z  = σ(x·W_xz + H·W_hz + b_z)
//! R  = σ(x·W_xr + H·W_hr + b_r)
//! H̃  = tanh(x·W_xh + (R ⊙ H)·W_hh + b_h)
//! H' = Z ⊙ H + (1 − Z) ⊙ H̃
//! ```

use crate::error::ComputeError;
use crate::types::Tensor;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Single-layer GRU over one path tensor (rows = time steps)
#[derive(Debug, Clone, PartialEq)]
pub struct Gru {
    w_xz: Array2<f64>,
    w_hz: Array2<f64>,
    b_z: Array1<f64>,
    w_xr: Array2<f64>,
    w_hr: Array2<f64>,
    b_r: Array1<f64>,
    w_xh: Array2<f64>,
    w_hh: Array2<f64>,
    b_h: Array1<f64>,
}

impl Gru {
    /// Weights drawn from N(0, sigma); biases start at zero.
    ///
    /// The same seed always yields the same weights.
    pub fn new(n_inp: usize, n_hidden: usize, sigma: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut normal = |rows: usize, cols: usize| {
            Array2::from_shape_fn((rows, cols), |_| {
                // Box-Muller transform
                let u1: f64 = rng.gen_range(1e-12..1.0);
                let u2: f64 = rng.gen_range(0.0..1.0);
                sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
            })
        };

        let w_xz = normal(n_inp, n_hidden);
        let w_hz = normal(n_hidden, n_hidden);
        let w_xr = normal(n_inp, n_hidden);
        let w_hr = normal(n_hidden, n_hidden);
        let w_xh = normal(n_inp, n_hidden);
        let w_hh = normal(n_hidden, n_hidden);

        Self {
            w_xz,
            w_hz,
            b_z: Array1::zeros(n_hidden),
            w_xr,
            w_hr,
            b_r: Array1::zeros(n_hidden),
            w_xh,
            w_hh,
            b_h: Array1::zeros(n_hidden),
        }
    }

    /// All-zero parameters
    pub fn zeros(n_inp: usize, n_hidden: usize) -> Self {
        Self::new(n_inp, n_hidden, 0.0, 0)
    }

    /// Input width
    pub fn n_inp(&self) -> usize {
        self.w_xz.nrows()
    }

    /// Hidden state width
    pub fn n_hidden(&self) -> usize {
        self.w_xz.ncols()
    }

    /// Run the recurrence over `inputs` starting from `h0` (zeros when `None`).
    ///
    /// Returns the hidden state after every step, shape `(steps, n_hidden)`,
    /// and the final state. A zero-row input returns an empty output and `h0`.
    pub fn forward(
        &self,
        inputs: &Tensor,
        h0: Option<&Array1<f64>>,
    ) -> Result<(Array2<f64>, Array1<f64>), ComputeError> {
        if inputs.ncols() != self.n_inp() {
            return Err(ComputeError::ShapeError(format!(
                "expected {} input columns, got {}",
                self.n_inp(),
                inputs.ncols()
            )));
        }

        let mut h = match h0 {
            Some(h0) if h0.len() != self.n_hidden() => {
                return Err(ComputeError::ShapeError(format!(
                    "expected initial state of length {}, got {}",
                    self.n_hidden(),
                    h0.len()
                )));
            }
            Some(h0) => h0.clone(),
            None => Array1::zeros(self.n_hidden()),
        };

        if let Some((index, _)) = inputs.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            let width = inputs.ncols().max(1);
            return Err(ComputeError::ConversionError {
                row: index / width,
                column: format!("{}", index % width),
                message: "input is not finite".to_string(),
            });
        }

        let mut outputs = Array2::zeros((inputs.nrows(), self.n_hidden()));
        for (x, mut out) in inputs.axis_iter(Axis(0)).zip(outputs.axis_iter_mut(Axis(0))) {
            h = self.step(x, &h);
            out.assign(&h);
        }

        Ok((outputs, h))
    }

    fn step(&self, x: ArrayView1<f64>, h: &Array1<f64>) -> Array1<f64> {
        let z = (x.dot(&self.w_xz) + h.dot(&self.w_hz) + &self.b_z).mapv(sigmoid);
        let r = (x.dot(&self.w_xr) + h.dot(&self.w_hr) + &self.b_r).mapv(sigmoid);
        let h_tilde = (x.dot(&self.w_xh) + (&r * h).dot(&self.w_hh) + &self.b_h).mapv(f64::tanh);
        &z * h + (1.0 - &z) * &h_tilde
    }
}

fn sigmoid(v: f64) -> f64 {
    1.0 / (1.0 + (-v).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_output_shapes() {
        let gru = Gru::new(11, 4, 0.01, 7);
        let inputs = Array2::from_elem((6, 11), 0.5);

        let (outputs, h) = gru.forward(&inputs, None).unwrap();

        assert_eq!(outputs.shape(), &[6, 4]);
        assert_eq!(h.len(), 4);
        assert_eq!(outputs.row(5), h.view());
    }

    #[test]
    fn test_same_seed_same_weights() {
        assert_eq!(Gru::new(3, 2, 0.1, 42), Gru::new(3, 2, 0.1, 42));
        assert_ne!(Gru::new(3, 2, 0.1, 42), Gru::new(3, 2, 0.1, 43));
    }

    #[test]
    fn test_zero_weights_halve_state() {
        // With all-zero parameters Z = 0.5 and H̃ = 0, so each step halves H
        let gru = Gru::zeros(2, 2);
        let h0 = array![1.0, -2.0];
        let inputs = array![[3.0, 4.0], [5.0, 6.0]];

        let (outputs, h) = gru.forward(&inputs, Some(&h0)).unwrap();

        assert_eq!(outputs, array![[0.5, -1.0], [0.25, -0.5]]);
        assert_eq!(h, array![0.25, -0.5]);
    }

    #[test]
    fn test_empty_input_returns_initial_state() {
        let gru = Gru::new(5, 3, 0.1, 1);
        let inputs = Array2::zeros((0, 5));
        let h0 = array![0.1, 0.2, 0.3];

        let (outputs, h) = gru.forward(&inputs, Some(&h0)).unwrap();

        assert_eq!(outputs.shape(), &[0, 3]);
        assert_eq!(h, h0);
    }

    #[test]
    fn test_states_stay_bounded() {
        let gru = Gru::new(4, 8, 1.0, 3);
        let inputs = Array2::from_shape_fn((50, 4), |(i, j)| (i * 4 + j) as f64 - 100.0);

        let (outputs, _) = gru.forward(&inputs, None).unwrap();

        assert!(outputs.iter().all(|v| v.is_finite() && v.abs() <= 1.0));
    }

    #[test]
    fn test_shape_errors() {
        let gru = Gru::new(3, 2, 0.1, 0);

        let wrong_width = Array2::zeros((2, 4));
        assert!(matches!(
            gru.forward(&wrong_width, None),
            Err(ComputeError::ShapeError(_))
        ));

        let inputs = Array2::zeros((2, 3));
        let wrong_state = array![0.0, 0.0, 0.0];
        assert!(matches!(
            gru.forward(&inputs, Some(&wrong_state)),
            Err(ComputeError::ShapeError(_))
        ));
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let gru = Gru::new(2, 2, 0.1, 0);
        let inputs = array![[0.0, 1.0], [f64::NAN, 0.0]];

        match gru.forward(&inputs, None) {
            Err(ComputeError::ConversionError { row, column, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "0");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
