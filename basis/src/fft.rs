//! Planned three-dimensional complex FFT on a row-major grid
//!
//! The grid buffer is laid out as a row-major `s0 x s1 x s2` array, i.e. the flat
//! index of point `(m0, m1, m2)` is `(m0 * s1 + m1) * s2 + m2`. Both directions are
//! unnormalized; the operator layer applies the `1/N` factors.

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct Fft3d {
    shape: [usize; 3],
    forward: [Arc<dyn Fft<f64>>; 3],
    inverse: [Arc<dyn Fft<f64>>; 3],
}

impl fmt::Debug for Fft3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft3d").field("shape", &self.shape).finish()
    }
}

impl Fft3d {
    pub fn new(shape: [usize; 3]) -> Fft3d {
        let mut planner = FftPlanner::<f64>::new();
        let forward = shape.map(|n| planner.plan_fft_forward(n));
        let inverse = shape.map(|n| planner.plan_fft_inverse(n));
        Fft3d {
            shape,
            forward,
            inverse,
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// In-place forward transform, kernel `exp(-2 pi i k m / s)`.
    pub fn forward(&self, data: &mut [Complex64]) {
        self.transform(data, &self.forward);
    }

    /// In-place inverse transform, kernel `exp(+2 pi i k m / s)`, no normalization.
    pub fn inverse(&self, data: &mut [Complex64]) {
        self.transform(data, &self.inverse);
    }

    fn transform(&self, data: &mut [Complex64], plans: &[Arc<dyn Fft<f64>>; 3]) {
        assert_eq!(
            data.len(),
            self.len(),
            "FFT buffer of length {} does not match grid {:?}",
            data.len(),
            self.shape
        );
        let scratch_len = plans
            .iter()
            .map(|p| p.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        let mut scratch = vec![Complex64::default(); scratch_len];

        // The last axis is contiguous, every other axis is gathered into lines first.
        plans[2].process_with_scratch(data, &mut scratch);
        let mut lines = vec![Complex64::default(); data.len()];
        for axis in [1, 0] {
            let n = self.shape[axis];
            let stride: usize = self.shape[axis + 1..].iter().product();
            let outer = data.len() / (n * stride);
            for o in 0..outer {
                for inner in 0..stride {
                    let line = (o * stride + inner) * n;
                    for k in 0..n {
                        lines[line + k] = data[(o * n + k) * stride + inner];
                    }
                }
            }
            plans[axis].process_with_scratch(&mut lines, &mut scratch);
            for o in 0..outer {
                for inner in 0..stride {
                    let line = (o * stride + inner) * n;
                    for k in 0..n {
                        data[(o * n + k) * stride + inner] = lines[line + k];
                    }
                }
            }
        }
    }
}
