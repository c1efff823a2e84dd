//! Analysis Window
//!
//! Blackman-Harris window coefficients for the spectrum analyzer.
//! Four-term window: ~92dB sidelobe rejection, main lobe 8 bins wide.

const A0: f32 = 0.35875;
const A1: f32 = 0.48829;
const A2: f32 = 0.14128;
const A3: f32 = 0.01168;

/// Blackman-Harris coefficient for sample `n` of a symmetric window of `size`
fn blackman_harris(n: usize, size: usize) -> f32 {
    if size < 2 {
        return 1.0;
    }
    let phase = 2.0 * std::f32::consts::PI * n as f32 / (size - 1) as f32;
    A0 - A1 * phase.cos() + A2 * (2.0 * phase).cos() - A3 * (3.0 * phase).cos()
}

/// Pre-computed window lookup table
#[derive(Debug, Clone)]
pub struct WindowTable {
    coeffs: Vec<f32>,
}

impl WindowTable {
    pub fn blackman_harris(size: usize) -> Self {
        let coeffs = (0..size).map(|i| blackman_harris(i, size)).collect();
        Self { coeffs }
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    #[inline]
    pub fn apply(&self, sample: f32, index: usize) -> f32 {
        sample * self.coeffs[index]
    }

    /// Multiply `data` by the window in place
    pub fn multiply(&self, data: &mut [f32]) {
        debug_assert_eq!(data.len(), self.coeffs.len(), "Window size mismatch");
        for (sample, w) in data.iter_mut().zip(&self.coeffs) {
            *sample *= w;
        }
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coeffs
    }
}
