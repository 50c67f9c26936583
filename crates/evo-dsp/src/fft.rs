//! In-place iterative radix-2 FFT
//!
//! Decimation in time: bit-reversal permutation, then log2(N) butterfly
//! stages. Each stage evaluates cos/sin once for its base angle and rotates
//! the twiddle incrementally, so there is no trigonometry per butterfly.
//! Error growth from the rotation is bounded by the stage count (8 at N=256).

use evo_core::{EvoError, EvoResult, Sample};
use std::f32::consts::PI;

use crate::consts::FFT_SIZE;

/// Forward transform of the fixed analysis window
#[inline]
pub fn transform(re: &mut [Sample; FFT_SIZE], im: &mut [Sample; FFT_SIZE]) {
    radix2(re, im);
}

/// Forward transform of arbitrary power-of-two slices
pub fn fft_in_place(re: &mut [Sample], im: &mut [Sample]) -> EvoResult<()> {
    check_lengths(re, im)?;
    radix2(re, im);
    Ok(())
}

/// Inverse transform (scaled by 1/N) via the conjugation identity
pub fn ifft_in_place(re: &mut [Sample], im: &mut [Sample]) -> EvoResult<()> {
    check_lengths(re, im)?;

    for v in im.iter_mut() {
        *v = -*v;
    }
    radix2(re, im);

    let scale = 1.0 / re.len() as Sample;
    for (r, i) in re.iter_mut().zip(im.iter_mut()) {
        *r *= scale;
        *i = -*i * scale;
    }
    Ok(())
}

/// Symmetric Hann window, `0.5 - 0.5 cos(2πi / (N-1))`
pub fn hann_window<const N: usize>() -> [Sample; N] {
    let denom = (N.max(2) - 1) as Sample;
    std::array::from_fn(|i| 0.5 - 0.5 * (2.0 * PI * i as Sample / denom).cos())
}

fn check_lengths(re: &[Sample], im: &[Sample]) -> EvoResult<()> {
    if re.len() != im.len() {
        return Err(EvoError::LengthMismatch {
            expected: re.len(),
            actual: im.len(),
        });
    }
    if !re.len().is_power_of_two() {
        return Err(EvoError::InvalidFftSize(re.len()));
    }
    Ok(())
}

/// Core transform. Callers guarantee equal power-of-two lengths.
fn radix2(re: &mut [Sample], im: &mut [Sample]) {
    let n = re.len();
    if n < 2 {
        return;
    }
    let bits = n.trailing_zeros();

    // Bit-reversal permutation
    for i in 1..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if i < j {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    // Butterflies
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let angle = -2.0 * PI / len as Sample;
        let (step_sin, step_cos) = angle.sin_cos();

        for start in (0..n).step_by(len) {
            let mut w_cos: Sample = 1.0;
            let mut w_sin: Sample = 0.0;

            for k in 0..half {
                let u = start + k;
                let v = u + half;

                let vr = re[v] * w_cos - im[v] * w_sin;
                let vi = re[v] * w_sin + im[v] * w_cos;
                let (ur, ui) = (re[u], im[u]);

                re[u] = ur + vr;
                im[u] = ui + vi;
                re[v] = ur - vr;
                im[v] = ui - vi;

                let next_cos = w_cos * step_cos - w_sin * step_sin;
                w_sin = w_cos * step_sin + w_sin * step_cos;
                w_cos = next_cos;
            }
        }
        len <<= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_impulse_is_flat() {
        let mut re = [0.0; FFT_SIZE];
        let mut im = [0.0; FFT_SIZE];
        re[0] = 1.0;
        transform(&mut re, &mut im);
        for k in 0..FFT_SIZE {
            assert_abs_diff_eq!(re[k], 1.0, epsilon = 1e-6);
            assert_abs_diff_eq!(im[k], 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_dc_lands_in_bin_zero() {
        let mut re = [0.5; FFT_SIZE];
        let mut im = [0.0; FFT_SIZE];
        transform(&mut re, &mut im);
        assert_abs_diff_eq!(re[0], 0.5 * FFT_SIZE as f32, epsilon = 1e-3);
        for k in 1..FFT_SIZE {
            assert_abs_diff_eq!(re[k], 0.0, epsilon = 1e-3);
            assert_abs_diff_eq!(im[k], 0.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_rejects_bad_sizes() {
        let mut re = vec![0.0; 100];
        let mut im = vec![0.0; 100];
        assert!(matches!(
            fft_in_place(&mut re, &mut im),
            Err(EvoError::InvalidFftSize(100))
        ));

        let mut re = vec![0.0; 64];
        let mut im = vec![0.0; 32];
        assert!(matches!(
            fft_in_place(&mut re, &mut im),
            Err(EvoError::LengthMismatch { expected: 64, actual: 32 })
        ));
    }

    #[test]
    fn test_round_trip() {
        let original: Vec<f32> = (0..FFT_SIZE)
            .map(|i| ((i * 37 % 101) as f32 / 50.0) - 1.0)
            .collect();
        let mut re = original.clone();
        let mut im = vec![0.0; FFT_SIZE];

        fft_in_place(&mut re, &mut im).unwrap();
        ifft_in_place(&mut re, &mut im).unwrap();

        for (a, b) in re.iter().zip(original.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-4);
        }
        for v in &im {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_hann_window_shape() {
        let w = hann_window::<FFT_SIZE>();
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w[FFT_SIZE - 1], 0.0, epsilon = 1e-6);
        // Symmetric
        for i in 0..FFT_SIZE / 2 {
            assert_abs_diff_eq!(w[i], w[FFT_SIZE - 1 - i], epsilon = 1e-5);
        }
        assert!(w[FFT_SIZE / 2] > 0.99);
    }
}
