//! Chroma normalization strategies

use super::N_CHROMA;

/// Columns whose peak is below this are treated as silent
const EPSILON: f32 = 1e-10;

/// Scale a chroma column so its largest bin is 1.0
///
/// Silent columns (peak below epsilon) are zeroed rather than amplified, so quiet
/// passages do not bias the aggregate distribution.
pub fn normalize_column(chroma: &mut [f32; N_CHROMA]) {
    let peak = chroma.iter().copied().fold(0.0f32, f32::max);
    if peak <= EPSILON {
        *chroma = [0.0; N_CHROMA];
        return;
    }
    chroma.iter_mut().for_each(|v| *v /= peak);
}

/// Sharpen chroma vector to emphasize prominent semitones
///
/// Raises every bin to `power` and renormalizes to a unit peak. `power == 1.0`
/// leaves the column unchanged.
pub fn sharpen_chroma(chroma: &mut [f32; N_CHROMA], power: f32) {
    if (power - 1.0).abs() <= f32::EPSILON {
        return;
    }
    chroma.iter_mut().for_each(|v| *v = v.max(0.0).powf(power));
    normalize_column(chroma);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_column_unit_peak() {
        let mut c = [0.0f32; 12];
        c[2] = 4.0;
        c[9] = 2.0;
        normalize_column(&mut c);
        assert_eq!(c[2], 1.0);
        assert_eq!(c[9], 0.5);
    }

    #[test]
    fn test_normalize_silent_column_stays_zero() {
        let mut c = [1e-12f32; 12];
        normalize_column(&mut c);
        assert_eq!(c, [0.0; 12]);
    }

    #[test]
    fn test_sharpen_emphasizes_peak() {
        let mut c = [0.0f32; 12];
        c[0] = 1.0;
        c[4] = 0.5;
        sharpen_chroma(&mut c, 2.0);
        assert_eq!(c[0], 1.0);
        assert!((c[4] - 0.25).abs() < 1e-6);

        let mut unchanged = c;
        sharpen_chroma(&mut unchanged, 1.0);
        assert_eq!(unchanged, c);
    }
}
