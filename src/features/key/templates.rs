//! Key profiles
//!
//! Defines tonal profiles for 24 keys (12 major + 12 minor). Each profile is indexed from
//! its tonic; templates for other tonics are cyclic rotations.

use serde::Serialize;

/// Reference profile family used for key matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum KeyProfile {
    /// Diatonic membership: 1 for scale degrees in the mode, 0 otherwise
    #[default]
    Binary,
    /// Krumhansl-Kessler key-profile ratings
    KrumhanslKessler,
}

impl KeyProfile {
    /// Profile for a major key with tonic C
    pub fn major(&self) -> [f32; 12] {
        match self {
            KeyProfile::Binary => [1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            KeyProfile::KrumhanslKessler => [
                6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
            ],
        }
    }

    /// Profile for a minor key with tonic C
    pub fn minor(&self) -> [f32; 12] {
        match self {
            KeyProfile::Binary => [1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0],
            KeyProfile::KrumhanslKessler => [
                6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
            ],
        }
    }
}

/// Rotate a tonic-indexed profile so its tonic lands on pitch class `tonic`
///
/// `rotated[(j + tonic) % 12] = profile[j]`
pub fn rotate(profile: &[f32; 12], tonic: usize) -> [f32; 12] {
    let mut rotated = [0.0f32; 12];
    for (j, &v) in profile.iter().enumerate() {
        rotated[(j + tonic) % 12] = v;
    }
    rotated
}

/// Key templates for all 24 keys
#[derive(Debug, Clone)]
pub struct KeyTemplates {
    /// Major key templates (12 keys: C, C#, D, ..., B)
    pub major: [[f32; 12]; 12],

    /// Minor key templates (12 keys: C, C#, D, ..., B)
    pub minor: [[f32; 12]; 12],
}

impl KeyTemplates {
    /// Build all 24 rotations of the given profile family
    pub fn new(profile: KeyProfile) -> Self {
        let major_base = profile.major();
        let minor_base = profile.minor();
        Self {
            major: std::array::from_fn(|tonic| rotate(&major_base, tonic)),
            minor: std::array::from_fn(|tonic| rotate(&minor_base, tonic)),
        }
    }

    /// Get template for a major key (0 = C, 11 = B)
    pub fn get_major_template(&self, key_idx: usize) -> &[f32; 12] {
        &self.major[key_idx % 12]
    }

    /// Get template for a minor key (0 = C, 11 = B)
    pub fn get_minor_template(&self, key_idx: usize) -> &[f32; 12] {
        &self.minor[key_idx % 12]
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new(KeyProfile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_profiles_are_diatonic() {
        let t = KeyTemplates::new(KeyProfile::Binary);
        assert_eq!(t.major[0].iter().sum::<f32>(), 7.0);
        assert_eq!(t.minor[0].iter().sum::<f32>(), 7.0);
    }

    #[test]
    fn test_rotation_moves_tonic() {
        let t = KeyTemplates::new(KeyProfile::Binary);
        // G major: G A B C D E F#
        let g_major = t.get_major_template(7);
        for pc in [7, 9, 11, 0, 2, 4, 6] {
            assert_eq!(g_major[pc], 1.0, "pitch class {} should be in G major", pc);
        }
        assert_eq!(g_major[5], 0.0);
    }

    #[test]
    fn test_relative_keys_share_binary_template() {
        // C major and A minor contain the same pitch classes
        let t = KeyTemplates::new(KeyProfile::Binary);
        assert_eq!(t.get_major_template(0), t.get_minor_template(9));
    }

    #[test]
    fn test_krumhansl_tonic_weight_highest() {
        let t = KeyTemplates::new(KeyProfile::KrumhanslKessler);
        for tonic in 0..12 {
            let major = t.get_major_template(tonic);
            let max = major.iter().copied().fold(f32::MIN, f32::max);
            assert_eq!(major[tonic], max);
        }
    }

    #[test]
    fn test_rotate_wraps() {
        let mut profile = [0.0f32; 12];
        profile[0] = 1.0;
        profile[11] = 2.0;
        let r = rotate(&profile, 3);
        assert_eq!(r[3], 1.0);
        assert_eq!(r[2], 2.0);
    }
}
