//! Accessibility on-tone selection
//!
//! Given a resolved surface color, pick the candidate "on-tone" (text and
//! icon color) with the highest WCAG contrast ratio against it. The store
//! re-runs this whenever a surface variable changes.

use prism_core::Color;

/// Default candidates when a layer supplies no alternates.
pub const DEFAULT_ON_TONES: [Color; 2] = [Color::BLACK, Color::WHITE];

/// Pick the candidate with the highest contrast ratio against `surface`.
/// Equal ratios go to the darker candidate, so black wins the tie on a
/// mid-tone surface.
pub fn select_on_tone(surface: Color, candidates: &[Color]) -> Color {
    let mut best = candidates.first().copied().unwrap_or(Color::BLACK);
    let mut best_ratio = Color::contrast_ratio(best, surface);
    let mut best_luminance = best.relative_luminance();

    for &candidate in candidates.iter().skip(1) {
        let ratio = Color::contrast_ratio(candidate, surface);
        let luminance = candidate.relative_luminance();
        if ratio > best_ratio || (ratio == best_ratio && luminance < best_luminance) {
            best = candidate;
            best_ratio = ratio;
            best_luminance = luminance;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_surface_selects_black() {
        assert_eq!(select_on_tone(Color::WHITE, &DEFAULT_ON_TONES), Color::BLACK);
    }

    #[test]
    fn black_surface_selects_white() {
        assert_eq!(select_on_tone(Color::BLACK, &DEFAULT_ON_TONES), Color::WHITE);
    }

    #[test]
    fn ties_break_toward_black() {
        // A surface equidistant from both candidates in contrast terms.
        let surface = Color::rgb(0.5, 0.5, 0.5);
        let same_distance = [Color::WHITE, Color::BLACK];
        let picked = select_on_tone(surface, &same_distance);
        // Not a true tie in WCAG space, but black must win whenever its
        // ratio is at least equal.
        let black_ratio = Color::contrast_ratio(Color::BLACK, surface);
        let white_ratio = Color::contrast_ratio(Color::WHITE, surface);
        if black_ratio >= white_ratio {
            assert_eq!(picked, Color::BLACK);
        } else {
            assert_eq!(picked, Color::WHITE);
        }
    }

    #[test]
    fn layer_specific_alternates_are_honored() {
        let surface = Color::parse_hex("#1e1e2e").unwrap();
        let alternates = [
            Color::parse_hex("#cdd6f4").unwrap(),
            Color::parse_hex("#313244").unwrap(),
        ];
        assert_eq!(select_on_tone(surface, &alternates), alternates[0]);
    }
}
