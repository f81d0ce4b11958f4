use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// First hue of the chart palette, a mid blue.
const SERIES_BASE_HUE: f32 = 210.0;

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting at `base_hue` degrees.
pub fn generate_palette(n: usize, base_hue: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (base_hue + i as f32 * 360.0 / n as f32) % 360.0;
            let hsl = Hsl::new(hue, 0.70, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Colour for the `index`-th chart series out of `count`.
pub fn series_color(index: usize, count: usize) -> Color32 {
    generate_palette(count.max(1), SERIES_BASE_HUE)
        .get(index)
        .copied()
        .unwrap_or(Color32::LIGHT_BLUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colors() {
        assert!(generate_palette(0, SERIES_BASE_HUE).is_empty());
        let colors = generate_palette(3, SERIES_BASE_HUE);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
    }

    #[test]
    fn base_hue_rotates_the_palette() {
        let shifted = generate_palette(2, SERIES_BASE_HUE + 180.0);
        assert_eq!(shifted[0], generate_palette(2, SERIES_BASE_HUE)[1]);
    }

    #[test]
    fn out_of_range_series_falls_back() {
        assert_eq!(series_color(5, 2), Color32::LIGHT_BLUE);
        assert_eq!(series_color(0, 2), generate_palette(2, SERIES_BASE_HUE)[0]);
    }
}
