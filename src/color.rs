use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Fixed colours for the attribution sources, so every chart on the
/// attribution page agrees.
const SOURCE_COLORS: &[(&str, Color32)] = &[
    ("direct", Color32::from_rgb(0x63, 0x6E, 0xFA)),
    ("referral", Color32::from_rgb(0xEE, 0x82, 0xEE)),
    ("google", Color32::from_rgb(0x11, 0x77, 0x33)),
    ("attentive", Color32::from_rgb(0xCC, 0x66, 0x77)),
    ("facebook", Color32::from_rgb(0x99, 0x99, 0x33)),
];

/// Maps series labels (sources, stores, campaign groups) to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the distinct labels, in the order given.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let palette = generate_palette(labels.len());
        let mapping: BTreeMap<String, Color32> = labels.into_iter().zip(palette).collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Colour map for attribution sources; unknown sources get generated hues.
    pub fn for_sources<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = ColorMap::new(labels);
        for (source, color) in SOURCE_COLORS {
            if let Some(slot) = map.mapping.get_mut(*source) {
                *slot = *color;
            }
        }
        map
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(l, c): (&String, &Color32)| (l.clone(), *c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        assert_ne!(p[0], p[1]);
    }

    #[test]
    fn known_sources_use_fixed_colours() {
        let map = ColorMap::for_sources(["direct", "tiktok"]);
        assert_eq!(map.color_for("direct"), Color32::from_rgb(0x63, 0x6E, 0xFA));
        assert_ne!(map.color_for("tiktok"), Color32::GRAY);
        assert_eq!(map.color_for("unknown"), Color32::GRAY);
        assert_eq!(map.legend_entries().len(), 2);
    }
}
