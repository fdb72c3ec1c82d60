//! Brush colours and the colour-to-material seam.
//!
//! vstroke never picks materials itself. Hosts pass a [`MaterialResolver`]
//! that maps a normalized colour to whatever handle their renderer uses;
//! [`QuantizedPalette`] is a ready-made resolver that snaps colours to a
//! fixed set of palette entries so strokes can share materials.

use vstroke_math::Rgba;

use crate::settings::PaletteSettings;

/// Maps a normalized RGBA colour to an opaque material handle.
pub trait MaterialResolver {
    /// Handle type produced for the renderer.
    type Handle;

    /// Handle for `color`.
    fn resolve(&self, color: Rgba) -> Self::Handle;
}

impl<F, H> MaterialResolver for F
where
    F: Fn(Rgba) -> H,
{
    type Handle = H;

    fn resolve(&self, color: Rgba) -> H {
        self(color)
    }
}

/// Cyclic colour gradient with evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    stops: Vec<Rgba>,
}

impl ColorPalette {
    /// Gradient through `stops`, wrapping from the last back to the first.
    ///
    /// An empty list gives a plain white palette.
    pub fn new(stops: Vec<Rgba>) -> Self {
        if stops.is_empty() {
            return Self {
                stops: vec![Rgba::WHITE],
            };
        }
        Self { stops }
    }

    /// Gradient stops.
    pub fn stops(&self) -> &[Rgba] {
        &self.stops
    }

    /// Colour at position `t`, wrapped into `[0, 1)`.
    pub fn sample(&self, t: f64) -> Rgba {
        let n = self.stops.len();
        let x = wrap_unit(t) * n as f64;
        let i = (x.floor() as usize).min(n - 1);
        let f = x - i as f64;
        self.stops[i].lerp(self.stops[(i + 1) % n], f)
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(PaletteSettings::default().stops)
    }
}

impl From<&PaletteSettings> for ColorPalette {
    fn from(settings: &PaletteSettings) -> Self {
        Self::new(settings.stops.clone())
    }
}

/// Wrap `t` into `[0, 1)`.
pub fn wrap_unit(t: f64) -> f64 {
    let w = t.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if w >= 1.0 {
        0.0
    } else {
        w
    }
}

/// A fixed set of colours sampled from a palette; resolves any colour to
/// the index of its nearest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedPalette {
    colours: Vec<Rgba>,
}

impl QuantizedPalette {
    /// Sample `count` colours (clamped to 4..=256) at `i / count`.
    pub fn new(palette: &ColorPalette, count: usize) -> Self {
        let count = count.clamp(4, 256);
        let colours = (0..count)
            .map(|i| palette.sample(i as f64 / count as f64))
            .collect();
        Self { colours }
    }

    /// Build from settings.
    pub fn from_settings(settings: &PaletteSettings) -> Self {
        Self::new(&ColorPalette::from(settings), settings.distinct_colours)
    }

    /// The palette entries.
    pub fn colours(&self) -> &[Rgba] {
        &self.colours
    }

    /// Index of the entry closest to `color` in RGB; ties go to the lower index.
    pub fn nearest(&self, color: &Rgba) -> usize {
        let mut best = 0;
        let mut best_distance = f64::MAX;
        for (idx, c) in self.colours.iter().enumerate() {
            let d = color.rgb_distance(c);
            if d < best_distance {
                best_distance = d;
                best = idx;
            }
        }
        best
    }
}

impl MaterialResolver for QuantizedPalette {
    type Handle = usize;

    fn resolve(&self, color: Rgba) -> usize {
        self.nearest(&color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bw() -> ColorPalette {
        ColorPalette::new(vec![Rgba::BLACK, Rgba::WHITE])
    }

    #[test]
    fn test_sample_interpolates_between_stops() {
        let p = bw();
        assert_eq!(p.sample(0.0), Rgba::BLACK);
        assert_eq!(p.sample(0.5), Rgba::WHITE);
        let quarter = p.sample(0.25);
        assert_relative_eq!(quarter.r, 0.5, epsilon = 1e-12);
        // wraps from white back to black
        let three_quarters = p.sample(0.75);
        assert_relative_eq!(three_quarters.g, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_wraps() {
        let p = bw();
        assert_eq!(p.sample(1.5), p.sample(0.5));
        assert_eq!(p.sample(-0.5), p.sample(0.5));
        assert_relative_eq!(p.sample(-0.25).r, p.sample(0.75).r, epsilon = 1e-12);
    }

    #[test]
    fn test_wrap_unit() {
        assert_eq!(wrap_unit(0.0), 0.0);
        assert_eq!(wrap_unit(1.0), 0.0);
        assert_relative_eq!(wrap_unit(2.25), 0.25);
        assert_relative_eq!(wrap_unit(-0.25), 0.75);
        assert!(wrap_unit(-1e-20) < 1.0);
    }

    #[test]
    fn test_empty_palette_is_white() {
        let p = ColorPalette::new(Vec::new());
        assert_eq!(p.sample(0.3), Rgba::WHITE);
    }

    #[test]
    fn test_quantized_count_clamped() {
        assert_eq!(QuantizedPalette::new(&bw(), 1).colours().len(), 4);
        assert_eq!(QuantizedPalette::new(&bw(), 1000).colours().len(), 256);
        assert_eq!(QuantizedPalette::new(&bw(), 64).colours().len(), 64);
    }

    #[test]
    fn test_nearest_colour() {
        let q = QuantizedPalette::new(&bw(), 4);
        // entries: black, grey, white, grey
        assert_eq!(q.resolve(Rgba::rgb(0.1, 0.1, 0.1)), 0);
        assert_eq!(q.resolve(Rgba::rgb(0.9, 0.95, 1.0)), 2);
        // both greys are equally close: lowest index wins
        assert_eq!(q.resolve(Rgba::rgb(0.5, 0.5, 0.5)), 1);
        // alpha does not matter
        assert_eq!(q.resolve(Rgba::new(0.0, 0.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn test_default_palette_resolves_primaries() {
        let q = QuantizedPalette::from_settings(&PaletteSettings::default());
        let red = q.resolve(Rgba::rgb(1.0, 0.0, 0.0));
        assert_eq!(q.colours()[red], Rgba::rgb(1.0, 0.0, 0.0));
        let blue = q.resolve(Rgba::rgb(0.0, 0.0, 1.0));
        assert_relative_eq!(q.colours()[blue].b, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |c: Rgba| format!("{:.1},{:.1},{:.1}", c.r, c.g, c.b);
        assert_eq!(resolver.resolve(Rgba::rgb(1.0, 0.5, 0.0)), "1.0,0.5,0.0");
    }
}
