//! Colour ramps and intensity windows for slice images
//!
//! Slices are drawn through a greyscale ramp; overlays use a warm red ramp
//! whose opacity rises with the overlay value.

/// Lower/upper percentile used for the mosaic intensity window
pub const WINDOW_PERCENTILES: (f64, f64) = (0.5, 99.5);

/// Intensity range mapped onto a colour ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityWindow {
    pub vmin: f64,
    pub vmax: f64,
}

impl IntensityWindow {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        IntensityWindow { vmin, vmax }
    }

    /// Map `value` into [0, 1], clamping outside the window
    ///
    /// A degenerate window maps everything to 0. NaN stays NaN.
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.vmax - self.vmin;
        if range <= 0.0 {
            return if value.is_nan() { f64::NAN } else { 0.0 };
        }
        ((value - self.vmin) / range).clamp(0.0, 1.0)
    }
}

/// ColorBrewer "Reds", light to dark
const REDS: [[u8; 3]; 9] = [
    [0xff, 0xf5, 0xf0],
    [0xfe, 0xe0, 0xd2],
    [0xfc, 0xbb, 0xa1],
    [0xfc, 0x92, 0x72],
    [0xfb, 0x6a, 0x4a],
    [0xef, 0x3b, 0x2c],
    [0xcb, 0x18, 0x1d],
    [0xa5, 0x0f, 0x15],
    [0x67, 0x00, 0x0d],
];

/// Colour ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Black at 0 to white at 1
    GreysReversed,
    /// Near-white at 0 to dark red at 1
    Reds,
}

impl Colormap {
    /// RGB for a normalised value in [0, 1]
    pub fn rgb(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Colormap::GreysReversed => {
                let g = (t * 255.0).round() as u8;
                [g, g, g]
            }
            Colormap::Reds => {
                let pos = t * (REDS.len() - 1) as f64;
                let lo = pos.floor() as usize;
                let hi = (lo + 1).min(REDS.len() - 1);
                let frac = pos - lo as f64;
                let mut out = [0u8; 3];
                for c in 0..3 {
                    let a = REDS[lo][c] as f64;
                    let b = REDS[hi][c] as f64;
                    out[c] = (a + (b - a) * frac).round() as u8;
                }
                out
            }
        }
    }
}

/// Linear opacity ramp over the normalised value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaRamp {
    pub start: f64,
    pub end: f64,
}

impl AlphaRamp {
    pub const OPAQUE: AlphaRamp = AlphaRamp { start: 1.0, end: 1.0 };
    /// Transparent at 0, 75% opaque at 1
    pub const OVERLAY: AlphaRamp = AlphaRamp { start: 0.0, end: 0.75 };

    pub fn alpha(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.start + (self.end - self.start) * t
    }
}

/// A colormap paired with its opacity ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    pub colormap: Colormap,
    pub alpha: AlphaRamp,
}

impl ColorRamp {
    pub const GREYSCALE: ColorRamp = ColorRamp {
        colormap: Colormap::GreysReversed,
        alpha: AlphaRamp::OPAQUE,
    };
    pub const OVERLAY: ColorRamp = ColorRamp {
        colormap: Colormap::Reds,
        alpha: AlphaRamp::OVERLAY,
    };

    /// RGBA for a normalised value, alpha scaled to 0-255
    pub fn rgba(&self, t: f64) -> [u8; 4] {
        let [r, g, b] = self.colormap.rgb(t);
        let a = (self.alpha.alpha(t) * 255.0).round() as u8;
        [r, g, b, a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_normalize() {
        let w = IntensityWindow::new(10.0, 20.0);
        assert_eq!(w.normalize(10.0), 0.0);
        assert_eq!(w.normalize(15.0), 0.5);
        assert_eq!(w.normalize(25.0), 1.0);
        assert_eq!(w.normalize(-5.0), 0.0);
        assert!(w.normalize(f64::NAN).is_nan());
    }

    #[test]
    fn test_degenerate_window() {
        let w = IntensityWindow::new(3.0, 3.0);
        assert_eq!(w.normalize(3.0), 0.0);
        assert_eq!(w.normalize(100.0), 0.0);
    }

    #[test]
    fn test_greyscale_ramp() {
        assert_eq!(ColorRamp::GREYSCALE.rgba(0.0), [0, 0, 0, 255]);
        assert_eq!(ColorRamp::GREYSCALE.rgba(1.0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_overlay_ramp_alpha() {
        assert_eq!(ColorRamp::OVERLAY.rgba(0.0)[3], 0);
        assert_eq!(ColorRamp::OVERLAY.rgba(1.0)[3], 191);
        assert!((AlphaRamp::OVERLAY.alpha(0.5) - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_reds_endpoints_are_warm() {
        assert_eq!(Colormap::Reds.rgb(0.0), [0xff, 0xf5, 0xf0]);
        assert_eq!(Colormap::Reds.rgb(1.0), [0x67, 0x00, 0x0d]);
        let [r, g, b] = Colormap::Reds.rgb(0.6);
        assert!(r > g && r > b, "mid ramp should be red-dominant");
    }
}
