//! Linear time ↔ pixel projection.

/// Maps epoch seconds in `domain` onto pixels in `[0, width]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub domain: (f64, f64),
    pub width: f64,
}

impl TimeScale {
    pub fn new(domain: (f64, f64), width: f64) -> Self {
        Self {
            domain,
            width: width.max(0.0),
        }
    }

    fn span(&self) -> f64 {
        self.domain.1 - self.domain.0
    }

    pub fn to_px(&self, t: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }
        (t - self.domain.0) / span * self.width
    }

    pub fn invert(&self, px: f64) -> f64 {
        if self.width <= 0.0 {
            return self.domain.0;
        }
        self.domain.0 + px / self.width * self.span()
    }

    /// Pixel length of `secs` seconds.
    pub fn secs_to_px(&self, secs: f64) -> f64 {
        let span = self.span();
        if span <= 0.0 {
            return 0.0;
        }
        secs / span * self.width
    }

    pub fn clamp_px(&self, px: f64) -> f64 {
        px.clamp(0.0, self.width)
    }
}
