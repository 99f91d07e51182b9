//! Horizontal zoom/pan over the time axis.
//!
//! A `ZoomTransform` is a scale factor `k` plus an x translation. The
//! source data is never touched; the chart asks for a rescaled copy of its
//! base time scale instead.

use super::scale::TimeScale;

/// Wheel delta (pixels) to log2 zoom factor.
const WHEEL_SENSITIVITY: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform { k: 1.0, x: 0.0 };

    pub fn apply_x(&self, px: f64) -> f64 {
        px * self.k + self.x
    }

    pub fn invert_x(&self, px: f64) -> f64 {
        (px - self.x) / self.k
    }

    /// Shift by `dx` in the transform's own (unscaled) units.
    pub fn translate(&self, dx: f64) -> Self {
        Self {
            k: self.k,
            x: self.x + self.k * dx,
        }
    }

    /// Copy of `scale` whose domain is what is visible under this transform.
    pub fn rescale_x(&self, scale: &TimeScale) -> TimeScale {
        let (r0, r1) = scale.range();
        let d0 = scale.invert(self.invert_x(r0));
        let d1 = scale.invert(self.invert_x(r1));
        TimeScale::new((d0, d1), (r0, r1))
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Zoom state plus the limits it is kept within.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomBehavior {
    scale_extent: (f64, f64),
    /// Viewport x extent.
    extent: (f64, f64),
    /// Region the viewport may never leave.
    translate_extent: (f64, f64),
    transform: ZoomTransform,
}

impl ZoomBehavior {
    /// Zoom over `[0, width]`, scale factor bounded to `[1, 10000]`.
    pub fn new(width: f64) -> Self {
        Self::with_limits((1.0, 10_000.0), (0.0, width), (0.0, width))
    }

    pub fn with_limits(
        scale_extent: (f64, f64),
        extent: (f64, f64),
        translate_extent: (f64, f64),
    ) -> Self {
        Self {
            scale_extent,
            extent,
            translate_extent,
            transform: ZoomTransform::IDENTITY,
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn scale_extent(&self) -> (f64, f64) {
        self.scale_extent
    }

    pub fn reset(&mut self) {
        self.transform = ZoomTransform::IDENTITY;
    }

    /// Zoom to factor `k`, keeping the time under `pointer_x` in place.
    pub fn scale_to(&mut self, k: f64, pointer_x: f64) -> ZoomTransform {
        let t = self.transform;
        let anchor = t.invert_x(pointer_x);
        let k1 = k.clamp(self.scale_extent.0, self.scale_extent.1);
        let next = ZoomTransform {
            k: k1,
            x: pointer_x - anchor * k1,
        };
        self.transform = self.constrain(next);
        self.transform
    }

    pub fn scale_by(&mut self, factor: f64, pointer_x: f64) -> ZoomTransform {
        let k = self.transform.k * factor;
        self.scale_to(k, pointer_x)
    }

    /// Wheel gesture: negative deltas zoom in.
    pub fn wheel(&mut self, delta_y: f64, pointer_x: f64) -> ZoomTransform {
        self.scale_by(2f64.powf(-delta_y * WHEEL_SENSITIVITY), pointer_x)
    }

    /// Drag gesture: move the view by `dx` screen pixels.
    pub fn translate_by(&mut self, dx: f64) -> ZoomTransform {
        let t = self.transform;
        let next = ZoomTransform {
            k: t.k,
            x: t.x + dx,
        };
        self.transform = self.constrain(next);
        self.transform
    }

    fn constrain(&self, t: ZoomTransform) -> ZoomTransform {
        let dx0 = t.invert_x(self.extent.0) - self.translate_extent.0;
        let dx1 = t.invert_x(self.extent.1) - self.translate_extent.1;
        let shift = if dx1 > dx0 {
            (dx0 + dx1) / 2.0
        } else {
            let left = dx0.min(0.0);
            if left != 0.0 {
                left
            } else {
                dx1.max(0.0)
            }
        };
        t.translate(shift)
    }
}
