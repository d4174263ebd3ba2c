#![forbid(unsafe_code)]

//! Split-panel drag geometry.
//!
//! Wide layouts show the live wall next to a side panel whose width is a
//! ratio of the viewport. The panel sits on the right, so dragging the
//! divider left grows it: the ratio delta is `(start_x - x) / width`.
//! The ratio is clamped on every move, never after the fact, so a drag
//! released outside the band still leaves a valid layout.

use cardwall_core::WallConfig;

#[derive(Debug, Clone, Copy)]
struct DragOrigin {
    start_x: f64,
    start_ratio: f64,
}

#[derive(Debug)]
pub struct ViewportSplitter {
    ratio: f64,
    min: f64,
    max: f64,
    drag: Option<DragOrigin>,
}

impl ViewportSplitter {
    pub fn new(config: &WallConfig) -> Self {
        Self {
            ratio: config.split_ratio.clamp(config.split_min, config.split_max),
            min: config.split_min,
            max: config.split_max,
            drag: None,
        }
    }

    /// Anchor a drag at the pointer's current position. Starting a new drag
    /// while one is active re-anchors it, which is what happens when a
    /// pointer-up was lost.
    pub fn begin(&mut self, pointer_x: f64) {
        self.drag = Some(DragOrigin {
            start_x: pointer_x,
            start_ratio: self.ratio,
        });
    }

    /// Move the divider. Returns whether the ratio changed. Ignored when no
    /// drag is active or the viewport width is degenerate.
    pub fn update(&mut self, pointer_x: f64, viewport_width: f64) -> bool {
        let Some(origin) = self.drag else {
            return false;
        };
        if viewport_width <= 0.0 {
            return false;
        }
        let delta = (origin.start_x - pointer_x) / viewport_width;
        let next = (origin.start_ratio + delta).clamp(self.min, self.max);
        if (next - self.ratio).abs() < f64::EPSILON {
            return false;
        }
        self.ratio = next;
        true
    }

    /// End the drag. Returns whether a drag was actually active, so the
    /// caller can skip quiet-period scheduling for spurious pointer-ups.
    pub fn finish(&mut self) -> bool {
        self.drag.take().is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }
}
