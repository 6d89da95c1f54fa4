//! Character-cell measurement for sizing terminal grids.
//!
//! Whether the host reports fractional rectangles is detected once by the
//! host and handed in as a [`Calibration`]; nothing here probes or caches
//! process-wide state.

use livedesk_common::WindowId;
use tracing::debug;

use crate::platform::FontMetrics;

/// Host capabilities relevant to measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Calibration {
    /// The host reports sub-pixel widths for measured text.
    pub fractional_rects: bool,
}

impl Calibration {
    /// How many sample characters to measure. Hosts with whole-pixel
    /// rectangles need a longer run for the same precision.
    pub fn sample_len(&self) -> usize {
        if self.fractional_rects {
            50
        } else {
            100
        }
    }

    pub fn sample(&self) -> String {
        "X".repeat(self.sample_len())
    }
}

/// Measured extent of a sample run, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRect {
    pub width: f64,
    pub height: f64,
}

/// Size of one character cell, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharSize {
    pub width: f64,
    pub height: f64,
}

impl CharSize {
    /// `None` when the sample has no extent (pane hidden or detached).
    pub fn from_sample(rect: SampleRect, calibration: Calibration) -> Option<Self> {
        let (width, height) = if calibration.fractional_rects {
            (rect.width, rect.height)
        } else {
            (rect.width.floor(), rect.height.floor())
        };
        let size = Self {
            width: width / calibration.sample_len() as f64,
            height,
        };
        (size.width > 0.0 && size.height > 0.0).then_some(size)
    }
}

/// Pixel size of a pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneSize {
    pub width: f64,
    pub height: f64,
}

/// Terminal grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub cols: u32,
    pub rows: u32,
}

impl GridSize {
    /// Whole cells that fit in `pane`, never less than 1x1.
    pub fn fit(pane: PaneSize, cell: CharSize) -> Self {
        let fit = |px: f64, cell: f64| ((px / cell).floor() as u32).max(1);
        Self {
            cols: fit(pane.width, cell.width),
            rows: fit(pane.height, cell.height),
        }
    }
}

/// A measurement probe attached to one pane.
pub(crate) struct Metrics {
    probe: Box<dyn FontMetrics>,
    calibration: Calibration,
    current: Option<CharSize>,
}

impl Metrics {
    pub(crate) fn new(probe: Box<dyn FontMetrics>, calibration: Calibration) -> Self {
        let mut metrics = Self {
            probe,
            calibration,
            current: None,
        };
        metrics.refresh();
        metrics
    }

    pub(crate) fn character_size(&self) -> Option<CharSize> {
        self.current
    }

    /// Re-measure. Returns true when the cell size changed.
    pub(crate) fn refresh(&mut self) -> bool {
        let measured = self
            .probe
            .measure(&self.calibration.sample())
            .and_then(|rect| CharSize::from_sample(rect, self.calibration));
        match measured {
            Some(size) if self.current != Some(size) => {
                self.current = Some(size);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn destroy(mut self, id: &WindowId) {
        debug!(window = %id, "metrics probe destroyed");
        self.probe.destroy();
    }
}
