//! Uniform body scaling so each page's content fits its fixed frame.

/// Scale updates closer than this to the current value are ignored.
pub const SCALE_HYSTERESIS: f32 = 0.001;

/// Overflow tolerated after rounding the scale to three decimals, in px.
pub(crate) const FIT_TOLERANCE: f32 = 0.5;

/// `min(1, available / needed)` rounded to three decimals.
///
/// Degenerate measurements (either side not positive) yield 1.
pub fn fit_scale(available: f32, needed: f32) -> f32 {
    if available <= 0.0 || needed <= 0.0 {
        return 1.0;
    }
    round3((available / needed).min(1.0))
}

/// Width the body is laid out at so that, once scaled, it still fills `width`.
pub fn layout_width(width: f32, scale: f32) -> f32 {
    if scale < 1.0 && scale > 0.0 { width / scale } else { width }
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

/// Current scale of one page body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoFit {
    scale: f32,
}

impl Default for AutoFit {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl AutoFit {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Recomputes the scale from a fresh measurement. Returns whether it changed.
    ///
    /// Zero-sized measurements are skipped and keep the previous scale.
    pub fn observe(&mut self, available: f32, needed: f32) -> bool {
        if available <= 0.0 || needed <= 0.0 {
            return false;
        }
        self.update(fit_scale(available, needed))
    }

    /// Adopts `candidate` unless it is within [`SCALE_HYSTERESIS`] of the current scale.
    pub fn update(&mut self, candidate: f32) -> bool {
        let candidate = round3(candidate);
        if (self.scale - candidate).abs() < SCALE_HYSTERESIS - f32::EPSILON {
            return false;
        }
        self.scale = candidate;
        true
    }
}

/// Result of settling one page body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOutcome {
    pub scale: f32,
    /// Width the body is laid out at before scaling.
    pub layout_width: f32,
    /// Natural height at the frame width.
    pub needed: f32,
    pub passes: u32,
}

impl FitOutcome {
    pub fn is_scaled(&self) -> bool {
        self.scale < 1.0
    }
}

/// Settles the scale of a body `width` wide in a frame `available` tall.
///
/// The first pass measures at the frame width. The next pass lays the body
/// out at the widened width of that scale; if it now needs less room a larger
/// scale is tried, and accepted only if the body re-measured at that scale's
/// width still fits. Rejected candidates are bisected until the remaining
/// gap is below [`SCALE_HYSTERESIS`] or `max_passes` measurements were made.
pub fn settle<M>(width: f32, available: f32, max_passes: u32, measure: M) -> FitOutcome
where
    M: Fn(f32) -> f32,
{
    let needed = measure(width);
    let mut fit = AutoFit::default();
    fit.observe(available, needed);
    let mut passes = 1;

    if fit.scale() < 1.0 && passes < max_passes {
        passes += 1;
        let mut lo = fit.scale();
        let widened = measure(layout_width(width, lo));
        // Rounding may have pushed the first scale past the exact ratio.
        if widened * lo > available + FIT_TOLERANCE {
            lo = round3(lo - SCALE_HYSTERESIS);
        }
        let mut hi = fit_scale(available, widened);
        let mut trial = hi;
        while trial - lo >= SCALE_HYSTERESIS && passes < max_passes {
            passes += 1;
            if measure(layout_width(width, trial)) * trial <= available + FIT_TOLERANCE {
                lo = trial;
            } else {
                hi = trial;
            }
            trial = round3((lo + hi) / 2.0);
        }
        fit.scale = lo;
    }

    log::debug!(
        "Body settled at scale {:.3} after {} pass(es) (needed {:.1}px of {:.1}px)",
        fit.scale(),
        passes,
        needed,
        available
    );

    FitOutcome {
        scale: fit.scale(),
        layout_width: layout_width(width, fit.scale()),
        needed,
        passes,
    }
}
