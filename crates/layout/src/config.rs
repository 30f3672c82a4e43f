#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Line box height as a multiple of the font size.
    ///
    /// Defaults to `1.4`.
    pub line_height: f32,

    /// Upper bound on measurement passes when settling the auto-fit scale.
    ///
    /// Each pass is one full measurement of the body. Defaults to `8`.
    pub max_fit_passes: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_height: 1.4,
            max_fit_passes: 8,
        }
    }
}
