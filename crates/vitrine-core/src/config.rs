//! View construction tunables.
//!
//! These knobs are passed into every view at attach time rather than living
//! in process-wide statics, so two views over the same stop can disagree and
//! each view stays independently testable.

/// Default ceiling on the element count any view will report.
pub const DEFAULT_DISPLAY_CAP: usize = 255;

/// Tunables consulted by every container view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig
{
    /// Maximum element count a view ever reports. Bounds the worst-case
    /// traversal cost for pathological or corrupt containers.
    pub display_cap: usize,
    /// Whether linked-list size discovery runs cycle detection before
    /// committing to a full walk.
    pub detect_cycles: bool,
}

impl Default for ViewConfig
{
    fn default() -> Self
    {
        Self {
            display_cap: DEFAULT_DISPLAY_CAP,
            detect_cycles: true,
        }
    }
}

impl ViewConfig
{
    /// Replace the display cap.
    #[must_use]
    pub fn with_display_cap(mut self, cap: usize) -> Self
    {
        self.display_cap = cap;
        self
    }

    /// Enable or disable linked-list cycle detection.
    #[must_use]
    pub fn with_cycle_detection(mut self, enabled: bool) -> Self
    {
        self.detect_cycles = enabled;
        self
    }
}
