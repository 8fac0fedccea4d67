use serde::Serialize;

/// Running counters for one `SlidingWindow`.
///
/// Counts accumulate across `reset()`; `SlidingWindow::clear_stats` zeroes them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStats {
    pub buffers_in: usize,
    pub frames_in: usize,
    pub windows_emitted: usize,
    /// Windows produced by `flush()`, zero-padded or not.
    pub padded_windows: usize,
    pub frames_evicted: usize,
}

impl WindowStats {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
