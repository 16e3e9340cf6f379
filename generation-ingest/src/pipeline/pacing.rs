use std::time::Duration;

/// How long the pipeline waits after finishing a window.
pub trait Pacer: Send + Sync {
    fn delay_after(&self, window_index: usize) -> Duration;
}

/// Same pause after every window.
#[derive(Debug, Clone, Copy)]
pub struct FixedPacing(pub Duration);

impl Pacer for FixedPacing {
    fn delay_after(&self, _window_index: usize) -> Duration {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn delay_after(&self, _window_index: usize) -> Duration {
        Duration::ZERO
    }
}
