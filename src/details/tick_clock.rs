use std::time::Instant;

/// Millisecond tick counter relative to a session-local epoch.
///
/// Only differences between two readings are meaningful; the counter wraps after
/// about 49 days, so subtract with `wrapping_sub`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TickClock {
    epoch: Instant,
}

impl TickClock {
    pub(crate) fn start() -> Self {
        TickClock { epoch: Instant::now() }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn now_ms(&self) -> u32 {
        // truncation is the wrap-around
        self.epoch.elapsed().as_millis() as u32
    }
}
