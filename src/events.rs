use std::collections::VecDeque;

use crate::text::Range;

/// Notifications produced by a language mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightEvent {
    /// The grammar finished loading and the whole buffer was indexed
    Ready,
    /// The grammar failed to load; the mode stays degraded
    LoadFailed { message: String },
    /// Highlighting inside `range` changed and must be redrawn
    Changed { range: Range },
}

impl HighlightEvent {
    pub fn changed(range: Range) -> Self {
        Self::Changed { range }
    }

    pub fn load_failed(message: impl Into<String>) -> Self {
        Self::LoadFailed {
            message: message.into(),
        }
    }
}

/// FIFO of undelivered events
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<HighlightEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: HighlightEvent) {
        log::trace!(target: "irodori::events", "{:?}", event);
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return every queued event, oldest first
    pub fn drain(&mut self) -> Vec<HighlightEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Position;

    #[test]
    fn test_drain_returns_events_in_order_and_empties() {
        let mut queue = EventQueue::new();
        queue.push(HighlightEvent::Ready);
        queue.push(HighlightEvent::changed(Range::new(Position::ZERO, Position::new(1, 0))));

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], HighlightEvent::Ready);
        assert!(queue.is_empty());
    }
}
