//! Discrete simulation events and the sinks that consume them.
//!
//! The simulation only ever writes events; sinks never feed anything back.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Something noteworthy that happened during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    AttemptStarted {
        generation: u32,
        index: usize,
        population_size: usize,
    },
    FellOff,
    Stuck,
    TimedOut,
    NewRecord {
        fitness: f32,
    },
    /// Carries the generation that just finished
    GenerationComplete {
        generation: u32,
    },
    Reset,
}

impl SimEvent {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::AttemptStarted { .. } => "🧬",
            Self::FellOff => "💀",
            Self::Stuck => "🔒",
            Self::TimedOut => "⏱",
            Self::NewRecord { .. } => "🎉",
            Self::GenerationComplete { .. } => "✨",
            Self::Reset => "🔄",
        }
    }

    /// Human-readable description
    pub fn message(&self) -> String {
        match self {
            Self::AttemptStarted {
                index,
                population_size,
                ..
            } => format!("Testing {}/{}", index + 1, population_size),
            Self::FellOff => "Fell off".to_string(),
            Self::Stuck => "Got stuck".to_string(),
            Self::TimedOut => "Timed out".to_string(),
            Self::NewRecord { fitness } => format!("New record: {}px!", fitness.floor()),
            Self::GenerationComplete { generation } => format!("Gen {} complete", generation),
            Self::Reset => "Reset complete".to_string(),
        }
    }
}

/// Consumer of simulation events
pub trait EventSink {
    fn record(&mut self, at_ms: u64, event: &SimEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&mut self, at_ms: u64, event: &SimEvent) {
        match event {
            SimEvent::AttemptStarted { .. } => log::debug!("[{}ms] {}", at_ms, event.message()),
            _ => log::info!("[{}ms] {}", at_ms, event.message()),
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _at_ms: u64, _event: &SimEvent) {}
}

/// A single activity log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at_ms: u64,
    pub icon: String,
    pub message: String,
    pub event: SimEvent,
}

/// Bounded, newest-first activity feed
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Count of entries matching `pred`
    pub fn count(&self, pred: impl Fn(&SimEvent) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.event)).count()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(50)
    }
}

impl EventSink for ActivityLog {
    fn record(&mut self, at_ms: u64, event: &SimEvent) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(LogEntry {
            at_ms,
            icon: event.icon().to_string(),
            message: event.message(),
            event: event.clone(),
        });
        self.entries.truncate(self.capacity);
    }
}

/// Fan out to two sinks
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn record(&mut self, at_ms: u64, event: &SimEvent) {
        self.0.record(at_ms, event);
        self.1.record(at_ms, event);
    }
}
