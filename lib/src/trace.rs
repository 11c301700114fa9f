//! Recursion trace events emitted by the evaluator.
//!
//! The visited stack that guards against cyclic shapes doubles as a debugging
//! aid: every time the evaluator enters a shape, hits a cycle, or gives up at the
//! depth limit it reports a [`TraceEvent`] to the configured [`TraceSink`].

use crate::model::ConstraintKind;
use oxigraph::model::Term;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    EnterShape {
        shape: Term,
        focus: Term,
        depth: usize,
    },
    /// The (shape, node) pair was already on the visited stack.
    CycleDetected {
        shape: Term,
        node: Term,
    },
    DepthLimitReached {
        shape: Term,
        node: Term,
        depth: usize,
    },
    ConstraintFailed {
        shape: Term,
        component: Option<ConstraintKind>,
        focus: Term,
        value: Option<Term>,
    },
}

/// Consumer for trace events. Implementations may buffer, stream, or drop.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn record(&self, _event: TraceEvent) {}
}

/// Buffers every event in memory.
#[derive(Default)]
pub struct MemoryTraceSink {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemoryTraceSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl TraceSink for MemoryTraceSink {
    fn record(&self, event: TraceEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
