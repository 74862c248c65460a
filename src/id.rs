//! Snowflake-style record identifiers.
//!
//! Layout: 41-bit millisecond timestamp (from [`BASE_EPOCH_MS`]), 5-bit node
//! id, 5-bit worker id, 12-bit per-tick sequence. Identifiers are unique
//! within a deployment and sort by creation time.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// January 30, 2024 12:30:00 (UTC-6), in Unix milliseconds.
pub const BASE_EPOCH_MS: u64 = 1_706_639_400_000;

const NODE_BITS: u64 = 5;
const WORKER_BITS: u64 = 5;
const SEQUENCE_BITS: u64 = 12;

const MAX_NODE: u64 = (1 << NODE_BITS) - 1;
const MAX_WORKER: u64 = (1 << WORKER_BITS) - 1;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;

const TIMESTAMP_SHIFT: u64 = NODE_BITS + WORKER_BITS + SEQUENCE_BITS;
const NODE_SHIFT: u64 = WORKER_BITS + SEQUENCE_BITS;
const WORKER_SHIFT: u64 = SEQUENCE_BITS;

#[derive(Debug)]
struct TickState {
    last_tick: u64,
    sequence: u64,
}

/// Thread-safe identifier generator. One instance per process, shared across
/// request handlers.
#[derive(Debug)]
pub struct SnowflakeGenerator {
    node: u64,
    worker: u64,
    state: Mutex<TickState>,
}

impl SnowflakeGenerator {
    /// Node and worker values outside `0..=31` fall back to 1 with a logged
    /// warning; misconfiguration at startup is not fatal.
    pub fn new(node: u64, worker: u64) -> Self {
        let node = if node > MAX_NODE {
            tracing::warn!(node, "snowflake node id out of range, defaulting to 1");
            1
        } else {
            node
        };
        let worker = if worker > MAX_WORKER {
            tracing::warn!(worker, "snowflake worker id out of range, defaulting to 1");
            1
        } else {
            worker
        };
        Self {
            node,
            worker,
            state: Mutex::new(TickState {
                last_tick: 0,
                sequence: 0,
            }),
        }
    }

    /// Generate the next identifier as a decimal string.
    ///
    /// Identifiers from the same generator are strictly increasing. When the
    /// per-tick sequence is exhausted the call spins into the next
    /// millisecond rather than failing.
    pub fn next_id(&self) -> String {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        // Never step backwards if the wall clock does.
        let mut tick = current_millis().max(state.last_tick);
        if tick == state.last_tick {
            if state.sequence >= MAX_SEQUENCE {
                while tick <= state.last_tick {
                    std::hint::spin_loop();
                    tick = current_millis();
                }
                state.sequence = 0;
            } else {
                state.sequence += 1;
            }
        } else {
            state.sequence = 0;
        }
        state.last_tick = tick;

        let id = (tick.saturating_sub(BASE_EPOCH_MS) << TIMESTAMP_SHIFT)
            | (self.node << NODE_SHIFT)
            | (self.worker << WORKER_SHIFT)
            | state.sequence;
        id.to_string()
    }
}

fn current_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
