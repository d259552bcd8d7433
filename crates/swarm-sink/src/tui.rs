//! Terminal-UI sink.
//!
//! The engine must never block on rendering, so this sink forwards every
//! row as a message into an internal channel consumed by its own thread.
//! The consumer folds messages into a [`TuiState`] snapshot that a renderer
//! polls at its own cadence; the rendering model itself lives outside the
//! engine.

use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use swarm_enemy::DetectionRow;
use swarm_telemetry::{SimulationStateRow, SwarmEventRow, TelemetryRow};

use crate::sink::EventSink;
use crate::{SinkError, SinkResult};

/// Bounded history kept for detections and swarm events.
const HISTORY_LIMIT: usize = 50;

// ── Messages ──────────────────────────────────────────────────────────────────

enum TuiMessage {
    Telemetry(TelemetryRow),
    Detection(DetectionRow),
    SwarmEvent(SwarmEventRow),
    State(SimulationStateRow),
    AdminStatus(bool),
}

// ── Shared state ──────────────────────────────────────────────────────────────

/// The renderer-facing snapshot maintained by the consumer thread.
#[derive(Default)]
pub struct TuiState {
    /// Latest telemetry row per drone id.
    pub telemetry: HashMap<String, TelemetryRow>,
    /// Most recent detections, oldest first.
    pub detections: VecDeque<DetectionRow>,
    /// Most recent swarm events, oldest first.
    pub events: VecDeque<SwarmEventRow>,
    /// The last simulation-state row seen.
    pub state: Option<SimulationStateRow>,
    /// Whether an admin surface is attached.
    pub admin_active: bool,
}

impl TuiState {
    fn apply(&mut self, msg: TuiMessage) {
        match msg {
            TuiMessage::Telemetry(row) => {
                self.telemetry.insert(row.drone_id.clone(), row);
            }
            TuiMessage::Detection(row) => {
                if self.detections.len() == HISTORY_LIMIT {
                    self.detections.pop_front();
                }
                self.detections.push_back(row);
            }
            TuiMessage::SwarmEvent(row) => {
                if self.events.len() == HISTORY_LIMIT {
                    self.events.pop_front();
                }
                self.events.push_back(row);
            }
            TuiMessage::State(row) => self.state = Some(row),
            TuiMessage::AdminStatus(active) => self.admin_active = active,
        }
    }
}

// ── Sink ──────────────────────────────────────────────────────────────────────

/// Forwards rows into the TUI event loop.
pub struct TuiSink {
    tx: Option<Sender<TuiMessage>>,
    handle: Option<JoinHandle<()>>,
    state: Arc<Mutex<TuiState>>,
}

impl TuiSink {
    /// Start the consumer thread and return the sink.
    pub fn spawn() -> Self {
        let (tx, rx): (Sender<TuiMessage>, Receiver<TuiMessage>) = channel();
        let state = Arc::new(Mutex::new(TuiState::default()));
        let thread_state = Arc::clone(&state);
        let handle = std::thread::spawn(move || {
            // Runs until every sender is dropped.
            while let Ok(msg) = rx.recv() {
                if let Ok(mut st) = thread_state.lock() {
                    st.apply(msg);
                }
            }
        });
        Self {
            tx: Some(tx),
            handle: Some(handle),
            state,
        }
    }

    /// Handle for the renderer to poll.
    pub fn state(&self) -> Arc<Mutex<TuiState>> {
        Arc::clone(&self.state)
    }

    fn send(&mut self, msg: TuiMessage) -> SinkResult<()> {
        match &self.tx {
            Some(tx) => tx.send(msg).map_err(|_| SinkError::Closed),
            None => Err(SinkError::Closed),
        }
    }
}

impl EventSink for TuiSink {
    fn write_telemetry(&mut self, row: &TelemetryRow) -> SinkResult<()> {
        self.send(TuiMessage::Telemetry(row.clone()))
    }

    fn write_detection(&mut self, row: &DetectionRow) -> SinkResult<()> {
        self.send(TuiMessage::Detection(row.clone()))
    }

    fn write_swarm_event(&mut self, row: &SwarmEventRow) -> SinkResult<()> {
        self.send(TuiMessage::SwarmEvent(row.clone()))
    }

    fn write_state(&mut self, row: &SimulationStateRow) -> SinkResult<()> {
        self.send(TuiMessage::State(row.clone()))
    }

    fn set_admin_status(&mut self, active: bool) {
        let _ = self.send(TuiMessage::AdminStatus(active));
    }

    fn close(&mut self) -> SinkResult<()> {
        // Dropping the sender ends the consumer loop; join so pending
        // messages are folded in before we return.
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        Ok(())
    }
}

impl Drop for TuiSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
