#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::task::JoinHandle;

use crate::sim::roster::{Agent, ROSTER};
use crate::sim::script::{MessageKind, Script};

/// One emitted, timestamped, attributed line of scripted dialogue.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentMessage {
    pub id: String,
    pub agent_id: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub kind: MessageKind,
}

#[derive(Default)]
struct TimelineState {
    messages: Vec<AgentMessage>,
    active: bool,
    generation: u64,
    pending: Vec<JoinHandle<()>>,
}

/// Replays a fixed script of agent messages on tokio timers. Each `start`
/// is tagged with a run generation; timer callbacks re-check the generation
/// under the lock before touching state, so a superseded run can never
/// resurrect messages after `clear` or a restart.
///
/// `start` must be called from within a tokio runtime.
pub struct AgentTimeline {
    state: Arc<Mutex<TimelineState>>,
    script: Script,
}

impl AgentTimeline {
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimelineState::default())),
            script,
        }
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::new(Script::standard())
    }

    #[must_use]
    pub fn roster(&self) -> &'static [Agent] {
        ROSTER
    }

    /// Ordered sequence emitted by the current run.
    #[must_use]
    pub fn messages(&self) -> Vec<AgentMessage> {
        lock(&self.state).messages.clone()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }

    /// Begins (or restarts) a run: clears the sequence, cancels anything
    /// still pending from a prior run and schedules every script entry at
    /// its absolute offset. The active flag clears on its own one grace
    /// period after the final entry fires.
    pub fn start(&self) {
        let generation = {
            let mut st = lock(&self.state);
            st.generation += 1;
            for handle in st.pending.drain(..) {
                handle.abort();
            }
            st.messages.clear();
            st.active = true;
            st.generation
        };

        let mut handles = Vec::with_capacity(self.script.entries.len() + 1);
        for (index, entry) in self.script.entries.iter().copied().enumerate() {
            let state = Arc::clone(&self.state);
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(entry.offset).await;
                let mut st = lock(&state);
                if st.generation != generation {
                    return;
                }
                let now = OffsetDateTime::now_utc();
                st.messages.push(AgentMessage {
                    // Index keeps ids unique when entries share a millisecond.
                    id: format!("{}-{}-{index}", entry.agent_id, unix_millis(now)),
                    agent_id: entry.agent_id.to_owned(),
                    content: entry.content.to_owned(),
                    timestamp: now,
                    kind: entry.kind,
                });
            }));
        }

        let settle_after = self.script.settle_after();
        let state = Arc::clone(&self.state);
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(settle_after).await;
            let mut st = lock(&state);
            if st.generation != generation {
                return;
            }
            st.active = false;
        }));

        let mut st = lock(&self.state);
        if st.generation == generation {
            st.pending = handles;
        } else {
            // A clear() or restart raced us between the two locks.
            for handle in handles {
                handle.abort();
            }
        }
    }

    /// Unconditional cancellation: empties the sequence, forces the active
    /// flag false and invalidates every pending timer immediately.
    pub fn clear(&self) {
        let mut st = lock(&self.state);
        st.generation += 1;
        for handle in st.pending.drain(..) {
            handle.abort();
        }
        st.messages.clear();
        st.active = false;
    }
}

fn lock(state: &Arc<Mutex<TimelineState>>) -> MutexGuard<'_, TimelineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unix_millis(at: OffsetDateTime) -> i128 {
    at.unix_timestamp_nanos() / 1_000_000
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sim::script::ScriptEntry;

    fn entry(offset_ms: u64, agent_id: &'static str) -> ScriptEntry {
        ScriptEntry {
            offset: Duration::from_millis(offset_ms),
            agent_id,
            content: "line",
            kind: MessageKind::Discussion,
        }
    }

    fn short_script() -> Script {
        Script {
            entries: vec![entry(100, "pm"), entry(200, "research"), entry(300, "qa")],
            grace: Duration::from_millis(200),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_emits_full_script_in_order_then_settles() {
        let timeline = AgentTimeline::new(short_script());
        timeline.start();
        assert!(timeline.is_active());
        assert!(timeline.messages().is_empty());

        tokio::time::sleep(Duration::from_millis(350)).await;
        let messages = timeline.messages();
        assert_eq!(messages.len(), 3);
        let agents: Vec<_> = messages.iter().map(|m| m.agent_id.as_str()).collect();
        assert_eq!(agents, vec!["pm", "research", "qa"]);
        for pair in messages.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        // All entries fired but the grace period has not elapsed.
        assert!(timeline.is_active());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!timeline.is_active());
        assert_eq!(timeline.messages().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn message_ids_are_unique_within_a_run() {
        let script = Script {
            // Same offset and agent: only the sequence index distinguishes.
            entries: vec![entry(50, "pm"), entry(50, "pm")],
            grace: Duration::from_millis(50),
        };
        let timeline = AgentTimeline::new(script);
        timeline.start();
        tokio::time::sleep(Duration::from_millis(80)).await;
        let messages = timeline.messages();
        assert_eq!(messages.len(), 2);
        assert_ne!(messages[0].id, messages[1].id);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_pending_firings() {
        let timeline = AgentTimeline::new(short_script());
        timeline.start();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(timeline.messages().len(), 1);

        timeline.clear();
        assert!(!timeline.is_active());
        assert!(timeline.messages().is_empty());

        // Well past every original offset: nothing resurrects.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(timeline.messages().is_empty());
        assert!(!timeline.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_supersedes_the_previous_run() {
        let timeline = AgentTimeline::new(short_script());
        timeline.start();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(timeline.messages().len(), 2);
        let restarted_at = OffsetDateTime::now_utc();

        timeline.start();
        assert!(timeline.is_active());
        assert!(timeline.messages().is_empty());

        tokio::time::sleep(Duration::from_millis(350)).await;
        let messages = timeline.messages();
        assert_eq!(messages.len(), 3);
        // Every message belongs to the fresh run.
        for m in &messages {
            assert!(m.timestamp >= restarted_at);
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!timeline.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_script_settles_after_grace_alone() {
        let timeline = AgentTimeline::new(Script {
            entries: Vec::new(),
            grace: Duration::from_millis(100),
        });
        timeline.start();
        assert!(timeline.is_active());
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!timeline.is_active());
        assert!(timeline.messages().is_empty());
    }
}
