#![forbid(unsafe_code)]

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Analysis,
    Code,
    Discussion,
    Completion,
}

impl MessageKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Code => "code",
            Self::Discussion => "discussion",
            Self::Completion => "completion",
        }
    }
}

/// One scheduled line of scripted dialogue. `offset` is absolute from the
/// moment the run starts, not relative to the previous entry.
#[derive(Debug, Clone, Copy)]
pub struct ScriptEntry {
    pub offset: Duration,
    pub agent_id: &'static str,
    pub content: &'static str,
    pub kind: MessageKind,
}

/// An ordered schedule plus the settle period the run stays active for
/// after the final entry fires.
#[derive(Debug, Clone)]
pub struct Script {
    pub entries: Vec<ScriptEntry>,
    pub grace: Duration,
}

impl Script {
    /// The fixed collaboration script the demo replays: seven entries at
    /// one-second offsets, two seconds of settle.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            entries: vec![
                ScriptEntry {
                    offset: Duration::from_millis(1000),
                    agent_id: "pm",
                    content: "Analyzing requirements for the futuristic task manager. \
                              Breaking down into 6 core modules: UI/UX, 3D rendering, \
                              authentication, API design, testing, and documentation.",
                    kind: MessageKind::Analysis,
                },
                ScriptEntry {
                    offset: Duration::from_millis(2000),
                    agent_id: "research",
                    content: "Recommending a WebGL scene graph for the 3D components \
                              with shader-driven neon effects. Performance target: \
                              60fps on mid-range devices.",
                    kind: MessageKind::Analysis,
                },
                ScriptEntry {
                    offset: Duration::from_millis(3000),
                    agent_id: "frontend",
                    content: "Implementing 3D task cubes with hover animations and lazy \
                              loading. Component architecture: TaskCube, Scene, \
                              Dashboard, AgentPanel.",
                    kind: MessageKind::Code,
                },
                ScriptEntry {
                    offset: Duration::from_millis(4000),
                    agent_id: "backend",
                    content: "RESTful API design: /api/tasks (CRUD), /api/auth (JWT), \
                              /api/users. Schema indexed on status and priority fields \
                              for optimal queries.",
                    kind: MessageKind::Code,
                },
                ScriptEntry {
                    offset: Duration::from_millis(5000),
                    agent_id: "qa",
                    content: "Test suite includes: unit tests for task operations, \
                              integration tests for API endpoints, E2E tests for 3D \
                              interactions. Coverage target: 90%+",
                    kind: MessageKind::Analysis,
                },
                ScriptEntry {
                    offset: Duration::from_millis(6000),
                    agent_id: "docs",
                    content: "Documentation structure: README.md, API.md, \
                              DEPLOYMENT.md, ARCHITECTURE.md. Including setup \
                              instructions, tech stack overview, and contribution \
                              guidelines.",
                    kind: MessageKind::Completion,
                },
                ScriptEntry {
                    offset: Duration::from_millis(7000),
                    agent_id: "pm",
                    content: "All agents reporting progress. Estimated completion: \
                              Frontend 85%, Backend 70%, Testing 60%, Documentation \
                              80%. Prioritizing core 3D functionality.",
                    kind: MessageKind::Discussion,
                },
            ],
            grace: Duration::from_millis(2000),
        }
    }

    /// Duration from run start until the active flag clears.
    #[must_use]
    pub fn settle_after(&self) -> Duration {
        self.entries
            .iter()
            .map(|e| e.offset)
            .max()
            .unwrap_or_default()
            + self.grace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::roster;

    #[test]
    fn standard_script_offsets_strictly_increase() {
        let script = Script::standard();
        assert_eq!(script.entries.len(), 7);
        for pair in script.entries.windows(2) {
            assert!(pair[0].offset < pair[1].offset);
        }
        assert_eq!(script.settle_after(), Duration::from_millis(9000));
    }

    #[test]
    fn standard_script_references_known_agents() {
        for entry in Script::standard().entries {
            assert!(roster::find(entry.agent_id).is_some(), "unknown agent {}", entry.agent_id);
        }
    }
}
