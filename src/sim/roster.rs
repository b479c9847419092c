#![forbid(unsafe_code)]

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Working,
    Discussing,
}

/// Static roster entry for a simulated collaborator. The roster is fixed
/// configuration: agents are never created or destroyed at runtime and
/// `status` is cosmetic.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Agent {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub avatar: &'static str,
    pub color: &'static str,
    pub status: AgentStatus,
}

pub const ROSTER: &[Agent] = &[
    Agent {
        id: "pm",
        name: "Alex Chen",
        role: "Project Manager",
        avatar: "👨‍💼",
        color: "#00D9FF",
        status: AgentStatus::Working,
    },
    Agent {
        id: "research",
        name: "Sara Kim",
        role: "Research Agent",
        avatar: "🔍",
        color: "#FF6B9D",
        status: AgentStatus::Working,
    },
    Agent {
        id: "frontend",
        name: "Marcus Johnson",
        role: "Frontend Developer",
        avatar: "👨‍💻",
        color: "#00FF94",
        status: AgentStatus::Working,
    },
    Agent {
        id: "backend",
        name: "Emily Rodriguez",
        role: "Backend Developer",
        avatar: "🧑‍💻",
        color: "#FFB800",
        status: AgentStatus::Working,
    },
    Agent {
        id: "qa",
        name: "David Park",
        role: "QA Engineer",
        avatar: "🧪",
        color: "#9B59B6",
        status: AgentStatus::Working,
    },
    Agent {
        id: "docs",
        name: "Lisa Wong",
        role: "Documentation Writer",
        avatar: "📚",
        color: "#E74C3C",
        status: AgentStatus::Working,
    },
];

/// Lookup by agent id. Callers rendering messages must skip unknown
/// references rather than fail.
#[must_use]
pub fn find(id: &str) -> Option<&'static Agent> {
    ROSTER.iter().find(|a| a.id == id)
}
