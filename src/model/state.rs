use serde::{Deserialize, Serialize};

/// Coarse classification of workflow states, used for rollup counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateGroup {
    Backlog,
    Unstarted,
    Started,
    Completed,
    Cancelled,
}

impl StateGroup {
    /// All groups in canonical display order
    pub const ALL: [StateGroup; 5] = [
        StateGroup::Backlog,
        StateGroup::Unstarted,
        StateGroup::Started,
        StateGroup::Completed,
        StateGroup::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StateGroup::Backlog => "backlog",
            StateGroup::Unstarted => "unstarted",
            StateGroup::Started => "started",
            StateGroup::Completed => "completed",
            StateGroup::Cancelled => "cancelled",
        }
    }

    /// Parse a state-group label (as sent by the API)
    pub fn parse(s: &str) -> Option<StateGroup> {
        match s {
            "backlog" => Some(StateGroup::Backlog),
            "unstarted" => Some(StateGroup::Unstarted),
            "started" => Some(StateGroup::Started),
            "completed" => Some(StateGroup::Completed),
            "cancelled" => Some(StateGroup::Cancelled),
            _ => None,
        }
    }

    /// Whether states in this group count as closed work
    pub fn is_terminal(self) -> bool {
        matches!(self, StateGroup::Completed | StateGroup::Cancelled)
    }
}

impl std::fmt::Display for StateGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A workflow state as configured per project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Stable identifier
    pub id: String,
    /// Display name (e.g. "In Progress")
    pub name: String,
    /// The group this state rolls up into
    pub group: StateGroup,
    /// Owning project
    pub project_id: String,
}

impl WorkflowState {
    pub fn new(id: &str, name: &str, group: StateGroup, project_id: &str) -> Self {
        WorkflowState {
            id: id.to_string(),
            name: name.to_string(),
            group,
            project_id: project_id.to_string(),
        }
    }
}
