use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Issue priority. `None` is a real bucket on priority-grouped boards,
/// not an absence of data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
    #[default]
    None,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "urgent" => Some(Priority::Urgent),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            "none" => Some(Priority::None),
            _ => None,
        }
    }

    /// Rank for derived ordering: urgent sorts first, none last
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
            Priority::None => 4,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A work item as cached from the API, carrying every attribute the
/// board layouts group, order, and schedule by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Stable identifier
    pub id: String,
    /// Owning project
    pub project_id: String,
    /// Display title
    pub name: String,
    /// Per-project issue number (rendered as `PREFIX-<sequence_id>`)
    #[serde(default)]
    pub sequence_id: u64,
    /// Fractional ordering key within a bucket
    pub sort_order: f64,
    /// Workflow state
    #[serde(default)]
    pub state_id: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub module_ids: Vec<String>,
    #[serde(default)]
    pub cycle_id: Option<String>,
    /// Author; set on creation, never blank in API data
    #[serde(default)]
    pub created_by: Option<String>,
    /// Hierarchy edge; `None` for top-level items
    #[serde(default)]
    pub parent_id: Option<String>,

    // --- Timeline ---
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl WorkItem {
    /// Create a minimal item; grouping attributes start empty
    pub fn new(id: &str, project_id: &str, name: &str, sort_order: f64) -> Self {
        WorkItem {
            id: id.to_string(),
            project_id: project_id.to_string(),
            name: name.to_string(),
            sequence_id: 0,
            sort_order,
            state_id: None,
            priority: Priority::None,
            assignee_ids: Vec::new(),
            label_ids: Vec::new(),
            module_ids: Vec::new(),
            cycle_id: None,
            created_by: None,
            parent_id: None,
            start_date: None,
            target_date: None,
        }
    }

    /// Display identifier like `WEB-42`
    pub fn display_id(&self, project_prefix: &str) -> String {
        format!("{}-{}", project_prefix, self.sequence_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_round_trip() {
        for p in Priority::ALL {
            assert_eq!(Priority::parse(p.as_str()), Some(p));
        }
        assert_eq!(Priority::parse("critical"), None);
    }

    #[test]
    fn test_priority_rank_order() {
        let mut ranks: Vec<u8> = Priority::ALL.iter().map(|p| p.rank()).collect();
        let sorted = ranks.clone();
        ranks.sort_unstable();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_item_deserialize_minimal() {
        // API payloads omit unset attributes; defaults must fill in
        let item: WorkItem = serde_json::from_str(
            r#"{"id":"I1","project_id":"P1","name":"Fix login","sort_order":65535.0}"#,
        )
        .unwrap();
        assert_eq!(item.priority, Priority::None);
        assert!(item.assignee_ids.is_empty());
        assert_eq!(item.parent_id, None);
        assert_eq!(item.sequence_id, 0);
    }

    #[test]
    fn test_display_id() {
        let mut item = WorkItem::new("I1", "P1", "Fix login", 65535.0);
        item.sequence_id = 42;
        assert_eq!(item.display_id("WEB"), "WEB-42");
    }
}
