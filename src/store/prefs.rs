use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Per-board display toggles: collapsed group columns, hidden swimlane
/// rows, and which items have their sub-issue accordion open.
///
/// These are view preferences, not data; they survive re-fetches and
/// can be persisted alongside the view configuration. The drag flag is
/// transient and never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardPrefs {
    pub collapsed_group_headers: IndexSet<String>,
    pub hidden_sub_group_rows: IndexSet<String>,
    pub expanded_sub_issues: IndexSet<String>,
    #[serde(skip)]
    pub dragging: bool,
}

fn toggle(set: &mut IndexSet<String>, id: &str) -> bool {
    if set.shift_remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}

impl BoardPrefs {
    pub fn new() -> Self {
        BoardPrefs::default()
    }

    /// Collapse or expand a group column. Returns true when the group
    /// is now collapsed.
    pub fn toggle_group_header(&mut self, group_id: &str) -> bool {
        toggle(&mut self.collapsed_group_headers, group_id)
    }

    pub fn is_group_collapsed(&self, group_id: &str) -> bool {
        self.collapsed_group_headers.contains(group_id)
    }

    /// Hide or show a swimlane row. Returns true when the row is now
    /// hidden.
    pub fn toggle_sub_group_row(&mut self, sub_group_id: &str) -> bool {
        toggle(&mut self.hidden_sub_group_rows, sub_group_id)
    }

    pub fn is_sub_group_hidden(&self, sub_group_id: &str) -> bool {
        self.hidden_sub_group_rows.contains(sub_group_id)
    }

    /// Open or close an item's sub-issue accordion. Returns true when
    /// the accordion is now open.
    pub fn toggle_sub_issues(&mut self, item_id: &str) -> bool {
        toggle(&mut self.expanded_sub_issues, item_id)
    }

    pub fn sub_issues_expanded(&self, item_id: &str) -> bool {
        self.expanded_sub_issues.contains(item_id)
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_round_trip() {
        let mut prefs = BoardPrefs::new();
        assert!(prefs.toggle_group_header("S1"));
        assert!(prefs.is_group_collapsed("S1"));
        assert!(!prefs.toggle_group_header("S1"));
        assert!(!prefs.is_group_collapsed("S1"));
    }

    #[test]
    fn sets_are_independent() {
        let mut prefs = BoardPrefs::new();
        prefs.toggle_group_header("urgent");
        prefs.toggle_sub_group_row("urgent");
        prefs.toggle_group_header("urgent");

        assert!(!prefs.is_group_collapsed("urgent"));
        assert!(prefs.is_sub_group_hidden("urgent"));
    }

    #[test]
    fn accordion_tracks_items() {
        let mut prefs = BoardPrefs::new();
        assert!(!prefs.sub_issues_expanded("I1"));
        prefs.toggle_sub_issues("I1");
        prefs.toggle_sub_issues("I2");
        assert!(prefs.sub_issues_expanded("I1"));
        assert!(prefs.sub_issues_expanded("I2"));
    }

    #[test]
    fn dragging_is_not_persisted() {
        let mut prefs = BoardPrefs::new();
        prefs.toggle_group_header("S1");
        prefs.set_dragging(true);

        let serialized = toml::to_string(&prefs).unwrap();
        assert!(!serialized.contains("dragging"));

        let restored: BoardPrefs = toml::from_str(&serialized).unwrap();
        assert!(restored.is_group_collapsed("S1"));
        assert!(!restored.dragging);
    }
}
