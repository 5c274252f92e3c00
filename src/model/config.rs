use serde::{Deserialize, Serialize};

use crate::model::group::GroupDimension;

/// Which layout a view renders its issues in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardLayout {
    #[default]
    List,
    Kanban,
    Calendar,
    Gantt,
}

/// How items are ordered inside a bucket. `SortOrder` is the manual,
/// drag-maintained ordering; the others are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    SortOrder,
    Priority,
    TargetDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarLayout {
    #[default]
    Month,
    Week,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub layout: CalendarLayout,
    /// Weekend columns are hidden when false; items dated on a weekend
    /// simply do not appear
    #[serde(default)]
    pub show_weekends: bool,
}

/// Per-view display configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub layout: BoardLayout,
    /// Primary grouping dimension; `None` renders one flat bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<GroupDimension>,
    /// Swimlane dimension, only meaningful alongside `group_by`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_group_by: Option<GroupDimension>,
    #[serde(default)]
    pub order_by: OrderBy,
    /// Drops without an explicit target land at the top of the bucket
    /// instead of the bottom
    #[serde(default)]
    pub insert_at_top: bool,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl ViewConfig {
    /// A state-grouped kanban view, the common drag-and-drop setup
    pub fn kanban() -> Self {
        ViewConfig {
            layout: BoardLayout::Kanban,
            group_by: Some(GroupDimension::State),
            ..Default::default()
        }
    }

    /// Whether drag-and-drop between buckets is permitted. Only state
    /// and priority columns accept drops; any other grouping (and any
    /// other swimlane dimension) makes the board read-only for drags.
    pub fn drag_enabled(&self) -> bool {
        let draggable =
            |dim: GroupDimension| matches!(dim, GroupDimension::State | GroupDimension::Priority);
        match self.group_by {
            Some(group) if draggable(group) => match self.sub_group_by {
                None => true,
                Some(sub) => draggable(sub),
            },
            _ => false,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<ViewConfig, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
