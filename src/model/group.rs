use serde::{Deserialize, Serialize};

use crate::model::item::{Priority, WorkItem};
use crate::model::patch::ItemPatch;

/// Bucket id for items with no value on a single-valued dimension
/// (and for empty multi-valued attributes). Matches the API convention.
pub const NONE_GROUP_ID: &str = "None";

/// A grouping dimension a board can partition by. Each variant maps to
/// the item attribute it reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupDimension {
    State,
    Priority,
    #[serde(rename = "assignees")]
    Assignee,
    #[serde(rename = "labels")]
    Label,
    Module,
    Cycle,
    CreatedBy,
    TargetDate,
}

/// The bucket id(s) an item occupies on one dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMembership {
    /// Single-valued attribute; `None` means the item sits in the
    /// [`NONE_GROUP_ID`] bucket
    Single(Option<String>),
    /// Multi-valued attribute; the item appears in one bucket per id,
    /// or in [`NONE_GROUP_ID`] when empty
    Many(Vec<String>),
}

impl GroupMembership {
    pub fn contains(&self, group_id: &str) -> bool {
        match self {
            GroupMembership::Single(Some(id)) => id == group_id,
            GroupMembership::Single(None) => group_id == NONE_GROUP_ID,
            GroupMembership::Many(ids) if ids.is_empty() => group_id == NONE_GROUP_ID,
            GroupMembership::Many(ids) => ids.iter().any(|id| id == group_id),
        }
    }
}

impl GroupDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupDimension::State => "state",
            GroupDimension::Priority => "priority",
            GroupDimension::Assignee => "assignees",
            GroupDimension::Label => "labels",
            GroupDimension::Module => "module",
            GroupDimension::Cycle => "cycle",
            GroupDimension::CreatedBy => "created_by",
            GroupDimension::TargetDate => "target_date",
        }
    }

    /// Whether an item can occupy several buckets at once on this dimension
    pub fn is_multi_valued(self) -> bool {
        matches!(
            self,
            GroupDimension::Assignee | GroupDimension::Label | GroupDimension::Module
        )
    }

    /// Read which bucket(s) the item currently occupies
    pub fn membership(self, item: &WorkItem) -> GroupMembership {
        match self {
            GroupDimension::State => GroupMembership::Single(item.state_id.clone()),
            GroupDimension::Priority => {
                GroupMembership::Single(Some(item.priority.as_str().to_string()))
            }
            GroupDimension::Assignee => GroupMembership::Many(item.assignee_ids.clone()),
            GroupDimension::Label => GroupMembership::Many(item.label_ids.clone()),
            GroupDimension::Module => GroupMembership::Many(item.module_ids.clone()),
            GroupDimension::Cycle => GroupMembership::Single(item.cycle_id.clone()),
            GroupDimension::CreatedBy => GroupMembership::Single(item.created_by.clone()),
            GroupDimension::TargetDate => {
                GroupMembership::Single(item.target_date.map(|d| d.to_string()))
            }
        }
    }

    /// Write the attribute change for moving `item` out of
    /// `source_group_id` into `destination_group_id` on this dimension.
    ///
    /// Single-valued attributes are overwritten with the destination id
    /// ([`NONE_GROUP_ID`] clears them). Multi-valued attributes drop the
    /// source id and gain the destination id, with set semantics so an
    /// item never holds the same id twice.
    ///
    /// Returns false when the destination id is not a legal value for
    /// the dimension (e.g. an unparseable priority), leaving the patch
    /// untouched.
    #[must_use]
    pub fn write_regroup(
        self,
        item: &WorkItem,
        source_group_id: &str,
        destination_group_id: &str,
        patch: &mut ItemPatch,
    ) -> bool {
        match self {
            GroupDimension::State => {
                patch.state_id = Some(single_value(destination_group_id));
            }
            GroupDimension::Priority => {
                let Some(priority) = Priority::parse(destination_group_id) else {
                    return false;
                };
                patch.priority = Some(priority);
            }
            GroupDimension::Assignee => {
                patch.assignee_ids = Some(regrouped_ids(
                    &item.assignee_ids,
                    source_group_id,
                    destination_group_id,
                ));
            }
            GroupDimension::Label => {
                patch.label_ids = Some(regrouped_ids(
                    &item.label_ids,
                    source_group_id,
                    destination_group_id,
                ));
            }
            GroupDimension::Module => {
                patch.module_ids = Some(regrouped_ids(
                    &item.module_ids,
                    source_group_id,
                    destination_group_id,
                ));
            }
            GroupDimension::Cycle => {
                patch.cycle_id = Some(single_value(destination_group_id));
            }
            GroupDimension::CreatedBy => {
                patch.created_by = Some(single_value(destination_group_id));
            }
            GroupDimension::TargetDate => {
                if destination_group_id == NONE_GROUP_ID {
                    patch.target_date = Some(None);
                } else {
                    let Ok(date) = destination_group_id.parse() else {
                        return false;
                    };
                    patch.target_date = Some(Some(date));
                }
            }
        }
        true
    }
}

impl std::fmt::Display for GroupDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn single_value(destination_group_id: &str) -> Option<String> {
    if destination_group_id == NONE_GROUP_ID {
        None
    } else {
        Some(destination_group_id.to_string())
    }
}

/// Remove the source id, add the destination id, never duplicate
fn regrouped_ids(current: &[String], source_group_id: &str, destination_group_id: &str) -> Vec<String> {
    let mut ids: Vec<String> = current
        .iter()
        .filter(|id| id.as_str() != source_group_id)
        .cloned()
        .collect();
    if !ids.iter().any(|id| id == destination_group_id) {
        ids.push(destination_group_id.to_string());
    }
    ids
}
