use chrono::NaiveDate;
use serde::Serialize;

use crate::model::item::{Priority, WorkItem};

/// A partial update to a [`WorkItem`]. `None` means "leave unchanged";
/// for clearable attributes the inner option distinguishes "set to a
/// value" from "clear" (`Some(None)` serializes as an explicit `null`,
/// which is how the API unsets a field).
///
/// Only changed fields appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<Option<NaiveDate>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == ItemPatch::default()
    }

    /// Write the changed fields onto the item
    pub fn apply_to(&self, item: &mut WorkItem) {
        if let Some(sort_order) = self.sort_order {
            item.sort_order = sort_order;
        }
        if let Some(state_id) = &self.state_id {
            item.state_id = state_id.clone();
        }
        if let Some(priority) = self.priority {
            item.priority = priority;
        }
        if let Some(assignee_ids) = &self.assignee_ids {
            item.assignee_ids = assignee_ids.clone();
        }
        if let Some(label_ids) = &self.label_ids {
            item.label_ids = label_ids.clone();
        }
        if let Some(module_ids) = &self.module_ids {
            item.module_ids = module_ids.clone();
        }
        if let Some(cycle_id) = &self.cycle_id {
            item.cycle_id = cycle_id.clone();
        }
        if let Some(created_by) = &self.created_by {
            item.created_by = created_by.clone();
        }
        if let Some(parent_id) = &self.parent_id {
            item.parent_id = parent_id.clone();
        }
        if let Some(start_date) = self.start_date {
            item.start_date = start_date;
        }
        if let Some(target_date) = self.target_date {
            item.target_date = target_date;
        }
    }

    /// Serialize for the update endpoint. Untouched fields are absent;
    /// cleared fields come out as explicit `null`, so "set to nothing"
    /// survives the wire.
    pub fn to_wire_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Capture the pre-image of exactly the fields this patch touches.
    /// Applying the result to the patched item restores it.
    pub fn inverse_of(&self, item: &WorkItem) -> ItemPatch {
        ItemPatch {
            sort_order: self.sort_order.map(|_| item.sort_order),
            state_id: self.state_id.as_ref().map(|_| item.state_id.clone()),
            priority: self.priority.map(|_| item.priority),
            assignee_ids: self.assignee_ids.as_ref().map(|_| item.assignee_ids.clone()),
            label_ids: self.label_ids.as_ref().map(|_| item.label_ids.clone()),
            module_ids: self.module_ids.as_ref().map(|_| item.module_ids.clone()),
            cycle_id: self.cycle_id.as_ref().map(|_| item.cycle_id.clone()),
            created_by: self.created_by.as_ref().map(|_| item.created_by.clone()),
            parent_id: self.parent_id.as_ref().map(|_| item.parent_id.clone()),
            start_date: self.start_date.map(|_| item.start_date),
            target_date: self.target_date.map(|_| item.target_date),
        }
    }
}
