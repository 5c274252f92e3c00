use chrono::{NaiveDate, TimeDelta};

use crate::model::item::WorkItem;
use crate::model::patch::ItemPatch;
use crate::ops::drag_drop::MovePlan;
use crate::ops::sort_order::reorder_key;
use crate::ops::MoveError;

/// A renderable bar on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct GanttBlock {
    pub id: String,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub sort_order: f64,
}

/// Which end of a block a resize handle grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockEdge {
    Start,
    Target,
}

pub fn block_for_item(item: &WorkItem) -> GanttBlock {
    GanttBlock {
        id: item.id.clone(),
        name: item.name.clone(),
        start_date: item.start_date,
        target_date: item.target_date,
        sort_order: item.sort_order,
    }
}

/// Inclusive day count of a scheduled range, for the "N days" label.
/// `None` when either end is unscheduled.
pub fn total_days_in_range(
    start_date: Option<NaiveDate>,
    target_date: Option<NaiveDate>,
) -> Option<i64> {
    let start = start_date?;
    let target = target_date?;
    Some((target - start).num_days() + 1)
}

/// Plan dragging a whole block left or right by `days`.
///
/// Both scheduled ends move together; a block with only one date moves
/// that date. Zero-day drags are a no-op. A block with no dates at all
/// has no position on the chart and cannot be dragged.
pub fn plan_block_shift<'a>(
    item_id: &str,
    days: i64,
    lookup_item: impl Fn(&str) -> Option<&'a WorkItem>,
) -> Result<Option<MovePlan>, MoveError> {
    let item = lookup_item(item_id)
        .ok_or_else(|| MoveError::UnknownItem(item_id.to_string()))?;
    if item.start_date.is_none() && item.target_date.is_none() {
        return Err(MoveError::Unscheduled(item_id.to_string()));
    }
    if days == 0 {
        return Ok(None);
    }
    let delta = TimeDelta::try_days(days).ok_or(MoveError::DateOutOfRange)?;

    let mut patch = ItemPatch::default();
    if let Some(start) = item.start_date {
        let shifted = start
            .checked_add_signed(delta)
            .ok_or(MoveError::DateOutOfRange)?;
        patch.start_date = Some(Some(shifted));
    }
    if let Some(target) = item.target_date {
        let shifted = target
            .checked_add_signed(delta)
            .ok_or(MoveError::DateOutOfRange)?;
        patch.target_date = Some(Some(shifted));
    }

    Ok(Some(MovePlan {
        item_id: item_id.to_string(),
        project_id: item.project_id.clone(),
        patch,
    }))
}

/// Plan dragging one resize handle to `new_date`.
///
/// Refuses edits that would put the start after the target; the other
/// end may be unscheduled, in which case any date is accepted.
pub fn plan_block_resize<'a>(
    item_id: &str,
    edge: BlockEdge,
    new_date: NaiveDate,
    lookup_item: impl Fn(&str) -> Option<&'a WorkItem>,
) -> Result<MovePlan, MoveError> {
    let item = lookup_item(item_id)
        .ok_or_else(|| MoveError::UnknownItem(item_id.to_string()))?;

    let mut patch = ItemPatch::default();
    match edge {
        BlockEdge::Start => {
            if let Some(target) = item.target_date {
                if new_date > target {
                    return Err(MoveError::InvalidDateRange {
                        start: new_date,
                        target,
                    });
                }
            }
            patch.start_date = Some(Some(new_date));
        }
        BlockEdge::Target => {
            if let Some(start) = item.start_date {
                if new_date < start {
                    return Err(MoveError::InvalidDateRange {
                        start,
                        target: new_date,
                    });
                }
            }
            patch.target_date = Some(Some(new_date));
        }
    }

    Ok(MovePlan {
        item_id: item_id.to_string(),
        project_id: item.project_id.clone(),
        patch,
    })
}

/// Plan reordering a block within the chart's vertical list.
///
/// The timeline is one flat bucket, so this is the plain fractional-key
/// reorder with no grouping writes.
pub fn plan_timeline_reorder<'a>(
    ordered_ids: &[String],
    moved_id: &str,
    target_item_id: Option<&str>,
    insert_at_top: bool,
    lookup_item: impl Fn(&str) -> Option<&'a WorkItem>,
) -> Result<MovePlan, MoveError> {
    let item = lookup_item(moved_id)
        .ok_or_else(|| MoveError::UnknownItem(moved_id.to_string()))?;
    let key = reorder_key(ordered_ids, moved_id, target_item_id, insert_at_top, lookup_item)?;

    Ok(MovePlan {
        item_id: moved_id.to_string(),
        project_id: item.project_id.clone(),
        patch: ItemPatch {
            sort_order: Some(key),
            ..ItemPatch::default()
        },
    })
}
