use chrono::{Datelike, NaiveDate, Weekday};
use indexmap::IndexMap;

use crate::model::item::WorkItem;
use crate::model::patch::ItemPatch;
use crate::ops::drag_drop::MovePlan;
use crate::ops::MoveError;

/// True for the days a calendar hides unless weekends are shown.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Bucket items by due date for calendar rendering.
///
/// Days come out in ascending order and each day's items in display
/// order (sort key, then id). Items without a due date have no day to
/// appear on and are skipped.
pub fn group_by_target_date<'a>(
    items: impl IntoIterator<Item = &'a WorkItem>,
) -> IndexMap<NaiveDate, Vec<String>> {
    let mut scheduled: Vec<&WorkItem> = items
        .into_iter()
        .filter(|item| item.target_date.is_some())
        .collect();
    scheduled.sort_by(|a, b| {
        a.target_date
            .cmp(&b.target_date)
            .then_with(|| a.sort_order.total_cmp(&b.sort_order))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut days: IndexMap<NaiveDate, Vec<String>> = IndexMap::new();
    for item in scheduled {
        if let Some(day) = item.target_date {
            days.entry(day).or_default().push(item.id.clone());
        }
    }
    days
}

/// Plan a drag from one calendar day to another.
///
/// Dropping back on the starting day is a no-op and yields `Ok(None)`;
/// otherwise the plan rewrites the item's due date to the destination
/// day.
pub fn plan_calendar_move<'a>(
    item_id: &str,
    source_day: NaiveDate,
    destination_day: NaiveDate,
    lookup_item: impl Fn(&str) -> Option<&'a WorkItem>,
) -> Result<Option<MovePlan>, MoveError> {
    if source_day == destination_day {
        return Ok(None);
    }
    let item = lookup_item(item_id)
        .ok_or_else(|| MoveError::UnknownItem(item_id.to_string()))?;

    let patch = ItemPatch {
        target_date: Some(Some(destination_day)),
        ..ItemPatch::default()
    };
    Ok(Some(MovePlan {
        item_id: item_id.to_string(),
        project_id: item.project_id.clone(),
        patch,
    }))
}
