use std::ops::Range;

use indexmap::IndexMap;
use regex::Regex;

use crate::model::item::WorkItem;

/// Which field of an item matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchField {
    /// Human-readable identifier like `WEB-42`
    DisplayId,
    Name,
}

/// A quick-filter hit for one item field
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub item_id: String,
    pub field: MatchField,
    pub spans: Vec<Range<usize>>,
}

/// Build the quick-filter regex for raw user input. Empty input means
/// no filter is active.
///
/// Matching is case-insensitive. Input that fails to compile as a
/// pattern is retried as an escaped literal, so typing `(` mid-pattern
/// filters on the character instead of erroring.
pub fn build_query(input: &str) -> Option<Regex> {
    if input.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", input))
        .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(input))))
        .ok()
}

/// Collect all non-overlapping match byte-ranges for a regex in the given text.
fn find_matches(re: &Regex, text: &str) -> Vec<Range<usize>> {
    re.find_iter(text).map(|m| m.start()..m.end()).collect()
}

/// Filter items against a quick-filter query.
///
/// Each item is matched on its display id (when the project's prefix is
/// known) and its name, one hit per matched field. `prefixes` maps
/// project id to the identifier prefix used for display ids.
pub fn search_items<'a>(
    items: impl IntoIterator<Item = &'a WorkItem>,
    re: &Regex,
    prefixes: &IndexMap<String, String>,
) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for item in items {
        if let Some(prefix) = prefixes.get(&item.project_id) {
            let display_id = item.display_id(prefix);
            let spans = find_matches(re, &display_id);
            if !spans.is_empty() {
                hits.push(SearchHit {
                    item_id: item.id.clone(),
                    field: MatchField::DisplayId,
                    spans,
                });
            }
        }

        let spans = find_matches(re, &item.name);
        if !spans.is_empty() {
            hits.push(SearchHit {
                item_id: item.id.clone(),
                field: MatchField::Name,
                spans,
            });
        }
    }

    hits
}

/// Distinct ids of matching items, in input order.
pub fn matching_ids<'a>(
    items: impl IntoIterator<Item = &'a WorkItem>,
    re: &Regex,
    prefixes: &IndexMap<String, String>,
) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for hit in search_items(items, re, prefixes) {
        if ids.last().map(|id| id.as_str()) != Some(hit.item_id.as_str()) {
            ids.push(hit.item_id);
        }
    }
    ids
}
