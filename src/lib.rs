//! Board ordering, grouping, and sub-issue rollup core for
//! issue-tracker frontends.
//!
//! The crate is pure business logic: it owns no network calls, no wire
//! format, and no rendering. A UI layer feeds it gestures and server
//! responses; it answers with field patches, cache updates, and change
//! events.
//!
//! - [`model`] — work items, workflow states, grouping dimensions,
//!   field patches, and view configuration.
//! - [`ops`] — pure planners that turn drag gestures into patches:
//!   fractional sort keys, cross-group field writes, calendar and
//!   timeline moves, quick-filter search.
//! - [`store`] — the authoritative item collection plus per-parent
//!   child lists and state-group rollups, with optimistic two-phase
//!   moves, pessimistic field updates, and batched change events.

pub mod model;
pub mod ops;
pub mod store;
