//! Search-driven option selection.
//!
//! [`SelectorState`] is the pure record: query, generation counter, accepted
//! options, selection. [`AsyncSearchSelector`] drives it on tokio with a
//! debounce timer and a [`SearchService`](onboard_types::SearchService).
//!
//! Only the result of the most recently dispatched query is ever accepted.
//! Earlier requests are not cancelled once dispatched; their answers are
//! compared against the generation counter and dropped.

pub mod async_selector;
pub mod catalog;
pub mod policy;
pub mod selector;

pub use async_selector::AsyncSearchSelector;
pub use catalog::StaticCatalog;
pub use policy::SearchPolicy;
pub use selector::{Dispatch, Resolution, SelectorState, SelectorView};
