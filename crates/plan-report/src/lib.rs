//! Tabular views over plan allocations.
//!
//! Allocation maps become polars `DataFrame`s with one row per day; portfolio
//! summaries are computed per project in parallel and can be tabulated the
//! same way.

pub mod frames;
pub mod portfolio;

pub use frames::{allocation_frame, kind_label, load_frame, portfolio_frame};
pub use portfolio::{DailyLoad, ProjectSummary, daily_load, portfolio_summaries};
