//! UI components module.

pub mod details;
pub mod search;
pub mod spinner;

pub use details::{render_details, DetailsState};
pub use search::{render_dropdown, render_search_box, SearchState};
