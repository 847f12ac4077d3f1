//! Research results and doctor review

mod model;
mod parse;
pub mod review;

pub use model::{ApprovalStatus, ResearchCategory, ResearchData, ReviewRow};
pub use parse::{category_label, normalize_row, parse_research_result};
pub use review::{CategoryReview, ReviewBoard, ReviewSummary};
