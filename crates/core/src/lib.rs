//! Core library for the Life Care Research Assistant
//!
//! This crate contains the domain model shared by the agent runner and the
//! web server:
//! - Workflow input and research prompt construction
//! - Stage events and progress tracking
//! - Research result parsing and doctor review
//! - Location auto-detect

pub mod error;
pub mod event;
pub mod input;
pub mod location;
pub mod progress;
pub mod research;
pub mod text;

pub use error::{Error, LocationError, ResultParseError};
pub use event::{StageEvent, StageEventKind};
pub use input::{ResearchRequest, WorkflowInput};
pub use progress::{ProgressSnapshot, ProgressTracker};
pub type Result<T> = std::result::Result<T, Error>;
