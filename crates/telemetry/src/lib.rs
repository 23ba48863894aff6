//! Telemetry pipeline for the model monitoring console
//!
//! Typed backend records, the transport contract, polling, chart
//! transforms, optimistic feedback and per-view state.

pub mod api;
pub mod feedback;
pub mod poll;
pub mod schema;
pub mod series;
pub mod validate;
pub mod view;

pub use api::*;
pub use feedback::*;
pub use poll::*;
pub use schema::*;
pub use series::*;
pub use validate::*;
pub use view::*;
