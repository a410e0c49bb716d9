pub mod action;
pub mod aliases;
pub mod filter;
pub mod request;
pub mod stats;
pub mod types;

pub use action::{ActionForm, ActionKind, ValidatedAction};
pub use aliases::{Field, FieldKey};
pub use filter::{ListQuery, MeetingFilter, SortSpec};
pub use request::{NewMeetingRequest, new_request_id};
pub use stats::Statistics;
pub use types::*;
