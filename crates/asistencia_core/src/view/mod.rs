//! Screen view-models.
//!
//! # Responsibility
//! - Hold the in-memory state each screen renders, mirrored from store
//!   queries (dashboard list, subject detail, attendance calendar, grade
//!   calculator).
//! - Turn store failures into user-facing notices instead of errors.
//!
//! # Invariants
//! - View methods never return store errors; failures become `Notice`s and
//!   are logged.
//! - A failed write leaves the view exactly as it was before the write.

pub mod calendar;
pub mod dashboard;
pub mod grades;
pub mod notice;
pub mod subject_detail;

/// Where a front end navigates after sign-out.
pub const LOGIN_ROUTE: &str = "/login";
