//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep view/FFI layers decoupled from storage details.

pub mod attendance_service;
pub mod grade_service;
pub mod subject_service;
