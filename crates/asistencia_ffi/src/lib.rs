//! Flutter-facing bridge over `asistencia_core`.

pub mod api;
