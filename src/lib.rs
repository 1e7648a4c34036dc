//! Purpose: Library crate behind the `json-hydrate` CLI and its tests.
//! Exports: `api` (stable surface), `core`, `render`, `notice`.
//! Role: Parse JSON and turn ISO 8601 date-time strings into typed timestamps.
//! Invariants: Hydration is pure; no global state, no subscriber installation.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
pub(crate) mod json;
pub mod notice;
pub mod render;
