//! Task board client engine.
//!
//! Computes minimal patches from edited drafts, auto-saves editor sessions
//! with a debounce, plans drag-and-drop status changes, applies bulk edits
//! with per-task results, and classifies task history. All server traffic
//! goes through the [`api::TaskApi`] trait.

pub mod api;
pub mod config;
pub mod editor;
pub mod inspect;
pub mod outcome;
pub mod tasks;
