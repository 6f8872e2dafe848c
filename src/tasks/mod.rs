//! Startup Tasks Module
//!
//! Process-startup maintenance for the local cache.
//!
//! # Tasks
//! - Stale directory reaper: removes cache directories abandoned by dead
//!   processes, at most once per process lifetime

mod reaper;

pub(crate) use reaper::{cache_dir_prefix, reap_stale_dirs_once};
