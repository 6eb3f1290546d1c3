//! Output sinks for pipeline results.
//!
//! # Submodules
//!
//! - [`markdown`]: sidebar-style Markdown (place title, one card per article)
//! - [`json`]: JSON reports, printed or written under a dated directory

pub mod json;
pub mod markdown;
