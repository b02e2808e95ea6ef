//! Sidebar trees for docsite.
//!
//! This crate provides:
//! - [`SidebarNode`]: the recursive document/category node model
//! - [`SidebarSet`]: resolution of named trees against a validated
//!   [`docsite_config::SiteConfig`]
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use docsite_config::SiteConfig;
//! use docsite_sidebar::SidebarSet;
//!
//! let config = SiteConfig::load(None)?;
//! let sidebars = SidebarSet::load(Path::new("sidebars.yaml"), &config)?;
//!
//! // Navigation order for one tree (pre-order, as declared)
//! for node in sidebars.walk("mySidebar").into_iter().flatten() {
//!     println!("{:?}", node.doc_id());
//! }
//! # Ok(())
//! # }
//! ```

mod node;
mod resolver;

pub use node::{SidebarNode, Walk};
pub use resolver::{RawSidebars, SidebarError, SidebarSet};
