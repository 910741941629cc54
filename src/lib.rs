//! The library code for the `blawg` static blog generator. The architecture
//! can be broken down into two distinct steps:
//!
//! 1. Loading the manifest and post bodies from disk ([`crate::post`])
//! 2. Rendering the posts into output files on disk ([`crate::build`])
//!
//! The second step is itself composed of a few sub-steps:
//!
//! 1. Clearing the output directory and copying the theme's static assets
//! 2. Parsing the theme's template fragments ([`crate::theme`])
//! 3. Converting each post into a render-ready view ([`crate::view`])
//! 4. Concatenating the rendered fragments into pages and writing them to
//!    disk ([`crate::write`])
//!
//! The [`crate::scaffold`] module holds the small helpers behind the `newblog`
//! and `newpost` commands.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod post;
pub mod scaffold;
pub mod theme;
pub mod view;
pub mod write;
