//! # pf-jar
//!
//! Finds compiled classes that implement PingFederate plugin interfaces and
//! writes the `PF-INF` descriptor files that tell the server which classes to
//! load from a plugin jar.
//!
//! ## Architecture
//!
//! - **classfile**: Minimal class-file decoder (class name + direct interfaces)
//! - **registry**: Plugin categories and their marker interfaces
//! - **classify**: Direct-interface matching and parallel per-category accumulation
//! - **scan**: Classpath resolution into `.class` files
//! - **writer**: `PF-INF` descriptor output
//! - **pipeline**: End-to-end scan producing a `ScanReport`
//! - **report**: Scan results and diagnostics
//! - **error**: Typed decode and scan errors

pub mod classfile;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod scan;
pub mod writer;
