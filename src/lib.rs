//! # diagramerz
//!
//! Mermaid class and sequence diagrams from Java source code.
//!
//! ## Architecture
//!
//! - **source**: Loading of `.java` files, directories and source archives, with content-hash dedup
//! - **scan**: Recursive `.java` discovery
//! - **archive**: `.java` entries of `.zip`/`.jar` source archives
//! - **structure**: Java syntax extraction using tree-sitter AST parsing
//! - **syntax**: Raw declarations handed from the parser to the model
//! - **analysis**: Parallel parsing and ordered ingestion into one model
//! - **model**: Classes, enums, uses/extends/implements edges and call records
//! - **typename**: Type name normalization
//! - **classify**: Visibility glyphs and method categories
//! - **library**: Standard-library and framework types hidden from sequences
//! - **class_diagram**: `classDiagram` rendering
//! - **sequence**: Bounded call-graph walk and `sequenceDiagram` rendering
//! - **config**: TOML settings and their resolution
//! - **logging**: tracing subscriber setup

pub mod analysis;
pub mod archive;
pub mod class_diagram;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod model;
pub mod scan;
pub mod sequence;
pub mod source;
pub mod structure;
pub mod syntax;
pub mod typename;
