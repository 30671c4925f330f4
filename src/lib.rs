//! Drug-drug interaction extraction: dependency-tree features, codemaps
//! and an interaction-type classifier.

pub mod cli;
pub mod config;
pub mod data;
pub mod deptree;
pub mod logging;
pub mod nlp;
