//! Corpus ingestion and dataset construction layer.

pub mod corpus;
pub mod dataset;
