//! Landmark dataset construction for SignForge.
//!
//! This crate provides utilities for:
//! - Organizing raw sign media into a manifest-described layout
//! - Sampling video frames and normalizing detected hand landmarks
//! - Building and persisting the flat landmark feature table
//! - Stratified train/test splitting

pub mod extract;
pub mod normalize;
pub mod organize;
pub mod sampler;
pub mod splits;
pub mod table;
pub mod types;

pub use extract::{extract_dataset, load_manifest, LandmarkExtractor};
pub use normalize::{normalize, normalize_flat};
pub use organize::{organize_dataset, organized_name, scan_raw_dataset, RawLayout};
pub use sampler::{sample_video, SamplingPlan};
pub use splits::{
    stratified_split, test_share, SplitIndices, DEFAULT_SPLIT_SEED, DEFAULT_TEST_RATIO,
};
pub use table::{read_table, table_header, write_table, LABEL_COLUMN};
pub use types::*;
