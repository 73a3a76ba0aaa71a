//! PASCAL VOC to YOLO format converter
//!
//! This library converts VOC XML annotations into YOLO label files, splits the
//! dataset into train/val/test subsets and writes a `data.yaml` manifest with
//! per-subset class count charts.

pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod label_map;
pub mod layout;
pub mod manifest;
pub mod report;
pub mod split;
pub mod types;
pub mod utils;
pub mod voc;

// Re-export commonly used types and functions
pub use config::Args;
pub use dataset::{process_dataset, ConversionSummary};
pub use error::{ConvertError, Result};
pub use label_map::ClassMap;
pub use layout::DatasetLayout;
pub use types::{ClassCounts, ImageAnnotation, ObjectBox, SplitData, Subset, SubsetCounts};
