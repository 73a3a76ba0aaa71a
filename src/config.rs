use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::str::FromStr;

/// Command-line arguments for converting a PASCAL VOC dataset to YOLO format.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Root of the VOC dataset (contains Annotations/, JPEGImages/, ImageSets/)
    #[arg(short = 's', long = "source_dir")]
    pub source_dir: PathBuf,

    /// Directory the YOLO dataset is written to
    #[arg(short = 't', long = "target_dir")]
    pub target_dir: PathBuf,

    /// Label map file; defaults to <source_dir>/pascal_label_map.pbtxt
    #[arg(long = "label_map")]
    pub label_map: Option<PathBuf>,

    /// Image index file listing every image id; defaults to
    /// <source_dir>/ImageSets/Main/<first class>_trainval.txt
    #[arg(long = "index_file")]
    pub index_file: Option<PathBuf>,

    /// Relative weight of the training subset
    #[arg(long = "train_size", default_value_t = 7.0, value_parser = validate_weight)]
    pub train_size: f64,

    /// Relative weight of the validation subset
    #[arg(long = "val_size", default_value_t = 2.0, value_parser = validate_weight)]
    pub val_size: f64,

    /// Relative weight of the test subset; 0 disables the test subset
    #[arg(long = "test_size", default_value_t = 1.0, value_parser = validate_weight)]
    pub test_size: f64,

    /// Shuffle images before splitting
    #[arg(long = "shuffle")]
    pub shuffle: bool,

    /// Seed for random shuffling
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// Classes to drop from the label map and from every label file. Remaining
    /// classes keep their label map ids, so class indices are not renumbered
    #[arg(long = "exclude_cls", value_delimiter = ',')]
    pub exclude_cls: Vec<String>,

    /// Extension of the source images
    #[arg(long = "image_ext", default_value = "jpg")]
    pub image_ext: String,

    /// Use the dataset's own <class>_train/_val/_test lists instead of splitting
    #[arg(long = "voc_splits")]
    pub voc_splits: bool,

    /// Skip rendering the per-subset class count charts
    #[arg(long = "no_report")]
    pub no_report: bool,
}

impl Args {
    pub fn label_map_path(&self) -> PathBuf {
        self.label_map
            .clone()
            .unwrap_or_else(|| self.source_dir.join("pascal_label_map.pbtxt"))
    }
}

// Split weights are relative, so any finite non-negative number is accepted
fn validate_weight(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if val.is_finite() && val >= 0.0 => Ok(val),
        _ => Err("SIZE must be a non-negative number".to_string()),
    }
}
