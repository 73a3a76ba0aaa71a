use std::collections::{BTreeMap, HashMap};
use std::fmt;

// One object of a VOC annotation, with the box in absolute pixel corners
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectBox {
    pub name: String,
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
}

// The parts of a VOC annotation file the conversion needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAnnotation {
    pub filename: Option<String>,
    pub width: u32,
    pub height: u32,
    pub objects: Vec<ObjectBox>,
}

/// Named partition of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subset {
    Train,
    Val,
    Test,
    All,
}

impl Subset {
    pub const ALL: [Subset; 4] = [Subset::Train, Subset::Val, Subset::Test, Subset::All];

    pub fn name(self) -> &'static str {
        match self {
            Subset::Train => "train",
            Subset::Val => "val",
            Subset::Test => "test",
            Subset::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subset::Train => "Train",
            Subset::Val => "Val",
            Subset::Test => "Test",
            Subset::All => "All",
        }
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Image ids per subset. Every list keeps the order of the image index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitData {
    pub train: Vec<String>,
    pub val: Vec<String>,
    pub test: Option<Vec<String>>,
    pub all: Vec<String>,
}

impl SplitData {
    /// Subsets present in this split, in processing order.
    pub fn subsets(&self) -> Vec<(Subset, &[String])> {
        let mut subsets = vec![
            (Subset::Train, self.train.as_slice()),
            (Subset::Val, self.val.as_slice()),
        ];
        if let Some(test) = &self.test {
            subsets.push((Subset::Test, test.as_slice()));
        }
        subsets.push((Subset::All, self.all.as_slice()));
        subsets
    }

    pub fn has_test(&self) -> bool {
        self.test.is_some()
    }
}

/// Instance counts per class name for one subset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubsetCounts {
    counts: HashMap<String, usize>,
}

impl SubsetCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, class: &str) {
        *self.counts.entry(class.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, class: &str) -> usize {
        self.counts.get(class).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn merge(&mut self, other: SubsetCounts) {
        for (class, count) in other.counts {
            *self.counts.entry(class).or_insert(0) += count;
        }
    }
}

/// Instance counts for every processed subset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClassCounts {
    subsets: BTreeMap<Subset, SubsetCounts>,
}

impl ClassCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, subset: Subset, counts: SubsetCounts) {
        self.subsets.entry(subset).or_default().merge(counts);
    }

    pub fn subset(&self, subset: Subset) -> Option<&SubsetCounts> {
        self.subsets.get(&subset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subset, &SubsetCounts)> {
        self.subsets.iter().map(|(subset, counts)| (*subset, counts))
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub images_converted: usize,
    pub objects_written: usize,
    pub objects_excluded: usize,
    pub empty_label_files: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: &ProcessingStats) {
        self.images_converted += other.images_converted;
        self.objects_written += other.objects_written;
        self.objects_excluded += other.objects_excluded;
        self.empty_label_files += other.empty_label_files;
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Images converted: {}", self.images_converted);
        log::info!("Objects written: {}", self.objects_written);
        log::info!("Objects skipped (excluded class): {}", self.objects_excluded);
        if self.empty_label_files > 0 {
            log::warn!(
                "Label files without any object: {}",
                self.empty_label_files
            );
        }
    }
}
