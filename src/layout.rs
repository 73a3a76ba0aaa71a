//! Mapping between image ids and the files of the source and target datasets.
//!
//! Source (PASCAL VOC):
//!
//! ```text
//! <source>/Annotations/<id>.xml
//! <source>/JPEGImages/<id>.<ext>
//! <source>/ImageSets/Main/<class>_<split>.txt
//! ```
//!
//! Target (YOLO):
//!
//! ```text
//! <target>/<subset>/images/<id>.<ext>
//! <target>/<subset>/labels/<id>.txt
//! <target>/data.yaml
//! <target>/<subset>_class_counts.png
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::Subset;

/// Which half of a YOLO subset directory a file lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Images,
    Labels,
}

impl FileKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            FileKind::Images => "images",
            FileKind::Labels => "labels",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatasetLayout {
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    pub image_ext: String,
}

impl DatasetLayout {
    pub fn new(source_root: &Path, target_root: &Path, image_ext: &str) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            target_root: target_root.to_path_buf(),
            image_ext: image_ext.trim_start_matches('.').to_string(),
        }
    }

    pub fn image_sets_dir(&self) -> PathBuf {
        self.source_root.join("ImageSets").join("Main")
    }

    /// The index file that defines the image universe when none is given.
    pub fn default_index_file(&self, first_class: &str) -> PathBuf {
        self.image_sets_dir()
            .join(format!("{}_trainval.txt", first_class))
    }

    pub fn source_image(&self, id: &str) -> PathBuf {
        self.source_root
            .join("JPEGImages")
            .join(format!("{}.{}", id, self.image_ext))
    }

    pub fn source_annotation(&self, id: &str) -> PathBuf {
        self.source_root
            .join("Annotations")
            .join(format!("{}.xml", id))
    }

    /// Directory relative to the target root, e.g. `train/images`.
    pub fn relative_subset_dir(subset: Subset, kind: FileKind) -> String {
        format!("{}/{}", subset.name(), kind.dir_name())
    }

    pub fn subset_dir(&self, subset: Subset, kind: FileKind) -> PathBuf {
        self.target_root.join(subset.name()).join(kind.dir_name())
    }

    pub fn target_image(&self, subset: Subset, id: &str) -> PathBuf {
        self.subset_dir(subset, FileKind::Images)
            .join(format!("{}.{}", id, self.image_ext))
    }

    pub fn target_label(&self, subset: Subset, id: &str) -> PathBuf {
        self.subset_dir(subset, FileKind::Labels)
            .join(format!("{}.txt", id))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.target_root.join("data.yaml")
    }

    pub fn report_path(&self, subset: Subset) -> PathBuf {
        self.target_root
            .join(format!("{}_class_counts.png", subset.name()))
    }

    /// Create the images/labels directories of every given subset.
    pub fn prepare_target_dirs(&self, subsets: &[Subset]) -> Result<()> {
        if self.target_root.exists() {
            log::warn!(
                "Target directory {:?} already exists. Existing files may be overwritten.",
                self.target_root
            );
        }
        for &subset in subsets {
            for kind in [FileKind::Images, FileKind::Labels] {
                let dir = self.subset_dir(subset, kind);
                fs::create_dir_all(&dir).map_err(|e| ConvertError::io(&dir, e))?;
            }
        }
        Ok(())
    }
}
