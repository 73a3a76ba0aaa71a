use std::fs::{self, File};
use std::io::{BufWriter, Write};

use crate::error::{ConvertError, Result};
use crate::label_map::ClassMap;
use crate::layout::{DatasetLayout, FileKind};
use crate::types::{SplitData, Subset};

/// Build the `data.yaml` content for YOLO training.
pub fn dataset_yaml(dataset_root: &str, class_map: &ClassMap, split: &SplitData) -> String {
    let mut yaml_content = format!("path: {}\n", dataset_root);
    for subset in Subset::ALL {
        if subset == Subset::Test && !split.has_test() {
            yaml_content.push_str("test:\n");
            continue;
        }
        yaml_content.push_str(&format!(
            "{}: {}\n",
            subset.name(),
            DatasetLayout::relative_subset_dir(subset, FileKind::Images)
        ));
    }

    yaml_content.push_str(&format!("\nnc: {}\n", class_map.len()));
    if class_map.is_empty() {
        yaml_content.push_str("names: []\n");
    } else {
        yaml_content.push_str("names:\n");
        for name in class_map.names() {
            yaml_content.push_str(&format!("  - '{}'\n", name.replace('\'', "''")));
        }
    }
    yaml_content
}

/// Write `data.yaml` at the target root.
pub fn write_manifest(
    layout: &DatasetLayout,
    class_map: &ClassMap,
    split: &SplitData,
) -> Result<()> {
    let dataset_yaml_path = layout.manifest_path();
    let absolute_path = fs::canonicalize(&layout.target_root)
        .map_err(|e| ConvertError::io(&layout.target_root, e))?;
    let yaml_content = dataset_yaml(&absolute_path.to_string_lossy(), class_map, split);

    let file =
        File::create(&dataset_yaml_path).map_err(|e| ConvertError::io(&dataset_yaml_path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(yaml_content.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| ConvertError::io(&dataset_yaml_path, e))
}
