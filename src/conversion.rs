use indicatif::ProgressBar;
use log::debug;
use std::collections::HashSet;
use std::fs::{copy, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::geometry::to_normalized;
use crate::label_map::ClassMap;
use crate::layout::DatasetLayout;
use crate::types::{ImageAnnotation, ProcessingStats, Subset, SubsetCounts};
use crate::voc::parse_annotation_file;

/// YOLO label text for one image together with what went into it.
#[derive(Debug, Default, Clone)]
pub struct YoloLabels {
    pub text: String,
    pub counts: SubsetCounts,
    pub written: usize,
    pub excluded: usize,
}

/// Counts and statistics produced by converting one image.
#[derive(Debug, Default, Clone)]
pub struct ImageResult {
    pub counts: SubsetCounts,
    pub stats: ProcessingStats,
}

/// Convert every object of an annotation into YOLO label lines.
///
/// Objects of an excluded class are skipped. Any other class missing from
/// `class_map` is a lookup error.
pub fn convert_to_yolo_format(
    annotation: &ImageAnnotation,
    class_map: &ClassMap,
    exclude: &HashSet<String>,
    origin: &Path,
) -> Result<YoloLabels> {
    let mut labels = YoloLabels {
        text: String::with_capacity(annotation.objects.len() * 48),
        ..Default::default()
    };

    for object in &annotation.objects {
        if exclude.contains(&object.name) {
            labels.excluded += 1;
            continue;
        }
        let class_index = class_map
            .index(&object.name)
            .ok_or_else(|| ConvertError::Lookup {
                class: object.name.clone(),
                path: origin.to_path_buf(),
            })?;

        let normalized = to_normalized(class_index, object, annotation.width, annotation.height)
            .map_err(|e| ConvertError::parse(origin, e.to_string()))?;
        labels.text.push_str(&normalized.to_label_line());
        labels.counts.increment(&object.name);
        labels.written += 1;
    }

    Ok(labels)
}

/// Convert a single image of `subset`: write its label file and copy the image.
pub fn convert_image(
    layout: &DatasetLayout,
    subset: Subset,
    id: &str,
    class_map: &ClassMap,
    exclude: &HashSet<String>,
) -> Result<ImageResult> {
    let annotation_path = layout.source_annotation(id);
    let image_path = layout.source_image(id);

    let annotation = parse_annotation_file(&annotation_path)?;
    debug!(
        "{} -> {} ({} objects, file {:?})",
        annotation_path.display(),
        subset,
        annotation.objects.len(),
        annotation.filename
    );

    let labels = convert_to_yolo_format(&annotation, class_map, exclude, &annotation_path)?;

    let label_path = layout.target_label(subset, id);
    write_label_file(&label_path, &labels.text)?;

    let image_output_path = layout.target_image(subset, id);
    copy(&image_path, &image_output_path).map_err(|e| ConvertError::io(&image_path, e))?;

    let stats = ProcessingStats {
        images_converted: 1,
        objects_written: labels.written,
        objects_excluded: labels.excluded,
        empty_label_files: usize::from(labels.written == 0),
    };

    Ok(ImageResult {
        counts: labels.counts,
        stats,
    })
}

/// Convert all images of one subset in order. Stops at the first failure.
pub fn convert_subset(
    layout: &DatasetLayout,
    subset: Subset,
    ids: &[String],
    class_map: &ClassMap,
    exclude: &HashSet<String>,
    pb: &ProgressBar,
) -> Result<ImageResult> {
    let mut total = ImageResult::default();

    for id in ids {
        let result = convert_image(layout, subset, id, class_map, exclude)?;
        total.counts.merge(result.counts);
        total.stats.merge(&result.stats);
        pb.inc(1);
    }

    Ok(total)
}

fn write_label_file(path: &Path, text: &str) -> Result<()> {
    let file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| ConvertError::io(path, e))
}
