use log::info;

use crate::config::Args;
use crate::conversion::convert_subset;
use crate::error::{ConvertError, Result};
use crate::label_map::ClassMap;
use crate::layout::DatasetLayout;
use crate::manifest::write_manifest;
use crate::report::{log_class_counts, write_reports};
use crate::split::{load_voc_splits, read_image_index, split_dataset, SplitWeights};
use crate::types::{ClassCounts, ProcessingStats, SplitData, Subset};
use crate::utils::{create_progress_bar, exclusion_set};

/// Everything a finished conversion produced, besides the files on disk.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub class_map: ClassMap,
    pub split: SplitData,
    pub counts: ClassCounts,
    pub stats: ProcessingStats,
}

/// Decide which images go to which subset.
pub fn build_split(args: &Args, layout: &DatasetLayout, class_map: &ClassMap) -> Result<SplitData> {
    // The first class's index lists stand for the whole image set
    let first_class = class_map.names().first().ok_or_else(|| {
        ConvertError::Config("no classes left in the label map after exclusion".to_string())
    })?;

    if args.voc_splits {
        info!("Using the dataset's own {} split lists", first_class);
        return load_voc_splits(&layout.image_sets_dir(), first_class);
    }

    let index_file = args
        .index_file
        .clone()
        .unwrap_or_else(|| layout.default_index_file(first_class));
    info!("Reading image index {}", index_file.display());
    let ids = read_image_index(&index_file)?;

    let weights = SplitWeights::new(args.train_size, args.val_size, args.test_size)?;
    split_dataset(&ids, weights, args.shuffle, args.seed)
}

/// Main conversion pipeline: label map, split, per-image conversion,
/// manifest and reports. The first error aborts the run.
pub fn process_dataset(args: &Args) -> Result<ConversionSummary> {
    let exclude = exclusion_set(&args.exclude_cls);
    let label_map_path = args.label_map_path();
    let class_map = ClassMap::load(&label_map_path, &exclude)?;
    info!(
        "Loaded {} classes from {} ({} excluded)",
        class_map.len(),
        label_map_path.display(),
        exclude.len()
    );

    let layout = DatasetLayout::new(&args.source_dir, &args.target_dir, &args.image_ext);
    let split = build_split(args, &layout, &class_map)?;
    info!(
        "Split {} images: train {}, val {}, test {}",
        split.all.len(),
        split.train.len(),
        split.val.len(),
        split.test.as_ref().map_or(0, Vec::len)
    );

    let subsets: Vec<Subset> = split.subsets().iter().map(|(subset, _)| *subset).collect();
    layout.prepare_target_dirs(&subsets)?;

    let mut counts = ClassCounts::new();
    let mut stats = ProcessingStats::new();
    for (subset, ids) in split.subsets() {
        let pb = create_progress_bar(ids.len() as u64, subset.label());
        let result = convert_subset(&layout, subset, ids, &class_map, &exclude, &pb)?;
        pb.finish_with_message(format!("{} processing complete", subset.label()));

        counts.merge(subset, result.counts);
        stats.merge(&result.stats);
    }

    stats.print_summary();
    log_class_counts(&class_map, &counts);

    info!("Creating data.yaml file...");
    write_manifest(&layout, &class_map, &split)?;

    if args.no_report {
        info!("Skipping class count charts.");
    } else {
        write_reports(&layout, &class_map, &counts)?;
    }

    info!("Conversion process completed successfully.");
    Ok(ConversionSummary {
        class_map,
        split,
        counts,
        stats,
    })
}
