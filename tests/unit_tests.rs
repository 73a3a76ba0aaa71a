use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::path::Path;

use voc2yolo::conversion::convert_to_yolo_format;
use voc2yolo::geometry::to_normalized;
use voc2yolo::label_map::ClassMap;
use voc2yolo::manifest::dataset_yaml;
use voc2yolo::split::{split_dataset, SplitWeights};
use voc2yolo::types::{ImageAnnotation, ObjectBox, SplitData};
use voc2yolo::voc::parse_annotation_str;
use voc2yolo::ConvertError;

const LABEL_MAP: &str = "item {
  id: 1
  name: 'cat'
}
item {
  id: 2
  name: 'dog'
}
item {
  id: 3
  name: 'bird'
}
";

fn no_exclusion() -> HashSet<String> {
    HashSet::new()
}

fn exclude(names: &[&str]) -> HashSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{:06}", i)).collect()
}

fn object(name: &str, xmin: i64, ymin: i64, xmax: i64, ymax: i64) -> ObjectBox {
    ObjectBox {
        name: name.to_string(),
        xmin,
        ymin,
        xmax,
        ymax,
    }
}

#[test]
fn test_label_map_keeps_file_order_and_ids() {
    let class_map = ClassMap::parse(LABEL_MAP, &no_exclusion(), Path::new("map.pbtxt")).unwrap();

    assert_eq!(class_map.names(), ["cat", "dog", "bird"]);
    assert_eq!(class_map.id("cat"), Some(1));
    assert_eq!(class_map.index("bird"), Some(2));
    assert_eq!(class_map.len(), 3);
}

#[test]
fn test_label_map_exclusion_keeps_declared_ids() {
    let class_map = ClassMap::parse(LABEL_MAP, &exclude(&["dog"]), Path::new("map.pbtxt")).unwrap();

    assert_eq!(class_map.names(), ["cat", "bird"]);
    assert!(!class_map.contains("dog"));
    assert_eq!(class_map.index("bird"), Some(2));
}

#[test]
fn test_label_map_name_without_id() {
    let text = "item {\n  name: 'person'\n}\n";
    let err = ClassMap::parse(text, &no_exclusion(), Path::new("map.pbtxt")).unwrap_err();
    assert!(matches!(err, ConvertError::Parse { .. }));
}

#[test]
fn test_label_map_entry_without_name() {
    let text = "item {\n  id: 1\n}\nitem {\n  id: 2\n  name: 'dog'\n}\n";
    let err = ClassMap::parse(text, &no_exclusion(), Path::new("map.pbtxt")).unwrap_err();
    assert!(matches!(err, ConvertError::Parse { .. }));
    assert!(err.to_string().contains("line 3"), "{}", err);
}

#[test]
fn test_label_map_trailing_id_without_name() {
    let text = "item {\n  id: 1\n  name: 'cat'\n}\nitem {\n  id: 2\n";
    let err = ClassMap::parse(text, &no_exclusion(), Path::new("map.pbtxt")).unwrap_err();
    assert!(matches!(err, ConvertError::Parse { .. }));
    assert!(err.to_string().contains("id 2"), "{}", err);
}

#[test]
fn test_label_map_ignores_display_name() {
    let text = "item {\n  id: 1\n  display_name: 'Person'\n  name: 'person'\n}\n";
    let class_map = ClassMap::parse(text, &no_exclusion(), Path::new("map.pbtxt")).unwrap();
    assert_eq!(class_map.names(), ["person"]);
}

#[test]
fn test_label_map_rejects_non_integer_id() {
    let text = "item {\n  id: one\n  name: 'cat'\n}\n";
    let err = ClassMap::parse(text, &no_exclusion(), Path::new("map.pbtxt")).unwrap_err();
    assert!(matches!(err, ConvertError::Parse { .. }));
    assert!(err.to_string().contains("map.pbtxt"));
}

#[test]
fn test_label_map_without_names_is_an_error() {
    let err = ClassMap::parse("item {\n}\n", &no_exclusion(), Path::new("map.pbtxt")).unwrap_err();
    assert!(matches!(err, ConvertError::Parse { .. }));
}

#[test]
fn test_parse_voc_annotation() {
    let xml = r#"<annotation>
    <folder>VOC2007</folder>
    <filename>000005.jpg</filename>
    <source>
        <database>The VOC2007 Database</database>
    </source>
    <size>
        <width>500</width>
        <height>375</height>
        <depth>3</depth>
    </size>
    <segmented>0</segmented>
    <object>
        <name>cat</name>
        <pose>Left</pose>
        <truncated>0</truncated>
        <difficult>0</difficult>
        <bndbox>
            <xmin>263</xmin>
            <ymin>211</ymin>
            <xmax>324</xmax>
            <ymax>339</ymax>
        </bndbox>
    </object>
    <object>
        <name>dog</name>
        <pose>Unspecified</pose>
        <truncated>1</truncated>
        <difficult>0</difficult>
        <bndbox>
            <xmin>165.7</xmin>
            <ymin>264.2</ymin>
            <xmax>253.9</xmax>
            <ymax>372.5</ymax>
        </bndbox>
    </object>
</annotation>"#;

    let annotation = parse_annotation_str(xml, Path::new("000005.xml")).unwrap();

    assert_eq!(annotation.filename.as_deref(), Some("000005.jpg"));
    assert_eq!(annotation.width, 500);
    assert_eq!(annotation.height, 375);
    assert_eq!(
        annotation.objects,
        vec![
            object("cat", 263, 211, 324, 339),
            object("dog", 165, 264, 253, 372),
        ]
    );
}

#[test]
fn test_parse_voc_annotation_without_objects() {
    let xml = "<annotation><size><width>64</width><height>48</height></size></annotation>";
    let annotation = parse_annotation_str(xml, Path::new("empty.xml")).unwrap();
    assert_eq!(annotation.width, 64);
    assert!(annotation.objects.is_empty());
}

#[test]
fn test_parse_voc_annotation_missing_size() {
    let xml = "<annotation><object><name>cat</name>\
        <bndbox><xmin>1</xmin><ymin>1</ymin><xmax>2</xmax><ymax>2</ymax></bndbox>\
        </object></annotation>";
    let err = parse_annotation_str(xml, Path::new("broken.xml")).unwrap_err();
    assert!(matches!(err, ConvertError::Parse { .. }));
    assert!(err.to_string().contains("broken.xml"));
}

#[test]
fn test_parse_voc_annotation_missing_corner() {
    let xml = "<annotation><size><width>10</width><height>10</height></size>\
        <object><name>cat</name><bndbox><xmin>1</xmin><ymin>1</ymin><xmax>2</xmax></bndbox></object>\
        </annotation>";
    assert!(parse_annotation_str(xml, Path::new("broken.xml")).is_err());
}

#[test]
fn test_parse_voc_annotation_objects_must_be_adjacent() {
    let object = "<object><name>cat</name>\
        <bndbox><xmin>1</xmin><ymin>1</ymin><xmax>2</xmax><ymax>2</ymax></bndbox></object>";

    let adjacent = format!(
        "<annotation><size><width>10</width><height>10</height></size>{0}{0}</annotation>",
        object
    );
    let annotation = parse_annotation_str(&adjacent, Path::new("adjacent.xml")).unwrap();
    assert_eq!(annotation.objects.len(), 2);

    let split = format!(
        "<annotation>{0}<size><width>10</width><height>10</height></size>{0}</annotation>",
        object
    );
    let err = parse_annotation_str(&split, Path::new("split.xml")).unwrap_err();
    assert!(matches!(err, ConvertError::Parse { .. }));
    assert!(err.to_string().contains("split.xml"));
}

#[test]
fn test_transform_scenario() {
    let normalized = to_normalized(0, &object("cat", 10, 20, 30, 40), 100, 200).unwrap();
    assert_eq!(
        normalized.to_label_line(),
        "0 0.200000 0.150000 0.200000 0.100000\n"
    );
}

#[test]
fn test_transform_rejects_zero_dimension() {
    let err = to_normalized(0, &object("cat", 0, 0, 1, 1), 0, 10).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::ZeroDimension {
            width: 0,
            height: 10
        }
    ));
}

#[test]
fn test_transform_stays_normalized_and_inverts() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let width: u32 = rng.gen_range(2..4000);
        let height: u32 = rng.gen_range(2..4000);
        let xmin = rng.gen_range(0..width - 1) as i64;
        let xmax = rng.gen_range(xmin + 1..=width as i64);
        let ymin = rng.gen_range(0..height - 1) as i64;
        let ymax = rng.gen_range(ymin + 1..=height as i64);

        let normalized = to_normalized(3, &object("cat", xmin, ymin, xmax, ymax), width, height).unwrap();
        for value in [normalized.cx, normalized.cy, normalized.w, normalized.h] {
            assert!((0.0..=1.0).contains(&value), "{} out of range", value);
        }

        let (x0, y0, x1, y1) = normalized.to_corners(width, height);
        assert!((x0 - xmin as f64).abs() < 1e-6);
        assert!((y0 - ymin as f64).abs() < 1e-6);
        assert!((x1 - xmax as f64).abs() < 1e-6);
        assert!((y1 - ymax as f64).abs() < 1e-6);
    }
}

#[test]
fn test_convert_to_yolo_format_skips_excluded_and_uses_ids() {
    let class_map = ClassMap::parse(LABEL_MAP, &exclude(&["dog"]), Path::new("map.pbtxt")).unwrap();
    let annotation = ImageAnnotation {
        filename: None,
        width: 100,
        height: 200,
        objects: vec![
            object("cat", 10, 20, 30, 40),
            object("dog", 0, 0, 50, 50),
            object("bird", 0, 0, 100, 200),
        ],
    };

    let labels = convert_to_yolo_format(
        &annotation,
        &class_map,
        &exclude(&["dog"]),
        Path::new("a.xml"),
    )
    .unwrap();

    assert_eq!(
        labels.text,
        "0 0.200000 0.150000 0.200000 0.100000\n2 0.500000 0.500000 1.000000 1.000000\n"
    );
    assert_eq!(labels.written, 2);
    assert_eq!(labels.excluded, 1);
    assert_eq!(labels.counts.get("cat"), 1);
    assert_eq!(labels.counts.get("dog"), 0);
    assert_eq!(labels.counts.get("bird"), 1);
}

#[test]
fn test_convert_to_yolo_format_unknown_class() {
    let class_map = ClassMap::parse(LABEL_MAP, &no_exclusion(), Path::new("map.pbtxt")).unwrap();
    let annotation = ImageAnnotation {
        filename: None,
        width: 10,
        height: 10,
        objects: vec![object("horse", 1, 1, 5, 5)],
    };

    let err = convert_to_yolo_format(&annotation, &class_map, &no_exclusion(), Path::new("h.xml"))
        .unwrap_err();
    match err {
        ConvertError::Lookup { class, path } => {
            assert_eq!(class, "horse");
            assert_eq!(path, Path::new("h.xml"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_split_without_shuffle_keeps_blocks() {
    let ids = ids(10);
    let weights = SplitWeights::new(7.0, 2.0, 1.0).unwrap();

    let split = split_dataset(&ids, weights, false, 0).unwrap();

    assert_eq!(split.train, ids[..7]);
    assert_eq!(split.val, ids[7..9]);
    assert_eq!(split.test.as_deref(), Some(&ids[9..]));
    assert_eq!(split.all, ids);
}

#[test]
fn test_split_without_test_subset() {
    let ids = ids(10);
    let weights = SplitWeights::new(0.8, 0.2, 0.0).unwrap();

    let split = split_dataset(&ids, weights, false, 0).unwrap();

    assert_eq!(split.train.len(), 8);
    assert_eq!(split.val, ids[8..]);
    assert!(split.test.is_none());
    assert!(!split.has_test());
}

fn assert_partition(split: &SplitData, ids: &[String]) {
    let mut seen = HashSet::new();
    let members = split
        .train
        .iter()
        .chain(split.val.iter())
        .chain(split.test.iter().flatten());
    for id in members {
        assert!(seen.insert(id.clone()), "{} assigned twice", id);
    }
    assert_eq!(seen.len(), ids.len());
    assert!(ids.iter().all(|id| seen.contains(id)));
}

#[test]
fn test_split_with_shuffle_is_reproducible() {
    let ids = ids(57);
    let weights = SplitWeights::new(7.0, 2.0, 1.0).unwrap();

    let first = split_dataset(&ids, weights, true, 1234).unwrap();
    let second = split_dataset(&ids, weights, true, 1234).unwrap();

    assert_eq!(first, second);
    assert_partition(&first, &ids);

    // Subsets keep index order
    let position = |id: &String| ids.iter().position(|x| x == id).unwrap();
    for subset in [&first.train, &first.val] {
        let positions: Vec<usize> = subset.iter().map(position).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_split_sizes_follow_weights() {
    for (train, val, test) in [(7.0, 2.0, 1.0), (1.0, 1.0, 8.0), (49.0, 3.0, 48.0), (0.8, 0.2, 0.0)] {
        let weights = SplitWeights::new(train, val, test).unwrap();
        let total = train + val + test;
        for n in 1..200 {
            let ids = ids(n);
            for shuffle in [false, true] {
                let split = split_dataset(&ids, weights, shuffle, 42).unwrap();
                assert_partition(&split, &ids);

                let test_len = split.test.as_ref().map_or(0, Vec::len) as f64;
                let n = n as f64;
                let sizes = [
                    (split.train.len() as f64, train),
                    (split.val.len() as f64, val),
                    (test_len, test),
                ];
                for (len, weight) in sizes {
                    let ideal = n * weight / total;
                    assert!(
                        (len - ideal).abs() <= 1.0,
                        "{}/{}/{} over {} ids: got {}, ideal {}",
                        train, val, test, n, len, ideal
                    );
                }
            }
        }
    }
}

#[test]
fn test_split_skewed_weights() {
    // 1/1/8 over 28 ids: ideal 2.8/2.8/22.4
    let ids = ids(28);
    let weights = SplitWeights::new(1.0, 1.0, 8.0).unwrap();

    let split = split_dataset(&ids, weights, false, 0).unwrap();

    assert_eq!(split.train, ids[..3]);
    assert_eq!(split.val, ids[3..6]);
    assert_eq!(split.test.as_deref(), Some(&ids[6..]));
}

#[test]
fn test_split_rejects_bad_input() {
    assert!(matches!(
        SplitWeights::new(0.0, 0.0, 0.0),
        Err(ConvertError::Config(_))
    ));
    assert!(matches!(
        SplitWeights::new(-1.0, 1.0, 1.0),
        Err(ConvertError::Config(_))
    ));

    let weights = SplitWeights::new(7.0, 2.0, 1.0).unwrap();
    assert!(matches!(
        split_dataset(&[], weights, false, 0),
        Err(ConvertError::Config(_))
    ));
}

#[test]
fn test_dataset_yaml() {
    let class_map = ClassMap::parse(LABEL_MAP, &exclude(&["dog"]), Path::new("map.pbtxt")).unwrap();
    let split = split_dataset(&ids(10), SplitWeights::new(7.0, 2.0, 1.0).unwrap(), false, 0).unwrap();

    let yaml = dataset_yaml("/data/yolo", &class_map, &split);

    assert_eq!(
        yaml,
        "path: /data/yolo\n\
         train: train/images\n\
         val: val/images\n\
         test: test/images\n\
         all: all/images\n\
         \n\
         nc: 2\n\
         names:\n  - 'cat'\n  - 'bird'\n"
    );
}

#[test]
fn test_dataset_yaml_without_test() {
    let class_map = ClassMap::parse("id: 1\nname: 'cat'\n", &no_exclusion(), Path::new("m")).unwrap();
    let split = split_dataset(&ids(4), SplitWeights::new(3.0, 1.0, 0.0).unwrap(), false, 0).unwrap();

    let yaml = dataset_yaml("/d", &class_map, &split);

    assert!(yaml.contains("test:\n"));
    assert!(!yaml.contains("test/images"));
    assert!(yaml.contains("nc: 1\n"));
}
