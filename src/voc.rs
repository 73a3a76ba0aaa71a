use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::types::{ImageAnnotation, ObjectBox};

// Raw layout of a PASCAL VOC annotation. Elements that are not listed here
// (folder, source, segmented, pose, truncated, difficult, part, ...) are ignored.
// All <object> elements must be adjacent; serde-xml-rs rejects a repeated
// field that is split by another element.
#[derive(Debug, Deserialize)]
struct VocAnnotation {
    #[serde(default)]
    filename: Option<String>,
    size: VocSize,
    #[serde(default)]
    object: Vec<VocObject>,
}

#[derive(Debug, Deserialize)]
struct VocSize {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct VocObject {
    name: String,
    bndbox: VocBndBox,
}

// Some tools write fractional corners, so they are read as floats
#[derive(Debug, Deserialize)]
struct VocBndBox {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl From<VocObject> for ObjectBox {
    fn from(object: VocObject) -> Self {
        let VocBndBox {
            xmin,
            ymin,
            xmax,
            ymax,
        } = object.bndbox;
        ObjectBox {
            name: object.name.trim().to_string(),
            xmin: xmin.trunc() as i64,
            ymin: ymin.trunc() as i64,
            xmax: xmax.trunc() as i64,
            ymax: ymax.trunc() as i64,
        }
    }
}

/// Read and parse one VOC XML annotation file.
pub fn parse_annotation_file(path: &Path) -> Result<ImageAnnotation> {
    let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    parse_annotation_str(&content, path)
}

/// Parse VOC XML text; `origin` is only used in error messages.
pub fn parse_annotation_str(content: &str, origin: &Path) -> Result<ImageAnnotation> {
    let annotation: VocAnnotation =
        serde_xml_rs::from_str(content).map_err(|e| ConvertError::parse(origin, e.to_string()))?;

    Ok(ImageAnnotation {
        filename: annotation.filename,
        width: annotation.size.width,
        height: annotation.size.height,
        objects: annotation.object.into_iter().map(ObjectBox::from).collect(),
    })
}
