use crate::error::{ConvertError, Result};
use crate::types::ObjectBox;

/// A YOLO label record: class index plus a box normalized to the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub class_index: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl NormalizedBox {
    /// Format as one label line: `<class> <cx> <cy> <w> <h>\n`.
    pub fn to_label_line(&self) -> String {
        format!(
            "{} {:.6} {:.6} {:.6} {:.6}\n",
            self.class_index, self.cx, self.cy, self.w, self.h
        )
    }

    /// Inverse transform back to absolute `(xmin, ymin, xmax, ymax)`.
    pub fn to_corners(&self, width: u32, height: u32) -> (f64, f64, f64, f64) {
        let (width, height) = (width as f64, height as f64);
        let half_w = self.w * width / 2.0;
        let half_h = self.h * height / 2.0;
        let cx = self.cx * width;
        let cy = self.cy * height;
        (cx - half_w, cy - half_h, cx + half_w, cy + half_h)
    }
}

/// Convert an absolute corner box into a normalized center box.
pub fn to_normalized(
    class_index: u32,
    object: &ObjectBox,
    width: u32,
    height: u32,
) -> Result<NormalizedBox> {
    if width == 0 || height == 0 {
        return Err(ConvertError::ZeroDimension { width, height });
    }

    let (xmin, ymin) = (object.xmin as f64, object.ymin as f64);
    let (xmax, ymax) = (object.xmax as f64, object.ymax as f64);
    let (width, height) = (width as f64, height as f64);

    Ok(NormalizedBox {
        class_index,
        cx: (xmin + xmax) / 2.0 / width,
        cy: (ymin + ymax) / 2.0 / height,
        w: (xmax - xmin) / width,
        h: (ymax - ymin) / height,
    })
}
