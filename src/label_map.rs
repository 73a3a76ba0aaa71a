//! Loader for `pascal_label_map.pbtxt` style label maps.
//!
//! The format is read line by line:
//!
//! ```text
//! item {
//!   id: 1
//!   name: 'cat'
//! }
//! ```
//!
//! Brace lines are skipped, an `id` line sets the id of the entry being read
//! and the following `name` line closes it. An entry whose closing brace (or
//! the end of the file) comes before its name is an error.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// Ordered class vocabulary with the ids declared in the label map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    names: Vec<String>,
    ids: HashMap<String, u32>,
}

impl ClassMap {
    /// Read and parse a label map file, dropping every class in `exclude`.
    pub fn load(path: &Path, exclude: &HashSet<String>) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        Self::parse(&text, exclude, path)
    }

    /// Parse label map text; `origin` is only used in error messages.
    pub fn parse(text: &str, exclude: &HashSet<String>, origin: &Path) -> Result<Self> {
        let mut names = Vec::new();
        let mut ids = HashMap::new();
        let mut pending_id: Option<u32> = None;
        let mut seen_any = false;

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.contains('}') {
                if let Some(id) = pending_id {
                    return Err(ConvertError::parse(
                        origin,
                        format!("line {}: entry with id {} has no name", lineno + 1, id),
                    ));
                }
                continue;
            }
            if line.is_empty() || line.contains('{') {
                continue;
            }

            if line.starts_with("id") {
                let value = field_value(line);
                let id = value.parse::<u32>().map_err(|_| {
                    ConvertError::parse(
                        origin,
                        format!("line {}: id '{}' is not an integer", lineno + 1, value),
                    )
                })?;
                pending_id = Some(id);
            } else if line.starts_with("name") {
                let name = quoted_name(line).ok_or_else(|| {
                    ConvertError::parse(
                        origin,
                        format!("line {}: name is not enclosed in single quotes", lineno + 1),
                    )
                })?;
                let id = pending_id.take().ok_or_else(|| {
                    ConvertError::parse(
                        origin,
                        format!("line {}: name '{}' has no preceding id", lineno + 1, name),
                    )
                })?;
                seen_any = true;

                if exclude.contains(name) {
                    log::debug!("Excluding class '{}' (id {})", name, id);
                    continue;
                }
                if ids.insert(name.to_string(), id).is_some() {
                    log::warn!("Class '{}' is declared twice, keeping id {}", name, id);
                    names.retain(|n| n != name);
                }
                names.push(name.to_string());
            }
        }

        if let Some(id) = pending_id {
            return Err(ConvertError::parse(
                origin,
                format!("entry with id {} at the end of the file has no name", id),
            ));
        }
        if !seen_any {
            return Err(ConvertError::parse(origin, "label map contains no named entry"));
        }

        Ok(Self { names, ids })
    }

    /// Class names in label map order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The 1-based id declared in the label map.
    pub fn id(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Zero-based class index written to YOLO label files.
    pub fn index(&self, name: &str) -> Option<u32> {
        self.id(name).map(|id| id.saturating_sub(1))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn field_value(line: &str) -> &str {
    line.rsplit(':').next().unwrap_or("").trim()
}

// Text between the last pair of single quotes
fn quoted_name(line: &str) -> Option<&str> {
    let end = line.rfind('\'')?;
    let start = line[..end].rfind('\'')?;
    Some(&line[start + 1..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_name() {
        assert_eq!(quoted_name("name: 'cat'"), Some("cat"));
        assert_eq!(quoted_name("name: 'traffic light'"), Some("traffic light"));
        assert_eq!(quoted_name("name: cat"), None);
    }

    #[test]
    fn test_field_value() {
        assert_eq!(field_value("id: 12"), "12");
        assert_eq!(field_value("id:3"), "3");
    }
}
