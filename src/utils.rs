use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
            label
        ))
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Collect the excluded class names, ignoring blanks and surrounding whitespace
pub fn exclusion_set(names: &[String]) -> HashSet<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
