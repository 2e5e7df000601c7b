use std::path::Path;

/// Whether `output` exists and was modified strictly after `input`.
///
/// Any metadata failure (missing file, unsupported mtime) counts as stale.
pub fn is_up_to_date(output: &Path, input: &Path) -> bool {
    let modified = |path: &Path| std::fs::metadata(path).and_then(|m| m.modified());

    match (modified(output), modified(input)) {
        (Ok(output_time), Ok(input_time)) => output_time > input_time,
        _ => false,
    }
}
