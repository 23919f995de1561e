//! Compact numeric range formatting.
//!
//! Turns a set of display indices into the comma/dash notation used inside
//! citation brackets, e.g. `[1, 3, 4, 6, 7, 8]` becomes `"1,3,4,6-8"`.

/// Formats distinct indices as a compact range string.
///
/// Input order does not matter; the output is always ascending. Runs of
/// three or more consecutive numbers collapse to `min-max`, while a run of
/// exactly two stays as `min,max`.
///
/// # Examples
///
/// ```
/// use refmark::format_index_range;
///
/// assert_eq!(format_index_range(&[8, 1, 7, 3, 6, 4]), "1,3,4,6-8");
/// assert_eq!(format_index_range(&[1, 2]), "1,2");
/// assert_eq!(format_index_range(&[]), "");
/// ```
pub fn format_index_range(indices: &[u32]) -> String {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();

    let mut runs: Vec<String> = Vec::new();
    let mut current: Option<(u32, u32)> = None;

    for &i in &sorted {
        current = match current {
            Some((min, max)) if max.checked_add(1) == Some(i) => Some((min, i)),
            Some(run) => {
                runs.push(flush(run));
                Some((i, i))
            }
            None => Some((i, i)),
        };
    }
    if let Some(run) = current {
        runs.push(flush(run));
    }

    runs.join(",")
}

fn flush((min, max): (u32, u32)) -> String {
    match max - min {
        0 => min.to_string(),
        1 => format!("{},{}", min, max),
        _ => format!("{}-{}", min, max),
    }
}
