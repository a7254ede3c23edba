//! Terminal output formatting
//!
//! Progress and preview lines render archive member paths with cycling ANSI
//! colors per path segment; file leaves use the warning color so they stand
//! out from directories. Raw escape sequences, no color crate.

/// Segment colors cycled by nesting depth
const SEGMENT_COLORS: [&str; 3] = ["\x1b[94m", "\x1b[96m", "\x1b[92m"];
const WARNING: &str = "\x1b[93m";
const RESET: &str = "\x1b[0m";

/// Number of components in an archive member path
///
/// A trailing `/` does not count as an extra component.
pub fn path_depth(arcname: &str) -> usize {
    let trimmed = arcname.trim_end_matches('/');
    if trimmed.is_empty() {
        0
    } else {
        trimmed.split('/').count()
    }
}

/// Color an archive member path segment by segment
///
/// Directory segments cycle through three colors by depth; a file leaf is
/// rendered in the warning color. Directory names keep their trailing slash.
pub fn color_path(arcname: &str) -> String {
    let is_dir = arcname.ends_with('/');
    let trimmed = arcname.trim_end_matches('/');
    let segments: Vec<&str> = trimmed.split('/').collect();

    let mut colored = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let last = i == segments.len() - 1;
        if last && !is_dir {
            colored.push(format!("{}{}", WARNING, segment));
        } else if last {
            colored.push(format!("{}{}/", SEGMENT_COLORS[i % SEGMENT_COLORS.len()], segment));
        } else {
            colored.push(format!("{}{}", SEGMENT_COLORS[i % SEGMENT_COLORS.len()], segment));
        }
    }

    format!("{}{}", colored.join("/"), RESET)
}

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_depth() {
        assert_eq!(path_depth("proj/"), 1);
        assert_eq!(path_depth("proj/a.txt"), 2);
        assert_eq!(path_depth("proj/sub/b.txt"), 3);
        assert_eq!(path_depth("proj/sub/"), 2);
        assert_eq!(path_depth(""), 0);
    }

    #[test]
    fn test_color_path_file_leaf_warns() {
        let colored = color_path("proj/a.txt");
        assert!(colored.contains("\x1b[93ma.txt"));
        assert!(colored.ends_with(RESET));
    }

    #[test]
    fn test_color_path_keeps_dir_slash() {
        let colored = color_path("proj/sub/");
        assert!(colored.contains("sub/"));
        assert!(!colored.contains("\x1b[93m"));
    }

    #[test]
    fn test_color_cycle() {
        let colored = color_path("a/b/c/d/e.txt");
        // Depth 0 and 3 share the first color
        assert!(colored.starts_with("\x1b[94ma"));
        assert!(colored.contains("\x1b[94md"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
