/// Longest title prefix, in characters, kept in a save name.
pub const MAX_TITLE_CHARS: usize = 50;
pub const FILE_EXTENSION: &str = ".mp4";
/// Save name used when no usable title is available.
pub const DEFAULT_FILE_NAME: &str = "video.mp4";

/// Filesystem-safe save name: `{title truncated to 50 chars}.mp4`, or `video.mp4`.
pub fn save_file_name(title: Option<&str>) -> String {
    let truncated: String = match title {
        Some(title) => title.chars().take(MAX_TITLE_CHARS).collect(),
        None => return DEFAULT_FILE_NAME.to_string(),
    };
    match sanitize_title(&truncated) {
        Some(stem) => format!("{stem}{FILE_EXTENSION}"),
        None => DEFAULT_FILE_NAME.to_string(),
    }
}

fn sanitize_title(input: &str) -> Option<String> {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    if cleaned.is_empty() {
        return None;
    }
    // Collapse multiple underscores
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    if is_reserved_windows_name(&compacted) {
        compacted.push('_');
    }
    Some(compacted)
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}' | '\u{7F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
