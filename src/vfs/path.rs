/// Canonical form of a slash separated path: leading `/`, no empty or `.`
/// segments, `..` resolved, no trailing `/` except for the root.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Splits a path into its parent directory and leaf name.
/// Returns `None` for the root.
pub fn split(path: &str) -> Option<(String, String)> {
    let path = normalize(path);
    let idx = path.rfind('/')?;
    let name = &path[idx + 1..];
    if name.is_empty() {
        return None;
    }
    let parent = if idx == 0 { "/" } else { &path[..idx] };
    Some((parent.to_owned(), name.to_owned()))
}
