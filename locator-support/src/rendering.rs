//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to present callable definitions, shorten type
//! names, and suggest registered ids close to a missing one.

/// Splits a Rust path on `::`, ignoring separators nested in generics.
///
/// ```
/// use locator_support::rendering::path_segments;
///
/// let segments = path_segments("app::Wrapper<core::Item>::build");
/// assert_eq!(segments, vec!["app", "Wrapper<core::Item>", "build"]);
/// ```
pub fn path_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let bytes = path.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                segments.push(&path[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    segments.push(&path[start..]);
    segments
}

/// Presents a callable definition from its compiler type name.
///
/// Closures point at the function that defines them, function items
/// keep their owner and name.
///
/// ```
/// use locator_support::rendering::present_definition;
///
/// assert_eq!(
///     present_definition("app::boot::{{closure}}"),
///     "closure defined in app::boot"
/// );
/// assert_eq!(
///     present_definition("app::services::Mailer::build"),
///     "Mailer::build()"
/// );
/// ```
pub fn present_definition(type_name: &str) -> String {
    let mut segments = path_segments(type_name);

    if segments.last() == Some(&"{{closure}}") {
        while segments.last() == Some(&"{{closure}}") {
            segments.pop();
        }
        return format!("closure defined in {}", segments.join("::"));
    }

    let keep = segments.len().min(2);
    let tail: Vec<String> = segments[segments.len() - keep..]
        .iter()
        .map(|segment| shorten_type_name(segment))
        .collect();
    format!("{}()", tail.join("::"))
}

/// Presents an object that knows how to invoke itself.
///
/// ```
/// use locator_support::rendering::present_object;
///
/// assert_eq!(present_object("app::ValueProvider"), "invokable object ValueProvider");
/// ```
pub fn present_object(type_name: &str) -> String {
    format!("invokable object {}", shorten_type_name(type_name))
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use locator_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>");
/// assert_eq!(short, "Arc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut current_segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                current_segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' => {
                result.push_str(&current_segment);
                result.push(ch);
                current_segment.clear();
            }
            _ => {
                current_segment.push(ch);
            }
        }
    }

    result.push_str(&current_segment);
    result
}

/// Generates "did you mean?" suggestions among registered ids.
///
/// Substring matches rank highest, then ids sharing a prefix of at
/// least three characters with the requested one.
pub fn suggest_similar(requested: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    if requested_lower.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter_map(|&id| {
            let id_lower = id.to_lowercase();
            if id_lower == requested_lower {
                return None;
            }

            if id_lower.contains(&requested_lower) || requested_lower.contains(&id_lower) {
                return Some((id, 100));
            }

            let common = id_lower
                .chars()
                .zip(requested_lower.chars())
                .take_while(|(a, b)| a == b)
                .count();

            if common >= 3 {
                return Some((id, common * 10));
            }

            None
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(id, _)| id.to_string())
        .collect()
}
