use crate::config::GoBuildConfig;
use crate::model::FunctionSpec;

/// Join slash-separated path fragments and normalize the result.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment when
/// there is one, and both `/` and `\` separate segments. The result always
/// uses `/`, so artifact paths are identical on every platform.
pub fn join_paths<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut absolute: Option<bool> = None;
    let mut segments: Vec<String> = Vec::new();

    for part in parts {
        let part = part.as_ref();
        if part.is_empty() {
            continue;
        }
        if absolute.is_none() {
            absolute = Some(part.starts_with('/'));
        }
        for segment in part.split(|c| c == '/' || c == '\\') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.last().is_some_and(|s| s != "..") {
                        segments.pop();
                    } else if absolute != Some(true) {
                        segments.push("..".to_string());
                    }
                }
                other => segments.push(other.to_string()),
            }
        }
    }

    let joined = segments.join("/");
    match absolute {
        Some(true) => format!("/{joined}"),
        _ if joined.is_empty() => ".".to_string(),
        _ => joined,
    }
}

/// Destination of a function's compiled binary, relative to the service root.
///
/// The handler's `.go` suffix is stripped and, when handlers point into the
/// binary directory, a trailing `*` wildcard becomes the fixed name `main`.
/// Returns `None` when the function declares no handler.
pub fn output_binary_path(function: &FunctionSpec, config: &GoBuildConfig) -> Option<String> {
    let handler = function.handler.as_deref()?;
    let mut binary = handler.strip_suffix(".go").unwrap_or(handler).to_string();
    if config.use_bin_path_for_handler {
        if let Some(stem) = binary.strip_suffix('*') {
            binary = format!("{stem}main");
        }
    }
    Some(join_paths([config.bin_path.as_str(), binary.as_str()]))
}

/// Last path segment of a slash-separated path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}
