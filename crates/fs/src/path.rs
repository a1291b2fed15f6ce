//! String-level path helpers over the platform separator.
//!
//! Paths stay `&str`/`String` throughout the session layer: they are ids for
//! front ends and keys in caches, and every value here must survive a round
//! trip through the wire protocol unchanged.
//!
//! Absolute POSIX paths keep their root as a leading `"/"` component, so
//! `join(&split(p)) == p` for any normalized path and `dirname` of an
//! absolute path stays absolute.

#[cfg(windows)]
pub const SEPARATOR: char = '\\';
#[cfg(not(windows))]
pub const SEPARATOR: char = '/';

const UNC: &str = "\\\\";
const POSIX_ROOT: &str = "/";

pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    join_with(segments, SEPARATOR)
}

pub fn split(path: &str) -> Vec<String> {
    split_with(path, SEPARATOR)
}

pub fn dirname(path: &str) -> String {
    dirname_with(path, SEPARATOR)
}

pub fn basename(path: &str) -> String {
    let components = split(path);
    match components.last() {
        Some(last) if last != POSIX_ROOT => last.clone(),
        _ => String::new(),
    }
}

/// Lowercase extension including the dot, taken from the basename.
pub fn extname(path: &str) -> String {
    let name = basename(path);
    match name.rfind('.') {
        Some(idx) => name[idx..].to_lowercase(),
        None => String::new(),
    }
}

/// First component plus a trailing separator, e.g. `C:\` or `/`.
pub fn root(path: &str) -> String {
    root_with(path, SEPARATOR)
}

pub(crate) fn split_with(path: &str, sep: char) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut components = Vec::new();

    if path.starts_with(UNC) {
        // `\\server\share`: the leading pair belongs to the first component,
        // and only backslashes separate.
        let mut current = String::new();
        let mut prev: Option<char> = None;
        for (i, ch) in path.char_indices() {
            if ch == '\\' && i > 0 && prev != Some('\\') {
                components.push(std::mem::take(&mut current));
            } else {
                current.push(ch);
            }
            prev = Some(ch);
        }
        components.push(current);
        components.retain(|c| !c.is_empty());
        return components;
    }

    if sep == '/' && path.starts_with('/') {
        components.push(POSIX_ROOT.to_string());
    }

    components.extend(
        path.split(['/', '\\'])
            .filter(|c| !c.is_empty())
            .map(str::to_string),
    );
    components
}

pub(crate) fn join_with<S: AsRef<str>>(segments: &[S], sep: char) -> String {
    let mut components: Vec<String> = segments
        .iter()
        .flat_map(|s| split_with(s.as_ref(), sep))
        .collect();

    let rooted = components.first().is_some_and(|c| c == POSIX_ROOT);
    components.retain(|c| c != POSIX_ROOT);

    let body = components.join(&sep.to_string());
    if rooted {
        format!("{POSIX_ROOT}{body}")
    } else {
        body
    }
}

pub(crate) fn dirname_with(path: &str, sep: char) -> String {
    let components = split_with(path, sep);
    if components.len() <= 1 {
        return String::new();
    }
    join_with(&components[..components.len() - 1], sep)
}

pub(crate) fn root_with(path: &str, sep: char) -> String {
    match split_with(path, sep).first() {
        Some(first) if first.ends_with(sep) => first.clone(),
        Some(first) => format!("{first}{sep}"),
        None => String::new(),
    }
}

/// True when `path` is `dir` itself or lies anywhere beneath it.
pub fn is_within(path: &str, dir: &str) -> bool {
    let path = split(path);
    let dir = split(dir);
    !dir.is_empty() && path.len() >= dir.len() && path[..dir.len()] == dir[..]
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
