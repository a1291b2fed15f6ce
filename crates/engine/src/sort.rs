use std::cmp::Ordering;

use explite_protocol::{MediaFile, SortKey, SortType};

/// Stable in-place sort: folders first, then by `sort_type.key`.
///
/// Descending order inverts the comparator, so the folder/file grouping
/// flips along with it.
pub fn sort_files(files: &mut [MediaFile], sort_type: SortType) {
    if sort_type.asc {
        files.sort_by(|a, b| compare(a, b, sort_type.key));
    } else {
        files.sort_by(|a, b| compare(b, a, sort_type.key));
    }
}

/// Links count as files whatever they point at.
fn groups_as_file(f: &MediaFile) -> bool {
    !f.link_path.is_empty() || f.is_file
}

pub fn compare(a: &MediaFile, b: &MediaFile, key: SortKey) -> Ordering {
    match (groups_as_file(a), groups_as_file(b)) {
        (false, true) => return Ordering::Less,
        (true, false) => return Ordering::Greater,
        _ => {}
    }

    match key {
        SortKey::Name => compare_stems(a, b),
        SortKey::Extension => locale_cmp(&a.extension, &b.extension),
        SortKey::Mdate => a.mdate.cmp(&b.mdate).then_with(|| compare_stems(a, b)),
        SortKey::Cdate => a.cdate.cmp(&b.cdate).then_with(|| compare_stems(a, b)),
        SortKey::Size => a.size.cmp(&b.size).then_with(|| compare_stems(a, b)),
        SortKey::Ddate => a.ddate.cmp(&b.ddate).then_with(|| compare_stems(a, b)),
        SortKey::Directory => locale_cmp(&a.dir, &b.dir),
        SortKey::OrigPath => locale_cmp(&a.original_path, &b.original_path),
    }
}

fn compare_stems(a: &MediaFile, b: &MediaFile) -> Ordering {
    locale_cmp(stem(&a.name), stem(&b.name))
}

/// Name without its last extension; dotfiles keep their whole name.
fn stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Case-insensitive first, raw order as the tie-break.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = if a.is_ascii() && b.is_ascii() {
        a.bytes()
            .map(|c| c.to_ascii_lowercase())
            .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
    } else {
        a.to_lowercase().cmp(&b.to_lowercase())
    };
    folded.then_with(|| a.cmp(b))
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod tests;
