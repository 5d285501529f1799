//! Output file naming.
//!
//! Every output is named after its source: the last extension is dropped, a
//! `_resized_by_{brand}` marker is appended, and the output format's
//! extension is added:
//!
//! - `holiday.JPG` → `holiday_resized_by_resizer.png`
//! - `archive.tar.png` → `archive.tar_resized_by_resizer.webp`
//! - `README` → `README_resized_by_resizer.jpg`
//!
//! Names are flattened to a single path component so they are safe as ZIP
//! entry names and as file names inside an output directory.

use crate::imaging::OutputFormat;
use std::collections::HashSet;

/// Fallback stem for names that have nothing before the extension.
const EMPTY_STEM: &str = "image";

/// Strip directories and the last `.ext` from a file name.
///
/// Handles these patterns:
/// - `"photo.jpg"` → `"photo"`
/// - `"a.b.c"` → `"a.b"`
/// - `"dir/photo.png"` → `"photo"`
/// - `"noext"` → `"noext"`
/// - `".hidden"` → `""`
pub fn file_stem(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(dot) if dot + 1 < base.len() => &base[..dot],
        _ => base,
    }
}

/// Build the output file name for `original` encoded as `format`.
pub fn output_file_name(original: &str, format: OutputFormat, brand: &str) -> String {
    let stem = match file_stem(original).trim() {
        "" => EMPTY_STEM,
        s => s,
    };
    let brand = brand.trim();
    if brand.is_empty() {
        format!("{stem}_resized.{}", format.extension())
    } else {
        format!("{stem}_resized_by_{brand}.{}", format.extension())
    }
}

/// Split `name` into (stem, ".ext") on the last dot, keeping the dot.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    }
}

/// Running set of names already handed out.
///
/// The first request for a name gets it unchanged; later requests become
/// `stem-2.ext`, `stem-3.ext`, … skipping any suffix already taken.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name`, or the first free suffixed variant of it.
    pub fn reserve(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let (stem, ext) = split_extension(name);
        let mut n = 2;
        let unique = loop {
            let candidate = format!("{stem}-{n}{ext}");
            if !self.taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        self.taken.insert(unique.clone());
        unique
    }
}

/// Make every name unique, preserving order. See [`UniqueNames`].
pub fn dedupe_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut taken = UniqueNames::new();
    names
        .into_iter()
        .map(|name| taken.reserve(name.as_ref()))
        .collect()
}
