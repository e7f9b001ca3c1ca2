//! Output naming, path comparison and backup naming.

use std::{
    ffi::OsString,
    path::{Component, Path, PathBuf},
};

use crate::{
    config::{InputType, PathCase, TargetFormat},
    error::{Error, Result},
};

/// Detect the input type from the file extension.
pub fn input_type(input: &Path) -> Result<InputType> {
    let ext = input.extension().map(|e| e.to_string_lossy()).unwrap_or_default();
    InputType::from_extension(&ext).ok_or_else(|| Error::UnsupportedInputType(ext.trim().to_string()))
}

/// Directory containing the input file.
pub fn input_dir(input: &Path) -> &Path {
    input.parent().unwrap_or(Path::new(""))
}

/// Input file name without its extension.
pub fn input_stem(input: &Path) -> OsString {
    input.file_stem().map(OsString::from).unwrap_or_default()
}

/// Resolve `destination` against the input's directory.
///
/// Absolute destinations are used as-is; an empty one means the input's own directory.
pub fn output_dir(input: &Path, destination: &str) -> PathBuf {
    input_dir(input).join(destination.trim())
}

/// `<out_dir>/<stem>.<format>`
pub fn output_path(out_dir: &Path, stem: &OsString, format: TargetFormat) -> PathBuf {
    let mut name = stem.clone();
    name.push(".");
    name.push(format.extension());
    out_dir.join(name)
}

/// `<input dir>/<stem>.BACKUP<.ext>`, keeping the extension's case.
pub fn backup_path(input: &Path) -> PathBuf {
    let mut name = input_stem(input);
    name.push(".BACKUP");
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input_dir(input).join(name)
}

/// Lexically normalize a path: surrounding whitespace and trailing
/// separators are dropped, `.` segments removed and `..` folded into the
/// preceding segment where there is one.
pub fn normalize(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    let trimmed = text.trim().trim_end_matches(['/', '\\']);
    let trimmed = if trimmed.is_empty() && text.trim().starts_with(['/', '\\']) {
        &text.trim()[..1]
    } else {
        trimmed
    };

    let mut out = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Normalize `path` and anchor it at the current directory when relative.
fn resolve(path: &Path) -> PathBuf {
    let path = normalize(path);
    match std::path::absolute(&path) {
        Ok(absolute) => normalize(&absolute),
        Err(_) => path,
    }
}

/// Whether two paths name the same file under the given case rule.
///
/// Relative paths are resolved against the current directory first.
pub fn same_path(a: &Path, b: &Path, case: PathCase) -> bool {
    let (a, b) = (resolve(a), resolve(b));
    match case {
        PathCase::Sensitive => a == b,
        PathCase::Insensitive => {
            a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
        }
    }
}
