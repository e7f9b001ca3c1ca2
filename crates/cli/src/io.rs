//! Input path expansion.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use glob::glob;

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Expand glob patterns among the command-line inputs.
///
/// Plain paths are passed through untouched, even when they do not exist, so
/// that the job reports them. A pattern matching nothing is an error.
pub fn expand_inputs(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for arg in args {
        if !is_pattern(arg) {
            inputs.push(PathBuf::from(arg));
            continue;
        }
        let mut matches: Vec<PathBuf> = glob(arg)
            .with_context(|| format!("Failed to glob pattern: {arg}"))?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            bail!("No files match {arg}");
        }
        matches.sort();
        inputs.extend(matches);
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_plain_paths_pass_through() {
        let args = vec!["a.ttf".to_string(), "missing/b.woff".to_string()];
        assert_eq!(expand_inputs(&args).unwrap(), [PathBuf::from("a.ttf"), PathBuf::from("missing/b.woff")]);
    }

    #[test]
    fn test_pattern_expands_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.ttf", "a.ttf", "c.otf"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("d.ttf")).unwrap();

        let pattern = dir.path().join("*.ttf").to_string_lossy().into_owned();
        assert_eq!(expand_inputs(&[pattern]).unwrap(), [dir.path().join("a.ttf"), dir.path().join("b.ttf")]);
    }

    #[test]
    fn test_empty_pattern_fails() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().join("*.woff").to_string_lossy().into_owned();
        assert!(expand_inputs(&[pattern]).is_err());
    }
}
