//! Terminal implementations of the job host capabilities.

use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use fontgen_core::{DestinationPrompt, DirectorySelection, JobReporter};
use log::{debug, info};

/// Asks for the destination folder on the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrompt;

impl DestinationPrompt for ConsolePrompt {
    fn prompt_directory(&self, start: &Path) -> io::Result<DirectorySelection> {
        ask_directory(&mut io::stdin().lock(), &mut io::stderr().lock(), start)
    }
}

/// Read one destination line. An empty line or end of input cancels.
///
/// Relative answers stay relative; jobs resolve them against `start`.
pub fn ask_directory(
    input: &mut impl BufRead,
    output: &mut impl Write,
    start: &Path,
) -> io::Result<DirectorySelection> {
    write!(output, "Destination folder (relative to {}, empty to cancel): ", display_dir(start))?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(DirectorySelection::cancelled());
    }
    let answer = line.trim();
    if answer.is_empty() {
        return Ok(DirectorySelection::cancelled());
    }
    Ok(DirectorySelection::selected(answer))
}

fn display_dir(dir: &Path) -> String {
    if dir.as_os_str().is_empty() { ".".to_string() } else { dir.display().to_string() }
}

/// Reports one job's progress, prefixed with its input file name.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    name: String,
}

impl ConsoleReporter {
    pub fn new(input: &Path) -> Self {
        let name = input.file_name().unwrap_or_default().to_string_lossy().into_owned();
        Self { name }
    }
}

impl JobReporter for ConsoleReporter {
    fn stage(&self, label: &str) {
        info!("{}: converting to {label}", self.name);
    }

    fn progress(&self, total: usize, completed: usize) {
        debug!("{}: {completed}/{total}", self.name);
    }

    fn output_file(&self, path: &Path) {
        println!("{}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn ask(answer: &str, start: &str) -> (DirectorySelection, String) {
        let mut output = Vec::new();
        let selection =
            ask_directory(&mut Cursor::new(answer.as_bytes()), &mut output, Path::new(start)).unwrap();
        (selection, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_relative_answer_kept() {
        let (selection, prompt) = ask("web\n", "/fonts");
        assert_eq!(selection, DirectorySelection::selected("web"));
        assert!(prompt.contains("/fonts"));
    }

    #[test]
    fn test_absolute_answer() {
        let (selection, _) = ask("  /out  \n", "/fonts");
        assert_eq!(selection, DirectorySelection::selected("/out"));
    }

    #[test]
    fn test_empty_answer_cancels() {
        assert!(ask("\n", "/fonts").0.cancelled);
        assert!(ask("", "/fonts").0.cancelled);
    }

    #[test]
    fn test_prompt_shows_current_dir_for_bare_names() {
        let (_, prompt) = ask("\n", "");
        assert!(prompt.contains("relative to ."));
    }

    #[test]
    fn test_reporter_uses_file_name() {
        assert_eq!(ConsoleReporter::new(Path::new("/a/b/Font.ttf")).name, "Font.ttf");
    }
}
