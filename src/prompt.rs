//! Interactive export flow
//!
//! Used when `export` is run without a geodatabase argument. Reads plain
//! lines from any `BufRead` so the flow can be driven from tests.

use crate::config::ExportArgs;
use crate::error::ConfigError;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Line-based prompter over an input and an output stream
pub struct Prompter<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> Prompter<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    /// Ask for everything `export` needs
    ///
    /// The geodatabase path is asked again until it exists. Extra patterns
    /// are collected until an empty line.
    pub fn ask_export_args(&mut self) -> Result<ExportArgs, ConfigError> {
        self.say("=== Geodatabase to Excel export (topology layers excluded) ===")?;

        let gdb = loop {
            let answer = self.ask("Full path to the geodatabase (.gdb): ")?;
            if answer.is_empty() {
                self.say("A path is required.")?;
                continue;
            }
            let path = PathBuf::from(answer);
            if path.exists() {
                break path;
            }
            self.say(&format!("'{}' does not exist.", path.display()))?;
        };

        let output = self.ask("Output workbook (leave empty for the default): ")?;
        let output = (!output.is_empty()).then(|| PathBuf::from(output));

        let mut exclude_patterns = Vec::new();
        let wants_more = self.ask("Add extra exclusion patterns? (y/n): ")?;
        if is_yes(&wants_more) {
            self.say("Enter one pattern per line (empty line to finish):")?;
            loop {
                let pattern = self.ask("Pattern (e.g. '*topo*'): ")?;
                if pattern.is_empty() {
                    break;
                }
                exclude_patterns.push(pattern);
            }
        }

        Ok(ExportArgs {
            gdb: Some(gdb),
            output,
            exclude_patterns,
        })
    }

    fn say(&mut self, line: &str) -> Result<(), ConfigError> {
        writeln!(self.output, "{}", line).map_err(prompt_error)
    }

    /// Print `question` and read one trimmed answer; end of input is an error
    fn ask(&mut self, question: &str) -> Result<String, ConfigError> {
        write!(self.output, "{}", question).map_err(prompt_error)?;
        self.output.flush().map_err(prompt_error)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(prompt_error)?;
        if read == 0 {
            return Err(ConfigError::Prompt("input closed".into()));
        }
        Ok(clean_answer(&line).to_string())
    }
}

fn prompt_error(e: std::io::Error) -> ConfigError {
    ConfigError::Prompt(e.to_string())
}

/// Trim whitespace and one pair of surrounding quotes
fn clean_answer(line: &str) -> &str {
    let trimmed = line.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].trim();
        }
    }
    trimmed
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn run(script: &str) -> (Result<ExportArgs, ConfigError>, String) {
        let mut out = Vec::new();
        let result = Prompter::new(Cursor::new(script.to_string()), &mut out).ask_export_args();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_full_flow() {
        let dir = tempdir().unwrap();
        let gdb = dir.path().join("City.gdb");
        std::fs::create_dir(&gdb).unwrap();

        let script = format!("{}\nout.xlsx\ny\ntmp_*\nold_*\n\n", gdb.display());
        let (result, _) = run(&script);
        let args = result.unwrap();

        assert_eq!(args.gdb, Some(gdb));
        assert_eq!(args.output, Some(PathBuf::from("out.xlsx")));
        assert_eq!(args.exclude_patterns, vec!["tmp_*", "old_*"]);
    }

    #[test]
    fn test_reprompts_until_path_exists() {
        let dir = tempdir().unwrap();
        let gdb = dir.path().join("City.gdb");
        std::fs::create_dir(&gdb).unwrap();

        let script = format!(
            "\n{}\n\"{}\"\n\nn\n",
            dir.path().join("missing.gdb").display(),
            gdb.display()
        );
        let (result, transcript) = run(&script);
        let args = result.unwrap();

        assert_eq!(args.gdb, Some(gdb));
        assert!(args.output.is_none());
        assert!(args.exclude_patterns.is_empty());
        assert!(transcript.contains("A path is required."));
        assert!(transcript.contains("does not exist."));
    }

    #[test]
    fn test_end_of_input_aborts() {
        let (result, _) = run("");
        assert!(matches!(result, Err(ConfigError::Prompt(_))));
    }

    #[test]
    fn test_answers() {
        assert!(is_yes("Y"));
        assert!(is_yes("s"));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
        assert_eq!(clean_answer("  'C:\\gis\\a.gdb' \n"), "C:\\gis\\a.gdb");
        assert_eq!(clean_answer("\"\n"), "\"");
    }
}
