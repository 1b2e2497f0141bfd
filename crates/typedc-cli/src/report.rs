use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use typedc_diff::IssueSink;
use typedc_types::{Issue, SourceRef};

/// Streams issues to the console or a report file and keeps the flat
/// issue list for `--flat-out`.
pub struct Reporter {
    out: Option<BufWriter<File>>,
    map_source_dir: Option<String>,
    verbose: bool,
    /// Suppress console text; the caller prints a JSON document instead.
    quiet: bool,
    issues: Vec<Issue>,
    write_error: Option<std::io::Error>,
}

impl Reporter {
    /// A reporter writing to `out`, or to the console when `None`.
    ///
    /// An existing report file is replaced.
    pub fn new(out: Option<&Path>, map_source_dir: Option<String>, verbose: bool) -> anyhow::Result<Self> {
        let out = out
            .map(|path| {
                File::create(path)
                    .map(BufWriter::new)
                    .with_context(|| format!("failed to create report {}", path.display()))
            })
            .transpose()?;
        Ok(Self {
            out,
            map_source_dir,
            verbose,
            quiet: false,
            issues: Vec::new(),
            write_error: None,
        })
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn location(&self, source: &SourceRef) -> String {
        match &self.map_source_dir {
            Some(dir) => format!(
                "{}:{}",
                PathBuf::from(dir).join(&source.file_name).display(),
                source.line
            ),
            None => source.to_string(),
        }
    }

    fn render(&self, issue: &Issue) -> String {
        match &issue.location {
            Some(source) => format!("{issue}\n    at {}", self.location(source)),
            None => issue.to_string(),
        }
    }

    fn write_line(&mut self, line: &str) {
        if let Some(out) = &mut self.out {
            if let Err(e) = writeln!(out, "{line}") {
                self.write_error.get_or_insert(e);
            }
        }
    }

    /// Flush the report file and surface any write failure seen while
    /// streaming.
    pub fn finish(mut self) -> anyhow::Result<Vec<Issue>> {
        if let Some(out) = &mut self.out {
            out.flush().context("failed to write report")?;
        }
        if let Some(e) = self.write_error {
            return Err(e).context("failed to write report");
        }
        Ok(self.issues)
    }
}

impl IssueSink for Reporter {
    fn accept(&mut self, issue: &Issue) {
        let text = self.render(issue);
        if self.out.is_some() {
            self.write_line(&text);
        } else if !self.quiet {
            if issue.is_breaking() {
                println!("{} {}", "✗".red().bold(), text);
            } else {
                println!("{} {}", "+".green(), text);
            }
        }
        self.issues.push(issue.clone());
    }

    fn trace(&mut self, line: &str) {
        if !self.verbose {
            return;
        }
        if self.out.is_some() {
            self.write_line(line);
        } else if !self.quiet {
            eprintln!("{}", line.dimmed());
        }
    }
}

/// Write `issues` as a JSON array, replacing any existing file.
pub fn write_flat_out(path: &Path, issues: &[Issue]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(issues)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
