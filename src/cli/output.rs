//! Terminal output for the `docqa` CLI.
//!
//! Formatting is done by plain functions that return strings; [`Output`]
//! only decides on color and where a line goes.

use crate::types::{AskResponse, IndexManifest, IndexReport, Source, StoredDocument};
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

#[derive(Clone, Copy)]
enum Tone {
    Success,
    Info,
    Warning,
    Error,
}

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the DocQA banner
    pub fn banner(&self) {
        let art = [
            r" ____              ___    _    ",
            r"|  _ \  ___   ___ / _ \  / \   ",
            r"| | | |/ _ \ / __| | | |/ _ \  ",
            r"| |_| | (_) | (__| |_| / ___ \ ",
            r"|____/ \___/ \___|\__\_\_/   \_\",
        ];
        let tagline = "Document Q&A over your PDFs";
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));

        println!();
        for line in art {
            if self.colored {
                println!("   {}", line.bright_cyan().bold());
            } else {
                println!("   {}", line);
            }
        }
        if self.colored {
            println!("\n   {} {}\n", tagline.bold(), version.dimmed());
        } else {
            println!("\n   {} {}\n", tagline, version);
        }
    }

    fn status_line(&self, tone: Tone, message: &str) -> String {
        if !self.colored {
            let tag = match tone {
                Tone::Success => "OK",
                Tone::Info => "INFO",
                Tone::Warning => "WARN",
                Tone::Error => "ERROR",
            };
            return format!("  [{}] {}", tag, message);
        }
        match tone {
            Tone::Success => format!("  {} {}", "✓".green().bold(), message.green()),
            Tone::Info => format!("  {} {}", "•".blue(), message),
            Tone::Warning => format!("  {} {}", "⚠".yellow().bold(), message.yellow()),
            Tone::Error => format!("  {} {}", "✗".red().bold(), message.red()),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        println!("{}", self.status_line(Tone::Success, message));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        println!("{}", self.status_line(Tone::Info, message));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        println!("{}", self.status_line(Tone::Warning, message));
    }

    /// Print an error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.status_line(Tone::Error, message));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value);
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// Print a hint
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("  {}", message.dimmed().italic());
        } else {
            println!("  [TIP] {}", message);
        }
    }

    /// Print a shell command the user can run
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// Print that a file or directory was written
    pub fn created(&self, kind: &str, path: &str) {
        if self.colored {
            println!("  {} {} {}", "✓".green().bold(), kind.dimmed(), path);
        } else {
            println!("  [CREATED] {} {}", kind, path);
        }
    }

    /// Print that a path was left alone
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!("  {} {} ({})", "○".yellow(), path.dimmed(), reason);
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    /// Ask a yes/no question on stdin; anything but y/yes is a no.
    pub fn confirm(&self, message: &str) -> bool {
        if self.colored {
            print!("  {} {} [y/N]: ", "?".bright_yellow().bold(), message);
        } else {
            print!("  [?] {} [y/N]: ", message);
        }
        io::stdout().flush().ok();
        read_confirmation(io::stdin().lock())
    }

    /// Print uploaded documents as a table
    pub fn documents(&self, documents: &[StoredDocument]) {
        let mut lines = document_table(documents).into_iter();
        if let Some(head) = lines.next() {
            if self.colored {
                println!("    {}", head.bold());
            } else {
                println!("    {}", head);
            }
        }
        for line in lines {
            println!("    {}", line);
        }
    }

    /// Print the manifest of the current index
    pub fn manifest(&self, manifest: &IndexManifest) {
        self.kv("Collection", &manifest.collection);
        self.kv("Chunks", &manifest.chunk_count.to_string());
        self.kv("Embedding model", &manifest.embedding_model);
        self.kv("Built at", &manifest.built_at.to_rfc3339());
        self.kv("Sources", &manifest.sources.join(", "));
    }

    /// Print the outcome of an index rebuild
    pub fn index_report(&self, report: &IndexReport) {
        for failure in &report.failures {
            self.error(&format!("Failed to load {}: {}", failure.file, failure.error));
        }
        self.success(&index_summary(report));
    }

    /// Print an answer, optionally followed by the chunks it came from
    pub fn answer(&self, response: &AskResponse, with_sources: bool) {
        self.header("Answer");
        println!("\n{}\n", response.answer);
        if !with_sources {
            return;
        }
        self.header("Sources");
        for (i, source) in response.sources.iter().enumerate() {
            let (title, excerpt) = source_lines(i + 1, source);
            if self.colored {
                println!("    {}", title.bold());
                println!("       {}", excerpt.dimmed());
            } else {
                println!("    {}", title);
                println!("       {}", excerpt);
            }
        }
    }
}

fn read_confirmation(mut input: impl BufRead) -> bool {
    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

/// Header line followed by one line per document; the name column fits the
/// longest name.
fn document_table(documents: &[StoredDocument]) -> Vec<String> {
    let width = documents
        .iter()
        .map(|d| d.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let mut lines = vec![format!("{:<width$}  {:>10}  {}", "Name", "Size", "Modified")];
    for doc in documents {
        let modified = doc
            .modified_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        lines.push(
            format!(
                "{:<width$}  {:>10}  {}",
                doc.name,
                human_size(doc.size_bytes),
                modified
            )
            .trim_end()
            .to_string(),
        );
    }
    lines
}

fn index_summary(report: &IndexReport) -> String {
    format!(
        "Index built and persisted to db/ ({} document(s), {} chunks, {} ms)",
        report.documents, report.chunks, report.duration_ms
    )
}

/// `(title, excerpt)` for the `n`th source of an answer.
fn source_lines(n: usize, source: &Source) -> (String, String) {
    let page = source
        .page
        .map(|p| format!(", page {}", p))
        .unwrap_or_default();
    (
        format!("{}. {}{} (score {:.3})", n, source.source, page, source.score),
        source.excerpt.clone(),
    )
}
