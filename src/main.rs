//! Main entry point for the rangezip CLI application.
//!
//! Lists and extracts entries of ZIP archives reached over HTTP Range
//! requests, or of local files through the same code path.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

use rangezip::{Cli, HttpRangeTransport, LocalFileTransport, RangeTransport, RemoteZip};

/// Application entry point.
///
/// Parses command-line arguments and picks the transport based on whether
/// the input is a local file or HTTP URL.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    if cli.is_http_url() {
        let transport = HttpRangeTransport::with_timeout(Duration::from_secs(cli.timeout))?;
        let mut archive = RemoteZip::with_options(cli.file.clone(), transport, cli.archive_options());

        process_zip(&mut archive, &cli).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            let transferred = archive.transport().transferred_bytes();
            eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
        }
    } else {
        let mut archive =
            RemoteZip::with_options(cli.file.clone(), LocalFileTransport::new(), cli.archive_options());
        process_zip(&mut archive, &cli).await?;
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (warnings only by default).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Open the archive and either list it or extract the selected entries.
async fn process_zip<T: RangeTransport>(archive: &mut RemoteZip<T>, cli: &Cli) -> Result<()> {
    archive
        .open()
        .await
        .with_context(|| format!("cannot open {}", archive.url()))?;

    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        return list_files(archive, cli.verbose);
    }

    let selected = select_files(archive, cli)?;

    let multiple_files = (cli.pipe || cli.text.is_some()) && selected.len() > 1;
    for name in &selected {
        extract_file(archive, name, cli, multiple_files)
            .await
            .with_context(|| format!("cannot extract {name}"))?;
    }

    Ok(())
}

/// Names of the file entries matching the positional filters and not
/// matching any exclusion.
fn select_files<T: RangeTransport>(archive: &RemoteZip<T>, cli: &Cli) -> Result<Vec<String>> {
    let selected = archive
        .files()?
        .into_iter()
        .filter(|name| {
            if !cli.files.is_empty() {
                let matches = cli.files.iter().any(|f| {
                    if has_glob_chars(f) {
                        glob_match(f, name)
                    } else {
                        // No wildcards: exact match on full path or basename
                        *name == f.as_str() || base_name(name) == f.as_str()
                    }
                });
                if !matches {
                    return false;
                }
            }

            !cli
                .exclude
                .iter()
                .any(|x| name.contains(x.as_str()) || glob_match(x, name))
        })
        .map(str::to_string)
        .collect();

    Ok(selected)
}

/// List files in the ZIP archive.
///
/// `-l` prints file names only; `-v` prints a table with sizes, compression
/// ratio, method and timestamps, directories included.
fn list_files<T: RangeTransport>(archive: &RemoteZip<T>, verbose: bool) -> Result<()> {
    if !verbose {
        for name in archive.files()? {
            println!("{name}");
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:>6}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
        "Length", "Method", "Size", "Cmpr", "Date", "Time"
    );
    println!("{}", "-".repeat(78));

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in archive.entries()? {
        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();

        println!(
            "{:>10}  {:>6}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            entry.compression_method.name(),
            entry.compressed_size,
            ratio(entry.compressed_size, entry.uncompressed_size),
            year,
            month,
            day,
            hour,
            minute,
            entry.file_name
        );

        if !entry.is_directory {
            total_uncompressed += entry.uncompressed_size;
            total_compressed += entry.compressed_size;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(78));
    println!(
        "{:>10}  {:>6}  {:>10}  {}  {:>19}  {} files",
        total_uncompressed,
        "",
        total_compressed,
        ratio(total_compressed, total_uncompressed),
        "",
        file_count
    );

    Ok(())
}

/// Extract a single entry.
///
/// Text mode (`-t`) and pipe mode (`-p`) write to stdout; otherwise the entry
/// is written below the current or `-d` directory, honoring `-j`, `-n` and `-o`.
async fn extract_file<T: RangeTransport>(
    archive: &mut RemoteZip<T>,
    name: &str,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    if cli.pipe || cli.text.is_some() {
        let mut stdout = tokio::io::stdout();
        if show_filename {
            stdout
                .write_all(format!("--- {name} ---\n").as_bytes())
                .await?;
        }

        match &cli.text {
            Some(encoding) => {
                let text = archive.extract_text_file(name, Some(encoding.as_str())).await?;
                stdout.write_all(text.as_bytes()).await?;
            }
            None => {
                let data = archive.extract_file(name).await?;
                stdout.write_all(&data).await?;
            }
        }
        stdout.flush().await?;
        return Ok(());
    }

    let file_name = if cli.junk_paths { base_name(name) } else { name };
    if !is_safe_path(file_name) {
        bail!("refusing to write outside the target directory: {name}");
    }
    let output_path = match &cli.extract_dir {
        Some(dir) => PathBuf::from(dir).join(file_name),
        None => PathBuf::from(file_name),
    };

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_very_quiet() {
                eprintln!("Skipping: {name} (file exists)");
            }
            return Ok(());
        }
        if !cli.overwrite {
            if !cli.is_very_quiet() {
                eprintln!("Skipping: {name} (use -o to overwrite)");
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {name}");
    }

    let data = archive.extract_file(name).await?;
    write_output(&output_path, &data).await
}

async fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    Ok(())
}

/// Relative path made only of normal components.
fn is_safe_path(name: &str) -> bool {
    let path = Path::new(name);
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Space saved by compression, as a right-aligned percentage.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            // Star: skip it, or let it swallow one more character
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
