use clap::Parser;

use crate::zip::ArchiveOptions;

#[derive(Parser, Debug)]
#[command(name = "rangezip")]
#[command(version)]
#[command(about = "Extract single files from remote ZIP archives using HTTP Range requests", long_about = None)]
#[command(after_help = "Examples:\n  \
  rangezip -l https://example.com/archive.zip           list files in a remote ZIP\n  \
  rangezip -p https://example.com/archive.zip LICENSE   print one entry\n  \
  rangezip -t latin1 data.zip '*.txt'                   print text entries decoded from Latin-1\n\n\
Set RUST_LOG=rangezip=debug to trace every range request.")]
pub struct Cli {
    /// ZIP file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Files to extract (default: all), `*` and `?` wildcards allowed
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Print files as text decoded from ENCODING (e.g. utf-8, latin1, shift_jis)
    #[arg(short = 't', long = "text", value_name = "ENCODING")]
    pub text: Option<String>,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Exclude files that follow
    #[arg(short = 'x', value_name = "FILE", num_args = 1..)]
    pub exclude: Vec<String>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Overwrite files WITHOUT prompting
    #[arg(short = 'o')]
    pub overwrite: bool,

    /// Junk paths (do not make directories)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Attempts per file when the remote archive changes while reading
    #[arg(long, value_name = "N", default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub attempts: u32,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe || self.text.is_some()
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            max_attempts: self.attempts,
            ..ArchiveOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extraction_flags() {
        let cli = Cli::try_parse_from([
            "rangezip",
            "-t",
            "latin1",
            "--attempts",
            "5",
            "https://example.com/a.zip",
            "README",
            "*.txt",
        ])
        .unwrap();

        assert!(cli.is_http_url());
        assert!(cli.is_quiet());
        assert_eq!(cli.files, ["README", "*.txt"]);
        assert_eq!(cli.text.as_deref(), Some("latin1"));
        assert_eq!(cli.archive_options().max_attempts, 5);
        assert_eq!(cli.timeout, 30);
    }

    #[test]
    fn rejects_zero_attempts() {
        assert!(Cli::try_parse_from(["rangezip", "--attempts", "0", "a.zip"]).is_err());
    }
}
