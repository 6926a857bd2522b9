//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Upload a browser extension package to the Chrome Web Store.
///
/// Credentials and the target item are read from CLIENT_ID, CLIENT_SECRET,
/// REFRESH_TOKEN, EXTENSION_ID and FILE_PATH (a `.env` file is honored).
/// Set PUBLISH=true or pass --publish to request publication after upload.
#[derive(Parser, Debug)]
#[command(name = "webstore-publish")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Publish after a successful upload (overrides PUBLISH)
    #[arg(short, long)]
    pub publish: bool,

    /// Package to upload (overrides FILE_PATH)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Per-request timeout in seconds (1-300)
    #[arg(short = 't', long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["webstore-publish"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.publish);
        assert!(args.file.is_none());
        assert_eq!(args.timeout_secs, 30);
    }

    #[test]
    fn test_cli_overrides_parse() {
        let args = Args::try_parse_from([
            "webstore-publish",
            "-vv",
            "--publish",
            "--file",
            "dist/ext.zip",
            "-t",
            "5",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        assert!(args.publish);
        assert_eq!(args.file, Some(PathBuf::from("dist/ext.zip")));
        assert_eq!(args.timeout_secs, 5);
    }

    #[test]
    fn test_cli_timeout_out_of_range_rejected() {
        assert!(Args::try_parse_from(["webstore-publish", "-t", "0"]).is_err());
        assert!(Args::try_parse_from(["webstore-publish", "-t", "301"]).is_err());
    }
}
