//! Marginalia command line
//!
//! Fingerprints selections, builds anchors from plain-text documents and
//! relocates stored fingerprints. Output is JSON on stdout; logs go to
//! stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marginalia::anchor::{
    fingerprint, AnchorContext, Fingerprint, MatchResult, RelocationTarget, Relocator, TextAnchor,
};
use marginalia::Config;

#[derive(Parser, Debug)]
#[command(name = "marginalia", version, about = "Anchor comments to passages of plain text")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the fingerprint of a selection and its context
    Fingerprint {
        /// Selected text
        selected: String,
        #[arg(long, default_value = "")]
        before: String,
        #[arg(long, default_value = "")]
        after: String,
    },
    /// Build an anchor for a span of a document and print it as JSON
    Anchor(AnchorArgs),
    /// Find a stored fingerprint in a document
    Locate(LocateArgs),
}

#[derive(Args, Debug)]
struct AnchorArgs {
    /// Plain-text document
    #[arg(long)]
    document: PathBuf,
    /// Selected text, resolved to its first occurrence
    #[arg(long, conflicts_with_all = ["start", "end"])]
    selection: Option<String>,
    /// Start character offset
    #[arg(long, requires = "end")]
    start: Option<usize>,
    /// End character offset (exclusive)
    #[arg(long, requires = "start")]
    end: Option<usize>,
    /// Characters of context on each side
    #[arg(long, env = "MARGINALIA_CONTEXT_LENGTH")]
    context_length: Option<usize>,
}

#[derive(Args, Debug)]
struct LocateArgs {
    /// Plain-text document
    #[arg(long)]
    document: PathBuf,
    /// Stored fingerprint (64 hex characters)
    #[arg(long)]
    fingerprint: String,
    /// Snippet length; the scan window is three times this
    #[arg(long, env = "MARGINALIA_SNIPPET_LENGTH")]
    snippet_length: Option<usize>,
    /// Stored selected text, enables the quote fallback
    #[arg(long)]
    selected: Option<String>,
    /// Stored context before the selection
    #[arg(long, default_value = "")]
    before: String,
    /// Stored context after the selection
    #[arg(long, default_value = "")]
    after: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintOutput<'a> {
    fingerprint: &'a Fingerprint,
    normalized: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LocateOutput {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    placement: Option<MatchResult>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marginalia=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    let cli = Cli::parse();
    match cli.command {
        Command::Fingerprint {
            selected,
            before,
            after,
        } => {
            let fp = fingerprint(&selected, &before, &after);
            let normalized =
                marginalia::anchor::normalize(&format!("{}{}{}", selected, before, after));
            print_json(&FingerprintOutput {
                fingerprint: &fp,
                normalized,
            })?;
        }
        Command::Anchor(args) => {
            let anchor = build_anchor(&args, &config)?;
            print_json(&anchor)?;
        }
        Command::Locate(args) => {
            let placement = locate(args, &config).await?;
            let found = placement.is_some();
            print_json(&LocateOutput { found, placement })?;
            if !found {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn build_anchor(args: &AnchorArgs, config: &Config) -> anyhow::Result<TextAnchor> {
    let document = read_document(&args.document)?;
    let context_length = args.context_length.unwrap_or(config.anchor.context_length);

    let anchor = match (&args.selection, args.start, args.end) {
        (Some(selected), _, _) => TextAnchor::from_selection(selected, &document, context_length)
            .with_context(|| format!("Could not anchor {:?}", selected))?,
        (None, Some(start), Some(end)) => {
            TextAnchor::from_range(&document, start, end, context_length)
                .with_context(|| format!("Could not anchor range {}..{}", start, end))?
        }
        _ => bail!("Pass either --selection or both --start and --end"),
    };

    tracing::debug!(
        start = anchor.start_offset(),
        end = anchor.end_offset(),
        fingerprint = %anchor.fingerprint(),
        "Built anchor"
    );

    Ok(anchor)
}

async fn locate(args: LocateArgs, config: &Config) -> anyhow::Result<Option<MatchResult>> {
    let fingerprint: Fingerprint = args
        .fingerprint
        .parse()
        .context("Invalid --fingerprint")?;
    let document: Arc<str> = Arc::from(read_document(&args.document)?);

    let mut relocator_config = config.relocator();
    if let Some(snippet_length) = args.snippet_length {
        relocator_config.snippet_length = snippet_length;
    }

    let context = args.selected.map(|selected| AnchorContext {
        selected_text: selected,
        context_before: args.before,
        context_after: args.after,
    });
    // Supplying the stored quote opts into the fallback
    relocator_config.quote_fallback |= context.is_some();

    let target = RelocationTarget {
        fingerprint,
        context,
    };
    let placement = Relocator::new(relocator_config)
        .relocate(target, document)
        .await?;

    Ok(placement)
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC: &str = "The quick brown fox jumps over the lazy dog";

    fn document_file(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn anchor_args(document: PathBuf) -> AnchorArgs {
        AnchorArgs {
            document,
            selection: None,
            start: None,
            end: None,
            context_length: Some(4),
        }
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from([
            "marginalia",
            "anchor",
            "--document",
            "page.txt",
            "--start",
            "4",
            "--end",
            "9",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Anchor(ref a) if a.start == Some(4)));

        let conflict = Cli::try_parse_from([
            "marginalia",
            "anchor",
            "--document",
            "page.txt",
            "--selection",
            "fox",
            "--start",
            "4",
            "--end",
            "9",
        ]);
        assert!(conflict.is_err());
    }

    #[test]
    fn test_anchor_from_selection_file() {
        let file = document_file(DOC);
        let mut args = anchor_args(file.path().to_path_buf());
        args.selection = Some("brown".to_string());

        let anchor = build_anchor(&args, &Config::default()).unwrap();
        assert_eq!(anchor.start_offset(), 10);
        assert_eq!(anchor.end_offset(), 15);
        assert_eq!(anchor.context_before(), "ick ");
        assert_eq!(anchor.context_after(), " fox");
    }

    #[test]
    fn test_anchor_requires_a_span() {
        let file = document_file(DOC);
        let args = anchor_args(file.path().to_path_buf());
        assert!(build_anchor(&args, &Config::default()).is_err());
    }

    #[test]
    fn test_missing_document() {
        let args = anchor_args(PathBuf::from("/nonexistent/marginalia/page.txt"));
        let err = read_document(&args.document).unwrap_err();
        assert!(err.to_string().contains("Failed to read document"));
    }

    #[tokio::test]
    async fn test_locate_exact_and_fallback() {
        let file = document_file(DOC);
        let fp = fingerprint("quick brown fox", "", "");

        let exact = locate(
            LocateArgs {
                document: file.path().to_path_buf(),
                fingerprint: fp.to_string(),
                snippet_length: Some(5),
                selected: None,
                before: String::new(),
                after: String::new(),
            },
            &Config::default(),
        )
        .await
        .unwrap();
        assert_eq!(exact, Some(MatchResult::exact(4)));

        let reflowed = document_file("The quick\nbrown fox jumps over the lazy dog");
        let anchor = TextAnchor::from_range(DOC, 10, 15, 4).unwrap();
        let approximate = locate(
            LocateArgs {
                document: reflowed.path().to_path_buf(),
                fingerprint: anchor.fingerprint().to_string(),
                snippet_length: Some(5),
                selected: Some(anchor.selected_text().to_string()),
                before: anchor.context_before().to_string(),
                after: anchor.context_after().to_string(),
            },
            &Config::default(),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(approximate.selection.is_some());
    }

    #[tokio::test]
    async fn test_locate_rejects_bad_fingerprint() {
        let file = document_file(DOC);
        let result = locate(
            LocateArgs {
                document: file.path().to_path_buf(),
                fingerprint: "not-hex".to_string(),
                snippet_length: None,
                selected: None,
                before: String::new(),
                after: String::new(),
            },
            &Config::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
