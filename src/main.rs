//! chapters: select and cycle chapters of a markdown outline from the command line.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use outline_chapters::{config, import, ChapterRegistry, ChapterReport, OutlineStore};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chapters")]
#[command(about = "Named, hoisted views over a markdown outline", long_about = None)]
struct Args {
    /// Markdown document to load as an outline
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Chapter command to run, in order (chapter-next, chapter-back, chapter-select-NAME)
    #[arg(long, short = 'c', value_name = "COMMAND")]
    command: Vec<String>,

    /// Move the cursor to the first node with this headline and follow it into its chapter
    #[arg(long, value_name = "HEADLINE")]
    follow: Option<String>,

    /// Chapter to try first when following
    #[arg(long, value_name = "NAME", requires = "follow")]
    prefer: Option<String>,

    /// Include emitted notifications in the report
    #[arg(long)]
    events: bool,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let cfg = config::Config::load();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let accepted = args
        .path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| cfg.file_extensions.iter().any(|e| e == ext));
    if !accepted {
        eprintln!(
            "Not a supported document (expected one of: {})",
            cfg.file_extensions.join(", ")
        );
        return Ok(());
    }

    let mut outline = import::outline_from_path(&args.path).map_err(io::Error::other)?;
    let registry = ChapterRegistry::new(cfg);
    registry
        .finish_create(&mut outline)
        .map_err(io::Error::other)?;
    if !registry.find_any_chapter_node(&outline) {
        eprintln!("No @chapter headings found; only main is available");
    }

    for command in &args.command {
        if let Err(e) = registry.dispatch(&mut outline, command) {
            eprintln!("Error: {e}");
        }
    }

    if let Some(headline) = &args.follow {
        match outline.find_by_headline(headline) {
            Some(p) => {
                outline.set_current_position(&p);
                if args.prefer.is_some() {
                    registry.select_for_position(&mut outline, &p, args.prefer.as_deref());
                } else {
                    let name = registry.find_name_for_position(&outline, &p);
                    if let Err(e) = registry.select(&mut outline, name.as_str()) {
                        eprintln!("Error: {e}");
                    }
                }
            }
            None => eprintln!("No node with headline: {headline}"),
        }
    }

    let events = if args.events {
        outline.take_events()
    } else {
        Vec::new()
    };
    let report = ChapterReport::capture(&registry, &outline, events);
    let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}
