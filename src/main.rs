//! enorg - Fast ENEX to Org-mode converter

use std::process::ExitCode;

use clap::Parser;

use enorg::{convert, notes};

#[derive(Parser)]
#[command(name = "enorg")]
#[command(version, about = "Fast ENEX to Org-mode converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    enorg notes.enex out/         Convert an export into out/notes.org
    enorg -i notes.enex           List the notes in an export
    enorg -i --json notes.enex    Same listing, as JSON")]
struct Cli {
    /// Input file (.enex export)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output directory to create
    #[arg(value_name = "OUTPUT_DIR", required_unless_present = "info")]
    output_dir: Option<String>,

    /// List the archive's notes without converting
    #[arg(short, long)]
    info: bool,

    /// Emit the listing as JSON
    #[arg(long, requires = "info")]
    json: bool,

    /// Suppress the conversion summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = if cli.info {
        show_info(&cli.input, cli.json)
    } else {
        let output_dir = cli.output_dir.expect("output dir required");
        run_convert(&cli.input, &output_dir, cli.quiet)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[derive(serde::Serialize)]
struct NoteInfo {
    title: String,
    tags: Vec<String>,
    attachments: usize,
    source_url: Option<String>,
}

fn show_info(path: &str, json: bool) -> Result<(), String> {
    let mut infos = Vec::new();
    for raw in notes(path).map_err(|e| e.to_string())? {
        let raw = raw.map_err(|e| e.to_string())?;
        infos.push(NoteInfo {
            title: raw.title,
            tags: raw.tags,
            attachments: raw.attachments.len(),
            source_url: raw.source_url,
        });
    }

    if json {
        let rendered = serde_json::to_string_pretty(&infos).map_err(|e| e.to_string())?;
        println!("{rendered}");
        return Ok(());
    }

    println!("File: {path}");
    println!("Notes: {}", infos.len());
    for info in &infos {
        let tags = if info.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", info.tags.join(", "))
        };
        let clipped = if info.source_url.is_some() {
            " (web clip)"
        } else {
            ""
        };
        println!(
            "  {}{} - {} attachments{}",
            info.title, tags, info.attachments, clipped
        );
    }
    Ok(())
}

fn run_convert(input: &str, output_dir: &str, quiet: bool) -> Result<(), String> {
    let summary = convert(input, output_dir).map_err(|e| e.to_string())?;
    if !quiet {
        println!(
            "Converted {} notes ({} attachments) into {}",
            summary.notes, summary.attachments, output_dir
        );
    }
    Ok(())
}
