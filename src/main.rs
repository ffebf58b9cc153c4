//! folio - EPUB inspection CLI

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use folio::{BookSession, load_book};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Inspect EPUB books", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio info book.epub          Show metadata and chapter summary
    folio info --json book.epub   Metadata as JSON
    folio toc book.epub           List readable chapters
    folio chapter book.epub 3     Dump rewritten markup for chapter 3")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show book metadata
    Info {
        /// EPUB file
        input: String,

        /// Emit metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the readable chapters in reading order
    Toc {
        /// EPUB file
        input: String,
    },

    /// Print one chapter's display markup (1-based index)
    Chapter {
        /// EPUB file
        input: String,

        /// Chapter number
        number: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Info { input, json } => show_info(&input, json),
        Command::Toc { input } => show_toc(&input),
        Command::Chapter { input, number } => show_chapter(&input, number),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn open(path: &str) -> Result<BookSession, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{path}: {e}"))?;
    load_book(&bytes).map_err(|e| e.to_string())
}

fn show_info(path: &str, json: bool) -> Result<(), String> {
    let session = open(path)?;
    let meta = session.metadata();

    if json {
        let rendered = serde_json::to_string_pretty(meta).map_err(|e| e.to_string())?;
        println!("{rendered}");
        return Ok(());
    }

    println!("File: {path}");
    println!("Title: {}", meta.title);
    println!("Author: {}", meta.creator);
    println!("Language: {}", meta.language);
    if !meta.identifier.is_empty() {
        println!("Identifier: {}", meta.identifier);
    }
    println!(
        "Cover: {}",
        if meta.cover_url.is_some() {
            "extracted"
        } else {
            "none"
        }
    );
    println!("Chapters: {}", session.chapter_count());

    Ok(())
}

fn show_toc(path: &str) -> Result<(), String> {
    let session = open(path)?;

    for (index, chapter) in session.chapters().iter().enumerate() {
        println!("{:3}. {}", index + 1, chapter.title);
    }

    Ok(())
}

fn show_chapter(path: &str, number: usize) -> Result<(), String> {
    let session = open(path)?;

    if number == 0 || number > session.chapter_count() {
        return Err(format!(
            "chapter {number} out of range (book has {} chapters)",
            session.chapter_count()
        ));
    }

    match session.chapter_html(number - 1) {
        Some(html) => {
            println!("{html}");
            Ok(())
        }
        None => Err(format!("chapter {number} not available")),
    }
}
