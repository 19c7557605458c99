//! rgview - stream ripgrep matches to the terminal with highlighting.
//!
//! Thin presentation shell over the search pipeline: builds a spec from CLI
//! flags, submits it to a [`SearchSession`] and renders the event stream.
//! Ctrl-C cancels the running search.

use anyhow::{Context, Result};
use clap::Parser;

use rgview::cli::Cli;
use rgview::search::highlight::{compute_spans, segments};
use rgview::search::session::SearchSession;
use rgview::tool::resolve_search_tool;
use rgview::types::{ResultRecord, SearchEvent, SearchOutcome, SearchSpec};

const FILE_COLOR: &str = "\x1b[1;34m";
const LINE_COLOR: &str = "\x1b[32m";
const MATCH_COLOR: &str = "\x1b[43;30m";
const ERROR_COLOR: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let spec = cli.to_spec();

    let program = resolve_search_tool();
    log::debug!("search tool: {}", program.display());

    let mut session = SearchSession::new(program);
    let mut events = session
        .submit(spec.clone())
        .await
        .context("invalid search request")?;

    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("interrupt received, cancelling search");
                session.cancel().await;
            }
            event = events.recv() => {
                match event {
                    Some(SearchEvent::Record(record)) => render_record(&cli, &spec, &record)?,
                    Some(SearchEvent::StderrNotice(notice)) => render_error(&cli, &notice),
                    Some(SearchEvent::Finished(outcome)) => break outcome,
                    None => break SearchOutcome::Cancelled,
                }
            }
        }
    };

    match outcome {
        SearchOutcome::Completed { exit_code } => {
            if exit_code.unwrap_or(0) != 0 {
                eprintln!("no matches found");
            }
            Ok(())
        }
        SearchOutcome::Errored { message } => Err(anyhow::anyhow!(message)),
        SearchOutcome::Cancelled => {
            eprintln!("search cancelled");
            Ok(())
        }
    }
}

fn render_record(cli: &Cli, spec: &SearchSpec, record: &ResultRecord) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string(record)?);
        return Ok(());
    }
    match record {
        // Context only; every match line repeats its file path.
        ResultRecord::FileHeader { .. } => {}
        ResultRecord::MatchLine {
            file,
            line,
            content,
        } => {
            print_location(cli, file, Some(*line));
            print_content(cli, spec, content);
        }
        ResultRecord::PlainLine { file, content } => {
            print_location(cli, file, None);
            print_content(cli, spec, content);
        }
        ResultRecord::ErrorLine { message } => render_error(cli, message),
    }
    Ok(())
}

fn render_error(cli: &Cli, message: &str) {
    if cli.no_color {
        eprintln!("{}", message);
    } else {
        eprintln!("{}{}{}", ERROR_COLOR, message, RESET);
    }
}

fn print_location(cli: &Cli, file: &str, line: Option<u32>) {
    if cli.no_color {
        match line {
            Some(number) => print!("{}:{}:", file, number),
            None => print!("{}:", file),
        }
        return;
    }
    print!("{}{}{}:", FILE_COLOR, file, RESET);
    if let Some(number) = line {
        print!("{}{}{}:", LINE_COLOR, number, RESET);
    }
}

fn print_content(cli: &Cli, spec: &SearchSpec, content: &str) {
    if cli.no_color {
        println!("{}", content);
        return;
    }
    let spans = compute_spans(content, &spec.pattern, spec.case_sensitive, spec.mode);
    for (highlighted, piece) in segments(content, &spans) {
        if highlighted {
            print!("{}{}{}", MATCH_COLOR, piece, RESET);
        } else {
            print!("{}", piece);
        }
    }
    println!();
}
