mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, SectionsArgs, SummarizeArgs, ValidateArgs};
use paper_digest::{
    load_document, ContentFetcher, DigestError, DigestReport, HttpSummarizer, PageParser,
    PageTextSource, Result, SectionName, SectionOutcome, SectionSummarizer, Segmenter,
    SummarizerConfig,
};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let result = match &cli.command {
        Commands::Summarize(args) => handle_summarize_command(args).await,
        Commands::Sections(args) => handle_sections_command(args).await,
        Commands::Validate(args) => handle_validate_command(args).await,
    };

    if let Err(e) = result {
        error!("Operation failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_summarize_command(args: &SummarizeArgs) -> Result<()> {
    let config = SummarizerConfig {
        min_length: args.min_length,
        max_length: args.max_length,
        max_input_chars: args.max_input_chars,
        timeout: Duration::from_secs(args.timeout_secs),
        concurrent: args.concurrent,
        endpoint: args.endpoint.clone(),
        model: args.model.clone(),
        api_token: args.api_token.clone(),
        num_beams: Some(args.num_beams),
        length_penalty: Some(args.length_penalty),
        no_repeat_ngram_size: Some(args.no_repeat_ngram_size),
    };

    // Reject bad settings before touching the input or the network
    let service = HttpSummarizer::new(&config)?;
    let summarizer = SectionSummarizer::new(service, config)?;

    let document = load_document(&args.source, args.page_marker.as_deref()).await?;
    info!(
        "Loaded '{}' with {} pages",
        document.source,
        document.page_count()
    );

    let sections = Segmenter::new()?.segment(&document);
    let report = summarizer
        .summarize_document(&document.source, &document, &sections)
        .await;

    print_report(&report);

    if let Some(json_path) = &args.json_output {
        write_json(json_path, &report).await?;
    }

    let failures = report.failure_count();
    if failures > 0 {
        return Err(DigestError::Summarization {
            reason: format!("{} of {} sections could not be summarized", failures, SectionName::ALL.len()),
        });
    }

    Ok(())
}

fn print_report(report: &DigestReport) {
    let mut printed = 0;

    for result in &report.results {
        match &result.outcome {
            SectionOutcome::Summarized { range, summary } => {
                println!("\n=== {} Summary (pages {}-{}) ===", result.section, range.start + 1, range.end);
                println!("{}", summary);
                printed += 1;
            }
            SectionOutcome::Failed { range, error } => {
                println!("\n=== {} Summary (pages {}-{}) ===", result.section, range.start + 1, range.end);
                println!("[unavailable] {}", error);
            }
            SectionOutcome::Omitted { .. } => {}
        }
    }

    if printed == 0 && report.failure_count() == 0 {
        println!("\nNo introduction, methodology or conclusion found in '{}'.", report.source);
    }
}

async fn handle_sections_command(args: &SectionsArgs) -> Result<()> {
    let parser = PageParser::new(args.page_marker.as_deref())?;
    let (content, metadata) = ContentFetcher::fetch_content(&args.source).await?;
    let document = parser.parse_document(&content, metadata)?;
    let stats = parser.get_parsing_stats(&document);

    let segmenter = Segmenter::new()?;
    let hits = segmenter.collect_hits(&document);
    let sections = hits.to_section_map();

    println!("\n=== Sections in '{}' ===", document.source);
    println!("Total pages: {}", document.page_count());
    if let Some(empty) = stats.get("empty_pages") {
        println!("Pages without text: {}", empty.as_u64().unwrap_or(0));
    }
    if let Some(avg_chars) = stats.get("avg_chars_per_page") {
        println!("Average characters per page: {:.1}", avg_chars.as_f64().unwrap_or(0.0));
    }

    println!();
    for section in SectionName::ALL {
        match sections.range(section, document.page_count()) {
            Some(range) if !range.is_empty() => {
                println!("  {}: pages {}-{}", section, range.start + 1, range.end)
            }
            Some(range) => println!("  {}: starts on page {} (empty range)", section, range.start + 1),
            None => println!("  {}: not found", section),
        }

        if args.detailed {
            let keywords = segmenter.keywords(section);
            if !keywords.is_empty() {
                println!("    keywords: {}", keywords.join(", "));
            }

            let pages: Vec<String> = hits.pages(section).iter().map(|p| (p + 1).to_string()).collect();
            if !pages.is_empty() {
                println!("    matched on pages: {}", pages.join(", "));
            }
        }
    }

    if let Some(json_path) = &args.json_output {
        let analysis = serde_json::json!({
            "source": document.source,
            "metadata": document.metadata,
            "stats": stats,
            "sections": sections,
            "hits": hits,
        });
        write_json(json_path, &analysis).await?;
    }

    Ok(())
}

async fn handle_validate_command(args: &ValidateArgs) -> Result<()> {
    info!("Validating {} sources", args.sources.len());

    let mut valid_sources = Vec::new();
    let mut invalid_sources = Vec::new();

    for source in &args.sources {
        match ContentFetcher::validate_sources(&[source.clone()]).await {
            Ok(_) => {
                info!("✓ Valid: {}", source);
                valid_sources.push(source);

                if args.check_access {
                    match load_document(source, None).await {
                        Ok(document) => {
                            info!("  Readable, {} pages found", document.page_count());
                        }
                        Err(e) => {
                            error!("  Cannot read document: {}", e);
                            invalid_sources.push((source, format!("Access error: {}", e)));
                        }
                    }
                }
            }
            Err(e) => {
                error!("✗ Invalid: {} - {}", source, e);
                invalid_sources.push((source, e.to_string()));
            }
        }
    }

    println!("\n=== Validation Summary ===");
    println!("Valid sources: {}/{}", valid_sources.len(), args.sources.len());

    if !invalid_sources.is_empty() {
        println!("Invalid sources:");
        let invalid_count = invalid_sources.len();
        for (source, error) in invalid_sources {
            println!("  - {}: {}", source, error);
        }
        return Err(DigestError::InputFailure {
            reason: format!("{} sources failed validation", invalid_count),
        });
    }

    println!("All sources are valid!");
    Ok(())
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json_content =
        serde_json::to_string_pretty(value).context("Failed to serialize report")?;

    tokio::fs::write(path, json_content)
        .await
        .context("Failed to write JSON report")?;

    info!("Report written to: {}", path.display());
    Ok(())
}
