use clap::Parser;
use tracing_subscriber::EnvFilter;

use harvester::cli::{Cli, Commands};
use harvester::config::Config;
use harvester::domain::{timestamp, ArticleId, OutletCode};
use harvester::errors::HarvestResult;
use harvester::services::{parse_cutoff, ArticleExtractor, ArticleLocator, HarvestService, StopReason};
use harvester::sources::{build_client, HttpPageFetcher, SummaryEnricher};
use harvester::storage::sqlite::{SqliteArticleRepository, SqliteCursorRepository, SqliteStorage};

type Service = HarvestService<
    SqliteArticleRepository,
    SqliteCursorRepository,
    HttpPageFetcher,
    SummaryEnricher,
>;

fn main() {
    init_tracing();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> HarvestResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize storage
    let storage = SqliteStorage::new(&config.db_path)?;

    // One client shared by every component
    let client = build_client(&config)?;
    let fetcher = HttpPageFetcher::new(client.clone());

    let service = HarvestService::new(
        SqliteArticleRepository::new(storage.clone()),
        SqliteCursorRepository::new(storage),
        ArticleLocator::new(fetcher.clone(), &config.media_base_url),
        ArticleExtractor::new(
            fetcher,
            SummaryEnricher::new(client, &config),
            &config.news_base_url,
        ),
    )
    .with_retry_delay(config.retry_delay)
    .with_not_found_limit(config.not_found_limit);

    match cli.command {
        Commands::Locate { outlet } => cmd_locate(&service, OutletCode(outlet)),
        Commands::Article { outlet, id } => cmd_article(&service, OutletCode(outlet), ArticleId(id)),
        Commands::Crawl {
            outlet,
            start,
            cutoff,
            dry_run,
        } => cmd_crawl(&service, OutletCode(outlet), start.map(ArticleId), cutoff, dry_run),
        Commands::Cursors => cmd_cursors(&service),
        Commands::Show { id } => cmd_show(&service, id),
        Commands::Recent { outlet, limit } => cmd_recent(&service, OutletCode(outlet), limit),
    }
}

fn cmd_locate(service: &Service, outlet: OutletCode) -> HarvestResult<()> {
    let id = service.locate_latest(outlet);
    println!("Newest article for outlet {}: {}", outlet, id);
    Ok(())
}

fn cmd_article(service: &Service, outlet: OutletCode, id: ArticleId) -> HarvestResult<()> {
    let article = service.article(outlet, id)?;
    println!("{}", serde_json::to_string_pretty(&article)?);
    Ok(())
}

fn cmd_crawl(
    service: &Service,
    outlet: OutletCode,
    start: Option<ArticleId>,
    cutoff: Option<String>,
    dry_run: bool,
) -> HarvestResult<()> {
    let cutoff = cutoff.unwrap_or_else(timestamp::portal_now);
    parse_cutoff(&cutoff)?;

    println!("Crawling outlet {} up to {}...\n", outlet, cutoff);

    let report = if dry_run {
        let start = service.resume_point(outlet, start)?;
        service.crawl(outlet, start, &cutoff)?
    } else {
        service.harvest(outlet, start, &cutoff)?
    };

    for article in &report.articles {
        let published = article.published_at.as_deref().unwrap_or("unknown time");
        if dry_run {
            println!("  [DRY RUN] {} [{}] {}", article.article_id, published, article.title);
        } else {
            println!("  {} [{}] {}", article.article_id, published, article.title);
        }
    }
    println!();

    match &report.stop {
        StopReason::CutoffReached => println!("Reached the cutoff."),
        StopReason::Aborted { article_id, detail } => {
            println!("Stopped at article {}: {}", article_id, detail)
        }
        StopReason::NotFoundLimit { first_missing } => {
            println!("No articles found from {} onwards.", first_missing)
        }
    }

    if dry_run {
        println!(
            "Dry run complete. Would store {} articles; next article {}.",
            report.articles.len(),
            report.next_article_id
        );
    } else {
        println!(
            "Stored {} articles; next article {}.",
            report.articles.len(),
            report.next_article_id
        );
    }

    Ok(())
}

fn cmd_cursors(service: &Service) -> HarvestResult<()> {
    let cursors = service.cursors()?;

    if cursors.is_empty() {
        println!("No cursors stored.");
        return Ok(());
    }

    println!("Outlet cursors:\n");
    for cursor in cursors {
        println!("  {}  next article {}", cursor.outlet_code, cursor.last_article_id);
    }

    Ok(())
}

fn cmd_show(service: &Service, id: i64) -> HarvestResult<()> {
    let article = service.stored_article(id)?;
    println!("{}", serde_json::to_string_pretty(&article)?);
    Ok(())
}

fn cmd_recent(service: &Service, outlet: OutletCode, limit: u32) -> HarvestResult<()> {
    let articles = service.recent(outlet, limit)?;

    if articles.is_empty() {
        println!("No articles stored for outlet {}.", outlet);
        return Ok(());
    }

    for article in articles {
        let published = article.published_at.as_deref().unwrap_or("unknown time");
        println!("  {} [{}] {}", article.article_id, published, article.title);
    }

    Ok(())
}
