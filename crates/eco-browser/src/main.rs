//! EcoConsciência headless browser
//!
//! Opens a site (an http(s) URL or a local directory), then follows each
//! extra path the way a visitor would: by clicking a matching link when the
//! page has one, by navigating directly otherwise.
//!
//! ```text
//! eco-browser <start-url-or-site-dir> [path ...] [--config site.toml] [--storage state.json] [--dark]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use eco_engine::{
    JsonFileStorage, MemoryStorage, NodeId, Page, Session, SiteConfig, Storage, link_target,
};
use eco_net::{DirFetcher, Fetcher, HttpFetcher};
use tracing_subscriber::EnvFilter;
use url::Url;

const USAGE: &str =
    "Usage: eco-browser <start-url-or-site-dir> [path ...] [--config <toml>] [--storage <json>] [--dark]";

/// Origin local site directories are served from
const LOCAL_ORIGIN: &str = "http://localhost/";

#[derive(Debug, Default, PartialEq)]
struct Args {
    start: String,
    paths: Vec<String>,
    config: Option<PathBuf>,
    storage: Option<PathBuf>,
    dark: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut start = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--storage" => {
                let path = args.next().context("--storage needs a path")?;
                parsed.storage = Some(PathBuf::from(path));
            }
            "--dark" => parsed.dark = true,
            flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{USAGE}"),
            _ if start.is_none() => start = Some(arg),
            _ => parsed.paths.push(arg),
        }
    }

    parsed.start = start.context(USAGE)?;
    Ok(parsed)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    tracing::info!("EcoConsciência browser starting...");

    let config = match &args.config {
        Some(path) => SiteConfig::load(path).with_context(|| format!("Loading {}", path.display()))?,
        None => SiteConfig::default(),
    };
    let storage: Box<dyn Storage> = match &args.storage {
        Some(path) => Box::new(
            JsonFileStorage::open(path).with_context(|| format!("Opening {}", path.display()))?,
        ),
        None => Box::new(MemoryStorage::new()),
    };

    if args.start.starts_with("http://") || args.start.starts_with("https://") {
        let start = Url::parse(&args.start).with_context(|| format!("Invalid URL {}", args.start))?;
        run(HttpFetcher::new()?, start, &args, storage, config)
    } else {
        let root = PathBuf::from(&args.start);
        if !root.is_dir() {
            bail!("{} is neither a URL nor a directory\n{USAGE}", root.display());
        }
        let origin = Url::parse(LOCAL_ORIGIN)?;
        let start = origin.join("index.html")?;
        tracing::info!("Serving {} as {}", root.display(), origin);
        run(DirFetcher::new(root, origin), start, &args, storage, config)
    }
}

fn run<F: Fetcher>(
    fetcher: F,
    start: Url,
    args: &Args,
    storage: Box<dyn Storage>,
    config: SiteConfig,
) -> Result<()> {
    let mut session = Session::open_with(fetcher, start, storage, config, args.dark)?;
    session.settle()?;
    report(session.page_mut());

    for path in &args.paths {
        let target = session
            .page()
            .url()
            .join(path)
            .with_context(|| format!("Invalid path {path}"))?;
        let page = session.page_mut();
        match find_link(page, &target) {
            Some(link) => {
                tracing::debug!("Clicking link to {}", target);
                page.click(link);
            }
            None => page.navigate_to(target),
        }
        session.settle()?;
        report(session.page_mut());
    }

    tracing::info!("{} full page load(s)", session.full_loads());
    Ok(())
}

/// First link on the page the navigator would take to `target`
fn find_link(page: &Page, target: &Url) -> Option<NodeId> {
    let doc = page.document();
    doc.query_selector_all("a[href]")
        .into_iter()
        .find(|&link| link_target(doc, page.url(), link).as_ref() == Some(target))
}

fn report(page: &mut Page) {
    println!("{}\t{}", page.url(), page.title());
    for notice in page.take_notices() {
        println!("  {}", notice.message());
    }
}
