use clap::Parser;
use domainparts::{Error, List, Policy};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Resolve a host's registrable domain against the Public Suffix List.
#[derive(Parser)]
#[command(name = "domainparts", version, about)]
struct Args {
    /// Host name to resolve.
    host: String,

    /// Which PSL sections to consult (cookie, icann or private).
    #[arg(long, default_value_t = Policy::Cookie)]
    policy: Policy,

    /// Read the list from a local file instead of fetching it.
    #[arg(long, value_name = "FILE")]
    list: Option<PathBuf>,

    /// URL to fetch the list from.
    #[cfg(feature = "fetch")]
    #[arg(long, value_name = "URL", default_value = domainparts::PUBLIC_SUFFIX_LIST_URL)]
    url: String,

    /// Directory for cached rule snapshots.
    #[cfg(feature = "fetch")]
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Verbose logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(registrable) => {
            println!("{registrable}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("domainparts: {err}");
            match err {
                Error::UnableToResolveDomain { .. } | Error::UnableToResolveSubDomain => {
                    ExitCode::from(1)
                }
                _ => ExitCode::from(2),
            }
        }
    }
}

fn run(args: &Args) -> Result<String, Error> {
    let list = load_list(args)?;
    let resolved = list.resolve_str(&args.host, args.policy)?;
    debug!(
        suffix = %resolved.suffix(),
        section = ?resolved.suffix().section(),
        "resolved"
    );
    resolved
        .registrable_domain()
        .and_then(|host| host.content())
        .ok_or(Error::UnableToResolveDomain {
            host: Some(args.host.clone()),
        })
}

#[cfg(feature = "fetch")]
fn load_list(args: &Args) -> Result<List, Error> {
    use domainparts::cache::FsCache;
    use std::time::Duration;

    if let Some(path) = &args.list {
        return List::from_file(path);
    }
    let dir = args
        .cache_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("domainparts"));
    let cache = FsCache::new(dir, Duration::from_secs(24 * 60 * 60));
    List::from_url_cached(&args.url, &cache)
}

#[cfg(not(feature = "fetch"))]
fn load_list(args: &Args) -> Result<List, Error> {
    match &args.list {
        Some(path) => List::from_file(path),
        None => Err(Error::UnableToLoadPublicSuffixList(
            "built without the fetch feature; pass --list <FILE>".into(),
        )),
    }
}
