use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser};
use dlorg_cache::CachedFetcher;
use dlorg_extract::models::WorkId;
use dlorg_fetch::{DlsiteFetcher, Endpoints, Fetcher, HttpPageSource};
use dlorg_library::organize::{self, Plan};
use dlorg_library::{Depth, PathGenerator, WorkFolder, scan};
use dlorg_storage::backend::{LocalBackend, StorageBackend};
use exn::{Frame, ResultExt};
use futures::TryStreamExt;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// Rename downloaded DLsite work folders after their storefront metadata.
#[derive(Debug, Parser)]
#[command(name = "dlorg", version, about)]
pub struct Cli {
    /// Directory containing the work folders.
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Print the planned renames instead of performing them.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Look for work folders at every depth, not just directly under ROOT.
    #[arg(short, long)]
    pub all: bool,

    /// Configuration file to use instead of the default location.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fetch metadata again even for works that are already cached.
    #[arg(long)]
    pub refresh: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn depth(&self) -> Depth {
        if self.all { Depth::Recursive } else { Depth::TopLevel }
    }

    /// Returns `false` when some renames could not be carried out.
    pub async fn run(&self, out: &mut impl Write) -> Result<bool> {
        let config = dlorg_config::load(self.config.as_deref()).or_raise(|| ErrorKind::Config)?;
        dlorg_config::validate(&config).or_raise(|| ErrorKind::Config)?;
        let generator = config.template.parse::<PathGenerator>().or_raise(|| ErrorKind::Config)?;

        let root = std::path::absolute(&self.root).or_raise(|| ErrorKind::Root(self.root.clone()))?;
        let backend = LocalBackend::new("library", &root).or_raise(|| ErrorKind::Root(root.clone()))?;

        let source =
            HttpPageSource::new(config.http.timeout(), &config.http.user_agent).or_raise(|| ErrorKind::Client)?;
        let fetcher = DlsiteFetcher::new(source, Endpoints::from(&config.endpoints));

        let mut cache = CachedFetcher::new(&config.cache_path, fetcher);
        cache.open().await.or_raise(|| ErrorKind::Cache)?;
        let result = self.organize(&cache, &generator, &backend, out).await;
        cache.close().await;
        result
    }

    async fn organize<F: Fetcher>(
        &self,
        cache: &CachedFetcher<F>,
        generator: &PathGenerator,
        backend: &dyn StorageBackend,
        out: &mut impl Write,
    ) -> Result<bool> {
        let works: Vec<WorkFolder> =
            scan(backend, self.depth()).try_collect().await.or_raise(|| ErrorKind::Discovery)?;
        info!(count = works.len(), "discovered work folders");

        if self.refresh {
            let ids: BTreeSet<&WorkId> = works.iter().map(|work| &work.id).collect();
            for id in ids {
                match cache.refresh(id).await {
                    Ok(_) => {},
                    // The stored entry (if any) survives a failed refresh.
                    Err(error) if error.is_item_failure() => warn!(%id, %error, "could not refresh metadata"),
                    Err(error) => return Err(error.raise(ErrorKind::Cache)),
                }
            }
        }

        let plan = organize::plan(&works, cache, generator, backend).await.or_raise(|| ErrorKind::Plan)?;
        if self.dry_run {
            print_plan(&plan, out).or_raise(|| ErrorKind::Output)?;
            return Ok(true);
        }

        let report = organize::execute(&plan, backend).await;
        Ok(report.is_success())
    }
}

/// One line per planned rename, then one per work that was skipped.
fn print_plan(plan: &Plan, out: &mut impl Write) -> std::io::Result<()> {
    for rename in &plan.renames {
        writeln!(out, "rename: {} -> {}", rename.source.display(), rename.destination.display())?;
    }
    for failure in &plan.failures {
        writeln!(out, "skip: {} ({})", failure.source.display(), reason(failure.error.frame()))?;
    }
    Ok(())
}

/// The failure itself, followed by its innermost cause when there is one.
fn reason(frame: &Frame) -> String {
    let mut cause = frame;
    while let Some(child) = cause.children().first() {
        cause = child;
    }
    if std::ptr::eq(cause, frame) { frame.to_string() } else { format!("{frame}: {cause}") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlorg_cache::error::ErrorKind as CacheErrorKind;
    use dlorg_fetch::error::ErrorKind as FetchErrorKind;
    use dlorg_library::organize::error::ErrorKind as OrganizeErrorKind;
    use dlorg_library::organize::{PlanFailure, Rename};
    use exn::Exn;
    use rstest::rstest;

    #[rstest]
    #[case::defaults(&["dlorg"], Depth::TopLevel, false)]
    #[case::all(&["dlorg", "-a"], Depth::Recursive, false)]
    #[case::long_flags(&["dlorg", "--all", "--dry-run", "/srv/works"], Depth::Recursive, true)]
    #[case::short_dry_run(&["dlorg", "-n"], Depth::TopLevel, true)]
    fn test_parse(#[case] args: &[&str], #[case] depth: Depth, #[case] dry_run: bool) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.depth(), depth);
        assert_eq!(cli.dry_run, dry_run);
    }

    #[test]
    fn test_parse_root_and_options() {
        let cli = Cli::try_parse_from(["dlorg", "-vv", "--refresh", "-c", "alt.toml", "downloads"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("downloads"));
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(cli.refresh);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_root_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["dlorg"]).unwrap();
        assert_eq!(cli.root, PathBuf::from("."));
    }

    /// Builds the error tree the planner records for a failed lookup.
    fn fetch_failure(id: &str, kind: FetchErrorKind) -> PlanFailure {
        let error = Exn::from(kind.clone()).raise(CacheErrorKind::Fetch(kind)).raise(OrganizeErrorKind::Fetch);
        PlanFailure {
            source: id.into(),
            id: id.parse().unwrap(),
            error,
        }
    }

    #[test]
    fn test_print_plan() {
        let plan = Plan {
            renames: vec![Rename {
                source: "RJ123456".into(),
                destination: "RJ123456 [Bar] Foo".into(),
                id: "RJ123456".parse().unwrap(),
            }],
            failures: vec![PlanFailure {
                source: "RJ777777".into(),
                id: "RJ777777".parse().unwrap(),
                error: OrganizeErrorKind::Conflict.into(),
            }],
        };
        let mut out = Vec::new();
        print_plan(&plan, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "rename: RJ123456 -> RJ123456 [Bar] Foo\nskip: RJ777777 (no free destination)\n"
        );
    }

    #[rstest]
    #[case::not_found(
        FetchErrorKind::NotFound("RJ999999".parse().unwrap()),
        "skip: RJ999999 (could not resolve metadata: work not found: RJ999999)\n"
    )]
    #[case::network(
        FetchErrorKind::Network("connection reset".to_string()),
        "skip: RJ999999 (could not resolve metadata: network error: connection reset)\n"
    )]
    fn test_print_plan_names_the_cause(#[case] kind: FetchErrorKind, #[case] expected: &str) {
        let plan = Plan {
            renames: Vec::new(),
            failures: vec![fetch_failure("RJ999999", kind)],
        };
        let mut out = Vec::new();
        print_plan(&plan, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
