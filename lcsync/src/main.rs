use anyhow::Context;
use lcsync::config::{self, ProfileConfig};
use lcsync::events::TracingSink;
use lcsync::sync::{
    ConflictPolicy, IgnorePolicy, OverwritePolicy, PromptPolicy, SyncEngine, SyncReport,
    build_index,
};
use lcsync_core::LeetCodeClient;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PolicyChoice {
    Prompt,
    Ignore,
    Overwrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CliMode {
    Fetch(PolicyChoice),
    Index,
    Help,
}

fn parse_cli_mode<I>(args: I) -> anyhow::Result<CliMode>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().skip(1);
    let Some(command) = args.next() else {
        return Ok(CliMode::Help);
    };
    match command.as_str() {
        "fetch" => {
            let mut policy = PolicyChoice::Prompt;
            for arg in args {
                policy = match arg.as_str() {
                    "--ignore" => PolicyChoice::Ignore,
                    "--overwrite" => PolicyChoice::Overwrite,
                    other => anyhow::bail!("unknown argument: {other}"),
                };
            }
            Ok(CliMode::Fetch(policy))
        }
        "index" => {
            if let Some(other) = args.next() {
                anyhow::bail!("unknown argument: {other}");
            }
            Ok(CliMode::Index)
        }
        "help" | "--help" | "-h" => Ok(CliMode::Help),
        other => anyhow::bail!("unknown command: {other}"),
    }
}

fn print_usage() {
    println!("Usage: lcsync <command>");
    println!("  fetch [--ignore | --overwrite]   Fetch accepted submissions into the target tree");
    println!("                                   (asks what to do with duplicates by default)");
    println!("  index                            Count solutions already in the target tree");
    println!("  help                             Show this message");
}

fn print_report(report: &SyncReport, commit_message: &str) {
    println!(
        "Fetched {} accepted submissions: {} new, {} duplicates",
        report.fetched, report.new, report.duplicates
    );
    if report.ignored_duplicates() > 0 {
        println!("Kept {} existing solutions", report.ignored_duplicates());
    }
    println!("Saved {} submissions", report.saved_count());
    for skipped in report.warnings() {
        println!("  dropped {} ({}): {}", skipped.title_slug, skipped.id, skipped.reason);
    }
    for failed in &report.failed {
        println!("  failed {} ({}): {}", failed.title_slug, failed.id, failed.error);
    }
    if report.saved_count() > 0 {
        println!("Next step: commit with {commit_message:?} and push the target repository");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let choice = match parse_cli_mode(std::env::args())? {
        CliMode::Help => {
            print_usage();
            return Ok(());
        }
        CliMode::Index => {
            let target_dir = config::target_dir_from_env()?;
            let index = build_index(&target_dir)
                .await
                .with_context(|| format!("failed to scan solutions under {target_dir:?}"))?;
            println!("{} solutions in {}", index.len(), target_dir.display());
            for (folder, count) in index.per_folder() {
                println!("  {folder}: {count}");
            }
            return Ok(());
        }
        CliMode::Fetch(choice) => choice,
    };

    let config = ProfileConfig::from_env()?;
    let client = LeetCodeClient::with_base_url(&config.base_url, config.credential.clone())?;
    let engine = SyncEngine::new(client, config.target_dir.clone());

    println!(
        "Fetching accepted submissions into {}",
        config.target_dir.display()
    );
    let mut policy: Box<dyn ConflictPolicy> = match choice {
        PolicyChoice::Prompt => Box::new(PromptPolicy::stdio()),
        PolicyChoice::Ignore => Box::new(IgnorePolicy),
        PolicyChoice::Overwrite => Box::new(OverwritePolicy),
    };
    let report = engine.run(policy.as_mut(), &TracingSink).await?;
    print_report(&report, &config.commit_message);
    Ok(())
}
