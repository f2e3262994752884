use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use toolpress::batch::BatchDriver;
use toolpress::cache::CacheStore;
use toolpress::generate::RunMode;
use toolpress::llm::OpenAiClient;
use toolpress::runlog::RunLog;
use toolpress::template::{PageTemplate, STOCK_TEMPLATE};
use toolpress::{assets, config, homepage, manifest, output};
use tracing::{Level, warn};
use tracing_subscriber::FmtSubscriber;

/// Flags for the build command.
#[derive(clap::Args, Clone)]
struct BuildArgs {
    /// Regenerate every tool, ignoring cached records
    #[arg(long)]
    force: bool,

    /// Re-render from cached records only; never calls the model (wins over --force)
    #[arg(long)]
    refresh: bool,
}

#[derive(Parser)]
#[command(name = "toolpress")]
#[command(about = "Static site generator for collections of AI-generated web tools")]
#[command(long_about = "\
Static site generator for collections of AI-generated web tools

Lists tool names, asks a chat-completion model for SEO metadata and a
self-contained HTML/JavaScript implementation of each, and renders them into
a static site.

Project structure:

  project/
  ├── toolpress.toml               # Config (optional, see gen-config)
  ├── .env                         # OPENAI_API_KEY, BASE_URL, ADSENSE_CODE
  ├── tools.txt                    # One tool name per line (first build)
  ├── templates/base_template.html # Page template (see gen-template)
  ├── .toolpress-cache/            # Generated records, one per tool
  ├── index.html                   # Homepage
  ├── shared/{css,js}/             # Stylesheet and script
  └── tools/
      ├── tools_list.json          # Navigation manifest (input once it exists)
      └── word-counter/
          ├── index.html
          └── tool_code.html

Run 'toolpress gen-config' to generate a documented toolpress.toml.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Show progress detail (-vv for debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate every tool page, then the manifest, homepage and assets
    Build(BuildArgs),
    /// Regenerate the homepage only
    Index,
    /// Rebuild tools/tools_list.json from the tool directories on disk
    RegenList,
    /// Validate config and template, print resolved settings
    Check,
    /// Print a stock toolpress.toml with all options documented
    GenConfig,
    /// Print the stock page template
    GenTemplate,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::GenTemplate => {
            print!("{}", STOCK_TEMPLATE);
            return Ok(());
        }
        _ => {}
    }

    let root = cli.root;
    load_dotenv(&root);
    let config = config::load_config_with_env(&root, |key| std::env::var(key).ok())?;
    let paths = config.paths.resolve(&root);

    match cli.command {
        Command::Build(args) => {
            let template = PageTemplate::load(&paths.templates_dir, &paths.template)?;
            let mode = RunMode::from_flags(args.force, args.refresh);
            if config.model.api_key.is_none() && mode != RunMode::Refresh {
                warn!("OPENAI_API_KEY is not set; only cached tools can be built");
            }
            let client = OpenAiClient::new(&config.model)?;
            let cache = CacheStore::new(&paths.cache_dir);
            let log = RunLog::new(&paths.log_file);

            println!("==> Building tools ({:?})", mode);
            let progress_root = root.clone();
            let report = BatchDriver::new(&client, &cache, &template, &log, &config, &paths)
                .with_progress(move |outcome, done, total| {
                    output::print_tool_outcome(outcome, done, total, &progress_root);
                })
                .run(mode)
                .await?;

            assets::write_static_assets(&paths.output_dir).await?;
            homepage::write_homepage(
                &paths.homepage,
                &template,
                &config,
                &root,
                &report.tools,
                &cache,
            )
            .await?;
            output::print_batch_summary(&report, &paths, &root, true);
        }
        Command::Index => {
            let template = PageTemplate::load(&paths.templates_dir, &paths.template)?;
            let tools = manifest::load_tools(&paths.manifest, &paths.tool_list).await?;
            let cache = CacheStore::new(&paths.cache_dir);
            homepage::write_homepage(&paths.homepage, &template, &config, &root, &tools, &cache)
                .await?;
            println!(
                "Home → {} ({} tools)",
                paths.homepage.strip_prefix(&root).unwrap_or(&paths.homepage).display(),
                tools.len()
            );
        }
        Command::RegenList => {
            let tools = manifest::scan_tool_dirs(&paths.tools_dir).await?;
            manifest::write_manifest(&paths.manifest, &tools).await?;
            output::print_tool_list(&tools, &paths.manifest, &root);
        }
        Command::Check => {
            let template = PageTemplate::load(&paths.templates_dir, &paths.template);
            output::print_check(&config, &paths, &root, template.as_ref().err());
            template?;
            println!("==> Configuration is valid");
        }
        Command::GenConfig | Command::GenTemplate => unreachable!("handled above"),
    }

    Ok(())
}

/// Route tracing to stderr at a level picked by -v/-q.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

/// Load `<root>/.env` into the process environment when present.
fn load_dotenv(root: &Path) {
    match dotenvy::from_path(root.join(".env")) {
        Ok(()) => {}
        Err(e) if e.not_found() => {}
        Err(e) => warn!("ignoring unreadable .env: {e}"),
    }
}
