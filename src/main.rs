use chrono::Utc;
use clap::{Parser, Subcommand};
use folio::api::{self, ProjectsQuery};
use folio::contact::{self, OutboxMailer};
use folio::repository::ProjectRepository;
use folio::{config, generate, output};
use std::env;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Content engine and static generator for portfolio sites")]
#[command(long_about = "\
Content engine and static generator for portfolio sites

Every project is an MDX file: YAML front-matter for metadata, Markdown for
the write-up. The file name is the slug.

Site structure:

  site/
  ├── config.toml                  # Site config (optional)
  ├── content/projects/            # One .mdx file per project
  │   ├── harbour.mdx              # slug \"harbour\"
  │   └── lighthouse.mdx
  ├── public/                      # Copied to the output root as-is
  └── outbox/                      # Contact messages land here

Front-matter:
  title (required), description, date, type, services, role, tags, url,
  image, color, featured, gallery, metadata

Projects are listed newest first; undated projects come last.

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root (holds config.toml, content/ and public/)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory for `build`
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every project, newest first
    List,
    /// Show one project with its compiled body
    Show { slug: String },
    /// List featured projects
    Featured,
    /// List tags with project counts
    Tags,
    /// Show the newer and older neighbours of a project
    Adjacent { slug: String },
    /// Answer a project query the way GET /api/projects does
    Query {
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        per_page: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Relay a contact form submission read as JSON from stdin
    Contact,
    /// Render the static site
    Build,
    /// Parse and compile every project without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FOLIO_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "folio=debug,info"
        } else {
            "folio=info,warn"
        })
    });

    let format = env::var("FOLIO_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = config::load_config(&cli.root)?;
    let repo = ProjectRepository::from_config(&cli.root, &site_config.content);

    match cli.command {
        Command::List => output::print_listing(&repo.list_all()?),
        Command::Show { slug } => output::print_project(&repo.get_by_slug(&slug)?),
        Command::Featured => output::print_listing(&repo.list_featured()?),
        Command::Tags => output::print_tags(&repo.list_tags()?),
        Command::Adjacent { slug } => output::print_adjacent(&slug, &repo.get_adjacent(&slug)?),
        Command::Query {
            page,
            per_page,
            tag,
        } => {
            let query = ProjectsQuery::from_parts(
                page.as_deref(),
                per_page.as_deref(),
                tag.as_deref(),
                &site_config.api,
            );
            let response = api::projects_endpoint(&repo, &query);
            output::print_api_response(&response);
            if !response.is_success() {
                std::process::exit(1);
            }
        }
        Command::Contact => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            let mailer = OutboxMailer::new(site_config.outbox_dir(&cli.root));
            let response = contact::contact_endpoint(
                &body,
                Utc::now(),
                &site_config.contact,
                &site_config.site.name,
                &mailer,
            );
            output::print_api_response(&response);
            if !response.is_success() {
                std::process::exit(1);
            }
        }
        Command::Build => {
            println!("==> Building {} → {}", cli.root.display(), cli.output.display());
            let report = generate::generate(&repo, &site_config, &cli.root, &cli.output)?;
            output::print_generate_output(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", repo.dir().display());
            let listing = repo.list_all()?;
            let compiled = listing
                .iter()
                .map(|p| repo.get_by_slug(&p.slug))
                .collect::<Result<Vec<_>, _>>()?;
            output::print_check_output(&compiled);
            info!(projects = compiled.len(), "content is valid");
            println!("==> Content is valid");
        }
        // Handled before config loading.
        Command::GenConfig => {}
    }

    Ok(())
}
