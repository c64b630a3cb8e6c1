use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use quip::schema::load_batch_manifest;
use quip::{MemeRenderer, RenderRequest, Role};

fn build_version() -> String {
    match option_env!("QUIP_GIT_HASH") {
        Some(hash) => format!("{} ({hash})", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_owned(),
    }
}

#[derive(Debug, Parser)]
#[command(name = "quip")]
#[command(about = "Chat bubble meme renderer")]
#[command(version = build_version())]
struct Cli {
    /// Directory holding fonts/ and the bubble corner sprites.
    #[arg(long, global = true, default_value = "resources")]
    resources: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render one message card to a JPEG file.
    Render {
        #[arg(long)]
        name: String,
        /// Path to the avatar image.
        #[arg(long)]
        avatar: PathBuf,
        #[arg(long)]
        text: String,
        #[arg(long, default_value = "member")]
        role: Role,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, default_value_t = 0)]
        level: u32,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Render a JSON batch manifest to one vertically stitched PNG.
    Stitch {
        manifest: PathBuf,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            name,
            avatar,
            text,
            role,
            title,
            level,
            output,
        } => {
            let avatar_bytes = fs::read(&avatar)
                .with_context(|| format!("failed to read avatar '{}'", avatar.display()))?;
            let request = RenderRequest {
                display_name: name,
                avatar: avatar_bytes,
                body_text: text,
                role,
                title,
                level,
            };
            let renderer = MemeRenderer::new(cli.resources);
            let Some(bytes) = renderer.render_frame(&request) else {
                bail!("render produced no image");
            };
            let path = output.unwrap_or_else(|| default_output_name("jpg"));
            fs::write(&path, bytes)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Stitch { manifest, output } => {
            let specs = load_batch_manifest(&manifest)?;
            let requests = specs
                .into_iter()
                .map(|spec| spec.into_request())
                .collect::<Result<Vec<_>>>()?;
            let renderer = MemeRenderer::new(cli.resources);
            let Some(bytes) = renderer.render_stitched(&requests) else {
                bail!("batch produced no image");
            };
            let path = output.unwrap_or_else(|| default_output_name("png"));
            fs::write(&path, bytes)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn default_output_name(extension: &str) -> PathBuf {
    PathBuf::from(format!(
        "meme_{}.{extension}",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}
