use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};
use clap::Parser;

use gitsnap::{theme, ArtifactStudio, StudioConfig, ThemeId};

// Fixed legal copy, shown on request; printing it has no effect on the
// session.
const LEGAL_TEXT: &str = "\
GitSnap Terms of Service

GitSnap renders publicly available repository metadata into image files on
your own machine. Nothing you generate is uploaded or retained. Repository
metadata is requested from the GitHub REST API on your behalf and is subject
to GitHub's own terms and rate limits.

Privacy Policy

GitSnap stores no accounts, no telemetry and no generated artifacts. The
only network requests made are the metadata lookup and the avatar fetch
needed to render the card you asked for.

(c) 2026 GITSNAP STUDIO";

/// Turn a public GitHub repository into a themed card artifact (PNG).
#[derive(Parser, Debug)]
#[command(name = "gitsnap", version, about)]
struct Cli {
    /// Repository reference, e.g. `octocat/Hello-World` or a full GitHub URL
    reference: Option<String>,

    /// Card theme
    #[arg(long, default_value = "midnight")]
    theme: String,

    /// Export resolution multiplier (2 or 3 are the usual choices)
    #[arg(long, default_value_t = 3)]
    pixel_density: u32,

    /// Directory the artifact is written to
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// List the available themes and exit
    #[arg(long)]
    list_themes: bool,

    /// Print the terms of service and privacy policy and exit
    #[arg(long)]
    legal: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_themes {
        for t in theme::themes() {
            println!("{:<10} {}", t.id, t.label);
        }
        return Ok(());
    }

    if cli.legal {
        println!("{LEGAL_TEXT}");
        return Ok(());
    }

    let reference = match cli.reference {
        Some(reference) => reference,
        None => bail!("a repository reference is required (try `gitsnap octocat/Hello-World`)"),
    };
    let theme_id = ThemeId::from_str(&cli.theme).map_err(anyhow::Error::msg)?;

    let config = StudioConfig {
        pixel_density: cli.pixel_density,
        output_dir: cli.out,
        ..Default::default()
    };

    let studio = ArtifactStudio::launch(config)
        .await
        .context("failed to start the card studio")?;
    studio.change_theme(theme_id).await?;

    studio
        .submit(&reference)
        .await
        .with_context(|| format!("could not resolve '{reference}'"))?;

    let receipt = studio.export().await.context("export failed")?;
    println!("wrote {} ({} bytes)", receipt.path.display(), receipt.bytes);

    studio.close().await?;
    Ok(())
}
