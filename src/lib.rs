//! GitSnap Card Studio
//!
//! Turns a public GitHub repository's metadata into a themed, shareable
//! visual card and rasterizes it into a downloadable PNG.
//!
//! # Architecture
//!
//! - **Flow**: a reducer-style state machine drives the input → preview →
//!   export session; async completions are applied only when their request
//!   id still matches the session.
//! - **Themes**: a closed, compile-time catalog of card palettes.
//! - **Rendering**: layout → display list → raster, with pixel-density
//!   scaling applied only at capture time.
//! - **Studio**: a worker-thread-backed async facade that owns the whole
//!   pipeline and serializes all session mutation.
//!
//! # Example
//!
//! ```no_run
//! use gitsnap::{ArtifactStudio, StudioConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> gitsnap::Result<()> {
//! let studio = ArtifactStudio::launch(StudioConfig::default()).await?;
//! studio.submit("octocat/Hello-World").await?;
//! let receipt = studio.export().await?;
//! println!("wrote {} ({} bytes)", receipt.path.display(), receipt.bytes);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod error;
pub use error::{Error, LookupError, RasterError, Result};

pub mod theme;
pub use theme::{Theme, ThemeId};

pub mod metadata;
pub use metadata::{GithubFetcher, MetadataFetcher, RepoRef, RepositoryMetadata};

pub mod artifact;
pub use artifact::ArtifactViewModel;

pub mod flow;
pub use flow::{Event, FlowController, Notice, Screen, SessionState};

pub mod rendering;
pub use rendering::{Bitmap, CaptureOptions, Rasterizer};

pub mod app;
pub use app::{ArtifactStudio, ExportReceipt};

/// Configuration for one studio session
///
/// Defaults are chosen to match the public product: the GitHub REST API,
/// a 3x export density, and artifacts written to the current directory.
///
/// # Examples
///
/// ```
/// let cfg = gitsnap::StudioConfig::default();
/// assert!(cfg.api_base.contains("api.github.com"));
/// ```
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// User agent sent with every metadata and avatar request. GitHub
    /// rejects requests without one.
    pub user_agent: String,
    /// Base URL of the metadata API. Overridable so tests can run against
    /// a local fixture server.
    pub api_base: String,
    /// Timeout for metadata and avatar requests in milliseconds
    pub timeout_ms: u64,
    /// Export resolution multiplier relative to the card's logical size
    pub pixel_density: u32,
    /// Directory exported artifacts are written to
    pub output_dir: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            user_agent: "gitsnap/0.1 (+https://github.com/gitsnap/gitsnap)".to_string(),
            api_base: "https://api.github.com".to_string(),
            timeout_ms: 30000,
            pixel_density: 3,
            output_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudioConfig::default();
        assert_eq!(config.api_base, "https://api.github.com");
        assert_eq!(config.pixel_density, 3);
        assert!(config.user_agent.contains("gitsnap"));
    }
}
