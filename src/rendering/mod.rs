//! Card rendering pipeline: layout, paint, raster.
//!
//! The pipeline is staged so each piece is testable on its own: `layout`
//! places boxes on the fixed card footprint, `paint` turns the laid-out boxes
//! into a display list, and `raster` executes the display list into pixels at
//! an export-time density. Only `raster` touches the network (avatar fetch)
//! or produces bytes.

pub mod font;
pub mod layout;
pub mod paint;
pub mod raster;

pub use raster::Rasterizer;

use crate::artifact::ArtifactViewModel;

/// Logical card footprint (a wide card), independent of export density.
pub const CARD_WIDTH: u32 = 1000;
pub const CARD_HEIGHT: u32 = 600;

/// Corner radius of the card silhouette, in logical pixels.
pub const CARD_RADIUS: u32 = 60;

/// A finished capture: PNG bytes plus their pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

/// Capture parameters.
///
/// `pixel_density` scales output resolution only; the card's logical layout
/// never changes with it. Observed product values are 2 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    pub pixel_density: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self { pixel_density: 3 }
    }
}

/// A fully laid-out card, ready for capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSurface {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<paint::PaintCommand>,
}

/// Lays out and paints one view-model into a capture-ready surface.
pub fn compose(view_model: &ArtifactViewModel) -> CardSurface {
    let nodes = layout::layout_card(view_model);
    CardSurface {
        width: CARD_WIDTH,
        height: CARD_HEIGHT,
        commands: paint::display_list(view_model, &nodes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{RepoOwner, RepositoryMetadata};
    use crate::theme;

    fn sample_vm() -> ArtifactViewModel {
        let metadata = RepositoryMetadata {
            owner: RepoOwner {
                login: "octocat".to_string(),
                avatar_url: String::new(),
            },
            name: "Hello-World".to_string(),
            description: Some("My first repository on GitHub!".to_string()),
            stargazers_count: 1500,
            forks_count: 1000,
            language: Some("Rust".to_string()),
        };
        ArtifactViewModel::build(&metadata, theme::default_theme())
    }

    #[test]
    fn compose_produces_fixed_footprint() {
        let surface = compose(&sample_vm());
        assert_eq!(surface.width, CARD_WIDTH);
        assert_eq!(surface.height, CARD_HEIGHT);
        assert!(!surface.commands.is_empty());
    }

    #[test]
    fn compose_is_deterministic() {
        let vm = sample_vm();
        assert_eq!(compose(&vm), compose(&vm));
    }
}
