//! Derivation of the renderable card view-model.
//!
//! [`ArtifactViewModel::build`] is a pure function of `(metadata, theme)`:
//! no I/O, deterministic, snapshot-testable by value equality. It owns all
//! formatting and fallback logic so the renderer consumes display-ready
//! strings and colors with no secondary theme lookup.

use crate::metadata::RepositoryMetadata;
use crate::theme::{Rgba, Theme};

/// Shown when a repository carries no description.
pub const DESCRIPTION_FALLBACK: &str = "Architecting digital solutions at scale.";

/// Shown when the remote reports no primary language.
pub const LANGUAGE_FALLBACK: &str = "Software";

/// Everything the card renderer needs, precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactViewModel {
    pub owner_login: String,
    pub avatar_url: String,
    pub repo_name: String,
    pub description: String,
    pub language: String,
    pub stars: String,
    pub forks: String,

    // Presentation fields copied from the active theme.
    pub background: Rgba,
    pub surface: Rgba,
    pub text: Rgba,
    pub accent: Rgba,
    pub border: Rgba,
}

impl ArtifactViewModel {
    /// Builds the view-model for one `(metadata, theme)` pair.
    pub fn build(metadata: &RepositoryMetadata, theme: &Theme) -> Self {
        let description = match metadata.description.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => DESCRIPTION_FALLBACK.to_string(),
        };
        let language = match metadata.language.as_deref() {
            Some(lang) if !lang.trim().is_empty() => lang.to_string(),
            _ => LANGUAGE_FALLBACK.to_string(),
        };

        Self {
            owner_login: metadata.owner.login.clone(),
            avatar_url: metadata.owner.avatar_url.clone(),
            repo_name: metadata.name.clone(),
            description,
            language,
            stars: group_thousands(metadata.stargazers_count),
            forks: group_thousands(metadata.forks_count),
            background: theme.background,
            surface: theme.card_surface,
            text: theme.text,
            accent: theme.accent,
            border: theme.border,
        }
    }

    /// Deterministic download name for the exported bitmap.
    pub fn artifact_filename(&self) -> String {
        format!("{}-artifact.png", self.repo_name)
    }
}

/// Formats a count with `,` grouping separators. `0` stays `"0"`.
pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RepoOwner;
    use crate::theme;

    fn octocat(description: Option<&str>, language: Option<&str>) -> RepositoryMetadata {
        RepositoryMetadata {
            owner: RepoOwner {
                login: "octocat".to_string(),
                avatar_url: "https://example.test/a.png".to_string(),
            },
            name: "Hello-World".to_string(),
            description: description.map(str::to_string),
            stargazers_count: 1500,
            forks_count: 1000,
            language: language.map(str::to_string),
        }
    }

    #[test]
    fn build_is_deterministic() {
        let metadata = octocat(Some("My first repo"), Some("Rust"));
        let theme = theme::default_theme();
        assert_eq!(
            ArtifactViewModel::build(&metadata, theme),
            ArtifactViewModel::build(&metadata, theme)
        );
    }

    #[test]
    fn missing_fields_fall_back() {
        let vm = ArtifactViewModel::build(&octocat(None, None), theme::default_theme());
        assert_eq!(vm.description, DESCRIPTION_FALLBACK);
        assert_eq!(vm.language, LANGUAGE_FALLBACK);
        assert_eq!(vm.stars, "1,500");
        assert_eq!(vm.forks, "1,000");
    }

    #[test]
    fn blank_description_falls_back_too() {
        let vm = ArtifactViewModel::build(&octocat(Some("   "), None), theme::default_theme());
        assert_eq!(vm.description, DESCRIPTION_FALLBACK);
    }

    #[test]
    fn zero_counts_render_as_zero() {
        let mut metadata = octocat(None, None);
        metadata.stargazers_count = 0;
        metadata.forks_count = 0;
        let vm = ArtifactViewModel::build(&metadata, theme::default_theme());
        assert_eq!(vm.stars, "0");
        assert_eq!(vm.forks, "0");
    }

    #[test]
    fn theme_change_touches_only_presentation_fields() {
        let metadata = octocat(Some("desc"), Some("Rust"));
        let midnight = ArtifactViewModel::build(&metadata, theme::Theme::by_id(theme::ThemeId::Midnight));
        let snow = ArtifactViewModel::build(&metadata, theme::Theme::by_id(theme::ThemeId::Snow));
        assert_eq!(midnight.repo_name, snow.repo_name);
        assert_eq!(midnight.description, snow.description);
        assert_eq!(midnight.stars, snow.stars);
        assert_ne!(midnight.accent, snow.accent);
        assert_ne!(midnight.background, snow.background);
    }

    #[test]
    fn filename_derives_from_repo_name() {
        let vm = ArtifactViewModel::build(&octocat(None, None), theme::default_theme());
        assert_eq!(vm.artifact_filename(), "Hello-World-artifact.png");
    }

    #[test]
    fn grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1500), "1,500");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
