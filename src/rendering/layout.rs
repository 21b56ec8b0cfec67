//! Box placement for the fixed wide-card footprint.
//!
//! All coordinates are logical pixels on the 1000x600 card; the rasterizer
//! scales them at capture time. Layout is deterministic: same view-model,
//! same boxes.

use super::font;
use super::CARD_WIDTH;
use crate::artifact::ArtifactViewModel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// What a laid-out box represents on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardElement {
    Avatar,
    OwnerLabel,
    OwnerLogin,
    RepoName,
    Description,
    StatLabel,
    StatValue,
    Divider,
    LanguagePill,
    Stamp,
}

/// One laid-out box: where it sits, what text it carries (may be empty for
/// non-text elements), and the font scale used to size it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub rect: Rect,
    pub text: String,
    pub element: CardElement,
    pub scale: u32,
}

// Inner padding of the card, logical pixels.
const PADDING: u32 = 96;

const AVATAR_SIZE: u32 = 96;
const OWNER_GAP: u32 = 32;

const LABEL_SCALE: u32 = 2;
const LOGIN_SCALE: u32 = 4;
const TITLE_SCALE: u32 = 8;
const DESC_SCALE: u32 = 3;
const VALUE_SCALE: u32 = 6;
const PILL_SCALE: u32 = 3;

const DESC_MAX_WIDTH: u32 = 700;
const DESC_MAX_LINES: usize = 2;

const PILL_PAD_X: u32 = 40;
const PILL_PAD_Y: u32 = 16;

/// Footer stamp, fixed card furniture.
pub const STAMP_TEXT: &str = "ISSUED 2026 // GS_PRO";

fn content_right() -> i32 {
    (CARD_WIDTH - PADDING) as i32
}

// Truncates to the widest prefix that fits, with a trailing ellipsis.
fn fit_line(text: &str, scale: u32, max_width: u32) -> String {
    if font::text_width(text, scale) <= max_width {
        return text.to_string();
    }
    let mut kept: String = text.chars().collect();
    while !kept.is_empty() {
        kept.pop();
        let candidate = format!("{}...", kept.trim_end());
        if font::text_width(&candidate, scale) <= max_width {
            return candidate;
        }
    }
    "...".to_string()
}

// Word wrap in the style of a fixed-cell renderer: estimate characters per
// line from the cell advance, then greedily pack words.
fn wrap_text(text: &str, scale: u32, max_width: u32, max_lines: usize) -> Vec<String> {
    let chars_per_line = (max_width / (font::ADVANCE * scale)).max(1) as usize;
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > chars_per_line && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            if lines.len() == max_lines {
                break;
            }
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() && lines.len() < max_lines {
        lines.push(current);
    } else if lines.len() == max_lines {
        // Clipped: mark the last visible line.
        if let Some(last) = lines.last_mut() {
            if !last.ends_with("...") {
                last.push_str("...");
            }
        }
    }
    lines
}

/// Computes the full set of boxes for one view-model.
pub fn layout_card(vm: &ArtifactViewModel) -> Vec<LayoutNode> {
    let mut nodes = Vec::new();
    let left = PADDING as i32;
    let content_width = CARD_WIDTH - PADDING * 2;

    // Top row: avatar + owner identity.
    nodes.push(LayoutNode {
        rect: Rect::new(left, PADDING as i32, AVATAR_SIZE, AVATAR_SIZE),
        text: String::new(),
        element: CardElement::Avatar,
        scale: 1,
    });

    let owner_x = left + (AVATAR_SIZE + OWNER_GAP) as i32;
    let owner_max = CARD_WIDTH - PADDING * 2 - AVATAR_SIZE - OWNER_GAP;
    nodes.push(LayoutNode {
        rect: Rect::new(
            owner_x,
            110,
            font::text_width("DEVELOPER", LABEL_SCALE),
            font::line_height(LABEL_SCALE),
        ),
        text: "DEVELOPER".to_string(),
        element: CardElement::OwnerLabel,
        scale: LABEL_SCALE,
    });
    let login = fit_line(&vm.owner_login, LOGIN_SCALE, owner_max);
    nodes.push(LayoutNode {
        rect: Rect::new(
            owner_x,
            138,
            font::text_width(&login, LOGIN_SCALE),
            font::line_height(LOGIN_SCALE),
        ),
        text: login,
        element: CardElement::OwnerLogin,
        scale: LOGIN_SCALE,
    });

    // Middle: repository name + description.
    let title = fit_line(&vm.repo_name, TITLE_SCALE, content_width);
    nodes.push(LayoutNode {
        rect: Rect::new(
            left,
            272,
            font::text_width(&title, TITLE_SCALE),
            font::line_height(TITLE_SCALE),
        ),
        text: title,
        element: CardElement::RepoName,
        scale: TITLE_SCALE,
    });

    let mut desc_y = 352;
    for line in wrap_text(&vm.description, DESC_SCALE, DESC_MAX_WIDTH, DESC_MAX_LINES) {
        nodes.push(LayoutNode {
            rect: Rect::new(
                left,
                desc_y,
                font::text_width(&line, DESC_SCALE),
                font::line_height(DESC_SCALE),
            ),
            text: line,
            element: CardElement::Description,
            scale: DESC_SCALE,
        });
        desc_y += (font::line_height(DESC_SCALE) + 6) as i32;
    }

    // Bottom left: star and fork counters separated by a divider.
    let label_y = 430;
    let value_y = 452;
    let mut x = left;
    for (label, value) in [("STARS", &vm.stars), ("FORKS", &vm.forks)] {
        nodes.push(LayoutNode {
            rect: Rect::new(
                x,
                label_y,
                font::text_width(label, LABEL_SCALE),
                font::line_height(LABEL_SCALE),
            ),
            text: label.to_string(),
            element: CardElement::StatLabel,
            scale: LABEL_SCALE,
        });
        nodes.push(LayoutNode {
            rect: Rect::new(
                x,
                value_y,
                font::text_width(value, VALUE_SCALE),
                font::line_height(VALUE_SCALE),
            ),
            text: value.clone(),
            element: CardElement::StatValue,
            scale: VALUE_SCALE,
        });
        let block_width = font::text_width(label, LABEL_SCALE)
            .max(font::text_width(value, VALUE_SCALE));
        if label == "STARS" {
            let divider_x = x + (block_width + 48) as i32;
            nodes.push(LayoutNode {
                rect: Rect::new(divider_x, label_y, 2, 64),
                text: String::new(),
                element: CardElement::Divider,
                scale: 1,
            });
            x = divider_x + 50;
        }
    }

    // Bottom right: language pill and footer stamp, right-aligned.
    let pill_label = vm.language.to_uppercase();
    let pill_text_w = font::text_width(&pill_label, PILL_SCALE);
    let pill_w = pill_text_w + PILL_PAD_X * 2;
    let pill_h = font::line_height(PILL_SCALE) + PILL_PAD_Y * 2;
    nodes.push(LayoutNode {
        rect: Rect::new(content_right() - pill_w as i32, 420, pill_w, pill_h),
        text: pill_label,
        element: CardElement::LanguagePill,
        scale: PILL_SCALE,
    });

    let stamp_w = font::text_width(STAMP_TEXT, LABEL_SCALE);
    nodes.push(LayoutNode {
        rect: Rect::new(
            content_right() - stamp_w as i32,
            487,
            stamp_w,
            font::line_height(LABEL_SCALE),
        ),
        text: STAMP_TEXT.to_string(),
        element: CardElement::Stamp,
        scale: LABEL_SCALE,
    });

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{RepoOwner, RepositoryMetadata};
    use crate::rendering::CARD_HEIGHT;
    use crate::theme;

    fn vm_with(description: &str, name: &str) -> ArtifactViewModel {
        let metadata = RepositoryMetadata {
            owner: RepoOwner {
                login: "octocat".to_string(),
                avatar_url: String::new(),
            },
            name: name.to_string(),
            description: Some(description.to_string()),
            stargazers_count: 42,
            forks_count: 7,
            language: Some("Rust".to_string()),
        };
        ArtifactViewModel::build(&metadata, theme::default_theme())
    }

    #[test]
    fn layout_places_all_card_elements() {
        let nodes = layout_card(&vm_with("A short description.", "demo"));
        let has = |e: CardElement| nodes.iter().any(|n| n.element == e);
        assert!(has(CardElement::Avatar));
        assert!(has(CardElement::OwnerLogin));
        assert!(has(CardElement::RepoName));
        assert!(has(CardElement::Description));
        assert!(has(CardElement::StatValue));
        assert!(has(CardElement::Divider));
        assert!(has(CardElement::LanguagePill));
        assert!(has(CardElement::Stamp));
    }

    #[test]
    fn all_boxes_stay_on_the_card() {
        let long = "A repository description long enough that it must be wrapped \
                    across several lines and then clipped to the visible area.";
        let nodes = layout_card(&vm_with(long, "a-fairly-long-repository-name-here"));
        for node in &nodes {
            assert!(node.rect.x >= 0, "{:?}", node.element);
            assert!(node.rect.y >= 0, "{:?}", node.element);
            assert!(
                node.rect.x as u32 + node.rect.width <= CARD_WIDTH,
                "{:?} overflows horizontally",
                node.element
            );
            assert!(
                node.rect.y as u32 + node.rect.height <= CARD_HEIGHT,
                "{:?} overflows vertically",
                node.element
            );
        }
    }

    #[test]
    fn long_descriptions_are_clipped_with_ellipsis() {
        let long = "word ".repeat(80);
        let nodes = layout_card(&vm_with(&long, "demo"));
        let desc: Vec<&LayoutNode> = nodes
            .iter()
            .filter(|n| n.element == CardElement::Description)
            .collect();
        assert_eq!(desc.len(), DESC_MAX_LINES);
        assert!(desc.last().unwrap().text.ends_with("..."));
    }

    #[test]
    fn long_titles_are_truncated_to_fit() {
        let nodes = layout_card(&vm_with("d", &"x".repeat(60)));
        let title = nodes
            .iter()
            .find(|n| n.element == CardElement::RepoName)
            .unwrap();
        assert!(title.text.ends_with("..."));
        assert!(title.rect.x as u32 + title.rect.width <= CARD_WIDTH - PADDING);
    }
}
