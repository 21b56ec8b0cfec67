//! Display-list construction for a laid-out card.

use super::layout::{CardElement, LayoutNode, Rect};
use super::{CARD_HEIGHT, CARD_RADIUS, CARD_WIDTH};
use crate::artifact::ArtifactViewModel;
use crate::theme::Rgba;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Fill the whole canvas with an opaque color.
    Clear { color: Rgba },
    FillRect { rect: Rect, color: Rgba },
    FillRoundRect { rect: Rect, radius: u32, color: Rgba },
    StrokeRoundRect { rect: Rect, radius: u32, thickness: u32, color: Rgba },
    Text { x: i32, y: i32, text: String, scale: u32, color: Rgba },
    /// Avatar image, resolved by the rasterizer at capture time. When no
    /// URL is available the rasterizer draws a monogram tile in `tint`.
    Avatar { rect: Rect, radius: u32, url: String, monogram: String, tint: Rgba },
}

// Text opacities lifted from the card design: labels are faint, the
// description sits at 60%, values are full-strength.
const LABEL_ALPHA: u8 = 102;
const DESC_ALPHA: u8 = 153;
const DIVIDER_ALPHA: u8 = 26;
const STAMP_ALPHA: u8 = 51;
const PILL_FILL_ALPHA: u8 = 32;

/// Turns layout boxes into an ordered display list. Order matters: the
/// rasterizer executes back-to-front with alpha blending.
pub fn display_list(vm: &ArtifactViewModel, nodes: &[LayoutNode]) -> Vec<PaintCommand> {
    let card = Rect::new(0, 0, CARD_WIDTH, CARD_HEIGHT);
    let mut commands = vec![
        PaintCommand::Clear { color: vm.background },
        PaintCommand::FillRoundRect {
            rect: card.clone(),
            radius: CARD_RADIUS,
            color: vm.surface,
        },
        PaintCommand::StrokeRoundRect {
            rect: card,
            radius: CARD_RADIUS,
            thickness: 2,
            color: vm.border,
        },
    ];

    for node in nodes {
        match node.element {
            CardElement::Avatar => commands.push(PaintCommand::Avatar {
                rect: node.rect.clone(),
                radius: 24,
                url: vm.avatar_url.clone(),
                monogram: vm
                    .owner_login
                    .chars()
                    .next()
                    .map(|c| c.to_ascii_uppercase().to_string())
                    .unwrap_or_else(|| "?".to_string()),
                tint: vm.accent,
            }),
            CardElement::OwnerLabel | CardElement::StatLabel => commands.push(text_cmd(node, vm.text.alpha(LABEL_ALPHA))),
            CardElement::OwnerLogin | CardElement::RepoName | CardElement::StatValue => {
                commands.push(text_cmd(node, vm.text))
            }
            CardElement::Description => commands.push(text_cmd(node, vm.text.alpha(DESC_ALPHA))),
            CardElement::Divider => commands.push(PaintCommand::FillRect {
                rect: node.rect.clone(),
                color: vm.text.alpha(DIVIDER_ALPHA),
            }),
            CardElement::LanguagePill => {
                commands.push(PaintCommand::FillRoundRect {
                    rect: node.rect.clone(),
                    radius: node.rect.height / 2,
                    color: vm.accent.alpha(PILL_FILL_ALPHA),
                });
                // Center the label inside the pill.
                let text_w = super::font::text_width(&node.text, node.scale);
                let text_h = super::font::line_height(node.scale);
                commands.push(PaintCommand::Text {
                    x: node.rect.x + ((node.rect.width - text_w) / 2) as i32,
                    y: node.rect.y + ((node.rect.height - text_h) / 2) as i32,
                    text: node.text.clone(),
                    scale: node.scale,
                    color: vm.accent,
                });
            }
            CardElement::Stamp => commands.push(text_cmd(node, vm.text.alpha(STAMP_ALPHA))),
        }
    }

    commands
}

fn text_cmd(node: &LayoutNode, color: Rgba) -> PaintCommand {
    PaintCommand::Text {
        x: node.rect.x,
        y: node.rect.y,
        text: node.text.clone(),
        scale: node.scale,
        color,
    }
}
