//! Display-list execution: pixels in, PNG bytes out.
//!
//! The rasterizer operates on an already laid-out surface; it performs no
//! layout of its own. Externally-loaded images (the avatar) are fetched with
//! a cache-busting query parameter so a capture always reflects current
//! remote content. Callers must not issue concurrent captures on one
//! session; the flow controller's `exporting` flag guarantees that upstream.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::Engine as Base64Engine;
use image::imageops::FilterType;

use super::layout::Rect;
use super::paint::PaintCommand;
use super::{Bitmap, CaptureOptions, CardSurface};
use crate::error::RasterError;
use crate::theme::Rgba;
use crate::StudioConfig;

// Densities above this produce bitmaps nobody asked for.
const MAX_DENSITY: u32 = 4;

const MONOGRAM_SCALE: u32 = 8;

/// Captures card surfaces into PNG bitmaps.
pub struct Rasterizer {
    client: reqwest::blocking::Client,
    bust: AtomicU64,
}

impl Rasterizer {
    pub fn new(config: &StudioConfig) -> crate::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| crate::Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            bust: AtomicU64::new(0),
        })
    }

    /// Executes the surface's display list at `pixel_density` and encodes
    /// the result as PNG.
    pub fn capture(
        &self,
        surface: &CardSurface,
        options: &CaptureOptions,
    ) -> std::result::Result<Bitmap, RasterError> {
        if surface.commands.is_empty() {
            return Err(RasterError::EmptySurface);
        }

        let density = options.pixel_density.clamp(1, MAX_DENSITY);
        if density != options.pixel_density {
            log::warn!(
                "pixel density {} out of range, clamped to {}",
                options.pixel_density,
                density
            );
        }

        let width = surface.width * density;
        let height = surface.height * density;
        let mut canvas = Canvas::new(width, height);

        for command in &surface.commands {
            match command {
                PaintCommand::Clear { color } => canvas.clear(*color),
                PaintCommand::FillRect { rect, color } => {
                    canvas.fill_round_rect(&scale_rect(rect, density), 0, *color)
                }
                PaintCommand::FillRoundRect { rect, radius, color } => {
                    canvas.fill_round_rect(&scale_rect(rect, density), radius * density, *color)
                }
                PaintCommand::StrokeRoundRect {
                    rect,
                    radius,
                    thickness,
                    color,
                } => canvas.stroke_round_rect(
                    &scale_rect(rect, density),
                    radius * density,
                    (thickness * density).max(1),
                    *color,
                ),
                PaintCommand::Text {
                    x,
                    y,
                    text,
                    scale,
                    color,
                } => canvas.draw_text(
                    x * density as i32,
                    y * density as i32,
                    text,
                    scale * density,
                    *color,
                ),
                PaintCommand::Avatar {
                    rect,
                    radius,
                    url,
                    monogram,
                    tint,
                } => {
                    let dest = scale_rect(rect, density);
                    match self.resolve_avatar(url)? {
                        Some(pixels) => {
                            canvas.blit_image(&dest, radius * density, &pixels);
                        }
                        None => {
                            canvas.fill_round_rect(&dest, radius * density, tint.alpha(255));
                            let scale = MONOGRAM_SCALE * density;
                            let w = super::font::text_width(monogram, scale);
                            let h = super::font::line_height(scale);
                            canvas.draw_text(
                                dest.x + ((dest.width.saturating_sub(w)) / 2) as i32,
                                dest.y + ((dest.height.saturating_sub(h)) / 2) as i32,
                                monogram,
                                scale,
                                Rgba::opaque(255, 255, 255),
                            );
                        }
                    }
                }
            }
        }

        let image: image::RgbaImage = image::ImageBuffer::from_raw(width, height, canvas.px)
            .ok_or_else(|| RasterError::Encode("canvas buffer size mismatch".to_string()))?;
        let mut png_data = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
            .map_err(|e| RasterError::Encode(e.to_string()))?;

        Ok(Bitmap {
            width,
            height,
            png_data,
        })
    }

    // Fetches and decodes the avatar. `Ok(None)` means "no avatar, draw the
    // monogram tile"; fetch/decode failures are hard errors so a capture
    // never silently ships a stale or missing image.
    fn resolve_avatar(
        &self,
        url: &str,
    ) -> std::result::Result<Option<image::RgbaImage>, RasterError> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(None);
        }

        let bytes = if let Some(rest) = url.strip_prefix("data:") {
            let (_, payload) = rest
                .split_once(";base64,")
                .ok_or_else(|| RasterError::AvatarDecode("unsupported data URL".to_string()))?;
            base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| RasterError::AvatarDecode(format!("invalid base64 payload: {e}")))?
        } else {
            let busted = self.cache_busted(url)?;
            let response = self
                .client
                .get(busted)
                .send()
                .map_err(|e| RasterError::AvatarFetch(e.to_string()))?;
            if !response.status().is_success() {
                return Err(RasterError::AvatarFetch(format!(
                    "unexpected status {}",
                    response.status()
                )));
            }
            response
                .bytes()
                .map_err(|e| RasterError::AvatarFetch(e.to_string()))?
                .to_vec()
        };

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| RasterError::AvatarDecode(e.to_string()))?;
        Ok(Some(decoded.to_rgba8()))
    }

    // Appends a unique query parameter so intermediate caches cannot serve a
    // stale decode of the avatar.
    fn cache_busted(&self, raw: &str) -> std::result::Result<url::Url, RasterError> {
        let mut parsed = url::Url::parse(raw)
            .map_err(|e| RasterError::AvatarFetch(format!("invalid avatar URL: {e}")))?;
        let nonce = self.bust.fetch_add(1, Ordering::Relaxed);
        parsed
            .query_pairs_mut()
            .append_pair("snapbust", &format!("{}-{}", std::process::id(), nonce));
        Ok(parsed)
    }
}

fn scale_rect(rect: &Rect, density: u32) -> Rect {
    Rect::new(
        rect.x * density as i32,
        rect.y * density as i32,
        rect.width * density,
        rect.height * density,
    )
}

// RGBA8 canvas with src-over blending.
struct Canvas {
    width: u32,
    height: u32,
    px: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            px: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    fn clear(&mut self, color: Rgba) {
        for chunk in self.px.chunks_exact_mut(4) {
            chunk[0] = color.r;
            chunk[1] = color.g;
            chunk[2] = color.b;
            chunk[3] = 255;
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 || color.a == 0 {
            return;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 4;
        if color.a == 255 {
            self.px[idx] = color.r;
            self.px[idx + 1] = color.g;
            self.px[idx + 2] = color.b;
            self.px[idx + 3] = 255;
            return;
        }
        let a = color.a as u32;
        let inv = 255 - a;
        let dst_a = self.px[idx + 3] as u32;
        self.px[idx] = ((color.r as u32 * a + self.px[idx] as u32 * inv) / 255) as u8;
        self.px[idx + 1] = ((color.g as u32 * a + self.px[idx + 1] as u32 * inv) / 255) as u8;
        self.px[idx + 2] = ((color.b as u32 * a + self.px[idx + 2] as u32 * inv) / 255) as u8;
        self.px[idx + 3] = (a + dst_a * inv / 255) as u8;
    }

    fn fill_round_rect(&mut self, rect: &Rect, radius: u32, color: Rgba) {
        for ry in 0..rect.height as i32 {
            for rx in 0..rect.width as i32 {
                if in_round_rect(rect, radius, rx, ry) {
                    self.blend(rect.x + rx, rect.y + ry, color);
                }
            }
        }
    }

    fn stroke_round_rect(&mut self, rect: &Rect, radius: u32, thickness: u32, color: Rgba) {
        let inner = Rect::new(
            thickness as i32,
            thickness as i32,
            rect.width.saturating_sub(thickness * 2),
            rect.height.saturating_sub(thickness * 2),
        );
        let inner_radius = radius.saturating_sub(thickness);
        for ry in 0..rect.height as i32 {
            for rx in 0..rect.width as i32 {
                let outside_inner =
                    !in_round_rect(&inner, inner_radius, rx - inner.x, ry - inner.y);
                if outside_inner && in_round_rect(rect, radius, rx, ry) {
                    self.blend(rect.x + rx, rect.y + ry, color);
                }
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: u32, color: Rgba) {
        let mut pen_x = x;
        for c in text.chars() {
            let columns = super::font::glyph(c);
            for (col, bits) in columns.iter().enumerate() {
                for row in 0..super::font::GLYPH_HEIGHT {
                    if bits & (1 << row) != 0 {
                        let px = pen_x + (col as u32 * scale) as i32;
                        let py = y + (row * scale) as i32;
                        for dy in 0..scale as i32 {
                            for dx in 0..scale as i32 {
                                self.blend(px + dx, py + dy, color);
                            }
                        }
                    }
                }
            }
            pen_x += (super::font::ADVANCE * scale) as i32;
        }
    }

    // Resamples `pixels` into `dest` and blits it with rounded-corner
    // clipping.
    fn blit_image(&mut self, dest: &Rect, radius: u32, pixels: &image::RgbaImage) {
        if dest.width == 0 || dest.height == 0 {
            return;
        }
        let resized = image::imageops::resize(pixels, dest.width, dest.height, FilterType::Triangle);
        for ry in 0..dest.height {
            for rx in 0..dest.width {
                if !in_round_rect(dest, radius, rx as i32, ry as i32) {
                    continue;
                }
                let p = resized.get_pixel(rx, ry);
                self.blend(
                    dest.x + rx as i32,
                    dest.y + ry as i32,
                    Rgba::with_alpha(p[0], p[1], p[2], p[3]),
                );
            }
        }
    }
}

// Point-in-rounded-rect test in rect-local coordinates.
fn in_round_rect(rect: &Rect, radius: u32, rx: i32, ry: i32) -> bool {
    let w = rect.width as i32;
    let h = rect.height as i32;
    if rx < 0 || ry < 0 || rx >= w || ry >= h {
        return false;
    }
    let r = radius.min(rect.width / 2).min(rect.height / 2) as i32;
    if r == 0 {
        return true;
    }
    let dx = if rx < r {
        r - rx
    } else if rx >= w - r {
        rx - (w - r - 1)
    } else {
        0
    };
    let dy = if ry < r {
        r - ry
    } else if ry >= h - r {
        ry - (h - r - 1)
    } else {
        0
    };
    dx * dx + dy * dy <= r * r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactViewModel;
    use crate::metadata::{RepoOwner, RepositoryMetadata};
    use crate::rendering::{compose, CARD_HEIGHT, CARD_WIDTH};
    use crate::theme;

    fn offline_vm() -> ArtifactViewModel {
        let metadata = RepositoryMetadata {
            owner: RepoOwner {
                login: "octocat".to_string(),
                // Empty URL: the monogram tile keeps the capture offline.
                avatar_url: String::new(),
            },
            name: "Hello-World".to_string(),
            description: Some("A test card".to_string()),
            stargazers_count: 1500,
            forks_count: 1000,
            language: Some("Rust".to_string()),
        };
        ArtifactViewModel::build(&metadata, theme::default_theme())
    }

    fn rasterizer() -> Rasterizer {
        Rasterizer::new(&StudioConfig::default()).expect("rasterizer")
    }

    #[test]
    fn empty_surface_is_rejected() {
        let surface = CardSurface {
            width: CARD_WIDTH,
            height: CARD_HEIGHT,
            commands: vec![],
        };
        let err = rasterizer()
            .capture(&surface, &CaptureOptions::default())
            .unwrap_err();
        assert_eq!(err, RasterError::EmptySurface);
    }

    #[test]
    fn capture_scales_with_density_and_emits_png() {
        let surface = compose(&offline_vm());
        let bitmap = rasterizer()
            .capture(&surface, &CaptureOptions { pixel_density: 2 })
            .expect("capture");
        assert_eq!(bitmap.width, CARD_WIDTH * 2);
        assert_eq!(bitmap.height, CARD_HEIGHT * 2);
        assert_eq!(&bitmap.png_data[0..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn out_of_range_density_is_clamped() {
        let surface = compose(&offline_vm());
        let bitmap = rasterizer()
            .capture(&surface, &CaptureOptions { pixel_density: 9 })
            .expect("capture");
        assert_eq!(bitmap.width, CARD_WIDTH * MAX_DENSITY);
    }

    #[test]
    fn data_url_avatars_decode_without_network() {
        // Build a tiny PNG in memory and wrap it in a data URL.
        let tile = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 40, 40, 255]));
        let mut png = Vec::new();
        tile.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let data_url = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        );

        let decoded = rasterizer().resolve_avatar(&data_url).expect("decode");
        let decoded = decoded.expect("some pixels");
        assert_eq!(decoded.dimensions(), (2, 2));
    }

    #[test]
    fn malformed_data_url_is_a_decode_error() {
        let err = rasterizer()
            .resolve_avatar("data:image/png;base64,!!notbase64!!")
            .unwrap_err();
        assert!(matches!(err, RasterError::AvatarDecode(_)));
    }

    #[test]
    fn cache_bust_param_is_appended_and_unique() {
        let r = rasterizer();
        let first = r.cache_busted("https://example.test/a.png").unwrap();
        let second = r.cache_busted("https://example.test/a.png").unwrap();
        assert!(first.query().unwrap_or_default().contains("snapbust="));
        assert_ne!(first.as_str(), second.as_str());
    }

    #[test]
    fn round_rect_corners_are_clipped() {
        let rect = Rect::new(0, 0, 100, 100);
        assert!(!in_round_rect(&rect, 20, 0, 0));
        assert!(in_round_rect(&rect, 20, 50, 0));
        assert!(in_round_rect(&rect, 20, 50, 50));
        assert!(!in_round_rect(&rect, 20, 99, 99));
        assert!(in_round_rect(&rect, 0, 0, 0));
    }
}
