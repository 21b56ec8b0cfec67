//! The closed catalog of card themes.
//!
//! Themes are compile-time constants: a fixed, ordered set selected by key,
//! never constructed ad hoc. Switching themes is a pure state replacement;
//! nothing downstream caches theme data, the view-model simply copies the
//! colors it needs.

use std::fmt;
use std::str::FromStr;

/// An 8-bit RGBA color. Translucency is expressed through `a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully opaque color from channel values.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with an explicit alpha channel.
    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color at a different alpha. Used for the language pill, which is
    /// the accent at roughly 12% opacity.
    pub const fn alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parses `#rrggbb` (leading `#` optional) into an opaque color.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#').trim();
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::opaque(r, g, b))
    }
}

/// Key of a built-in theme. The set is closed in this version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeId {
    Midnight,
    Snow,
    Solar,
}

impl ThemeId {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Midnight => "midnight",
            ThemeId::Snow => "snow",
            ThemeId::Solar => "solar",
        }
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "midnight" => Ok(ThemeId::Midnight),
            "snow" => Ok(ThemeId::Snow),
            "solar" => Ok(ThemeId::Solar),
            other => Err(format!(
                "unknown theme '{other}' (expected one of: midnight, snow, solar)"
            )),
        }
    }
}

/// An immutable visual theme.
///
/// `card_surface` is translucent; the capture pipeline composites it over
/// `background` so the exported bitmap is self-contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: ThemeId,
    pub label: &'static str,
    pub background: Rgba,
    pub card_surface: Rgba,
    pub text: Rgba,
    pub accent: Rgba,
    pub border: Rgba,
}

pub const MIDNIGHT: Theme = Theme {
    id: ThemeId::Midnight,
    label: "Midnight",
    background: Rgba::opaque(0x0a, 0x0a, 0x0b),
    card_surface: Rgba::with_alpha(20, 20, 22, 191),
    text: Rgba::opaque(0xff, 0xff, 0xff),
    accent: Rgba::opaque(0x63, 0x66, 0xf1),
    border: Rgba::with_alpha(255, 255, 255, 38),
};

pub const SNOW: Theme = Theme {
    id: ThemeId::Snow,
    label: "Snow",
    background: Rgba::opaque(0xf9, 0xfa, 0xfb),
    card_surface: Rgba::with_alpha(255, 255, 255, 179),
    text: Rgba::opaque(0x00, 0x00, 0x00),
    accent: Rgba::opaque(0x25, 0x63, 0xeb),
    border: Rgba::with_alpha(0, 0, 0, 26),
};

pub const SOLAR: Theme = Theme {
    id: ThemeId::Solar,
    label: "Solar",
    background: Rgba::opaque(0xfd, 0xfa, 0xf3),
    card_surface: Rgba::with_alpha(255, 252, 245, 204),
    text: Rgba::opaque(0x43, 0x34, 0x22),
    accent: Rgba::opaque(0xd9, 0x77, 0x06),
    border: Rgba::with_alpha(217, 119, 6, 51),
};

// Fixed switcher order.
const CATALOG: [Theme; 3] = [MIDNIGHT, SNOW, SOLAR];

/// The full catalog, in switcher order.
pub fn themes() -> &'static [Theme] {
    &CATALOG
}

/// The theme a fresh session starts with.
pub fn default_theme() -> &'static Theme {
    &CATALOG[0]
}

impl Theme {
    /// Looks up a catalog theme by key.
    pub fn by_id(id: ThemeId) -> &'static Theme {
        match id {
            ThemeId::Midnight => &CATALOG[0],
            ThemeId::Snow => &CATALOG[1],
            ThemeId::Solar => &CATALOG[2],
        }
    }
}
