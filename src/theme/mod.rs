//! Theming for toast appearance

use serde::{Deserialize, Serialize};

use crate::toast::ToastVariant;

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Color with explicit alpha
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Toast theme configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Toast background
    pub background: Color,

    /// Message text color
    pub text_primary: Color,

    /// Success accent
    pub success: Color,

    /// Error accent
    pub error: Color,

    /// Warning accent
    pub warning: Color,

    /// Info accent
    pub info: Color,
}

impl Theme {
    /// COSMIC-inspired dark theme
    pub fn cosmic_dark() -> Self {
        Self {
            background: Color::new(30, 30, 30, 230),
            text_primary: Color::new(255, 255, 255, 255),
            success: Color::rgb(46, 160, 67),
            error: Color::rgb(229, 72, 77),
            warning: Color::rgb(245, 166, 35),
            info: Color::rgb(52, 120, 246), // COSMIC blue
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            background: Color::new(255, 255, 255, 240),
            text_primary: Color::new(30, 30, 30, 255),
            success: Color::rgb(26, 127, 55),
            error: Color::rgb(207, 34, 46),
            warning: Color::rgb(191, 135, 0),
            info: Color::rgb(9, 105, 218),
        }
    }

    /// Accent for a toast variant
    pub fn variant_color(&self, variant: ToastVariant) -> Color {
        match variant {
            ToastVariant::Success => self.success,
            ToastVariant::Error => self.error,
            ToastVariant::Warning => self.warning,
            ToastVariant::Info => self.info,
        }
    }

    /// Load theme by name
    pub fn from_name(name: &str) -> Self {
        match name {
            "cosmic_dark" => Self::cosmic_dark(),
            "light" => Self::light(),
            _ => Self::cosmic_dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::cosmic_dark()
    }
}
