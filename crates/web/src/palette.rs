//! Named color variables and the CSS helpers built on them.

use std::fmt::Write as _;

use serde::Serialize;

/// One themeable color, with its light and dark values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorVariable {
    pub name: &'static str,
    pub light: &'static str,
    pub dark: &'static str,
}

impl ColorVariable {
    const fn new(name: &'static str, light: &'static str, dark: &'static str) -> Self {
        Self { name, light, dark }
    }

    /// Custom property name, e.g. `chatBgPrimary` -> `--chat-bg-primary`.
    pub fn css_name(&self) -> String {
        css_variable_name(self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorGroup {
    pub label: &'static str,
    pub colors: &'static [ColorVariable],
}

pub const PALETTE: &[ColorGroup] = &[
    ColorGroup {
        label: "Base",
        colors: &[
            ColorVariable::new("background", "#f7f7fb", "#121218"),
            ColorVariable::new("foreground", "#171717", "#ededed"),
        ],
    },
    ColorGroup {
        label: "Primary",
        colors: &[
            ColorVariable::new("primary50", "#f5f3ff", "#1e1833"),
            ColorVariable::new("primary100", "#ede9fe", "#2a2148"),
            ColorVariable::new("primary200", "#ddd6fe", "#3b2f66"),
            ColorVariable::new("primary300", "#c4b5fd", "#523f8f"),
            ColorVariable::new("primary400", "#a78bfa", "#6d52bd"),
            ColorVariable::new("primary500", "#8b5cf6", "#8b5cf6"),
            ColorVariable::new("primary600", "#7c3aed", "#a78bfa"),
            ColorVariable::new("primary700", "#6d28d9", "#c4b5fd"),
            ColorVariable::new("primary800", "#5b21b6", "#ddd6fe"),
            ColorVariable::new("primary900", "#4c1d95", "#ede9fe"),
        ],
    },
    ColorGroup {
        label: "Blue",
        colors: &[
            ColorVariable::new("blue50", "#eff6ff", "#0f1b33"),
            ColorVariable::new("blue100", "#dbeafe", "#132447"),
            ColorVariable::new("blue200", "#bfdbfe", "#1a3366"),
            ColorVariable::new("blue300", "#93c5fd", "#1f4b99"),
            ColorVariable::new("blue400", "#60a5fa", "#2f6bd1"),
            ColorVariable::new("blue500", "#3b82f6", "#3b82f6"),
            ColorVariable::new("blue600", "#2563eb", "#60a5fa"),
            ColorVariable::new("blue700", "#1d4ed8", "#93c5fd"),
            ColorVariable::new("blue800", "#1e40af", "#bfdbfe"),
            ColorVariable::new("blue900", "#1e3a8a", "#dbeafe"),
        ],
    },
    ColorGroup {
        label: "Gradient",
        colors: &[
            ColorVariable::new("purpleGradient1", "#a18cd1", "#5b4b8a"),
            ColorVariable::new("purpleGradient2", "#fbc2eb", "#7a4f74"),
            ColorVariable::new("purpleGradient3", "#8e9efc", "#3f4d9c"),
            ColorVariable::new("purpleGradient4", "#c2a5fb", "#5e4a99"),
        ],
    },
    ColorGroup {
        label: "Chat",
        colors: &[
            ColorVariable::new("chatBgPrimary", "#f3f0ff", "#1a1726"),
            ColorVariable::new("chatBgSecondary", "#ffffff", "#221f31"),
            ColorVariable::new("chatBgTertiary", "#ede9fe", "#2b2740"),
            ColorVariable::new("chatBgQuaternary", "#e0e7ff", "#2d3354"),
            ColorVariable::new("chatBgQuinary", "#f8fafc", "#191b24"),
        ],
    },
    ColorGroup {
        label: "Buttons",
        colors: &[
            ColorVariable::new("btnPrimary", "#8b5cf6", "#7c3aed"),
            ColorVariable::new("btnPrimaryHover", "#7c3aed", "#8b5cf6"),
            ColorVariable::new("btnSecondary", "#3b82f6", "#2563eb"),
            ColorVariable::new("btnSecondaryHover", "#2563eb", "#3b82f6"),
        ],
    },
    ColorGroup {
        label: "Text",
        colors: &[
            ColorVariable::new("textPrimary", "#1f1b2e", "#ececf4"),
            ColorVariable::new("textSecondary", "#ffffff", "#ffffff"),
            ColorVariable::new("textTertiary", "#4b4763", "#b8b5cc"),
            ColorVariable::new("textMuted", "#8a87a0", "#7f7c96"),
            ColorVariable::new("textAccent", "#7c3aed", "#c4b5fd"),
        ],
    },
    ColorGroup {
        label: "Borders",
        colors: &[
            ColorVariable::new("borderPrimary", "#e4e0f5", "#332f45"),
            ColorVariable::new("borderSecondary", "#a78bfa", "#6d52bd"),
            ColorVariable::new("borderAccent", "#8b5cf6", "#a78bfa"),
        ],
    },
    ColorGroup {
        label: "Shadows",
        colors: &[
            ColorVariable::new("shadowPrimary", "#8b5cf61f", "#0000005c"),
            ColorVariable::new("shadowSecondary", "#3b82f61a", "#00000047"),
            ColorVariable::new("shadowTertiary", "#1f1b2e14", "#00000033"),
            ColorVariable::new("shadowQuaternary", "#1f1b2e0a", "#0000001f"),
            ColorVariable::new("shadowAccent", "#8b5cf640", "#a78bfa40"),
        ],
    },
    ColorGroup {
        label: "Login",
        colors: &[
            ColorVariable::new("loginPrimary", "#6d28d9", "#a78bfa"),
            ColorVariable::new("loginSecondary", "#3b82f6", "#60a5fa"),
            ColorVariable::new("loginAccent", "#f472b6", "#f9a8d4"),
            ColorVariable::new("loginBg", "#f5f3ff", "#15121f"),
        ],
    },
    ColorGroup {
        label: "Surface",
        colors: &[
            ColorVariable::new("white", "#ffffff", "#1c1a26"),
            ColorVariable::new("whiteTransparent82", "#ffffffd1", "#1c1a26d1"),
            ColorVariable::new("whiteTransparent7", "#ffffff12", "#ffffff12"),
            ColorVariable::new("bgLight", "#fafaff", "#16141f"),
            ColorVariable::new("bgWhite", "#ffffff", "#1c1a26"),
        ],
    },
    ColorGroup {
        label: "Status",
        colors: &[
            ColorVariable::new("success", "#16a34a", "#4ade80"),
            ColorVariable::new("warning", "#d97706", "#fbbf24"),
            ColorVariable::new("error", "#dc2626", "#f87171"),
            ColorVariable::new("info", "#2563eb", "#60a5fa"),
        ],
    },
];

pub fn find(name: &str) -> Option<&'static ColorVariable> {
    PALETTE
        .iter()
        .flat_map(|group| group.colors.iter())
        .find(|color| color.name == name)
}

/// Converts a camelCase variable key into its `--kebab-case` custom property name.
///
/// Digits that follow a letter start a new segment, so `primary500` maps to `--primary-500`.
pub fn css_variable_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 4);
    name.push_str("--");
    let mut previous: Option<char> = None;
    for ch in key.chars() {
        let boundary = match previous {
            Some(prev) => {
                ch.is_ascii_uppercase() || (ch.is_ascii_digit() && prev.is_ascii_alphabetic())
            }
            None => false,
        };
        if boundary {
            name.push('-');
        }
        name.push(ch.to_ascii_lowercase());
        previous = Some(ch);
    }
    name
}

/// Light values on `:root`, dark values on `[data-theme="dark"]`.
pub fn stylesheet() -> String {
    let mut css = String::from(":root {\n");
    for color in PALETTE.iter().flat_map(|group| group.colors.iter()) {
        let _ = writeln!(css, "  {}: {};", color.css_name(), color.light);
    }
    css.push_str("}\n\n[data-theme=\"dark\"] {\n");
    for color in PALETTE.iter().flat_map(|group| group.colors.iter()) {
        let _ = writeln!(css, "  {}: {};", color.css_name(), color.dark);
    }
    css.push_str("}\n");
    css
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parses `#rrggbb` (a leading `#` is optional, trailing alpha digits are ignored).
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        };

        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// WCAG relative luminance.
    pub fn luminance(&self) -> f64 {
        let linear = |channel: u8| {
            let value = f64::from(channel) / 255.0;
            if value <= 0.03928 {
                value / 12.92
            } else {
                ((value + 0.055) / 1.055).powf(2.4)
            }
        };

        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }
}

/// `linear-gradient(direction, c0 0%, ..., cn 100%)` with evenly spaced stops.
pub fn create_gradient(colors: &[&str], direction: &str) -> String {
    let last = colors.len().saturating_sub(1);
    let stops = colors
        .iter()
        .enumerate()
        .map(|(index, color)| {
            let percentage = if last == 0 {
                0.0
            } else {
                index as f64 / last as f64 * 100.0
            };
            format!("{color} {}%", format_number(percentage))
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("linear-gradient({direction}, {stops})")
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSpec {
    pub opacity: f64,
    pub blur: f64,
    pub spread: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for ShadowSpec {
    fn default() -> Self {
        Self {
            opacity: 0.1,
            blur: 8.0,
            spread: 0.0,
            offset_x: 0.0,
            offset_y: 2.0,
        }
    }
}

/// `box-shadow` value in `x y blur spread rgba(...)` order; `None` for a malformed color.
pub fn create_shadow(color: &str, shadow: ShadowSpec) -> Option<String> {
    let rgba = hex_to_rgba(color, shadow.opacity)?;
    Some(format!(
        "{}px {}px {}px {}px {rgba}",
        format_number(shadow.offset_x),
        format_number(shadow.offset_y),
        format_number(shadow.blur),
        format_number(shadow.spread),
    ))
}

pub fn hex_to_rgba(hex: &str, alpha: f64) -> Option<String> {
    let Rgb { r, g, b } = Rgb::parse_hex(hex)?;
    Some(format!("rgba({r}, {g}, {b}, {})", format_number(alpha)))
}

/// Contrast ratio between two colors, from 1.0 (identical) to 21.0 (black on white).
pub fn contrast_ratio(foreground: &str, background: &str) -> Option<f64> {
    let first = Rgb::parse_hex(foreground)?.luminance();
    let second = Rgb::parse_hex(background)?.luminance();
    let (lighter, darker) = if first >= second {
        (first, second)
    } else {
        (second, first)
    };

    Some((lighter + 0.05) / (darker + 0.05))
}

// Integral values print without a fractional part, like CSS authors write them.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.4}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn css_names_split_words_and_numbers() {
        assert_eq!(css_variable_name("chatBgPrimary"), "--chat-bg-primary");
        assert_eq!(css_variable_name("primary500"), "--primary-500");
        assert_eq!(css_variable_name("whiteTransparent82"), "--white-transparent-82");
        assert_eq!(css_variable_name("background"), "--background");
    }

    #[test]
    fn gradient_spreads_stops_evenly() {
        assert_eq!(
            create_gradient(&["#000", "#111", "#222"], "90deg"),
            "linear-gradient(90deg, #000 0%, #111 50%, #222 100%)"
        );
        assert_eq!(
            create_gradient(&["#a", "#b", "#c", "#d"], "to right"),
            "linear-gradient(to right, #a 0%, #b 33.3333%, #c 66.6667%, #d 100%)"
        );
        assert_eq!(create_gradient(&["#abc"], "90deg"), "linear-gradient(90deg, #abc 0%)");
    }

    #[test]
    fn shadow_and_rgba_formatting() {
        assert_eq!(
            hex_to_rgba("#8b5cf6", 0.5).as_deref(),
            Some("rgba(139, 92, 246, 0.5)")
        );
        assert_eq!(
            create_shadow("#000000", ShadowSpec::default()).as_deref(),
            Some("0px 2px 8px 0px rgba(0, 0, 0, 0.1)")
        );
        assert_eq!(hex_to_rgba("#zzzzzz", 1.0), None);
        assert_eq!(hex_to_rgba("#abc", 1.0), None);
    }

    #[test]
    fn contrast_ratio_bounds() {
        let max = contrast_ratio("#000000", "#ffffff").expect("ratio");
        assert!((max - 21.0).abs() < 1e-9);

        let same = contrast_ratio("#777777", "#777777").expect("ratio");
        assert!((same - 1.0).abs() < 1e-9);

        let forward = contrast_ratio("#8b5cf6", "#ffffff").expect("ratio");
        let backward = contrast_ratio("#ffffff", "#8b5cf6").expect("ratio");
        assert!((forward - backward).abs() < 1e-12);
    }

    #[test]
    fn stylesheet_declares_every_variable_for_both_themes() {
        let css = stylesheet();
        let count = PALETTE.iter().map(|group| group.colors.len()).sum::<usize>();

        assert_eq!(css.matches("--chat-bg-primary:").count(), 2);
        assert_eq!(css.matches(": #").count(), count * 2);
        assert!(css.contains("[data-theme=\"dark\"]"));
        assert_eq!(find("textPrimary").map(|color| color.light), Some("#1f1b2e"));
    }
}
