//! Per-element directive resolution.
//!
//! Turns the optional `data-marker-*` attributes of a target into a complete
//! [`RevealConfig`]. Resolution never fails: anything missing or malformed
//! falls back to the configured defaults.

use std::fmt;

use marker_config::{MarkerConfig, ThemePalette};
use marker_dom::{Document, ElementId};
use serde::Serialize;
use tracing::debug;

use crate::animation::{EasingFunction, ScaleAxis};
use crate::scroll::ScrollStart;

/// Fallback stagger when neither the element nor the config gives a usable one.
pub const DEFAULT_STAGGER_MS: f64 = 100.0;
/// Fallback bar duration in seconds.
pub const DEFAULT_BAR_DURATION: f64 = 0.6;

/// Wipe direction of the bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "right" => Some(Self::Right),
            "left" => Some(Self::Left),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn axis(&self) -> ScaleAxis {
        match self {
            Self::Right | Self::Left => ScaleAxis::X,
            Self::Up | Self::Down => ScaleAxis::Y,
        }
    }

    /// Transform origin the bar collapses towards.
    pub fn origin(&self) -> &'static str {
        match self {
            Self::Right => "right center",
            Self::Left => "left center",
            Self::Up => "center top",
            Self::Down => "center bottom",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

/// Which end of a block the stagger starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StaggerStart {
    #[default]
    Start,
    End,
}

impl StaggerStart {
    /// `end` selects [`StaggerStart::End`]; everything else is `Start`.
    pub fn parse(value: &str) -> Self {
        if value.trim() == "end" {
            Self::End
        } else {
            Self::Start
        }
    }

    /// Stagger slot of line `index` out of `count`.
    pub fn index(&self, index: usize, count: usize) -> usize {
        match self {
            Self::Start => index,
            Self::End => count.saturating_sub(1).saturating_sub(index),
        }
    }
}

/// Fully resolved settings for one build of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    pub direction: Direction,
    pub color: String,
    pub scale_axis: ScaleAxis,
    pub transform_origin: &'static str,
    pub scroll_start: ScrollStart,
    pub stagger_start: StaggerStart,
    pub stagger_offset_seconds: f64,
    pub bar_duration: f64,
    pub bar_ease: EasingFunction,
}

impl RevealConfig {
    /// Start time of line `index` out of `count`, in seconds.
    pub fn line_offset(&self, index: usize, count: usize) -> f64 {
        self.stagger_start.index(index, count) as f64 * self.stagger_offset_seconds
    }
}

/// Reads directives off target elements.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    config: MarkerConfig,
}

impl ConfigResolver {
    pub fn new(config: MarkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// Resolve the configuration for `target`.
    pub fn resolve(&self, doc: &Document, target: ElementId) -> RevealConfig {
        let markup = &self.config.markup;
        let defaults = &self.config.defaults;

        let direction_raw = directive(doc, target, &markup.direction_attribute)
            .unwrap_or(defaults.direction.as_str());
        let direction = Direction::parse(direction_raw).unwrap_or_else(|| {
            debug!(%target, value = direction_raw, "unknown direction, using right");
            Direction::Right
        });

        let theme = directive(doc, target, &markup.theme_attribute)
            .unwrap_or(defaults.theme.as_str());
        let color = resolve_color(theme, &self.config.themes, doc);

        let scroll_raw = directive(doc, target, &markup.scroll_start_attribute)
            .unwrap_or(defaults.scroll_start.as_str());
        let scroll_start = ScrollStart::parse(scroll_raw).unwrap_or_else(|| {
            debug!(%target, value = scroll_raw, "unparseable scroll start");
            ScrollStart::parse(&defaults.scroll_start).unwrap_or_default()
        });

        let stagger_start = StaggerStart::parse(
            directive(doc, target, &markup.stagger_start_attribute)
                .unwrap_or(defaults.stagger_start.as_str()),
        );

        let default_stagger = if defaults.stagger_ms.is_finite() && defaults.stagger_ms >= 0.0 {
            defaults.stagger_ms
        } else {
            DEFAULT_STAGGER_MS
        };
        let stagger_ms = match directive(doc, target, &markup.stagger_attribute) {
            Some(raw) => parse_stagger_ms(raw).unwrap_or_else(|| {
                debug!(%target, value = raw, "invalid stagger, using default");
                default_stagger
            }),
            None => default_stagger,
        };

        RevealConfig {
            direction,
            color,
            scale_axis: direction.axis(),
            transform_origin: direction.origin(),
            scroll_start,
            stagger_start,
            stagger_offset_seconds: stagger_ms / 1000.0,
            bar_duration: self.bar_duration(),
            bar_ease: self.bar_ease(),
        }
    }

    fn bar_duration(&self) -> f64 {
        let seconds = self.config.bar.duration_seconds;
        if seconds.is_finite() && seconds >= 0.0 {
            seconds
        } else {
            DEFAULT_BAR_DURATION
        }
    }

    fn bar_ease(&self) -> EasingFunction {
        EasingFunction::parse(&self.config.bar.ease).unwrap_or_else(|| {
            debug!(ease = %self.config.bar.ease, "unknown ease, using power3.inOut");
            EasingFunction::default()
        })
    }
}

/// Attribute value, treating blank values as absent.
fn directive<'a>(doc: &'a Document, target: ElementId, name: &str) -> Option<&'a str> {
    doc.attribute(target, name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Resolve a theme directive to a concrete color.
///
/// Theme keys map through the palette. `--name` and `var(--name[, fallback])`
/// read the custom property from the document root; when it is unset the
/// `var()` fallback is used if present, else the directive string itself.
/// Anything else is taken as a literal color.
pub fn resolve_color(theme: &str, palette: &ThemePalette, doc: &Document) -> String {
    let theme = theme.trim();
    if let Some(color) = palette.get(theme) {
        return color.to_string();
    }
    if theme.starts_with("--") {
        return match doc.root_property(theme) {
            Some(value) => value.to_string(),
            None => {
                debug!(property = theme, "custom property unset");
                theme.to_string()
            }
        };
    }
    if let Some(inner) = theme
        .strip_prefix("var(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let (name, fallback) = match inner.split_once(',') {
            Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
            None => (inner.trim(), None),
        };
        if let Some(value) = doc.root_property(name) {
            return value.to_string();
        }
        if let Some(fallback) = fallback.filter(|f| !f.is_empty()) {
            return fallback.to_string();
        }
        debug!(property = name, "custom property unset");
        return theme.to_string();
    }
    theme.to_string()
}

/// Parse a stagger directive in milliseconds.
///
/// The leading numeric prefix is used, exponent included (`"150ms"` is 150,
/// `"1e2"` is 100). Returns `None`
/// when there is no number or it is negative or non-finite.
pub fn parse_stagger_ms(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let bytes = raw.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits(end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits(end + 1);
        end += 1 + fraction;
    }
    if whole + fraction == 0 {
        return None;
    }
    // exponent only when followed by digits, so "1em" stays 1
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent = digits(end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }
    raw[..end]
        .parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::Anchor;
    use marker_dom::document_from_html;

    fn target(html: &str) -> (Document, ElementId) {
        let doc = document_from_html(html).unwrap();
        let el = doc.elements_with_attribute("data-highlight-marker-reveal")[0];
        (doc, el)
    }

    #[test]
    fn defaults_apply_without_directives() {
        let (doc, el) = target("<p data-highlight-marker-reveal>text</p>");
        let config = ConfigResolver::default().resolve(&doc, el);

        assert_eq!(config.direction, Direction::Right);
        assert_eq!(config.color, "#C700EF");
        assert_eq!(config.scale_axis, ScaleAxis::X);
        assert_eq!(config.transform_origin, "right center");
        assert_eq!(config.scroll_start, ScrollStart::default());
        assert_eq!(config.stagger_start, StaggerStart::Start);
        assert!((config.stagger_offset_seconds - 0.1).abs() < 1e-12);
        assert_eq!(config.bar_duration, 0.6);
        assert_eq!(config.bar_ease, EasingFunction::default());
    }

    #[test]
    fn direction_table() {
        let cases = [
            ("right", ScaleAxis::X, "right center"),
            ("left", ScaleAxis::X, "left center"),
            ("up", ScaleAxis::Y, "center top"),
            ("down", ScaleAxis::Y, "center bottom"),
            ("diagonal", ScaleAxis::X, "right center"),
        ];
        for (value, axis, origin) in cases {
            let (doc, el) = target(&format!(
                r#"<p data-highlight-marker-reveal data-marker-direction="{value}">x</p>"#
            ));
            let config = ConfigResolver::default().resolve(&doc, el);
            assert_eq!(config.scale_axis, axis, "{value}");
            assert_eq!(config.transform_origin, origin, "{value}");
        }
    }

    #[test]
    fn empty_attributes_count_as_missing() {
        let (doc, el) = target(
            r#"<p data-highlight-marker-reveal data-marker-direction="" data-marker-theme=" "
                data-marker-stagger="">x</p>"#,
        );
        let config = ConfigResolver::default().resolve(&doc, el);
        assert_eq!(config.direction, Direction::Right);
        assert_eq!(config.color, "#C700EF");
        assert!((config.stagger_offset_seconds - 0.1).abs() < 1e-12);
    }

    #[test]
    fn explicit_directives() {
        let (doc, el) = target(
            r#"<p data-highlight-marker-reveal data-marker-direction="up"
                data-marker-theme="white" data-marker-scroll-start="center 50%"
                data-marker-stagger-start="end" data-marker-stagger="250">x</p>"#,
        );
        let config = ConfigResolver::default().resolve(&doc, el);
        assert_eq!(config.direction, Direction::Up);
        assert_eq!(config.color, "#FFFFFF");
        assert_eq!(
            config.scroll_start,
            ScrollStart {
                element: Anchor::Center.into(),
                viewport: Anchor::Percent(50.0).into()
            }
        );
        assert_eq!(config.stagger_start, StaggerStart::End);
        assert!((config.stagger_offset_seconds - 0.25).abs() < 1e-12);
    }

    #[test]
    fn malformed_values_fall_back() {
        let (doc, el) = target(
            r#"<p data-highlight-marker-reveal data-marker-scroll-start="whenever"
                data-marker-stagger-start="middle" data-marker-stagger="-40">x</p>"#,
        );
        let config = ConfigResolver::default().resolve(&doc, el);
        assert_eq!(config.scroll_start, ScrollStart::default());
        assert_eq!(config.stagger_start, StaggerStart::Start);
        assert!((config.stagger_offset_seconds - 0.1).abs() < 1e-12);
    }

    #[test]
    fn config_file_defaults_are_used() {
        let mut config = MarkerConfig::default();
        config.defaults.direction = "down".to_string();
        config.defaults.stagger_ms = 40.0;
        config.themes.insert("teal", "#00A3A3");
        config.defaults.theme = "teal".to_string();
        config.bar.ease = "bogus".to_string();

        let (doc, el) = target("<p data-highlight-marker-reveal>x</p>");
        let resolved = ConfigResolver::new(config).resolve(&doc, el);
        assert_eq!(resolved.direction, Direction::Down);
        assert_eq!(resolved.color, "#00A3A3");
        assert!((resolved.stagger_offset_seconds - 0.04).abs() < 1e-12);
        assert_eq!(resolved.bar_ease, EasingFunction::default());
    }

    #[test]
    fn colors_from_custom_properties() {
        let mut doc = document_from_html("<p>x</p>").unwrap();
        let palette = ThemePalette::default();
        assert_eq!(resolve_color("--brand-color", &palette, &doc), "--brand-color");
        assert_eq!(
            resolve_color("var(--brand-color, #123456)", &palette, &doc),
            "#123456"
        );
        assert_eq!(
            resolve_color("var(--brand-color)", &palette, &doc),
            "var(--brand-color)"
        );

        doc.set_root_property("--brand-color", "#ff0088");
        assert_eq!(resolve_color("--brand-color", &palette, &doc), "#ff0088");
        assert_eq!(
            resolve_color("var(--brand-color, #123456)", &palette, &doc),
            "#ff0088"
        );
        assert_eq!(resolve_color("rgb(1, 2, 3)", &palette, &doc), "rgb(1, 2, 3)");
        assert_eq!(resolve_color("pink", &palette, &doc), "#C700EF");
    }

    #[test]
    fn custom_property_from_stylesheet() {
        let (doc, el) = target(
            r#"<html><head><style>:root { --brand-color: #0a0b0c; }</style></head>
               <body><p data-highlight-marker-reveal data-marker-theme="--brand-color">x</p></body></html>"#,
        );
        let config = ConfigResolver::default().resolve(&doc, el);
        assert_eq!(config.color, "#0a0b0c");
    }

    #[test]
    fn stagger_parsing() {
        assert_eq!(parse_stagger_ms("150"), Some(150.0));
        assert_eq!(parse_stagger_ms("150ms"), Some(150.0));
        assert_eq!(parse_stagger_ms(" 12.5 "), Some(12.5));
        assert_eq!(parse_stagger_ms("0"), Some(0.0));
        assert_eq!(parse_stagger_ms(".5"), Some(0.5));
        assert_eq!(parse_stagger_ms("-5"), None);
        assert_eq!(parse_stagger_ms("fast"), None);
        assert_eq!(parse_stagger_ms(""), None);
        assert_eq!(parse_stagger_ms("-"), None);
        assert_eq!(parse_stagger_ms("."), None);
        assert_eq!(parse_stagger_ms("1e2"), Some(100.0));
        assert_eq!(parse_stagger_ms("2.5e1ms"), Some(25.0));
        assert_eq!(parse_stagger_ms("5E-1"), Some(0.5));
        assert_eq!(parse_stagger_ms("3e"), Some(3.0));
        assert_eq!(parse_stagger_ms("3e+"), Some(3.0));
        assert_eq!(parse_stagger_ms("1e400"), None);
    }

    #[test]
    fn stagger_slots() {
        assert_eq!(StaggerStart::Start.index(0, 3), 0);
        assert_eq!(StaggerStart::End.index(0, 3), 2);
        assert_eq!(StaggerStart::End.index(2, 3), 0);
    }
}
