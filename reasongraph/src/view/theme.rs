//! Theme-aware color palette for Reasongraph.
//!
//! Panels take their colors from the iced theme. The canvas uses its own
//! palette so node types stay recognizable in both light and dark mode.

use iced::{Color, Theme};

use reasongraph_common::NodeType;

/// Get colors from the theme's extended palette.
pub struct ThemeColors<'a> {
    theme: &'a Theme,
}

impl<'a> ThemeColors<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn palette(&self) -> &iced::theme::palette::Extended {
        self.theme.extended_palette()
    }

    // ========================================================================
    // Panel Colors
    // ========================================================================

    pub fn background(&self) -> Color {
        self.palette().background.base.color
    }

    /// Stronger background (cards, panels).
    pub fn background_strong(&self) -> Color {
        self.palette().background.strong.color
    }

    pub fn text(&self) -> Color {
        self.palette().background.base.text
    }

    /// Muted/secondary text color.
    pub fn text_muted(&self) -> Color {
        self.palette().background.weak.text
    }

    /// Dimmed text (hints, placeholders).
    pub fn text_dimmed(&self) -> Color {
        mix(self.text(), self.background(), 0.5)
    }

    pub fn primary(&self) -> Color {
        self.palette().primary.base.color
    }

    pub fn danger(&self) -> Color {
        self.palette().danger.base.color
    }

    pub fn success(&self) -> Color {
        self.palette().success.base.color
    }

    pub fn border(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.25, 0.25, 0.3)
        } else {
            Color::from_rgb(0.8, 0.8, 0.82)
        }
    }

    // ========================================================================
    // Canvas Colors
    // ========================================================================

    pub fn canvas_background(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.08, 0.08, 0.1)
        } else {
            Color::from_rgb(0.98, 0.98, 0.99)
        }
    }

    /// Dot grid behind the nodes.
    pub fn canvas_grid(&self) -> Color {
        if self.is_dark() {
            Color::from_rgba(0.42, 0.45, 0.5, 0.35)
        } else {
            Color::from_rgba(0.42, 0.45, 0.5, 0.2)
        }
    }

    /// Connection lines.
    pub fn edge(&self) -> Color {
        Color::from_rgba(0.42, 0.45, 0.5, 0.6)
    }

    /// Overlay panels drawn on the canvas (zoom indicator, hints).
    pub fn canvas_panel(&self) -> Color {
        if self.is_dark() {
            Color::from_rgba(0.12, 0.12, 0.14, 0.9)
        } else {
            Color::from_rgba(1.0, 1.0, 1.0, 0.92)
        }
    }

    /// Fill of a node card.
    pub fn node_fill(&self, kind: NodeType) -> Color {
        let accent = self.node_accent(kind);
        if self.is_dark() {
            mix(accent, Color::from_rgb(0.1, 0.1, 0.12), 0.25)
        } else {
            mix(accent, Color::WHITE, 0.12)
        }
    }

    /// Border and badge color of a node type.
    pub fn node_accent(&self, kind: NodeType) -> Color {
        match kind {
            NodeType::Question => Color::from_rgb(0.58, 0.2, 0.92),
            NodeType::Reasoning => Color::from_rgb(0.15, 0.39, 0.92),
            NodeType::Hypothesis => Color::from_rgb(0.92, 0.35, 0.05),
            NodeType::Branch => Color::from_rgb(0.09, 0.64, 0.29),
            NodeType::Conclusion => Color::from_rgb(0.86, 0.15, 0.15),
        }
    }

    pub fn node_text(&self) -> Color {
        if self.is_dark() {
            Color::from_rgb(0.92, 0.92, 0.94)
        } else {
            Color::from_rgb(0.1, 0.1, 0.12)
        }
    }

    // ========================================================================
    // Interaction Rings
    // ========================================================================

    pub fn ring_selected(&self) -> Color {
        Color::from_rgb(0.38, 0.65, 0.98)
    }

    pub fn ring_link_source(&self) -> Color {
        Color::from_rgb(0.96, 0.62, 0.04)
    }

    pub fn ring_link_candidate(&self) -> Color {
        Color::from_rgb(0.2, 0.83, 0.6)
    }

    pub fn ring_editing(&self) -> Color {
        self.primary()
    }

    /// Banner shown while a link is armed.
    pub fn link_banner(&self) -> Color {
        if self.is_dark() {
            Color::from_rgba(0.35, 0.25, 0.05, 0.92)
        } else {
            Color::from_rgba(1.0, 0.98, 0.92, 0.95)
        }
    }

    pub fn is_dark(&self) -> bool {
        self.palette().is_dark
    }
}

/// Convenience function to create ThemeColors.
pub fn colors(theme: &Theme) -> ThemeColors<'_> {
    ThemeColors::new(theme)
}

/// Blend `a` over `b` with weight `t` for `a`.
fn mix(a: Color, b: Color, t: f32) -> Color {
    Color::from_rgb(
        a.r * t + b.r * (1.0 - t),
        a.g * t + b.g * (1.0 - t),
        a.b * t + b.b * (1.0 - t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_types_have_distinct_accents() {
        let theme = Theme::Light;
        let colors = colors(&theme);
        for (i, a) in NodeType::ALL.iter().enumerate() {
            for b in &NodeType::ALL[i + 1..] {
                assert_ne!(colors.node_accent(*a), colors.node_accent(*b));
            }
        }
    }

    #[test]
    fn test_mix_endpoints() {
        assert_eq!(mix(Color::WHITE, Color::BLACK, 1.0), Color::WHITE);
        assert_eq!(mix(Color::WHITE, Color::BLACK, 0.0), Color::BLACK);
    }
}
