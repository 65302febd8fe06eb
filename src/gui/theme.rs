use iced::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn background(&self) -> Color {
        match self {
            Theme::Light => Color::from_rgb(0.96, 0.95, 0.93),
            Theme::Dark => Color::from_rgb(0.09, 0.08, 0.07),
        }
    }

    pub fn card_background(&self) -> Color {
        match self {
            Theme::Light => Color::from_rgb(1.0, 1.0, 1.0),
            Theme::Dark => Color::from_rgb(0.20, 0.18, 0.16),
        }
    }

    pub fn text(&self) -> Color {
        match self {
            Theme::Light => Color::from_rgb(0.08, 0.07, 0.06),
            Theme::Dark => Color::from_rgb(0.98, 0.97, 0.95),
        }
    }

    pub fn secondary_text(&self) -> Color {
        match self {
            Theme::Light => Color::from_rgb(0.40, 0.37, 0.34),
            Theme::Dark => Color::from_rgb(0.78, 0.75, 0.70),
        }
    }

    // Amber, after the beverage.
    pub fn primary(&self) -> Color {
        match self {
            Theme::Light => Color::from_rgb(0.72, 0.48, 0.15),
            Theme::Dark => Color::from_rgb(0.95, 0.70, 0.30),
        }
    }

    pub fn success(&self) -> Color {
        match self {
            Theme::Light => Color::from_rgb(0.18, 0.62, 0.30),
            Theme::Dark => Color::from_rgb(0.30, 0.80, 0.45),
        }
    }

    pub fn danger(&self) -> Color {
        match self {
            Theme::Light => Color::from_rgb(0.85, 0.22, 0.20),
            Theme::Dark => Color::from_rgb(1.0, 0.35, 0.32),
        }
    }
}
