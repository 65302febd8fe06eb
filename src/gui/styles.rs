use iced::widget::button::{Appearance as ButtonAppearance, StyleSheet as ButtonStyleSheet};
use iced::widget::checkbox::{Appearance as CheckboxAppearance, StyleSheet as CheckboxStyleSheet};
use iced::widget::container::{Appearance as ContainerAppearance, StyleSheet as ContainerStyleSheet};
use iced::widget::scrollable::{Appearance as ScrollableAppearance, StyleSheet as ScrollableStyleSheet};
use iced::widget::text_input::{Appearance as TextInputAppearance, StyleSheet as TextInputStyleSheet};
use iced::{Border, Color};

fn scale(color: Color, factor: f32) -> Color {
    Color {
        r: (color.r * factor).clamp(0.0, 1.0),
        g: (color.g * factor).clamp(0.0, 1.0),
        b: (color.b * factor).clamp(0.0, 1.0),
        a: color.a,
    }
}

pub struct RoundedButtonStyle {
    pub is_primary: bool,
    pub radius: f32,
    pub primary_color: Color,
    pub text_color: Color,
}

impl ButtonStyleSheet for RoundedButtonStyle {
    type Style = iced::Theme;

    fn active(&self, _style: &Self::Style) -> ButtonAppearance {
        let background = if self.is_primary {
            self.primary_color
        } else {
            Color::from_rgba(0.5, 0.5, 0.5, 0.25)
        };

        ButtonAppearance {
            background: Some(iced::Background::Color(background)),
            border: Border {
                radius: self.radius.into(),
                width: if self.is_primary { 0.0 } else { 1.0 },
                color: if self.is_primary {
                    Color::TRANSPARENT
                } else {
                    Color::from_rgba(
                        self.primary_color.r,
                        self.primary_color.g,
                        self.primary_color.b,
                        0.4,
                    )
                },
            },
            text_color: self.text_color,
            shadow: iced::Shadow {
                color: Color::from_rgba(0.0, 0.0, 0.0, 0.3),
                offset: iced::Vector::new(0.0, 2.0),
                blur_radius: 6.0,
            },
            shadow_offset: iced::Vector::default(),
        }
    }

    fn hovered(&self, style: &Self::Style) -> ButtonAppearance {
        let mut appearance = self.active(style);
        if self.is_primary {
            appearance.background =
                Some(iced::Background::Color(scale(self.primary_color, 1.15)));
        } else {
            appearance.background =
                Some(iced::Background::Color(Color::from_rgba(0.5, 0.5, 0.5, 0.35)));
        }
        appearance
    }

    fn pressed(&self, style: &Self::Style) -> ButtonAppearance {
        let mut appearance = self.active(style);
        if self.is_primary {
            appearance.background =
                Some(iced::Background::Color(scale(self.primary_color, 0.85)));
        }
        appearance.shadow = iced::Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.2),
            offset: iced::Vector::new(0.0, 1.0),
            blur_radius: 2.0,
        };
        appearance
    }

    fn disabled(&self, style: &Self::Style) -> ButtonAppearance {
        let mut appearance = self.active(style);
        appearance.background =
            Some(iced::Background::Color(Color::from_rgba(0.5, 0.5, 0.5, 0.1)));
        appearance.text_color = Color::from_rgba(0.5, 0.5, 0.5, 0.5);
        appearance
    }
}

pub struct RoundedContainerStyle {
    pub radius: f32,
    pub background: Option<Color>,
    pub elevation: f32,
}

impl ContainerStyleSheet for RoundedContainerStyle {
    type Style = iced::Theme;

    fn appearance(&self, style: &Self::Style) -> ContainerAppearance {
        let palette = style.palette();
        let background = self.background.unwrap_or(palette.background);

        // elevation 0.0 is the flat window background; anything above it
        // gets a border and a soft drop shadow
        let (border_width, shadow_opacity) = if self.elevation == 0.0 {
            (0.0, 0.0)
        } else {
            (1.0, (0.15 + self.elevation * 0.1).min(0.5))
        };

        ContainerAppearance {
            background: Some(iced::Background::Color(background)),
            border: Border {
                radius: self.radius.into(),
                width: border_width,
                color: Color::from_rgba(0.5, 0.45, 0.4, 0.3),
            },
            shadow: iced::Shadow {
                color: Color::from_rgba(0.0, 0.0, 0.0, shadow_opacity),
                offset: iced::Vector::new(0.0, self.elevation * 2.0),
                blur_radius: self.elevation * 6.0,
            },
            text_color: None,
        }
    }
}

pub struct CustomScrollableStyle {
    pub primary_color: Color,
    pub border_radius: f32,
}

impl ScrollableStyleSheet for CustomScrollableStyle {
    type Style = iced::Theme;

    fn active(&self, _style: &Self::Style) -> ScrollableAppearance {
        ScrollableAppearance {
            container: ContainerAppearance {
                background: None,
                border: Border::default(),
                ..Default::default()
            },
            scrollbar: iced::widget::scrollable::Scrollbar {
                background: Some(iced::Background::Color(Color::TRANSPARENT)),
                border: Border {
                    radius: 0.0.into(),
                    width: 0.0,
                    color: Color::TRANSPARENT,
                },
                scroller: iced::widget::scrollable::Scroller {
                    color: Color {
                        a: 0.5,
                        ..self.primary_color
                    },
                    border: Border {
                        radius: (self.border_radius * 0.5).into(),
                        width: 0.0,
                        color: Color::TRANSPARENT,
                    },
                },
            },
            gap: None,
        }
    }

    fn hovered(&self, style: &Self::Style, _is_mouse_over_scrollbar: bool) -> ScrollableAppearance {
        let mut appearance = self.active(style);
        appearance.scrollbar.scroller.color = Color {
            a: 0.7,
            ..self.primary_color
        };
        appearance
    }

    fn dragging(&self, style: &Self::Style) -> ScrollableAppearance {
        let mut appearance = self.active(style);
        appearance.scrollbar.scroller.color = Color {
            a: 0.9,
            ..self.primary_color
        };
        appearance
    }
}

pub struct AccentTextInputStyle {
    pub radius: f32,
    pub primary_color: Color,
    pub background_color: Color,
    pub text_color: Color,
}

impl TextInputStyleSheet for AccentTextInputStyle {
    type Style = iced::Theme;

    fn active(&self, _style: &Self::Style) -> TextInputAppearance {
        TextInputAppearance {
            background: iced::Background::Color(self.background_color),
            border: Border {
                radius: self.radius.into(),
                width: 1.0,
                color: self.primary_color,
            },
            icon_color: self.text_color,
        }
    }

    fn focused(&self, _style: &Self::Style) -> TextInputAppearance {
        TextInputAppearance {
            background: iced::Background::Color(self.background_color),
            border: Border {
                radius: self.radius.into(),
                width: 2.0,
                color: self.primary_color,
            },
            icon_color: self.text_color,
        }
    }

    fn placeholder_color(&self, _style: &Self::Style) -> Color {
        Color {
            a: 0.5,
            ..self.text_color
        }
    }

    fn value_color(&self, _style: &Self::Style) -> Color {
        self.text_color
    }

    fn disabled_color(&self, _style: &Self::Style) -> Color {
        Color {
            a: 0.4,
            ..self.text_color
        }
    }

    fn selection_color(&self, _style: &Self::Style) -> Color {
        Color {
            a: 0.35,
            ..self.primary_color
        }
    }

    fn disabled(&self, style: &Self::Style) -> TextInputAppearance {
        let mut appearance = self.active(style);
        appearance.border.color = Color {
            a: 0.4,
            ..self.primary_color
        };
        appearance
    }
}

pub struct AccentCheckboxStyle {
    pub radius: f32,
    pub primary_color: Color,
    pub text_color: Color,
}

impl CheckboxStyleSheet for AccentCheckboxStyle {
    type Style = iced::Theme;

    fn active(&self, _style: &Self::Style, is_checked: bool) -> CheckboxAppearance {
        CheckboxAppearance {
            background: iced::Background::Color(if is_checked {
                self.primary_color
            } else {
                Color::from_rgba(0.5, 0.5, 0.5, 0.15)
            }),
            icon_color: if is_checked {
                Color::BLACK
            } else {
                Color::TRANSPARENT
            },
            border: Border {
                radius: self.radius.into(),
                width: 2.0,
                color: self.primary_color,
            },
            text_color: Some(self.text_color),
        }
    }

    fn hovered(&self, style: &Self::Style, is_checked: bool) -> CheckboxAppearance {
        let mut appearance = self.active(style, is_checked);
        appearance.border.color = scale(self.primary_color, 1.15);
        appearance
    }

    fn disabled(&self, style: &Self::Style, is_checked: bool) -> CheckboxAppearance {
        let mut appearance = self.active(style, is_checked);
        appearance.background =
            iced::Background::Color(Color::from_rgba(0.5, 0.5, 0.5, 0.1));
        appearance.border.color = Color {
            a: 0.4,
            ..self.primary_color
        };
        appearance
    }
}
