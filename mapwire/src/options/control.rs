use serde::{Deserialize, Serialize};

use crate::options::PropertyMap;

/// Corner of the map a control is placed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlPosition {
    /// Top left corner.
    TopLeft,
    /// Top right corner.
    #[default]
    TopRight,
    /// Bottom left corner.
    BottomLeft,
    /// Bottom right corner.
    BottomRight,
}

/// Whether a built-in control is shown, where, and with which options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlToggle<T> {
    shown: bool,
    position: ControlPosition,
    options: T,
}

impl<T> ControlToggle<T> {
    /// A shown control.
    pub fn shown(position: ControlPosition, options: T) -> Self {
        Self {
            shown: true,
            position,
            options,
        }
    }

    /// A hidden control.
    pub fn hidden(position: ControlPosition, options: T) -> Self {
        Self {
            shown: false,
            position,
            options,
        }
    }

    /// True if the control is added to the map.
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Position of the control.
    pub fn position(&self) -> ControlPosition {
        self.position
    }

    /// Control options.
    pub fn options(&self) -> &T {
        &self.options
    }
}

pub(super) fn default_scale_control() -> ControlToggle<ScaleControlOptions> {
    ControlToggle::hidden(ControlPosition::BottomRight, ScaleControlOptions::default())
}

pub(super) fn default_navigation_control() -> ControlToggle<NavigationControlOptions> {
    ControlToggle::hidden(ControlPosition::TopRight, NavigationControlOptions::default())
}

/// Unit of the scale control.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleUnit {
    /// Miles and feet.
    Imperial,
    /// Kilometers and meters.
    Metric,
    /// Nautical miles.
    Nautical,
}

/// Options of the scale control.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleControlOptions {
    /// Maximum width of the control in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    /// Distance unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<ScaleUnit>,
}

/// Options of the navigation (zoom and compass) control.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationControlOptions {
    /// Shows the compass button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_compass: Option<bool>,
    /// Shows zoom buttons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_zoom: Option<bool>,
    /// Shows pitch on the compass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualize_pitch: Option<bool>,
}

/// Buttons of the draw control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawControls {
    /// Draw point button.
    pub point: bool,
    /// Draw line button.
    pub line_string: bool,
    /// Draw polygon button.
    pub polygon: bool,
    /// Delete button.
    pub trash: bool,
    /// Combine features button.
    pub combine_features: bool,
    /// Uncombine features button.
    pub uncombine_features: bool,
}

impl Default for DrawControls {
    fn default() -> Self {
        Self {
            point: true,
            line_string: false,
            polygon: true,
            trash: true,
            combine_features: false,
            uncombine_features: false,
        }
    }
}

/// Options of the draw control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawOptions {
    /// Shows every button not explicitly configured in `controls`.
    pub display_controls_default: bool,
    /// Buttons of the control.
    pub controls: DrawControls,
    /// Any other options of the draw plugin.
    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            display_controls_default: false,
            controls: DrawControls::default(),
            extra: PropertyMap::new(),
        }
    }
}

/// Control that can be added to the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Scale bar.
    Scale(ScaleControlOptions),
    /// Zoom and compass buttons.
    Navigation(NavigationControlOptions),
    /// Shape editor.
    Draw(DrawOptions),
}
