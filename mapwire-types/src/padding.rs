use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Padding in pixels added to each side of the map viewport when fitting bounds.
///
/// Deserializes from either a single number (same padding on all sides) or an object with
/// `top`, `bottom`, `left` and `right` fields.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PaddingRepr", into = "PaddingRepr")]
pub struct Padding {
    /// Top padding.
    pub top: f64,
    /// Bottom padding.
    pub bottom: f64,
    /// Left padding.
    pub left: f64,
    /// Right padding.
    pub right: f64,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PaddingRepr {
    Uniform(f64),
    Sides {
        top: f64,
        bottom: f64,
        left: f64,
        right: f64,
    },
}

impl Padding {
    /// Same padding on all sides.
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }

    /// Returns the value if the padding is the same on all sides.
    pub fn as_uniform(&self) -> Option<f64> {
        let Self {
            top,
            bottom,
            left,
            right,
        } = *self;
        (top == bottom && bottom == left && left == right).then_some(top)
    }

    fn validate(self) -> Result<Self, TypesError> {
        for value in [self.top, self.bottom, self.left, self.right] {
            if !value.is_finite() || value < 0.0 {
                return Err(TypesError::InvalidPadding(value));
            }
        }

        Ok(self)
    }
}

impl From<f64> for Padding {
    fn from(value: f64) -> Self {
        Self::uniform(value)
    }
}

impl TryFrom<PaddingRepr> for Padding {
    type Error = TypesError;

    fn try_from(value: PaddingRepr) -> Result<Self, Self::Error> {
        match value {
            PaddingRepr::Uniform(value) => Padding::uniform(value),
            PaddingRepr::Sides {
                top,
                bottom,
                left,
                right,
            } => Padding {
                top,
                bottom,
                left,
                right,
            },
        }
        .validate()
    }
}

impl From<Padding> for PaddingRepr {
    fn from(value: Padding) -> Self {
        match value.as_uniform() {
            Some(uniform) => PaddingRepr::Uniform(uniform),
            None => PaddingRepr::Sides {
                top: value.top,
                bottom: value.bottom,
                left: value.left,
                right: value.right,
            },
        }
    }
}
