use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Conjunto cerrado de gestos reconocidos.
/// "Ningún gesto" se representa como `Option::<Gesture>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    PinchZoom,
    OpenPalm,
    PeaceSign,
    Fist,
    ThumbsUp,
    Pointing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Gesto desconocido: {0:?}")]
pub struct GestureParseError(pub String);

impl Gesture {
    pub const ALL: [Gesture; 6] = [
        Gesture::PinchZoom,
        Gesture::OpenPalm,
        Gesture::PeaceSign,
        Gesture::Fist,
        Gesture::ThumbsUp,
        Gesture::Pointing,
    ];

    /// Nombre que recibe el handler `on_gesture_detected`
    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::PinchZoom => "pinch_zoom",
            Gesture::OpenPalm => "open_palm",
            Gesture::PeaceSign => "peace_sign",
            Gesture::Fist => "fist",
            Gesture::ThumbsUp => "thumbs_up",
            Gesture::Pointing => "pointing",
        }
    }

    /// Título para el panel de estado
    pub fn title(&self) -> &'static str {
        match self {
            Gesture::PinchZoom => "Pinch Zoom",
            Gesture::OpenPalm => "Open Palm",
            Gesture::PeaceSign => "Peace Sign",
            Gesture::Fist => "Fist",
            Gesture::ThumbsUp => "Thumbs Up",
            Gesture::Pointing => "Pointing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Gesture::PinchZoom => "Zooming in...",
            Gesture::OpenPalm => "Reset zoom",
            Gesture::PeaceSign => "Scrolling up",
            Gesture::Fist => "Scrolling down",
            Gesture::ThumbsUp => "Hello!",
            Gesture::Pointing => "Pointer active",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gesture {
    type Err = GestureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| GestureParseError(s.to_string()))
    }
}
