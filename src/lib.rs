//! ZENA - control por gestos de mano.
//!
//! Un detector externo entrega 21 landmarks por frame; aquí se clasifican en
//! uno de seis gestos, se filtran con un anti-rebote y se traducen en
//! zoom, scroll y respuestas habladas.

pub mod actions;
pub mod config;
pub mod csv_loader;
pub mod emission_gate;
pub mod gesture;
pub mod gesture_classifier;
pub mod hid;
pub mod landmark_source;
pub mod session;
pub mod types;
pub mod voice;

pub use emission_gate::{should_emit, EmissionGate, EmissionState, GateParams};
pub use gesture::Gesture;
pub use gesture_classifier::{classify, ClassifierError, ClassifierParams, GestureClassifier};
pub use session::{FrameOutcome, GestureSession};
pub use types::{Hand, Landmark, LandmarkFrame};
