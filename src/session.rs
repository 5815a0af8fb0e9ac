use crate::emission_gate::{EmissionGate, GateParams};
use crate::gesture::Gesture;
use crate::gesture_classifier::{ClassifierError, ClassifierParams, GestureClassifier};
use crate::types::{Hand, LandmarkFrame};

/// Qué pasó con un frame dentro de la sesión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// El detector no encontró ninguna mano
    NoHand,
    /// Hay mano pero ninguna regla coincide
    Unrecognized,
    /// Gesto reconocido pero bloqueado por el anti-rebote
    Suppressed(Gesture),
    /// Gesto reconocido y notificado al handler
    Emitted(Gesture),
}

impl FrameOutcome {
    pub fn gesture(&self) -> Option<Gesture> {
        match self {
            FrameOutcome::Suppressed(g) | FrameOutcome::Emitted(g) => Some(*g),
            FrameOutcome::NoHand | FrameOutcome::Unrecognized => None,
        }
    }

    pub fn is_emitted(&self) -> bool {
        matches!(self, FrameOutcome::Emitted(_))
    }
}

/// Sesión de detección activa: clasificador + anti-rebote + handler.
/// Se alimenta desde el callback por frame del detector, siempre en el mismo hilo.
pub struct GestureSession {
    classifier: GestureClassifier,
    gate: EmissionGate,
    frames: u64,
    emitted: u64,

    /// Handler `on_gesture_detected`; nunca recibe "ningún gesto"
    handler: Option<Box<dyn FnMut(Gesture) + Send>>,
}

impl GestureSession {
    pub fn new(classifier: ClassifierParams, gate: GateParams) -> Self {
        Self {
            classifier: GestureClassifier::new(classifier),
            gate: EmissionGate::new(gate),
            frames: 0,
            emitted: 0,
            handler: None,
        }
    }

    /// Establece el handler que se ejecutará en cada emisión
    pub fn set_handler<F>(&mut self, handler: F)
    where
        F: FnMut(Gesture) + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
    }

    /// Procesa un frame del detector. Sólo se usa la primera mano.
    /// Una mano mal formada devuelve error sin tocar el anti-rebote.
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> Result<FrameOutcome, ClassifierError> {
        self.frames += 1;

        let Some(points) = frame.primary_hand() else {
            return Ok(FrameOutcome::NoHand);
        };

        let hand = Hand::from_slice(points)?;
        Ok(self.process_hand(&hand, frame.timestamp_ms))
    }

    /// Clasifica una mano ya validada y pasa el resultado por el anti-rebote
    pub fn process_hand(&mut self, hand: &Hand, now_ms: u64) -> FrameOutcome {
        let label = self.classifier.classify(hand);

        let Some(gesture) = label else {
            // Se ofrece igualmente: "ningún gesto" nunca emite ni altera el estado
            self.gate.offer(None, now_ms);
            return FrameOutcome::Unrecognized;
        };

        if !self.gate.offer(Some(gesture), now_ms) {
            return FrameOutcome::Suppressed(gesture);
        }

        self.emitted += 1;
        log::debug!("gesto emitido: {} @ {} ms", gesture, now_ms);
        if let Some(ref mut handler) = self.handler {
            handler(gesture);
        }
        FrameOutcome::Emitted(gesture)
    }

    /// Nueva sesión de captura: estado del anti-rebote vacío y contadores a cero
    pub fn restart(&mut self) {
        self.gate.reset();
        self.frames = 0;
        self.emitted = 0;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn gate(&self) -> &EmissionGate {
        &self.gate
    }
}

impl Default for GestureSession {
    fn default() -> Self {
        Self::new(ClassifierParams::default(), GateParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture_classifier::fixtures;
    use std::sync::{Arc, Mutex};

    fn frame(t: u64, points: Vec<crate::types::Landmark>) -> LandmarkFrame {
        LandmarkFrame::new(t, vec![points])
    }

    #[test]
    fn test_handler_receives_emitted_gestures() {
        let mut session = GestureSession::default();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);
        session.set_handler(move |g| {
            received_clone.lock().unwrap().push(g.as_str().to_string());
        });

        session.process_frame(&frame(0, fixtures::fist())).unwrap();
        session.process_frame(&frame(500, fixtures::fist())).unwrap();
        session.process_frame(&frame(1200, fixtures::fist())).unwrap();
        session.process_frame(&frame(1300, fixtures::peace_sign())).unwrap();

        assert_eq!(*received.lock().unwrap(), vec!["fist", "fist", "peace_sign"]);
        assert_eq!(session.frames(), 4);
        assert_eq!(session.emitted(), 3);
    }

    #[test]
    fn test_same_hand_twice_emits_once() {
        let mut session = GestureSession::default();
        let hand = frame(42, fixtures::open_palm());
        assert_eq!(session.process_frame(&hand).unwrap(), FrameOutcome::Emitted(Gesture::OpenPalm));
        assert_eq!(
            session.process_frame(&hand).unwrap(),
            FrameOutcome::Suppressed(Gesture::OpenPalm)
        );
    }

    #[test]
    fn test_no_hand_and_unrecognized() {
        let mut session = GestureSession::default();
        assert_eq!(session.process_frame(&LandmarkFrame::empty(0)).unwrap(), FrameOutcome::NoHand);

        let only_pinky = fixtures::hand(false, [false, false, false, true]);
        assert_eq!(
            session.process_frame(&frame(10, only_pinky)).unwrap(),
            FrameOutcome::Unrecognized
        );
        assert_eq!(session.emitted(), 0);
        assert_eq!(session.gate().state().last_emitted, None);
    }

    #[test]
    fn test_only_first_hand_is_used() {
        let mut session = GestureSession::default();
        let two_hands = LandmarkFrame::new(0, vec![fixtures::pointing(), fixtures::fist()]);
        assert_eq!(
            session.process_frame(&two_hands).unwrap(),
            FrameOutcome::Emitted(Gesture::Pointing)
        );
    }

    #[test]
    fn test_malformed_hand_is_error() {
        let mut session = GestureSession::default();
        let mut points = fixtures::fist();
        points.truncate(5);
        assert!(session.process_frame(&frame(0, points)).is_err());
        assert_eq!(session.emitted(), 0);
    }

    #[test]
    fn test_restart_clears_gate() {
        let mut session = GestureSession::default();
        assert!(session.process_frame(&frame(0, fixtures::fist())).unwrap().is_emitted());
        session.restart();
        assert!(session.process_frame(&frame(100, fixtures::fist())).unwrap().is_emitted());
        assert_eq!(session.frames(), 1);
    }
}
