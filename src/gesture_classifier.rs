use crate::gesture::Gesture;
use crate::types::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Número de landmarks inválido: se esperaban {expected}, llegaron {actual}")]
    InvalidLandmarkCount { expected: usize, actual: usize },

    #[error("Coordenada no finita en el landmark {index}")]
    NonFiniteCoordinate { index: usize },
}

/// Umbral por defecto de la distancia pulgar-índice para el pellizco
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParams {
    /// Distancia normalizada (x, y) por debajo de la cual hay pellizco
    pub pinch_threshold: f32,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
        }
    }
}

/// Estado extendido/flexionado de cada dedo en un frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    pub fn from_hand(hand: &Hand) -> Self {
        let wrist = &hand[WRIST];
        Self {
            // El pulgar se mide en horizontal: punta a la izquierda de la articulación IP
            thumb: hand[THUMB_TIP].x < hand[THUMB_IP].x,
            index: is_finger_extended(&hand[INDEX_TIP], &hand[INDEX_MCP], wrist),
            middle: is_finger_extended(&hand[MIDDLE_TIP], &hand[MIDDLE_MCP], wrist),
            ring: is_finger_extended(&hand[RING_TIP], &hand[RING_MCP], wrist),
            pinky: is_finger_extended(&hand[PINKY_TIP], &hand[PINKY_MCP], wrist),
        }
    }

    /// Ninguno de los cuatro dedos largos está extendido
    fn long_fingers_flexed(&self) -> bool {
        !self.index && !self.middle && !self.ring && !self.pinky
    }
}

/// Un dedo está extendido si la punta queda por encima (y menor) del nudillo y de la muñeca
fn is_finger_extended(tip: &Landmark, mcp: &Landmark, wrist: &Landmark) -> bool {
    tip.y < mcp.y && tip.y < wrist.y
}

/// Distancia 2D entre la punta del pulgar y la del índice
pub fn pinch_distance(hand: &Hand) -> f32 {
    hand[THUMB_TIP].distance_2d(&hand[INDEX_TIP])
}

/// Clasificador geométrico sobre los 21 landmarks.
/// Puro y determinista: cada frame se evalúa de forma independiente.
#[derive(Debug, Clone, Default)]
pub struct GestureClassifier {
    params: ClassifierParams,
}

impl GestureClassifier {
    pub fn new(params: ClassifierParams) -> Self {
        Self { params }
    }

    /// Evalúa las reglas en orden estricto; la primera que se cumple gana.
    /// Las reglas se solapan (peace_sign vs open_palm, pinch_zoom vs pointing),
    /// así que el orden es parte del contrato.
    pub fn classify(&self, hand: &Hand) -> Option<Gesture> {
        let f = FingerState::from_hand(hand);
        let pinch = pinch_distance(hand);

        if pinch < self.params.pinch_threshold && !f.middle && !f.ring && !f.pinky {
            Some(Gesture::PinchZoom)
        } else if f.index && f.middle && f.ring && f.pinky && f.thumb {
            Some(Gesture::OpenPalm)
        } else if f.index && f.middle && !f.ring && !f.pinky {
            Some(Gesture::PeaceSign)
        } else if f.long_fingers_flexed() && !f.thumb {
            Some(Gesture::Fist)
        } else if f.thumb && f.long_fingers_flexed() && hand[THUMB_TIP].y < hand[WRIST].y {
            Some(Gesture::ThumbsUp)
        } else if f.index && !f.middle && !f.ring && !f.pinky {
            Some(Gesture::Pointing)
        } else {
            None
        }
    }

    /// Igual que `classify`, validando antes la forma de la entrada
    pub fn classify_landmarks(&self, points: &[Landmark]) -> Result<Option<Gesture>, ClassifierError> {
        let hand = Hand::from_slice(points)?;
        Ok(self.classify(&hand))
    }
}

/// Clasifica con los parámetros por defecto
pub fn classify(points: &[Landmark]) -> Result<Option<Gesture>, ClassifierError> {
    GestureClassifier::default().classify_landmarks(points)
}

/// Manos sintéticas para tests, compartidas con los tests de integración
#[doc(hidden)]
pub mod fixtures {
    use super::*;

    pub const WRIST_Y: f32 = 0.9;
    pub const MCP_Y: f32 = 0.6;
    pub const EXTENDED_Y: f32 = 0.3;
    pub const FLEXED_Y: f32 = 0.7;
    pub const THUMB_IP_X: f32 = 0.4;

    /// Construye una mano sintética: muñeca abajo, nudillos a media altura.
    /// `fingers` = [index, middle, ring, pinky] extendidos o no.
    pub fn hand(thumb_extended: bool, fingers: [bool; 4]) -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.5, 0.8, 0.0); NUM_LANDMARKS];
        points[WRIST] = Landmark::new(0.5, WRIST_Y, 0.0);

        points[THUMB_IP] = Landmark::new(THUMB_IP_X, 0.65, 0.0);
        let thumb_x = if thumb_extended { 0.3 } else { 0.45 };
        points[THUMB_TIP] = Landmark::new(thumb_x, 0.6, 0.0);

        let columns = [
            (INDEX_MCP, INDEX_TIP, 0.45),
            (MIDDLE_MCP, MIDDLE_TIP, 0.5),
            (RING_MCP, RING_TIP, 0.55),
            (PINKY_MCP, PINKY_TIP, 0.6),
        ];
        for ((mcp, tip, x), extended) in columns.iter().zip(fingers) {
            points[*mcp] = Landmark::new(*x, MCP_Y, 0.0);
            let tip_y = if extended { EXTENDED_Y } else { FLEXED_Y };
            points[*tip] = Landmark::new(*x, tip_y, 0.0);
        }

        points
    }

    pub fn fist() -> Vec<Landmark> {
        hand(false, [false; 4])
    }

    pub fn open_palm() -> Vec<Landmark> {
        hand(true, [true; 4])
    }

    pub fn peace_sign() -> Vec<Landmark> {
        hand(false, [true, true, false, false])
    }

    pub fn pointing() -> Vec<Landmark> {
        hand(false, [true, false, false, false])
    }

    pub fn thumbs_up() -> Vec<Landmark> {
        let mut points = hand(true, [false; 4]);
        points[THUMB_TIP].y = 0.5;
        points
    }

    /// Índice extendido con el pulgar tocando su punta
    pub fn pinch() -> Vec<Landmark> {
        let mut points = pointing();
        let index_tip = points[INDEX_TIP];
        points[THUMB_TIP] = Landmark::new(index_tip.x + 0.01, index_tip.y + 0.01, 0.0);
        points
    }
}
