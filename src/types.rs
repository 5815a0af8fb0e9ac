use serde::{Deserialize, Serialize};

use crate::gesture_classifier::ClassifierError;

/// Constantes del sistema
pub const NUM_LANDMARKS: usize = 21;
pub const LANDMARK_CHANNELS: usize = 3; // x, y, z
pub const TOTAL_HAND_VALUES: usize = NUM_LANDMARKS * LANDMARK_CHANNELS; // 63

// Numeración anatómica de los 21 puntos de la mano
pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Conexiones del esqueleto de la mano, para quien dibuje el overlay
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

/// Un punto de la mano en coordenadas normalizadas de imagen.
/// Origen arriba a la izquierda, `y` crece hacia abajo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Profundidad; el clasificador no la usa
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distancia euclídea en el plano (x, y)
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Mano completa: exactamente 21 landmarks indexados por la numeración anatómica
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hand {
    landmarks: [Landmark; NUM_LANDMARKS],
}

impl Hand {
    pub fn new(landmarks: [Landmark; NUM_LANDMARKS]) -> Self {
        Self { landmarks }
    }

    /// Crea una Hand desde lo que entrega el detector externo.
    /// Rechaza longitudes distintas de 21 y coordenadas no finitas.
    pub fn from_slice(points: &[Landmark]) -> Result<Self, ClassifierError> {
        if points.len() != NUM_LANDMARKS {
            return Err(ClassifierError::InvalidLandmarkCount {
                expected: NUM_LANDMARKS,
                actual: points.len(),
            });
        }

        let mut landmarks = [Landmark::default(); NUM_LANDMARKS];
        for (i, point) in points.iter().enumerate() {
            if !point.is_finite() {
                return Err(ClassifierError::NonFiniteCoordinate { index: i });
            }
            landmarks[i] = *point;
        }

        Ok(Self { landmarks })
    }

    /// Crea una Hand desde un array plano [x0, y0, z0, x1, y1, z1, ...]
    pub fn from_flat(values: &[f32]) -> Result<Self, ClassifierError> {
        if values.len() != TOTAL_HAND_VALUES {
            return Err(ClassifierError::InvalidLandmarkCount {
                expected: NUM_LANDMARKS,
                actual: values.len() / LANDMARK_CHANNELS,
            });
        }

        let points: Vec<Landmark> = values
            .chunks_exact(LANDMARK_CHANNELS)
            .map(|c| Landmark::new(c[0], c[1], c[2]))
            .collect();

        Self::from_slice(&points)
    }

    /// Convierte a formato plano [landmark * 3 + canal]
    pub fn to_flat_array(&self) -> [f32; TOTAL_HAND_VALUES] {
        let mut output = [0.0; TOTAL_HAND_VALUES];
        for (chunk, lm) in output.chunks_exact_mut(LANDMARK_CHANNELS).zip(&self.landmarks) {
            chunk.copy_from_slice(&[lm.x, lm.y, lm.z]);
        }
        output
    }

    pub fn landmarks(&self) -> &[Landmark; NUM_LANDMARKS] {
        &self.landmarks
    }
}

impl std::ops::Index<usize> for Hand {
    type Output = Landmark;

    fn index(&self, idx: usize) -> &Landmark {
        &self.landmarks[idx]
    }
}

/// Resultado del detector externo para un frame de vídeo.
/// Sólo se usa la primera mano (máximo una mano).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub timestamp_ms: u64,
    #[serde(default)]
    pub hands: Vec<Vec<Landmark>>,
}

impl LandmarkFrame {
    pub fn new(timestamp_ms: u64, hands: Vec<Vec<Landmark>>) -> Self {
        Self { timestamp_ms, hands }
    }

    /// Frame sin ninguna mano detectada
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            hands: Vec::new(),
        }
    }

    pub fn primary_hand(&self) -> Option<&[Landmark]> {
        self.hands.first().map(|h| h.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        let points = vec![Landmark::default(); 20];
        let err = Hand::from_slice(&points).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::InvalidLandmarkCount {
                expected: 21,
                actual: 20
            }
        );
    }

    #[test]
    fn test_from_slice_rejects_nan() {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); NUM_LANDMARKS];
        points[7].y = f32::NAN;
        let err = Hand::from_slice(&points).unwrap_err();
        assert_eq!(err, ClassifierError::NonFiniteCoordinate { index: 7 });
    }

    #[test]
    fn test_flat_layout() {
        let values: Vec<f32> = (0..TOTAL_HAND_VALUES).map(|v| v as f32).collect();
        let hand = Hand::from_flat(&values).unwrap();
        assert_eq!(hand[THUMB_TIP], Landmark::new(12.0, 13.0, 14.0));

        assert_eq!(hand.to_flat_array().to_vec(), values);
    }

    #[test]
    fn test_frame_json_without_z() {
        let json = r#"{"timestamp_ms": 40, "hands": [[{"x": 0.1, "y": 0.2}]]}"#;
        let frame: LandmarkFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.timestamp_ms, 40);
        assert_eq!(frame.primary_hand().unwrap()[0], Landmark::new(0.1, 0.2, 0.0));
    }
}
