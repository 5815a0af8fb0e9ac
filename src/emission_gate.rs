use crate::gesture::Gesture;
use std::time::Duration;

/// Enfriamiento por defecto entre dos emisiones del mismo gesto
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1000);

/// Parámetros del anti-rebote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateParams {
    /// Tiempo que debe pasar (estrictamente) para repetir el mismo gesto
    pub cooldown: Duration,
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Lo último que se emitió realmente. Vacío al empezar cada sesión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmissionState {
    pub last_emitted: Option<Gesture>,
    /// Marca de tiempo (ms) de la última emisión
    pub last_emitted_at: Option<u64>,
}

/// Decide si un gesto clasificado se notifica al resto de la aplicación.
///
/// - `None` nunca emite y deja el estado intacto.
/// - Un gesto distinto del último emitido emite siempre.
/// - El mismo gesto sólo emite si han pasado más de `cooldown` desde la última emisión.
///
/// Si el reloj retrocede, el tiempo transcurrido cuenta como cero.
pub fn should_emit(
    label: Option<Gesture>,
    now_ms: u64,
    state: &EmissionState,
    cooldown: Duration,
) -> (bool, EmissionState) {
    let Some(gesture) = label else {
        return (false, *state);
    };

    let changed = state.last_emitted != Some(gesture);
    let cooled_down = match state.last_emitted_at {
        Some(last) => u128::from(now_ms.saturating_sub(last)) > cooldown.as_millis(),
        None => true,
    };

    if changed || cooled_down {
        let next = EmissionState {
            last_emitted: Some(gesture),
            last_emitted_at: Some(now_ms),
        };
        (true, next)
    } else {
        (false, *state)
    }
}

/// Envoltorio con estado de `should_emit` para una sesión de detección
#[derive(Debug, Clone, Default)]
pub struct EmissionGate {
    params: GateParams,
    state: EmissionState,
}

impl EmissionGate {
    pub fn new(params: GateParams) -> Self {
        Self {
            params,
            state: EmissionState::default(),
        }
    }

    /// Ofrece el resultado de un frame; devuelve true si hay que emitir
    pub fn offer(&mut self, label: Option<Gesture>, now_ms: u64) -> bool {
        let (emit, next) = should_emit(label, now_ms, &self.state, self.params.cooldown);
        self.state = next;
        emit
    }

    /// Nueva sesión (p.ej. cámara reiniciada): se olvida la última emisión
    pub fn reset(&mut self) {
        self.state = EmissionState::default();
    }

    pub fn state(&self) -> &EmissionState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_gesture_respects_cooldown() {
        let mut gate = EmissionGate::default();
        assert!(gate.offer(Some(Gesture::Fist), 0));
        assert!(!gate.offer(Some(Gesture::Fist), 500));
        assert!(gate.offer(Some(Gesture::Fist), 1200));
        assert_eq!(gate.state().last_emitted_at, Some(1200));
    }

    #[test]
    fn test_cooldown_boundary_is_strict() {
        let mut gate = EmissionGate::default();
        assert!(gate.offer(Some(Gesture::Pointing), 100));
        assert!(!gate.offer(Some(Gesture::Pointing), 1100));
        assert!(gate.offer(Some(Gesture::Pointing), 1101));
    }

    #[test]
    fn test_changed_gesture_emits_immediately() {
        let mut gate = EmissionGate::default();
        assert!(gate.offer(Some(Gesture::Fist), 0));
        assert!(gate.offer(Some(Gesture::PeaceSign), 100));
        assert_eq!(gate.state().last_emitted, Some(Gesture::PeaceSign));
        // Volver al anterior también es un cambio
        assert!(gate.offer(Some(Gesture::Fist), 150));
    }

    #[test]
    fn test_none_never_emits() {
        let state = EmissionState {
            last_emitted: Some(Gesture::OpenPalm),
            last_emitted_at: Some(10),
        };
        for now in [0, 10, 5_000, u64::MAX] {
            let (emit, next) = should_emit(None, now, &state, DEFAULT_COOLDOWN);
            assert!(!emit);
            assert_eq!(next, state);
        }

        let (emit, next) = should_emit(None, 0, &EmissionState::default(), DEFAULT_COOLDOWN);
        assert!(!emit);
        assert_eq!(next, EmissionState::default());
    }

    #[test]
    fn test_none_does_not_break_cooldown() {
        let mut gate = EmissionGate::default();
        assert!(gate.offer(Some(Gesture::ThumbsUp), 0));
        assert!(!gate.offer(None, 200));
        // Un frame vacío no cuenta como cambio de gesto
        assert!(!gate.offer(Some(Gesture::ThumbsUp), 400));
    }

    #[test]
    fn test_suppression_keeps_state() {
        let state = EmissionState {
            last_emitted: Some(Gesture::Fist),
            last_emitted_at: Some(0),
        };
        let (emit, next) = should_emit(Some(Gesture::Fist), 999, &state, DEFAULT_COOLDOWN);
        assert!(!emit);
        assert_eq!(next, state);
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut gate = EmissionGate::default();
        assert!(gate.offer(Some(Gesture::Fist), 5_000));
        assert!(!gate.offer(Some(Gesture::Fist), 1_000));
    }

    #[test]
    fn test_reset_starts_new_session() {
        let mut gate = EmissionGate::default();
        assert!(gate.offer(Some(Gesture::PinchZoom), 0));
        gate.reset();
        assert_eq!(*gate.state(), EmissionState::default());
        assert!(gate.offer(Some(Gesture::PinchZoom), 10));
    }

    #[test]
    fn test_custom_cooldown() {
        let mut gate = EmissionGate::new(GateParams {
            cooldown: Duration::from_millis(250),
        });
        assert!(gate.offer(Some(Gesture::OpenPalm), 0));
        assert!(!gate.offer(Some(Gesture::OpenPalm), 250));
        assert!(gate.offer(Some(Gesture::OpenPalm), 251));
    }
}
