use crate::gesture::Gesture;
use crate::hid::HidOutput;
use crate::voice::Speaker;
use crossbeam_channel::Sender;
use serde::Serialize;

/// Efecto que cada gesto produce en el escritorio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureAction {
    ZoomIn,
    ZoomReset,
    ScrollUp,
    ScrollDown,
    Greet,
    Pointer,
}

/// Conversión gesto → acción
pub fn map_gesture_to_action(gesture: Gesture) -> GestureAction {
    match gesture {
        Gesture::PinchZoom => GestureAction::ZoomIn,
        Gesture::OpenPalm => GestureAction::ZoomReset,
        Gesture::PeaceSign => GestureAction::ScrollUp,
        Gesture::Fist => GestureAction::ScrollDown,
        Gesture::ThumbsUp => GestureAction::Greet,
        Gesture::Pointing => GestureAction::Pointer,
    }
}

/// Frase hablada tras cada acción
pub fn speech_for(action: GestureAction) -> &'static str {
    match action {
        GestureAction::ZoomIn => "Zooming in",
        GestureAction::ZoomReset => "Zoom reset",
        GestureAction::ScrollUp => "Scrolling up",
        GestureAction::ScrollDown => "Scrolling down",
        GestureAction::Greet => "Hello there! Gesture control is active",
        GestureAction::Pointer => "Pointer detected",
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionParams {
    /// Incremento por cada pellizco (0.1 = 10%)
    pub zoom_step: f32,
    /// Tope de zoom (2.0 = 200%)
    pub zoom_max: f32,
    /// Desplazamiento por gesto de scroll, en píxeles
    pub scroll_px: u32,
    /// Píxeles que avanza cada paso de la rueda
    pub px_per_wheel_notch: u32,
}

impl Default for ActionParams {
    fn default() -> Self {
        Self {
            zoom_step: 0.1,
            zoom_max: 2.0,
            scroll_px: 200,
            px_per_wheel_notch: 40,
        }
    }
}

impl ActionParams {
    /// Pasos de rueda equivalentes a `scroll_px` (al menos uno)
    pub fn wheel_notches(&self) -> i32 {
        let per_notch = self.px_per_wheel_notch.max(1);
        let notches = (self.scroll_px.saturating_add(per_notch / 2) / per_notch).max(1);
        i32::try_from(notches).unwrap_or(i32::MAX)
    }
}

/// Nivel de zoom que llevamos aplicado (1.0 = 100%)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    level: f32,
    step: f32,
    max: f32,
}

impl ZoomState {
    pub fn new(step: f32, max: f32) -> Self {
        Self {
            level: 1.0,
            step,
            max,
        }
    }

    /// Sube un paso sin pasar del tope. Devuelve false si ya estaba en el tope.
    pub fn zoom_in(&mut self) -> bool {
        let next = (self.level + self.step).min(self.max);
        let changed = next > self.level;
        self.level = next;
        changed
    }

    pub fn reset(&mut self) {
        self.level = 1.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn percent(&self) -> u32 {
        (self.level * 100.0).round() as u32
    }
}

/// Resultado de aplicar un gesto
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub gesture: Gesture,
    pub action: GestureAction,
    pub speech: &'static str,
    pub zoom_percent: u32,
}

/// Aplica gestos emitidos: lleva el zoom y manda HID y voz si están disponibles.
/// Los errores HID se registran y no se reintentan.
pub struct ActionDispatcher {
    params: ActionParams,
    zoom: ZoomState,
    hid: Option<HidOutput>,
    speaker: Option<Speaker>,
}

impl ActionDispatcher {
    pub fn new(params: ActionParams) -> Self {
        Self {
            zoom: ZoomState::new(params.zoom_step, params.zoom_max),
            params,
            hid: None,
            speaker: None,
        }
    }

    pub fn with_hid(mut self, hid: HidOutput) -> Self {
        self.hid = Some(hid);
        self
    }

    pub fn with_speaker(mut self, speaker: Speaker) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub fn handle(&mut self, gesture: Gesture) -> ActionOutcome {
        let action = map_gesture_to_action(gesture);
        let notches = self.params.wheel_notches();

        let hid_result = match action {
            GestureAction::ZoomIn => {
                if self.zoom.zoom_in() {
                    self.hid.as_mut().map(|hid| hid.zoom_in())
                } else {
                    log::debug!("zoom ya en el tope ({}%)", self.zoom.percent());
                    None
                }
            }
            GestureAction::ZoomReset => {
                self.zoom.reset();
                self.hid.as_mut().map(|hid| hid.zoom_reset())
            }
            GestureAction::ScrollUp => self.hid.as_mut().map(|hid| hid.scroll(notches)),
            GestureAction::ScrollDown => self.hid.as_mut().map(|hid| hid.scroll(-notches)),
            GestureAction::Greet | GestureAction::Pointer => None,
        };

        if let Some(Err(e)) = hid_result {
            log::error!("❌ Error enviando acción HID {:?}: {}", action, e);
        }

        let speech = speech_for(action);
        if let Some(speaker) = self.speaker.as_mut() {
            speaker.speak(speech);
        }

        ActionOutcome {
            gesture,
            action,
            speech,
            zoom_percent: self.zoom.percent(),
        }
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }
}

/// Handler de sesión que reenvía cada gesto al hilo de acciones.
/// Si el hilo ya no existe lo avisa una sola vez y descarta el resto.
pub fn gesture_forwarder(tx: Sender<Gesture>) -> impl FnMut(Gesture) + Send + 'static {
    let mut receiver_alive = true;
    move |gesture| {
        if tx.send(gesture).is_err() && receiver_alive {
            log::error!("❌ El hilo de acciones ya no recibe gestos; se descartan");
            receiver_alive = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_gesture_has_an_action() {
        let actions: Vec<GestureAction> = Gesture::ALL.iter().map(|g| map_gesture_to_action(*g)).collect();
        assert_eq!(
            actions,
            vec![
                GestureAction::ZoomIn,
                GestureAction::ZoomReset,
                GestureAction::ScrollUp,
                GestureAction::ScrollDown,
                GestureAction::Greet,
                GestureAction::Pointer,
            ]
        );
    }

    #[test]
    fn test_zoom_caps_at_200_percent() {
        let mut dispatcher = ActionDispatcher::new(ActionParams::default());
        for _ in 0..15 {
            dispatcher.handle(Gesture::PinchZoom);
        }
        assert_eq!(dispatcher.zoom().percent(), 200);
        assert!(!ZoomState { level: 2.0, step: 0.1, max: 2.0 }.zoom_in());
    }

    #[test]
    fn test_open_palm_resets_zoom() {
        let mut dispatcher = ActionDispatcher::new(ActionParams::default());
        dispatcher.handle(Gesture::PinchZoom);
        let outcome = dispatcher.handle(Gesture::PinchZoom);
        assert_eq!(outcome.zoom_percent, 120);

        let outcome = dispatcher.handle(Gesture::OpenPalm);
        assert_eq!(outcome.action, GestureAction::ZoomReset);
        assert_eq!(outcome.speech, "Zoom reset");
        assert_eq!(outcome.zoom_percent, 100);
    }

    #[test]
    fn test_scroll_does_not_touch_zoom() {
        let mut dispatcher = ActionDispatcher::new(ActionParams::default());
        let outcome = dispatcher.handle(Gesture::Fist);
        assert_eq!(outcome.action, GestureAction::ScrollDown);
        assert_eq!(outcome.speech, "Scrolling down");
        assert_eq!(outcome.zoom_percent, 100);
    }

    #[test]
    fn test_wheel_notches() {
        assert_eq!(ActionParams::default().wheel_notches(), 5);
        let params = ActionParams {
            scroll_px: 10,
            px_per_wheel_notch: 120,
            ..ActionParams::default()
        };
        assert_eq!(params.wheel_notches(), 1);
    }

    #[test]
    fn test_wheel_notches_huge_scroll_stays_positive() {
        let params = ActionParams {
            scroll_px: u32::MAX,
            px_per_wheel_notch: 1,
            ..ActionParams::default()
        };
        assert_eq!(params.wheel_notches(), i32::MAX);
    }

    #[test]
    fn test_forwarder_survives_closed_receiver() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut forward = gesture_forwarder(tx);
        forward(Gesture::Fist);
        assert_eq!(rx.try_recv(), Ok(Gesture::Fist));

        drop(rx);
        forward(Gesture::PeaceSign);
        forward(Gesture::Pointing);
    }

    #[test]
    fn test_outcome_json() {
        let mut dispatcher = ActionDispatcher::new(ActionParams::default());
        let outcome = dispatcher.handle(Gesture::ThumbsUp);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["gesture"], "thumbs_up");
        assert_eq!(json["action"], "greet");
        assert_eq!(json["speech"], "Hello there! Gesture control is active");
    }
}
