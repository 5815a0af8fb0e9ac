use std::io;
use std::process::{Child, Command, Stdio};

/// Saludo al arrancar
pub const STARTUP_GREETING: &str = "Hello, ZENA is here to help you with gesture control";

pub const DEFAULT_TTS_COMMAND: &str = "espeak";

/// Configuración del sintetizador externo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceParams {
    pub enabled: bool,
    /// Programa de TTS; el texto se pasa como último argumento
    pub command: String,
    pub args: Vec<String>,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            enabled: true,
            command: DEFAULT_TTS_COMMAND.to_string(),
            args: Vec::new(),
        }
    }
}

/// Voz de respuesta. Cada frase nueva cancela la que siga sonando.
/// No se espera a que termine: es fire-and-forget.
pub struct Speaker {
    params: VoiceParams,
    current: Option<Child>,
    available: bool,
}

impl Speaker {
    pub fn new(params: VoiceParams) -> Self {
        let available = params.enabled;
        Self {
            params,
            current: None,
            available,
        }
    }

    /// Dice `text`, cortando la frase anterior si sigue en curso
    pub fn speak(&mut self, text: &str) {
        if !self.available {
            log::info!("🔇 {}", text);
            return;
        }

        self.cancel();

        match self.spawn(text) {
            Ok(child) => self.current = Some(child),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Igual que un navegador sin síntesis de voz: se sigue sin audio
                log::warn!(
                    "⚠️  TTS '{}' no encontrado, voz desactivada: {}",
                    self.params.command,
                    e
                );
                log::info!("🔇 {}", text);
                self.available = false;
            }
            Err(e) => log::warn!("⚠️  No se pudo lanzar TTS: {}", e),
        }
    }

    fn spawn(&self, text: &str) -> io::Result<Child> {
        Command::new(&self.params.command)
            .args(&self.params.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
    }

    /// Corta la frase en curso (si la hay) y recoge el proceso
    pub fn cancel(&mut self) {
        if let Some(mut child) = self.current.take() {
            match child.try_wait() {
                Ok(Some(_)) => {}
                _ => {
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_speaking(&mut self) -> bool {
        match self.current.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_speaker_is_silent() {
        let mut speaker = Speaker::new(VoiceParams {
            enabled: false,
            ..VoiceParams::default()
        });
        speaker.speak("Zooming in");
        assert!(!speaker.is_available());
        assert!(!speaker.is_speaking());
    }

    #[test]
    fn test_missing_binary_disables_voice() {
        let mut speaker = Speaker::new(VoiceParams {
            enabled: true,
            command: "/nonexistent/zena-tts-binary".to_string(),
            args: Vec::new(),
        });
        speaker.speak("Scrolling up");
        assert!(!speaker.is_available());
    }

    #[cfg(unix)]
    #[test]
    fn test_new_phrase_cancels_previous() {
        let mut speaker = Speaker::new(VoiceParams {
            enabled: true,
            command: "sleep".to_string(),
            args: Vec::new(),
        });
        // `sleep 30` hace de frase larga
        speaker.speak("30");
        assert!(speaker.is_speaking());
        speaker.speak("30");
        assert!(speaker.is_speaking());
        speaker.cancel();
        assert!(!speaker.is_speaking());
    }
}
