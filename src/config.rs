use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::actions::ActionParams;
use crate::emission_gate::{GateParams, DEFAULT_COOLDOWN};
use crate::gesture_classifier::{ClassifierParams, DEFAULT_PINCH_THRESHOLD};
use crate::voice::{VoiceParams, DEFAULT_TTS_COMMAND};

pub const CONFIG_ENV: &str = "ZENA_CONFIG";
pub const COOLDOWN_ENV: &str = "ZENA_COOLDOWN_MS";
pub const TTS_COMMAND_ENV: &str = "ZENA_TTS_COMMAND";

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ZenaConfigFile {
    classifier: Option<ClassifierConfigFile>,
    gate: Option<GateConfigFile>,
    actions: Option<ActionsConfigFile>,
    voice: Option<VoiceConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ClassifierConfigFile {
    pinch_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct GateConfigFile {
    cooldown_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ActionsConfigFile {
    zoom_step: Option<f32>,
    zoom_max: Option<f32>,
    scroll_px: Option<u32>,
    px_per_wheel_notch: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct VoiceConfigFile {
    enabled: Option<bool>,
    command: Option<String>,
    args: Option<Vec<String>>,
}

/// Configuración completa del daemon
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZenaConfig {
    pub classifier: ClassifierParams,
    pub gate: GateParams,
    pub actions: ActionParams,
    pub voice: VoiceParams,
}

impl ZenaConfig {
    /// Fichero (`path` o `ZENA_CONFIG`) → variables de entorno → validación
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.trim().is_empty());
        let file_cfg = match path {
            Some(p) => Some(read_config_file(p)?),
            None => match env_path.as_deref() {
                Some(p) => Some(read_config_file(Path::new(p))?),
                None => None,
            },
        };

        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ZenaConfigFile) -> Self {
        let defaults = ActionParams::default();
        let actions = file.actions.unwrap_or_default();
        let voice = file.voice.unwrap_or_default();

        Self {
            classifier: ClassifierParams {
                pinch_threshold: file
                    .classifier
                    .and_then(|c| c.pinch_threshold)
                    .unwrap_or(DEFAULT_PINCH_THRESHOLD),
            },
            gate: GateParams {
                cooldown: file
                    .gate
                    .and_then(|g| g.cooldown_ms)
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_COOLDOWN),
            },
            actions: ActionParams {
                zoom_step: actions.zoom_step.unwrap_or(defaults.zoom_step),
                zoom_max: actions.zoom_max.unwrap_or(defaults.zoom_max),
                scroll_px: actions.scroll_px.unwrap_or(defaults.scroll_px),
                px_per_wheel_notch: actions
                    .px_per_wheel_notch
                    .unwrap_or(defaults.px_per_wheel_notch),
            },
            voice: VoiceParams {
                enabled: voice.enabled.unwrap_or(true),
                command: voice
                    .command
                    .unwrap_or_else(|| DEFAULT_TTS_COMMAND.to_string()),
                args: voice.args.unwrap_or_default(),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(cooldown) = std::env::var(COOLDOWN_ENV) {
            let ms: u64 = cooldown
                .trim()
                .parse()
                .map_err(|_| anyhow!("{} debe ser un entero en milisegundos", COOLDOWN_ENV))?;
            self.gate.cooldown = Duration::from_millis(ms);
        }
        if let Ok(command) = std::env::var(TTS_COMMAND_ENV) {
            if !command.trim().is_empty() {
                self.voice.command = command;
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.gate.cooldown.is_zero() {
            return Err(anyhow!("gate.cooldown_ms debe ser mayor que cero"));
        }
        let t = self.classifier.pinch_threshold;
        if !(t > 0.0 && t < 1.0) {
            return Err(anyhow!("classifier.pinch_threshold debe estar en (0, 1), es {}", t));
        }
        if !(self.actions.zoom_max >= 1.0) {
            return Err(anyhow!("actions.zoom_max debe ser >= 1.0"));
        }
        if !(self.actions.zoom_step > 0.0) {
            return Err(anyhow!("actions.zoom_step debe ser positivo"));
        }
        if self.actions.px_per_wheel_notch == 0 {
            return Err(anyhow!("actions.px_per_wheel_notch debe ser mayor que cero"));
        }
        if self.voice.enabled && self.voice.command.trim().is_empty() {
            return Err(anyhow!("voice.command vacío con la voz activada"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<ZenaConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("No se pudo leer la configuración {}", path.display()))?;
    let cfg = toml::from_str(&raw)
        .with_context(|| format!("Configuración inválida en {}", path.display()))?;
    Ok(cfg)
}
