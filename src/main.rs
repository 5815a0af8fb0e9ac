/*
ZENA - control por gestos de mano.

El detector de landmarks corre fuera (p.ej. un script de MediaPipe) y escribe
un frame JSON por línea en stdout:

    {"timestamp_ms": 1234, "hands": [[{"x": 0.51, "y": 0.72, "z": -0.02}, ... 21 puntos]]}

Para ejecutar:
    python detector.py | ./target/release/zena
    ./target/release/zena --input grabacion.jsonl --dry-run

Sin permisos sobre /dev/uinput usar --dry-run (sólo registra las acciones).
*/

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, select, tick, unbounded};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use zena::actions::{gesture_forwarder, ActionDispatcher};
use zena::config::ZenaConfig;
use zena::csv_loader::FrameRecorder;
use zena::hid::HidOutput;
use zena::landmark_source::{source_stats, start_landmark_reader};
use zena::voice::{Speaker, STARTUP_GREETING};
use zena::{FrameOutcome, Gesture, GestureSession, LandmarkFrame};

const FRAME_CHANNEL_CAPACITY: usize = 100;
const STATS_INTERVAL: Duration = Duration::from_secs(10);

enum Event {
    Frame(LandmarkFrame),
    Tick,
    Closed,
}

#[derive(Parser, Debug)]
#[command(name = "zena", about = "Control por gestos de mano a partir de landmarks")]
struct Args {
    /// Stream de landmarks (JSON por línea); "-" lee de stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Fichero TOML de configuración (si no, ZENA_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// No crear el dispositivo uinput; sólo registrar las acciones
    #[arg(long)]
    dry_run: bool,

    /// Sin voz
    #[arg(long)]
    mute: bool,

    /// Guardar los frames con mano en un CSV para replay_csv
    #[arg(long)]
    record: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = ZenaConfig::load(args.config.as_deref())?;
    if args.mute {
        cfg.voice.enabled = false;
    }

    log::info!("🎯 ZENA - Gesture Control");
    log::info!(
        "🔧 cooldown {} ms, pinch < {}, scroll {} px",
        cfg.gate.cooldown.as_millis(),
        cfg.classifier.pinch_threshold,
        cfg.actions.scroll_px
    );

    // Canal para recibir frames del detector
    let (tx, rx) = bounded::<LandmarkFrame>(FRAME_CHANNEL_CAPACITY);

    let input = args.input.clone();
    let reader_handle = if input == "-" {
        log::info!("📥 Leyendo landmarks de stdin");
        std::thread::spawn(move || {
            if let Err(e) = start_landmark_reader(std::io::stdin().lock(), tx) {
                log::error!("❌ Error leyendo landmarks: {}", e);
            }
        })
    } else {
        let file = File::open(&input).with_context(|| format!("No se pudo abrir {}", input))?;
        log::info!("📥 Leyendo landmarks de {}", input);
        std::thread::spawn(move || {
            if let Err(e) = start_landmark_reader(BufReader::new(file), tx) {
                log::error!("❌ Error leyendo landmarks: {}", e);
            }
        })
    };

    // Canal e hilo de acciones (HID + voz)
    let (tx_gesture, rx_gesture) = unbounded::<Gesture>();
    let dry_run = args.dry_run;
    let actions_cfg = cfg.actions;
    let voice_cfg = cfg.voice.clone();

    let actions_handle = std::thread::spawn(move || {
        let mut dispatcher = ActionDispatcher::new(actions_cfg);

        if dry_run {
            log::info!("🔧 Modo dry-run: sin HID");
        } else {
            match HidOutput::new() {
                Ok(hid) => {
                    log::info!("✅ HID inicializado (/dev/uinput)");
                    dispatcher = dispatcher.with_hid(hid);
                }
                Err(e) => {
                    log::error!("❌ No se pudo inicializar HID, sigo sin zoom/scroll: {}", e);
                }
            }
        }

        let mut speaker = Speaker::new(voice_cfg);
        speaker.speak(STARTUP_GREETING);
        dispatcher = dispatcher.with_speaker(speaker);

        for gesture in rx_gesture.iter() {
            let outcome = dispatcher.handle(gesture);
            log::info!(
                "🖐️  {} - {} (zoom {}%)",
                gesture.title(),
                gesture.description(),
                outcome.zoom_percent
            );
        }
    });

    let mut session = GestureSession::new(cfg.classifier, cfg.gate);
    session.set_handler(gesture_forwarder(tx_gesture));

    let mut recorder = match &args.record {
        Some(path) => {
            log::info!("💾 Grabando frames en {}", path.display());
            Some(FrameRecorder::create(path)?)
        }
        None => None,
    };
    let mut last_timestamp: Option<u64> = None;
    let ticker = tick(STATS_INTERVAL);

    log::info!("🎬 Iniciando reconocimiento en tiempo real...");

    loop {
        let event = select! {
            recv(rx) -> msg => match msg {
                Ok(frame) => Event::Frame(frame),
                Err(_) => Event::Closed,
            },
            recv(ticker) -> _ => Event::Tick,
        };

        match event {
            Event::Frame(frame) => {
                // Timestamps que vuelven atrás = el detector se reinició: sesión nueva
                if let Some(prev) = last_timestamp {
                    if frame.timestamp_ms < prev {
                        log::info!("🔄 Reloj del detector reiniciado, nueva sesión");
                        session.restart();
                    }
                }
                last_timestamp = Some(frame.timestamp_ms);

                match session.process_frame(&frame) {
                    Ok(FrameOutcome::Suppressed(g)) => log::trace!("{} suprimido", g),
                    Ok(_) => {}
                    Err(e) => log::warn!("⚠️  Frame {} ms descartado: {}", frame.timestamp_ms, e),
                }

                let record_err = recorder.as_mut().and_then(|rec| rec.append(&frame).err());
                if let Some(e) = record_err {
                    log::error!("❌ Error grabando frame, grabación detenida: {}", e);
                    recorder = None;
                }
            }
            Event::Tick => {
                let stats = source_stats();
                log::info!(
                    "📊 frames: {} (malformados {}), gestos emitidos: {}",
                    stats.frames,
                    stats.malformed,
                    session.emitted()
                );
            }
            Event::Closed => break,
        }
    }

    // Cerrar el handler suelta el emisor y termina el hilo de acciones
    drop(session);
    if actions_handle.join().is_err() {
        log::error!("❌ El hilo de acciones terminó con pánico");
    }
    let _ = reader_handle.join();

    if let (Some(rec), Some(path)) = (&recorder, &args.record) {
        log::info!("💾 {} frames guardados en {}", rec.written(), path.display());
    }

    let stats = source_stats();
    log::info!(
        "👋 Fin: {} frames leídos, {} malformados",
        stats.frames,
        stats.malformed
    );
    Ok(())
}
