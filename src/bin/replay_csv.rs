use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use zena::actions::ActionDispatcher;
use zena::config::ZenaConfig;
use zena::csv_loader::load_frames_from_csv;
use zena::{FrameOutcome, GestureSession};

#[derive(Parser, Debug)]
#[command(name = "replay_csv", about = "Reproduce landmarks grabados y muestra qué gestos se emitirían")]
struct ReplayOptions {
    /// CSV frame,timestamp_ms,landmark,x,y,z
    csv_path: PathBuf,

    /// Fichero TOML de configuración
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sustituye el enfriamiento configurado
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Un objeto JSON por gesto emitido en lugar de la tabla
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let opts = ReplayOptions::parse();
    let mut cfg = ZenaConfig::load(opts.config.as_deref())?;
    if let Some(ms) = opts.cooldown_ms {
        cfg.gate.cooldown = Duration::from_millis(ms);
    }

    let frames = load_frames_from_csv(&opts.csv_path)?;
    if !opts.json {
        println!("🎞️  Reproduciendo {} frames desde {:?}\n", frames.len(), opts.csv_path);
    }

    // Sin HID ni voz: sólo se calcula el efecto
    let mut dispatcher = ActionDispatcher::new(cfg.actions);
    let mut session = GestureSession::new(cfg.classifier, cfg.gate);
    let mut counts: BTreeMap<&'static str, (u32, u32)> = BTreeMap::new();

    for (idx, frame) in frames.iter().enumerate() {
        let outcome = session.process_frame(frame)?;

        if let Some(gesture) = outcome.gesture() {
            let entry = counts.entry(gesture.as_str()).or_insert((0, 0));
            entry.0 += 1;
            if outcome.is_emitted() {
                entry.1 += 1;
            }
        }

        match outcome {
            FrameOutcome::Emitted(gesture) => {
                let action = dispatcher.handle(gesture);
                if opts.json {
                    let event = serde_json::json!({
                        "frame": idx,
                        "timestamp_ms": frame.timestamp_ms,
                        "outcome": action,
                    });
                    println!("{}", event);
                } else {
                    println!(
                        "  {:>4} {:>8} ms  {:<12} EMITIDO   → {} (zoom {}%)",
                        idx,
                        frame.timestamp_ms,
                        gesture.as_str(),
                        action.speech,
                        action.zoom_percent
                    );
                }
            }
            FrameOutcome::Suppressed(gesture) if !opts.json => {
                println!(
                    "  {:>4} {:>8} ms  {:<12} suprimido",
                    idx,
                    frame.timestamp_ms,
                    gesture.as_str()
                );
            }
            FrameOutcome::Unrecognized if !opts.json => {
                println!("  {:>4} {:>8} ms  -", idx, frame.timestamp_ms);
            }
            _ => {}
        }
    }

    if !opts.json {
        println!("\nResumen (frames / emitidos):");
        for (label, (seen, emitted)) in &counts {
            println!("  {:<12} {:>5} / {:<5}", label, seen, emitted);
        }
        println!(
            "\n{} frames, {} gestos emitidos, zoom final {}%",
            session.frames(),
            session.emitted(),
            dispatcher.zoom().percent()
        );
    }

    Ok(())
}
