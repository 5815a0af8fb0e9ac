use crate::types::{Landmark, LandmarkFrame};
use crossbeam_channel::Sender;
use serde::Deserialize;
use std::io::BufRead;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Estadísticas de recepción del detector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub frames: u64,
    pub malformed: u64,
}

// Contadores globales para estadísticas
static FRAMES: AtomicU64 = AtomicU64::new(0);
static MALFORMED: AtomicU64 = AtomicU64::new(0);

pub fn source_stats() -> SourceStats {
    SourceStats {
        frames: FRAMES.load(Ordering::Relaxed),
        malformed: MALFORMED.load(Ordering::Relaxed),
    }
}

/// Una línea JSON tal como la escribe el detector externo.
/// Sin `timestamp_ms` se usa el reloj monótono del lector.
#[derive(Debug, Deserialize)]
struct FrameLine {
    timestamp_ms: Option<u64>,
    #[serde(default)]
    hands: Vec<Vec<Landmark>>,
}

/// Parsea una línea; las líneas en blanco devuelven Ok(None)
pub fn parse_frame_line(line: &str, fallback_ms: u64) -> Result<Option<LandmarkFrame>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let raw: FrameLine = serde_json::from_str(trimmed)?;
    Ok(Some(LandmarkFrame::new(
        raw.timestamp_ms.unwrap_or(fallback_ms),
        raw.hands,
    )))
}

/// Lee frames JSON (uno por línea) y los envía por el canal.
/// Bloquea hasta EOF o hasta que el receptor se cierre; pensado para su propio hilo.
/// Las líneas que no son UTF-8 o JSON válido se cuentan y se saltan.
pub fn start_landmark_reader<R: BufRead>(mut reader: R, tx: Sender<LandmarkFrame>) -> std::io::Result<()> {
    let started = Instant::now();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let now_ms = started.elapsed().as_millis() as u64;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                MALFORMED.fetch_add(1, Ordering::Relaxed);
                log::warn!("⚠️  Línea {} descartada (no es UTF-8): {}", line_no, e);
                continue;
            }
        };

        match parse_frame_line(line, now_ms) {
            Ok(Some(frame)) => {
                FRAMES.fetch_add(1, Ordering::Relaxed);
                if tx.send(frame).is_err() {
                    log::debug!("receptor de landmarks cerrado, fin de lectura");
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => {
                MALFORMED.fetch_add(1, Ordering::Relaxed);
                log::warn!("⚠️  Línea {} descartada: {}", line_no, e);
            }
        }
    }

    log::info!("📭 Fin del stream de landmarks");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::io::Cursor;

    #[test]
    fn test_parse_line_with_timestamp() {
        let frame = parse_frame_line(r#"{"timestamp_ms": 33, "hands": []}"#, 999)
            .unwrap()
            .unwrap();
        assert_eq!(frame.timestamp_ms, 33);
        assert!(frame.primary_hand().is_none());
    }

    #[test]
    fn test_parse_line_without_timestamp() {
        let frame = parse_frame_line(r#"{"hands": [[{"x": 0.5, "y": 0.25, "z": -0.1}]]}"#, 77)
            .unwrap()
            .unwrap();
        assert_eq!(frame.timestamp_ms, 77);
        assert_eq!(frame.hands[0][0], Landmark::new(0.5, 0.25, -0.1));
    }

    #[test]
    fn test_blank_and_bad_lines() {
        assert!(parse_frame_line("   ", 0).unwrap().is_none());
        assert!(parse_frame_line("{not json", 0).is_err());
    }

    #[test]
    fn test_reader_skips_malformed_lines() {
        let input = "{\"timestamp_ms\": 1}\ngarbage\n\n{\"timestamp_ms\": 2, \"hands\": []}\n";
        let (tx, rx) = unbounded();
        let before = source_stats();

        start_landmark_reader(Cursor::new(input), tx).unwrap();

        let frames: Vec<LandmarkFrame> = rx.iter().collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].timestamp_ms, 2);

        let after = source_stats();
        assert!(after.malformed >= before.malformed + 1);
    }

    #[test]
    fn test_reader_skips_invalid_utf8_line() {
        let mut input = b"{\"timestamp_ms\": 1}\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"{\"timestamp_ms\": 2}\n");
        let (tx, rx) = unbounded();
        let before = source_stats();

        start_landmark_reader(Cursor::new(input), tx).unwrap();

        let stamps: Vec<u64> = rx.iter().map(|f| f.timestamp_ms).collect();
        assert_eq!(stamps, vec![1, 2]);
        assert!(source_stats().malformed >= before.malformed + 1);
    }
}
