use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};

use crate::types::{Landmark, LandmarkFrame, NUM_LANDMARKS};

const HEADER: [&str; 6] = ["frame", "timestamp_ms", "landmark", "x", "y", "z"];

/// Carga una secuencia de frames desde un CSV en el formato
/// frame,timestamp_ms,landmark,x,y,z ordenado por frame y landmark.
/// Cada frame tiene que traer sus 21 landmarks.
pub fn load_frames_from_csv(path: impl AsRef<Path>) -> Result<Vec<LandmarkFrame>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    // frame -> (timestamp, landmarks presentes)
    let mut frames: BTreeMap<usize, (u64, [Option<Landmark>; NUM_LANDMARKS])> = BTreeMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row = row_idx + 1;
        let record = result.with_context(|| format!("Fila {} inválida en {:?}", row, path))?;
        if record.len() < HEADER.len() {
            bail!("La fila {} no tiene {} columnas", row, HEADER.len());
        }

        let frame_idx: usize = record[0]
            .trim()
            .parse()
            .with_context(|| format!("frame inválido en fila {}", row))?;
        let timestamp_ms: u64 = record[1]
            .trim()
            .parse()
            .with_context(|| format!("timestamp_ms inválido en fila {}", row))?;
        let landmark: usize = record[2]
            .trim()
            .parse()
            .with_context(|| format!("landmark inválido en fila {}", row))?;

        if landmark >= NUM_LANDMARKS {
            bail!("Landmark {} fuera de rango (fila {})", landmark, row);
        }

        let x: f32 = record[3].trim().parse().with_context(|| format!("x inválido en fila {}", row))?;
        let y: f32 = record[4].trim().parse().with_context(|| format!("y inválido en fila {}", row))?;
        let z: f32 = record[5].trim().parse().with_context(|| format!("z inválido en fila {}", row))?;

        let entry = frames
            .entry(frame_idx)
            .or_insert((timestamp_ms, [None; NUM_LANDMARKS]));
        ensure!(
            entry.0 == timestamp_ms,
            "El frame {} tiene timestamps distintos (fila {})",
            frame_idx,
            row
        );
        entry.1[landmark] = Some(Landmark::new(x, y, z));
    }

    ensure!(!frames.is_empty(), "El CSV {:?} no contiene datos", path);

    let mut out = Vec::with_capacity(frames.len());
    for (frame_idx, (timestamp_ms, points)) in frames {
        let mut hand = Vec::with_capacity(NUM_LANDMARKS);
        for (i, point) in points.iter().enumerate() {
            match point {
                Some(p) => hand.push(*p),
                None => bail!("Al frame {} le falta el landmark {}", frame_idx, i),
            }
        }
        out.push(LandmarkFrame::new(timestamp_ms, vec![hand]));
    }

    Ok(out)
}

/// Escribe frames en el formato que lee `load_frames_from_csv`.
/// Grabador incremental: cabecera al crear, filas de cada frame al llegar.
/// Se vuelca tras cada frame para no perder la grabación si el proceso muere.
pub struct FrameRecorder {
    writer: csv::Writer<File>,
    written: usize,
}

impl FrameRecorder {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut writer = WriterBuilder::new()
            .from_path(path)
            .with_context(|| format!("No se pudo crear el CSV {:?}", path))?;
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(Self { writer, written: 0 })
    }

    /// Añade la primera mano del frame; devuelve false si no había mano
    pub fn append(&mut self, frame: &LandmarkFrame) -> Result<bool> {
        let Some(hand) = frame.primary_hand() else {
            return Ok(false);
        };
        for (i, lm) in hand.iter().enumerate() {
            self.writer.write_record(&[
                self.written.to_string(),
                frame.timestamp_ms.to_string(),
                i.to_string(),
                lm.x.to_string(),
                lm.y.to_string(),
                lm.z.to_string(),
            ])?;
        }
        self.writer.flush()?;
        self.written += 1;
        Ok(true)
    }

    /// Frames escritos hasta ahora
    pub fn written(&self) -> usize {
        self.written
    }
}
