//! Animated GIF output of recorded generations.
//!
//! The recorder buffers the snapshots of one generation and, on the last one,
//! hands them to a background thread that renders and encodes them, so the
//! next generation can start right away.

use std::fs::File;
use std::io::BufWriter;
use std::mem;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};
use tracing::{debug, error, info};

use crate::simulation::error::RenderError;
use crate::simulation::snapshot::{Observer, Snapshot};

/// Pixels per grid cell.
const SCALE: i32 = 2;
/// Radius of the disc drawn for each agent, in pixels.
const RADIUS: i32 = 2;
/// Display time of each frame.
const FRAME_MS: u32 = 100;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// File name of the animation of generation `index`.
pub fn gif_file_name(index: usize) -> String {
    format!("generation_{index:06}.gif")
}

/// Renders one snapshot as a raster frame.
pub fn render_frame(snapshot: &Snapshot) -> RgbaImage {
    let side = (snapshot.size.max(1) * SCALE) as u32;
    let mut image = RgbaImage::from_pixel(side, side, BACKGROUND);

    for &(coordinate, [r, g, b]) in &snapshot.occupants {
        let (cx, cy) = (coordinate.x * SCALE, coordinate.y * SCALE);
        for dy in -RADIUS..=RADIUS {
            for dx in -RADIUS..=RADIUS {
                if dx * dx + dy * dy > RADIUS * RADIUS {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if x >= 0 && y >= 0 && (x as u32) < side && (y as u32) < side {
                    image.put_pixel(x as u32, y as u32, Rgba([r, g, b, 255]));
                }
            }
        }
    }
    image
}

/// Renders `snapshots` and writes them to `path` as an endlessly looping GIF.
pub fn write_gif(snapshots: &[Snapshot], path: &Path) -> Result<(), RenderError> {
    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(snapshots.iter().map(|snapshot| {
        Frame::from_parts(
            render_frame(snapshot),
            0,
            0,
            Delay::from_numer_denom_ms(FRAME_MS, 1),
        )
    }))?;
    Ok(())
}

/// Observer that turns every observed generation into a GIF.
///
/// Finished encoders are reaped on every notification; their failures are
/// logged right away and the first one is returned by [`GifRecorder::finish`].
pub struct GifRecorder {
    output_dir: PathBuf,
    frames: Vec<Snapshot>,
    workers: Vec<JoinHandle<Result<PathBuf, RenderError>>>,
    written: Vec<PathBuf>,
    failure: Option<RenderError>,
}

impl GifRecorder {
    /// Creates a recorder writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            frames: Vec::new(),
            workers: Vec::new(),
            written: Vec::new(),
            failure: None,
        }
    }

    /// Encoder threads started and not yet reaped.
    pub fn pending(&self) -> usize {
        self.workers.len()
    }

    /// Joins every encoder thread that has already finished.
    pub fn reap(&mut self) {
        let (finished, running): (Vec<_>, Vec<_>) = mem::take(&mut self.workers)
            .into_iter()
            .partition(JoinHandle::is_finished);
        self.workers = running;
        for worker in finished {
            self.collect(worker);
        }
    }

    /// Waits for every encoder thread, returning the written paths or the
    /// first failure.
    pub fn finish(mut self) -> Result<Vec<PathBuf>, RenderError> {
        for worker in mem::take(&mut self.workers) {
            self.collect(worker);
        }
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.written),
        }
    }

    fn collect(&mut self, worker: JoinHandle<Result<PathBuf, RenderError>>) {
        match worker
            .join()
            .unwrap_or_else(|_| Err(RenderError::WorkerPanicked))
        {
            Ok(path) => self.written.push(path),
            Err(err) => {
                error!(%err, "gif encoding failed");
                if self.failure.is_none() {
                    self.failure = Some(err);
                }
            }
        }
    }

    fn spawn_encoder(&mut self, frames: Vec<Snapshot>) {
        let Some(generation) = frames.last().map(|snapshot| snapshot.generation) else {
            return;
        };
        let path = self.output_dir.join(gif_file_name(generation));
        debug!(generation, frames = frames.len(), path = %path.display(), "encoding gif");

        self.workers.push(thread::spawn(move || {
            write_gif(&frames, &path)?;
            info!(path = %path.display(), "wrote gif");
            Ok(path)
        }));
    }
}

impl Observer for GifRecorder {
    fn notify(&mut self, snapshot: Snapshot, is_last: bool) {
        self.frames.push(snapshot);
        if is_last {
            self.reap();
            let frames = mem::take(&mut self.frames);
            self.spawn_encoder(frames);
        }
    }
}
