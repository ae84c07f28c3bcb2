//! Background texture loading: decode jobs run on a small worker pool and
//! completed results are collected by the main thread.

use crate::decode::{DEFAULT_MAX_DIMENSION, decode_texture_within};
use crate::AssetError;
use moonfield_common::TextureImage;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Identifies one submitted load. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadId(pub u64);

struct LoadJob {
    id: LoadId,
    path: PathBuf,
}

/// A finished load, successful or not.
#[derive(Debug)]
pub struct LoadResult {
    pub id: LoadId,
    pub path: PathBuf,
    pub outcome: Result<Arc<TextureImage>, AssetError>,
}

/// Worker pool that decodes texture files off the main thread.
///
/// Submit with [`load`](Self::load); collect with
/// [`drain_completed`](Self::drain_completed), typically once per frame.
/// Loads are never cancelled and have no timeout.
pub struct TextureLoader {
    job_sender: Option<crossbeam_channel::Sender<LoadJob>>,
    result_receiver: crossbeam_channel::Receiver<LoadResult>,
    worker_handles: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
    next_id: u64,
}

impl TextureLoader {
    /// Spawn `worker_count` decode threads (at least one). Images are
    /// scaled to fit [`DEFAULT_MAX_DIMENSION`].
    pub fn new(worker_count: usize) -> Self {
        Self::with_max_dimension(worker_count, DEFAULT_MAX_DIMENSION)
    }

    /// Spawn the pool; decoded images never exceed `max_dimension` on
    /// either side.
    pub fn with_max_dimension(worker_count: usize, max_dimension: u32) -> Self {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<LoadJob>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let worker_count = worker_count.max(1);
        let mut handles = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let rx = job_rx.clone();
            let tx = result_tx.clone();
            let flight = Arc::clone(&in_flight);

            let spawned = std::thread::Builder::new()
                .name(format!("texture-loader-{index}"))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        let outcome = decode_texture_within(&job.path, max_dimension).map(Arc::new);
                        tracing::debug!(
                            id = job.id.0,
                            path = %job.path.display(),
                            ok = outcome.is_ok(),
                            "texture decode finished"
                        );
                        let _ = tx.send(LoadResult {
                            id: job.id,
                            path: job.path,
                            outcome,
                        });
                        flight.fetch_sub(1, Ordering::AcqRel);
                    }
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => tracing::warn!(index, %err, "failed to spawn texture loader thread"),
            }
        }

        // Without any worker the channel is closed up front, so every load
        // reports LoaderClosed instead of hanging.
        let job_sender = (!handles.is_empty()).then_some(job_tx);

        Self {
            job_sender,
            result_receiver: result_rx,
            worker_handles: handles,
            in_flight,
            next_id: 0,
        }
    }

    /// Queue a file for decoding.
    pub fn load(&mut self, path: impl Into<PathBuf>) -> Result<LoadId, AssetError> {
        let sender = self.job_sender.as_ref().ok_or(AssetError::LoaderClosed)?;
        self.next_id += 1;
        let id = LoadId(self.next_id);
        let path = path.into();
        tracing::debug!(id = id.0, path = %path.display(), "texture load queued");

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        if sender.send(LoadJob { id, path }).is_err() {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return Err(AssetError::LoaderClosed);
        }
        Ok(id)
    }

    /// All results completed since the last call, in completion order.
    pub fn drain_completed(&self) -> Vec<LoadResult> {
        self.result_receiver.try_iter().collect()
    }

    /// Loads queued or decoding right now.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Block until no load is in flight or `timeout` elapses. Returns true
    /// if the pool went idle. Results stay queued for `drain_completed`.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.in_flight() > 0 {
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Stop accepting loads and join the workers after they finish the
    /// queued jobs.
    pub fn shutdown(&mut self) {
        self.job_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &std::path::Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(w, h, image::Rgba([200, 100, 50, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn collect(loader: &TextureLoader, expected: usize) -> Vec<LoadResult> {
        assert!(loader.wait_idle(Duration::from_secs(10)));
        let results = loader.drain_completed();
        assert_eq!(results.len(), expected);
        results
    }

    #[test]
    fn loads_complete_off_thread() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "space.png", 8, 4);
        let mut loader = TextureLoader::new(2);

        let id = loader.load(&path).unwrap();
        let results = collect(&loader, 1);
        assert_eq!(results[0].id, id);
        let image = results[0].outcome.as_ref().unwrap();
        assert_eq!((image.width, image.height), (8, 4));
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn failures_are_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = TextureLoader::new(1);
        loader.load(dir.path().join("missing.jpg")).unwrap();
        let results = collect(&loader, 1);
        assert!(matches!(results[0].outcome, Err(AssetError::Io { .. })));
    }

    #[test]
    fn same_path_twice_yields_two_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "space.png", 2, 2);
        let mut loader = TextureLoader::new(2);
        let a = loader.load(&path).unwrap();
        let b = loader.load(&path).unwrap();
        assert_ne!(a, b);

        let mut ids: Vec<LoadId> = collect(&loader, 2).into_iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn drain_is_empty_when_nothing_finished() {
        let loader = TextureLoader::new(1);
        assert!(loader.drain_completed().is_empty());
        assert!(loader.wait_idle(Duration::ZERO));
    }

    #[test]
    fn load_after_shutdown_fails() {
        let mut loader = TextureLoader::new(1);
        loader.shutdown();
        assert!(matches!(
            loader.load("space.jpg"),
            Err(AssetError::LoaderClosed)
        ));
    }

    #[test]
    fn decoded_images_respect_max_dimension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "moon.png", 300, 30);
        let mut loader = TextureLoader::with_max_dimension(1, 100);
        loader.load(&path).unwrap();
        let results = collect(&loader, 1);
        let image = results[0].outcome.as_ref().unwrap();
        assert_eq!((image.width, image.height), (100, 10));
    }
}
