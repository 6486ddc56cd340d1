use crate::{AssetError, ModelData, import_gltf};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Starts model imports off the frame thread.
pub struct AssetLoader;

impl AssetLoader {
    /// Import `path` on a worker thread. The result is collected with
    /// [`PendingAsset::poll`] from whichever thread owns the scene.
    pub fn spawn(path: impl Into<PathBuf>) -> PendingAsset {
        let path = path.into();
        let (tx, rx) = mpsc::channel();

        let worker_path = path.clone();
        let worker_tx = tx.clone();
        let spawned = thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let result = import_gltf(&worker_path);
                // The receiver may already be gone if the session ended.
                let _ = worker_tx.send(result);
            });

        if let Err(source) = spawned {
            tracing::error!(path = %path.display(), "failed to start asset loader thread");
            let _ = tx.send(Err(AssetError::Io {
                path: path.clone(),
                source,
            }));
        }

        tracing::info!(path = %path.display(), "asset load started");
        PendingAsset { path, rx }
    }
}

/// An in-flight import.
pub struct PendingAsset {
    path: PathBuf,
    rx: Receiver<Result<ModelData, AssetError>>,
}

impl PendingAsset {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check for completion. `None` while the import is running.
    pub fn poll(&self) -> Option<Result<ModelData, AssetError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(Err(AssetError::Disconnected(self.path.clone())))
            }
        }
    }

    /// Block until the import finishes.
    pub fn wait(self) -> Result<ModelData, AssetError> {
        self.rx
            .recv()
            .unwrap_or_else(|_| Err(AssetError::Disconnected(self.path.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gltf_import::tests::{TRIANGLE_GLTF, write_fixture};
    use std::time::{Duration, Instant};

    fn poll_until_done(pending: &PendingAsset) -> Result<ModelData, AssetError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = pending.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "loader never finished");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn loads_in_background() {
        let file = write_fixture(TRIANGLE_GLTF);
        let pending = AssetLoader::spawn(file.path());
        assert_eq!(pending.path(), file.path());
        let model = poll_until_done(&pending).unwrap();
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn failure_is_delivered_not_panicked() {
        let pending = AssetLoader::spawn("missing/scene.gltf");
        assert!(matches!(
            poll_until_done(&pending),
            Err(AssetError::Io { .. })
        ));
    }

    #[test]
    fn polling_after_delivery_reports_disconnect() {
        let pending = AssetLoader::spawn("missing/scene.gltf");
        let _ = poll_until_done(&pending);
        // Worker has exited and dropped its sender.
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            match pending.poll() {
                Some(Err(AssetError::Disconnected(_))) => break,
                None => {
                    assert!(Instant::now() < deadline);
                    thread::sleep(Duration::from_millis(2));
                }
                Some(other) => panic!("unexpected second result: {other:?}"),
            }
        }
    }

    #[test]
    fn wait_blocks_for_result() {
        let file = write_fixture(TRIANGLE_GLTF);
        let model = AssetLoader::spawn(file.path()).wait().unwrap();
        assert_eq!(model.meshes.len(), 1);
    }
}
