use std::path::PathBuf;

use tracing::{info, warn};

use crate::browser::PageSession;

/// Screenshot sink for one agent's audit checkpoints. Capture is
/// best-effort: a failed screenshot is logged and the run carries on.
#[derive(Debug, Clone)]
pub struct Artifacts {
    dir: PathBuf,
}

impl Artifacts {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub async fn capture(&self, session: &dyn PageSession, name: &str) {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(dir = %self.dir.display(), error = %e, "Cannot create artifact dir");
            return;
        }
        let path = self.dir.join(format!("{}.png", name));
        match session.screenshot(&path).await {
            Ok(()) => info!(path = %path.display(), "Checkpoint screenshot saved"),
            Err(e) => warn!(checkpoint = name, error = %e, "Screenshot failed"),
        }
    }
}
