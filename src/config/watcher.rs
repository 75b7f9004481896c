//! Hot reload of the configuration file.
//!
//! Editors often emit several modify events per save, so a reload is only
//! forwarded when the parsed config differs from the last one forwarded.
//! Invalid files are logged and ignored; the server keeps its current gate.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::GateServerConfig;

/// Watches one config file and streams validated updates.
pub struct ConfigWatcher {
    path: PathBuf,
    last_sent: Arc<Mutex<Option<GateServerConfig>>>,
    update_tx: mpsc::UnboundedSender<GateServerConfig>,
}

impl ConfigWatcher {
    /// `initial` is the config already in use, so that touching the file
    /// without changing it does not trigger a rebuild.
    pub fn new(
        path: &Path,
        initial: Option<GateServerConfig>,
    ) -> (Self, mpsc::UnboundedReceiver<GateServerConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            last_sent: Arc::new(Mutex::new(initial)),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let last_sent = self.last_sent.clone();
        let tx = self.update_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    match reload_if_changed(&path, &last_sent) {
                        Ok(Some(config)) => {
                            tracing::info!(path = ?path, "Config reloaded");
                            let _ = tx.send(config);
                        }
                        Ok(None) => tracing::debug!(path = ?path, "Config unchanged"),
                        Err(e) => tracing::error!(
                            path = ?path,
                            error = %e,
                            "Rejected config reload; keeping current configuration"
                        ),
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load `path` and return it if it differs from `last_sent`, remembering it.
fn reload_if_changed(
    path: &Path,
    last_sent: &Mutex<Option<GateServerConfig>>,
) -> Result<Option<GateServerConfig>, ConfigError> {
    let config = load_config(path)?;
    let mut last = match last_sent.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if last.as_ref() == Some(&config) {
        return Ok(None);
    }
    *last = Some(config.clone());
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reload_only_forwards_changes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gate]\nmax_requests_per_minute = 12").unwrap();
        let last = Mutex::new(None);

        let first = reload_if_changed(file.path(), &last).unwrap();
        assert_eq!(first.map(|c| c.gate.max_requests_per_minute), Some(12));
        assert!(reload_if_changed(file.path(), &last).unwrap().is_none());
    }

    #[test]
    fn test_invalid_reload_keeps_previous() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gate]\nmax_requests_per_minute = 0").unwrap();
        let last = Mutex::new(Some(GateServerConfig::default()));

        assert!(reload_if_changed(file.path(), &last).is_err());
        assert_eq!(*last.lock().unwrap(), Some(GateServerConfig::default()));
    }
}
