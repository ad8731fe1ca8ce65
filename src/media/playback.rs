use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use crate::site::AssetLocation;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("could not start {player}: {source}")]
    Spawn {
        player: String,
        #[source]
        source: std::io::Error,
    },
}

/// The viewer's video surface: an external player window (ffplay by default).
///
/// Only one video plays at a time. Stopping is the viewer's "pause": the
/// player is closed when the viewer closes or moves to another item.
#[derive(Debug)]
pub struct VideoPlayback {
    player: PathBuf,
    child: Option<Child>,
    /// Canonical index of the video being played
    playing: Option<usize>,
}

impl VideoPlayback {
    pub fn new(player: PathBuf) -> Self {
        VideoPlayback {
            player,
            child: None,
            playing: None,
        }
    }

    pub fn playing(&self) -> Option<usize> {
        self.playing
    }

    /// Start playing `location`, stopping whatever played before
    pub fn play(&mut self, index: usize, location: &AssetLocation) -> Result<(), PlaybackError> {
        self.stop();

        let child = Command::new(&self.player)
            .args(["-autoexit", "-loglevel", "error"])
            .arg("-window_title")
            .arg(location.to_string())
            .arg(location.as_os_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlaybackError::Spawn {
                player: self.player.display().to_string(),
                source,
            })?;

        log::info!("▶️  Playing {} (pid {})", location, child.id());
        self.child = Some(child);
        self.playing = Some(index);
        Ok(())
    }

    /// Forget a player that exited on its own (end of video, window closed).
    /// Returns true if the playing state changed.
    pub fn refresh(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("Player exited with {}", status);
                self.child = None;
                self.playing = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("⚠️  Lost track of player: {}", e);
                self.child = None;
                self.playing = None;
                true
            }
        }
    }

    /// Stop playback. No-op when nothing is playing.
    pub fn stop(&mut self) {
        self.playing = None;

        let Some(mut child) = self.child.take() else {
            return;
        };

        match child.try_wait() {
            // Player already exited on its own
            Ok(Some(_)) => {}
            _ => {
                if let Err(e) = child.kill() {
                    log::warn!("⚠️  Failed to stop player: {}", e);
                }
                let _ = child.wait();
            }
        }
    }
}

impl Drop for VideoPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}
