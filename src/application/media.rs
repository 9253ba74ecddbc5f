//! Exclusive ownership of the camera/microphone stream

use tracing::{debug, info};

use super::ports::{MediaConstraints, MediaDevice, MediaError, MediaStream, TrackKind, TrackSource};

/// Borrowed view of the live device stream
pub struct DeviceHandle {
    stream: Box<dyn MediaStream>,
}

impl DeviceHandle {
    pub fn tracks(&self) -> Vec<TrackSource> {
        self.stream.tracks()
    }

    pub fn track_count(&self) -> usize {
        self.stream.track_count()
    }
}

enum HandleSlot {
    Unacquired,
    Held(DeviceHandle),
    Released,
}

/// Owns the single device handle of an interview.
///
/// Lifecycle: unacquired -> held -> released. The handle is opened at most
/// once; after release it cannot be acquired again.
pub struct MediaResourceManager<D: MediaDevice> {
    device: D,
    slot: HandleSlot,
}

impl<D: MediaDevice> MediaResourceManager<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            slot: HandleSlot::Unacquired,
        }
    }

    /// Open the device, or return the handle already held.
    ///
    /// Permission and availability errors are returned as-is; nothing is
    /// retried here.
    pub async fn acquire(&mut self, constraints: &MediaConstraints) -> Result<&DeviceHandle, MediaError> {
        match self.slot {
            HandleSlot::Released => return Err(MediaError::AlreadyReleased),
            HandleSlot::Held(_) => debug!("media device already held"),
            HandleSlot::Unacquired => {
                let stream = self.device.open(constraints).await?;
                info!(tracks = stream.track_count(), "media device acquired");
                self.slot = HandleSlot::Held(DeviceHandle { stream });
            }
        }
        match &self.slot {
            HandleSlot::Held(handle) => Ok(handle),
            _ => Err(MediaError::AlreadyReleased),
        }
    }

    /// Stop all tracks and drop the handle. Safe to call in any state.
    ///
    /// The handle is dropped even when stopping reports an error.
    pub fn release(&mut self) -> Result<(), MediaError> {
        match std::mem::replace(&mut self.slot, HandleSlot::Released) {
            HandleSlot::Held(mut handle) => {
                let result = handle.stream.stop();
                info!("media device released");
                result
            }
            _ => Ok(()),
        }
    }

    pub fn set_track_enabled(&mut self, kind: TrackKind, enabled: bool) -> Result<(), MediaError> {
        match &mut self.slot {
            HandleSlot::Held(handle) => {
                handle.stream.set_track_enabled(kind, enabled)?;
                debug!(track = %kind, enabled, "track toggled");
                Ok(())
            }
            HandleSlot::Unacquired => Err(MediaError::DeviceUnavailable(
                "media device not acquired".to_string(),
            )),
            HandleSlot::Released => Err(MediaError::AlreadyReleased),
        }
    }

    /// Flip a track from its current enabled state; returns the new state
    pub fn toggle_track(&mut self, kind: TrackKind) -> Result<bool, MediaError> {
        let enabled = match &self.slot {
            HandleSlot::Held(handle) => handle
                .tracks()
                .iter()
                .find(|t| t.kind == kind)
                .map(|t| t.enabled)
                .ok_or(MediaError::TrackNotFound(kind))?,
            HandleSlot::Unacquired => {
                return Err(MediaError::DeviceUnavailable(
                    "media device not acquired".to_string(),
                ))
            }
            HandleSlot::Released => return Err(MediaError::AlreadyReleased),
        };
        self.set_track_enabled(kind, !enabled)?;
        Ok(!enabled)
    }

    pub fn handle(&self) -> Option<&DeviceHandle> {
        match &self.slot {
            HandleSlot::Held(handle) => Some(handle),
            _ => None,
        }
    }

    /// Live tracks, empty unless the handle is held
    pub fn tracks(&self) -> Vec<TrackSource> {
        self.handle().map(DeviceHandle::tracks).unwrap_or_default()
    }

    /// Live track count; 0 before acquisition and after release
    pub fn track_count(&self) -> usize {
        self.handle().map(DeviceHandle::track_count).unwrap_or(0)
    }

    pub fn is_held(&self) -> bool {
        matches!(self.slot, HandleSlot::Held(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(self.slot, HandleSlot::Released)
    }
}
