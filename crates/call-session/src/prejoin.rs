//! Pre-join flow: preview, device pickers, and enable intents.
//!
//! Before connecting, the user sees a local preview and can toggle
//! camera/microphone and pick devices. Nothing here touches the call
//! backend; the accumulated choices leave as a [`JoinIntent`] when the
//! user commits, and the preview is released before that intent is
//! handed over so the capture devices are free for the call proper.

use tracing::warn;

use crate::devices::{
    with_fallback_labels, DeviceAccessError, DeviceInfo, DeviceKind, DeviceProvider, PreviewStream,
};

/// Pre-join state: a live preview plus the user's device choices.
#[derive(Debug)]
pub struct PreJoin {
    preview: PreviewStream,
    cameras: Vec<DeviceInfo>,
    microphones: Vec<DeviceInfo>,
    audio_enabled: bool,
    video_enabled: bool,
    selected_camera: Option<String>,
    selected_microphone: Option<String>,
}

/// The user's committed choices, consumed when the call connects.
#[derive(Debug, Clone)]
pub struct JoinIntent {
    /// Whether to publish microphone audio on join.
    pub audio_enabled: bool,
    /// Whether to publish camera video on join.
    pub video_enabled: bool,
    /// Preferred camera, if the user picked one.
    pub camera_id: Option<String>,
    /// Preferred microphone, if the user picked one.
    pub microphone_id: Option<String>,
}

impl Default for JoinIntent {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            video_enabled: true,
            camera_id: None,
            microphone_id: None,
        }
    }
}

impl PreJoin {
    /// Acquire a preview and enumerate devices.
    ///
    /// Preview acquisition failures propagate classified so the shell
    /// can show the right message and recovery action. Enumeration
    /// failures are tolerated: the pickers render empty and the
    /// preview still works.
    pub async fn start(provider: &dyn DeviceProvider) -> Result<Self, DeviceAccessError> {
        let preview = PreviewStream::new(provider.acquire_preview().await?);

        let cameras = Self::list(provider, DeviceKind::Camera).await;
        let microphones = Self::list(provider, DeviceKind::Microphone).await;

        Ok(Self {
            preview,
            cameras,
            microphones,
            audio_enabled: true,
            video_enabled: true,
            selected_camera: None,
            selected_microphone: None,
        })
    }

    async fn list(provider: &dyn DeviceProvider, kind: DeviceKind) -> Vec<DeviceInfo> {
        match provider.list_devices(kind).await {
            Ok(devices) => with_fallback_labels(devices, kind),
            Err(e) => {
                warn!(
                    target: "session.devices",
                    ?kind,
                    error = %e,
                    "Device enumeration failed, picker will be empty"
                );
                Vec::new()
            }
        }
    }

    /// Available cameras, with placeholder labels where needed.
    #[must_use]
    pub fn cameras(&self) -> &[DeviceInfo] {
        &self.cameras
    }

    /// Available microphones, with placeholder labels where needed.
    #[must_use]
    pub fn microphones(&self) -> &[DeviceInfo] {
        &self.microphones
    }

    #[must_use]
    pub fn audio_enabled(&self) -> bool {
        self.audio_enabled
    }

    #[must_use]
    pub fn video_enabled(&self) -> bool {
        self.video_enabled
    }

    /// Toggle the microphone intent and mirror it onto the preview.
    pub fn toggle_audio(&mut self) {
        self.audio_enabled = !self.audio_enabled;
        self.preview
            .set_enabled(DeviceKind::Microphone, self.audio_enabled);
    }

    /// Toggle the camera intent and mirror it onto the preview.
    pub fn toggle_video(&mut self) {
        self.video_enabled = !self.video_enabled;
        self.preview
            .set_enabled(DeviceKind::Camera, self.video_enabled);
    }

    /// Record a device preference for the call. Outside a call this is
    /// bookkeeping only; the choice takes effect on join.
    pub fn select_device(&mut self, kind: DeviceKind, device_id: &str) {
        match kind {
            DeviceKind::Camera => self.selected_camera = Some(device_id.to_string()),
            DeviceKind::Microphone => self.selected_microphone = Some(device_id.to_string()),
        }
    }

    /// Commit: release the preview and hand back the join intent.
    ///
    /// The preview is stopped before the intent is returned, so by the
    /// time the caller connects, the devices have been released.
    #[must_use]
    pub fn join(mut self) -> JoinIntent {
        self.preview.stop();
        JoinIntent {
            audio_enabled: self.audio_enabled,
            video_enabled: self.video_enabled,
            camera_id: self.selected_camera.clone(),
            microphone_id: self.selected_microphone.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::devices::PreviewHandle;

    struct TrackingHandle {
        stops: Arc<AtomicUsize>,
    }

    impl PreviewHandle for TrackingHandle {
        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn set_enabled(&mut self, _kind: DeviceKind, _enabled: bool) {}
    }

    struct FakeProvider {
        stops: Arc<AtomicUsize>,
        acquire_error: Option<DeviceAccessError>,
        list_error: Option<DeviceAccessError>,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                stops: Arc::new(AtomicUsize::new(0)),
                acquire_error: None,
                list_error: None,
            }
        }
    }

    #[async_trait]
    impl DeviceProvider for FakeProvider {
        async fn acquire_preview(&self) -> Result<Box<dyn PreviewHandle>, DeviceAccessError> {
            if let Some(e) = self.acquire_error {
                return Err(e);
            }
            Ok(Box::new(TrackingHandle {
                stops: Arc::clone(&self.stops),
            }))
        }

        async fn list_devices(
            &self,
            kind: DeviceKind,
        ) -> Result<Vec<DeviceInfo>, DeviceAccessError> {
            if let Some(e) = self.list_error {
                return Err(e);
            }
            Ok(match kind {
                DeviceKind::Camera => vec![
                    DeviceInfo {
                        device_id: "cam-1".to_string(),
                        label: "Front Camera".to_string(),
                    },
                    DeviceInfo {
                        device_id: "cam-2".to_string(),
                        label: String::new(),
                    },
                ],
                DeviceKind::Microphone => vec![DeviceInfo {
                    device_id: "mic-1".to_string(),
                    label: String::new(),
                }],
            })
        }
    }

    #[tokio::test]
    async fn test_start_enumerates_with_fallback_labels() {
        let provider = FakeProvider::new();
        let prejoin = PreJoin::start(&provider).await.unwrap();

        let camera_labels: Vec<&str> =
            prejoin.cameras().iter().map(|d| d.label.as_str()).collect();
        assert_eq!(camera_labels, vec!["Front Camera", "Camera 2"]);
        assert_eq!(prejoin.microphones().first().unwrap().label, "Microphone 1");
        assert!(prejoin.audio_enabled());
        assert!(prejoin.video_enabled());
    }

    #[tokio::test]
    async fn test_acquire_failure_propagates_classified() {
        let mut provider = FakeProvider::new();
        provider.acquire_error = Some(DeviceAccessError::PermissionDenied);

        let err = PreJoin::start(&provider).await.unwrap_err();
        assert_eq!(err, DeviceAccessError::PermissionDenied);
    }

    #[tokio::test]
    async fn test_enumeration_failure_is_tolerated() {
        let mut provider = FakeProvider::new();
        provider.list_error = Some(DeviceAccessError::Unknown);

        let prejoin = PreJoin::start(&provider).await.unwrap();
        assert!(prejoin.cameras().is_empty());
        assert!(prejoin.microphones().is_empty());
    }

    #[tokio::test]
    async fn test_toggles_flip_intents() {
        let provider = FakeProvider::new();
        let mut prejoin = PreJoin::start(&provider).await.unwrap();

        prejoin.toggle_audio();
        prejoin.toggle_video();
        assert!(!prejoin.audio_enabled());
        assert!(!prejoin.video_enabled());

        prejoin.toggle_audio();
        assert!(prejoin.audio_enabled());
    }

    #[tokio::test]
    async fn test_join_stops_preview_and_carries_choices() {
        let provider = FakeProvider::new();
        let stops = Arc::clone(&provider.stops);
        let mut prejoin = PreJoin::start(&provider).await.unwrap();

        prejoin.toggle_video();
        prejoin.select_device(DeviceKind::Camera, "cam-2");
        prejoin.select_device(DeviceKind::Microphone, "mic-1");

        let intent = prejoin.join();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(intent.audio_enabled);
        assert!(!intent.video_enabled);
        assert_eq!(intent.camera_id.as_deref(), Some("cam-2"));
        assert_eq!(intent.microphone_id.as_deref(), Some("mic-1"));
    }

    #[tokio::test]
    async fn test_join_releases_exactly_once() {
        let provider = FakeProvider::new();
        let stops = Arc::clone(&provider.stops);
        let prejoin = PreJoin::start(&provider).await.unwrap();

        // join() consumes the guard, so the drop inside must not
        // release a second time
        let _intent = prejoin.join();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}
