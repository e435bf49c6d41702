//! Capture device handling: kinds, access-failure classification, and
//! the preview stream guard.
//!
//! Device acquisition goes through an injected [`DeviceProvider`] so
//! the core stays platform-agnostic; the shell adapts whatever media
//! API the platform exposes. Acquisition failures are classified into
//! [`DeviceAccessError`] from the platform's reported error name, each
//! with a distinct user-facing message and a recovery action.
//!
//! # Stream ownership
//!
//! A preview stream is exclusively owned by its [`PreviewStream`]
//! guard. Release happens exactly once: either through an explicit
//! [`PreviewStream::stop`] or on drop, whichever comes first.

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// Device kinds and descriptors
// ============================================================================

/// Kind of capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Camera,
    Microphone,
}

impl DeviceKind {
    /// Placeholder label stem used when the platform withholds labels.
    fn placeholder(self) -> &'static str {
        match self {
            DeviceKind::Camera => "Camera",
            DeviceKind::Microphone => "Microphone",
        }
    }
}

/// A capture device as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Platform device identifier, opaque to this crate.
    pub device_id: String,
    /// Human-readable label. May be empty before permission is granted.
    pub label: String,
}

/// Replace empty labels with "Camera N" / "Microphone N" placeholders.
///
/// Platforms withhold device labels until capture permission has been
/// granted at least once; the placeholders keep pickers usable.
#[must_use]
pub fn with_fallback_labels(devices: Vec<DeviceInfo>, kind: DeviceKind) -> Vec<DeviceInfo> {
    devices
        .into_iter()
        .enumerate()
        .map(|(i, mut device)| {
            if device.label.is_empty() {
                device.label = format!("{} {}", kind.placeholder(), i + 1);
            }
            device
        })
        .collect()
}

// ============================================================================
// Access-failure classification
// ============================================================================

/// Classified failure acquiring camera/microphone access.
///
/// The display text is the user-facing message; the real platform
/// error stays in the logs at the call site.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAccessError {
    /// The user (or a policy) denied the permission prompt.
    #[error(
        "Camera and microphone access was denied. Please allow access in \
         your browser settings to join the meeting."
    )]
    PermissionDenied,
    /// No capture hardware is available.
    #[error("No camera or microphone found. Please connect a device and try again.")]
    NotFound,
    /// The hardware exists but another application holds it.
    #[error("Your camera or microphone is already in use by another application.")]
    InUse,
    /// Anything the platform reported that we do not recognize.
    #[error("Unable to access camera and microphone. Please check your device settings.")]
    Unknown,
}

impl DeviceAccessError {
    /// Classify a platform error by its reported name.
    #[must_use]
    pub fn from_platform_error(name: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" => Self::PermissionDenied,
            "NotFoundError" | "DevicesNotFoundError" => Self::NotFound,
            "NotReadableError" | "TrackStartError" => Self::InUse,
            _ => Self::Unknown,
        }
    }

    /// What the shell should offer after this failure.
    ///
    /// A denied permission persists until the user changes it outside
    /// the app, so an immediate retry would fail identically.
    #[must_use]
    pub fn recovery(self) -> RecoveryAction {
        match self {
            Self::PermissionDenied => RecoveryAction::GoBack,
            Self::NotFound | Self::InUse | Self::Unknown => RecoveryAction::Retry,
        }
    }
}

/// Recovery action the shell should present for a device failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retrying the request can succeed (device freed or plugged in).
    Retry,
    /// Retrying cannot help; return to the previous screen.
    GoBack,
}

// ============================================================================
// Provider seam
// ============================================================================

/// Raw handle to acquired preview tracks.
///
/// Implementations release the underlying platform capture on `stop`.
/// The [`PreviewStream`] guard guarantees `stop` is called at most
/// once.
pub trait PreviewHandle: Send {
    /// Stop and release all tracks.
    fn stop(&mut self);

    /// Enable or disable the track of the given kind without releasing
    /// it.
    fn set_enabled(&mut self, kind: DeviceKind, enabled: bool);
}

/// Injected access to the platform's capture devices.
#[async_trait]
pub trait DeviceProvider: Send + Sync {
    /// Request an audio+video preview stream, prompting for permission
    /// if needed.
    async fn acquire_preview(&self) -> Result<Box<dyn PreviewHandle>, DeviceAccessError>;

    /// List capture devices of the given kind.
    async fn list_devices(&self, kind: DeviceKind) -> Result<Vec<DeviceInfo>, DeviceAccessError>;
}

// ============================================================================
// Preview stream guard
// ============================================================================

/// Owned preview stream with deterministic release.
pub struct PreviewStream {
    handle: Option<Box<dyn PreviewHandle>>,
}

impl PreviewStream {
    pub(crate) fn new(handle: Box<dyn PreviewHandle>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Stop and release the underlying tracks. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
    }

    /// Enable or disable a preview track. No-op after `stop`.
    pub fn set_enabled(&mut self, kind: DeviceKind, enabled: bool) {
        if let Some(handle) = &mut self.handle {
            handle.set_enabled(kind, enabled);
        }
    }

    /// Whether the stream has already been released.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for PreviewStream {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PreviewStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewStream")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandle {
        stops: Arc<AtomicUsize>,
    }

    impl PreviewHandle for CountingHandle {
        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }

        fn set_enabled(&mut self, _kind: DeviceKind, _enabled: bool) {}
    }

    fn counting_stream() -> (PreviewStream, Arc<AtomicUsize>) {
        let stops = Arc::new(AtomicUsize::new(0));
        let stream = PreviewStream::new(Box::new(CountingHandle {
            stops: Arc::clone(&stops),
        }));
        (stream, stops)
    }

    #[test]
    fn test_classification_covers_platform_error_names() {
        assert_eq!(
            DeviceAccessError::from_platform_error("NotAllowedError"),
            DeviceAccessError::PermissionDenied
        );
        assert_eq!(
            DeviceAccessError::from_platform_error("PermissionDeniedError"),
            DeviceAccessError::PermissionDenied
        );
        assert_eq!(
            DeviceAccessError::from_platform_error("NotFoundError"),
            DeviceAccessError::NotFound
        );
        assert_eq!(
            DeviceAccessError::from_platform_error("DevicesNotFoundError"),
            DeviceAccessError::NotFound
        );
        assert_eq!(
            DeviceAccessError::from_platform_error("NotReadableError"),
            DeviceAccessError::InUse
        );
        assert_eq!(
            DeviceAccessError::from_platform_error("TrackStartError"),
            DeviceAccessError::InUse
        );
        assert_eq!(
            DeviceAccessError::from_platform_error("SomethingElse"),
            DeviceAccessError::Unknown
        );
    }

    #[test]
    fn test_each_classification_has_a_distinct_message() {
        let messages: Vec<String> = [
            DeviceAccessError::PermissionDenied,
            DeviceAccessError::NotFound,
            DeviceAccessError::InUse,
            DeviceAccessError::Unknown,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_recovery_actions() {
        assert_eq!(
            DeviceAccessError::PermissionDenied.recovery(),
            RecoveryAction::GoBack
        );
        assert_eq!(DeviceAccessError::NotFound.recovery(), RecoveryAction::Retry);
        assert_eq!(DeviceAccessError::InUse.recovery(), RecoveryAction::Retry);
        assert_eq!(DeviceAccessError::Unknown.recovery(), RecoveryAction::Retry);
    }

    #[test]
    fn test_fallback_labels_fill_empty_only() {
        let devices = vec![
            DeviceInfo {
                device_id: "cam-a".to_string(),
                label: String::new(),
            },
            DeviceInfo {
                device_id: "cam-b".to_string(),
                label: "FaceTime HD".to_string(),
            },
            DeviceInfo {
                device_id: "cam-c".to_string(),
                label: String::new(),
            },
        ];

        let labelled = with_fallback_labels(devices, DeviceKind::Camera);
        let labels: Vec<&str> = labelled.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Camera 1", "FaceTime HD", "Camera 3"]);

        let mics = with_fallback_labels(
            vec![DeviceInfo {
                device_id: "mic-a".to_string(),
                label: String::new(),
            }],
            DeviceKind::Microphone,
        );
        assert_eq!(mics.first().unwrap().label, "Microphone 1");
    }

    #[test]
    fn test_preview_stream_stop_releases_once() {
        let (mut stream, stops) = counting_stream();

        stream.stop();
        assert!(stream.is_stopped());
        assert_eq!(stops.load(Ordering::SeqCst), 1);

        // Second stop and the eventual drop must not release again
        stream.stop();
        drop(stream);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_preview_stream_drop_releases() {
        let (stream, stops) = counting_stream();
        drop(stream);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_enabled_after_stop_is_noop() {
        let (mut stream, _stops) = counting_stream();
        stream.stop();
        // Must not panic on a released stream
        stream.set_enabled(DeviceKind::Camera, false);
    }
}
