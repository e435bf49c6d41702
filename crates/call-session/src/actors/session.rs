//! `SessionActor` - per-call actor that owns in-call state.
//!
//! Each `SessionActor`:
//! - Owns the roster (local participant included), the chat log, the
//!   bitrate controller, and the metadata one-shot flag
//! - Consumes backend events and shell commands in one select loop,
//!   so all state mutation is single-threaded
//! - Disconnects the backend on cancellation, which releases capture
//!   devices and event listeners
//!
//! The media backend and the meeting API arrive as injected trait
//! objects; the actor never names a concrete implementation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::messages::{SessionCommand, SessionConfig, SessionSnapshot};
use crate::backend::MediaBackend;
use crate::bitrate::BitrateController;
use crate::chat::{self, ChatLog, ChatMessage};
use crate::devices::DeviceKind;
use crate::errors::SessionError;
use crate::events::SessionEvent;
use crate::metadata_writer::{MeetingApi, MetadataWrite, MetadataWriter, RetrySchedule};
use crate::observability;
use crate::roster::{Participant, Roster};

/// Channel buffer size for the session command mailbox. Commands are
/// user-initiated, so the mailbox stays shallow.
const SESSION_CHANNEL_BUFFER: usize = 64;

/// Handle to a `SessionActor`.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
    cancel_token: CancellationToken,
    room_name: String,
}

impl SessionHandle {
    /// Get the backend room name this session is connected to.
    #[must_use]
    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// Send a chat message to everyone in the call.
    ///
    /// Returns the locally appended message. Delivery failures are
    /// logged inside the actor; the local echo always succeeds.
    pub async fn send_chat(&self, text: String) -> Result<ChatMessage, SessionError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(SessionCommand::SendChat {
                text,
                respond_to: tx,
            })
            .await
            .map_err(|e| SessionError::Channel(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| SessionError::Channel(format!("response receive failed: {e}")))
    }

    /// Get a point-in-time copy of the visible call state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(SessionCommand::GetSnapshot { respond_to: tx })
            .await
            .map_err(|e| SessionError::Channel(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| SessionError::Channel(format!("response receive failed: {e}")))
    }

    /// Enable or disable the local microphone.
    pub async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::SetMicrophoneEnabled { enabled })
            .await
            .map_err(|e| SessionError::Channel(format!("channel send failed: {e}")))
    }

    /// Enable or disable the local camera.
    pub async fn set_camera_enabled(&self, enabled: bool) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::SetCameraEnabled { enabled })
            .await
            .map_err(|e| SessionError::Channel(format!("channel send failed: {e}")))
    }

    /// Switch the active capture device mid-call.
    pub async fn switch_device(
        &self,
        kind: DeviceKind,
        device_id: String,
    ) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::SwitchDevice { kind, device_id })
            .await
            .map_err(|e| SessionError::Channel(format!("channel send failed: {e}")))
    }

    /// Rename the meeting. Hosts republish the room metadata.
    pub async fn set_meeting_name(&self, name: String) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::SetMeetingName { name })
            .await
            .map_err(|e| SessionError::Channel(format!("channel send failed: {e}")))
    }

    /// Leave the call and wait for the actor to acknowledge.
    pub async fn leave(&self) -> Result<(), SessionError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(SessionCommand::Leave { respond_to: tx })
            .await
            .map_err(|e| SessionError::Channel(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| SessionError::Channel(format!("response receive failed: {e}")))
    }

    /// Cancel the session actor.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Per-call actor owning all in-call state.
pub struct SessionActor {
    /// Local participant and room facts, fixed at join.
    config: SessionConfig,
    /// Media backend for this call.
    backend: Arc<dyn MediaBackend>,
    /// Command receiver.
    receiver: mpsc::Receiver<SessionCommand>,
    /// Backend event receiver.
    events: mpsc::Receiver<SessionEvent>,
    /// Cancellation token, shared with the handle.
    cancel_token: CancellationToken,
    /// Participants in display order, local first.
    roster: Roster,
    /// Chat log in arrival order.
    chat: ChatLog,
    /// Publish bitrate controller.
    bitrate: BitrateController,
    /// Host-side metadata writer with the one-shot flag.
    metadata: MetadataWriter,
    /// Whether the backend currently reports the session connected.
    connected: bool,
}

impl SessionActor {
    /// Spawn a new session actor.
    ///
    /// Returns a handle and the task join handle. The `events`
    /// receiver is the backend's event stream; closing it shuts the
    /// session down.
    pub fn spawn(
        config: SessionConfig,
        backend: Arc<dyn MediaBackend>,
        events: mpsc::Receiver<SessionEvent>,
        meeting_api: Arc<dyn MeetingApi>,
        cancel_token: CancellationToken,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(SESSION_CHANNEL_BUFFER);
        let room_name = config.room_name.clone();

        let local = Participant {
            identity: config.identity.clone(),
            name: config.display_name.clone(),
            microphone_enabled: config.join_intent.audio_enabled,
            camera_enabled: config.join_intent.video_enabled,
            speaking: false,
            metadata: config.metadata.clone(),
            is_local: true,
        };

        let actor = Self {
            config,
            backend,
            receiver,
            events,
            cancel_token: cancel_token.clone(),
            roster: Roster::new(local),
            chat: ChatLog::default(),
            bitrate: BitrateController::default(),
            metadata: MetadataWriter::new(meeting_api, RetrySchedule::default()),
            connected: false,
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = SessionHandle {
            sender,
            cancel_token,
            room_name,
        };

        (handle, task_handle)
    }

    /// Run the actor loop.
    #[instrument(skip_all, name = "session.actor", fields(room = %self.config.room_name))]
    async fn run(mut self) {
        info!(
            target: "session.actor",
            room = %self.config.room_name,
            identity = %self.config.identity,
            "Session started"
        );

        loop {
            tokio::select! {
                // Handle cancellation
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "session.actor",
                        room = %self.config.room_name,
                        "Session received cancellation signal"
                    );
                    self.shutdown().await;
                    break;
                }

                // Handle backend events
                event = self.events.recv() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => {
                            info!(
                                target: "session.actor",
                                room = %self.config.room_name,
                                "Backend event stream closed, exiting"
                            );
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                // Handle commands
                command = self.receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command).await,
                        None => {
                            info!(
                                target: "session.actor",
                                room = %self.config.room_name,
                                "Command channel closed, exiting"
                            );
                            self.shutdown().await;
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "session.actor",
            room = %self.config.room_name,
            participants = self.roster.len(),
            chat_messages = self.chat.len(),
            "Session stopped"
        );
    }

    /// Handle a single backend event.
    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => {
                self.connected = true;
                info!(
                    target: "session.actor",
                    room = %self.config.room_name,
                    "Session connected"
                );
                self.apply_bitrate().await;
                self.maybe_publish_metadata();
            }

            SessionEvent::ParticipantConnected(info) => {
                debug!(
                    target: "session.actor",
                    identity = %info.identity,
                    "Participant connected"
                );
                self.roster.upsert(info);
                self.apply_bitrate().await;
            }

            SessionEvent::ParticipantDisconnected { identity } => {
                if self.roster.remove(&identity).is_some() {
                    debug!(
                        target: "session.actor",
                        identity = %identity,
                        "Participant disconnected"
                    );
                    self.apply_bitrate().await;
                }
            }

            SessionEvent::DataReceived {
                sender_identity,
                sender_name,
                payload,
            } => {
                // Non-chat payloads and unparseable bytes are ignored
                if let Some(text) = chat::decode_chat(&payload) {
                    let name = sender_name.unwrap_or_else(|| sender_identity.clone());
                    self.chat.append_remote(&sender_identity, &name, &text);
                    observability::record_chat_message("received");
                }
            }

            SessionEvent::ActiveSpeakersChanged { identities } => {
                self.roster.set_speaking(&identities);
            }

            SessionEvent::TrackMuteChanged {
                identity,
                kind,
                enabled,
            } => {
                self.roster.set_track_enabled(&identity, kind, enabled);
            }

            SessionEvent::MetadataChanged { identity, metadata } => {
                self.roster.set_metadata(&identity, &metadata);
            }

            SessionEvent::Disconnected { reason } => {
                info!(
                    target: "session.actor",
                    room = %self.config.room_name,
                    %reason,
                    "Session disconnected by backend"
                );
                self.connected = false;
                self.cancel_token.cancel();
            }
        }
    }

    /// Handle a single command.
    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::SendChat { text, respond_to } => {
                let message = self.send_chat(text).await;
                let _ = respond_to.send(message);
            }

            SessionCommand::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }

            SessionCommand::SetMicrophoneEnabled { enabled } => {
                self.set_capture_enabled(DeviceKind::Microphone, enabled)
                    .await;
            }

            SessionCommand::SetCameraEnabled { enabled } => {
                self.set_capture_enabled(DeviceKind::Camera, enabled).await;
            }

            SessionCommand::SwitchDevice { kind, device_id } => {
                self.switch_device(kind, &device_id).await;
            }

            SessionCommand::SetMeetingName { name } => {
                self.set_meeting_name(name);
            }

            SessionCommand::Leave { respond_to } => {
                info!(
                    target: "session.actor",
                    room = %self.config.room_name,
                    "Leave requested"
                );
                self.cancel_token.cancel();
                let _ = respond_to.send(());
            }
        }
    }

    /// Append the message locally, then broadcast. The local append
    /// comes first so the sender sees their message even when the
    /// broadcast fails.
    async fn send_chat(&mut self, text: String) -> ChatMessage {
        let message =
            self.chat
                .append_local(&self.config.identity, &self.config.display_name, &text);
        observability::record_chat_message("sent");

        match chat::encode_chat(&text) {
            Ok(payload) => {
                if let Err(e) = self.backend.publish_data(payload).await {
                    warn!(
                        target: "session.chat",
                        error = %e,
                        "Chat broadcast failed, message kept locally"
                    );
                }
            }
            Err(e) => {
                warn!(
                    target: "session.chat",
                    error = %e,
                    "Chat encoding failed, message kept locally"
                );
            }
        }

        message
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            participants: self.roster.participants().to_vec(),
            chat: self.chat.messages().to_vec(),
            connected: self.connected,
            meeting_name: self.config.meeting_name.clone(),
        }
    }

    async fn apply_bitrate(&mut self) {
        let backend = Arc::clone(&self.backend);
        self.bitrate
            .update(self.roster.len(), backend.as_ref())
            .await;
    }

    /// Kick off the host's one-shot metadata write. No-op for guests
    /// and for meetings without a name.
    fn maybe_publish_metadata(&mut self) {
        if !self.config.is_host {
            return;
        }
        let Some(meeting_name) = self.config.meeting_name.clone() else {
            return;
        };
        self.metadata.publish_once(MetadataWrite {
            room_name: self.config.room_name.clone(),
            meeting_name,
            host_identity: self.config.identity.clone(),
        });
    }

    /// Change local capture state and mirror it onto the roster.
    /// Failures are logged; the roster keeps the last known state.
    async fn set_capture_enabled(&mut self, kind: DeviceKind, enabled: bool) {
        let result = match kind {
            DeviceKind::Microphone => self.backend.set_microphone_enabled(enabled).await,
            DeviceKind::Camera => self.backend.set_camera_enabled(enabled).await,
        };

        match result {
            Ok(()) => {
                let identity = self.config.identity.clone();
                self.roster.set_track_enabled(&identity, kind, enabled);
            }
            Err(e) => {
                warn!(
                    target: "session.devices",
                    ?kind,
                    enabled,
                    error = %e,
                    "Failed to change capture state"
                );
            }
        }
    }

    /// Switch the active device, enabling capture first if the user
    /// had it off. Switching implies they want the device live.
    async fn switch_device(&mut self, kind: DeviceKind, device_id: &str) {
        let enabled = self
            .roster
            .get(&self.config.identity)
            .is_some_and(|p| match kind {
                DeviceKind::Microphone => p.microphone_enabled,
                DeviceKind::Camera => p.camera_enabled,
            });
        if !enabled {
            self.set_capture_enabled(kind, true).await;
        }

        match self.backend.switch_active_device(kind, device_id).await {
            Ok(()) => {
                debug!(
                    target: "session.devices",
                    ?kind,
                    device_id,
                    "Switched active device"
                );
            }
            Err(e) => {
                warn!(
                    target: "session.devices",
                    ?kind,
                    device_id,
                    error = %e,
                    "Device switch failed, keeping current device"
                );
            }
        }
    }

    /// Update the meeting name. Hosts republish the room metadata,
    /// bypassing the one-shot flag; anyone else only sees the local
    /// change.
    fn set_meeting_name(&mut self, name: String) {
        self.config.meeting_name = Some(name.clone());
        if self.config.is_host {
            self.metadata.republish(MetadataWrite {
                room_name: self.config.room_name.clone(),
                meeting_name: name,
                host_identity: self.config.identity.clone(),
            });
        } else {
            debug!(
                target: "session.metadata",
                "Meeting renamed locally by non-host, not publishing"
            );
        }
    }

    /// Disconnect the backend, releasing devices and listeners.
    async fn shutdown(&mut self) {
        info!(
            target: "session.actor",
            room = %self.config.room_name,
            "Disconnecting from media backend"
        );
        self.backend.disconnect().await;
        self.connected = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use super::*;
    use crate::backend::BackendError;
    use crate::events::ParticipantInfo;
    use crate::metadata_writer::MeetingApiError;
    use crate::prejoin::JoinIntent;
    use common::metadata::ParticipantMetadata;

    /// Records every backend call in order; optionally fails
    /// `publish_data`.
    #[derive(Default)]
    struct RecordingBackend {
        ops: Mutex<Vec<String>>,
        payloads: Mutex<Vec<Vec<u8>>>,
        fail_publish: AtomicBool,
    }

    impl RecordingBackend {
        fn ops(&self) -> Vec<String> {
            self.ops.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MediaBackend for RecordingBackend {
        async fn publish_data(&self, payload: Vec<u8>) -> Result<(), BackendError> {
            self.ops.lock().unwrap().push("publish".to_string());
            self.payloads.lock().unwrap().push(payload);
            if self.fail_publish.load(Ordering::SeqCst) {
                return Err(BackendError::Unavailable("data channel down".to_string()));
            }
            Ok(())
        }

        async fn set_video_max_bitrate(&self, bits_per_second: u64) -> Result<(), BackendError> {
            self.ops
                .lock()
                .unwrap()
                .push(format!("bitrate:{bits_per_second}"));
            Ok(())
        }

        async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), BackendError> {
            self.ops.lock().unwrap().push(format!("mic:{enabled}"));
            Ok(())
        }

        async fn set_camera_enabled(&self, enabled: bool) -> Result<(), BackendError> {
            self.ops.lock().unwrap().push(format!("camera:{enabled}"));
            Ok(())
        }

        async fn switch_active_device(
            &self,
            kind: DeviceKind,
            device_id: &str,
        ) -> Result<(), BackendError> {
            self.ops
                .lock()
                .unwrap()
                .push(format!("switch:{kind:?}:{device_id}"));
            Ok(())
        }

        async fn disconnect(&self) {
            self.ops.lock().unwrap().push("disconnect".to_string());
        }
    }

    #[derive(Default)]
    struct CountingApi {
        names: Mutex<Vec<String>>,
    }

    impl CountingApi {
        fn calls(&self) -> usize {
            self.names.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MeetingApi for CountingApi {
        async fn update_meeting(
            &self,
            _room_name: &str,
            meeting_name: &str,
            _host_identity: &str,
        ) -> Result<(), MeetingApiError> {
            self.names.lock().unwrap().push(meeting_name.to_string());
            Ok(())
        }
    }

    fn config(is_host: bool) -> SessionConfig {
        SessionConfig {
            room_name: "happy-blue-falcon".to_string(),
            meeting_name: Some("Weekly Sync".to_string()),
            identity: "alice".to_string(),
            display_name: "Alice".to_string(),
            is_host,
            metadata: ParticipantMetadata {
                accent_color: Some("#3B82F6".to_string()),
                is_host,
            },
            join_intent: JoinIntent::default(),
        }
    }

    fn remote(identity: &str) -> ParticipantInfo {
        ParticipantInfo {
            identity: identity.to_string(),
            name: Some(identity.to_uppercase()),
            metadata: None,
            microphone_enabled: true,
            camera_enabled: true,
        }
    }

    struct Harness {
        handle: SessionHandle,
        events: mpsc::Sender<SessionEvent>,
        backend: Arc<RecordingBackend>,
        api: Arc<CountingApi>,
        task: JoinHandle<()>,
    }

    fn spawn_session(config: SessionConfig) -> Harness {
        let backend = Arc::new(RecordingBackend::default());
        let api = Arc::new(CountingApi::default());
        let (event_tx, event_rx) = mpsc::channel(64);
        let (handle, task) = SessionActor::spawn(
            config,
            Arc::clone(&backend) as Arc<dyn MediaBackend>,
            event_rx,
            Arc::clone(&api) as Arc<dyn MeetingApi>,
            CancellationToken::new(),
        );
        Harness {
            handle,
            events: event_tx,
            backend,
            api,
            task,
        }
    }

    #[tokio::test]
    async fn test_snapshot_starts_with_local_participant() {
        let h = spawn_session(config(true));

        let snapshot = h.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.participants.len(), 1);
        let local = snapshot.participants.first().unwrap();
        assert_eq!(local.identity, "alice");
        assert!(local.is_local);
        assert!(local.is_host());
        assert!(!snapshot.connected);
        assert_eq!(snapshot.meeting_name.as_deref(), Some("Weekly Sync"));

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_local_capture_flags_follow_join_intent() {
        let mut cfg = config(false);
        cfg.join_intent.video_enabled = false;
        let h = spawn_session(cfg);

        let snapshot = h.handle.snapshot().await.unwrap();
        let local = snapshot.participants.first().unwrap();
        assert!(local.microphone_enabled);
        assert!(!local.camera_enabled);

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_bitrate_follows_roster_size() {
        let h = spawn_session(config(false));

        h.events.send(SessionEvent::Connected).await.unwrap();
        h.events
            .send(SessionEvent::ParticipantConnected(remote("bob")))
            .await
            .unwrap();
        h.events
            .send(SessionEvent::ParticipantConnected(remote("carol")))
            .await
            .unwrap();
        h.events
            .send(SessionEvent::ParticipantDisconnected {
                identity: "carol".to_string(),
            })
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;

        let bitrates: Vec<String> = h
            .backend
            .ops()
            .into_iter()
            .filter(|op| op.starts_with("bitrate:"))
            .collect();
        assert_eq!(
            bitrates,
            vec!["bitrate:4000000", "bitrate:2500000", "bitrate:4000000"]
        );

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_disconnect_does_not_push_bitrate() {
        let h = spawn_session(config(false));

        h.events.send(SessionEvent::Connected).await.unwrap();
        h.events
            .send(SessionEvent::ParticipantDisconnected {
                identity: "nobody".to_string(),
            })
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;

        let pushes = h
            .backend
            .ops()
            .into_iter()
            .filter(|op| op.starts_with("bitrate:"))
            .count();
        assert_eq!(pushes, 1);

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_chat_broadcasts_envelope() {
        let h = spawn_session(config(false));

        let message = h.handle.send_chat("hello".to_string()).await.unwrap();
        assert_eq!(message.message, "hello");
        assert_eq!(message.sender_identity, "alice");

        let payloads = h.backend.payloads.lock().unwrap().clone();
        let value: serde_json::Value =
            serde_json::from_slice(payloads.first().unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"type": "chat", "message": "hello"}));

        let snapshot = h.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.chat.len(), 1);

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_chat_keeps_local_echo_on_broadcast_failure() {
        let h = spawn_session(config(false));
        h.backend.fail_publish.store(true, Ordering::SeqCst);

        let message = h.handle.send_chat("still here".to_string()).await.unwrap();
        assert_eq!(message.message, "still here");

        let snapshot = h.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.chat.len(), 1);
        assert_eq!(
            snapshot.chat.first().unwrap().message,
            "still here"
        );

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_received_chat_is_appended_with_sender() {
        let h = spawn_session(config(false));

        h.events
            .send(SessionEvent::DataReceived {
                sender_identity: "bob".to_string(),
                sender_name: Some("Bob".to_string()),
                payload: br#"{"type":"chat","message":"hi alice"}"#.to_vec(),
            })
            .await
            .unwrap();
        // Unknown payload types are dropped silently
        h.events
            .send(SessionEvent::DataReceived {
                sender_identity: "bob".to_string(),
                sender_name: Some("Bob".to_string()),
                payload: br#"{"type":"reaction","message":"wave"}"#.to_vec(),
            })
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;

        let snapshot = h.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.chat.len(), 1);
        let entry = snapshot.chat.first().unwrap();
        assert_eq!(entry.sender_identity, "bob");
        assert_eq!(entry.sender, "Bob");
        assert_eq!(entry.message, "hi alice");

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_publishes_metadata_once() {
        let h = spawn_session(config(true));

        h.events.send(SessionEvent::Connected).await.unwrap();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(h.api.calls(), 1);

        // A second connected event must not publish again
        h.events.send(SessionEvent::Connected).await.unwrap();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(h.api.calls(), 1);

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_guest_never_publishes_metadata() {
        let h = spawn_session(config(false));

        h.events.send(SessionEvent::Connected).await.unwrap();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(h.api.calls(), 0);

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unnamed_meeting_publishes_nothing() {
        let mut cfg = config(true);
        cfg.meeting_name = None;
        let h = spawn_session(cfg);

        h.events.send(SessionEvent::Connected).await.unwrap();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(h.api.calls(), 0);

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_rename_republishes() {
        let h = spawn_session(config(true));

        h.events.send(SessionEvent::Connected).await.unwrap();
        sleep(Duration::from_secs(10)).await;

        h.handle
            .set_meeting_name("Renamed Sync".to_string())
            .await
            .unwrap();
        sleep(Duration::from_secs(10)).await;

        let names = h.api.names.lock().unwrap().clone();
        assert_eq!(names, vec!["Weekly Sync", "Renamed Sync"]);

        let snapshot = h.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.meeting_name.as_deref(), Some("Renamed Sync"));

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_guest_rename_stays_local() {
        let h = spawn_session(config(false));

        h.handle
            .set_meeting_name("My Own Name".to_string())
            .await
            .unwrap();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(h.api.calls(), 0);

        let snapshot = h.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.meeting_name.as_deref(), Some("My Own Name"));

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_mute_commands_update_local_roster() {
        let h = spawn_session(config(false));

        h.handle.set_microphone_enabled(false).await.unwrap();
        h.handle.set_camera_enabled(false).await.unwrap();
        sleep(Duration::from_millis(10)).await;

        let snapshot = h.handle.snapshot().await.unwrap();
        let local = snapshot.participants.first().unwrap();
        assert!(!local.microphone_enabled);
        assert!(!local.camera_enabled);
        assert!(h.backend.ops().contains(&"mic:false".to_string()));
        assert!(h.backend.ops().contains(&"camera:false".to_string()));

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_switch_enables_capture_first_when_disabled() {
        let mut cfg = config(false);
        cfg.join_intent.video_enabled = false;
        let h = spawn_session(cfg);

        h.handle
            .switch_device(DeviceKind::Camera, "cam-2".to_string())
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(
            h.backend.ops(),
            vec!["camera:true".to_string(), "switch:Camera:cam-2".to_string()]
        );

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_switch_skips_enable_when_already_live() {
        let h = spawn_session(config(false));

        h.handle
            .switch_device(DeviceKind::Microphone, "mic-2".to_string())
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(
            h.backend.ops(),
            vec!["switch:Microphone:mic-2".to_string()]
        );

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_speaker_and_mute_events_update_snapshot() {
        let h = spawn_session(config(false));

        h.events
            .send(SessionEvent::ParticipantConnected(remote("bob")))
            .await
            .unwrap();
        h.events
            .send(SessionEvent::ActiveSpeakersChanged {
                identities: vec!["bob".to_string()],
            })
            .await
            .unwrap();
        h.events
            .send(SessionEvent::TrackMuteChanged {
                identity: "bob".to_string(),
                kind: DeviceKind::Microphone,
                enabled: false,
            })
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;

        let snapshot = h.handle.snapshot().await.unwrap();
        let bob = snapshot
            .participants
            .iter()
            .find(|p| p.identity == "bob")
            .unwrap();
        assert!(bob.speaking);
        assert!(!bob.microphone_enabled);

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_metadata_event_updates_roster() {
        let h = spawn_session(config(false));

        h.events
            .send(SessionEvent::ParticipantConnected(remote("bob")))
            .await
            .unwrap();
        h.events
            .send(SessionEvent::MetadataChanged {
                identity: "bob".to_string(),
                metadata: r#"{"isHost":true}"#.to_string(),
            })
            .await
            .unwrap();
        sleep(Duration::from_millis(10)).await;

        let snapshot = h.handle.snapshot().await.unwrap();
        let bob = snapshot
            .participants
            .iter()
            .find(|p| p.identity == "bob")
            .unwrap();
        assert!(bob.is_host());

        h.handle.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test]
    async fn test_leave_disconnects_backend() {
        let h = spawn_session(config(false));

        h.handle.leave().await.unwrap();
        h.task.await.unwrap();

        assert!(h.handle.is_cancelled());
        assert!(h.backend.ops().contains(&"disconnect".to_string()));
    }

    #[tokio::test]
    async fn test_cancel_disconnects_backend() {
        let h = spawn_session(config(false));

        h.handle.cancel();
        h.task.await.unwrap();

        assert!(h.backend.ops().contains(&"disconnect".to_string()));
    }

    #[tokio::test]
    async fn test_backend_disconnect_event_ends_session() {
        let h = spawn_session(config(false));

        h.events
            .send(SessionEvent::Disconnected {
                reason: "server closed the room".to_string(),
            })
            .await
            .unwrap();
        h.task.await.unwrap();

        assert!(h.handle.is_cancelled());
        assert!(h.backend.ops().contains(&"disconnect".to_string()));
    }

    #[tokio::test]
    async fn test_event_stream_close_ends_session() {
        let h = spawn_session(config(false));

        drop(h.events);
        h.task.await.unwrap();

        assert!(h.backend.ops().contains(&"disconnect".to_string()));
    }
}
