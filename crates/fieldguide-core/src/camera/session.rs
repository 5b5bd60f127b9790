//! Capture session manager: one controller task, one device worker task.
//!
//! The controller is the only place `SessionState` changes. It processes
//! caller commands and device completions one at a time, and publishes a
//! [`SessionSnapshot`] through a `watch` channel so observers never see a
//! half-applied transition. The device worker runs provider calls serially,
//! which keeps binding from ever running concurrently against the device.
//!
//! Every device job carries the session generation it was issued for. A
//! teardown bumps the generation, so completions that arrive afterwards are
//! dropped instead of resolving a caller that has moved on.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::timeout;

use crate::config::CameraConfig;
use crate::error::{CaptureError, SessionError};
use crate::source::{ImageReference, ImageSourceRouter};

use super::device::{CameraProvider, DeviceInfo, SurfaceTarget, UseCase};
use super::zoom::ZoomState;
use super::{SessionEvent, SessionState};

/// Max queued caller commands.
const COMMAND_BUFFER: usize = 16;

/// Returned by a successful `activate`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHandle {
    /// Binding generation this handle belongs to
    pub generation: u64,
    /// The bound device
    pub device: DeviceInfo,
}

/// Consistent view of the session, published after every transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub zoom_ratio: f32,
    pub capture_pending: bool,
}

type ActivateReply = oneshot::Sender<Result<SessionHandle, SessionError>>;
type CaptureReply = oneshot::Sender<Result<ImageReference, CaptureError>>;

enum Command {
    Activate {
        surface: SurfaceTarget,
        reply: ActivateReply,
    },
    Capture {
        destination: PathBuf,
        reply: CaptureReply,
    },
    SetZoom {
        delta: f32,
        reply: oneshot::Sender<f32>,
    },
    ZoomTo {
        ratio: f32,
        reply: oneshot::Sender<f32>,
    },
    Deactivate {
        reply: oneshot::Sender<()>,
    },
}

enum DeviceJob {
    Bind {
        generation: u64,
        surface: SurfaceTarget,
    },
    Capture {
        generation: u64,
        destination: PathBuf,
    },
    Zoom(f32),
    Unbind {
        done: Option<oneshot::Sender<()>>,
    },
}

enum Completion {
    Bound {
        generation: u64,
        result: Result<DeviceInfo, SessionError>,
    },
    Captured {
        generation: u64,
        destination: PathBuf,
        result: Result<(), CaptureError>,
    },
}

/// Owns the camera for one screen visit.
///
/// Create on screen entry, call [`deactivate`](Self::deactivate) on exit.
/// Dropping the manager also tears the session down. Must be created inside
/// a Tokio runtime.
pub struct CaptureSessionManager {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl CaptureSessionManager {
    /// Spawn the controller and device worker for `provider`.
    pub fn new(provider: Arc<dyn CameraProvider>, config: &CameraConfig) -> Self {
        let zoom = ZoomState::new(config.min_zoom, config.max_zoom);
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot {
            state: SessionState::Idle,
            zoom_ratio: zoom.ratio(),
            capture_pending: false,
        });

        let worker = DeviceWorker {
            provider,
            acquire_timeout_ms: config.acquire_timeout_ms,
            capture_timeout_ms: config.capture_timeout_ms,
            completions: completions_tx,
        };
        tokio::spawn(worker.run(jobs_rx));

        let controller = Controller {
            state: SessionState::Idle,
            generation: 0,
            zoom,
            device_claimed: false,
            pending_activate: None,
            pending_capture: None,
            jobs: jobs_tx,
            snapshot: snapshot_tx,
        };
        tokio::spawn(controller.run(commands_rx, completions_rx));

        Self {
            commands: commands_tx,
            snapshot: snapshot_rx,
        }
    }

    /// Acquire the device and bind preview + still capture to it.
    ///
    /// Any previous binding is released first. Rejected with
    /// `ActivationInProgress` while another activation is pending.
    pub async fn activate(&self, surface: SurfaceTarget) -> Result<SessionHandle, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Activate { surface, reply })
            .await
            .map_err(|_| SessionError::TornDown)?;
        rx.await.unwrap_or(Err(SessionError::TornDown))
    }

    /// Take a photo and write it to `destination`.
    ///
    /// Fails with `NotReady` unless the session is `Bound`, and with
    /// `DeviceBusy` while another capture is pending. Resolves only after the
    /// file has been written.
    pub async fn capture(
        &self,
        destination: impl Into<PathBuf>,
    ) -> Result<ImageReference, CaptureError> {
        let (reply, rx) = oneshot::channel();
        let command = Command::Capture {
            destination: destination.into(),
            reply,
        };
        self.commands
            .send(command)
            .await
            .map_err(|_| CaptureError::SessionTornDown)?;
        rx.await.unwrap_or(Err(CaptureError::SessionTornDown))
    }

    /// Apply a pinch delta. Returns the clamped zoom ratio.
    pub async fn set_zoom(&self, delta: f32) -> f32 {
        let (reply, rx) = oneshot::channel();
        self.zoom_command(Command::SetZoom { delta, reply }, rx).await
    }

    /// Set an absolute zoom ratio. Returns the clamped zoom ratio.
    pub async fn zoom_to(&self, ratio: f32) -> f32 {
        let (reply, rx) = oneshot::channel();
        self.zoom_command(Command::ZoomTo { ratio, reply }, rx).await
    }

    async fn zoom_command(&self, command: Command, rx: oneshot::Receiver<f32>) -> f32 {
        if self.commands.send(command).await.is_err() {
            return self.snapshot().zoom_ratio;
        }
        rx.await.unwrap_or_else(|_| self.snapshot().zoom_ratio)
    }

    /// Unbind everything and return to `Idle`. Idempotent.
    ///
    /// A pending capture fails with `SessionTornDown`; returns once the device
    /// has been released.
    pub async fn deactivate(&self) {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(Command::Deactivate { reply }).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.snapshot.borrow().state
    }

    /// Current zoom ratio.
    pub fn zoom_ratio(&self) -> f32 {
        self.snapshot.borrow().zoom_ratio
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        *self.snapshot.borrow()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }
}

struct Controller {
    state: SessionState,
    generation: u64,
    zoom: ZoomState,
    /// A bind job was issued and not yet followed by an unbind job.
    device_claimed: bool,
    pending_activate: Option<ActivateReply>,
    pending_capture: Option<CaptureReply>,
    jobs: mpsc::UnboundedSender<DeviceJob>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl Controller {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(completion) = completions.recv() => self.on_completion(completion),
            }
        }

        tracing::debug!("Camera session dropped, tearing down");
        self.teardown(None);
    }

    fn zoom_changed(&mut self, ratio: f32, reply: oneshot::Sender<f32>) {
        if self.state == SessionState::Bound {
            self.send_job(DeviceJob::Zoom(ratio));
        }
        self.publish();
        let _ = reply.send(ratio);
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Activate { surface, reply } => self.activate(surface, reply),
            Command::Capture { destination, reply } => self.capture(destination, reply),
            Command::SetZoom { delta, reply } => {
                let ratio = self.zoom.apply(delta);
                self.zoom_changed(ratio, reply);
            }
            Command::ZoomTo { ratio, reply } => {
                let ratio = self.zoom.set(ratio);
                self.zoom_changed(ratio, reply);
            }
            Command::Deactivate { reply } => self.teardown(Some(reply)),
        }
    }

    fn activate(&mut self, surface: SurfaceTarget, reply: ActivateReply) {
        let next = match self.state.transition(SessionEvent::Activate) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!("Rejected camera activation: {}", e);
                let _ = reply.send(Err(e));
                return;
            }
        };

        // Rebinding tears down the still-capture stream under a pending shot.
        self.fail_pending_capture();
        self.generation += 1;
        self.state = next;
        self.pending_activate = Some(reply);
        self.device_claimed = true;
        tracing::info!(
            "Activating camera (generation {}, surface {:?})",
            self.generation,
            surface.id
        );
        self.send_job(DeviceJob::Bind {
            generation: self.generation,
            surface,
        });
        self.publish();
    }

    fn capture(&mut self, destination: PathBuf, reply: CaptureReply) {
        if let Err(e) = self.state.check_capture(self.pending_capture.is_some()) {
            tracing::debug!("Rejected capture in {:?}: {}", self.state, e);
            let _ = reply.send(Err(e));
            return;
        }

        tracing::debug!("Capturing to {:?}", destination);
        self.pending_capture = Some(reply);
        self.send_job(DeviceJob::Capture {
            generation: self.generation,
            destination,
        });
        self.publish();
    }

    fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Bound { generation, result } => {
                if generation != self.generation {
                    tracing::debug!("Dropping stale bind result (generation {})", generation);
                    return;
                }
                let event = if result.is_ok() {
                    SessionEvent::BindSucceeded
                } else {
                    SessionEvent::BindFailed
                };
                // Stale events leave the state as-is, never an error.
                self.state = self.state.transition(event).unwrap_or(self.state);

                let reply = match result {
                    Ok(device) => {
                        tracing::info!(
                            "Camera bound: {} (zoom {}..{})",
                            device.name,
                            device.min_zoom,
                            device.max_zoom
                        );
                        self.zoom.set_range(device.min_zoom, device.max_zoom);
                        self.send_job(DeviceJob::Zoom(self.zoom.ratio()));
                        Ok(SessionHandle { generation, device })
                    }
                    Err(e) => {
                        tracing::error!("Camera activation failed: {}", e);
                        Err(e)
                    }
                };
                if let Some(pending) = self.pending_activate.take() {
                    let _ = pending.send(reply);
                }
                self.publish();
            }
            Completion::Captured {
                generation,
                destination,
                result,
            } => {
                if generation != self.generation {
                    tracing::debug!("Dropping stale capture result for {:?}", destination);
                    return;
                }
                let Some(pending) = self.pending_capture.take() else {
                    return;
                };
                let result = result.map(|()| ImageSourceRouter::from_capture(destination));
                match &result {
                    Ok(image) => tracing::info!("Photo saved to {}", image),
                    Err(e) => {
                        tracing::error!("Photo capture failed: {}", e);
                        self.state = self
                            .state
                            .transition(SessionEvent::CaptureFailed)
                            .unwrap_or(self.state);
                    }
                }
                let _ = pending.send(result);
                self.publish();
            }
        }
    }

    /// Unbind, return to `Idle` and fail whatever is still pending.
    fn teardown(&mut self, reply: Option<oneshot::Sender<()>>) {
        if let Some(pending) = self.pending_activate.take() {
            let _ = pending.send(Err(SessionError::TornDown));
        }
        self.fail_pending_capture();
        self.generation += 1;
        self.state = self
            .state
            .transition(SessionEvent::Deactivate)
            .unwrap_or(SessionState::Idle);
        self.publish();

        if self.device_claimed {
            tracing::info!("Deactivating camera");
            self.device_claimed = false;
            self.send_job(DeviceJob::Unbind { done: reply });
        } else if let Some(reply) = reply {
            let _ = reply.send(());
        }
    }

    fn fail_pending_capture(&mut self) {
        if let Some(pending) = self.pending_capture.take() {
            tracing::warn!("Pending capture cancelled by session teardown");
            let _ = pending.send(Err(CaptureError::SessionTornDown));
        }
    }

    fn send_job(&self, job: DeviceJob) {
        if self.jobs.send(job).is_err() {
            tracing::error!("Camera device worker is gone");
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(SessionSnapshot {
            state: self.state,
            zoom_ratio: self.zoom.ratio(),
            capture_pending: self.pending_capture.is_some(),
        });
    }
}

/// Serial executor for provider calls.
struct DeviceWorker {
    provider: Arc<dyn CameraProvider>,
    acquire_timeout_ms: u64,
    capture_timeout_ms: u64,
    completions: mpsc::UnboundedSender<Completion>,
}

impl DeviceWorker {
    async fn run(self, mut jobs: mpsc::UnboundedReceiver<DeviceJob>) {
        while let Some(job) = jobs.recv().await {
            match job {
                DeviceJob::Bind {
                    generation,
                    surface,
                } => {
                    let result = match timeout(
                        Duration::from_millis(self.acquire_timeout_ms),
                        self.bind(&surface),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(SessionError::Timeout {
                            timeout_ms: self.acquire_timeout_ms,
                        }),
                    };
                    let _ = self.completions.send(Completion::Bound { generation, result });
                }
                DeviceJob::Capture {
                    generation,
                    destination,
                } => self.capture(generation, destination).await,
                DeviceJob::Zoom(ratio) => self.provider.set_zoom_ratio(ratio),
                DeviceJob::Unbind { done } => {
                    self.provider.unbind_all().await;
                    if let Some(done) = done {
                        let _ = done.send(());
                    }
                }
            }
        }
        tracing::debug!("Camera device worker for {} stopped", self.provider.name());
    }

    /// Take one photo, reporting a timeout as soon as it expires.
    ///
    /// The write itself cannot be cancelled, so after a timeout the worker
    /// still waits for it (no other job touches the device meanwhile) and
    /// removes the photo it produced late.
    async fn capture(&self, generation: u64, destination: PathBuf) {
        let provider = Arc::clone(&self.provider);
        let target = destination.clone();
        let mut write = tokio::spawn(async move { provider.take_picture(&target).await });

        let limit = Duration::from_millis(self.capture_timeout_ms);
        let (result, timed_out) = match timeout(limit, &mut write).await {
            Ok(joined) => (joined.unwrap_or_else(|e| Err(join_failure(&destination, e))), false),
            Err(_) => (
                Err(CaptureError::Timeout {
                    path: destination.clone(),
                    timeout_ms: self.capture_timeout_ms,
                }),
                true,
            ),
        };
        let _ = self.completions.send(Completion::Captured {
            generation,
            destination: destination.clone(),
            result,
        });

        if timed_out {
            tracing::debug!("Waiting for timed-out capture to {:?} to finish", destination);
            if let Ok(Ok(())) = write.await {
                tracing::warn!("Discarding photo written after timeout: {:?}", destination);
                if let Err(e) = std::fs::remove_file(&destination) {
                    tracing::warn!("Could not remove {:?}: {}", destination, e);
                }
            }
        }
    }

    /// Always release the previous binding before claiming the device again.
    async fn bind(&self, surface: &SurfaceTarget) -> Result<DeviceInfo, SessionError> {
        self.provider.unbind_all().await;
        let device = self.provider.acquire().await?;
        self.provider
            .bind(surface, &[UseCase::Preview, UseCase::StillCapture])
            .await?;
        Ok(device)
    }
}

fn join_failure(destination: &std::path::Path, e: tokio::task::JoinError) -> CaptureError {
    CaptureError::Failed {
        path: destination.to_path_buf(),
        message: format!("Task join error: {}", e),
    }
}
