//! Frame host capability and the terminal-backed local host.

use crate::config::HostConfig;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    io,
    process::{Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver, Sender},
    thread::JoinHandle,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    // LocalHost always accepts; remote hosts report these.
    #[error("{0}")]
    #[cfg_attr(not(test), allow(dead_code))]
    RejectedByUser(String),

    #[error("{0}")]
    #[cfg_attr(not(test), allow(dead_code))]
    InvalidDomainManifest(String),

    #[error("failed to open {url}: {source}")]
    OpenUrl { url: String, source: io::Error },
}

/// Insets the host client reserves around the frame, in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeAreaInsets {
    #[serde(default)]
    pub top: u16,
    #[serde(default)]
    pub bottom: u16,
    #[serde(default)]
    pub left: u16,
    #[serde(default)]
    pub right: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContext {
    pub fid: u64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    pub added: bool,
    pub safe_area_insets: SafeAreaInsets,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameContext {
    pub user: UserContext,
    pub client: ClientContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDetails {
    pub url: String,
    pub token: String,
}

/// Lifecycle notifications delivered on the host's event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    FrameAdded {
        notification_details: Option<NotificationDetails>,
    },
    #[cfg_attr(not(test), allow(dead_code))]
    FrameAddRejected {
        reason: String,
    },
    FrameRemoved,
    NotificationsEnabled {
        notification_details: NotificationDetails,
    },
    NotificationsDisabled,
    PrimaryButtonClicked,
}

/// Capabilities a frame host provides to the frame.
pub trait FrameHost {
    /// Context for the current user and client, if the host has one.
    fn context(&self) -> Option<FrameContext>;

    /// Ask the client to add this frame.
    fn add_frame(&self) -> Result<(), HostError>;

    fn open_url(&self, url: &str) -> Result<(), HostError>;

    /// Signal that the frame finished loading.
    fn ready(&self);

    /// New receiver for lifecycle events.
    fn subscribe(&self) -> Receiver<FrameEvent>;
}

type Opener = Box<dyn Fn(&str) -> io::Result<()> + Send + Sync>;

#[derive(Debug, Default)]
struct LocalState {
    added: bool,
    notifications_enabled: bool,
}

/// Host that runs inside the terminal. Identity comes from configuration and
/// host-side user actions are driven by key presses.
pub struct LocalHost {
    fid: u64,
    username: Option<String>,
    safe_area: SafeAreaInsets,
    state: Mutex<LocalState>,
    subscribers: Mutex<Vec<Sender<FrameEvent>>>,
    opener: Opener,
}

impl LocalHost {
    pub fn new(config: &HostConfig) -> Self {
        Self::with_opener(config, Box::new(open_with_system))
    }

    pub fn with_opener(config: &HostConfig, opener: Opener) -> Self {
        Self {
            fid: config.fid.unwrap_or(0),
            username: config.username.clone(),
            safe_area: config.safe_area,
            state: Mutex::new(LocalState {
                added: config.added,
                ..LocalState::default()
            }),
            subscribers: Mutex::new(Vec::new()),
            opener,
        }
    }

    fn emit(&self, event: FrameEvent) {
        log::debug!("Host event: {:?}", event);
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn notification_details(&self) -> NotificationDetails {
        NotificationDetails {
            url: "local://notifications".to_string(),
            token: format!("local-{}", self.fid),
        }
    }

    pub fn press_primary_button(&self) {
        self.emit(FrameEvent::PrimaryButtonClicked);
    }

    /// Flip notifications for an added frame. Ignored when not added.
    pub fn toggle_notifications(&self) {
        let enabled = {
            let mut state = self.state.lock();
            if !state.added {
                log::info!("Notifications unavailable: frame not added");
                return;
            }
            state.notifications_enabled = !state.notifications_enabled;
            state.notifications_enabled
        };
        if enabled {
            self.emit(FrameEvent::NotificationsEnabled {
                notification_details: self.notification_details(),
            });
        } else {
            self.emit(FrameEvent::NotificationsDisabled);
        }
    }

    pub fn remove_frame(&self) {
        {
            let mut state = self.state.lock();
            if !state.added {
                return;
            }
            state.added = false;
            state.notifications_enabled = false;
        }
        self.emit(FrameEvent::FrameRemoved);
    }
}

impl FrameHost for LocalHost {
    fn context(&self) -> Option<FrameContext> {
        Some(FrameContext {
            user: UserContext {
                fid: self.fid,
                username: self.username.clone(),
            },
            client: ClientContext {
                added: self.state.lock().added,
                safe_area_insets: self.safe_area,
            },
        })
    }

    fn add_frame(&self) -> Result<(), HostError> {
        let details = {
            let mut state = self.state.lock();
            if state.added {
                return Ok(());
            }
            state.added = true;
            state.notifications_enabled = true;
            self.notification_details()
        };
        self.emit(FrameEvent::FrameAdded {
            notification_details: Some(details),
        });
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), HostError> {
        log::info!("Opening {}", url);
        (self.opener)(url).map_err(|source| HostError::OpenUrl {
            url: url.to_string(),
            source,
        })
    }

    fn ready(&self) {
        log::info!("Frame ready");
    }

    fn subscribe(&self) -> Receiver<FrameEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        rx
    }
}

/// Hand the URL to the platform opener without waiting for it.
fn open_with_system(url: &str) -> io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut cmd = Command::new("open");
    #[cfg(target_os = "windows")]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut cmd = Command::new("xdg-open");

    cmd.arg(url);
    spawn_reaped(cmd).map(|_| ())
}

/// Spawn `cmd` and wait for it on a short-lived thread so the child is
/// always collected without blocking the UI loop.
fn spawn_reaped(mut cmd: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(std::thread::spawn(move || {
        let status = child.wait();
        if let Err(e) = &status {
            log::warn!("Failed to reap opener: {}", e);
        }
        status
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn host(added: bool) -> (LocalHost, Arc<Mutex<Vec<String>>>) {
        let opened = Arc::new(Mutex::new(Vec::new()));
        let sink = opened.clone();
        let config = HostConfig {
            fid: Some(977233),
            username: Some("acorns".to_string()),
            added,
            safe_area: SafeAreaInsets {
                top: 1,
                ..SafeAreaInsets::default()
            },
        };
        let host = LocalHost::with_opener(
            &config,
            Box::new(move |url| {
                sink.lock().push(url.to_string());
                Ok(())
            }),
        );
        (host, opened)
    }

    #[test]
    fn test_context_reflects_config() {
        let (host, _) = host(false);
        let ctx = host.context().unwrap();
        assert_eq!(ctx.user.fid, 977233);
        assert_eq!(ctx.user.username.as_deref(), Some("acorns"));
        assert!(!ctx.client.added);
        assert_eq!(ctx.client.safe_area_insets.top, 1);
    }

    #[test]
    fn test_add_frame_emits_once() {
        let (host, _) = host(false);
        let rx = host.subscribe();
        host.add_frame().unwrap();
        host.add_frame().unwrap();
        assert!(matches!(rx.try_recv(), Ok(FrameEvent::FrameAdded { .. })));
        assert!(rx.try_recv().is_err());
        assert!(host.context().unwrap().client.added);
    }

    #[test]
    fn test_notifications_require_added_frame() {
        let (host, _) = host(false);
        let rx = host.subscribe();
        host.toggle_notifications();
        assert!(rx.try_recv().is_err());

        let (host, _) = self::host(true);
        let rx = host.subscribe();
        host.toggle_notifications();
        host.toggle_notifications();
        assert!(matches!(
            rx.try_recv(),
            Ok(FrameEvent::NotificationsEnabled { .. })
        ));
        assert_eq!(rx.try_recv(), Ok(FrameEvent::NotificationsDisabled));
    }

    #[test]
    fn test_remove_frame() {
        let (host, _) = host(true);
        let rx = host.subscribe();
        host.remove_frame();
        host.remove_frame();
        assert_eq!(rx.try_recv(), Ok(FrameEvent::FrameRemoved));
        assert!(rx.try_recv().is_err());
        assert!(!host.context().unwrap().client.added);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let (host, _) = host(true);
        let rx = host.subscribe();
        drop(rx);
        host.press_primary_button();
        assert!(host.subscribers.lock().is_empty());
    }

    #[test]
    fn test_open_url_uses_opener() {
        let (host, opened) = host(true);
        host.open_url("https://warpcast.com/acorns").unwrap();
        assert_eq!(opened.lock().as_slice(), ["https://warpcast.com/acorns"]);
    }

    #[test]
    fn test_open_url_failure() {
        let host = LocalHost::with_opener(
            &HostConfig::default(),
            Box::new(|_| Err(io::Error::new(io::ErrorKind::NotFound, "no opener"))),
        );
        assert!(matches!(
            host.open_url("https://example.test"),
            Err(HostError::OpenUrl { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawned_opener_is_waited_on() {
        let handle = spawn_reaped(Command::new("true")).unwrap();
        let status = handle.join().unwrap().unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_spawn_missing_opener_errors() {
        let result = spawn_reaped(Command::new("acorn-tracker-no-such-opener"));
        assert!(result.is_err());
    }
}
