//! Frame lifecycle against an injected host: context, add-frame prompt,
//! lifecycle events and the two link-out actions.

use crate::host::{FrameContext, FrameEvent, FrameHost, HostError, SafeAreaInsets};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

pub struct FrameSession {
    host: Arc<dyn FrameHost>,
    api_url: String,
    profile_base_url: String,
    context: Option<FrameContext>,
    events: Option<Receiver<FrameEvent>>,
    added: bool,
    loaded: bool,
    /// Outcome of the last add/open action, shown under the card.
    status: Option<String>,
}

impl FrameSession {
    pub fn new(host: Arc<dyn FrameHost>, api_url: String, profile_base_url: String) -> Self {
        Self {
            host,
            api_url,
            profile_base_url,
            context: None,
            events: None,
            added: false,
            loaded: false,
            status: None,
        }
    }

    /// Read the context once, prompt add-frame if needed, then signal ready.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        log::info!("Loading frame context");

        let Some(context) = self.host.context() else {
            log::warn!("Frame host returned no context");
            return;
        };

        self.added = context.client.added;
        self.context = Some(context);
        self.events = Some(self.host.subscribe());

        if !self.added {
            self.add_frame();
        }

        self.host.ready();
    }

    pub fn add_frame(&mut self) {
        match self.host.add_frame() {
            Ok(()) => {
                log::info!("Add frame requested");
            }
            Err(HostError::RejectedByUser(reason))
            | Err(HostError::InvalidDomainManifest(reason)) => {
                log::info!("Frame not added: {}", reason);
                self.status = Some(format!("Not added: {}", reason));
            }
            Err(e) => {
                log::error!("Add frame failed: {}", e);
                self.status = Some(format!("Error: {}", e));
            }
        }
    }

    /// Drain pending host events. Returns how many were handled.
    pub fn poll_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let next = match &self.events {
                Some(rx) => rx.try_recv(),
                None => return handled,
            };
            match next {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty) => return handled,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Frame host event channel closed");
                    self.events = None;
                    return handled;
                }
            }
        }
    }

    pub fn handle_event(&mut self, event: FrameEvent) {
        match event {
            FrameEvent::FrameAdded {
                notification_details,
            } => {
                log::info!("frameAdded (notifications: {})", notification_details.is_some());
                self.set_added(true);
                self.status = None;
            }
            FrameEvent::FrameAddRejected { reason } => {
                log::info!("frameAddRejected: {}", reason);
            }
            FrameEvent::FrameRemoved => {
                log::info!("frameRemoved");
                self.set_added(false);
            }
            FrameEvent::NotificationsEnabled {
                notification_details,
            } => {
                log::info!(
                    "notificationsEnabled: url={} token={}",
                    notification_details.url,
                    notification_details.token
                );
            }
            FrameEvent::NotificationsDisabled => {
                log::info!("notificationsDisabled");
            }
            FrameEvent::PrimaryButtonClicked => {
                log::info!("primaryButtonClicked");
            }
        }
    }

    fn set_added(&mut self, added: bool) {
        self.added = added;
        if let Some(ctx) = self.context.as_mut() {
            ctx.client.added = added;
        }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[inline]
    pub fn is_added(&self) -> bool {
        self.added
    }

    /// User id from the context, 0 when there is none.
    pub fn fid(&self) -> u64 {
        self.context.as_ref().map_or(0, |ctx| ctx.user.fid)
    }

    pub fn username(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|ctx| ctx.user.username.as_deref())
    }

    pub fn safe_area(&self) -> SafeAreaInsets {
        self.context
            .as_ref()
            .map(|ctx| ctx.client.safe_area_insets)
            .unwrap_or_default()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn share_url(&self) -> String {
        format!("{}/share/{}", self.api_url, self.fid())
    }

    pub fn profile_url(&self) -> Option<String> {
        self.username()
            .map(|name| format!("{}/{}", self.profile_base_url, name))
    }

    pub fn open_share(&mut self) {
        let url = self.share_url();
        self.open(url);
    }

    pub fn open_profile(&mut self) {
        match self.profile_url() {
            Some(url) => self.open(url),
            None => self.status = Some("No username in frame context".to_string()),
        }
    }

    fn open(&mut self, url: String) {
        self.status = match self.host.open_url(&url) {
            Ok(()) => Some(format!("Opened {}", url)),
            Err(e) => {
                log::error!("{}", e);
                Some(format!("Error: {}", e))
            }
        };
    }
}
