//! Bridge from "now playing" notifications to rich presence
//!
//! The host pushes [`TrackSnapshot`]s through a [`TrackEventSource`]; the
//! bridge turns them into presence updates or clears. Repeated clears are
//! dropped; repeated updates are forwarded, since a resend is what reaches a
//! Discord client that started or restarted mid-track.

use crate::actor::PresenceHandle;
use crate::types::TrackSnapshot;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// What a snapshot asks of the presence connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeAction {
    Update {
        title: String,
        artist: String,
        artwork_url: Option<String>,
    },
    Clear,
    Skip,
}

impl BridgeAction {
    /// Map a snapshot to an action.
    ///
    /// Paused always clears; playing without both title and artist is skipped.
    pub fn from_snapshot(snapshot: &TrackSnapshot) -> Self {
        if !snapshot.is_playing {
            return Self::Clear;
        }

        match (&snapshot.title, &snapshot.artist) {
            (Some(title), Some(artist)) => Self::Update {
                title: title.clone(),
                artist: artist.clone(),
                artwork_url: snapshot.artwork_url.clone().filter(|url| !url.is_empty()),
            },
            _ => Self::Skip,
        }
    }
}

/// Anything that can display a presence
pub trait PresenceSink: Send + Sync {
    fn update_presence(&self, title: &str, artist: &str, artwork_url: Option<&str>);
    fn clear_presence(&self);
}

impl PresenceSink for PresenceHandle {
    fn update_presence(&self, title: &str, artist: &str, artwork_url: Option<&str>) {
        PresenceHandle::update_presence(self, title, artist, artwork_url);
    }

    fn clear_presence(&self) {
        PresenceHandle::clear_presence(self);
    }
}

/// Forwards track changes to a presence sink, skipping repeated clears
pub struct PresenceBridge<S> {
    sink: S,
    last: Option<BridgeAction>,
}

impl<S: PresenceSink> PresenceBridge<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, last: None }
    }

    /// Handle one snapshot and return what was done with it
    pub fn on_track_change(&mut self, snapshot: &TrackSnapshot) -> BridgeAction {
        let action = BridgeAction::from_snapshot(snapshot);

        let repeated_clear =
            action == BridgeAction::Clear && self.last.as_ref() == Some(&BridgeAction::Clear);
        if action == BridgeAction::Skip || repeated_clear {
            debug!("Skipping track notification: {:?}", snapshot.title);
            return BridgeAction::Skip;
        }

        match &action {
            BridgeAction::Update {
                title,
                artist,
                artwork_url,
            } => self
                .sink
                .update_presence(title, artist, artwork_url.as_deref()),
            BridgeAction::Clear => self.sink.clear_presence(),
            BridgeAction::Skip => {}
        }

        self.last = Some(action.clone());
        action
    }
}

impl<S: PresenceSink + 'static> PresenceBridge<S> {
    /// Subscribe to `source`, keeping any observer already installed
    pub fn attach(self, source: &mut TrackEventSource) {
        let bridge = Mutex::new(self);
        source.chain(move |snapshot| {
            if let Ok(mut bridge) = bridge.lock() {
                bridge.on_track_change(snapshot);
            }
        });
    }
}

/// Observer callback for track changes
pub type TrackCallback = Arc<dyn Fn(&TrackSnapshot) + Send + Sync>;

/// Callback slot the host fires on every "now playing" change
#[derive(Default, Clone)]
pub struct TrackEventSource {
    on_track_change: Option<TrackCallback>,
}

impl TrackEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `next` to run after whatever observer is already present
    pub fn chain<F>(&mut self, next: F)
    where
        F: Fn(&TrackSnapshot) + Send + Sync + 'static,
    {
        let callback: TrackCallback = match self.on_track_change.take() {
            Some(existing) => Arc::new(move |snapshot: &TrackSnapshot| {
                existing(snapshot);
                next(snapshot);
            }),
            None => Arc::new(next),
        };
        self.on_track_change = Some(callback);
    }

    /// Notify every observer
    pub fn emit(&self, snapshot: &TrackSnapshot) {
        if let Some(callback) = &self.on_track_change {
            callback(snapshot);
        }
    }
}
