// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inbound share routing.
//
// A share can arrive before the page is able to display anything, while a
// previous photo is still being resolved, or twice for the same photo
// (activity re-creation redelivers the launching intent). The router holds
// the state that decides which of those applies. It is owned by the UI
// event loop and never shared.

use photoloc_core::types::{ImageReference, ShareIntent};
use tracing::{debug, info};

/// What the owner should do with an inbound share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Start resolving this reference now.
    Dispatch(ImageReference),
    /// Held until the page signals readiness.
    Buffered,
    /// Held until the in-flight resolution finishes.
    Queued,
    /// Same photo as the one already handled or waiting.
    Duplicate,
    /// Not an image share, or no references.
    Ignored,
}

/// Readiness buffering, in-flight queuing and duplicate suppression.
///
/// The pending slot holds at most one reference; a newer share replaces an
/// older one that has not started yet.
#[derive(Debug, Default)]
pub struct ShareRouter {
    ready: bool,
    in_flight: bool,
    pending: Option<ImageReference>,
    /// Processed-event flag: the reference most recently dispatched.
    last_dispatched: Option<ImageReference>,
}

impl ShareRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn pending(&self) -> Option<&ImageReference> {
        self.pending.as_ref()
    }

    /// Route a raw platform intent, filtering by action and MIME type.
    pub fn on_intent(&mut self, intent: &ShareIntent, ready: bool) -> RouteDecision {
        match intent.image_refs() {
            Some(refs) => self.on_share_received(refs, ready),
            None => {
                debug!(action = ?intent.action, mime = ?intent.mime_type, "not an image share");
                RouteDecision::Ignored
            }
        }
    }

    /// Route the references of an image share.
    ///
    /// `ready` is the host's view of page readiness; once the page has been
    /// ready it stays ready.
    pub fn on_share_received(&mut self, refs: &[ImageReference], ready: bool) -> RouteDecision {
        if ready {
            self.ready = true;
        }

        let Some((reference, rest)) = refs.split_first() else {
            debug!("share carried no references");
            return RouteDecision::Ignored;
        };
        if !rest.is_empty() {
            debug!(ignored = rest.len(), "only the first shared image is processed");
        }

        if self.is_duplicate(reference) {
            debug!(%reference, "duplicate share suppressed");
            return RouteDecision::Duplicate;
        }
        self.last_dispatched = None;

        if !self.ready {
            info!(%reference, "page not ready, share buffered");
            self.pending = Some(reference.clone());
            return RouteDecision::Buffered;
        }
        if self.in_flight {
            info!(%reference, "resolution in flight, share queued");
            self.pending = Some(reference.clone());
            return RouteDecision::Queued;
        }

        RouteDecision::Dispatch(self.dispatch(reference.clone()))
    }

    /// The page can display results. Replays a buffered share once.
    pub fn on_ready(&mut self) -> Option<ImageReference> {
        self.ready = true;
        if self.in_flight {
            return None;
        }
        let reference = self.pending.take()?;
        info!(%reference, "replaying buffered share");
        Some(self.dispatch(reference))
    }

    /// The in-flight resolution is done. Releases a queued share, if any.
    pub fn on_resolution_finished(&mut self) -> Option<ImageReference> {
        self.in_flight = false;
        if !self.ready {
            return None;
        }
        let reference = self.pending.take()?;
        info!(%reference, "releasing queued share");
        Some(self.dispatch(reference))
    }

    fn is_duplicate(&self, reference: &ImageReference) -> bool {
        self.pending.as_ref() == Some(reference) || self.last_dispatched.as_ref() == Some(reference)
    }

    fn dispatch(&mut self, reference: ImageReference) -> ImageReference {
        self.in_flight = true;
        self.last_dispatched = Some(reference.clone());
        reference
    }
}

#[cfg(test)]
mod tests {
    use photoloc_core::types::{ACTION_SEND, ACTION_SEND_MULTIPLE, ShareAction};

    use super::*;

    fn r(uri: &str) -> ImageReference {
        ImageReference::parse(uri).unwrap()
    }

    const MEDIA_42: &str = "content://media/external/images/media/42";
    const MEDIA_43: &str = "content://media/external/images/media/43";

    #[test]
    fn share_before_ready_is_replayed_exactly_once() {
        let mut router = ShareRouter::new();

        assert_eq!(
            router.on_share_received(&[r(MEDIA_42)], false),
            RouteDecision::Buffered
        );
        assert_eq!(router.on_ready(), Some(r(MEDIA_42)));
        assert_eq!(router.on_ready(), None);
        assert!(router.is_in_flight());
    }

    #[test]
    fn duplicate_while_ready_dispatches_once() {
        let mut router = ShareRouter::new();

        assert_eq!(
            router.on_share_received(&[r(MEDIA_42)], true),
            RouteDecision::Dispatch(r(MEDIA_42))
        );
        assert_eq!(router.on_resolution_finished(), None);
        assert_eq!(
            router.on_share_received(&[r(MEDIA_42)], true),
            RouteDecision::Duplicate
        );
    }

    #[test]
    fn readiness_is_not_revoked_by_a_stale_flag() {
        let mut router = ShareRouter::new();
        router.on_share_received(&[r(MEDIA_42)], true);
        router.on_resolution_finished();

        assert!(router.is_ready());
        assert_eq!(
            router.on_share_received(&[r(MEDIA_43)], false),
            RouteDecision::Dispatch(r(MEDIA_43))
        );
    }

    #[test]
    fn duplicate_of_buffered_share_is_suppressed() {
        let mut router = ShareRouter::new();
        router.on_share_received(&[r(MEDIA_42)], false);
        assert_eq!(
            router.on_share_received(&[r(MEDIA_42)], false),
            RouteDecision::Duplicate
        );
        assert_eq!(router.on_ready(), Some(r(MEDIA_42)));
    }

    #[test]
    fn distinct_event_clears_the_processed_flag() {
        let mut router = ShareRouter::new();
        router.on_share_received(&[r(MEDIA_42)], true);
        router.on_resolution_finished();
        router.on_share_received(&[r(MEDIA_43)], true);
        router.on_resolution_finished();

        assert_eq!(
            router.on_share_received(&[r(MEDIA_42)], true),
            RouteDecision::Dispatch(r(MEDIA_42))
        );
    }

    #[test]
    fn share_during_resolution_is_queued_last_wins() {
        let mut router = ShareRouter::new();
        router.on_share_received(&[r(MEDIA_42)], true);

        let third = "content://media/external/images/media/44";
        assert_eq!(
            router.on_share_received(&[r(MEDIA_43)], true),
            RouteDecision::Queued
        );
        assert_eq!(
            router.on_share_received(&[r(third)], true),
            RouteDecision::Queued
        );
        assert_eq!(router.pending(), Some(&r(third)));

        assert_eq!(router.on_resolution_finished(), Some(r(third)));
        assert_eq!(router.on_resolution_finished(), None);
        assert!(!router.is_in_flight());
    }

    #[test]
    fn ready_does_not_replay_over_in_flight() {
        let mut router = ShareRouter::new();
        router.on_share_received(&[r(MEDIA_42)], true);
        router.on_share_received(&[r(MEDIA_43)], true);

        assert_eq!(router.on_ready(), None);
        assert_eq!(router.on_resolution_finished(), Some(r(MEDIA_43)));
    }

    #[test]
    fn only_first_reference_is_routed() {
        let mut router = ShareRouter::new();
        assert_eq!(
            router.on_share_received(&[r(MEDIA_42), r(MEDIA_43)], true),
            RouteDecision::Dispatch(r(MEDIA_42))
        );
        assert_eq!(router.on_share_received(&[], true), RouteDecision::Ignored);
    }

    #[test]
    fn intent_filtering() {
        let mut router = ShareRouter::new();
        let text = ShareIntent {
            action: ShareAction::from_action(ACTION_SEND),
            mime_type: Some("text/plain".into()),
            streams: vec![r(MEDIA_42)],
        };
        assert_eq!(router.on_intent(&text, true), RouteDecision::Ignored);

        let view = ShareIntent {
            action: ShareAction::from_action("android.intent.action.VIEW"),
            mime_type: Some("image/jpeg".into()),
            streams: vec![r(MEDIA_42)],
        };
        assert_eq!(router.on_intent(&view, true), RouteDecision::Ignored);

        let multiple = ShareIntent {
            action: ShareAction::from_action(ACTION_SEND_MULTIPLE),
            mime_type: Some("image/*".into()),
            streams: vec![r(MEDIA_43), r(MEDIA_42)],
        };
        assert_eq!(
            router.on_intent(&multiple, true),
            RouteDecision::Dispatch(r(MEDIA_43))
        );
    }
}
