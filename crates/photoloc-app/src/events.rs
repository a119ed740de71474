// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// UI event loop: the single owner of `AppState`.
//
// Host callbacks arrive on an mpsc channel. Metadata resolution runs on the
// blocking pool, one at a time; its result comes back to this loop as a
// `ResolutionFinished` event and is applied here like any other event.

use photoloc_core::error::ResolutionError;
use photoloc_core::types::{ExifMetadata, ImageReference, ShareIntent};
use photoloc_intents::RouteDecision;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::services::app_services::AppServices;
use crate::state::AppState;

/// Everything the loop reacts to.
#[derive(Debug)]
pub enum UiEvent {
    /// The platform delivered a share intent.
    ShareReceived(ShareIntent),
    /// The page finished loading.
    PageReady,
    ResolutionFinished {
        reference: ImageReference,
        result: Result<ExifMetadata, ResolutionError>,
    },
    /// The runtime permission dialog was answered.
    PermissionResult { code: i32, granted: bool },
}

pub struct EventLoop {
    services: AppServices,
    state: AppState,
    resolutions: JoinSet<UiEvent>,
}

impl EventLoop {
    pub fn new(services: AppServices) -> Self {
        Self {
            services,
            state: AppState::new(),
            resolutions: JoinSet::new(),
        }
    }

    /// Process events until the host side of the channel is closed and no
    /// resolution is outstanding, then hand back the final state.
    pub async fn run(mut self, mut events: mpsc::Receiver<UiEvent>) -> AppState {
        let mut host_open = true;
        loop {
            tokio::select! {
                event = events.recv(), if host_open => match event {
                    Some(event) => self.handle(event),
                    None => {
                        debug!("host channel closed");
                        host_open = false;
                    }
                },
                Some(joined) = self.resolutions.join_next(), if !self.resolutions.is_empty() => {
                    match joined {
                        Ok(event) => self.handle(event),
                        Err(e) => self.resolution_panicked(e),
                    }
                },
                else => break,
            }
            if !host_open && self.resolutions.is_empty() {
                break;
            }
        }
        info!(resolutions = self.state.resolutions_started, "event loop finished");
        self.state
    }

    fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::ShareReceived(intent) => {
                let ready = self.state.router.is_ready();
                let decision = self.state.router.on_intent(&intent, ready);
                debug!(?decision, "share routed");
                if let RouteDecision::Dispatch(reference) = decision {
                    self.start_resolution(reference);
                }
            }
            UiEvent::PageReady => {
                info!("page ready");
                if let Some(reference) = self.state.router.on_ready() {
                    self.start_resolution(reference);
                }
            }
            UiEvent::ResolutionFinished { reference, result } => {
                self.state.resolving = None;
                let presentation = self.services.present(&reference, &result);
                self.state.current = Some((reference, presentation));
                if let Some(next) = self.state.router.on_resolution_finished() {
                    self.start_resolution(next);
                }
            }
            UiEvent::PermissionResult { code, granted } => {
                self.services.permission_result(code, granted);
            }
        }
    }

    fn start_resolution(&mut self, reference: ImageReference) {
        info!(%reference, "resolving shared photo");
        self.state.resolutions_started += 1;
        self.state.resolving = Some(reference.clone());

        let resolver = self.services.resolver();
        self.resolutions.spawn_blocking(move || {
            let result = resolver.resolve(&reference);
            UiEvent::ResolutionFinished { reference, result }
        });
    }

    /// A panicking resolver still has to release the router.
    fn resolution_panicked(&mut self, err: tokio::task::JoinError) {
        error!(error = %err, "resolution task failed");
        if let Some(reference) = self.state.resolving.clone() {
            self.handle(UiEvent::ResolutionFinished {
                reference,
                result: Err(ResolutionError::Unreadable {
                    attempts: Vec::new(),
                }),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use photoloc_bridge::fake::FakeBridge;
    use photoloc_bridge::{PlatformBridge, ToastDuration};
    use photoloc_core::AppConfig;
    use photoloc_core::human_errors;
    use photoloc_core::types::{ACTION_SEND, ShareAction};
    use photoloc_metadata::fixtures::{tagged_jpeg, untagged_location_jpeg};

    use super::*;
    use crate::state::Presentation;

    const MEDIA_42: &str = "content://media/external/images/media/42";

    fn share(uri: &str) -> UiEvent {
        UiEvent::ShareReceived(ShareIntent {
            action: ShareAction::from_action(ACTION_SEND),
            mime_type: Some("image/jpeg".into()),
            streams: vec![ImageReference::parse(uri).unwrap()],
        })
    }

    async fn run(bridge: &Arc<FakeBridge>, events: Vec<UiEvent>) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let platform: Arc<dyn PlatformBridge> = bridge.clone();
        let services = AppServices::new(platform, dir.path().to_path_buf(), AppConfig::default());

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(EventLoop::new(services).run(rx));
        for event in events {
            tx.send(event).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap()
    }

    fn bridge_with(uri: &str, bytes: Vec<u8>) -> Arc<FakeBridge> {
        let cache = std::env::temp_dir();
        Arc::new(FakeBridge::new().with_cache_dir(cache).with_stream(uri, bytes))
    }

    #[tokio::test]
    async fn share_before_ready_resolves_once_ready() {
        let bridge = bridge_with(MEDIA_42, tagged_jpeg(39.9042, 116.4074));

        let state = run(&bridge, vec![share(MEDIA_42), UiEvent::PageReady]).await;

        assert_eq!(state.resolutions_started, 1);
        let scripts = bridge.scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].starts_with("javascript:showLocation({"));
        assert!(scripts[0].contains("\"device\":\"Apple iPhone 14\""));
        assert!(matches!(
            state.current,
            Some((_, Presentation::Location(ref payload))) if payload.datetime == "2024:01:15 10:30:45"
        ));
        assert!(state.resolving.is_none());
    }

    #[tokio::test]
    async fn duplicate_shares_are_resolved_once() {
        let bridge = bridge_with(MEDIA_42, tagged_jpeg(1.0, 2.0));

        let state = run(
            &bridge,
            vec![
                UiEvent::PageReady,
                share(MEDIA_42),
                share(MEDIA_42),
                share(MEDIA_42),
            ],
        )
        .await;

        assert_eq!(state.resolutions_started, 1);
        assert_eq!(bridge.scripts().len(), 1);
    }

    #[tokio::test]
    async fn photo_without_gps_is_explained() {
        let bridge = bridge_with(MEDIA_42, untagged_location_jpeg());

        let state = run(&bridge, vec![UiEvent::PageReady, share(MEDIA_42)]).await;

        assert!(bridge.scripts().is_empty());
        assert_eq!(
            bridge.toasts(),
            vec![(
                human_errors::no_location().toast_text(),
                ToastDuration::Long
            )]
        );
        assert!(matches!(state.current, Some((_, Presentation::NoLocation))));
    }

    #[tokio::test]
    async fn unreadable_photo_is_explained() {
        let bridge = Arc::new(FakeBridge::new());

        let state = run(&bridge, vec![UiEvent::PageReady, share(MEDIA_42)]).await;

        assert!(matches!(state.current, Some((_, Presentation::Unreadable))));
        assert_eq!(bridge.toasts().len(), 1);
        assert!(!state.router.is_in_flight());
    }

    #[tokio::test]
    async fn non_image_share_is_ignored() {
        let bridge = Arc::new(FakeBridge::new());
        let text = UiEvent::ShareReceived(ShareIntent {
            action: ShareAction::from_action(ACTION_SEND),
            mime_type: Some("text/plain".into()),
            streams: vec![ImageReference::parse(MEDIA_42).unwrap()],
        });

        let state = run(&bridge, vec![UiEvent::PageReady, text]).await;

        assert_eq!(state.resolutions_started, 0);
        assert!(state.current.is_none());
    }

    #[tokio::test]
    async fn permission_result_reaches_the_user() {
        let bridge = Arc::new(FakeBridge::new());

        run(
            &bridge,
            vec![UiEvent::PermissionResult {
                code: 100,
                granted: false,
            }],
        )
        .await;

        assert_eq!(bridge.toasts().len(), 1);
    }
}
