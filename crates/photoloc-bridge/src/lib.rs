// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photoloc: Native platform bridge abstractions.
//
// The high-level crates talk to the content resolver, gallery, permission
// system, intent dispatch, package manager and host web view only through
// the traits in `traits`. Android implements them over JNI; every other
// target gets the stub.

pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use traits::*;

/// Retrieves the bridge implementation for the target operating system.
pub fn platform_bridge() -> Box<dyn PlatformBridge> {
    #[cfg(target_os = "android")]
    {
        // Android: `jni-rs` calls into the hosting Activity on the ART runtime.
        Box::new(android::AndroidBridge::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no content providers, gallery or intents.
        Box::new(stub::StubBridge)
    }
}
