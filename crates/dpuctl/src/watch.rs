/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Waiting for hardware readiness events.
//!
//! Firmware signals readiness by creating or touching an event file. The
//! [`ReadinessWatch`] trait is the seam between the controller state machines
//! and real filesystem notification, so tests can drive the state machines
//! with a deterministic fake instead of real timing.

use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use notify::{EventKind, RecursiveMode, Watcher};
use tokio::time::Instant;

/// Capability to wait for a single event-file transition.
#[async_trait]
pub trait ReadinessWatch: Send + Sync {
    /// Block the calling task until `path` is created or written, or until
    /// `timeout` elapses. Returns `Ok(true)` if the event fired in time and
    /// `Ok(false)` on timeout. Failing to establish the watch at all (missing
    /// parent directory, permissions) is an error, not a timeout.
    async fn wait_for_event(&self, path: &Path, timeout: Duration) -> Result<bool, notify::Error>;
}

/// OS-level implementation backed by a `notify` filesystem watcher.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsReadinessWatch;

#[async_trait]
impl ReadinessWatch for FsReadinessWatch {
    async fn wait_for_event(&self, path: &Path, timeout: Duration) -> Result<bool, notify::Error> {
        let parent = path
            .parent()
            .ok_or_else(|| notify::Error::path_not_found().add_path(path.to_path_buf()))?;

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |result| {
            let _ = tx.send(result);
        })?;
        // Watch the parent so creation of the event file itself is visible.
        watcher.watch(parent, RecursiveMode::NonRecursive)?;

        // The event may have fired before the watch was in place.
        if path.exists() {
            return Ok(true);
        }

        let target: Option<OsString> = path.file_name().map(|name| name.to_os_string());
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(false);
            }
            match tokio::time::timeout(remaining, rx.recv()).await {
                // Timed out, or the watcher backend went away.
                Err(_) | Ok(None) => return Ok(false),
                Ok(Some(Ok(event))) => {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        continue;
                    }
                    let fired = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|name| name.to_os_string()) == target);
                    if fired {
                        return Ok(true);
                    }
                }
                Ok(Some(Err(err))) => {
                    // Unrelated watch errors must not end the wait early.
                    tracing::warn!(path = %path.display(), error = %err, "watch event error");
                }
            }
        }
    }
}
