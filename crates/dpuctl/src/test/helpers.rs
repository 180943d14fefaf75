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

//! Shared test infrastructure: a scripted readiness watch and a fake
//! hardware-management file tree.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::config::PlatformConfig;
use crate::controller::DpuController;
use crate::paths::DpuIdentity;
use crate::watch::ReadinessWatch;

/// Deterministic [`ReadinessWatch`] fake. Serves queued fire/timeout
/// verdicts (defaulting to timeout when the queue is empty) and records
/// every waited path so tests can assert on the wait sequence.
#[derive(Clone, Default)]
pub(crate) struct ScriptedWatch {
    verdicts: Arc<Mutex<VecDeque<bool>>>,
    waits: Arc<Mutex<Vec<PathBuf>>>,
    fail_setup: Arc<AtomicBool>,
}

impl ScriptedWatch {
    pub fn with_verdicts(verdicts: impl IntoIterator<Item = bool>) -> Self {
        let watch = Self::default();
        watch.verdicts.lock().unwrap().extend(verdicts);
        watch
    }

    /// Queue one more fire/timeout verdict behind any already scripted.
    pub fn push_verdict(&self, fired: bool) {
        self.verdicts.lock().unwrap().push_back(fired);
    }

    /// Make every subsequent wait fail at watch-setup time.
    pub fn failing_setup() -> Self {
        let watch = Self::default();
        watch.fail_setup.store(true, Ordering::SeqCst);
        watch
    }

    pub fn waits(&self) -> Vec<PathBuf> {
        self.waits.lock().unwrap().clone()
    }

    pub fn wait_count(&self) -> usize {
        self.waits.lock().unwrap().len()
    }
}

#[async_trait]
impl ReadinessWatch for ScriptedWatch {
    async fn wait_for_event(&self, path: &Path, _timeout: Duration) -> Result<bool, notify::Error> {
        if self.fail_setup.load(Ordering::SeqCst) {
            return Err(notify::Error::path_not_found().add_path(path.to_path_buf()));
        }
        self.waits.lock().unwrap().push(path.to_path_buf());
        Ok(self.verdicts.lock().unwrap().pop_front().unwrap_or(false))
    }
}

/// A fake hardware-management tree under a tempdir: control knobs, event
/// directory, config directory and a PCI sysfs root, plus a config with
/// zero retry delay so forced retries run instantly.
pub(crate) struct PlatformTree {
    dir: TempDir,
    pub config: PlatformConfig,
}

impl PlatformTree {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = PlatformConfig {
            system_base: dir.path().join("system"),
            event_base: dir.path().join("events"),
            config_base: dir.path().join("config"),
            pci_base: dir.path().join("pci"),
            dpu_count: 4,
            wait_for_ready_secs: 1,
            wait_for_shutdown_secs: 1,
            power_on_attempts: 4,
            retry_delay_ms: 0,
            burn_tool: String::from("true"),
        };
        std::fs::create_dir_all(&config.system_base).unwrap();
        std::fs::create_dir_all(&config.event_base).unwrap();
        std::fs::create_dir_all(&config.config_base).unwrap();
        std::fs::create_dir_all(config.pci_base.join("devices")).unwrap();
        std::fs::write(config.pci_base.join("rescan"), "").unwrap();
        Self { dir, config }
    }

    /// Create the control knobs the hardware-management daemon would have
    /// created for one DPU slot.
    pub fn add_dpu(&self, index: u8) -> DpuIdentity {
        let identity = DpuIdentity::from_hw_index(index);
        let name = identity.name();
        for suffix in ["rst", "pwr", "pwr_force", "perst_en"] {
            std::fs::write(self.config.system_base.join(format!("{name}_{suffix}")), "").unwrap();
        }
        identity
    }

    /// Register a PCI bus id for a DPU and create the matching device
    /// `remove` knob.
    pub fn add_pci_device(&self, identity: &DpuIdentity, bus_id: &str) {
        std::fs::write(
            self.config
                .config_base
                .join(format!("{}_pci_bus_id", identity.name())),
            format!("{bus_id}\n"),
        )
        .unwrap();
        let device_dir = self.config.pci_base.join("devices").join(bus_id);
        std::fs::create_dir_all(&device_dir).unwrap();
        std::fs::write(device_dir.join("remove"), "").unwrap();
    }

    pub fn controller(&self, index: u8, watch: ScriptedWatch) -> DpuController<ScriptedWatch> {
        let identity = self.add_dpu(index);
        DpuController::new(identity, self.config.clone(), watch)
    }

    pub fn knob(&self, name: &str) -> String {
        std::fs::read_to_string(self.config.system_base.join(name)).unwrap()
    }

    pub fn set_event(&self, name: &str, value: &str) {
        std::fs::write(self.config.event_base.join(name), value).unwrap();
    }

    pub fn pci_knob(&self, relative: &str) -> String {
        std::fs::read_to_string(self.config.pci_base.join(relative)).unwrap()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
