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

//! Per-DPU power and lifecycle state machines.
//!
//! Each operation is a strictly sequential handshake with firmware: write a
//! control knob, wait for the corresponding event file, decide the next step.
//! Readiness timeouts are never fatal on their own; each call site escalates
//! exactly once along its documented fallback (graceful -> forced, reset ->
//! full power cycle). File-missing, write and watch-setup errors abort the
//! operation immediately.
//!
//! A controller owns its identity and paths exclusively; nothing is shared
//! between controllers, so fleets can run one controller per task without
//! locking.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::config::PlatformConfig;
use crate::error::DpuCtlError;
use crate::paths::{ControlPaths, DpuIdentity};
use crate::watch::ReadinessWatch;
use crate::{firmware, pci, sysfs};

pub struct DpuController<W> {
    identity: DpuIdentity,
    paths: ControlPaths,
    config: PlatformConfig,
    watch: W,
}

impl<W: ReadinessWatch> DpuController<W> {
    pub fn new(identity: DpuIdentity, config: PlatformConfig, watch: W) -> Self {
        let paths = ControlPaths::new(&identity, &config);
        Self {
            identity,
            paths,
            config,
            watch,
        }
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn identity(&self) -> &DpuIdentity {
        &self.identity
    }

    pub fn paths(&self) -> &ControlPaths {
        &self.paths
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    fn write_knob(&self, path: &Path, value: &str) -> Result<(), DpuCtlError> {
        sysfs::write_signal(self.name(), path, value)
    }

    async fn wait_ready(&self) -> Result<(), DpuCtlError> {
        self.wait_event(
            &self.paths.ready_event,
            "ready",
            self.config.wait_for_ready(),
        )
        .await
    }

    /// Wait for one event-file transition, mapping a timeout to
    /// [`DpuCtlError::ReadinessTimeout`] so call sites can match on it and
    /// run their fallback.
    async fn wait_event(
        &self,
        path: &Path,
        event: &'static str,
        timeout: std::time::Duration,
    ) -> Result<(), DpuCtlError> {
        let fired = self
            .watch
            .wait_for_event(path, timeout)
            .await
            .map_err(|source| DpuCtlError::WatchSetupFailed {
                dpu: self.name().to_owned(),
                path: path.to_path_buf(),
                source,
            })?;
        if fired {
            Ok(())
        } else {
            Err(DpuCtlError::ReadinessTimeout {
                dpu: self.name().to_owned(),
                event,
            })
        }
    }

    /// The graceful go-down handshake: wait for firmware to acknowledge
    /// shutdown. On timeout, force power off once and stop escalating.
    async fn go_down(&self) -> Result<(), DpuCtlError> {
        match self
            .wait_event(
                &self.paths.shutdown_ready_event,
                "shutdown-ready",
                self.config.wait_for_shutdown(),
            )
            .await
        {
            Ok(()) => {
                info!(dpu = self.name(), "going down complete");
                Ok(())
            }
            Err(DpuCtlError::ReadinessTimeout { .. }) => {
                warn!(dpu = self.name(), "going down unsuccessful, forcing power off");
                self.write_knob(&self.paths.power_force, "1")
            }
            Err(err) => Err(err),
        }
    }

    /// Power off the DPU. Forced cuts power immediately with a single write
    /// and no waiting; graceful signals go-down, waits for the firmware
    /// acknowledgment and then drops power.
    pub async fn power_off(&self, forced: bool) -> Result<(), DpuCtlError> {
        info!(dpu = self.name(), forced, "power off");
        if forced {
            self.write_knob(&self.paths.power_force, "1")?;
        } else {
            self.write_knob(&self.paths.reset, "1")?;
            self.go_down().await?;
            self.write_knob(&self.paths.power, "1")?;
        }
        info!(dpu = self.name(), "power off complete");
        Ok(())
    }

    /// Forced power-on with a bounded retry budget. Each attempt writes the
    /// forced power knob and waits for the ready event; attempts after the
    /// first are separated by the configured retry delay.
    async fn force_power_on(&self) -> Result<(), DpuCtlError> {
        let attempts = self.config.power_on_attempts;
        for attempt in 1..=attempts {
            if attempt > 1 {
                warn!(dpu = self.name(), attempt, attempts, "force power on retry");
                tokio::time::sleep(self.config.retry_delay()).await;
            }
            self.write_knob(&self.paths.power_force, "0")?;
            match self.wait_ready().await {
                Ok(()) => {
                    info!(dpu = self.name(), "force power on successful");
                    return Ok(());
                }
                Err(DpuCtlError::ReadinessTimeout { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        error!(dpu = self.name(), attempts, "force power on failed, giving up");
        Err(DpuCtlError::RetryBudgetExhausted {
            dpu: self.name().to_owned(),
            attempts,
        })
    }

    /// Power on the DPU and wait for it to become ready. A graceful attempt
    /// that is not ready in time falls back to exactly one forced run with a
    /// fresh retry budget; the reverse order never happens.
    pub async fn power_on(&self, forced: bool) -> Result<(), DpuCtlError> {
        info!(dpu = self.name(), forced, "power on");
        if forced {
            return self.force_power_on().await;
        }
        self.write_knob(&self.paths.power, "0")?;
        match self.wait_ready().await {
            Ok(()) => {
                info!(dpu = self.name(), "power on successful");
                Ok(())
            }
            Err(DpuCtlError::ReadinessTimeout { .. }) => {
                warn!(dpu = self.name(), "power on not ready, trying force power on");
                self.force_power_on().await
            }
            Err(err) => Err(err),
        }
    }

    /// Pulse the reset line through the go-down handshake. If the DPU does
    /// not come back ready, recover with a full forced power cycle rather
    /// than re-pulsing reset.
    pub async fn reboot(&self) -> Result<(), DpuCtlError> {
        info!(dpu = self.name(), "reboot");
        self.write_knob(&self.paths.reset, "1")?;
        self.go_down().await?;
        self.write_knob(&self.paths.reset, "0")?;
        match self.wait_ready().await {
            Ok(()) => {}
            Err(DpuCtlError::ReadinessTimeout { .. }) => {
                warn!(dpu = self.name(), "not ready after reset, power cycling");
                self.power_off(true).await?;
                self.power_on(true).await?;
            }
            Err(err) => return Err(err),
        }
        info!(dpu = self.name(), "reboot complete");
        Ok(())
    }

    /// Detach the DPU from the host: prepare its OS, remove its PCI device,
    /// then take it through the graceful power-off handshake.
    pub async fn shutdown(&self) -> Result<(), DpuCtlError> {
        info!(dpu = self.name(), "shut down");
        self.reboot_prep().await?;
        pci::remove_device(self.name(), &self.paths, &self.config.pci_base)?;
        self.power_off(false).await
    }

    /// Bring the DPU up and reattach it to the host PCI bus.
    pub async fn startup(&self) -> Result<(), DpuCtlError> {
        info!(dpu = self.name(), "startup");
        self.power_on(false).await?;
        pci::rescan_bus(self.name(), &self.config.pci_base)
    }

    /// Burn a firmware image and cycle the DPU into it. PCIe presence is
    /// masked across the go-down handshake so the host does not see the
    /// device flap while firmware restarts.
    pub async fn firmware_upgrade(&self, image: &Path) -> Result<(), DpuCtlError> {
        info!(dpu = self.name(), image = %image.display(), "firmware upgrade");
        firmware::burn(self.name(), self.identity.index(), &self.config.burn_tool, image).await?;
        self.reboot_prep().await?;
        pci::remove_device(self.name(), &self.paths, &self.config.pci_base)?;
        self.write_knob(&self.paths.perst_en, "0")?;
        self.go_down().await?;
        self.write_knob(&self.paths.perst_en, "1")?;
        match self.wait_ready().await {
            Ok(()) => {}
            Err(DpuCtlError::ReadinessTimeout { .. }) => {
                warn!(dpu = self.name(), "not ready after firmware upgrade, power cycling");
                self.power_off(true).await?;
                self.power_on(true).await?;
            }
            Err(err) => return Err(err),
        }
        pci::rescan_bus(self.name(), &self.config.pci_base)?;
        info!(dpu = self.name(), "firmware upgrade complete");
        Ok(())
    }

    /// Hook run before cutting power on a live DPU.
    // TODO: ask the DPU OS to shut itself down over the rshim console before
    // the power is cut, once the console path is plumbed through.
    async fn reboot_prep(&self) -> Result<(), DpuCtlError> {
        debug!(dpu = self.name(), "reboot prep");
        Ok(())
    }
}
