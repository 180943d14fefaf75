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

//! Platform configuration: where the hardware-management daemon exposes its
//! control and event files, and the timing knobs of the power state machines.
//!
//! Defaults match the shipped hardware contract, so an empty configuration is
//! a valid one. A TOML file and `DPUCTL_`-prefixed environment variables can
//! override individual fields.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Directory holding the per-DPU control knobs (`dpu{N}_rst`, ...).
    #[serde(default = "default_system_base")]
    pub system_base: PathBuf,

    /// Directory holding the per-DPU event files (`dpu{N}_ready`, ...).
    #[serde(default = "default_event_base")]
    pub event_base: PathBuf,

    /// Directory holding the per-DPU config files (`dpu{N}_pci_bus_id`).
    #[serde(default = "default_config_base")]
    pub config_base: PathBuf,

    /// PCI sysfs root, parameterized so tests can point it at a fake tree.
    #[serde(default = "default_pci_base")]
    pub pci_base: PathBuf,

    /// Number of DPU slots on the platform, hardware numbering 1..=count.
    #[serde(default = "default_dpu_count")]
    pub dpu_count: u8,

    #[serde(default = "default_wait_secs")]
    pub wait_for_ready_secs: u64,

    #[serde(default = "default_wait_secs")]
    pub wait_for_shutdown_secs: u64,

    /// Forced power-on retry budget.
    #[serde(default = "default_power_on_attempts")]
    pub power_on_attempts: u32,

    /// Delay between forced power-on attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// External tool used to burn a firmware image onto the DPU rshim.
    #[serde(default = "default_burn_tool")]
    pub burn_tool: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            system_base: default_system_base(),
            event_base: default_event_base(),
            config_base: default_config_base(),
            pci_base: default_pci_base(),
            dpu_count: default_dpu_count(),
            wait_for_ready_secs: default_wait_secs(),
            wait_for_shutdown_secs: default_wait_secs(),
            power_on_attempts: default_power_on_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            burn_tool: default_burn_tool(),
        }
    }
}

impl PlatformConfig {
    /// Load the configuration, merging an optional TOML file with
    /// `DPUCTL_`-prefixed environment variables. Missing fields fall back to
    /// the platform defaults.
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::new();
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed("DPUCTL_")).extract()
    }

    pub fn wait_for_ready(&self) -> Duration {
        Duration::from_secs(self.wait_for_ready_secs)
    }

    pub fn wait_for_shutdown(&self) -> Duration {
        Duration::from_secs(self.wait_for_shutdown_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_system_base() -> PathBuf {
    PathBuf::from("/var/run/hw-management/system")
}

fn default_event_base() -> PathBuf {
    PathBuf::from("/var/run/hw-management/events")
}

fn default_config_base() -> PathBuf {
    PathBuf::from("/var/run/hw-management/config")
}

fn default_pci_base() -> PathBuf {
    PathBuf::from("/sys/bus/pci")
}

fn default_dpu_count() -> u8 {
    4
}

fn default_wait_secs() -> u64 {
    60
}

fn default_power_on_attempts() -> u32 {
    4
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_burn_tool() -> String {
    String::from("sonic_bfb_install")
}
