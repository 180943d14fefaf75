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

//! DPU identity and the control/event file paths derived from it.

use std::path::PathBuf;

use crate::config::PlatformConfig;

/// Identity of a single DPU slot. Hardware numbering is 1-based; the
/// canonical name is `dpu{N}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DpuIdentity {
    index: u8,
    name: String,
}

impl DpuIdentity {
    /// Build from the 1-based hardware index used in file naming.
    pub fn from_hw_index(index: u8) -> Self {
        Self {
            index,
            name: format!("dpu{index}"),
        }
    }

    /// Build from the 0-based index used by platform-API callers.
    pub fn from_module_index(index: u8) -> Self {
        Self::from_hw_index(index + 1)
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The fixed set of filesystem paths for one DPU, computed once at
/// construction. The control knobs are written by the controller; the event
/// files are only ever observed.
#[derive(Clone, Debug)]
pub struct ControlPaths {
    /// Reset / go-down control (`dpu{N}_rst`).
    pub reset: PathBuf,
    /// Power control (`dpu{N}_pwr`).
    pub power: PathBuf,
    /// Forced power control (`dpu{N}_pwr_force`).
    pub power_force: PathBuf,
    /// PCIe presence-enable control (`dpu{N}_perst_en`).
    pub perst_en: PathBuf,
    /// Readiness event (`dpu{N}_ready`).
    pub ready_event: PathBuf,
    /// Shutdown-readiness event (`dpu{N}_shtdn_ready`).
    pub shutdown_ready_event: PathBuf,
    /// PCI bus id config (`dpu{N}_pci_bus_id`), read as text.
    pub pci_bus_id: PathBuf,
}

impl ControlPaths {
    pub fn new(identity: &DpuIdentity, config: &PlatformConfig) -> Self {
        let name = identity.name();
        Self {
            reset: config.system_base.join(format!("{name}_rst")),
            power: config.system_base.join(format!("{name}_pwr")),
            power_force: config.system_base.join(format!("{name}_pwr_force")),
            perst_en: config.system_base.join(format!("{name}_perst_en")),
            ready_event: config.event_base.join(format!("{name}_ready")),
            shutdown_ready_event: config.event_base.join(format!("{name}_shtdn_ready")),
            pci_bus_id: config.config_base.join(format!("{name}_pci_bus_id")),
        }
    }
}
