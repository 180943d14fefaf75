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

//! PCI hotplug plumbing around DPU power transitions.

use std::path::Path;

use tracing::info;

use crate::error::DpuCtlError;
use crate::paths::ControlPaths;
use crate::sysfs;

/// Remove the DPU's PCI device from the host. The bus id comes from the
/// hardware-management config file for this slot.
pub fn remove_device(dpu: &str, paths: &ControlPaths, pci_base: &Path) -> Result<(), DpuCtlError> {
    let bus_id = sysfs::read_text(dpu, &paths.pci_bus_id)?;
    let remove = pci_base.join("devices").join(&bus_id).join("remove");
    info!(dpu, bus_id, "removing PCI device");
    sysfs::write_signal(dpu, &remove, "1")
}

/// Rescan the PCI bus so a powered-on DPU is re-enumerated by the host.
pub fn rescan_bus(dpu: &str, pci_base: &Path) -> Result<(), DpuCtlError> {
    info!(dpu, "rescanning PCI bus");
    sysfs::write_signal(dpu, &pci_base.join("rescan"), "1")
}
