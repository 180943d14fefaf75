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

//! Platform-API view of a DPU module.
//!
//! `DpuModule` is the inventory-facing wrapper around a controller: admin
//! state changes and reboots go through the controller's state machines,
//! while operational status and reboot cause are classified from read-only
//! looks at the same event and reset-cause files.

use std::path::PathBuf;

use crate::controller::DpuController;
use crate::error::DpuCtlError;
use crate::sysfs;
use crate::watch::ReadinessWatch;

/// Operational status as exposed to the platform API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperStatus {
    Online,
    Offline,
    Fault,
    Unknown,
}

/// Cause of the module's previous reboot, decoded from the per-DPU
/// reset-cause flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebootCause {
    HostReset,
    Thermal,
    PowerLoss,
    SelfReboot,
    TpmReset,
    PerstSignal,
    PhyReset,
    UsbPhyReset,
    NonHardware,
}

impl RebootCause {
    pub fn description(&self) -> &'static str {
        match self {
            Self::HostReset => "Reset from main board",
            Self::Thermal => "Thermal shutdown",
            Self::PowerLoss => "Aux power loss or reload",
            Self::SelfReboot => "DPU self reboot",
            Self::TpmReset => "Reset by the TPM module",
            Self::PerstSignal => "PERST# signal to ASIC",
            Self::PhyReset => "Phy reset",
            Self::UsbPhyReset => "USB Phy reset",
            Self::NonHardware => "Non hardware reboot",
        }
    }
}

/// Reset-cause flag files checked in priority order; the first set flag wins.
const RESET_CAUSE_FLAGS: &[(&str, RebootCause)] = &[
    ("reset_from_main_board", RebootCause::HostReset),
    ("reset_dpu_thermal", RebootCause::Thermal),
    ("reset_aux_pwr_or_reload", RebootCause::PowerLoss),
    ("reset_pwr_off", RebootCause::SelfReboot),
    ("tpm_rst", RebootCause::TpmReset),
    ("perst_rst", RebootCause::PerstSignal),
    ("phy_rst", RebootCause::PhyReset),
    ("usbphy_rst", RebootCause::UsbPhyReset),
];

pub struct DpuModule<W> {
    controller: DpuController<W>,
    fault: bool,
}

impl<W: ReadinessWatch> DpuModule<W> {
    pub fn new(controller: DpuController<W>) -> Self {
        Self {
            controller,
            fault: false,
        }
    }

    pub fn name(&self) -> &str {
        self.controller.name()
    }

    pub fn controller(&self) -> &DpuController<W> {
        &self.controller
    }

    /// Reboot the module through the controller's reset flow.
    pub async fn reboot(&self) -> Result<(), DpuCtlError> {
        self.controller.reboot().await
    }

    /// Bring the module administratively up or down. A failed power-on
    /// leaves the module in fault state until the next successful one.
    pub async fn set_admin_state(&mut self, up: bool) -> Result<(), DpuCtlError> {
        if up {
            let result = self.controller.power_on(false).await;
            self.fault = result.is_err();
            result
        } else {
            self.controller.power_off(false).await
        }
    }

    /// Classify the module state from the event files, read-only. The
    /// controller's own waits are unaffected by these reads.
    pub fn oper_status(&self) -> OperStatus {
        if self.fault {
            return OperStatus::Fault;
        }
        let paths = self.controller.paths();
        if sysfs::read_flag(&paths.ready_event) {
            OperStatus::Online
        } else if sysfs::read_flag(&paths.shutdown_ready_event) {
            OperStatus::Offline
        } else {
            OperStatus::Unknown
        }
    }

    /// Decode the cause of the previous reboot from the reset-cause flags.
    pub fn reboot_cause(&self) -> RebootCause {
        let dir = self.reset_cause_dir();
        for (flag, cause) in RESET_CAUSE_FLAGS {
            if sysfs::read_flag(&dir.join(flag)) {
                return *cause;
            }
        }
        RebootCause::NonHardware
    }

    fn reset_cause_dir(&self) -> PathBuf {
        self.controller
            .config()
            .system_base
            .join(self.name())
            .join("system")
    }
}
