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

//! Power and lifecycle control for pluggable DPU modules on a smart switch.
//!
//! The hardware-management daemon exposes per-DPU control knobs (reset, power,
//! forced power, PCIe presence) as pre-existing files under its `system`
//! directory, and signals firmware state transitions by touching event files
//! under its `events` directory. This crate drives those knobs and waits on
//! those events to implement the power-on, power-off, reboot, shutdown,
//! startup and firmware-upgrade flows for a single DPU.
//!
//! The entry point is [`DpuController`]; callers that fan out over several
//! DPUs run one controller per DPU in its own task. The readiness wait is
//! abstracted behind the [`ReadinessWatch`] trait so the state machines can be
//! tested without real hardware timing.

#![warn(clippy::all)]

pub mod config;
pub mod controller;
pub mod error;
pub mod firmware;
pub mod module;
pub mod paths;
pub mod pci;
pub mod sysfs;
pub mod watch;

#[cfg(test)]
mod test;

pub use config::PlatformConfig;
pub use controller::DpuController;
pub use error::DpuCtlError;
pub use module::{DpuModule, OperStatus, RebootCause};
pub use paths::{ControlPaths, DpuIdentity};
pub use watch::{FsReadinessWatch, ReadinessWatch};
