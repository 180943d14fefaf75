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

//! Error types for DPU control operations.
//!
//! Every variant carries the canonical DPU name so batch callers can
//! attribute failures to the right module.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for per-DPU control operations.
///
/// File and watch-setup errors are fatal and abort the running operation.
/// `ReadinessTimeout` is handled inline by the controller's fallback paths
/// and only reaches callers wrapped in a terminal error such as
/// `RetryBudgetExhausted`.
#[derive(Error, Debug)]
pub enum DpuCtlError {
    #[error("{dpu}: control file {path:?} does not exist")]
    ControlFileMissing { dpu: String, path: PathBuf },

    #[error("{dpu}: failed to write {value:?} to {path:?}: {source}")]
    ControlFileWriteFailed {
        dpu: String,
        path: PathBuf,
        value: String,
        source: std::io::Error,
    },

    #[error("{dpu}: cannot establish watch on {path:?}: {source}")]
    WatchSetupFailed {
        dpu: String,
        path: PathBuf,
        source: notify::Error,
    },

    #[error("{dpu}: timed out waiting for {event} event")]
    ReadinessTimeout { dpu: String, event: &'static str },

    #[error("{dpu}: force power on gave up after {attempts} attempts")]
    RetryBudgetExhausted { dpu: String, attempts: u32 },

    #[error("{dpu}: failed to read {path:?}: {source}")]
    ConfigFileRead {
        dpu: String,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{dpu}: firmware burn failed: {reason}")]
    FirmwareBurnFailed { dpu: String, reason: String },
}

impl DpuCtlError {
    /// The canonical name of the DPU the error belongs to.
    pub fn dpu(&self) -> &str {
        match self {
            Self::ControlFileMissing { dpu, .. }
            | Self::ControlFileWriteFailed { dpu, .. }
            | Self::WatchSetupFailed { dpu, .. }
            | Self::ReadinessTimeout { dpu, .. }
            | Self::RetryBudgetExhausted { dpu, .. }
            | Self::ConfigFileRead { dpu, .. }
            | Self::FirmwareBurnFailed { dpu, .. } => dpu,
        }
    }

    /// Whether the error is a timeout-class condition rather than a fatal
    /// I/O or setup failure.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ReadinessTimeout { .. } | Self::RetryBudgetExhausted { .. }
        )
    }
}
