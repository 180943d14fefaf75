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

//! Raw reads and writes against the hardware-management file surface.
//!
//! Control files are created by the hardware-management daemon, never by us.
//! Writing to a knob that does not exist yet is a caller error, not something
//! to paper over with `create`, so the write path checks existence first and
//! opens without `O_CREAT`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::DpuCtlError;

/// Write a literal signal value (typically `"0"` or `"1"`) to an existing
/// control file. Fails with [`DpuCtlError::ControlFileMissing`] before any
/// side effect if the file is absent. No retries; retry policy belongs to
/// the caller.
pub fn write_signal(dpu: &str, path: &Path, value: &str) -> Result<(), DpuCtlError> {
    if !path.is_file() {
        return Err(DpuCtlError::ControlFileMissing {
            dpu: dpu.to_owned(),
            path: path.to_path_buf(),
        });
    }

    let write = || -> std::io::Result<()> {
        let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
        file.write_all(value.as_bytes())
    };

    write().map_err(|source| {
        tracing::error!(dpu, path = %path.display(), value, "failed to write control file");
        DpuCtlError::ControlFileWriteFailed {
            dpu: dpu.to_owned(),
            path: path.to_path_buf(),
            value: value.to_owned(),
            source,
        }
    })
}

/// Read a config file as trimmed text (e.g. the PCI bus id).
pub fn read_text(dpu: &str, path: &Path) -> Result<String, DpuCtlError> {
    std::fs::read_to_string(path)
        .map(|text| text.trim().to_owned())
        .map_err(|source| DpuCtlError::ConfigFileRead {
            dpu: dpu.to_owned(),
            path: path.to_path_buf(),
            source,
        })
}

/// Read a `"0"`/`"1"` flag file. A missing or unreadable file reads as unset;
/// status classification treats absence of a signal as "not signaled".
pub fn read_flag(path: &Path) -> bool {
    std::fs::read_to_string(path)
        .map(|text| text.trim() == "1")
        .unwrap_or(false)
}
