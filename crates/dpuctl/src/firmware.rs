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

//! Firmware image burning through the platform's external installer tool.

use std::path::Path;

use tracing::info;

use crate::error::DpuCtlError;

/// Burn a firmware image onto the DPU's rshim device by invoking the
/// configured installer (`<tool> -b <image> -r rshim{N}`). The image must
/// exist up front; a missing image or a non-zero installer exit is reported
/// as [`DpuCtlError::FirmwareBurnFailed`].
pub async fn burn(dpu: &str, index: u8, tool: &str, image: &Path) -> Result<(), DpuCtlError> {
    if !image.is_file() {
        return Err(DpuCtlError::FirmwareBurnFailed {
            dpu: dpu.to_owned(),
            reason: format!("image {} does not exist", image.display()),
        });
    }

    let rshim = format!("rshim{index}");
    info!(dpu, tool, rshim, image = %image.display(), "burning firmware");
    let output = tokio::process::Command::new(tool)
        .arg("-b")
        .arg(image)
        .arg("-r")
        .arg(&rshim)
        .output()
        .await
        .map_err(|err| DpuCtlError::FirmwareBurnFailed {
            dpu: dpu.to_owned(),
            reason: format!("failed to run {tool}: {err}"),
        })?;

    if !output.status.success() {
        return Err(DpuCtlError::FirmwareBurnFailed {
            dpu: dpu.to_owned(),
            reason: format!(
                "{tool} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(())
}
