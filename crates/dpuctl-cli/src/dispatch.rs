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

//! Fans one lifecycle operation out across the selected DPUs, one task per
//! DPU, and collects per-DPU outcomes for reporting.

use std::path::PathBuf;

use dpuctl::{DpuController, DpuIdentity, FsReadinessWatch, PlatformConfig};
use eyre::{WrapErr, bail};
use prettytable::{Table, row};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::error;

use crate::args::{OutputFormat, SelectArgs};

#[derive(Clone, Debug)]
pub enum DpuOperation {
    PowerOn { forced: bool },
    PowerOff { forced: bool },
    Reset,
    Shutdown,
    Startup,
    FwUpgrade { image: PathBuf },
}

impl DpuOperation {
    fn describe(&self) -> &'static str {
        match self {
            Self::PowerOn { .. } => "power on",
            Self::PowerOff { .. } => "power off",
            Self::Reset => "reset",
            Self::Shutdown => "shutdown",
            Self::Startup => "startup",
            Self::FwUpgrade { .. } => "firmware upgrade",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DpuOutcome {
    pub dpu: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolve `--all` or an explicit name list into DPU identities, rejecting
/// unknown names, duplicates, and an empty or contradictory selection.
pub fn validate_selection(
    select: &SelectArgs,
    config: &PlatformConfig,
) -> eyre::Result<Vec<DpuIdentity>> {
    if select.all && !select.dpu_names.is_empty() {
        bail!("--all cannot be combined with explicit DPU names");
    }
    if select.all {
        return Ok((1..=config.dpu_count).map(DpuIdentity::from_hw_index).collect());
    }
    if select.dpu_names.is_empty() {
        bail!("no DPUs selected; pass DPU names or --all");
    }

    let mut targets: Vec<DpuIdentity> = Vec::with_capacity(select.dpu_names.len());
    for name in &select.dpu_names {
        let index: u8 = name
            .strip_prefix("dpu")
            .and_then(|suffix| suffix.parse().ok())
            .filter(|index| (1..=config.dpu_count).contains(index))
            .ok_or_else(|| {
                eyre::eyre!(
                    "unknown DPU {name:?}; expected dpu1..dpu{}",
                    config.dpu_count
                )
            })?;
        if targets.iter().any(|t| t.index() == index) {
            bail!("DPU {name:?} selected twice");
        }
        targets.push(DpuIdentity::from_hw_index(index));
    }
    Ok(targets)
}

/// Run `operation` on every target concurrently. Per-DPU failures land in
/// the outcome list rather than aborting the fleet.
pub async fn run_fleet(
    operation: DpuOperation,
    targets: Vec<DpuIdentity>,
    config: PlatformConfig,
) -> Vec<DpuOutcome> {
    let mut tasks = JoinSet::new();
    for identity in targets {
        let operation = operation.clone();
        let config = config.clone();
        tasks.spawn(async move {
            let controller = DpuController::new(identity, config, FsReadinessWatch);
            let result = match &operation {
                DpuOperation::PowerOn { forced } => controller.power_on(*forced).await,
                DpuOperation::PowerOff { forced } => controller.power_off(*forced).await,
                DpuOperation::Reset => controller.reboot().await,
                DpuOperation::Shutdown => controller.shutdown().await,
                DpuOperation::Startup => controller.startup().await,
                DpuOperation::FwUpgrade { image } => controller.firmware_upgrade(image).await,
            };
            match result {
                Ok(()) => DpuOutcome {
                    dpu: controller.name().to_owned(),
                    success: true,
                    error: None,
                },
                Err(err) => {
                    error!(dpu = controller.name(), operation = operation.describe(), %err);
                    DpuOutcome {
                        dpu: controller.name().to_owned(),
                        success: false,
                        error: Some(err.to_string()),
                    }
                }
            }
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => error!(%err, "DPU task panicked"),
        }
    }
    outcomes.sort_by(|a, b| a.dpu.cmp(&b.dpu));
    outcomes
}

pub fn report(outcomes: &[DpuOutcome], format: OutputFormat) -> eyre::Result<()> {
    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table.add_row(row!["DPU", "RESULT"]);
            for outcome in outcomes {
                let result = match &outcome.error {
                    None => String::from("OK"),
                    Some(error) => format!("FAILED: {error}"),
                };
                table.add_row(row![outcome.dpu, result]);
            }
            table.printstd();
        }
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(outcomes)
                .wrap_err("could not serialize outcomes")?;
            println!("{rendered}");
        }
    }
    Ok(())
}
