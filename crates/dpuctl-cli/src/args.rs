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

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[clap(name = "dpuctl", version, about = "Control smart switch DPU power and lifecycle")]
pub struct Cli {
    #[clap(long, env = "DPUCTL_CONFIG", help = "Path to a TOML platform config")]
    pub config_file: Option<PathBuf>,

    #[clap(long, value_enum, default_value_t = OutputFormat::Table, help = "Result output format")]
    pub format: OutputFormat,

    #[clap(subcommand)]
    pub cmd: Cmd,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    #[clap(about = "Power on DPUs and wait for them to become ready")]
    DpuPowerOn(PowerArgs),
    #[clap(about = "Power off DPUs")]
    DpuPowerOff(PowerArgs),
    #[clap(about = "Reboot DPUs through the reset line")]
    DpuReset(SelectArgs),
    #[clap(about = "Detach DPUs from the host and power them off")]
    DpuShutdown(SelectArgs),
    #[clap(about = "Power on DPUs and reattach them to the host")]
    DpuStartup(SelectArgs),
    #[clap(about = "Burn a firmware image and cycle DPUs into it")]
    DpuFwUpgrade(FwUpgradeArgs),
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    #[clap(long, help = "Run on every DPU slot")]
    pub all: bool,

    #[clap(value_delimiter = ',', help = "DPU names, comma separated (dpu1,dpu2)")]
    pub dpu_names: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PowerArgs {
    #[clap(flatten)]
    pub select: SelectArgs,

    #[clap(long, short, help = "Skip the graceful handshake")]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct FwUpgradeArgs {
    #[clap(flatten)]
    pub select: SelectArgs,

    #[clap(long, help = "Path to the firmware image")]
    pub path: PathBuf,
}
