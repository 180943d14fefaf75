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

mod args;
mod dispatch;

use clap::Parser;
use dpuctl::PlatformConfig;
use eyre::WrapErr;

use crate::args::{Cli, Cmd};
use crate::dispatch::DpuOperation;

fn init_log() -> eyre::Result<()> {
    use tracing_subscriber::filter::{EnvFilter, LevelFilter};
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, registry};

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    registry()
        .with(fmt::Layer::default().compact().with_writer(std::io::stderr))
        .with(env_filter)
        .try_init()
        .wrap_err("could not install tracing subscriber")
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_log()?;

    let config = PlatformConfig::load(cli.config_file.as_deref())
        .wrap_err("could not load platform config")?;

    let (operation, select) = match cli.cmd {
        Cmd::DpuPowerOn(args) => (DpuOperation::PowerOn { forced: args.force }, args.select),
        Cmd::DpuPowerOff(args) => (DpuOperation::PowerOff { forced: args.force }, args.select),
        Cmd::DpuReset(select) => (DpuOperation::Reset, select),
        Cmd::DpuShutdown(select) => (DpuOperation::Shutdown, select),
        Cmd::DpuStartup(select) => (DpuOperation::Startup, select),
        Cmd::DpuFwUpgrade(args) => (DpuOperation::FwUpgrade { image: args.path }, args.select),
    };

    let targets = dispatch::validate_selection(&select, &config)?;
    let outcomes = dispatch::run_fleet(operation, targets, config).await;
    dispatch::report(&outcomes, cli.format)?;

    if outcomes.iter().any(|outcome| !outcome.success) {
        std::process::exit(1);
    }
    Ok(())
}
