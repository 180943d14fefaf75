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

//! State-machine flow tests driven by the scripted watch. Knob files start
//! empty, so an empty knob after an operation means it was never written.

use super::helpers::{PlatformTree, ScriptedWatch};
use crate::controller::DpuController;
use crate::error::DpuCtlError;
use crate::paths::DpuIdentity;

#[tokio::test]
async fn forced_power_off_is_one_write_and_no_wait() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::default();
    let controller = tree.controller(1, watch.clone());

    controller.power_off(true).await.unwrap();

    assert_eq!(tree.knob("dpu1_pwr_force"), "1");
    assert_eq!(tree.knob("dpu1_rst"), "");
    assert_eq!(tree.knob("dpu1_pwr"), "");
    assert_eq!(watch.wait_count(), 0);
}

#[tokio::test]
async fn graceful_power_off_waits_for_shutdown_ack() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([true]);
    let controller = tree.controller(1, watch.clone());

    controller.power_off(false).await.unwrap();

    assert_eq!(tree.knob("dpu1_rst"), "1");
    assert_eq!(tree.knob("dpu1_pwr"), "1");
    assert_eq!(tree.knob("dpu1_pwr_force"), "");
    assert_eq!(watch.waits(), vec![controller.paths().shutdown_ready_event.clone()]);
}

#[tokio::test]
async fn graceful_power_off_forces_after_shutdown_timeout() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::default();
    let controller = tree.controller(1, watch.clone());

    controller.power_off(false).await.unwrap();

    // Timed-out go-down degrades to a forced cut, then power still drops.
    assert_eq!(tree.knob("dpu1_rst"), "1");
    assert_eq!(tree.knob("dpu1_pwr_force"), "1");
    assert_eq!(tree.knob("dpu1_pwr"), "1");
    assert_eq!(watch.wait_count(), 1);
}

#[tokio::test]
async fn graceful_power_on_success_never_touches_force_knob() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([true]);
    let controller = tree.controller(1, watch.clone());

    controller.power_on(false).await.unwrap();

    assert_eq!(tree.knob("dpu1_pwr"), "0");
    assert_eq!(tree.knob("dpu1_pwr_force"), "");
    assert_eq!(watch.waits(), vec![controller.paths().ready_event.clone()]);
}

#[tokio::test]
async fn graceful_power_on_falls_back_to_forced_with_fresh_budget() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::default();
    let controller = tree.controller(1, watch.clone());

    let err = controller.power_on(false).await.unwrap_err();

    match err {
        DpuCtlError::RetryBudgetExhausted { dpu, attempts } => {
            assert_eq!(dpu, "dpu1");
            assert_eq!(attempts, 4);
        }
        other => panic!("expected RetryBudgetExhausted, got {other:?}"),
    }
    // One graceful wait plus exactly four forced attempts.
    assert_eq!(watch.wait_count(), 5);
    assert_eq!(tree.knob("dpu1_pwr"), "0");
    assert_eq!(tree.knob("dpu1_pwr_force"), "0");
}

#[tokio::test]
async fn forced_power_on_stops_retrying_once_ready() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([false, false, true]);
    let controller = tree.controller(1, watch.clone());

    controller.power_on(true).await.unwrap();

    assert_eq!(watch.wait_count(), 3);
    assert_eq!(tree.knob("dpu1_pwr_force"), "0");
    assert_eq!(tree.knob("dpu1_pwr"), "");
}

#[tokio::test]
async fn forced_power_on_exhausts_budget() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::default();
    let controller = tree.controller(1, watch.clone());

    let err = controller.power_on(true).await.unwrap_err();

    assert!(matches!(err, DpuCtlError::RetryBudgetExhausted { attempts: 4, .. }));
    assert_eq!(watch.wait_count(), 4);
}

#[tokio::test]
async fn reboot_pulses_reset_through_go_down() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([true, true]);
    let controller = tree.controller(1, watch.clone());

    controller.reboot().await.unwrap();

    assert_eq!(tree.knob("dpu1_rst"), "0");
    assert_eq!(tree.knob("dpu1_pwr_force"), "");
    assert_eq!(
        watch.waits(),
        vec![
            controller.paths().shutdown_ready_event.clone(),
            controller.paths().ready_event.clone(),
        ]
    );
}

#[tokio::test]
async fn reboot_recovers_with_forced_power_cycle() {
    let tree = PlatformTree::new();
    // Shutdown ack fires, ready does not, forced power-on then succeeds.
    let watch = ScriptedWatch::with_verdicts([true, false, true]);
    let controller = tree.controller(1, watch.clone());

    controller.reboot().await.unwrap();

    // Forced off wrote "1", forced on wrote "0" afterwards.
    assert_eq!(tree.knob("dpu1_pwr_force"), "0");
    assert_eq!(watch.wait_count(), 3);
}

#[tokio::test]
async fn missing_control_file_aborts_before_any_wait() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([true]);
    // Slot 9 has no knobs created by the daemon.
    let controller = DpuController::new(
        DpuIdentity::from_hw_index(9),
        tree.config.clone(),
        watch.clone(),
    );

    let err = controller.power_off(false).await.unwrap_err();

    assert!(matches!(err, DpuCtlError::ControlFileMissing { .. }));
    assert_eq!(err.dpu(), "dpu9");
    assert_eq!(watch.wait_count(), 0);
}

#[tokio::test]
async fn watch_setup_failure_is_fatal_not_a_timeout() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::failing_setup();
    let controller = tree.controller(1, watch);

    let err = controller.power_off(false).await.unwrap_err();

    assert!(matches!(err, DpuCtlError::WatchSetupFailed { .. }));
    // The go-down signal went out, but power was never dropped.
    assert_eq!(tree.knob("dpu1_rst"), "1");
    assert_eq!(tree.knob("dpu1_pwr"), "");
    assert_eq!(tree.knob("dpu1_pwr_force"), "");
}

#[tokio::test]
async fn shutdown_removes_pci_device_then_powers_off() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([true]);
    let controller = tree.controller(1, watch.clone());
    tree.add_pci_device(controller.identity(), "0000:08:00.0");

    controller.shutdown().await.unwrap();

    assert_eq!(tree.pci_knob("devices/0000:08:00.0/remove"), "1");
    assert_eq!(tree.knob("dpu1_rst"), "1");
    assert_eq!(tree.knob("dpu1_pwr"), "1");
    assert_eq!(watch.waits(), vec![controller.paths().shutdown_ready_event.clone()]);
}

#[tokio::test]
async fn startup_powers_on_then_rescans_bus() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([true]);
    let controller = tree.controller(1, watch);

    controller.startup().await.unwrap();

    assert_eq!(tree.knob("dpu1_pwr"), "0");
    assert_eq!(tree.pci_knob("rescan"), "1");
}

#[tokio::test]
async fn firmware_upgrade_masks_pcie_presence_across_go_down() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([true, true]);
    let controller = tree.controller(1, watch.clone());
    tree.add_pci_device(controller.identity(), "0000:08:00.0");
    let image = tree.path().join("image.bfb");
    std::fs::write(&image, b"bfb").unwrap();

    controller.firmware_upgrade(&image).await.unwrap();

    assert_eq!(tree.pci_knob("devices/0000:08:00.0/remove"), "1");
    assert_eq!(tree.knob("dpu1_perst_en"), "1");
    assert_eq!(tree.pci_knob("rescan"), "1");
    assert_eq!(
        watch.waits(),
        vec![
            controller.paths().shutdown_ready_event.clone(),
            controller.paths().ready_event.clone(),
        ]
    );
}

#[tokio::test]
async fn firmware_upgrade_power_cycles_when_not_ready() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([true, false, true]);
    let controller = tree.controller(1, watch.clone());
    tree.add_pci_device(controller.identity(), "0000:08:00.0");
    let image = tree.path().join("image.bfb");
    std::fs::write(&image, b"bfb").unwrap();

    controller.firmware_upgrade(&image).await.unwrap();

    assert_eq!(tree.knob("dpu1_pwr_force"), "0");
    assert_eq!(tree.pci_knob("rescan"), "1");
    assert_eq!(watch.wait_count(), 3);
}

#[tokio::test]
async fn firmware_upgrade_rejects_missing_image_before_touching_hardware() {
    let tree = PlatformTree::new();
    let watch = ScriptedWatch::with_verdicts([true, true]);
    let controller = tree.controller(1, watch.clone());
    tree.add_pci_device(controller.identity(), "0000:08:00.0");

    let err = controller
        .firmware_upgrade(&tree.path().join("absent.bfb"))
        .await
        .unwrap_err();

    assert!(matches!(err, DpuCtlError::FirmwareBurnFailed { .. }));
    assert_eq!(tree.knob("dpu1_perst_en"), "");
    assert_eq!(tree.pci_knob("devices/0000:08:00.0/remove"), "");
    assert_eq!(watch.wait_count(), 0);
}
