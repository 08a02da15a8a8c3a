use std::time::Duration;

use colored::*;
use topomap_common::config::Config;
use topomap_common::device::DiscoveredDevice;
use tracing::info;

use crate::mprint;
use crate::terminal::{colors, format, print};

/// Prints the device trees and the closing summary of a walk or sweep.
pub fn discovery_ends(devices: &mut [DiscoveredDevice], total_time: Duration, cfg: &Config) {
    if devices.is_empty() {
        no_devices_found(cfg);
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("Discovered Devices", cfg.quiet);
    devices.sort_by_key(|device| device.ip_address);
    print_devices(devices, cfg);
    print_summary(devices.len(), total_time, cfg);
}

fn no_devices_found(cfg: &Config) {
    print::header("ZERO DEVICES ANSWERED", cfg.quiet);
    print::no_results();
}

fn print_devices(devices: &[DiscoveredDevice], cfg: &Config) {
    if cfg.quiet > 1 {
        return;
    }
    for (idx, device) in devices.iter().enumerate() {
        print_device_tree(device, idx);
        if idx + 1 != devices.len() {
            mprint!();
        }
    }
}

pub fn print_device_tree(device: &DiscoveredDevice, idx: usize) {
    print::tree_head(idx, &device.display_name());
    print::as_tree_one_level(format::device_to_details(device));
}

fn print_summary(device_count: usize, total_time: Duration, cfg: &Config) {
    let active: ColoredString = format!("{device_count} devices").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString =
        format!("Discovery Complete: {active} identified in {total_time}").color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => {
            mprint!();
            info!("{}", output);
        }
    }
}
