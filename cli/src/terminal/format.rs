use colored::*;
use topomap_common::device::{DeviceMetrics, DiscoveredDevice};

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

const DESCRIPTION_WIDTH: usize = 44;

/// Tree rows for one device. Counters the agent did not report are omitted.
pub fn device_to_details(device: &DiscoveredDevice) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        (
            "IPv4".to_string(),
            device.ip_address.to_string().color(colors::IPV4_ADDR),
        ),
        ("OS".to_string(), device.os_family.to_string().normal()),
    ];

    if !device.up_time.is_empty() {
        details.push(("Uptime".to_string(), uptime_to_human(&device.up_time).normal()));
    }

    if !device.sys_description.is_empty() {
        details.push((
            "Descr".to_string(),
            truncate(&device.sys_description, DESCRIPTION_WIDTH).color(colors::MUTED),
        ));
    }

    details.extend(metrics_to_details(&device.metrics));
    details
}

fn metrics_to_details(metrics: &DeviceMetrics) -> Vec<Detail> {
    let mut details = Vec::new();

    if let Some(cpu) = metrics.cpu_usage_percent() {
        details.push(("CPU".to_string(), format!("{cpu}%").color(colors::METRIC)));
    }
    if let Some(idle) = metrics.cpu_idle_percent() {
        details.push(("Idle".to_string(), format!("{idle}%").color(colors::METRIC)));
    }
    if let Some(total) = metrics.mem_total_kb() {
        let value = match metrics.mem_free_kb() {
            Some(free) => format!("{} free of {}", kib_to_human(free), kib_to_human(total)),
            None => kib_to_human(total),
        };
        details.push(("Memory".to_string(), value.color(colors::METRIC)));
    }
    if let Some(count) = metrics.process_count() {
        details.push(("Procs".to_string(), count.to_string().color(colors::METRIC)));
    }

    details
}

/// sysUpTime counts hundredths of a second. Unparsable values pass through.
pub fn uptime_to_human(raw: &str) -> String {
    let Ok(ticks) = raw.trim().parse::<u64>() else {
        return raw.to_string();
    };

    let secs = ticks / 100;
    let (days, hours, mins) = (secs / 86_400, (secs % 86_400) / 3_600, (secs % 3_600) / 60);

    match (days, hours) {
        (0, 0) => format!("{mins}m {}s", secs % 60),
        (0, _) => format!("{hours}h {mins}m"),
        _ => format!("{days}d {hours}h {mins}m"),
    }
}

pub fn kib_to_human(kib: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    let mut value = kib as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{kib} {}", UNITS[0])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// First line of `text`, cut to `width` characters.
pub fn truncate(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or("").trim();
    if line.chars().count() <= width {
        return line.to_string();
    }
    let cut: String = line.chars().take(width.saturating_sub(1)).collect();
    format!("{cut}…")
}
