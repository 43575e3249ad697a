//! Local hardware identification.

use std::process::Command;

use anyhow::Context;

const SYSTEM_PROFILER: &str = "/usr/sbin/system_profiler";
const SERIAL_LABEL: &str = "Serial Number (system)";

/// Hardware serial number of this machine, as reported by system_profiler.
pub fn serial_number() -> anyhow::Result<String> {
    let output = Command::new(SYSTEM_PROFILER)
        .arg("SPHardwareDataType")
        .output()
        .with_context(|| format!("Failed to invoke {}", SYSTEM_PROFILER))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "{} exited with {}: {}",
            SYSTEM_PROFILER,
            output.status,
            stderr.trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_serial_number(&stdout)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No '{}' in system_profiler output", SERIAL_LABEL))
}

/// Extract the serial from `system_profiler SPHardwareDataType` output.
pub fn parse_serial_number(output: &str) -> Option<&str> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix(SERIAL_LABEL))
        .and_then(|rest| rest.trim_start().strip_prefix(':'))
        .map(str::trim)
        .filter(|serial| !serial.is_empty())
}
