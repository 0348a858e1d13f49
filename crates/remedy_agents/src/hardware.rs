//! Hardware agent for camera, GPIO, I2C and SPI failures on single-board
//! computers.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use remedy_core::{ErrorCategory, ErrorReport, FixResult, HostInfo, ACTION_DIAGNOSTIC};
use remedy_runner::CommandRunner;

use crate::traits::RemediationAgent;

mod fixes {
    pub const CAMERA_NOT_FOUND: &str =
        "Check camera ribbon cable connection and enable camera in raspi-config";
    pub const CAMERA_BUSY: &str =
        "Another process is using the camera. Kill it with: sudo pkill -f libcamera";
    pub const CAMERA_PERMISSION: &str = "Add user to video group: sudo usermod -a -G video $USER";
    pub const CAMERA_MMAL: &str =
        "Legacy camera. Enable legacy camera in raspi-config or use libcamera";
    pub const CAMERA_GENERIC: &str = "Check camera connection: 1) Power off Pi, 2) Reseat ribbon cable, 3) Enable camera in raspi-config";

    pub const GPIO_PERMISSION: &str =
        "Run with sudo or add user to gpio group: sudo usermod -a -G gpio $USER";
    pub const GPIO_BUSY: &str = "GPIO pin already in use. Check for conflicting processes.";
    pub const GPIO_NOT_FOUND: &str =
        "Check if running on Raspberry Pi. GPIO not available on other systems.";

    pub const I2C_NOT_FOUND: &str =
        "Enable I2C in raspi-config: sudo raspi-config -> Interface Options -> I2C";
    pub const I2C_PERMISSION: &str = "Add user to i2c group: sudo usermod -a -G i2c $USER";
    pub const I2C_NO_DEVICE: &str = "Check I2C device address with: i2cdetect -y 1";
    pub const I2C_GENERIC: &str = "Check I2C wiring and device address";

    pub const SPI_NOT_FOUND: &str =
        "Enable SPI in raspi-config: sudo raspi-config -> Interface Options -> SPI";
    pub const SPI_PERMISSION: &str = "Add user to spi group: sudo usermod -a -G spi $USER";
    pub const SPI_GENERIC: &str = "Check SPI wiring and enable SPI in raspi-config";

    pub const DEVICE_NOT_FOUND: &str = "Device not detected. Check physical connection and power.";
    pub const DEVICE_BUSY: &str = "Device in use by another process. Check running processes.";
    pub const DEVICE_PERMISSION: &str =
        "Permission denied. Run with sudo or add user to appropriate group.";
    pub const DEVICE_GENERIC: &str = "Check device connection, power, and drivers";

    pub const GENERIC: &str = "Check hardware connections and ensure drivers are installed";
}

const CAMERA_KEYWORDS: &[&str] = &["camera", "libcamera", "picamera", "mmal"];

const CAMERA_KILL_COMMANDS: &[&str] = &[
    "sudo pkill -f libcamera",
    "sudo pkill -f raspistill",
    "sudo pkill -f raspivid",
    "sudo pkill -f picamera",
];

/// Checks run on a Raspberry Pi when a fix needs a human: (label, command).
const PI_HOST_CHECKS: &[(&str, &str)] = &[
    ("I2C devices", "ls /dev/i2c* 2>&1 || echo 'I2C not enabled'"),
    ("SPI devices", "ls /dev/spidev* 2>&1 || echo 'SPI not enabled'"),
    ("GPIO", "ls /dev/gpiomem 2>&1 || echo 'GPIO not available'"),
];

const CAMERA_CHECK: &str = "libcamera-hello --list-cameras 2>&1 || echo 'libcamera not available'";
const CAMERA_CHECK_CHARS: usize = 200;

fn has_any(error: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| error.contains(n))
}

fn is_busy(error: &str) -> bool {
    has_any(error, &["busy", "in use"])
}

/// Agent for hardware errors.
pub struct HardwareAgent {
    runner: Arc<dyn CommandRunner>,
    host: HostInfo,
}

impl HardwareAgent {
    pub fn new(runner: Arc<dyn CommandRunner>, host: HostInfo) -> Self {
        Self { runner, host }
    }

    fn camera_fix(error: &str) -> &'static str {
        if has_any(error, &["not found", "no cameras"]) {
            fixes::CAMERA_NOT_FOUND
        } else if is_busy(error) {
            fixes::CAMERA_BUSY
        } else if has_any(error, &["permission", "access"]) {
            fixes::CAMERA_PERMISSION
        } else if error.contains("mmal") {
            fixes::CAMERA_MMAL
        } else {
            fixes::CAMERA_GENERIC
        }
    }

    fn gpio_fix(error: &str) -> &'static str {
        if has_any(error, &["permission", "access"]) {
            fixes::GPIO_PERMISSION
        } else if is_busy(error) {
            fixes::GPIO_BUSY
        } else {
            fixes::GPIO_NOT_FOUND
        }
    }

    fn i2c_fix(error: &str) -> &'static str {
        if has_any(error, &["no such file", "not found"]) {
            fixes::I2C_NOT_FOUND
        } else if error.contains("permission") {
            fixes::I2C_PERMISSION
        } else if has_any(error, &["no device", "no ack"]) {
            fixes::I2C_NO_DEVICE
        } else {
            fixes::I2C_GENERIC
        }
    }

    fn spi_fix(error: &str) -> &'static str {
        if has_any(error, &["no such file", "not found"]) {
            fixes::SPI_NOT_FOUND
        } else if error.contains("permission") {
            fixes::SPI_PERMISSION
        } else {
            fixes::SPI_GENERIC
        }
    }

    fn device_fix(error: &str) -> &'static str {
        if has_any(error, &["not found", "no such"]) {
            fixes::DEVICE_NOT_FOUND
        } else if error.contains("busy") {
            fixes::DEVICE_BUSY
        } else if error.contains("permission") {
            fixes::DEVICE_PERMISSION
        } else {
            fixes::DEVICE_GENERIC
        }
    }

    async fn kill_camera_processes(&self) -> FixResult {
        let mut killed = Vec::new();
        for command in CAMERA_KILL_COMMANDS {
            if self.runner.run(command).await.success {
                killed.push(*command);
            }
        }

        if killed.is_empty() {
            FixResult::failed(
                "Attempted to kill camera processes",
                "No camera processes found to kill",
            )
        } else {
            info!("Freed camera with {} command(s)", killed.len());
            FixResult::succeeded(
                format!("Killed camera processes: {}", killed.join(", ")),
                "Camera should now be available",
            )
        }
    }

    /// Host check report attached to manual-intervention results.
    pub async fn diagnostics(&self) -> String {
        if !self.host.is_raspberry_pi {
            return "WARNING: Not running on Raspberry Pi\nHardware features require Raspberry Pi"
                .to_string();
        }

        let mut lines = vec![match &self.host.model {
            Some(model) => format!("Running on Raspberry Pi ({})", model),
            None => "Running on Raspberry Pi".to_string(),
        }];

        let camera = self.runner.run(CAMERA_CHECK).await;
        let excerpt: String = camera.output.chars().take(CAMERA_CHECK_CHARS).collect();
        lines.push(format!("\nCamera check:\n{}", excerpt));

        for (label, command) in PI_HOST_CHECKS {
            let outcome = self.runner.run(command).await;
            debug!("Host check '{}' success={}", command, outcome.success);
            lines.push(format!("\n{}: {}", label, outcome.trimmed()));
        }

        lines.join("\n")
    }
}

#[async_trait]
impl RemediationAgent for HardwareAgent {
    fn name(&self) -> &'static str {
        "HardwareAgent"
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Hardware
    }

    fn suggest_fix(&self, report: &ErrorReport) -> String {
        let error = report.raw_message().to_lowercase();

        let fix = if has_any(&error, CAMERA_KEYWORDS) {
            Self::camera_fix(&error)
        } else if error.contains("gpio") {
            Self::gpio_fix(&error)
        } else if error.contains("i2c") {
            Self::i2c_fix(&error)
        } else if error.contains("spi") {
            Self::spi_fix(&error)
        } else if error.contains("device") {
            Self::device_fix(&error)
        } else {
            fixes::GENERIC
        };
        fix.to_string()
    }

    fn can_auto_fix(&self, report: &ErrorReport) -> bool {
        is_busy(&report.raw_message().to_lowercase())
    }

    async fn execute_fix(&self, report: &ErrorReport) -> FixResult {
        let error = report.raw_message().to_lowercase();

        if error.contains("camera") && is_busy(&error) {
            return self.kill_camera_processes().await;
        }

        if error.contains("gpio") && error.contains("busy") {
            return FixResult::failed(
                ACTION_DIAGNOSTIC,
                "GPIO conflict requires identifying and stopping the conflicting process",
            );
        }

        let suggestion = self.suggest_fix(report);
        let diagnostics = self.diagnostics().await;
        FixResult::failed(ACTION_DIAGNOSTIC, "Manual hardware intervention may be required")
            .with_output(format!("Suggestion: {}\n\nDiagnostics:\n{}", suggestion, diagnostics))
    }

    /// Host facts captured when the agent was built.
    fn system_info(&self) -> Option<HostInfo> {
        Some(self.host.clone())
    }
}
