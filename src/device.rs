use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::TranscriberConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accelerator {
    Cuda,
    Cpu,
}

impl Accelerator {
    pub fn device(&self) -> &'static str {
        match self {
            Accelerator::Cuda => "cuda",
            Accelerator::Cpu => "cpu",
        }
    }

    pub fn compute_type(&self) -> &'static str {
        match self {
            Accelerator::Cuda => "float16",
            Accelerator::Cpu => "int8",
        }
    }
}

/// Probe for a CUDA device by running `<probe> -L` (nvidia-smi lists GPUs with `-L`).
pub async fn detect_accelerator(probe: &str) -> Accelerator {
    let output = Command::new(probe)
        .arg("-L")
        .stdin(Stdio::null())
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() && !output.stdout.trim_ascii().is_empty() => {
            debug!("GPU probe output: {}", String::from_utf8_lossy(&output.stdout).trim());
            Accelerator::Cuda
        }
        Ok(output) => {
            debug!("GPU probe {} exited with {}", probe, output.status);
            Accelerator::Cpu
        }
        Err(e) => {
            debug!("GPU probe {} unavailable: {}", probe, e);
            Accelerator::Cpu
        }
    }
}

/// Fill in `device` and `compute_type` when the user left them unset.
/// An explicit device decides the compute type without probing.
pub async fn resolve_device_settings(config: &mut TranscriberConfig) {
    if config.device.is_some() && config.compute_type.is_some() {
        return;
    }

    let accelerator = match config.device.as_deref() {
        Some(device) if device.starts_with("cuda") => Accelerator::Cuda,
        Some(_) => Accelerator::Cpu,
        None => detect_accelerator(&config.gpu_probe).await,
    };

    if config.device.is_none() {
        config.device = Some(accelerator.device().to_string());
    }
    if config.compute_type.is_none() {
        config.compute_type = Some(accelerator.compute_type().to_string());
    }

    info!(
        "Using device {} with compute type {}",
        config.device.as_deref().unwrap_or_default(),
        config.compute_type.as_deref().unwrap_or_default()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_probe_means_cpu() {
        let accelerator = detect_accelerator("/nonexistent/subgenx-gpu-probe").await;
        assert_eq!(accelerator, Accelerator::Cpu);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_listed_gpu_selects_cuda() {
        // `echo -L` succeeds and prints a non-empty line, like nvidia-smi with a GPU
        assert_eq!(detect_accelerator("echo").await, Accelerator::Cuda);

        let mut config = TranscriberConfig {
            gpu_probe: "echo".to_string(),
            ..Default::default()
        };
        resolve_device_settings(&mut config).await;

        assert_eq!(config.device.as_deref(), Some("cuda"));
        assert_eq!(config.compute_type.as_deref(), Some("float16"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_gpu_listing_means_cpu() {
        // `true` exits 0 without output
        assert_eq!(detect_accelerator("true").await, Accelerator::Cpu);
    }

    #[tokio::test]
    async fn test_explicit_settings_are_kept() {
        let mut config = TranscriberConfig {
            device: Some("cuda:1".to_string()),
            compute_type: Some("float32".to_string()),
            gpu_probe: "/nonexistent/subgenx-gpu-probe".to_string(),
            ..Default::default()
        };
        resolve_device_settings(&mut config).await;

        assert_eq!(config.device.as_deref(), Some("cuda:1"));
        assert_eq!(config.compute_type.as_deref(), Some("float32"));
    }

    #[tokio::test]
    async fn test_compute_type_follows_explicit_device() {
        let mut config = TranscriberConfig {
            device: Some("cuda".to_string()),
            gpu_probe: "/nonexistent/subgenx-gpu-probe".to_string(),
            ..Default::default()
        };
        resolve_device_settings(&mut config).await;
        assert_eq!(config.compute_type.as_deref(), Some("float16"));

        let mut config = TranscriberConfig {
            device: Some("cpu".to_string()),
            ..Default::default()
        };
        resolve_device_settings(&mut config).await;
        assert_eq!(config.compute_type.as_deref(), Some("int8"));
    }

    #[tokio::test]
    async fn test_undetected_gpu_falls_back_to_cpu() {
        let mut config = TranscriberConfig {
            gpu_probe: "/nonexistent/subgenx-gpu-probe".to_string(),
            ..Default::default()
        };
        resolve_device_settings(&mut config).await;

        assert_eq!(config.device.as_deref(), Some("cpu"));
        assert_eq!(config.compute_type.as_deref(), Some("int8"));
    }
}
