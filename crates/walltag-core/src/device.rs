//! Compute device selection for ONNX Runtime sessions.
//!
//! A [`Device`] maps to the list of execution providers registered at session
//! build time. Registration is best-effort: when a provider is not available
//! on the host, ONNX Runtime logs a warning and falls back to CPU, which
//! gives "accelerator if available, else CPU" without probing the hardware
//! ourselves.

use ort::ep::{CoreML, CUDA, ExecutionProviderDispatch};
use serde::{Deserialize, Serialize};

/// Compute device strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Try accelerators in preference order, fall back to CPU
    #[default]
    Auto,
    /// CPU only
    Cpu,
    /// NVIDIA CUDA
    Cuda,
    /// Apple CoreML
    CoreMl,
}

impl Device {
    /// Execution providers to register for this device, in preference order.
    ///
    /// An empty list means ONNX Runtime's default CPU provider.
    pub fn execution_providers(&self) -> Vec<ExecutionProviderDispatch> {
        match self {
            Device::Auto => vec![CUDA::default().build(), CoreML::default().build()],
            Device::Cpu => Vec::new(),
            Device::Cuda => vec![CUDA::default().build()],
            Device::CoreMl => vec![CoreML::default().build()],
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Auto => write!(f, "auto"),
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
            Device::CoreMl => write!(f, "coreml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_auto() {
        assert_eq!(Device::default(), Device::Auto);
    }

    #[test]
    fn test_serde_lowercase_names() {
        #[derive(Deserialize)]
        struct Holder {
            device: Device,
        }
        let h: Holder = toml::from_str("device = \"coreml\"").unwrap();
        assert_eq!(h.device, Device::CoreMl);
        let h: Holder = toml::from_str("device = \"auto\"").unwrap();
        assert_eq!(h.device, Device::Auto);
    }

    #[test]
    fn test_cpu_registers_no_providers() {
        assert!(Device::Cpu.execution_providers().is_empty());
    }

    #[test]
    fn test_auto_prefers_accelerators() {
        assert_eq!(Device::Auto.execution_providers().len(), 2);
    }

    #[test]
    fn test_display_matches_serde() {
        assert_eq!(Device::CoreMl.to_string(), "coreml");
        assert_eq!(Device::Cuda.to_string(), "cuda");
    }
}
