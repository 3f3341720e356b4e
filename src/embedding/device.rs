use candle_core::Device;
use tracing::{debug, warn};

/// Picks the compute device for model inference.
///
/// GPU backends are tried in order (Metal, then CUDA) when their feature is
/// compiled in. Any failure falls back to the CPU.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            tracing::info!(backend = "metal", "Using GPU acceleration");
            return device;
        }
        Err(e) => warn!(error = %e, "Metal device unavailable"),
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            tracing::info!(backend = "cuda", "Using GPU acceleration");
            return device;
        }
        Err(e) => warn!(error = %e, "CUDA device unavailable"),
    }

    if cfg!(any(feature = "metal", feature = "cuda")) {
        warn!("Falling back to CPU device");
    } else {
        debug!("No GPU backend compiled, using CPU");
    }
    Device::Cpu
}

/// Short backend name for logs and readiness output.
pub fn device_label(device: &Device) -> &'static str {
    if device.is_cuda() {
        "cuda"
    } else if device.is_metal() {
        "metal"
    } else {
        "cpu"
    }
}
