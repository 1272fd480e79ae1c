use std::sync::{Arc, Mutex};
use std::time::Duration;

use pinlink_traits::{DeviceLink, Endpoint, LinkError, PinState};

/// Readiness marker the simulated firmware puts in its bodies.
pub const SIM_SENTINEL: &str = "DEVICE_ONLINE";

#[derive(Debug, Default)]
struct SimDevice {
    boot_attempts: u32,
    handshakes: u32,
    ready: bool,
    pin: Option<PinState>,
    offline: bool,
}

impl SimDevice {
    fn answer(&mut self, endpoint: Endpoint) -> Result<String, LinkError> {
        if self.offline {
            return Err(LinkError::Network("simulated device unreachable".into()));
        }
        match endpoint {
            Endpoint::Handshake => {
                self.handshakes = self.handshakes.saturating_add(1);
                self.ready |= self.handshakes > self.boot_attempts;
                if self.ready {
                    Ok(format!("{SIM_SENTINEL} ready"))
                } else {
                    Ok(format!("booting ({}/{})", self.handshakes, self.boot_attempts))
                }
            }
            Endpoint::Heartbeat if self.ready => Ok(format!("{SIM_SENTINEL}\n")),
            Endpoint::Heartbeat => Ok("booting".into()),
            Endpoint::State(s) => {
                self.pin = Some(s);
                Ok(format!("OK {s}"))
            }
        }
    }
}

/// In-process stand-in for the device firmware.
///
/// Reports `booting (n/N)` for the first `boot_attempts` handshakes, then
/// `DEVICE_ONLINE ready`; heartbeats report ready from then on. With zero
/// boot attempts the device is ready from the start. Cloning shares the device.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLink {
    device: Arc<Mutex<SimDevice>>,
}

impl SimulatedLink {
    pub fn new(boot_attempts: u32) -> Self {
        Self {
            device: Arc::new(Mutex::new(SimDevice {
                boot_attempts,
                ready: boot_attempts == 0,
                ..SimDevice::default()
            })),
        }
    }

    /// Like `new`, honoring `PINLINK_SIM_OFFLINE=1` to make every request fail.
    pub fn from_env(boot_attempts: u32) -> Self {
        let sim = Self::new(boot_attempts);
        if std::env::var("PINLINK_SIM_OFFLINE").is_ok_and(|v| v == "1") {
            sim.set_offline(true);
        }
        sim
    }

    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut d) = self.device.lock() {
            d.offline = offline;
        }
    }

    /// Pin level last requested by a state command.
    pub fn pin(&self) -> Option<PinState> {
        self.device.lock().ok().and_then(|d| d.pin)
    }

    pub fn handshakes(&self) -> u32 {
        self.device.lock().map(|d| d.handshakes).unwrap_or(0)
    }
}

impl DeviceLink for SimulatedLink {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        _timeout: Option<Duration>,
    ) -> Result<String, LinkError> {
        let answer = match self.device.lock() {
            Ok(mut d) => d.answer(endpoint),
            Err(_) => Err(LinkError::Network("simulated device poisoned".into())),
        };
        tracing::trace!(?endpoint, ok = answer.is_ok(), "simulated request");
        answer
    }
}
