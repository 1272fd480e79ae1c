//! Test and helper mocks for pinlink_core

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pinlink_traits::{DeviceLink, Endpoint, LinkError};

use crate::util::lock;

/// One scripted answer.
#[derive(Debug, Clone)]
pub struct Reply {
    delay: Duration,
    result: Result<String, LinkError>,
}

impl Reply {
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(body.into()),
        }
    }

    pub fn fail(error: LinkError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    /// Timeout failure carrying the deadline the caller asked for.
    pub fn timeout() -> Self {
        Self::fail(LinkError::Timeout(Duration::ZERO))
    }

    /// Answer only after `delay` (tokio time, so paused-clock tests stay instant).
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct Script {
    handshake: VecDeque<Reply>,
    heartbeat: VecDeque<Reply>,
    state: VecDeque<Reply>,
    calls: Vec<(Endpoint, Option<Duration>)>,
}

/// Link answering from per-endpoint queues. Exhausted queues fail with a
/// network error. Clones share the script and the call log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLink {
    script: Arc<Mutex<Script>>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_handshake(&self, reply: Reply) -> &Self {
        lock(&self.script).handshake.push_back(reply);
        self
    }

    pub fn push_heartbeat(&self, reply: Reply) -> &Self {
        lock(&self.script).heartbeat.push_back(reply);
        self
    }

    pub fn push_state(&self, reply: Reply) -> &Self {
        lock(&self.script).state.push_back(reply);
        self
    }

    /// Every request made so far, with the timeout it carried.
    pub fn calls(&self) -> Vec<(Endpoint, Option<Duration>)> {
        lock(&self.script).calls.clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        lock(&self.script)
            .calls
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .count()
    }
}

impl DeviceLink for ScriptedLink {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        timeout: Option<Duration>,
    ) -> Result<String, LinkError> {
        let reply = {
            let mut s = lock(&self.script);
            s.calls.push((endpoint, timeout));
            let queue = match endpoint {
                Endpoint::Handshake => &mut s.handshake,
                Endpoint::Heartbeat => &mut s.heartbeat,
                Endpoint::State(_) => &mut s.state,
            };
            queue.pop_front()
        };
        let Some(reply) = reply else {
            return Err(LinkError::Network("script exhausted".into()));
        };
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        match reply.result {
            Err(LinkError::Timeout(d)) if d.is_zero() => {
                Err(LinkError::Timeout(timeout.unwrap_or_default()))
            }
            other => other,
        }
    }
}
