//! Link and session acquisition with bounded retries.
//!
//! Both steps are blocking from the caller's point of view and both give up
//! after a fixed attempt count — exhaustion surfaces as a fatal error and
//! recovery is left to a full process restart, which re-runs the same
//! bounded sequence from a clean state.

use std::future::Future;
use std::time::Duration;

use mininode_app::ports::LastWill;
use mininode_domain::error::{LinkError, SessionError};
use mininode_domain::identity::DeviceIdentity;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tracing::{info, warn};

use crate::config::MqttConfig;
use crate::transport::MqttTransport;

/// Request queue depth for the rumqttc client.
const REQUEST_CAPACITY: usize = 64;

/// Upper bound on waiting for one attempt's ConnAck.
const CONNACK_WAIT: Duration = Duration::from_secs(5);

/// Verify the broker is reachable at the TCP level, retrying with fixed
/// backoff.
///
/// # Errors
///
/// Returns [`LinkError::Exhausted`] once every attempt is used up.
pub async fn acquire_link(config: &MqttConfig) -> Result<(), LinkError> {
    let addr = (config.broker_host.as_str(), config.broker_port);
    let mut last = None;
    for attempt in 1..=config.link_retries {
        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => {
                info!(
                    host = %config.broker_host,
                    port = config.broker_port,
                    attempt,
                    "link is up"
                );
                return Ok(());
            }
            Err(err) => {
                warn!(attempt, total = config.link_retries, error = %err, "link attempt failed");
                last = Some(err);
                tokio::time::sleep(Duration::from_millis(config.link_backoff_ms)).await;
            }
        }
    }
    Err(LinkError::Exhausted {
        attempts: config.link_retries,
        last: last.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "no attempts made")
        }),
    })
}

/// Attach a pub/sub session, retrying with fixed backoff. Every attempt
/// builds a fresh client/event-loop pair — failed sessions are never reused
/// — with `last_will` registered so the broker announces the device offline
/// on ungraceful loss.
///
/// # Errors
///
/// Returns [`SessionError::Exhausted`] once every attempt is used up.
pub async fn attach_session(
    config: &MqttConfig,
    identity: &DeviceIdentity,
    last_will: &LastWill,
) -> Result<MqttTransport, SessionError> {
    let (client, event_loop) = retry_attempts(
        config.session_retries,
        Duration::from_millis(config.session_backoff_ms),
        |_| {
            // A new client/event-loop pair every time: failed sessions are
            // never reused.
            let (client, event_loop) = build_session(config, identity, last_will);
            async move {
                let event_loop = await_connack(event_loop).await?;
                Ok((client, event_loop))
            }
        },
    )
    .await?;
    info!(client_id = %identity.client_id(), "session attached");
    Ok(MqttTransport::new(
        client,
        event_loop,
        Duration::from_millis(config.poll_wait_ms),
    ))
}

/// Run `attempt` up to `attempts` times with a fixed backoff between
/// failures. Each invocation starts from scratch; nothing carries over but
/// the last failure reason.
async fn retry_attempts<T, F, Fut>(
    attempts: u32,
    backoff: Duration,
    mut attempt: F,
) -> Result<T, SessionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut reason = String::new();
    for n in 1..=attempts {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(attempt = n, total = attempts, error = %err, "session attempt failed");
                reason = err;
                tokio::time::sleep(backoff).await;
            }
        }
    }
    Err(SessionError::Exhausted { attempts, reason })
}

/// One fresh client/event-loop pair configured with identity, credentials,
/// keep-alive, and the last-will.
fn build_session(
    config: &MqttConfig,
    identity: &DeviceIdentity,
    last_will: &LastWill,
) -> (AsyncClient, EventLoop) {
    let mut options = MqttOptions::new(
        identity.client_id(),
        config.broker_host.clone(),
        config.broker_port,
    );
    options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
    if !config.username.is_empty() {
        options.set_credentials(config.username.clone(), config.password.clone());
    }
    options.set_last_will(rumqttc::LastWill::new(
        last_will.topic.clone(),
        last_will.payload.clone(),
        QoS::AtLeastOnce,
        last_will.retain,
    ));
    AsyncClient::new(options, REQUEST_CAPACITY)
}

/// Drive the event loop until the broker acknowledges the connection.
async fn await_connack(mut event_loop: EventLoop) -> Result<EventLoop, String> {
    let deadline = tokio::time::Instant::now() + CONNACK_WAIT;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return Err("connack never arrived".to_string());
        }
        match tokio::time::timeout(remaining, event_loop.poll()).await {
            Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => return Ok(event_loop),
            Ok(Ok(_)) => {}
            Ok(Err(err)) => return Err(err.to_string()),
            Err(_) => return Err("connack never arrived".to_string()),
        }
    }
}
