//! Status responder — read-only device health values plus the two button
//! commands that act on them.

/// Snapshot of the device's health values, published on the status sensors'
/// state topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub uptime_secs: u64,
    pub ip_address: String,
    pub rssi_dbm: i16,
}

impl StatusReport {
    /// Per-entity state payloads: plain strings, not JSON records, matching
    /// what the hub-side sensor definitions expect.
    #[must_use]
    pub fn uptime_payload(&self) -> Vec<u8> {
        self.uptime_secs.to_string().into_bytes()
    }

    #[must_use]
    pub fn ip_payload(&self) -> Vec<u8> {
        self.ip_address.clone().into_bytes()
    }

    #[must_use]
    pub fn rssi_payload(&self) -> Vec<u8> {
        self.rssi_dbm.to_string().into_bytes()
    }

    /// Connectivity binary sensor payload (`1` while the report is fresh).
    #[must_use]
    pub fn online_payload(&self) -> Vec<u8> {
        b"1".to_vec()
    }
}

/// Button commands understood by the status responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCommand {
    /// Re-publish the full status immediately.
    RequestStatus,
    /// Toggle the onboard indicator LED.
    ToggleLed,
}

impl StatusCommand {
    /// Decode a button press payload. The hub publishes the fixed
    /// `payload_press` string announced in the discovery descriptor; anything
    /// else is ignored (`None`).
    #[must_use]
    pub fn parse(payload: &[u8]) -> Option<Self> {
        match payload {
            b"request" => Some(Self::RequestStatus),
            b"toggle" => Some(Self::ToggleLed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_render_plain_string_payloads() {
        let report = StatusReport {
            uptime_secs: 3600,
            ip_address: "192.168.1.42".to_string(),
            rssi_dbm: -61,
        };
        assert_eq!(report.uptime_payload(), b"3600");
        assert_eq!(report.ip_payload(), b"192.168.1.42");
        assert_eq!(report.rssi_payload(), b"-61");
        assert_eq!(report.online_payload(), b"1");
    }

    #[test]
    fn should_parse_known_button_payloads() {
        assert_eq!(
            StatusCommand::parse(b"request"),
            Some(StatusCommand::RequestStatus)
        );
        assert_eq!(
            StatusCommand::parse(b"toggle"),
            Some(StatusCommand::ToggleLed)
        );
    }

    #[test]
    fn should_ignore_unknown_button_payloads() {
        assert_eq!(StatusCommand::parse(b"reboot"), None);
        assert_eq!(StatusCommand::parse(b""), None);
    }
}
