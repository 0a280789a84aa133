use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// One `key:value;key:value;` state report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateReport {
    fields: BTreeMap<String, String>,
}

impl StateReport {
    pub fn parse(raw: &str) -> Self {
        let fields = raw
            .trim()
            .split(';')
            .filter_map(|kv| {
                let (k, v) = kv.split_once(':')?;
                let k = k.trim();
                if k.is_empty() {
                    return None;
                }
                Some((k.to_string(), v.trim().to_string()))
            })
            .collect();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn battery(&self) -> Option<u8> {
        self.get("bat")?.parse::<u8>().ok().filter(|b| *b <= 100)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinkStatus {
    pub connected: bool,
    pub peer: Option<SocketAddr>,
    pub last_state: Option<Instant>,
    pub last_reply: Option<String>,
    pub commands_sent: u64,
}

impl LinkStatus {
    pub fn state_age(&self) -> Option<Duration> {
        self.last_state.map(|t| t.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sdk_state_line() {
        let s = StateReport::parse(
            "pitch:0;roll:-1;yaw:12;vgx:0;vgy:0;vgz:0;templ:62;temph:65;tof:10;h:0;bat:87;baro:-42.18;time:0;agx:-3.00;agy:14.00;agz:-998.00;\r\n",
        );
        assert_eq!(s.battery(), Some(87));
        assert_eq!(s.get("yaw"), Some("12"));
        assert_eq!(s.get("baro"), Some("-42.18"));
    }

    #[test]
    fn garbage_has_no_battery() {
        assert!(StateReport::parse("hello").is_empty());
        assert_eq!(StateReport::parse("bat:x;").battery(), None);
        assert_eq!(StateReport::parse("bat:250;").battery(), None);
    }
}
