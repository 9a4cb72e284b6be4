use chrono::{TimeZone, Utc};

pub fn current_timestamp() -> i64 {
  Utc::now().timestamp()
}

// The content store serves publishedAt as RFC 3339 strings,
// our own database stores unix seconds. The DTOs convert so
// both read paths look the same to clients.
pub fn timestamp_to_rfc3339(timestamp: i64) -> String {
  Utc.timestamp(timestamp, 0).to_rfc3339()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamp_formats_as_rfc3339() {
    let timestamp: i64 = 1615150740;
    assert_eq!("2021-03-07T20:59:00+00:00", timestamp_to_rfc3339(timestamp));
  }
}
