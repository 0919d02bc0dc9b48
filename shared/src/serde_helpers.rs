//! Common serde helpers
//!
//! Reservation times travel as `"HH:MM"` strings. The database stores a
//! `TIME` column and chrono's default serde format includes seconds, so the
//! models route the field through [`hhmm`].

use serde::{Deserialize, Deserializer, Serializer};

/// `NaiveTime` serialized as `"HH:MM"`; deserialization also accepts
/// `"HH:MM:SS"` so records echoed back by older clients still parse.
pub mod hhmm {
    use super::*;
    use chrono::NaiveTime;

    pub fn serialize<S>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|_| serde::de::Error::custom(format!("invalid time: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "super::hhmm")]
        at: NaiveTime,
    }

    #[test]
    fn test_hhmm_serializes_without_seconds() {
        let slot = Slot {
            at: NaiveTime::from_hms_opt(18, 5, 0).unwrap(),
        };
        assert_eq!(serde_json::to_string(&slot).unwrap(), r#"{"at":"18:05"}"#);
    }

    #[test]
    fn test_hhmm_accepts_seconds() {
        let slot: Slot = serde_json::from_str(r#"{"at":"18:05:00"}"#).unwrap();
        assert_eq!(slot.at, NaiveTime::from_hms_opt(18, 5, 0).unwrap());
    }

    #[test]
    fn test_hhmm_rejects_garbage() {
        assert!(serde_json::from_str::<Slot>(r#"{"at":"six pm"}"#).is_err());
    }
}
