//! Transaction events and their wire form.
//!
//! RULE: The serialized field names are a fixed external contract.
//! Downstream consumers key on `credit_card_number`, `receiver`,
//! `amount`, `ip_address` and `timestamp`. Never rename them.

use crate::types::CardNumber;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;

/// Money with cent precision. Serialized as a JSON number with at
/// most two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        if !raw.is_finite() || raw < 0.0 {
            return Err(serde::de::Error::custom(format!("invalid amount {raw}")));
        }
        Ok(Self((raw * 100.0).round() as u64))
    }
}

/// `YYYY-MM-DDTHH:MM:SS`, UTC, no zone suffix. Sub-second precision
/// of the virtual clock is truncated on the wire.
pub mod wire_timestamp {
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}

/// One card transaction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    #[serde(rename = "credit_card_number")]
    pub card_number: CardNumber,
    pub receiver:    String,
    pub amount:      Amount,
    pub ip_address:  Ipv4Addr,
    #[serde(with = "wire_timestamp")]
    pub timestamp:   NaiveDateTime,
}

impl TransactionEvent {
    /// The transport ordering key: the card number.
    pub fn ordering_key(&self) -> &str {
        &self.card_number
    }

    pub fn to_wire_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Where an event sits in its scenario. Log-only, never on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepTag {
    Normal,
    CharityDrip,
    CharityLargePurchase,
    MicroDrip1,
    MicroDrip2,
    DoubleDripLargePurchase,
}

impl StepTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal                  => "NORMAL",
            Self::CharityDrip             => "FRAUD_SCENARIO_1_CHARITY_DRIP",
            Self::CharityLargePurchase    => "FRAUD_SCENARIO_1_LARGE_PURCHASE",
            Self::MicroDrip1              => "FRAUD_SCENARIO_2_MICRO_DRIP_1",
            Self::MicroDrip2              => "FRAUD_SCENARIO_2_MICRO_DRIP_2",
            Self::DoubleDripLargePurchase => "FRAUD_SCENARIO_2_LARGE_PURCHASE",
        }
    }

    pub fn is_fraud(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for StepTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEvent {
    pub tag:   StepTag,
    pub event: TransactionEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> TransactionEvent {
        TransactionEvent {
            card_number: "4200123412341234".into(),
            receiver:    "Best Buy".into(),
            amount:      Amount::from_cents(250_075),
            ip_address:  Ipv4Addr::new(10, 0, 0, 7),
            timestamp:   NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_milli_opt(14, 2, 9, 870)
                .unwrap(),
        }
    }

    #[test]
    fn wire_payload_uses_contract_field_names() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_wire_json().unwrap()).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["amount", "credit_card_number", "ip_address", "receiver", "timestamp"]);
        assert_eq!(obj["credit_card_number"], "4200123412341234");
        assert_eq!(obj["amount"], 2500.75);
        assert_eq!(obj["ip_address"], "10.0.0.7");
        assert_eq!(obj["timestamp"], "2024-03-05T14:02:09");
    }

    #[test]
    fn amount_display_pads_cents() {
        assert_eq!(Amount::from_cents(100).to_string(), "1.00");
        assert_eq!(Amount::from_cents(50_005).to_string(), "500.05");
    }

    #[test]
    fn amount_parses_back_to_cents() {
        let a: Amount = serde_json::from_str("19.99").unwrap();
        assert_eq!(a.cents(), 1_999);
        assert!(serde_json::from_str::<Amount>("-1.0").is_err());
    }

    #[test]
    fn only_normal_tag_is_benign() {
        assert!(!StepTag::Normal.is_fraud());
        assert!(StepTag::MicroDrip2.is_fraud());
        assert_eq!(StepTag::CharityDrip.to_string(), "FRAUD_SCENARIO_1_CHARITY_DRIP");
    }
}
