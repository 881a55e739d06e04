//! Object marshaling adapters.
//!
//! Text form goes through `Display`/`FromStr`, binary form through serde and
//! bincode, JSON form through serde and serde_json.

use crate::encoding::value::decode_string;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// Marshals an object into its textual form.
pub fn marshal_text<T: Display + ?Sized>(obj: &T) -> Vec<u8> {
    obj.to_string().into_bytes()
}

/// Parses an object from its textual form.
pub fn unmarshal_text<T>(bytes: &[u8]) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let text = decode_string(bytes)?;
    text.parse::<T>()
        .map_err(|err| Error::Unmarshal(format!("text: {}", err)))
}

/// Marshals an object into its binary form.
pub fn marshal_binary<T: Serialize + ?Sized>(obj: &T) -> Result<Vec<u8>> {
    bincode::serialize(obj).map_err(|err| Error::Marshal(format!("binary: {}", err)))
}

/// Decodes an object from its binary form.
pub fn unmarshal_binary<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|err| Error::Unmarshal(format!("binary: {}", err)))
}

/// Marshals an object into JSON.
pub fn marshal_json<T: Serialize + ?Sized>(obj: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(obj).map_err(|err| Error::Marshal(format!("json: {}", err)))
}

/// Decodes an object from JSON.
pub fn unmarshal_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|err| Error::Unmarshal(format!("json: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::net::Ipv4Addr;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Account {
        name: String,
        balance: i64,
    }

    #[test]
    fn test_text_form() {
        let addr = Ipv4Addr::new(10, 0, 0, 1);
        assert_eq!(marshal_text(&addr), b"10.0.0.1".to_vec());
        assert_eq!(unmarshal_text::<Ipv4Addr>(b"10.0.0.1").unwrap(), addr);
        assert!(matches!(
            unmarshal_text::<Ipv4Addr>(b"not an address"),
            Err(Error::Unmarshal(_))
        ));
    }

    #[test]
    fn test_binary_form() {
        assert_eq!(marshal_binary(&7u32).unwrap(), vec![7, 0, 0, 0]);

        let account = Account {
            name: "alice".to_string(),
            balance: -5,
        };
        let bytes = marshal_binary(&account).unwrap();
        assert_eq!(unmarshal_binary::<Account>(&bytes).unwrap(), account);
        assert!(matches!(
            unmarshal_binary::<Account>(&[1, 2]),
            Err(Error::Unmarshal(_))
        ));
    }

    #[test]
    fn test_json_form() {
        let account = Account {
            name: "bob".to_string(),
            balance: 12,
        };
        let bytes = marshal_json(&account).unwrap();
        assert_eq!(bytes, br#"{"name":"bob","balance":12}"#.to_vec());
        assert_eq!(unmarshal_json::<Account>(&bytes).unwrap(), account);
    }

    #[test]
    fn test_json_marshal_failure() {
        // JSON object keys must be strings.
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        assert!(matches!(marshal_json(&map), Err(Error::Marshal(_))));
    }
}
