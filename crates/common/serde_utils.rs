use serde::{Deserialize, Deserializer, Serializer, de::Error};

pub mod u256 {
    use super::*;
    use ethereum_types::U256;

    pub mod dec_str {
        use super::*;
        pub fn deserialize<'de, D>(d: D) -> Result<U256, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = String::deserialize(d)?;
            U256::from_dec_str(&value).map_err(|e| D::Error::custom(e.to_string()))
        }

        pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&value.to_string())
        }
    }

    pub fn deser_hex_or_dec_str<'de, D>(d: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(d)?;
        if value.starts_with("0x") {
            U256::from_str_radix(value.trim_start_matches("0x"), 16)
                .map_err(|_| D::Error::custom("Failed to deserialize u256 value"))
        } else {
            U256::from_dec_str(&value).map_err(|e| D::Error::custom(e.to_string()))
        }
    }
}

pub mod u64 {
    use super::*;

    /// Test definitions write integers either as JSON numbers or as strings.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrStr {
        Number(u64),
        Str(String),
    }

    fn parse_str<E: Error>(value: &str) -> Result<u64, E> {
        if let Some(hex) = value.strip_prefix("0x") {
            u64::from_str_radix(hex, 16)
                .map_err(|_| E::custom("Failed to deserialize u64 value"))
        } else {
            value
                .parse()
                .map_err(|_| E::custom("Failed to deserialize u64 value"))
        }
    }

    pub fn deser_number_or_str<'de, D>(d: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match NumberOrStr::deserialize(d)? {
            NumberOrStr::Number(value) => Ok(value),
            NumberOrStr::Str(value) => parse_str(&value),
        }
    }

    pub mod opt {
        use super::*;

        pub fn deser_number_or_str<'de, D>(d: D) -> Result<Option<u64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<NumberOrStr>::deserialize(d)? {
                None => Ok(None),
                Some(NumberOrStr::Number(value)) => Ok(Some(value)),
                Some(NumberOrStr::Str(value)) => parse_str(&value).map(Some),
            }
        }
    }
}

pub mod bytes {
    use ::bytes::Bytes;

    use super::*;

    pub fn deserialize<'de, D>(d: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(d)?;
        let bytes = hex::decode(value.trim_start_matches("0x"))
            .map_err(|e| D::Error::custom(e.to_string()))?;
        Ok(Bytes::from(bytes))
    }

    pub fn serialize<S>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{value:x}"))
    }
}
