use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(display("'{raw}' is not a valid {id_type}: {source}"))]
pub struct InvalidIdError {
    id_type: &'static str,
    raw: String,
    source: ParseIntError,
}

// Server ids are plain integer primary keys; the wrappers keep image and video ids apart.
macro_rules! define_record_id {
    ($name:ident, $id_type:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub fn parse(raw: &str) -> Result<Self, InvalidIdError> {
                let parsed = raw.trim().parse::<i64>().context(InvalidIdSnafu {
                    id_type: $id_type,
                    raw: raw.to_string(),
                })?;
                Ok(Self(parsed))
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, formatter)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self::new(value)
            }
        }

        impl FromStr for $name {
            type Err = InvalidIdError;

            fn from_str(raw: &str) -> Result<Self, InvalidIdError> {
                Self::parse(raw)
            }
        }
    };
}

define_record_id!(ImageId, "image id");
define_record_id!(VideoId, "video id");
