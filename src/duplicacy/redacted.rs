//! Credentials read from the configuration file.
//!
//! `RedactedString` keeps the SMTP password out of the run log, console
//! output and any re-serialized configuration.

use bon::Builder;
use derive_more::From;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use std::result;
use validator::Validate;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub static REDACTED_SECRET: &str = "###REDACTED_SECRET###";

/// Secret text, zeroed when dropped. Formatting and serializing always yield
/// [`REDACTED_SECRET`]; only [`RedactedString::expose`] returns the value.
#[derive(Validate, Clone, Zeroize, ZeroizeOnDrop, From, Builder, PartialEq, Eq)]
pub struct RedactedString {
    #[validate(length(min = 1))]
    #[builder(into)]
    inner: String,
}

impl RedactedString {
    pub fn expose(&self) -> &str {
        &self.inner
    }
}

impl Debug for RedactedString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(REDACTED_SECRET)
    }
}

impl Display for RedactedString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(REDACTED_SECRET)
    }
}

impl Serialize for RedactedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> result::Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED_SECRET)
    }
}

impl<'de> Deserialize<'de> for RedactedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}
