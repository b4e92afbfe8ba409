use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ANONYMOUS_PRINCIPAL;
use crate::error::IdentityError;

// User identity = textual principal issued by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Parse a textual principal: lowercase alphanumeric groups separated by
    /// single dashes.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        let text = text.trim();
        let well_formed = !text.is_empty()
            && text
                .split('-')
                .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        if !well_formed {
            return Err(IdentityError::InvalidPrincipal(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Principal {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }
}

/// A dating profile as exchanged with the backend.
///
/// `id` is assigned by the backend from the caller identity on save; the
/// client submits the anonymous principal there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Principal,
    pub display_name: String,
    pub age: u32,
    pub bio: String,
    pub gender: Gender,
    pub interested_in: Gender,
    pub location_text: String,
    /// Ordered photo references, at most five.
    pub photos: Vec<String>,
}

/// A direct message. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub from: Principal,
    pub to: Principal,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Saved payment method metadata. Whether a record is the default is not a
/// field here: it is decided by comparing `id` against the separately
/// fetched default pointer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub nickname: String,
    pub last4: String,
    pub brand: String,
    /// `MM/YYYY`
    pub expiry: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodInput {
    pub nickname: String,
    pub last4: String,
    pub brand: String,
    pub expiry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardBrand {
    Visa,
    Mastercard,
    AmericanExpress,
    Discover,
    Other,
}

impl CardBrand {
    pub const ALL: [CardBrand; 5] = [
        CardBrand::Visa,
        CardBrand::Mastercard,
        CardBrand::AmericanExpress,
        CardBrand::Discover,
        CardBrand::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::AmericanExpress => "American Express",
            CardBrand::Discover => "Discover",
            CardBrand::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == label)
    }
}

impl std::fmt::Display for CardBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_parse() {
        let p = Principal::parse("rrkah-fqaaa-aaaaa-aaaaq-cai").unwrap();
        assert_eq!(p.as_str(), "rrkah-fqaaa-aaaaa-aaaaq-cai");
        assert_eq!(p.short(), "rrkah-fq");
        assert!(!p.is_anonymous());
        assert!(Principal::anonymous().is_anonymous());
    }

    #[test]
    fn test_principal_parse_rejects_malformed() {
        assert!(Principal::parse("").is_err());
        assert!(Principal::parse("abc--def").is_err());
        assert!(Principal::parse("-abc").is_err());
        assert!(Principal::parse("ABC-def").is_err());
        assert!(Principal::parse("abc def").is_err());
    }

    #[test]
    fn test_profile_wire_shape() {
        let profile = Profile {
            id: Principal::anonymous(),
            display_name: "Ada".into(),
            age: 30,
            bio: String::new(),
            gender: Gender::Female,
            interested_in: Gender::Other,
            location_text: "Paris".into(),
            photos: vec!["/a.png".into()],
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["displayName"], "Ada");
        assert_eq!(json["interestedIn"], "other");
        assert_eq!(json["id"], "2vxsx-fae");
    }

    #[test]
    fn test_card_brand_labels() {
        assert_eq!(CardBrand::from_label("American Express"), Some(CardBrand::AmericanExpress));
        assert_eq!(CardBrand::from_label("amex"), None);
    }
}
