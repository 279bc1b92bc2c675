//! Shipping address validation.
//!
//! [`AddressForm`] is what a customer types or what the backend returns;
//! [`ShippingAddress`] only exists once every field has been checked, so
//! code holding one never needs to re-validate.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Longest accepted value for any free-text address field.
pub const MAX_FIELD_LENGTH: usize = 200;

/// Country used when none is given.
pub const DEFAULT_COUNTRY: &str = "India";

/// Address form fields, used to point at the failing input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    FullName,
    Line1,
    Line2,
    City,
    State,
    PostalCode,
    Phone,
    Country,
}

impl AddressField {
    /// Form label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullName => "full name",
            Self::Line1 => "address line 1",
            Self::Line2 => "address line 2",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postal code",
            Self::Phone => "phone",
            Self::Country => "country",
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single address validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// A required field is blank.
    #[error("{0} is required")]
    Required(AddressField),
    /// A field exceeds [`MAX_FIELD_LENGTH`].
    #[error("{0} is too long")]
    TooLong(AddressField),
    /// Postal code is not exactly six digits.
    #[error("postal code must be exactly 6 digits")]
    InvalidPostalCode,
    /// Phone is not ten digits starting with 6-9.
    #[error("phone must be 10 digits starting with 6, 7, 8 or 9")]
    InvalidPhone,
}

impl AddressError {
    /// The field the error refers to.
    #[must_use]
    pub const fn field(&self) -> AddressField {
        match self {
            Self::Required(field) | Self::TooLong(field) => *field,
            Self::InvalidPostalCode => AddressField::PostalCode,
            Self::InvalidPhone => AddressField::Phone,
        }
    }
}

/// Six-digit postal index number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Parse a postal code. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidPostalCode`] unless the trimmed input
    /// is exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        if s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(AddressError::InvalidPostalCode)
        }
    }

    /// The digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PostalCode {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ten-digit mobile number matching `^[6-9]\d{9}$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a phone number. Surrounding whitespace is ignored; nothing else
    /// (no spaces, dashes or country prefix) is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidPhone`] if the trimmed input is not ten
    /// ASCII digits with a leading 6, 7, 8 or 9.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        let bytes = s.as_bytes();
        let valid = bytes.len() == 10
            && matches!(bytes.first(), Some(b'6'..=b'9'))
            && bytes.iter().all(u8::is_ascii_digit);
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(AddressError::InvalidPhone)
        }
    }

    /// The digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unvalidated address input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressForm {
    pub full_name: String,
    #[serde(alias = "addressLine1", alias = "street")]
    pub line1: String,
    #[serde(alias = "addressLine2", skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(alias = "pincode", alias = "zipCode")]
    pub postal_code: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl AddressForm {
    /// Validate every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns every [`AddressError`] found, in form order.
    pub fn validate(&self) -> Result<ShippingAddress, Vec<AddressError>> {
        let mut errors = Vec::new();

        let full_name = required(&self.full_name, AddressField::FullName, &mut errors);
        let line1 = required(&self.line1, AddressField::Line1, &mut errors);
        let line2 = self
            .line2
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        if line2.as_ref().is_some_and(|s| s.len() > MAX_FIELD_LENGTH) {
            errors.push(AddressError::TooLong(AddressField::Line2));
        }
        let city = required(&self.city, AddressField::City, &mut errors);
        let state = required(&self.state, AddressField::State, &mut errors);
        let postal_code = PostalCode::parse(&self.postal_code)
            .map_err(|e| errors.push(e))
            .ok();
        let phone = PhoneNumber::parse(&self.phone)
            .map_err(|e| errors.push(e))
            .ok();
        let country = match self.country.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => {
                if c.len() > MAX_FIELD_LENGTH {
                    errors.push(AddressError::TooLong(AddressField::Country));
                }
                c.to_owned()
            }
            _ => DEFAULT_COUNTRY.to_owned(),
        };

        match (postal_code, phone) {
            (Some(postal_code), Some(phone)) if errors.is_empty() => Ok(ShippingAddress {
                full_name,
                line1,
                line2,
                city,
                state,
                postal_code,
                phone,
                country,
            }),
            _ => Err(errors),
        }
    }

    /// Whether the form would validate.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn required(value: &str, field: AddressField, errors: &mut Vec<AddressError>) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.push(AddressError::Required(field));
    } else if value.len() > MAX_FIELD_LENGTH {
        errors.push(AddressError::TooLong(field));
    }
    value.to_owned()
}

/// A fully validated shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: PostalCode,
    pub phone: PhoneNumber,
    pub country: String,
}

impl ShippingAddress {
    /// Single-line rendering for summaries.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.full_name.as_str(), self.line1.as_str()];
        if let Some(line2) = &self.line2 {
            parts.push(line2);
        }
        parts.push(&self.city);
        parts.push(&self.state);
        parts.push(self.postal_code.as_str());
        parts.join(", ")
    }
}

impl From<ShippingAddress> for AddressForm {
    fn from(address: ShippingAddress) -> Self {
        Self {
            full_name: address.full_name,
            line1: address.line1,
            line2: address.line2,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code.into(),
            phone: address.phone.into(),
            country: Some(address.country),
        }
    }
}
