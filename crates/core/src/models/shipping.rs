use serde::{Deserialize, Serialize};

/// Delivery details collected on the shipping form.
///
/// Persisted on its own key; the cart store never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    /// Six-digit Indian postal code
    pub pincode: String,
}

/// A field of `ShippingInfo` that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingField {
    Name,
    Phone,
    Address,
    City,
    Pincode,
}

impl std::fmt::Display for ShippingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShippingField::Name => write!(f, "name"),
            ShippingField::Phone => write!(f, "phone"),
            ShippingField::Address => write!(f, "address"),
            ShippingField::City => write!(f, "city"),
            ShippingField::Pincode => write!(f, "pincode"),
        }
    }
}

/// One validation failure, with the message shown under the form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingFieldError {
    pub field: ShippingField,
    pub message: String,
}

impl ShippingFieldError {
    fn new(field: ShippingField, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for ShippingFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

const PHONE_DIGITS: usize = 10;
const PINCODE_DIGITS: usize = 6;

impl ShippingInfo {
    /// Check every required field. Returns all failures in form order;
    /// an empty vector means the form can be submitted.
    ///
    /// The phone number may contain spaces, dashes or a `+`; only its digits
    /// are counted. The pincode must be exactly six digits with nothing else.
    #[must_use]
    pub fn validate(&self) -> Vec<ShippingFieldError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(ShippingFieldError::new(ShippingField::Name, "Name is required"));
        }

        if self.phone.trim().is_empty() {
            errors.push(ShippingFieldError::new(
                ShippingField::Phone,
                "Phone number is required",
            ));
        } else if self.phone_digits().len() != PHONE_DIGITS {
            errors.push(ShippingFieldError::new(
                ShippingField::Phone,
                "Please enter a valid 10-digit phone number",
            ));
        }

        if self.address.trim().is_empty() {
            errors.push(ShippingFieldError::new(
                ShippingField::Address,
                "Address is required",
            ));
        }

        if self.city.trim().is_empty() {
            errors.push(ShippingFieldError::new(ShippingField::City, "City is required"));
        }

        if self.pincode.trim().is_empty() {
            errors.push(ShippingFieldError::new(
                ShippingField::Pincode,
                "Pincode is required",
            ));
        } else if self.pincode.len() != PINCODE_DIGITS
            || !self.pincode.chars().all(|c| c.is_ascii_digit())
        {
            errors.push(ShippingFieldError::new(
                ShippingField::Pincode,
                "Please enter a valid 6-digit pincode",
            ));
        }

        errors
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// The phone number with every non-digit stripped.
    #[must_use]
    pub fn phone_digits(&self) -> String {
        self.phone.chars().filter(char::is_ascii_digit).collect()
    }
}
