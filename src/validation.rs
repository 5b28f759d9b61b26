// 📐 Shape Layer - Voter field validation
// Checks the raw strings of a registration before they reach the model.
// Every field is checked; all failures are reported together.

use serde::{Deserialize, Serialize};

// ============================================================================
// LIMITS
// ============================================================================

pub const PHONE_NUMBER_LENGTH: usize = 10;
pub const UNIQUE_ID_LENGTH: usize = 9;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 50;
pub const MIN_ADDRESS_LENGTH: usize = 5;
pub const MAX_ADDRESS_LENGTH: usize = 500;
pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 120;

// ============================================================================
// FIELD ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

pub type FieldResult = Result<(), Vec<FieldError>>;

// ============================================================================
// REGISTRATION INPUT
// ============================================================================

/// Raw registration fields exactly as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRegistration {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub unique_id: String,
    pub age: String,
}

impl VoterRegistration {
    pub fn new(
        first_name: &str,
        last_name: &str,
        phone: &str,
        address: &str,
        unique_id: &str,
        age: &str,
    ) -> Self {
        VoterRegistration {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone: phone.to_string(),
            address: address.to_string(),
            unique_id: unique_id.to_string(),
            age: age.to_string(),
        }
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// Validate every registration field, collecting all failures
pub fn validate_voter_input(input: &VoterRegistration) -> FieldResult {
    let errors: Vec<FieldError> = [
        validate_name(&input.first_name, "first_name", "First name"),
        validate_name(&input.last_name, "last_name", "Last name"),
        validate_phone_number(&input.phone),
        validate_address(&input.address),
        validate_unique_id(&input.unique_id),
        validate_age(&input.age),
    ]
    .into_iter()
    .flatten()
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Names: 2-50 characters, letters and spaces only
pub fn validate_name(name: &str, field: &str, label: &str) -> Option<FieldError> {
    let name = name.trim();
    let length = name.chars().count();

    if name.is_empty() {
        return Some(FieldError::new(field, format!("{} cannot be empty.", label)));
    }
    if length < MIN_NAME_LENGTH {
        return Some(FieldError::new(
            field,
            format!("{} must be at least {} characters long.", label, MIN_NAME_LENGTH),
        ));
    }
    if length > MAX_NAME_LENGTH {
        return Some(FieldError::new(
            field,
            format!("{} must not exceed {} characters.", label, MAX_NAME_LENGTH),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Some(FieldError::new(
            field,
            format!("{} must contain only alphabetic characters and spaces.", label),
        ));
    }

    None
}

pub fn validate_phone_number(phone: &str) -> Option<FieldError> {
    validate_digits(phone, "phone", "Phone number", PHONE_NUMBER_LENGTH)
}

pub fn validate_unique_id(id: &str) -> Option<FieldError> {
    validate_digits(id, "unique_id", "Unique ID", UNIQUE_ID_LENGTH)
}

fn validate_digits(value: &str, field: &str, label: &str, length: usize) -> Option<FieldError> {
    let value = value.trim();

    if value.is_empty() {
        return Some(FieldError::new(field, format!("{} cannot be empty.", label)));
    }
    if value.chars().count() != length {
        return Some(FieldError::new(
            field,
            format!("{} must be exactly {} digits long.", label, length),
        ));
    }
    if !is_all_digits(value) {
        return Some(FieldError::new(
            field,
            format!("{} must contain only numeric digits.", label),
        ));
    }

    None
}

/// Address: 5-500 characters, any content
pub fn validate_address(address: &str) -> Option<FieldError> {
    let address = address.trim();
    let length = address.chars().count();

    if address.is_empty() {
        return Some(FieldError::new("address", "Address cannot be empty."));
    }
    if length < MIN_ADDRESS_LENGTH {
        return Some(FieldError::new(
            "address",
            format!("Address must be at least {} characters long.", MIN_ADDRESS_LENGTH),
        ));
    }
    if length > MAX_ADDRESS_LENGTH {
        return Some(FieldError::new(
            "address",
            format!("Address must not exceed {} characters.", MAX_ADDRESS_LENGTH),
        ));
    }

    None
}

/// Age: digits only, 18-120 inclusive
pub fn validate_age(age: &str) -> Option<FieldError> {
    let age = age.trim();

    if age.is_empty() {
        return Some(FieldError::new("age", "Age cannot be empty."));
    }
    if !is_all_digits(age) {
        return Some(FieldError::new("age", "Age must be a valid number (digits only)."));
    }

    match age.parse::<u32>() {
        Ok(value) if value < MIN_AGE => Some(FieldError::new(
            "age",
            format!("You must be at least {} years old to register.", MIN_AGE),
        )),
        Ok(value) if value > MAX_AGE => Some(FieldError::new(
            "age",
            format!("Age must not exceed {} years.", MAX_AGE),
        )),
        Ok(_) => None,
        Err(_) => Some(FieldError::new("age", "Age is too large.")),
    }
}

fn is_all_digits(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit())
}

// ============================================================================
// TESTS
// ============================================================================
