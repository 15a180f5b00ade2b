mod luhn;

pub use luhn::{luhn_checksum_is_valid, validate_order_number, OrderNumberError};
