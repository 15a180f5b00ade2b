use std::{fmt::Display, str::FromStr};

/// Parse a numeric setting. Missing values yield `Ok(None)`; values that are present but unparseable are returned
/// as an error message so that the caller can decide how loudly to complain.
pub fn parse_number<T>(value: Option<String>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        None => Ok(None),
        Some(v) => v.trim().parse::<T>().map(Some).map_err(|e| format!("'{v}' is not a valid value. {e}")),
    }
}
