use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Device list is empty.")]
    EmptyList,

    #[error("Invalid device id '{0}'. Expected a non-negative integer.")]
    InvalidDevice(String),

    #[error("Invalid device range '{0}'. Expected 'start-end' with start <= end (e.g., '0-3').")]
    InvalidRange(String),

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidKeyValue(String),
}

fn parse_device(token: &str) -> Result<u32, ParseError> {
    token
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidDevice(token.trim().to_string()))
}

/// Parses a GPU device list such as `0,1,2,3`, `0-3` or `0-1,4,6-7`.
///
/// Ranges are inclusive. Order is preserved because devices map to processes
/// by position.
pub fn parse_device_list(list: &str) -> Result<Vec<u32>, ParseError> {
    if list.trim().is_empty() {
        return Err(ParseError::EmptyList);
    }
    let mut devices = Vec::new();
    for item in list.split(',') {
        let item = item.trim();
        if item.is_empty() {
            return Err(ParseError::InvalidDevice(item.to_string()));
        }
        match item.split_once('-') {
            Some((start, end)) => {
                let start = parse_device(start).map_err(|_| ParseError::InvalidRange(item.into()))?;
                let end = parse_device(end).map_err(|_| ParseError::InvalidRange(item.into()))?;
                if start > end {
                    return Err(ParseError::InvalidRange(item.to_string()));
                }
                devices.extend(start..=end);
            }
            None => devices.push(parse_device(item)?),
        }
    }
    Ok(devices)
}

/// Splits a `KEY=VALUE` override into its parts.
pub fn parse_key_value(pair: &str) -> Result<(&str, &str), ParseError> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidKeyValue(pair.to_string())),
    }
}
