use thiserror::Error;

/// Version byte plus a 20-byte key hash; the 4-byte checksum is stripped by the decoder.
const ADDRESS_PAYLOAD_LEN: usize = 21;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid address format: {0}")]
    InvalidAddress(String),
}

pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    // Decode base58 and verify the double-SHA256 checksum
    let decoded = match bs58::decode(address).with_check(None).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return Err(ValidationError::InvalidAddress(address.to_string())),
    };

    if decoded.len() != ADDRESS_PAYLOAD_LEN {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }

    Ok(())
}

/// Validates every address and drops duplicates, keeping first-seen order.
pub fn validate_addresses(addresses: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::with_capacity(addresses.len());

    for address in addresses {
        let address = address.trim();
        validate_address(address)?;
        if seen.insert(address.to_string()) {
            unique.push(address.to_string());
        }
    }

    Ok(unique)
}

/// Splits a pipe-delimited address list (`a|b|c`) and validates it.
pub fn parse_address_list(raw: &str) -> Result<Vec<String>, ValidationError> {
    let parts: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();

    if parts.is_empty() {
        return Err(ValidationError::MissingParameter("addresses".to_string()));
    }

    validate_addresses(&parts)
}
