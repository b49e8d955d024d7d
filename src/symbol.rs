use crate::errors::SymbolError;

const MAX_SYMBOL_LEN: usize = 20;

/// Turns a client-supplied pair ("btc", "ethusdt", " Sol ") into the venue
/// symbol: uppercase, ending in the quote asset.
pub fn resolve_symbol(raw: &str, quote: &str) -> Result<String, SymbolError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SymbolError::Missing);
    }

    if trimmed.len() > MAX_SYMBOL_LEN || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SymbolError::Invalid(trimmed.to_string()));
    }

    let mut symbol = trimmed.to_uppercase();
    if !symbol.ends_with(quote) {
        symbol.push_str(quote);
    }

    Ok(symbol)
}
