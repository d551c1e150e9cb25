// Utility helpers

use crate::chain::Address;

/// "1", "true", "yes" and "on" (any case) enable a flag.
pub fn parse_env_flag(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
}

pub fn is_env_flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .map(|v| parse_env_flag(&v))
        .unwrap_or(false)
}

/// Shortens an address for display; an empty seat reads "Waiting...".
pub fn format_address(address: &Address) -> String {
    if address.is_zero() {
        return "Waiting...".to_string();
    }
    let text = address.to_string();
    format!("{}...{}", &text[..6], &text[text.len() - 4..])
}

pub fn now_unix() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_flag_accepts_common_truthy_values() {
        assert!(parse_env_flag("TRUE"));
        assert!(parse_env_flag(" on "));
        assert!(!parse_env_flag("0"));
        assert!(!parse_env_flag(""));
    }

    #[test]
    fn format_address_keeps_head_and_tail() {
        let address = Address([7u8; 32]);
        let full = address.to_string();
        let short = format_address(&address);
        assert_eq!(short, format!("{}...{}", &full[..6], &full[54..]));
        assert_eq!(format_address(&Address::ZERO), "Waiting...");
    }
}
