//! Merchant name extraction from raw bank descriptions

/// Processor prefixes stripped from the front of a description, in order
const PREFIXES: &[&str] = &["DEBIT CARD PURCHASE", "POS", "PAYMENT TO", "TRANSFER TO"];

/// Anything after these is store numbers, locations or reference codes
const SEPARATORS: &[&str] = &[" - ", " #", " *", "  "];

const MAX_MERCHANT_LEN: usize = 30;

/// Reduce a bank description to a merchant name
///
/// "DEBIT CARD PURCHASE STARBUCKS #1234" becomes "STARBUCKS".
pub fn extract_merchant_name(description: &str) -> String {
    let mut name = description.trim().to_uppercase();

    for prefix in PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest.trim().to_string();
        }
    }

    for separator in SEPARATORS {
        if let Some(idx) = name.find(separator) {
            name.truncate(idx);
        }
    }

    let name: String = name.chars().take(MAX_MERCHANT_LEN).collect();
    let name = name.trim();

    if name.is_empty() {
        "Unknown Merchant".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_description() {
        assert_eq!(extract_merchant_name("amazon.com"), "AMAZON.COM");
        assert_eq!(
            extract_merchant_name("  Safeway Groceries "),
            "SAFEWAY GROCERIES"
        );
    }

    #[test]
    fn test_strips_prefixes() {
        assert_eq!(
            extract_merchant_name("DEBIT CARD PURCHASE STARBUCKS #1234"),
            "STARBUCKS"
        );
        assert_eq!(extract_merchant_name("POS SHELL OIL - 5521"), "SHELL OIL");
        assert_eq!(extract_merchant_name("Payment to Landlord LLC"), "LANDLORD LLC");
        assert_eq!(extract_merchant_name("TRANSFER TO SAVINGS"), "SAVINGS");
    }

    #[test]
    fn test_splits_on_separators() {
        assert_eq!(extract_merchant_name("UBER *TRIP HELP.UBER.COM"), "UBER");
        assert_eq!(extract_merchant_name("TARGET  00012345 SEATTLE"), "TARGET");
        assert_eq!(extract_merchant_name("WALMART - STORE 42"), "WALMART");
    }

    #[test]
    fn test_truncates_long_names() {
        let long = "THE EXTREMELY LONG MERCHANT NAME THAT NEVER ENDS";
        let name = extract_merchant_name(long);
        assert_eq!(name.chars().count(), 30);
        assert_eq!(name, "THE EXTREMELY LONG MERCHANT NA");
    }

    #[test]
    fn test_truncation_trims_trailing_space() {
        // The 30th character is a space
        let name = extract_merchant_name("ABCDEFGHIJKLMNOPQRSTUVWXYZABC DEF");
        assert_eq!(name, "ABCDEFGHIJKLMNOPQRSTUVWXYZABC");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(extract_merchant_name(""), "Unknown Merchant");
        assert_eq!(extract_merchant_name("POS"), "Unknown Merchant");
        assert_eq!(extract_merchant_name("   "), "Unknown Merchant");
    }
}
