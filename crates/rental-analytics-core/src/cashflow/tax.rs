use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::types::Money;

lazy_static! {
    static ref TAX_AMOUNT: Regex = Regex::new(r"\$?([\d,]+(?:\.\d+)?)").unwrap();
}

/// Pull the first dollar-amount-looking numeral out of free-form tax text.
/// The extracted figure is treated as an annual amount by callers.
/// Returns None when nothing parseable is present.
pub fn parse_annual_tax(raw: &str) -> Option<Money> {
    let captures = TAX_AMOUNT.captures(raw)?;
    let digits = captures.get(1)?.as_str().replace(',', "");
    digits.parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parses_plain_and_formatted_amounts() {
        assert_eq!(parse_annual_tax("$4,800 / Annually"), Some(dec!(4800)));
        assert_eq!(parse_annual_tax("4812.50"), Some(dec!(4812.50)));
        assert_eq!(
            parse_annual_tax("Taxes were about $3,912 last year"),
            Some(dec!(3912))
        );
    }

    #[test]
    fn test_first_numeral_wins() {
        assert_eq!(parse_annual_tax("$1,200 + $300 special"), Some(dec!(1200)));
    }

    #[test]
    fn test_unparsable_text_yields_none() {
        assert_eq!(parse_annual_tax("call county assessor"), None);
        assert_eq!(parse_annual_tax(""), None);
        assert_eq!(parse_annual_tax(",,,"), None);
    }
}
