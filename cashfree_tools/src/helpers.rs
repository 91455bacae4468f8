use ble_common::Paisa;

use crate::CashfreeApiError;

/// The payout endpoints express money as decimal-rupee strings, e.g. "142.00".
pub fn parse_rupee_amount(amount: &str) -> Result<Paisa, CashfreeApiError> {
    let (sign, magnitude) = match amount.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, amount),
    };
    let mut parts = magnitude.split('.');
    let rupees = parts
        .next()
        .ok_or_else(|| CashfreeApiError::InvalidCurrencyAmount(amount.to_string()))?
        .parse::<i64>()
        .map_err(|e| CashfreeApiError::InvalidCurrencyAmount(format!("Invalid amount: {amount}. {e}.")))?;
    let paise = match parts.next() {
        None => 0,
        Some(frac) if frac.len() == 1 || frac.len() == 2 => {
            let v = frac
                .parse::<i64>()
                .map_err(|e| CashfreeApiError::InvalidCurrencyAmount(format!("Invalid amount: {amount}. {e}.")))?;
            if frac.len() == 1 {
                10 * v
            } else {
                v
            }
        },
        Some(_) => {
            return Err(CashfreeApiError::InvalidCurrencyAmount(format!(
                "Invalid amount: {amount}. More than two decimal places."
            )))
        },
    };
    if parts.next().is_some() {
        return Err(CashfreeApiError::InvalidCurrencyAmount(amount.to_string()));
    }
    Ok(Paisa::from(sign * (100 * rupees + paise)))
}

/// Formats minor units the way the gateway wants them: plain decimal rupees, two places.
pub fn rupee_string(amount: Paisa) -> String {
    let v = amount.value();
    let sign = if v < 0 { "-" } else { "" };
    let v = v.abs();
    format!("{sign}{}.{:02}", v / 100, v % 100)
}

/// The payment and refund webhooks express money as JSON numbers instead. Rounds to the
/// nearest paisa, so float noise in the payload cannot shift the amount.
pub fn paisa_from_rupee_value(rupees: f64) -> Paisa {
    #[allow(clippy::cast_possible_truncation)]
    Paisa::from((rupees * 100.0).round() as i64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_rupee_strings() {
        assert_eq!(parse_rupee_amount("142.00").unwrap(), Paisa::from(14200));
        assert_eq!(parse_rupee_amount("142.5").unwrap(), Paisa::from(14250));
        assert_eq!(parse_rupee_amount("142").unwrap(), Paisa::from(14200));
        assert_eq!(parse_rupee_amount("0.45").unwrap(), Paisa::from(45));
        assert_eq!(parse_rupee_amount("-50.50").unwrap(), Paisa::from(-5050));
        assert!(parse_rupee_amount("1.234").is_err());
        assert!(parse_rupee_amount("ten").is_err());
        assert!(parse_rupee_amount("1.2.3").is_err());
    }

    #[test]
    fn formats_rupee_strings() {
        assert_eq!(rupee_string(Paisa::from(14200)), "142.00");
        assert_eq!(rupee_string(Paisa::from(45)), "0.45");
        assert_eq!(rupee_string(Paisa::from(-5050)), "-50.50");
    }

    #[test]
    fn converts_webhook_numbers() {
        assert_eq!(paisa_from_rupee_value(142.0), Paisa::from(14200));
        assert_eq!(paisa_from_rupee_value(10.01), Paisa::from(1001));
        assert_eq!(paisa_from_rupee_value(0.1 + 0.2), Paisa::from(30));
    }
}
