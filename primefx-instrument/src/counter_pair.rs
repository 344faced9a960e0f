use smol_str::SmolStr;

/// Identify the auxiliary "counter pair" instrument used to convert a
/// traded symbol's P&L into the account's base currency (spec.md §4.4).
///
/// The mapping table is the one given in spec.md: only the combinations it
/// names are resolved; everything else returns `None`, meaning no
/// conversion instrument is known for that (account currency, symbol) pair.
/// This is deliberately narrow rather than guessed — see `DESIGN.md`.
pub fn counter_pair(symbol: &str, account_currency: &str) -> Option<SmolStr> {
    let (base, quote) = symbol.split_once('/')?;

    match account_currency {
        "EUR" => {
            if quote == "USD" {
                Some(SmolStr::new("EUR/USD"))
            } else if base == "USD" && matches!(quote, "CAD" | "CHF" | "JPY") {
                Some(SmolStr::new(format!("EUR/{quote}")))
            } else {
                None
            }
        }
        "USD" => Some(SmolStr::new("EUR/USD")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eur_account_xxx_usd_uses_eur_usd() {
        assert_eq!(counter_pair("GBP/USD", "EUR").as_deref(), Some("EUR/USD"));
        assert_eq!(counter_pair("EUR/USD", "EUR").as_deref(), Some("EUR/USD"));
    }

    #[test]
    fn eur_account_usd_base_pairs_use_eur_quote() {
        assert_eq!(counter_pair("USD/CAD", "EUR").as_deref(), Some("EUR/CAD"));
        assert_eq!(counter_pair("USD/CHF", "EUR").as_deref(), Some("EUR/CHF"));
        assert_eq!(counter_pair("USD/JPY", "EUR").as_deref(), Some("EUR/JPY"));
    }

    #[test]
    fn usd_account_always_uses_eur_usd() {
        assert_eq!(counter_pair("USD/JPY", "USD").as_deref(), Some("EUR/USD"));
        assert_eq!(counter_pair("GBP/USD", "USD").as_deref(), Some("EUR/USD"));
    }

    #[test]
    fn unmapped_combination_returns_none() {
        assert_eq!(counter_pair("EUR/GBP", "GBP"), None);
    }
}
