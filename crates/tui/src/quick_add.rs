use engine::{Currency, Money, TransactionKind};

/// Parsed quick-add line.
///
/// Syntax: `[+|-]amount [#category] [@account] [note...]`
///
/// - a leading `+` records an income, anything else an expense
/// - `#tag` names the category (created on first use)
/// - `@tag` names the account; without one the remembered default is used
#[derive(Debug, Clone)]
pub struct QuickAddParsed {
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub category: Option<String>,
    pub account: Option<String>,
    pub note: Option<String>,
}

pub fn parse(input: &str, currency: Currency) -> Result<QuickAddParsed, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Enter an amount.".to_string());
    }

    let (kind, rest) = if let Some(stripped) = trimmed.strip_prefix('+') {
        (TransactionKind::Income, stripped.trim_start())
    } else if let Some(stripped) = trimmed.strip_prefix('-') {
        (TransactionKind::Expense, stripped.trim_start())
    } else {
        (TransactionKind::Expense, trimmed)
    };

    let mut parts = rest.splitn(2, ' ');
    let amount_raw = parts.next().unwrap_or("").trim();
    if amount_raw.is_empty() {
        return Err("Missing amount.".to_string());
    }
    let tail = parts.next().unwrap_or("").trim();

    let amount = Money::parse_major(amount_raw, currency)
        .map_err(|_| "Invalid amount.".to_string())?
        .minor()
        .abs();
    if amount == 0 {
        return Err("Amount must be > 0.".to_string());
    }

    let (category, account, note) = parse_tags(tail)?;

    Ok(QuickAddParsed {
        kind,
        amount_minor: amount,
        category,
        account,
        note,
    })
}

fn parse_tags(tail: &str) -> Result<(Option<String>, Option<String>, Option<String>), String> {
    if tail.is_empty() {
        return Ok((None, None, None));
    }

    let mut category: Option<String> = None;
    let mut account: Option<String> = None;
    let mut kept: Vec<&str> = Vec::new();

    for token in tail.split_whitespace() {
        if let Some(rest) = token.strip_prefix('#') {
            if rest.is_empty() {
                kept.push(token);
                continue;
            }
            if category.is_some() {
                return Err("Too many category tags: max 1.".to_string());
            }
            category = Some(rest.to_string());
        } else if let Some(rest) = token.strip_prefix('@') {
            if rest.is_empty() {
                kept.push(token);
                continue;
            }
            if account.is_some() {
                return Err("Too many account tags: max 1.".to_string());
            }
            account = Some(rest.to_string());
        } else {
            kept.push(token);
        }
    }

    let note = kept.join(" ");
    let note = if note.is_empty() { None } else { Some(note) };
    Ok((category, account, note))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_amount_is_an_expense() {
        let parsed = parse("12,50", Currency::Eur).unwrap();
        assert_eq!(parsed.kind, TransactionKind::Expense);
        assert_eq!(parsed.amount_minor, 1250);
        assert!(parsed.category.is_none());
        assert!(parsed.note.is_none());
    }

    #[test]
    fn plus_prefix_is_an_income_with_tags() {
        let parsed = parse("+1200 #salary @checking January pay", Currency::Eur).unwrap();
        assert_eq!(parsed.kind, TransactionKind::Income);
        assert_eq!(parsed.amount_minor, 120_000);
        assert_eq!(parsed.category.as_deref(), Some("salary"));
        assert_eq!(parsed.account.as_deref(), Some("checking"));
        assert_eq!(parsed.note.as_deref(), Some("January pay"));
    }

    #[test]
    fn rejects_zero_and_duplicate_tags() {
        assert!(parse("0", Currency::Eur).is_err());
        assert!(parse("10 #a #b", Currency::Eur).is_err());
        assert!(parse("10 @a @b", Currency::Eur).is_err());
        assert!(parse("", Currency::Eur).is_err());
    }
}
