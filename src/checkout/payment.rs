use chrono::{Datelike, Utc};

use crate::errors::RestockError;

/// Card expiry split into the month/year sub-fields checkout forms want.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry {
    pub month: String,
    pub year: String,
}

/// Split a raw expiry into month and year: the first two digits are the
/// month, the remainder the year. Two-digit years are normalized to four by
/// prefixing the current century. Separators ("09/25") are ignored.
pub fn split_expiry(raw: &str) -> Result<Expiry, RestockError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 3 {
        return Err(RestockError::Config(format!(
            "expiry `{}` has too few digits",
            raw
        )));
    }

    let month = &digits[..2];
    match month.parse::<u8>() {
        Ok(m) if (1..=12).contains(&m) => {}
        _ => {
            return Err(RestockError::Config(format!(
                "expiry `{}` has invalid month `{}`",
                raw, month
            )))
        }
    }

    let year = &digits[2..];
    let year = match year.len() {
        2 => {
            let century = Utc::now().year() / 100;
            format!("{}{}", century, year)
        }
        4 => year.to_string(),
        _ => {
            return Err(RestockError::Config(format!(
                "expiry `{}` has invalid year `{}`",
                raw, year
            )))
        }
    };

    Ok(Expiry {
        month: month.to_string(),
        year,
    })
}
