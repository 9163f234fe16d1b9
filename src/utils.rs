use chrono::NaiveDate;

/// Rendering used for dates written back out to CSV.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rendering used for upload timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MONTH_NAMES: [(&str, &str); 12] = [
    ("jan", "january"),
    ("feb", "february"),
    ("mar", "march"),
    ("apr", "april"),
    ("may", "may"),
    ("jun", "june"),
    ("jul", "july"),
    ("aug", "august"),
    ("sep", "september"),
    ("oct", "october"),
    ("nov", "november"),
    ("dec", "december"),
];

/// Parses a calendar date, reading ambiguous numeric forms day first.
///
/// Accepted shapes:
/// - `DD/MM/YYYY`, `DD-MM-YYYY`, `DD.MM.YYYY` and their two-digit-year forms
/// - `YYYY-MM-DD` (ISO, year first when the leading field has four digits)
/// - `D-Mon-YYYY`, `D Mon YY`, `D-Month-YYYY` as exported by Tally
///
/// Whatever follows the third field after a space or `T` is a time of day
/// and is ignored (`2024-04-03T10:15`, `03/04/2024 10:15 AM`).
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let parts = date_fields(raw.trim())?;

    let (year, month, day) = if parts[0].len() == 4 && is_digits(parts[0]) {
        (parts[0].parse().ok()?, parse_month_field(parts[1])?, parse_number(parts[2])?)
    } else {
        (parse_year(parts[2])?, parse_month_field(parts[1])?, parse_number(parts[0])?)
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

fn is_separator(c: char) -> bool {
    matches!(c, '/' | '-' | '.' | ' ')
}

/// Reads the three leading date fields: runs of digits or of letters, split
/// by separators.
fn date_fields(value: &str) -> Option<[&str; 3]> {
    let mut fields = [""; 3];
    let mut rest = value;

    for (idx, field) in fields.iter_mut().enumerate() {
        if idx > 0 {
            let trimmed = rest.trim_start_matches(is_separator);
            if trimmed.len() == rest.len() {
                return None;
            }
            rest = trimmed;
        }

        let end = match rest.chars().next()? {
            c if c.is_ascii_digit() => rest.find(|c: char| !c.is_ascii_digit()),
            c if c.is_ascii_alphabetic() => rest.find(|c: char| !c.is_ascii_alphabetic()),
            _ => return None,
        }
        .unwrap_or(rest.len());

        *field = &rest[..end];
        rest = &rest[end..];
    }

    match rest.chars().next() {
        None | Some(' ') | Some('T') => Some(fields),
        _ => None,
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_number(s: &str) -> Option<u32> {
    if !is_digits(s) || s.len() > 2 {
        return None;
    }
    s.parse().ok()
}

fn parse_year(s: &str) -> Option<i32> {
    if !is_digits(s) {
        return None;
    }
    let year: i32 = s.parse().ok()?;
    match s.len() {
        // Same pivot as strftime's %y: 00-68 -> 20xx, 69-99 -> 19xx.
        2 if year < 69 => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

fn parse_month_field(s: &str) -> Option<u32> {
    if is_digits(s) {
        return parse_number(s);
    }

    let lower = s.to_ascii_lowercase();
    MONTH_NAMES
        .iter()
        .position(|(short, long)| {
            lower == *short || lower == *long || (lower == "sept" && *short == "sep")
        })
        .map(|idx| idx as u32 + 1)
}
