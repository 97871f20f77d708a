use chrono::{DateTime, Datelike, Months, Utc};

const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2_520;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Whole calendar months from `then` to `now`.
fn calendar_months(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let mut months = i64::from(now.year() - then.year()) * 12 + i64::from(now.month())
        - i64::from(then.month());
    if months > 0 {
        let stepped = u32::try_from(months)
            .ok()
            .and_then(|n| then.checked_add_months(Months::new(n)));
        if stepped.is_some_and(|t| t > now) {
            months -= 1;
        }
    }
    months.max(0)
}

fn round_div(value: i64, by: i64) -> i64 {
    (value as f64 / by as f64).round() as i64
}

/// Human wording for the distance between `then` and `now`, in the style of
/// date-fns' `formatDistance` ("about 3 hours", "2 days", "over 1 year").
/// Timestamps in the future read as "less than a minute".
pub fn distance(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let minutes = round_div(seconds, 60);

    match minutes {
        0 => "less than a minute".to_string(),
        m if m < 45 => plural(m, "minute"),
        m if m < 90 => "about 1 hour".to_string(),
        m if m < MINUTES_IN_DAY => format!("about {}", plural(round_div(m, 60), "hour")),
        m if m < MINUTES_IN_ALMOST_TWO_DAYS => "1 day".to_string(),
        m if m < MINUTES_IN_MONTH => plural(round_div(m, MINUTES_IN_DAY), "day"),
        m if m < MINUTES_IN_TWO_MONTHS => {
            format!("about {}", plural(round_div(m, MINUTES_IN_MONTH), "month"))
        }
        m => {
            let months = calendar_months(then, now);
            if months < 12 {
                return plural(round_div(m, MINUTES_IN_MONTH), "month");
            }
            let years = months / 12;
            match months % 12 {
                0..=2 => format!("about {}", plural(years, "year")),
                3..=8 => format!("over {}", plural(years, "year")),
                _ => format!("almost {}", plural(years + 1, "year")),
            }
        }
    }
}
