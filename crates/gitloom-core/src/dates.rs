//! Backdated timestamp selection.
//!
//! Every synthesized commit gets a timestamp drawn from an age window anchored
//! at "now". A weighted year bucket biases recent years, then a candidate
//! week/day/time is drawn and checked against the window bounds and two
//! calendar exclusion rules that break up an otherwise too-regular pattern.

use rand::Rng;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, Weekday};

/// Candidate draws before giving up and taking the deterministic fallback.
const MAX_ATTEMPTS: u32 = 4;

/// Wall-clock time used by the deterministic fallback.
const FALLBACK_HOUR: u8 = 20;
const FALLBACK_MINUTE: u8 = 30;

/// Pick how many years to subtract for one commit.
///
/// Windows of 4+ years weight recent years more heavily (40/20/20/10/10 over
/// years 1..4 and `max_years`); smaller windows split evenly between 1 and 2.
pub fn draw_years_back(max_years: u32, rng: &mut impl Rng) -> u32 {
    let roll: f64 = rng.gen();
    if max_years < 4 {
        if roll < 0.5 {
            1
        } else {
            2
        }
    } else if roll < 0.4 {
        1
    } else if roll < 0.6 {
        2
    } else if roll < 0.8 {
        3
    } else if roll < 0.9 {
        4
    } else {
        max_years
    }
}

/// Select one backdated timestamp within `[now - max_years, now]`.
///
/// Up to [`MAX_ATTEMPTS`] candidates are drawn: `now - years_back` years plus
/// a random week (0-51) and day (0-6) offset, at a random evening time
/// (19:00-23:59). A candidate is rejected when it falls outside the window,
/// when its ISO week is odd and the day is Sunday, or when its ISO week is
/// prime and the day is Friday. If every attempt is rejected the fallback is
/// `now - years_back` years at 20:30, which bounds the retry cost and
/// guarantees termination.
///
/// Callers must keep `years_back <= max_years`; otherwise the window check
/// can never pass and every call degrades to the fallback.
pub fn select_date(
    now: OffsetDateTime,
    max_years: u32,
    years_back: u32,
    rng: &mut impl Rng,
) -> OffsetDateTime {
    let floor = at_time(shift_years(now.date(), max_years), now.time(), now);

    for _ in 0..MAX_ATTEMPTS {
        let weeks = rng.gen_range(0..=51i64);
        let days = rng.gen_range(0..=6i64);
        let hour: u8 = rng.gen_range(19..=23);
        let minute: u8 = rng.gen_range(0..=59);

        let date =
            shift_years(now.date(), years_back) + Duration::weeks(weeks) + Duration::days(days);
        let clock = Time::from_hms(hour, minute, 0).expect("drawn hour/minute are in range");
        let candidate = at_time(date, clock, now);

        let week = date.iso_week();
        let excluded = (week % 2 == 1 && date.weekday() == Weekday::Sunday)
            || (is_prime(week) && date.weekday() == Weekday::Friday);

        if candidate <= now && candidate >= floor && !excluded {
            return candidate;
        }
    }

    let clock = Time::from_hms(FALLBACK_HOUR, FALLBACK_MINUTE, 0)
        .expect("fallback wall-clock time is valid");
    at_time(shift_years(now.date(), years_back), clock, now)
}

/// Subtract whole years from a date. Feb 29 clamps to Feb 28 when the target
/// year is not a leap year.
fn shift_years(date: Date, years: u32) -> Date {
    let target = date.year() - years as i32;
    match date.replace_year(target) {
        Ok(d) => d,
        Err(_) => Date::from_calendar_date(target, Month::February, 28).unwrap_or(date),
    }
}

fn at_time(date: Date, clock: Time, reference: OffsetDateTime) -> OffsetDateTime {
    PrimitiveDateTime::new(date, clock).assume_offset(reference.offset())
}

/// Trial-division primality check, sized for ISO week numbers.
pub fn is_prime(n: u8) -> bool {
    if n <= 1 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut i = 3u8;
    while (i as u16) * (i as u16) <= n as u16 {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}
