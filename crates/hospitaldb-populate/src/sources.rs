//! Capabilities that supply plausible field values.
//!
//! The populator only decides structure (which keys, which enum members);
//! names, addresses, dates and free text come from a value source so that
//! integrity logic can be exercised with a deterministic substitute.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::faker::lorem::en::Word;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait NameSource {
    fn next_first_name(&mut self) -> String;
    fn next_last_name(&mut self) -> String;
}

pub trait AddressSource {
    fn next_address(&mut self) -> String;
}

/// Dates drawn from inclusive ranges. Reversed bounds are swapped.
pub trait DateSource {
    fn next_date_in_range(&mut self, start: NaiveDate, end: NaiveDate) -> NaiveDate;
    fn next_datetime_in_range(&mut self, start: NaiveDateTime, end: NaiveDateTime)
    -> NaiveDateTime;
}

pub trait TextSource {
    fn next_phone(&mut self) -> String;
    fn next_word(&mut self) -> String;
    /// Free text of at most `max_chars` characters.
    fn next_text(&mut self, max_chars: usize) -> String;
}

/// Everything the populator needs from a value source.
pub trait ValueSource: NameSource + AddressSource + DateSource + TextSource {}

impl<T: NameSource + AddressSource + DateSource + TextSource> ValueSource for T {}

/// Value source backed by `fake` with a seeded ChaCha generator.
#[derive(Debug, Clone)]
pub struct FakerSource {
    rng: ChaCha8Rng,
}

impl FakerSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl NameSource for FakerSource {
    fn next_first_name(&mut self) -> String {
        FirstName().fake_with_rng(&mut self.rng)
    }

    fn next_last_name(&mut self) -> String {
        LastName().fake_with_rng(&mut self.rng)
    }
}

impl AddressSource for FakerSource {
    fn next_address(&mut self) -> String {
        let number: String = BuildingNumber().fake_with_rng(&mut self.rng);
        let street: String = StreetName().fake_with_rng(&mut self.rng);
        let city: String = CityName().fake_with_rng(&mut self.rng);
        let state: String = StateAbbr().fake_with_rng(&mut self.rng);
        let zip: String = ZipCode().fake_with_rng(&mut self.rng);
        format!("{number} {street}\n{city}, {state} {zip}")
    }
}

impl DateSource for FakerSource {
    fn next_date_in_range(&mut self, start: NaiveDate, end: NaiveDate) -> NaiveDate {
        date_between(&mut self.rng, start, end)
    }

    fn next_datetime_in_range(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> NaiveDateTime {
        datetime_between(&mut self.rng, start, end)
    }
}

impl TextSource for FakerSource {
    fn next_phone(&mut self) -> String {
        PhoneNumber().fake_with_rng(&mut self.rng)
    }

    fn next_word(&mut self) -> String {
        Word().fake_with_rng(&mut self.rng)
    }

    fn next_text(&mut self, max_chars: usize) -> String {
        let mut words: Vec<String> = Vec::new();
        let mut len = 0;
        // One char is kept for the closing period.
        while len < max_chars {
            let word: String = Word().fake_with_rng(&mut self.rng);
            let extra = if words.is_empty() {
                word.chars().count()
            } else {
                word.chars().count() + 1
            };
            if len + extra + 1 > max_chars {
                break;
            }
            len += extra;
            words.push(word);
        }
        sentence(&words)
    }
}

/// Uniform date in `[start, end]`.
pub fn date_between(rng: &mut impl Rng, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let span = (end - start).num_days();
    let offset = rng.random_range(0..=span);
    start + Duration::days(offset)
}

/// Uniform instant in `[start, end]` at one-second resolution.
pub fn datetime_between(
    rng: &mut impl Rng,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> NaiveDateTime {
    let (start, end) = if start <= end { (start, end) } else { (end, start) };
    let span = (end - start).num_seconds();
    let offset = rng.random_range(0..=span);
    start + Duration::seconds(offset)
}

fn sentence(words: &[String]) -> String {
    let mut text = words.join(" ");
    if let Some(first) = text.chars().next() {
        let upper: String = first.to_uppercase().collect();
        text.replace_range(..first.len_utf8(), &upper);
        text.push('.');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_yields_same_values() {
        let mut left = FakerSource::seeded(11);
        let mut right = FakerSource::seeded(11);
        for _ in 0..5 {
            assert_eq!(left.next_first_name(), right.next_first_name());
            assert_eq!(left.next_address(), right.next_address());
            assert_eq!(left.next_text(50), right.next_text(50));
        }
    }

    #[test]
    fn dates_stay_within_bounds() {
        let mut source = FakerSource::seeded(3);
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        for _ in 0..200 {
            let date = source.next_date_in_range(start, end);
            assert!(date >= start && date <= end);
            let swapped = source.next_date_in_range(end, start);
            assert!(swapped >= start && swapped <= end);
        }
    }

    #[test]
    fn degenerate_range_returns_the_bound() {
        let mut source = FakerSource::seeded(5);
        let instant = NaiveDate::from_ymd_opt(2026, 2, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(source.next_datetime_in_range(instant, instant), instant);
    }

    #[test]
    fn text_respects_max_chars() {
        let mut source = FakerSource::seeded(8);
        for max in [5, 20, 50] {
            let text = source.next_text(max);
            assert!(text.chars().count() <= max, "{text:?} longer than {max}");
        }
    }

    #[test]
    fn sentence_is_capitalized_and_terminated() {
        let words = vec!["lorem".to_string(), "ipsum".to_string()];
        assert_eq!(sentence(&words), "Lorem ipsum.");
        assert_eq!(sentence(&[]), "");
    }
}
