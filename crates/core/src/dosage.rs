//! Dosage encoding.
//!
//! A schedule is encoded two ways: a machine-readable daily dose code of three binary digits in
//! morning-afternoon-night order (`1-0-1`), and a preview label listing the selected times as
//! letters followed by the meal relation (`M-N (Before Food)`).

use crate::constants::NOT_AVAILABLE;
use crate::medicine::Schedule;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DosageCode {
    pub daily_dose_code: String,
    pub preview_label: String,
}

/// Encode a schedule. Every combination of flags is valid input.
pub fn encode(schedule: &Schedule) -> DosageCode {
    let digit = |on: bool| if on { '1' } else { '0' };
    let daily_dose_code = format!(
        "{}-{}-{}",
        digit(schedule.morning),
        digit(schedule.afternoon),
        digit(schedule.night)
    );

    let preview_label = format!(
        "{} ({})",
        time_letters(schedule.morning, schedule.afternoon, schedule.night),
        schedule.meal_relation.food_phrase()
    );

    DosageCode {
        daily_dose_code,
        preview_label,
    }
}

/// `M`, `A`, `N` for each selected time joined with `-`, or `N/A` when none is selected.
pub fn time_letters(morning: bool, afternoon: bool, night: bool) -> String {
    let letters: Vec<&str> = [(morning, "M"), (afternoon, "A"), (night, "N")]
        .into_iter()
        .filter_map(|(on, letter)| on.then_some(letter))
        .collect();

    if letters.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        letters.join("-")
    }
}

/// Parse a stored `1-0-1` code back into morning, afternoon and night flags.
///
/// Returns `None` for anything that is not exactly three `0`/`1` digits separated by `-`.
pub fn decode_daily_dose(code: &str) -> Option<(bool, bool, bool)> {
    let mut flags = code.trim().split('-').map(|part| match part {
        "1" => Some(true),
        "0" => Some(false),
        _ => None,
    });

    let morning = flags.next()??;
    let afternoon = flags.next()??;
    let night = flags.next()??;
    if flags.next().is_some() {
        return None;
    }

    Some((morning, afternoon, night))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medicine::MealRelation;

    fn schedule(morning: bool, afternoon: bool, night: bool, meal: MealRelation) -> Schedule {
        Schedule {
            morning,
            afternoon,
            night,
            meal_relation: meal,
        }
    }

    #[test]
    fn test_morning_and_night_before_food() {
        let code = encode(&schedule(true, false, true, MealRelation::Before));
        assert_eq!(code.daily_dose_code, "1-0-1");
        assert_eq!(code.preview_label, "M-N (Before Food)");
    }

    #[test]
    fn test_nothing_selected() {
        let code = encode(&schedule(false, false, false, MealRelation::After));
        assert_eq!(code.daily_dose_code, "0-0-0");
        assert_eq!(code.preview_label, "N/A (After Food)");
    }

    #[test]
    fn test_all_times() {
        let code = encode(&schedule(true, true, true, MealRelation::After));
        assert_eq!(code.daily_dose_code, "1-1-1");
        assert_eq!(code.preview_label, "M-A-N (After Food)");
    }

    #[test]
    fn test_encode_is_deterministic_for_every_combination() {
        for bits in 0..8u8 {
            for meal in [MealRelation::Before, MealRelation::After] {
                let s = schedule(bits & 4 != 0, bits & 2 != 0, bits & 1 != 0, meal);
                let first = encode(&s);
                assert_eq!(first, encode(&s));
                assert_eq!(
                    decode_daily_dose(&first.daily_dose_code),
                    Some((s.morning, s.afternoon, s.night))
                );
            }
        }
    }

    #[test]
    fn test_decode_rejects_malformed_codes() {
        assert_eq!(decode_daily_dose("1-0"), None);
        assert_eq!(decode_daily_dose("1-0-1-1"), None);
        assert_eq!(decode_daily_dose("2-0-1"), None);
        assert_eq!(decode_daily_dose("morning"), None);
        assert_eq!(decode_daily_dose(""), None);
    }
}
