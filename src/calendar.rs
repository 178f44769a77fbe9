use chrono::{Datelike, Days, Duration, NaiveDate, Weekday};

use crate::error::RangeError;

/// The Monday-to-Sunday week containing `reference`.
pub fn week_of(reference: NaiveDate) -> [NaiveDate; 7] {
    let day_index = reference.weekday().num_days_from_sunday() as i64;
    let offset_to_monday = if day_index == 0 { -6 } else { 1 - day_index };
    let monday = reference + Duration::days(offset_to_monday);
    std::array::from_fn(|index| monday + Duration::days(index as i64))
}

pub fn shift_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    date + Duration::weeks(weeks)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn filter_weekend(dates: &[NaiveDate], include_weekends: bool) -> Vec<NaiveDate> {
    dates
        .iter()
        .copied()
        .filter(|date| include_weekends || !is_weekend(*date))
        .collect()
}

/// Every date from `start` to `end` inclusive.
pub fn date_range(
    start: NaiveDate,
    end: NaiveDate,
    include_weekends: bool,
) -> Result<Vec<NaiveDate>, RangeError> {
    if start > end {
        return Err(RangeError { start, end });
    }

    Ok(start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| include_weekends || !is_weekend(*date))
        .collect())
}

/// First and last calendar day of the month containing `day`.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day - Days::new(u64::from(day.day0()));
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|next_month| next_month.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

pub fn week_label(days: &[NaiveDate; 7]) -> String {
    format!(
        "{} - {}",
        days[0].format("%d %b"),
        days[6].format("%d %b %Y")
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::{date_range, filter_weekend, month_bounds, shift_weeks, week_label, week_of};
    use crate::error::RangeError;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn week_of_wednesday_starts_on_previous_monday() {
        let week = week_of(date(2024, 1, 10));
        let expected = (8..=14).map(|day| date(2024, 1, day)).collect::<Vec<_>>();
        assert_eq!(week.to_vec(), expected);
    }

    #[rstest]
    #[case::monday(date(2024, 1, 8))]
    #[case::saturday(date(2024, 1, 13))]
    #[case::sunday(date(2024, 1, 14))]
    fn every_day_of_a_week_maps_to_the_same_monday(#[case] reference: NaiveDate) {
        assert_eq!(week_of(reference)[0], date(2024, 1, 8));
        assert_eq!(week_of(reference)[6], date(2024, 1, 14));
    }

    #[test]
    fn week_crosses_month_and_year_boundaries() {
        let week = week_of(date(2025, 1, 1));
        assert_eq!(week[0], date(2024, 12, 30));
        assert_eq!(week[6], date(2025, 1, 5));
        assert_eq!(week_label(&week), "30 Dec - 05 Jan 2025");
    }

    #[test]
    fn shifts_by_whole_weeks() {
        assert_eq!(shift_weeks(date(2024, 1, 10), 1), date(2024, 1, 17));
        assert_eq!(shift_weeks(date(2024, 1, 10), -2), date(2023, 12, 27));
    }

    #[test]
    fn drops_weekends_only_when_asked() {
        let week = week_of(date(2024, 1, 10));
        let weekdays = filter_weekend(&week, false);
        assert_eq!(weekdays, week[..5].to_vec());
        assert_eq!(filter_weekend(&week, true), week.to_vec());
    }

    #[test]
    fn date_range_is_inclusive_and_ordered() {
        let range = date_range(date(2024, 1, 5), date(2024, 1, 9), true).unwrap();
        assert_eq!(range.len(), 5);
        assert_eq!(range.first(), Some(&date(2024, 1, 5)));
        assert_eq!(range.last(), Some(&date(2024, 1, 9)));

        let weekdays = date_range(date(2024, 1, 5), date(2024, 1, 9), false).unwrap();
        assert_eq!(weekdays, vec![date(2024, 1, 5), date(2024, 1, 8), date(2024, 1, 9)]);

        assert_eq!(
            date_range(date(2024, 1, 6), date(2024, 1, 6), true).unwrap(),
            vec![date(2024, 1, 6)]
        );
    }

    #[test]
    fn date_range_rejects_reversed_bounds() {
        let start = date(2024, 2, 1);
        let end = date(2024, 1, 31);
        assert_eq!(date_range(start, end, true), Err(RangeError { start, end }));
    }

    #[rstest]
    #[case(date(2024, 2, 14), date(2024, 2, 1), date(2024, 2, 29))]
    #[case(date(2023, 12, 31), date(2023, 12, 1), date(2023, 12, 31))]
    #[case(date(2024, 4, 1), date(2024, 4, 1), date(2024, 4, 30))]
    fn month_bounds_cover_the_whole_month(
        #[case] today: NaiveDate,
        #[case] first: NaiveDate,
        #[case] last: NaiveDate,
    ) {
        assert_eq!(month_bounds(today), (first, last));
    }
}
