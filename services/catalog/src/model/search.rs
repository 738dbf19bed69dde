//! Search criteria parsed from query parameters.
use crate::availability::{available_between, parse_day};
use crate::model::Car;
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

/// Query parameters understood by the search endpoint.
pub const SEARCH_PARAMS: [&str; 5] = ["startDate", "endDate", "location", "ageGroup", "carGroup"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidQuery {
    #[error("unrecognized parameters: {0:?}")]
    Unrecognized(Vec<String>),
    #[error("{param} is not a valid {expected}")]
    Malformed {
        param: &'static str,
        expected: &'static str,
    },
}

/// AND-combined filters over the catalog. `None` means "no filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub location: Option<String>,
    pub age_group: Option<f64>,
    pub car_group: Option<String>,
}

fn non_empty<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn day_param(
    params: &HashMap<String, String>,
    name: &'static str,
) -> Result<Option<NaiveDate>, InvalidQuery> {
    non_empty(params, name)
        .map(|raw| {
            parse_day(raw).ok_or(InvalidQuery::Malformed {
                param: name,
                expected: "date",
            })
        })
        .transpose()
}

impl SearchCriteria {
    /// Build criteria from raw query parameters.
    ///
    /// Any parameter outside [`SEARCH_PARAMS`] rejects the whole query, even
    /// when the rest are valid. Empty values count as absent.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, InvalidQuery> {
        let mut unknown: Vec<String> = params
            .keys()
            .filter(|key| !SEARCH_PARAMS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(InvalidQuery::Unrecognized(unknown));
        }

        let age_group = non_empty(params, "ageGroup")
            .map(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|age| age.is_finite())
                    .ok_or(InvalidQuery::Malformed {
                        param: "ageGroup",
                        expected: "number",
                    })
            })
            .transpose()?;

        Ok(Self {
            start_date: day_param(params, "startDate")?,
            end_date: day_param(params, "endDate")?,
            location: non_empty(params, "location").map(str::to_string),
            age_group,
            car_group: non_empty(params, "carGroup").map(str::to_string),
        })
    }

    /// The date range to check, only when both ends were supplied.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }

    pub fn matches(&self, car: &Car) -> bool {
        let dates = self
            .date_range()
            .is_none_or(|(start, end)| available_between(&car.available_dates, start, end));
        let location = self
            .location
            .as_ref()
            .is_none_or(|location| car.available_locations.contains(location));
        // The requester's age group must meet the car's minimum age.
        let age = self
            .age_group
            .is_none_or(|age| f64::from(car.minimum_driver_age) <= age);
        let group = self
            .car_group
            .as_ref()
            .is_none_or(|group| &car.car_group == group);
        dates && location && age && group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CarFields;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn car(min_age: u32, dates: &[&str], locations: &[&str]) -> Car {
        let fields = CarFields {
            description: "test".to_string(),
            make: "Make".to_string(),
            model: "Model".to_string(),
            year: 2023,
            price: 100.0,
            car_group: "Sedan".to_string(),
            minimum_driver_age: min_age,
            available_dates: dates.iter().map(|d| parse_day(d).expect("day")).collect(),
            available_locations: locations.iter().map(|l| l.to_string()).collect(),
            available_extras: Vec::new(),
            discounts: "none".to_string(),
        };
        Car::new("c".to_string(), fields)
    }

    #[test]
    fn unknown_parameter_rejects_query() {
        let err = SearchCriteria::from_query(&params(&[
            ("location", "Tel-Aviv"),
            ("foo", "bar"),
        ]))
        .expect_err("unknown");
        assert_eq!(err, InvalidQuery::Unrecognized(vec!["foo".to_string()]));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = SearchCriteria::from_query(&params(&[("ageGroup", "old")])).expect_err("age");
        assert!(matches!(
            err,
            InvalidQuery::Malformed {
                param: "ageGroup",
                ..
            }
        ));
        let err =
            SearchCriteria::from_query(&params(&[("startDate", "tomorrow")])).expect_err("date");
        assert!(matches!(
            err,
            InvalidQuery::Malformed {
                param: "startDate",
                ..
            }
        ));
    }

    #[test]
    fn empty_values_are_ignored() {
        let criteria =
            SearchCriteria::from_query(&params(&[("location", ""), ("carGroup", "")]))
                .expect("criteria");
        assert_eq!(criteria, SearchCriteria::default());
    }

    #[test]
    fn date_filter_needs_both_ends() {
        let criteria =
            SearchCriteria::from_query(&params(&[("startDate", "2023-10-01")])).expect("criteria");
        assert!(criteria.date_range().is_none());
        assert!(criteria.matches(&car(21, &[], &[])));
    }

    #[test]
    fn reversed_range_matches_vacuously() {
        let criteria = SearchCriteria::from_query(&params(&[
            ("startDate", "2023-10-19"),
            ("endDate", "2023-10-17"),
        ]))
        .expect("criteria");
        assert!(criteria.matches(&car(21, &[], &[])));
    }

    #[test]
    fn age_group_is_an_upper_bound_on_minimum_age() {
        let criteria = SearchCriteria::from_query(&params(&[("ageGroup", "25")])).expect("age");
        assert!(criteria.matches(&car(21, &[], &[])));
        assert!(criteria.matches(&car(25, &[], &[])));
        assert!(!criteria.matches(&car(26, &[], &[])));
    }

    #[test]
    fn all_filters_combine() {
        let candidate = car(21, &["2023-10-15", "2023-10-16"], &["Tel-Aviv"]);
        let hit = SearchCriteria::from_query(&params(&[
            ("startDate", "2023-10-15"),
            ("endDate", "2023-10-16"),
            ("location", "Tel-Aviv"),
            ("ageGroup", "30"),
            ("carGroup", "Sedan"),
        ]))
        .expect("criteria");
        assert!(hit.matches(&candidate));

        let wrong_group = SearchCriteria {
            car_group: Some("SUV".to_string()),
            ..hit.clone()
        };
        assert!(!wrong_group.matches(&candidate));

        let wrong_location = SearchCriteria {
            location: Some("Haifa".to_string()),
            ..hit
        };
        assert!(!wrong_location.matches(&candidate));
    }
}
