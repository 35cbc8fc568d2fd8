//! Country → state → city cascading selection.
//!
//! Options for each level are derived from the level above; changing a
//! parent clears every level below it.

use std::collections::BTreeMap;

use onboard_types::SelectOption;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("unknown country {0}")]
    UnknownCountry(String),

    #[error("state {state} does not belong to {country}")]
    UnknownState { country: String, state: String },

    #[error("city {city} does not belong to {state}")]
    UnknownCity { state: String, city: String },

    #[error("select a {0} first")]
    ParentMissing(&'static str),
}

/// Where location options come from.
pub trait LocationSource {
    fn countries(&self) -> Vec<SelectOption>;
    fn states(&self, country: &str) -> Vec<SelectOption>;
    fn cities(&self, country: &str, state: &str) -> Vec<SelectOption>;
}

/// An in-memory location dataset.
#[derive(Clone, Debug, Default)]
pub struct LocationTable {
    countries: Vec<SelectOption>,
    states: BTreeMap<String, Vec<SelectOption>>,
    cities: BTreeMap<(String, String), Vec<SelectOption>>,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(mut self, code: &str, name: &str) -> Self {
        self.countries.push(SelectOption::new(code, name));
        self
    }

    pub fn state(mut self, country: &str, code: &str, name: &str) -> Self {
        self.states
            .entry(country.to_string())
            .or_default()
            .push(SelectOption::new(code, name));
        self
    }

    pub fn city(mut self, country: &str, state: &str, name: &str) -> Self {
        self.cities
            .entry((country.to_string(), state.to_string()))
            .or_default()
            .push(SelectOption::new(name, name));
        self
    }
}

impl LocationSource for LocationTable {
    fn countries(&self) -> Vec<SelectOption> {
        self.countries.clone()
    }

    fn states(&self, country: &str) -> Vec<SelectOption> {
        self.states.get(country).cloned().unwrap_or_default()
    }

    fn cities(&self, country: &str, state: &str) -> Vec<SelectOption> {
        self.cities
            .get(&(country.to_string(), state.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

fn contains(options: &[SelectOption], value: &str) -> bool {
    options.iter().any(|o| o.value == value)
}

/// The three linked selections of the onboarding form.
pub struct LocationCascade<S> {
    source: S,
    country: Option<String>,
    state: Option<String>,
    city: Option<String>,
}

impl<S: LocationSource> LocationCascade<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            country: None,
            state: None,
            city: None,
        }
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn country_options(&self) -> Vec<SelectOption> {
        self.source.countries()
    }

    /// States of the selected country; empty until a country is chosen.
    pub fn state_options(&self) -> Vec<SelectOption> {
        match &self.country {
            Some(c) => self.source.states(c),
            None => Vec::new(),
        }
    }

    /// Cities of the selected state; empty until both parents are chosen.
    pub fn city_options(&self) -> Vec<SelectOption> {
        match (&self.country, &self.state) {
            (Some(c), Some(s)) => self.source.cities(c, s),
            _ => Vec::new(),
        }
    }

    pub fn select_country(&mut self, code: &str) -> Result<(), LocationError> {
        if !contains(&self.source.countries(), code) {
            return Err(LocationError::UnknownCountry(code.to_string()));
        }
        self.country = Some(code.to_string());
        self.state = None;
        self.city = None;
        Ok(())
    }

    pub fn select_state(&mut self, code: &str) -> Result<(), LocationError> {
        let country = self
            .country
            .clone()
            .ok_or(LocationError::ParentMissing("country"))?;
        if !contains(&self.source.states(&country), code) {
            return Err(LocationError::UnknownState {
                country,
                state: code.to_string(),
            });
        }
        self.state = Some(code.to_string());
        self.city = None;
        Ok(())
    }

    pub fn select_city(&mut self, name: &str) -> Result<(), LocationError> {
        let (Some(country), Some(state)) = (&self.country, &self.state) else {
            return Err(LocationError::ParentMissing("state"));
        };
        if !contains(&self.source.cities(country, state), name) {
            return Err(LocationError::UnknownCity {
                state: state.clone(),
                city: name.to_string(),
            });
        }
        self.city = Some(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LocationTable {
        LocationTable::new()
            .country("IN", "India")
            .country("NP", "Nepal")
            .state("IN", "MH", "Maharashtra")
            .state("IN", "KA", "Karnataka")
            .city("IN", "MH", "Pune")
            .city("IN", "MH", "Nashik")
            .city("IN", "KA", "Mysuru")
    }

    #[test]
    fn options_follow_parent_selection() {
        let mut cascade = LocationCascade::new(table());
        assert!(cascade.state_options().is_empty());

        cascade.select_country("IN").unwrap();
        assert_eq!(cascade.state_options().len(), 2);
        assert!(cascade.city_options().is_empty());

        cascade.select_state("MH").unwrap();
        let cities: Vec<_> = cascade.city_options().into_iter().map(|o| o.value).collect();
        assert_eq!(cities, vec!["Pune", "Nashik"]);
    }

    #[test]
    fn changing_parent_clears_children() {
        let mut cascade = LocationCascade::new(table());
        cascade.select_country("IN").unwrap();
        cascade.select_state("MH").unwrap();
        cascade.select_city("Pune").unwrap();

        cascade.select_state("KA").unwrap();
        assert_eq!(cascade.city(), None);

        cascade.select_country("NP").unwrap();
        assert_eq!(cascade.state(), None);
        assert!(cascade.state_options().is_empty());
    }

    #[test]
    fn rejects_values_outside_parent() {
        let mut cascade = LocationCascade::new(table());
        assert_eq!(
            cascade.select_state("MH"),
            Err(LocationError::ParentMissing("country"))
        );
        cascade.select_country("IN").unwrap();
        cascade.select_state("KA").unwrap();
        assert!(matches!(
            cascade.select_city("Pune"),
            Err(LocationError::UnknownCity { .. })
        ));
        assert!(matches!(
            cascade.select_country("XX"),
            Err(LocationError::UnknownCountry(_))
        ));
    }
}
