//! Built-in reference data: the society list and the location table.

use onboard_forms::LocationTable;
use onboard_search::StaticCatalog;
use onboard_types::SelectOption;

const SOCIETIES: &[(&str, &str)] = &[
    ("maharashtra-credit-cooperative", "Maharashtra Credit Cooperative Society"),
    ("sahakar-mitra-credit", "Sahakar Mitra Credit Society"),
    ("janseva-multistate-credit", "Janseva Multistate Credit Society"),
    ("bharat-bhushan-nagrik-credit", "Bharat Bhushan Nagrik Sahkari Credit Society"),
    ("pragati-credit-society", "Pragati Credit Cooperative Society"),
    ("navjeevan-seva-samiti", "Navjeevan Seva Samiti"),
    ("gramseva-service-society", "Gramseva Service Society"),
    ("lokhit-seva-sanstha", "Lokhit Seva Sanstha"),
    ("samaj-kalyan-seva", "Samaj Kalyan Seva Society"),
    ("sarvodaya-seva-sangh", "Sarvodaya Seva Sangh"),
];

pub fn society_catalog() -> StaticCatalog {
    SOCIETIES
        .iter()
        .map(|(value, label)| SelectOption::new(*value, *label))
        .collect()
}

/// Label of the society with `value`, if it is one we know.
pub fn society_label(value: &str) -> Option<&'static str> {
    SOCIETIES
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
}

pub fn locations() -> LocationTable {
    LocationTable::new()
        .country("IN", "India")
        .state("IN", "MH", "Maharashtra")
        .city("IN", "MH", "Mumbai")
        .city("IN", "MH", "Pune")
        .city("IN", "MH", "Nagpur")
        .state("IN", "KA", "Karnataka")
        .city("IN", "KA", "Bengaluru")
        .city("IN", "KA", "Mysuru")
        .state("IN", "GJ", "Gujarat")
        .city("IN", "GJ", "Ahmedabad")
        .city("IN", "GJ", "Surat")
        .country("NP", "Nepal")
        .state("NP", "BA", "Bagmati")
        .city("NP", "BA", "Kathmandu")
        .city("NP", "BA", "Lalitpur")
}
