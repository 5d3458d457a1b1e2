//! Pure derivations over an already-materialised restaurant set: filtered
//! listings and the cuisine/neighborhood facets used to populate selectors.
//!
//! Nothing here performs I/O.

use std::{collections::HashSet, convert::Infallible, fmt, str::FromStr};

use crate::restaurant::{Restaurant, RestaurantId};

/// The sentinel a selector uses for "no filter".
pub const ALL: &str = "all";

/// One side of a cuisine/neighborhood filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
  #[default]
  All,
  Only(String),
}

impl Selection {
  pub fn only(value: impl Into<String>) -> Self { Self::Only(value.into()) }

  pub fn matches(&self, value: &str) -> bool {
    match self {
      Self::All => true,
      Self::Only(wanted) => wanted == value,
    }
  }
}

impl FromStr for Selection {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(if s == ALL { Self::All } else { Self::Only(s.to_owned()) })
  }
}

impl From<&str> for Selection {
  fn from(s: &str) -> Self {
    match s.parse() {
      Ok(sel) => sel,
      Err(never) => match never {},
    }
  }
}

impl fmt::Display for Selection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::All => f.write_str(ALL),
      Self::Only(v) => f.write_str(v),
    }
  }
}

/// Restaurants matching both selections. Either side short-circuits on
/// [`Selection::All`].
pub fn filter_by(
  restaurants: &[Restaurant],
  cuisine: &Selection,
  neighborhood: &Selection,
) -> Vec<Restaurant> {
  restaurants
    .iter()
    .filter(|r| cuisine.matches(&r.cuisine_type))
    .filter(|r| neighborhood.matches(&r.neighborhood))
    .cloned()
    .collect()
}

pub fn filter_by_cuisine(restaurants: &[Restaurant], cuisine: &str) -> Vec<Restaurant> {
  filter_by(restaurants, &Selection::only(cuisine), &Selection::All)
}

pub fn filter_by_neighborhood(
  restaurants: &[Restaurant],
  neighborhood: &str,
) -> Vec<Restaurant> {
  filter_by(restaurants, &Selection::All, &Selection::only(neighborhood))
}

/// Distinct cuisines in first-seen order.
pub fn distinct_cuisines(restaurants: &[Restaurant]) -> Vec<String> {
  distinct(restaurants.iter().map(|r| r.cuisine_type.as_str()))
}

/// Distinct neighborhoods in first-seen order.
pub fn distinct_neighborhoods(restaurants: &[Restaurant]) -> Vec<String> {
  distinct(restaurants.iter().map(|r| r.neighborhood.as_str()))
}

pub fn find_by_id(restaurants: &[Restaurant], id: RestaurantId) -> Option<&Restaurant> {
  restaurants.iter().find(|r| r.id == id)
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
  let mut seen = HashSet::new();
  values
    .filter(|v| seen.insert(*v))
    .map(str::to_owned)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fixture() -> Vec<Restaurant> {
    vec![
      Restaurant::new(RestaurantId(1), "Mission Chinese Food", "Asian", "Manhattan"),
      Restaurant::new(RestaurantId(2), "Emily", "Pizza", "Brooklyn"),
      Restaurant::new(RestaurantId(3), "Kang Ho Dong Baekjeong", "Asian", "Manhattan"),
      Restaurant::new(RestaurantId(4), "Katz's Delicatessen", "American", "Manhattan"),
      Restaurant::new(RestaurantId(5), "Roberta's Pizza", "Pizza", "Brooklyn"),
      Restaurant::new(RestaurantId(6), "Hometown BBQ", "American", "Brooklyn"),
    ]
  }

  fn ids(rs: &[Restaurant]) -> Vec<i64> { rs.iter().map(|r| r.id.0).collect() }

  #[test]
  fn all_all_returns_everything() {
    let rs = fixture();
    assert_eq!(filter_by(&rs, &Selection::All, &Selection::All), rs);
  }

  #[test]
  fn both_filters_intersect() {
    let rs = fixture();
    let hits = filter_by(&rs, &Selection::only("Pizza"), &Selection::only("Brooklyn"));
    assert_eq!(ids(&hits), [2, 5]);

    let hits = filter_by(&rs, &Selection::only("American"), &Selection::only("Manhattan"));
    assert_eq!(ids(&hits), [4]);

    let none = filter_by(&rs, &Selection::only("Pizza"), &Selection::only("Manhattan"));
    assert!(none.is_empty());
  }

  #[test]
  fn single_axis_filters() {
    let rs = fixture();
    assert_eq!(ids(&filter_by_cuisine(&rs, "Asian")), [1, 3]);
    assert_eq!(ids(&filter_by_neighborhood(&rs, "Brooklyn")), [2, 5, 6]);
    assert_eq!(
      filter_by(&rs, &Selection::All, &Selection::only("Brooklyn")),
      filter_by_neighborhood(&rs, "Brooklyn")
    );
  }

  #[test]
  fn facets_are_distinct_in_first_seen_order() {
    let rs = fixture();
    assert_eq!(distinct_cuisines(&rs), ["Asian", "Pizza", "American"]);
    assert_eq!(distinct_neighborhoods(&rs), ["Manhattan", "Brooklyn"]);
    assert!(distinct_cuisines(&[]).is_empty());
  }

  #[test]
  fn selection_parses_sentinel() {
    assert_eq!(Selection::from("all"), Selection::All);
    assert_eq!(Selection::from("Queens"), Selection::only("Queens"));
    assert_eq!(Selection::only("Queens").to_string(), "Queens");
    assert_eq!(Selection::All.to_string(), "all");
  }

  #[test]
  fn find_by_id_hits_and_misses() {
    let rs = fixture();
    assert_eq!(find_by_id(&rs, RestaurantId(4)).map(|r| r.name.as_str()), Some("Katz's Delicatessen"));
    assert!(find_by_id(&rs, RestaurantId(99)).is_none());
  }
}
