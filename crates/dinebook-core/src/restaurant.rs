//! Restaurants, the directory's primary record kind.
//!
//! Restaurants are owned by the origin server. The local copy only ever
//! changes by being replaced wholesale from a fetch, or by having its
//! favorite flag mirrored after the origin acknowledged a toggle.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned restaurant identity.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RestaurantId(pub i64);

impl fmt::Display for RestaurantId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A map position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
  pub lat: f64,
  pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
  pub id:              RestaurantId,
  pub name:            String,
  pub neighborhood:    String,
  pub cuisine_type:    String,
  pub address:         String,
  /// Image reference without extension, e.g. `"3"` for `/img/3.jpg`.
  pub photograph:      Option<String>,
  pub latlng:          Option<LatLng>,
  /// Day name → free-text opening hours.
  pub operating_hours: BTreeMap<String, String>,
  pub is_favorite:     bool,
  pub created_at:      Option<DateTime<Utc>>,
  pub updated_at:      Option<DateTime<Utc>>,
}

impl Restaurant {
  /// Convenience constructor with all optional fields empty.
  pub fn new(
    id: RestaurantId,
    name: impl Into<String>,
    cuisine_type: impl Into<String>,
    neighborhood: impl Into<String>,
  ) -> Self {
    Self {
      id,
      name: name.into(),
      neighborhood: neighborhood.into(),
      cuisine_type: cuisine_type.into(),
      address: String::new(),
      photograph: None,
      latlng: None,
      operating_hours: BTreeMap::new(),
      is_favorite: false,
      created_at: None,
      updated_at: None,
    }
  }

  /// Relative path of the restaurant's detail page.
  pub fn detail_path(&self) -> String {
    format!("./restaurant.html?id={}", self.id)
  }

  /// Image URL, falling back to the shared placeholder.
  pub fn image_url(&self) -> String {
    format!("/img/{}.jpg", self.photo_stem())
  }

  /// Responsive `srcset` for the small and large renditions.
  pub fn image_srcset(&self) -> String {
    let stem = self.photo_stem();
    format!("/img/small{stem}.jpg 550w, /img/{stem}.jpg 1000w")
  }

  /// Alternative text for the restaurant's photograph.
  pub fn image_alt(&self) -> String {
    format!(
      "It's {} restaurant. There has atmosphere this place: glad visitors, modern style, \
       hall and kitchen zone.",
      self.name
    )
  }

  fn photo_stem(&self) -> &str {
    self
      .photograph
      .as_deref()
      .filter(|p| !p.is_empty())
      .unwrap_or("placeholder")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn image_helpers_use_photograph() {
    let mut r = Restaurant::new(RestaurantId(3), "Kang Ho Dong", "Asian", "Manhattan");
    r.photograph = Some("3".into());

    assert_eq!(r.detail_path(), "./restaurant.html?id=3");
    assert_eq!(r.image_url(), "/img/3.jpg");
    assert_eq!(r.image_srcset(), "/img/small3.jpg 550w, /img/3.jpg 1000w");
  }

  #[test]
  fn image_alt_names_the_restaurant() {
    let r = Restaurant::new(RestaurantId(2), "Emily", "Pizza", "Brooklyn");
    let alt = r.image_alt();
    assert!(alt.starts_with("It's Emily restaurant."));
    assert!(alt.ends_with("modern style, hall and kitchen zone."));
  }

  #[test]
  fn image_helpers_fall_back_to_placeholder() {
    let r = Restaurant::new(RestaurantId(10), "Casa Enrique", "Mexican", "Queens");
    assert_eq!(r.image_url(), "/img/placeholder.jpg");
    assert_eq!(
      r.image_srcset(),
      "/img/smallplaceholder.jpg 550w, /img/placeholder.jpg 1000w"
    );
  }
}
