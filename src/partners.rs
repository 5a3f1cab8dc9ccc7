//! Partner profiles: the per-organization copy (courses, funding paths,
//! love notes, rotating tips) that one shared dashboard template renders.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Course {
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub hours: Option<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FundingPath {
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PartnerProfile {
  pub slug: String,
  pub name: String,
  #[serde(default)]
  pub partnership_id: Option<String>,
  #[serde(default)]
  pub love_notes: Vec<String>,
  #[serde(default)]
  pub courses: Vec<Course>,
  #[serde(default)]
  pub funding_paths: Vec<FundingPath>,
  #[serde(default)]
  pub tips: Vec<String>,
}

impl PartnerProfile {
  /// Tip for rotation step `index`, wrapping around the list.
  pub fn tip(&self, index: usize) -> Option<&str> {
    if self.tips.is_empty() {
      return None;
    }
    Some(&self.tips[index % self.tips.len()])
  }
}

/// Short listing entry for `GET /partners`.
#[derive(Debug, Serialize)]
pub struct PartnerSummary {
  pub slug: String,
  pub name: String,
  pub courses: usize,
}

impl From<&PartnerProfile> for PartnerSummary {
  fn from(p: &PartnerProfile) -> Self {
    Self { slug: p.slug.clone(), name: p.name.clone(), courses: p.courses.len() }
  }
}
