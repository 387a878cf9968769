//! Read-only donor profile, grouped for display.

use chrono::NaiveDate;
use donor_core::{date::age_on, row::DonorProfile};

pub const NOT_PROVIDED: &str = "Not provided";
pub const NO_PROFILE: &str = "No profile information available";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSection {
  pub title:   &'static str,
  /// `(label, value)`; blank values read [`NOT_PROVIDED`].
  pub entries: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
  profile: DonorProfile,
  today:   NaiveDate,
}

impl ProfileView {
  pub fn new(profile: DonorProfile, today: NaiveDate) -> Self { Self { profile, today } }

  pub fn profile(&self) -> &DonorProfile { &self.profile }

  /// First name and surname, space-joined.
  pub fn name(&self) -> String {
    let p = &self.profile;
    [p.first_name.as_deref(), p.surname.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Stored age, else derived from the birthdate.
  pub fn age(&self) -> Option<u32> {
    self
      .profile
      .age
      .or_else(|| self.profile.birthdate.map(|b| age_on(b, self.today)))
  }

  pub fn sections(&self) -> Vec<ProfileSection> {
    let p = &self.profile;
    let sex = p.sex.filter(|s| s.is_selected()).map(|s| s.to_string());
    let civil_status = p
      .civil_status
      .filter(|c| c.is_selected())
      .map(|c| c.to_string());

    vec![
      ProfileSection {
        title:   "Personal Information",
        entries: vec![
          ("Name", shown(Some(self.name()))),
          ("Email", shown(p.email.clone())),
          ("Mobile", shown(p.mobile.clone())),
          ("Sex", shown(sex)),
          ("Age", shown(self.age().map(|a| a.to_string()))),
          ("Civil Status", shown(civil_status)),
        ],
      },
      ProfileSection {
        title:   "Address",
        entries: vec![
          ("Permanent Address", shown(p.permanent_address.clone())),
          ("Office Address", shown(p.office_address.clone())),
        ],
      },
      ProfileSection {
        title:   "Additional Information",
        entries: vec![
          ("Nationality", shown(p.nationality.clone())),
          ("Religion", shown(p.religion.clone())),
          ("Education", shown(p.education.clone())),
          ("Occupation", shown(p.occupation.clone())),
        ],
      },
    ]
  }
}

fn shown(value: Option<String>) -> String {
  match value {
    Some(v) if !v.trim().is_empty() => v.trim().to_string(),
    _ => NOT_PROVIDED.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use donor_core::record::Sex;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 3, 14).unwrap() }

  fn entry<'a>(view: &'a [ProfileSection], label: &str) -> &'a str {
    view
      .iter()
      .flat_map(|s| s.entries.iter())
      .find(|(l, _)| *l == label)
      .map(|(_, v)| v.as_str())
      .unwrap()
  }

  #[test]
  fn blanks_read_not_provided() {
    let view = ProfileView::new(DonorProfile::default(), today()).sections();
    assert_eq!(entry(&view, "Name"), NOT_PROVIDED);
    assert_eq!(entry(&view, "Sex"), NOT_PROVIDED);
    assert_eq!(entry(&view, "Office Address"), NOT_PROVIDED);
  }

  #[test]
  fn age_falls_back_to_birthdate() {
    let profile = DonorProfile {
      first_name: Some("Maria".into()),
      surname: Some("Santos".into()),
      birthdate: NaiveDate::from_ymd_opt(1990, 6, 1),
      sex: Some(Sex::Female),
      ..DonorProfile::default()
    };
    let view = ProfileView::new(profile, today());
    assert_eq!(view.age(), Some(34));
    let sections = view.sections();
    assert_eq!(entry(&sections, "Name"), "Maria Santos");
    assert_eq!(entry(&sections, "Age"), "34");
    assert_eq!(entry(&sections, "Sex"), "Female");
  }
}
