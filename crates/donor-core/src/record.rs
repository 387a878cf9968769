//! The donor record accumulated during one intake session.
//!
//! The record is a closed shape: every column the backend knows about is a
//! named field here, and optional columns are `Option`s rather than empty
//! strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{
  Error, Result,
  date::{age_on, display_date, parse_date},
  form::DonorField,
  identifiers::GeneratedIdentifiers,
  row::DonorProfile,
};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Sex as offered by the interview picker. `Unselected` is the picker's
/// placeholder and never a valid answer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
  Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Sex {
  #[default]
  #[serde(rename = "Select Sex")]
  #[strum(serialize = "Select Sex")]
  Unselected,
  Male,
  Female,
  Others,
}

/// Civil status as offered by the interview picker.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
  Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum CivilStatus {
  #[default]
  #[serde(rename = "Select Civil Status")]
  #[strum(serialize = "Select Civil Status")]
  Unselected,
  Single,
  Married,
  Widowed,
  Divorced,
}

impl Sex {
  pub fn is_selected(self) -> bool { self != Self::Unselected }

  pub fn parse(input: &str) -> Result<Self> {
    input
      .trim()
      .parse()
      .map_err(|_| Error::UnknownSex(input.to_string()))
  }
}

impl CivilStatus {
  pub fn is_selected(self) -> bool { self != Self::Unselected }

  pub fn parse(input: &str) -> Result<Self> {
    input
      .trim()
      .parse()
      .map_err(|_| Error::UnknownCivilStatus(input.to_string()))
  }
}

// ─── Identification ──────────────────────────────────────────────────────────

/// Identification numbers. At least one is required to register.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
  #[serde(rename = "id_school", default)]
  pub school:      Option<String>,
  #[serde(rename = "id_company", default)]
  pub company:     Option<String>,
  #[serde(rename = "id_prc", default)]
  pub prc:         Option<String>,
  #[serde(rename = "id_drivers", default)]
  pub drivers:     Option<String>,
  #[serde(rename = "id_sss_gsis_bir", default)]
  pub sss_gsis_bir: Option<String>,
  #[serde(rename = "id_others", default)]
  pub others:      Option<String>,
}

impl Identification {
  /// True when at least one identification number is filled in.
  pub fn any_present(&self) -> bool {
    [
      &self.school,
      &self.company,
      &self.prc,
      &self.drivers,
      &self.sss_gsis_bir,
      &self.others,
    ]
    .into_iter()
    .any(|id| id.as_deref().is_some_and(|s| !is_blank(s)))
  }
}

// ─── DonorRecord ─────────────────────────────────────────────────────────────

/// Everything the interview step collects about a donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorRecord {
  pub surname:           String,
  pub first_name:        String,
  pub middle_name:       Option<String>,
  pub birthdate:         Option<NaiveDate>,
  /// As entered; derived from `birthdate` when left blank.
  pub age:               Option<u32>,
  pub sex:               Sex,
  pub civil_status:      CivilStatus,
  pub permanent_address: String,
  pub office_address:    Option<String>,
  pub nationality:       String,
  pub religion:          Option<String>,
  pub education:         Option<String>,
  pub occupation:        String,
  pub mobile:            String,
  pub telephone:         Option<String>,
  pub email:             String,
  pub identification:    Identification,
  /// Set once the interview step completes.
  pub identifiers:       Option<GeneratedIdentifiers>,
}

impl DonorRecord {
  /// An empty record for a new donor. The birthdate starts at `today`, the
  /// same default the date picker shows.
  pub fn blank(today: NaiveDate) -> Self {
    Self {
      surname:           String::new(),
      first_name:        String::new(),
      middle_name:       None,
      birthdate:         Some(today),
      age:               None,
      sex:               Sex::Unselected,
      civil_status:      CivilStatus::Unselected,
      permanent_address: String::new(),
      office_address:    None,
      nationality:       String::new(),
      religion:          None,
      education:         None,
      occupation:        String::new(),
      mobile:            String::new(),
      telephone:         None,
      email:             String::new(),
      identification:    Identification::default(),
      identifiers:       None,
    }
  }

  /// A record pre-filled from a stored profile. Absent columns keep the
  /// defaults of [`DonorRecord::blank`].
  pub fn from_profile(profile: &DonorProfile, today: NaiveDate) -> Self {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    Self {
      surname:           text(&profile.surname),
      first_name:        text(&profile.first_name),
      middle_name:       optional(profile.middle_name.as_deref().unwrap_or("")),
      birthdate:         Some(profile.birthdate.unwrap_or(today)),
      age:               profile.age,
      sex:               profile.sex.unwrap_or_default(),
      civil_status:      profile.civil_status.unwrap_or_default(),
      permanent_address: text(&profile.permanent_address),
      office_address:    optional(profile.office_address.as_deref().unwrap_or("")),
      nationality:       text(&profile.nationality),
      religion:          optional(profile.religion.as_deref().unwrap_or("")),
      education:         optional(profile.education.as_deref().unwrap_or("")),
      occupation:        text(&profile.occupation),
      mobile:            text(&profile.mobile),
      telephone:         optional(profile.telephone.as_deref().unwrap_or("")),
      email:             text(&profile.email),
      identification:    profile.identification.clone(),
      identifiers:       None,
    }
  }

  /// Update one field from user input. On a parse error the record is left
  /// unchanged.
  pub fn set_field(&mut self, field: DonorField, value: &str) -> Result<()> {
    use DonorField as F;
    match field {
      F::Surname => self.surname = value.to_string(),
      F::FirstName => self.first_name = value.to_string(),
      F::MiddleName => self.middle_name = optional(value),
      F::Birthdate => {
        self.birthdate = if is_blank(value) {
          None
        } else {
          Some(parse_date(value)?)
        }
      }
      F::Age => self.age = parse_age(value)?,
      F::Sex => self.sex = Sex::parse(value)?,
      F::CivilStatus => self.civil_status = CivilStatus::parse(value)?,
      F::PermanentAddress => self.permanent_address = value.to_string(),
      F::OfficeAddress => self.office_address = optional(value),
      F::Nationality => self.nationality = value.to_string(),
      F::Religion => self.religion = optional(value),
      F::Education => self.education = optional(value),
      F::Occupation => self.occupation = value.to_string(),
      F::Mobile => self.mobile = value.to_string(),
      F::Telephone => self.telephone = optional(value),
      F::Email => self.email = value.to_string(),
      F::IdSchool => self.identification.school = optional(value),
      F::IdCompany => self.identification.company = optional(value),
      F::IdPrc => self.identification.prc = optional(value),
      F::IdDrivers => self.identification.drivers = optional(value),
      F::IdSssGsisBir => self.identification.sss_gsis_bir = optional(value),
      F::IdOthers => self.identification.others = optional(value),
    }
    Ok(())
  }

  /// The current value of a field as the user would see it. Unset fields
  /// render as an empty string; pickers render their placeholder.
  pub fn field_value(&self, field: DonorField) -> String {
    use DonorField as F;
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    match field {
      F::Surname => self.surname.clone(),
      F::FirstName => self.first_name.clone(),
      F::MiddleName => opt(&self.middle_name),
      F::Birthdate => self.birthdate.map(display_date).unwrap_or_default(),
      F::Age => self.age.map(|a| a.to_string()).unwrap_or_default(),
      F::Sex => self.sex.to_string(),
      F::CivilStatus => self.civil_status.to_string(),
      F::PermanentAddress => self.permanent_address.clone(),
      F::OfficeAddress => opt(&self.office_address),
      F::Nationality => self.nationality.clone(),
      F::Religion => opt(&self.religion),
      F::Education => opt(&self.education),
      F::Occupation => self.occupation.clone(),
      F::Mobile => self.mobile.clone(),
      F::Telephone => opt(&self.telephone),
      F::Email => self.email.clone(),
      F::IdSchool => opt(&self.identification.school),
      F::IdCompany => opt(&self.identification.company),
      F::IdPrc => opt(&self.identification.prc),
      F::IdDrivers => opt(&self.identification.drivers),
      F::IdSssGsisBir => opt(&self.identification.sss_gsis_bir),
      F::IdOthers => opt(&self.identification.others),
    }
  }

  /// Whether a field holds a usable answer.
  pub fn is_filled(&self, field: DonorField) -> bool {
    match field {
      DonorField::Sex => self.sex.is_selected(),
      DonorField::CivilStatus => self.civil_status.is_selected(),
      DonorField::Birthdate => self.birthdate.is_some(),
      DonorField::Age => self.age.is_some(),
      other => !is_blank(&self.field_value(other)),
    }
  }

  /// The entered age, or the age computed from the birthdate.
  pub fn effective_age(&self, today: NaiveDate) -> Option<u32> {
    self.age.or_else(|| self.birthdate.map(|b| age_on(b, today)))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub(crate) fn is_blank(s: &str) -> bool { s.trim().is_empty() }

/// Empty input means "not provided".
pub(crate) fn optional(value: &str) -> Option<String> {
  (!is_blank(value)).then(|| value.to_string())
}

fn parse_age(value: &str) -> Result<Option<u32>> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  trimmed
    .parse()
    .map(Some)
    .map_err(|_| Error::InvalidAge(value.to_string()))
}
