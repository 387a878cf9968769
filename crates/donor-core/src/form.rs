//! Interview form state: the record being edited plus which fields the user
//! has touched in this session.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{Result, record::DonorRecord, row::DonorProfile};

/// Every editable field of the interview step. The `Display` form is the
/// backend column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DonorField {
  // ── Identity ────────────────────────────────────────────────────────────
  Surname,
  FirstName,
  MiddleName,
  Birthdate,
  Age,
  Sex,
  CivilStatus,

  // ── Contact ─────────────────────────────────────────────────────────────
  PermanentAddress,
  OfficeAddress,
  Nationality,
  Religion,
  Education,
  Occupation,
  Mobile,
  Telephone,
  Email,

  // ── Identification ──────────────────────────────────────────────────────
  IdSchool,
  IdCompany,
  IdPrc,
  IdDrivers,
  IdSssGsisBir,
  IdOthers,
}

impl DonorField {
  /// Fields that must be filled before the interview step may complete.
  pub const REQUIRED: [DonorField; 10] = [
    DonorField::Surname,
    DonorField::FirstName,
    DonorField::Sex,
    DonorField::CivilStatus,
    DonorField::Birthdate,
    DonorField::PermanentAddress,
    DonorField::Nationality,
    DonorField::Occupation,
    DonorField::Mobile,
    DonorField::Email,
  ];

  pub fn is_required(self) -> bool { Self::REQUIRED.contains(&self) }

  pub fn is_identification(self) -> bool {
    matches!(
      self,
      Self::IdSchool
        | Self::IdCompany
        | Self::IdPrc
        | Self::IdDrivers
        | Self::IdSssGsisBir
        | Self::IdOthers
    )
  }

  /// Human-readable label shown next to the input.
  pub fn label(self) -> &'static str {
    match self {
      Self::Surname => "Surname",
      Self::FirstName => "First Name",
      Self::MiddleName => "Middle Name",
      Self::Birthdate => "Birthdate",
      Self::Age => "Age",
      Self::Sex => "Sex",
      Self::CivilStatus => "Civil Status",
      Self::PermanentAddress => "Permanent Address",
      Self::OfficeAddress => "Office Address",
      Self::Nationality => "Nationality",
      Self::Religion => "Religion",
      Self::Education => "Education",
      Self::Occupation => "Occupation",
      Self::Mobile => "Mobile No.",
      Self::Telephone => "Telephone No.",
      Self::Email => "Email",
      Self::IdSchool => "School ID",
      Self::IdCompany => "Company ID",
      Self::IdPrc => "PRC ID",
      Self::IdDrivers => "Driver's License",
      Self::IdSssGsisBir => "SSS/GSIS/BIR",
      Self::IdOthers => "Other ID",
    }
  }

  /// All fields in form order.
  pub fn all() -> impl Iterator<Item = DonorField> { Self::iter() }
}

// ─── InterviewForm ───────────────────────────────────────────────────────────

/// The form state holder for one interview session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewForm {
  record:  DonorRecord,
  touched: BTreeSet<DonorField>,
}

impl InterviewForm {
  /// A blank form for a new donor.
  pub fn new(today: NaiveDate) -> Self {
    Self {
      record:  DonorRecord::blank(today),
      touched: BTreeSet::new(),
    }
  }

  /// A form pre-filled from a returning donor's profile. Pre-filled fields
  /// count as filled but not touched.
  pub fn from_profile(profile: &DonorProfile, today: NaiveDate) -> Self {
    Self {
      record:  DonorRecord::from_profile(profile, today),
      touched: BTreeSet::new(),
    }
  }

  /// Apply a user edit. A field is marked touched only when the edit parses.
  pub fn set(&mut self, field: DonorField, value: &str) -> Result<()> {
    self.record.set_field(field, value)?;
    self.touched.insert(field);
    Ok(())
  }

  pub fn value(&self, field: DonorField) -> String {
    self.record.field_value(field)
  }

  pub fn is_touched(&self, field: DonorField) -> bool {
    self.touched.contains(&field)
  }

  pub fn is_filled(&self, field: DonorField) -> bool {
    self.record.is_filled(field)
  }

  /// Required fields that are still empty, in form order.
  pub fn missing_required(&self) -> Vec<DonorField> {
    DonorField::REQUIRED
      .into_iter()
      .filter(|f| !self.is_filled(*f))
      .collect()
  }

  pub fn record(&self) -> &DonorRecord { &self.record }

  /// An owned copy of the record. Later edits to the form do not reach it.
  pub fn snapshot(&self) -> DonorRecord { self.record.clone() }

  /// Clear every field back to the blank defaults.
  pub fn reset(&mut self, today: NaiveDate) { *self = Self::new(today); }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 3, 14).unwrap() }

  #[test]
  fn field_display_is_column_name() {
    assert_eq!(DonorField::FirstName.to_string(), "first_name");
    assert_eq!(DonorField::IdSssGsisBir.to_string(), "id_sss_gsis_bir");
    assert_eq!(DonorField::Mobile.to_string(), "mobile");
  }

  #[test]
  fn required_fields_are_flagged() {
    assert!(DonorField::Surname.is_required());
    assert!(!DonorField::MiddleName.is_required());
    assert!(!DonorField::IdPrc.is_required());
    assert_eq!(DonorField::all().filter(|f| f.is_required()).count(), 10);
    assert_eq!(DonorField::all().filter(|f| f.is_identification()).count(), 6);
  }

  #[test]
  fn edits_mark_touched_only_on_success() {
    let mut form = InterviewForm::new(today());
    assert!(!form.is_touched(DonorField::Sex));

    assert!(form.set(DonorField::Sex, "unknown").is_err());
    assert!(!form.is_touched(DonorField::Sex));

    form.set(DonorField::Sex, "Male").unwrap();
    assert!(form.is_touched(DonorField::Sex));
    assert!(form.is_filled(DonorField::Sex));
  }

  #[test]
  fn blank_form_is_missing_everything_but_birthdate() {
    let form = InterviewForm::new(today());
    let missing = form.missing_required();
    assert_eq!(missing.len(), 9);
    assert!(!missing.contains(&DonorField::Birthdate));
  }

  #[test]
  fn snapshot_is_detached_from_later_edits() {
    let mut form = InterviewForm::new(today());
    form.set(DonorField::Surname, "Dela Cruz").unwrap();
    let snap = form.snapshot();
    form.set(DonorField::Surname, "Garcia").unwrap();
    assert_eq!(snap.surname, "Dela Cruz");
    assert_eq!(form.value(DonorField::Surname), "Garcia");
  }

  #[test]
  fn reset_clears_values_and_touched() {
    let mut form = InterviewForm::new(today());
    form.set(DonorField::Email, "juan@example.com").unwrap();
    form.reset(today());
    assert_eq!(form.value(DonorField::Email), "");
    assert!(!form.is_touched(DonorField::Email));
  }
}
