//! Validation rules gating each step.
//!
//! Every check runs to completion and reports all violations at once. The
//! first violation is the headline shown when only one message fits.

use std::fmt;

use crate::{
  declaration::DeclarationRecord,
  form::DonorField,
  record::{DonorRecord, Identification, is_blank},
  registration::RegistrationForm,
};

/// A single unmet rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
  Missing(DonorField),
  IdentificationRequired,
  PasswordRequired,
  PasswordMismatch,
  SignatureRequired,
  RelationshipRequired,
  CredentialsRequired,
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Missing(field) => write!(f, "{} is required", field.label()),
      Self::IdentificationRequired => {
        f.write_str("identification required: enter at least one ID number")
      }
      Self::PasswordRequired => f.write_str("Password is required"),
      Self::PasswordMismatch => f.write_str("Passwords do not match."),
      Self::SignatureRequired => {
        f.write_str("Please provide either donor or guardian signature")
      }
      Self::RelationshipRequired => {
        f.write_str("Please provide relationship for guardian signature")
      }
      Self::CredentialsRequired => {
        f.write_str("Please enter both email and password.")
      }
    }
  }
}

/// One or more violations. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
  pub fn violations(&self) -> &[Violation] { &self.0 }

  pub fn first(&self) -> &Violation { &self.0[0] }

  pub fn contains(&self, violation: &Violation) -> bool {
    self.0.contains(violation)
  }

  /// The fields reported as missing, in report order.
  pub fn missing_fields(&self) -> Vec<DonorField> {
    self
      .0
      .iter()
      .filter_map(|v| match v {
        Violation::Missing(f) => Some(*f),
        _ => None,
      })
      .collect()
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, v) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("\n")?;
      }
      write!(f, "{v}")?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

pub type ValidationResult = Result<(), ValidationErrors>;

/// Turn a list of violations into a result.
fn finish(violations: Vec<Violation>) -> ValidationResult {
  if violations.is_empty() {
    Ok(())
  } else {
    Err(ValidationErrors(violations))
  }
}

/// Combine two results, keeping every violation from both.
pub fn merge(a: ValidationResult, b: ValidationResult) -> ValidationResult {
  let mut all = Vec::new();
  for r in [a, b] {
    if let Err(ValidationErrors(v)) = r {
      all.extend(v);
    }
  }
  finish(all)
}

/// Required identity and contact fields must be filled.
pub fn validate_interview(record: &DonorRecord) -> ValidationResult {
  finish(
    DonorField::REQUIRED
      .into_iter()
      .filter(|f| !record.is_filled(*f))
      .map(Violation::Missing)
      .collect(),
  )
}

/// At least one identification number must be present.
pub fn validate_identification(ids: &Identification) -> ValidationResult {
  if ids.any_present() {
    Ok(())
  } else {
    Err(ValidationErrors(vec![Violation::IdentificationRequired]))
  }
}

/// Interview rules, identification, and matching non-empty passwords.
pub fn validate_registration(form: &RegistrationForm) -> ValidationResult {
  let mut violations = Vec::new();
  if let Err(ValidationErrors(v)) = validate_interview(&form.record) {
    violations.extend(v);
  }
  if let Err(ValidationErrors(v)) = validate_identification(&form.record.identification) {
    violations.extend(v);
  }
  if form.password.is_empty() || form.confirm_password.is_empty() {
    violations.push(Violation::PasswordRequired);
  } else if form.password != form.confirm_password {
    violations.push(Violation::PasswordMismatch);
  }
  finish(violations)
}

/// A donor signature, or a guardian signature with the guardian's
/// relationship. A guardian signature without a relationship always fails.
pub fn validate_declaration(declaration: &DeclarationRecord) -> ValidationResult {
  let mut violations = Vec::new();
  if !declaration.has_donor_signature() && !declaration.has_guardian_signature() {
    violations.push(Violation::SignatureRequired);
  }
  if declaration.has_guardian_signature() && !declaration.has_relationship() {
    violations.push(Violation::RelationshipRequired);
  }
  finish(violations)
}

/// Both login fields must be non-empty.
pub fn validate_credentials(email: &str, password: &str) -> ValidationResult {
  if is_blank(email) || password.is_empty() {
    Err(ValidationErrors(vec![Violation::CredentialsRequired]))
  } else {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::declaration::DeclarationField;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 3, 14).unwrap() }

  fn complete_record() -> DonorRecord {
    let mut r = DonorRecord::blank(today());
    for (field, value) in [
      (DonorField::Surname, "Dela Cruz"),
      (DonorField::FirstName, "Juan"),
      (DonorField::Sex, "Male"),
      (DonorField::CivilStatus, "Single"),
      (DonorField::Birthdate, "1995-08-01"),
      (DonorField::PermanentAddress, "12 Rizal St, Quezon City"),
      (DonorField::Nationality, "Filipino"),
      (DonorField::Occupation, "Engineer"),
      (DonorField::Mobile, "09171234567"),
      (DonorField::Email, "juan@example.com"),
    ] {
      r.set_field(field, value).unwrap();
    }
    r
  }

  fn declaration(donor: &str, guardian: &str, relationship: &str) -> DeclarationRecord {
    let mut d = DeclarationRecord::default();
    d.set(DeclarationField::DonorSignature, donor);
    d.set(DeclarationField::GuardianSignature, guardian);
    d.set(DeclarationField::Relationship, relationship);
    d
  }

  // ─── Interview ─────────────────────────────────────────────────────────

  #[test]
  fn complete_interview_passes() {
    assert!(validate_interview(&complete_record()).is_ok());
  }

  #[test]
  fn each_required_field_is_reported_when_cleared() {
    for field in DonorField::REQUIRED {
      let mut r = complete_record();
      match field {
        DonorField::Sex => r.sex = Default::default(),
        DonorField::CivilStatus => r.civil_status = Default::default(),
        DonorField::Birthdate => r.birthdate = None,
        other => r.set_field(other, "").unwrap(),
      }
      let err = validate_interview(&r).unwrap_err();
      assert_eq!(err.missing_fields(), vec![field], "{field}");
    }
  }

  #[test]
  fn whitespace_counts_as_empty() {
    let mut r = complete_record();
    r.set_field(DonorField::Surname, "   ").unwrap();
    let err = validate_interview(&r).unwrap_err();
    assert!(err.contains(&Violation::Missing(DonorField::Surname)));
  }

  #[test]
  fn optional_fields_never_block() {
    let mut r = complete_record();
    r.set_field(DonorField::MiddleName, "").unwrap();
    r.set_field(DonorField::Telephone, "").unwrap();
    r.set_field(DonorField::Religion, "anything at all").unwrap();
    r.set_field(DonorField::Age, "").unwrap();
    assert!(validate_interview(&r).is_ok());
  }

  #[test]
  fn blank_record_lists_all_missing_in_form_order() {
    let err = validate_interview(&DonorRecord::blank(today())).unwrap_err();
    assert_eq!(err.first(), &Violation::Missing(DonorField::Surname));
    assert_eq!(err.violations().len(), 9);
    assert!(err.to_string().contains("Mobile No. is required"));
  }

  // ─── Registration ──────────────────────────────────────────────────────

  fn registration() -> RegistrationForm {
    let mut form = RegistrationForm::new(today());
    form.record = complete_record();
    form.record.identification.prc = Some("0123456".into());
    form.password = "s3cret-pass".into();
    form.confirm_password = "s3cret-pass".into();
    form
  }

  #[test]
  fn complete_registration_passes() {
    assert!(validate_registration(&registration()).is_ok());
  }

  #[test]
  fn registration_requires_identification() {
    let mut form = registration();
    form.record.identification = Identification::default();
    let err = validate_registration(&form).unwrap_err();
    assert_eq!(err.violations(), &[Violation::IdentificationRequired]);
    assert!(err.to_string().starts_with("identification required"));
  }

  #[test]
  fn registration_rejects_mismatched_passwords() {
    let mut form = registration();
    form.confirm_password = "different".into();
    let err = validate_registration(&form).unwrap_err();
    assert_eq!(err.violations(), &[Violation::PasswordMismatch]);
  }

  #[test]
  fn registration_requires_passwords() {
    let mut form = registration();
    form.password.clear();
    form.confirm_password.clear();
    let err = validate_registration(&form).unwrap_err();
    assert_eq!(err.violations(), &[Violation::PasswordRequired]);
  }

  // ─── Declaration ───────────────────────────────────────────────────────

  #[test]
  fn declaration_truth_table() {
    assert!(validate_declaration(&declaration("", "", "")).is_err());
    assert!(validate_declaration(&declaration("x", "", "")).is_ok());
    assert!(validate_declaration(&declaration("", "y", "")).is_err());
    assert!(validate_declaration(&declaration("", "y", "Parent")).is_ok());
  }

  #[test]
  fn declaration_messages() {
    let err = validate_declaration(&declaration("", "", "")).unwrap_err();
    assert_eq!(err.violations(), &[Violation::SignatureRequired]);

    let err = validate_declaration(&declaration("", "y", "")).unwrap_err();
    assert_eq!(err.violations(), &[Violation::RelationshipRequired]);

    let err = validate_declaration(&declaration("x", "y", " ")).unwrap_err();
    assert_eq!(err.violations(), &[Violation::RelationshipRequired]);
  }

  // ─── Credentials / merge ───────────────────────────────────────────────

  #[test]
  fn credentials_need_both_fields() {
    assert!(validate_credentials("a@b.c", "pw").is_ok());
    assert!(validate_credentials("", "pw").is_err());
    assert!(validate_credentials("a@b.c", "").is_err());
  }

  #[test]
  fn merge_keeps_both_sides() {
    let merged = merge(
      validate_interview(&DonorRecord::blank(today())),
      validate_identification(&Identification::default()),
    )
    .unwrap_err();
    assert_eq!(merged.violations().len(), 10);
    assert_eq!(
      merged.violations().last(),
      Some(&Violation::IdentificationRequired)
    );
    assert!(merge(Ok(()), Ok(())).is_ok());
  }
}
