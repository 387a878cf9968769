//! The donor's declaration: attestation text and signatures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::record::{is_blank, optional};

/// The attestation the donor signs, one paragraph per entry.
pub const DECLARATION_TEXT: &[&str] = &[
  "I certify that I am the person referred to above and that all the entries \
   are read and well understood by me and to the best of my knowledge, \
   truthfully answered all the questions in this Blood Donor Interview Sheet.",
  "I understand that all questions are pertinent for my safety and for the \
   benefit of the patient who will undergo blood transfusion.",
  "I am voluntarily giving my blood through the Philippine Red Cross, without \
   remuneration, for the use of persons in need of this vital fluid without \
   regard to rank, race, color, creed, religion, or political persuasion.",
  "I understand that my blood will be screened for malaria, syphilis, \
   hepatitis B, hepatitis C, and HIV. I am aware that the screening tests are \
   not diagnostic and may yield false positive results.",
  "I confirm that I am over the age of 18 years.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DeclarationField {
  DonorSignature,
  /// For donors aged 16–17.
  GuardianSignature,
  Relationship,
}

impl DeclarationField {
  pub fn label(self) -> &'static str {
    match self {
      Self::DonorSignature => "Donor Signature",
      Self::GuardianSignature => "Guardian Signature",
      Self::Relationship => "Relationship to Blood Donor",
    }
  }
}

/// Signatures collected on the declaration step. Signatures are free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationRecord {
  pub donor_signature:    Option<String>,
  pub guardian_signature: Option<String>,
  /// Guardian's relationship to the donor; required with a guardian
  /// signature.
  pub relationship:       Option<String>,
  /// Stamped when the submission is sent.
  pub submitted_at:       Option<DateTime<Utc>>,
}

impl DeclarationRecord {
  pub fn set(&mut self, field: DeclarationField, value: &str) {
    let slot = match field {
      DeclarationField::DonorSignature => &mut self.donor_signature,
      DeclarationField::GuardianSignature => &mut self.guardian_signature,
      DeclarationField::Relationship => &mut self.relationship,
    };
    *slot = optional(value);
  }

  pub fn value(&self, field: DeclarationField) -> &str {
    match field {
      DeclarationField::DonorSignature => self.donor_signature.as_deref(),
      DeclarationField::GuardianSignature => self.guardian_signature.as_deref(),
      DeclarationField::Relationship => self.relationship.as_deref(),
    }
    .unwrap_or_default()
  }

  pub fn has_donor_signature(&self) -> bool { present(&self.donor_signature) }

  pub fn has_guardian_signature(&self) -> bool {
    present(&self.guardian_signature)
  }

  pub fn has_relationship(&self) -> bool { present(&self.relationship) }

  /// A copy stamped with the submission time.
  pub fn stamped(&self, at: DateTime<Utc>) -> Self {
    Self {
      submitted_at: Some(at),
      ..self.clone()
    }
  }
}

fn present(value: &Option<String>) -> bool {
  value.as_deref().is_some_and(|s| !is_blank(s))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_input_clears_a_signature() {
    let mut d = DeclarationRecord::default();
    d.set(DeclarationField::DonorSignature, "J. Dela Cruz");
    assert!(d.has_donor_signature());
    assert_eq!(d.value(DeclarationField::DonorSignature), "J. Dela Cruz");
    d.set(DeclarationField::DonorSignature, " ");
    assert!(!d.has_donor_signature());
    assert_eq!(d.value(DeclarationField::DonorSignature), "");
  }

  #[test]
  fn stamping_keeps_signatures() {
    let mut d = DeclarationRecord::default();
    d.set(DeclarationField::GuardianSignature, "R. Dela Cruz");
    d.set(DeclarationField::Relationship, "Parent");
    let at = Utc::now();
    let stamped = d.stamped(at);
    assert_eq!(stamped.submitted_at, Some(at));
    assert_eq!(stamped.relationship.as_deref(), Some("Parent"));
    assert!(d.submitted_at.is_none());
  }
}
