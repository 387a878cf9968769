//! Row shapes of the two backend tables.
//!
//! | Table | Key | Contents |
//! |-------|-----|----------|
//! | `donors_detail` | `id` (auth user id) | identity, contact, identification |
//! | `donor_form` | backend-assigned | interview fields, identifiers, declaration |
//!
//! Column names are the snake_case field names below. Optional values
//! serialise as `null`.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  Error, Result,
  date::parse_date,
  declaration::DeclarationRecord,
  form::DonorField,
  record::{CivilStatus, DonorRecord, Identification, Sex},
};

// ─── Tables ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
  DonorsDetail,
  DonorForm,
}

impl Table {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::DonorsDetail => "donors_detail",
      Self::DonorForm => "donor_form",
    }
  }
}

impl std::fmt::Display for Table {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Shared columns ──────────────────────────────────────────────────────────

/// Columns common to both tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorDetails {
  pub surname:           String,
  pub first_name:        String,
  pub middle_name:       Option<String>,
  /// `YYYY-MM-DD`
  pub birthdate:         NaiveDate,
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
  #[serde(flatten)]
  pub identification:    Identification,
}

impl DonorDetails {
  /// Columns for a validated record. A blank age is derived from the
  /// birthdate as of `today`.
  pub fn from_record(record: &DonorRecord, today: NaiveDate) -> Result<Self> {
    let birthdate = record
      .birthdate
      .ok_or(Error::MissingField(DonorField::Birthdate))?;
    Ok(Self {
      surname: record.surname.clone(),
      first_name: record.first_name.clone(),
      middle_name: record.middle_name.clone(),
      birthdate,
      age: record.effective_age(today),
      sex: record.sex,
      civil_status: record.civil_status,
      permanent_address: record.permanent_address.clone(),
      office_address: record.office_address.clone(),
      nationality: record.nationality.clone(),
      religion: record.religion.clone(),
      education: record.education.clone(),
      occupation: record.occupation.clone(),
      mobile: record.mobile.clone(),
      telephone: record.telephone.clone(),
      email: record.email.clone(),
      identification: record.identification.clone(),
    })
  }
}

// ─── donors_detail ───────────────────────────────────────────────────────────

/// A `donors_detail` insert, written once at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorDetailRow {
  /// The auth provider's user id.
  pub id:      String,
  #[serde(flatten)]
  pub details: DonorDetails,
}

impl DonorDetailRow {
  pub fn new(user_id: impl Into<String>, record: &DonorRecord, today: NaiveDate) -> Result<Self> {
    Ok(Self {
      id:      user_id.into(),
      details: DonorDetails::from_record(record, today)?,
    })
  }
}

// ─── donor_form ──────────────────────────────────────────────────────────────

/// A `donor_form` insert: the frozen interview plus the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorFormRow {
  pub prc_donor_number:    String,
  pub doh_nnbnets_barcode: String,
  #[serde(flatten)]
  pub details:             DonorDetails,
  pub relationship:        Option<String>,
  /// ISO-8601
  pub submitted_at:        DateTime<Utc>,
  pub donor_signature:     Option<String>,
  pub guardian_signature:  Option<String>,
}

impl DonorFormRow {
  /// Merge a frozen record and its declaration. The record must carry its
  /// generated identifiers.
  pub fn new(
    record: &DonorRecord,
    declaration: &DeclarationRecord,
    today: NaiveDate,
  ) -> Result<Self> {
    let ids = record.identifiers.as_ref().ok_or(Error::MissingIdentifiers)?;
    Ok(Self {
      prc_donor_number:    ids.registry_number.clone(),
      doh_nnbnets_barcode: ids.lab_barcode.clone(),
      details:             DonorDetails::from_record(record, today)?,
      relationship:        declaration.relationship.clone(),
      submitted_at:        declaration.submitted_at.unwrap_or_else(Utc::now),
      donor_signature:     declaration.donor_signature.clone(),
      guardian_signature:  declaration.guardian_signature.clone(),
    })
  }
}

// ─── Insert payload ──────────────────────────────────────────────────────────

/// Anything the gateway can insert. Serialises as the bare row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Row {
  DonorDetail(DonorDetailRow),
  DonorForm(DonorFormRow),
}

impl Row {
  pub fn table(&self) -> Table {
    match self {
      Self::DonorDetail(_) => Table::DonorsDetail,
      Self::DonorForm(_) => Table::DonorForm,
    }
  }

  pub fn to_json(&self) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(self)?)
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// A `donors_detail` row as read back. Every column may be missing or null,
/// and legacy rows may hold the age as text or the birthdate as a timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorProfile {
  #[serde(default)]
  pub id:                Option<String>,
  #[serde(default)]
  pub surname:           Option<String>,
  #[serde(default)]
  pub first_name:        Option<String>,
  #[serde(default)]
  pub middle_name:       Option<String>,
  #[serde(default, deserialize_with = "lenient_date")]
  pub birthdate:         Option<NaiveDate>,
  #[serde(default, deserialize_with = "lenient_age")]
  pub age:               Option<u32>,
  #[serde(default, deserialize_with = "lenient_parse")]
  pub sex:               Option<Sex>,
  #[serde(default, deserialize_with = "lenient_parse")]
  pub civil_status:      Option<CivilStatus>,
  #[serde(default)]
  pub permanent_address: Option<String>,
  #[serde(default)]
  pub office_address:    Option<String>,
  #[serde(default)]
  pub nationality:       Option<String>,
  #[serde(default)]
  pub religion:          Option<String>,
  #[serde(default)]
  pub education:         Option<String>,
  #[serde(default)]
  pub occupation:        Option<String>,
  #[serde(default)]
  pub mobile:            Option<String>,
  #[serde(default)]
  pub telephone:         Option<String>,
  #[serde(default)]
  pub email:             Option<String>,
  #[serde(flatten)]
  pub identification:    Identification,
}

impl From<&DonorDetailRow> for DonorProfile {
  fn from(row: &DonorDetailRow) -> Self {
    let d = &row.details;
    Self {
      id:                Some(row.id.clone()),
      surname:           Some(d.surname.clone()),
      first_name:        Some(d.first_name.clone()),
      middle_name:       d.middle_name.clone(),
      birthdate:         Some(d.birthdate),
      age:               d.age,
      sex:               Some(d.sex),
      civil_status:      Some(d.civil_status),
      permanent_address: Some(d.permanent_address.clone()),
      office_address:    d.office_address.clone(),
      nationality:       Some(d.nationality.clone()),
      religion:          d.religion.clone(),
      education:         d.education.clone(),
      occupation:        Some(d.occupation.clone()),
      mobile:            Some(d.mobile.clone()),
      telephone:         d.telephone.clone(),
      email:             Some(d.email.clone()),
      identification:    d.identification.clone(),
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
  Number(u32),
  Text(String),
  /// Negative, fractional, or any other non-age value.
  Other(serde_json::Value),
}

fn lenient_age<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
  Ok(match Option::<NumberOrText>::deserialize(d)? {
    Some(NumberOrText::Number(n)) => Some(n),
    Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
    Some(NumberOrText::Other(_)) | None => None,
  })
}

fn lenient_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
  Ok(Option::<String>::deserialize(d)?.and_then(|s| {
    // `2000-01-31T00:00:00Z` → `2000-01-31`
    let date_part = s.get(..10).unwrap_or(&s);
    parse_date(date_part).ok()
  }))
}

/// Unrecognised values read back as absent.
fn lenient_parse<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: FromStr,
{
  Ok(Option::<String>::deserialize(d)?.and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{declaration::DeclarationField, identifiers::GeneratedIdentifiers};

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 3, 14).unwrap() }

  fn record() -> DonorRecord {
    let mut r = DonorRecord::blank(today());
    for (field, value) in [
      (DonorField::Surname, "Dela Cruz"),
      (DonorField::FirstName, "Juan"),
      (DonorField::Sex, "Male"),
      (DonorField::CivilStatus, "Married"),
      (DonorField::Birthdate, "05/20/1990"),
      (DonorField::PermanentAddress, "12 Rizal St"),
      (DonorField::Nationality, "Filipino"),
      (DonorField::Occupation, "Teacher"),
      (DonorField::Mobile, "09170000000"),
      (DonorField::Email, "juan@example.com"),
      (DonorField::IdDrivers, "N01-99"),
    ] {
      r.set_field(field, value).unwrap();
    }
    r
  }

  #[test]
  fn detail_row_uses_column_names() {
    let row = DonorDetailRow::new("user-1", &record(), today()).unwrap();
    let v = Row::DonorDetail(row).to_json().unwrap();
    assert_eq!(v["id"], "user-1");
    assert_eq!(v["first_name"], "Juan");
    assert_eq!(v["birthdate"], "1990-05-20");
    assert_eq!(v["civil_status"], "Married");
    assert_eq!(v["id_drivers"], "N01-99");
    assert_eq!(v["id_school"], json!(null));
    assert_eq!(v["middle_name"], json!(null));
    // derived from the birthdate
    assert_eq!(v["age"], 34);
  }

  #[test]
  fn form_row_requires_identifiers() {
    let err = DonorFormRow::new(&record(), &DeclarationRecord::default(), today());
    assert!(matches!(err, Err(Error::MissingIdentifiers)));
  }

  #[test]
  fn form_row_merges_declaration() {
    let mut r = record();
    r.identifiers = Some(GeneratedIdentifiers {
      registry_number: "PRC-2025-12345".into(),
      lab_barcode:     "DOH-20250314-54321".into(),
    });
    let mut d = DeclarationRecord::default();
    d.set(DeclarationField::DonorSignature, "Juan Dela Cruz");
    let at = "2025-03-14T08:30:00Z".parse::<DateTime<Utc>>().unwrap();
    let row = DonorFormRow::new(&r, &d.stamped(at), today()).unwrap();
    let v = Row::DonorForm(row).to_json().unwrap();
    assert_eq!(v["prc_donor_number"], "PRC-2025-12345");
    assert_eq!(v["doh_nnbnets_barcode"], "DOH-20250314-54321");
    assert_eq!(v["donor_signature"], "Juan Dela Cruz");
    assert_eq!(v["guardian_signature"], json!(null));
    assert_eq!(v["submitted_at"], "2025-03-14T08:30:00Z");
    assert_eq!(v["surname"], "Dela Cruz");
  }

  #[test]
  fn row_knows_its_table() {
    let row = DonorDetailRow::new("u", &record(), today()).unwrap();
    assert_eq!(Row::DonorDetail(row).table().to_string(), "donors_detail");
    assert_eq!(Table::DonorForm.as_str(), "donor_form");
  }

  #[test]
  fn profile_reads_legacy_and_partial_rows() {
    let profile: DonorProfile = serde_json::from_value(json!({
      "id": "abc",
      "surname": "Santos",
      "birthdate": "1988-11-02T00:00:00.000Z",
      "age": "36",
      "sex": "female",
      "civil_status": null,
      "id_prc": "7788",
      "unexpected_column": true
    }))
    .unwrap();
    assert_eq!(profile.surname.as_deref(), Some("Santos"));
    assert_eq!(profile.birthdate, NaiveDate::from_ymd_opt(1988, 11, 2));
    assert_eq!(profile.age, Some(36));
    assert_eq!(profile.sex, Some(Sex::Female));
    assert_eq!(profile.civil_status, None);
    assert_eq!(profile.identification.prc.as_deref(), Some("7788"));
    assert_eq!(profile.email, None);
  }

  #[test]
  fn out_of_range_age_reads_as_absent() {
    for age in [json!(-1), json!(34.5), json!(true)] {
      let profile: DonorProfile =
        serde_json::from_value(json!({ "surname": "Santos", "age": age })).unwrap();
      assert_eq!(profile.age, None);
      assert_eq!(profile.surname.as_deref(), Some("Santos"));
    }
  }

  #[test]
  fn profile_from_inserted_row_prefills_record() {
    let row = DonorDetailRow::new("user-9", &record(), today()).unwrap();
    let profile = DonorProfile::from(&row);
    let again = DonorRecord::from_profile(&profile, today());
    assert_eq!(again.surname, "Dela Cruz");
    assert_eq!(again.civil_status, CivilStatus::Married);
    assert_eq!(again.identification.drivers.as_deref(), Some("N01-99"));
  }
}
