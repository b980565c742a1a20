//! Résumé payloads - the form submitted by the résumé editor
//!
//! The editor submits the whole résumé at once: parent fields plus four
//! child collections. Child order in the arrays becomes `sort_order`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::text::{optional_label, required_label};
use super::{Email, ValidationError};

/// Maximum entries per child collection
const MAX_CHILD_ENTRIES: usize = 50;

/// Maximum length for long résumé text (introduction, self introduction)
const MAX_INTRO_LEN: usize = 10_000;

/// Highest accepted desired salary, in 만원 (10k KRW) units
const MAX_SALARY: i32 = 100_000;

/// Submitted résumé form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeForm {
    pub title: Option<String>,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub introduction: Option<String>,
    pub desired_position: Option<String>,
    pub desired_salary: Option<i32>,
    #[serde(default)]
    pub desired_work_types: Vec<String>,
    #[serde(default)]
    pub desired_regions: Vec<String>,
    pub available_date: Option<NaiveDate>,
    pub self_introduction: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub experiences: Vec<ExperienceForm>,
    #[serde(default)]
    pub licenses: Vec<LicenseForm>,
    #[serde(default)]
    pub educations: Vec<EducationForm>,
    #[serde(default)]
    pub medical_capabilities: Vec<CapabilityForm>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceForm {
    pub hospital_name: Option<String>,
    pub position: Option<String>,
    pub main_tasks: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseForm {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub acquired_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationForm {
    pub degree: Option<String>,
    pub school_name: Option<String>,
    pub major: Option<String>,
    pub gpa: Option<String>,
    pub total_gpa: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub graduation_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityForm {
    pub field: Option<String>,
    pub proficiency: Option<String>,
    pub description: Option<String>,
    pub others: Option<String>,
}

/// Validated résumé ready for persistence.
///
/// Child entries whose fields are all blank have already been dropped, and
/// every remaining entry carries the `sort_order` it will be stored with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDraft {
    pub title: Option<String>,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub photo_url: Option<String>,
    pub introduction: Option<String>,
    pub desired_position: Option<String>,
    pub desired_salary: Option<i32>,
    pub desired_work_types: Vec<String>,
    pub desired_regions: Vec<String>,
    pub available_date: Option<NaiveDate>,
    pub self_introduction: Option<String>,
    pub is_public: bool,
    pub experiences: Vec<Ordered<ExperienceForm>>,
    pub licenses: Vec<Ordered<LicenseForm>>,
    pub educations: Vec<Ordered<EducationForm>>,
    pub medical_capabilities: Vec<Ordered<CapabilityForm>>,
}

/// A child entry paired with its position in the submitted array.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordered<T> {
    pub sort_order: i32,
    pub entry: T,
}

/// Child entries report whether the user actually filled anything in.
trait Blank {
    fn is_blank(&self) -> bool;
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

impl Blank for ExperienceForm {
    fn is_blank(&self) -> bool {
        blank(&self.hospital_name)
            && blank(&self.position)
            && blank(&self.main_tasks)
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

impl Blank for LicenseForm {
    fn is_blank(&self) -> bool {
        blank(&self.name) && blank(&self.issuer) && self.acquired_date.is_none()
    }
}

impl Blank for EducationForm {
    fn is_blank(&self) -> bool {
        blank(&self.degree)
            && blank(&self.school_name)
            && blank(&self.major)
            && blank(&self.gpa)
            && blank(&self.total_gpa)
            && blank(&self.graduation_status)
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

impl Blank for CapabilityForm {
    fn is_blank(&self) -> bool {
        blank(&self.field) && blank(&self.proficiency) && blank(&self.description) && blank(&self.others)
    }
}

fn ordered<T: Blank>(field: &'static str, entries: Vec<T>) -> Result<Vec<Ordered<T>>, ValidationError> {
    if entries.len() > MAX_CHILD_ENTRIES {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_CHILD_ENTRIES,
        });
    }

    // sort_order follows the submitted position, so dropped blanks leave gaps
    Ok(entries
        .into_iter()
        .enumerate()
        .filter(|(_, entry)| !entry.is_blank())
        .map(|(i, entry)| Ordered {
            sort_order: i as i32,
            entry,
        })
        .collect())
}

fn date_range(
    field: &'static str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(ValidationError::InvalidFormat {
            field,
            reason: "end date is before start date",
        }),
        _ => Ok(()),
    }
}

fn long_text(field: &'static str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    match value.filter(|v| !v.trim().is_empty()) {
        Some(v) if v.chars().count() > MAX_INTRO_LEN => Err(ValidationError::TooLong {
            field,
            max: MAX_INTRO_LEN,
        }),
        other => Ok(other),
    }
}

fn labels(field: &'static str, values: Vec<String>) -> Result<Vec<String>, ValidationError> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if let Some(label) = optional_label(field, Some(&value))? {
            if !out.contains(&label) {
                out.push(label);
            }
        }
    }
    Ok(out)
}

impl ResumeForm {
    /// Validate the submitted form.
    pub fn validate(self) -> Result<ResumeDraft, ValidationError> {
        let name = required_label("name", &self.name)?;

        let email = match self.email.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => Some(Email::new(raw)?.as_str().to_owned()),
            None => None,
        };

        if let Some(salary) = self.desired_salary {
            if !(0..=MAX_SALARY).contains(&salary) {
                return Err(ValidationError::OutOfRange {
                    field: "desired salary",
                    min: 0,
                    max: MAX_SALARY as i64,
                });
            }
        }

        for exp in &self.experiences {
            date_range("experience", exp.start_date, exp.end_date)?;
        }
        for edu in &self.educations {
            date_range("education", edu.start_date, edu.end_date)?;
        }

        Ok(ResumeDraft {
            title: optional_label("title", self.title.as_deref())?,
            name,
            birth_date: self.birth_date,
            gender: optional_label("gender", self.gender.as_deref())?,
            phone: optional_label("phone", self.phone.as_deref())?,
            email,
            address: long_text("address", self.address)?,
            photo_url: long_text("photo url", self.photo_url)?,
            introduction: long_text("introduction", self.introduction)?,
            desired_position: optional_label("desired position", self.desired_position.as_deref())?,
            desired_salary: self.desired_salary,
            desired_work_types: labels("desired work type", self.desired_work_types)?,
            desired_regions: labels("desired region", self.desired_regions)?,
            available_date: self.available_date,
            self_introduction: long_text("self introduction", self.self_introduction)?,
            is_public: self.is_public,
            experiences: ordered("experiences", self.experiences)?,
            licenses: ordered("licenses", self.licenses)?,
            educations: ordered("educations", self.educations)?,
            medical_capabilities: ordered("medical capabilities", self.medical_capabilities)?,
        })
    }
}

/// Query parameters accepted by the public résumé list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeListParams {
    pub position: Option<String>,
    pub region: Option<String>,
    pub keyword: Option<String>,
}

/// Validated public résumé filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeFilter {
    pub position: Option<String>,
    pub region: Option<String>,
    pub keyword: Option<String>,
}

impl TryFrom<ResumeListParams> for ResumeFilter {
    type Error = ValidationError;

    fn try_from(p: ResumeListParams) -> Result<Self, Self::Error> {
        Ok(Self {
            position: optional_label("position", p.position.as_deref())?,
            region: optional_label("region", p.region.as_deref())?,
            keyword: optional_label("keyword", p.keyword.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ResumeForm {
        ResumeForm {
            name: "김수의".into(),
            ..Default::default()
        }
    }

    #[test]
    fn minimal_form_is_valid() {
        let draft = form().validate().unwrap();
        assert_eq!(draft.name, "김수의");
        assert!(draft.experiences.is_empty());
    }

    #[test]
    fn name_is_required() {
        let err = ResumeForm::default().validate().unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "name" });
    }

    #[test]
    fn blank_children_are_dropped_and_order_follows_position() {
        let mut f = form();
        f.licenses = vec![
            LicenseForm {
                name: Some("수의사 면허".into()),
                ..Default::default()
            },
            LicenseForm::default(),
            LicenseForm {
                name: Some("  ".into()),
                issuer: Some("농림축산식품부".into()),
                acquired_date: None,
            },
        ];

        let draft = f.validate().unwrap();
        let orders: Vec<i32> = draft.licenses.iter().map(|l| l.sort_order).collect();
        assert_eq!(orders, vec![0, 2]);
    }

    #[test]
    fn rejects_reversed_experience_dates() {
        let mut f = form();
        f.experiences = vec![ExperienceForm {
            hospital_name: Some("행복동물병원".into()),
            start_date: NaiveDate::from_ymd_opt(2022, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2021, 3, 1),
            ..Default::default()
        }];

        assert!(matches!(
            f.validate().unwrap_err(),
            ValidationError::InvalidFormat { field: "experience", .. }
        ));
    }

    #[test]
    fn rejects_negative_salary() {
        let mut f = form();
        f.desired_salary = Some(-1);
        assert!(matches!(
            f.validate().unwrap_err(),
            ValidationError::OutOfRange { .. }
        ));
    }

    #[test]
    fn dedupes_regions_and_drops_blank() {
        let mut f = form();
        f.desired_regions = vec!["서울".into(), " 서울 ".into(), "".into(), "경기".into()];
        let draft = f.validate().unwrap();
        assert_eq!(draft.desired_regions, vec!["서울", "경기"]);
    }

    #[test]
    fn too_many_children() {
        let mut f = form();
        f.licenses = vec![
            LicenseForm {
                name: Some("x".into()),
                ..Default::default()
            };
            51
        ];
        assert!(matches!(
            f.validate().unwrap_err(),
            ValidationError::TooLong { field: "licenses", max: 50 }
        ));
    }

    #[test]
    fn parses_camel_case_payload() {
        let json = r#"{
            "name": "박수의",
            "desiredSalary": 5000,
            "isPublic": true,
            "medicalCapabilities": [{"field": "외과", "proficiency": "상"}]
        }"#;
        let f: ResumeForm = serde_json::from_str(json).unwrap();
        let draft = f.validate().unwrap();
        assert!(draft.is_public);
        assert_eq!(draft.medical_capabilities[0].entry.field.as_deref(), Some("외과"));
    }
}
