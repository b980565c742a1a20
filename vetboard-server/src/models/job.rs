//! Job posting models: status, sort keys, list filters, and the posting form

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::text::{optional_label, required_label};
use super::{Body, Title, ValidationError};

/// Highest accepted salary value, in 만원 (10k KRW) units
const MAX_SALARY: i32 = 100_000;

/// Job posting lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Closed,
}

impl JobStatus {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(ValidationError::InvalidVariant {
                field: "job status",
                value: s.to_owned(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Sort orders offered by the job list page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSort {
    #[default]
    Latest,
    Deadline,
    Salary,
    Views,
}

impl JobSort {
    pub fn parse(s: Option<&str>) -> Result<Self, ValidationError> {
        match s.map(str::trim).filter(|s| !s.is_empty()) {
            None | Some("latest") => Ok(Self::Latest),
            Some("deadline") => Ok(Self::Deadline),
            Some("salary") => Ok(Self::Salary),
            Some("views") => Ok(Self::Views),
            Some(other) => Err(ValidationError::InvalidVariant {
                field: "sort",
                value: other.to_owned(),
            }),
        }
    }

    /// ORDER BY clause. Only ever built from this enum, never from input.
    pub fn order_by(&self) -> &'static str {
        match self {
            Self::Latest => "j.created_at DESC",
            Self::Deadline => "j.deadline ASC NULLS LAST, j.created_at DESC",
            Self::Salary => "j.salary_max DESC NULLS LAST, j.created_at DESC",
            Self::Views => "j.view_count DESC, j.created_at DESC",
        }
    }
}

/// Query parameters accepted by `GET /api/jobs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListParams {
    pub region: Option<String>,
    pub position: Option<String>,
    pub work_type: Option<String>,
    pub keyword: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

/// Validated job list filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub region: Option<String>,
    pub position: Option<String>,
    pub work_type: Option<String>,
    pub keyword: Option<String>,
    pub status: Option<JobStatus>,
    pub sort: JobSort,
}

impl TryFrom<JobListParams> for JobFilter {
    type Error = ValidationError;

    fn try_from(p: JobListParams) -> Result<Self, Self::Error> {
        Ok(Self {
            region: optional_label("region", p.region.as_deref())?,
            position: optional_label("position", p.position.as_deref())?,
            work_type: optional_label("work type", p.work_type.as_deref())?,
            keyword: optional_label("keyword", p.keyword.as_deref())?,
            status: p
                .status
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(JobStatus::parse)
                .transpose()?,
            sort: JobSort::parse(p.sort.as_deref())?,
        })
    }
}

/// Job posting form (create and full update)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobForm {
    pub title: String,
    pub hospital_name: String,
    pub position: String,
    pub work_type: Option<String>,
    pub region: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub description: String,
    pub deadline: Option<NaiveDate>,
}

/// Validated job posting
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub title: Title,
    pub hospital_name: String,
    pub position: String,
    pub work_type: Option<String>,
    pub region: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub description: Body,
    pub deadline: Option<NaiveDate>,
}

fn salary(field: &'static str, value: Option<i32>) -> Result<Option<i32>, ValidationError> {
    match value {
        Some(v) if !(0..=MAX_SALARY).contains(&v) => Err(ValidationError::OutOfRange {
            field,
            min: 0,
            max: MAX_SALARY as i64,
        }),
        other => Ok(other),
    }
}

impl JobForm {
    pub fn validate(self) -> Result<JobDraft, ValidationError> {
        let salary_min = salary("salary min", self.salary_min)?;
        let salary_max = salary("salary max", self.salary_max)?;

        if let (Some(min), Some(max)) = (salary_min, salary_max) {
            if min > max {
                return Err(ValidationError::InvalidFormat {
                    field: "salary",
                    reason: "minimum exceeds maximum",
                });
            }
        }

        Ok(JobDraft {
            title: Title::new(&self.title)?,
            hospital_name: required_label("hospital name", &self.hospital_name)?,
            position: required_label("position", &self.position)?,
            work_type: optional_label("work type", self.work_type.as_deref())?,
            region: required_label("region", &self.region)?,
            salary_min,
            salary_max,
            description: Body::new("description", &self.description)?,
            deadline: self.deadline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> JobForm {
        JobForm {
            title: "정규직 수의사 모집".into(),
            hospital_name: "행복동물병원".into(),
            position: "수의사".into(),
            region: "서울".into(),
            description: "진료 및 수술".into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_form() {
        let draft = form().validate().unwrap();
        assert_eq!(draft.title.as_str(), "정규직 수의사 모집");
        assert_eq!(draft.work_type, None);
    }

    #[test]
    fn rejects_inverted_salary_range() {
        let mut f = form();
        f.salary_min = Some(5000);
        f.salary_max = Some(3000);
        assert!(matches!(
            f.validate().unwrap_err(),
            ValidationError::InvalidFormat { field: "salary", .. }
        ));
    }

    #[test]
    fn missing_region() {
        let mut f = form();
        f.region = " ".into();
        assert_eq!(
            f.validate().unwrap_err(),
            ValidationError::Empty { field: "region" }
        );
    }

    #[test]
    fn sort_parsing() {
        assert_eq!(JobSort::parse(None).unwrap(), JobSort::Latest);
        assert_eq!(JobSort::parse(Some("")).unwrap(), JobSort::Latest);
        assert_eq!(JobSort::parse(Some("deadline")).unwrap(), JobSort::Deadline);
        assert!(JobSort::parse(Some("random; DROP TABLE jobs")).is_err());
    }

    #[test]
    fn filter_from_params() {
        let filter = JobFilter::try_from(JobListParams {
            region: Some(" 부산 ".into()),
            status: Some("OPEN".into()),
            sort: Some("views".into()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(filter.region.as_deref(), Some("부산"));
        assert_eq!(filter.status, Some(JobStatus::Open));
        assert_eq!(filter.sort, JobSort::Views);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = JobStatus::parse("archived").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVariant { .. }));
    }
}
