//! Transfer (양도양수) listing models

use serde::{Deserialize, Serialize};

use super::text::{optional_label, required_label};
use super::{Body, Title, ValidationError};

/// Highest accepted price, in 만원 (10k KRW) units
const MAX_PRICE: i64 = 10_000_000;

/// What is being transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferCategory {
    Hospital,
    Equipment,
    Lease,
}

impl TransferCategory {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "hospital" => Ok(Self::Hospital),
            "equipment" => Ok(Self::Equipment),
            "lease" => Ok(Self::Lease),
            _ => Err(ValidationError::InvalidVariant {
                field: "transfer category",
                value: s.to_owned(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospital => "hospital",
            Self::Equipment => "equipment",
            Self::Lease => "lease",
        }
    }
}

/// Listing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Active,
    Reserved,
    Completed,
}

impl TransferStatus {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "reserved" => Ok(Self::Reserved),
            "completed" => Ok(Self::Completed),
            _ => Err(ValidationError::InvalidVariant {
                field: "transfer status",
                value: s.to_owned(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Reserved => "reserved",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferSort {
    #[default]
    Latest,
    PriceAsc,
    PriceDesc,
    Views,
}

impl TransferSort {
    pub fn parse(s: Option<&str>) -> Result<Self, ValidationError> {
        match s.map(str::trim).filter(|s| !s.is_empty()) {
            None | Some("latest") => Ok(Self::Latest),
            Some("price_asc") => Ok(Self::PriceAsc),
            Some("price_desc") => Ok(Self::PriceDesc),
            Some("views") => Ok(Self::Views),
            Some(other) => Err(ValidationError::InvalidVariant {
                field: "sort",
                value: other.to_owned(),
            }),
        }
    }

    pub fn order_by(&self) -> &'static str {
        match self {
            Self::Latest => "t.created_at DESC",
            Self::PriceAsc => "t.price ASC NULLS LAST, t.created_at DESC",
            Self::PriceDesc => "t.price DESC NULLS LAST, t.created_at DESC",
            Self::Views => "t.view_count DESC, t.created_at DESC",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferListParams {
    pub category: Option<String>,
    pub region: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub keyword: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferFilter {
    pub category: Option<TransferCategory>,
    pub region: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub keyword: Option<String>,
    pub sort: TransferSort,
}

impl TryFrom<TransferListParams> for TransferFilter {
    type Error = ValidationError;

    fn try_from(p: TransferListParams) -> Result<Self, Self::Error> {
        if let (Some(min), Some(max)) = (p.min_price, p.max_price) {
            if min > max {
                return Err(ValidationError::InvalidFormat {
                    field: "price",
                    reason: "minimum exceeds maximum",
                });
            }
        }

        Ok(Self {
            category: p
                .category
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(TransferCategory::parse)
                .transpose()?,
            region: optional_label("region", p.region.as_deref())?,
            min_price: p.min_price,
            max_price: p.max_price,
            keyword: optional_label("keyword", p.keyword.as_deref())?,
            sort: TransferSort::parse(p.sort.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferForm {
    pub title: String,
    pub category: String,
    pub region: String,
    pub price: Option<i64>,
    /// Floor area in square metres
    pub area: Option<f64>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferDraft {
    pub title: Title,
    pub category: TransferCategory,
    pub region: String,
    pub price: Option<i64>,
    pub area: Option<f64>,
    pub description: Body,
}

impl TransferForm {
    pub fn validate(self) -> Result<TransferDraft, ValidationError> {
        if let Some(price) = self.price {
            if !(0..=MAX_PRICE).contains(&price) {
                return Err(ValidationError::OutOfRange {
                    field: "price",
                    min: 0,
                    max: MAX_PRICE,
                });
            }
        }

        if let Some(area) = self.area {
            if !area.is_finite() || area < 0.0 {
                return Err(ValidationError::InvalidFormat {
                    field: "area",
                    reason: "must be a non-negative number",
                });
            }
        }

        Ok(TransferDraft {
            title: Title::new(&self.title)?,
            category: TransferCategory::parse(&self.category)?,
            region: required_label("region", &self.region)?,
            price: self.price,
            area: self.area,
            description: Body::new("description", &self.description)?,
        })
    }
}
