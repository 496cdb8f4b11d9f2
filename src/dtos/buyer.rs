use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::buyer::Buyer;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuyerRequest {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerResponse {
    pub id: i64,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Buyer> for BuyerResponse {
    fn from(b: Buyer) -> Self {
        Self {
            id: b.id,
            company_name: b.company_name,
            contact_name: b.contact_name,
            email: b.email,
            phone: b.phone,
            address: b.address,
            city: b.city,
            state: b.state,
            country: b.country,
            postal_code: b.postal_code,
            status: b.status,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSummary {
    pub id: i64,
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    pub email: String,
}

impl From<Buyer> for BuyerSummary {
    fn from(b: Buyer) -> Self {
        Self {
            id: b.id,
            company_name: b.company_name,
            contact_name: b.contact_name,
            email: b.email,
        }
    }
}
