use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Envelope for a successful delete; `data` is an empty object.
    pub fn deleted() -> Self {
        Self::success("Deleted", serde_json::json!({}), Some(Meta::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_meta_serializes_as_nulls() {
        let body = serde_json::to_value(ApiResponse::deleted()).unwrap();
        assert_eq!(body["message"], "Deleted");
        assert_eq!(body["data"], serde_json::json!({}));
        assert!(body["meta"]["total"].is_null());
    }

    #[test]
    fn page_meta_carries_totals() {
        let meta = Meta::new(2, 20, 41);
        assert_eq!((meta.page, meta.per_page, meta.total), (Some(2), Some(20), Some(41)));
    }
}
