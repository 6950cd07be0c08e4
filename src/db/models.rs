use crate::error::QrgenError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One inventory row. Field order is the serialization order of the QR payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Record {
    pub s_no: i64,
    pub lp_no: String,
    pub items: String,
    pub issue_voucher_number: String,
}

impl Record {
    /// JSON text encoded into the QR symbol and served by `/api/item/{id}`.
    pub fn payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Caller-supplied fields of a record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    lp_no: String,
    items: String,
    issue_voucher_number: String,
}

impl NewRecord {
    pub fn new(
        lp_no: impl Into<String>,
        items: impl Into<String>,
        issue_voucher_number: impl Into<String>,
    ) -> Result<Self, QrgenError> {
        let rec = Self {
            lp_no: lp_no.into(),
            items: items.into(),
            issue_voucher_number: issue_voucher_number.into(),
        };
        if rec.lp_no.is_empty() || rec.items.is_empty() || rec.issue_voucher_number.is_empty() {
            return Err(QrgenError::Validation("All fields are required.".to_string()));
        }
        Ok(rec)
    }

    pub fn lp_no(&self) -> &str {
        &self.lp_no
    }

    pub fn items(&self) -> &str {
        &self.items
    }

    pub fn issue_voucher_number(&self) -> &str {
        &self.issue_voucher_number
    }

    pub fn into_record(self, s_no: i64) -> Record {
        Record {
            s_no,
            lp_no: self.lp_no,
            items: self.items,
            issue_voucher_number: self.issue_voucher_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_keeps_field_order() {
        let rec = Record {
            s_no: 7,
            lp_no: "LP1".into(),
            items: "Widget".into(),
            issue_voucher_number: "V1".into(),
        };
        assert_eq!(
            rec.payload().unwrap(),
            r#"{"s_no":7,"lp_no":"LP1","items":"Widget","issue_voucher_number":"V1"}"#
        );
    }

    #[test]
    fn empty_fields_are_rejected() {
        assert!(matches!(
            NewRecord::new("", "Widget", "V1"),
            Err(QrgenError::Validation(_))
        ));
        assert!(matches!(
            NewRecord::new("LP1", "", "V1"),
            Err(QrgenError::Validation(_))
        ));
        assert!(matches!(
            NewRecord::new("LP1", "Widget", ""),
            Err(QrgenError::Validation(_))
        ));
        assert!(NewRecord::new("LP1", "Widget", "V1").is_ok());
    }
}
