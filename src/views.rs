//! Askama templates for the public form and the admin UI.

use crate::db::Record;
use crate::error::QrgenError;
use askama::Template;
use axum::response::Html;

/// Values echoed back into the form after a failed submission.
#[derive(Debug, Default, Clone)]
pub struct FormValues {
    pub table: String,
    pub lp_no: String,
    pub items: String,
    pub issue_voucher_number: String,
}

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub error: Option<String>,
    pub values: FormValues,
}

#[derive(Template)]
#[template(path = "success.html")]
pub struct SuccessTemplate {
    pub record: Record,
    pub table: String,
    pub qr_data_url: String,
    pub json_url: String,
    pub json_text: String,
}

#[derive(Template)]
#[template(path = "admin_login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// One listing row with its rendered QR images.
pub struct ListedRecord {
    pub record: Record,
    pub qr: String,
    pub qr_hd: String,
    pub json_url: String,
    pub json_text: String,
}

#[derive(Template)]
#[template(path = "admin_panel.html")]
pub struct AdminPanelTemplate {
    pub username: String,
    pub current_table: String,
    pub tables: Vec<String>,
    pub items: Vec<ListedRecord>,
}

pub fn render<T: Template>(template: &T) -> Result<Html<String>, QrgenError> {
    Ok(Html(template.render()?))
}
