//! Consent to personal data processing (согласие на обработку ПДн, 152-ФЗ).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::html::{blank, date_field, escape_html, field, page};

const DEFAULT_PURPOSES: [&str; 3] = [
    "заключение, исполнение и сопровождение договоров страхования",
    "оформление сопутствующих документов и квитанций",
    "информирование о сроках окончания действия полисов",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PndTemplateData {
    pub full_name: String,
    pub birth_date: String,
    pub passport_series: String,
    pub passport_number: String,
    pub passport_issued_by: String,
    pub passport_issue_date: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub operator_name: String,
    pub operator_inn: String,
    pub operator_address: String,
    /// Empty means the agency's standard purposes.
    pub purposes: Vec<String>,
    pub consent_date: String,
}

const STYLE: &str = "@page{size:A4;margin:20mm 15mm 20mm 25mm}\
body{font-family:'Times New Roman',serif;font-size:12pt;line-height:1.4;color:#000}\
.pnd h1{font-size:13pt;text-align:center;margin:0 0 5mm}\
.pnd p{margin:0 0 2.5mm;text-align:justify}\
.pnd ul{margin:0 0 3mm 6mm;padding:0}\
.pnd .sign{display:flex;justify-content:space-between;margin-top:10mm}";

fn purposes_list(purposes: &[String]) -> String {
    let items: Vec<String> = if purposes.iter().all(|p| p.trim().is_empty()) {
        DEFAULT_PURPOSES
            .iter()
            .map(|p| format!("<li>{}</li>", p))
            .collect()
    } else {
        purposes
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| format!("<li>{}</li>", escape_html(p.trim())))
            .collect()
    };
    format!("<ul>{}</ul>", items.concat())
}

/// The consent text without the page shell, for embedding into other documents.
pub fn generate_pnd_body_fragment(data: &PndTemplateData) -> String {
    let mut out = String::from("<div class=\"pnd\">");
    out.push_str("<h1>СОГЛАСИЕ НА ОБРАБОТКУ ПЕРСОНАЛЬНЫХ ДАННЫХ</h1>");
    out.push_str(&format!(
        "<p>Я, {}, {} г.р., паспорт серии {} № {}, выдан {} {}, зарегистрированный(ая) по адресу: {}, телефон: {}, e-mail: {},</p>",
        field(&data.full_name, 50),
        date_field(&data.birth_date, 10),
        field(&data.passport_series, 6),
        field(&data.passport_number, 8),
        field(&data.passport_issued_by, 40),
        date_field(&data.passport_issue_date, 10),
        field(&data.address, 50),
        field(&data.phone, 20),
        field(&data.email, 20),
    ));
    out.push_str(&format!(
        "<p>в соответствии со статьёй 9 Федерального закона от 27.07.2006 № 152-ФЗ «О персональных данных» даю согласие {} (ИНН {}, адрес: {}) на обработку моих персональных данных в следующих целях:</p>",
        field(&data.operator_name, 40),
        field(&data.operator_inn, 12),
        field(&data.operator_address, 50),
    ));
    out.push_str(&purposes_list(&data.purposes));
    out.push_str(
        "<p>Согласие распространяется на фамилию, имя, отчество, дату рождения, паспортные данные, адрес регистрации, контактные данные, сведения о транспортных средствах и договорах страхования.</p>",
    );
    out.push_str(
        "<p>Согласие предоставляется на совершение действий по сбору, записи, систематизации, накоплению, хранению, уточнению, использованию, передаче страховым организациям, обезличиванию, блокированию, удалению и уничтожению персональных данных, как с использованием средств автоматизации, так и без них.</p>",
    );
    out.push_str(
        "<p>Согласие действует до достижения целей обработки и может быть отозвано мной путём подачи письменного заявления оператору.</p>",
    );
    out.push_str(&format!(
        "<div class=\"sign\"><span>{}</span><span>{} / {}</span></div>",
        date_field(&data.consent_date, 10),
        blank(20),
        field(&data.full_name, 30)
    ));
    out.push_str("</div>");
    out
}

pub fn generate_pnd_html(data: &PndTemplateData) -> String {
    page(
        "Согласие на обработку персональных данных",
        STYLE,
        &generate_pnd_body_fragment(data),
    )
}
