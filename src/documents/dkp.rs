//! Vehicle sale and purchase contract (договор купли-продажи, ДКП).

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::html::{blank, date_field, escape_html, field, format_rub, long_date, page};
use super::words::number_to_words_rub;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DkpParty {
    pub full_name: String,
    pub birth_date: String,
    pub passport_series: String,
    pub passport_number: String,
    pub passport_issued_by: String,
    pub passport_issue_date: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DkpVehicle {
    pub brand_model: String,
    pub vehicle_type: String,
    pub vin: String,
    pub year: String,
    pub engine_number: String,
    pub chassis_number: String,
    pub body_number: String,
    pub color: String,
    pub plate: String,
    pub pts_series_number: String,
    pub pts_issued_by: String,
    pub pts_issue_date: String,
    pub sts_series_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DkpTemplateData {
    pub contract_number: String,
    pub city: String,
    pub contract_date: String,
    pub seller: DkpParty,
    pub buyer: DkpParty,
    pub vehicle: DkpVehicle,
    #[schema(value_type = Option<String>)]
    pub price: Option<BigDecimal>,
}

const STYLE: &str = "@page{size:A4;margin:15mm 15mm 15mm 20mm}\
body{font-family:'Times New Roman',serif;font-size:12pt;line-height:1.35;color:#000}\
h1{font-size:14pt;text-align:center;margin:0 0 4mm}\
.head{display:flex;justify-content:space-between;margin-bottom:5mm}\
p{margin:0 0 2.5mm;text-align:justify}\
table.vehicle{width:100%;border-collapse:collapse;margin:2mm 0 4mm}\
table.vehicle td{border:1px solid #000;padding:1mm 2mm;vertical-align:top}\
table.vehicle td.k{width:45%}\
.signs{display:flex;justify-content:space-between;margin-top:8mm}\
.sign{width:48%}\
.line{margin-top:6mm}";

fn party_paragraph(role: &str, party: &DkpParty) -> String {
    format!(
        "<p>{}, {}, {} г.р., паспорт серии {} № {}, выдан {} {}, зарегистрированный(ая) по адресу: {}, именуемый(ая) в дальнейшем «{}»,</p>",
        escape_html(role),
        field(&party.full_name, 50),
        date_field(&party.birth_date, 10),
        field(&party.passport_series, 6),
        field(&party.passport_number, 8),
        field(&party.passport_issued_by, 40),
        date_field(&party.passport_issue_date, 10),
        field(&party.address, 50),
        escape_html(role),
    )
}

fn vehicle_table(vehicle: &DkpVehicle) -> String {
    let rows = [
        ("Марка, модель", field(&vehicle.brand_model, 30)),
        ("Тип ТС", field(&vehicle.vehicle_type, 20)),
        ("Идентификационный номер (VIN)", field(&vehicle.vin, 30)),
        ("Год выпуска", field(&vehicle.year, 20)),
        ("Модель, № двигателя", field(&vehicle.engine_number, 20)),
        ("Шасси (рама) №", field(&vehicle.chassis_number, 20)),
        ("Кузов (кабина, прицеп) №", field(&vehicle.body_number, 20)),
        ("Цвет", field(&vehicle.color, 20)),
        ("Государственный регистрационный знак", field(&vehicle.plate, 20)),
        (
            "Паспорт ТС (серия, номер)",
            field(&vehicle.pts_series_number, 20),
        ),
        (
            "ПТС выдан",
            format!(
                "{} {}",
                field(&vehicle.pts_issued_by, 30),
                date_field(&vehicle.pts_issue_date, 10)
            ),
        ),
        (
            "Свидетельство о регистрации ТС",
            field(&vehicle.sts_series_number, 20),
        ),
    ];

    let body: String = rows
        .iter()
        .map(|(label, value)| format!("<tr><td class=\"k\">{}</td><td>{}</td></tr>", label, value))
        .collect();
    format!("<table class=\"vehicle\">{}</table>", body)
}

fn price_clause(price: Option<&BigDecimal>) -> String {
    match price {
        Some(price) => format!(
            "{} ({})",
            format_rub(price),
            escape_html(&number_to_words_rub(price))
        ),
        None => format!("{} ({})", blank(20), blank(50)),
    }
}

fn sign_block(role: &str, party: &DkpParty) -> String {
    format!(
        "<div class=\"sign\"><b>{}</b><div class=\"line\">{} / {}</div></div>",
        escape_html(role),
        blank(20),
        field(&party.full_name, 30)
    )
}

pub fn generate_dkp_html(data: &DkpTemplateData) -> String {
    let number = if data.contract_number.trim().is_empty() {
        String::new()
    } else {
        format!(" № {}", escape_html(data.contract_number.trim()))
    };

    let mut body = String::new();
    body.push_str(&format!(
        "<h1>ДОГОВОР КУПЛИ-ПРОДАЖИ ТРАНСПОРТНОГО СРЕДСТВА{}</h1>",
        number
    ));
    body.push_str(&format!(
        "<div class=\"head\"><span>г. {}</span><span>{}</span></div>",
        field(&data.city, 20),
        long_date(&data.contract_date)
    ));
    body.push_str(&party_paragraph("Продавец", &data.seller));
    body.push_str(&party_paragraph("Покупатель", &data.buyer));
    body.push_str("<p>совместно именуемые «Стороны», заключили настоящий договор о нижеследующем:</p>");

    body.push_str("<p><b>1. Предмет договора</b></p>");
    body.push_str(
        "<p>1.1. Продавец передаёт в собственность Покупателя, а Покупатель принимает и оплачивает транспортное средство (далее — ТС):</p>",
    );
    body.push_str(&vehicle_table(&data.vehicle));
    body.push_str(
        "<p>1.2. Продавец гарантирует, что ТС никому не продано, не заложено, в споре и под арестом не состоит, свободно от любых прав третьих лиц.</p>",
    );

    body.push_str("<p><b>2. Стоимость и порядок расчётов</b></p>");
    body.push_str(&format!(
        "<p>2.1. Стоимость ТС составляет {}.</p>",
        price_clause(data.price.as_ref())
    ));
    body.push_str(
        "<p>2.2. Покупатель оплачивает стоимость ТС в полном объёме в момент подписания настоящего договора.</p>",
    );

    body.push_str("<p><b>3. Передача транспортного средства</b></p>");
    body.push_str(
        "<p>3.1. Право собственности на ТС переходит к Покупателю с момента подписания настоящего договора.</p>",
    );
    body.push_str(
        "<p>3.2. Покупатель обязан в течение 10 дней с момента подписания договора изменить регистрационные данные о собственнике ТС.</p>",
    );

    body.push_str("<p><b>4. Заключительные положения</b></p>");
    body.push_str(
        "<p>4.1. Договор составлен в трёх экземплярах, имеющих равную юридическую силу, по одному для каждой из Сторон и один для регистрирующего органа.</p>",
    );

    body.push_str("<div class=\"signs\">");
    body.push_str(&sign_block(
        "Деньги получил, ТС передал (Продавец):",
        &data.seller,
    ));
    body.push_str(&sign_block(
        "Деньги передал, ТС получил (Покупатель):",
        &data.buyer,
    ));
    body.push_str("</div>");

    page(
        "Договор купли-продажи транспортного средства",
        STYLE,
        &body,
    )
}
