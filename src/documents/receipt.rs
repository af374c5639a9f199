//! Printable receipts: an 80mm thermal cash receipt and an A4 sales receipt.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::html::{blank, escape_html, field, format_amount, format_rub, page, PRINT_ON_LOAD};
use super::words::number_to_words_rub;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: u32,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    /// Defaults to `quantity × price`.
    #[schema(value_type = Option<String>)]
    pub amount: Option<BigDecimal>,
}

impl Default for ReceiptLine {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: 1,
            price: BigDecimal::zero(),
            amount: None,
        }
    }
}

impl ReceiptLine {
    pub fn line_amount(&self) -> BigDecimal {
        match &self.amount {
            Some(amount) => amount.clone(),
            None => &self.price * &BigDecimal::from(self.quantity),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ReceiptTemplateData {
    pub receipt_number: String,
    /// Printed verbatim; the caller stamps it.
    pub generated_at: String,
    pub agency_name: String,
    pub agency_inn: String,
    pub agency_address: String,
    pub agent_name: String,
    pub client_name: String,
    pub payment_method: String,
    pub items: Vec<ReceiptLine>,
    #[schema(value_type = Option<String>)]
    pub rounding_amount: Option<BigDecimal>,
    #[schema(value_type = Option<String>)]
    pub debt_amount: Option<BigDecimal>,
    /// Defaults to the sum of lines, rounding and debt.
    #[schema(value_type = Option<String>)]
    pub total: Option<BigDecimal>,
}

impl ReceiptTemplateData {
    pub fn total_amount(&self) -> BigDecimal {
        if let Some(total) = &self.total {
            return total.clone();
        }
        let lines = self
            .items
            .iter()
            .fold(BigDecimal::zero(), |acc, line| acc + line.line_amount());
        let rounding = self.rounding_amount.clone().unwrap_or_default();
        let debt = self.debt_amount.clone().unwrap_or_default();
        lines + rounding + debt
    }

    fn number_suffix(&self) -> String {
        if self.receipt_number.trim().is_empty() {
            format!(" № {}", blank(8))
        } else {
            format!(" № {}", escape_html(self.receipt_number.trim()))
        }
    }
}

fn non_zero(amount: &Option<BigDecimal>) -> Option<&BigDecimal> {
    amount.as_ref().filter(|a| !a.is_zero())
}

// ── Cash receipt (80mm) ──────────────────────────────────────────────────────

const CASH_STYLE: &str = "@page{size:80mm auto;margin:3mm}\
body{width:74mm;margin:0;font-family:'Courier New',monospace;font-size:9pt;color:#000}\
.c{text-align:center}\
.b{font-weight:bold}\
.sep{border-top:1px dashed #000;margin:2mm 0}\
.row{display:flex;justify-content:space-between}\
.item{margin-bottom:1mm}\
.total{font-size:11pt;font-weight:bold}\
.small{font-size:8pt}";

fn cash_row(label: &str, value: &str) -> String {
    format!(
        "<div class=\"row\"><span>{}</span><span>{}</span></div>",
        label, value
    )
}

pub fn generate_cash_receipt_html(data: &ReceiptTemplateData) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<div class=\"c b\">{}</div>",
        field(&data.agency_name, 24)
    ));
    body.push_str(&format!(
        "<div class=\"c small\">ИНН {}</div><div class=\"c small\">{}</div>",
        field(&data.agency_inn, 12),
        field(&data.agency_address, 30)
    ));
    body.push_str("<div class=\"sep\"></div>");
    body.push_str(&format!(
        "<div class=\"c b\">КАССОВЫЙ ЧЕК{}</div>",
        data.number_suffix()
    ));
    body.push_str(&format!(
        "<div class=\"c small\">{}</div>",
        field(&data.generated_at, 16)
    ));
    body.push_str("<div class=\"sep\"></div>");

    for (i, line) in data.items.iter().enumerate() {
        body.push_str(&format!(
            "<div class=\"item\"><div>{}. {}</div>{}</div>",
            i + 1,
            field(&line.name, 20),
            cash_row(
                &format!("{} × {}", line.quantity, format_amount(&line.price)),
                &format_rub(&line.line_amount())
            )
        ));
    }

    body.push_str("<div class=\"sep\"></div>");
    if let Some(rounding) = non_zero(&data.rounding_amount) {
        body.push_str(&cash_row("Округление", &format_rub(rounding)));
    }
    if let Some(debt) = non_zero(&data.debt_amount) {
        body.push_str(&cash_row("Погашение долга", &format_rub(debt)));
    }
    let total = data.total_amount();
    body.push_str(&format!(
        "<div class=\"row total\"><span>ИТОГО</span><span>{}</span></div>",
        format_rub(&total)
    ));
    body.push_str(&cash_row("Оплата", &field(&data.payment_method, 12)));
    body.push_str("<div class=\"sep\"></div>");
    body.push_str(&format!(
        "<div class=\"small\">Клиент: {}</div><div class=\"small\">Агент: {}</div>",
        field(&data.client_name, 20),
        field(&data.agent_name, 20)
    ));
    body.push_str("<div class=\"c small\">Спасибо за обращение!</div>");
    body.push_str(PRINT_ON_LOAD);

    page("Кассовый чек", CASH_STYLE, &body)
}

// ── Sales receipt (A4) ───────────────────────────────────────────────────────

const SALES_STYLE: &str = "@page{size:A4;margin:20mm 10mm 20mm 30mm}\
body{font-family:'Times New Roman',serif;font-size:14pt;line-height:1.5;color:#000}\
h1{font-size:14pt;font-weight:bold;text-align:center;text-transform:uppercase;margin:0 0 6pt}\
p{margin:0;text-indent:12.5mm;text-align:justify}\
.org{text-align:left;text-indent:0;margin-bottom:12pt}\
table{width:100%;border-collapse:collapse;margin:12pt 0;font-size:12pt;line-height:1.2}\
th,td{border:1px solid #000;padding:2pt 4pt}\
th{font-weight:bold;text-align:center}\
td.n{text-align:center;width:8%}\
td.m{text-align:right;white-space:nowrap}\
.sign{margin-top:24pt;text-indent:0}";

pub fn generate_sales_receipt_html(data: &ReceiptTemplateData) -> String {
    let mut rows = String::new();
    for (i, line) in data.items.iter().enumerate() {
        rows.push_str(&format!(
            "<tr><td class=\"n\">{}</td><td>{}</td><td class=\"n\">{}</td><td class=\"m\">{}</td><td class=\"m\">{}</td></tr>",
            i + 1,
            field(&line.name, 30),
            line.quantity,
            format_amount(&line.price),
            format_amount(&line.line_amount())
        ));
    }
    let mut extra = 0;
    if let Some(rounding) = non_zero(&data.rounding_amount) {
        extra += 1;
        rows.push_str(&format!(
            "<tr><td class=\"n\">{}</td><td>Округление</td><td class=\"n\">1</td><td class=\"m\">{}</td><td class=\"m\">{}</td></tr>",
            data.items.len() + extra,
            format_amount(rounding),
            format_amount(rounding)
        ));
    }
    if let Some(debt) = non_zero(&data.debt_amount) {
        extra += 1;
        rows.push_str(&format!(
            "<tr><td class=\"n\">{}</td><td>Погашение задолженности</td><td class=\"n\">1</td><td class=\"m\">{}</td><td class=\"m\">{}</td></tr>",
            data.items.len() + extra,
            format_amount(debt),
            format_amount(debt)
        ));
    }

    let total = data.total_amount();
    let mut body = String::new();
    body.push_str(&format!(
        "<p class=\"org\">{}<br>ИНН {}<br>{}</p>",
        field(&data.agency_name, 40),
        field(&data.agency_inn, 12),
        field(&data.agency_address, 50)
    ));
    body.push_str(&format!(
        "<h1>Товарный чек{} от {}</h1>",
        data.number_suffix(),
        field(&data.generated_at, 16)
    ));
    body.push_str(&format!("<p>Покупатель: {}</p>", field(&data.client_name, 40)));
    body.push_str(&format!(
        "<table><thead><tr><th>№</th><th>Наименование</th><th>Кол-во</th><th>Цена, ₽</th><th>Сумма, ₽</th></tr></thead><tbody>{}</tbody>\
<tfoot><tr><td colspan=\"4\" class=\"m\"><b>Итого:</b></td><td class=\"m\"><b>{}</b></td></tr></tfoot></table>",
        rows,
        format_amount(&total)
    ));
    body.push_str(&format!(
        "<p>Всего наименований {}, на сумму {}</p>",
        data.items.len() + extra,
        format_rub(&total)
    ));
    body.push_str(&format!(
        "<p><b>{}</b></p>",
        escape_html(&number_to_words_rub(&total))
    ));
    body.push_str(&format!(
        "<p>Форма оплаты: {}</p>",
        field(&data.payment_method, 20)
    ));
    body.push_str(&format!(
        "<p class=\"sign\">Продавец {} / {}</p>",
        blank(20),
        field(&data.agent_name, 30)
    ));
    body.push_str(PRINT_ON_LOAD);

    page("Товарный чек", SALES_STYLE, &body)
}
