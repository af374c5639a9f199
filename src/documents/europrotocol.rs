//! Accident notice filled without the police (извещение о ДТП, «европротокол»).
//!
//! The layout reproduces the paper form: a front sheet with a column per
//! vehicle around the circumstances checklist, then one back sheet per
//! vehicle. Everything is placed absolutely in millimetres.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::html::{blank, escape_html, field, page, parse_iso_date};

/// Item 14 of the form, in printed order.
pub const CIRCUMSTANCES: [&str; 17] = [
    "стояло (поставлено на стоянку, парковку, остановку)",
    "двигалось на стоянке (парковке)",
    "выезжало со стоянки, с места парковки, остановки, со двора, второстепенной дороги",
    "заезжало на стоянку, парковку, во двор, на второстепенную дорогу",
    "двигалось прямо (не маневрировало)",
    "двигалось на перекрёстке",
    "заезжало на перекрёсток с круговым движением",
    "двигалось по перекрёстку с круговым движением",
    "столкнулось с ТС, двигавшимся в том же направлении по той же полосе",
    "столкнулось с ТС, двигавшимся в том же направлении по другой полосе (в другом ряду)",
    "меняло полосу (перестраивалось в другой ряд)",
    "обгоняло",
    "поворачивало направо",
    "поворачивало налево",
    "совершало разворот",
    "двигалось задним ходом",
    "выехало на сторону дороги, предназначенную для встречного движения",
];

const VIN_CELLS: usize = 17;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EuroprotocolVehicle {
    pub brand_model: String,
    pub vin: String,
    pub plate: String,
    pub registration_certificate: String,
    pub owner_name: String,
    pub owner_address: String,
    pub driver_name: String,
    pub driver_birth_date: String,
    pub driver_address: String,
    pub driver_phone: String,
    pub license_number: String,
    pub license_category: String,
    pub license_issue_date: String,
    pub insurer_name: String,
    pub policy_series: String,
    pub policy_number: String,
    pub policy_valid_until: String,
    pub has_kasko: bool,
    pub initial_impact: String,
    pub damage_description: String,
    pub remarks: String,
    /// Checked items of the circumstances list, numbered from 1.
    pub circumstances: Vec<u8>,
    pub accident_description: String,
    pub can_move: Option<bool>,
    pub vehicle_location: String,
    pub back_remarks: String,
}

impl EuroprotocolVehicle {
    pub fn is_checked(&self, item: usize) -> bool {
        self.circumstances.iter().any(|&c| c as usize == item)
    }

    /// Number of distinct valid items ticked, as written under the checklist.
    pub fn checked_count(&self) -> usize {
        (1..=CIRCUMSTANCES.len()).filter(|&i| self.is_checked(i)).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EuroprotocolData {
    pub accident_place: String,
    pub accident_date: String,
    pub accident_time: String,
    pub injured_persons: bool,
    pub other_property_damage: bool,
    pub witnesses: String,
    pub police_recorded: bool,
    pub scheme_notes: String,
    pub vehicle_a: EuroprotocolVehicle,
    pub vehicle_b: EuroprotocolVehicle,
}

const STYLE: &str = "@page{size:A4;margin:0}\
body{margin:0;font-family:Arial,Helvetica,sans-serif;font-size:7.5pt;color:#000}\
.sheet{position:relative;width:210mm;height:297mm;overflow:hidden;page-break-after:always}\
.sheet:last-child{page-break-after:auto}\
.t{position:absolute;line-height:1.2}\
.h{font-weight:bold}\
.title{font-size:10pt;font-weight:bold;text-align:center}\
.fill{border-bottom:0.2mm solid #000;min-height:3.5mm;white-space:nowrap;overflow:hidden}\
.area{border:0.2mm solid #000;padding:1mm;box-sizing:border-box;overflow:hidden}\
.cb{position:absolute;width:3.5mm;height:3.5mm;border:0.3mm solid #000;box-sizing:border-box;text-align:center;line-height:3.2mm;font-size:8pt}\
.cell{position:absolute;width:4mm;height:4.5mm;border:0.2mm solid #000;box-sizing:border-box;text-align:center;line-height:4.3mm;font-size:8pt}\
.dot{position:absolute;width:2mm;height:4.5mm;text-align:center;line-height:4.3mm}\
.frame{position:absolute;border:0.3mm solid #000;box-sizing:border-box}\
.va{color:#1a4f9c}\
.vb{color:#a0522d}";

/// Absolute-positioned form builder working in millimetres.
pub struct EuroprotocolBuilder {
    sheets: Vec<String>,
    current: String,
}

impl Default for EuroprotocolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EuroprotocolBuilder {
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            current: String::new(),
        }
    }

    pub fn new_sheet(&mut self) {
        if !self.current.is_empty() {
            self.sheets.push(std::mem::take(&mut self.current));
        }
    }

    fn push(&mut self, markup: String) {
        self.current.push_str(&markup);
    }

    /// Fixed form text.
    pub fn label(&mut self, x: f32, y: f32, w: f32, text: &str, class: &str) {
        self.push(format!(
            "<div class=\"t {}\" style=\"left:{}mm;top:{}mm;width:{}mm\">{}</div>",
            class,
            x,
            y,
            w,
            escape_html(text)
        ));
    }

    /// Underlined single-line value; blank values show a placeholder.
    pub fn value(&mut self, x: f32, y: f32, w: f32, value: &str, placeholder: usize) {
        self.push(format!(
            "<div class=\"t fill\" style=\"left:{}mm;top:{}mm;width:{}mm\">{}</div>",
            x,
            y,
            w,
            field(value, placeholder)
        ));
    }

    /// Signature line: blank to sign on, then the printed name.
    pub fn signature(&mut self, x: f32, y: f32, w: f32, name: &str) {
        self.push(format!(
            "<div class=\"t fill\" style=\"left:{}mm;top:{}mm;width:{}mm\">{} / {}</div>",
            x,
            y,
            w,
            blank(20),
            field(name, 30)
        ));
    }

    /// Caption on one line, underlined value right below it.
    pub fn field_row(&mut self, x: f32, y: f32, w: f32, caption: &str, value: &str) {
        self.label(x, y, w, caption, "");
        let placeholder = ((w / 1.6) as usize).clamp(20, 50);
        self.value(x, y + 3.5, w, value, placeholder);
    }

    /// Bordered multi-line text area.
    pub fn area(&mut self, x: f32, y: f32, w: f32, h: f32, value: &str) {
        self.push(format!(
            "<div class=\"t area\" style=\"left:{}mm;top:{}mm;width:{}mm;height:{}mm\">{}</div>",
            x,
            y,
            w,
            h,
            field(value, 40)
        ));
    }

    pub fn checkbox(&mut self, x: f32, y: f32, checked: bool) {
        self.push(format!(
            "<span class=\"cb\" style=\"left:{}mm;top:{}mm\">{}</span>",
            x,
            y,
            if checked { "✕" } else { "" }
        ));
    }

    /// One boxed cell per character, padded with empty cells up to `count`.
    pub fn cells(&mut self, x: f32, y: f32, value: &str, count: usize) {
        let chars: Vec<char> = value.trim().chars().collect();
        for i in 0..count {
            let content = chars
                .get(i)
                .map(|c| escape_html(&c.to_string()))
                .unwrap_or_default();
            self.push(format!(
                "<span class=\"cell\" style=\"left:{}mm;top:{}mm\">{}</span>",
                x + 4.0 * i as f32,
                y,
                content
            ));
        }
    }

    /// `DD.MM.YYYY` as eight boxed digits split by dots.
    pub fn date_cells(&mut self, x: f32, y: f32, value: &str) {
        let (day, month, year) = match parse_iso_date(value) {
            Some(date) => (
                date.format("%d").to_string(),
                date.format("%m").to_string(),
                date.format("%Y").to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        self.cells(x, y, &day, 2);
        self.push(format!(
            "<span class=\"dot\" style=\"left:{}mm;top:{}mm\">.</span>",
            x + 8.0,
            y
        ));
        self.cells(x + 10.0, y, &month, 2);
        self.push(format!(
            "<span class=\"dot\" style=\"left:{}mm;top:{}mm\">.</span>",
            x + 18.0,
            y
        ));
        self.cells(x + 20.0, y, &year, 4);
    }

    pub fn frame(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.push(format!(
            "<div class=\"frame\" style=\"left:{}mm;top:{}mm;width:{}mm;height:{}mm\"></div>",
            x, y, w, h
        ));
    }

    pub fn finish(mut self) -> String {
        self.new_sheet();
        self.sheets
            .iter()
            .map(|sheet| format!("<div class=\"sheet\">{}</div>", sheet))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ── Front sheet ──────────────────────────────────────────────────────────────

const COLUMN_WIDTH: f32 = 68.0;
const COLUMN_A_X: f32 = 6.0;
const CENTER_X: f32 = 76.0;
const CENTER_WIDTH: f32 = 58.0;
const COLUMN_B_X: f32 = 136.0;
const COLUMNS_TOP: f32 = 46.0;

fn accident_header(b: &mut EuroprotocolBuilder, data: &EuroprotocolData) {
    b.label(
        10.0,
        8.0,
        190.0,
        "ИЗВЕЩЕНИЕ О ДОРОЖНО-ТРАНСПОРТНОМ ПРОИСШЕСТВИИ",
        "title",
    );

    b.field_row(6.0, 16.0, 120.0, "1. Место ДТП", &data.accident_place);
    b.label(132.0, 16.0, 40.0, "2. Дата ДТП", "");
    b.date_cells(132.0, 19.5, &data.accident_date);
    b.field_row(180.0, 16.0, 24.0, "Время", &data.accident_time);

    b.label(6.0, 28.0, 60.0, "3. Количество повреждённых ТС: 2", "");
    b.label(70.0, 28.0, 40.0, "Пострадавшие (раненые, погибшие)", "");
    b.checkbox(112.0, 28.0, data.injured_persons);
    b.label(120.0, 28.0, 70.0, "4. Материальный ущерб иному имуществу", "");
    b.checkbox(190.0, 28.0, data.other_property_damage);

    b.field_row(6.0, 34.0, 120.0, "5. Свидетели ДТП (ФИО, адрес, телефон)", &data.witnesses);
    b.label(132.0, 34.0, 56.0, "6. Проводилось оформление сотрудниками полиции", "");
    b.checkbox(190.0, 34.0, data.police_recorded);
}

fn vehicle_column(b: &mut EuroprotocolBuilder, x: f32, tag: &str, class: &str, v: &EuroprotocolVehicle) {
    let y = COLUMNS_TOP;
    let w = COLUMN_WIDTH;
    b.frame(x - 1.0, y - 1.0, w + 2.0, 166.0);
    b.label(x, y, w, &format!("Транспортное средство «{}»", tag), &format!("h {}", class));

    b.field_row(x, y + 5.0, w, "7. Марка, модель ТС", &v.brand_model);
    b.label(x, y + 13.0, w, "Идентификационный номер (VIN)", "");
    b.cells(x, y + 16.5, &v.vin, VIN_CELLS);
    b.field_row(x, y + 23.0, w, "Государственный регистрационный знак", &v.plate);
    b.field_row(x, y + 31.0, w, "Свидетельство о регистрации ТС", &v.registration_certificate);

    b.field_row(x, y + 39.0, w, "8. Собственник ТС (ФИО, наименование)", &v.owner_name);
    b.field_row(x, y + 47.0, w, "Адрес собственника", &v.owner_address);

    b.field_row(x, y + 55.0, w, "9. Водитель ТС (ФИО)", &v.driver_name);
    b.label(x, y + 63.0, w, "Дата рождения", "");
    b.date_cells(x, y + 66.5, &v.driver_birth_date);
    b.field_row(x, y + 73.0, w, "Адрес водителя", &v.driver_address);
    b.field_row(x, y + 81.0, w, "Телефон", &v.driver_phone);
    b.field_row(x, y + 89.0, w, "Водительское удостоверение (серия, номер)", &v.license_number);
    b.field_row(x, y + 97.0, 20.0, "Категория", &v.license_category);
    b.label(x + 24.0, y + 97.0, 44.0, "Дата выдачи", "");
    b.date_cells(x + 24.0, y + 100.5, &v.license_issue_date);

    b.field_row(x, y + 106.0, w, "10. Страховщик", &v.insurer_name);
    b.field_row(
        x,
        y + 114.0,
        w,
        "Полис ОСАГО (серия, номер)",
        &format!("{} {}", v.policy_series.trim(), v.policy_number.trim()),
    );
    b.label(x, y + 122.0, w, "Действителен до", "");
    b.date_cells(x, y + 125.5, &v.policy_valid_until);
    b.checkbox(x, y + 131.5, v.has_kasko);
    b.label(x + 5.0, y + 131.5, w - 5.0, "ТС застраховано по договору КАСКО", "");

    b.field_row(x, y + 136.0, w, "11. Место первоначального удара", &v.initial_impact);
    b.label(x, y + 144.0, w, "12. Характер и перечень видимых повреждений", "");
    b.area(x, y + 147.5, w, 8.0, &v.damage_description);
    b.field_row(x, y + 156.0, w, "13. Замечания", &v.remarks);
}

fn circumstances_column(b: &mut EuroprotocolBuilder, data: &EuroprotocolData) {
    let x = CENTER_X;
    let y = COLUMNS_TOP;
    b.frame(x - 1.0, y - 1.0, CENTER_WIDTH + 2.0, 166.0);
    b.label(x, y, CENTER_WIDTH, "14. Обстоятельства ДТП", "h");
    b.label(x, y + 3.5, 6.0, "А", "h va");
    b.label(x + 6.0, y + 3.5, 46.0, "нужное отметить", "");
    b.label(x + 54.5, y + 3.5, 4.0, "Б", "h vb");

    let label_x = x + 5.0;
    let box_b_x = x + CENTER_WIDTH - 3.5;
    for (i, text) in CIRCUMSTANCES.iter().enumerate() {
        let row_y = y + 8.0 + 8.0 * i as f32;
        b.checkbox(x, row_y, data.vehicle_a.is_checked(i + 1));
        b.label(label_x, row_y, CENTER_WIDTH - 10.0, &format!("{}. {}", i + 1, text), "");
        b.checkbox(box_b_x, row_y, data.vehicle_b.is_checked(i + 1));
    }

    let count_y = y + 8.0 + 8.0 * CIRCUMSTANCES.len() as f32 + 2.0;
    b.cells(x, count_y, &data.vehicle_a.checked_count().to_string(), 2);
    b.label(label_x + 4.0, count_y, CENTER_WIDTH - 18.0, "Количество отмеченных клеток", "");
    b.cells(box_b_x - 4.5, count_y, &data.vehicle_b.checked_count().to_string(), 2);
}

fn scheme_and_signatures(b: &mut EuroprotocolBuilder, data: &EuroprotocolData) {
    b.label(6.0, 214.0, 198.0, "15. Схема ДТП", "h");
    b.area(6.0, 218.0, 198.0, 46.0, &data.scheme_notes);

    b.label(6.0, 268.0, 198.0, "16. Подписи водителей, удостоверяющие отсутствие разногласий по пп. 14, 15", "h");
    b.label(6.0, 274.0, 12.0, "ТС «А»", "va");
    b.signature(20.0, 274.0, 80.0, &data.vehicle_a.driver_name);
    b.label(106.0, 274.0, 12.0, "ТС «Б»", "vb");
    b.signature(120.0, 274.0, 80.0, &data.vehicle_b.driver_name);
}

// ── Back sheets ──────────────────────────────────────────────────────────────

fn back_sheet(b: &mut EuroprotocolBuilder, tag: &str, v: &EuroprotocolVehicle, accident_date: &str) {
    b.new_sheet();
    b.label(
        10.0,
        10.0,
        190.0,
        &format!("ОБОРОТНАЯ СТОРОНА ИЗВЕЩЕНИЯ О ДТП — ТС «{}»", tag),
        "title",
    );

    b.label(10.0, 20.0, 190.0, "1. Обстоятельства ДТП", "h");
    b.area(10.0, 24.0, 190.0, 60.0, &v.accident_description);

    b.label(10.0, 90.0, 100.0, "2. ТС может передвигаться своим ходом?", "h");
    b.checkbox(120.0, 90.0, v.can_move == Some(true));
    b.label(125.0, 90.0, 10.0, "да", "");
    b.checkbox(140.0, 90.0, v.can_move == Some(false));
    b.label(145.0, 90.0, 10.0, "нет", "");
    b.field_row(10.0, 97.0, 190.0, "Если нет, где сейчас находится ТС", &v.vehicle_location);

    b.label(10.0, 108.0, 190.0, "3. Примечание", "h");
    b.area(10.0, 112.0, 190.0, 30.0, &v.back_remarks);

    b.label(10.0, 150.0, 40.0, "Дата заполнения", "");
    b.date_cells(10.0, 154.0, accident_date);
    b.label(110.0, 150.0, 90.0, &format!("Водитель ТС «{}»", tag), "");
    b.signature(110.0, 154.0, 90.0, &v.driver_name);
}

pub fn generate_europrotocol_html(data: &EuroprotocolData) -> String {
    let mut b = EuroprotocolBuilder::new();

    accident_header(&mut b, data);
    vehicle_column(&mut b, COLUMN_A_X, "А", "va", &data.vehicle_a);
    circumstances_column(&mut b, data);
    vehicle_column(&mut b, COLUMN_B_X, "Б", "vb", &data.vehicle_b);
    scheme_and_signatures(&mut b, data);

    back_sheet(&mut b, "А", &data.vehicle_a, &data.accident_date);
    back_sheet(&mut b, "Б", &data.vehicle_b, &data.accident_date);

    page("Извещение о ДТП", STYLE, &b.finish())
}
