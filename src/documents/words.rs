//! Sum-in-words for contracts and receipts: `Сто пятьдесят тысяч рублей 00 копеек`.

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, RoundingMode, Signed, ToPrimitive, Zero};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Gender {
    Masculine,
    Feminine,
}

const UNITS_MASCULINE: [&str; 10] = [
    "", "один", "два", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять",
];
const UNITS_FEMININE: [&str; 10] = [
    "", "одна", "две", "три", "четыре", "пять", "шесть", "семь", "восемь", "девять",
];
const TEENS: [&str; 10] = [
    "десять",
    "одиннадцать",
    "двенадцать",
    "тринадцать",
    "четырнадцать",
    "пятнадцать",
    "шестнадцать",
    "семнадцать",
    "восемнадцать",
    "девятнадцать",
];
const TENS: [&str; 10] = [
    "",
    "",
    "двадцать",
    "тридцать",
    "сорок",
    "пятьдесят",
    "шестьдесят",
    "семьдесят",
    "восемьдесят",
    "девяносто",
];
const HUNDREDS: [&str; 10] = [
    "",
    "сто",
    "двести",
    "триста",
    "четыреста",
    "пятьсот",
    "шестьсот",
    "семьсот",
    "восемьсот",
    "девятьсот",
];

/// Scale words from the top down, with the grammatical gender of each.
const SCALES: [(u64, [&str; 3], Gender); 3] = [
    (
        1_000_000_000,
        ["миллиард", "миллиарда", "миллиардов"],
        Gender::Masculine,
    ),
    (
        1_000_000,
        ["миллион", "миллиона", "миллионов"],
        Gender::Masculine,
    ),
    (1_000, ["тысяча", "тысячи", "тысяч"], Gender::Feminine),
];

const RUBLES: [&str; 3] = ["рубль", "рубля", "рублей"];
const KOPECKS: [&str; 3] = ["копейка", "копейки", "копеек"];

/// Picks the one/few/many form. 11–19 always take "many".
pub fn plural_form<'a>(n: u64, forms: &[&'a str; 3]) -> &'a str {
    let last_two = n % 100;
    let last = n % 10;
    if (11..=19).contains(&last_two) {
        forms[2]
    } else if last == 1 {
        forms[0]
    } else if (2..=4).contains(&last) {
        forms[1]
    } else {
        forms[2]
    }
}

fn triad_words(n: u64, gender: Gender, out: &mut Vec<&'static str>) {
    let hundreds = (n / 100) as usize;
    let rest = n % 100;
    if hundreds > 0 {
        out.push(HUNDREDS[hundreds]);
    }
    if (10..=19).contains(&rest) {
        out.push(TEENS[(rest - 10) as usize]);
        return;
    }
    let tens = (rest / 10) as usize;
    let units = (rest % 10) as usize;
    if tens > 0 {
        out.push(TENS[tens]);
    }
    if units > 0 {
        let table = match gender {
            Gender::Masculine => &UNITS_MASCULINE,
            Gender::Feminine => &UNITS_FEMININE,
        };
        out.push(table[units]);
    }
}

/// Lower-case words for a whole number of rubles, without the currency word.
pub fn integer_to_words(mut n: u64) -> String {
    if n == 0 {
        return "ноль".to_string();
    }
    let mut words: Vec<&'static str> = Vec::new();
    if n >= 1_000_000_000_000 {
        // Beyond any sum the agency writes on paper; keep the digits.
        return n.to_string();
    }
    for (scale, forms, gender) in SCALES {
        let count = n / scale;
        if count > 0 {
            triad_words(count, gender, &mut words);
            words.push(plural_form(count, &forms));
        }
        n %= scale;
    }
    triad_words(n, Gender::Masculine, &mut words);
    words.join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whole rubles and kopecks of `amount`, rounded half-up to kopecks.
fn split_rubles(amount: &BigDecimal) -> (BigInt, u64) {
    let (kopecks, _) = (amount.abs() * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .into_bigint_and_exponent();
    let hundred = BigInt::from(100);
    let rest = (&kopecks % &hundred).to_u64().unwrap_or(0);
    (kopecks / hundred, rest)
}

pub fn number_to_words_rub(amount: &BigDecimal) -> String {
    let (rubles, kopecks) = split_rubles(amount);
    // Sums past u64 keep their digits; only the last two pick the plural.
    let (rubles_text, plural_of) = match rubles.to_u64() {
        Some(n) => (integer_to_words(n), n),
        None => (
            rubles.to_string(),
            (&rubles % BigInt::from(100)).to_u64().unwrap_or(0),
        ),
    };
    let text = format!(
        "{} {} {:02} {}",
        rubles_text,
        plural_form(plural_of, &RUBLES),
        kopecks,
        plural_form(kopecks, &KOPECKS)
    );
    if amount.is_negative() && (!rubles.is_zero() || kopecks > 0) {
        format!("Минус {}", text)
    } else {
        capitalize(&text)
    }
}
