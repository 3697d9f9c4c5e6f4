/// Format a value as money with thousands separators: `$1,234.56`.
pub fn money(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let digits: Vec<char> = whole.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if val < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}
