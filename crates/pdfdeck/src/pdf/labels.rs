//! Page label formatting (`/PageLabels` ranges).

/// Largest value written as roman numerals or letters; larger ones are decimal.
const MAX_STYLED: i64 = 10_000;

/// Numbering style of a label range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Decimal,
    UpperRoman,
    LowerRoman,
    UpperLetters,
    LowerLetters,
}

impl NumberStyle {
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"D" => Some(Self::Decimal),
            b"R" => Some(Self::UpperRoman),
            b"r" => Some(Self::LowerRoman),
            b"A" => Some(Self::UpperLetters),
            b"a" => Some(Self::LowerLetters),
            _ => None,
        }
    }

    pub fn format(&self, n: i64) -> String {
        if n <= 0 || n > MAX_STYLED {
            return n.to_string();
        }
        match self {
            Self::Decimal => n.to_string(),
            Self::UpperRoman => roman(n),
            Self::LowerRoman => roman(n).to_lowercase(),
            Self::UpperLetters => letters(n),
            Self::LowerLetters => letters(n).to_lowercase(),
        }
    }
}

/// Labels for the pages from `start` up to the next range.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRange {
    pub start: usize,
    /// No style means the label is the prefix alone
    pub style: Option<NumberStyle>,
    pub prefix: String,
    pub first: i64,
}

/// Label of `page`; `ranges` must be sorted by start.
pub fn label_for(ranges: &[LabelRange], page: usize) -> String {
    let Some(range) = ranges.iter().rev().find(|r| r.start <= page) else {
        return (page + 1).to_string();
    };
    let Some(value) = i64::try_from(page - range.start)
        .ok()
        .and_then(|offset| range.first.checked_add(offset))
    else {
        return (page + 1).to_string();
    };
    match range.style {
        Some(style) => format!("{}{}", range.prefix, style.format(value)),
        None => range.prefix.clone(),
    }
}

fn roman(mut n: i64) -> String {
    const NUMERALS: [(i64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// A..Z, then AA..ZZ, then AAA..ZZZ.
fn letters(n: i64) -> String {
    let index = (n - 1) % 26;
    let repeat = ((n - 1) / 26 + 1) as usize;
    let letter = (b'A' + index as u8) as char;
    std::iter::repeat_n(letter, repeat).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: usize, style: Option<NumberStyle>, prefix: &str, first: i64) -> LabelRange {
        LabelRange {
            start,
            style,
            prefix: prefix.to_string(),
            first,
        }
    }

    #[test]
    fn test_styles() {
        assert_eq!(NumberStyle::Decimal.format(12), "12");
        assert_eq!(NumberStyle::UpperRoman.format(14), "XIV");
        assert_eq!(NumberStyle::LowerRoman.format(1994), "mcmxciv");
        assert_eq!(NumberStyle::UpperLetters.format(1), "A");
        assert_eq!(NumberStyle::UpperLetters.format(26), "Z");
        assert_eq!(NumberStyle::UpperLetters.format(27), "AA");
        assert_eq!(NumberStyle::LowerLetters.format(53), "aaa");
    }

    #[test]
    fn test_large_values_are_decimal() {
        assert_eq!(NumberStyle::UpperRoman.format(10_000), "M".repeat(10));
        assert_eq!(NumberStyle::UpperRoman.format(1_000_000_000_000), "1000000000000");
        assert_eq!(NumberStyle::LowerLetters.format(260_000_000), "260000000");
        assert_eq!(NumberStyle::Decimal.format(-3), "-3");
    }

    #[test]
    fn test_overflowing_start_falls_back_to_page_number() {
        let ranges = vec![range(0, Some(NumberStyle::UpperRoman), "p", i64::MAX)];
        assert_eq!(label_for(&ranges, 0), format!("p{}", i64::MAX));
        assert_eq!(label_for(&ranges, 1), "2");
    }

    #[test]
    fn test_label_ranges() {
        let ranges = vec![
            range(0, Some(NumberStyle::LowerRoman), "", 1),
            range(2, Some(NumberStyle::Decimal), "", 1),
            range(5, Some(NumberStyle::Decimal), "A-", 8),
            range(7, None, "Appendix", 1),
        ];
        let labels: Vec<String> = (0..9).map(|p| label_for(&ranges, p)).collect();
        assert_eq!(
            labels,
            vec!["i", "ii", "1", "2", "3", "A-8", "A-9", "Appendix", "Appendix"]
        );
    }

    #[test]
    fn test_pages_before_first_range_are_numbered() {
        let ranges = vec![range(3, Some(NumberStyle::Decimal), "", 1)];
        assert_eq!(label_for(&ranges, 0), "1");
        assert_eq!(label_for(&ranges, 3), "1");
        assert_eq!(label_for(&[], 4), "5");
    }

    #[test]
    fn test_repeated_beamer_labels() {
        // Beamer writes one range per page; overlays repeat the same label.
        let ranges = vec![
            range(0, Some(NumberStyle::Decimal), "", 1),
            range(1, Some(NumberStyle::Decimal), "", 2),
            range(2, Some(NumberStyle::Decimal), "", 2),
            range(3, Some(NumberStyle::Decimal), "", 3),
        ];
        let labels: Vec<String> = (0..4).map(|p| label_for(&ranges, p)).collect();
        assert_eq!(labels, vec!["1", "2", "2", "3"]);
    }
}
