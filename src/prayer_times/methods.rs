/// Calculation methods offered by the timing service, most common first.
pub const CALC_METHODS: &[(u8, &str)] = &[
    (2, "ISNA (North America)"),
    (3, "Muslim World League"),
    (4, "Umm al-Qura (Makkah)"),
    (5, "Egyptian General Authority"),
    (1, "University of Islamic Sciences, Karachi"),
    (8, "Gulf Region"),
    (9, "Kuwait"),
    (10, "Qatar"),
    (11, "Majlis Ugama Islam Singapura"),
    (12, "Union des Organisations Islamiques de France"),
];

pub fn method_label(id: u8) -> String {
    CALC_METHODS
        .iter()
        .find(|(m, _)| *m == id)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("Method {}", id))
}

/// The method after `id` in the table, wrapping. Unknown ids restart the list.
pub fn next_method(id: u8) -> u8 {
    let pos = CALC_METHODS.iter().position(|(m, _)| *m == id);
    match pos {
        Some(i) => CALC_METHODS[(i + 1) % CALC_METHODS.len()].0,
        None => CALC_METHODS[0].0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_known_and_unknown_ids() {
        assert_eq!(method_label(4), "Umm al-Qura (Makkah)");
        assert_eq!(method_label(99), "Method 99");
    }

    #[test]
    fn cycling_wraps_around() {
        assert_eq!(next_method(2), 3);
        assert_eq!(next_method(12), 2);
        assert_eq!(next_method(42), 2);
    }
}
