//! Output file names

/// Replace every character outside `[A-Za-z0-9_-]` with `-`
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// `<target>_<v1_v2_..>_<reference_date>.json`, with tuple values in sorted
/// dimension order. The mapping is one-way.
pub fn json_file_name(
    target_id: &str,
    dimension_values: &[String],
    reference_date: &str,
) -> String {
    format!(
        "{}_{}_{}.json",
        sanitize(target_id),
        sanitize(&dimension_values.join("_")),
        sanitize(reference_date)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("wk inc flu hosp", "wk-inc-flu-hosp")]
    #[case("Flu ED visits pct", "Flu-ED-visits-pct")]
    #[case("inc/death (cum.)", "inc-death--cum--")]
    #[case("A-2022-05-09_x", "A-2022-05-09_x")]
    #[case("65+", "65-")]
    #[case("", "")]
    fn test_sanitize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
        assert_eq!(sanitize(&sanitize(input)), sanitize(input));
    }

    #[test]
    fn test_json_file_name() {
        assert_eq!(
            json_file_name("wk inc flu hosp", &["US".to_string()], "2022-10-22"),
            "wk-inc-flu-hosp_US_2022-10-22.json"
        );
        assert_eq!(
            json_file_name(
                "inc hosp",
                &["US".to_string(), "A-2022-05-09".to_string()],
                "2022-05-14"
            ),
            "inc-hosp_US_A-2022-05-09_2022-05-14.json"
        );
        assert_eq!(json_file_name("t", &[], "2022-10-22"), "t__2022-10-22.json");
    }
}
