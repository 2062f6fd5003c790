#[cfg(test)]
mod verify {
    use std::fs;
    use std::path::{Path, PathBuf};

    use erbfmt::delegates::{Html, Ruby};
    use erbfmt::formatting::{format_tree, Options};
    use erbfmt::parsing;

    /// Golden test for the format command
    ///
    /// Each directory under tests/golden/ holds an input.html.erb and the
    /// expected.html.erb it must format to. The expected file must also
    /// format to itself unchanged. If a case fails, either the formatter
    /// is wrong or the expected file needs updating after a deliberate
    /// change of style.

    /// Simple diff function to show line-by-line differences
    fn show_diff(expected: &str, formatted: &str, file_path: &Path) {
        let expected_lines: Vec<&str> = expected
            .lines()
            .collect();
        let formatted_lines: Vec<&str> = formatted
            .lines()
            .collect();

        let max_lines = expected_lines
            .len()
            .max(formatted_lines.len());

        println!("\nDifferences found in file: {:?}", file_path);
        println!("--- Expected");
        println!("+++ Formatted");

        for i in 0..max_lines {
            let exp_line = expected_lines
                .get(i)
                .unwrap_or(&"");
            let fmt_line = formatted_lines
                .get(i)
                .unwrap_or(&"");

            if exp_line != fmt_line {
                println!("@@ Line {} @@", i + 1);
                println!("- {}", exp_line);
                println!("+ {}", fmt_line);
            }
        }
    }

    async fn format_file(file: &Path) -> String {
        let content = parsing::load(file)
            .unwrap_or_else(|e| panic!("Failed to load file {:?}: {:?}", file, e));

        let mut tree = parsing::parse(file, &content)
            .unwrap_or_else(|e| panic!("Failed to parse file {:?}: {:?}", file, e));

        format_tree(&mut tree, &Html, &Ruby, &Options::default())
            .await
            .unwrap_or_else(|e| panic!("Failed to format file {:?}: {}", file, e))
    }

    fn cases() -> Vec<PathBuf> {
        let dir = Path::new("tests/golden");
        assert!(dir.exists(), "golden directory missing");

        let entries = fs::read_dir(dir).expect("Failed to read golden directory");

        let mut cases = Vec::new();
        for entry in entries {
            let entry = entry.expect("Failed to read directory entry");
            let path = entry.path();
            if path.is_dir() {
                cases.push(path);
            }
        }
        cases.sort();

        assert!(!cases.is_empty(), "No cases found in golden directory");
        cases
    }

    #[tokio::test]
    async fn ensure_expected_output() {
        let mut failures = Vec::new();

        for case in cases() {
            let input = case.join("input.html.erb");
            let expected = case.join("expected.html.erb");

            let wanted = fs::read_to_string(&expected)
                .unwrap_or_else(|e| panic!("Failed to read {:?}: {:?}", expected, e));
            let result = format_file(&input).await;

            if result != wanted {
                show_diff(&wanted, &result, &input);
                failures.push(input);
            }
        }

        if !failures.is_empty() {
            panic!("{} golden cases formatted incorrectly", failures.len());
        }
    }

    #[tokio::test]
    async fn ensure_fixed_point() {
        let mut failures = Vec::new();

        for case in cases() {
            let expected = case.join("expected.html.erb");

            let original = fs::read_to_string(&expected)
                .unwrap_or_else(|e| panic!("Failed to read {:?}: {:?}", expected, e));
            let result = format_file(&expected).await;

            if result != original {
                show_diff(&original, &result, &expected);
                failures.push(expected);
            }
        }

        if !failures.is_empty() {
            panic!("All expected files must format unchanged");
        }
    }
}
