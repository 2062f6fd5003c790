#[cfg(test)]
mod samples {
    use std::fs;
    use std::path::Path;

    use erbfmt::parsing;

    #[test]
    fn ensure_samples_parse() {
        let dir = Path::new("tests/golden/");

        assert!(dir.exists(), "golden directory missing");

        let entries = fs::read_dir(dir).expect("Failed to read golden directory");

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.expect("Failed to read directory entry");
            for name in ["input.html.erb", "expected.html.erb"] {
                let path = entry
                    .path()
                    .join(name);
                if path.exists() {
                    files.push(path);
                }
            }
        }

        assert!(!files.is_empty(), "No templates found in golden directory");

        let mut failures = Vec::new();

        for file in &files {
            let content = parsing::load(&file)
                .unwrap_or_else(|e| panic!("Failed to load file {:?}: {:?}", file, e));

            match parsing::parse(&file, &content) {
                Ok(_) => {}
                Err(e) => {
                    println!("File {:?} failed to parse: {:?}", file, e);
                    failures.push(file.clone());
                }
            }
        }

        if !failures.is_empty() {
            panic!(
                "Template files should parse successfully, but {} files failed",
                failures.len()
            );
        }
    }
}
