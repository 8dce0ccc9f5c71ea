use std::fs;
use std::process;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Install a custom settings file for this run.
pub fn load_config(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(
        radix_core::settings::init_custom(content),
        "Error in {file}: {}"
    );
}

pub fn settings_export() {
    print!("{}", radix_core::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(
        radix_core::settings::parse_settings_toml(&content),
        "Error: {}"
    );
    println!(
        "OK: index.case_sensitive={}, pack.score_precision={}, pack.duplicates={:?}, pack.version={}, search.default_limit={}",
        s.index.case_sensitive,
        s.pack.score_precision,
        s.pack.duplicates,
        s.pack.version,
        s.search.default_limit
    );
}
