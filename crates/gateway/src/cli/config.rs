use ts_domain::config::{Config, ConfigSeverity};

/// Validate the config and the model credential, printing any issues.
///
/// Returns `false` when errors were found.
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();
    let warning_count = issues.len() - error_count;

    for issue in &issues {
        println!("{issue}");
    }

    let key_env = &config.llm.api_key_env;
    let key_ok = !key_env.is_empty() && ts_providers::resolve_api_key(key_env).is_ok();
    if !key_ok {
        println!("[ERROR] llm.api_key_env: environment variable '{key_env}' is not set");
    }

    let errors = error_count + usize::from(!key_ok);
    if errors == 0 && warning_count == 0 {
        println!("Config OK ({config_path})");
        return true;
    }

    println!("\n{errors} error(s), {warning_count} warning(s) in {config_path}");
    errors == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            std::process::exit(1);
        }
    }
}
