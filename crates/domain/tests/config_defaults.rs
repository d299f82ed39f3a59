use ts_domain::config::{Config, ConfigSeverity};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://localhost:*".to_string()));
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn readiness_thresholds_default_to_two() {
    let config = Config::default();
    assert_eq!(config.conversation.min_user_messages, 2);
    assert_eq!(config.conversation.min_questions, 2);
    assert_eq!(config.conversation.generation_timeout_ms, 15_000);
}

#[test]
fn readiness_thresholds_are_tunable() {
    let toml_str = r#"
[conversation]
min_user_messages = 3
min_questions = 3
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.conversation.min_user_messages, 3);
    assert_eq!(config.conversation.min_questions, 3);
    assert_eq!(config.conversation.max_title_chars, 50);
}

#[test]
fn llm_key_env_defaults_to_openai() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
}

#[test]
fn search_is_keyless_by_default() {
    let config = Config::default();
    assert!(config.insight.search_api_key_env.is_none());
    assert!(config.insight.search_endpoint.is_some());
}

#[test]
fn wildcard_cors_only_warns() {
    let toml_str = r#"
[server.cors]
allowed_origins = ["*"]
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    let cors = issues
        .iter()
        .find(|i| i.field == "server.cors.allowed_origins")
        .expect("cors warning");
    assert_eq!(cors.severity, ConfigSeverity::Warning);
}
