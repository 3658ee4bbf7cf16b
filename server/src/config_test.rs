use super::*;

/// # Safety
/// Tests touching process env use unique or dedicated variable names.
unsafe fn clear_server_env() {
    unsafe {
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("PORT");
        std::env::remove_var("DEV_SESSION_TOKEN");
        std::env::remove_var("DEV_USER_ID");
    }
}

#[test]
fn env_parse_uses_default_when_unset() {
    assert_eq!(env_parse("__TEST_EP_UNSET_5121__", 7u32), 7);
}

#[test]
fn env_parse_uses_default_when_malformed() {
    let key = "__TEST_EP_BAD_5122__";
    unsafe { std::env::set_var(key, "seven") };
    assert_eq!(env_parse(key, 7u32), 7);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_reads_value() {
    let key = "__TEST_EP_OK_5123__";
    unsafe { std::env::set_var(key, "42") };
    assert_eq!(env_parse(key, 7u32), 42);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_non_empty_filters_blank() {
    let key = "__TEST_ENE_BLANK_5124__";
    unsafe { std::env::set_var(key, "   ") };
    assert_eq!(env_non_empty(key), None);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn from_env_defaults_and_overrides() {
    unsafe { clear_server_env() };
    let cfg = ServerConfig::from_env();
    assert_eq!(cfg.database_url, None);
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.dev_session_token, None);
    assert_eq!(cfg.dev_user_id, None);

    let user = Uuid::new_v4();
    unsafe {
        std::env::set_var("DATABASE_URL", "postgres://localhost/accountdata");
        std::env::set_var("PORT", "8080");
        std::env::set_var("DEV_SESSION_TOKEN", "dev-token");
        std::env::set_var("DEV_USER_ID", user.to_string());
    }
    let cfg = ServerConfig::from_env();
    assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/accountdata"));
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.dev_session_token.as_deref(), Some("dev-token"));
    assert_eq!(cfg.dev_user_id, Some(user));

    unsafe { clear_server_env() };
}
