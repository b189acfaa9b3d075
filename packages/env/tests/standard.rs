use handoff_env::{EnvError, EnvProvider as _, StandardEnv};
use pretty_assertions::assert_eq;
use serial_test::serial;

const NAME: &str = "HANDOFF_ENV_STANDARD_TEST";

#[test_log::test]
#[serial]
fn reads_process_environment() {
    // SAFETY: serialized with every other test that touches the environment.
    unsafe { std::env::set_var(NAME, "17") };

    let env = StandardEnv::new();

    assert_eq!(env.var(NAME), Ok("17".to_string()));
    assert_eq!(env.var_parse::<u32>(NAME), Ok(17));
    assert_eq!(env.vars().get(NAME).map(String::as_str), Some("17"));

    // SAFETY: as above.
    unsafe { std::env::remove_var(NAME) };
}

#[test_log::test]
#[serial]
fn missing_variable_is_not_found() {
    // SAFETY: serialized with every other test that touches the environment.
    unsafe { std::env::remove_var(NAME) };

    let env = StandardEnv::new();

    assert_eq!(env.var(NAME), Err(EnvError::NotFound(NAME.to_string())));
    assert!(!env.var_exists(NAME));
    assert_eq!(env.var_or(NAME, "fallback"), "fallback");
}
