use bot_utils::config::AppConfig;
use bot_utils::validate_ec_private_key;
use config::{Config, File, FileFormat};
use std::io::Write;

const EC_SEC1: &str = include_str!("fixtures/ec_sec1.pem");

fn from_toml(toml: &str) -> AppConfig {
    let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
    AppConfig::from_sources(builder).unwrap()
}

#[test]
fn test_private_key_read_from_file() {
    let mut key_file = tempfile::NamedTempFile::new().unwrap();
    key_file.write_all(EC_SEC1.as_bytes()).unwrap();

    let toml = format!(
        "api_key_name = \"organizations/test/apiKeys/1\"\napi_private_key_file = {:?}\n",
        key_file.path().display().to_string()
    );
    let config = from_toml(&toml);

    let pem = config.private_key_pem().unwrap().unwrap();
    assert_eq!(pem, EC_SEC1);
    assert!(validate_ec_private_key(&pem).is_ok());
}

#[test]
fn test_inline_key_wins_over_file() {
    let inline = EC_SEC1.trim().replace('\n', "\\n");
    let toml = format!(
        "api_private_key = {:?}\napi_private_key_file = \"/does/not/exist.pem\"\n",
        inline
    );
    let config = from_toml(&toml);

    let pem = config.private_key_pem().unwrap().unwrap();
    assert_eq!(pem, EC_SEC1.trim());
    assert!(validate_ec_private_key(&pem).is_ok());
}

#[test]
fn test_missing_key_file_is_io_error() {
    let config = from_toml("api_private_key_file = \"/does/not/exist.pem\"\n");
    let err = config.private_key_pem().unwrap_err();
    assert!(matches!(err, bot_utils::Error::Io(_)));
}

#[test]
fn test_settings_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Settings.toml");
    std::fs::write(&path, "api_key_name = \"bot\"\n[logging]\nfilter = \"debug\"\n").unwrap();

    let builder = Config::builder().add_source(File::from(path.as_path()));
    let config = AppConfig::from_sources(builder).unwrap();

    assert_eq!(config.api_key_name.as_deref(), Some("bot"));
    assert_eq!(config.logging.filter, "debug");
}
