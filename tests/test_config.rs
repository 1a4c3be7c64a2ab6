use std::path::PathBuf;

use quay::config::Config;
use quay::files::planner::DEFAULT_MIN_SIZE_HINT;

// Environment variables are process-wide; keep every env-touching assertion
// in one test so parallel tests cannot race on them.
#[test]
fn test_config_from_environment() {
    unsafe {
        std::env::remove_var("LISTEN");
        std::env::remove_var("ROOT");
        std::env::remove_var("MIN_SIZE_HINT");
    }
    let cfg = Config::load();
    assert_eq!(cfg.listen_addr, "0.0.0.0:8000");
    assert_eq!(cfg.root, PathBuf::from("."));
    assert_eq!(cfg.min_size_hint, DEFAULT_MIN_SIZE_HINT);

    unsafe {
        std::env::set_var("LISTEN", "127.0.0.1:3000");
        std::env::set_var("ROOT", "/srv/files");
        std::env::set_var("MIN_SIZE_HINT", "1024");
    }
    let cfg = Config::load();
    assert_eq!(cfg.listen_addr, "127.0.0.1:3000");
    assert_eq!(cfg.root, PathBuf::from("/srv/files"));
    assert_eq!(cfg.min_size_hint, 1024);

    unsafe {
        std::env::set_var("MIN_SIZE_HINT", "lots");
    }
    assert_eq!(Config::load().min_size_hint, DEFAULT_MIN_SIZE_HINT);

    unsafe {
        std::env::remove_var("LISTEN");
        std::env::remove_var("ROOT");
        std::env::remove_var("MIN_SIZE_HINT");
    }
}

#[test]
fn test_config_default_threshold_is_256_kib() {
    assert_eq!(Config::default().min_size_hint, 256 * 1024);
}

#[test]
fn test_config_from_yaml() {
    let cfg = Config::from_yaml(
        "listen_addr: 127.0.0.1:9000\nroot: /var/www\nmin_size_hint: 4096\n",
    )
    .unwrap();

    assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
    assert_eq!(cfg.root, PathBuf::from("/var/www"));
    assert_eq!(cfg.min_size_hint, 4096);
}

#[test]
fn test_config_from_yaml_missing_keys_take_defaults() {
    let cfg = Config::from_yaml("root: /var/www\n").unwrap();

    assert_eq!(cfg.listen_addr, "0.0.0.0:8000");
    assert_eq!(cfg.root, PathBuf::from("/var/www"));
    assert_eq!(cfg.min_size_hint, DEFAULT_MIN_SIZE_HINT);
}

#[test]
fn test_config_from_yaml_rejects_bad_types() {
    assert!(Config::from_yaml("min_size_hint: huge\n").is_err());
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quay.yaml");
    std::fs::write(&path, "listen_addr: 127.0.0.1:8123\n").unwrap();

    let cfg = Config::from_file(&path).unwrap();
    assert_eq!(cfg.listen_addr, "127.0.0.1:8123");

    assert!(Config::from_file(dir.path().join("missing.yaml")).is_err());
}

#[test]
fn test_config_set_port_keeps_host() {
    let mut cfg = Config::default();
    cfg.listen_addr = "127.0.0.1:8080".to_string();
    cfg.set_port(9001);
    assert_eq!(cfg.listen_addr, "127.0.0.1:9001");

    cfg.listen_addr = "[::1]:8080".to_string();
    cfg.set_port(9002);
    assert_eq!(cfg.listen_addr, "[::1]:9002");
}

#[test]
fn test_config_validate_root() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    std::fs::write(&file, "x").unwrap();

    let mut cfg = Config::default();
    cfg.root = dir.path().to_path_buf();
    assert!(cfg.validate().is_ok());

    cfg.root = file;
    assert!(cfg.validate().is_err());

    cfg.root = dir.path().join("missing");
    assert!(cfg.validate().is_err());
}
