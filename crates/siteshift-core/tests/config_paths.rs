use std::path::PathBuf;

use siteshift_core::config::config_path_in;

#[test]
fn config_file_lives_in_siteshift_dir() {
    let config_dir = PathBuf::from("/tmp/config");

    let path = config_path_in(&config_dir);

    assert_eq!(path, PathBuf::from("/tmp/config/siteshift/siteshift.toml"));
}
