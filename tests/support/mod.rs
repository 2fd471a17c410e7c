use std::fs;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub fn jarbox_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_jarbox"))
}

#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Copies a fixture project into `dest` so a run can mutate it
#[allow(dead_code)]
pub fn copy_fixture(name: &str, dest: &Path) -> PathBuf {
    let src = fixture(name);
    for entry in fs::read_dir(&src).expect("Failed to read fixture") {
        let entry = entry.expect("Failed to read fixture entry");
        fs::copy(entry.path(), dest.join(entry.file_name())).expect("Failed to copy fixture");
    }
    dest.to_path_buf()
}

/// Writes an executable shell script standing in for an external tool
#[cfg(unix)]
#[allow(dead_code)]
pub fn write_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write tool script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make tool script executable");
    path
}
