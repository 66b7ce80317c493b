/// Skip a test if no gpg binary is on PATH.
#[macro_export]
macro_rules! skip_without_gpg {
    () => {
        if std::process::Command::new("gpg")
            .arg("--version")
            .output()
            .map(|o| !o.status.success())
            .unwrap_or(true)
        {
            eprintln!("SKIPPED: gpg not available");
            return;
        }
    };
}
