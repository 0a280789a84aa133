use anyhow::Result;
use std::path::Path;

use crate::VideoConfig;

/// The receiver must exist either as a path or somewhere on PATH.
pub fn check_program(cfg: &VideoConfig) -> Result<()> {
    if !cfg.enable {
        return Ok(());
    }
    anyhow::ensure!(!cfg.program.is_empty(), "video.program missing");

    if cfg.program.contains('/') {
        let p = Path::new(&cfg.program);
        anyhow::ensure!(p.is_file(), "video.program not found: {}", cfg.program);
        return Ok(());
    }

    let on_path = std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(&cfg.program).is_file()))
        .unwrap_or(false);
    anyhow::ensure!(on_path, "video.program not on PATH: {}", cfg.program);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_feed_is_not_checked() {
        let cfg = VideoConfig { enable: false, program: String::new(), args: vec![] };
        check_program(&cfg).unwrap();
    }

    #[test]
    fn missing_path_is_reported() {
        let cfg = VideoConfig { program: "./nope/receiver.sh".into(), ..VideoConfig::default() };
        assert!(check_program(&cfg).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn finds_program_on_path() {
        let cfg = VideoConfig { program: "sh".into(), ..VideoConfig::default() };
        check_program(&cfg).unwrap();
    }
}
