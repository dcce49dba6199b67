//! Tree file naming.
//!
//! A tree for `L` pits per player and `T` starting tokens is stored as
//! `<L>l<T>t.mantree`. When that name is taken, `<L>l<T>t(<n>).mantree` is
//! used with the smallest free `n`.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::constants::TREE_FILE_EXTENSION;
use crate::error::TreeError;
use crate::position::GameConfig;

/// Canonical file name for a configuration.
pub fn file_name(config: GameConfig) -> String {
    format!("{config}.{TREE_FILE_EXTENSION}")
}

fn numbered_file_name(config: GameConfig, n: u32) -> String {
    format!("{config}({n}).{TREE_FILE_EXTENSION}")
}

/// Create the first free tree file in `dir`.
///
/// Names are claimed with `create_new`, so a file that already exists, or
/// appears while candidates are being tried, is never overwritten.
pub fn create_tree_file(dir: &Path, config: GameConfig) -> Result<(PathBuf, File), TreeError> {
    let mut n = 0;
    loop {
        let name = if n == 0 {
            file_name(config)
        } else {
            numbered_file_name(config, n)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Recover the board configuration from a tree file name.
///
/// Accepts the canonical name and the numbered variant.
pub fn parse_file_name(name: &str) -> Result<GameConfig, TreeError> {
    let bad_name = || TreeError::FileName(name.to_string());

    let stem = name
        .strip_suffix(TREE_FILE_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .ok_or_else(bad_name)?;

    // Drop a "(n)" suffix
    let stem = match stem.strip_suffix(')') {
        Some(rest) => {
            let (head, n) = rest.rsplit_once('(').ok_or_else(bad_name)?;
            if n.is_empty() || !n.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad_name());
            }
            head
        }
        None => stem,
    };

    let (locations, tokens) = stem
        .strip_suffix('t')
        .and_then(|s| s.split_once('l'))
        .ok_or_else(bad_name)?;
    let locations: usize = locations.parse().map_err(|_| bad_name())?;
    let tokens: usize = tokens.parse().map_err(|_| bad_name())?;

    Ok(GameConfig::new(locations, tokens)?)
}

/// [`parse_file_name`] applied to the last component of `path`.
pub fn parse_path(path: &Path) -> Result<GameConfig, TreeError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TreeError::FileName(path.display().to_string()))?;
    parse_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_file_name() {
        let config = GameConfig::new(6, 4).unwrap();
        assert_eq!(file_name(config), "6l4t.mantree");
        assert_eq!(numbered_file_name(config, 2), "6l4t(2).mantree");
    }

    #[test]
    fn test_create_keeps_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GameConfig::new(3, 2).unwrap();
        std::fs::write(tmp.path().join("3l2t.mantree"), b"taken").unwrap();

        let (path, _file) = create_tree_file(tmp.path(), config).unwrap();
        assert_eq!(path, tmp.path().join("3l2t(1).mantree"));
        assert_eq!(std::fs::read(tmp.path().join("3l2t.mantree")).unwrap(), b"taken");
    }

    #[test]
    fn test_create_in_missing_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let config = GameConfig::new(3, 2).unwrap();
        assert!(matches!(
            create_tree_file(&tmp.path().join("missing"), config),
            Err(TreeError::Io(_))
        ));
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(parse_file_name("6l4t.mantree").unwrap(), GameConfig::new(6, 4).unwrap());
        assert_eq!(parse_file_name("12l3t(7).mantree").unwrap(), GameConfig::new(12, 3).unwrap());
        assert_eq!(
            parse_path(Path::new("trees/3l2t.mantree")).unwrap(),
            GameConfig::new(3, 2).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_other_names() {
        for name in [
            "6l4t.bin",
            "6l4t",
            "6x4t.mantree",
            "6l4.mantree",
            "l4t.mantree",
            "6l4t().mantree",
            "6l4t(a).mantree",
            "-1l4t.mantree",
        ] {
            assert!(
                matches!(parse_file_name(name), Err(TreeError::FileName(_))),
                "accepted {name}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_bad_config() {
        assert!(matches!(
            parse_file_name("0l4t.mantree"),
            Err(TreeError::Config(ConfigError::NoLocations))
        ));
        assert!(matches!(
            parse_file_name("8l16t.mantree"),
            Err(TreeError::Config(ConfigError::TooManyTokens { .. }))
        ));
    }
}
