use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_TOKEN_FILE: &str = ".chronogg";

#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<{} bytes>)", self.0.len())
    }
}

/// Picks the token for this run. A non-empty argument always wins over the
/// stored value; `None` means there is nothing to claim with.
pub fn resolve_token(arg: Option<String>, stored: Option<String>) -> Option<Token> {
    arg.filter(|token| !token.is_empty())
        .or_else(|| stored.filter(|token| !token.is_empty()))
        .map(Token)
}

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::TokenFile {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn save(&self, token: &Token) -> Result<()> {
        let write = || -> io::Result<()> {
            let mut file = open_for_overwrite(&self.path)?;
            // The creation mode does not apply to a file that already exists.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(fs::Permissions::from_mode(0o600))?;
            }
            file.write_all(token.as_str().as_bytes())?;
            file.sync_all()
        };
        write().map_err(|source| Error::TokenFile {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "token saved");
        Ok(())
    }
}

fn open_for_overwrite(path: &Path) -> io::Result<fs::File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    // Truncating a hidden file only succeeds when the hidden attribute is requested again.
    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
        options.attributes(FILE_ATTRIBUTE_HIDDEN);
    }

    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn argument_wins_over_stored_token() {
        let token = resolve_token(Some("from-arg".into()), Some("from-file".into()));
        assert_eq!(token.unwrap().as_str(), "from-arg");
    }

    #[test]
    fn stored_token_used_without_argument() {
        let token = resolve_token(None, Some("from-file".into()));
        assert_eq!(token.unwrap().as_str(), "from-file");
    }

    #[test]
    fn empty_argument_falls_back_to_stored() {
        let token = resolve_token(Some(String::new()), Some("from-file".into()));
        assert_eq!(token.unwrap().as_str(), "from-file");
    }

    #[test]
    fn nothing_to_resolve() {
        assert!(resolve_token(None, None).is_none());
        assert!(resolve_token(None, Some(String::new())).is_none());
        assert!(resolve_token(Some(String::new()), None).is_none());
    }

    #[test]
    fn token_debug_hides_value() {
        let token = resolve_token(Some("secret-cookie".into()), None).unwrap();
        let printed = format!("{token:?}");
        assert!(!printed.contains("secret"));
        assert_eq!(printed, "Token(<13 bytes>)");
    }

    #[test]
    fn missing_file_loads_as_none() {
        let tmp = TempDir::new().unwrap();
        let store = TokenStore::new(tmp.path().join(DEFAULT_TOKEN_FILE));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn blank_file_loads_as_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_TOKEN_FILE);
        fs::write(&path, " \n").unwrap();
        assert_eq!(TokenStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn load_strips_trailing_newline() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_TOKEN_FILE);
        fs::write(&path, "__cfduid=abc; jwt=xyz\n").unwrap();
        assert_eq!(
            TokenStore::new(path).load().unwrap().as_deref(),
            Some("__cfduid=abc; jwt=xyz")
        );
    }

    #[test]
    fn save_overwrites_whole_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_TOKEN_FILE);
        fs::write(&path, "a much longer previous token value").unwrap();

        let store = TokenStore::new(&path);
        store.save(&Token("short".into())).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
        assert_eq!(store.load().unwrap().as_deref(), Some("short"));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_TOKEN_FILE);
        TokenStore::new(&path).save(&Token("cookie".into())).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn save_tightens_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_TOKEN_FILE);
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        TokenStore::new(&path).save(&Token("cookie".into())).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "cookie");
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let tmp = TempDir::new().unwrap();
        // A directory cannot be read as a token file.
        let store = TokenStore::new(tmp.path());
        assert!(matches!(store.load(), Err(Error::TokenFile { .. })));
    }
}
