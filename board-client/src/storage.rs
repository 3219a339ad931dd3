use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Долговременное хранилище токена под одним ключом.
///
/// Формат — непрозрачная строка токена как есть.
pub trait TokenStore: Send + Sync {
    /// Читает сохранённый токен. Пустое значение считается отсутствием токена.
    fn load(&self) -> io::Result<Option<String>>;

    /// Сохраняет токен, заменяя предыдущий.
    fn save(&self, token: &str) -> io::Result<()>;

    /// Удаляет токен. Повторный вызов не является ошибкой.
    fn clear(&self) -> io::Result<()>;
}

fn parse_token(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[derive(Debug, Clone)]
/// Токен в одном файле на диске.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Создаёт хранилище по пути к файлу. Файл создаётся при первом `save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Путь к файлу токена.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(parse_token(&raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Токен в памяти процесса.
///
/// Клоны разделяют одно значение, поэтому перезапуск приложения можно
/// сымитировать, создав новую сессию поверх клона того же хранилища.
pub struct MemoryTokenStore {
    token: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenStore {
    /// Пустое хранилище.
    pub fn new() -> Self {
        Self::default()
    }

    /// Хранилище с уже сохранённым токеном.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.slot().as_deref().and_then(parse_token))
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot() = None;
        Ok(())
    }
}
