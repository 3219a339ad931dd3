//! Постраничный список постов с поиском.
//!
//! [`ListingQuery`] описывает, какую страницу показывать, а
//! [`ListingController`] превращает запрос в один вызов API и следит, чтобы
//! отображался результат только последнего выданного запроса.

use tokio::sync::Mutex;
use tracing::debug;

use crate::api::BoardApi;
use crate::error::BoardClientResult;
use crate::models::{PAGE_SIZE, PostPage, PostSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Параметры запроса списка: страница, её размер и ключевое слово.
pub struct ListingQuery {
    page_index: u32,
    page_size: u32,
    keyword: Option<String>,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: PAGE_SIZE,
            keyword: None,
        }
    }
}

impl ListingQuery {
    /// Первая страница без поиска.
    pub fn new() -> Self {
        Self::default()
    }

    /// Заменяет ключевое слово и возвращает на первую страницу.
    ///
    /// Пустая строка или строка из пробелов снимает поиск.
    pub fn set_keyword(&mut self, keyword: Option<&str>) {
        self.keyword = keyword
            .filter(|keyword| !keyword.trim().is_empty())
            .map(str::to_string);
        self.page_index = 0;
    }

    /// Переходит на страницу `page` (с нуля). Диапазон проверяет вызывающий.
    pub fn set_page(&mut self, page: u32) {
        self.page_index = page;
    }

    /// Номер текущей страницы.
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    /// Размер страницы.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Ключевое слово поиска.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Стадия загрузки списка.
pub enum LoadState {
    /// Ещё ничего не запрашивали.
    #[default]
    Idle,
    /// Запрос выполняется.
    Loading,
    /// Данные последнего запроса показаны.
    Ready,
    /// Последний запрос завершился ошибкой.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Чем закончился вызов [`ListingController::fetch`].
pub enum FetchOutcome {
    /// Ответ стал отображаемым состоянием.
    Applied,
    /// Пока запрос выполнялся, был выдан более новый; ответ отброшен.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Снимок отображаемого состояния списка.
pub struct ListingSnapshot {
    /// Текущий запрос.
    pub query: ListingQuery,
    /// Посты последней загруженной страницы.
    pub posts: Vec<PostSummary>,
    /// Всего страниц по последнему ответу.
    pub total_pages: u32,
    /// Стадия загрузки.
    pub load_state: LoadState,
}

impl ListingSnapshot {
    /// Есть ли предыдущая страница.
    pub fn has_previous(&self) -> bool {
        self.query.page_index > 0
    }

    /// Есть ли следующая страница по данным последнего ответа.
    pub fn has_next(&self) -> bool {
        self.query.page_index.saturating_add(1) < self.total_pages
    }
}

#[derive(Debug, Default)]
struct ListingState {
    snapshot: ListingSnapshot,
    issued: u64,
}

/// Владелец запроса списка и загруженной страницы.
pub struct ListingController<A> {
    api: A,
    state: Mutex<ListingState>,
}

impl<A: BoardApi> ListingController<A> {
    /// Контроллер с запросом по умолчанию.
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Mutex::new(ListingState::default()),
        }
    }

    /// См. [`ListingQuery::set_keyword`].
    pub async fn set_keyword(&self, keyword: Option<&str>) {
        self.state.lock().await.snapshot.query.set_keyword(keyword);
    }

    /// См. [`ListingQuery::set_page`].
    pub async fn set_page(&self, page: u32) {
        self.state.lock().await.snapshot.query.set_page(page);
    }

    /// Текущий запрос.
    pub async fn query(&self) -> ListingQuery {
        self.state.lock().await.snapshot.query.clone()
    }

    /// Копия отображаемого состояния.
    pub async fn snapshot(&self) -> ListingSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    /// Загружает страницу для текущего запроса.
    ///
    /// `token` прикладывается к запросу, если сессия активна. Ответ
    /// применяется, только если после этого вызова не был выдан новый;
    /// иначе он отбрасывается (и ошибка тоже) с результатом
    /// [`FetchOutcome::Stale`].
    pub async fn fetch(&self, token: Option<&str>) -> BoardClientResult<FetchOutcome> {
        let (query, ticket) = {
            let mut state = self.state.lock().await;
            state.issued += 1;
            state.snapshot.load_state = LoadState::Loading;
            (state.snapshot.query.clone(), state.issued)
        };

        let result = self.request(&query, token).await;

        let mut state = self.state.lock().await;
        if state.issued != ticket {
            debug!(ticket, latest = state.issued, "dropping stale listing response");
            return Ok(FetchOutcome::Stale);
        }

        match result {
            Ok(page) => {
                state.snapshot.posts = page.content;
                state.snapshot.total_pages = page.total_pages;
                state.snapshot.load_state = LoadState::Ready;
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                state.snapshot.load_state = LoadState::Error(err.to_string());
                Err(err)
            }
        }
    }

    async fn request(&self, query: &ListingQuery, token: Option<&str>) -> BoardClientResult<PostPage> {
        match query.keyword() {
            Some(keyword) => {
                self.api
                    .search_posts(token, keyword, query.page_index, query.page_size)
                    .await
            }
            None => {
                self.api
                    .list_posts(token, query.page_index, query.page_size)
                    .await
            }
        }
    }
}
