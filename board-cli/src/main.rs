use std::path::PathBuf;
use std::process;

use anyhow::{Result, bail};
use board_client::{
    BoardClient, BoardClientError, FileTokenStore, HttpClient, ListingSnapshot, Post, UserProfile,
};
use clap::{Parser, Subcommand};
use tracing::debug;

mod logging;
mod settings;

use logging::init_logging;
use settings::Settings;

type Client = BoardClient<HttpClient, FileTokenStore>;

#[derive(Debug, Parser)]
#[command(name = "board-cli", version, about = "CLI клиент форума")]
struct Cli {
    /// Адрес сервера (по умолчанию BOARD_API_URL или http://127.0.0.1:8080).
    #[arg(long, global = true)]
    server: Option<String>,

    /// Файл с токеном (по умолчанию BOARD_TOKEN_FILE или .board_token).
    #[arg(long, global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя. Вход после неё выполняется отдельно.
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: удаляет сохранённый токен.
    Logout,
    /// Текущий пользователь.
    Whoami,
    /// Список постов с поиском.
    List {
        /// Номер страницы, начиная с 1.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
        /// Ключевое слово поиска.
        #[arg(long)]
        keyword: Option<String>,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста (требует входа).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Изменение своего поста (требует входа).
    ///
    /// Если `--content` не указан, используется текущее содержимое поста.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: Option<String>,
    },
    /// Удаление своего поста (требует входа).
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env()?.with_overrides(cli.server, cli.token_file);
    init_logging(&settings.log_level)?;
    debug!(api_url = %settings.api_url, token_file = %settings.token_file.display(), "starting");

    let api = HttpClient::with_timeouts(
        settings.api_url.clone(),
        settings.connect_timeout,
        settings.request_timeout,
    )
    .map_err(map_client_error)?;
    let mut client = BoardClient::new(api, FileTokenStore::new(settings.token_file.clone()));
    client.restore().await;

    match cli.command {
        Command::Signup {
            username,
            password,
            email,
            full_name,
        } => {
            client
                .signup(&username, &password, &email, &full_name)
                .await?;
            println!("Регистрация успешна. Выполните `board-cli login`.");
        }
        Command::Login { username, password } => {
            let user = client.login(&username, &password).await?;
            print_user("Вход выполнен", &user);
        }
        Command::Logout => {
            client.logout();
            println!("Выход выполнен");
        }
        Command::Whoami => match client.current_user() {
            Some(user) => print_user("Текущий пользователь", user),
            None => println!("Вход не выполнен"),
        },
        Command::List { page, keyword } => {
            let listing = client.listing();
            listing.set_keyword(keyword.as_deref()).await;
            listing.set_page(page - 1).await;
            client
                .fetch_listing(&listing)
                .await
                .map_err(map_client_error)?;
            print_listing(&listing.snapshot().await);
        }
        Command::Get { id } => {
            let post = client.get_post(id).await.map_err(|err| {
                map_client_error_with_context(err, "не удалось загрузить пост")
            })?;
            print_post("Пост", &post, client.is_author(&post));
        }
        Command::Create { title, content } => {
            require_login(&client)?;
            let post = client
                .create_post(&title, &content)
                .await
                .map_err(map_client_error)?;
            print_post("Пост создан", &post, true);
        }
        Command::Update { id, title, content } => {
            require_login(&client)?;
            let current = load_own_post(&client, id).await?;
            // Без --content сохраняем текущее содержимое поста.
            let content = content.unwrap_or(current.content);

            let post = client
                .update_post(id, &title, &content)
                .await
                .map_err(map_client_error)?;
            print_post("Пост обновлён", &post, true);
        }
        Command::Delete { id } => {
            require_login(&client)?;
            load_own_post(&client, id).await?;
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
    }

    Ok(())
}

fn require_login(client: &Client) -> Result<()> {
    if !client.is_authenticated() {
        bail!("требуется авторизация: выполните `board-cli login ...`");
    }
    Ok(())
}

async fn load_own_post(client: &Client, id: i64) -> Result<Post> {
    let post = client
        .get_post(id)
        .await
        .map_err(|err| map_client_error_with_context(err, "не удалось загрузить пост"))?;
    if !client.is_author(&post) {
        bail!("изменять и удалять пост может только его автор ({})", post.author_name);
    }
    Ok(post)
}

fn map_client_error(err: BoardClientError) -> anyhow::Error {
    let message = match err {
        BoardClientError::Unauthorized(message) => message.unwrap_or_else(|| {
            "требуется авторизация: выполните `board-cli login ...`".to_string()
        }),
        BoardClientError::NotFound(message) => {
            message.unwrap_or_else(|| "ресурс не найден".to_string())
        }
        BoardClientError::Api { status, message } => match message {
            Some(message) => message,
            None => format!("сервер ответил {status}"),
        },
        BoardClientError::Validation(errors) => format!("некорректные данные: {errors}"),
        BoardClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn map_client_error_with_context(err: BoardClientError, context: &str) -> anyhow::Error {
    map_client_error(err).context(context.to_string())
}

fn print_user(title: &str, user: &UserProfile) {
    println!("{title}");
    println!("  id: {}", user.id);
    println!("  username: {}", user.username);
    println!("  email: {}", user.email);
    println!("  full_name: {}", user.full_name);
    println!("  role: {}", user.role);
}

fn print_post(title: &str, post: &Post, own: bool) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("author: {}{}", post.author_name, if own { " (вы)" } else { "" });
    println!("views: {}", post.view_count);
    println!("created_at: {}", post.created_at);
    if post.is_edited() {
        println!("updated_at: {}", post.updated_at);
    }
    println!();
    println!("{}", post.content);
}

fn format_listing_header(snapshot: &ListingSnapshot) -> String {
    let page = snapshot.query.page_index() + 1;
    let total = snapshot.total_pages.max(1);
    match snapshot.query.keyword() {
        Some(keyword) => format!("Поиск «{keyword}»: страница {page} из {total}"),
        None => format!("Страница {page} из {total}"),
    }
}

fn print_listing(snapshot: &ListingSnapshot) {
    println!("{}", format_listing_header(snapshot));

    if snapshot.posts.is_empty() {
        println!("Постов нет");
    }
    for post in &snapshot.posts {
        println!(
            "- [{}] {} (автор: {}, просмотров: {}, {})",
            post.id,
            post.title,
            post.author_name,
            post.view_count,
            post.created_at.date()
        );
    }

    let mut hints = Vec::new();
    if snapshot.has_previous() {
        hints.push(format!("--page {}", snapshot.query.page_index()));
    }
    if snapshot.has_next() {
        hints.push(format!("--page {}", snapshot.query.page_index() + 2));
    }
    if !hints.is_empty() {
        println!("Другие страницы: {}", hints.join(", "));
    }
}
