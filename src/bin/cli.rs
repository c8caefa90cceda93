use clap::{Parser, Subcommand};
use serde_json::Value;

use filmshelf_rs::client::{config_dir, ApiClient, ClientError, MovieRef, Session, UserDataStore};

#[derive(Parser, Debug)]
#[command(name = "filmshelf")]
#[command(about = "Browse movies and manage your lists from the terminal", long_about = None)]
struct Args {
    /// Base URL of the filmshelf server
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Create an account")]
    Signup { username: String, password: String },

    #[command(about = "Log in and persist the session token")]
    Login { username: String, password: String },

    #[command(about = "Drop the persisted session")]
    Logout,

    #[command(about = "Show the logged-in account")]
    Whoami,

    #[command(about = "Favorite movies")]
    Favorites {
        #[command(subcommand)]
        cmd: FavoritesCommand,
    },

    #[command(about = "Movies to watch later")]
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommand,
    },

    #[command(about = "Movie reviews")]
    Reviews {
        #[command(subcommand)]
        cmd: ReviewsCommand,
    },

    #[command(about = "Browse the movie catalog")]
    Movies {
        #[command(subcommand)]
        cmd: MoviesCommand,
    },

    #[command(about = "Show or change region/language preferences")]
    Prefs {
        #[arg(long, help = "Region code, e.g. IE or US")]
        region: Option<String>,
        #[arg(long, help = "Language tag, e.g. en-US")]
        language: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum FavoritesCommand {
    #[command(about = "List saved favorites")]
    List,
    #[command(about = "Add a movie by TMDB id")]
    Add { movie_id: i64 },
    #[command(about = "Remove a movie by TMDB id")]
    Remove { movie_id: i64 },
}

#[derive(Subcommand, Debug)]
enum WatchlistCommand {
    #[command(about = "List the watchlist")]
    List,
    #[command(about = "Add or remove a movie by TMDB id")]
    Toggle { movie_id: i64 },
}

#[derive(Subcommand, Debug)]
enum ReviewsCommand {
    #[command(about = "List your reviews")]
    List,
    #[command(about = "Review a movie")]
    Add {
        movie_id: i64,
        #[arg(help = "Rating from 0 to 5")]
        rating: i32,
        content: String,
    },
    #[command(about = "Delete your review of a movie")]
    Remove { movie_id: i64 },
    #[command(about = "Show everyone's reviews of a movie")]
    Movie { movie_id: i64 },
}

#[derive(Subcommand, Debug)]
enum MoviesCommand {
    #[command(about = "Popular movies")]
    Popular {
        #[arg(long)]
        page: Option<String>,
    },
    #[command(about = "Discover movies")]
    Discover {
        #[arg(long)]
        page: Option<String>,
    },
    #[command(about = "Show one movie in detail")]
    Show { movie_id: i64 },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    let dir = config_dir()?;
    let mut session = Session::load(dir.clone());
    let mut api = ApiClient::new(&args.server);
    api.set_token(session.token().map(|t| t.to_string()));
    let mut store = UserDataStore::load(dir);

    match args.command {
        Command::Signup { username, password } => {
            let msg = api.signup(&username, &password).await?;
            println!("{}", msg);
        }
        Command::Login { username, password } => {
            let token = api.login(&username, &password).await?;
            session.store_token(&token)?;
            println!("Logged in as {}", session.username().unwrap_or(&username));
        }
        Command::Logout => {
            session.clear();
            store.clear();
            println!("Logged out");
        }
        Command::Whoami => match session.username() {
            Some(username) => println!("{}", username),
            None => println!("Not logged in"),
        },
        Command::Favorites { cmd } => {
            require_login(&session)?;
            store.reload(&api).await;
            match cmd {
                FavoritesCommand::List => {
                    if store.favorites.is_empty() {
                        println!("No favorites saved");
                    }
                    for f in &store.favorites {
                        println!("{:>9}  {}", f.movie_id, f.title.as_deref().unwrap_or("-"));
                    }
                }
                FavoritesCommand::Add { movie_id } => {
                    let movie = resolve_movie(&api, &store, movie_id).await?;
                    store.add_to_favorites(&api, &movie).await?;
                    println!("Added {} to favorites", movie.title);
                }
                FavoritesCommand::Remove { movie_id } => {
                    if store.remove_from_favorites(&api, movie_id).await? {
                        println!("Removed from favorites");
                    } else {
                        println!("Movie {} is not in your favorites", movie_id);
                    }
                }
            }
        }
        Command::Watchlist { cmd } => {
            require_login(&session)?;
            store.reload(&api).await;
            match cmd {
                WatchlistCommand::List => {
                    if store.watchlist.is_empty() {
                        println!("Watchlist is empty");
                    }
                    for w in &store.watchlist {
                        println!("{:>9}  {}", w.movie_id, w.title.as_deref().unwrap_or("-"));
                    }
                }
                WatchlistCommand::Toggle { movie_id } => {
                    let movie = resolve_movie(&api, &store, movie_id).await?;
                    if store.toggle_watchlist(&api, &movie).await? {
                        println!("Added {} to watchlist", movie.title);
                    } else {
                        println!("Removed {} from watchlist", movie.title);
                    }
                }
            }
        }
        Command::Reviews { cmd } => {
            require_login(&session)?;
            store.reload(&api).await;
            match cmd {
                ReviewsCommand::List => {
                    if store.my_reviews.is_empty() {
                        println!("No reviews yet");
                    }
                    for r in &store.my_reviews {
                        println!("{:>9}  {}/5  {}", r.movie_id, r.rating, r.content);
                    }
                }
                ReviewsCommand::Add {
                    movie_id,
                    rating,
                    content,
                } => {
                    store.add_review(&api, movie_id, &content, rating).await?;
                    println!("Review saved");
                }
                ReviewsCommand::Remove { movie_id } => {
                    match store.my_reviews.iter().find(|r| r.movie_id == movie_id) {
                        Some(row) => {
                            api.delete_review(&row.id).await?;
                            println!("Review deleted");
                        }
                        None => println!("You have not reviewed movie {}", movie_id),
                    }
                }
                ReviewsCommand::Movie { movie_id } => {
                    let reviews = api.get_movie_reviews(movie_id).await?;
                    if reviews.is_empty() {
                        println!("No reviews for movie {}", movie_id);
                    }
                    for r in &reviews {
                        println!("{}  {}/5  {}", r.username, r.rating, r.content);
                    }
                }
            }
        }
        Command::Movies { cmd } => match cmd {
            MoviesCommand::Popular { page } => {
                let query = movie_query(&store, page.as_deref());
                let body = api.movies("popular", &query).await?;
                print_movie_list(&body);
            }
            MoviesCommand::Discover { page } => {
                let query = movie_query(&store, page.as_deref());
                let body = api.movies("discover", &query).await?;
                print_movie_list(&body);
            }
            MoviesCommand::Show { movie_id } => {
                if session.is_authenticated() {
                    store.reload(&api).await;
                }
                let body = api
                    .movies(&movie_id.to_string(), &[("language", store.language())])
                    .await?;
                print_movie_details(&body);
                if store.is_favorite(movie_id) {
                    println!("In your favorites");
                }
                if store.is_in_watchlist(movie_id) {
                    println!("On your watchlist");
                }
            }
        },
        Command::Prefs { region, language } => {
            if let Some(region) = region {
                store.set_region(&region)?;
            }
            if let Some(language) = language {
                store.set_language(&language)?;
            }
            println!("region: {}", store.region());
            println!("language: {}", store.language());
        }
    }

    Ok(())
}

fn require_login(session: &Session) -> Result<(), ClientError> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(ClientError::NotAuthenticated)
    }
}

/// Title and poster come from the server's catalog passthrough, the same
/// fields the web client has at hand when it saves a row.
async fn resolve_movie(
    api: &ApiClient,
    store: &UserDataStore,
    movie_id: i64,
) -> Result<MovieRef, ClientError> {
    let body = api
        .movies(&movie_id.to_string(), &[("language", store.language())])
        .await?;
    Ok(MovieRef {
        id: movie_id,
        title: body
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .to_string(),
        poster_path: body
            .get("poster_path")
            .and_then(|p| p.as_str())
            .map(|p| p.to_string()),
    })
}

fn movie_query<'a>(store: &'a UserDataStore, page: Option<&'a str>) -> Vec<(&'a str, &'a str)> {
    let mut query = vec![("language", store.language()), ("region", store.region())];
    if let Some(page) = page {
        query.push(("page", page));
    }
    query
}

fn print_movie_list(body: &Value) {
    let Some(results) = body.get("results").and_then(|r| r.as_array()) else {
        println!("{}", body);
        return;
    };
    for movie in results {
        let id = movie.get("id").and_then(|v| v.as_i64()).unwrap_or(0);
        let title = movie.get("title").and_then(|v| v.as_str()).unwrap_or("?");
        let date = movie
            .get("release_date")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let vote = movie
            .get("vote_average")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        println!("{:>9}  {:<42}  {:>10}  {:.1}", id, title, date, vote);
    }
}

fn print_movie_details(body: &Value) {
    let title = body.get("title").and_then(|v| v.as_str()).unwrap_or("?");
    let date = body
        .get("release_date")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    let vote = body
        .get("vote_average")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    println!("{}  ({})  {:.1}/10", title, date, vote);

    if let Some(runtime) = body.get("runtime").and_then(|v| v.as_i64()) {
        println!("Runtime: {} min", runtime);
    }
    let genres: Vec<&str> = body
        .get("genres")
        .and_then(|g| g.as_array())
        .map(|genres| {
            genres
                .iter()
                .filter_map(|g| g.get("name").and_then(|n| n.as_str()))
                .collect()
        })
        .unwrap_or_default();
    if !genres.is_empty() {
        println!("Genres: {}", genres.join(", "));
    }
    if let Some(overview) = body.get("overview").and_then(|v| v.as_str()) {
        if !overview.is_empty() {
            println!("\n{}", overview);
        }
    }
}
