use chrono::Utc;
use clap::Parser;
use lostfound_client::{
    Board, Category, ClientConfig, ImageFile, LostFoundClientHttp, LostFoundClientTrait,
    LostFoundError, NavState, Notice, PostDraft, Selection, Status,
};
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

mod dispatch;
mod logging;
mod render;

#[derive(Parser, Debug)]
#[clap(name = "lostfound", about = "Lost & Found community board")]
struct Cli {
    /// Project URL of the backend; with --anon-key overrides SUPABASE_URL.
    #[clap(long)]
    url: Option<String>,

    /// Public anon key; with --url overrides SUPABASE_ANON_KEY.
    #[clap(long)]
    anon_key: Option<String>,

    #[clap(short, long)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    SignIn {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    SignUp {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
        #[clap(long)]
        full_name: Option<String>,
    },
    SignOut,
    /// Show who is signed in.
    Whoami,
    /// Browse the feed, newest first.
    List {
        #[clap(long, default_value = "")]
        search: String,
        #[clap(long, default_value = "all")]
        category: Selection<Category>,
        #[clap(long, default_value = "all")]
        status: Selection<Status>,
    },
    /// Post a lost or found item.
    Post {
        #[clap(long)]
        title: String,
        #[clap(long)]
        description: String,
        #[clap(long)]
        category: Category,
        #[clap(long)]
        contact: String,
        #[clap(long, default_value = "")]
        location: String,
        /// Day the item was lost or found, as YYYY-MM-DD.
        #[clap(long, default_value = "")]
        date: String,
        #[clap(long)]
        image: Option<PathBuf>,
    },
    /// Delete one of your posts.
    Delete { id: Uuid },
    /// Contact the owner of a post.
    Contact { id: Uuid },
}

fn config(args: &Cli) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let config = match (&args.url, &args.anon_key) {
        (Some(url), Some(key)) => ClientConfig::new(url, key),
        _ => ClientConfig::from_env()?,
    };
    Ok(config)
}

fn read_image(path: &PathBuf) -> Result<ImageFile, Notice> {
    let bytes = std::fs::read(path).map_err(|e| {
        Notice::destructive("Image unreadable", format!("{}: {e}", path.display()))
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ImageFile::new(name, bytes).map_err(|e| match e {
        LostFoundError::ImageTooLarge { .. } => Notice::file_too_large(),
        other => Notice::destructive("Image unreadable", other.to_string()),
    })
}

fn show(notice: &Notice) {
    if notice.is_destructive() {
        eprintln!("{}", render::notice(notice));
    } else {
        println!("{}", render::notice(notice));
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    logging::init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<Notice>() {
                Some(notice) => show(notice),
                None => eprintln!("error: {e}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Клиент и лента
    let client = LostFoundClientHttp::connect(config(&args)?).await?;
    let mut board = Board::new(client);

    // 2. Команда
    match args.command {
        Command::SignIn { email, password } => {
            let session = board.client_mut().sign_in(email, password).await?;
            println!("{}", render::nav(&NavState::from_session(Some(&session))));
        }
        Command::SignUp {
            email,
            password,
            full_name,
        } => match board.client_mut().sign_up(email, password, full_name).await? {
            Some(session) => println!("{}", render::nav(&NavState::from_session(Some(&session)))),
            None => println!("Check your inbox to confirm the account, then sign in."),
        },
        Command::SignOut => {
            board.client_mut().sign_out().await?;
            println!("Signed out.");
        }
        Command::Whoami => {
            println!("{}", render::nav(&NavState::from_session(board.client().session())));
        }
        Command::List {
            search,
            category,
            status,
        } => {
            board.refresh().await?;
            let filter = board.filter_mut();
            filter.set_search(search);
            filter.set_category(category);
            filter.set_status(status);

            match board.empty_state() {
                Some(empty) => println!("{}", render::empty(&empty)),
                None => {
                    for card in board.cards(Utc::now()) {
                        println!("{}", render::card(&card));
                    }
                }
            }
            println!(
                "{}",
                render::filter_summary(board.filter(), board.visible().len(), board.posts().len())
            );
        }
        Command::Post {
            title,
            description,
            category,
            contact,
            location,
            date,
            image,
        } => {
            let image = image.as_ref().map(read_image).transpose()?;
            let draft = PostDraft {
                title,
                description,
                category: Some(category),
                location,
                contact_info: contact,
                date_lost_found: date,
            };
            let notice = board
                .submit(draft, image.as_ref(), Utc::now().timestamp_millis())
                .await?;
            show(&notice);
        }
        Command::Delete { id } => {
            board.refresh().await?;
            let notice = board.delete(id).await?;
            show(&notice);
        }
        Command::Contact { id } => {
            board.refresh().await?;
            let action = board.contact(id)?;
            if let Some(notice) = dispatch::run(&action) {
                show(&notice);
            }
        }
    }

    Ok(())
}
