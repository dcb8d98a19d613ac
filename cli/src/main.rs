mod client;
mod form;
mod models;
mod views;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use client::{ApiClient, ClientError};
use form::RecipeForm;

#[derive(Parser)]
#[command(name = "foodiegram")]
#[command(about = "FoodieGram CLI", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    server: String,

    /// Bearer token from `signup` or `login`
    #[arg(long, global = true, env = "FOODIEGRAM_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ping the server (unauthenticated)
    Ping,
    /// Create an account and print its token
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Log in and print a fresh token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Newest recipes, with like and comment counts
    Feed {
        /// Only recipes posted by this user
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },
    /// Full recipe: ingredients and numbered steps
    Show { recipe_id: String },
    /// Likes and comments on a recipe
    Interactions { recipe_id: String },
    /// Post a new recipe
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// NAME=QTY, repeatable
        #[arg(long = "ingredient", value_name = "NAME=QTY")]
        ingredients: Vec<String>,
        /// One instruction step, repeatable
        #[arg(long = "step", value_name = "TEXT")]
        steps: Vec<String>,
        /// Image URL, repeatable
        #[arg(long = "image", value_name = "URL")]
        images: Vec<String>,
    },
    /// Comment on a recipe
    Comment { recipe_id: String, text: String },
    /// Like a recipe
    Like { recipe_id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let shown = e
                .downcast_ref::<ClientError>()
                .and_then(ClientError::user_message);
            match shown {
                Some(message) => eprintln!("{message}"),
                None => {
                    tracing::debug!(error = ?e, "command failed");
                    eprintln!("Something went wrong");
                }
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = ApiClient::new(&cli.server, cli.token)?;

    match cli.command {
        Commands::Ping => {
            let response = client.ping().await?;
            println!("{} ({})", response.message, response.data.status);
        }
        Commands::Signup { username, password } => {
            let response = client.signup(&username, &password).await?;
            println!("{}", response.message);
            println!("{}", views::session(&response.data));
        }
        Commands::Login { username, password } => {
            let response = client.login(&username, &password).await?;
            println!("{}", views::session(&response.data));
        }
        Commands::Feed {
            user,
            limit,
            offset,
        } => {
            feed(&client, user.as_deref(), limit, offset).await?;
        }
        Commands::Show { recipe_id } => {
            let response = client.recipe(&recipe_id).await?;
            print!("{}", views::recipe_detail(&response.data));
        }
        Commands::Interactions { recipe_id } => {
            let (likes, comments) =
                tokio::try_join!(client.likes(&recipe_id), client.comments(&recipe_id))?;
            print!(
                "{}",
                views::interactions(&likes.data, &comments.data, comments.total())
            );
        }
        Commands::Create {
            title,
            description,
            ingredients,
            steps,
            images,
        } => {
            let recipe = RecipeForm {
                title,
                description,
                ingredients,
                steps,
                images,
            }
            .validate()?;
            let response = client.create_recipe(&recipe).await?;
            println!("{}", response.message);
            print!("{}", views::recipe_detail(&response.data));
        }
        Commands::Comment { recipe_id, text } => {
            comment(&client, &recipe_id, &text).await?;
        }
        Commands::Like { recipe_id } => {
            let response = client.like(&recipe_id).await?;
            println!(
                "{} (recipe {}, like #{})",
                response.message, response.data.recipe_id, response.data.id
            );
        }
    }

    Ok(())
}

/// Prints the feed. Each card waits on its likes and comments, fetched together.
async fn feed(
    client: &ApiClient,
    user: Option<&str>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<()> {
    let response = client.feed(user, limit, offset).await?;

    for entry in &response.data {
        let (likes, comments) = tokio::try_join!(
            client.likes(&entry.recipe_id),
            client.comments(&entry.recipe_id)
        )?;
        println!("{}", views::feed_entry(entry, &likes.data, comments.total()));
    }

    if let Some(page) = &response.pagination {
        println!("{}", views::pagination(page, response.data.len()));
    }
    Ok(())
}

async fn comment(client: &ApiClient, recipe_id: &str, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(ClientError::Invalid("Content is required".to_string()).into());
    }

    let posted = client.add_comment(recipe_id, text).await?;
    println!("{}", posted.message);
    println!("{}", views::new_comment(&posted.data));
    Ok(())
}
