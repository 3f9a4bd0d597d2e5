use clap::{Parser, Subcommand};
use sakhi::widget::{
    ChatController, ChatService, HttpChatService, Labels, Outcome, TerminalTranscript,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sakhi")]
#[command(about = "SakhiChat CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: SAKHI_CONFIG_PATH or ~/.sakhi/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the chat server (browser page, /chat, /health). Requires GROQ_API_KEY or provider.apiKey.
    Serve {
        /// Config file path (default: SAKHI_CONFIG_PATH or ~/.sakhi/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 8000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from config or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Chat with the server from the terminal (interactive). Type /exit or /quit to leave.
    Chat {
        /// Config file path (default: SAKHI_CONFIG_PATH or ~/.sakhi/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Chat endpoint URL (default: SAKHI_ENDPOINT or widget.endpoint)
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
    },

    /// Send one message and print the reply.
    Send {
        /// Message text.
        message: String,

        /// Config file path (default: SAKHI_CONFIG_PATH or ~/.sakhi/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Chat endpoint URL (default: SAKHI_ENDPOINT or widget.endpoint)
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env: {}", e);
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("sakhi {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port, bind }) => {
            if let Err(e) = run_serve(config, port, bind).await {
                log::error!("server failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config, endpoint }) => {
            if let Err(e) = run_chat(config, endpoint).await {
                log::error!("chat failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send {
            message,
            config,
            endpoint,
        }) => {
            if let Err(e) = run_send(config, endpoint, message).await {
                eprintln!("send failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(sakhi::config::default_config_path);
    let dir = sakhi::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let (mut config, path) = sakhi::config::load_config(config_path)?;
    log::debug!("using config {}", path.display());
    if let Some(p) = port {
        config.server.port = p;
    }
    if let Some(b) = bind {
        config.server.bind = b;
    }
    log::info!("starting chat server on {}:{}", config.server.bind, config.server.port);
    sakhi::server::run_server(config).await
}

/// Load config and build the HTTP chat service. `--endpoint` wins over SAKHI_ENDPOINT and the file.
fn chat_service(
    config_path: Option<PathBuf>,
    endpoint: Option<String>,
) -> anyhow::Result<(sakhi::config::Config, HttpChatService)> {
    let (config, _) = sakhi::config::load_config(config_path)?;
    let service = match endpoint {
        Some(url) => HttpChatService::with_endpoint(&config, url)?,
        None => HttpChatService::from_config(&config)?,
    };
    Ok((config, service))
}

async fn run_chat(config_path: Option<PathBuf>, endpoint: Option<String>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, service) = chat_service(config_path, endpoint)?;
    let labels = Labels::from_config(&config.widget)?;
    log::info!("chatting with {}", service.endpoint());

    let mut controller = ChatController::new(
        String::new(),
        TerminalTranscript::new(io::stdout()),
        labels,
        Arc::new(service),
    );
    let stdin = io::stdin();

    loop {
        {
            let mut stdout = io::stdout();
            write!(stdout, "> ")?;
            stdout.flush()?;
        }
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
        let command = input.trim();
        if command.eq_ignore_ascii_case("/exit") || command.eq_ignore_ascii_case("/quit") {
            break;
        }

        *controller.input_mut() = input.to_string();
        if controller.submit().await == Outcome::Ignored {
            controller.input_mut().clear();
        }
    }

    Ok(())
}

async fn run_send(
    config_path: Option<PathBuf>,
    endpoint: Option<String>,
    message: String,
) -> anyhow::Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("message is empty");
    }
    let (_, service) = chat_service(config_path, endpoint)?;
    let reply = service.send(&message).await?;
    println!("{}", reply);
    Ok(())
}
