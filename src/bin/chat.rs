//! Terminal chat front end for the TalkFlow backend.
//!
//! Reads lines from stdin, streams assistant responses to stdout, and shows
//! a warning banner while the backend is unreachable. Tracing goes to
//! stderr so stdout stays a clean conversation transcript.

use std::io::Write;

use talkflow::session::{SessionController, SessionEvent};
use talkflow::speech::SpeechBridge;
use talkflow::{
    ClientConfig, ComposeController, Language, Personality, ReadinessProber, ReadinessState,
    SessionParams, TurnOrigin, UploadClient,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = ClientConfig::load()?;
    let http = reqwest::Client::new();

    let prober = ReadinessProber::start(http.clone(), &config);
    spawn_banner_watch(&prober);

    let controller = SessionController::new(http.clone(), config.clone());
    let uploader = UploadClient::new(http, &config);
    let speech = SpeechBridge::unavailable();
    let mut params = SessionParams::new();
    let mut compose = ComposeController::new();

    println!("TalkFlow — {}", config.base_url);
    println!("Commands: /personality <name>, /lang <code>, /upload <path>, /speak, /listen, /clear, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        if let Some(rest) = line.strip_prefix('/') {
            if !handle_command(rest, &controller, &uploader, &speech, &mut params).await {
                break;
            }
            continue;
        }

        compose.set_text(line);
        let Some(text) = compose.handle_enter(false, controller.is_streaming()) else {
            continue;
        };

        // Subscribe before submitting so no fragment event is missed.
        let mut events = controller.subscribe();
        if !controller.submit(&text, &params) {
            continue;
        }
        print_streamed_turn(&mut events).await;
    }

    Ok(())
}

/// Print the assistant's streamed response as fragments accumulate.
async fn print_streamed_turn(
    events: &mut tokio::sync::broadcast::Receiver<SessionEvent>,
) {
    print!("assistant> ");
    let _ = std::io::stdout().flush();
    let mut printed = 0usize;
    loop {
        match events.recv().await {
            Ok(SessionEvent::PendingUpdated { text }) => {
                // The event carries the full buffer; print only the suffix.
                print!("{}", &text[printed.min(text.len())..]);
                let _ = std::io::stdout().flush();
                printed = text.len();
            }
            Ok(SessionEvent::TurnFinalized { text }) => {
                if text.is_none() {
                    print!("(no response)");
                }
                println!();
                break;
            }
            Ok(SessionEvent::Cleared) | Err(_) => {
                println!();
                break;
            }
            Ok(SessionEvent::UserTurn { .. }) => {}
        }
    }
}

/// Handle a `/command`. Returns `false` to quit.
async fn handle_command(
    command: &str,
    controller: &SessionController,
    uploader: &UploadClient,
    speech: &SpeechBridge,
    params: &mut SessionParams,
) -> bool {
    let (name, arg) = match command.split_once(' ') {
        Some((n, a)) => (n, a.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => return false,
        "clear" => {
            controller.clear();
            println!("(conversation cleared)");
        }
        "personality" => match Personality::parse(arg) {
            Some(p) => {
                params.personality = p;
                println!("(personality: {})", p.as_str());
            }
            None => println!("(unknown personality: {arg}; try default, yoda, pirate)"),
        },
        "lang" => match Language::parse(arg) {
            Some(l) => {
                params.language = l;
                println!("(language: {})", l.as_str());
            }
            None => println!("(unknown language: {arg}; try en, es, fr)"),
        },
        "upload" => match uploader.upload_path(std::path::Path::new(arg)).await {
            Ok(confirmation) => println!(
                "(upload {}: {} chunks)",
                confirmation.status,
                confirmation.added_chunks.unwrap_or(0)
            ),
            Err(e) => println!("(upload failed: {e})"),
        },
        "speak" => {
            let last_assistant = controller
                .log_snapshot()
                .into_iter()
                .rev()
                .find(|t| t.origin == TurnOrigin::Assistant);
            match last_assistant {
                // A missing synthesizer is a silent no-op inside speak().
                Some(turn) => {
                    if let Err(e) = speech.speak(&turn.text, params.language) {
                        println!("(speech failed: {e})");
                    }
                }
                None => println!("(nothing to read yet)"),
            }
        }
        "listen" => match speech.listen(params.language).await {
            Ok(Some(phrase)) => println!("(heard: {phrase})"),
            Ok(None) => println!("(heard nothing)"),
            // Capability absence must surface visibly, unlike speak.
            Err(e) => println!("(cannot listen: {e})"),
        },
        other => println!("(unknown command: /{other})"),
    }
    true
}

/// After the banner delay, warn while the backend is still not ready, then
/// confirm once it comes up.
fn spawn_banner_watch(prober: &ReadinessProber) {
    let mut rx = prober.subscribe();
    let delay = prober.banner_delay();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if *rx.borrow() != ReadinessState::Active {
            eprintln!("⚠ backend is starting up or unreachable; messages will not send yet");
            if rx.wait_for(|s| *s == ReadinessState::Active).await.is_ok() {
                eprintln!("backend is ready");
            }
        }
    });
}
