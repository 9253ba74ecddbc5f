//! Interactive command input and shutdown signals

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// Commands driving an interactive interview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewCommand {
    Record,
    Stop,
    Next,
    Skip,
    RetryUpload,
    ToggleMicrophone,
    ToggleCamera,
    RetryDevice,
    Finish,
    Abandon,
    Status,
    Help,
    /// SIGINT/SIGTERM or end of input
    Shutdown,
}

/// Parse one line of user input
pub fn parse_command(line: &str) -> Option<InterviewCommand> {
    let command = match line.trim().to_lowercase().as_str() {
        "r" | "record" => InterviewCommand::Record,
        "s" | "stop" => InterviewCommand::Stop,
        "n" | "next" => InterviewCommand::Next,
        "k" | "skip" => InterviewCommand::Skip,
        "u" | "upload" | "retry" => InterviewCommand::RetryUpload,
        "m" | "mic" => InterviewCommand::ToggleMicrophone,
        "c" | "camera" => InterviewCommand::ToggleCamera,
        "d" | "device" => InterviewCommand::RetryDevice,
        "f" | "finish" => InterviewCommand::Finish,
        "q" | "quit" | "abandon" => InterviewCommand::Abandon,
        "?" | "status" => InterviewCommand::Status,
        "h" | "help" => InterviewCommand::Help,
        _ => return None,
    };
    Some(command)
}

/// Merges stdin commands and OS shutdown signals into one channel
pub struct CommandSource {
    receiver: mpsc::Receiver<InterviewCommand>,
}

impl CommandSource {
    /// Start reading stdin and listening for SIGINT/SIGTERM
    pub fn spawn() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(16);

        spawn_shutdown_listeners(tx.clone())?;

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => {
                        let command = parse_command(&line).unwrap_or_else(|| {
                            eprintln!("{} Unknown command '{}', type ? or h", "⚠".yellow(), line.trim());
                            InterviewCommand::Help
                        });
                        if tx.send(command).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) | Err(_) => {
                        debug!("stdin closed");
                        let _ = tx.send(InterviewCommand::Shutdown).await;
                        return;
                    }
                }
            }
        });

        Ok(Self { receiver: rx })
    }

    /// Wait for the next command
    pub async fn recv(&mut self) -> Option<InterviewCommand> {
        self.receiver.recv().await
    }
}

#[cfg(unix)]
fn spawn_shutdown_listeners(tx: mpsc::Sender<InterviewCommand>) -> Result<(), std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let tx_int = tx.clone();
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        sigint.recv().await;
        eprintln!("{} Received SIGINT (abandoning)", "↓".cyan());
        let _ = tx_int.send(InterviewCommand::Shutdown).await;
    });

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        sigterm.recv().await;
        eprintln!("{} Received SIGTERM (abandoning)", "↓".cyan());
        let _ = tx.send(InterviewCommand::Shutdown).await;
    });

    Ok(())
}

#[cfg(not(unix))]
fn spawn_shutdown_listeners(tx: mpsc::Sender<InterviewCommand>) -> Result<(), std::io::Error> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(InterviewCommand::Shutdown).await;
        }
    });
    Ok(())
}
