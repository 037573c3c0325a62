use std::path::PathBuf;

use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use vidintel_core::{SessionController, SessionEvent, SessionState, VideoFile};

use crate::render;

#[derive(Debug, PartialEq)]
enum Input {
    Open(PathBuf),
    Upload,
    Cancel,
    Show,
    Help,
    Quit,
    /// Anything else is typed into the query box and submitted.
    Query(String),
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };
    match name {
        "open" | "o" if !arg.is_empty() => Input::Open(PathBuf::from(arg)),
        "upload" | "u" => Input::Upload,
        "cancel" | "c" => Input::Cancel,
        "state" | "s" => Input::Show,
        "help" | "h" => Input::Help,
        "quit" | "q" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

fn help() -> String {
    format!(
        "{}\n  :open <path>  select a video\n  :upload       process the selected video\n  :cancel       abandon in-flight requests\n  :state        show the session\n  :quit         leave\n  anything else is sent as a question",
        style("Commands").bold()
    )
}

/// What to print once a request settles. Search failures are only logged, but the
/// result area is still redrawn from the state.
fn completion_output(event: &SessionEvent, state: &SessionState) -> Option<String> {
    match event {
        SessionEvent::UploadSucceeded | SessionEvent::UploadFailed => render::status_line(state),
        SessionEvent::SearchSucceeded(_) | SessionEvent::SearchFailed => {
            Some(render::results_block(state)).filter(|block| !block.is_empty())
        }
        _ => None,
    }
}

/// Reads commands from stdin and renders completions as they arrive.
pub async fn run(mut ctl: SessionController, initial: Option<PathBuf>) -> Result<()> {
    println!("{}", render::header());
    println!("{}\n", help());

    if let Some(path) = initial {
        ctl.select_file(VideoFile::new(path));
        print!("{}", render::full_view(ctl.state()));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Open(path) => {
                        ctl.select_file(VideoFile::new(path));
                        print!("{}", render::full_view(ctl.state()));
                    }
                    Input::Upload => {
                        if ctl.submit_video().is_none() {
                            println!("{}", style("Pick a video first with :open <path>").yellow());
                        } else if let Some(status) = render::status_line(ctl.state()) {
                            println!("{status}");
                        }
                    }
                    Input::Cancel => {
                        let cancelled = ctl.cancel_all();
                        println!("{}", style(format!("Cancelled {cancelled} request(s)")).dim());
                    }
                    Input::Show => print!("{}", render::full_view(ctl.state())),
                    Input::Help => println!("{}", help()),
                    Input::Query(text) => {
                        ctl.set_query(text);
                        if ctl.submit_query().is_some() {
                            println!("{}", style("Searching...").dim());
                        }
                    }
                    Input::Unknown(raw) => {
                        println!("{} {}", style("Unknown command:").red(), raw);
                    }
                }
            }
            Some(event) = ctl.next_event(), if ctl.in_flight() > 0 => {
                if let Some(output) = completion_output(&event, ctl.state()) {
                    println!("{output}");
                }
            }
        }
    }

    ctl.cancel_all();
    Ok(())
}
